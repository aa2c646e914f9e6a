//! Reading cable tables and layouts from disk.
//!
//! A data directory holds `cables.*` and `layout.*`, each in exactly one of
//! RON, TOML or JSON. The extension picks the parser.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;
use voltaic_core::cable::{CableSpec, CableTable, CableTableError};
use voltaic_core::pos::{BlockPos, PositionKeyError};

use crate::schema::{CableData, LayoutData};

/// Base name of the optional cable table file.
pub const CABLES_FILE: &str = "cables";
/// Base name of the required layout file.
pub const LAYOUT_FILE: &str = "layout";

// ===========================================================================
// Errors
// ===========================================================================

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("no '{file}' data file in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    #[error("{file} is not a .ron, .toml or .json file")]
    UnsupportedFormat { file: PathBuf },

    /// The same base name exists in more than one format.
    #[error("ambiguous data files {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("could not parse {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    #[error("bad cable table in {file}: {source}")]
    InvalidCableTable {
        file: PathBuf,
        #[source]
        source: CableTableError,
    },

    #[error("bad position in {file}: {source}")]
    InvalidPosition {
        file: PathBuf,
        #[source]
        source: PositionKeyError,
    },

    /// A layout places a cable type the table does not know.
    #[error("unknown cable type '{tag}' at {position} in {file}")]
    UnknownCableTag {
        file: PathBuf,
        tag: String,
        position: BlockPos,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Formats
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    /// Lookup order when scanning a directory.
    pub const ALL: [Format; 3] = [Format::Ron, Format::Toml, Format::Json];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Ron => "ron",
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }

    /// The format named by `path`'s extension.
    pub fn of(path: &Path) -> Result<Self, DataLoadError> {
        let ext = path.extension().and_then(|e| e.to_str());
        Self::ALL
            .into_iter()
            .find(|f| Some(f.extension()) == ext)
            .ok_or_else(|| DataLoadError::UnsupportedFormat {
                file: path.to_path_buf(),
            })
    }

    fn parse<T: DeserializeOwned>(self, text: &str) -> Result<T, String> {
        match self {
            Format::Ron => ron::from_str(text).map_err(|e| e.to_string()),
            Format::Toml => toml::from_str(text).map_err(|e| e.to_string()),
            Format::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        }
    }
}

/// Find `{base}.ron`, `{base}.toml` or `{base}.json` in `dir`.
///
/// More than one match is a [`DataLoadError::ConflictingFormats`].
pub fn locate(dir: &Path, base: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let present: Vec<PathBuf> = Format::ALL
        .into_iter()
        .map(|f| dir.join(format!("{base}.{}", f.extension())))
        .filter(|p| p.is_file())
        .collect();

    match present.as_slice() {
        [] => Ok(None),
        [one] => Ok(Some(one.clone())),
        [a, b, ..] => Err(DataLoadError::ConflictingFormats {
            a: a.clone(),
            b: b.clone(),
        }),
    }
}

/// Read `path` and deserialize it in the format its extension names.
pub fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = Format::of(path)?;
    let text = std::fs::read_to_string(path)?;
    format.parse(&text).map_err(|detail| DataLoadError::Parse {
        file: path.to_path_buf(),
        detail,
    })
}

// ===========================================================================
// Loaders
// ===========================================================================

/// TOML cannot hold a bare array, so TOML cable tables nest the list
/// under `cables`.
#[derive(Deserialize)]
struct CableFile {
    cables: Vec<CableData>,
}

/// Load and validate a cable table file.
pub fn load_cable_table(path: &Path) -> Result<CableTable, DataLoadError> {
    let entries = match Format::of(path)? {
        Format::Toml => read_file::<CableFile>(path)?.cables,
        Format::Ron | Format::Json => read_file::<Vec<CableData>>(path)?,
    };
    let table = CableTable::from_specs(
        entries
            .into_iter()
            .map(|c| (c.tag, CableSpec::new(c.capacity, c.loss_per_block))),
    )
    .map_err(|source| DataLoadError::InvalidCableTable {
        file: path.to_path_buf(),
        source,
    })?;
    debug!(file = %path.display(), types = table.len(), "loaded cable table");
    Ok(table)
}

/// Load a layout file. Positions are checked when the layout is built.
pub fn load_layout(path: &Path) -> Result<LayoutData, DataLoadError> {
    let layout: LayoutData = read_file(path)?;
    debug!(file = %path.display(), placements = layout.len(), "loaded layout");
    Ok(layout)
}

/// Parse a position key, attributing failures to `file`.
pub fn parse_position(key: &str, file: &Path) -> Result<BlockPos, DataLoadError> {
    BlockPos::parse_key(key).map_err(|source| DataLoadError::InvalidPosition {
        file: file.to_path_buf(),
        source,
    })
}

// ===========================================================================
// Directories
// ===========================================================================

/// A cable table and layout read from one directory.
#[derive(Debug, Clone)]
pub struct NetworkData {
    pub table: CableTable,
    pub layout: LayoutData,
    /// The layout file, used to attribute build errors.
    pub layout_path: PathBuf,
}

/// Load `cables.*` (optional, defaults to the stock table) and `layout.*`
/// (required) from `dir`.
pub fn load_from_dir(dir: &Path) -> Result<NetworkData, DataLoadError> {
    let table = match locate(dir, CABLES_FILE)? {
        Some(path) => load_cable_table(&path)?,
        None => CableTable::standard(),
    };
    let layout_path =
        locate(dir, LAYOUT_FILE)?.ok_or_else(|| DataLoadError::MissingRequired {
            file: LAYOUT_FILE.to_string(),
            dir: dir.to_path_buf(),
        })?;
    let layout = load_layout(&layout_path)?;
    Ok(NetworkData {
        table,
        layout,
        layout_path,
    })
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "voltaic_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    const CABLES_RON: &str = r#"[
        (tag: "tin", capacity: 32.0, loss_per_block: 0.025),
        (tag: "superconductor", capacity: 100000.0, loss_per_block: 0.0),
    ]"#;

    const CABLES_JSON: &str = r#"[
        {"tag": "tin", "capacity": 32.0, "loss_per_block": 0.025},
        {"tag": "superconductor", "capacity": 100000.0, "loss_per_block": 0.0}
    ]"#;

    const CABLES_TOML: &str = r#"
[[cables]]
tag = "tin"
capacity = 32.0
loss_per_block = 0.025

[[cables]]
tag = "superconductor"
capacity = 100000.0
loss_per_block = 0.0
"#;

    // -----------------------------------------------------------------------
    // Format / locate
    // -----------------------------------------------------------------------

    #[test]
    fn format_follows_extension() {
        assert_eq!(Format::of(Path::new("cables.ron")).unwrap(), Format::Ron);
        assert_eq!(Format::of(Path::new("a/b/layout.toml")).unwrap(), Format::Toml);
        assert_eq!(Format::of(Path::new("cables.json")).unwrap(), Format::Json);
        for bad in ["cables.yaml", "cables", "cables.RON"] {
            assert!(matches!(
                Format::of(Path::new(bad)),
                Err(DataLoadError::UnsupportedFormat { .. })
            ));
        }
    }

    #[test]
    fn locate_finds_single_file() {
        let dir = make_test_dir("locate_found");
        fs::write(dir.join("layout.toml"), "").unwrap();
        fs::write(dir.join("layout.yaml"), "").unwrap();

        assert_eq!(locate(&dir, "layout").unwrap(), Some(dir.join("layout.toml")));
        assert_eq!(locate(&dir, "cables").unwrap(), None);

        cleanup(&dir);
    }

    #[test]
    fn locate_rejects_two_formats() {
        let dir = make_test_dir("locate_conflict");
        fs::write(dir.join("cables.ron"), "[]").unwrap();
        fs::write(dir.join("cables.json"), "[]").unwrap();

        assert!(matches!(
            locate(&dir, "cables"),
            Err(DataLoadError::ConflictingFormats { ref a, ref b })
                if *a == dir.join("cables.ron") && *b == dir.join("cables.json")
        ));

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // load_cable_table
    // -----------------------------------------------------------------------

    #[test]
    fn cable_table_in_every_format() {
        let dir = make_test_dir("cables_formats");
        for (name, body) in [
            ("a.ron", CABLES_RON),
            ("b.json", CABLES_JSON),
            ("c.toml", CABLES_TOML),
        ] {
            let path = dir.join(name);
            fs::write(&path, body).unwrap();

            let table = load_cable_table(&path).unwrap();
            assert_eq!(table.len(), 2, "{name}");
            assert_eq!(table.get("tin"), Some(CableSpec::new(32.0, 0.025)));
            assert_eq!(table.get("superconductor").unwrap().loss_per_block, 0.0);
            assert!(!table.contains("copper"));
        }
        cleanup(&dir);
    }

    #[test]
    fn cable_table_rejects_duplicates() {
        let dir = make_test_dir("cables_dup");
        let path = dir.join("cables.json");
        fs::write(
            &path,
            r#"[{"tag": "tin", "capacity": 32.0, "loss_per_block": 0.1},
                {"tag": "tin", "capacity": 64.0, "loss_per_block": 0.1}]"#,
        )
        .unwrap();

        assert!(matches!(
            load_cable_table(&path),
            Err(DataLoadError::InvalidCableTable {
                source: CableTableError::DuplicateTag(ref tag),
                ..
            }) if tag == "tin"
        ));
        cleanup(&dir);
    }

    #[test]
    fn cable_table_rejects_negative_loss() {
        let dir = make_test_dir("cables_neg");
        let path = dir.join("cables.ron");
        fs::write(&path, r#"[(tag: "leaky", capacity: 32.0, loss_per_block: -1.0)]"#).unwrap();

        assert!(matches!(
            load_cable_table(&path),
            Err(DataLoadError::InvalidCableTable {
                source: CableTableError::InvalidLoss { .. },
                ..
            })
        ));
        cleanup(&dir);
    }

    #[test]
    fn toml_cable_table_needs_key() {
        let dir = make_test_dir("cables_toml_key");
        let path = dir.join("cables.toml");
        fs::write(&path, r#"foo = "bar""#).unwrap();

        assert!(matches!(
            load_cable_table(&path),
            Err(DataLoadError::Parse { .. })
        ));
        cleanup(&dir);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = make_test_dir("cables_bad");
        let path = dir.join("cables.ron");
        fs::write(&path, "this is not valid RON {{{").unwrap();

        assert!(matches!(
            load_cable_table(&path),
            Err(DataLoadError::Parse { .. })
        ));
        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // load_layout / load_from_dir
    // -----------------------------------------------------------------------

    #[test]
    fn layout_from_toml() {
        let dir = make_test_dir("layout_toml");
        let path = dir.join("layout.toml");
        fs::write(
            &path,
            r#"
[[cables]]
at = "0,0,0"
tag = "copper"

[[consumers]]
at = "1,0,0"
max_voltage = 128.0
max_input = 32.0
capacity = 1000.0

[[generators]]
at = "-1,0,0"
output_voltage = 32.0
packet_size = 32.0
capacity = 500.0
stored = 250.0
"#,
        )
        .unwrap();

        let layout = load_layout(&path).unwrap();
        assert_eq!(layout.cables[0].tag, "copper");
        assert_eq!(layout.consumers[0].stored, 0.0);
        assert_eq!(layout.generators[0].stored, 250.0);

        cleanup(&dir);
    }

    #[test]
    fn load_from_dir_defaults_cable_table() {
        let dir = make_test_dir("dir_default");
        fs::write(dir.join("layout.json"), r#"{"cables": []}"#).unwrap();

        let data = load_from_dir(&dir).unwrap();
        assert_eq!(data.table, CableTable::standard());
        assert!(data.layout.is_empty());
        assert_eq!(data.layout_path, dir.join("layout.json"));

        cleanup(&dir);
    }

    #[test]
    fn load_from_dir_uses_custom_table() {
        let dir = make_test_dir("dir_custom");
        fs::write(dir.join("cables.ron"), CABLES_RON).unwrap();
        fs::write(dir.join("layout.ron"), "(cables: [])").unwrap();

        let data = load_from_dir(&dir).unwrap();
        assert!(data.table.contains("superconductor"));
        assert!(!data.table.contains("gold"));

        cleanup(&dir);
    }

    #[test]
    fn load_from_dir_requires_layout() {
        let dir = make_test_dir("dir_no_layout");
        fs::write(dir.join("cables.ron"), CABLES_RON).unwrap();

        assert!(matches!(
            load_from_dir(&dir),
            Err(DataLoadError::MissingRequired { ref file, .. }) if file == LAYOUT_FILE
        ));
        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // parse_position
    // -----------------------------------------------------------------------

    #[test]
    fn parse_position_attributes_file() {
        assert_eq!(
            parse_position("4,-2,7", Path::new("layout.ron")).unwrap(),
            BlockPos::new(4, -2, 7)
        );

        let err = parse_position("4,-2", Path::new("layout.ron")).unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidPosition { .. }));
        assert!(err.to_string().contains("layout.ron"));
    }

    // -----------------------------------------------------------------------
    // Error display / conversion
    // -----------------------------------------------------------------------

    #[test]
    fn error_display_messages() {
        let e = DataLoadError::MissingRequired {
            file: "layout".to_string(),
            dir: PathBuf::from("/data"),
        };
        assert!(e.to_string().contains("layout"));
        assert!(e.to_string().contains("/data"));

        let e = DataLoadError::UnknownCableTag {
            file: PathBuf::from("layout.ron"),
            tag: "mithril".to_string(),
            position: BlockPos::new(1, 2, 3),
        };
        let msg = e.to_string();
        assert!(msg.contains("mithril"));
        assert!(msg.contains("1,2,3"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let data_err: DataLoadError = io_err.into();
        assert!(matches!(data_err, DataLoadError::Io(_)));
        assert!(data_err.to_string().contains("file not found"));
    }
}
