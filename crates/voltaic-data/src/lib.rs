//! Data-driven setup for Voltaic networks.
//!
//! Reads cable tables and layouts from RON, JSON or TOML files and builds
//! a ready-to-run [`BuiltNetwork`].

pub mod build;
pub mod loader;
pub mod schema;

pub use build::{BuiltNetwork, build_from_dir};
pub use loader::{DataLoadError, NetworkData, load_from_dir};
