use slotmap::new_key_type;

new_key_type! {
    /// Identifies a device (generator, machine, storage block) that owns an
    /// energy buffer. Issued by [`DeviceRegistry`](crate::device::DeviceRegistry)
    /// or any other `SlotMap<DeviceId, _>`.
    pub struct DeviceId;
}
