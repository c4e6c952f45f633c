/// NES core configuration options
pub struct NesSettings {
    /// Stop the stepping loop when the CPU fetches a BRK instead of
    /// vectoring through $FFFE/$FFFF. Test harnesses enable this to catch
    /// runaway programs that fall into zeroed memory.
    pub halt_on_brk: bool,
}

impl Default for NesSettings {
    fn default() -> Self {
        Self {
            halt_on_brk: false,
        }
    }
}
