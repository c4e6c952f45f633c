use crate::utils::BitGroup;

/// A pattern table address selects one of the two pattern tables, a tile
/// number, a bit plane and a row inside the tile. Which column to use is
/// decided by callers when they pick a bit out of the fetched byte.
#[derive(Clone, Copy)]
pub struct PatternTableAddress {
    value: BitGroup<u16>,
}

impl PatternTableAddress {
    /// Select which pattern table to use (left or right one)
    pub const PATTERN_TABLE: u16 = 0b0001_0000_0000_0000;

    pub const TILE_NUMBER: u16 = 0b0000_1111_1111_0000;

    /// 0 for the low bit plane, 1 for the high one
    pub const BIT_PLANE: u16 = 0b0000_0000_0000_1000;

    /// Row number inside a tile
    pub const FINE_Y_OFFSET: u16 = 0b0000_0000_0000_0111;

    pub fn new(pattern_table: u8) -> Self {
        let mut value = BitGroup::new(0);
        value.set(Self::PATTERN_TABLE, pattern_table.into());
        Self { value }
    }

    pub fn set(&mut self, group: u16, value: u8) {
        self.value.set(group, value.into());
    }
}

impl From<PatternTableAddress> for u16 {
    fn from(value: PatternTableAddress) -> Self {
        value.value.into()
    }
}
