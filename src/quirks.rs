//! Behaviours that differ between historical interpreters.
//!
//! Programs were written against different machines, so the points where
//! those machines disagree are toggles instead of a single fixed choice.
//! `Quirks::default()` is the modern convention most programs expect.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quirks {
    /// 8XY6 / 8XYE shift VY and store the result in VX.
    pub shift_reads_vy: bool,
    /// 8XYE takes VF from the low bit of the source instead of the high bit.
    pub shift_left_flag_low_bit: bool,
    /// BXNN jumps to XNN + VX instead of NNN + V0.
    pub jump_offset_uses_vx: bool,
    /// FX55 / FX65 leave I pointing just past the last byte they touched.
    pub load_store_increments_index: bool,
    /// 8XY1 / 8XY2 / 8XY3 zero VF.
    pub logic_resets_flag: bool,
}

impl Quirks {
    pub const fn modern() -> Self {
        Self {
            shift_reads_vy: false,
            shift_left_flag_low_bit: false,
            jump_offset_uses_vx: false,
            load_store_increments_index: true,
            logic_resets_flag: false,
        }
    }

    /// The original COSMAC VIP interpreter.
    pub const fn cosmac_vip() -> Self {
        Self {
            shift_reads_vy: true,
            shift_left_flag_low_bit: false,
            jump_offset_uses_vx: false,
            load_store_increments_index: true,
            logic_resets_flag: true,
        }
    }
}

impl Default for Quirks {
    fn default() -> Self {
        Self::modern()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_modern() {
        assert_eq!(Quirks::default(), Quirks::modern());
        assert!(Quirks::default().load_store_increments_index);
        assert!(!Quirks::default().shift_left_flag_low_bit);
    }

    #[test]
    fn vip_preset_differs_where_expected() {
        let vip = Quirks::cosmac_vip();
        assert!(vip.shift_reads_vy);
        assert!(vip.logic_resets_flag);
        assert!(!vip.jump_offset_uses_vx);
    }
}
