//! SiS 5113 (register 0x51) and SiS 5597/5598 (register 0x46) ISA I/O recovery register.
//!
//! There is no enable bit. Each width holds a 2-bit index into a fixed table of clock counts.

use bitfield::bitfield;

use super::*;

pub const SIS_RECOVERY_8_CYCLES: [u8; 4] = [8, 5, 4, 3];
pub const SIS_RECOVERY_16_CYCLES: [u8; 4] = [5, 4, 3, 2];

bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct SisRecovery(u8);
    impl Debug;
    u8;
    pub recovery_16_index, set_recovery_16_index: 7, 6;
    pub recovery_8_index, set_recovery_8_index: 5, 4;
    /// Written back as read
    pub reserved, _: 3, 0;
}

fn cycles_table(width: Width) -> &'static [u8; 4] {
    match width {
        Width::Bits8 => &SIS_RECOVERY_8_CYCLES,
        Width::Bits16 => &SIS_RECOVERY_16_CYCLES,
    }
}

impl SisRecovery {
    pub fn decode(self) -> RecoverySnapshot {
        RecoverySnapshot {
            family: ChipsetFamily::Sis,
            raw: self.0,
            recovery_8: WidthState {
                enabled: true,
                cycles: SIS_RECOVERY_8_CYCLES[self.recovery_8_index() as usize],
            },
            recovery_16: WidthState {
                enabled: true,
                cycles: SIS_RECOVERY_16_CYCLES[self.recovery_16_index() as usize],
            },
            dma_aliasing_control: None,
        }
    }

    /// Selects the table entry equal to `cycles`.
    ///
    /// Returns `None` and leaves `self` untouched if `cycles` is not in the width's table.
    /// There is no rounding to a neighbouring entry.
    pub fn set_recovery(&mut self, width: Width, cycles: u8) -> Option<()> {
        let index = cycles_table(width)
            .iter()
            .position(|&table_cycles| table_cycles == cycles)? as u8;
        match width {
            Width::Bits8 => self.set_recovery_8_index(index),
            Width::Bits16 => self.set_recovery_16_index(index),
        }
        Some(())
    }
}
