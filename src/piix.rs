//! Intel PIIX, PIIX3 and PIIX4(E) ISA I/O Recovery Timer register (IORT).

use bitfield::bitfield;

use super::*;

pub const PIIX_IORT_OFFSET: u8 = 0x4C;

bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct PiixIort(u8);
    impl Debug;
    /// DMA reserved page register aliasing control. Not ours, written back as read.
    pub dma_aliasing_control, _: 7;
    pub recovery_8_enable, set_recovery_8_enable: 6;
    pub recovery_16_enable, set_recovery_16_enable: 2;
    u8;
    /// 0 means 8 clocks
    pub recovery_8_clocks, set_recovery_8_clocks: 5, 3;
    /// 0 means 4 clocks
    pub recovery_16_clocks, set_recovery_16_clocks: 1, 0;
}

impl PiixIort {
    pub fn decode(self) -> RecoverySnapshot {
        RecoverySnapshot {
            family: ChipsetFamily::Piix,
            raw: self.0,
            recovery_8: WidthState {
                enabled: self.recovery_8_enable(),
                cycles: clocks_to_cycles(self.recovery_8_clocks(), Width::Bits8),
            },
            recovery_16: WidthState {
                enabled: self.recovery_16_enable(),
                cycles: clocks_to_cycles(self.recovery_16_clocks(), Width::Bits16),
            },
            dma_aliasing_control: Some(self.dma_aliasing_control()),
        }
    }

    /// `cycles == 0` clears the enable bit and zeroes the clock field.
    /// The range `1..=max` is not checked here, callers go through [`RecoveryRequest::parse`].
    pub fn set_recovery(&mut self, width: Width, cycles: u8) {
        let enable = cycles != 0;
        let clocks = cycles % width.max_cycles();
        match width {
            Width::Bits8 => {
                self.set_recovery_8_enable(enable);
                self.set_recovery_8_clocks(clocks);
            }
            Width::Bits16 => {
                self.set_recovery_16_enable(enable);
                self.set_recovery_16_clocks(clocks);
            }
        }
    }
}

fn clocks_to_cycles(clocks: u8, width: Width) -> u8 {
    if clocks == 0 {
        width.max_cycles()
    } else {
        clocks
    }
}
