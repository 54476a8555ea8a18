use core::fmt::{self, Display};

use super::*;

/// Which ISA transfer width a recovery time applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    Bits8,
    Bits16,
}

impl Width {
    /// The largest cycle count that can be requested for this width.
    pub const fn max_cycles(self) -> u8 {
        match self {
            Self::Bits8 => 8,
            Self::Bits16 => 4,
        }
    }
}

impl Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bits8 => "8-Bit",
            Self::Bits16 => "16-Bit",
        })
    }
}

/// What to do with one width's recovery time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryRequest {
    /// Don't touch the register bits for this width.
    Unchanged,
    /// Turn recovery off. Only chipsets with an enable bit support this.
    Disable,
    Cycles(u8),
}

impl RecoveryRequest {
    /// Parses the command line convention: any negative value (normally `-1`) leaves the width
    /// alone, `0` disables it and `1..=max` selects a cycle count.
    pub fn parse(width: Width, value: i16) -> Result<Self> {
        match value {
            ..=-1 => Ok(Self::Unchanged),
            0 => Ok(Self::Disable),
            1.. if value <= width.max_cycles() as i16 => Ok(Self::Cycles(value as u8)),
            _ => Err(Error::InvalidArgumentRange { width, value }),
        }
    }

    /// Rejects cycle counts above `width`'s maximum, the same way [`RecoveryRequest::parse`]
    /// would have.
    pub fn check(self, width: Width) -> Result<Self> {
        match self {
            Self::Cycles(cycles) if cycles > width.max_cycles() => {
                Err(Error::InvalidArgumentRange {
                    width,
                    value: cycles as i16,
                })
            }
            _ => Ok(self),
        }
    }

    /// The value handed to the codecs, where `0` means disabled.
    /// Returns `None` for [`RecoveryRequest::Unchanged`].
    pub fn cycles(self) -> Option<u8> {
        match self {
            Self::Unchanged => None,
            Self::Disable => Some(0),
            Self::Cycles(cycles) => Some(cycles),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidthState {
    pub enabled: bool,
    pub cycles: u8,
}

/// Decoded contents of a chipset's recovery register at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoverySnapshot {
    pub family: ChipsetFamily,
    /// The register byte exactly as read.
    pub raw: u8,
    pub recovery_8: WidthState,
    pub recovery_16: WidthState,
    /// DMA reserved page register aliasing control. Only PIIX has it.
    pub dma_aliasing_control: Option<bool>,
}

impl RecoverySnapshot {
    pub fn width(&self, width: Width) -> WidthState {
        match width {
            Width::Bits8 => self.recovery_8,
            Width::Bits16 => self.recovery_16,
        }
    }
}

impl Display for RecoverySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Raw: 0x{:02x}", self.raw)?;
        for width in [Width::Bits8, Width::Bits16] {
            let state = self.width(width);
            if self.family.has_enable_bits() {
                let on_off = if state.enabled { "ON" } else { "OFF" };
                write!(f, " | {width} {on_off}, {} clocks", state.cycles)?;
            } else {
                write!(f, " | {width} {} clocks", state.cycles)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::string::ToString;

    use super::*;

    #[test]
    fn parse_follows_command_line_convention() {
        assert_eq!(
            RecoveryRequest::parse(Width::Bits8, -1),
            Ok(RecoveryRequest::Unchanged)
        );
        assert_eq!(
            RecoveryRequest::parse(Width::Bits8, 0),
            Ok(RecoveryRequest::Disable)
        );
        assert_eq!(
            RecoveryRequest::parse(Width::Bits8, 8),
            Ok(RecoveryRequest::Cycles(8))
        );
        assert_eq!(
            RecoveryRequest::parse(Width::Bits16, 4),
            Ok(RecoveryRequest::Cycles(4))
        );
    }

    #[test]
    fn parse_rejects_out_of_range() {
        assert_eq!(
            RecoveryRequest::parse(Width::Bits8, 9),
            Err(Error::InvalidArgumentRange {
                width: Width::Bits8,
                value: 9
            })
        );
        assert_eq!(
            RecoveryRequest::parse(Width::Bits16, 5),
            Err(Error::InvalidArgumentRange {
                width: Width::Bits16,
                value: 5
            })
        );
    }

    #[test]
    fn any_negative_value_leaves_width_alone() {
        for value in [-1, -2, -9, i16::MIN] {
            assert_eq!(
                RecoveryRequest::parse(Width::Bits16, value),
                Ok(RecoveryRequest::Unchanged)
            );
        }
    }

    #[test]
    fn check_matches_parse_limits() {
        assert_eq!(
            RecoveryRequest::Cycles(9).check(Width::Bits8),
            Err(Error::InvalidArgumentRange {
                width: Width::Bits8,
                value: 9
            })
        );
        assert_eq!(
            RecoveryRequest::Cycles(5).check(Width::Bits16),
            Err(Error::InvalidArgumentRange {
                width: Width::Bits16,
                value: 5
            })
        );
        assert_eq!(
            RecoveryRequest::Cycles(8).check(Width::Bits8),
            Ok(RecoveryRequest::Cycles(8))
        );
        assert_eq!(
            RecoveryRequest::Unchanged.check(Width::Bits16),
            Ok(RecoveryRequest::Unchanged)
        );
        assert_eq!(
            RecoveryRequest::Disable.check(Width::Bits16),
            Ok(RecoveryRequest::Disable)
        );
    }

    #[test]
    fn snapshot_display() {
        let piix = RecoverySnapshot {
            family: ChipsetFamily::Piix,
            raw: 0x4d,
            recovery_8: WidthState {
                enabled: true,
                cycles: 1,
            },
            recovery_16: WidthState {
                enabled: true,
                cycles: 1,
            },
            dma_aliasing_control: Some(false),
        };
        assert_eq!(
            piix.to_string(),
            "Raw: 0x4d | 8-Bit ON, 1 clocks | 16-Bit ON, 1 clocks"
        );

        let sis = RecoverySnapshot {
            family: ChipsetFamily::Sis,
            raw: 0x00,
            recovery_8: WidthState {
                enabled: true,
                cycles: 8,
            },
            recovery_16: WidthState {
                enabled: true,
                cycles: 5,
            },
            dma_aliasing_control: None,
        };
        assert_eq!(sis.to_string(), "Raw: 0x00 | 8-Bit 8 clocks | 16-Bit 5 clocks");
    }
}
