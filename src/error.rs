use thiserror::Error;

use super::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Every enumerable bus and slot was probed and none held a known chipset.
    #[error("could not find a supported ISA bridge device")]
    NotFound,

    /// The `0x8000_0000` written to the config address port did not read back.
    #[error(
        "PCI configuration space access test failed: expected 0x80000000, got {observed:#010x}"
    )]
    AccessSelfTest { observed: u32 },

    /// The chipset cannot encode this cycle count. The register was not written.
    #[error("{chipset} does not support {cycles} clocks of {width} I/O recovery")]
    UnsupportedValue {
        width: Width,
        cycles: u8,
        chipset: &'static str,
    },

    #[error("invalid value {value} for {width} I/O recovery (expected at most {max})", max = .width.max_cycles())]
    InvalidArgumentRange { width: Width, value: i16 },
}
