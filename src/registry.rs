use log::{info, trace, warn};

use super::*;

/// Chipsets that share a recovery register layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipsetFamily {
    /// See [`PiixIort`]
    Piix,
    /// See [`SisRecovery`]
    Sis,
}

impl ChipsetFamily {
    /// Whether each width can be switched off, as opposed to only picking a clock count.
    pub fn has_enable_bits(self) -> bool {
        match self {
            Self::Piix => true,
            Self::Sis => false,
        }
    }

    pub fn decode(self, raw: u8) -> RecoverySnapshot {
        match self {
            Self::Piix => PiixIort(raw).decode(),
            Self::Sis => SisRecovery(raw).decode(),
        }
    }

    /// Returns the register byte with only `width`'s bits replaced, or `None` if the family can't
    /// represent `cycles`.
    pub fn encode(self, raw: u8, width: Width, cycles: u8) -> Option<u8> {
        match self {
            Self::Piix => {
                let mut iort = PiixIort(raw);
                iort.set_recovery(width, cycles);
                Some(iort.0)
            }
            Self::Sis => {
                let mut reg = SisRecovery(raw);
                reg.set_recovery(width, cycles)?;
                Some(reg.0)
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ChipsetDescriptor {
    pub vendor_id: u16,
    pub device_id: u16,
    /// For SiS this is the register offset, which differs between parts with the same layout.
    pub variant: u8,
    pub name: &'static str,
    pub family: ChipsetFamily,
}

impl ChipsetDescriptor {
    pub fn register_offset(&self) -> u8 {
        match self.family {
            ChipsetFamily::Piix => PIIX_IORT_OFFSET,
            ChipsetFamily::Sis => self.variant,
        }
    }
}

/// No two entries may share a vendor and device ID.
pub static SUPPORTED_CHIPSETS: [ChipsetDescriptor; 5] = [
    ChipsetDescriptor {
        vendor_id: 0x8086,
        device_id: 0x122E,
        variant: 0x00,
        name: "Intel PIIX",
        family: ChipsetFamily::Piix,
    },
    ChipsetDescriptor {
        vendor_id: 0x8086,
        device_id: 0x7000,
        variant: 0x00,
        name: "Intel PIIX3",
        family: ChipsetFamily::Piix,
    },
    ChipsetDescriptor {
        vendor_id: 0x8086,
        device_id: 0x7110,
        variant: 0x00,
        name: "Intel PIIX4(E)",
        family: ChipsetFamily::Piix,
    },
    ChipsetDescriptor {
        vendor_id: 0x1039,
        device_id: 0x5113,
        variant: 0x51,
        name: "SiS 5113",
        family: ChipsetFamily::Sis,
    },
    ChipsetDescriptor {
        vendor_id: 0x1039,
        device_id: 0x0008,
        variant: 0x46,
        name: "SiS 559x",
        family: ChipsetFamily::Sis,
    },
];

pub fn lookup(vendor_id: u16, device_id: u16) -> Option<&'static ChipsetDescriptor> {
    SUPPORTED_CHIPSETS
        .iter()
        .find(|chipset| chipset.vendor_id == vendor_id && chipset.device_id == device_id)
}

/// A supported chipset found at function 0 of `bus_number`:`device_number`.
///
/// Only built by the enumerator after the IDs at that location matched the descriptor.
///
/// ```compile_fail
/// # use isawait::{DeviceHandle, SUPPORTED_CHIPSETS};
/// let handle = DeviceHandle {
///     bus_number: 0,
///     device_number: 7,
///     chipset: &SUPPORTED_CHIPSETS[0],
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceHandle {
    pub(super) bus_number: u8,
    pub(super) device_number: u8,
    pub(super) chipset: &'static ChipsetDescriptor,
}

impl DeviceHandle {
    pub fn bus_number(&self) -> u8 {
        self.bus_number
    }

    pub fn device_number(&self) -> u8 {
        self.device_number
    }

    pub fn chipset(&self) -> &'static ChipsetDescriptor {
        self.chipset
    }

    fn read_register<C: ConfigSpace + ?Sized>(&self, pci: &mut C) -> u8 {
        let offset = self.chipset.register_offset();
        let raw = pci.read_u8(self.bus_number, self.device_number, 0, offset);
        trace!(
            "{:02x}:{:02x}.0 read 0x{offset:02X} = 0x{raw:02x}",
            self.bus_number, self.device_number
        );
        raw
    }

    fn write_register<C: ConfigSpace + ?Sized>(&self, pci: &mut C, raw: u8) {
        let offset = self.chipset.register_offset();
        trace!(
            "{:02x}:{:02x}.0 write 0x{offset:02X} = 0x{raw:02x}",
            self.bus_number, self.device_number
        );
        pci.write_u8(self.bus_number, self.device_number, 0, offset, raw);
    }

    pub fn describe<C: ConfigSpace + ?Sized>(&self, pci: &mut C) -> RecoverySnapshot {
        self.chipset.family.decode(self.read_register(pci))
    }

    /// Read-modify-write of the recovery register. `cycles == 0` disables recovery for `width`.
    ///
    /// The register is always read fresh so the other width's bits are whatever the hardware has
    /// right now. If the chipset can't represent `cycles` nothing is written.
    pub fn set_recovery<C: ConfigSpace + ?Sized>(
        &self,
        pci: &mut C,
        width: Width,
        cycles: u8,
    ) -> Result<()> {
        let raw = self.read_register(pci);
        match self.chipset.family.encode(raw, width, cycles) {
            Some(new_raw) => {
                self.write_register(pci, new_raw);
                info!("{} {width} I/O recovery set to {cycles}", self.chipset.name);
                Ok(())
            }
            None => {
                warn!(
                    "{}: ignoring unsupported {width} I/O recovery value {cycles}",
                    self.chipset.name
                );
                Err(Error::UnsupportedValue {
                    width,
                    cycles,
                    chipset: self.chipset.name,
                })
            }
        }
    }

    pub fn set_recovery_8<C: ConfigSpace + ?Sized>(&self, pci: &mut C, cycles: u8) -> Result<()> {
        self.set_recovery(pci, Width::Bits8, cycles)
    }

    pub fn set_recovery_16<C: ConfigSpace + ?Sized>(&self, pci: &mut C, cycles: u8) -> Result<()> {
        self.set_recovery(pci, Width::Bits16, cycles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        for (i, a) in SUPPORTED_CHIPSETS.iter().enumerate() {
            for b in &SUPPORTED_CHIPSETS[i + 1..] {
                assert!(
                    (a.vendor_id, a.device_id) != (b.vendor_id, b.device_id),
                    "{} and {} share IDs",
                    a.name,
                    b.name
                );
            }
        }
    }

    #[test]
    fn lookup_is_exact() {
        assert_eq!(lookup(0x8086, 0x7110).map(|c| c.name), Some("Intel PIIX4(E)"));
        assert_eq!(lookup(0x1039, 0x0008).map(|c| c.register_offset()), Some(0x46));
        assert_eq!(lookup(0x1039, 0x5113).map(|c| c.register_offset()), Some(0x51));
        assert_eq!(lookup(0x8086, 0x7111), None);
        assert_eq!(lookup(0x1039, 0x7110), None);
    }

    #[test]
    fn piix_register_offset() {
        for chipset in SUPPORTED_CHIPSETS
            .iter()
            .filter(|c| c.family == ChipsetFamily::Piix)
        {
            assert_eq!(chipset.register_offset(), 0x4C);
        }
    }
}
