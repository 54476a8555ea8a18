use core::ops::{Range, RangeInclusive};

pub use acpi::mcfg::McfgEntry;
pub use x86_64::PhysAddr;

/// Bytes of configuration space per bus: 32 devices, 8 functions, 4 KiB each.
const BUS_SIZE: u64 = 1 << 20;

/// The part of a PCIe ECAM region that covers `buses`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcamWindow {
    /// Physical address of bus 0's configuration space, as the MCFG table reports it.
    pub base_address: u64,
    pub buses: RangeInclusive<u8>,
}

impl EcamWindow {
    pub fn len(&self) -> u64 {
        (*self.buses.end() - *self.buses.start()) as u64 * BUS_SIZE + BUS_SIZE
    }

    pub fn phys_range_to_map(&self) -> Range<PhysAddr> {
        let start_addr =
            PhysAddr::new(self.base_address + ((*self.buses.start() as u64) << 20));
        start_addr..start_addr + self.len()
    }
}

impl From<&McfgEntry> for EcamWindow {
    fn from(mcfg_entry: &McfgEntry) -> Self {
        Self {
            base_address: mcfg_entry.base_address,
            buses: mcfg_entry.bus_number_start..=mcfg_entry.bus_number_end,
        }
    }
}
