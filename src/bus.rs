use log::{debug, info};

use super::*;

pub struct PciBus<'a, C: ConfigSpace + ?Sized> {
    pub(super) pci: &'a mut C,
    pub(super) bus_number: u8,
}

impl<C: ConfigSpace + ?Sized> PciBus<'_, C> {
    /// Returns `None` if nothing answers at function 0 of `device_number`.
    ///
    /// Only the vendor ID is read for an empty slot.
    pub fn device(&mut self, device_number: u8) -> Option<PciDevice<'_, C>> {
        assert!((0..=SLOT_MAX).contains(&device_number));
        let vendor_id = self.pci.read_u16(self.bus_number, device_number, 0, 0x0);
        if vendor_id != u16::MAX {
            Some(PciDevice {
                pci: self.pci,
                bus_number: self.bus_number,
                device_number,
                vendor_id,
            })
        } else {
            None
        }
    }
}

/// Brute force scan of function 0 on every slot of every known bus, lowest address first.
///
/// Stops at the first supported chipset. These bridges exist once per board, so there is no point
/// looking for a second one.
pub fn find_supported_device<C: ConfigSpace + ?Sized>(pci: &mut C) -> Option<DeviceHandle> {
    for bus_number in pci.known_buses() {
        let mut bus = pci.bus(bus_number);
        for device_number in 0..=SLOT_MAX {
            let Some(mut device) = bus.device(device_number) else {
                continue;
            };
            let vendor_id = device.vendor_id();
            let device_id = device.device_id();
            debug!(
                "PCI Device {bus_number:02x}:{device_number:02x}.0 - VEN_{vendor_id:04x}&DEV_{device_id:04x}"
            );
            if let Some(chipset) = lookup(vendor_id, device_id) {
                info!(
                    "Found {} at {bus_number:02x}:{device_number:02x}.0",
                    chipset.name
                );
                return Some(DeviceHandle {
                    bus_number,
                    device_number,
                    chipset,
                });
            }
        }
    }
    None
}

/// Every present function 0 in the same order [`find_supported_device`] visits them.
pub fn list_devices<C: ConfigSpace + ?Sized>(pci: &mut C) -> impl Iterator<Item = PciDeviceInfo> {
    let buses = pci.known_buses();
    buses
        .flat_map(|bus_number| (0..=SLOT_MAX).map(move |device_number| (bus_number, device_number)))
        .filter_map(move |(bus_number, device_number)| {
            pci.bus(bus_number)
                .device(device_number)
                .map(|mut device| device.info())
        })
}
