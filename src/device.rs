use core::fmt::{self, Display};

use bitfield::bitfield;
use num_enum::TryFromPrimitive;

use super::*;

bitfield! {
    pub struct HeaderTypeByte(u8);
    impl Debug;
    pub multi_function, _: 7;
    u8; pub header_type, _: 6, 0;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum HeaderType {
    GeneralDevice = 0x0,
    PciToPciBridge = 0x1,
    PciToCardBusBridge = 0x2,
}

/// Function 0 of a slot whose vendor ID is not `0xFFFF`.
pub struct PciDevice<'a, C: ConfigSpace + ?Sized> {
    pub(super) pci: &'a mut C,
    pub(super) bus_number: u8,
    pub(super) device_number: u8,
    pub(super) vendor_id: u16,
}

impl<C: ConfigSpace + ?Sized> PciDevice<'_, C> {
    pub fn bus_number(&self) -> u8 {
        self.bus_number
    }

    pub fn device_number(&self) -> u8 {
        self.device_number
    }

    pub fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    pub fn device_id(&mut self) -> u16 {
        self.pci
            .read_u16(self.bus_number, self.device_number, 0, 0x2)
    }

    pub fn class_code(&mut self) -> u8 {
        (self
            .pci
            .read_u16(self.bus_number, self.device_number, 0, 0xA)
            >> 8) as u8
    }

    pub fn sub_class(&mut self) -> u8 {
        self.pci
            .read_u16(self.bus_number, self.device_number, 0, 0xA) as u8
    }

    pub fn header_type_byte(&mut self) -> HeaderTypeByte {
        HeaderTypeByte(
            self.pci
                .read_u16(self.bus_number, self.device_number, 0, 0xE) as u8,
        )
    }

    /// Returns `None` if the header type is not known
    pub fn header_type(&mut self) -> Option<HeaderType> {
        self.header_type_byte().header_type().try_into().ok()
    }

    /// Reads everything [`PciDeviceInfo`] holds.
    pub fn info(&mut self) -> PciDeviceInfo {
        let header_type_byte = self.header_type_byte();
        PciDeviceInfo {
            bus_number: self.bus_number,
            device_number: self.device_number,
            vendor_id: self.vendor_id,
            device_id: self.device_id(),
            class_code: self.class_code(),
            sub_class: self.sub_class(),
            header_type: header_type_byte.header_type().try_into().ok(),
            multi_function: header_type_byte.multi_function(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PciDeviceInfo {
    pub bus_number: u8,
    pub device_number: u8,
    pub vendor_id: u16,
    pub device_id: u16,
    pub class_code: u8,
    pub sub_class: u8,
    /// `None` if the header type is not known
    pub header_type: Option<HeaderType>,
    pub multi_function: bool,
}

impl PciDeviceInfo {
    /// The supported chipset with these IDs, if any.
    pub fn chipset(&self) -> Option<&'static ChipsetDescriptor> {
        lookup(self.vendor_id, self.device_id)
    }
}

impl Display for PciDeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PCI Device {:02x}:{:02x}.0 - VEN_{:04x}&DEV_{:04x} class {:02x}:{:02x}",
            self.bus_number,
            self.device_number,
            self.vendor_id,
            self.device_id,
            self.class_code,
            self.sub_class
        )?;
        if let Some(chipset) = self.chipset() {
            write!(f, " ({})", chipset.name)?;
        }
        Ok(())
    }
}
