use core::{ops::RangeInclusive, ptr::NonNull};

use volatile::VolatilePtr;
use x86_64::instructions::port::Port;

use super::*;

/// Highest bus number reachable through configuration mechanism #1.
pub const BUS_MAX: u8 = 255;
/// Highest device (slot) number on a bus.
pub const SLOT_MAX: u8 = 31;

/// Raw access to PCI configuration space.
///
/// Implementors only need dword access. The narrower accessors read the containing aligned dword,
/// and narrower writes read-modify-write it.
///
/// Nothing here is synchronized. Whoever owns the implementor must be the only one touching
/// configuration space for as long as they hold it.
pub trait ConfigSpace {
    fn read_u32(
        &mut self,
        bus_number: u8,
        device_number: u8,
        function_number: u8,
        register_offset: u8,
    ) -> u32;

    fn write_u32(
        &mut self,
        bus_number: u8,
        device_number: u8,
        function_number: u8,
        register_offset: u8,
        value: u32,
    );

    /// Buses that can be addressed at all.
    fn known_buses(&self) -> RangeInclusive<u8> {
        0..=BUS_MAX
    }

    /// Checks that the access mechanism responds before anything is enumerated.
    fn self_test(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_u16(
        &mut self,
        bus_number: u8,
        device_number: u8,
        function_number: u8,
        register_offset: u8,
    ) -> u16 {
        assert!(
            register_offset.is_multiple_of(size_of::<u16>() as u8),
            "Register offset represents bytes and should be aligned to u16"
        );
        let dword = self.read_u32(
            bus_number,
            device_number,
            function_number,
            register_offset & !0b11,
        );
        (dword >> bit_index_within_u32(register_offset)) as u16
    }

    fn write_u16(
        &mut self,
        bus_number: u8,
        device_number: u8,
        function_number: u8,
        register_offset: u8,
        value: u16,
    ) {
        assert!(
            register_offset.is_multiple_of(size_of::<u16>() as u8),
            "Register offset represents bytes and should be aligned to u16"
        );
        let register_offset_u32 = register_offset & !0b11;
        let reg = self.read_u32(
            bus_number,
            device_number,
            function_number,
            register_offset_u32,
        );
        let bit_index = bit_index_within_u32(register_offset);
        let change_mask = (u16::MAX as u32) << bit_index;
        self.write_u32(
            bus_number,
            device_number,
            function_number,
            register_offset_u32,
            (reg & !change_mask) | ((value as u32) << bit_index),
        );
    }

    fn read_u8(
        &mut self,
        bus_number: u8,
        device_number: u8,
        function_number: u8,
        register_offset: u8,
    ) -> u8 {
        let dword = self.read_u32(
            bus_number,
            device_number,
            function_number,
            register_offset & !0b11,
        );
        (dword >> bit_index_within_u32(register_offset)) as u8
    }

    fn write_u8(
        &mut self,
        bus_number: u8,
        device_number: u8,
        function_number: u8,
        register_offset: u8,
        value: u8,
    ) {
        let register_offset_u32 = register_offset & !0b11;
        let reg = self.read_u32(
            bus_number,
            device_number,
            function_number,
            register_offset_u32,
        );
        let bit_index = bit_index_within_u32(register_offset);
        let change_mask = (u8::MAX as u32) << bit_index;
        self.write_u32(
            bus_number,
            device_number,
            function_number,
            register_offset_u32,
            (reg & !change_mask) | ((value as u32) << bit_index),
        );
    }

    fn bus(&mut self, bus_number: u8) -> PciBus<'_, Self> {
        PciBus {
            pci: self,
            bus_number,
        }
    }
}

fn bit_index_within_u32(register_offset: u8) -> u32 {
    (register_offset % size_of::<u32>() as u8) as u32 * u8::BITS
}

#[derive(Debug)]
pub struct Pci {
    config_address: Port<u32>,
    config_data: Port<u32>,
    /// 0xCFB, the byte just above the address register. Only used by the self test.
    config_mechanism: Port<u8>,
}

#[derive(Debug)]
pub struct Pcie {
    window: EcamWindow,
    mapped_mem: NonNull<[u8]>,
}

#[derive(Debug)]
pub enum PciAccess {
    Pci(Pci),
    Pcie(Pcie),
}

impl PciAccess {
    /// # Safety
    /// The ports must be PCI and not used by other code.
    /// The caller must have I/O privilege for ports 0xCF8 through 0xCFF.
    pub unsafe fn new_pci() -> Self {
        Self::Pci(Pci {
            config_address: Port::<u32>::new(0xCF8),
            config_data: Port::<u32>::new(0xCFC),
            config_mechanism: Port::<u8>::new(0xCFB),
        })
    }

    /// # Safety
    /// The mapped mem must point to physical memory for the ECAM window, which you can calculate
    /// using [`EcamWindow::phys_range_to_map`], and must be at least as long as that range.
    pub unsafe fn new_pcie(window: EcamWindow, mapped_mem: NonNull<[u8]>) -> Self {
        assert!(
            mapped_mem.len() as u64 >= window.len(),
            "Mapped memory is smaller than the ECAM window"
        );
        Self::Pcie(Pcie { window, mapped_mem })
    }
}

impl Pcie {
    fn register(
        &self,
        bus_number: u8,
        device_number: u8,
        function_number: u8,
        register_offset: u8,
    ) -> VolatilePtr<'_, u32> {
        assert!(
            self.window.buses.contains(&bus_number),
            "Bus {bus_number} is outside the ECAM window"
        );
        let bus_offset = bus_number - self.window.buses.start();
        let byte_offset = (bus_offset as usize) << 20
            | (device_number as usize) << 15
            | (function_number as usize) << 12
            | register_offset as usize;
        // Safety: the window check above keeps the offset inside the mapping handed to `new_pcie`
        unsafe {
            VolatilePtr::new(
                self.mapped_mem
                    .cast::<u8>()
                    .add(byte_offset)
                    .cast::<u32>(),
            )
        }
    }
}

impl ConfigSpace for PciAccess {
    fn read_u32(
        &mut self,
        bus_number: u8,
        device_number: u8,
        function_number: u8,
        register_offset: u8,
    ) -> u32 {
        assert!(
            register_offset.is_multiple_of(size_of::<u32>() as u8),
            "Register offset represents bytes and should be aligned to u32"
        );
        match self {
            Self::Pci(pci) => {
                let address = PciConfig::new(
                    bus_number,
                    device_number,
                    function_number,
                    register_offset,
                );
                unsafe { pci.config_address.write(address.0) };
                unsafe { pci.config_data.read() }
            }
            Self::Pcie(pcie) => u32::from_le(
                pcie.register(bus_number, device_number, function_number, register_offset)
                    .read(),
            ),
        }
    }

    fn write_u32(
        &mut self,
        bus_number: u8,
        device_number: u8,
        function_number: u8,
        register_offset: u8,
        value: u32,
    ) {
        assert!(
            register_offset.is_multiple_of(size_of::<u32>() as u8),
            "Register offset represents bytes and should be aligned to u32"
        );
        match self {
            Self::Pci(pci) => {
                let address = PciConfig::new(
                    bus_number,
                    device_number,
                    function_number,
                    register_offset,
                );
                unsafe { pci.config_address.write(address.0) };
                unsafe { pci.config_data.write(value) }
            }
            Self::Pcie(pcie) => pcie
                .register(bus_number, device_number, function_number, register_offset)
                .write(value.to_le()),
        }
    }

    fn known_buses(&self) -> RangeInclusive<u8> {
        match self {
            Self::Pci(_) => 0..=BUS_MAX,
            Self::Pcie(pcie) => pcie.window.buses.clone(),
        }
    }

    /// Same probe Linux uses for configuration mechanism #1.
    /// The ECAM window has nothing to probe.
    fn self_test(&mut self) -> Result<()> {
        match self {
            Self::Pci(pci) => {
                let observed = unsafe {
                    pci.config_mechanism.write(0x01);
                    let saved = pci.config_address.read();
                    pci.config_address.write(PciConfig::ENABLE_ONLY);
                    let observed = pci.config_address.read();
                    pci.config_address.write(saved);
                    observed
                };
                check_self_test_readback(observed)
            }
            Self::Pcie(_) => Ok(()),
        }
    }
}

fn check_self_test_readback(observed: u32) -> Result<()> {
    if observed == PciConfig::ENABLE_ONLY {
        Ok(())
    } else {
        Err(Error::AccessSelfTest { observed })
    }
}
