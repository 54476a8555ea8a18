#![allow(dead_code)]

use std::collections::BTreeMap;

use isawait::{ConfigSpace, Error};

/// Configuration space of a fake machine. Absent functions read as all ones and ignore writes.
#[derive(Default)]
pub struct SimulatedConfigSpace {
    functions: BTreeMap<(u8, u8, u8), [u8; 256]>,
    /// Every 16-bit read, as (bus, device, function, offset).
    pub u16_reads: Vec<(u8, u8, u8, u8)>,
    pub dword_writes: usize,
    pub fail_self_test: bool,
    pub self_test_calls: usize,
}

impl SimulatedConfigSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts a function 0 device with the given IDs at `bus`:`device`.
    pub fn with_device(mut self, bus: u8, device: u8, vendor_id: u16, device_id: u16) -> Self {
        let mut space = [0u8; 256];
        space[0..2].copy_from_slice(&vendor_id.to_le_bytes());
        space[2..4].copy_from_slice(&device_id.to_le_bytes());
        self.functions.insert((bus, device, 0), space);
        self
    }

    pub fn set_byte(&mut self, bus: u8, device: u8, offset: u8, value: u8) {
        self.functions
            .get_mut(&(bus, device, 0))
            .expect("no device there")[offset as usize] = value;
    }

    pub fn byte(&self, bus: u8, device: u8, offset: u8) -> u8 {
        self.functions[&(bus, device, 0)][offset as usize]
    }

    /// Number of 16-bit reads at `offset` of any function.
    pub fn u16_reads_at(&self, offset: u8) -> usize {
        self.u16_reads.iter().filter(|read| read.3 == offset).count()
    }
}

impl ConfigSpace for SimulatedConfigSpace {
    fn read_u32(
        &mut self,
        bus_number: u8,
        device_number: u8,
        function_number: u8,
        register_offset: u8,
    ) -> u32 {
        assert_eq!(register_offset % 4, 0);
        match self
            .functions
            .get(&(bus_number, device_number, function_number))
        {
            Some(space) => {
                let offset = register_offset as usize;
                u32::from_le_bytes(space[offset..offset + 4].try_into().unwrap())
            }
            None => u32::MAX,
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
        assert_eq!(register_offset % 4, 0);
        self.dword_writes += 1;
        if let Some(space) = self
            .functions
            .get_mut(&(bus_number, device_number, function_number))
        {
            let offset = register_offset as usize;
            space[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        }
    }

    fn self_test(&mut self) -> Result<(), Error> {
        self.self_test_calls += 1;
        if self.fail_self_test {
            Err(Error::AccessSelfTest { observed: 0 })
        } else {
            Ok(())
        }
    }

    fn read_u16(
        &mut self,
        bus_number: u8,
        device_number: u8,
        function_number: u8,
        register_offset: u8,
    ) -> u16 {
        self.u16_reads
            .push((bus_number, device_number, function_number, register_offset));
        let dword = self.read_u32(
            bus_number,
            device_number,
            function_number,
            register_offset & !0b11,
        );
        (dword >> ((register_offset % 4) * 8)) as u16
    }
}
