use bitfield::bitfield;

bitfield! {
  /// Value written to 0xCF8 to select a dword for configuration mechanism #1.
  pub(super) struct PciConfig(u32);
  impl Debug;
  pub enable, set_enable: 31;
  u8; pub bus_number, set_bus_number: 23, 16;
  u8; pub device_number, set_device_number: 15, 11;
  u8; pub function_number, set_function_number: 10, 8;
  u8; pub register_offset, set_register_offset: 7, 0;
}

impl PciConfig {
    /// The enable bit with everything else zeroed, which is what the self test writes.
    pub(super) const ENABLE_ONLY: u32 = 1 << 31;

    pub(super) fn new(
        bus_number: u8,
        device_number: u8,
        function_number: u8,
        register_offset: u8,
    ) -> Self {
        let mut address = PciConfig(0);
        address.set_enable(true);
        address.set_bus_number(bus_number);
        address.set_device_number(device_number);
        address.set_function_number(function_number);
        address.set_register_offset(register_offset & !0b11);
        address
    }
}
