//! Finds a supported ISA bridge on the PCI bus and sets its ISA I/O recovery time, the extra
//! clocks inserted after 8-bit and 16-bit ISA I/O cycles.
//!
//! To use configuration mechanism #1, use [`PciAccess::new_pci`].
//! To use PCIe ECAM, use [`PciAccess::new_pcie`].
//! Anything else can implement [`ConfigSpace`].
//!
//! Then call [`apply`], or [`discover`] and [`Discovery::apply`] to look at the register before
//! changing it, or [`find_supported_device`] and the [`DeviceHandle`] methods yourself.
//!
//! Supported chipsets are listed in [`SUPPORTED_CHIPSETS`].
#![no_std]
mod bus;
mod device;
mod ecam;
mod error;
mod pci_access;
mod pci_config;
mod piix;
mod recovery;
mod registry;
mod session;
mod sis;

pub use bus::*;
pub use device::*;
pub use ecam::*;
pub use error::*;
pub use pci_access::*;
use pci_config::*;
pub use piix::*;
pub use recovery::*;
pub use registry::*;
pub use session::*;
pub use sis::*;
