use log::info;

use super::*;

/// What happened to one width during [`apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidthOutcome {
    /// The request was [`RecoveryRequest::Unchanged`] and the register was not touched for it.
    Unchanged,
    Applied,
    /// The chipset rejected the value. Its bits were left as they were.
    Failed(Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub device: DeviceHandle,
    pub before: RecoverySnapshot,
    pub after: RecoverySnapshot,
    pub outcome_8: WidthOutcome,
    pub outcome_16: WidthOutcome,
}

impl Session {
    pub fn outcome(&self, width: Width) -> &WidthOutcome {
        match width {
            Width::Bits8 => &self.outcome_8,
            Width::Bits16 => &self.outcome_16,
        }
    }

    /// `false` if either width was rejected by the chipset.
    pub fn is_complete(&self) -> bool {
        !matches!(self.outcome_8, WidthOutcome::Failed(_))
            && !matches!(self.outcome_16, WidthOutcome::Failed(_))
    }
}

fn apply_width<C: ConfigSpace + ?Sized>(
    pci: &mut C,
    device: &DeviceHandle,
    width: Width,
    request: RecoveryRequest,
) -> WidthOutcome {
    let Some(cycles) = request.cycles() else {
        info!("Leaving {width} I/O recovery unchanged.");
        return WidthOutcome::Unchanged;
    };
    match device.set_recovery(pci, width, cycles) {
        Ok(()) => WidthOutcome::Applied,
        Err(error) => WidthOutcome::Failed(error),
    }
}

/// A supported chipset and its register contents before anything was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub device: DeviceHandle,
    pub before: RecoverySnapshot,
}

impl Discovery {
    /// Applies both requests to the discovered chipset.
    ///
    /// A width the chipset rejects is reported in [`Session`] and does not stop the other width.
    /// Nothing is rolled back.
    pub fn apply<C: ConfigSpace + ?Sized>(
        self,
        pci: &mut C,
        request_8: RecoveryRequest,
        request_16: RecoveryRequest,
    ) -> Result<Session> {
        let request_8 = request_8.check(Width::Bits8)?;
        let request_16 = request_16.check(Width::Bits16)?;
        let Self { device, before } = self;

        let outcome_8 = apply_width(pci, &device, Width::Bits8, request_8);
        let outcome_16 = apply_width(pci, &device, Width::Bits16, request_16);

        let after = device.describe(pci);
        info!("New values: {after}");
        Ok(Session {
            device,
            before,
            after,
            outcome_8,
            outcome_16,
        })
    }
}

/// Runs the access self test, finds the first supported chipset and reads its register.
/// Writes nothing.
pub fn discover<C: ConfigSpace + ?Sized>(pci: &mut C) -> Result<Discovery> {
    pci.self_test()?;
    let device = find_supported_device(pci).ok_or(Error::NotFound)?;
    let before = device.describe(pci);
    info!("Current values: {before}");
    Ok(Discovery { device, before })
}

/// [`discover`] followed by [`Discovery::apply`].
///
/// Out of range requests are rejected before the access mechanism is touched. Otherwise this
/// fails only if the self test fails or no supported chipset exists.
pub fn apply<C: ConfigSpace + ?Sized>(
    pci: &mut C,
    request_8: RecoveryRequest,
    request_16: RecoveryRequest,
) -> Result<Session> {
    let request_8 = request_8.check(Width::Bits8)?;
    let request_16 = request_16.check(Width::Bits16)?;
    discover(pci)?.apply(pci, request_8, request_16)
}
