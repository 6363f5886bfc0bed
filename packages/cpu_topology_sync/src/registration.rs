use crate::{ControllerId, ProcessorHandle, ProcessorIdentifier, RegistrationStatus};

/// Arguments of one call to the host's processor registration routine
/// (`ml_processor_register` in XNU).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Registration {
    identifier: ProcessorIdentifier,
    controller_id: ControllerId,
    boot: bool,
    start: bool,
}

impl Registration {
    /// Describes a registration.
    ///
    /// `boot` marks the processor the system booted on. `start` asks the host to start the
    /// processor immediately; without it the registration is purely administrative.
    #[must_use]
    pub const fn new(
        identifier: ProcessorIdentifier,
        controller_id: ControllerId,
        boot: bool,
        start: bool,
    ) -> Self {
        Self {
            identifier,
            controller_id,
            boot,
            start,
        }
    }

    /// The sibling thread of this registration's efficiency core: the next controller ID,
    /// registered under `identifier` as neither boot processor nor started.
    ///
    /// Returns `None` if the controller ID has no successor.
    #[must_use]
    pub fn sibling(&self, identifier: ProcessorIdentifier) -> Option<Self> {
        Some(Self {
            identifier,
            controller_id: self.controller_id.checked_add(1)?,
            boot: false,
            start: false,
        })
    }

    /// Opaque identifier of the processor being registered.
    #[must_use]
    pub const fn identifier(&self) -> ProcessorIdentifier {
        self.identifier
    }

    /// Local interrupt controller ID of the processor being registered.
    #[must_use]
    pub const fn controller_id(&self) -> ControllerId {
        self.controller_id
    }

    /// Whether this is the processor the system booted on.
    #[must_use]
    pub const fn is_boot(&self) -> bool {
        self.boot
    }

    /// Whether the host is asked to start the processor right away.
    #[must_use]
    pub const fn is_start(&self) -> bool {
        self.start
    }
}

/// What the host's registration routine reported back.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct RegistrationOutcome {
    status: RegistrationStatus,
    processor: Option<ProcessorHandle>,
}

impl RegistrationOutcome {
    /// An outcome with the given status and handle (if the host wrote one).
    #[must_use]
    pub const fn new(status: RegistrationStatus, processor: Option<ProcessorHandle>) -> Self {
        Self { status, processor }
    }

    /// A successful registration that produced `processor`.
    #[must_use]
    pub const fn registered(processor: ProcessorHandle) -> Self {
        Self::new(RegistrationStatus::SUCCESS, Some(processor))
    }

    /// A failed registration.
    #[must_use]
    pub const fn failed(status: RegistrationStatus) -> Self {
        Self::new(status, None)
    }

    /// Status returned by the host.
    #[must_use]
    pub const fn status(&self) -> RegistrationStatus {
        self.status
    }

    /// Handle written to the output slot by the host, if any.
    #[must_use]
    pub const fn processor(&self) -> Option<ProcessorHandle> {
        self.processor
    }
}

/// A processor registration routine.
///
/// The interceptor receives the original (un-routed) routine in this form and uses it both to
/// forward the caller's registration and to register synthetic siblings.
#[cfg_attr(test, mockall::automock)]
pub trait Registrar {
    /// Registers a processor with the host.
    fn register(&self, registration: Registration) -> RegistrationOutcome;
}
