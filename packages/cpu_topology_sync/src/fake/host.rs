//! Fakes of the host-provided collaborators.

use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::fake::FakePlatform;
use crate::{
    ControllerId, EntryPoint, HostingService, InterceptionRegistry, ProcessorHandle, Provider,
    Registrar, Registration, RegistrationOutcome, RegistrationStatus,
};

/// Address returned by [`FakeRegistry`] as the original routine.
pub const FAKE_ORIGINAL_ENTRY_POINT: usize = 0x3000;

/// Base address of the handles returned by [`FakeRegistrar`]. The low bits hold the position of
/// the one-based position of the registration in the call order.
pub const FAKE_HANDLE_BASE: usize = 0x10_0000;

/// The kernel's registration routine.
///
/// Records every registration and advances the running processor count of its
/// [`FakePlatform`] for each one that succeeds, like the real kernel does.
#[derive(Debug)]
pub struct FakeRegistrar {
    platform: Arc<FakePlatform>,
    rejected_controllers: Vec<ControllerId>,
    registrations: Mutex<Vec<Registration>>,
}

impl FakeRegistrar {
    /// A routine that accepts every registration.
    #[must_use]
    pub fn new(platform: Arc<FakePlatform>) -> Self {
        Self {
            platform,
            rejected_controllers: Vec::new(),
            registrations: Mutex::new(Vec::new()),
        }
    }

    /// Fails every registration for `controller_id` with [`RegistrationStatus::FAILURE`].
    #[must_use]
    pub fn rejecting(mut self, controller_id: ControllerId) -> Self {
        self.rejected_controllers.push(controller_id);
        self
    }

    /// Every registration received so far, accepted or not, in call order.
    ///
    /// # Panics
    ///
    /// Panics if a previous registration panicked while recording.
    #[must_use]
    pub fn registrations(&self) -> Vec<Registration> {
        self.registrations
            .lock()
            .expect("registration log lock poisoned")
            .clone()
    }
}

impl Registrar for FakeRegistrar {
    #[cfg_attr(test, mutants::skip)] // False positive due to no-op mutation from | to ^.
    fn register(&self, registration: Registration) -> RegistrationOutcome {
        let sequence = {
            let mut registrations = self
                .registrations
                .lock()
                .expect("registration log lock poisoned");

            registrations.push(registration);
            registrations.len()
        };

        if self
            .rejected_controllers
            .contains(&registration.controller_id())
        {
            return RegistrationOutcome::failed(RegistrationStatus::FAILURE);
        }

        self.platform.advance_running_count();

        RegistrationOutcome::registered(ProcessorHandle::from_address(
            FAKE_HANDLE_BASE | sequence,
        ))
    }
}

/// The host's patch engine.
#[derive(Debug)]
pub struct FakeRegistry {
    original: Option<EntryPoint>,
    routes: Mutex<Vec<(EntryPoint, EntryPoint)>>,
    cleared: AtomicUsize,
}

impl FakeRegistry {
    /// A patch engine that routes successfully, reporting
    /// [`FAKE_ORIGINAL_ENTRY_POINT`] as the original routine.
    #[must_use]
    pub fn new() -> Self {
        Self {
            original: EntryPoint::from_address(FAKE_ORIGINAL_ENTRY_POINT),
            routes: Mutex::new(Vec::new()),
            cleared: AtomicUsize::new(0),
        }
    }

    /// A patch engine that fails every routing attempt.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            original: None,
            ..Self::new()
        }
    }

    /// Every `(target, wrapper)` routing request received so far.
    ///
    /// # Panics
    ///
    /// Panics if a previous routing request panicked while recording.
    #[must_use]
    pub fn routes(&self) -> Vec<(EntryPoint, EntryPoint)> {
        self.routes.lock().expect("route log lock poisoned").clone()
    }

    /// How many times the error state was cleared.
    #[must_use]
    pub fn clear_count(&self) -> usize {
        self.cleared.load(Ordering::Relaxed)
    }
}

impl Default for FakeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InterceptionRegistry for FakeRegistry {
    fn route_function(&self, target: EntryPoint, wrapper: EntryPoint) -> Option<EntryPoint> {
        self.routes
            .lock()
            .expect("route log lock poisoned")
            .push((target, wrapper));

        self.original
    }

    fn clear_error(&self) {
        self.cleared.fetch_add(1, Ordering::Relaxed);
    }
}

/// The provider presented to the probe callback.
#[derive(Clone, Copy, Debug)]
pub struct FakeProvider {
    processor_index: Option<u32>,
}

impl FakeProvider {
    /// A provider whose `processor-index` property is `index`.
    #[must_use]
    pub const fn with_processor_index(index: u32) -> Self {
        Self {
            processor_index: Some(index),
        }
    }

    /// A provider without a (numeric) `processor-index` property.
    #[must_use]
    pub const fn without_processor_index() -> Self {
        Self {
            processor_index: None,
        }
    }
}

impl Provider for FakeProvider {
    fn processor_index(&self) -> Option<u32> {
        self.processor_index
    }
}

/// The hosting service, remembering every property published on it.
#[derive(Debug, Default)]
pub struct FakeHostingService {
    properties: Mutex<Vec<(String, String)>>,
}

impl FakeHostingService {
    /// A service without properties.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The last value published for `key`, if any.
    ///
    /// # Panics
    ///
    /// Panics if a previous publication panicked while recording.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<String> {
        self.properties
            .lock()
            .expect("property lock poisoned")
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
}

impl HostingService for FakeHostingService {
    fn set_property(&self, key: &str, value: &str) {
        self.properties
            .lock()
            .expect("property lock poisoned")
            .push((key.to_owned(), value.to_owned()));
    }
}
