use core::sync::atomic::{AtomicBool, Ordering};
#[cfg(any(test, feature = "test-util"))]
use std::sync::Arc;

use spin::Once;
use tracing::debug;

use crate::config::DebugOptions;
use crate::error::{Error, Result, halt};
#[cfg(any(test, feature = "test-util"))]
use crate::fake::FakePlatform;
use crate::interception::{self, HookBinding, InterceptionRegistry};
use crate::pal::{Platform, PlatformFacade};
use crate::{
    DEFAULT_POOL_CAPACITY, EntryPoint, HostingService, HybridDecision, IdentifierPool,
    ProcessorIdentifier, Provider, Registrar, Registration, RegistrationOutcome, TopologyCounts,
    VERSION, VERSION_PROPERTY,
};

/// What a call to [`TopologySync::probe()`] did.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ProbeOutcome {
    /// The probe was not for processor 0, so it was ignored.
    NotBootProcessor,

    /// An earlier probe already classified the topology.
    AlreadyProbed,

    /// The counters describe a topology that needs no correction. Nothing was installed.
    Inert(TopologyCounts),

    /// The counters describe a hybrid topology and the registration interceptor is installed.
    Active(HybridDecision),
}

impl ProbeOutcome {
    /// Whether this probe activated topology correction. The hosting service should only claim
    /// the provider if so.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }
}

/// Topology correction state for one boot session.
///
/// The host drives it through two entry points:
///
/// 1. [`probe()`][Self::probe] from the hosting service's probe callback, once per candidate
///    processor. The first probe for processor 0 reads the core/thread counters and, if the
///    processor is hybrid, routes the kernel's registration routine through an interceptor.
/// 2. [`intercept()`][Self::intercept] from that interceptor, once per processor
///    registration. It forwards the registration and, once the running processor count has
///    passed the start of the efficiency cores, registers a disabled sibling thread for each
///    qualifying registration so the processor count matches the ACPI topology table.
///
/// Both run inside the kernel's serialized processor bring-up, so nothing here blocks. The
/// value must not move once an identifier has been handed out, which is why it is normally
/// kept in a `static`.
#[derive(Debug)]
pub struct TopologySync<const POOL_CAPACITY: usize = DEFAULT_POOL_CAPACITY> {
    pal: PlatformFacade,

    // One-shot gate, set by the first probe of processor 0.
    probed: AtomicBool,

    debug_options: Once<DebugOptions>,
    counts: Once<TopologyCounts>,
    decision: Once<HybridDecision>,
    binding: Once<HookBinding>,

    pool: IdentifierPool<POOL_CAPACITY>,

    // Set while a synthetic sibling is being registered.
    appending_sibling: AtomicBool,
}

impl<const POOL_CAPACITY: usize> TopologySync<POOL_CAPACITY> {
    /// Creates the state for a new boot session on the build target platform.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_platform(PlatformFacade::target())
    }

    /// Creates the state for a boot session on a fake platform.
    #[cfg(any(test, feature = "test-util"))]
    #[must_use]
    pub fn fake(platform: Arc<FakePlatform>) -> Self {
        Self::with_platform(PlatformFacade::Fake(platform))
    }

    pub(crate) const fn with_platform(pal: PlatformFacade) -> Self {
        Self {
            pal,
            probed: AtomicBool::new(false),
            debug_options: Once::new(),
            counts: Once::new(),
            decision: Once::new(),
            binding: Once::new(),
            pool: IdentifierPool::new(),
            appending_sibling: AtomicBool::new(false),
        }
    }

    /// Handles a probe of the hosting service for one candidate processor.
    ///
    /// Only the first probe for processor 0 does anything. It classifies the counters and, for a
    /// hybrid topology, routes the registration routine through `interceptor` and publishes
    /// [`VERSION`] as the [`VERSION_PROPERTY`] of `service`.
    ///
    /// # Panics
    ///
    /// Halts if the topology needs correction but the interceptor cannot be installed. Booting
    /// on would leave the processor count permanently inconsistent.
    pub fn probe(
        &self,
        provider: &impl Provider,
        service: &impl HostingService,
        registry: &impl InterceptionRegistry,
        interceptor: EntryPoint,
    ) -> ProbeOutcome {
        self.try_probe(provider, service, registry, interceptor)
            .unwrap_or_else(|error| halt(&error))
    }

    pub(crate) fn try_probe(
        &self,
        provider: &impl Provider,
        service: &impl HostingService,
        registry: &impl InterceptionRegistry,
        interceptor: EntryPoint,
    ) -> Result<ProbeOutcome> {
        if provider.processor_index() != Some(0) {
            return Ok(ProbeOutcome::NotBootProcessor);
        }

        if self.probed.swap(true, Ordering::AcqRel) {
            return Ok(ProbeOutcome::AlreadyProbed);
        }

        let options = *self.debug_options.call_once(|| {
            DebugOptions::from_boot_args(self.pal.boot_args().unwrap_or_default())
        });

        debug!(
            verbose = options.is_verbose(),
            print_delay_micros = options.print_delay_micros(),
            "parsed debug options"
        );

        let counts = *self.counts.call_once(|| {
            TopologyCounts::from_register_value(self.pal.read_core_thread_count())
        });

        debug!(
            thread_count = counts.thread_count(),
            core_count = counts.core_count(),
            "read core and thread counts"
        );

        let Some(decision) = HybridDecision::classify(counts) else {
            debug!("topology needs no correction");
            return Ok(ProbeOutcome::Inert(counts));
        };

        debug!(
            efficient_core_count = decision.efficient_core_count(),
            efficient_core_start = decision.efficient_core_start(),
            "hybrid topology needs correction"
        );

        self.decision.call_once(|| decision);

        let target = self
            .pal
            .registration_entry_point()
            .ok_or(Error::EntryPointUnresolved)?;

        let binding = interception::install(registry, target, interceptor)?;
        self.binding.call_once(|| binding);

        service.set_property(VERSION_PROPERTY, VERSION);

        Ok(ProbeOutcome::Active(decision))
    }

    /// Handles one call of the routed registration routine.
    ///
    /// The registration is always forwarded to `original` unchanged and its outcome is what we
    /// return. If the registration succeeded, is not a start request and the running processor
    /// count is past the start of the efficiency cores, the sibling thread (next controller ID)
    /// is additionally registered through `original` with a fresh synthetic identifier, as
    /// neither boot processor nor started. The caller never sees that second registration.
    ///
    /// # Panics
    ///
    /// Halts if a sibling registration fails, if the identifier pool is exhausted or if the
    /// controller ID has no successor. Any of these means the topology is not what we expect.
    pub fn intercept(
        &self,
        original: &impl Registrar,
        registration: Registration,
    ) -> RegistrationOutcome {
        let outcome = original.register(registration);

        debug!(
            controller_id = registration.controller_id(),
            start = registration.is_start(),
            status = %outcome.status(),
            "forwarded processor registration"
        );

        if let Err(error) = self.append_sibling(original, registration, outcome) {
            halt(&error);
        }

        outcome
    }

    /// Registers the synthetic sibling of `registration` if it qualifies, returning the
    /// identifier used.
    pub(crate) fn append_sibling(
        &self,
        original: &impl Registrar,
        registration: Registration,
        outcome: RegistrationOutcome,
    ) -> Result<Option<ProcessorIdentifier>> {
        // A sibling registration that is routed back to us must not append a sibling of its own.
        if self.appending_sibling.load(Ordering::Acquire) {
            return Ok(None);
        }

        let Some(decision) = self.decision.get() else {
            return Ok(None);
        };

        if !outcome.status().is_success() || registration.is_start() {
            return Ok(None);
        }

        let running = self.pal.running_processor_count();

        if running <= decision.efficient_core_start() {
            return Ok(None);
        }

        let pending = self.pool.claim()?;

        let sibling =
            registration
                .sibling(pending.identifier())
                .ok_or(Error::ControllerIdOverflow {
                    controller_id: registration.controller_id(),
                })?;

        debug!(
            controller_id = sibling.controller_id(),
            running, "registering synthetic sibling"
        );

        self.appending_sibling.store(true, Ordering::Release);
        let sibling_outcome = original.register(sibling);
        self.appending_sibling.store(false, Ordering::Release);

        if !sibling_outcome.status().is_success() {
            return Err(Error::SyntheticRegistrationFailed {
                controller_id: sibling.controller_id(),
                status: sibling_outcome.status(),
            });
        }

        Ok(Some(pending.commit()))
    }

    /// Debug options parsed by the first probe, if it has happened.
    #[must_use]
    pub fn debug_options(&self) -> Option<DebugOptions> {
        self.debug_options.get().copied()
    }

    /// Counters read by the first probe, if it has happened.
    #[must_use]
    pub fn topology_counts(&self) -> Option<TopologyCounts> {
        self.counts.get().copied()
    }

    /// The hybrid topology classification, if the counters called for correction.
    #[must_use]
    pub fn decision(&self) -> Option<HybridDecision> {
        self.decision.get().copied()
    }

    /// The installed redirection of the registration routine, if correction is active.
    #[must_use]
    pub fn hook_binding(&self) -> Option<HookBinding> {
        self.binding.get().copied()
    }

    /// The identifiers reserved for synthetic registrations.
    #[must_use]
    pub fn identifier_pool(&self) -> &IdentifierPool<POOL_CAPACITY> {
        &self.pool
    }

    /// Whether `identifier` belongs to a synthetic registration made by this session.
    #[must_use]
    pub fn is_synthetic(&self, identifier: ProcessorIdentifier) -> bool {
        self.pool.contains(identifier)
    }
}

impl<const POOL_CAPACITY: usize> Default for TopologySync<POOL_CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}
