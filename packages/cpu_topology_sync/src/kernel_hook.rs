//! Glue between the XNU kernel and the topology correction session of this boot.
//!
//! The hosting framework calls [`probe()`] from its probe callback. If the processor is hybrid,
//! the kernel's `ml_processor_register` is routed to [`ml_processor_register_hook`], which hands
//! every registration to [`TOPOLOGY_SYNC`].

use core::ffi::{c_int, c_void};
use core::{mem, ptr};

use crate::pal::{FALSE, RegisterProcessorFn, TRUE};
use crate::{
    EntryPoint, HostingService, InterceptionRegistry, ProbeOutcome, ProcessorHandle,
    ProcessorIdentifier, Provider, Registrar, Registration, RegistrationOutcome,
    RegistrationStatus, TopologySync,
};

/// The topology correction session of this boot.
pub static TOPOLOGY_SYNC: TopologySync = TopologySync::new();

/// Handles a probe of the hosting service, activating topology correction if needed.
///
/// The hosting service should only claim the provider if the outcome
/// [is active][ProbeOutcome::is_active].
///
/// # Panics
///
/// Halts if the topology needs correction but the registration routine cannot be routed.
pub fn probe(
    provider: &impl Provider,
    service: &impl HostingService,
    registry: &impl InterceptionRegistry,
) -> ProbeOutcome {
    let hook: RegisterProcessorFn = ml_processor_register_hook;

    #[expect(
        clippy::fn_to_numeric_cast_any,
        reason = "the interception registry works with raw addresses"
    )]
    let address = hook as usize;

    let Some(interceptor) = EntryPoint::from_address(address) else {
        // A function never lives at address zero.
        unreachable!("interceptor has a null address");
    };

    TOPOLOGY_SYNC.probe(provider, service, registry, interceptor)
}

/// Replacement for `ml_processor_register` once correction is active.
///
/// # Safety
///
/// Must only be called by the kernel in place of `ml_processor_register`, with the arguments it
/// would pass to the original.
#[cfg_attr(coverage_nightly, coverage(off))]
pub unsafe extern "C" fn ml_processor_register_hook(
    cpu_id: *mut c_void,
    lapic_id: u32,
    processor_out: *mut *mut c_void,
    boot_cpu: c_int,
    start: c_int,
) -> c_int {
    let Some(binding) = TOPOLOGY_SYNC.hook_binding() else {
        // The routine is only routed here after the binding has been stored.
        unreachable!("registration hook called before it was installed");
    };

    let registrar = OriginalRegistrar {
        routine: binding.original(),
    };

    let registration = Registration::new(
        ProcessorIdentifier::from_ptr(cpu_id.cast_const()),
        lapic_id,
        boot_cpu != FALSE,
        start != FALSE,
    );

    let outcome = TOPOLOGY_SYNC.intercept(&registrar, registration);

    if let Some(processor) = outcome.processor().filter(|_| !processor_out.is_null()) {
        // SAFETY: The kernel passes either null or a valid out-pointer.
        unsafe {
            processor_out.write(processor.as_ptr());
        }
    }

    outcome.status().into_raw()
}

/// The original `ml_processor_register`, reached through the trampoline returned when routing.
#[derive(Debug)]
struct OriginalRegistrar {
    routine: EntryPoint,
}

impl Registrar for OriginalRegistrar {
    #[cfg_attr(coverage_nightly, coverage(off))]
    fn register(&self, registration: Registration) -> RegistrationOutcome {
        // SAFETY: The routing registry returned this address as a callable trampoline to the
        // original routine, which has exactly this signature.
        let routine = unsafe {
            mem::transmute::<*const (), RegisterProcessorFn>(ptr::with_exposed_provenance(
                self.routine.address(),
            ))
        };

        let mut processor: *mut c_void = ptr::null_mut();

        // SAFETY: The arguments are what the kernel would pass: an opaque identifier, a
        // controller ID, a valid out-pointer and two booleans.
        let status = unsafe {
            routine(
                registration.identifier().as_ptr(),
                registration.controller_id(),
                &raw mut processor,
                if registration.is_boot() { TRUE } else { FALSE },
                if registration.is_start() { TRUE } else { FALSE },
            )
        };

        let status = RegistrationStatus::from_raw(status);

        tracing::trace!(
            controller_id = registration.controller_id(),
            %status,
            "original registration routine returned"
        );

        if status.is_success() && !processor.is_null() {
            let handle = ProcessorHandle::from_address(processor.expose_provenance());
            RegistrationOutcome::new(status, Some(handle))
        } else {
            RegistrationOutcome::new(status, None)
        }
    }
}
