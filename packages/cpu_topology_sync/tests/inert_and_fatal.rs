//! Boot sessions that must leave the kernel untouched and ones that cannot continue.

use std::sync::Arc;

use cpu_topology_sync::fake::{
    FAKE_REGISTRATION_ENTRY_POINT, FakeHostingService, FakePlatform, FakeProvider, FakeRegistrar,
    FakeRegistry,
};
use cpu_topology_sync::{
    EntryPoint, ProbeOutcome, ProcessorIdentifier, Registration, TopologyCounts, TopologySync,
    VERSION_PROPERTY,
};

fn interceptor() -> EntryPoint {
    EntryPoint::from_address(0x2000).unwrap()
}

fn probe_boot_processor(
    sync: &TopologySync,
    service: &FakeHostingService,
    registry: &FakeRegistry,
) -> ProbeOutcome {
    sync.probe(
        &FakeProvider::with_processor_index(0),
        service,
        registry,
        interceptor(),
    )
}

#[test]
fn uniform_topologies_stay_inert() {
    // No hyper-threading, no hyper-threading on 10 cores, hyper-threading on every core.
    for counts in [
        TopologyCounts::new(8, 8),
        TopologyCounts::new(10, 10),
        TopologyCounts::new(20, 10),
    ] {
        let platform = Arc::new(FakePlatform::new(counts));
        let sync: TopologySync = TopologySync::fake(Arc::clone(&platform));
        let service = FakeHostingService::new();
        let registry = FakeRegistry::new();

        let outcome = probe_boot_processor(&sync, &service, &registry);

        assert_eq!(outcome, ProbeOutcome::Inert(counts));
        assert!(registry.routes().is_empty());
        assert_eq!(service.property(VERSION_PROPERTY), None);

        // Registrations that still reach us are forwarded untouched.
        let registrar = FakeRegistrar::new(Arc::clone(&platform));
        for index in 0..u32::from(counts.thread_count()) {
            sync.intercept(
                &registrar,
                Registration::new(
                    ProcessorIdentifier::from_address(0x100 + index as usize),
                    index,
                    index == 0,
                    false,
                ),
            );
        }

        assert_eq!(
            registrar.registrations().len(),
            usize::from(counts.thread_count())
        );
        assert_eq!(sync.identifier_pool().registered_count(), 0);
    }
}

#[test]
fn fewer_threads_than_cores_stays_inert() {
    let counts = TopologyCounts::new(6, 8);
    let platform = Arc::new(FakePlatform::new(counts));
    let sync: TopologySync = TopologySync::fake(platform);

    let outcome = probe_boot_processor(&sync, &FakeHostingService::new(), &FakeRegistry::new());

    assert_eq!(outcome, ProbeOutcome::Inert(counts));
}

#[test]
fn reserved_register_bits_are_ignored() {
    // Bits above 31 are reserved and must not affect the counts.
    let platform = Arc::new(FakePlatform::from_register_value(0xFFFF_FFFF_000A_0010));
    let sync: TopologySync = TopologySync::fake(platform);

    let outcome = probe_boot_processor(&sync, &FakeHostingService::new(), &FakeRegistry::new());

    assert!(outcome.is_active());
    assert_eq!(sync.topology_counts(), Some(TopologyCounts::new(16, 10)));
}

#[test]
fn build_target_without_kernel_is_inert() {
    let sync: TopologySync = TopologySync::new();

    let outcome = probe_boot_processor(&sync, &FakeHostingService::new(), &FakeRegistry::new());

    assert!(matches!(outcome, ProbeOutcome::Inert(_)));
    assert_eq!(sync.hook_binding(), None);
}

#[test]
fn boot_args_configure_verbosity() {
    let platform = Arc::new(
        FakePlatform::new(TopologyCounts::new(16, 10)).with_boot_args("-v -liludbgall"),
    );
    let sync: TopologySync = TopologySync::fake(platform);

    probe_boot_processor(&sync, &FakeHostingService::new(), &FakeRegistry::new());

    let options = sync.debug_options().unwrap();
    assert!(options.is_verbose());
    assert_eq!(options.print_delay_micros(), 0);
}

#[test]
fn routing_targets_the_registration_routine() {
    let sync: TopologySync =
        TopologySync::fake(Arc::new(FakePlatform::new(TopologyCounts::new(16, 10))));
    let registry = FakeRegistry::new();

    probe_boot_processor(&sync, &FakeHostingService::new(), &registry);

    let target = EntryPoint::from_address(FAKE_REGISTRATION_ENTRY_POINT).unwrap();
    assert_eq!(registry.routes(), vec![(target, interceptor())]);

    let binding = sync.hook_binding().unwrap();
    assert_eq!(binding.target(), target);
    assert_eq!(binding.interceptor(), interceptor());
}

#[test]
#[should_panic(expected = "failed to route processor registration entry point")]
fn routing_failure_halts() {
    let sync: TopologySync =
        TopologySync::fake(Arc::new(FakePlatform::new(TopologyCounts::new(16, 10))));

    probe_boot_processor(&sync, &FakeHostingService::new(), &FakeRegistry::failing());
}

#[test]
#[should_panic(expected = "entry point could not be resolved")]
fn unresolved_registration_routine_halts() {
    let sync: TopologySync = TopologySync::fake(Arc::new(
        FakePlatform::new(TopologyCounts::new(16, 10)).without_registration_entry_point(),
    ));

    probe_boot_processor(&sync, &FakeHostingService::new(), &FakeRegistry::new());
}

#[test]
#[should_panic(expected = "synthetic registration of controller 25 failed")]
fn rejected_sibling_halts() {
    let platform = Arc::new(FakePlatform::new(TopologyCounts::new(16, 10)));
    let sync: TopologySync = TopologySync::fake(Arc::clone(&platform));
    probe_boot_processor(&sync, &FakeHostingService::new(), &FakeRegistry::new());

    let registrar = FakeRegistrar::new(Arc::clone(&platform)).rejecting(25);

    for index in 0..16_u32 {
        sync.intercept(
            &registrar,
            Registration::new(
                ProcessorIdentifier::from_address(0x100 + index as usize),
                index * 2,
                index == 0,
                false,
            ),
        );
    }
}

#[test]
#[should_panic(expected = "identifier pool exhausted: all 2 synthetic identifiers")]
fn undersized_pool_halts() {
    let platform = Arc::new(FakePlatform::new(TopologyCounts::new(16, 10)));
    let sync: TopologySync<2> = TopologySync::fake(Arc::clone(&platform));
    sync.probe(
        &FakeProvider::with_processor_index(0),
        &FakeHostingService::new(),
        &FakeRegistry::new(),
        interceptor(),
    );

    let registrar = FakeRegistrar::new(Arc::clone(&platform));

    for index in 0..16_u32 {
        sync.intercept(
            &registrar,
            Registration::new(
                ProcessorIdentifier::from_address(0x100 + index as usize),
                index * 2,
                index == 0,
                false,
            ),
        );
    }
}
