//! Full boot sessions on fake hybrid processors, from the first probe to the last registration.

use std::sync::Arc;

use cpu_topology_sync::fake::{
    FakeHostingService, FakePlatform, FakeProvider, FakeRegistrar, FakeRegistry,
};
use cpu_topology_sync::{
    EntryPoint, HybridDecision, ProbeOutcome, ProcessorIdentifier, Registration, TopologyCounts,
    TopologySync, VERSION, VERSION_PROPERTY,
};

const INTERCEPTOR: usize = 0x2000;

fn interceptor() -> EntryPoint {
    EntryPoint::from_address(INTERCEPTOR).unwrap()
}

/// Real registrations use even controller IDs, leaving the odd ones for the siblings.
fn real_registration(index: u32) -> Registration {
    Registration::new(
        ProcessorIdentifier::from_address(0x8000_0000 + index as usize * 0x100),
        index * 2,
        index == 0,
        false,
    )
}

fn activate(sync: &TopologySync, service: &FakeHostingService) -> HybridDecision {
    let outcome = sync.probe(
        &FakeProvider::with_processor_index(0),
        service,
        &FakeRegistry::new(),
        interceptor(),
    );

    let ProbeOutcome::Active(decision) = outcome else {
        panic!("expected correction to activate, got {outcome:?}");
    };

    decision
}

#[test]
fn alder_lake_registers_one_sibling_per_efficiency_core() {
    let platform = Arc::new(FakePlatform::new(TopologyCounts::new(16, 10)));
    let sync: TopologySync = TopologySync::fake(Arc::clone(&platform));
    let service = FakeHostingService::new();

    let decision = activate(&sync, &service);
    assert_eq!(decision.efficient_core_count(), 4);
    assert_eq!(decision.efficient_core_start(), 12);

    let registrar = FakeRegistrar::new(Arc::clone(&platform));

    for index in 0..16 {
        let outcome = sync.intercept(&registrar, real_registration(index));
        assert!(outcome.status().is_success());
    }

    let registrations = registrar.registrations();
    assert_eq!(registrations.len(), 20);
    assert_eq!(platform.running_count(), 20);

    // Each synthetic registration directly follows the real one it is a sibling of.
    let synthetic_positions: Vec<_> = registrations
        .iter()
        .enumerate()
        .filter(|(_, r)| sync.is_synthetic(r.identifier()))
        .map(|(position, _)| position)
        .collect();
    assert_eq!(synthetic_positions, vec![13, 15, 17, 19]);

    for position in synthetic_positions {
        let real = registrations[position - 1];
        let sibling = registrations[position];

        assert_eq!(sibling.controller_id(), real.controller_id() + 1);
        assert!(!sibling.is_boot());
        assert!(!sibling.is_start());
    }

    let real_controllers_with_siblings: Vec<_> = registrations
        .windows(2)
        .filter(|pair| sync.is_synthetic(pair[1].identifier()))
        .map(|pair| pair[0].controller_id())
        .collect();
    assert_eq!(real_controllers_with_siblings, vec![24, 26, 28, 30]);

    assert_eq!(sync.identifier_pool().registered_count(), 4);
    assert_eq!(
        service.property(VERSION_PROPERTY).as_deref(),
        Some(VERSION)
    );
}

#[test]
fn synthetic_identifiers_are_distinct_and_stable() {
    let platform = Arc::new(FakePlatform::new(TopologyCounts::new(16, 10)));
    let sync: TopologySync = TopologySync::fake(Arc::clone(&platform));
    activate(&sync, &FakeHostingService::new());

    let registrar = FakeRegistrar::new(Arc::clone(&platform));

    for index in 0..16 {
        sync.intercept(&registrar, real_registration(index));
    }

    let identifiers: Vec<_> = sync.identifier_pool().registered_identifiers().collect();
    assert_eq!(identifiers.len(), 4);

    for (i, a) in identifiers.iter().enumerate() {
        for b in identifiers.iter().skip(i + 1) {
            assert_ne!(a, b);
        }
    }

    // The identifiers handed to the registrar are exactly the ones the pool reports.
    let registered: Vec<_> = registrar
        .registrations()
        .into_iter()
        .map(|r| r.identifier())
        .filter(|id| sync.is_synthetic(*id))
        .collect();
    assert_eq!(registered, identifiers);
}

#[test]
fn start_requests_do_not_add_siblings() {
    let platform = Arc::new(FakePlatform::new(TopologyCounts::new(16, 10)));
    let sync: TopologySync = TopologySync::fake(Arc::clone(&platform));
    activate(&sync, &FakeHostingService::new());

    let registrar = FakeRegistrar::new(Arc::clone(&platform));

    for index in 0..16 {
        let registration = real_registration(index);
        let start = Registration::new(
            registration.identifier(),
            registration.controller_id(),
            registration.is_boot(),
            true,
        );

        sync.intercept(&registrar, start);
    }

    assert_eq!(registrar.registrations().len(), 16);
    assert_eq!(sync.identifier_pool().registered_count(), 0);
}

#[test]
fn every_hybrid_topology_gets_one_sibling_per_efficiency_core() {
    for core_count in 1_u16..=24 {
        // Hybrid means strictly between one and two threads per core.
        for thread_count in (core_count + 1)..(core_count * 2) {
            let counts = TopologyCounts::new(thread_count, core_count);
            let platform = Arc::new(FakePlatform::new(counts));
            let sync: TopologySync<64> = TopologySync::fake(Arc::clone(&platform));

            let outcome = sync.probe(
                &FakeProvider::with_processor_index(0),
                &FakeHostingService::new(),
                &FakeRegistry::new(),
                interceptor(),
            );
            let ProbeOutcome::Active(decision) = outcome else {
                panic!("{counts:?} should activate correction, got {outcome:?}");
            };

            let registrar = FakeRegistrar::new(Arc::clone(&platform));

            for index in 0..u32::from(thread_count) {
                sync.intercept(&registrar, real_registration(index));
            }

            let expected = u32::from(core_count) * 2 - u32::from(thread_count);
            assert_eq!(decision.efficient_core_count(), expected, "{counts:?}");
            assert_eq!(
                sync.identifier_pool().registered_count(),
                expected as usize,
                "{counts:?}"
            );
            assert_eq!(
                platform.running_count(),
                u32::from(core_count) * 2,
                "{counts:?}"
            );
        }
    }
}

#[test]
fn processors_registered_before_activation_count_towards_the_threshold() {
    // The first 12 processors were registered before correction was activated.
    let platform =
        Arc::new(FakePlatform::new(TopologyCounts::new(16, 10)).with_running_count(12));
    let sync: TopologySync = TopologySync::fake(Arc::clone(&platform));
    activate(&sync, &FakeHostingService::new());

    let registrar = FakeRegistrar::new(Arc::clone(&platform));

    for index in 12..16 {
        sync.intercept(&registrar, real_registration(index));
    }

    assert_eq!(registrar.registrations().len(), 8);
    assert_eq!(sync.identifier_pool().registered_count(), 4);
}

#[test]
fn later_probes_do_not_reinstall() {
    let platform = Arc::new(FakePlatform::new(TopologyCounts::new(16, 10)));
    let sync: TopologySync = TopologySync::fake(Arc::clone(&platform));
    let registry = FakeRegistry::new();

    let probes = [Some(0), Some(1), Some(0), None, Some(0)];
    let outcomes: Vec<_> = probes
        .into_iter()
        .map(|index| {
            let provider = match index {
                Some(index) => FakeProvider::with_processor_index(index),
                None => FakeProvider::without_processor_index(),
            };

            sync.probe(&provider, &FakeHostingService::new(), &registry, interceptor())
        })
        .collect();

    assert!(outcomes[0].is_active());
    assert_eq!(outcomes[1], ProbeOutcome::NotBootProcessor);
    assert_eq!(outcomes[2], ProbeOutcome::AlreadyProbed);
    assert_eq!(outcomes[3], ProbeOutcome::NotBootProcessor);
    assert_eq!(outcomes[4], ProbeOutcome::AlreadyProbed);

    assert_eq!(registry.routes().len(), 1);
    assert_eq!(registry.clear_count(), 1);
}
