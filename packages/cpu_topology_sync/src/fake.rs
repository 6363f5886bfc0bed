//! In-memory stand-ins for the kernel and the hosting framework.
//!
//! Only available when the `test-util` feature is enabled.
//!
//! The fakes model just enough of the kernel for topology correction to be exercised end to
//! end: [`FakePlatform`] holds the counter register value and the running processor count,
//! [`FakeRegistrar`] plays the original registration routine (advancing that count for every
//! successful registration), and the remaining types stand in for the patch engine and the
//! hosting service.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use cpu_topology_sync::fake::{
//!     FakeHostingService, FakePlatform, FakeProvider, FakeRegistrar, FakeRegistry,
//! };
//! use cpu_topology_sync::{
//!     EntryPoint, ProcessorIdentifier, Registration, TopologyCounts, TopologySync,
//! };
//!
//! // An Alder Lake i5 with 6 performance and 4 efficiency cores.
//! let platform = Arc::new(FakePlatform::new(TopologyCounts::new(16, 10)));
//! let sync: TopologySync = TopologySync::fake(Arc::clone(&platform));
//!
//! let outcome = sync.probe(
//!     &FakeProvider::with_processor_index(0),
//!     &FakeHostingService::new(),
//!     &FakeRegistry::new(),
//!     EntryPoint::from_address(0x2000).unwrap(),
//! );
//! assert!(outcome.is_active());
//!
//! let registrar = FakeRegistrar::new(Arc::clone(&platform));
//!
//! for index in 0..16_u32 {
//!     let identifier = ProcessorIdentifier::from_address(0x1000 + index as usize);
//!     sync.intercept(&registrar, Registration::new(identifier, index * 2, index == 0, false));
//! }
//!
//! // One disabled sibling for each of the 4 efficiency cores.
//! assert_eq!(sync.identifier_pool().registered_count(), 4);
//! assert_eq!(registrar.registrations().len(), 20);
//! ```
//!
//! # Isolation
//!
//! Each fake instance is independent, so fakes can be used from parallel tests without
//! interference.

mod host;
mod platform;

pub use host::*;
pub use platform::*;
