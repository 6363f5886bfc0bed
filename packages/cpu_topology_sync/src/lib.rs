#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(not(any(test, feature = "test-util")), no_std)]

//! Hybrid processors (performance cores with two hardware threads, efficiency cores with one)
//! report fewer logical processors at boot than their ACPI topology table describes. Kernels that
//! assume every core has the same number of threads then end up with a processor count that does
//! not match the table, which confuses power management and scheduling.
//!
//! This package corrects the count during processor bring-up. It reads the core/thread count
//! register once, on the boot processor, and if the processor is hybrid it routes the kernel's
//! processor registration routine through an interceptor. For every efficiency core that
//! registers, the interceptor registers one more "sibling" processor that is neither the boot
//! processor nor started, so the total logical processor count matches what the kernel expects.
//!
//! # Classification
//!
//! With `t` threads and `c` cores reported by the register, a hybrid processor has
//! `2c - t` efficiency cores and they start at logical processor index `t - (2c - t)`.
//! Uniform topologies (`t == c` or `t == 2c`) need no correction and leave the kernel untouched.
//!
//! ```
//! use cpu_topology_sync::{HybridDecision, TopologyCounts};
//!
//! // 6 performance cores and 4 efficiency cores.
//! let decision = HybridDecision::classify(TopologyCounts::new(16, 10)).unwrap();
//!
//! assert_eq!(decision.efficient_core_count(), 4);
//! assert_eq!(decision.efficient_core_start(), 12);
//!
//! // 8 cores with hyper-threading on all of them.
//! assert_eq!(HybridDecision::classify(TopologyCounts::new(16, 8)), None);
//! ```
//!
//! # Driving the correction
//!
//! All state for a boot session lives in a [`TopologySync`], which is normally kept in a
//! `static`. The host calls [`TopologySync::probe()`] from its probe callback and
//! [`TopologySync::intercept()`] from the interceptor it routed the registration routine to.
//! The host side is described by the [`Provider`], [`HostingService`], [`InterceptionRegistry`]
//! and [`Registrar`] traits.
//!
//! With the `xnu` feature, the `kernel_hook` module provides the session `static` and the
//! `extern "C"` interceptor for the XNU kernel on x86-64.
//!
//! # Failure handling
//!
//! Once the interceptor is active, a half-applied correction is worse than none: the kernel would
//! boot with a processor count that matches neither the hardware nor the topology table. Failures
//! at that stage are therefore logged and followed by a panic instead of being returned.
//!
//! # Logging
//!
//! Diagnostics are emitted via [`tracing`]. The [`DebugOptions`] parsed from the kernel boot
//! arguments tell the subscriber installed by the host which level to enable.
//!
//! # Testing
//!
//! The `test-util` feature exposes the `fake` module, with in-memory stand-ins for the kernel and
//! every host collaborator, so the correction can be exercised end to end without a kernel.

pub mod config;
mod error;
mod host;
mod identifier_pool;
mod interception;
mod pal;
mod primitive_types;
mod registration;
mod topology_counts;
mod topology_sync;

#[cfg(any(test, feature = "test-util"))]
pub mod fake;

#[cfg(all(feature = "xnu", target_arch = "x86_64"))]
pub mod kernel_hook;

pub use config::DebugOptions;
pub use error::Error;
pub use host::*;
pub use identifier_pool::*;
pub use interception::{HookBinding, InterceptionRegistry};
pub use primitive_types::*;
pub use registration::*;
pub use topology_counts::*;
pub use topology_sync::*;
