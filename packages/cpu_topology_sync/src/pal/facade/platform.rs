use core::fmt::{self, Debug};
#[cfg(any(test, feature = "test-util"))]
use std::sync::Arc;

use crate::EntryPoint;
#[cfg(any(test, feature = "test-util"))]
use crate::fake::FakePlatform;
#[cfg(test)]
use crate::pal::MockPlatform;
use crate::pal::{BUILD_TARGET_PLATFORM, BuildTargetPlatform, Platform};

/// Enum to hide the real/fake/mock choice behind a single wrapper type.
#[derive(Clone)]
pub(crate) enum PlatformFacade {
    Target(&'static BuildTargetPlatform),

    #[cfg(any(test, feature = "test-util"))]
    Fake(Arc<FakePlatform>),

    #[cfg(test)]
    Mock(Arc<MockPlatform>),
}

impl PlatformFacade {
    pub(crate) const fn target() -> Self {
        Self::Target(&BUILD_TARGET_PLATFORM)
    }

    #[cfg(test)]
    pub(crate) fn from_mock(mock: MockPlatform) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

impl Platform for PlatformFacade {
    fn read_core_thread_count(&self) -> u64 {
        match self {
            Self::Target(p) => p.read_core_thread_count(),
            #[cfg(any(test, feature = "test-util"))]
            Self::Fake(p) => p.read_core_thread_count(),
            #[cfg(test)]
            Self::Mock(p) => p.read_core_thread_count(),
        }
    }

    fn running_processor_count(&self) -> u32 {
        match self {
            Self::Target(p) => p.running_processor_count(),
            #[cfg(any(test, feature = "test-util"))]
            Self::Fake(p) => p.running_processor_count(),
            #[cfg(test)]
            Self::Mock(p) => p.running_processor_count(),
        }
    }

    fn registration_entry_point(&self) -> Option<EntryPoint> {
        match self {
            Self::Target(p) => p.registration_entry_point(),
            #[cfg(any(test, feature = "test-util"))]
            Self::Fake(p) => p.registration_entry_point(),
            #[cfg(test)]
            Self::Mock(p) => p.registration_entry_point(),
        }
    }

    fn boot_args(&self) -> Option<&'static str> {
        match self {
            Self::Target(p) => p.boot_args(),
            #[cfg(any(test, feature = "test-util"))]
            Self::Fake(p) => p.boot_args(),
            #[cfg(test)]
            Self::Mock(p) => p.boot_args(),
        }
    }
}

impl From<&'static BuildTargetPlatform> for PlatformFacade {
    fn from(p: &'static BuildTargetPlatform) -> Self {
        Self::Target(p)
    }
}

#[cfg(test)]
impl From<MockPlatform> for PlatformFacade {
    fn from(p: MockPlatform) -> Self {
        Self::Mock(Arc::new(p))
    }
}

#[cfg_attr(coverage_nightly, coverage(off))] // No API contract to test.
impl Debug for PlatformFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Target(inner) => inner.fmt(f),
            #[cfg(any(test, feature = "test-util"))]
            Self::Fake(inner) => inner.fmt(f),
            #[cfg(test)]
            Self::Mock(inner) => inner.fmt(f),
        }
    }
}
