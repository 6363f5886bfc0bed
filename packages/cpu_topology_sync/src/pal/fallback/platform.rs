use crate::EntryPoint;
use crate::pal::Platform;

/// Fallback platform for builds without access to the kernel.
///
/// It reports equal core and thread counts, which classifies every machine as needing no
/// correction, so nothing beyond the counter read ever happens. This keeps the crate buildable
/// (and its public API usable) on any host.
#[derive(Debug)]
pub(crate) struct BuildTargetPlatform;

/// Singleton instance of `BuildTargetPlatform`, used by public API types
/// to hook up to the correct PAL implementation.
pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform = BuildTargetPlatform;

impl Platform for BuildTargetPlatform {
    fn read_core_thread_count(&self) -> u64 {
        0
    }

    #[cfg_attr(test, mutants::skip)] // Never consulted because nothing is ever intercepted.
    fn running_processor_count(&self) -> u32 {
        0
    }

    fn registration_entry_point(&self) -> Option<EntryPoint> {
        None
    }

    fn boot_args(&self) -> Option<&'static str> {
        None
    }
}
