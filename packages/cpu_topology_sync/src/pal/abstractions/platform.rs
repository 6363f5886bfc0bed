use core::fmt::Debug;

use crate::EntryPoint;

/// The privileged processor and kernel state that topology correction reads.
///
/// All PAL access goes through this trait, enabling it to be mocked.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// Raw value of the core/thread count register (`MSR_CORE_THREAD_COUNT`, 0x35).
    fn read_core_thread_count(&self) -> u64;

    /// The kernel's running count of registered processors (`real_ncpus` in XNU).
    fn running_processor_count(&self) -> u32;

    /// Address of the kernel's processor registration routine, if it can be resolved.
    fn registration_entry_point(&self) -> Option<EntryPoint>;

    /// The kernel boot argument string, if available.
    fn boot_args(&self) -> Option<&'static str>;
}
