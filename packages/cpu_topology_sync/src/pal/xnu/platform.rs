use core::ffi::CStr;
use core::ptr;

use x86_64::registers::model_specific::Msr;

use crate::EntryPoint;
use crate::pal::{
    MSR_CORE_THREAD_COUNT, PE_boot_args, Platform, RegisterProcessorFn, ml_processor_register,
    real_ncpus,
};

/// The XNU kernel on x86-64, accessed through the symbols it exports to extensions.
///
/// You would only use a different platform in unit tests that need to use a mock platform.
#[derive(Debug)]
pub(crate) struct BuildTargetPlatform;

/// Singleton instance of `BuildTargetPlatform`, used by public API types
/// to hook up to the correct PAL implementation.
pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform = BuildTargetPlatform;

// Kernel bindings are excluded from coverage measurement because they can only run inside
// the kernel, which unit tests never do.
#[cfg_attr(coverage_nightly, coverage(off))]
impl Platform for BuildTargetPlatform {
    fn read_core_thread_count(&self) -> u64 {
        // SAFETY: The register exists on every processor that runs this kernel, and reading
        // it has no side effects. The extension runs in ring 0.
        unsafe { Msr::new(MSR_CORE_THREAD_COUNT).read() }
    }

    fn running_processor_count(&self) -> u32 {
        // The kernel updates this behind our back, so always read it fresh.
        // SAFETY: The symbol is a plain u32 that lives for the kernel's lifetime.
        unsafe { ptr::read_volatile(&raw const real_ncpus) }
    }

    fn registration_entry_point(&self) -> Option<EntryPoint> {
        let routine: RegisterProcessorFn = ml_processor_register;

        #[expect(
            clippy::fn_to_numeric_cast_any,
            reason = "the interception registry works with raw addresses"
        )]
        let address = routine as usize;

        EntryPoint::from_address(address)
    }

    fn boot_args(&self) -> Option<&'static str> {
        // SAFETY: No safety requirements.
        let boot_args = unsafe { PE_boot_args() };

        if boot_args.is_null() {
            return None;
        }

        // SAFETY: The kernel keeps the boot argument string, NUL-terminated, for its lifetime
        // and never modifies it after early boot.
        let boot_args = unsafe { CStr::from_ptr(boot_args) };

        boot_args.to_str().ok()
    }
}
