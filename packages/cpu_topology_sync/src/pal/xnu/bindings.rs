//! Kernel symbols we link against. Resolved when the kernel loads the extension.

use core::ffi::{c_char, c_int, c_void};

/// `kern_return_t ml_processor_register(cpu_id_t, uint32_t, processor_t *, boolean_t, boolean_t)`
pub(crate) type RegisterProcessorFn = unsafe extern "C" fn(
    cpu_id: *mut c_void,
    lapic_id: u32,
    processor_out: *mut *mut c_void,
    boot_cpu: c_int,
    start: c_int,
) -> c_int;

/// `boolean_t` values as the kernel spells them.
pub(crate) const TRUE: c_int = 1;
pub(crate) const FALSE: c_int = 0;

/// The core/thread count register.
pub(crate) const MSR_CORE_THREAD_COUNT: u32 = 0x35;

#[expect(non_upper_case_globals, reason = "kernel symbol names")]
unsafe extern "C" {
    /// Number of processors registered so far.
    pub(crate) static real_ncpus: u32;

    pub(crate) fn ml_processor_register(
        cpu_id: *mut c_void,
        lapic_id: u32,
        processor_out: *mut *mut c_void,
        boot_cpu: c_int,
        start: c_int,
    ) -> c_int;

    #[expect(non_snake_case, reason = "kernel symbol name")]
    pub(crate) fn PE_boot_args() -> *mut c_char;
}
