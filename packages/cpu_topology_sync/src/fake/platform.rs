//! Fake kernel backend implementation.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::pal::Platform;
use crate::{EntryPoint, TopologyCounts};

/// Address reported for the fake kernel's registration routine.
pub const FAKE_REGISTRATION_ENTRY_POINT: usize = 0x1000;

/// A fake kernel that serves counters and the running processor count from memory.
#[derive(Debug)]
pub struct FakePlatform {
    register_value: u64,
    running: AtomicU32,
    entry_point: Option<EntryPoint>,
    boot_args: Option<&'static str>,
}

impl FakePlatform {
    /// A kernel on a processor with the given counts, no processors registered yet and no
    /// boot arguments.
    #[must_use]
    pub fn new(counts: TopologyCounts) -> Self {
        Self::from_register_value(
            (u64::from(counts.core_count()) << 16) | u64::from(counts.thread_count()),
        )
    }

    /// A kernel whose counter register holds exactly `register_value`.
    #[must_use]
    pub fn from_register_value(register_value: u64) -> Self {
        Self {
            register_value,
            running: AtomicU32::new(0),
            entry_point: EntryPoint::from_address(FAKE_REGISTRATION_ENTRY_POINT),
            boot_args: None,
        }
    }

    /// Sets the boot argument string.
    #[must_use]
    pub fn with_boot_args(mut self, boot_args: &'static str) -> Self {
        self.boot_args = Some(boot_args);
        self
    }

    /// Makes the registration routine impossible to resolve.
    #[must_use]
    pub fn without_registration_entry_point(mut self) -> Self {
        self.entry_point = None;
        self
    }

    /// Sets the running processor count, e.g. to account for processors registered before
    /// correction was activated.
    #[must_use]
    pub fn with_running_count(self, count: u32) -> Self {
        self.running.store(count, Ordering::Relaxed);
        self
    }

    /// The running processor count.
    #[must_use]
    pub fn running_count(&self) -> u32 {
        self.running.load(Ordering::Relaxed)
    }

    /// Counts one more registered processor, returning the new count.
    pub fn advance_running_count(&self) -> u32 {
        let previous = self.running.fetch_add(1, Ordering::Relaxed);

        previous.saturating_add(1)
    }
}

impl Platform for FakePlatform {
    fn read_core_thread_count(&self) -> u64 {
        self.register_value
    }

    fn running_processor_count(&self) -> u32 {
        self.running_count()
    }

    fn registration_entry_point(&self) -> Option<EntryPoint> {
        self.entry_point
    }

    fn boot_args(&self) -> Option<&'static str> {
        self.boot_args
    }
}
