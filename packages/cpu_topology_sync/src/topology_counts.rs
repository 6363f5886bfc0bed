/// Core and thread counts as reported by the privileged counter register (`MSR_CORE_THREAD_COUNT`).
///
/// On hybrid processors the thread count is the number of logical processors the firmware
/// exposes, while the core count counts every efficiency-core pair as two cores.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TopologyCounts {
    thread_count: u16,
    core_count: u16,
}

impl TopologyCounts {
    /// Counts as given.
    #[must_use]
    pub const fn new(thread_count: u16, core_count: u16) -> Self {
        Self {
            thread_count,
            core_count,
        }
    }

    /// Decodes the register value: bits 15:0 hold the thread count, bits 31:16 the core count.
    /// Higher bits are reserved and ignored.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "each field is masked to 16 bits first"
    )]
    pub const fn from_register_value(value: u64) -> Self {
        Self {
            thread_count: (value & 0xFFFF) as u16,
            core_count: ((value >> 16) & 0xFFFF) as u16,
        }
    }

    /// Logical thread count.
    #[must_use]
    pub const fn thread_count(&self) -> u16 {
        self.thread_count
    }

    /// Core count.
    #[must_use]
    pub const fn core_count(&self) -> u16 {
        self.core_count
    }
}

/// Where the efficiency cores start and how many there are, derived from [`TopologyCounts`].
///
/// Only exists when the counters describe a hybrid topology that needs correction.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct HybridDecision {
    efficient_core_count: u32,
    efficient_core_start: u32,
}

impl HybridDecision {
    /// Classifies the counters, returning `None` if no correction applies:
    ///
    /// * equal counts mean simultaneous multithreading is disabled;
    /// * `2 * cores <= threads` means the efficiency cores are disabled;
    /// * fewer threads than cores is not a topology this correction understands.
    #[must_use]
    pub fn classify(counts: TopologyCounts) -> Option<Self> {
        let threads = u32::from(counts.thread_count);
        let cores = u32::from(counts.core_count);

        if threads <= cores {
            return None;
        }

        // Cannot overflow, both values come from 16-bit fields.
        let doubled_cores = cores.checked_mul(2)?;

        // Threads are strictly between cores and 2 * cores from here on, so both
        // subtractions stay positive.
        let efficient_core_count = doubled_cores.checked_sub(threads).filter(|&c| c > 0)?;
        let efficient_core_start = threads.checked_sub(efficient_core_count)?;

        Some(Self {
            efficient_core_count,
            efficient_core_start,
        })
    }

    /// Number of efficiency cores, each of which needs one synthetic sibling.
    #[must_use]
    pub const fn efficient_core_count(&self) -> u32 {
        self.efficient_core_count
    }

    /// Running processor count past which registrations belong to efficiency cores.
    #[must_use]
    pub const fn efficient_core_start(&self) -> u32 {
        self.efficient_core_start
    }
}
