use core::fmt::{self, Debug};
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::ProcessorIdentifier;
use crate::error::{Error, Result};

/// Default number of synthetic identifiers reserved for a boot session.
///
/// This bounds the number of efficiency cores we can give siblings to.
pub const DEFAULT_POOL_CAPACITY: usize = 128;

/// Storage whose address serves as a synthetic processor identifier.
///
/// The host treats the identifier as opaque, so the contents are never read. The atomic only
/// keeps the pool `Sync` without any unsafe code.
#[repr(transparent)]
struct IdentifierSlot(AtomicUsize);

impl IdentifierSlot {
    const fn new() -> Self {
        Self(AtomicUsize::new(0))
    }
}

/// Fixed-capacity, append-only arena of identifiers for synthetic processor registrations.
///
/// Slots are handed out in order and are never released, so the pool must live as long as the
/// host may refer to the processors registered with them (in practice: in a `static`).
///
/// Claiming is two-phase: [`claim()`][Self::claim] reserves the next free slot and the slot only
/// counts as registered once the claim is [committed][PendingIdentifier::commit]. A claim that
/// is dropped uncommitted leaves the pool as it was.
pub struct IdentifierPool<const CAPACITY: usize> {
    slots: [IdentifierSlot; CAPACITY],

    // Number of slots registered so far. Never exceeds CAPACITY.
    registered: AtomicUsize,
}

impl<const CAPACITY: usize> IdentifierPool<CAPACITY> {
    /// Creates an empty pool.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [const { IdentifierSlot::new() }; CAPACITY],
            registered: AtomicUsize::new(0),
        }
    }

    /// Maximum number of identifiers the pool can hand out.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        CAPACITY
    }

    /// Number of identifiers registered so far.
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.registered.load(Ordering::Acquire)
    }

    /// Reserves the next free identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdentifierPoolExhausted`] if every slot is already registered.
    pub fn claim(&self) -> Result<PendingIdentifier<'_, CAPACITY>> {
        let index = self.registered_count();

        let identifier = self
            .identifier_at(index)
            .ok_or(Error::IdentifierPoolExhausted { capacity: CAPACITY })?;

        Ok(PendingIdentifier {
            pool: self,
            index,
            identifier,
        })
    }

    /// Whether the identifier was issued by this pool, registered or not.
    #[must_use]
    pub fn contains(&self, identifier: ProcessorIdentifier) -> bool {
        self.slots
            .as_ptr_range()
            .contains(&core::ptr::without_provenance::<IdentifierSlot>(
                identifier.address(),
            ))
    }

    /// Identifiers registered so far, in registration order.
    pub fn registered_identifiers(&self) -> impl Iterator<Item = ProcessorIdentifier> + '_ {
        (0..self.registered_count()).filter_map(|index| self.identifier_at(index))
    }

    fn identifier_at(&self, index: usize) -> Option<ProcessorIdentifier> {
        self.slots
            .get(index)
            .map(|slot| ProcessorIdentifier::from_ptr(core::ptr::from_ref(slot)))
    }
}

impl<const CAPACITY: usize> Default for IdentifierPool<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(coverage_nightly, coverage(off))] // No API contract to test.
impl<const CAPACITY: usize> Debug for IdentifierPool<CAPACITY> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentifierPool")
            .field("capacity", &CAPACITY)
            .field("registered", &self.registered_count())
            .finish_non_exhaustive()
    }
}

/// A reserved but not yet registered identifier from an [`IdentifierPool`].
#[derive(Debug)]
#[must_use = "the identifier is only registered once the claim is committed"]
pub struct PendingIdentifier<'a, const CAPACITY: usize> {
    pool: &'a IdentifierPool<CAPACITY>,
    index: usize,
    identifier: ProcessorIdentifier,
}

impl<const CAPACITY: usize> PendingIdentifier<'_, CAPACITY> {
    /// The reserved identifier.
    #[must_use]
    pub fn identifier(&self) -> ProcessorIdentifier {
        self.identifier
    }

    /// Marks the identifier as registered, advancing the pool cursor.
    pub fn commit(self) -> ProcessorIdentifier {
        // Registration runs serialized, so nobody can have advanced the cursor since the claim.
        // If that ever breaks, two processors would share an identifier.
        #[expect(
            clippy::arithmetic_side_effects,
            reason = "a claimed index is always below CAPACITY"
        )]
        let previous = self.pool.registered.swap(self.index + 1, Ordering::AcqRel);
        assert_eq!(
            previous, self.index,
            "identifier pool was claimed concurrently"
        );

        self.identifier
    }
}
