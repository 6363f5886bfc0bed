use core::ffi::c_void;
use core::num::NonZeroUsize;

use derive_more::derive::Display;

/// Identifies the local interrupt controller (local APIC) of a processor.
///
/// The host uses this to address a processor during registration. Sibling threads of an
/// efficiency-core pair occupy consecutive controller IDs.
pub type ControllerId = u32;

/// Opaque processor identifier handed to the host during registration (`cpu_id_t` in XNU).
///
/// We never dereference it. For synthetic registrations it is the address of a slot in the
/// [`IdentifierPool`][crate::IdentifierPool], which is how the host tells processors apart.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[display("ProcessorIdentifier({_0:#x})")]
pub struct ProcessorIdentifier(usize);

impl ProcessorIdentifier {
    /// Wraps a raw identifier address.
    #[must_use]
    pub const fn from_address(address: usize) -> Self {
        Self(address)
    }

    /// Wraps a raw identifier pointer as received from the host.
    #[must_use]
    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr.addr())
    }

    /// The address of the identifier.
    #[must_use]
    pub const fn address(self) -> usize {
        self.0
    }

    /// The identifier in the pointer form that the host expects.
    #[must_use]
    pub fn as_ptr(self) -> *mut c_void {
        core::ptr::without_provenance_mut(self.0)
    }
}

/// Opaque handle of a registered processor (`processor_t` in XNU), as written by the host.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[display("ProcessorHandle({_0:#x})")]
pub struct ProcessorHandle(usize);

impl ProcessorHandle {
    /// Wraps a raw handle address.
    #[must_use]
    pub const fn from_address(address: usize) -> Self {
        Self(address)
    }

    /// The address of the handle.
    #[must_use]
    pub const fn address(self) -> usize {
        self.0
    }

    /// The handle in the pointer form that the host expects.
    #[must_use]
    pub fn as_ptr(self) -> *mut c_void {
        core::ptr::without_provenance_mut(self.0)
    }
}

/// Result code of a host registration call (`kern_return_t` in XNU).
///
/// There is exactly one success value. Every other value is a failure and all failures are
/// treated alike.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[display("{_0}")]
pub struct RegistrationStatus(i32);

impl RegistrationStatus {
    /// `KERN_SUCCESS`.
    pub const SUCCESS: Self = Self(0);

    /// `KERN_FAILURE`, the generic failure code.
    pub const FAILURE: Self = Self(5);

    /// Wraps a raw status code returned by the host.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// The raw status code, for returning to the host.
    #[must_use]
    pub const fn into_raw(self) -> i32 {
        self.0
    }

    /// Whether this is the one success value.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == Self::SUCCESS.0
    }
}

/// Address of a function that the interception registry can route or call.
///
/// Never null: a null address from the host means "no such function" and is represented as
/// `None` at every API boundary.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[display("{_0:#x}")]
pub struct EntryPoint(NonZeroUsize);

impl EntryPoint {
    /// Wraps a function address, returning `None` for the null address.
    #[must_use]
    pub const fn from_address(address: usize) -> Option<Self> {
        match NonZeroUsize::new(address) {
            Some(address) => Some(Self(address)),
            None => None,
        }
    }

    /// The address of the function.
    #[must_use]
    pub const fn address(self) -> usize {
        self.0.get()
    }
}
