use thiserror::Error;

use crate::{ControllerId, EntryPoint, RegistrationStatus};

/// Conditions that make topology correction impossible.
///
/// Every variant is fatal: a partially applied correction leaves the scheduler with a worse view
/// of the topology than no correction at all, so the public entry points halt instead of
/// returning these.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The platform could not name the processor registration routine to intercept.
    #[error("processor registration entry point could not be resolved")]
    EntryPointUnresolved,

    /// The interception registry did not return the original routine after routing.
    #[error("failed to route processor registration entry point at {target}")]
    RoutingFailed {
        /// The routine we tried to route.
        target: EntryPoint,
    },

    /// The host rejected a synthetic sibling registration.
    #[error("synthetic registration of controller {controller_id} failed with status {status}")]
    SyntheticRegistrationFailed {
        /// The controller ID of the sibling we tried to register.
        controller_id: ControllerId,

        /// The status the host returned.
        status: RegistrationStatus,
    },

    /// Every slot of the identifier pool is already registered.
    #[error("identifier pool exhausted: all {capacity} synthetic identifiers are registered")]
    IdentifierPoolExhausted {
        /// Capacity of the pool.
        capacity: usize,
    },

    /// The triggering registration used the largest controller ID, so it has no sibling.
    #[error("controller {controller_id} has no successor to register as its sibling")]
    ControllerIdOverflow {
        /// The controller ID of the triggering registration.
        controller_id: ControllerId,
    },
}

/// A specialized `Result` type for topology correction, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = core::result::Result<T, Error>;

/// Logs the error and halts. Used for every fatal condition.
#[cold]
pub(crate) fn halt(error: &Error) -> ! {
    tracing::error!(%error, "topology correction cannot continue");
    panic!("{error}");
}
