use crate::EntryPoint;
use crate::error::{Error, Result};

/// The patch engine that redirects calls of a host function to a wrapper.
///
/// This is the only capability we need from the host's patching machinery, so it is the only
/// one we depend on.
#[cfg_attr(test, mockall::automock)]
pub trait InterceptionRegistry {
    /// Routes every future call of `target` to `wrapper`.
    ///
    /// Returns the entry point of the original routine (for the wrapper to chain to) or `None`
    /// if routing failed.
    fn route_function(&self, target: EntryPoint, wrapper: EntryPoint) -> Option<EntryPoint>;

    /// Clears any error state the last routing attempt left behind.
    fn clear_error(&self);
}

/// An installed redirection of the registration routine.
///
/// Only exists once routing succeeded, so [`original()`][Self::original] is always usable.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct HookBinding {
    target: EntryPoint,
    interceptor: EntryPoint,
    original: EntryPoint,
}

impl HookBinding {
    /// The routed host function.
    #[must_use]
    pub const fn target(&self) -> EntryPoint {
        self.target
    }

    /// The wrapper that calls of [`target()`][Self::target] now reach.
    #[must_use]
    pub const fn interceptor(&self) -> EntryPoint {
        self.interceptor
    }

    /// The original routine. The only way to reach the host's real registration behavior.
    #[must_use]
    pub const fn original(&self) -> EntryPoint {
        self.original
    }
}

/// Routes `target` through `interceptor`.
///
/// The registry's error state is cleared after the attempt whether or not it succeeded.
pub(crate) fn install(
    registry: &impl InterceptionRegistry,
    target: EntryPoint,
    interceptor: EntryPoint,
) -> Result<HookBinding> {
    let original = registry.route_function(target, interceptor);
    registry.clear_error();

    let original = original.ok_or(Error::RoutingFailed { target })?;

    tracing::debug!(%target, %interceptor, %original, "routed processor registration");

    Ok(HookBinding {
        target,
        interceptor,
        original,
    })
}
