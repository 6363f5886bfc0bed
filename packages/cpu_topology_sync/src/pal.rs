//! Platform Abstraction Layer (PAL). Everything that reads processor registers or kernel state
//! goes through here, so the rest of the crate can be exercised with mock platforms.

mod abstractions;
pub(crate) use abstractions::*;

mod facade;
pub(crate) use facade::*;

#[cfg(all(feature = "xnu", target_arch = "x86_64"))]
mod xnu;
#[cfg(all(feature = "xnu", target_arch = "x86_64"))]
pub(crate) use xnu::*;

// The fallback module is the build target platform wherever the kernel symbols are not
// available to link against, which includes every unit test build.
#[cfg(not(all(feature = "xnu", target_arch = "x86_64")))]
mod fallback;
#[cfg(not(all(feature = "xnu", target_arch = "x86_64")))]
pub(crate) use fallback::*;
