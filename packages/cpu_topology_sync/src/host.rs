/// The provider (parent) object that the host presents to the probe callback.
#[cfg_attr(test, mockall::automock)]
pub trait Provider {
    /// The provider's `processor-index` property, or `None` if it is absent or not a number.
    fn processor_index(&self) -> Option<u32>;
}

/// The hosting service object whose probe callback drives topology correction.
#[cfg_attr(test, mockall::automock)]
pub trait HostingService {
    /// Publishes a diagnostic property on the service. There is no consumer contract.
    fn set_property(&self, key: &str, value: &str);
}

/// Name of the property that carries [`VERSION`] once correction is active.
pub const VERSION_PROPERTY: &str = "VersionInfo";

/// Version marker published on the hosting service once correction is active.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
