#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
pub(crate) mod macros;

pub(crate) mod any;
pub(crate) mod cache;
pub(crate) mod config;
pub(crate) mod configurator;
pub(crate) mod context;
pub(crate) mod descriptor;
pub(crate) mod errors;
pub(crate) mod factory;
pub(crate) mod instance;
pub(crate) mod lock;
pub(crate) mod properties;
pub(crate) mod proxy;

pub use any::TypeInfo;
pub use config::{Config, ConfigBuilder, Resolved};
pub use configurator::{Configurator, ConfiguratorSet, InjectByCapability, InjectProperty, Object, PropertyMode};
pub use context::{Context, ContextBuilder};
pub use descriptor::{Component, Descriptor, Field, Implementation, Modifiers};
pub use errors::{ConfigErrorKind, DiscoveryErrorKind, InstantiateErrorKind, PropertiesErrorKind, ResolveErrorKind};
pub use factory::{Hooks, ObjectFactory};
pub use instance::Instance;
pub use properties::Properties;
pub use proxy::{DeprecationWrapper, Intercept, Interceptor, Proxy, ProxyWrapper, ProxyWrapperSet};

#[doc(hidden)]
pub mod __private {
    pub use alloc::sync::Arc;
}
