mod config;
mod discovery;
mod instantiate;
mod properties;
mod resolve;

pub use config::ConfigErrorKind;
pub use discovery::DiscoveryErrorKind;
pub use instantiate::InstantiateErrorKind;
pub use properties::PropertiesErrorKind;
pub use resolve::ResolveErrorKind;
