use super::instantiate::InstantiateErrorKind;

#[derive(thiserror::Error, Debug)]
pub enum DiscoveryErrorKind {
    #[error("Configurator `{name}` can't be constructed: {source}")]
    Configurator {
        name: &'static str,
        source: InstantiateErrorKind,
    },
    #[error("Proxy wrapper `{name}` can't be constructed: {source}")]
    ProxyWrapper {
        name: &'static str,
        source: InstantiateErrorKind,
    },
}
