use alloc::{boxed::Box, vec::Vec};
use core::any::type_name;
use tracing::{debug, info_span};

use crate::{
    config::Resolved,
    configurator::{Configurator, ConfiguratorSet, InjectByCapability, InjectProperty, Object},
    errors::{DiscoveryErrorKind, InstantiateErrorKind, ResolveErrorKind},
    instance::Instance,
    properties::Properties,
    proxy::{DeprecationWrapper, ProxyWrapper, ProxyWrapperSet},
    Context,
};

type ConfiguratorCandidate = Box<dyn FnOnce() -> Result<Box<dyn Configurator>, InstantiateErrorKind>>;
type ProxyWrapperCandidate = Box<dyn FnOnce() -> Result<Box<dyn ProxyWrapper>, InstantiateErrorKind>>;

/// Candidate hooks, instantiated once and in order when the [`ObjectFactory`] is discovered.
///
/// The default set is [`InjectByCapability`] and [`InjectProperty`] with an empty property source,
/// followed by the [`DeprecationWrapper`].
pub struct Hooks {
    configurators: Vec<(&'static str, ConfiguratorCandidate)>,
    proxy_wrappers: Vec<(&'static str, ProxyWrapperCandidate)>,
}

impl Default for Hooks {
    fn default() -> Self {
        Self::with_properties(Properties::new())
    }
}

impl Hooks {
    /// Empty set of hooks
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            configurators: Vec::new(),
            proxy_wrappers: Vec::new(),
        }
    }

    /// Default hooks with the property injector reading `properties`
    #[must_use]
    pub fn with_properties(properties: Properties) -> Self {
        Self::new()
            .configurator::<InjectByCapability>()
            .configurator_with(move || Ok(InjectProperty::new(properties)))
            .proxy_wrapper::<DeprecationWrapper>()
    }

    /// Default hooks with the property injector reading the file at `path`.
    ///
    /// The file is read once, while the hooks are discovered,
    /// so a missing or malformed file fails [`crate::ContextBuilder::build`].
    #[cfg(feature = "std")]
    #[must_use]
    pub fn with_properties_file(path: impl Into<std::path::PathBuf>) -> Self {
        let path = path.into();
        Self::new()
            .configurator::<InjectByCapability>()
            .configurator_with(move || InjectProperty::load(&path).map_err(|err| anyhow::Error::from(err).into()))
            .proxy_wrapper::<DeprecationWrapper>()
    }

    #[inline]
    #[must_use]
    pub fn configurator<C: Configurator + Default>(self) -> Self {
        self.configurator_with(|| Ok(C::default()))
    }

    /// Adds a configurator with a fallible construction path.
    /// The failure aborts the discovery.
    #[must_use]
    pub fn configurator_with<C, F>(mut self, constructor: F) -> Self
    where
        C: Configurator,
        F: FnOnce() -> Result<C, InstantiateErrorKind> + 'static,
    {
        let candidate: ConfiguratorCandidate =
            Box::new(move || constructor().map(|configurator| Box::new(configurator) as Box<dyn Configurator>));
        self.configurators.push((type_name::<C>(), candidate));
        self
    }

    #[inline]
    #[must_use]
    pub fn proxy_wrapper<W: ProxyWrapper + Default>(self) -> Self {
        self.proxy_wrapper_with(|| Ok(W::default()))
    }

    /// Adds a proxy wrapper with a fallible construction path.
    /// The failure aborts the discovery.
    #[must_use]
    pub fn proxy_wrapper_with<W, F>(mut self, constructor: F) -> Self
    where
        W: ProxyWrapper,
        F: FnOnce() -> Result<W, InstantiateErrorKind> + 'static,
    {
        let candidate: ProxyWrapperCandidate =
            Box::new(move || constructor().map(|wrapper| Box::new(wrapper) as Box<dyn ProxyWrapper>));
        self.proxy_wrappers.push((type_name::<W>(), candidate));
        self
    }
}

/// Builds single instances: instantiate, configure, run the post-construct callback, wrap.
///
/// Never caches, the singleton policy belongs to [`Context`].
pub struct ObjectFactory {
    configurators: ConfiguratorSet,
    proxy_wrappers: ProxyWrapperSet,
}

impl ObjectFactory {
    #[inline]
    #[must_use]
    pub fn new(configurators: ConfiguratorSet, proxy_wrappers: ProxyWrapperSet) -> Self {
        Self {
            configurators,
            proxy_wrappers,
        }
    }

    /// Instantiates every candidate hook in order
    ///
    /// # Errors
    /// Returns [`DiscoveryErrorKind`] for the first candidate that can't be constructed
    pub fn discover(hooks: Hooks) -> Result<Self, DiscoveryErrorKind> {
        let mut configurators = ConfiguratorSet::new();
        for (name, candidate) in hooks.configurators {
            let configurator = candidate().map_err(|source| DiscoveryErrorKind::Configurator { name, source })?;
            configurators.push(configurator);
            debug!(configurator = name, "Discovered");
        }

        let mut proxy_wrappers = ProxyWrapperSet::new();
        for (name, candidate) in hooks.proxy_wrappers {
            let wrapper = candidate().map_err(|source| DiscoveryErrorKind::ProxyWrapper { name, source })?;
            proxy_wrappers.push(wrapper);
            debug!(proxy_wrapper = name, "Discovered");
        }

        Ok(Self::new(configurators, proxy_wrappers))
    }

    #[inline]
    #[must_use]
    pub fn configurators(&self) -> &ConfiguratorSet {
        &self.configurators
    }

    #[inline]
    #[must_use]
    pub fn proxy_wrappers(&self) -> &ProxyWrapperSet {
        &self.proxy_wrappers
    }

    /// # Errors
    /// Returns the first failure of instantiation, configuration, post-construct callback or wrapping
    pub fn create_object(&self, target: &Resolved, context: &Context) -> Result<Instance, ResolveErrorKind> {
        let implementation = target.implementation();
        let span = info_span!("create_object", implementation = implementation.type_info().name);
        let _guard = span.enter();

        let mut instance = implementation.instantiate()?;
        debug!("Instantiated");

        self.configurators
            .apply_all(&mut Object::new(&mut *instance, implementation), context)?;

        implementation.post_construct(&mut *instance)?;
        if let Some(method) = implementation.post_construct_name() {
            debug!(method, "Post-construct callback invoked");
        }

        let instance = target.share(instance)?;
        self.proxy_wrappers.wrap_all(instance, target, context)
    }
}
