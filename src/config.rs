use alloc::sync::Arc;
use tracing::{debug, error};

use crate::{
    any::{BoxAny, Map, TypeInfo},
    descriptor::{Component, Implementation},
    errors::{ConfigErrorKind, ResolveErrorKind},
    instance::Instance,
    proxy::{Intercept, Interceptor, Proxy},
};

type UpcastFn = Arc<dyn Fn(Instance) -> Result<Instance, ResolveErrorKind> + Send + Sync>;
type ForwardFn = Arc<dyn Fn(&Instance, Arc<dyn Interceptor>) -> Option<Instance> + Send + Sync>;
type ImplementationFactory = fn() -> Result<Implementation, ConfigErrorKind>;

#[derive(Clone, Copy)]
struct Registration {
    factory: ImplementationFactory,
    /// Registered with [`ConfigBuilder::component`], not only as a binding target
    explicit: bool,
}

#[derive(Clone)]
struct Binding {
    implementation: TypeInfo,
    upcast: UpcastFn,
}

/// Binding registry: maps capabilities to the implementations that satisfy them.
///
/// Immutable once built, so it's shared between threads without locking.
pub struct Config {
    components: Map<Arc<Implementation>>,
    bindings: Map<Binding>,
    forwarders: Map<ForwardFn>,
}

impl Config {
    #[inline]
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Resolves a capability to the implementation that builds it.
    ///
    /// A registered component resolves to itself, any other capability goes through the explicit bindings.
    /// Deprecated components are reachable only through their bindings.
    ///
    /// # Errors
    /// Returns [`ResolveErrorKind::UnresolvedBinding`] if the capability is neither a component nor bound
    pub fn resolve(&self, capability: TypeInfo) -> Result<Resolved, ResolveErrorKind> {
        let forward = self.forwarders.get(&capability).cloned();

        if let Some(implementation) = self.identity(capability) {
            return Ok(Resolved {
                capability,
                implementation: implementation.clone(),
                upcast: None,
                forward,
            });
        }

        let resolved = self.bindings.get(&capability).and_then(|binding| {
            self.components.get(&binding.implementation).map(|implementation| Resolved {
                capability,
                implementation: implementation.clone(),
                upcast: Some(binding.upcast.clone()),
                forward,
            })
        });
        resolved.ok_or(ResolveErrorKind::UnresolvedBinding { capability })
    }

    /// Checks whether the capability resolves to an implementation
    #[inline]
    #[must_use]
    pub fn contains(&self, capability: TypeInfo) -> bool {
        self.identity(capability).is_some() || self.bindings.contains_key(&capability)
    }

    fn identity(&self, capability: TypeInfo) -> Option<&Arc<Implementation>> {
        self.components
            .get(&capability)
            .filter(|implementation| !implementation.modifiers().deprecated)
    }

    /// Count of registered components
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Outcome of [`Config::resolve`]
#[derive(Clone)]
pub struct Resolved {
    capability: TypeInfo,
    implementation: Arc<Implementation>,
    upcast: Option<UpcastFn>,
    forward: Option<ForwardFn>,
}

impl Resolved {
    /// Requested capability, the singleton cache key
    #[inline]
    #[must_use]
    pub fn capability(&self) -> TypeInfo {
        self.capability
    }

    #[inline]
    #[must_use]
    pub fn implementation(&self) -> &Implementation {
        &self.implementation
    }

    /// Checks whether the capability can be wrapped by a forwarding [`Proxy`]
    #[inline]
    #[must_use]
    pub fn is_interceptable(&self) -> bool {
        self.forward.is_some()
    }

    /// Wraps the instance with a forwarding proxy calling `interceptor` before each method.
    /// Returns `None` if the capability isn't interceptable.
    #[inline]
    #[must_use]
    pub fn forward(&self, instance: &Instance, interceptor: Arc<dyn Interceptor>) -> Option<Instance> {
        self.forward.as_ref().and_then(|forward| forward(instance, interceptor))
    }

    /// Moves the configured object behind a handle typed by the requested capability
    pub(crate) fn share(&self, instance: BoxAny) -> Result<Instance, ResolveErrorKind> {
        let instance = self.implementation.share(instance)?;
        match &self.upcast {
            Some(upcast) => upcast(instance),
            None => Ok(instance),
        }
    }
}

#[derive(Default)]
pub struct ConfigBuilder {
    components: Map<Registration>,
    bindings: Map<Binding>,
    forwarders: Map<ForwardFn>,
}

impl ConfigBuilder {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a concrete component, it resolves to itself.
    ///
    /// # Warning
    /// A deprecated component can't be proxied when requested by its own type,
    /// registering one is rejected by [`Self::build`]. Bind it to an interceptable capability instead.
    #[inline]
    #[must_use]
    pub fn component<T: Component>(mut self) -> Self {
        self.components.insert(
            TypeInfo::of::<T>(),
            Registration {
                factory: Implementation::of::<T>,
                explicit: true,
            },
        );
        self
    }

    /// Binds capability `C` to component `I`, registering `I` as well.
    /// The last binding of a capability wins.
    /// If `I` is deprecated, `C` must be registered with [`Self::interceptable`].
    ///
    /// `upcast` turns the shared implementation into the capability, see [`crate::upcast`].
    #[must_use]
    pub fn bind<C, I>(mut self, upcast: impl Fn(Arc<I>) -> Arc<C> + Send + Sync + 'static) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        I: Component,
    {
        let capability = TypeInfo::of::<C>();
        let implementation = TypeInfo::of::<I>();

        let upcast = move |instance: Instance| -> Result<Instance, ResolveErrorKind> {
            match instance.downcast::<I>() {
                Some(instance) => Ok(Instance::new(upcast(instance))),
                None => Err(ResolveErrorKind::IncorrectType {
                    expected: implementation,
                    actual: instance.capability(),
                }),
            }
        };

        self.components.entry(implementation).or_insert(Registration {
            factory: Implementation::of::<I>,
            explicit: false,
        });
        if let Some(previous) = self.bindings.insert(
            capability,
            Binding {
                implementation,
                upcast: Arc::new(upcast),
            },
        ) {
            debug!(
                capability = capability.name,
                previous = previous.implementation.name,
                implementation = implementation.name,
                "Binding overridden"
            );
        }
        self
    }

    /// Allows proxy wrappers to substitute instances of capability `C` with a forwarding [`Proxy`]
    #[must_use]
    pub fn interceptable<C>(mut self) -> Self
    where
        C: ?Sized + Intercept,
    {
        let forward = |instance: &Instance, interceptor: Arc<dyn Interceptor>| -> Option<Instance> {
            instance
                .downcast::<C>()
                .map(|target| Instance::new(C::intercept(Proxy::new(target, interceptor))))
        };

        self.forwarders.insert(TypeInfo::of::<C>(), Arc::new(forward));
        self
    }

    /// Validates the descriptors of all components and freezes the registry
    ///
    /// # Errors
    /// - Returns [`ConfigErrorKind`] for the first invalid descriptor
    /// - Returns [`ConfigErrorKind::NotInterceptable`] if a deprecated component is registered by its own type
    ///   or bound to a capability that isn't interceptable
    pub fn build(self) -> Result<Config, ConfigErrorKind> {
        let mut components = Map::new();
        for (type_info, registration) in self.components {
            let implementation = (registration.factory)()?;
            if registration.explicit && implementation.modifiers().deprecated {
                return Err(not_interceptable(type_info, type_info));
            }
            components.insert(type_info, Arc::new(implementation));
        }

        for (capability, binding) in &self.bindings {
            let deprecated = components
                .get(&binding.implementation)
                .is_some_and(|implementation| implementation.modifiers().deprecated);
            if deprecated && !self.forwarders.contains_key(capability) {
                return Err(not_interceptable(binding.implementation, *capability));
            }
        }

        debug!(
            components = components.len(),
            bindings = self.bindings.len(),
            interceptable = self.forwarders.len(),
            "Config built"
        );

        Ok(Config {
            components,
            bindings: self.bindings,
            forwarders: self.forwarders,
        })
    }
}

fn not_interceptable(implementation: TypeInfo, capability: TypeInfo) -> ConfigErrorKind {
    let err = ConfigErrorKind::NotInterceptable {
        implementation,
        capability,
    };
    error!("{}", err);
    err
}

#[cfg(test)]
mod tests {
    use super::Config;
    use crate::{any::TypeInfo, Component, ConfigErrorKind, Descriptor, Intercept, Proxy, ResolveErrorKind};

    use alloc::{boxed::Box, sync::Arc};

    trait Greeter: Send + Sync {
        fn greet(&self) -> &'static str;
    }

    #[derive(Default)]
    struct LoudGreeter;

    impl Greeter for LoudGreeter {
        fn greet(&self) -> &'static str {
            "HELLO"
        }
    }

    impl Component for LoudGreeter {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::<Self>::new().singleton()
        }
    }

    impl Greeter for Proxy<dyn Greeter> {
        fn greet(&self) -> &'static str {
            self.invoke("greet", |target| target.greet())
        }
    }

    impl Intercept for dyn Greeter {
        fn intercept(proxy: Proxy<Self>) -> Arc<Self> {
            Arc::new(proxy)
        }
    }

    #[derive(Default)]
    struct OldGreeter;

    impl Greeter for OldGreeter {
        fn greet(&self) -> &'static str {
            "hi"
        }
    }

    impl Component for OldGreeter {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::<Self>::new().deprecated()
        }
    }

    #[derive(Default)]
    struct QuietGreeter;

    impl Greeter for QuietGreeter {
        fn greet(&self) -> &'static str {
            "hello"
        }
    }

    impl Component for QuietGreeter {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::<Self>::new()
        }
    }

    #[test]
    fn test_identity_resolution() {
        let config = Config::builder().component::<LoudGreeter>().build().unwrap();

        let resolved = config.resolve(TypeInfo::of::<LoudGreeter>()).unwrap();
        assert_eq!(resolved.capability(), TypeInfo::of::<LoudGreeter>());
        assert_eq!(resolved.implementation().type_info(), TypeInfo::of::<LoudGreeter>());
        assert!(!resolved.is_interceptable());
    }

    #[test]
    fn test_bound_resolution() {
        let config = Config::builder()
            .bind::<dyn Greeter, _>(upcast!(LoudGreeter => dyn Greeter))
            .build()
            .unwrap();

        let resolved = config.resolve(TypeInfo::of::<dyn Greeter>()).unwrap();
        assert_eq!(resolved.capability(), TypeInfo::of::<dyn Greeter>());
        assert_eq!(resolved.implementation().type_info(), TypeInfo::of::<LoudGreeter>());
        assert!(resolved.implementation().modifiers().singleton);

        let instance = resolved.share(Box::new(LoudGreeter)).unwrap();
        assert_eq!(instance.downcast::<dyn Greeter>().unwrap().greet(), "HELLO");
        assert!(config.contains(TypeInfo::of::<LoudGreeter>()));
    }

    #[test]
    fn test_last_binding_wins() {
        let config = Config::builder()
            .bind::<dyn Greeter, _>(upcast!(LoudGreeter => dyn Greeter))
            .bind::<dyn Greeter, _>(upcast!(QuietGreeter => dyn Greeter))
            .build()
            .unwrap();

        let resolved = config.resolve(TypeInfo::of::<dyn Greeter>()).unwrap();
        assert_eq!(resolved.implementation().type_info(), TypeInfo::of::<QuietGreeter>());
        assert_eq!(config.len(), 2);
    }

    #[test]
    fn test_unresolved_binding() {
        let config = Config::builder().component::<LoudGreeter>().build().unwrap();

        assert!(matches!(
            config.resolve(TypeInfo::of::<dyn Greeter>()),
            Err(ResolveErrorKind::UnresolvedBinding { capability }) if capability == TypeInfo::of::<dyn Greeter>()
        ));
        assert!(!config.contains(TypeInfo::of::<dyn Greeter>()));
    }

    #[test]
    fn test_empty() {
        let config = Config::builder().build().unwrap();

        assert!(config.is_empty());
    }

    #[test]
    fn test_deprecated_behind_interceptable() {
        let config = Config::builder()
            .bind::<dyn Greeter, _>(upcast!(OldGreeter => dyn Greeter))
            .interceptable::<dyn Greeter>()
            .build()
            .unwrap();

        let resolved = config.resolve(TypeInfo::of::<dyn Greeter>()).unwrap();
        assert!(resolved.is_interceptable());
        assert!(!config.contains(TypeInfo::of::<OldGreeter>()));
        assert!(matches!(
            config.resolve(TypeInfo::of::<OldGreeter>()),
            Err(ResolveErrorKind::UnresolvedBinding { .. })
        ));
    }

    #[test]
    fn test_deprecated_behind_not_interceptable() {
        let result = Config::builder()
            .bind::<dyn Greeter, _>(upcast!(OldGreeter => dyn Greeter))
            .build();

        assert!(matches!(
            result,
            Err(ConfigErrorKind::NotInterceptable { implementation, capability })
                if implementation == TypeInfo::of::<OldGreeter>() && capability == TypeInfo::of::<dyn Greeter>()
        ));
    }

    #[test]
    fn test_deprecated_component_rejected() {
        let result = Config::builder()
            .component::<OldGreeter>()
            .bind::<dyn Greeter, _>(upcast!(OldGreeter => dyn Greeter))
            .interceptable::<dyn Greeter>()
            .build();

        assert!(matches!(
            result,
            Err(ConfigErrorKind::NotInterceptable { implementation, capability })
                if implementation == TypeInfo::of::<OldGreeter>() && capability == implementation
        ));
    }
}
