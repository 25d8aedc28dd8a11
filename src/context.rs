use alloc::sync::Arc;
use parking_lot::Mutex;
use tracing::{debug, error, info_span};

use crate::{
    any::TypeInfo,
    cache::Cache,
    config::{Config, Resolved},
    errors::{DiscoveryErrorKind, ResolveErrorKind},
    factory::{Hooks, ObjectFactory},
    instance::Instance,
    lock::KeyedLocks,
};

/// Container entry point.
///
/// Resolves capabilities through the [`Config`], builds instances with the [`ObjectFactory`]
/// and keeps singleton-scoped instances for its whole lifetime.
/// Cloning is cheap, clones share the registry, the factory and the cache.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    config: Config,
    factory: ObjectFactory,
    cache: Mutex<Cache>,
    locks: KeyedLocks<TypeInfo>,
}

impl Context {
    /// Starts a context with the default [`Hooks`]
    #[inline]
    #[must_use]
    pub fn builder(config: Config) -> ContextBuilder {
        ContextBuilder {
            config,
            hooks: Hooks::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn new(config: Config, factory: ObjectFactory) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                config,
                factory,
                cache: Mutex::new(Cache::new()),
                locks: KeyedLocks::new(),
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    #[inline]
    #[must_use]
    pub fn factory(&self) -> &ObjectFactory {
        &self.inner.factory
    }

    /// Gets an instance of capability `C`.
    ///
    /// A cached singleton is returned as is. Otherwise the capability is resolved and a new instance is built;
    /// it's cached under `C` if its implementation is singleton-scoped.
    /// Concurrent callers requesting the same singleton-scoped capability wait for a single construction.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::UnresolvedBinding`] if `C` has no implementation, nothing is constructed or cached
    /// - Returns the construction errors of [`ObjectFactory::create_object`]
    pub fn get_object<C>(&self) -> Result<Arc<C>, ResolveErrorKind>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let capability = TypeInfo::of::<C>();
        let span = info_span!("get_object", capability = capability.name);
        let _guard = span.enter();

        if let Some(instance) = self.inner.cache.lock().get::<C>(&capability) {
            debug!("Found in cache");
            return Ok(instance);
        }
        debug!("Not found in cache");

        let target = match self.inner.config.resolve(capability) {
            Ok(target) => target,
            Err(err) => {
                error!("{}", err);
                return Err(err);
            }
        };

        if !target.implementation().modifiers().singleton {
            let instance = self.create_object(&target)?;
            return downcast(&instance);
        }

        let lock = self.inner.locks.get(capability);
        let _construction = lock.lock();

        if let Some(instance) = self.inner.cache.lock().get::<C>(&capability) {
            debug!("Constructed by concurrent caller");
            return Ok(instance);
        }

        let instance = self.create_object(&target)?;
        let dependency = downcast(&instance)?;

        let mut cache = self.inner.cache.lock();
        cache.insert(capability, instance);
        debug!(cached = cache.len(), "Cached");

        Ok(dependency)
    }

    /// Checks whether a singleton is cached for capability `C`
    #[inline]
    #[must_use]
    pub fn is_cached<C: ?Sized + 'static>(&self) -> bool {
        self.inner.cache.lock().contains(&TypeInfo::of::<C>())
    }

    fn create_object(&self, target: &Resolved) -> Result<Instance, ResolveErrorKind> {
        self.inner.factory.create_object(target, self).map_err(|err| {
            error!("{}", err);
            err
        })
    }
}

fn downcast<C>(instance: &Instance) -> Result<Arc<C>, ResolveErrorKind>
where
    C: ?Sized + Send + Sync + 'static,
{
    instance.downcast::<C>().ok_or_else(|| {
        let err = ResolveErrorKind::IncorrectType {
            expected: TypeInfo::of::<C>(),
            actual: instance.capability(),
        };
        error!("{}", err);
        err
    })
}

/// Context in the uninitialized state: the registry is set, hooks aren't discovered yet
pub struct ContextBuilder {
    config: Config,
    hooks: Hooks,
}

impl ContextBuilder {
    #[inline]
    #[must_use]
    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Discovers the hooks and attaches the object factory
    ///
    /// # Errors
    /// Returns [`DiscoveryErrorKind`] if a hook can't be constructed
    pub fn build(self) -> Result<Context, DiscoveryErrorKind> {
        let factory = match ObjectFactory::discover(self.hooks) {
            Ok(factory) => factory,
            Err(err) => {
                error!("{}", err);
                return Err(err);
            }
        };
        debug!(
            configurators = factory.configurators().len(),
            proxy_wrappers = factory.proxy_wrappers().len(),
            "Context ready"
        );

        Ok(Context::new(self.config, factory))
    }
}
