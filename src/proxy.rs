mod deprecation;

pub use deprecation::DeprecationWrapper;

use alloc::{boxed::Box, sync::Arc, vec::Vec};
use tracing::{debug, error};

use crate::{config::Resolved, errors::ResolveErrorKind, instance::Instance, Context};

/// Hook that may substitute a configured instance with a forwarding one.
///
/// The returned instance must stay typed by the same capability as the input,
/// callers only interact with it through that capability.
pub trait ProxyWrapper: Send + Sync + 'static {
    /// # Errors
    /// Implementations return [`ResolveErrorKind`] to abort the construction
    fn wrap(&self, instance: Instance, target: &Resolved, context: &Context) -> Result<Instance, ResolveErrorKind>;
}

/// Called by a [`Proxy`] before every forwarded method
pub trait Interceptor: Send + Sync + 'static {
    fn before(&self, method: &'static str);
}

/// Forwarding handle to an instance of capability `C`.
///
/// A capability opts in to proxying by implementing [`Intercept`] and by being registered
/// with [`crate::ConfigBuilder::interceptable`].
///
/// # Examples
/// ```rust
/// use std::sync::Arc;
/// use wirebox::{Intercept, Proxy};
///
/// trait Greeter: Send + Sync {
///     fn greet(&self, name: &str) -> String;
/// }
///
/// impl Greeter for Proxy<dyn Greeter> {
///     fn greet(&self, name: &str) -> String {
///         self.invoke("greet", |target| target.greet(name))
///     }
/// }
///
/// impl Intercept for dyn Greeter {
///     fn intercept(proxy: Proxy<Self>) -> Arc<Self> {
///         Arc::new(proxy)
///     }
/// }
/// ```
pub struct Proxy<C: ?Sized> {
    target: Arc<C>,
    interceptor: Arc<dyn Interceptor>,
}

impl<C: ?Sized> Proxy<C> {
    #[inline]
    #[must_use]
    pub fn new(target: Arc<C>, interceptor: Arc<dyn Interceptor>) -> Self {
        Self { target, interceptor }
    }

    /// Notifies the interceptor, then delegates the call to the wrapped instance
    #[inline]
    pub fn invoke<R>(&self, method: &'static str, call: impl FnOnce(&C) -> R) -> R {
        self.interceptor.before(method);
        call(&self.target)
    }
}

/// Conversion of a [`Proxy`] back into the capability it forwards
pub trait Intercept: Send + Sync + 'static {
    fn intercept(proxy: Proxy<Self>) -> Arc<Self>;
}

/// Proxy wrappers in discovery order
#[derive(Default)]
pub struct ProxyWrapperSet {
    wrappers: Vec<Box<dyn ProxyWrapper>>,
}

impl ProxyWrapperSet {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, wrapper: Box<dyn ProxyWrapper>) {
        self.wrappers.push(wrapper);
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.wrappers.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wrappers.is_empty()
    }

    /// Folds the instance through every wrapper, each one receiving the previous output
    ///
    /// # Errors
    /// - Returns the first wrapper error
    /// - Returns [`ResolveErrorKind::IncorrectType`] if a wrapper changed the capability of the instance
    pub fn wrap_all(&self, instance: Instance, target: &Resolved, context: &Context) -> Result<Instance, ResolveErrorKind> {
        let mut instance = instance;
        for wrapper in &self.wrappers {
            instance = wrapper.wrap(instance, target, context)?;

            if instance.capability() != target.capability() {
                let err = ResolveErrorKind::IncorrectType {
                    expected: target.capability(),
                    actual: instance.capability(),
                };
                error!("{}", err);
                return Err(err);
            }
        }
        debug!(wrappers = self.wrappers.len(), "Proxy wrappers applied");
        Ok(instance)
    }
}
