mod inject;
mod property;

pub use inject::InjectByCapability;
pub use property::{InjectProperty, PropertyMode};

use alloc::{boxed::Box, string::String, vec::Vec};
use core::any::Any;
use tracing::debug;

use crate::{
    descriptor::{AnyMut, Field, FieldKind, Implementation},
    errors::ResolveErrorKind,
    Context,
};

/// Hook that mutates a freshly constructed instance before it's usable.
///
/// Configurators run in discovery order, a later one sees and may overwrite
/// what an earlier one assigned. Lookups through `context` are allowed and build
/// nested dependencies on demand.
pub trait Configurator: Send + Sync + 'static {
    /// # Errors
    /// Implementations return [`ResolveErrorKind`] to abort the construction
    fn configure(&self, object: &mut Object<'_>, context: &Context) -> Result<(), ResolveErrorKind>;
}

/// Instance under construction together with its declared field table
pub struct Object<'a> {
    instance: AnyMut<'a>,
    implementation: &'a Implementation,
}

impl<'a> Object<'a> {
    #[inline]
    #[must_use]
    pub(crate) fn new(instance: AnyMut<'a>, implementation: &'a Implementation) -> Self {
        Self { instance, implementation }
    }

    #[inline]
    #[must_use]
    pub fn implementation(&self) -> &'a Implementation {
        self.implementation
    }

    #[inline]
    #[must_use]
    pub fn fields(&self) -> &'a [Field] {
        self.implementation.fields()
    }

    #[inline]
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.instance.downcast_ref()
    }

    #[inline]
    #[must_use]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.instance.downcast_mut()
    }

    /// Resolves the capability of an inject-by-capability field and assigns it.
    /// Does nothing for other fields.
    ///
    /// # Errors
    /// Returns the resolution error of the field capability
    pub fn inject(&mut self, field: &Field, context: &Context) -> Result<(), ResolveErrorKind> {
        match &field.kind {
            FieldKind::Capability { inject, .. } => inject(&mut *self.instance, context),
            FieldKind::Property { .. } => Ok(()),
        }
    }

    /// Assigns a value to an inject-property field.
    /// Does nothing for other fields.
    ///
    /// # Errors
    /// Returns [`ResolveErrorKind::FieldAccess`] if the field doesn't belong to the instance
    pub fn assign(&mut self, field: &Field, value: Option<String>) -> Result<(), ResolveErrorKind> {
        match &field.kind {
            FieldKind::Property { assign, .. } => assign(&mut *self.instance, value),
            FieldKind::Capability { .. } => Ok(()),
        }
    }
}

/// Configurators in discovery order
#[derive(Default)]
pub struct ConfiguratorSet {
    configurators: Vec<Box<dyn Configurator>>,
}

impl ConfiguratorSet {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, configurator: Box<dyn Configurator>) {
        self.configurators.push(configurator);
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.configurators.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.configurators.is_empty()
    }

    /// # Errors
    /// Returns the first configurator error, the remaining configurators aren't applied
    pub fn apply_all(&self, object: &mut Object<'_>, context: &Context) -> Result<(), ResolveErrorKind> {
        for configurator in &self.configurators {
            configurator.configure(object, context)?;
        }
        debug!(configurators = self.configurators.len(), "Configurators applied");
        Ok(())
    }
}
