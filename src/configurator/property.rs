use alloc::{borrow::ToOwned as _, string::String, sync::Arc};
use tracing::{debug, error};

use super::{Configurator, Object};
use crate::{errors::ResolveErrorKind, properties::Properties, Context};

/// Policy for an inject-property field whose key is absent from the property source
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PropertyMode {
    /// The field is assigned `None`
    #[default]
    Lenient,
    /// The construction fails with [`ResolveErrorKind::MissingProperty`]
    Strict,
}

/// Fills every inject-property field from a property source loaded once at discovery
#[derive(Clone, Debug, Default)]
pub struct InjectProperty {
    properties: Arc<Properties>,
    mode: PropertyMode,
}

impl InjectProperty {
    #[inline]
    #[must_use]
    pub fn new(properties: Properties) -> Self {
        Self {
            properties: Arc::new(properties),
            mode: PropertyMode::default(),
        }
    }

    /// Loads the property source from a file
    ///
    /// # Errors
    /// Returns [`crate::PropertiesErrorKind`] if the file can't be read or parsed
    #[cfg(feature = "std")]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, crate::PropertiesErrorKind> {
        Properties::load(path).map(Self::new)
    }

    #[inline]
    #[must_use]
    pub fn mode(mut self, mode: PropertyMode) -> Self {
        self.mode = mode;
        self
    }

    #[inline]
    #[must_use]
    pub fn strict(self) -> Self {
        self.mode(PropertyMode::Strict)
    }

    #[inline]
    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl Configurator for InjectProperty {
    fn configure(&self, object: &mut Object<'_>, _context: &Context) -> Result<(), ResolveErrorKind> {
        for field in object.fields() {
            let Some(key) = field.property_key() else {
                continue;
            };

            let value = self.properties.get(key).map(String::from);
            if value.is_none() {
                if self.mode == PropertyMode::Strict {
                    let err = ResolveErrorKind::MissingProperty {
                        implementation: object.implementation().type_info(),
                        field: field.name(),
                        key: key.to_owned(),
                    };
                    error!("{}", err);
                    return Err(err);
                }
                debug!(field = field.name(), key, "Property not found");
            }

            object.assign(field, value)?;
            debug!(field = field.name(), key, "Property assigned");
        }
        Ok(())
    }
}
