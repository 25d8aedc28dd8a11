use tracing::debug;

use super::{Configurator, Object};
use crate::{errors::ResolveErrorKind, Context};

/// Fills every inject-by-capability field with the instance the context resolves for its capability
#[derive(Clone, Copy, Debug, Default)]
pub struct InjectByCapability;

impl Configurator for InjectByCapability {
    fn configure(&self, object: &mut Object<'_>, context: &Context) -> Result<(), ResolveErrorKind> {
        for field in object.fields() {
            let Some(capability) = field.capability() else {
                continue;
            };

            object.inject(field, context)?;
            debug!(field = field.name(), capability = capability.name, "Injected");
        }
        Ok(())
    }
}
