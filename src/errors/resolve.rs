use alloc::{boxed::Box, string::String};

use super::instantiate::InstantiateErrorKind;
use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("No implementation bound to capability {capability}")]
    UnresolvedBinding { capability: TypeInfo },
    #[error("Failed to instantiate {implementation}: {source}")]
    Instantiate {
        implementation: TypeInfo,
        source: InstantiateErrorKind,
    },
    #[error("Post-construct callback `{method}` of {implementation} failed: {source}")]
    PostConstruct {
        implementation: TypeInfo,
        method: &'static str,
        source: InstantiateErrorKind,
    },
    #[error("Property `{key}` required by field `{field}` of {implementation} not found")]
    MissingProperty {
        implementation: TypeInfo,
        field: &'static str,
        key: String,
    },
    #[error("Field `{field}` isn't accessible on instance of {implementation}")]
    FieldAccess { implementation: TypeInfo, field: &'static str },
    #[error("Deprecated {implementation} can't be forwarded as {capability}")]
    NotInterceptable { implementation: TypeInfo, capability: TypeInfo },
    #[error("Incorrect instance type. Actual: {actual:?}, expected: {expected:?}")]
    IncorrectType { expected: TypeInfo, actual: TypeInfo },
    #[error("Failed to inject field `{field}` of {implementation}: {source}")]
    Dependency {
        implementation: TypeInfo,
        field: &'static str,
        source: Box<ResolveErrorKind>,
    },
}
