use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum ConfigErrorKind {
    #[error("{implementation} declares more than one post-construct callback: `{first}` and `{second}`")]
    MultiplePostConstruct {
        implementation: TypeInfo,
        first: &'static str,
        second: &'static str,
    },
    #[error("{implementation} declares field `{field}` more than once")]
    DuplicateField { implementation: TypeInfo, field: &'static str },
    #[error("Deprecated {implementation} is reachable through {capability}, which isn't interceptable")]
    NotInterceptable {
        implementation: TypeInfo,
        capability: TypeInfo,
    },
}
