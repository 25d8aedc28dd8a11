use alloc::{
    boxed::Box,
    collections::BTreeSet,
    string::String,
    sync::Arc,
    vec::Vec,
};
use core::{any::Any, marker::PhantomData};
use tracing::debug;

use crate::{
    any::{BoxAny, TypeInfo},
    errors::{ConfigErrorKind, InstantiateErrorKind, ResolveErrorKind},
    instance::Instance,
    Context,
};

pub(crate) type AnyMut<'a> = &'a mut (dyn Any + Send + Sync);

type InstantiateFn = Box<dyn Fn() -> Result<BoxAny, ResolveErrorKind> + Send + Sync>;
type ShareFn = Box<dyn Fn(BoxAny) -> Result<Instance, ResolveErrorKind> + Send + Sync>;
type InjectFn = Box<dyn Fn(AnyMut<'_>, &Context) -> Result<(), ResolveErrorKind> + Send + Sync>;
type AssignFn = Box<dyn Fn(AnyMut<'_>, Option<String>) -> Result<(), ResolveErrorKind> + Send + Sync>;
type CallbackFn = Box<dyn Fn(AnyMut<'_>) -> Result<(), ResolveErrorKind> + Send + Sync>;

/// A concrete type the container knows how to build.
///
/// The descriptor is the static replacement of field and method annotations:
/// it lists how to construct the type, its modifiers, the fields the container fills
/// and the post-construct callback.
///
/// # Examples
/// ```rust
/// use std::sync::Arc;
/// use wirebox::{Component, Descriptor};
///
/// trait Recommender: Send + Sync {}
///
/// #[derive(Default)]
/// struct Spy {
///     recommender: Option<Arc<dyn Recommender>>,
///     greeting: Option<String>,
/// }
///
/// impl Component for Spy {
///     fn descriptor() -> Descriptor<Self> {
///         Descriptor::<Self>::new()
///             .singleton()
///             .inject::<dyn Recommender>("recommender", |spy, recommender| spy.recommender = Some(recommender))
///             .inject_property("greeting", |spy, greeting| spy.greeting = greeting)
///     }
/// }
/// ```
pub trait Component: Send + Sync + Sized + 'static {
    fn descriptor() -> Descriptor<Self>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// At most one live instance per capability per context
    pub singleton: bool,
    /// Instances are wrapped by [`crate::DeprecationWrapper`]
    pub deprecated: bool,
}

pub struct Descriptor<T> {
    constructor: Box<dyn Fn() -> Result<T, InstantiateErrorKind> + Send + Sync>,
    modifiers: Modifiers,
    fields: Vec<Field>,
    post_construct: Vec<PostConstruct>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Descriptor<T>
where
    T: Default + Send + Sync + 'static,
{
    /// Descriptor with the default construction path
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_constructor(|| Ok(T::default()))
    }
}

impl<T> Default for Descriptor<T>
where
    T: Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Descriptor<T>
where
    T: Send + Sync + 'static,
{
    /// Descriptor with a fallible construction path.
    /// Its failure is reported as [`ResolveErrorKind::Instantiate`].
    #[inline]
    #[must_use]
    pub fn with_constructor(constructor: impl Fn() -> Result<T, InstantiateErrorKind> + Send + Sync + 'static) -> Self {
        Self {
            constructor: Box::new(constructor),
            modifiers: Modifiers::default(),
            fields: Vec::new(),
            post_construct: Vec::new(),
            _marker: PhantomData,
        }
    }

    #[inline]
    #[must_use]
    pub fn singleton(mut self) -> Self {
        self.modifiers.singleton = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn deprecated(mut self) -> Self {
        self.modifiers.deprecated = true;
        self
    }

    /// Declares a field filled with the instance resolved for capability `C`
    #[must_use]
    pub fn inject<C>(mut self, name: &'static str, setter: impl Fn(&mut T, Arc<C>) + Send + Sync + 'static) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let inject = move |instance: AnyMut<'_>, context: &Context| -> Result<(), ResolveErrorKind> {
            let dependency = context.get_object::<C>().map_err(|err| ResolveErrorKind::Dependency {
                implementation: TypeInfo::of::<T>(),
                field: name,
                source: Box::new(err),
            })?;
            let instance = downcast_field::<T>(instance, name)?;
            setter(instance, dependency);
            Ok(())
        };

        self.fields.push(Field {
            name,
            kind: FieldKind::Capability {
                capability: TypeInfo::of::<C>(),
                inject: Box::new(inject),
            },
        });
        self
    }

    /// Declares a field filled from the property source, looked up by the field name
    #[inline]
    #[must_use]
    pub fn inject_property(self, name: &'static str, setter: impl Fn(&mut T, Option<String>) + Send + Sync + 'static) -> Self {
        self.add_property(name, None, setter)
    }

    /// Declares a field filled from the property source, looked up by an explicit key
    #[inline]
    #[must_use]
    pub fn inject_property_with_key(
        self,
        name: &'static str,
        key: &'static str,
        setter: impl Fn(&mut T, Option<String>) + Send + Sync + 'static,
    ) -> Self {
        self.add_property(name, Some(key), setter)
    }

    /// Declares the lifecycle callback invoked after all configurators ran and before any proxy wrapper.
    ///
    /// # Warning
    /// Only one callback per type is accepted, declaring more is rejected by [`crate::ConfigBuilder::build`].
    #[must_use]
    pub fn post_construct(
        mut self,
        name: &'static str,
        callback: impl Fn(&mut T) -> Result<(), InstantiateErrorKind> + Send + Sync + 'static,
    ) -> Self {
        let call = move |instance: AnyMut<'_>| -> Result<(), ResolveErrorKind> {
            let instance = downcast_field::<T>(instance, name)?;
            callback(instance).map_err(|source| ResolveErrorKind::PostConstruct {
                implementation: TypeInfo::of::<T>(),
                method: name,
                source,
            })
        };

        self.post_construct.push(PostConstruct { name, call: Box::new(call) });
        self
    }

    fn add_property(
        mut self,
        name: &'static str,
        key: Option<&'static str>,
        setter: impl Fn(&mut T, Option<String>) + Send + Sync + 'static,
    ) -> Self {
        let assign = move |instance: AnyMut<'_>, value: Option<String>| -> Result<(), ResolveErrorKind> {
            setter(downcast_field::<T>(instance, name)?, value);
            Ok(())
        };

        self.fields.push(Field {
            name,
            kind: FieldKind::Property {
                key,
                assign: Box::new(assign),
            },
        });
        self
    }
}

fn downcast_field<'a, T: 'static>(instance: AnyMut<'a>, field: &'static str) -> Result<&'a mut T, ResolveErrorKind> {
    instance.downcast_mut::<T>().ok_or(ResolveErrorKind::FieldAccess {
        implementation: TypeInfo::of::<T>(),
        field,
    })
}

pub(crate) enum FieldKind {
    Capability { capability: TypeInfo, inject: InjectFn },
    Property { key: Option<&'static str>, assign: AssignFn },
}

/// Field declared by a [`Descriptor`]
pub struct Field {
    name: &'static str,
    pub(crate) kind: FieldKind,
}

impl Field {
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Capability of an inject-by-capability field
    #[inline]
    #[must_use]
    pub fn capability(&self) -> Option<TypeInfo> {
        match self.kind {
            FieldKind::Capability { capability, .. } => Some(capability),
            FieldKind::Property { .. } => None,
        }
    }

    /// Lookup key of an inject-property field: the explicit key or the field name
    #[inline]
    #[must_use]
    pub fn property_key(&self) -> Option<&'static str> {
        match self.kind {
            FieldKind::Property { key, .. } => Some(key.unwrap_or(self.name)),
            FieldKind::Capability { .. } => None,
        }
    }
}

struct PostConstruct {
    name: &'static str,
    call: CallbackFn,
}

/// Type-erased, validated [`Descriptor`]
pub struct Implementation {
    type_info: TypeInfo,
    modifiers: Modifiers,
    fields: Box<[Field]>,
    post_construct: Option<PostConstruct>,
    instantiate: InstantiateFn,
    share: ShareFn,
}

impl Implementation {
    pub(crate) fn of<T: Component>() -> Result<Self, ConfigErrorKind> {
        Self::from_descriptor(T::descriptor())
    }

    pub(crate) fn from_descriptor<T>(descriptor: Descriptor<T>) -> Result<Self, ConfigErrorKind>
    where
        T: Send + Sync + 'static,
    {
        let type_info = TypeInfo::of::<T>();
        let Descriptor {
            constructor,
            modifiers,
            fields,
            post_construct,
            ..
        } = descriptor;

        let mut names = BTreeSet::new();
        for field in &fields {
            if !names.insert(field.name) {
                return Err(ConfigErrorKind::DuplicateField {
                    implementation: type_info,
                    field: field.name,
                });
            }
        }

        let mut post_construct = post_construct.into_iter();
        let first = post_construct.next();
        if let (Some(first), Some(second)) = (&first, post_construct.next()) {
            return Err(ConfigErrorKind::MultiplePostConstruct {
                implementation: type_info,
                first: first.name,
                second: second.name,
            });
        }

        let instantiate = move || -> Result<BoxAny, ResolveErrorKind> {
            match constructor() {
                Ok(instance) => Ok(Box::new(instance) as BoxAny),
                Err(source) => Err(ResolveErrorKind::Instantiate {
                    implementation: type_info,
                    source,
                }),
            }
        };
        let share = move |instance: BoxAny| -> Result<Instance, ResolveErrorKind> {
            match instance.downcast::<T>() {
                Ok(instance) => Ok(Instance::new(Arc::new(*instance))),
                Err(_) => Err(ResolveErrorKind::IncorrectType {
                    expected: type_info,
                    actual: TypeInfo::of::<BoxAny>(),
                }),
            }
        };

        debug!(implementation = type_info.name, fields = fields.len(), "Descriptor validated");

        Ok(Self {
            type_info,
            modifiers,
            fields: fields.into_boxed_slice(),
            post_construct: first,
            instantiate: Box::new(instantiate),
            share: Box::new(share),
        })
    }

    #[inline]
    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    #[inline]
    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    #[inline]
    #[must_use]
    pub fn post_construct_name(&self) -> Option<&'static str> {
        self.post_construct.as_ref().map(|callback| callback.name)
    }

    #[inline]
    pub(crate) fn instantiate(&self) -> Result<BoxAny, ResolveErrorKind> {
        (self.instantiate)()
    }

    #[inline]
    pub(crate) fn post_construct(&self, instance: AnyMut<'_>) -> Result<(), ResolveErrorKind> {
        match &self.post_construct {
            Some(callback) => (callback.call)(instance),
            None => Ok(()),
        }
    }

    /// Moves the constructed instance behind a shared handle typed by the implementation
    #[inline]
    pub(crate) fn share(&self, instance: BoxAny) -> Result<Instance, ResolveErrorKind> {
        (self.share)(instance)
    }
}
