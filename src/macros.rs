/// Creates the closure that turns a shared implementation into one of its capabilities.
///
/// # Syntax
/// ```text
/// upcast!(Implementation => dyn Capability)
/// ```
///
/// # Examples
/// ```rust
/// use wirebox::{upcast, Component, Config, Descriptor};
///
/// trait Greeter: Send + Sync {}
///
/// #[derive(Default)]
/// struct LoudGreeter;
///
/// impl Greeter for LoudGreeter {}
///
/// impl Component for LoudGreeter {
///     fn descriptor() -> Descriptor<Self> {
///         Descriptor::<Self>::new()
///     }
/// }
///
/// let config = Config::builder()
///     .bind::<dyn Greeter, _>(upcast!(LoudGreeter => dyn Greeter))
///     .build()
///     .unwrap();
/// ```
#[macro_export]
macro_rules! upcast {
    ($impl:ty => $capability:ty) => {
        |instance: $crate::__private::Arc<$impl>| -> $crate::__private::Arc<$capability> { instance }
    };
}
