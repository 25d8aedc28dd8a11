use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Barrier,
    },
    thread,
};

use tracing_test::traced_test;
use wirebox::{
    upcast, Component, Config, ConfigErrorKind, Context, Descriptor, DiscoveryErrorKind, Hooks, Intercept, Properties,
    Proxy, ResolveErrorKind, TypeInfo,
};

trait Greeter: Send + Sync {
    fn greet(&self, name: &str) -> String;
}

impl Greeter for Proxy<dyn Greeter> {
    fn greet(&self, name: &str) -> String {
        self.invoke("greet", |target| target.greet(name))
    }
}

impl Intercept for dyn Greeter {
    fn intercept(proxy: Proxy<Self>) -> Arc<Self> {
        Arc::new(proxy)
    }
}

#[derive(Default)]
struct LoudGreeter;

impl Greeter for LoudGreeter {
    fn greet(&self, name: &str) -> String {
        format!("HELLO, {}!", name.to_uppercase())
    }
}

impl Component for LoudGreeter {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new().singleton()
    }
}

static COUNTED_GREETERS_CREATED: AtomicUsize = AtomicUsize::new(0);

struct CountedGreeter;

impl Greeter for CountedGreeter {
    fn greet(&self, name: &str) -> String {
        format!("Hello, {name}")
    }
}

impl Component for CountedGreeter {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::with_constructor(|| {
            COUNTED_GREETERS_CREATED.fetch_add(1, Ordering::SeqCst);
            thread::yield_now();
            Ok(Self)
        })
        .singleton()
    }
}

#[derive(Default)]
struct OldGreeter {
    salutation: Option<String>,
}

impl Greeter for OldGreeter {
    fn greet(&self, name: &str) -> String {
        format!("{}, {name}", self.salutation.as_deref().unwrap_or("Hi"))
    }
}

impl Component for OldGreeter {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new()
            .deprecated()
            .inject_property("salutation", |this, salutation| this.salutation = salutation)
    }
}

#[derive(Default)]
struct PoliteGreeter {
    salutation: Option<String>,
}

impl Greeter for PoliteGreeter {
    fn greet(&self, name: &str) -> String {
        format!("{}, {name}", self.salutation.as_deref().unwrap_or("Hello"))
    }
}

impl Component for PoliteGreeter {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new().inject_property("salutation", |this, salutation| this.salutation = salutation)
    }
}

trait Spy: Send + Sync {}

#[derive(Default)]
struct AngrySpy;

impl Spy for AngrySpy {}

impl Component for AngrySpy {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new().deprecated()
    }
}

trait Unbound: Send + Sync {}

fn deprecation_context() -> Context {
    let config = Config::builder()
        .bind::<dyn Greeter, _>(upcast!(OldGreeter => dyn Greeter))
        .interceptable::<dyn Greeter>()
        .build()
        .unwrap();

    Context::builder(config)
        .hooks(Hooks::with_properties(Properties::from_iter([("salutation", "Good day")])))
        .build()
        .unwrap()
}

#[test]
#[traced_test]
fn deprecated_implementation_warns_on_every_call() {
    let context = deprecation_context();

    let greeter = context.get_object::<dyn Greeter>().unwrap();
    assert!(!logs_contain("Deprecated implementation in use"));

    assert_eq!(greeter.greet("exam"), OldGreeter { salutation: Some("Good day".to_owned()) }.greet("exam"));
    logs_assert(|lines: &[&str]| {
        match lines.iter().filter(|line| line.contains("Deprecated implementation in use")).count() {
            1 => Ok(()),
            n => Err(format!("Expected one warning, got {n}")),
        }
    });

    greeter.greet("exam");
    logs_assert(|lines: &[&str]| {
        match lines.iter().filter(|line| line.contains("Deprecated implementation in use")).count() {
            2 => Ok(()),
            n => Err(format!("Expected two warnings, got {n}")),
        }
    });
}

#[test]
fn deprecated_implementation_behind_not_interceptable_capability_rejected() {
    let result = Config::builder()
        .bind::<dyn Spy, _>(upcast!(AngrySpy => dyn Spy))
        .build();

    assert!(matches!(
        result,
        Err(ConfigErrorKind::NotInterceptable { implementation, capability })
            if implementation == TypeInfo::of::<AngrySpy>() && capability == TypeInfo::of::<dyn Spy>()
    ));
}

#[test]
fn deprecated_implementation_isnt_reachable_by_own_type() {
    let result = Config::builder().component::<AngrySpy>().build();
    assert!(matches!(result, Err(ConfigErrorKind::NotInterceptable { .. })));

    let context = deprecation_context();
    let err = context.get_object::<OldGreeter>().err().unwrap();

    assert!(matches!(err, ResolveErrorKind::UnresolvedBinding { .. }));
    assert!(context.get_object::<dyn Greeter>().is_ok());
}

#[test]
#[traced_test]
fn not_deprecated_implementation_isnt_wrapped() {
    let config = Config::builder()
        .bind::<dyn Greeter, _>(upcast!(LoudGreeter => dyn Greeter))
        .interceptable::<dyn Greeter>()
        .build()
        .unwrap();
    let context = Context::builder(config).build().unwrap();

    let greeter = context.get_object::<dyn Greeter>().unwrap();

    assert_eq!(greeter.greet("exam"), "HELLO, EXAM!");
    assert!(!logs_contain("Wrapped with deprecation proxy"));
    assert!(!logs_contain("Deprecated implementation in use"));
}

#[test]
fn concurrent_singleton_constructed_once() {
    let config = Config::builder()
        .bind::<dyn Greeter, _>(upcast!(CountedGreeter => dyn Greeter))
        .build()
        .unwrap();
    let context = Context::builder(config).build().unwrap();
    let barrier = Barrier::new(2);
    let created_before = COUNTED_GREETERS_CREATED.load(Ordering::SeqCst);

    let (greeter_1, greeter_2) = thread::scope(|scope| {
        let handle_1 = scope.spawn(|| {
            barrier.wait();
            context.get_object::<dyn Greeter>().unwrap()
        });
        let handle_2 = scope.spawn(|| {
            barrier.wait();
            context.get_object::<dyn Greeter>().unwrap()
        });
        (handle_1.join().unwrap(), handle_2.join().unwrap())
    });

    assert!(Arc::ptr_eq(&greeter_1, &greeter_2));
    assert_eq!(greeter_1.greet("exam"), "Hello, exam");
    assert_eq!(COUNTED_GREETERS_CREATED.load(Ordering::SeqCst) - created_before, 1);
}

#[test]
fn unbound_capability_isnt_constructed_or_cached() {
    let config = Config::builder().component::<LoudGreeter>().build().unwrap();
    let context = Context::builder(config).build().unwrap();

    let err = context.get_object::<dyn Unbound>().err().unwrap();

    assert!(matches!(err, ResolveErrorKind::UnresolvedBinding { .. }));
    assert!(!context.is_cached::<dyn Unbound>());
    assert!(context.get_object::<LoudGreeter>().is_ok());
}

#[test]
fn properties_loaded_from_file() {
    let path = std::env::temp_dir().join(format!("wirebox-{}.properties", std::process::id()));
    std::fs::write(&path, "salutation=Good evening\n").unwrap();

    let properties = Properties::load(&path).unwrap();
    let config = Config::builder().component::<PoliteGreeter>().build().unwrap();
    let context = Context::builder(config).hooks(Hooks::with_properties(properties)).build().unwrap();

    let config = Config::builder().component::<PoliteGreeter>().build().unwrap();
    let discovered = Context::builder(config)
        .hooks(Hooks::with_properties_file(&path))
        .build()
        .unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(context.get_object::<PoliteGreeter>().unwrap().greet("exam"), "Good evening, exam");
    assert_eq!(discovered.get_object::<PoliteGreeter>().unwrap().greet("exam"), "Good evening, exam");
}

#[test]
#[traced_test]
fn missing_properties_file_fails_discovery() {
    let path = std::env::temp_dir().join(format!("wirebox-{}-missing.properties", std::process::id()));
    let config = Config::builder().component::<PoliteGreeter>().build().unwrap();

    let result = Context::builder(config).hooks(Hooks::with_properties_file(path)).build();

    assert!(matches!(result, Err(DiscoveryErrorKind::Configurator { .. })));
    assert!(logs_contain("can't be constructed"));
}
