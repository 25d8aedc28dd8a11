use alloc::sync::Arc;
use tracing::{debug, error, warn};

use super::{Interceptor, ProxyWrapper};
use crate::{any::TypeInfo, config::Resolved, errors::ResolveErrorKind, instance::Instance, Context};

/// Wraps instances of deprecated implementations with a proxy that warns on every method call.
///
/// [`crate::ConfigBuilder::build`] only accepts deprecated implementations behind interceptable capabilities.
/// An instance that still can't be forwarded is refused with [`ResolveErrorKind::NotInterceptable`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DeprecationWrapper;

impl ProxyWrapper for DeprecationWrapper {
    fn wrap(&self, instance: Instance, target: &Resolved, _context: &Context) -> Result<Instance, ResolveErrorKind> {
        let implementation = target.implementation().type_info();
        if !target.implementation().modifiers().deprecated {
            return Ok(instance);
        }

        match target.forward(&instance, Arc::new(DeprecationWarning { implementation })) {
            Some(proxy) => {
                debug!(implementation = implementation.name, "Wrapped with deprecation proxy");
                Ok(proxy)
            }
            None => {
                let err = ResolveErrorKind::NotInterceptable {
                    implementation,
                    capability: target.capability(),
                };
                error!("{}", err);
                Err(err)
            }
        }
    }
}

struct DeprecationWarning {
    implementation: TypeInfo,
}

impl Interceptor for DeprecationWarning {
    fn before(&self, method: &'static str) {
        warn!(
            implementation = self.implementation.name,
            method, "Deprecated implementation in use, consider migrating"
        );
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::DeprecationWarning;
    use crate::{any::TypeInfo, Proxy};

    use alloc::{
        format,
        string::{String, ToString as _},
        sync::Arc,
    };
    use tracing_test::traced_test;

    struct OldSpy;

    impl OldSpy {
        fn watch(&self) -> u8 {
            7
        }
    }

    #[test]
    #[traced_test]
    fn test_warns_before_each_call() {
        let proxy = Proxy::new(
            Arc::new(OldSpy),
            Arc::new(DeprecationWarning {
                implementation: TypeInfo::of::<OldSpy>(),
            }),
        );

        assert_eq!(proxy.invoke("watch", OldSpy::watch), 7);
        assert_eq!(proxy.invoke("watch", OldSpy::watch), 7);

        assert!(logs_contain("Deprecated implementation in use"));
        logs_assert(|lines: &[&str]| {
            match lines
                .iter()
                .filter(|line| line.contains("Deprecated implementation in use"))
                .count()
            {
                2 => Ok(()),
                n => Err(format!("Expected two warnings, got {n}")),
            }
        });
    }
}
