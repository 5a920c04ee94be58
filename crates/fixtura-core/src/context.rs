use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

/// Execution context handed to every generator of a build.
///
/// Values are keyed by their type. Deriving a context never affects the one
/// it was derived from, except that cancelling a parent cancels its children.
#[derive(Clone, Default)]
pub struct Context {
    values: im::HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    token: CancellationToken,
}

impl Context {
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context carrying `value`, replacing any value of the same type.
    pub fn with_value<V: Any + Send + Sync>(&self, value: V) -> Self {
        Self {
            values: self.values.update(TypeId::of::<V>(), Arc::new(value)),
            token: self.token.clone(),
        }
    }

    pub fn value<V: Any + Send + Sync>(&self) -> Option<&V> {
        self.values
            .get(&TypeId::of::<V>())
            .and_then(|value| value.downcast_ref::<V>())
    }

    /// Derive a context that can be cancelled on its own.
    pub fn with_cancel(&self) -> Self {
        Self {
            values: self.values.clone(),
            token: self.token.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("values", &self.values.len())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Tenant(&'static str);

    #[test]
    fn with_value_does_not_touch_origin() {
        let base = Context::background();
        let derived = base.with_value(Tenant("acme"));
        assert_eq!(derived.value::<Tenant>(), Some(&Tenant("acme")));
        assert!(base.value::<Tenant>().is_none());

        let replaced = derived.with_value(Tenant("globex"));
        assert_eq!(replaced.value::<Tenant>(), Some(&Tenant("globex")));
        assert_eq!(derived.value::<Tenant>(), Some(&Tenant("acme")));
    }

    #[test]
    fn cancellation_flows_to_children_only() {
        let parent = Context::background();
        let child = parent.with_cancel();
        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());

        let other = parent.with_cancel();
        parent.cancel();
        assert!(other.is_cancelled());
    }
}
