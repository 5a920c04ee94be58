use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::args::Args;
use crate::errors::FactoryResult;

/// Registered generation function; `Value::Null` means "no value".
pub(crate) type GenFn = Arc<dyn Fn(&mut Args<'_>) -> FactoryResult<Value> + Send + Sync>;

/// Post-build hook.
pub(crate) type HookFn<T> = Arc<dyn Fn(&mut T, &Args<'_>) -> FactoryResult<()> + Send + Sync>;

/// Rule used to resolve one field position.
#[derive(Clone)]
pub(crate) enum FieldGenerator {
    /// Keep the zero value.
    Unset,
    /// Value captured from the model the factory was created with.
    Static(Value),
    Dynamic(GenFn),
}

impl FieldGenerator {
    pub(crate) fn from_default(default: Option<&Value>) -> Self {
        match default {
            Some(value) => FieldGenerator::Static(value.clone()),
            None => FieldGenerator::Unset,
        }
    }
}

pub(crate) fn generator_fn<F>(generate: F) -> GenFn
where
    F: Fn(&mut Args<'_>) -> FactoryResult<Value> + Send + Sync + 'static,
{
    Arc::new(generate)
}

pub(crate) fn to_field_value<V: Serialize>(value: V) -> FactoryResult<Value> {
    Ok(serde_json::to_value(value)?)
}
