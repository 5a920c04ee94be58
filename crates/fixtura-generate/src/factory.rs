use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use fixtura_core::{Model, ModelDescriptor};

use crate::args::Args;
use crate::errors::{FactoryError, FactoryResult};
use crate::generators::{FieldGenerator, GenFn, HookFn, generator_fn, to_field_value};
use crate::model::FactoryOptions;
use crate::pipeline::Pipeline;
use crate::sequence::Sequence;

/// Generator-set for one model type.
///
/// Registration happens at setup time and replaces the rule of one field.
/// Every build takes a snapshot of the registered rules, so a factory can be
/// shared across threads and built from concurrently.
///
/// `Factory` is a handle: clones share registrations. Sub-factory
/// registrations keep a handle to the sub factory, which is what lets a
/// factory refer to itself; such factories form a reference cycle and live
/// until the end of the process.
pub struct Factory<T> {
    pub(crate) inner: Arc<FactoryInner<T>>,
}

pub(crate) struct FactoryInner<T> {
    pub(crate) descriptor: ModelDescriptor,
    pub(crate) options: FactoryOptions,
    pub(crate) generators: RwLock<Vec<FieldGenerator>>,
    pub(crate) sequences: RwLock<HashMap<String, Arc<Sequence>>>,
    pub(crate) on_create: RwLock<Option<HookFn<T>>>,
}

impl<T> Clone for Factory<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for Factory<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factory")
            .field("model", &self.inner.descriptor.type_name())
            .field("fields", &self.inner.descriptor.len())
            .field("options", &self.inner.options)
            .finish()
    }
}

impl<T: Model> Factory<T> {
    /// Create a factory whose static defaults are the field values of `model`.
    ///
    /// Fields of `model` that serialize to `null` are left at their zero
    /// value by builds unless a generator is registered for them.
    pub fn new(model: T) -> FactoryResult<Self> {
        Self::with_options(model, FactoryOptions::default())
    }

    pub fn with_options(model: T, options: FactoryOptions) -> FactoryResult<Self> {
        let descriptor = ModelDescriptor::describe(&model)?;
        let generators = descriptor
            .fields()
            .iter()
            .map(|field| FieldGenerator::from_default(field.default.as_ref()))
            .collect();

        debug!(
            model = descriptor.type_name(),
            fields = descriptor.len(),
            strict = options.strict,
            "factory created"
        );

        Ok(Self {
            inner: Arc::new(FactoryInner {
                descriptor,
                options,
                generators: RwLock::new(generators),
                sequences: RwLock::new(HashMap::new()),
                on_create: RwLock::new(None),
            }),
        })
    }

    pub fn model_name(&self) -> &'static str {
        self.inner.descriptor.type_name()
    }

    pub fn descriptor(&self) -> &ModelDescriptor {
        &self.inner.descriptor
    }

    pub fn options(&self) -> &FactoryOptions {
        &self.inner.options
    }

    /// Generate the field `name` with an arbitrary function.
    ///
    /// Returning `None` (or anything serializing to `null`) leaves the field
    /// at its zero value.
    pub fn attr<V, F>(&self, name: &str, generate: F) -> FactoryResult<&Self>
    where
        V: Serialize,
        F: Fn(&mut Args<'_>) -> FactoryResult<V> + Send + Sync + 'static,
    {
        let index = self.index_of(name)?;
        Ok(self.install(
            index,
            generator_fn(move |args| to_field_value(generate(args)?)),
        ))
    }

    /// Generate the field `name` from a sequence of `i32` starting at 1.
    pub fn seq_int<V, F>(&self, name: &str, generate: F) -> FactoryResult<&Self>
    where
        V: Serialize,
        F: Fn(i32) -> FactoryResult<V> + Send + Sync + 'static,
    {
        let index = self.index_of(name)?;
        let sequence = self.new_sequence(name);
        let key = name.to_string();
        Ok(self.install(
            index,
            generator_fn(move |_| {
                let n = i32::try_from(sequence.next())
                    .map_err(|_| FactoryError::SequenceOverflow { key: key.clone() })?;
                to_field_value(generate(n)?)
            }),
        ))
    }

    /// Generate the field `name` from a sequence of `i64` starting at 1.
    pub fn seq_int64<V, F>(&self, name: &str, generate: F) -> FactoryResult<&Self>
    where
        V: Serialize,
        F: Fn(i64) -> FactoryResult<V> + Send + Sync + 'static,
    {
        let index = self.index_of(name)?;
        let sequence = self.new_sequence(name);
        Ok(self.install(
            index,
            generator_fn(move |_| to_field_value(generate(sequence.next())?)),
        ))
    }

    /// Generate the field `name` from the decimal form of a sequence.
    pub fn seq_string<V, F>(&self, name: &str, generate: F) -> FactoryResult<&Self>
    where
        V: Serialize,
        F: Fn(String) -> FactoryResult<V> + Send + Sync + 'static,
    {
        let index = self.index_of(name)?;
        let sequence = self.new_sequence(name);
        Ok(self.install(
            index,
            generator_fn(move |_| to_field_value(generate(sequence.next().to_string())?)),
        ))
    }

    /// Build the field `name` with another factory.
    pub fn sub_factory<U: Model>(&self, name: &str, sub: &Factory<U>) -> FactoryResult<&Self> {
        let index = self.index_of(name)?;
        let sub = sub.clone();
        Ok(self.install(
            index,
            generator_fn(move |args| {
                let pipeline = args.pipeline_mut().fork();
                sub.build_nested(pipeline, args)
            }),
        ))
    }

    /// Build the list field `name` with `get_size()` instances of another factory.
    pub fn sub_slice_factory<U, S>(
        &self,
        name: &str,
        sub: &Factory<U>,
        get_size: S,
    ) -> FactoryResult<&Self>
    where
        U: Model,
        S: Fn() -> usize + Send + Sync + 'static,
    {
        let index = self.index_of(name)?;
        let sub = sub.clone();
        Ok(self.install(
            index,
            generator_fn(move |args| {
                let pipeline = args.pipeline_mut().fork();
                build_siblings(&sub, &pipeline, get_size(), args)
            }),
        ))
    }

    /// Build the field `name` with another factory, at most `get_limit()`
    /// levels deep along the current build lineage.
    ///
    /// Past the limit the field is left unset.
    pub fn sub_recursive_factory<U, L>(
        &self,
        name: &str,
        sub: &Factory<U>,
        get_limit: L,
    ) -> FactoryResult<&Self>
    where
        U: Model,
        L: Fn() -> usize + Send + Sync + 'static,
    {
        let index = self.index_of(name)?;
        let sub = sub.clone();
        let key = name.to_string();
        Ok(self.install(
            index,
            generator_fn(move |args| match descend(args, index, &get_limit) {
                Some(pipeline) => sub.build_nested(pipeline, args),
                None => {
                    debug!(model = args.model_name(), field = %key, "recursion limit reached");
                    Ok(Value::Null)
                }
            }),
        ))
    }

    /// Depth-limited like [`Factory::sub_recursive_factory`], building
    /// `get_size()` siblings at every permitted level.
    pub fn sub_recursive_slice_factory<U, S, L>(
        &self,
        name: &str,
        sub: &Factory<U>,
        get_size: S,
        get_limit: L,
    ) -> FactoryResult<&Self>
    where
        U: Model,
        S: Fn() -> usize + Send + Sync + 'static,
        L: Fn() -> usize + Send + Sync + 'static,
    {
        let index = self.index_of(name)?;
        let sub = sub.clone();
        let key = name.to_string();
        Ok(self.install(
            index,
            generator_fn(move |args| match descend(args, index, &get_limit) {
                Some(pipeline) => build_siblings(&sub, &pipeline, get_size(), args),
                None => {
                    debug!(model = args.model_name(), field = %key, "recursion limit reached");
                    Ok(Value::Null)
                }
            }),
        ))
    }

    /// Register a callback run once all fields of an instance are resolved.
    ///
    /// If the callback fails, the build fails and the instance is dropped.
    pub fn on_create<F>(&self, hook: F) -> &Self
    where
        F: Fn(&mut T, &Args<'_>) -> FactoryResult<()> + Send + Sync + 'static,
    {
        *self.inner.on_create.write() = Some(Arc::new(hook));
        self
    }

    /// Counter behind the `seq_*` registration of field `name`.
    pub fn sequence(&self, name: &str) -> Option<Arc<Sequence>> {
        self.inner.sequences.read().get(name).cloned()
    }

    fn index_of(&self, name: &str) -> FactoryResult<usize> {
        self.inner
            .descriptor
            .index_of(name)
            .ok_or_else(|| FactoryError::UnknownField {
                model: self.model_name(),
                name: name.to_string(),
            })
    }

    fn install(&self, index: usize, generator: GenFn) -> &Self {
        trace!(model = self.model_name(), index, "field generator registered");
        self.inner.generators.write()[index] = FieldGenerator::Dynamic(generator);
        self
    }

    fn new_sequence(&self, name: &str) -> Arc<Sequence> {
        let sequence = Arc::new(Sequence::new());
        self.inner
            .sequences
            .write()
            .insert(name.to_string(), Arc::clone(&sequence));
        sequence
    }
}

/// Spend one expansion of the counter at `index`, initializing it on first
/// use; returns the state for the nested build when expansion is permitted.
fn descend(
    args: &mut Args<'_>,
    index: usize,
    get_limit: &(dyn Fn() -> usize + Send + Sync),
) -> Option<Pipeline> {
    let pipeline = args.pipeline_mut();
    if !pipeline.has(index) {
        pipeline.set(index, get_limit());
    }
    pipeline.next(index).then(|| pipeline.fork())
}

fn build_siblings<U: Model>(
    sub: &Factory<U>,
    pipeline: &Pipeline,
    size: usize,
    parent: &Args<'_>,
) -> FactoryResult<Value> {
    let items = (0..size)
        .map(|_| sub.build_nested(pipeline.fork(), parent))
        .collect::<FactoryResult<Vec<_>>>()?;
    Ok(Value::Array(items))
}
