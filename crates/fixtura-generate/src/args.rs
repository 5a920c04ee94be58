use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use fixtura_core::Context;

use crate::errors::FactoryResult;
use crate::pipeline::Pipeline;

/// Build context handed to generator functions and hooks.
///
/// One `Args` exists per build. Nested builds started by sub-factories get
/// their own `Args` linked back to this one through [`Args::parent`].
///
/// An `Args` and its [`Pipeline`] belong to a single build's call tree;
/// sharing them across threads is not supported.
pub struct Args<'a> {
    model: &'static str,
    instance: Map<String, Value>,
    parent: Option<&'a Args<'a>>,
    context: Context,
    pipeline: Option<Pipeline>,
}

impl<'a> Args<'a> {
    pub(crate) fn new(
        model: &'static str,
        instance: Map<String, Value>,
        parent: Option<&'a Args<'a>>,
        context: Context,
        pipeline: Option<Pipeline>,
    ) -> Self {
        Self {
            model,
            instance,
            parent,
            context,
            pipeline,
        }
    }

    /// Type name of the model being built.
    pub fn model_name(&self) -> &'static str {
        self.model
    }

    /// Field values of the instance under construction, fields not yet
    /// resolved holding their starting value.
    pub fn instance(&self) -> &Map<String, Value> {
        &self.instance
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.instance.get(key)
    }

    /// Decode the instance under construction as `T`.
    pub fn instance_as<T: DeserializeOwned>(&self) -> FactoryResult<T> {
        Ok(serde_json::from_value(Value::Object(self.instance.clone()))?)
    }

    /// Context of the enclosing build, `None` at the top level.
    pub fn parent(&self) -> Option<&'a Args<'a>> {
        self.parent
    }

    /// Number of enclosing builds.
    pub fn depth(&self) -> usize {
        std::iter::successors(self.parent, |args| args.parent).count()
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Replace the context seen by the remaining fields of this build.
    pub fn update_context(&mut self, context: Context) {
        self.context = context;
    }

    /// Recursion state of this build, if one has been allocated yet.
    pub fn pipeline(&self) -> Option<&Pipeline> {
        self.pipeline.as_ref()
    }

    pub(crate) fn pipeline_mut(&mut self) -> &mut Pipeline {
        self.pipeline.get_or_insert_with(Pipeline::new)
    }

    pub(crate) fn set(&mut self, key: &str, value: Value) {
        self.instance.insert(key.to_string(), value);
    }

    pub(crate) fn instance_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.instance
    }
}

impl std::fmt::Debug for Args<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("model", &self.model)
            .field("depth", &self.depth())
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}
