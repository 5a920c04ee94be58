use std::any::Any;

use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use fixtura_core::{Context, Model, Overrides, instance_of, root_key, set_path, zero_instance};

use crate::args::Args;
use crate::errors::{FactoryError, FactoryResult};
use crate::factory::Factory;
use crate::generators::FieldGenerator;
use crate::pipeline::Pipeline;

impl<T: Model> Factory<T> {
    pub fn create(&self) -> FactoryResult<T> {
        self.create_with_context_and_option(&Context::background(), &Overrides::new())
    }

    pub fn create_with_option(&self, overrides: &Overrides) -> FactoryResult<T> {
        self.create_with_context_and_option(&Context::background(), overrides)
    }

    pub fn create_with_context(&self, context: &Context) -> FactoryResult<T> {
        self.create_with_context_and_option(context, &Overrides::new())
    }

    /// Build a new instance.
    ///
    /// Fields named in `overrides` are assigned as given and skip their
    /// generator; dotted keys are written into the finished instance.
    pub fn create_with_context_and_option(
        &self,
        context: &Context,
        overrides: &Overrides,
    ) -> FactoryResult<T> {
        self.build(context.clone(), overrides, zero_instance::<T>()?, None, None)
    }

    /// Like [`Factory::create`], panicking on failure.
    pub fn must_create(&self) -> T {
        self.must_create_with_context_and_option(&Context::background(), &Overrides::new())
    }

    pub fn must_create_with_option(&self, overrides: &Overrides) -> T {
        self.must_create_with_context_and_option(&Context::background(), overrides)
    }

    pub fn must_create_with_context(&self, context: &Context) -> T {
        self.must_create_with_context_and_option(context, &Overrides::new())
    }

    pub fn must_create_with_context_and_option(
        &self,
        context: &Context,
        overrides: &Overrides,
    ) -> T {
        self.create_with_context_and_option(context, overrides)
            .unwrap_or_else(|err| panic!("failed to create {}: {err}", self.model_name()))
    }

    /// Build into an existing value.
    ///
    /// The build starts from the current field values of `target`, so fields
    /// left unset keep them. `target` must be of the factory's model type; on
    /// any failure it is left untouched.
    pub fn construct<U: Any>(&self, target: &mut U) -> FactoryResult<()> {
        self.construct_with_context_and_option(&Context::background(), target, &Overrides::new())
    }

    pub fn construct_with_option<U: Any>(
        &self,
        target: &mut U,
        overrides: &Overrides,
    ) -> FactoryResult<()> {
        self.construct_with_context_and_option(&Context::background(), target, overrides)
    }

    pub fn construct_with_context<U: Any>(
        &self,
        context: &Context,
        target: &mut U,
    ) -> FactoryResult<()> {
        self.construct_with_context_and_option(context, target, &Overrides::new())
    }

    pub fn construct_with_context_and_option<U: Any>(
        &self,
        context: &Context,
        target: &mut U,
        overrides: &Overrides,
    ) -> FactoryResult<()> {
        let Some(target) = (target as &mut dyn Any).downcast_mut::<T>() else {
            return Err(FactoryError::ShapeMismatch {
                expected: self.model_name(),
                found: std::any::type_name::<U>(),
            });
        };
        let start = instance_of(&*target)?;
        *target = self.build(context.clone(), overrides, start, None, None)?;
        Ok(())
    }

    /// Build one instance below `parent` and hand it back as a field value.
    pub(crate) fn build_nested(&self, pipeline: Pipeline, parent: &Args<'_>) -> FactoryResult<Value> {
        let instance = self.build(
            parent.context().clone(),
            &Overrides::new(),
            zero_instance::<T>()?,
            Some(pipeline),
            Some(parent),
        )?;
        Ok(serde_json::to_value(instance)?)
    }

    fn build<'p>(
        &self,
        context: Context,
        overrides: &Overrides,
        instance: Map<String, Value>,
        pipeline: Option<Pipeline>,
        parent: Option<&'p Args<'p>>,
    ) -> FactoryResult<T> {
        let model = self.model_name();
        let descriptor = &self.inner.descriptor;
        let generators = self.inner.generators.read().clone();
        let hook = self.inner.on_create.read().clone();

        self.check_overrides(overrides)?;

        let mut args = Args::new(model, instance, parent, context, pipeline);
        let depth = args.depth();
        debug!(model, depth, fields = descriptor.len(), "building instance");

        for (field, generator) in descriptor.fields().iter().zip(&generators) {
            if args.context().is_cancelled() {
                debug!(model, depth, field = %field.key, "build cancelled");
                return Err(FactoryError::Cancelled { model });
            }

            if let Some(value) = overrides.get(&field.key) {
                trace!(model, field = %field.key, "field pinned by override");
                args.set(&field.key, value.clone());
                continue;
            }

            match generator {
                FieldGenerator::Unset => {
                    trace!(model, field = %field.key, "field left unset");
                }
                FieldGenerator::Static(value) => {
                    args.set(&field.key, value.clone());
                }
                FieldGenerator::Dynamic(generate) => {
                    let value = generate(&mut args)?;
                    if value.is_null() {
                        trace!(model, field = %field.key, "generator produced no value");
                    } else {
                        args.set(&field.key, value);
                    }
                }
            }
        }

        self.apply_paths(args.instance_mut(), overrides)?;

        let mut instance: T = serde_json::from_value(Value::Object(args.instance().clone()))?;
        if let Some(hook) = hook {
            hook(&mut instance, &args)?;
        }

        debug!(model, depth, "instance built");
        Ok(instance)
    }

    fn check_overrides(&self, overrides: &Overrides) -> FactoryResult<()> {
        let model = self.model_name();
        for (key, _) in overrides.iter() {
            if self.inner.descriptor.contains(root_key(key)) {
                continue;
            }
            if self.inner.options.strict {
                return Err(FactoryError::UnknownOverride {
                    model,
                    key: key.to_string(),
                });
            }
            warn!(model, key, "ignoring override for unknown field");
        }
        Ok(())
    }

    fn apply_paths(
        &self,
        instance: &mut Map<String, Value>,
        overrides: &Overrides,
    ) -> FactoryResult<()> {
        let model = self.model_name();
        for (path, value) in overrides.paths() {
            if !self.inner.descriptor.contains(root_key(path)) {
                continue;
            }
            match set_path(instance, path, value.clone()) {
                Ok(()) => trace!(model, path, "override path applied"),
                Err(err) if !self.inner.options.strict => {
                    warn!(model, path, error = %err, "ignoring override path");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}
