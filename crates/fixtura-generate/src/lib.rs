//! Declarative test-fixture generation for Fixtura.
//!
//! A [`Factory`] pairs a model type with one rule per field: the static
//! default captured from a model value, a generation function, a sequence,
//! or a nested factory. Nested factories share a forkable recursion state so
//! self-referential factory graphs stop at a configured depth.

pub mod args;
mod engine;
pub mod errors;
pub mod factory;
mod generators;
pub mod model;
pub mod pipeline;
pub mod sequence;

pub use args::Args;
pub use errors::{BoxError, FactoryError, FactoryResult};
pub use factory::Factory;
pub use fixtura_core::{Context, Model, ModelDescriptor, Overrides};
pub use model::FactoryOptions;
pub use pipeline::{Pipeline, StackState};
pub use sequence::Sequence;
