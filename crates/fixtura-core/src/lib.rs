//! Core contracts and helpers for Fixtura.
//!
//! This crate defines the model descriptor, the override map with its dotted
//! path writer, and the execution context shared by every build.

pub mod context;
pub mod descriptor;
pub mod error;
pub mod overrides;

pub use context::Context;
pub use descriptor::{FieldDescriptor, Model, ModelDescriptor, instance_of, zero_instance};
pub use error::{Error, Result};
pub use overrides::{Overrides, PATH_SEPARATOR, is_path, root_key, set_path};
