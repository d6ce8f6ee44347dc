//! # tagwire
//!
//! An embeddable dependency registry. Values are stored by their runtime
//! type plus a qualifier (a positional index or a string tag) and are used to
//! supply function arguments and to fill struct fields.
//!
//! This crate re-exports [`tagwire_di`]; see its documentation for the
//! resolution rules.
//!
//! ## Feature Flags
//!
//! - `macros` (default) - `#[derive(Record)]` for [`Registry::assign_fields`]
//!
//! ## Quick Example
//!
//! ```rust
//! use tagwire::prelude::*;
//! use std::sync::Arc;
//!
//! fn describe(name: Arc<String>, age: Arc<u32>) -> String {
//!     format!("{name} ({age})")
//! }
//!
//! let registry = Registry::new();
//! registry.map_by_index("Ann".to_string(), 0).map_by_index(41u32, 1);
//!
//! assert_eq!(registry.invoke(describe).unwrap(), "Ann (41)");
//! ```

pub use tagwire_di::*;

/// The registry, its value model and the consumption traits
pub mod prelude {
	pub use crate::{
		AmbiguityPolicy, AssignTarget, DiError, DiResult, Function, Iface, Interface, Qualifier,
		Registry, RegistrySettings, TypeKey, Value, interface,
	};

	#[cfg(feature = "macros")]
	pub use crate::Record;
}
