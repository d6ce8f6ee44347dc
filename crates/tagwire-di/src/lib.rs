//! # tagwire-di
//!
//! A type-keyed dependency registry.
//!
//! ## Features
//!
//! - **Dual addressing**: values are stored under their type plus either a
//!   positional index or a string tag; the two keyspaces never collide
//! - **Scope chaining**: a child registry delegates misses to its parent
//!   through a non-owning link
//! - **Interface fallback**: a query for `dyn Trait` finds concrete values
//!   whose type is a declared implementor
//! - **Invocation**: call any `Fn` with its parameters resolved by type and position
//! - **Field binding**: fill the `pub` fields of a `#[derive(Record)]` struct by tag
//!
//! ## Example
//!
//! ```rust
//! use tagwire_di::{Iface, Registry, interface};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self, name: &str) -> String;
//! }
//!
//! struct English;
//! impl Greeter for English {
//!     fn greet(&self, name: &str) -> String {
//!         format!("hello, {name}")
//!     }
//! }
//!
//! interface!(dyn Greeter = [English]);
//!
//! fn welcome(greeter: Iface<dyn Greeter>, name: Arc<String>) -> String {
//!     greeter.greet(&name)
//! }
//!
//! let root = Arc::new(Registry::new());
//! root.map_by_index(English, 0);
//!
//! let request = Registry::child_of(&root);
//! request.map_by_index("Ann".to_string(), 1);
//!
//! assert_eq!(request.invoke(welcome).unwrap(), "hello, Ann");
//! ```
//!
//! ## Settings
//!
//! Resolution behaviour is controlled by [`RegistrySettings`], which can be
//! loaded from TOML, JSON or the environment:
//!
//! ```rust
//! use tagwire_di::{AmbiguityPolicy, Registry, RegistrySettings};
//!
//! let settings = RegistrySettings::default().with_ambiguity(AmbiguityPolicy::Reject);
//! let registry = Registry::with_settings(settings);
//! assert_eq!(registry.settings().ambiguity, AmbiguityPolicy::Reject);
//! ```

pub mod error;
pub mod fields;
pub mod invoke;
pub mod key;
pub mod registry;
pub mod settings;
pub mod value;

pub use error::{DiError, DiResult};
pub use fields::{AssignTarget, Field, FieldValue, Record};
pub use invoke::{Dependency, Function, Iface, Invocable};
pub use key::{Capability, Interface, Qualifier, TypeKey, TypeKind};
pub use registry::{Entry, Registry};
pub use settings::{AmbiguityPolicy, RegistrySettings, SettingsError};
pub use value::Value;

#[cfg(feature = "macros")]
pub use tagwire_di_macros::Record;
