//! Field binding by tag
//!
//! [`Registry::assign_fields`] fills the `pub` fields of a record from
//! tag-qualified entries: a field `name: T` is looked up as
//! `(TypeKey::of::<T>(), tag "name")`. Fields without an entry keep their
//! current value.
//!
//! Records are usually produced by `#[derive(Record)]`:
//!
//! ```
//! use tagwire_di::{Record, Registry};
//!
//! #[derive(Record, Default)]
//! struct Profile {
//!     pub name: String,
//!     pub age: u32,
//!     internal: u8,
//! }
//!
//! let registry = Registry::new();
//! registry.map_by_tag("Ann".to_string(), "name").map_by_tag(9u8, "internal");
//!
//! let mut profile = Profile { age: 41, ..Default::default() };
//! registry.assign_fields(&mut profile).unwrap();
//!
//! assert_eq!(profile.name, "Ann");
//! assert_eq!(profile.age, 41);
//! assert_eq!(profile.internal, 0);
//! ```

use crate::error::{DiError, DiResult};
use crate::key::TypeKey;
use crate::registry::Registry;
use crate::value::Value;
use std::any::Any;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// A bindable field: its tag and the descriptor it resolves under.
#[derive(Debug, Clone, Copy)]
pub struct Field {
	pub tag: &'static str,
	pub key: TypeKey,
}

impl Field {
	pub fn new(tag: &'static str, key: TypeKey) -> Self {
		Self { tag, key }
	}
}

/// A structure whose exported fields can be assigned by tag.
pub trait Record {
	/// Bindable fields in declaration order.
	fn fields(&self) -> Vec<Field>;

	/// Assigns `value` to the field tagged `tag`.
	///
	/// Returns `false` and leaves the field untouched when `value` is not
	/// assignable to the field's type or no field has that tag.
	fn assign_field(&mut self, tag: &str, value: &Value) -> bool;
}

/// Anything that can be handed to [`Registry::assign_fields`].
///
/// Only records accept field assignment; every other implementor reports
/// itself as not a record and is rejected with [`DiError::InvalidTarget`].
pub trait AssignTarget: Any {
	fn as_record_mut(&mut self) -> Option<&mut dyn Record>;

	fn target_name(&self) -> &'static str {
		std::any::type_name::<Self>()
	}
}

/// Conversion from a resolved value into an owned field value.
///
/// Implemented for every clonable value type: the stored value is cloned
/// into the field.
pub trait FieldValue: Sized {
	fn type_key() -> TypeKey;

	fn from_value(value: &Value) -> Option<Self>;
}

impl<T: Any + Send + Sync + Clone> FieldValue for T {
	fn type_key() -> TypeKey {
		TypeKey::of::<T>()
	}

	fn from_value(value: &Value) -> Option<Self> {
		value.downcast_ref::<T>().cloned()
	}
}

macro_rules! not_a_record {
	($($ty:ty),* $(,)?) => {
		$(
			impl AssignTarget for $ty {
				fn as_record_mut(&mut self) -> Option<&mut dyn Record> {
					None
				}
			}
		)*
	};
}

not_a_record!(
	(),
	bool,
	char,
	i8,
	i16,
	i32,
	i64,
	i128,
	isize,
	u8,
	u16,
	u32,
	u64,
	u128,
	usize,
	f32,
	f64,
	String,
	&'static str,
);

macro_rules! not_a_record_generic {
	($($ty:ident<$($param:ident),+>),* $(,)?) => {
		$(
			impl<$($param: 'static),+> AssignTarget for $ty<$($param),+> {
				fn as_record_mut(&mut self) -> Option<&mut dyn Record> {
					None
				}
			}
		)*
	};
}

not_a_record_generic!(
	Vec<T>,
	VecDeque<T>,
	Option<T>,
	HashSet<T>,
	HashMap<K, V>,
	BTreeMap<K, V>,
);

impl Registry {
	/// Assigns every exported field of `target` that has a tag-qualified entry.
	///
	/// Absent fields are left unchanged. Fails only when `target` is not a
	/// record.
	pub fn assign_fields<T>(&self, target: &mut T) -> DiResult<()>
	where
		T: AssignTarget + ?Sized,
	{
		let found = target.target_name();
		let record = target.as_record_mut().ok_or(DiError::InvalidTarget {
			expected: "a struct deriving `Record`",
			found,
		})?;

		for field in record.fields() {
			match self.resolve_tag(&field.key, field.tag) {
				Ok(Some(value)) => {
					if !record.assign_field(field.tag, &value) {
						tracing::debug!(
							record = found,
							field = field.tag,
							expected = field.key.name(),
							found = value.type_name(),
							"resolved value is not assignable; field left unchanged"
						);
					}
				}
				Ok(None) => {
					tracing::trace!(record = found, field = field.tag, "no entry; field left unchanged");
				}
				Err(err) => {
					tracing::warn!(record = found, field = field.tag, %err, "skipping field");
				}
			}
		}

		Ok(())
	}
}
