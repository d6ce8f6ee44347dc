//! Type descriptors and qualifiers
//!
//! A [`TypeKey`] is the primary key of every registry entry. It is either
//! *concrete* (the exact type of a stored value) or an *interface* descriptor
//! for a trait object type declared with [`interface!`](crate::interface).
//! Interface descriptors carry the capability check that the resolver uses
//! for its satisfaction fallback.

use crate::value::Value;
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A capability contract that concrete types can satisfy.
///
/// Implemented for trait object types by the [`interface!`](crate::interface)
/// macro, which lists the implementors explicitly. The listed types are
/// checked against the trait at compile time.
///
/// # Examples
///
/// ```
/// use tagwire_di::{Interface, TypeKey, Value, interface};
/// use std::any::TypeId;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".to_string()
///     }
/// }
///
/// interface!(dyn Greeter = [English]);
///
/// assert!(<dyn Greeter>::satisfied_by(TypeId::of::<English>()));
/// let greeter = <dyn Greeter>::upcast(&Value::new(English)).unwrap();
/// assert_eq!(greeter.greet(), "hello");
/// assert!(TypeKey::interface::<dyn Greeter>().is_interface());
/// ```
pub trait Interface: Any + Send + Sync {
	/// Whether values of the type identified by `type_id` satisfy this interface.
	fn satisfied_by(type_id: TypeId) -> bool;

	/// View a concrete value as this interface, if its type satisfies it.
	fn upcast(value: &Value) -> Option<Arc<Self>>;
}

/// Declare a trait object type as an [`Interface`] with its implementors.
///
/// ```
/// use tagwire_di::interface;
///
/// trait Store: Send + Sync {}
/// struct Memory;
/// struct Disk;
/// impl Store for Memory {}
/// impl Store for Disk {}
///
/// interface!(dyn Store = [Memory, Disk]);
/// ```
#[macro_export]
macro_rules! interface {
	($iface:ty = [$($implementor:ty),* $(,)?]) => {
		impl $crate::Interface for $iface {
			fn satisfied_by(type_id: ::std::any::TypeId) -> bool {
				false $(|| type_id == ::std::any::TypeId::of::<$implementor>())*
			}

			fn upcast(
				value: &$crate::Value,
			) -> ::std::option::Option<::std::sync::Arc<Self>> {
				$(
					if let ::std::option::Option::Some(concrete) = value.downcast::<$implementor>() {
						return ::std::option::Option::Some(concrete as ::std::sync::Arc<Self>);
					}
				)*
				::std::option::Option::None
			}
		}
	};
}

/// Type-erased capability check carried by interface descriptors.
#[derive(Clone, Copy)]
pub struct Capability {
	satisfied_by: fn(TypeId) -> bool,
	upcast: fn(&Value) -> Option<Value>,
}

impl Capability {
	fn of<I: Interface + ?Sized>() -> Self {
		Self {
			satisfied_by: I::satisfied_by,
			upcast: upcast_view::<I>,
		}
	}

	pub fn is_satisfied_by(&self, type_id: TypeId) -> bool {
		(self.satisfied_by)(type_id)
	}

	/// View `value` through the interface; the result is keyed by the interface.
	pub fn upcast(&self, value: &Value) -> Option<Value> {
		(self.upcast)(value)
	}
}

fn upcast_view<I: Interface + ?Sized>(value: &Value) -> Option<Value> {
	value.as_interface::<I>().map(Value::interface)
}

/// Whether a descriptor names a concrete type or an interface.
#[derive(Clone, Copy)]
pub enum TypeKind {
	Concrete,
	Interface(Capability),
}

/// Runtime identity of a type, used as the primary registry key.
///
/// Two keys are equal iff they denote the same type; the kind and name do not
/// take part in comparison or hashing.
#[derive(Clone, Copy)]
pub struct TypeKey {
	id: TypeId,
	name: &'static str,
	kind: TypeKind,
}

impl TypeKey {
	/// Concrete descriptor of `T`.
	///
	/// This is never an interface descriptor, even for a trait object type.
	pub fn of<T: Any + ?Sized>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: std::any::type_name::<T>(),
			kind: TypeKind::Concrete,
		}
	}

	/// Interface descriptor of `I`.
	pub fn interface<I: Interface + ?Sized>() -> Self {
		Self {
			id: TypeId::of::<I>(),
			name: std::any::type_name::<I>(),
			kind: TypeKind::Interface(Capability::of::<I>()),
		}
	}

	pub fn id(&self) -> TypeId {
		self.id
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn kind(&self) -> TypeKind {
		self.kind
	}

	pub fn is_interface(&self) -> bool {
		matches!(self.kind, TypeKind::Interface(_))
	}

	/// The capability check, for interface descriptors.
	pub fn capability(&self) -> Option<Capability> {
		match self.kind {
			TypeKind::Interface(capability) => Some(capability),
			TypeKind::Concrete => None,
		}
	}
}

impl PartialEq for TypeKey {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl fmt::Debug for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let kind = if self.is_interface() {
			"interface"
		} else {
			"concrete"
		};
		f.debug_struct("TypeKey")
			.field("name", &self.name)
			.field("kind", &kind)
			.finish()
	}
}

impl fmt::Display for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

/// Secondary key distinguishing values of the same type within one scope.
///
/// Index and tag qualifiers live in separate keyspaces: tag `"0"` and index
/// `0` never refer to the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Qualifier {
	Index(usize),
	Tag(String),
}

impl fmt::Display for Qualifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Qualifier::Index(index) => write!(f, "index {index}"),
			Qualifier::Tag(tag) => write!(f, "tag {tag:?}"),
		}
	}
}

impl From<usize> for Qualifier {
	fn from(index: usize) -> Self {
		Qualifier::Index(index)
	}
}

impl From<&str> for Qualifier {
	fn from(tag: &str) -> Self {
		Qualifier::Tag(tag.to_string())
	}
}

impl From<String> for Qualifier {
	fn from(tag: String) -> Self {
		Qualifier::Tag(tag)
	}
}

/// Borrowed qualifier used on the lookup path.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Slot<'a> {
	Index(usize),
	Tag(&'a str),
}

impl Slot<'_> {
	pub(crate) fn to_qualifier(self) -> Qualifier {
		match self {
			Slot::Index(index) => Qualifier::Index(index),
			Slot::Tag(tag) => Qualifier::Tag(tag.to_string()),
		}
	}
}
