//! Type-erased stored values

use crate::key::{Interface, TypeKey};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A value held by a registry.
///
/// Cloning is cheap: the payload is shared behind an `Arc`. A value created
/// with [`Value::interface`] holds an interface view (`Arc<dyn I>`) and is
/// keyed by the interface descriptor.
///
/// # Examples
///
/// ```
/// use tagwire_di::{TypeKey, Value};
///
/// let value = Value::new(42i32);
/// assert_eq!(value.type_key(), TypeKey::of::<i32>());
/// assert_eq!(*value.downcast::<i32>().unwrap(), 42);
/// assert!(value.downcast::<u32>().is_none());
/// ```
#[derive(Clone)]
pub struct Value {
	inner: Arc<dyn Any + Send + Sync>,
	key: TypeKey,
}

impl Value {
	pub fn new<T: Any + Send + Sync>(value: T) -> Self {
		Self::from_arc(Arc::new(value))
	}

	/// Wrap an already shared value without re-allocating it.
	pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
		Self {
			inner: value,
			key: TypeKey::of::<T>(),
		}
	}

	/// Wrap an interface view, keyed by the interface descriptor.
	pub fn interface<I: Interface + ?Sized>(value: Arc<I>) -> Self {
		Self {
			inner: Arc::new(value),
			key: TypeKey::interface::<I>(),
		}
	}

	/// The descriptor this value was created as.
	pub fn type_key(&self) -> TypeKey {
		self.key
	}

	pub fn type_name(&self) -> &'static str {
		self.key.name()
	}

	pub fn is<T: Any>(&self) -> bool {
		self.inner.is::<T>()
	}

	pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
		Arc::clone(&self.inner).downcast::<T>().ok()
	}

	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.inner.downcast_ref::<T>()
	}

	/// View this value as `I`.
	///
	/// Succeeds for interface views of `I` and for concrete values whose type
	/// is a declared implementor of `I`.
	pub fn as_interface<I: Interface + ?Sized>(&self) -> Option<Arc<I>> {
		if let Some(view) = self.inner.downcast_ref::<Arc<I>>() {
			return Some(Arc::clone(view));
		}
		I::upcast(self)
	}

	/// Whether both values share the same payload.
	pub fn ptr_eq(&self, other: &Value) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

impl fmt::Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Value")
			.field("type", &self.key.name())
			.finish_non_exhaustive()
	}
}
