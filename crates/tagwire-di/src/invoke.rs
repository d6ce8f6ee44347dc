//! Function invocation with positional dependencies
//!
//! Every parameter of an invoked function is resolved by its type and its
//! position: parameter `n` of type `Arc<T>` is looked up as
//! `(TypeKey::of::<T>(), index n)`. Binding is all-or-nothing; when any
//! parameter is missing the function is not called.
//!
//! # Examples
//!
//! ```
//! use tagwire_di::{DiError, Registry};
//! use std::sync::Arc;
//!
//! fn total(count: Arc<i64>, before: Arc<i64>) -> i64 {
//!     *count + *before
//! }
//!
//! let registry = Registry::new();
//! registry.map_by_index(250i64, 0).map_by_index(1000i64, 1);
//! assert_eq!(registry.invoke(total).unwrap(), 1250);
//!
//! let empty = Registry::new();
//! assert!(matches!(
//!     empty.invoke(total),
//!     Err(DiError::MissingDependency { position: 0, .. })
//! ));
//! ```

use crate::error::{DiError, DiResult};
use crate::key::{Interface, TypeKey};
use crate::registry::Registry;
use crate::value::Value;
use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// A parameter type that can be resolved from a registry.
pub trait Dependency: Sized {
	/// Descriptor the parameter is looked up under.
	fn type_key() -> TypeKey;

	/// Converts a resolved value; `None` when it is not usable as `Self`.
	fn from_value(value: &Value) -> Option<Self>;
}

impl<T: Any + Send + Sync> Dependency for Arc<T> {
	fn type_key() -> TypeKey {
		TypeKey::of::<T>()
	}

	fn from_value(value: &Value) -> Option<Self> {
		value.downcast::<T>()
	}
}

/// A dependency resolved through an interface descriptor.
///
/// Used as `Iface<dyn Trait>` for parameters and fields that accept any
/// registered implementor of `Trait`.
pub struct Iface<I: Interface + ?Sized>(Arc<I>);

impl<I: Interface + ?Sized> Iface<I> {
	pub fn new(inner: Arc<I>) -> Self {
		Self(inner)
	}

	pub fn into_inner(self) -> Arc<I> {
		self.0
	}
}

impl<I: Interface + ?Sized> Clone for Iface<I> {
	fn clone(&self) -> Self {
		Self(Arc::clone(&self.0))
	}
}

impl<I: Interface + ?Sized> Deref for Iface<I> {
	type Target = I;

	fn deref(&self) -> &I {
		&self.0
	}
}

impl<I: Interface + ?Sized> fmt::Debug for Iface<I> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Iface")
			.field(&std::any::type_name::<I>())
			.finish()
	}
}

impl<I: Interface + ?Sized> Dependency for Iface<I> {
	fn type_key() -> TypeKey {
		TypeKey::interface::<I>()
	}

	fn from_value(value: &Value) -> Option<Self> {
		value.as_interface::<I>().map(Iface)
	}
}

/// A function whose parameters can all be resolved from a registry.
///
/// Implemented for every `Fn` of up to twelve [`Dependency`] parameters.
pub trait Invocable<Args> {
	type Output;

	/// Resolves every parameter, then calls the function.
	fn invoke_with(&self, registry: &Registry) -> DiResult<Self::Output>;
}

fn bind<D: Dependency>(
	registry: &Registry,
	function: &'static str,
	position: usize,
) -> DiResult<D> {
	let key = D::type_key();
	let missing = || DiError::MissingDependency {
		function,
		position,
		expected: key.name(),
	};

	let value = registry.resolve_index(&key, position)?.ok_or_else(missing)?;
	D::from_value(&value).ok_or_else(|| {
		tracing::debug!(
			function,
			position,
			expected = key.name(),
			found = value.type_name(),
			"resolved value is not usable as parameter type"
		);
		missing()
	})
}

macro_rules! impl_invocable {
	($($arg:ident $var:ident $position:tt),*) => {
		impl<Func, Out, $($arg,)*> Invocable<($($arg,)*)> for Func
		where
			Func: Fn($($arg),*) -> Out,
			$($arg: Dependency,)*
		{
			type Output = Out;

			#[allow(unused_variables)]
			fn invoke_with(&self, registry: &Registry) -> DiResult<Out> {
				let function = std::any::type_name::<Func>();
				$(let $var = bind::<$arg>(registry, function, $position)?;)*
				tracing::trace!(function, "invoking");
				Ok(self($($var),*))
			}
		}
	};
}

impl_invocable!();
impl_invocable!(A0 a0 0);
impl_invocable!(A0 a0 0, A1 a1 1);
impl_invocable!(A0 a0 0, A1 a1 1, A2 a2 2);
impl_invocable!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3);
impl_invocable!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4);
impl_invocable!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4, A5 a5 5);
impl_invocable!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4, A5 a5 5, A6 a6 6);
impl_invocable!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4, A5 a5 5, A6 a6 6, A7 a7 7);
impl_invocable!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4, A5 a5 5, A6 a6 6, A7 a7 7, A8 a8 8);
impl_invocable!(
	A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4, A5 a5 5, A6 a6 6, A7 a7 7, A8 a8 8, A9 a9 9
);
impl_invocable!(
	A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4, A5 a5 5, A6 a6 6, A7 a7 7, A8 a8 8, A9 a9 9,
	A10 a10 10
);
impl_invocable!(
	A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4, A5 a5 5, A6 a6 6, A7 a7 7, A8 a8 8, A9 a9 9,
	A10 a10 10, A11 a11 11
);

/// A type-erased invocable function.
///
/// `Function`s can be stored in a registry like any other value and called
/// later with [`Registry::invoke_value`].
///
/// # Examples
///
/// ```
/// use tagwire_di::{Function, Registry, TypeKey};
/// use std::sync::Arc;
///
/// fn greet(name: Arc<String>) -> String {
///     format!("hello, {name}")
/// }
///
/// let registry = Registry::new();
/// registry
///     .map_by_index("Ann".to_string(), 0)
///     .map_by_tag(Function::new(greet), "greet");
///
/// let handler = registry.get_by_tag(&TypeKey::of::<Function>(), "greet").unwrap();
/// let output = registry.invoke_value(&handler).unwrap();
/// assert_eq!(*output.downcast::<String>().unwrap(), "hello, Ann");
/// ```
#[derive(Clone)]
pub struct Function {
	name: &'static str,
	call: Arc<dyn Fn(&Registry) -> DiResult<Value> + Send + Sync>,
}

impl Function {
	pub fn new<F, Args>(function: F) -> Self
	where
		F: Invocable<Args> + Send + Sync + 'static,
		F::Output: Any + Send + Sync,
		Args: 'static,
	{
		Self {
			name: std::any::type_name::<F>(),
			call: Arc::new(move |registry: &Registry| function.invoke_with(registry).map(Value::new)),
		}
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn call(&self, registry: &Registry) -> DiResult<Value> {
		(self.call)(registry)
	}
}

impl fmt::Debug for Function {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Function").field("name", &self.name).finish()
	}
}

impl Registry {
	/// Resolves every parameter of `function` by type and position, then calls it.
	///
	/// The function's own output, including any error it returns, is passed
	/// through unchanged. When a parameter cannot be resolved the function is
	/// not called and [`DiError::MissingDependency`] is returned.
	pub fn invoke<F, Args>(&self, function: F) -> DiResult<F::Output>
	where
		F: Invocable<Args>,
	{
		function.invoke_with(self)
	}

	/// Calls a [`Function`] held in `target`.
	///
	/// Fails with [`DiError::InvalidTarget`] when `target` is not a `Function`.
	pub fn invoke_value(&self, target: &Value) -> DiResult<Value> {
		let function = target
			.downcast_ref::<Function>()
			.ok_or(DiError::InvalidTarget {
				expected: "a callable `Function`",
				found: target.type_name(),
			})?;
		function.call(self)
	}
}
