//! Registry errors

use crate::key::Qualifier;

/// Errors reported by registry operations.
///
/// An absent entry is not an error: `get_*` returns `None` for it. Only
/// [`Registry::invoke`](crate::Registry::invoke) turns an unresolved lookup
/// into [`DiError::MissingDependency`], because it needs every parameter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiError {
	/// `invoke_value` was given a non-callable, or `assign_fields` a value
	/// that is not a record.
	#[error("Invalid target: expected {expected}, found `{found}`")]
	InvalidTarget {
		expected: &'static str,
		found: &'static str,
	},

	/// A parameter could not be resolved anywhere in the scope chain.
	#[error(
		"Missing dependency for `{function}`: parameter {position} of type `{expected}` not found"
	)]
	MissingDependency {
		function: &'static str,
		position: usize,
		expected: &'static str,
	},

	/// A `map_*_as` call was given a descriptor that is not an interface.
	#[error("`{0}` is not an interface descriptor")]
	NotAnInterface(&'static str),

	/// The value's concrete type is not declared as an implementor of the interface.
	#[error("`{value}` does not satisfy interface `{interface}`")]
	UnsatisfiedInterface {
		value: &'static str,
		interface: &'static str,
	},

	/// Several concrete types satisfy the interface at the same qualifier and
	/// the registry is configured to reject the ambiguity.
	#[error("Ambiguous match for `{interface}` at {qualifier}: {}", candidates.join(", "))]
	AmbiguousMatch {
		interface: &'static str,
		qualifier: Qualifier,
		candidates: Vec<&'static str>,
	},

	/// Linking the parent would make the scope chain cyclic.
	#[error("Linking parent would create a scope cycle (cycle length {cycle_length})")]
	CyclicScope { cycle_length: usize },
}

pub type DiResult<T> = std::result::Result<T, DiError>;
