//! Unit tests for function invocation

use crate::fixtures::{English, French, Greeter};
use rstest::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tagwire_di::{
	AmbiguityPolicy, DiError, Function, Iface, Registry, RegistrySettings, TypeKey, Value,
};

fn elapsed_total(started_at: Arc<u64>, count: Arc<i64>, before: Arc<i64>) -> i64 {
	assert!(*started_at > 0);
	*count + *before
}

#[rstest]
fn invoke_binds_parameters_by_position() {
	// Arrange
	let registry = Registry::new();
	registry
		.map_by_index(1_700_000_000u64, 0)
		.map_by_index(250i64, 1)
		.map_by_index(1000i64, 2);

	// Act
	let total = registry.invoke(elapsed_total).unwrap();

	// Assert
	assert_eq!(total, 1250);
}

#[rstest]
fn invoke_sees_overwritten_entries() {
	// Arrange
	let registry = Registry::new();
	registry
		.map_by_index(1_700_000_000u64, 0)
		.map_by_index(250i64, 1)
		.map_by_index(1000i64, 2);
	assert_eq!(registry.invoke(elapsed_total).unwrap(), 1250);

	// Act
	registry
		.set_by_index(TypeKey::of::<i64>(), Value::new(300i64), 1)
		.set_by_index(TypeKey::of::<i64>(), Value::new(2000i64), 2);

	// Assert
	assert_eq!(registry.invoke(elapsed_total).unwrap(), 2300);
}

#[rstest]
fn invoke_calls_callee_with_resolved_values() {
	// Arrange
	let registry = Registry::new();
	registry.map_by_index(42i32, 0).map_by_index("x".to_string(), 1);
	let observed = Mutex::new(None);

	// Act
	let result = registry.invoke(|a: Arc<i32>, b: Arc<String>| {
		*observed.lock().unwrap() = Some((*a, (*b).clone()));
	});

	// Assert
	assert!(result.is_ok());
	assert_eq!(
		observed.into_inner().unwrap(),
		Some((42, "x".to_string()))
	);
}

#[rstest]
fn missing_dependency_prevents_the_call() {
	// Arrange
	let registry = Registry::new();
	registry.map_by_index(42i32, 0);
	let calls = AtomicUsize::new(0);

	// Act
	let result = registry.invoke(|_a: Arc<i32>, _b: Arc<String>| {
		calls.fetch_add(1, Ordering::SeqCst);
	});

	// Assert
	assert_eq!(calls.load(Ordering::SeqCst), 0);
	match result {
		Err(DiError::MissingDependency {
			position, expected, ..
		}) => {
			assert_eq!(position, 1);
			assert_eq!(expected, std::any::type_name::<String>());
		}
		other => panic!("expected MissingDependency, got {other:?}"),
	}
}

#[rstest]
fn missing_dependency_names_the_function() {
	// Arrange
	let registry = Registry::new();

	// Act
	let err = registry.invoke(elapsed_total).unwrap_err();

	// Assert
	let DiError::MissingDependency { function, position, .. } = &err else {
		panic!("expected MissingDependency, got {err:?}");
	};
	assert!(function.ends_with("elapsed_total"));
	assert_eq!(*position, 0);
}

#[rstest]
fn value_of_wrong_type_counts_as_missing() {
	// Arrange
	let registry = Registry::new();
	registry.set_by_index(TypeKey::of::<i32>(), Value::new("forty-two".to_string()), 0);

	// Act
	let result = registry.invoke(|a: Arc<i32>| *a);

	// Assert
	assert!(matches!(
		result,
		Err(DiError::MissingDependency { position: 0, .. })
	));
}

#[rstest]
fn callee_errors_pass_through_untouched() {
	// Arrange
	let registry = Registry::new();
	registry.map_by_index(-1i32, 0);

	// Act
	let result = registry.invoke(|n: Arc<i32>| -> Result<u32, String> {
		u32::try_from(*n).map_err(|_| format!("negative: {n}"))
	});

	// Assert
	assert_eq!(result, Ok(Err("negative: -1".to_string())));
}

#[rstest]
fn zero_parameter_function_is_always_called() {
	// Arrange
	let registry = Registry::new();

	// Act
	let result = registry.invoke(|| "called");

	// Assert
	assert_eq!(result, Ok("called"));
}

#[rstest]
fn interface_parameter_uses_fallback() {
	// Arrange
	let registry = Registry::new();
	registry.map_by_index(French, 0);

	// Act
	let result = registry.invoke(|greeter: Iface<dyn Greeter>| greeter.greet());

	// Assert
	assert_eq!(result.unwrap(), "bonjour");
}

#[rstest]
fn ambiguous_interface_parameter_is_an_error_when_rejected() {
	// Arrange
	let registry =
		Registry::with_settings(RegistrySettings::default().with_ambiguity(AmbiguityPolicy::Reject));
	registry.map_by_index(English, 0).map_by_index(French, 0);
	let calls = AtomicUsize::new(0);

	// Act
	let result = registry.invoke(|_greeter: Iface<dyn Greeter>| {
		calls.fetch_add(1, Ordering::SeqCst);
	});

	// Assert
	assert!(matches!(result, Err(DiError::AmbiguousMatch { .. })));
	assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[rstest]
fn parameters_resolve_through_parent_scope() {
	// Arrange
	let root = Arc::new(Registry::new());
	root.map_by_index("shared".to_string(), 0);
	let request = Registry::child_of(&root);
	request.map_by_index(7usize, 1);

	// Act
	let result = request.invoke(|name: Arc<String>, id: Arc<usize>| format!("{name}#{id}"));

	// Assert
	assert_eq!(result.unwrap(), "shared#7");
}

#[rstest]
fn twelve_parameters_are_supported() {
	// Arrange
	let registry = Registry::new();
	for index in 0..12 {
		registry.map_by_index(index as u8, index);
	}

	// Act
	let result = registry.invoke(
		|a: Arc<u8>,
		 b: Arc<u8>,
		 c: Arc<u8>,
		 d: Arc<u8>,
		 e: Arc<u8>,
		 f: Arc<u8>,
		 g: Arc<u8>,
		 h: Arc<u8>,
		 i: Arc<u8>,
		 j: Arc<u8>,
		 k: Arc<u8>,
		 l: Arc<u8>| {
			[a, b, c, d, e, f, g, h, i, j, k, l]
				.iter()
				.map(|n| u32::from(**n))
				.sum::<u32>()
		},
	);

	// Assert
	assert_eq!(result.unwrap(), 66);
}

#[rstest]
fn stored_function_is_invoked_from_value() {
	// Arrange
	let registry = Registry::new();
	registry
		.map_by_index(3i32, 0)
		.map_by_index(4i32, 1)
		.map_by_tag(Function::new(|a: Arc<i32>, b: Arc<i32>| *a * *b), "area");
	let handler = registry
		.get_by_tag(&TypeKey::of::<Function>(), "area")
		.unwrap();

	// Act
	let output = registry.invoke_value(&handler).unwrap();

	// Assert
	assert_eq!(*output.downcast::<i32>().unwrap(), 12);
}

#[rstest]
fn invoke_value_rejects_non_callable() {
	// Arrange
	let registry = Registry::new();
	let target = Value::new(5i32);

	// Act
	let result = registry.invoke_value(&target);

	// Assert
	assert_eq!(
		result.unwrap_err(),
		DiError::InvalidTarget {
			expected: "a callable `Function`",
			found: std::any::type_name::<i32>(),
		}
	);
}

#[rstest]
fn function_reports_binding_failure() {
	// Arrange
	let registry = Registry::new();
	let function = Function::new(|name: Arc<String>| name.len());

	// Act
	let result = function.call(&registry);

	// Assert
	assert!(matches!(
		result,
		Err(DiError::MissingDependency { position: 0, .. })
	));
}
