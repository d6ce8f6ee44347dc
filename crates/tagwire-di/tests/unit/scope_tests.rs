//! Unit tests for scope chaining

use crate::fixtures::{English, French, Greeter};
use rstest::*;
use std::sync::{Arc, Barrier};
use std::thread;
use tagwire_di::{AmbiguityPolicy, DiError, Registry, RegistrySettings, TypeKey};

#[rstest]
fn child_resolves_from_parent_when_local_misses() {
	// Arrange
	let parent = Arc::new(Registry::new());
	parent.map_by_index(1i32, 0);
	let child = Registry::new();
	child.set_parent(&parent).unwrap();

	// Act
	let value = child.get_index::<i32>(0);

	// Assert
	assert_eq!(*value.unwrap(), 1);
}

#[rstest]
fn local_entry_shadows_parent_without_touching_it() {
	// Arrange
	let parent = Arc::new(Registry::new());
	parent.map_by_tag("v1".to_string(), "version");
	let child = Registry::child_of(&parent);
	assert_eq!(*child.get_tag::<String>("version").unwrap(), "v1");

	// Act
	child.map_by_tag("v2".to_string(), "version");

	// Assert
	assert_eq!(*child.get_tag::<String>("version").unwrap(), "v2");
	assert_eq!(*parent.get_tag::<String>("version").unwrap(), "v1");
}

#[rstest]
fn resolution_walks_the_whole_chain() {
	// Arrange
	let root = Arc::new(Registry::new());
	root.map_by_index(3u8, 2);
	let middle = Arc::new(Registry::child_of(&root));
	middle.map_by_index(2u8, 1);
	let leaf = Registry::child_of(&middle);
	leaf.map_by_index(1u8, 0);

	// Act & Assert
	assert_eq!(*leaf.get_index::<u8>(0).unwrap(), 1);
	assert_eq!(*leaf.get_index::<u8>(1).unwrap(), 2);
	assert_eq!(*leaf.get_index::<u8>(2).unwrap(), 3);
	assert!(leaf.get_index::<u8>(3).is_none());
	assert!(root.get_index::<u8>(0).is_none());
}

#[rstest]
fn local_interface_fallback_wins_over_parent_exact_match() {
	// Arrange
	let parent = Arc::new(Registry::new());
	parent.map_index_to::<dyn Greeter, _>(French, 0).unwrap();
	let child = Registry::child_of(&parent);
	child.map_by_index(English, 0);

	// Act
	let greeter = child.get_index_as::<dyn Greeter>(0).unwrap();

	// Assert
	assert_eq!(greeter.greet(), "hello");
}

#[rstest]
fn set_parent_can_replace_the_link() {
	// Arrange
	let first = Arc::new(Registry::new());
	first.map_by_index("first".to_string(), 0);
	let second = Arc::new(Registry::new());
	second.map_by_index("second".to_string(), 0);
	let child = Registry::child_of(&first);

	// Act
	child.set_parent(&second).unwrap();

	// Assert
	assert_eq!(*child.get_index::<String>(0).unwrap(), "second");
}

#[rstest]
fn clear_parent_detaches_scope() {
	// Arrange
	let parent = Arc::new(Registry::new());
	parent.map_by_index(5i32, 0);
	let child = Registry::child_of(&parent);

	// Act
	child.clear_parent();

	// Assert
	assert!(child.parent().is_none());
	assert!(child.get_index::<i32>(0).is_none());
}

#[rstest]
fn self_parent_is_rejected() {
	// Arrange
	let scope = Arc::new(Registry::new());

	// Act
	let result = scope.set_parent(&scope);

	// Assert
	assert_eq!(result, Err(DiError::CyclicScope { cycle_length: 1 }));
	assert!(scope.parent().is_none());
}

#[rstest]
fn indirect_cycle_is_rejected() {
	// Arrange
	let root = Arc::new(Registry::new());
	let middle = Arc::new(Registry::child_of(&root));
	let leaf = Arc::new(Registry::child_of(&middle));

	// Act
	let result = root.set_parent(&leaf);

	// Assert
	assert_eq!(result, Err(DiError::CyclicScope { cycle_length: 3 }));
	assert!(root.parent().is_none());
}

#[rstest]
fn concurrent_opposite_links_never_form_a_cycle() {
	for _ in 0..2_000 {
		// Arrange
		let a = Arc::new(Registry::new());
		let b = Arc::new(Registry::new());
		let barrier = Arc::new(Barrier::new(2));

		// Act
		let link = |child: &Arc<Registry>, parent: &Arc<Registry>| {
			let (child, parent, barrier) =
				(Arc::clone(child), Arc::clone(parent), Arc::clone(&barrier));
			thread::spawn(move || {
				barrier.wait();
				child.set_parent(&parent).is_ok()
			})
		};
		let first = link(&a, &b);
		let second = link(&b, &a);
		let linked = [first.join().unwrap(), second.join().unwrap()];

		// Assert
		assert_eq!(linked.iter().filter(|ok| **ok).count(), 1);
		assert!(a.parent().is_none() || b.parent().is_none());
	}
}

#[rstest]
fn parent_is_not_kept_alive_by_child() {
	// Arrange
	let parent = Arc::new(Registry::new());
	parent.map_by_index(1i32, 0);
	let child = Registry::child_of(&parent);

	// Act
	drop(parent);

	// Assert
	assert!(child.parent().is_none());
	assert!(child.get_by_index(&TypeKey::of::<i32>(), 0).is_none());
}

#[rstest]
fn child_of_inherits_parent_settings() {
	// Arrange
	let settings = RegistrySettings::default()
		.with_ambiguity(AmbiguityPolicy::Reject)
		.with_interface_fallback(false);
	let parent = Arc::new(Registry::with_settings(settings.clone()));

	// Act
	let child = Registry::child_of(&parent);

	// Assert
	assert_eq!(child.settings(), &settings);
}
