//! Registry scopes and the resolver
//!
//! A [`Registry`] stores values under a [`TypeKey`] plus a qualifier. Each
//! scope may be linked to a parent; lookups that miss locally are delegated
//! up the chain.
//!
//! Resolution of `(key, qualifier)` in one scope:
//!
//! 1. exact match on the key and qualifier;
//! 2. for interface keys only, a scan of the locally registered types that
//!    satisfy the interface, in registration order;
//! 3. on a full local miss, the same resolution in the parent.
//!
//! When step 2 finds several candidates, [`AmbiguityPolicy`] decides between
//! the first registered one and an error.

use crate::error::{DiError, DiResult};
use crate::key::{Interface, Qualifier, Slot, TypeKey};
use crate::settings::{AmbiguityPolicy, RegistrySettings};
use crate::value::Value;
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::sync::{Arc, Weak};

/// Serializes parent linking so the cycle check and the write are atomic
/// across every scope.
static LINK_LOCK: Mutex<()> = Mutex::new(());

/// Entries of one type, in insertion order. Index and tag qualifiers never
/// share a map.
#[derive(Default, Clone)]
struct TypeEntries {
	by_index: IndexMap<usize, Value>,
	by_tag: IndexMap<String, Value>,
}

impl TypeEntries {
	fn get(&self, slot: Slot<'_>) -> Option<&Value> {
		match slot {
			Slot::Index(index) => self.by_index.get(&index),
			Slot::Tag(tag) => self.by_tag.get(tag),
		}
	}

	fn len(&self) -> usize {
		self.by_index.len() + self.by_tag.len()
	}
}

/// A stored `(type, qualifier, value)` triple.
#[derive(Debug, Clone)]
pub struct Entry {
	pub key: TypeKey,
	pub qualifier: Qualifier,
	pub value: Value,
}

/// One dependency scope.
///
/// Scopes are shared through `Arc` so children can link to them; the link is
/// a `Weak` reference and never keeps the parent alive. A child whose parent
/// has been dropped resolves as if it had no parent.
///
/// The entry store is guarded by a read/write lock, so mapping into a scope
/// while other threads resolve against it is safe.
///
/// # Examples
///
/// ```
/// use tagwire_di::{Registry, TypeKey};
///
/// let registry = Registry::new();
/// registry.map_by_index(250i64, 1).map_by_tag("Huston".to_string(), "Name");
///
/// let count = registry.get_by_index(&TypeKey::of::<i64>(), 1).unwrap();
/// assert_eq!(*count.downcast::<i64>().unwrap(), 250);
/// assert_eq!(*registry.get_tag::<String>("Name").unwrap(), "Huston");
/// assert!(registry.get_by_index(&TypeKey::of::<i64>(), 0).is_none());
/// ```
pub struct Registry {
	store: RwLock<IndexMap<TypeKey, TypeEntries>>,
	parent: RwLock<Option<Weak<Registry>>>,
	settings: RegistrySettings,
}

impl Registry {
	/// Creates an empty scope with default settings.
	pub fn new() -> Self {
		Self::with_settings(RegistrySettings::default())
	}

	pub fn with_settings(settings: RegistrySettings) -> Self {
		Self {
			store: RwLock::new(IndexMap::new()),
			parent: RwLock::new(None),
			settings,
		}
	}

	/// Creates an empty scope linked to `parent`, inheriting its settings.
	///
	/// # Examples
	///
	/// ```
	/// use tagwire_di::Registry;
	/// use std::sync::Arc;
	///
	/// let root = Arc::new(Registry::new());
	/// root.map_by_index(7u8, 0);
	///
	/// let child = Registry::child_of(&root);
	/// assert_eq!(*child.get_index::<u8>(0).unwrap(), 7);
	/// ```
	pub fn child_of(parent: &Arc<Registry>) -> Self {
		let child = Self::with_settings(parent.settings.clone());
		*child.parent.write() = Some(Arc::downgrade(parent));
		child
	}

	pub fn settings(&self) -> &RegistrySettings {
		&self.settings
	}

	// Parent link

	/// Links this scope to `parent`, replacing any previous link.
	///
	/// Fails with [`DiError::CyclicScope`] when `parent` is this scope or one
	/// of its descendants.
	pub fn set_parent(&self, parent: &Arc<Registry>) -> DiResult<()> {
		let _link = LINK_LOCK.lock();

		let mut cycle_length = 1;
		let mut ancestor = Some(Arc::clone(parent));
		while let Some(scope) = ancestor {
			if std::ptr::eq(Arc::as_ptr(&scope), self) {
				return Err(DiError::CyclicScope { cycle_length });
			}
			cycle_length += 1;
			ancestor = scope.parent();
		}

		*self.parent.write() = Some(Arc::downgrade(parent));
		Ok(())
	}

	/// Removes the parent link.
	pub fn clear_parent(&self) {
		*self.parent.write() = None;
	}

	/// The parent scope, if linked and still alive.
	pub fn parent(&self) -> Option<Arc<Registry>> {
		let link = self.parent.read();
		let weak = link.as_ref()?;
		let parent = weak.upgrade();
		if parent.is_none() {
			tracing::debug!("parent scope has been dropped; resolving locally only");
		}
		parent
	}

	// Index-qualified storage

	/// Stores `value` under its own type at `index`.
	pub fn map_by_index<T: Any + Send + Sync>(&self, value: T, index: usize) -> &Self {
		self.insert(TypeKey::of::<T>(), Slot::Index(index), Value::new(value))
	}

	/// Stores `value` under the interface descriptor `interface` at `index`.
	///
	/// Fails when `interface` is not an interface descriptor, or when the
	/// value's type is not a declared implementor of it.
	pub fn map_index_as<T: Any + Send + Sync>(
		&self,
		value: T,
		interface: TypeKey,
		index: usize,
	) -> DiResult<&Self> {
		let view = interface_view(Value::new(value), &interface)?;
		Ok(self.insert(interface, Slot::Index(index), view))
	}

	/// Typed form of [`map_index_as`](Self::map_index_as).
	///
	/// # Examples
	///
	/// ```
	/// use tagwire_di::{Registry, TypeKey, interface};
	///
	/// trait Clock: Send + Sync {
	///     fn now(&self) -> u64;
	/// }
	/// struct Fixed;
	/// impl Clock for Fixed {
	///     fn now(&self) -> u64 {
	///         1_700_000_000
	///     }
	/// }
	/// interface!(dyn Clock = [Fixed]);
	///
	/// let registry = Registry::new();
	/// registry.map_index_to::<dyn Clock, _>(Fixed, 0).unwrap();
	///
	/// let clock = registry.get_index_as::<dyn Clock>(0).unwrap();
	/// assert_eq!(clock.now(), 1_700_000_000);
	/// assert!(registry.get_index::<Fixed>(0).is_none());
	/// ```
	pub fn map_index_to<I, T>(&self, value: T, index: usize) -> DiResult<&Self>
	where
		I: Interface + ?Sized,
		T: Any + Send + Sync,
	{
		self.map_index_as(value, TypeKey::interface::<I>(), index)
	}

	/// Stores `value` under `key` at `index` without checking the value's type.
	pub fn set_by_index(&self, key: TypeKey, value: Value, index: usize) -> &Self {
		self.insert(key, Slot::Index(index), value)
	}

	/// Resolves `(key, index)` through this scope and its ancestors.
	pub fn get_by_index(&self, key: &TypeKey, index: usize) -> Option<Value> {
		self.get(key, Slot::Index(index))
	}

	/// Like [`get_by_index`](Self::get_by_index), reporting rejected ambiguities.
	pub fn resolve_index(&self, key: &TypeKey, index: usize) -> DiResult<Option<Value>> {
		self.resolve(key, Slot::Index(index))
	}

	pub fn get_index<T: Any + Send + Sync>(&self, index: usize) -> Option<Arc<T>> {
		self.get_by_index(&TypeKey::of::<T>(), index)?.downcast::<T>()
	}

	pub fn get_index_as<I: Interface + ?Sized>(&self, index: usize) -> Option<Arc<I>> {
		self.get_by_index(&TypeKey::interface::<I>(), index)?
			.as_interface::<I>()
	}

	pub fn contains_index(&self, key: &TypeKey, index: usize) -> bool {
		self.contains(key, Slot::Index(index))
	}

	// Tag-qualified storage

	/// Stores `value` under its own type at `tag`.
	pub fn map_by_tag<T: Any + Send + Sync>(&self, value: T, tag: impl Into<String>) -> &Self {
		let tag = tag.into();
		self.insert(TypeKey::of::<T>(), Slot::Tag(&tag), Value::new(value))
	}

	/// Stores `value` under the interface descriptor `interface` at `tag`.
	pub fn map_tag_as<T: Any + Send + Sync>(
		&self,
		value: T,
		interface: TypeKey,
		tag: impl Into<String>,
	) -> DiResult<&Self> {
		let view = interface_view(Value::new(value), &interface)?;
		let tag = tag.into();
		Ok(self.insert(interface, Slot::Tag(&tag), view))
	}

	/// Typed form of [`map_tag_as`](Self::map_tag_as).
	pub fn map_tag_to<I, T>(&self, value: T, tag: impl Into<String>) -> DiResult<&Self>
	where
		I: Interface + ?Sized,
		T: Any + Send + Sync,
	{
		self.map_tag_as(value, TypeKey::interface::<I>(), tag)
	}

	/// Stores `value` under `key` at `tag` without checking the value's type.
	pub fn set_by_tag(&self, key: TypeKey, value: Value, tag: impl Into<String>) -> &Self {
		let tag = tag.into();
		self.insert(key, Slot::Tag(&tag), value)
	}

	/// Resolves `(key, tag)` through this scope and its ancestors.
	pub fn get_by_tag(&self, key: &TypeKey, tag: &str) -> Option<Value> {
		self.get(key, Slot::Tag(tag))
	}

	/// Like [`get_by_tag`](Self::get_by_tag), reporting rejected ambiguities.
	pub fn resolve_tag(&self, key: &TypeKey, tag: &str) -> DiResult<Option<Value>> {
		self.resolve(key, Slot::Tag(tag))
	}

	pub fn get_tag<T: Any + Send + Sync>(&self, tag: &str) -> Option<Arc<T>> {
		self.get_by_tag(&TypeKey::of::<T>(), tag)?.downcast::<T>()
	}

	pub fn get_tag_as<I: Interface + ?Sized>(&self, tag: &str) -> Option<Arc<I>> {
		self.get_by_tag(&TypeKey::interface::<I>(), tag)?
			.as_interface::<I>()
	}

	pub fn contains_tag(&self, key: &TypeKey, tag: &str) -> bool {
		self.contains(key, Slot::Tag(tag))
	}

	// Introspection

	/// Number of local entries.
	pub fn len(&self) -> usize {
		self.store.read().values().map(TypeEntries::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Local entries in registration order: grouped by type, then indices
	/// followed by tags, each in the order they were first mapped.
	pub fn entries(&self) -> Vec<Entry> {
		let store = self.store.read();
		let mut entries = Vec::new();
		for (key, typed) in store.iter() {
			entries.extend(typed.by_index.iter().map(|(index, value)| Entry {
				key: *key,
				qualifier: Qualifier::Index(*index),
				value: value.clone(),
			}));
			entries.extend(typed.by_tag.iter().map(|(tag, value)| Entry {
				key: *key,
				qualifier: Qualifier::Tag(tag.clone()),
				value: value.clone(),
			}));
		}
		entries
	}

	/// Removes all local entries. The parent link is kept.
	pub fn clear(&self) {
		self.store.write().clear();
	}

	// Resolution

	fn insert(&self, key: TypeKey, slot: Slot<'_>, value: Value) -> &Self {
		let mut store = self.store.write();
		let typed = store.entry(key).or_default();
		let previous = match slot {
			Slot::Index(index) => typed.by_index.insert(index, value),
			Slot::Tag(tag) => typed.by_tag.insert(tag.to_string(), value),
		};
		tracing::trace!(
			key = key.name(),
			qualifier = %slot.to_qualifier(),
			overwritten = previous.is_some(),
			"mapped entry"
		);
		self
	}

	fn contains(&self, key: &TypeKey, slot: Slot<'_>) -> bool {
		self.store
			.read()
			.get(key)
			.is_some_and(|typed| typed.get(slot).is_some())
	}

	fn get(&self, key: &TypeKey, slot: Slot<'_>) -> Option<Value> {
		match self.resolve(key, slot) {
			Ok(found) => found,
			Err(err) => {
				tracing::debug!(%err, "treating ambiguous match as absent");
				None
			}
		}
	}

	fn resolve(&self, key: &TypeKey, slot: Slot<'_>) -> DiResult<Option<Value>> {
		if let Some(found) = self.resolve_local(key, slot)? {
			return Ok(Some(found));
		}

		match self.parent() {
			Some(parent) => {
				tracing::trace!(key = key.name(), qualifier = %slot.to_qualifier(), "delegating to parent scope");
				parent.resolve(key, slot)
			}
			None => {
				tracing::trace!(key = key.name(), qualifier = %slot.to_qualifier(), "not found");
				Ok(None)
			}
		}
	}

	fn resolve_local(&self, key: &TypeKey, slot: Slot<'_>) -> DiResult<Option<Value>> {
		let store = self.store.read();

		if let Some(value) = store.get(key).and_then(|typed| typed.get(slot)) {
			tracing::trace!(key = key.name(), qualifier = %slot.to_qualifier(), "exact match");
			return Ok(Some(value.clone()));
		}

		let Some(capability) = key.capability() else {
			return Ok(None);
		};
		if !self.settings.interface_fallback {
			return Ok(None);
		}

		let mut candidates = store
			.iter()
			.filter(|(candidate, _)| {
				candidate.id() != key.id() && capability.is_satisfied_by(candidate.id())
			})
			.filter_map(|(candidate, typed)| {
				let view = capability.upcast(typed.get(slot)?)?;
				Some((candidate.name(), view))
			});

		let Some((chosen, view)) = candidates.next() else {
			return Ok(None);
		};
		let others: Vec<&'static str> = candidates.map(|(name, _)| name).collect();

		if others.is_empty() {
			tracing::debug!(interface = key.name(), implementor = chosen, qualifier = %slot.to_qualifier(), "interface fallback match");
			return Ok(Some(view));
		}

		match self.settings.ambiguity {
			AmbiguityPolicy::FirstRegistered => {
				tracing::debug!(
					interface = key.name(),
					implementor = chosen,
					skipped = ?others,
					qualifier = %slot.to_qualifier(),
					"ambiguous interface match; using first registered"
				);
				Ok(Some(view))
			}
			AmbiguityPolicy::Reject => {
				let mut candidates = vec![chosen];
				candidates.extend(others);
				Err(DiError::AmbiguousMatch {
					interface: key.name(),
					qualifier: slot.to_qualifier(),
					candidates,
				})
			}
		}
	}
}

impl Default for Registry {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Registry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Registry")
			.field("entries", &self.len())
			.field("has_parent", &self.parent.read().is_some())
			.field("settings", &self.settings)
			.finish()
	}
}

/// Checks that `interface` is an interface descriptor satisfied by `value`
/// and returns the value viewed through it.
fn interface_view(value: Value, interface: &TypeKey) -> DiResult<Value> {
	let capability = interface
		.capability()
		.ok_or(DiError::NotAnInterface(interface.name()))?;

	if !capability.is_satisfied_by(value.type_key().id()) {
		return Err(DiError::UnsatisfiedInterface {
			value: value.type_name(),
			interface: interface.name(),
		});
	}

	capability
		.upcast(&value)
		.ok_or(DiError::UnsatisfiedInterface {
			value: value.type_name(),
			interface: interface.name(),
		})
}
