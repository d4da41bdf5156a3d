//! The main `Container` struct and its associated methods.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, trace};

use crate::core::{BoxError, Object, ResolutionGuard, ResolutionKey};
use crate::definition::{Definition, DefinitionRecord, RawDefinition};
use crate::errors::ContainerError;

// Distinguishes containers in the thread-local resolving set, so two
// containers resolving the same identifier on one thread never collide.
static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(0);

enum Slot {
  Raw(RawDefinition),
  Ready(Arc<Definition>),
}

/// A registry mapping string identifiers to construction recipes, resolved
/// on demand.
///
/// Entries are stored raw and normalized lazily: registration does no
/// validation at all, so definitions may reference identifiers that are only
/// registered later. The first access to an entry normalizes it into a
/// [`Definition`] and memoizes that form in place.
///
/// The container is thread-safe. Shared definitions construct at most once
/// even under concurrent resolution, and the cycle-detection marker is owned
/// per call tree, so parallel resolutions of the same identifier are not
/// mistaken for a circular reference.
pub struct Container {
  id: u64,
  definitions: DashMap<String, Slot>,
}

impl Default for Container {
  fn default() -> Self {
    Self::new()
  }
}

impl Container {
  /// Creates a new, empty `Container`.
  pub fn new() -> Self {
    Self {
      id: NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed),
      definitions: DashMap::new(),
    }
  }

  /// Creates a container pre-populated from an identifier/recipe mapping.
  pub fn with_definitions<I, S, D>(definitions: I) -> Self
  where
    I: IntoIterator<Item = (S, D)>,
    S: Into<String>,
    D: Into<RawDefinition>,
  {
    let container = Self::new();
    container.set_definitions(definitions);
    container
  }

  // --- Registration ---

  /// Stores or overwrites the raw definition for `id`.
  ///
  /// Overwriting an already-normalized entry discards its normalized form
  /// along with any cached shared instance.
  pub fn set_definition(&self, id: impl Into<String>, definition: impl Into<RawDefinition>) {
    let id = id.into();
    trace!(id = %id, "registering definition");
    self.definitions.insert(id, Slot::Raw(definition.into()));
  }

  /// Applies [`set_definition`](Self::set_definition) to every entry, in the
  /// caller-supplied order.
  pub fn set_definitions<I, S, D>(&self, definitions: I)
  where
    I: IntoIterator<Item = (S, D)>,
    S: Into<String>,
    D: Into<RawDefinition>,
  {
    for (id, definition) in definitions {
      self.set_definition(id, definition);
    }
  }

  /// Registers a pre-built value, resolved as-is. Always shared.
  pub fn set_instance<T: Any + Send + Sync>(&self, id: impl Into<String>, value: T) {
    self.set_definition(id, RawDefinition::value(value));
  }

  /// Registers a construction closure. The result is shared: the closure
  /// runs once and every resolution returns the same instance.
  pub fn set_factory<T, F>(&self, id: impl Into<String>, func: F)
  where
    T: Any + Send + Sync,
    F: Fn(&Container) -> Result<T, BoxError> + Send + Sync + 'static,
  {
    self.set_definition(id, RawDefinition::factory(func));
  }

  /// Registers a construction closure that runs on every resolution.
  pub fn set_factory_non_shared<T, F>(&self, id: impl Into<String>, func: F)
  where
    T: Any + Send + Sync,
    F: Fn(&Container) -> Result<T, BoxError> + Send + Sync + 'static,
  {
    self.set_definition(id, DefinitionRecord::new().func(func).shared(false));
  }

  /// Registers `id` as an alias of `target`.
  pub fn set_alias(&self, id: impl Into<String>, target: impl Into<String>) {
    self.set_definition(id, RawDefinition::alias(target));
  }

  // --- Lookup ---

  /// True if `id` has a registered definition, raw or normalized.
  ///
  /// A true result only guarantees that `get` will not fail with
  /// [`ContainerError::NotFound`]; the entry may still fail to normalize or
  /// to construct.
  pub fn has(&self, id: &str) -> bool {
    self.definitions.contains_key(id)
  }

  /// Returns the normalized definition for `id`, or `None` if it was never
  /// registered.
  ///
  /// The stored raw payload is normalized on first access and the result is
  /// memoized in the same slot. A failing payload is left raw, so the same
  /// error is reported again on the next attempt.
  pub fn resolve_definition(&self, id: &str) -> Result<Option<Arc<Definition>>, ContainerError> {
    let Some(mut slot) = self.definitions.get_mut(id) else {
      return Ok(None);
    };
    let definition = match &*slot {
      Slot::Ready(definition) => return Ok(Some(definition.clone())),
      Slot::Raw(raw) => Arc::new(Definition::from_raw(raw.clone())?),
    };
    debug!(id = %id, definition = ?definition, "normalized definition");
    *slot = Slot::Ready(definition.clone());
    Ok(Some(definition))
  }

  /// Resolves `id` to an object.
  ///
  /// Fails with [`ContainerError::NotFound`] for an unregistered identifier,
  /// [`ContainerError::CircularReference`] if `id` is already part of the
  /// current resolution chain, or whatever normalization or construction
  /// error the definition produces.
  pub fn get(&self, id: &str) -> Result<Object, ContainerError> {
    let definition = self
      .resolve_definition(id)?
      .ok_or_else(|| ContainerError::NotFound(id.to_owned()))?;

    // Marks `id` as in flight for this call tree; the mark is released when
    // the guard drops, on success and on failure alike.
    let _guard = ResolutionGuard::acquire(ResolutionKey {
      container: self.id,
      id: id.to_owned(),
    })?;

    trace!(id = %id, "resolving");
    definition.resolve(self)
  }

  /// Resolves `id` and downcasts the result to `T`.
  pub fn get_as<T: Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>, ContainerError> {
    self.get(id)?.downcast::<T>().map_err(|_| {
      ContainerError::Downcast {
        id: id.to_owned(),
        expected: std::any::type_name::<T>(),
      }
    })
  }

  // --- Validation ---

  /// Checks that every registered definition normalizes into a known
  /// variant, wrapping the first failure with the offending identifier.
  ///
  /// Construction is deliberately not exercised: registration does next to
  /// no validation (definitions may be registered in any order, and
  /// validating each entry up front would be wasted work), so this is the
  /// debugging hook to check a fully-populated container. Running build
  /// closures here would make a read-only check have side effects, so only
  /// normalization is covered.
  pub fn validate(&self) -> Result<(), ContainerError> {
    // Snapshot the keys first; normalization takes a write lock per entry.
    let ids: Vec<String> = self
      .definitions
      .iter()
      .map(|entry| entry.key().clone())
      .collect();
    for id in ids {
      if let Err(err) = self.resolve_definition(&id) {
        return Err(ContainerError::Validation {
          id,
          source: Box::new(err),
        });
      }
    }
    Ok(())
  }

  /// Boolean form of [`validate`](Self::validate): reports the first
  /// failure as `false` instead of an error.
  pub fn is_valid(&self) -> bool {
    self.validate().is_ok()
  }
}
