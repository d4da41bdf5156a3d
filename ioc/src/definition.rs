//! Definition variants and the normalization of raw payloads into them.
//!
//! A [`RawDefinition`] is whatever shape a recipe arrived in; a
//! [`Definition`] is the normalized form the container actually resolves.
//! Normalization happens once per identifier, on first access, and follows a
//! fixed inference order so ambiguous payloads always pick the same variant.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::container::Container;
use crate::core::{BoxError, FactoryFn, Object};
use crate::errors::ContainerError;

/// The value originally supplied for an identifier, before normalization.
#[derive(Clone)]
pub enum RawDefinition {
  /// A bare identifier: resolves as an alias of that other entry.
  Alias(String),
  /// A construction closure: resolves by invoking it.
  Factory(FactoryFn),
  /// A pre-built value: resolves to it as-is.
  Value(Object),
  /// A structured record with explicit, named fields.
  Record(DefinitionRecord),
  /// Already normalized; passed through unchanged.
  Normalized(Definition),
}

impl RawDefinition {
  /// Wraps a fallible construction closure.
  ///
  /// The closure receives the resolving container, so it can pull in its own
  /// dependencies with [`Container::get_as`].
  pub fn factory<T, F>(func: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(&Container) -> Result<T, BoxError> + Send + Sync + 'static,
  {
    RawDefinition::Factory(wrap_factory(func))
  }

  /// Wraps a pre-built value.
  pub fn value<T: Any + Send + Sync>(value: T) -> Self {
    RawDefinition::Value(Arc::new(value))
  }

  /// An alias of another identifier.
  pub fn alias(of: impl Into<String>) -> Self {
    RawDefinition::Alias(of.into())
  }
}

impl From<DefinitionRecord> for RawDefinition {
  fn from(record: DefinitionRecord) -> Self {
    RawDefinition::Record(record)
  }
}

impl From<Definition> for RawDefinition {
  fn from(definition: Definition) -> Self {
    RawDefinition::Normalized(definition)
  }
}

impl From<String> for RawDefinition {
  fn from(alias_of: String) -> Self {
    RawDefinition::Alias(alias_of)
  }
}

impl From<&str> for RawDefinition {
  fn from(alias_of: &str) -> Self {
    RawDefinition::Alias(alias_of.to_owned())
  }
}

// Erases the concrete value type produced by a user closure.
fn wrap_factory<T, F>(func: F) -> FactoryFn
where
  T: Any + Send + Sync,
  F: Fn(&Container) -> Result<T, BoxError> + Send + Sync + 'static,
{
  Arc::new(move |container| func(container).map(|value| Arc::new(value) as Object))
}

/// Explicit variant tag for a [`DefinitionRecord`], bypassing inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionClass {
  Alias,
  Build,
  Instance,
}

/// A structured raw definition with named, typed fields.
///
/// This is the record shape of a recipe: every recognized key is an explicit
/// optional field, so a misspelled key is a compile error rather than a
/// silently ignored entry. Required fields are enforced per variant when the
/// record is normalized, not when it is built.
#[derive(Clone, Default)]
pub struct DefinitionRecord {
  pub definition_class: Option<DefinitionClass>,
  pub alias_of: Option<String>,
  pub func: Option<FactoryFn>,
  pub instance: Option<Object>,
  pub shared: Option<bool>,
}

impl DefinitionRecord {
  pub fn new() -> Self {
    Self::default()
  }

  /// Pins the record to a variant, skipping inference during normalization.
  pub fn definition_class(mut self, class: DefinitionClass) -> Self {
    self.definition_class = Some(class);
    self
  }

  pub fn alias_of(mut self, of: impl Into<String>) -> Self {
    self.alias_of = Some(of.into());
    self
  }

  pub fn func<T, F>(mut self, func: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(&Container) -> Result<T, BoxError> + Send + Sync + 'static,
  {
    self.func = Some(wrap_factory(func));
    self
  }

  pub fn instance<T: Any + Send + Sync>(mut self, value: T) -> Self {
    self.instance = Some(Arc::new(value));
    self
  }

  pub fn shared(mut self, shared: bool) -> Self {
    self.shared = Some(shared);
    self
  }
}

impl fmt::Debug for DefinitionRecord {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DefinitionRecord")
      .field("definition_class", &self.definition_class)
      .field("alias_of", &self.alias_of)
      .field("func", &self.func.as_ref().map(|_| "<closure>"))
      .field("instance", &self.instance.as_ref().map(|_| "<object>"))
      .field("shared", &self.shared)
      .finish()
  }
}

enum DefinitionKind {
  Alias { alias_of: String },
  Build { func: FactoryFn },
  Instance { instance: Object },
}

impl Clone for DefinitionKind {
  fn clone(&self) -> Self {
    match self {
      DefinitionKind::Alias { alias_of } => DefinitionKind::Alias {
        alias_of: alias_of.clone(),
      },
      DefinitionKind::Build { func } => DefinitionKind::Build { func: func.clone() },
      DefinitionKind::Instance { instance } => DefinitionKind::Instance {
        instance: instance.clone(),
      },
    }
  }
}

/// A normalized construction recipe: one strategy for producing an object,
/// its sharing policy, and (for shared definitions) the cached instance slot.
///
/// `shared` defaults to true, except for aliases: sharing is owned by the
/// alias target, so an alias caches nothing unless explicitly asked to. The
/// cache slot is only ever touched when `shared` is true.
#[derive(Clone)]
pub struct Definition {
  shared: bool,
  cached: OnceCell<Object>,
  kind: DefinitionKind,
}

impl Definition {
  /// An alias delegating resolution to another identifier. Not shared by
  /// default.
  pub fn alias(of: impl Into<String>) -> Result<Self, ContainerError> {
    let alias_of = of.into();
    if alias_of.is_empty() {
      return Err(ContainerError::MissingField {
        field: "aliasOf",
        definition: "alias",
      });
    }
    Ok(Self {
      shared: false,
      cached: OnceCell::new(),
      kind: DefinitionKind::Alias { alias_of },
    })
  }

  /// A build recipe around an already-erased closure. Shared by default.
  pub fn build(func: FactoryFn) -> Self {
    Self {
      shared: true,
      cached: OnceCell::new(),
      kind: DefinitionKind::Build { func },
    }
  }

  /// A pre-built object. Always shared.
  pub fn instance(instance: Object) -> Self {
    Self {
      shared: true,
      cached: OnceCell::new(),
      kind: DefinitionKind::Instance { instance },
    }
  }

  pub fn shared(&self) -> bool {
    self.shared
  }

  /// Normalizes a raw payload into exactly one definition variant.
  ///
  /// Inference order is fixed, first match wins: already normalized, bare
  /// alias string, construction closure, pre-built value, structured record.
  /// Records honor an explicit `definition_class` tag first and otherwise try
  /// the recognizers in priority order build, alias, instance.
  pub fn from_raw(raw: RawDefinition) -> Result<Self, ContainerError> {
    match raw {
      RawDefinition::Normalized(definition) => Ok(definition),
      RawDefinition::Alias(of) => Self::alias(of),
      RawDefinition::Factory(func) => Ok(Self::build(func)),
      RawDefinition::Value(value) => Ok(Self::instance(value)),
      RawDefinition::Record(record) => Self::from_record(record),
    }
  }

  fn from_record(record: DefinitionRecord) -> Result<Self, ContainerError> {
    if let Some(class) = record.definition_class {
      return match class {
        DefinitionClass::Alias => Self::alias_from_record(record),
        DefinitionClass::Build => Self::build_from_record(record),
        DefinitionClass::Instance => Self::instance_from_record(record),
      };
    }

    if record.func.is_some() {
      Self::build_from_record(record)
    } else if record.alias_of.is_some() {
      Self::alias_from_record(record)
    } else if record.instance.is_some() {
      Self::instance_from_record(record)
    } else {
      Err(ContainerError::InvalidConfiguration)
    }
  }

  fn alias_from_record(record: DefinitionRecord) -> Result<Self, ContainerError> {
    let alias_of = record.alias_of.ok_or(ContainerError::MissingField {
      field: "aliasOf",
      definition: "alias",
    })?;
    let mut definition = Self::alias(alias_of)?;
    if let Some(shared) = record.shared {
      definition.shared = shared;
    }
    Ok(definition)
  }

  fn build_from_record(record: DefinitionRecord) -> Result<Self, ContainerError> {
    let func = record.func.ok_or(ContainerError::MissingField {
      field: "func",
      definition: "build",
    })?;
    let mut definition = Self::build(func);
    if let Some(shared) = record.shared {
      definition.shared = shared;
    }
    Ok(definition)
  }

  fn instance_from_record(record: DefinitionRecord) -> Result<Self, ContainerError> {
    let instance = record.instance.ok_or(ContainerError::MissingField {
      field: "instance",
      definition: "instance",
    })?;
    if record.shared == Some(false) {
      return Err(ContainerError::NonSharedInstance);
    }
    Ok(Self::instance(instance))
  }

  /// Resolves this definition against `container`.
  ///
  /// Shared definitions construct at most once: the first resolution stores
  /// the result in the cache slot and every later call returns the same
  /// handle, with concurrent first resolutions serialized by the cell.
  /// Non-shared definitions run their construction step on every call and
  /// never touch the cache slot.
  pub fn resolve(&self, container: &Container) -> Result<Object, ContainerError> {
    if self.shared {
      self
        .cached
        .get_or_try_init(|| self.do_resolve(container))
        .cloned()
    } else {
      self.do_resolve(container)
    }
  }

  fn do_resolve(&self, container: &Container) -> Result<Object, ContainerError> {
    match &self.kind {
      // The alias imposes nothing of its own; the target's definition decides
      // sharing and construction.
      DefinitionKind::Alias { alias_of } => container.get(alias_of),
      DefinitionKind::Build { func } => func(container).map_err(ContainerError::from_factory),
      DefinitionKind::Instance { instance } => Ok(instance.clone()),
    }
  }
}

impl fmt::Debug for Definition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut out = match &self.kind {
      DefinitionKind::Alias { alias_of } => {
        let mut out = f.debug_struct("Alias");
        out.field("alias_of", alias_of);
        out
      }
      DefinitionKind::Build { .. } => f.debug_struct("Build"),
      DefinitionKind::Instance { .. } => f.debug_struct("Instance"),
    };
    out
      .field("shared", &self.shared)
      .field("cached", &self.cached.get().is_some())
      .finish()
  }
}
