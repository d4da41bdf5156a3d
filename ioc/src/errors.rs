//! Error types surfaced by the container.

use thiserror::Error;

use crate::core::BoxError;

/// Everything that can go wrong while registering, normalizing or resolving
/// a definition.
#[derive(Debug, Error)]
pub enum ContainerError {
  /// The requested identifier has no registered definition.
  #[error("container item '{0}' is not defined")]
  NotFound(String),

  /// An identifier was reached again while already being resolved in the
  /// same call tree.
  #[error("circular reference detected (referencing '{0}')")]
  CircularReference(String),

  /// A definition record is missing the field its variant requires.
  #[error("missing required item '{field}' in {definition} definition")]
  MissingField {
    field: &'static str,
    definition: &'static str,
  },

  /// A pre-built instance was configured as non-shared.
  #[error("precreated objects cannot be defined non-shared")]
  NonSharedInstance,

  /// No definition variant accepted the raw payload.
  #[error("invalid configuration")]
  InvalidConfiguration,

  /// A build closure failed. The underlying error is carried unchanged.
  #[error("construction failed: {0}")]
  Construction(#[source] BoxError),

  /// The wrapping applied by [`Container::validate`](crate::Container::validate)
  /// when a registered definition fails to normalize.
  #[error("validation failed while preparing definition of '{id}': {source}")]
  Validation {
    id: String,
    #[source]
    source: Box<ContainerError>,
  },

  /// A resolved object could not be downcast to the requested type.
  #[error("container item '{id}' is not a '{expected}'")]
  Downcast { id: String, expected: &'static str },
}

impl ContainerError {
  /// True for the configuration-error family: payloads no variant accepts,
  /// missing required record fields and illegal sharing settings.
  pub fn is_invalid_configuration(&self) -> bool {
    matches!(
      self,
      ContainerError::MissingField { .. }
        | ContainerError::NonSharedInstance
        | ContainerError::InvalidConfiguration
    )
  }

  /// Maps an error raised inside a build closure.
  ///
  /// Container errors coming back out of a nested `get` keep their identity,
  /// so a cycle hit three aliases deep still surfaces as
  /// `CircularReference`. Anything else becomes a construction failure.
  pub(crate) fn from_factory(err: BoxError) -> Self {
    match err.downcast::<ContainerError>() {
      Ok(own) => *own,
      Err(other) => ContainerError::Construction(other),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn configuration_family_is_grouped() {
    assert!(ContainerError::InvalidConfiguration.is_invalid_configuration());
    assert!(ContainerError::NonSharedInstance.is_invalid_configuration());
    assert!(ContainerError::MissingField {
      field: "aliasOf",
      definition: "alias",
    }
    .is_invalid_configuration());
    assert!(!ContainerError::NotFound("x".to_owned()).is_invalid_configuration());
  }

  #[test]
  fn factory_errors_keep_container_error_identity() {
    let nested: BoxError = Box::new(ContainerError::CircularReference("x".to_owned()));
    assert!(matches!(
      ContainerError::from_factory(nested),
      ContainerError::CircularReference(id) if id == "x"
    ));

    let foreign: BoxError = "boom".into();
    assert!(matches!(
      ContainerError::from_factory(foreign),
      ContainerError::Construction(_)
    ));
  }

  #[test]
  fn messages_name_the_offender() {
    let err = ContainerError::NotFound("db".to_owned());
    assert_eq!(err.to_string(), "container item 'db' is not defined");

    let err = ContainerError::Validation {
      id: "db".to_owned(),
      source: Box::new(ContainerError::InvalidConfiguration),
    };
    assert_eq!(
      err.to_string(),
      "validation failed while preparing definition of 'db': invalid configuration"
    );
  }
}
