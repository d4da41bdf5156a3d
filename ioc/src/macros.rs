//! Public macros for ergonomic definition registration.

/// Builds the identifier/recipe list accepted by
/// [`Container::set_definitions`](crate::Container::set_definitions) and
/// [`Container::with_definitions`](crate::Container::with_definitions).
///
/// Each right-hand side is anything convertible into a
/// [`RawDefinition`](crate::RawDefinition): a raw definition itself, a
/// [`DefinitionRecord`](crate::DefinitionRecord), a normalized
/// [`Definition`](crate::Definition), or a bare string (registered as an
/// alias of that identifier).
///
/// # Examples
///
/// ```
/// use braid_ioc::{definitions, Container, RawDefinition};
///
/// let container = Container::with_definitions(definitions! {
///   "greeting" => RawDefinition::value(String::from("Hello, World!")),
///   "message" => "greeting",
/// });
///
/// let message = container.get_as::<String>("message").unwrap();
/// assert_eq!(*message, "Hello, World!");
/// ```
#[macro_export]
macro_rules! definitions {
  ( $( $id:expr => $definition:expr ),* $(,)? ) => {
    vec![
      $( (::std::string::String::from($id), $crate::RawDefinition::from($definition)) ),*
    ]
  };
}
