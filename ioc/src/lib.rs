//! # Braid IoC
//!
//! A string-keyed, recipe-driven Inversion of Control (IoC) container for Rust.
//!
//! Braid IoC maps opaque string identifiers to construction recipes
//! ("definitions") and resolves them into objects on demand. Registration is
//! deliberately unvalidated and order-free: definitions may reference
//! identifiers that are only registered later, and each entry is normalized
//! into its definition variant the first time it is accessed.
//!
//! ## Core Concepts
//!
//! - **Container**: the registry; owns the identifier → definition mapping
//!   and orchestrates resolution.
//! - **RawDefinition**: the loose shape a recipe arrives in — a bare alias
//!   string, a construction closure, a pre-built value, or a structured
//!   [`DefinitionRecord`] with named fields.
//! - **Definition**: the normalized recipe, one of three variants: *alias*
//!   (forwards to another identifier), *build* (invokes a closure), or
//!   *instance* (returns a pre-built object).
//! - **Sharing**: a shared definition constructs once and caches the
//!   instance; a non-shared one constructs on every resolution. Everything
//!   is shared by default except aliases, whose sharing belongs to their
//!   target.
//!
//! Resolution recurses through aliases and build closures, detects circular
//! references instead of overflowing the stack, and reports every failure as
//! a [`ContainerError`] value.
//!
//! ## Quick Start
//!
//! ```
//! use braid_ioc::{Container, ContainerError};
//!
//! struct Greeter {
//!   message: String,
//! }
//!
//! impl Greeter {
//!   fn greet(&self) -> String {
//!     self.message.clone()
//!   }
//! }
//!
//! let container = Container::new();
//!
//! // Register a pre-built value.
//! container.set_instance("greeting_message", String::from("Hello, World!"));
//!
//! // Register a recipe; it resolves its own dependency from the container.
//! container.set_factory("greeter", |c: &Container| {
//!   let message = c.get_as::<String>("greeting_message")?;
//!   Ok(Greeter {
//!     message: (*message).clone(),
//!   })
//! });
//!
//! // Alias another name onto the same entry.
//! container.set_alias("greeter_service", "greeter");
//!
//! let greeter = container.get_as::<Greeter>("greeter_service").unwrap();
//! assert_eq!(greeter.greet(), "Hello, World!");
//!
//! // Missing entries are errors, not panics.
//! assert!(matches!(
//!   container.get("missing"),
//!   Err(ContainerError::NotFound(_))
//! ));
//! ```

mod container;
mod core;
mod definition;
mod errors;
mod macros;

pub use crate::container::Container;
pub use crate::core::{BoxError, FactoryFn, Object};
pub use crate::definition::{Definition, DefinitionClass, DefinitionRecord, RawDefinition};
pub use crate::errors::ContainerError;
