use std::sync::Arc;

use braid_ioc::{definitions, Container, ContainerError, DefinitionRecord};
use pretty_assertions::assert_eq;

// --- Test Fixtures ---

#[derive(Debug)]
struct Foo {
  label: String,
}

#[derive(Debug)]
struct Bar {
  foo: Arc<Foo>,
}

// The standard fixture: a shared `Foo` recipe, a non-shared `Bar` recipe
// depending on it, and alias chains over both. `fooShared` is an alias that
// opts into caching of its own.
fn standard_container() -> Container {
  Container::with_definitions(definitions! {
    "Foo" => DefinitionRecord::new().func(|_: &Container| {
      Ok(Foo {
        label: "foo".to_owned(),
      })
    }),
    "Bar" => DefinitionRecord::new()
      .func(|c: &Container| {
        Ok(Bar {
          foo: c.get_as::<Foo>("Foo")?,
        })
      })
      .shared(false),
    "FooInterface" => DefinitionRecord::new().alias_of("Foo"),
    "BarInterface" => DefinitionRecord::new().alias_of("Bar"),
    "foo" => DefinitionRecord::new().alias_of("FooInterface"),
    "bar" => DefinitionRecord::new().alias_of("BarInterface").shared(false),
    "fooShared" => DefinitionRecord::new().alias_of("foo").shared(true),
  })
}

fn same_instance(container: &Container, id1: &str, id2: &str) -> bool {
  let first = container.get(id1).unwrap();
  let second = container.get(id2).unwrap();
  Arc::ptr_eq(&first, &second)
}

// --- Basic Tests ---

#[test]
fn test_create_container() {
  let container = Container::new();
  assert!(!container.has("anything"));
}

#[test]
fn test_validate_ok() {
  let container = standard_container();
  assert!(container.validate().is_ok());
  assert!(container.is_valid());
}

#[test]
fn test_foo_is_shared_by_id() {
  let container = standard_container();
  assert!(same_instance(&container, "Foo", "Foo"));
}

#[test]
fn test_foo_is_shared_through_interface_alias() {
  let container = standard_container();
  assert!(same_instance(&container, "FooInterface", "FooInterface"));
}

#[test]
fn test_foo_is_shared_through_alias_chain() {
  // The alias itself is non-shared, but the target definition caches, so
  // every path lands on the same instance.
  let container = standard_container();
  assert!(same_instance(&container, "foo", "foo"));
  assert!(same_instance(&container, "foo", "Foo"));
}

#[test]
fn test_foo_shared_alias_is_shared() {
  let container = standard_container();
  assert!(same_instance(&container, "fooShared", "fooShared"));
}

#[test]
fn test_bar_is_not_shared_by_id() {
  let container = standard_container();
  assert!(!same_instance(&container, "Bar", "Bar"));
}

#[test]
fn test_bar_is_not_shared_through_interface_alias() {
  let container = standard_container();
  assert!(!same_instance(&container, "BarInterface", "BarInterface"));
}

#[test]
fn test_bar_is_not_shared_through_alias_chain() {
  let container = standard_container();
  assert!(!same_instance(&container, "bar", "bar"));
}

#[test]
fn test_fresh_bars_still_share_one_foo() {
  let container = standard_container();
  let first = container.get_as::<Bar>("bar").unwrap();
  let second = container.get_as::<Bar>("bar").unwrap();
  assert!(!Arc::ptr_eq(&first, &second));
  assert!(Arc::ptr_eq(&first.foo, &second.foo));
  assert_eq!(first.foo.label, "foo");
}

#[test]
fn test_has_is_true_immediately_after_registration() {
  let container = Container::new();
  assert!(!container.has("svc"));
  container.set_alias("svc", "elsewhere");
  // Registered but never resolved; `has` must not care.
  assert!(container.has("svc"));
}

#[test]
fn test_get_unregistered_id_is_not_found() {
  let container = Container::new();
  let err = container.get("missing").unwrap_err();
  assert!(matches!(err, ContainerError::NotFound(ref id) if id.as_str() == "missing"));
  assert_eq!(err.to_string(), "container item 'missing' is not defined");
}

#[test]
fn test_instance_registration_resolves_to_the_value() {
  let container = Container::new();
  container.set_instance("config", String::from("production"));

  let first = container.get_as::<String>("config").unwrap();
  let second = container.get_as::<String>("config").unwrap();
  assert_eq!(*first, "production");
  assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_bare_string_definition_registers_an_alias() {
  let container = Container::with_definitions(definitions! {
    "greeting" => DefinitionRecord::new().instance(String::from("hello")),
    "message" => "greeting",
  });

  let message = container.get_as::<String>("message").unwrap();
  assert_eq!(*message, "hello");
}

#[test]
fn test_alias_forwards_to_the_shared_target_instance() {
  // The concrete scenario: shared build, non-shared build, alias.
  let container = Container::new();
  container.set_factory("foo", |_: &Container| {
    Ok(Foo {
      label: "scenario".to_owned(),
    })
  });
  container.set_factory_non_shared("bar", |c: &Container| {
    Ok(Bar {
      foo: c.get_as::<Foo>("foo")?,
    })
  });
  container.set_alias("fooAlias", "foo");

  assert!(same_instance(&container, "foo", "foo"));
  assert!(!same_instance(&container, "bar", "bar"));
  assert!(same_instance(&container, "fooAlias", "foo"));
}
