//! Core, non-public data structures for the container.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashSet;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::container::Container;
use crate::errors::ContainerError;

/// The uniform type every definition resolves to.
///
/// Containers are heterogeneous, so resolved values travel as shared,
/// type-erased handles and are downcast at the edges (see
/// [`Container::get_as`](crate::Container::get_as)).
pub type Object = Arc<dyn Any + Send + Sync>;

/// The error type build closures are allowed to fail with.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// A user-supplied construction recipe.
///
/// The closure receives the owning container so it can resolve its own
/// dependencies while constructing.
pub type FactoryFn = Arc<dyn Fn(&Container) -> Result<Object, BoxError> + Send + Sync>;

thread_local! {
  // This thread-local variable holds the identifiers currently being resolved
  // on this specific thread. This is the key to detecting circular references.
  // It is scoped to one logical call tree and empty between top-level calls.
  static RESOLVING: RefCell<HashSet<ResolutionKey>> = RefCell::new(HashSet::new());
}

/// Identifies one in-flight resolution.
///
/// The container id keeps two containers resolving the same identifier on the
/// same thread from being mistaken for a cycle.
#[derive(Clone, PartialEq, Eq, Hash)]
pub(crate) struct ResolutionKey {
  pub(crate) container: u64,
  pub(crate) id: String,
}

impl fmt::Debug for ResolutionKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Key(Container({}), Id({}))", self.container, self.id)
  }
}

/// An RAII guard marking an identifier as "resolving" for the current call
/// tree.
///
/// Acquisition fails with [`ContainerError::CircularReference`] if the key is
/// already in flight, which means the identifier re-entered its own
/// resolution chain. Dropping the guard removes the key again, so the mark is
/// released on every exit path of `Container::get`, success or failure alike.
pub(crate) struct ResolutionGuard {
  key: ResolutionKey,
}

impl ResolutionGuard {
  pub(crate) fn acquire(key: ResolutionKey) -> Result<Self, ContainerError> {
    let entered = RESOLVING.with(|stack| {
      // `insert` returns `false` if the value was already present.
      stack.borrow_mut().insert(key.clone())
    });
    if !entered {
      return Err(ContainerError::CircularReference(key.id));
    }
    Ok(Self { key })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING.with(|stack| {
      stack.borrow_mut().remove(&self.key);
    });
  }
}
