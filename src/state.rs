//! Type-erased state values
//!
//! The engine threads a single state value through an expanding list of
//! steps. Step lists spliced in by calls come from arbitrary sub-programs,
//! so the value flowing between slots is type-erased; the typed
//! [`Program`](crate::Program) surface re-establishes the input/output
//! types at the boundary.
//!
//! States must be `Clone` because the engine holds a copy of the pre-call
//! state for the merge slot, and because `trace` records every observed
//! state.

use std::any::{type_name, Any};
use thiserror::Error;

/// A state value as the engine sees it: any `'static` value that can be
/// cloned behind the erased box.
///
/// Blanket-implemented for every `T: Any + Clone`; never implement this
/// by hand.
pub trait AnyState: Any {
    /// Clone the value into a fresh boxed state.
    fn clone_boxed(&self) -> DynState;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any + Clone> AnyState for T {
    fn clone_boxed(&self) -> DynState {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A boxed, type-erased state value.
pub type DynState = Box<dyn AnyState>;

impl Clone for DynState {
    fn clone(&self) -> Self {
        // Deref first: `Box<dyn AnyState>` itself satisfies the blanket
        // impl, and dispatching through it would bounce back here forever.
        (**self).clone_boxed()
    }
}

/// Error produced when a recorded state is downcast to the wrong type.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("state type mismatch: expected {expected}")]
    Mismatch { expected: &'static str },
}

impl dyn AnyState {
    /// Whether the erased state holds a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Borrow the state as a `T`, if that is what it holds.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Take the state as an owned `T`.
    ///
    /// Intended for consumers of [`trace`](crate::Program::trace) output,
    /// where the state type varies along the recording.
    pub fn downcast<T: Any>(self: Box<Self>) -> Result<T, StateError> {
        match self.into_any().downcast::<T>() {
            Ok(v) => Ok(*v),
            Err(_) => Err(StateError::Mismatch {
                expected: type_name::<T>(),
            }),
        }
    }
}

/// Unbox a state the typed API guarantees to be a `T`.
///
/// A failure here means a program was assembled outside the typed builder
/// (the `zip` pre-final-state assertion is the one escape hatch), so this
/// panics the way the engine panics on any internal invariant violation.
pub(crate) fn take_state<T: Any>(state: DynState) -> T {
    match state.into_any().downcast::<T>() {
        Ok(v) => *v,
        Err(_) => panic!("state type mismatch: expected {}", type_name::<T>()),
    }
}

/// Borrow a state the typed API guarantees to be a `T`.
pub(crate) fn peek_state<T: Any>(state: &dyn AnyState) -> &T {
    match state.downcast_ref::<T>() {
        Some(v) => v,
        None => panic!("state type mismatch: expected {}", type_name::<T>()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloning_an_erased_state_copies_the_inner_value() {
        let state: DynState = Box::new(vec![1i32, 2, 3]);
        let copy = state.clone();
        drop(state);
        assert_eq!(copy.downcast_ref::<Vec<i32>>(), Some(&vec![1, 2, 3]));
    }

    #[test]
    fn wrong_type_downcast_names_the_requested_type() {
        let state: DynState = Box::new(7u8);
        let err = state.downcast::<String>().unwrap_err();
        assert!(err.to_string().contains("String"));
    }
}
