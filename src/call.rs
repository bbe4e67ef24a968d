//! Call markers
//!
//! A [`Call`] is a deferred reference to another program plus a merge
//! function. Appended to a program (via [`Program::call`](crate::Program::call))
//! it occupies one step slot; the engine resolves it by splicing the
//! produced program's steps in place, which is what makes recursion
//! stack-safe and lets mutually-recursive programs reference each other
//! lazily.

use std::any::Any;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::interpreter::{ErasedCall, MergeFn, Steps};
use crate::program::Program;
use crate::state::take_state;

/// A deferred call to a program produced on demand.
///
/// `T` is the sub-program's input (the pre-call state), `U` its result,
/// and `B` the state the merge function leaves behind for the enclosing
/// program.
pub struct Call<T, U, B> {
    pub(crate) erased: ErasedCall,
    _marker: PhantomData<fn(T, U) -> B>,
}

impl<T, U, B> Clone for Call<T, U, B> {
    fn clone(&self) -> Self {
        Call {
            erased: self.erased.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, U> Call<T, U, U> {
    /// A call whose result replaces the enclosing state (the default
    /// merge).
    pub fn new(producer: impl Fn() -> Program<T, U> + 'static) -> Self {
        Call {
            erased: ErasedCall {
                produce: erase_producer(producer),
                merge: replace_merge(),
            },
            _marker: PhantomData,
        }
    }
}

impl<T, U, B> Call<T, U, B>
where
    T: Any,
    U: Any,
    B: Any + Clone,
{
    /// A call whose result is combined with the pre-call state.
    ///
    /// The merge receives the state as of just before the call and the
    /// sub-program's result. This is what lets a sub-computation run for
    /// side effects only, or contribute one part of a composite state
    /// while the rest is untouched.
    pub fn with_merge(
        producer: impl Fn() -> Program<T, U> + 'static,
        merge: impl Fn(T, U) -> B + 'static,
    ) -> Self {
        Call {
            erased: ErasedCall {
                produce: erase_producer(producer),
                merge: Rc::new(move |outer, inner| {
                    Box::new(merge(take_state::<T>(outer), take_state::<U>(inner)))
                }),
            },
            _marker: PhantomData,
        }
    }
}

/// A call that runs a sub-program purely for its side effects.
///
/// The outer state is projected down to the sub-program's input, the
/// sub-program runs against the projection, its result is discarded, and
/// the outer state continues exactly as it was before the call.
pub fn call_with<T, S, U>(
    project: impl Fn(T) -> S + 'static,
    producer: impl Fn() -> Program<S, U> + 'static,
) -> Call<T, U, T>
where
    T: Any + Clone,
    S: Any + Clone,
    U: Any + Clone,
{
    let projected: Program<T, U> = Program::new().then(project).call(Call::new(producer));
    Call::with_merge(move || projected.clone(), |outer: T, _result: U| outer)
}

pub(crate) fn replace_merge() -> Rc<MergeFn> {
    Rc::new(|_outer, inner| inner)
}

fn erase_producer<T, U>(producer: impl Fn() -> Program<T, U> + 'static) -> Rc<dyn Fn() -> Steps> {
    Rc::new(move || producer().steps)
}
