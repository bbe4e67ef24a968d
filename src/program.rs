//! Programs - reusable pipeline descriptions
//!
//! A [`Program<T, U>`] is an ordered sequence of state-transforming steps:
//! a declarative description of a computation from `T` to `U`.
//! Constructing one performs no execution; the same program value can be
//! run any number of times, and every run gets its own scope.
//!
//! Programs are immutable value objects. Builder methods consume `self`
//! and return a new program owning its step list, so composition never
//! aliases a program with its former components.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::rc::Rc;

use tracing::debug;

use crate::call::{replace_merge, Call};
use crate::interpreter::{run_scope, run_scope_async, ErasedCall, Scope, StepOut, Steps};
use crate::state::{peek_state, take_state, AnyState, DynState};

/// An ordered, reusable description of a state-transforming pipeline.
pub struct Program<T, U> {
    pub(crate) steps: Steps,
    _marker: PhantomData<fn(T) -> U>,
}

impl<T, U> Clone for Program<T, U> {
    fn clone(&self) -> Self {
        Program {
            steps: self.steps.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, U> fmt::Debug for Program<T, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("steps", &self.steps.len())
            .finish()
    }
}

impl<T> Program<T, T> {
    /// The empty program: the identity on `T`.
    pub fn new() -> Self {
        Program {
            steps: Vec::new(),
            _marker: PhantomData,
        }
    }
}

impl<T> Default for Program<T, T> {
    fn default() -> Self {
        Program::new()
    }
}

impl<T, U> Program<T, U> {
    pub(crate) fn from_steps(steps: Steps) -> Self {
        Program {
            steps,
            _marker: PhantomData,
        }
    }

    /// Append one state-transforming step.
    pub fn then<V>(mut self, f: impl Fn(U) -> V + 'static) -> Program<T, V>
    where
        U: Any,
        V: Any + Clone,
    {
        self.steps
            .push(Rc::new(move |state| StepOut::Next(Box::new(f(take_state::<U>(state))))));
        Program::from_steps(self.steps)
    }

    /// Append a call marker.
    ///
    /// The call's target is produced lazily at run time and its steps are
    /// spliced in place, so a program may call itself (or a program not
    /// yet constructed) through the producer.
    pub fn call<V, W>(mut self, call: Call<U, V, W>) -> Program<T, W> {
        let target = call.erased;
        self.steps.push(Rc::new(move |state| StepOut::Call {
            resume: state,
            target: target.clone(),
        }));
        Program::from_steps(self.steps)
    }

    /// Append a conditional branch. See [`cond`].
    pub fn branch<V>(
        self,
        pred: impl Fn(&U) -> bool + 'static,
        on_true: Program<U, V>,
        on_false: Program<U, V>,
    ) -> Program<T, V>
    where
        U: Any,
        V: Any,
    {
        cond(self, pred, on_true, on_false)
    }

    /// Append a step whose call target is computed from the state.
    ///
    /// The chosen program receives the state unchanged and its result
    /// replaces it (replace merge). [`cond`] is the two-way special
    /// case; `select` is for branch bodies that are computed rather
    /// than fixed.
    pub fn select<V>(mut self, choose: impl Fn(&U) -> Program<U, V> + 'static) -> Program<T, V>
    where
        U: Any,
    {
        self.steps.push(Rc::new(move |state: DynState| {
            let chosen = choose(peek_state::<U>(state.as_ref())).steps;
            StepOut::Call {
                resume: state,
                target: ErasedCall {
                    produce: Rc::new(move || chosen.clone()),
                    merge: replace_merge(),
                },
            }
        }));
        Program::from_steps(self.steps)
    }

    /// Run `prior` first, then this program. Mirrored form of [`compose`].
    pub fn after<V>(self, prior: Program<V, T>) -> Program<V, U> {
        compose(prior, self)
    }

    /// Pair the state just before this program's final step with the
    /// program's full result.
    ///
    /// The final step is removed and replaced by a call whose target is a
    /// clone of the whole program and whose merge is `merge(pre_final,
    /// result)`. The caller asserts the pre-final-step state type `X`;
    /// the steps before the final one are re-run inside the call, so they
    /// should be pure with respect to that state.
    pub fn zip<X, V>(mut self, merge: impl Fn(X, U) -> V + 'static) -> Program<T, V>
    where
        X: Any,
        U: Any,
        V: Any + Clone,
    {
        let full = self.steps.clone();
        self.steps.pop();
        let target = ErasedCall {
            produce: Rc::new(move || full.clone()),
            merge: Rc::new(move |outer, inner| {
                Box::new(merge(take_state::<X>(outer), take_state::<U>(inner)))
            }),
        };
        self.steps.push(Rc::new(move |state| StepOut::Call {
            resume: state,
            target: target.clone(),
        }));
        Program::from_steps(self.steps)
    }
}

/* ===================== Execution entry points ===================== */

impl<T, U> Program<T, U>
where
    T: Any + Clone,
    U: Any,
{
    /// Run the program to completion and return the final state.
    ///
    /// Never returns if the step sequence is infinite; bounding execution
    /// is the caller's responsibility.
    pub fn run(&self, input: T) -> U {
        self.run_with(input, |_| {})
    }

    /// Run the program, invoking `effect` with the current state before
    /// every step (including the finishing one).
    ///
    /// The hook observes; it never steers.
    pub fn run_with(&self, input: T, effect: impl FnMut(&dyn AnyState)) -> U {
        debug!(steps = self.steps.len(), "starting run");
        let scope = Scope::new(self.steps.clone(), Box::new(input));
        take_state::<U>(run_scope(scope, effect))
    }

    /// Run the program and record every observed state, initial and final
    /// values included.
    ///
    /// The recording is a plain finite sequence; adjacent duplicates
    /// (produced by call-expansion steps, which leave the state unchanged)
    /// are not suppressed.
    pub fn trace(&self, input: T) -> Vec<DynState> {
        let mut states = Vec::new();
        let scope = Scope::new(self.steps.clone(), Box::new(input));
        let _ = run_scope(scope, |state| states.push(state.clone_boxed()));
        states
    }

    /// Run the program cooperatively, awaiting `suspend` before every
    /// step.
    ///
    /// Yields control to the host scheduler once per step; the intended
    /// use is interleaving execution with timers or other asynchronous
    /// events, not parallelism. With an immediately-ready suspension
    /// source this is equivalent to [`Program::run_with`].
    pub async fn run_async<Fut>(
        &self,
        input: T,
        suspend: impl FnMut() -> Fut,
        effect: impl FnMut(&dyn AnyState),
    ) -> U
    where
        Fut: Future<Output = ()>,
    {
        debug!(steps = self.steps.len(), "starting async run");
        let scope = Scope::new(self.steps.clone(), Box::new(input));
        take_state::<U>(run_scope_async(scope, suspend, effect).await)
    }
}

/* ===================== Free constructors ===================== */

/// A one-step program.
pub fn lift<T, U>(f: impl Fn(T) -> U + 'static) -> Program<T, U>
where
    T: Any,
    U: Any + Clone,
{
    Program::new().then(f)
}

/// A program consisting of a single call to a lazily-produced program.
///
/// The producer runs at execution time, so `defer` is how a recursive
/// program refers to itself by name.
pub fn defer<T, U>(producer: impl Fn() -> Program<T, U> + 'static) -> Program<T, U> {
    Program::new().call(Call::new(producer))
}

/// Conditional branching.
///
/// Builds a program running all of `prior`, then one synthetic step that
/// evaluates `pred` over `prior`'s result and yields a call targeting
/// `on_true` or `on_false` (replace merge). Branch bodies expand lazily
/// at run time, which is what permits mutually-recursive branch
/// definitions.
pub fn cond<A, B, C>(
    prior: Program<A, B>,
    pred: impl Fn(&B) -> bool + 'static,
    on_true: Program<B, C>,
    on_false: Program<B, C>,
) -> Program<A, C>
where
    B: Any,
    C: Any,
{
    prior.select(move |b| {
        if pred(b) {
            on_true.clone()
        } else {
            on_false.clone()
        }
    })
}

/// Sequential composition: all of `f`'s steps, then all of `g`'s.
///
/// Both inputs are consumed; the result owns its own step list.
pub fn compose<A, B, C>(f: Program<A, B>, g: Program<B, C>) -> Program<A, C> {
    let mut steps = f.steps;
    steps.extend(g.steps);
    Program::from_steps(steps)
}
