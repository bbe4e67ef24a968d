//! Per-execution scope
//!
//! A [`Scope`] is the ephemeral record one execution call owns: a cursor
//! into the currently-expanded slot list, the slot list itself (seeded
//! with a copy of the program's steps, grown in place as calls are
//! expanded), and the current state value. Nothing outside the execution
//! call that created it ever sees a scope.

use std::rc::Rc;

use crate::state::{AnyState, DynState};

/* ===================== Step primitives ===================== */

/// What a single step yields: either the next state, or a call to expand.
///
/// Every step returns this sum explicitly; there is no structural tagging
/// of "call-shaped" values.
pub(crate) enum StepOut {
    /// The step transformed the state.
    Next(DynState),
    /// The step yielded a call. `resume` is the step's input state,
    /// handed back untouched: it becomes the spliced sub-program's entry
    /// state, and a clone of it is held for the merge slot.
    Call { resume: DynState, target: ErasedCall },
}

/// A step as stored in a program: shared, reusable, type-erased.
pub(crate) type StepFn = dyn Fn(DynState) -> StepOut;

/// A program's step list. `Rc` per slot makes copying the list into a
/// scope (and cloning programs during composition) cheap.
pub(crate) type Steps = Vec<Rc<StepFn>>;

/// Merge function combining the held pre-call state with a sub-program's
/// result.
pub(crate) type MergeFn = dyn Fn(DynState, DynState) -> DynState;

/// A call marker with its types erased: a lazy producer of the target
/// program's steps plus the merge to apply when the target finishes.
#[derive(Clone)]
pub(crate) struct ErasedCall {
    pub(crate) produce: Rc<dyn Fn() -> Steps>,
    pub(crate) merge: Rc<MergeFn>,
}

/* ===================== Scope slots ===================== */

/// One slot in a scope's expanded list.
pub(crate) enum ScopeSlot {
    /// An ordinary step, shared with the program that contributed it.
    Step(Rc<StepFn>),
    /// The synthetic closing slot of an expanded call. Holds the pre-call
    /// state until the slot runs; each merge slot runs exactly once.
    Merge {
        merge: Rc<MergeFn>,
        hold: Option<DynState>,
    },
}

/* ===================== Scope ===================== */

/// The mutable record driving one execution.
pub(crate) struct Scope {
    /// Index of the next slot to execute.
    pub(crate) cursor: usize,
    /// The expanded slot list. Starts as a copy of the program's steps;
    /// call expansion splices into it.
    pub(crate) slots: Vec<ScopeSlot>,
    /// The current state. Always present between steps; taken and
    /// replaced within a step.
    pub(crate) state: Option<DynState>,
}

impl Scope {
    /// Seed a scope with a copy of a program's step list and the initial
    /// state.
    pub(crate) fn new(steps: Steps, input: DynState) -> Self {
        Scope {
            cursor: 0,
            slots: steps.into_iter().map(ScopeSlot::Step).collect(),
            state: Some(input),
        }
    }

    /// Borrow the current state, for the effect hook.
    pub(crate) fn state_ref(&self) -> &dyn AnyState {
        match &self.state {
            Some(state) => state.as_ref(),
            None => panic!("scope state vacated outside a step"),
        }
    }

    /// Take the current state for the duration of one step.
    pub(crate) fn take_current(&mut self) -> DynState {
        match self.state.take() {
            Some(state) => state,
            None => panic!("scope state vacated outside a step"),
        }
    }

    /// Surrender the final state when execution finishes.
    pub(crate) fn into_state(self) -> DynState {
        match self.state {
            Some(state) => state,
            None => panic!("scope state vacated outside a step"),
        }
    }
}
