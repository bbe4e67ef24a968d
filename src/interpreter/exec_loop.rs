//! Core execution loop
//!
//! This module contains the step() function - the heart of the
//! interpreter. It advances the scope's cursor by one slot, executing the
//! slot or, when the slot yields a call, splicing the call target's steps
//! into the slot list in place (the trampoline).

use std::rc::Rc;

use tracing::trace;

use super::scope::{ErasedCall, Scope, ScopeSlot, StepOut};
use crate::state::DynState;

/* ===================== Step Outcome ===================== */

/// Result of executing one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StepOutcome {
    /// A slot ran and produced the next state.
    Produced,
    /// A call was expanded into the slot list; the state is unchanged and
    /// now belongs to the spliced sub-program's first slot.
    Called,
    /// The cursor ran past the end of the slot list.
    Finished,
}

/* ===================== Step Function ===================== */

/// Execute one step of the scope.
///
/// 1. Advance the cursor.
/// 2. Past the end of the (possibly already-spliced) list: [`StepOutcome::Finished`].
/// 3. A slot yielding a call: expand it via [`expand_call`] and report
///    [`StepOutcome::Called`].
/// 4. Otherwise apply the slot to the current state.
pub(crate) fn step(scope: &mut Scope) -> StepOutcome {
    let idx = scope.cursor;
    scope.cursor += 1;

    // Decide what the slot wants before touching the state, so the slot
    // list borrow ends first.
    enum Action {
        Run(Rc<super::scope::StepFn>),
        Merge(Rc<super::scope::MergeFn>, DynState),
    }

    let action = match scope.slots.get_mut(idx) {
        None => return StepOutcome::Finished,
        Some(ScopeSlot::Step(f)) => Action::Run(Rc::clone(f)),
        Some(ScopeSlot::Merge { merge, hold }) => {
            let hold = match hold.take() {
                Some(hold) => hold,
                // Cursors only move forward, so a slot never runs twice.
                None => panic!("merge slot executed twice"),
            };
            Action::Merge(Rc::clone(merge), hold)
        }
    };

    match action {
        Action::Merge(merge, hold) => {
            let state = scope.take_current();
            scope.state = Some(merge(hold, state));
            StepOutcome::Produced
        }
        Action::Run(f) => match f(scope.take_current()) {
            StepOut::Next(next) => {
                scope.state = Some(next);
                StepOutcome::Produced
            }
            StepOut::Call { resume, target } => {
                expand_call(scope, idx, resume, target);
                StepOutcome::Called
            }
        },
    }
}

/// Splice a call target into the scope.
///
/// The target's steps are inserted immediately after the call site,
/// followed by one synthetic merge slot holding a clone of the pre-call
/// state. Slots already queued after the call site therefore run only
/// once the sub-program and its merge complete. The pre-call state itself
/// flows unchanged into the first spliced slot.
fn expand_call(scope: &mut Scope, at: usize, resume: DynState, target: ErasedCall) {
    let hold = resume.clone();
    let spliced = (target.produce)();
    trace!(at, steps = spliced.len(), "expanding call target into scope");

    let mut insert: Vec<ScopeSlot> = spliced.into_iter().map(ScopeSlot::Step).collect();
    insert.push(ScopeSlot::Merge {
        merge: target.merge,
        hold: Some(hold),
    });
    scope.slots.splice(at + 1..at + 1, insert);

    scope.state = Some(resume);
}
