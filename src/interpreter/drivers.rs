//! Synchronous and asynchronous drivers
//!
//! Both drivers wrap the same step function. The synchronous driver loops
//! to completion; the asynchronous driver awaits a caller-supplied
//! suspension source before every step, yielding control to the host
//! scheduler once per step. Neither detects non-termination - a step list
//! that never finishes is a caller error.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use super::exec_loop::{step, StepOutcome};
use super::scope::Scope;
use crate::state::{AnyState, DynState};

/// Run a scope to completion.
///
/// The effect hook fires with the current state before every step,
/// including the finishing one, so the final state is always observed.
/// The hook is observational only; it cannot influence control flow.
pub(crate) fn run_scope(mut scope: Scope, mut effect: impl FnMut(&dyn AnyState)) -> DynState {
    let mut steps = 0u64;
    loop {
        effect(scope.state_ref());
        match step(&mut scope) {
            StepOutcome::Finished => {
                debug!(steps, "run finished");
                return scope.into_state();
            }
            StepOutcome::Produced | StepOutcome::Called => steps += 1,
        }
    }
}

/// Run a scope cooperatively, awaiting `suspend` before every step.
///
/// Scheduling is single-threaded: the only suspension point is the await
/// of the caller-supplied future, and between awaits the scope is owned
/// exclusively by this call. There is no cancellation; execution stops
/// only when the slot list finishes.
pub(crate) async fn run_scope_async<Fut>(
    mut scope: Scope,
    mut suspend: impl FnMut() -> Fut,
    mut effect: impl FnMut(&dyn AnyState),
) -> DynState
where
    Fut: Future<Output = ()>,
{
    let mut steps = 0u64;
    loop {
        suspend().await;
        effect(scope.state_ref());
        match step(&mut scope) {
            StepOutcome::Finished => {
                debug!(steps, "async run finished");
                return scope.into_state();
            }
            StepOutcome::Produced | StepOutcome::Called => steps += 1,
        }
    }
}

/// Stock suspension source: a timer delay per step.
///
/// Pass `|| await_timeout(delay)` to [`Program::run_async`](crate::Program::run_async)
/// to interleave execution with real time.
pub async fn await_timeout(delay: Duration) {
    tokio::time::sleep(delay).await;
}
