//! # cadence-core
//!
//! A small interpreter for composable, state-transforming programs.
//!
//! A [`Program<T, U>`] is an ordered list of steps describing a
//! computation from `T` to `U`; building one executes nothing. Programs
//! compose sequentially ([`compose`], [`Program::after`]), branch
//! ([`cond`], [`Program::branch`]), embed sub-computations through
//! [`Call`] markers with state-merging semantics ([`Call::with_merge`],
//! [`call_with`]), and pair intermediate with final states
//! ([`Program::zip`]). Execution is trampolined: calls splice their
//! target's steps into the running scope's list instead of recursing
//! natively, so deeply recursive programs never grow the call stack.
//!
//! Three entry points drive a program: [`Program::run`] (synchronous),
//! [`Program::trace`] (synchronous, recording every observed state), and
//! [`Program::run_async`] (cooperative, awaiting a caller-supplied
//! suspension source before every step).
//!
//! ```
//! use cadence_core::{lift, Call, Program};
//!
//! // Recursive factorial over a (counter, accumulator) pair.
//! fn fact() -> Program<(i64, i64), i64> {
//!     Program::new().branch(
//!         |(n, _): &(i64, i64)| *n > 0,
//!         lift(|(n, acc): (i64, i64)| (n - 1, acc * n)).call(Call::new(fact)),
//!         lift(|(_, acc): (i64, i64)| acc),
//!     )
//! }
//!
//! let program = lift(|n: i64| (n, 1)).call(Call::new(fact));
//! assert_eq!(program.run(5), 120);
//! ```

pub mod call;
pub mod combinators;
pub mod interpreter;
pub mod program;
pub mod state;

// Re-export the construction and execution surface
pub use call::{call_with, Call};
pub use interpreter::await_timeout;
pub use program::{compose, cond, defer, lift, Program};
pub use state::{AnyState, DynState, StateError};
