//! # Interpreter - trampolined step execution
//!
//! The engine behind [`Program`](crate::Program) execution.
//!
//! ## Core principles
//!
//! 1. **Iterative execution**: an explicit cursor over a growable slot
//!    list; the native call stack never grows with program recursion.
//! 2. **Trampolined calls**: a step yielding a call gets the call
//!    target's steps spliced in place, closed by a synthetic merge slot.
//! 3. **Exclusive scopes**: every execution call owns a fresh [`Scope`]
//!    seeded with a copy of the program's steps, so reuses and concurrent
//!    runs of one program never interfere.
//! 4. **Explicit outcomes**: the step function reports
//!    `Produced | Called | Finished` as an enum, never by sentinel value.

pub mod drivers;
mod exec_loop;
mod scope;


pub use drivers::await_timeout;

pub(crate) use drivers::{run_scope, run_scope_async};
pub(crate) use scope::{ErasedCall, MergeFn, Scope, StepOut, Steps};
