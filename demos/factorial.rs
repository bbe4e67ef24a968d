//! Factorial two ways: an explicit recursive call, and the induction
//! combinator. Run with `cargo run --example factorial`.

use std::time::Duration;

use cadence_core::combinators::induction;
use cadence_core::{await_timeout, lift, Call, Program};

/// Recurse while the counter is positive, then surrender the accumulator.
fn fact() -> Program<(i64, i64), i64> {
    Program::new().branch(
        |(n, _): &(i64, i64)| *n > 0,
        lift(|(n, acc): (i64, i64)| (n - 1, acc * n)).call(Call::new(fact)),
        lift(|(_, acc): (i64, i64)| acc),
    )
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let program = lift(|n: i64| (n, 1)).call(Call::new(fact));
    println!("factorial(5) = {}", program.run(5));

    println!("trace of factorial(5):");
    for state in fact().trace((5, 1)) {
        if let Some((n, acc)) = state.downcast_ref::<(i64, i64)>() {
            println!("  ({n}, {acc})");
        } else if let Some(result) = state.downcast_ref::<i64>() {
            println!("  {result}");
        }
    }

    // The same computation, one engine step per 50ms tick.
    let slow = program
        .run_async(
            6,
            || await_timeout(Duration::from_millis(50)),
            |state| {
                if let Some((n, acc)) = state.downcast_ref::<(i64, i64)>() {
                    println!("tick: ({n}, {acc})");
                }
            },
        )
        .await;
    println!("factorial(6) = {slow}");

    // The induction combinator packages the same recursion shape.
    let factorial = induction(
        1i64,
        |n: &i64| *n > 0,
        Program::new(),
        lift(|(n, acc): (i64, i64)| (n - 1, acc * n)),
    );
    println!("induction factorial(7) = {}", factorial.run(7));
}
