//! Integration tests for the program surface
//!
//! Exercises construction, branching, composition, call merges, zip, and
//! the three execution entry points, mostly over small numeric programs.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use maplit::hashmap;

use cadence_core::combinators::{fold, reverse};
use cadence_core::{await_timeout, call_with, compose, lift, Call, DynState, Program, StateError};

/* ===================== Helpers ===================== */

/// Call-based factorial over a `(counter, accumulator)` pair.
///
/// The discriminant is checked before the recursive step, so `(0, 1)`
/// flows straight to the accumulator.
fn fact() -> Program<(i64, i64), i64> {
    Program::new().branch(
        |(n, _): &(i64, i64)| *n > 0,
        lift(|(n, acc): (i64, i64)| (n - 1, acc * n)).call(Call::new(fact)),
        lift(|(_, acc): (i64, i64)| acc),
    )
}

fn factorial(n: i64) -> i64 {
    fact().run((n, 1))
}

/// What a factorial trace observes: pair states while recursing, the
/// bare accumulator once the base case runs.
#[derive(Debug, Clone, PartialEq)]
enum Observed {
    Pair(i64, i64),
    Value(i64),
}

/// Project a recorded trace into [`Observed`] values, collapsing
/// adjacent duplicates (call expansion and replace merges observe the
/// same state more than once).
fn collapse(trace: &[DynState]) -> Vec<Observed> {
    let mut collapsed: Vec<Observed> = Vec::new();
    for state in trace {
        let observed = if let Some(pair) = state.downcast_ref::<(i64, i64)>() {
            Observed::Pair(pair.0, pair.1)
        } else if let Some(value) = state.downcast_ref::<i64>() {
            Observed::Value(*value)
        } else {
            panic!("unexpected state type in factorial trace");
        };
        if collapsed.last() != Some(&observed) {
            collapsed.push(observed);
        }
    }
    collapsed
}

/* ===================== Identity ===================== */

#[test]
fn id_number() {
    assert_eq!(lift(|x: i64| x).run(3), 3);
}

#[test]
fn id_string() {
    assert_eq!(lift(|x: String| x).run("s".to_string()), "s");
}

#[test]
fn id_vec() {
    assert_eq!(lift(|x: Vec<i64>| x).run(vec![1, 2, 3]), vec![1, 2, 3]);
}

#[test]
fn id_map() {
    let map = hashmap! { "a".to_string() => 1, "b".to_string() => 2 };
    assert_eq!(lift(|x| x).run(map.clone()), map);
}

#[test]
fn id_function() {
    fn succ(a: i64) -> i64 {
        a + 1
    }
    let f: fn(i64) -> i64 = succ;
    assert_eq!(lift(|x: fn(i64) -> i64| x).run(f), f);
}

#[test]
fn id_function_applied() {
    let apply = lift(|f: fn(i64) -> i64| f(3));
    assert_eq!(apply.run(|a| a + 1), 4);
}

#[test]
fn empty_program_is_identity() {
    let program: Program<&'static str, &'static str> = Program::new();
    assert_eq!(program.run("unchanged"), "unchanged");
}

/* ===================== Calls ===================== */

#[test]
fn direct_and_called_steps_agree() {
    let direct = lift(|n: i64| n + 1).then(|n| n * 5);
    let indirect = lift(|n: i64| n + 1).call(Call::new(|| lift(|n: i64| n * 5)));
    assert_eq!(direct.run(3), indirect.run(3));
}

#[test]
fn call_with_merge_pairs_states() {
    let with_three = lift(|n: i64| n).call(Call::with_merge(
        || lift(|_: i64| 3i64),
        |outer: i64, inner: i64| (outer, inner),
    ));
    assert_eq!(with_three.run(1), (1, 3));
}

#[derive(Debug, Clone, PartialEq)]
struct Bundle {
    a: i64,
    defs: Vec<i64>,
}

#[test]
fn call_with_merge_updates_one_field() {
    let reverse_defs = reverse::<i64>().after(lift(|b: Bundle| b.defs));
    let program = lift(|_: i64| Bundle {
        a: 1,
        defs: vec![1, 2, 3],
    })
    .call(Call::with_merge(
        move || reverse_defs.clone(),
        |bundle: Bundle, defs: Vec<i64>| Bundle { defs, ..bundle },
    ));
    assert_eq!(
        program.run(1),
        Bundle {
            a: 1,
            defs: vec![3, 2, 1],
        }
    );
}

#[test]
fn call_with_runs_for_effect_only() {
    let seen = Rc::new(Cell::new(0i64));
    let inner_seen = Rc::clone(&seen);

    let program = Program::new().call(call_with(
        |n: i64| n,
        move || {
            let seen = Rc::clone(&inner_seen);
            lift(move |x: i64| {
                seen.set(98 + x);
                55i64
            })
        },
    ));

    assert_eq!(program.run(1), 1, "outer state must be preserved");
    assert_eq!(seen.get(), 99, "sub-program must still have run");
}

/* ===================== Factorial ===================== */

#[test]
fn factorial_values() {
    assert_eq!(factorial(0), 1);
    assert_eq!(factorial(1), 1);
    assert_eq!(factorial(2), 2);
    assert_eq!(factorial(3), 6);
    assert_eq!(factorial(4), 24);
    assert_eq!(factorial(5), 120);
    assert_eq!(factorial(6), 720);
}

#[test]
fn factorial_trace() {
    let trace = fact().trace((5, 1));
    assert_eq!(
        collapse(&trace),
        vec![
            Observed::Pair(5, 1),
            Observed::Pair(4, 5),
            Observed::Pair(3, 20),
            Observed::Pair(2, 60),
            Observed::Pair(1, 120),
            Observed::Pair(0, 120),
            Observed::Value(120),
        ]
    );
}

#[test]
fn traced_states_downcast_by_type() {
    let mut trace = fact().trace((3, 1));
    let last = trace.pop().unwrap();
    match last.downcast::<String>() {
        Err(StateError::Mismatch { expected }) => {
            assert!(expected.contains("String"), "unexpected: {expected}")
        }
        Ok(_) => panic!("final factorial state is not a string"),
    }
    // The trailing merge observations downcast fine at their actual type.
    let last = trace.pop().unwrap();
    assert_eq!(last.downcast::<i64>().ok(), Some(6));
}

/* ===================== Async driver ===================== */

#[tokio::test]
async fn factorial_async() -> Result<()> {
    let result = fact()
        .run_async(
            (5, 1),
            || await_timeout(Duration::from_millis(1)),
            |_| {},
        )
        .await;
    assert_eq!(result, 120);
    Ok(())
}

#[tokio::test]
async fn factorial_trace_async() -> Result<()> {
    let mut trace: Vec<DynState> = Vec::new();
    let result = fact()
        .run_async(
            (5, 1),
            || await_timeout(Duration::from_millis(1)),
            |state| trace.push(state.clone_boxed()),
        )
        .await;
    assert_eq!(result, 120);
    assert_eq!(
        collapse(&trace),
        vec![
            Observed::Pair(5, 1),
            Observed::Pair(4, 5),
            Observed::Pair(3, 20),
            Observed::Pair(2, 60),
            Observed::Pair(1, 120),
            Observed::Pair(0, 120),
            Observed::Value(120),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn async_matches_sync_when_suspension_is_ready() {
    let sync_result = fact().run((7, 1));
    let async_result = fact()
        .run_async((7, 1), || std::future::ready(()), |_| {})
        .await;
    assert_eq!(sync_result, async_result);
}

/* ===================== Mutual recursion ===================== */

fn up() -> Program<i64, i64> {
    lift(|n: i64| n + 1).branch(|n: &i64| *n > 0, down(), lift(|n: i64| n))
}

fn down() -> Program<i64, i64> {
    lift(|n: i64| n - 3).call(Call::new(up))
}

#[test]
fn mutual_recursion_terminates() {
    for i in 2..10 {
        assert_eq!(up().run(i), -1 + (i % 2), "up({i})");
    }
}

#[test]
fn is_even_via_after() {
    let is_even = lift(|n: i64| n < 0).after(up());
    for i in 1..10 {
        assert_eq!(is_even.run(i), i % 2 == 0, "is_even({i})");
    }
}

#[test]
fn is_even_via_compose() {
    let is_even = compose(up(), lift(|n: i64| n < 0));
    for i in 1..10 {
        assert_eq!(is_even.run(i), i % 2 == 0, "is_even({i})");
    }
}

#[test]
fn deep_recursion_stays_on_the_heap() {
    // 100_000 rounds of the up/down cycle would overflow a native stack;
    // the trampoline keeps it iterative.
    assert_eq!(up().run(100_000), -1);
}

#[test]
fn select_computes_the_branch_body() {
    // Three-way dispatch on sign; each body is picked at run time.
    let describe = lift(|n: i64| n).select(|n: &i64| {
        if *n < 0 {
            lift(|n: i64| -n).then(|n| format!("minus {n}"))
        } else if *n == 0 {
            lift(|_: i64| "zero".to_string())
        } else {
            lift(|n: i64| format!("plus {n}"))
        }
    });
    assert_eq!(describe.run(-4), "minus 4");
    assert_eq!(describe.run(0), "zero");
    assert_eq!(describe.run(9), "plus 9");
}

/* ===================== Composition ===================== */

#[test]
fn compose_is_associative() {
    let f = || lift(|n: i64| n + 1);
    let g = || lift(|n: i64| n * 5);
    let h = || lift(|n: i64| n - 2);

    let left = compose(compose(f(), g()), h());
    let right = compose(f(), compose(g(), h()));
    for input in [-3, 0, 7, 1000] {
        assert_eq!(left.run(input), right.run(input));
    }
}

/* ===================== Zip ===================== */

#[test]
fn zip_pairs_pre_final_state_with_result() {
    let paired = lift(|n: i64| n + 1).zip(|before: i64, result: i64| (before, result));
    assert_eq!(paired.run(1), (1, 2));
}

type Apply = Rc<dyn Fn(i64) -> i64>;

#[test]
fn zip_applies_a_derived_function_list() {
    let mults: Vec<Apply> = (1..=3)
        .map(|k| Rc::new(move |x: i64| k * x) as Apply)
        .collect();

    let applied = lift(|x: i64| x)
        .then(move |_: i64| mults.clone())
        .zip(|x: i64, fs: Vec<Apply>| fs.iter().map(|f| f(x)).collect::<Vec<i64>>());
    let summed = fold(|a: i64, b: i64| a + b, 0).after(applied);

    assert_eq!(summed.run(2), 12);
}
