//! Reusable program shapes
//!
//! Everything here is built from [`Program`], [`cond`], composition and
//! [`Call`] alone - these combinators add no engine capability, only
//! shapes: a generic shrink/accumulate traversal, the list operations
//! built on it, and the recurse-while-discriminant induction pattern.

use std::any::Any;
use std::rc::Rc;

use crate::call::Call;
use crate::program::{compose, cond, defer, lift, Program};

/* ===================== Traversal ===================== */

/// Loop state and callbacks for [`traverse`], shared into the lazily
/// produced recursion steps.
struct Traverse<U, A, V> {
    shrink: Rc<dyn Fn(U) -> (U, A)>,
    expand: Rc<dyn Fn(V, A) -> V>,
    has_more: Rc<dyn Fn(&U) -> bool>,
}

impl<U, A, V> Clone for Traverse<U, A, V> {
    fn clone(&self) -> Self {
        Traverse {
            shrink: Rc::clone(&self.shrink),
            expand: Rc::clone(&self.expand),
            has_more: Rc::clone(&self.has_more),
        }
    }
}

impl<U, A, V> Traverse<U, A, V>
where
    U: Any + Clone,
    A: 'static,
    V: Any + Clone,
{
    /// One loop iteration: shrink the source by one element, fold that
    /// element into the accumulator.
    fn step_program(&self) -> Program<(U, V), (U, V)> {
        let this = self.clone();
        lift(move |(source, acc): (U, V)| {
            let (rest, item) = (this.shrink)(source);
            let acc = (this.expand)(acc, item);
            (rest, acc)
        })
    }

    /// Step, then either recurse or surrender the accumulator.
    fn loop_program(&self) -> Program<(U, V), V> {
        let this = self.clone();
        let has_more = Rc::clone(&self.has_more);
        cond(
            self.step_program(),
            move |(source, _): &(U, V)| has_more(source),
            defer(move || this.loop_program()),
            lift(|(_, acc): (U, V)| acc),
        )
    }

    /// Pair the source with the empty accumulator and enter the loop.
    /// An already-exhausted source skips the loop entirely.
    fn program(&self, empty: V) -> Program<U, V> {
        let has_more = Rc::clone(&self.has_more);
        lift(move |source: U| (source, empty.clone())).branch(
            move |(source, _): &(U, V)| has_more(source),
            self.loop_program(),
            lift(|(_, acc): (U, V)| acc),
        )
    }
}

/// Generic traversal: repeatedly `shrink` the source by one element and
/// `expand` the accumulator with it, while `has_more` holds on what
/// remains; the accumulator starts at `empty`.
///
/// `shrink` is only ever applied to a source for which `has_more` just
/// returned true.
pub fn traverse<U, A, V>(
    shrink: impl Fn(U) -> (U, A) + 'static,
    expand: impl Fn(V, A) -> V + 'static,
    has_more: impl Fn(&U) -> bool + 'static,
    empty: V,
) -> Program<U, V>
where
    U: Any + Clone,
    A: 'static,
    V: Any + Clone,
{
    Traverse {
        shrink: Rc::new(shrink),
        expand: Rc::new(expand),
        has_more: Rc::new(has_more),
    }
    .program(empty)
}

/* ===================== List shapes ===================== */

/// Reverse a vector.
pub fn reverse<X: Any + Clone>() -> Program<Vec<X>, Vec<X>> {
    traverse(
        front_pop,
        |mut acc: Vec<X>, item| {
            acc.insert(0, item);
            acc
        },
        |source: &Vec<X>| !source.is_empty(),
        Vec::new(),
    )
}

/// Apply `f` to every element, preserving order.
pub fn map<X, Y>(f: impl Fn(X) -> Y + 'static) -> Program<Vec<X>, Vec<Y>>
where
    X: Any + Clone,
    Y: Any + Clone,
{
    traverse(
        front_pop,
        move |mut acc: Vec<Y>, item| {
            acc.push(f(item));
            acc
        },
        |source: &Vec<X>| !source.is_empty(),
        Vec::new(),
    )
}

/// Left fold over a vector.
pub fn fold<X, Acc>(f: impl Fn(Acc, X) -> Acc + 'static, zero: Acc) -> Program<Vec<X>, Acc>
where
    X: Any + Clone,
    Acc: Any + Clone,
{
    traverse(
        front_pop,
        f,
        |source: &Vec<X>| !source.is_empty(),
        zero,
    )
}

/// [`fold`] specialized to a single element type.
pub fn mconcat<X>(f: impl Fn(X, X) -> X + 'static, zero: X) -> Program<Vec<X>, X>
where
    X: Any + Clone,
{
    fold(f, zero)
}

/// Run `action` over every element for its effect alone, yielding
/// nothing.
pub fn over<X>(action: impl Fn(X) + 'static) -> Program<Vec<X>, ()>
where
    X: Any + Clone,
{
    traverse(
        front_pop,
        move |_: (), item| action(item),
        |source: &Vec<X>| !source.is_empty(),
        (),
    )
}

fn front_pop<X>(mut source: Vec<X>) -> (Vec<X>, X) {
    let item = source.remove(0);
    (source, item)
}

/* ===================== Induction ===================== */

struct Induction<T, Acc> {
    discriminant: Rc<dyn Fn(&T) -> bool>,
    base: Program<(T, Acc), (T, Acc)>,
    recursive: Program<(T, Acc), (T, Acc)>,
}

impl<T, Acc> Clone for Induction<T, Acc> {
    fn clone(&self) -> Self {
        Induction {
            discriminant: Rc::clone(&self.discriminant),
            base: self.base.clone(),
            recursive: self.recursive.clone(),
        }
    }
}

impl<T, Acc> Induction<T, Acc>
where
    T: Any + Clone,
    Acc: Any + Clone,
{
    /// While the discriminant holds, apply the recursive case and call
    /// back in; otherwise take the base case.
    fn induce(&self) -> Program<(T, Acc), (T, Acc)> {
        let this = self.clone();
        let discriminant = Rc::clone(&self.discriminant);
        Program::new().branch(
            move |(t, _): &(T, Acc)| discriminant(t),
            compose(self.recursive.clone(), defer(move || this.induce())),
            self.base.clone(),
        )
    }
}

/// The induction pattern: pair the input with `initial`, recurse through
/// `recursive` while `discriminant` holds on the first component, finish
/// through `base`, and yield the accumulator.
///
/// The discriminant is checked before the recursive case is first
/// applied, so an input it rejects outright flows through `base`
/// untouched (`induction` factorial of 0 is 1, not 0).
pub fn induction<T, Acc>(
    initial: Acc,
    discriminant: impl Fn(&T) -> bool + 'static,
    base: Program<(T, Acc), (T, Acc)>,
    recursive: Program<(T, Acc), (T, Acc)>,
) -> Program<T, Acc>
where
    T: Any + Clone,
    Acc: Any + Clone,
{
    let pattern = Induction {
        discriminant: Rc::new(discriminant),
        base,
        recursive,
    };
    lift(move |t: T| (t, initial.clone()))
        .call(Call::new(move || pattern.induce()))
        .then(|(_, acc): (T, Acc)| acc)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn reverse_list() {
        let program = reverse::<i32>();
        assert_eq!(program.run(vec![1, 2, 3]), vec![3, 2, 1]);
        assert_eq!(program.run(Vec::new()), Vec::<i32>::new());
    }

    #[test]
    fn map_preserves_order() {
        let doubled = map(|x: i32| x * 2);
        assert_eq!(doubled.run(vec![1, 2, 3]), vec![2, 4, 6]);
        assert_eq!(doubled.run(Vec::new()), Vec::<i32>::new());
    }

    #[test]
    fn fold_sums() {
        let sum = fold(|acc: i32, x: i32| acc + x, 0);
        assert_eq!(sum.run(vec![1, 2, 3, 5]), 11);
        assert_eq!(sum.run(Vec::new()), 0);
    }

    #[test]
    fn mconcat_strings() {
        let joined = mconcat(|a: String, b: String| a + &b, String::new());
        let words = vec!["ca".to_string(), "den".to_string(), "ce".to_string()];
        assert_eq!(joined.run(words), "cadence");
    }

    #[test]
    fn fold_composes_with_other_programs() {
        let sum = mconcat(|a: i64, b: i64| a + b, 0).after(map(|x: i64| x * 10));
        assert_eq!(sum.run(vec![1, 2, 3]), 60);
    }

    #[test]
    fn over_runs_the_action_per_element_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let program = over(move |x: i32| sink.borrow_mut().push(x));
        program.run(vec![1, 2, 3]);
        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
        // An empty source never invokes the action.
        program.run(Vec::new());
        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn induction_factorial() {
        let factorial = induction(
            1i64,
            |n: &i64| *n > 0,
            Program::new(),
            lift(|(n, acc): (i64, i64)| (n - 1, acc * n)),
        );
        assert_eq!(factorial.run(0), 1);
        assert_eq!(factorial.run(1), 1);
        assert_eq!(factorial.run(5), 120);
        assert_eq!(factorial.run(6), 720);
    }

    #[test]
    fn traverse_counts_down() {
        // A non-list source: count down from n, collecting the values seen.
        let countdown = traverse(
            |n: i64| (n - 1, n),
            |mut seen: Vec<i64>, n| {
                seen.push(n);
                seen
            },
            |n: &i64| *n > 0,
            Vec::new(),
        );
        assert_eq!(countdown.run(3), vec![3, 2, 1]);
        assert_eq!(countdown.run(0), Vec::<i64>::new());
    }
}
