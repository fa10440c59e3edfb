//! The staged solver against an exhaustive backend on one-byte objects.

use std::cell::Cell;

use fastcex::eval::Assignment;
use fastcex::expr::ExprManager;
use fastcex::reference::ExprRef;
use fastcex::solver::{FastCexSolver, Model, Query, Solver, StagedSolver};
use fastcex::types::ArrayId;

/// Complete solver for a single one-byte object, by enumeration.
struct Exhaustive<'a> {
    em: &'a ExprManager,
    x: ArrayId,
    calls: Cell<usize>,
}

impl<'a> Exhaustive<'a> {
    fn new(em: &'a ExprManager, x: ArrayId) -> Self {
        Self {
            em,
            x,
            calls: Cell::new(0),
        }
    }

    fn models<'q>(&'q self, constraints: &'q [ExprRef]) -> impl Iterator<Item = Assignment> + 'q {
        (0..=255u8)
            .map(move |v| Assignment::from_values(&[self.x], vec![vec![v]]))
            .filter(move |m| m.satisfies(self.em, constraints))
    }
}

impl Solver for Exhaustive<'_> {
    fn compute_truth(&self, query: &Query) -> Option<bool> {
        self.calls.set(self.calls.get() + 1);
        Some(
            self.models(&query.constraints)
                .all(|m| m.evaluate(self.em, query.expr) == Some(1)),
        )
    }

    fn compute_value(&self, query: &Query) -> Option<u64> {
        self.calls.set(self.calls.get() + 1);
        self.models(&query.constraints)
            .find_map(|m| m.evaluate(self.em, query.expr))
    }

    fn compute_initial_values(&self, query: &Query, objects: &[ArrayId]) -> Option<Model> {
        self.calls.set(self.calls.get() + 1);
        assert_eq!(objects, &[self.x]);
        let model = self
            .models(&query.constraints)
            .find(|m| m.evaluate(self.em, query.expr) == Some(0));
        Some(match model {
            Some(m) => Model::Sat(vec![m.get(self.x).unwrap_or_default().to_vec()]),
            None => Model::Unsat,
        })
    }
}

#[test]
fn test_fast_path_answers_simple_bounds() {
    let em = ExprManager::default();
    let x = em.mk_array("x", 1);
    let r = em.mk_read_byte(x, 0);
    let staged = StagedSolver::new(FastCexSolver::new(&em), Exhaustive::new(&em, x));

    let query = Query::with_false(&em, vec![em.mk_uge(r, em.mk_constant(100, 8))]);
    assert_eq!(
        staged.compute_initial_values(&query, &[x]),
        Some(Model::Sat(vec![vec![177]]))
    );
    assert_eq!(staged.compute_truth(&query.with_expr(em.mk_eq(r, em.mk_constant(200, 8)))), Some(false));
    assert_eq!(staged.secondary().calls.get(), 0);
}

#[test]
fn test_backend_resolves_contradiction() {
    let em = ExprManager::default();
    let x = em.mk_array("x", 1);
    let r = em.mk_read_byte(x, 0);
    let staged = StagedSolver::new(FastCexSolver::new(&em), Exhaustive::new(&em, x));

    let cs = vec![
        em.mk_ult(r, em.mk_constant(5, 8)),
        em.mk_ugt(r, em.mk_constant(250, 8)),
    ];
    let query = Query::with_false(&em, cs);
    assert_eq!(staged.compute_initial_values(&query, &[x]), Some(Model::Unsat));
    // Anything follows from unsatisfiable constraints.
    assert_eq!(staged.compute_truth(&query), Some(true));
    assert_eq!(staged.secondary().calls.get(), 2);
}

#[test]
fn test_backend_resolves_multiplication() {
    let em = ExprManager::default();
    let x = em.mk_array("x", 1);
    let r = em.mk_read_byte(x, 0);
    let staged = StagedSolver::new(FastCexSolver::new(&em), Exhaustive::new(&em, x));

    let c = em.mk_eq(em.mk_mul(r, r), em.mk_constant(49, 8));
    let query = Query::with_false(&em, vec![c]);
    let Some(Model::Sat(values)) = staged.compute_initial_values(&query, &[x]) else {
        panic!("x * x == 49 has a solution");
    };
    let model = Assignment::from_values(&[x], values);
    assert!(model.satisfies(&em, &[c]));
    assert_eq!(staged.secondary().calls.get(), 1);
}

#[test]
fn test_value_through_either_stage() {
    let em = ExprManager::default();
    let x = em.mk_array("x", 1);
    let r = em.mk_read_byte(x, 0);
    let staged = StagedSolver::new(FastCexSolver::new(&em), Exhaustive::new(&em, x));

    let fast = Query::new(vec![em.mk_eq(r, em.mk_constant(200, 8))], r);
    assert_eq!(staged.compute_value(&fast), Some(200));
    assert_eq!(staged.secondary().calls.get(), 0);

    // 3 * x == 9 has the witness x = 3, which the midpoint misses.
    let c = em.mk_eq(em.mk_mul(em.mk_constant(3, 8), r), em.mk_constant(9, 8));
    let slow = Query::new(vec![c], r);
    let value = staged.compute_value(&slow);
    assert_eq!(staged.secondary().calls.get(), 1);
    let value = value.unwrap();
    assert_eq!((3 * value) % 256, 9);
}
