//! Query orchestration.
//!
//! [`FastCexSolver`] answers queries with the interval heuristics of
//! [`CexData`]: it narrows byte ranges, picks a witness, and only reports
//! an answer once the witness has been checked by concrete evaluation.
//! Otherwise it abstains, and a [`StagedSolver`] asks a complete backend.

use log::debug;

use crate::cex::CexData;
use crate::expr::ExprManager;
use crate::reference::ExprRef;
use crate::types::ArrayId;

/// Constraints (all assumed true) and one query expression.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Query {
    pub constraints: Vec<ExprRef>,
    pub expr: ExprRef,
}

impl Query {
    pub fn new(constraints: Vec<ExprRef>, expr: ExprRef) -> Self {
        Self { constraints, expr }
    }

    /// A query whose expression is `false`, for plain satisfiability of the
    /// constraints.
    pub fn with_false(em: &ExprManager, constraints: Vec<ExprRef>) -> Self {
        Self::new(constraints, em.mk_false())
    }

    /// Same constraints, another expression.
    pub fn with_expr(&self, expr: ExprRef) -> Self {
        Self::new(self.constraints.clone(), expr)
    }

    fn all_exprs(&self) -> Vec<ExprRef> {
        let mut exprs = self.constraints.clone();
        exprs.push(self.expr);
        exprs
    }
}

/// Answer of an incomplete solver about the validity of a query.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PartialValidity {
    /// The query is true under every assignment satisfying the constraints.
    MustBeTrue,
    /// A satisfying assignment makes the query false.
    MayBeFalse,
    /// No answer.
    None,
}

/// Result of a model search by a complete solver.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Model {
    /// Initial bytes for each requested object, in request order.
    Sat(Vec<Vec<u8>>),
    Unsat,
}

/// A solver that may abstain.
pub trait IncompleteSolver {
    fn compute_truth(&self, query: &Query) -> PartialValidity;

    /// A value that `query.expr` takes under some assignment satisfying the
    /// constraints.
    fn compute_value(&self, query: &Query) -> Option<u64>;

    /// Initial bytes for `objects` under which every constraint holds and
    /// `query.expr` is false.
    fn compute_initial_values(&self, query: &Query, objects: &[ArrayId]) -> Option<Vec<Vec<u8>>>;
}

/// A complete solver. `None` means the backend failed (e.g. timed out).
pub trait Solver {
    /// Is `query.expr` true under every assignment satisfying the constraints?
    fn compute_truth(&self, query: &Query) -> Option<bool>;

    fn compute_value(&self, query: &Query) -> Option<u64>;

    fn compute_initial_values(&self, query: &Query, objects: &[ArrayId]) -> Option<Model>;
}

/// Interval-based counterexample search.
pub struct FastCexSolver<'a> {
    em: &'a ExprManager,
}

impl<'a> FastCexSolver<'a> {
    pub fn new(em: &'a ExprManager) -> Self {
        Self { em }
    }

    /// Force the constraints to true (and, if `negate_expr`, the query
    /// expression to false), fix a witness, and check it.
    fn propagate(&self, query: &Query, negate_expr: bool, objects: &[ArrayId]) -> Option<CexData<'a>> {
        let mut cd = CexData::from_exprs(self.em, &query.all_exprs());
        for &array in objects {
            cd.reserve(array, self.em.array(array).size());
        }

        for &c in query.constraints.iter() {
            cd.force_expr_to_value(c, 1);
        }
        if negate_expr {
            cd.force_expr_to_value(query.expr, 0);
        }
        cd.dump();

        if !cd.is_consistent() {
            debug!("propagate: inconsistent tables");
            return None;
        }
        cd.fix_values();

        if !query.constraints.iter().all(|&c| cd.must_be_value(c, 1)) {
            debug!("propagate: witness violates a constraint");
            return None;
        }
        if negate_expr && !cd.must_be_value(query.expr, 0) {
            debug!("propagate: witness does not falsify the query");
            return None;
        }
        Some(cd)
    }
}

impl IncompleteSolver for FastCexSolver<'_> {
    fn compute_truth(&self, query: &Query) -> PartialValidity {
        debug!("compute_truth(expr = {})", self.em.display(query.expr));
        if self.em.is_true(query.expr) {
            return PartialValidity::MustBeTrue;
        }
        match self.propagate(query, true, &[]) {
            Some(_) => PartialValidity::MayBeFalse,
            None => PartialValidity::None,
        }
    }

    fn compute_value(&self, query: &Query) -> Option<u64> {
        debug!("compute_value(expr = {})", self.em.display(query.expr));
        let cd = self.propagate(query, false, &[])?;
        cd.constify(query.expr)
    }

    fn compute_initial_values(&self, query: &Query, objects: &[ArrayId]) -> Option<Vec<Vec<u8>>> {
        debug!(
            "compute_initial_values(expr = {}, objects = {:?})",
            self.em.display(query.expr),
            objects
        );
        let cd = self.propagate(query, true, objects)?;

        let mut values = Vec::with_capacity(objects.len());
        for &id in objects {
            let array = self.em.array(id);
            let bytes = if let Some(contents) = array.constant_values() {
                contents.to_vec()
            } else {
                let obj = cd.object(id);
                (0..array.size())
                    .map(|i| {
                        let range = obj.and_then(|obj| obj.get(i))?;
                        range.is_fixed().then(|| range.min() as u8)
                    })
                    .collect::<Option<Vec<u8>>>()?
            };
            values.push(bytes);
        }
        Some(values)
    }
}

/// Try a fast incomplete solver first, then fall back to a complete one.
pub struct StagedSolver<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> StagedSolver<P, S>
where
    P: IncompleteSolver,
    S: Solver,
{
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn secondary(&self) -> &S {
        &self.secondary
    }
}

impl<P, S> Solver for StagedSolver<P, S>
where
    P: IncompleteSolver,
    S: Solver,
{
    fn compute_truth(&self, query: &Query) -> Option<bool> {
        match self.primary.compute_truth(query) {
            PartialValidity::MustBeTrue => Some(true),
            PartialValidity::MayBeFalse => Some(false),
            PartialValidity::None => self.secondary.compute_truth(query),
        }
    }

    fn compute_value(&self, query: &Query) -> Option<u64> {
        if let Some(value) = self.primary.compute_value(query) {
            return Some(value);
        }
        self.secondary.compute_value(query)
    }

    fn compute_initial_values(&self, query: &Query, objects: &[ArrayId]) -> Option<Model> {
        if let Some(values) = self.primary.compute_initial_values(query, objects) {
            return Some(Model::Sat(values));
        }
        self.secondary.compute_initial_values(query, objects)
    }
}
