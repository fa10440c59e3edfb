//! Debug utilities for inspecting expressions.
//!
//! Expressions print as S-expressions, e.g. `(Ult (Read 0 x) (w8 10))`.
//! Shared sub-expressions are printed in full at every occurrence, so this is
//! meant for logs and test failures, not for serializing large DAGs.

use std::collections::HashSet;
use std::fmt;

use crate::expr::{ExprKind, ExprManager, UpdateList};
use crate::reference::ExprRef;
use crate::types::BOOL;

/// Printable view of one expression, see [`ExprManager::display`].
pub struct ExprDisplay<'a> {
    em: &'a ExprManager,
    e: ExprRef,
}

impl ExprManager {
    /// Wrap `e` for printing.
    pub fn display(&self, e: ExprRef) -> ExprDisplay<'_> {
        ExprDisplay { em: self, e }
    }

    /// Collect every distinct sub-expression reachable from `e` (including
    /// `e` itself and the writes of read update lists), in post-order.
    pub fn descendants(&self, e: ExprRef) -> Vec<ExprRef> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        self.collect_descendants(e, &mut seen, &mut order);
        order
    }

    fn collect_descendants(
        &self,
        e: ExprRef,
        seen: &mut HashSet<ExprRef>,
        order: &mut Vec<ExprRef>,
    ) {
        if !seen.insert(e) {
            return;
        }
        match self.kind(e) {
            ExprKind::Constant(_) => {}
            ExprKind::Read { updates, index } => {
                for update in self.updates(updates) {
                    self.collect_descendants(update.index, seen, order);
                    self.collect_descendants(update.value, seen, order);
                }
                self.collect_descendants(index, seen, order);
            }
            ExprKind::Select {
                cond,
                on_true,
                on_false,
            } => {
                self.collect_descendants(cond, seen, order);
                self.collect_descendants(on_true, seen, order);
                self.collect_descendants(on_false, seen, order);
            }
            ExprKind::Concat { msb, lsb } => {
                self.collect_descendants(msb, seen, order);
                self.collect_descendants(lsb, seen, order);
            }
            ExprKind::Binary { left, right, .. } => {
                self.collect_descendants(left, seen, order);
                self.collect_descendants(right, seen, order);
            }
            ExprKind::NotOptimized(x)
            | ExprKind::Extract { expr: x, .. }
            | ExprKind::ZExt(x)
            | ExprKind::SExt(x)
            | ExprKind::Not(x) => self.collect_descendants(x, seen, order),
        }
        order.push(e);
    }

    fn fmt_expr(&self, f: &mut fmt::Formatter<'_>, e: ExprRef) -> fmt::Result {
        let width = self.width(e);
        match self.kind(e) {
            ExprKind::Constant(value) if width == BOOL => {
                write!(f, "{}", if value == 1 { "true" } else { "false" })
            }
            ExprKind::Constant(value) => write!(f, "(w{} {})", width, value),
            ExprKind::NotOptimized(x) => {
                write!(f, "(NotOptimized ")?;
                self.fmt_expr(f, x)?;
                write!(f, ")")
            }
            ExprKind::Read { updates, index } => {
                write!(f, "(Read ")?;
                self.fmt_expr(f, index)?;
                write!(f, " ")?;
                self.fmt_updates(f, updates)?;
                write!(f, ")")
            }
            ExprKind::Select {
                cond,
                on_true,
                on_false,
            } => {
                write!(f, "(Select ")?;
                self.fmt_expr(f, cond)?;
                write!(f, " ")?;
                self.fmt_expr(f, on_true)?;
                write!(f, " ")?;
                self.fmt_expr(f, on_false)?;
                write!(f, ")")
            }
            ExprKind::Concat { msb, lsb } => {
                write!(f, "(Concat ")?;
                self.fmt_expr(f, msb)?;
                write!(f, " ")?;
                self.fmt_expr(f, lsb)?;
                write!(f, ")")
            }
            ExprKind::Extract { expr, offset } => {
                write!(f, "(Extract w{} {} ", width, offset)?;
                self.fmt_expr(f, expr)?;
                write!(f, ")")
            }
            ExprKind::ZExt(x) => {
                write!(f, "(ZExt w{} ", width)?;
                self.fmt_expr(f, x)?;
                write!(f, ")")
            }
            ExprKind::SExt(x) => {
                write!(f, "(SExt w{} ", width)?;
                self.fmt_expr(f, x)?;
                write!(f, ")")
            }
            ExprKind::Not(x) => {
                write!(f, "(Not ")?;
                self.fmt_expr(f, x)?;
                write!(f, ")")
            }
            ExprKind::Binary { op, left, right } => {
                write!(f, "({} ", op.name())?;
                self.fmt_expr(f, left)?;
                write!(f, " ")?;
                self.fmt_expr(f, right)?;
                write!(f, ")")
            }
        }
    }

    /// `name` for the initial contents, `name[i=v, ...]` with writes
    /// listed newest first.
    fn fmt_updates(&self, f: &mut fmt::Formatter<'_>, updates: UpdateList) -> fmt::Result {
        write!(f, "{}", self.array(updates.array).name())?;
        if updates.head.is_none() {
            return Ok(());
        }
        write!(f, "[")?;
        for (i, update) in self.updates(updates).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            self.fmt_expr(f, update.index)?;
            write!(f, "=")?;
            self.fmt_expr(f, update.value)?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.em.fmt_expr(f, self.e)
    }
}

impl fmt::Debug for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.e, self)
    }
}
