//! # fastcex: fast counterexample search over byte-array constraints
//!
//! **`fastcex`** is an incomplete, self-verifying solver for constraints over symbolic byte arrays.
//! It answers the easy queries of a symbolic executor cheaply and abstains on everything else,
//! so it is meant to sit in front of a complete SMT backend.
//!
//! ## How it works
//!
//! Every byte of every symbolic array gets an interval of possible values, initially `[0,255]`.
//! Each constraint is *forced* to be true: its required value is pushed backward through the
//! expression, narrowing byte intervals on the way. Then every byte is fixed to the midpoint of
//! its interval, and the resulting assignment is checked by plain concrete evaluation.
//!
//! Forcing is a heuristic and may narrow wrongly; the concrete check is what makes answers
//! trustworthy. If the check fails, the solver abstains rather than guessing.
//!
//! ## Key Features
//!
//! - **Manager-Centric Architecture**: expressions are built through the [`ExprManager`][crate::expr::ExprManager],
//!   which hash-conses nodes so that equal sub-expressions share one [`ExprRef`][crate::reference::ExprRef].
//! - **Exact bitwise intervals**: [`ValueRange`][crate::range::ValueRange] computes tight bounds for AND and OR.
//! - **Never wrong**: every positive answer has been validated against the original constraints.
//! - **Staged solving**: [`StagedSolver`][crate::solver::StagedSolver] falls back to a complete solver on abstention.
//!
//! ## Basic Usage
//!
//! ```rust
//! use fastcex::expr::ExprManager;
//! use fastcex::solver::{FastCexSolver, IncompleteSolver, Query};
//!
//! // 1. Initialize the manager
//! let em = ExprManager::default();
//!
//! // 2. Declare a one-byte symbolic array and read it
//! let x = em.mk_array("x", 1);
//! let byte = em.mk_read_byte(x, 0);
//!
//! // 3. Constrain it: x < 10
//! let c = em.mk_ult(byte, em.mk_constant(10, 8));
//!
//! // 4. Ask for a model
//! let solver = FastCexSolver::new(&em);
//! let query = Query::with_false(&em, vec![c]);
//! let values = solver.compute_initial_values(&query, &[x]);
//! assert_eq!(values, Some(vec![vec![4]]));
//! ```
//!
//! ## Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade: `debug!` for every forcing step
//! and solver decision, `trace!` for byte table dumps and forward ranges. No logger is installed.

pub mod cache;
pub mod cex;
pub mod debug;
pub mod eval;
pub mod expr;
pub mod node;
pub mod range;
pub mod range_eval;
pub mod reference;
pub mod solver;
pub mod table;
pub mod types;
pub mod utils;
