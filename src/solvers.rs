//! # MaxSAT Solvers
//!
//! This library does not solve formulas itself. Formulas are handed to
//! external MaxSAT solver executables through [`external::Solver`].

pub mod external;
