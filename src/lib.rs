//! # wcnf13 - Weighted CNF Formulas for MaxSAT
//!
//! `wcnf13` models combinatorial optimization problems as weighted CNF (WCNF)
//! formulas, reads and writes them in the (weighted) DIMACS format and
//! rewrites arbitrary formulas into the 1,3-WPM normal form, where every soft
//! clause is a unit and every hard clause has exactly three literals.
//!
//! Solving is left to external MaxSAT solvers, see [`solvers::external`].
//!
//! ## Example
//!
//! ```
//! use wcnf13::{clause, instances::Formula};
//!
//! let mut formula = Formula::new();
//! formula.extend_vars(5).unwrap();
//! formula.add_clause(clause![1, 2, 3, 4, 5], 0).unwrap();
//! formula.add_clause(clause![-1, -2], 3).unwrap();
//!
//! let normalized = formula.to_wpm13();
//! assert!(normalized.is_wpm13(true));
//! ```
//!
//! ## Features
//!
//! | Feature name | Description |
//! | --- | --- |
//! | `compression` | Enable parsing and writing compressed input. |
//! | `serde` | Add implementations for [`serde::Serialize`] and [`serde::Deserialize`] for the data model. |
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! Currently, the MSRV is 1.76.0.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod instances;
pub mod solvers;
pub mod types;
