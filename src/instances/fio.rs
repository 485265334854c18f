//! # Module for File IO (Writing and Parsing)
//!
//! It is recommended to parse and write through the interface of
//! [`super::Formula`] rather than using these functions directly.

use std::{
    fs::File,
    io::{self, BufRead},
    path::Path,
};
use thiserror::Error;

use crate::types::{Assignment, Lit, TernaryVal, Var};

pub mod dimacs;

/// Opens a reader for the file at Path.
/// With feature `compression` supports bzip2, gzip and xz compression.
pub(crate) fn open_compressed_uncompressed_read<P: AsRef<Path>>(
    path: P,
) -> Result<Box<dyn io::Read>, io::Error> {
    let path = path.as_ref();
    let raw_reader = File::open(path)?;
    #[cfg(feature = "compression")]
    if let Some(ext) = path.extension() {
        if ext.eq_ignore_ascii_case(std::ffi::OsStr::new("bz2")) {
            return Ok(Box::new(bzip2::read::BzDecoder::new(raw_reader)));
        }
        if ext.eq_ignore_ascii_case(std::ffi::OsStr::new("gz")) {
            return Ok(Box::new(flate2::read::GzDecoder::new(raw_reader)));
        }
        if ext.eq_ignore_ascii_case(std::ffi::OsStr::new("xz")) {
            return Ok(Box::new(xz2::read::XzDecoder::new(raw_reader)));
        }
    }
    Ok(Box::new(raw_reader))
}

/// Opens a buffered writer for the file at Path.
/// With feature `compression` supports bzip2, gzip and xz compression.
pub(crate) fn open_compressed_uncompressed_write<P: AsRef<Path>>(
    path: P,
) -> Result<Box<dyn io::Write>, io::Error> {
    let path = path.as_ref();
    let raw_writer = File::create(path)?;
    #[cfg(feature = "compression")]
    if let Some(ext) = path.extension() {
        if ext.eq_ignore_ascii_case(std::ffi::OsStr::new("bz2")) {
            return Ok(Box::new(io::BufWriter::new(bzip2::write::BzEncoder::new(
                raw_writer,
                bzip2::Compression::fast(),
            ))));
        }
        if ext.eq_ignore_ascii_case(std::ffi::OsStr::new("gz")) {
            return Ok(Box::new(io::BufWriter::new(flate2::write::GzEncoder::new(
                raw_writer,
                flate2::Compression::fast(),
            ))));
        }
        if ext.eq_ignore_ascii_case(std::ffi::OsStr::new("xz")) {
            return Ok(Box::new(io::BufWriter::new(xz2::write::XzEncoder::new(
                raw_writer, 1,
            ))));
        }
    }
    Ok(Box::new(io::BufWriter::new(raw_writer)))
}

/// The result reported by a MaxSAT solver
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SolverOutput {
    /// The solver proved `cost` optimal
    Optimum {
        /// The cost of the assignment
        cost: usize,
        /// The assignment reported on the value lines
        assignment: Assignment,
    },
    /// The solver found a solution of cost `cost` but did not prove optimality
    Feasible {
        /// The cost of the assignment
        cost: usize,
        /// The assignment reported on the value lines
        assignment: Assignment,
    },
    /// The hard clauses are unsatisfiable
    Unsat,
    /// The solver gave up
    Unknown,
}

impl SolverOutput {
    /// Gets the reported cost, if a solution was found
    #[must_use]
    pub fn cost(&self) -> Option<usize> {
        match self {
            SolverOutput::Optimum { cost, .. } | SolverOutput::Feasible { cost, .. } => {
                Some(*cost)
            }
            SolverOutput::Unsat | SolverOutput::Unknown => None,
        }
    }
}

/// Errors in the output of a MaxSAT solver
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MaxSatSolverOutputError {
    #[error("no solution line found in the output")]
    NoSline,
    #[error("no value line found in the output")]
    NoVline,
    #[error("no cost line found in the output")]
    NoOline,
    #[error("invalid solution line: `{0}`")]
    InvalidSline(String),
    #[error("invalid cost line: `{0}`")]
    InvalidOline(String),
    #[error("invalid value line: `{0}`")]
    InvalidVline(String),
    #[error("the solver assigned variable {0} both values")]
    ConflictingAssignment(u32),
}

/// Parses the output of a MaxSAT solver in MaxSAT Evaluation format.
///
/// Recognized lines are `o <cost>` (the last one counts), `s OPTIMUM FOUND`,
/// `s SATISFIABLE`, `s UNSATISFIABLE`, `s UNKNOWN` and `v` lines with signed
/// DIMACS literals, optionally terminated by `0`. All other lines are
/// ignored.
///
/// # Errors
///
/// IO errors while reading and [`MaxSatSolverOutputError`] if the output is
/// incomplete or malformed.
pub fn parse_maxsat_solver_output<R: BufRead>(reader: R) -> anyhow::Result<SolverOutput> {
    let mut optimal = None;
    let mut cost = None;
    let mut solution: Option<Assignment> = None;

    for line in reader.lines() {
        let line = line?;
        let Some((tag, rest)) = line.split_once(char::is_whitespace) else {
            continue;
        };
        match tag {
            "s" => match rest.trim() {
                "OPTIMUM FOUND" => optimal = Some(true),
                "SATISFIABLE" => optimal = Some(false),
                "UNSATISFIABLE" => return Ok(SolverOutput::Unsat),
                "UNKNOWN" | "INDETERMINATE" => return Ok(SolverOutput::Unknown),
                _ => anyhow::bail!(MaxSatSolverOutputError::InvalidSline(line.clone())),
            },
            "o" => {
                cost = Some(
                    rest.trim()
                        .parse::<usize>()
                        .map_err(|_| MaxSatSolverOutputError::InvalidOline(line.clone()))?,
                );
            }
            "v" => parse_vline(rest, solution.get_or_insert_with(Assignment::default))
                .map_err(|err| match err {
                    MaxSatSolverOutputError::InvalidVline(_) => {
                        MaxSatSolverOutputError::InvalidVline(line.clone())
                    }
                    err => err,
                })?,
            _ => (),
        }
    }

    let Some(optimal) = optimal else {
        anyhow::bail!(MaxSatSolverOutputError::NoSline);
    };
    let Some(cost) = cost else {
        anyhow::bail!(MaxSatSolverOutputError::NoOline);
    };
    let Some(assignment) = solution else {
        anyhow::bail!(MaxSatSolverOutputError::NoVline);
    };
    log::debug!("solver reported cost {cost} (optimal: {optimal})");
    if optimal {
        Ok(SolverOutput::Optimum { cost, assignment })
    } else {
        Ok(SolverOutput::Feasible { cost, assignment })
    }
}

fn parse_vline(values: &str, assign: &mut Assignment) -> Result<(), MaxSatSolverOutputError> {
    for token in values.split_whitespace() {
        // bitstring value lines like `v 0101` are not supported
        if token.len() > 1 && token.starts_with('0') {
            return Err(MaxSatSolverOutputError::InvalidVline(values.to_string()));
        }
        let val = token
            .parse::<i32>()
            .map_err(|_| MaxSatSolverOutputError::InvalidVline(values.to_string()))?;
        if val == 0 {
            return Ok(());
        }
        let lit = Lit::new(val);
        if lit.vidx32() > Var::MAX_IDX {
            return Err(MaxSatSolverOutputError::InvalidVline(values.to_string()));
        }
        if assign.lit_value(lit) == TernaryVal::False {
            return Err(MaxSatSolverOutputError::ConflictingAssignment(lit.vidx32()));
        }
        assign.assign_lit(lit);
    }
    Ok(())
}
