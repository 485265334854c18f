//! # Weighted CNF Formula Representation
//!
//! The [`Formula`] type represents a weighted CNF instance: a monotonically
//! growing set of variables, hard clauses that must be satisfied and weighted
//! soft clauses whose violation incurs a cost.

use std::{fmt, io, path::Path};

use thiserror::Error;

use crate::types::{Assignment, Clause, TernaryVal, Var};

pub mod fio;
pub mod wpm13;

/// The weight marking a clause added to a [`Formula`] as hard
pub const TOP_WEIGHT: usize = 0;

/// Violations of the formula invariants by a clause that is about to be added
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum FormulaViolation {
    /// The clause contains the literal 0
    #[error("clause cannot contain variable 0")]
    ZeroLit,
    /// The clause contains a variable that has not been allocated
    #[error("clause contains variable {var}, not allocated (formula has {n_vars} variables)")]
    UnallocatedVar {
        /// The offending variable index
        var: u32,
        /// The number of variables allocated in the formula
        n_vars: u32,
    },
}

/// Errors of operations on formulas
#[derive(Error, Debug)]
pub enum Error {
    /// An argument that cannot be applied to the formula
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A clause violating the formula invariants
    #[error(transparent)]
    FormulaViolation(#[from] FormulaViolation),
    /// Malformed DIMACS input
    #[error("format error: {0}")]
    Format(#[from] fio::dimacs::Error),
    /// IO error while reading or writing
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Type representing a weighted CNF formula.
///
/// Variables are allocated from a single counter and never reused. Clauses
/// are only ever appended: hard clauses to one sequence, soft clauses together
/// with their weight to another. Every literal stored in the formula
/// references a variable that was allocated before the literal was added.
///
/// # Example
///
/// ```
/// use wcnf13::{clause, instances::Formula};
///
/// let mut formula = Formula::new();
/// let x = formula.new_var();
/// let y = formula.new_var();
/// formula.add_clause(clause![x.to_dimacs(), y.to_dimacs()], 0).unwrap();
/// formula.add_clause(clause![-x.to_dimacs()], 1).unwrap();
/// formula.add_clause(clause![-y.to_dimacs()], 1).unwrap();
///
/// assert_eq!(formula.n_clauses(), 3);
/// assert_eq!(formula.top_weight(), 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Formula {
    n_vars: u32,
    hard: Vec<Clause>,
    soft: Vec<(usize, Clause)>,
    sum_soft_weights: usize,
    header: Vec<String>,
}

impl Formula {
    /// Creates a new empty formula
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the formula to an empty one, including the variable counter
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Gets the number of allocated variables
    #[must_use]
    pub fn n_vars(&self) -> u32 {
        self.n_vars
    }

    /// Gets the highest allocated variable, if any
    #[must_use]
    pub fn max_var(&self) -> Option<Var> {
        if self.n_vars == 0 {
            None
        } else {
            Some(Var::new(self.n_vars))
        }
    }

    /// Gets the number of clauses (hard and soft) in the formula
    #[must_use]
    pub fn n_clauses(&self) -> usize {
        self.hard.len() + self.soft.len()
    }

    /// Gets the number of hard clauses
    #[must_use]
    pub fn n_hard(&self) -> usize {
        self.hard.len()
    }

    /// Gets the number of soft clauses
    #[must_use]
    pub fn n_soft(&self) -> usize {
        self.soft.len()
    }

    /// Gets the sum of all soft clause weights
    #[must_use]
    pub fn sum_soft_weights(&self) -> usize {
        self.sum_soft_weights
    }

    /// Gets the top weight of the formula, which exceeds the cost of
    /// violating all soft clauses. Hard clauses are written with this weight.
    #[must_use]
    pub fn top_weight(&self) -> usize {
        self.sum_soft_weights + 1
    }

    /// Allocates a new variable
    ///
    /// # Panics
    ///
    /// If the variable index would exceed [`Var::MAX_IDX`].
    pub fn new_var(&mut self) -> Var {
        let var = Var::new(self.n_vars + 1);
        self.n_vars = var.idx32();
        var
    }

    /// Allocates `count` new variables at once, e.g., to reserve the variable
    /// range of another formula before copying its clauses.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the extension would exceed the maximum
    /// variable index [`Var::MAX_IDX`]. The formula is left unchanged.
    pub fn extend_vars(&mut self, count: u32) -> Result<(), Error> {
        match self.n_vars.checked_add(count) {
            Some(n_vars) if n_vars <= Var::MAX_IDX => {
                self.n_vars = n_vars;
                Ok(())
            }
            _ => Err(Error::InvalidArgument(format!(
                "cannot extend {} variables by {count}, maximum variable index is {}",
                self.n_vars,
                Var::MAX_IDX
            ))),
        }
    }

    /// Adds a clause with a given weight. A weight of [`TOP_WEIGHT`] makes
    /// the clause hard, any other weight makes it soft.
    ///
    /// # Errors
    ///
    /// If the clause contains the literal 0 or a variable that has not been
    /// allocated, returns [`FormulaViolation`]. The formula is not changed in
    /// that case.
    pub fn add_clause(&mut self, clause: Clause, weight: usize) -> Result<(), FormulaViolation> {
        self.check_clause(&clause)?;
        if weight == TOP_WEIGHT {
            self.hard.push(clause);
        } else {
            self.soft.push((weight, clause));
            self.sum_soft_weights += weight;
        }
        Ok(())
    }

    /// Adds multiple clauses, all with the same weight.
    ///
    /// This is not atomic: if a clause is rejected, the clauses before it
    /// remain in the formula. Callers that need all-or-nothing semantics must
    /// validate the clauses upfront.
    ///
    /// # Errors
    ///
    /// The first [`FormulaViolation`] encountered.
    pub fn add_clauses<I>(&mut self, clauses: I, weight: usize) -> Result<(), FormulaViolation>
    where
        I: IntoIterator<Item = Clause>,
    {
        clauses
            .into_iter()
            .try_for_each(|cl| self.add_clause(cl, weight))
    }

    fn check_clause(&self, clause: &Clause) -> Result<(), FormulaViolation> {
        for lit in clause {
            let var = lit.vidx32();
            if var == 0 {
                return Err(FormulaViolation::ZeroLit);
            }
            if var > self.n_vars {
                return Err(FormulaViolation::UnallocatedVar {
                    var,
                    n_vars: self.n_vars,
                });
            }
        }
        Ok(())
    }

    /// Checks whether the formula is in 1,3-WPM form: every soft clause has
    /// exactly one literal and every hard clause has exactly three literals.
    /// If `strict` is false, hard clauses with fewer literals are accepted.
    #[must_use]
    pub fn is_wpm13(&self, strict: bool) -> bool {
        let soft_ok = self.soft.iter().all(|(_, cl)| cl.len() == 1);
        let hard_ok = self
            .hard
            .iter()
            .all(|cl| cl.len() == 3 || (!strict && cl.len() < 3));
        soft_ok && hard_ok
    }

    /// Gets an iterator over the hard clauses in insertion order
    pub fn iter_hard(&self) -> impl ExactSizeIterator<Item = &Clause> + '_ {
        self.hard.iter()
    }

    /// Gets an iterator over the soft clauses and their weights in insertion order
    pub fn iter_soft(&self) -> impl ExactSizeIterator<Item = (usize, &Clause)> + '_ {
        self.soft.iter().map(|(w, cl)| (*w, cl))
    }

    /// Gets the header comment lines
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Adds a header comment line. Header lines are written as DIMACS comments
    /// and have no semantic effect.
    pub fn add_comment<S: Into<String>>(&mut self, line: S) {
        self.header.push(line.into());
    }

    /// Calculates the cost of an assignment: the sum of the weights of all
    /// soft clauses that are not satisfied. Returns [`None`] if the
    /// assignment does not satisfy all hard clauses.
    #[must_use]
    pub fn cost(&self, assign: &Assignment) -> Option<usize> {
        if self
            .hard
            .iter()
            .any(|cl| cl.evaluate(assign) != TernaryVal::True)
        {
            return None;
        }
        Some(
            self.soft
                .iter()
                .filter(|(_, cl)| cl.evaluate(assign) != TernaryVal::True)
                .map(|(w, _)| w)
                .sum(),
        )
    }

    /// Parses a DIMACS CNF or WCNF (with `p` line) formula from a reader
    ///
    /// # Errors
    ///
    /// [`Error::Format`] for malformed input, [`Error::Io`] if reading fails.
    pub fn from_dimacs<R: io::BufRead>(
        reader: &mut R,
        opts: fio::dimacs::Options,
    ) -> Result<Self, Error> {
        fio::dimacs::parse_wcnf(reader, opts)
    }

    /// Parses a DIMACS formula from a file path. For more details see
    /// [`Formula::from_dimacs`]. With feature `compression` supports bzip2,
    /// gzip and xz compression, detected by the file extension.
    ///
    /// # Errors
    ///
    /// [`Error::Format`] for malformed input, [`Error::Io`] if the file
    /// cannot be opened or read.
    pub fn from_dimacs_path<P: AsRef<Path>>(
        path: P,
        opts: fio::dimacs::Options,
    ) -> Result<Self, Error> {
        let mut reader = io::BufReader::new(fio::open_compressed_uncompressed_read(path)?);
        Self::from_dimacs(&mut reader, opts)
    }

    /// Writes the formula in weighted DIMACS format
    ///
    /// # Performance
    ///
    /// For performance, consider using a [`std::io::BufWriter`] instance.
    ///
    /// # Errors
    ///
    /// Returns [`io::Error`] on errors during writing
    pub fn write_dimacs<W: io::Write>(&self, writer: &mut W) -> Result<(), io::Error> {
        fio::dimacs::write_wcnf_annotated(writer, self)
    }

    /// Writes the formula to a weighted DIMACS file at a path. With feature
    /// `compression` the file is compressed if the path ends in a compression
    /// extension.
    ///
    /// # Errors
    ///
    /// Returns [`io::Error`] on errors during writing
    pub fn write_dimacs_path<P: AsRef<Path>>(&self, path: P) -> Result<(), io::Error> {
        let mut writer = fio::open_compressed_uncompressed_write(path)?;
        self.write_dimacs(&mut writer)
    }
}

/// Formulas are displayed as weighted DIMACS text
impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::new();
        self.write_dimacs(&mut buf).map_err(|_| fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&buf))
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, Formula, FormulaViolation, TOP_WEIGHT};
    use crate::{
        clause,
        types::{Assignment, Var},
    };

    fn small_formula() -> Formula {
        let mut formula = Formula::new();
        formula.extend_vars(2).unwrap();
        formula.add_clause(clause![1, 2], TOP_WEIGHT).unwrap();
        formula.add_clause(clause![-1], 1).unwrap();
        formula.add_clause(clause![-2], 1).unwrap();
        formula
    }

    #[test]
    fn empty_formula() {
        let formula = Formula::new();
        assert_eq!(formula.n_vars(), 0);
        assert_eq!(formula.n_clauses(), 0);
        assert_eq!(formula.top_weight(), 1);
        assert_eq!(formula.max_var(), None);
        assert!(formula.is_wpm13(true));
    }

    #[test]
    fn new_var_increments() {
        let mut formula = Formula::new();
        assert_eq!(formula.new_var(), Var::new(1));
        assert_eq!(formula.new_var(), Var::new(2));
        formula.extend_vars(3).unwrap();
        assert_eq!(formula.new_var(), Var::new(6));
        assert_eq!(formula.n_vars(), 6);
    }

    #[test]
    fn extend_vars_overflow() {
        let mut formula = Formula::new();
        formula.extend_vars(Var::MAX_IDX).unwrap();
        assert!(matches!(
            formula.extend_vars(1),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(formula.n_vars(), Var::MAX_IDX);
        assert!(matches!(
            Formula::new().extend_vars(u32::MAX),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn new_var_at_max_leaves_counter() {
        let mut formula = Formula::new();
        formula.extend_vars(Var::MAX_IDX).unwrap();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| formula.new_var()));
        assert!(res.is_err());
        assert_eq!(formula.n_vars(), Var::MAX_IDX);
    }

    #[test]
    fn clause_accounting() {
        let formula = small_formula();
        assert_eq!(formula.n_hard(), 1);
        assert_eq!(formula.n_soft(), 2);
        assert_eq!(formula.n_clauses(), 3);
        assert_eq!(formula.sum_soft_weights(), 2);
        assert_eq!(formula.top_weight(), 3);
        assert_eq!(formula.iter_hard().collect::<Vec<_>>(), vec![&clause![1, 2]]);
        assert_eq!(
            formula.iter_soft().collect::<Vec<_>>(),
            vec![(1, &clause![-1]), (1, &clause![-2])]
        );
    }

    #[test]
    fn add_zero_lit() {
        let mut formula = Formula::new();
        formula.extend_vars(1).unwrap();
        assert_eq!(
            formula.add_clause(clause![0], 1),
            Err(FormulaViolation::ZeroLit)
        );
        assert_eq!(formula.n_clauses(), 0);
        assert_eq!(formula.sum_soft_weights(), 0);
    }

    #[test]
    fn add_unallocated_var() {
        let mut formula = Formula::new();
        formula.extend_vars(2).unwrap();
        assert_eq!(
            formula.add_clause(clause![1, -3], TOP_WEIGHT),
            Err(FormulaViolation::UnallocatedVar { var: 3, n_vars: 2 })
        );
        assert_eq!(formula.n_clauses(), 0);
    }

    #[test]
    fn add_empty_soft_clause() {
        let mut formula = Formula::new();
        formula.add_clause(clause![], 5).unwrap();
        assert_eq!(formula.n_soft(), 1);
        assert_eq!(formula.top_weight(), 6);
        // an empty clause is violated by every assignment
        assert_eq!(formula.cost(&Assignment::default()), Some(5));
    }

    #[test]
    fn add_clauses_not_atomic() {
        let mut formula = Formula::new();
        formula.extend_vars(2).unwrap();
        let res = formula.add_clauses([clause![1], clause![2], clause![3], clause![-1]], 2);
        assert_eq!(
            res,
            Err(FormulaViolation::UnallocatedVar { var: 3, n_vars: 2 })
        );
        assert_eq!(formula.n_soft(), 2);
        assert_eq!(formula.sum_soft_weights(), 4);
    }

    #[test]
    fn duplicates_are_kept() {
        let mut formula = Formula::new();
        formula.extend_vars(1).unwrap();
        formula.add_clause(clause![1, 1], TOP_WEIGHT).unwrap();
        formula.add_clause(clause![1, 1], TOP_WEIGHT).unwrap();
        assert_eq!(formula.n_hard(), 2);
        assert_eq!(formula.iter_hard().next().unwrap().len(), 2);
    }

    #[test]
    fn is_wpm13() {
        let formula = small_formula();
        assert!(formula.is_wpm13(false));
        assert!(!formula.is_wpm13(true));

        let mut formula = Formula::new();
        formula.extend_vars(3).unwrap();
        formula.add_clause(clause![1, 2, 3], TOP_WEIGHT).unwrap();
        formula.add_clause(clause![-3], 4).unwrap();
        assert!(formula.is_wpm13(true));
        formula.add_clause(clause![-3, 1], 4).unwrap();
        assert!(!formula.is_wpm13(false));
    }

    #[test]
    fn cost() {
        let formula = small_formula();
        let assign = Assignment::from_iter([lit(1), lit(-2)]);
        assert_eq!(formula.cost(&assign), Some(1));
        let assign = Assignment::from_iter([lit(1), lit(2)]);
        assert_eq!(formula.cost(&assign), Some(2));
        let assign = Assignment::from_iter([lit(-1), lit(-2)]);
        assert_eq!(formula.cost(&assign), None);
    }

    #[test]
    fn header_and_clear() {
        let mut formula = small_formula();
        formula.add_comment("vertex cover of a single edge");
        assert_eq!(formula.header(), &[String::from("vertex cover of a single edge")]);
        formula.clear();
        assert_eq!(formula, Formula::new());
    }

    fn lit(val: i32) -> crate::types::Lit {
        crate::types::Lit::new(val)
    }
}
