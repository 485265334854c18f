//! # Common Types for Weighted CNF Formulas
//!
//! Variables, literals and assignments. All of these use DIMACS indexing, i.e.,
//! variables start at 1 and a literal is a signed variable index.

use std::{fmt, ops};

use thiserror::Error;

pub mod constraints;
pub use constraints::Clause;

/// Type representing a boolean variable in a formula. Variable indexing
/// starts from 1, as in the DIMACS format. The maximum index is
/// [`Var::MAX_IDX`], so that every literal fits into an `i32`.
#[derive(Hash, Eq, PartialEq, PartialOrd, Clone, Copy, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Var {
    idx: u32,
}

impl Var {
    /// The maximum index that can be represented.
    pub const MAX_IDX: u32 = i32::MAX as u32;

    /// Creates a new variable with a given index.
    ///
    /// # Panics
    ///
    /// If `idx == 0` or `idx > Var::MAX_IDX`.
    #[must_use]
    pub fn new(idx: u32) -> Var {
        assert!(idx != 0, "variable index zero");
        assert!(idx <= Var::MAX_IDX, "variable index too high");
        Var { idx }
    }

    /// Creates a new variable with a given index.
    ///
    /// # Errors
    ///
    /// [`TypeError::IdxZero`] if `idx == 0`, [`TypeError::IdxTooHigh`] if
    /// `idx > Var::MAX_IDX`.
    pub fn new_with_error(idx: u32) -> Result<Var, TypeError> {
        if idx == 0 {
            return Err(TypeError::IdxZero);
        }
        if idx > Var::MAX_IDX {
            return Err(TypeError::IdxTooHigh(idx, Var::MAX_IDX));
        }
        Ok(Var { idx })
    }

    /// Creates a literal that is not negated.
    ///
    /// # Examples
    ///
    /// ```
    /// use wcnf13::types::{Lit, Var};
    ///
    /// assert_eq!(Var::new(5).pos_lit(), Lit::new(5));
    /// ```
    #[inline]
    #[must_use]
    pub fn pos_lit(self) -> Lit {
        Lit::new(self.to_dimacs())
    }

    /// Creates a negated literal.
    ///
    /// # Examples
    ///
    /// ```
    /// use wcnf13::types::{Lit, Var};
    ///
    /// assert_eq!(Var::new(5).neg_lit(), Lit::new(-5));
    /// ```
    #[inline]
    #[must_use]
    pub fn neg_lit(self) -> Lit {
        Lit::new(-self.to_dimacs())
    }

    /// Returns the index of the variable as a `usize`. For the 32 bit index
    /// use [`Var::idx32`].
    #[inline]
    #[must_use]
    pub fn idx(&self) -> usize {
        self.idx as usize
    }

    /// Returns the 32 bit index of the variable.
    #[inline]
    #[must_use]
    pub fn idx32(&self) -> u32 {
        self.idx
    }

    /// Converts the variable to its DIMACS integer
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn to_dimacs(self) -> i32 {
        // NOTE: `idx <= i32::MAX` by construction
        self.idx as i32
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.idx)
    }
}

/// Creates a variable with DIMACS indexing. Mainly used in tests.
///
/// # Examples
///
/// ```
/// use wcnf13::{var, types::Var};
///
/// assert_eq!(var![42], Var::new(42));
/// ```
#[macro_export]
macro_rules! var {
    ($v:expr) => {
        $crate::types::Var::new($v)
    };
}

/// Type representing a literal, stored as its DIMACS integer. The absolute
/// value is the variable index, the sign is the polarity.
///
/// Any integer can be wrapped as a literal, including `0`, which is the
/// clause terminator of the DIMACS format. Literals are validated when they
/// are added to a [`Formula`](crate::instances::Formula), which rejects `0`
/// and literals of variables that have not been allocated.
#[derive(Hash, Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Lit {
    val: i32,
}

impl Lit {
    /// Wraps a DIMACS integer as a literal without any checks
    #[inline]
    #[must_use]
    pub const fn new(val: i32) -> Lit {
        Lit { val }
    }

    /// Creates a literal from a DIMACS integer.
    ///
    /// # Errors
    ///
    /// [`TypeError::IdxZero`] if `val == 0`.
    pub fn from_dimacs(val: i32) -> Result<Lit, TypeError> {
        if val == 0 {
            return Err(TypeError::IdxZero);
        }
        Ok(Lit { val })
    }

    /// Gets the variable index of the literal
    #[inline]
    #[must_use]
    pub fn vidx(&self) -> usize {
        self.val.unsigned_abs() as usize
    }

    /// Gets the 32 bit variable index of the literal
    #[inline]
    #[must_use]
    pub fn vidx32(&self) -> u32 {
        self.val.unsigned_abs()
    }

    /// Gets the variable of the literal
    ///
    /// # Panics
    ///
    /// If the literal is `0`.
    #[inline]
    #[must_use]
    pub fn var(&self) -> Var {
        Var::new(self.vidx32())
    }

    /// True if the literal is positive.
    #[inline]
    #[must_use]
    pub fn is_pos(&self) -> bool {
        self.val > 0
    }

    /// True if the literal is negated.
    #[inline]
    #[must_use]
    pub fn is_neg(&self) -> bool {
        self.val < 0
    }

    /// Converts the literal to its DIMACS integer
    #[inline]
    #[must_use]
    pub fn to_dimacs(self) -> i32 {
        self.val
    }
}

impl From<i32> for Lit {
    fn from(val: i32) -> Self {
        Lit::new(val)
    }
}

impl ops::Not for Lit {
    type Output = Lit;

    #[inline]
    fn not(self) -> Lit {
        Lit { val: -self.val }
    }
}

impl ops::Neg for Lit {
    type Output = Lit;

    #[inline]
    fn neg(self) -> Lit {
        Lit { val: -self.val }
    }
}

/// Literals are printed as their DIMACS integer
impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.val)
    }
}

/// Creates a literal from a DIMACS integer. Mainly used in tests.
///
/// # Examples
///
/// ```
/// use wcnf13::{lit, types::Lit};
///
/// assert_eq!(lit![-42], Lit::new(-42));
/// assert_eq!(!lit![42], lit![-42]);
/// ```
#[macro_export]
macro_rules! lit {
    ($l:expr) => {
        $crate::types::Lit::new($l)
    };
}

/// Ternary value assigned to a literal or variable, including possible "don't care"
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum TernaryVal {
    /// Positive assignment.
    True,
    /// Negative assignment.
    False,
    /// Not assigned.
    DontCare,
}

impl TernaryVal {
    /// Converts a [`TernaryVal`] to a bool with a default value for "don't cares"
    #[must_use]
    pub fn to_bool_with_def(self, def: bool) -> bool {
        match self {
            TernaryVal::True => true,
            TernaryVal::False => false,
            TernaryVal::DontCare => def,
        }
    }
}

impl fmt::Display for TernaryVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TernaryVal::True => write!(f, "1"),
            TernaryVal::False => write!(f, "0"),
            TernaryVal::DontCare => write!(f, "_"),
        }
    }
}

impl From<bool> for TernaryVal {
    fn from(value: bool) -> Self {
        if value {
            return TernaryVal::True;
        }
        TernaryVal::False
    }
}

impl ops::Not for TernaryVal {
    type Output = TernaryVal;

    fn not(self) -> Self::Output {
        match self {
            TernaryVal::True => TernaryVal::False,
            TernaryVal::False => TernaryVal::True,
            TernaryVal::DontCare => TernaryVal::DontCare,
        }
    }
}

/// Type representing an assignment of variables, e.g., as reported by a solver.
#[derive(Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Assignment {
    assignment: Vec<TernaryVal>,
}

impl Assignment {
    /// Get the value that the assignment assigns to a variable.
    /// If the variable is not included, returns [`TernaryVal::DontCare`].
    #[must_use]
    pub fn var_value(&self, var: Var) -> TernaryVal {
        self.assignment
            .get(var.idx() - 1)
            .copied()
            .unwrap_or(TernaryVal::DontCare)
    }

    /// Same as [`Assignment::var_value`], but for literals.
    ///
    /// The literal `0` is never assigned.
    #[must_use]
    pub fn lit_value(&self, lit: Lit) -> TernaryVal {
        if lit.to_dimacs() == 0 {
            return TernaryVal::DontCare;
        }
        let val = self.var_value(lit.var());
        if lit.is_neg() {
            !val
        } else {
            val
        }
    }

    /// Replaces all "don't care" values with a default value
    pub fn replace_dont_care(&mut self, def: bool) {
        self.assignment.iter_mut().for_each(|tv| {
            if *tv == TernaryVal::DontCare {
                *tv = def.into();
            }
        });
    }

    /// Assigns a variable in the assignment
    pub fn assign_var(&mut self, var: Var, val: TernaryVal) {
        if self.assignment.len() < var.idx() {
            self.assignment.resize(var.idx(), TernaryVal::DontCare);
        }
        self.assignment[var.idx() - 1] = val;
    }

    /// Assigns a literal to true
    ///
    /// # Panics
    ///
    /// If the literal is `0`.
    pub fn assign_lit(&mut self, lit: Lit) {
        self.assign_var(lit.var(), lit.is_pos().into());
    }

    /// Truncates the assignment to only include variables up to `max_var`,
    /// e.g., to drop auxiliary variables of a normalized formula
    #[must_use]
    pub fn truncate(mut self, max_var: Var) -> Self {
        self.assignment.truncate(max_var.idx());
        self
    }

    /// Gets the maximum variable in the assignment
    #[must_use]
    pub fn max_var(&self) -> Option<Var> {
        if self.assignment.is_empty() {
            None
        } else {
            u32::try_from(self.assignment.len()).ok().map(Var::new)
        }
    }

    /// Gets the number of variables covered by the assignment
    #[must_use]
    pub fn len(&self) -> usize {
        self.assignment.len()
    }

    /// Checks whether the assignment covers no variables
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignment.is_empty()
    }
}

impl fmt::Debug for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.assignment.iter().try_for_each(|tv| write!(f, "{tv}"))
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.assignment.iter().try_for_each(|tv| write!(f, "{tv}"))
    }
}

/// Turns the assignment into an iterator over the literals it makes true
impl IntoIterator for Assignment {
    type Item = Lit;

    type IntoIter = std::iter::FilterMap<
        std::iter::Zip<std::ops::RangeFrom<i32>, std::vec::IntoIter<TernaryVal>>,
        fn((i32, TernaryVal)) -> Option<Lit>,
    >;

    fn into_iter(self) -> Self::IntoIter {
        fn true_lit((idx, tv): (i32, TernaryVal)) -> Option<Lit> {
            match tv {
                TernaryVal::True => Some(Lit::new(idx)),
                TernaryVal::False => Some(Lit::new(-idx)),
                TernaryVal::DontCare => None,
            }
        }
        (1..).zip(self.assignment).filter_map(true_lit)
    }
}

impl FromIterator<Lit> for Assignment {
    fn from_iter<T: IntoIterator<Item = Lit>>(iter: T) -> Self {
        let mut assignment = Assignment::default();
        iter.into_iter().for_each(|l| assignment.assign_lit(l));
        assignment
    }
}

impl From<Vec<TernaryVal>> for Assignment {
    fn from(assignment: Vec<TernaryVal>) -> Self {
        Self { assignment }
    }
}

/// Errors related to types
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum TypeError {
    /// The requested index is too high.
    /// Contains the requested and the maximum index.
    #[error("index {0} is too high (maximum {1})")]
    IdxTooHigh(u32, u32),
    /// Zero is not a variable index and not a literal
    #[error("zero is an invalid variable index or literal")]
    IdxZero,
}
