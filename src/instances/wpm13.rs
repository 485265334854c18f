//! # 1,3-WPM Normalization
//!
//! Rewrites arbitrary weighted CNF formulas into 1,3-WPM form, where every
//! soft clause is a unit and every hard clause has exactly three literals.
//! The rewriting preserves the optimal cost but introduces auxiliary
//! variables, which are allocated after the variables of the input formula.

use crate::types::{Clause, Lit};

use super::Formula;

impl Formula {
    /// Converts the formula into an equi-optimal formula in 1,3-WPM form.
    ///
    /// The result reuses the variables of `self` and only appends auxiliary
    /// variables. `self` is not modified.
    ///
    /// # Example
    ///
    /// ```
    /// use wcnf13::{clause, instances::Formula};
    ///
    /// let mut formula = Formula::new();
    /// formula.extend_vars(2).unwrap();
    /// formula.add_clause(clause![1, 2], 0).unwrap();
    /// formula.add_clause(clause![-1, -2], 4).unwrap();
    ///
    /// let normalized = formula.to_wpm13();
    /// assert!(normalized.is_wpm13(true));
    /// assert_eq!(normalized.n_vars(), 3);
    /// ```
    #[must_use]
    pub fn to_wpm13(&self) -> Formula {
        hard_to_ternary(&soft_to_unit(self))
    }
}

/// Makes every soft clause a unit clause.
///
/// A soft clause `L` with weight `w` that is not a unit is reified with a
/// fresh variable `r`: the hard clause `L | r` and the soft unit `-r` with
/// weight `w` are added instead. The original hard clauses are appended
/// unchanged after the reified ones.
#[must_use]
pub fn soft_to_unit(formula: &Formula) -> Formula {
    let mut out = empty_with_vars_of(formula);
    for (weight, cl) in &formula.soft {
        if cl.len() == 1 {
            out.push_soft(*weight, cl.clone());
            continue;
        }
        let reif = out.new_var();
        out.push_soft(*weight, Clause::from([reif.neg_lit()]));
        let mut hard = Clause::with_capacity(cl.len() + 1);
        hard.extend(cl.iter().copied());
        hard.add(reif.pos_lit());
        out.hard.push(hard);
    }
    out.hard.extend(formula.hard.iter().cloned());
    log::debug!(
        "reified {} soft clauses",
        out.n_vars() - formula.n_vars()
    );
    out
}

/// Makes every hard clause have exactly three literals.
///
/// Shorter clauses are padded by repeating their first literal. Longer
/// clauses `l1 | ... | lk` are split into `l1 | l2 | y` and the remainder
/// `-y | l3 | ... | lk`, which is split further until it fits. Soft clauses
/// are copied unchanged.
#[must_use]
pub fn hard_to_ternary(formula: &Formula) -> Formula {
    let mut out = empty_with_vars_of(formula);
    out.soft.clone_from(&formula.soft);
    out.sum_soft_weights = formula.sum_soft_weights;
    for cl in &formula.hard {
        split_hard(&mut out, cl);
    }
    log::debug!(
        "split {} hard clauses into {} ternary clauses using {} auxiliary variables",
        formula.n_hard(),
        out.n_hard(),
        out.n_vars() - formula.n_vars()
    );
    out
}

fn empty_with_vars_of(formula: &Formula) -> Formula {
    Formula {
        n_vars: formula.n_vars,
        header: formula.header.clone(),
        ..Formula::default()
    }
}

/// Adds the ternary clauses equivalent to `clause` to `out`
fn split_hard(out: &mut Formula, clause: &[Lit]) {
    let Some((&first, tail)) = clause.split_first() else {
        // empty clause, keep the formula unsatisfiable
        let x = out.new_var();
        out.hard.push(Clause::from([x.pos_lit(); 3]));
        out.hard.push(Clause::from([x.neg_lit(); 3]));
        return;
    };
    // the clause still to split is `head | rest`
    let mut head = first;
    let mut rest = tail;
    while rest.len() > 2 {
        let y = out.new_var();
        out.hard.push(Clause::from([head, rest[0], y.pos_lit()]));
        head = y.neg_lit();
        rest = &rest[1..];
    }
    let mut cl = Clause::with_capacity(3);
    cl.add(head);
    cl.extend(rest.iter().copied());
    while cl.len() < 3 {
        cl.add(head);
    }
    out.hard.push(cl);
}

impl Formula {
    /// Appends a soft clause without checking it, for clauses built from
    /// already validated literals
    fn push_soft(&mut self, weight: usize, clause: Clause) {
        self.soft.push((weight, clause));
        self.sum_soft_weights += weight;
    }
}
