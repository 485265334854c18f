//! # DIMACS Formula Parsing and Writing
//!
//! Parses DIMACS CNF (`p cnf`) and weighted DIMACS (`p wcnf`) formulas and
//! writes formulas in weighted DIMACS format.
//!
//! The parser is line based. A clause line may contain multiple clauses, each
//! terminated by `0`, and the last clause on a line may omit its terminating
//! `0`. A clause never spans multiple lines. Variables are allocated on
//! demand, up to the highest variable referenced so far.
//!
//! ## References
//!
//! - [DIMACS CNF](http://www.satcompetition.org/2011/format-benchmarks2011.html)
//! - [DIMACS WCNF pre22](https://maxsat-evaluations.github.io/2017/rules.html#input)

use std::io::{self, BufRead, Write};

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{i64, multispace0, multispace1, u64},
    combinator::all_consuming,
    multi::separated_list0,
    sequence::{delimited, terminated, tuple},
    IResult,
};
use thiserror::Error;

use crate::{
    instances::{self, Formula, TOP_WEIGHT},
    types::{Clause, Lit, Var},
};

/// Options for parsing DIMACS formulas
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Fail if the number of variables or clauses in the formula differs
    /// from what the preamble declares
    pub strict: bool,
}

impl Options {
    /// Options for a strict parse
    #[must_use]
    pub fn strict() -> Self {
        Options { strict: true }
    }
}

/// Errors in DIMACS input. Line numbers are 1-based.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum Error {
    #[error("line {line}: invalid preamble `{content}`")]
    InvalidPreamble { line: usize, content: String },
    #[error("line {line}: invalid formula type `{kind}`")]
    UnknownFormat { line: usize, kind: String },
    #[error("line {line}: duplicate preamble")]
    DuplicatePreamble { line: usize },
    #[error("line {line}: clause found before preamble")]
    ClauseBeforePreamble { line: usize },
    #[error("line {line}: clause without literals")]
    EmptyClause { line: usize },
    #[error("line {line}: invalid clause `{content}`")]
    InvalidClause { line: usize, content: String },
    #[error("line {line}: invalid weight {weight}")]
    InvalidWeight { line: usize, weight: i64 },
    #[error("no preamble found")]
    MissingPreamble,
    #[error("incorrect number of variables (preamble: {declared}, found: {found})")]
    VarCountMismatch { declared: u64, found: u32 },
    #[error("incorrect number of clauses (preamble: {declared}, found: {found})")]
    ClauseCountMismatch { declared: u64, found: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Preamble {
    Cnf { n_vars: u64, n_clauses: u64 },
    Wcnf { n_vars: u64, n_clauses: u64, top: u64 },
}

impl Preamble {
    fn n_vars(self) -> u64 {
        match self {
            Preamble::Cnf { n_vars, .. } | Preamble::Wcnf { n_vars, .. } => n_vars,
        }
    }

    fn n_clauses(self) -> u64 {
        match self {
            Preamble::Cnf { n_clauses, .. } | Preamble::Wcnf { n_clauses, .. } => n_clauses,
        }
    }
}

/// Parses a CNF or WCNF formula from a reader
///
/// # Errors
///
/// [`instances::Error::Format`] if the input is malformed,
/// [`instances::Error::Io`] if reading fails.
pub fn parse_wcnf<R: BufRead>(reader: R, opts: Options) -> Result<Formula, instances::Error> {
    let mut formula = Formula::new();
    let mut preamble = None;
    let mut warned_extension = false;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('c') {
            continue;
        }
        if line.split_whitespace().next() == Some("p") {
            if preamble.is_some() {
                return Err(Error::DuplicatePreamble { line: line_no }.into());
            }
            preamble = Some(preamble_from_line(line, line_no)?);
            continue;
        }
        let Some(pre) = preamble else {
            return Err(Error::ClauseBeforePreamble { line: line_no }.into());
        };
        let values = match parse_values(line) {
            Ok((_, values)) => values,
            Err(_) => {
                return Err(Error::InvalidClause {
                    line: line_no,
                    content: line.to_string(),
                }
                .into())
            }
        };
        for run in split_runs(&values) {
            let (weight, clause) = clause_from_run(run, pre, line, line_no)?;
            if let Some(max_var) = clause.max_var() {
                if max_var.idx32() > formula.n_vars() {
                    if !warned_extension && u64::from(max_var.idx32()) > pre.n_vars() {
                        log::warn!(
                            "line {line_no}: variable {max_var} exceeds the {} variables declared in the preamble",
                            pre.n_vars()
                        );
                        warned_extension = true;
                    }
                    formula.extend_vars(max_var.idx32() - formula.n_vars())?;
                }
            }
            formula.add_clause(clause, weight)?;
        }
    }

    let Some(pre) = preamble else {
        if opts.strict {
            return Err(Error::MissingPreamble.into());
        }
        log::warn!("no preamble found, returning empty formula");
        return Ok(formula);
    };
    check_counts(&mut formula, pre, opts)?;
    log::debug!(
        "parsed formula with {} variables, {} hard and {} soft clauses",
        formula.n_vars(),
        formula.n_hard(),
        formula.n_soft()
    );
    Ok(formula)
}

fn preamble_from_line(line: &str, line_no: usize) -> Result<Preamble, Error> {
    match parse_p_line(line) {
        Ok((_, pre)) => Ok(pre),
        Err(_) => match line.split_whitespace().nth(1) {
            Some(kind) if kind != "cnf" && kind != "wcnf" => Err(Error::UnknownFormat {
                line: line_no,
                kind: kind.to_string(),
            }),
            _ => Err(Error::InvalidPreamble {
                line: line_no,
                content: line.to_string(),
            }),
        },
    }
}

/// Compares the parsed formula to its preamble. Non-strict parses reserve
/// declared but unused variables.
fn check_counts(formula: &mut Formula, pre: Preamble, opts: Options) -> Result<(), Error> {
    let found_vars = formula.n_vars();
    let found_clauses = formula.n_clauses();
    if u64::from(found_vars) != pre.n_vars() {
        if opts.strict {
            return Err(Error::VarCountMismatch {
                declared: pre.n_vars(),
                found: found_vars,
            });
        }
        log::warn!(
            "incorrect number of variables (preamble: {}, found: {found_vars})",
            pre.n_vars()
        );
        if let Ok(declared) = u32::try_from(pre.n_vars()) {
            if declared > found_vars && formula.extend_vars(declared - found_vars).is_err() {
                log::warn!("cannot reserve {declared} variables");
            }
        }
    }
    if found_clauses as u64 != pre.n_clauses() {
        if opts.strict {
            return Err(Error::ClauseCountMismatch {
                declared: pre.n_clauses(),
                found: found_clauses,
            });
        }
        log::warn!(
            "incorrect number of clauses (preamble: {}, found: {found_clauses})",
            pre.n_clauses()
        );
    }
    Ok(())
}

/// Splits the values of a clause line into runs terminated by `0`. A
/// trailing `0` does not start a new run.
fn split_runs(values: &[i64]) -> Vec<&[i64]> {
    let mut runs: Vec<&[i64]> = values.split(|&val| val == 0).collect();
    if runs.last().is_some_and(|run| run.is_empty()) {
        runs.pop();
    }
    runs
}

fn clause_from_run(
    run: &[i64],
    pre: Preamble,
    line: &str,
    line_no: usize,
) -> Result<(usize, Clause), Error> {
    let (weight, lits) = match pre {
        Preamble::Cnf { .. } => (1, run),
        Preamble::Wcnf { top, .. } => {
            let Some((&weight, lits)) = run.split_first() else {
                return Err(Error::EmptyClause { line: line_no });
            };
            let invalid = || Error::InvalidWeight {
                line: line_no,
                weight,
            };
            let weight = u64::try_from(weight).map_err(|_| invalid())?;
            let weight = if weight == top {
                TOP_WEIGHT
            } else {
                usize::try_from(weight).map_err(|_| invalid())?
            };
            (weight, lits)
        }
    };
    if lits.is_empty() {
        return Err(Error::EmptyClause { line: line_no });
    }
    let clause = lits
        .iter()
        .map(|&val| match i32::try_from(val) {
            Ok(val) if val.unsigned_abs() <= Var::MAX_IDX => Ok(Lit::new(val)),
            _ => Err(Error::InvalidClause {
                line: line_no,
                content: line.to_string(),
            }),
        })
        .collect::<Result<Clause, Error>>()?;
    Ok((weight, clause))
}

/// Parses p line and determines the file format
fn parse_p_line(input: &str) -> IResult<&str, Preamble> {
    let (input, _) = terminated(tag("p"), multispace1)(input)?;
    let (input, kind) = terminated(alt((tag("wcnf"), tag("cnf"))), multispace1)(input)?;
    if kind == "cnf" {
        let (input, (n_vars, _, n_clauses)) =
            all_consuming(terminated(tuple((u64, multispace1, u64)), multispace0))(input)?;
        return Ok((input, Preamble::Cnf { n_vars, n_clauses }));
    }
    let (input, (n_vars, _, n_clauses, _, top)) = all_consuming(terminated(
        tuple((u64, multispace1, u64, multispace1, u64)),
        multispace0,
    ))(input)?;
    Ok((
        input,
        Preamble::Wcnf {
            n_vars,
            n_clauses,
            top,
        },
    ))
}

/// Parses all integer values of a clause line
fn parse_values(input: &str) -> IResult<&str, Vec<i64>> {
    all_consuming(delimited(
        multispace0,
        separated_list0(multispace1, i64),
        multispace0,
    ))(input)
}

/// Writes a formula in weighted DIMACS format, with comments introducing the
/// hard and soft clauses
///
/// # Errors
///
/// If writing fails, returns [`io::Error`].
pub fn write_wcnf_annotated<W: Write>(writer: &mut W, formula: &Formula) -> Result<(), io::Error> {
    for line in formula.header() {
        writeln!(writer, "c {line}")?;
    }
    let top = formula.top_weight();
    writeln!(
        writer,
        "p wcnf {} {} {}",
        formula.n_vars(),
        formula.n_clauses(),
        top
    )?;
    writeln!(writer, "c ===== Hard Clauses =====")?;
    formula
        .iter_hard()
        .try_for_each(|cl| write_clause(writer, top, cl))?;
    writeln!(
        writer,
        "c ===== Soft Clauses (Sum weights: {}) =====",
        formula.sum_soft_weights()
    )?;
    formula
        .iter_soft()
        .try_for_each(|(w, cl)| write_clause(writer, w, cl))?;
    writer.flush()
}

/// Writes a single weighted clause terminated by `0`
fn write_clause<W: Write>(writer: &mut W, weight: usize, clause: &Clause) -> Result<(), io::Error> {
    write!(writer, "{weight} ")?;
    clause.iter().try_for_each(|l| write!(writer, "{l} "))?;
    writeln!(writer, "0")
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{parse_p_line, parse_values, parse_wcnf, split_runs, Error, Options, Preamble};
    use crate::{
        clause,
        instances::{self, Formula, TOP_WEIGHT},
    };

    fn parse(data: &str, opts: Options) -> Result<Formula, instances::Error> {
        parse_wcnf(Cursor::new(data), opts)
    }

    fn format_err(data: &str, opts: Options) -> Error {
        match parse(data, opts) {
            Err(instances::Error::Format(err)) => err,
            res => panic!("expected format error, got {res:?}"),
        }
    }

    #[test]
    fn parse_p_line_pass() {
        assert_eq!(
            parse_p_line("p cnf 23 42"),
            Ok((
                "",
                Preamble::Cnf {
                    n_vars: 23,
                    n_clauses: 42
                }
            ))
        );
        assert_eq!(
            parse_p_line("p  wcnf 23 42 52 "),
            Ok((
                "",
                Preamble::Wcnf {
                    n_vars: 23,
                    n_clauses: 42,
                    top: 52
                }
            ))
        );
    }

    #[test]
    fn parse_p_line_fail() {
        assert!(parse_p_line("p cnf 23").is_err());
        assert!(parse_p_line("p cnf 23 42 52").is_err());
        assert!(parse_p_line("p wcnf 23 42").is_err());
        assert!(parse_p_line("p abc 23 42").is_err());
        assert!(parse_p_line("p cnf -1 2").is_err());
    }

    #[test]
    fn parse_values_pass() {
        assert_eq!(parse_values(" 1 -2 0 3 0 "), Ok(("", vec![1, -2, 0, 3, 0])));
        assert_eq!(parse_values("5\t-5"), Ok(("", vec![5, -5])));
        assert!(parse_values("1 x 0").is_err());
        assert!(parse_values("1 2.5 0").is_err());
    }

    #[test]
    fn split_runs_on_zero() {
        assert_eq!(split_runs(&[1, -2, 0, 3, 0]), vec![&[1, -2][..], &[3][..]]);
        assert_eq!(split_runs(&[1, 2]), vec![&[1, 2][..]]);
        assert_eq!(split_runs(&[1, 0, 0]), vec![&[1][..], &[][..]]);
        assert_eq!(split_runs(&[0]), vec![&[][..]]);
    }

    #[test]
    fn parse_cnf() {
        let data = "c a comment\np cnf 3 2\n1 -2 0\n\n-3 2 0\n";
        let formula = parse(data, Options::strict()).unwrap();
        assert_eq!(formula.n_vars(), 3);
        assert_eq!(formula.n_hard(), 0);
        assert_eq!(
            formula.iter_soft().collect::<Vec<_>>(),
            vec![(1, &clause![1, -2]), (1, &clause![-3, 2])]
        );
    }

    #[test]
    fn parse_wcnf_top_is_hard() {
        let data = "p wcnf 2 3 10\n10 1 2 0\n3 -1 0\n10 -2 0\n";
        let formula = parse(data, Options::strict()).unwrap();
        assert_eq!(
            formula.iter_hard().collect::<Vec<_>>(),
            vec![&clause![1, 2], &clause![-2]]
        );
        assert_eq!(formula.iter_soft().collect::<Vec<_>>(), vec![(3, &clause![-1])]);
        assert_eq!(formula.top_weight(), 4);
    }

    #[test]
    fn parse_multiple_clauses_per_line() {
        let data = "p wcnf 3 3 9\n9 1 2 0 4 -3 0 2 3\n";
        let formula = parse(data, Options::strict()).unwrap();
        assert_eq!(formula.n_hard(), 1);
        assert_eq!(
            formula.iter_soft().collect::<Vec<_>>(),
            vec![(4, &clause![-3]), (2, &clause![3])]
        );
    }

    #[test]
    fn zero_weight_terminates_run() {
        assert!(matches!(
            format_err("p wcnf 1 1 5\n0 1 0\n", Options::strict()),
            Error::EmptyClause { line: 2 }
        ));
    }

    #[test]
    fn extends_undercounted_preamble() {
        let data = "p cnf 1 1\n1 -4 0\n";
        let formula = parse(data, Options::default()).unwrap();
        assert_eq!(formula.n_vars(), 4);
        assert_eq!(
            format_err(data, Options::strict()),
            Error::VarCountMismatch {
                declared: 1,
                found: 4
            }
        );
    }

    #[test]
    fn reserves_unused_declared_vars() {
        let formula = parse("p cnf 5 1\n1 -2 0\n", Options::default()).unwrap();
        assert_eq!(formula.n_vars(), 5);
        assert_eq!(
            format_err("p cnf 5 1\n1 -2 0\n", Options::strict()),
            Error::VarCountMismatch {
                declared: 5,
                found: 2
            }
        );
    }

    #[test]
    fn clause_count_mismatch() {
        let data = "p cnf 2 3\n1 -2 0\n";
        assert_eq!(parse(data, Options::default()).unwrap().n_clauses(), 1);
        assert_eq!(
            format_err(data, Options::strict()),
            Error::ClauseCountMismatch {
                declared: 3,
                found: 1
            }
        );
    }

    #[test]
    fn preamble_errors() {
        assert_eq!(
            format_err("p cnf 2\n", Options::default()),
            Error::InvalidPreamble {
                line: 1,
                content: String::from("p cnf 2")
            }
        );
        assert_eq!(
            format_err("c x\np mcnf 2 2\n", Options::default()),
            Error::UnknownFormat {
                line: 2,
                kind: String::from("mcnf")
            }
        );
        assert_eq!(
            format_err("p cnf 2 1\np cnf 2 1\n1 0\n", Options::default()),
            Error::DuplicatePreamble { line: 2 }
        );
        assert_eq!(
            format_err("1 2 0\np cnf 2 1\n", Options::default()),
            Error::ClauseBeforePreamble { line: 1 }
        );
        assert_eq!(format_err("c x\n", Options::strict()), Error::MissingPreamble);
        assert_eq!(parse("c x\n", Options::default()).unwrap(), Formula::new());
    }

    #[test]
    fn clause_errors() {
        assert_eq!(
            format_err("p cnf 2 2\n1 0 0\n", Options::default()),
            Error::EmptyClause { line: 2 }
        );
        assert_eq!(
            format_err("p cnf 2 1\n0\n", Options::default()),
            Error::EmptyClause { line: 2 }
        );
        assert_eq!(
            format_err("p wcnf 2 1 5\n3 0\n", Options::default()),
            Error::EmptyClause { line: 2 }
        );
        assert_eq!(
            format_err("p wcnf 2 1 5\n-3 1 0\n", Options::default()),
            Error::InvalidWeight { line: 2, weight: -3 }
        );
        assert_eq!(
            format_err("p cnf 2 1\n1 a 0\n", Options::default()),
            Error::InvalidClause {
                line: 2,
                content: String::from("1 a 0")
            }
        );
        assert_eq!(
            format_err("p cnf 2 1\n1 3000000000 0\n", Options::default()),
            Error::InvalidClause {
                line: 2,
                content: String::from("1 3000000000 0")
            }
        );
    }

    #[test]
    fn write_annotated() {
        let mut formula = Formula::new();
        formula.extend_vars(2).unwrap();
        formula.add_comment("two vertices");
        formula.add_clause(clause![1, 2], TOP_WEIGHT).unwrap();
        formula.add_clause(clause![-1], 1).unwrap();
        formula.add_clause(clause![-2], 1).unwrap();
        let mut buf = Vec::new();
        super::write_wcnf_annotated(&mut buf, &formula).unwrap();
        let expected = "c two vertices\n\
            p wcnf 2 3 3\n\
            c ===== Hard Clauses =====\n\
            3 1 2 0\n\
            c ===== Soft Clauses (Sum weights: 2) =====\n\
            1 -1 0\n\
            1 -2 0\n";
        assert_eq!(String::from_utf8(buf).unwrap(), expected);
        assert_eq!(formula.to_string(), expected);
    }

    #[test]
    fn write_empty_clause() {
        let mut formula = Formula::new();
        formula.add_clause(clause![], 5).unwrap();
        let mut buf = Vec::new();
        super::write_wcnf_annotated(&mut buf, &formula).unwrap();
        assert!(String::from_utf8(buf).unwrap().ends_with("\n5 0\n"));
    }
}
