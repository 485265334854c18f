//! # Solver Interface for External Executables
//!
//! Calls a MaxSAT solver executable on a [`Formula`] written in weighted
//! DIMACS format and parses the solver output in MaxSAT Evaluation format.

use std::{
    fs, io,
    path::{Path, PathBuf},
    process::{self, Command},
};

use anyhow::Context;

use crate::instances::{
    fio::{self, SolverOutput},
    Formula,
};

/// Specifies what argument position the instance is passed to the solver at
///
/// Most solvers expect the instance as the last argument
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum InstanceArg {
    /// Pass the instance file path as the first solver argument
    First,
    /// Pass the instance file path as the last argument
    #[default]
    Last,
}

/// Options for how the input formula should be passed to the external solver
#[derive(Debug, Clone)]
pub struct InputVia(InputViaInt);

#[derive(Debug, Clone)]
enum InputViaInt {
    /// Passes the formula by writing it to a file at the specified path
    ///
    /// The file will _not_ be removed afterwards
    File(PathBuf, InstanceArg),
    /// Passes the formula by writing it to a temporary file that will automatically be removed
    TempFile(InstanceArg),
    /// Passes the formula through a pipe to `stdin`
    ///
    /// Note, not all solvers support reading input from `stdin`
    Pipe,
}

impl InputVia {
    /// Pass the input via a persistent file at `path`, passed to the solver as the last argument
    #[must_use]
    pub fn file_last<P: AsRef<Path>>(path: P) -> Self {
        InputVia(InputViaInt::File(
            path.as_ref().to_path_buf(),
            InstanceArg::Last,
        ))
    }

    /// Pass the input via a persistent file at `path`, passed to the solver as the first argument
    #[must_use]
    pub fn file_first<P: AsRef<Path>>(path: P) -> Self {
        InputVia(InputViaInt::File(
            path.as_ref().to_path_buf(),
            InstanceArg::First,
        ))
    }

    /// Pass the input via a temporary file, passed to the solver as the last argument
    #[must_use]
    pub fn tempfile_last() -> Self {
        InputVia(InputViaInt::TempFile(InstanceArg::Last))
    }

    /// Pass the input via a temporary file, passed to the solver as the first argument
    #[must_use]
    pub fn tempfile_first() -> Self {
        InputVia(InputViaInt::TempFile(InstanceArg::First))
    }

    /// Pass the input via a pipe to `<stdin>`
    #[must_use]
    pub fn pipe() -> Self {
        InputVia(InputViaInt::Pipe)
    }
}

impl Default for InputVia {
    fn default() -> Self {
        InputVia(InputViaInt::TempFile(InstanceArg::default()))
    }
}

/// Options for how the output of the solver is read
#[derive(Debug, Clone, Default)]
pub struct OutputVia(OutputViaInt);

#[derive(Debug, Clone, Default)]
enum OutputViaInt {
    /// The solver output is written to a file at the given path that is not automatically deleted
    File(PathBuf),
    /// The solver output is read directly through a pipe
    #[default]
    Pipe,
}

impl OutputVia {
    /// Process the solver output via a persistent file at `path`
    #[must_use]
    pub fn file<P: AsRef<Path>>(path: P) -> Self {
        OutputVia(OutputViaInt::File(path.as_ref().to_path_buf()))
    }

    /// Process the solver output via a pipe from `<stdout>`
    #[must_use]
    pub fn pipe() -> Self {
        OutputVia(OutputViaInt::Pipe)
    }
}

/// A MaxSAT solver called via an external executable
///
/// This solver will perform a call to the solver executable via [`Command`] and parse the solver
/// output via [`fio::parse_maxsat_solver_output`]. The reported assignment is not checked
/// against the formula, use [`Formula::cost`] for that.
#[derive(Debug)]
pub struct Solver {
    signature: &'static str,
    cmd: Command,
    input: InputVia,
    output: OutputVia,
}

impl Solver {
    /// Initializes a solver with a [`Command`] that is fully set up, except for the input formula
    ///
    /// # Notes
    ///
    /// - If input is passed via a file with a path that ends in a compression extension, a
    ///     compressed file is written (feature `compression`)
    /// - If the solver output is processed via a file, compression is _not_ supported
    ///
    /// # Example
    ///
    /// ```
    /// use std::process::Command;
    /// use wcnf13::solvers::external;
    /// let solver = external::Solver::new(
    ///     Command::new("<path to solver binary>"),
    ///     external::InputVia::tempfile_last(),
    ///     external::OutputVia::pipe(),
    ///     "solver-signature",
    /// );
    /// ```
    #[must_use]
    pub fn new(cmd: Command, input: InputVia, output: OutputVia, signature: &'static str) -> Self {
        Solver {
            signature,
            cmd,
            input,
            output,
        }
    }

    /// Initializes a solver with default values for [`InputVia`] and [`OutputVia`]
    ///
    /// The default values are passing the input via a temporary file and processing the output via
    /// a pipe.
    #[must_use]
    pub fn new_default(cmd: Command, signature: &'static str) -> Self {
        Solver::new(cmd, InputVia::default(), OutputVia::default(), signature)
    }

    /// Gets the signature of the solver
    #[must_use]
    pub fn signature(&self) -> &'static str {
        self.signature
    }

    /// Runs the solver on a formula. The solver command is consumed.
    ///
    /// # Errors
    ///
    /// If writing the formula, running the solver or parsing its output
    /// fails, or if the solver exits with a code other than 0, 10, 20 or 30.
    pub fn solve(self, formula: &Formula) -> anyhow::Result<SolverOutput> {
        let signature = self.signature;
        log::debug!(
            "calling {signature} on formula with {} variables and {} clauses",
            formula.n_vars(),
            formula.n_clauses()
        );
        call_external(self, formula).with_context(|| format!("solver {signature} failed"))
    }
}

macro_rules! check_exit_code {
    ($status:expr) => {
        match $status.code() {
            // expected return codes of MaxSAT solvers, not checked against the output
            Some(0 | 10 | 20 | 30) => (),
            Some(x) => anyhow::bail!("solver returned unexpected code {x}"),
            None => anyhow::bail!("solver process terminated by signal"),
        };
    };
}

fn call_external(solver: Solver, formula: &Formula) -> anyhow::Result<SolverOutput> {
    // when writing to a temporary file, this needs to be explicitly closed at the end
    let mut temppath = None;
    // build the final command
    let mut cmd = match solver.input.0 {
        InputViaInt::File(in_path, argpos) => {
            formula.write_dimacs_path(&in_path)?;
            construct_command_path(solver.cmd, in_path, argpos)
        }
        InputViaInt::TempFile(argpos) => {
            let mut writer = io::BufWriter::new(tempfile::NamedTempFile::new()?);
            formula.write_dimacs(&mut writer)?;
            let path = writer.into_inner()?.into_temp_path();
            let cmd = construct_command_path(solver.cmd, path.to_path_buf(), argpos);
            temppath = Some(path);
            cmd
        }
        InputViaInt::Pipe => {
            let mut cmd = solver.cmd;
            cmd.stdin(process::Stdio::piped());
            return match solver.output.0 {
                OutputViaInt::File(path) => {
                    // NOTE: this currently does not support compression
                    let mut child = cmd.stdout(fs::File::create(&path)?).spawn()?;
                    let mut stdin = io::BufWriter::new(
                        child.stdin.take().context("solver stdin not captured")?,
                    );
                    formula.write_dimacs(&mut stdin)?;
                    drop(stdin);
                    let exit = child.wait()?;
                    let output = fio::parse_maxsat_solver_output(io::BufReader::new(
                        fs::File::open(&path)?,
                    ))?;
                    check_exit_code!(exit);
                    Ok(output)
                }
                OutputViaInt::Pipe => {
                    let mut child = cmd.stdout(process::Stdio::piped()).spawn()?;
                    let mut stdin = io::BufWriter::new(
                        child.stdin.take().context("solver stdin not captured")?,
                    );
                    let mut stdout = io::BufReader::new(
                        child.stdout.take().context("solver stdout not captured")?,
                    );
                    // second thread for processing stdout to avoid blocking
                    let output_handle = std::thread::spawn(
                        move || -> anyhow::Result<(SolverOutput, io::BufReader<process::ChildStdout>)> {
                            // stdout is passed back to keep it open until the solver terminates
                            let output = fio::parse_maxsat_solver_output(&mut stdout)?;
                            Ok((output, stdout))
                        },
                    );
                    formula.write_dimacs(&mut stdin)?;
                    drop(stdin);
                    let exit = child.wait()?;
                    let (output, stdout) = output_handle
                        .join()
                        .map_err(|_| anyhow::anyhow!("output parsing thread panicked"))??;
                    drop(stdout);
                    check_exit_code!(exit);
                    Ok(output)
                }
            };
        }
    };
    // case input pipe handled above
    let output = match solver.output.0 {
        OutputViaInt::File(path) => {
            // NOTE: this currently does not support compression
            cmd.stdout(fs::File::create(&path)?);
            let exit = cmd.status()?;
            let output =
                fio::parse_maxsat_solver_output(io::BufReader::new(fs::File::open(&path)?))?;
            check_exit_code!(exit);
            output
        }
        OutputViaInt::Pipe => {
            let mut child = cmd.stdout(process::Stdio::piped()).spawn()?;
            let mut stdout =
                io::BufReader::new(child.stdout.take().context("solver stdout not captured")?);
            let output = fio::parse_maxsat_solver_output(&mut stdout)?;
            check_exit_code!(child.wait()?);
            // keep pipe open till after child has terminated
            drop(stdout);
            output
        }
    };
    if let Some(temppath) = temppath {
        temppath.close()?;
    }
    Ok(output)
}

fn construct_command_path(mut cmd: Command, path: PathBuf, argpos: InstanceArg) -> Command {
    match argpos {
        InstanceArg::First => {
            // reconstruct command with argument at the beginning
            let mut new_cmd = Command::new(cmd.get_program());
            new_cmd.arg(path).args(cmd.get_args());
            for (key, val) in cmd.get_envs() {
                if let Some(val) = val {
                    new_cmd.env(key, val);
                } else {
                    new_cmd.env_remove(key);
                }
            }
            if let Some(dir) = cmd.get_current_dir() {
                new_cmd.current_dir(dir);
            }
            new_cmd
        }
        InstanceArg::Last => {
            cmd.arg(path);
            cmd
        }
    }
}
