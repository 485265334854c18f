//! # `wpm13-check`
//!
//! A small tool for checking that 1,3-WPM normalization preserves the optimal
//! cost. Every instance in a directory is solved in its original and its
//! normalized form with an external MaxSAT solver and the costs are compared.

use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::Context;
use clap::Parser;
use wcnf13::{
    instances::{fio::dimacs::Options, Formula},
    solvers::external::{InputVia, OutputVia, Solver},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The MaxSAT solver executable. The instance is passed as its last argument.
    solver: PathBuf,
    /// The directory containing `.cnf` and `.wcnf` instances
    dir: PathBuf,
    /// Additional arguments passed to the solver before the instance
    #[arg(long, allow_hyphen_values = true)]
    solver_args: Vec<String>,
    /// Pass the instance to the solver on `stdin` instead of a temporary file
    #[arg(long)]
    pipe: bool,
    /// The log level
    #[arg(long, default_value_t = log::LevelFilter::Warn)]
    logging: log::LevelFilter,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    pretty_env_logger::formatted_builder()
        .filter_level(args.logging)
        .init();

    let mut instances = fs::read_dir(&args.dir)
        .with_context(|| format!("cannot read directory {}", args.dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    instances.retain(|path| is_instance(path));
    instances.sort();

    let mut n_mismatches = 0;
    for path in &instances {
        let formula = Formula::from_dimacs_path(path, Options::default())
            .with_context(|| format!("error parsing {}", path.display()))?;
        let normalized = formula.to_wpm13();
        let orig_cost = solve(&args, &formula)?;
        let norm_cost = solve(&args, &normalized)?;
        if orig_cost == norm_cost {
            log::info!("{}: cost {orig_cost:?}", path.display());
        } else {
            println!(
                "{}: cost mismatch (original: {orig_cost:?}, normalized: {norm_cost:?})",
                path.display()
            );
            n_mismatches += 1;
        }
    }

    println!(
        "checked {} instances, {n_mismatches} mismatches",
        instances.len()
    );
    if n_mismatches > 0 {
        anyhow::bail!("normalization changed the optimal cost of {n_mismatches} instances");
    }
    Ok(())
}

fn is_instance(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    let name = name
        .trim_end_matches(".gz")
        .trim_end_matches(".bz2")
        .trim_end_matches(".xz");
    path.is_file() && (name.ends_with(".cnf") || name.ends_with(".wcnf"))
}

fn solve(args: &Args, formula: &Formula) -> anyhow::Result<Option<usize>> {
    let mut cmd = Command::new(&args.solver);
    cmd.args(&args.solver_args);
    let input = if args.pipe {
        InputVia::pipe()
    } else {
        InputVia::tempfile_last()
    };
    let output = Solver::new(cmd, input, OutputVia::pipe(), "external").solve(formula)?;
    Ok(output.cost())
}
