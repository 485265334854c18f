//! # `wcnf2wpm13`
//!
//! A small tool for converting DIMACS (W)CNF files to 1,3-WPM form.

use anyhow::Context;
use clap::Parser;
use std::{io, path::PathBuf};
use wcnf13::instances::{fio::dimacs::Options, Formula};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The DIMACS (W)CNF input file. Reads from `stdin` if `-`.
    in_path: PathBuf,
    /// The output path. Writes to `stdout` if not given.
    out_path: Option<PathBuf>,
    /// Accept inputs whose variable and clause counts differ from the preamble
    #[arg(long)]
    lenient: bool,
    /// The log level
    #[arg(long, default_value_t = log::LevelFilter::Warn)]
    logging: log::LevelFilter,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    pretty_env_logger::formatted_builder()
        .filter_level(args.logging)
        .init();

    let opts = Options {
        strict: !args.lenient,
    };
    let formula = if args.in_path.as_os_str() == "-" {
        Formula::from_dimacs(&mut io::BufReader::new(io::stdin()), opts)
            .context("error parsing input")?
    } else {
        Formula::from_dimacs_path(&args.in_path, opts)
            .with_context(|| format!("error parsing {}", args.in_path.display()))?
    };

    let normalized = formula.to_wpm13();
    let is_wpm13 = normalized.is_wpm13(true);
    log::info!(
        "normalized formula: {} variables ({} auxiliary), {} hard and {} soft clauses",
        normalized.n_vars(),
        normalized.n_vars() - formula.n_vars(),
        normalized.n_hard(),
        normalized.n_soft()
    );

    if let Some(out_path) = args.out_path {
        normalized
            .write_dimacs_path(&out_path)
            .context("error writing the output file")?;
        println!("Is formula in 1-3 WPMS: {is_wpm13}");
        println!("- New 1-3 WPMS formula written to {}", out_path.display());
    } else {
        eprintln!("Is formula in 1-3 WPMS: {is_wpm13}");
        normalized
            .write_dimacs(&mut io::BufWriter::new(io::stdout()))
            .context("io error writing to stdout")?;
    }
    Ok(())
}
