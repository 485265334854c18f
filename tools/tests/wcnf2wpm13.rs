use std::process::Command;

use wcnf13::instances::{fio::dimacs::Options, Formula};

fn data_path(name: &str) -> String {
    let manifest = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    format!("{manifest}/../data/{name}")
}

#[test]
fn converts_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("mixed-13.wcnf");
    let output = Command::new(env!("CARGO_BIN_EXE_wcnf2wpm13"))
        .arg(data_path("mixed.wcnf"))
        .arg(&out_path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Is formula in 1-3 WPMS: true"));

    let converted = Formula::from_dimacs_path(&out_path, Options::strict()).unwrap();
    assert!(converted.is_wpm13(true));
    assert_eq!(converted.n_vars(), 13);
}

#[test]
fn converts_to_stdout() {
    let output = Command::new(env!("CARGO_BIN_EXE_wcnf2wpm13"))
        .arg(data_path("small.cnf"))
        .output()
        .unwrap();
    assert!(output.status.success());
    let converted = Formula::from_dimacs(&mut output.stdout.as_slice(), Options::strict()).unwrap();
    assert!(converted.is_wpm13(true));
}

#[test]
fn strict_by_default() {
    let output = Command::new(env!("CARGO_BIN_EXE_wcnf2wpm13"))
        .arg(data_path("undercount.cnf"))
        .output()
        .unwrap();
    assert!(!output.status.success());

    let output = Command::new(env!("CARGO_BIN_EXE_wcnf2wpm13"))
        .arg(data_path("undercount.cnf"))
        .arg("--lenient")
        .output()
        .unwrap();
    assert!(output.status.success());
}
