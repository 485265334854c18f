#![cfg(feature = "compression")]

use wcnf13::instances::{fio::dimacs::Options, Formula};

fn data_path(name: &str) -> String {
    let manifest = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    format!("{manifest}/data/{name}")
}

fn uncompressed() -> Formula {
    Formula::from_dimacs_path(data_path("vertex-cover.wcnf"), Options::strict()).unwrap()
}

#[test]
fn vertex_cover_gzip() {
    let formula =
        Formula::from_dimacs_path(data_path("vertex-cover.wcnf.gz"), Options::strict()).unwrap();
    assert_eq!(formula, uncompressed());
}

#[test]
fn vertex_cover_bz2() {
    let formula =
        Formula::from_dimacs_path(data_path("vertex-cover.wcnf.bz2"), Options::strict()).unwrap();
    assert_eq!(formula, uncompressed());
}

#[test]
fn vertex_cover_xz() {
    let formula =
        Formula::from_dimacs_path(data_path("vertex-cover.wcnf.xz"), Options::strict()).unwrap();
    assert_eq!(formula, uncompressed());
}

#[test]
fn write_compressed() {
    let formula = uncompressed().to_wpm13();
    let dir = tempfile::tempdir().unwrap();
    for ext in ["gz", "bz2", "xz"] {
        let path = dir.path().join(format!("vertex-cover-13.wcnf.{ext}"));
        formula.write_dimacs_path(&path).unwrap();
        let parsed = Formula::from_dimacs_path(&path, Options::strict()).unwrap();
        assert_eq!(parsed, formula);
    }
}
