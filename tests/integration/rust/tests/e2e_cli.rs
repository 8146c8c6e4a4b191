//! End-to-End CLI Integration Tests
//!
//! Drives the `kalang` command line surface over a small project on disk.

use ka_cli::{run, Cli, CliError};
use ka_cli::Commands;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn compile(files: Vec<PathBuf>, output: Option<PathBuf>) -> Result<(), CliError> {
    run(&Cli {
        verbose: false,
        command: Commands::Compile { files, output },
    })
}

/// Test: A two-module project compiles with a relative import
#[test]
fn test_e2e_project_with_local_module() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(src.join("util")).unwrap();
    fs::write(
        src.join("util").join("vec.ka"),
        "export function add(a, b) do return a + b end",
    )
    .unwrap();
    fs::write(
        src.join("main.ka"),
        "from util.vec import add\nconsole.log(add(1, 2))",
    )
    .unwrap();

    compile(
        vec![src.join("main.ka"), src.join("util").join("vec.ka")],
        None,
    )
    .unwrap();

    let main_js = fs::read_to_string(src.join("main.js")).unwrap();
    assert!(main_js.contains("import { add } from \"./util/vec.js\";"));
    assert!(main_js.ends_with("console.log(add(1, 2));"));

    let vec_js = fs::read_to_string(src.join("util").join("vec.js")).unwrap();
    assert!(vec_js.ends_with(
        "export function add(a, b) {\n    return __kaOperators[\"+\"](a, b);\n}"
    ));
}

/// Test: The first failing file stops the run and nothing is written for it
#[test]
fn test_e2e_stops_on_first_error() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("good.ka");
    let bad = dir.path().join("bad.ka");
    let later = dir.path().join("later.ka");
    fs::write(&good, "ok = 1").unwrap();
    fs::write(&bad, "1 +").unwrap();
    fs::write(&later, "x = 2").unwrap();

    let err = compile(vec![good, bad, later], None).unwrap_err();

    match err {
        CliError::Compile { error, rendered } => {
            assert_eq!(error.kind_label(), "Parser");
            assert!(rendered.contains("bad.ka:1:4"));
        }
        other => panic!("expected compile error, got {:?}", other),
    }
    assert!(dir.path().join("good.js").exists());
    assert!(!dir.path().join("bad.js").exists());
    assert!(!dir.path().join("later.js").exists());
}

/// Test: Empty file list is rejected before touching the filesystem
#[test]
fn test_e2e_no_input() {
    assert!(matches!(compile(Vec::new(), None), Err(CliError::NoInput)));
}
