extern crate assert_cmd;
extern crate predicates;
extern crate tempfile;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;

fn chaos() -> Command {
    Command::cargo_bin("chaos").unwrap()
}

#[test]
fn mandelbrot_prints_one_line_per_row() {
    let output = chaos()
        .args(&["mandelbrot", "--size", "7x4", "--iterations", "30", "--threads", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    let rows: Vec<&str> = text.lines().collect();
    assert_eq!(rows.len(), 4);
    for row in rows {
        let counts: Vec<u32> = row.split(',').map(|v| v.parse().unwrap()).collect();
        assert_eq!(counts.len(), 7);
        assert!(counts.iter().all(|&c| c >= 1 && c <= 30));
    }
}

#[test]
fn mandelbrot_accepts_negative_corners() {
    chaos()
        .args(&[
            "mandelbrot",
            "--size",
            "3x3",
            "--leftlower",
            "-0.5,-0.5",
            "--rightupper",
            "0.0,0.0",
            "--iterations",
            "10",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("10,10,10"));
}

#[test]
fn mandelbrot_rejects_an_empty_grid() {
    chaos()
        .args(&["mandelbrot", "--size", "0x10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid argument"));
}

#[test]
fn logistic_fixed_point() {
    let output = chaos()
        .args(&["logistic", "--rate", "2", "--x0", "0.5", "--iterations", "5", "--transient", "0"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "0.5\n0.5\n0.5\n0.5\n0.5\n");
}

#[test]
fn logistic_rejects_negative_iterations() {
    chaos()
        .args(&["logistic", "--rate", "3.5", "--iterations=-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid argument: iterations must not be negative"));
}

#[test]
fn bifurcation_rejects_zero_steps() {
    chaos()
        .args(&["bifurcation", "--steps", "0", "--seed", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("r_steps must be positive"));
}

#[test]
fn seeded_bifurcation_is_reproducible_and_written_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");
    // One worker, then one per CPU.
    for (path, threads) in &[(&first, Some("1")), (&second, None)] {
        let mut args = vec![
            "bifurcation",
            "--range",
            "3.0,4.0",
            "--steps",
            "5",
            "--samples",
            "3",
            "--iterations",
            "4",
            "--seed",
            "42",
            "--output",
            path.to_str().unwrap(),
        ];
        if let Some(threads) = threads {
            args.push("--threads");
            args.push(*threads);
        }
        chaos().args(&args).assert().success();
    }
    let first = fs::read_to_string(&first).unwrap();
    let second = fs::read_to_string(&second).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.lines().count(), 5 * 3 * 4);
    assert!(first.lines().next().unwrap().starts_with("3,"));
    assert!(first.lines().last().unwrap().starts_with("4,"));
}

#[test]
fn bifurcation_logs_its_point_count() {
    let output = chaos()
        .args(&[
            "bifurcation",
            "--range",
            "3.0,4.0",
            "--steps",
            "5",
            "--samples",
            "3",
            "--iterations",
            "4",
            "--seed",
            "9",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let log = String::from_utf8(output.stderr).unwrap();
    let line = log
        .lines()
        .find(|line| line.contains("computed bifurcation data"))
        .unwrap();
    assert!(line.contains("points"));
    assert!(line.contains("60"));
    assert!(line.contains("elapsed"));
}
