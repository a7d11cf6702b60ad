use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::str::contains;

fn out_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("hasm-test-{}-{name}", std::process::id()));
    let _ = fs::remove_file(&path);
    path
}

fn compiles_to_expected(program: &str) {
    let out = out_path(&format!("{program}.hack"));
    let mut cmd = Command::cargo_bin("hasm").unwrap();
    cmd.arg("compile")
        .arg(format!("tests/files/{program}.asm"))
        .arg(&out);

    cmd.assert()
        .success()
        .stdout(contains("Assembling"))
        .stdout(contains("Saved"));

    let expected = fs::read_to_string(format!("tests/files/{program}.hack"))
        .unwrap()
        .replace("\r\n", "\n");
    assert_eq!(fs::read_to_string(&out).unwrap(), expected);
    fs::remove_file(&out).unwrap();
}

#[test]
fn runs_without_arguments() {
    let mut cmd = Command::cargo_bin("hasm").unwrap();
    cmd.assert().success().stdout(contains("hasm"));
}

#[test]
fn compiles_add() {
    compiles_to_expected("add");
}

#[test]
fn compiles_max_with_labels() {
    compiles_to_expected("max");
}

#[test]
fn compiles_rect_with_variables() {
    compiles_to_expected("rect");
}

#[test]
fn labels_only_produces_empty_file() {
    let out = out_path("labels_only.hack");
    let mut cmd = Command::cargo_bin("hasm").unwrap();
    cmd.arg("compile").arg("tests/files/labels_only.asm").arg(&out);
    cmd.assert().success();
    assert_eq!(fs::read_to_string(&out).unwrap(), "");
    fs::remove_file(&out).unwrap();
}

#[test]
fn bad_comp_writes_nothing() {
    let out = out_path("bad_comp.hack");
    let mut cmd = Command::cargo_bin("hasm").unwrap();
    cmd.arg("compile").arg("tests/files/bad_comp.asm").arg(&out);
    cmd.assert()
        .failure()
        .stderr(contains("Unknown computation `D*A`"));
    assert!(!out.exists());
}

#[test]
fn duplicate_label_is_rejected() {
    let mut cmd = Command::cargo_bin("hasm").unwrap();
    cmd.arg("check").arg("tests/files/duplicate_label.asm");
    cmd.assert()
        .failure()
        .stderr(contains("Duplicate label `LOOP`"));
}

#[test]
fn overflowing_literal_is_rejected() {
    let mut cmd = Command::cargo_bin("hasm").unwrap();
    cmd.arg("check").arg("tests/files/overflow.asm");
    cmd.assert()
        .failure()
        .stderr(contains("does not fit in 15 bits"));
}

#[test]
fn check_reports_success() {
    let mut cmd = Command::cargo_bin("hasm").unwrap();
    cmd.arg("check").arg("tests/files/max.asm");
    cmd.assert().success().stdout(contains("no errors found!"));
}

#[test]
fn quiet_mode_hides_status() {
    let mut cmd = Command::cargo_bin("hasm").unwrap();
    cmd.env("HASM_QUIET", "1")
        .arg("check")
        .arg("tests/files/max.asm");
    cmd.assert().success().stdout(predicates::str::is_empty());
}

#[test]
fn quiet_flag_hides_status() {
    let mut cmd = Command::cargo_bin("hasm").unwrap();
    cmd.arg("check").arg("--quiet").arg("tests/files/max.asm");
    cmd.assert().success().stdout(predicates::str::is_empty());

    let mut cmd = Command::cargo_bin("hasm").unwrap();
    cmd.env("HASM_QUIET", "0")
        .arg("check")
        .arg("tests/files/max.asm");
    cmd.assert().success().stdout(contains("no errors found!"));
}

#[test]
fn rejects_non_asm_extension() {
    let mut cmd = Command::cargo_bin("hasm").unwrap();
    cmd.arg("check").arg("tests/files/add.hack");
    cmd.assert().failure().stderr(contains("expected `.asm`"));
}

#[test]
fn lists_symbols_in_definition_order() {
    let mut cmd = Command::cargo_bin("hasm").unwrap();
    cmd.env("HASM_QUIET", "1")
        .arg("symbols")
        .arg("tests/files/rect.asm");
    let output = cmd.assert().success().get_output().stdout.clone();
    let listing = String::from_utf8(output).unwrap();
    let names: Vec<&str> = listing
        .lines()
        .filter_map(|line| line.split_whitespace().last())
        .collect();
    assert_eq!(names, vec!["LOOP", "INFINITE_LOOP", "counter", "address"]);
    assert!(listing.contains("10"));
    assert!(listing.contains("16"));
}
