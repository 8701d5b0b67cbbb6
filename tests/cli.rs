use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn write_file(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn docsnap(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_docsnap"))
        .args(args)
        .env_remove("DOCSNAP_LOG")
        .output()
        .unwrap()
}

fn sample_project(root: &Path) {
    write_file(&root.join("pkg/__init__.py"), "\"\"\"Package docs.\"\"\"\n");
    write_file(&root.join("pkg/core.py"), "import os\n");
    write_file(&root.join("pkg/__pycache__/core.cpython-312.pyc"), "");
    write_file(&root.join("node_modules/dep/index.js"), "");
    write_file(&root.join("README.md"), "# Project\n\n## Usage\n");
}

#[test]
fn cli_snapshot_reports_tree_and_docstrings() {
    let dir = tempdir().unwrap();
    sample_project(dir.path());

    let output = docsnap(&["snapshot", "--root", dir.path().to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("# Codebase snapshot\n"));
    assert!(stdout.contains("**Python files scanned:** 2  \n"));
    assert!(stdout.contains("**Missing module docstrings:** 1\n"));
    assert!(stdout.contains("### pkg/__init__.py\n\n```text\nPackage docs.\n```\n"));
    assert!(stdout.contains("### pkg/core.py\n\n_No module docstring found._\n"));
    assert!(!stdout.contains("node_modules"));
    assert!(!stdout.contains("__pycache__"));
}

#[test]
fn cli_snapshot_fail_on_missing_exits_two() {
    let dir = tempdir().unwrap();
    sample_project(dir.path());
    let root = dir.path().to_str().unwrap();

    let output = docsnap(&["snapshot", "--root", root, "--fail-on-missing"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8(output.stdout).unwrap().contains("# Codebase snapshot"));

    let output = docsnap(&["snapshot", "--root", root, "--focus", "pkg", "--exclude-glob", "**/core.py", "--fail-on-missing"]);
    assert!(output.status.success());
}

#[test]
fn cli_snapshot_rejects_focus_outside_root() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("root")).unwrap();
    fs::create_dir_all(dir.path().join("other")).unwrap();

    let output = docsnap(&[
        "snapshot",
        "--root",
        dir.path().join("root").to_str().unwrap(),
        "--focus",
        "../other",
    ]);

    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("focus must be inside root."));
    assert!(output.stdout.is_empty());
}

#[test]
fn cli_snapshot_missing_root_json_error() {
    let dir = tempdir().unwrap();

    let output = docsnap(&[
        "snapshot",
        "--root",
        dir.path().join("absent").to_str().unwrap(),
        "--json",
    ]);

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8(output.stderr).unwrap();
    let v: serde_json::Value = serde_json::from_str(stderr.trim()).unwrap();
    assert!(v["error"].as_str().unwrap().contains("root does not exist"));
    assert_eq!(v["code"], 3);
}

#[test]
fn cli_snapshot_out_writes_file() {
    let dir = tempdir().unwrap();
    sample_project(dir.path());
    let out = dir.path().join("reports/nested/snapshot.md");

    let output = docsnap(&[
        "snapshot",
        "--root",
        dir.path().to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.trim(), out.to_str().unwrap());

    let report = fs::read_to_string(&out).unwrap();
    assert!(report.starts_with("# Codebase snapshot\n"));
    assert!(report.contains("## Module docstrings\n"));
}

#[test]
fn cli_snapshot_json() {
    let dir = tempdir().unwrap();
    sample_project(dir.path());

    let output = docsnap(&["snapshot", "--root", dir.path().to_str().unwrap(), "--json"]);
    assert!(output.status.success());

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["python_files"], 2);
    assert_eq!(v["missing"][0], "pkg/core.py");
    assert_eq!(v["files"][0]["docstring"]["text"], "Package docs.");
}

#[test]
fn cli_pack_includes_markdown_headings() {
    let dir = tempdir().unwrap();
    sample_project(dir.path());
    write_file(&dir.path().join("sessions/log.md"), "# Session\n");
    let out = dir.path().join("pack.md");

    let output = docsnap(&[
        "pack",
        "--root",
        dir.path().to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let pack = fs::read_to_string(&out).unwrap();
    assert!(pack.starts_with("# Docs context pack\n"));
    assert!(pack.contains("**Markdown files found:** 1  \n"));
    assert!(pack.contains("### README.md\n\n- Project\n  - Usage\n"));
    assert!(!pack.contains("sessions/log.md"));
}

#[test]
fn cli_pack_requires_out() {
    let dir = tempdir().unwrap();
    let output = docsnap(&["pack", "--root", dir.path().to_str().unwrap()]);
    assert!(!output.status.success());
}

#[test]
fn cli_tree_renders_filtered_tree() {
    let dir = tempdir().unwrap();
    sample_project(dir.path());

    let output = docsnap(&["tree", dir.path().to_str().unwrap(), "--max-depth", "1"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(&lines[1..], &["├── pkg/", "└── README.md"]);
}

#[test]
fn cli_tree_bad_glob_is_config_error() {
    let dir = tempdir().unwrap();

    let output = docsnap(&["tree", dir.path().to_str().unwrap(), "--exclude-glob", "[z-a"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("invalid exclude glob"));
}

#[test]
fn cli_docstring_prints_or_exits_two() {
    let dir = tempdir().unwrap();
    let documented = dir.path().join("documented.py");
    let bare = dir.path().join("bare.py");
    write_file(&documented, "'''First line.\n\nMore.'''\nx = 1\n");
    write_file(&bare, "x = 1\n");

    let output = docsnap(&["docstring", documented.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "First line.\n\nMore.\n");

    let output = docsnap(&["docstring", bare.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));

    let output = docsnap(&["docstring", dir.path().join("nope.py").to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(3));
}
