// End-to-end invocation against a shell-script stand-in for the solc binary.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use serde_json::json;
use solcx::api::{
    ActiveSolc, CompileOptions, ErrorKind, Invocation, Solc, SolcRegistry, StandardOptions,
    SystemRunner, Version, compile_source, compile_standard,
};

/// Writes a fake `solc` that reports `version`, records argv/stdin next to itself,
/// and prints `stdout` (or exits 1 with a parser error when stdin contains `BROKEN`).
fn write_fake_solc(dir: &Path, version: &str, stdout: &str) -> PathBuf {
    let path = dir.join(format!("solc-v{version}"));
    let script = format!(
        r#"#!/bin/sh
if [ "$1" = "--version" ]; then
  echo "solc, the solidity compiler commandline interface"
  echo "Version: {version}+commit.deadbeef.Linux.g++"
  exit 0
fi
printf '%s\n' "$@" > "$0.args"
cat > "$0.stdin"
if grep -q BROKEN "$0.stdin"; then
  echo "Error: Expected ';' but got end of source" >&2
  exit 1
fi
cat <<'EOF'
{stdout}
EOF
"#
    );
    std::fs::write(&path, script).expect("write fake solc");
    let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod");
    path
}

fn recorded_args(solc: &Path) -> Vec<String> {
    let text = std::fs::read_to_string(format!("{}.args", solc.display())).expect("args file");
    text.lines().map(str::to_string).collect()
}

#[test]
fn detects_version_from_banner() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_fake_solc(temp.path(), "0.7.6", "{}");
    let active = ActiveSolc::detect(&path, &SystemRunner).expect("detect");
    assert_eq!(active.version, Version::new(0, 7, 6));
    assert_eq!(active.path, path);
}

#[test]
fn invoke_pipes_stdin_and_captures_stdout() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_fake_solc(temp.path(), "0.8.10", "compiled");
    let solc = Solc::new(ActiveSolc::new(&path, Version::new(0, 8, 10)));

    let request = Invocation::new()
        .flag("bin")
        .option("optimize-runs", 200u64)
        .stdin("contract Foo {}");
    let result = solc.invoke(&request).expect("invoke");
    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stdout_text().trim(), "compiled");
    assert_eq!(recorded_args(&path), ["--bin", "--optimize-runs", "200", "-"]);
    let stdin = std::fs::read_to_string(format!("{}.stdin", path.display())).expect("stdin");
    assert_eq!(stdin, "contract Foo {}");
}

#[test]
fn compile_failure_surfaces_exit_code_and_stderr() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_fake_solc(temp.path(), "0.8.10", "{}");
    let solc = Solc::new(ActiveSolc::new(&path, Version::new(0, 8, 10)));

    let err = solc
        .invoke(&Invocation::new().flag("bin").stdin("contract BROKEN {"))
        .expect_err("compile error");
    assert_eq!(err.kind(), ErrorKind::Solc);
    assert_eq!(err.exit_code(), Some(1));
    assert!(err.stderr().expect("stderr").contains("Expected ';'"));
}

#[test]
fn rejected_options_never_spawn() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_fake_solc(temp.path(), "0.8.10", "{}");
    let solc = Solc::new(ActiveSolc::new(&path, Version::new(0, 8, 10)));

    let err = solc
        .invoke(&Invocation::new().flag("formal").stdin("contract Foo {}"))
        .expect_err("formal removed");
    assert_eq!(err.kind(), ErrorKind::UnknownOption);
    assert!(!Path::new(&format!("{}.args", path.display())).exists());
}

#[test]
fn registry_selects_newest_installed_binary() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_fake_solc(temp.path(), "0.6.12", "{}");
    let newest = write_fake_solc(temp.path(), "0.8.10", "{}");
    let registry = SolcRegistry::from_install_dir(temp.path(), None).expect("registry");
    let active = registry.active().expect("active");
    assert_eq!(active.version, Version::new(0, 8, 10));
    assert_eq!(active.path, newest);

    let err = SolcRegistry::from_install_dir(temp.path(), Some(&Version::new(0, 5, 0)))
        .expect_err("not installed");
    assert_eq!(err.kind(), ErrorKind::NotInstalled);
}

#[test]
fn compile_source_parses_combined_json() {
    let temp = tempfile::tempdir().expect("tempdir");
    let stdout = json!({
        "contracts": { "<stdin>:Foo": { "abi": [], "bin": "6080604052" } },
        "version": "0.8.10+commit.deadbeef"
    })
    .to_string();
    let path = write_fake_solc(temp.path(), "0.8.10", &stdout);
    let solc = Solc::new(ActiveSolc::new(&path, Version::new(0, 8, 10)));

    let options = CompileOptions::new().outputs(["abi", "bin"]);
    let contracts = compile_source(&solc, "contract Foo {}", &options).expect("compile");
    assert_eq!(contracts["<stdin>:Foo"]["bin"], "6080604052");
    assert_eq!(recorded_args(&path), ["--combined-json", "abi,bin", "-"]);
}

#[test]
fn compile_standard_round_trips_json() {
    let temp = tempfile::tempdir().expect("tempdir");
    let stdout =
        json!({ "contracts": { "a.sol": { "A": { "abi": [] } } }, "sources": {} }).to_string();
    let path = write_fake_solc(temp.path(), "0.8.10", &stdout);
    let solc = Solc::new(ActiveSolc::new(&path, Version::new(0, 8, 10)));

    let input = json!({
        "language": "Solidity",
        "sources": { "a.sol": { "content": "contract A {}" } },
        "settings": { "outputSelection": { "*": { "*": ["abi"] } } }
    });
    let output = compile_standard(&solc, &input, &StandardOptions::new()).expect("standard");
    assert_eq!(output["contracts"]["a.sol"]["A"]["abi"], json!([]));
    assert_eq!(recorded_args(&path), ["--standard-json"]);
    let stdin = std::fs::read(format!("{}.stdin", path.display())).expect("stdin");
    let sent: serde_json::Value = serde_json::from_slice(&stdin).expect("stdin json");
    assert_eq!(sent, input);
}
