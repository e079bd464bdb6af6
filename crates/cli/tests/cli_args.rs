use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::tempdir;

/// Argument errors exit with -1 (status 255), mirroring the analyzer's
/// contract, not with a generic failure code.

#[test]
fn no_inputs_is_an_argument_error() {
    cargo_bin_cmd!("seedmind-cli")
        .args(["--srcroot", "/src", "--file", "a.c", "--func", "main"])
        .assert()
        .failure()
        .code(255);
}

#[test]
fn missing_target_selection_is_an_argument_error() {
    let dir = tempdir().expect("tempdir");
    cargo_bin_cmd!("seedmind-cli")
        .current_dir(dir.path())
        .args(["in.bc", "--srcroot", "/src"])
        .assert()
        .failure()
        .code(255);
}

#[test]
fn missing_srcroot_is_an_argument_error() {
    let dir = tempdir().expect("tempdir");
    cargo_bin_cmd!("seedmind-cli")
        .current_dir(dir.path())
        .args(["in.bc", "--file", "a.c", "--func", "main"])
        .assert()
        .failure()
        .code(255);
}

#[test]
fn file_and_multi_are_mutually_exclusive() {
    let dir = tempdir().expect("tempdir");
    cargo_bin_cmd!("seedmind-cli")
        .current_dir(dir.path())
        .args([
            "in.bc", "--srcroot", "/src", "--file", "a.c", "--func", "main", "--multi",
            "targets.txt",
        ])
        .assert()
        .failure()
        .code(255);
}

#[test]
fn line_and_func_are_mutually_exclusive() {
    let dir = tempdir().expect("tempdir");
    cargo_bin_cmd!("seedmind-cli")
        .current_dir(dir.path())
        .args(["in.bc", "--srcroot", "/src", "--file", "a.c", "--line", "10", "--func", "main"])
        .assert()
        .failure()
        .code(255);
}

#[test]
fn slicing_requires_the_callgraph_phase() {
    let dir = tempdir().expect("tempdir");
    cargo_bin_cmd!("seedmind-cli")
        .current_dir(dir.path())
        .args(["in.bc", "--srcroot", "/src", "--file", "a.c", "--func", "main", "--slicing"])
        .assert()
        .failure()
        .code(255);
}
