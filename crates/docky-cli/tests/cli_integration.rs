//! CLI subprocess integration tests.
//!
//! These tests invoke the `docky` binary against a fake engine script and
//! verify exit codes, printed diagnostics, and the engine calls issued.

use std::path::{Path, PathBuf};
use std::process::Command;

fn docky_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_docky"));
    cmd.env_remove("DOCKY_LOG");
    cmd
}

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new(config: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("docky.yml"), config).unwrap();
        // Fake engine: logs every invocation, reports `web` as a stopped
        // container running image sha256:app, and echoes mutations.
        let script = format!(
            r#"echo "$@" >> "{log}"
case "$1" in
  container)
    shift 2
    out=""
    for name in "$@"; do
      if [ "$name" = "web" ]; then
        out='{{"Name": "/web", "Image": "sha256:app", "State": {{"Running": false}}, "HostConfig": {{"VolumesFrom": null, "Links": null}}}}'
      fi
    done
    echo "[$out]"
    ;;
  image)
    if [ "$3" = "app:v1" ]; then echo '[{{"Id": "sha256:app"}}]'; else echo '[]'; exit 1; fi
    ;;
  *)
    echo "$@"
    ;;
esac
"#,
            log = dir.path().join("engine.log").display()
        );
        Self::with_engine(dir, &script)
    }

    fn with_engine(dir: tempfile::TempDir, script: &str) -> Self {
        std::fs::write(dir.path().join("fake-docker.sh"), script).unwrap();
        Self { dir }
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("docky.yml")
    }

    fn docky(&self, args: &[&str]) -> std::process::Output {
        let engine = format!("sh {}", self.dir.path().join("fake-docker.sh").display());
        docky_bin()
            .arg("--config")
            .arg(self.config_path())
            .arg("--docker")
            .arg(engine)
            .args(args)
            .output()
            .unwrap()
    }

    fn engine_log(&self) -> String {
        std::fs::read_to_string(self.dir.path().join("engine.log")).unwrap_or_default()
    }
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

const WEB: &str = r#"
web:
  image: "app:v1"
  ports: ["80"]
"#;

#[test]
fn cli_version_exits_zero() {
    let output = docky_bin().arg("--version").output().unwrap();
    assert!(output.status.success(), "docky --version must exit 0");
    assert!(stdout_of(&output).contains("docky"));
}

#[test]
fn cli_help_lists_operations() {
    let output = docky_bin().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    for op in ["check", "start", "stop", "restart", "launch", "relaunch", "destroy"] {
        assert!(stdout.contains(op), "help must list '{op}'");
    }
}

#[test]
fn cli_missing_config_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let missing: &Path = &dir.path().join("nope.yml");
    let output = docky_bin()
        .arg("-f")
        .arg(missing)
        .arg("check")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("file not found"), "stderr: {stderr}");
}

#[test]
fn cli_invalid_config_exits_two() {
    let fixture = Fixture::new("web:\n  imagee: nginx\n");
    let output = fixture.docky(&["check"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn cli_option_like_image_is_a_config_error() {
    let fixture = Fixture::new("web:\n  image: --privileged\n");
    let output = fixture.docky(&["launch", "web"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("must not start with '-'"), "stderr: {stderr}");
    assert!(fixture.engine_log().is_empty());
}

#[test]
fn cli_check_reports_drift_and_exits_zero() {
    let fixture = Fixture::new(WEB);
    let output = fixture.docky(&["check", "web", "ghost"]);
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec!["web is stopped, should be running", "ghost not found in config file"]
    );
    assert!(fixture.engine_log().contains("container inspect web ghost"));
}

#[test]
fn cli_check_json_output() {
    let fixture = Fixture::new(WEB);
    let output = fixture.docky(&["--json", "check"]);
    assert!(output.status.success());
    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reports[0]["name"], "web");
    assert_eq!(reports[0]["has_drift"], true);
    assert_eq!(reports[0]["findings"][0]["kind"], "should_be_running");
}

#[test]
fn cli_check_with_unreachable_daemon_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("docky.yml"), WEB).unwrap();
    let fixture = Fixture::with_engine(
        dir,
        "echo '[]'\necho 'Cannot connect to the Docker daemon. Is the docker daemon running?' >&2\nexit 1\n",
    );
    let output = fixture.docky(&["check"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_of(&output).is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Cannot connect to the Docker daemon"), "stderr: {stderr}");
}

#[test]
fn cli_start_prints_engine_output() {
    let fixture = Fixture::new(WEB);
    let output = fixture.docky(&["start", "web"]);
    assert!(output.status.success());
    assert_eq!(stdout_of(&output).trim(), "start web");
}

#[test]
fn cli_destroy_without_image_refuses() {
    let fixture = Fixture::new("web:\n  ports: [\"80\"]\n");
    let output = fixture.docky(&["destroy", "web"]);
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("has no image"));
    assert!(stdout.contains("cowardly refusing to continue"));
    let log = fixture.engine_log();
    assert!(!log.lines().any(|l| l.starts_with("rm ")), "log: {log}");
    assert!(!log.lines().any(|l| l.starts_with("stop ")), "log: {log}");
}

#[test]
fn cli_launch_existing_container_is_refused() {
    let fixture = Fixture::new(WEB);
    let output = fixture.docky(&["launch", "web"]);
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("web already exists, did you mean relaunch?"));
    assert!(!fixture.engine_log().lines().any(|l| l.starts_with("run ")));
}

#[test]
fn cli_relaunch_removes_and_runs() {
    let fixture = Fixture::new(WEB);
    let output = fixture.docky(&["relaunch", "web"]);
    assert!(output.status.success());
    let log = fixture.engine_log();
    let mutations: Vec<&str> = log
        .lines()
        .filter(|l| !l.starts_with("container ") && !l.starts_with("image "))
        .collect();
    assert_eq!(
        mutations,
        vec!["rm web", "run -d -i -t --name web -p 80 app:v1"]
    );
}

#[test]
fn cli_completions_exit_zero() {
    let output = docky_bin().args(["completions", "bash"]).output().unwrap();
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("docky"));
}
