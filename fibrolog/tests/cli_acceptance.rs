use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
    data: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");
        let data = base.join("data");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");
        fs::create_dir_all(&data).expect("failed to create data dir");

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_config,
            xdg_state,
            data,
        }
    }

    fn write_config(&self, content: &str) {
        let path = self.xdg_config.join("fibrolog/config.toml");
        fs::create_dir_all(path.parent().expect("missing config parent"))
            .expect("failed to create config dir");
        fs::write(path, content).expect("failed to write config");
    }

    fn log_dir(&self) -> PathBuf {
        self.xdg_state.join("fibrolog")
    }
}

fn seed_fixture(dir: &Path, name: &str) -> PathBuf {
    let source = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../fibrolog-core/tests/fixtures/entries.jsonl");
    let target = dir.join(name);
    fs::copy(source, &target).expect("failed to copy entries fixture");
    target
}

fn run_analyze(env: &CliTestEnv, args: &[&str]) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("fibrolog-analyze"));

    Command::new(bin_path)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("failed to execute fibrolog-analyze: {e}"))
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    let rendered_args = args
        .iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "fibrolog-analyze {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}):\n{}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

#[test]
fn json_summary_for_fixture() {
    let env = CliTestEnv::new();
    let input = seed_fixture(&env.data, "entries.jsonl");
    let input = input.to_str().expect("non-UTF-8 temp path");

    let args = ["--input", input, "--format", "json", "--utc"];
    let output = run_analyze(&env, &args);
    assert_success(&args, &output);

    let value = stdout_json(&output);
    assert_eq!(value["wpiScore"], 8);
    assert_eq!(value["sssScore"], 6);
    assert_eq!(value["meetsDiagnosticCriteria"], true);
    assert_eq!(value["mostAffectedRegions"][0]["region"], "neck");
    assert_eq!(value["flareIntensity"], "moderate");
    assert_eq!(value["effectiveInterventions"][0]["intervention"], "heatTherapy");

    // The malformed fixture line is reported, not fatal
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("warning:") && stderr.contains("entries.jsonl:8:"),
        "expected a load warning on stderr, got:\n{stderr}"
    );

    assert!(
        env.log_dir().exists(),
        "log directory should exist at {}",
        env.log_dir().display()
    );
    let log_files: Vec<String> = fs::read_dir(env.log_dir())
        .expect("failed to read log dir")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    // Daily rotation writes `fibrolog.YYYY-MM-DD.log`, never a bare `fibrolog.log`
    assert!(
        log_files.iter().any(|name| {
            name.starts_with("fibrolog.") && name.ends_with(".log") && name != "fibrolog.log"
        }),
        "expected a dated log file, found {log_files:?}"
    );
}

#[test]
fn text_summary_lists_episodes() {
    let env = CliTestEnv::new();
    let input = seed_fixture(&env.data, "entries.jsonl");
    let input = input.to_str().expect("non-UTF-8 temp path");

    let args = ["--input", input, "--episodes", "--utc"];
    let output = run_analyze(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Symptom log: 7 entries from 1 file(s)"));
    assert!(stdout.contains("WPI 8/18  SSS 6/12  criteria met: yes"));
    assert!(stdout.contains("intensity moderate"));
    assert!(
        stdout.contains("2024-01-01 .. 2024-01-02  2 day(s)  moderate"),
        "expected episode listing, got:\n{stdout}"
    );
}

#[test]
fn glob_input_reads_every_matching_file() {
    let env = CliTestEnv::new();
    seed_fixture(&env.data, "january.jsonl");
    fs::write(
        env.data.join("february.jsonl"),
        "{\"id\":\"f1\",\"timestamp\":\"2024-02-01T12:00:00\",\"sss\":{\"fatigue\":1}}\n",
    )
    .expect("failed to write second log");
    fs::write(env.data.join("notes.txt"), "not entries").expect("failed to write notes");

    let pattern = format!("{}/*.jsonl", env.data.display());
    let args = ["--input", pattern.as_str(), "--utc"];
    let output = run_analyze(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Symptom log: 8 entries from 2 file(s)"),
        "unexpected summary header:\n{stdout}"
    );
}

#[test]
fn config_sets_format_and_episodes() {
    let env = CliTestEnv::new();
    env.write_config(
        r#"
[analytics]
utc_offset = "+01:00"

[report]
format = "json"
show_episodes = true
"#,
    );
    let input = seed_fixture(&env.data, "entries.jsonl");
    let input = input.to_str().expect("non-UTF-8 temp path");

    let args = ["--input", input];
    let output = run_analyze(&env, &args);
    assert_success(&args, &output);

    let value = stdout_json(&output);
    assert_eq!(value["analytics"]["wpiScore"], 8);
    let episodes = value["episodes"].as_array().expect("episodes array");
    assert_eq!(episodes.len(), 3);
    assert_eq!(episodes[0]["startDay"], "2024-01-01");
    assert_eq!(episodes[0]["maxSeverity"], "moderate");
}

#[test]
fn empty_glob_prints_empty_summary() {
    let env = CliTestEnv::new();
    let pattern = format!("{}/*.jsonl", env.data.display());

    let args = ["--input", pattern.as_str(), "--format", "json"];
    let output = run_analyze(&env, &args);
    assert_success(&args, &output);

    let value = stdout_json(&output);
    assert_eq!(value["wpiScore"], 0);
    assert_eq!(value["flareIntensity"], "mild");
    assert_eq!(value["mostAffectedRegions"].as_array().map(Vec::len), Some(0));
}

#[test]
fn missing_input_fails() {
    let env = CliTestEnv::new();
    let missing = env.data.join("missing.jsonl");
    let missing = missing.to_str().expect("non-UTF-8 temp path");

    let output = run_analyze(&env, &["--input", missing]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("failed to load entries from"),
        "unexpected error output:\n{stderr}"
    );
}

#[test]
fn invalid_utc_offset_in_config_fails() {
    let env = CliTestEnv::new();
    env.write_config("[analytics]\nutc_offset = \"Mars/Olympus\"\n");
    let input = seed_fixture(&env.data, "entries.jsonl");
    let input = input.to_str().expect("non-UTF-8 temp path");

    let output = run_analyze(&env, &["--input", input]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("failed to load configuration"),
        "unexpected error output:\n{stderr}"
    );
}
