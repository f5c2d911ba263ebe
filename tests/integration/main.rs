//! Integration tests for Boreas

mod cli_tests {
    use assert_cmd::Command;
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn boreas() -> Command {
        let mut cmd = Command::cargo_bin("boreas").unwrap();
        // Keep tests independent of any user-level configuration.
        cmd.env("BOREAS_CONFIG", "/nonexistent/boreas-config.toml");
        cmd
    }

    fn base_args(temp: &TempDir) -> Vec<String> {
        vec!["--base-dir".to_string(), temp.path().display().to_string()]
    }

    #[test]
    fn help_displays() {
        boreas()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("file-backed cache store"));
    }

    #[test]
    fn version_displays() {
        boreas()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("boreas"));
    }

    #[test]
    fn set_then_get_round_trips() {
        let temp = TempDir::new().unwrap();

        boreas()
            .args(["set", "pages", "home", "--data", "hello world"])
            .args(base_args(&temp))
            .assert()
            .success()
            .stdout(predicate::str::contains("Stored home"));

        boreas()
            .args(["get", "pages", "home"])
            .args(base_args(&temp))
            .assert()
            .success()
            .stdout("hello world");
    }

    #[test]
    fn set_reads_payload_from_stdin() {
        let temp = TempDir::new().unwrap();

        boreas()
            .args(["set", "pages", "piped"])
            .args(base_args(&temp))
            .write_stdin("from stdin")
            .assert()
            .success();

        boreas()
            .args(["get", "pages", "piped"])
            .args(base_args(&temp))
            .assert()
            .success()
            .stdout("from stdin");
    }

    #[test]
    fn get_missing_entry_reports_not_found() {
        let temp = TempDir::new().unwrap();

        boreas()
            .args(["get", "pages", "absent"])
            .args(base_args(&temp))
            .assert()
            .success()
            .stderr(predicate::str::contains("Entry not found"));
    }

    #[test]
    fn has_prints_true_then_false_after_remove() {
        let temp = TempDir::new().unwrap();

        boreas()
            .args(["set", "pages", "home", "--data", "x"])
            .args(base_args(&temp))
            .assert()
            .success();

        boreas()
            .args(["has", "pages", "home"])
            .args(base_args(&temp))
            .assert()
            .success()
            .stdout(predicate::str::contains("true"));

        boreas()
            .args(["remove", "pages", "home"])
            .args(base_args(&temp))
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed home"));

        boreas()
            .args(["has", "pages", "home"])
            .args(base_args(&temp))
            .assert()
            .success()
            .stdout(predicate::str::contains("false"));
    }

    #[test]
    fn invalid_identifier_is_rejected() {
        let temp = TempDir::new().unwrap();

        boreas()
            .args(["set", "pages", "../escape", "--data", "x"])
            .args(base_args(&temp))
            .assert()
            .failure()
            .stderr(predicate::str::contains("path segment"));
    }

    #[test]
    fn find_lists_tagged_identifiers() {
        let temp = TempDir::new().unwrap();

        for (id, tag) in [("a", "nav"), ("b", "nav"), ("c", "footer")] {
            boreas()
                .args(["set", "pages", id, "--data", "x", "--tag", tag])
                .args(base_args(&temp))
                .assert()
                .success();
        }

        boreas()
            .args(["find", "pages", "nav"])
            .args(base_args(&temp))
            .assert()
            .success()
            .stdout("a\nb\n");
    }

    #[test]
    fn flush_by_tag_spares_other_entries() {
        let temp = TempDir::new().unwrap();

        boreas()
            .args(["set", "pages", "a", "--data", "x", "--tag", "drop"])
            .args(base_args(&temp))
            .assert()
            .success();
        boreas()
            .args(["set", "pages", "b", "--data", "x", "--tag", "keep"])
            .args(base_args(&temp))
            .assert()
            .success();

        boreas()
            .args(["flush", "pages", "--tag", "drop"])
            .args(base_args(&temp))
            .assert()
            .success();

        boreas()
            .args(["has", "pages", "a"])
            .args(base_args(&temp))
            .assert()
            .stdout(predicate::str::contains("false"));
        boreas()
            .args(["has", "pages", "b"])
            .args(base_args(&temp))
            .assert()
            .stdout(predicate::str::contains("true"));
    }

    #[test]
    fn gc_collects_expired_entries() {
        let temp = TempDir::new().unwrap();

        boreas()
            .args(["set", "pages", "stale", "--data", "x", "--lifetime", "-1"])
            .args(base_args(&temp))
            .assert()
            .success();
        boreas()
            .args(["set", "pages", "fresh", "--data", "x", "--lifetime", "0"])
            .args(base_args(&temp))
            .assert()
            .success();

        boreas()
            .args(["gc", "pages"])
            .args(base_args(&temp))
            .assert()
            .success()
            .stdout(predicate::str::contains("Collected 1"));
    }

    #[test]
    fn freeze_locks_out_mutations_until_flush() {
        let temp = TempDir::new().unwrap();

        boreas()
            .args(["set", "pages", "home", "--data", "x", "--lifetime", "0"])
            .args(base_args(&temp))
            .assert()
            .success();

        boreas()
            .args(["freeze", "pages"])
            .args(base_args(&temp))
            .assert()
            .success()
            .stdout(predicate::str::contains("Froze cache"));

        // Frozen state persists across invocations via the snapshot marker.
        boreas()
            .args(["set", "pages", "other", "--data", "x"])
            .args(base_args(&temp))
            .assert()
            .failure()
            .stderr(predicate::str::contains("frozen"));

        boreas()
            .args(["status", "pages"])
            .args(base_args(&temp))
            .assert()
            .success()
            .stdout(predicate::str::contains("frozen"));

        boreas()
            .args(["flush", "pages"])
            .args(base_args(&temp))
            .assert()
            .success();

        boreas()
            .args(["set", "pages", "other", "--data", "x"])
            .args(base_args(&temp))
            .assert()
            .success();
    }

    #[test]
    fn status_reports_entry_count_as_json() {
        let temp = TempDir::new().unwrap();

        boreas()
            .args(["set", "pages", "home", "--data", "x"])
            .args(base_args(&temp))
            .assert()
            .success();

        boreas()
            .args(["status", "pages", "--format", "json"])
            .args(base_args(&temp))
            .assert()
            .success()
            .stdout(predicate::str::contains("\"entries\": 1"))
            .stdout(predicate::str::contains("\"state\": \"live\""));
    }

    #[test]
    fn code_caches_are_separate_from_data_caches() {
        let temp = TempDir::new().unwrap();

        boreas()
            .args(["set", "routes", "compiled", "--data", "x", "--kind", "code"])
            .args(base_args(&temp))
            .assert()
            .success();

        boreas()
            .args(["has", "routes", "compiled", "--kind", "code"])
            .args(base_args(&temp))
            .assert()
            .stdout(predicate::str::contains("true"));

        boreas()
            .args(["has", "routes", "compiled"])
            .args(base_args(&temp))
            .assert()
            .stdout(predicate::str::contains("false"));
    }

    #[test]
    fn config_path_displays() {
        boreas()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("boreas-config.toml"));
    }

    #[test]
    fn config_show_displays_defaults() {
        boreas()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"));
    }

    #[test]
    fn completions_generate() {
        boreas()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("boreas"));
    }
}
