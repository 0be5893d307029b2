//! Integration tests for the mushaf CLI

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    /// The binary with a config path that does not exist, so defaults apply
    fn mushaf(dir: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("mushaf");
        cmd.env("MUSHAF_CONFIG", dir.path().join("config.toml"))
            .env_remove("MUSHAF_SEARCH_API_KEY");
        cmd
    }

    fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn help_displays() {
        let dir = TempDir::new().unwrap();
        mushaf(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Quran reading bot"));
    }

    #[test]
    fn version_displays() {
        let dir = TempDir::new().unwrap();
        mushaf(&dir)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("mushaf"));
    }

    #[test]
    fn token_encode() {
        let dir = TempDir::new().unwrap();
        mushaf(&dir)
            .args(["token", "encode", "cont", "--primary", "2", "--secondary", "4000"])
            .assert()
            .success()
            .stdout("cont:2:4000\n");
    }

    #[test]
    fn token_encode_missing_field_fails() {
        let dir = TempDir::new().unwrap();
        mushaf(&dir)
            .args(["token", "encode", "play", "--primary", "5"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("missing secondary"));
    }

    #[test]
    fn token_encode_unknown_view_fails() {
        let dir = TempDir::new().unwrap();
        mushaf(&dir)
            .args(["token", "encode", "verse"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown view 'verse'"));
    }

    #[test]
    fn token_decode() {
        let dir = TempDir::new().unwrap();
        mushaf(&dir)
            .args(["token", "decode", "play:5:112"])
            .assert()
            .success()
            .stdout(predicate::str::contains("PlayAudio"))
            .stdout(predicate::str::contains("primary: 5"))
            .stdout(predicate::str::contains("secondary: 112"));
    }

    #[test]
    fn token_decode_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        for token in ["garbage_token", "idx:03", "sura:1:2", ""] {
            mushaf(&dir)
                .args(["token", "decode", token])
                .assert()
                .failure()
                .stderr(predicate::str::contains("Malformed navigation token"));
        }
    }

    #[test]
    fn paginate_clamps_to_last_page() {
        let dir = TempDir::new().unwrap();
        mushaf(&dir)
            .args(["paginate", "114", "--page", "11"])
            .assert()
            .success()
            .stdout(predicate::str::contains("page: 12/12"))
            .stdout(predicate::str::contains("items: 110..114 of 114"))
            .stdout(predicate::str::contains("next: no"));

        mushaf(&dir)
            .args(["paginate", "114", "--page", "500", "--json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"index\": 11"));
    }

    #[test]
    fn paginate_empty_listing_has_one_page() {
        let dir = TempDir::new().unwrap();
        mushaf(&dir)
            .args(["paginate", "0"])
            .assert()
            .success()
            .stdout(predicate::str::contains("page: 1/1"));
    }

    #[test]
    fn split_prefers_paragraph_breaks() {
        let dir = TempDir::new().unwrap();
        mushaf(&dir)
            .args(["split", "--max-bytes", "5", "--json"])
            .write_stdin("aaaa\n\nbbbb")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"text\": \"aaaa\""))
            .stdout(predicate::str::contains("\"text\": \"bbbb\""))
            .stdout(predicate::str::contains("\"resume_marker\": 6"));
    }

    #[test]
    fn split_reads_a_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("surah.txt");
        std::fs::write(&file, "first line\nsecond line").unwrap();

        mushaf(&dir)
            .args(["split", "--max-bytes", "12"])
            .arg(&file)
            .assert()
            .success()
            .stdout(predicate::str::contains("Chunk 0 (10 bytes, resume at 11)"))
            .stdout(predicate::str::contains("Chunk 1 (11 bytes, last)"));
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        mushaf(&dir)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_path_flag_overrides_env() {
        let dir = TempDir::new().unwrap();
        let custom = dir.path().join("custom.toml");
        mushaf(&dir)
            .arg("--config")
            .arg(&custom)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("custom.toml"));
    }

    #[test]
    fn config_show_defaults() {
        let dir = TempDir::new().unwrap();
        mushaf(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[navigation]"))
            .stdout(predicate::str::contains("max_token_bytes = 64"))
            .stdout(predicate::str::contains("ttl_minutes = 30"));
    }

    #[test]
    fn config_show_redacts_api_key() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "[search]\napi_key = \"secret-key\"\n");
        mushaf(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("secret-key").not())
            .stdout(predicate::str::contains("<redacted>"));
    }

    #[test]
    fn config_init_writes_defaults_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        mushaf(&dir).args(["config", "init"]).assert().success();
        assert!(Path::new(&path).exists());

        std::fs::write(&path, "[navigation]\npage_size = 7\n").unwrap();
        mushaf(&dir)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Use --force to overwrite"));
        assert!(std::fs::read_to_string(&path).unwrap().contains("page_size = 7"));

        mushaf(&dir).args(["config", "init", "--force"]).assert().success();
        assert!(std::fs::read_to_string(&path).unwrap().contains("page_size = 10"));
    }

    #[test]
    fn invalid_config_is_reported() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "[navigation]\nmax_token_bytes = 4\n");
        mushaf(&dir)
            .args(["paginate", "10"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"))
            .stderr(predicate::str::contains("mushaf config show"));
    }

    #[test]
    fn config_file_sets_page_size() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "[navigation]\npage_size = 5\n");
        mushaf(&dir)
            .args(["paginate", "114"])
            .assert()
            .success()
            .stdout(predicate::str::contains("page: 1/23"));
    }

    #[test]
    fn catalog_juz_is_static() {
        let dir = TempDir::new().unwrap();
        mushaf(&dir)
            .args(["catalog", "juz"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Loaded 30 entries"))
            .stdout(predicate::str::contains("surah 2:142"));
    }

    #[test]
    fn status_reports_json() {
        let dir = TempDir::new().unwrap();
        mushaf(&dir)
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"status\": \"ok\""))
            .stdout(predicate::str::contains("\"search_enabled\": false"));
    }

    #[test]
    fn search_key_from_env_enables_search() {
        let dir = TempDir::new().unwrap();
        mushaf(&dir)
            .env("MUSHAF_SEARCH_API_KEY", "test-key")
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"search_enabled\": true"));
    }

    #[test]
    fn completions_generate() {
        let dir = TempDir::new().unwrap();
        mushaf(&dir)
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("mushaf"));
    }

    #[test]
    fn console_quits_on_command() {
        let dir = TempDir::new().unwrap();
        mushaf(&dir)
            .arg("console")
            .write_stdin("quit\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Mushaf console"))
            .stdout(predicate::str::contains("Goodbye"));
    }
}
