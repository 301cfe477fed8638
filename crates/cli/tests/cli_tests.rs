//! CLI integration tests
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("ngoscope")
}

fn get_site_fixture_path(site: &str, name: &str) -> String {
    format!("../../tests/fixtures/sites/{}/{}", site, name)
}

/// `ngoscope extract` with overrides kept out of the user's config directory.
fn extract(overrides: &TempDir) -> assert_cmd::Command {
    let mut cmd = cmd();
    cmd.args(["--overrides-dir", overrides.path().to_str().unwrap(), "extract"]);
    cmd
}

#[test]
fn test_cli_file_input() {
    let tmp = TempDir::new().unwrap();
    let output = extract(&tmp).arg(get_site_fixture_path("asha", "index.html")).output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["ngo_name"], "Asha Seva Trust");
    assert_eq!(value["year_founded"], "1994");
    assert_eq!(value["contact_info"]["email"], "contact@ashaseva.org");
    assert!(value["website_url"].as_str().unwrap().starts_with("file://"));
}

#[test]
fn test_cli_jsonl_format() {
    let tmp = TempDir::new().unwrap();
    let output = extract(&tmp)
        .args(["-f", "jsonl"])
        .arg(get_site_fixture_path("asha", "index.html"))
        .arg(get_site_fixture_path("seva", "index.html"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(first["ngo_name"], "Asha Seva Trust");
    assert_eq!(second["ngo_name"], "Seva Foundation");
    assert_eq!(second["contact_info"]["phone"], "not found automatically, check manually");
}

#[test]
fn test_cli_text_format() {
    let tmp = TempDir::new().unwrap();
    extract(&tmp)
        .args(["-f", "text", "--provenance", &get_site_fixture_path("asha", "index.html")])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Asha Seva Trust\n"))
        .stdout(predicate::str::contains("Health Camps"))
        .stdout(predicate::str::contains("via structured_year"));
}

#[test]
fn test_cli_out_dir() {
    let tmp = TempDir::new().unwrap();
    let out_dir = tmp.path().join("records");

    extract(&tmp)
        .args(["-o", out_dir.to_str().unwrap()])
        .arg(get_site_fixture_path("asha", "index.html"))
        .arg(get_site_fixture_path("seva", "index.html"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Output written to"));

    assert!(out_dir.join("asha.json").exists());
    let seva = std::fs::read_to_string(out_dir.join("seva.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&seva).unwrap();
    assert!(value["year_founded"].is_null());
}

#[test]
fn test_cli_invalid_input() {
    let tmp = TempDir::new().unwrap();
    extract(&tmp)
        .arg("nonexistent.html")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a URL or an existing file"));
}

#[test]
fn test_cli_batch_continues_past_failure() {
    let tmp = TempDir::new().unwrap();
    extract(&tmp)
        .args(["-f", "jsonl", "nonexistent.html", &get_site_fixture_path("seva", "index.html")])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Seva Foundation"))
        .stderr(predicate::str::contains("1 of 2 input(s) failed"));
}

#[test]
fn test_cli_invalid_format() {
    let tmp = TempDir::new().unwrap();
    extract(&tmp)
        .args(["-f", "markdown", &get_site_fixture_path("asha", "index.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Valid options: json, jsonl, text"));
}

#[test]
fn test_cli_max_subpages() {
    let tmp = TempDir::new().unwrap();
    let output = extract(&tmp)
        .args(["--max-subpages", "0", "--max-pdfs", "0", &get_site_fixture_path("asha", "index.html")])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["fields_of_work"].is_null());
    assert_eq!(value["contact_info"]["address"], "not found");
}

#[test]
fn test_cli_locale_file() {
    let tmp = TempDir::new().unwrap();
    extract(&tmp)
        .args(["--locale", tmp.path().join("missing.json").to_str().unwrap()])
        .arg(get_site_fixture_path("asha", "index.html"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load locale"));
}

#[test]
fn test_cli_verbose() {
    let tmp = TempDir::new().unwrap();
    extract(&tmp)
        .args(["-v", &get_site_fixture_path("seva", "index.html")])
        .assert()
        .success()
        .stderr(predicate::str::contains("ngoscope"))
        .stderr(predicate::str::contains("Batch Summary"));
}

#[test]
fn test_cli_completion_flags_are_accepted() {
    let completion_spec = include_str!("../build.rs");
    let flags: Vec<&str> =
        completion_spec.split("--\"").skip(1).filter_map(|rest| rest.split('"').next()).collect();
    assert!(flags.contains(&"out-dir"));

    let output = cmd().args(["extract", "--help"]).output().unwrap();
    let help = String::from_utf8(output.stdout).unwrap();
    for flag in flags {
        assert!(help.contains(&format!("--{} ", flag)) || help.contains(&format!("--{}\n", flag)), "--{}", flag);
    }
}

#[test]
fn test_cli_kebab_case_flags() {
    let tmp = TempDir::new().unwrap();
    let out_dir = tmp.path().join("records");
    extract(&tmp)
        .args(["--out-dir", out_dir.to_str().unwrap(), "--delay-ms", "0", "--user-agent", "ngoscope-test"])
        .args(["--wait-for-js", "--max-subpages", "1", "--max-pdfs", "0"])
        .arg(get_site_fixture_path("seva", "index.html"))
        .assert()
        .success();
    assert!(out_dir.join("seva.json").exists());
}

#[test]
fn test_cli_overrides_set_and_show() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().to_str().unwrap();

    cmd()
        .args(["--overrides-dir", dir, "overrides", "set", "www.asha.org", "contact_info.phone", "footer .helpline"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved contact_info.phone"));

    assert!(tmp.path().join("asha.org.txt").exists());

    cmd()
        .args(["--overrides-dir", dir, "overrides", "show", "asha.org"])
        .assert()
        .success()
        .stdout(predicate::str::contains("phone: footer .helpline"));
}

#[test]
fn test_cli_overrides_reject_bad_input() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().to_str().unwrap();

    cmd()
        .args(["--overrides-dir", dir, "overrides", "set", "asha.org", "mission", "p"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown field"));

    cmd()
        .args(["--overrides-dir", dir, "overrides", "set", "asha.org", "year_founded", "p[["])
        .assert()
        .failure();
}

#[test]
fn test_cli_overrides_show_empty() {
    let tmp = TempDir::new().unwrap();
    cmd()
        .args(["--overrides-dir", tmp.path().to_str().unwrap(), "overrides", "show", "seva.org"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No overrides for seva.org"));
}
