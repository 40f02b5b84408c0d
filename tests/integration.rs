use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const SELECTION_SORT: &str = include_str!("fixtures/selection_sort.cpp");

fn algonote_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("algonote");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_content = format!(
        r#"[generation]
mode = "heuristic"
provider = "disabled"

[output]
dir = "{}/notes"

[notion]
enabled = false
"#,
        root.display()
    );
    let config_path = root.join("algonote.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_algonote(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = algonote_binary();
    let output = Command::new(&binary)
        .current_dir(config_path.parent().unwrap())
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("ALGONOTE_MODE")
        .env_remove("OPENAI_API_KEY")
        .env_remove("NOTION_TOKEN")
        .env_remove("NOTION_API_KEY")
        .env_remove("NOTION_PARENT_PAGE_ID")
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run algonote binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn write_source(root: &Path, name: &str, text: &str) -> PathBuf {
    let path = root.join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_selection_sort_json() {
    let (tmp, config) = setup_test_env();
    let src = write_source(tmp.path(), "selection_sort.cpp", SELECTION_SORT);

    let (stdout, stderr, success) = run_algonote(
        &config,
        &[src.to_str().unwrap(), "--json", "--no-save", "--progress", "off"],
    );
    assert!(success, "algonote failed: {}", stderr);

    let note: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(note["title"], "Selection Sort (likely)");
    assert_eq!(note["language"], "cpp");
    assert!(note["complexity"].as_str().unwrap().contains("O(n^2)"));
    assert!(note["pseudocode"].as_str().unwrap().contains("minIndex"));
    assert_eq!(note["examples"].as_array().unwrap().len(), 1);
    assert_eq!(note["code"], SELECTION_SORT);

    let cases: Vec<&str> = note["edgeCases"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap())
        .collect();
    for seed in ["empty input", "single element", "duplicates"] {
        assert!(cases.contains(&seed), "missing {}", seed);
    }
}

#[test]
fn test_empty_file() {
    let (tmp, config) = setup_test_env();
    let src = write_source(tmp.path(), "blank.py", "");

    let (stdout, stderr, success) =
        run_algonote(&config, &[src.to_str().unwrap(), "--json", "--no-save"]);
    assert!(success, "algonote failed: {}", stderr);

    let note: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(note["title"], "Problem not confidently inferred");
    assert_eq!(note["language"], "py");
    assert_eq!(
        note["complexity"],
        "Time: unknown (heuristic), Space: unknown (heuristic)"
    );
    assert_eq!(
        note["edgeCases"],
        serde_json::json!(["empty input", "single element", "duplicates"])
    );
    assert_eq!(note["examples"], serde_json::json!([]));
    assert_eq!(note["explanation"], "");
}

#[test]
fn test_saves_to_derived_path() {
    let (tmp, config) = setup_test_env();
    let src = write_source(tmp.path(), "selection_sort.cpp", SELECTION_SORT);

    let (stdout, stderr, success) = run_algonote(&config, &[src.to_str().unwrap()]);
    assert!(success, "algonote failed: {}", stderr);

    let expected = tmp.path().join("notes/selection-sort-likely.json");
    assert!(expected.exists(), "note not written; stdout: {}", stdout);
    assert!(stdout.contains("Selection Sort (likely)"));
    assert!(stdout.contains("saved:"));

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&expected).unwrap()).unwrap();
    assert_eq!(saved["title"], "Selection Sort (likely)");
}

#[test]
fn test_explicit_out_path() {
    let (tmp, config) = setup_test_env();
    let src = write_source(
        tmp.path(),
        "search.java",
        "int lo = 0, hi = n - 1;\nwhile (lo <= hi) {\n    int mid = lo + (hi - lo) / 2;\n}\n",
    );
    let out = tmp.path().join("custom/dir/bs.json");

    let (_stdout, stderr, success) = run_algonote(
        &config,
        &[src.to_str().unwrap(), "--out", out.to_str().unwrap()],
    );
    assert!(success, "algonote failed: {}", stderr);

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(saved["complexity"], "Time: O(log n), Space: O(1)");
    assert!(!tmp.path().join("notes").exists());
}

#[test]
fn test_llm_mode_without_key_falls_back() {
    let (tmp, _config) = setup_test_env();
    let config = tmp.path().join("llm.toml");
    fs::write(&config, "[generation]\nmode = \"llm\"\n\n[notion]\nenabled = false\n").unwrap();
    let src = write_source(tmp.path(), "selection_sort.cpp", SELECTION_SORT);

    let (stdout, stderr, success) =
        run_algonote(&config, &[src.to_str().unwrap(), "--json", "--no-save"]);
    assert!(success, "algonote failed: {}", stderr);

    let note: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(note["title"], "Selection Sort (likely)");
    assert!(stderr.contains("generation failed"));
}

#[test]
fn test_missing_source_file_fails() {
    let (tmp, config) = setup_test_env();
    let missing = tmp.path().join("nope.cpp");

    let (_stdout, stderr, success) = run_algonote(&config, &[missing.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("Failed to read source file"));
}

#[test]
fn test_missing_config_file_fails() {
    let (tmp, _config) = setup_test_env();
    let src = write_source(tmp.path(), "a.py", "print(1)\n");
    let missing = tmp.path().join("missing.toml");

    let (_stdout, _stderr, success) = run_algonote(&missing, &[src.to_str().unwrap()]);
    assert!(!success);
}

#[test]
fn test_invalid_mode_rejected() {
    let (tmp, config) = setup_test_env();
    let src = write_source(tmp.path(), "a.py", "print(1)\n");

    let (_stdout, _stderr, success) =
        run_algonote(&config, &[src.to_str().unwrap(), "--mode", "turbo"]);
    assert!(!success);
}
