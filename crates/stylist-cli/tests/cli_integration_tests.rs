//! CLI integration tests for stylist
//!
//! Tests the stylist CLI commands end-to-end using assert_cmd.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PNG_BYTES: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Command isolated from the caller's config, credentials and proxies
#[allow(deprecated)]
fn stylist_cmd(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("stylist").unwrap();
    cmd.current_dir(config_dir);
    cmd.env("STYLIST_CONFIG_DIR", config_dir);
    for var in [
        "STYLIST_API_KEY",
        "GEMINI_API_KEY",
        "API_KEY",
        "HTTP_PROXY",
        "http_proxy",
        "HTTPS_PROXY",
        "https_proxy",
        "ALL_PROXY",
        "all_proxy",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn write_photo(dir: &Path, name: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, PNG_BYTES).unwrap();
    path.display().to_string()
}

/// Accept one HTTP request and answer it with `reply`; yields the request head
fn serve_once(reply: String) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 8192];

        let header_end = loop {
            let n = stream.read(&mut chunk).unwrap();
            assert!(n > 0, "client closed early");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };
        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let content_length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while buf.len() < header_end + content_length {
            let n = stream.read(&mut chunk).unwrap();
            assert!(n > 0, "client closed early");
            buf.extend_from_slice(&chunk[..n]);
        }

        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            reply.len(),
            reply
        );
        stream.write_all(response.as_bytes()).unwrap();
        head
    });

    (format!("http://{}/v1beta", addr), handle)
}

#[test]
fn test_prompts_lists_examples() {
    let temp_dir = TempDir::new().unwrap();

    stylist_cmd(temp_dir.path())
        .arg("prompts")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "1. A black leather jacket with a white t-shirt",
        ))
        .stdout(predicate::str::contains("4. Vintage 1920s flapper dress"));
}

#[test]
fn test_prompts_json() {
    let temp_dir = TempDir::new().unwrap();

    let output = stylist_cmd(temp_dir.path())
        .args(["--format", "json", "prompts"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let prompts: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(prompts.len(), 4);
    assert_eq!(prompts[2], "Futuristic sci-fi armor");
}

#[test]
fn test_config_path_honours_override() {
    let temp_dir = TempDir::new().unwrap();
    let expected = temp_dir.path().join("config.toml");

    stylist_cmd(temp_dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.display().to_string()));
}

#[test]
fn test_config_set_then_get() {
    let temp_dir = TempDir::new().unwrap();

    stylist_cmd(temp_dir.path())
        .args(["config", "set", "output.file_stem", "my-look"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set output.file_stem = my-look"));

    assert!(temp_dir.path().join("config.toml").exists());

    stylist_cmd(temp_dir.path())
        .args(["config", "get", "output.file_stem"])
        .assert()
        .success()
        .stdout(predicate::str::diff("my-look\n"));
}

#[test]
fn test_config_refuses_api_key() {
    let temp_dir = TempDir::new().unwrap();

    stylist_cmd(temp_dir.path())
        .args(["config", "set", "api.api_key", "secret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("environment variable"));
}

#[test]
fn test_config_list_redacts_key() {
    let temp_dir = TempDir::new().unwrap();

    stylist_cmd(temp_dir.path())
        .env("GEMINI_API_KEY", "abcdefgh1234")
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("api.api_key = ***1234"))
        .stdout(predicate::str::contains("abcdefgh").not());
}

#[test]
fn test_config_reset_removes_file() {
    let temp_dir = TempDir::new().unwrap();

    stylist_cmd(temp_dir.path())
        .args(["config", "set", "api.model", "other-model"])
        .assert()
        .success();

    stylist_cmd(temp_dir.path())
        .args(["config", "reset"])
        .assert()
        .success();

    assert!(!temp_dir.path().join("config.toml").exists());
    stylist_cmd(temp_dir.path())
        .args(["config", "get", "api.model"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gemini-2.5-flash-image"));
}

#[test]
fn test_style_without_key_fails() {
    let temp_dir = TempDir::new().unwrap();
    let photo = write_photo(temp_dir.path(), "me.png");

    stylist_cmd(temp_dir.path())
        .args(["style", &photo, "--prompt", "A formal blue evening gown"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E601"))
        .stderr(predicate::str::contains("STYLIST_API_KEY"));
}

#[test]
fn test_style_blank_prompt_is_refused() {
    let temp_dir = TempDir::new().unwrap();
    let photo = write_photo(temp_dir.path(), "me.png");

    stylist_cmd(temp_dir.path())
        .env("STYLIST_API_KEY", "test-key")
        .args(["style", &photo, "--prompt", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E800"))
        .stderr(predicate::str::contains(
            "Please upload an image and enter a style prompt.",
        ));
}

#[test]
fn test_style_missing_image_fails() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.png").display().to_string();

    stylist_cmd(temp_dir.path())
        .env("STYLIST_API_KEY", "test-key")
        .args(["style", &missing, "--prompt", "Futuristic sci-fi armor"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E803"));
}

#[test]
fn test_style_unsupported_type_fails() {
    let temp_dir = TempDir::new().unwrap();
    let gif = temp_dir.path().join("anim.gif");
    std::fs::write(&gif, b"GIF89a").unwrap();

    stylist_cmd(temp_dir.path())
        .env("STYLIST_API_KEY", "test-key")
        .args(["style", &gif.display().to_string(), "--prompt", "armor"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E801"));
}

#[test]
fn test_style_json_error_shape() {
    let temp_dir = TempDir::new().unwrap();
    let photo = write_photo(temp_dir.path(), "me.png");

    let output = stylist_cmd(temp_dir.path())
        .args(["--format", "json", "style", &photo, "--prompt", "gown"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["error"]["code"], "E601");
}

#[test]
fn test_style_saves_result() {
    let temp_dir = TempDir::new().unwrap();
    let photo = write_photo(temp_dir.path(), "me.png");
    let out_dir = temp_dir.path().join("looks");

    let reply = serde_json::json!({
        "candidates": [{
            "content": { "parts": [{ "inlineData": { "mimeType": "image/png", "data": "c3R5bGVk" } }] }
        }]
    })
    .to_string();
    let (base_url, server) = serve_once(reply);

    stylist_cmd(temp_dir.path())
        .args(["config", "set", "api.base_url", &base_url])
        .assert()
        .success();

    stylist_cmd(temp_dir.path())
        .env("STYLIST_API_KEY", "test-key")
        .args([
            "style",
            &photo,
            "--prompt",
            "A black leather jacket with a white t-shirt",
            "--output",
            &out_dir.display().to_string(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("ai-styled-image.png"));

    let saved = out_dir.join("ai-styled-image.png");
    assert_eq!(std::fs::read(saved).unwrap(), b"styled");

    let head = server.join().unwrap();
    assert!(head.starts_with("POST /v1beta/models/gemini-2.5-flash-image:generateContent"));
    assert!(head.to_ascii_lowercase().contains("x-goog-api-key: test-key"));
}

#[test]
fn test_style_prints_data_uri() {
    let temp_dir = TempDir::new().unwrap();
    let photo = write_photo(temp_dir.path(), "me.png");

    let reply = serde_json::json!({
        "candidates": [{
            "content": { "parts": [{ "inlineData": { "mimeType": "image/png", "data": "c3R5bGVk" } }] }
        }]
    })
    .to_string();
    let (base_url, server) = serve_once(reply);

    stylist_cmd(temp_dir.path())
        .args(["config", "set", "api.base_url", &base_url])
        .assert()
        .success();

    stylist_cmd(temp_dir.path())
        .env("GEMINI_API_KEY", "test-key")
        .args(["-q", "style", &photo, "--prompt", "gown", "--data-uri"])
        .assert()
        .success()
        .stdout(predicate::str::diff("data:image/png;base64,c3R5bGVk\n"));

    server.join().unwrap();
}

#[test]
fn test_doctor_reports_missing_key() {
    let temp_dir = TempDir::new().unwrap();

    stylist_cmd(temp_dir.path())
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("[!!] API Key: Not configured"))
        .stdout(predicate::str::contains("using defaults"));
}

#[test]
fn test_doctor_json_with_key() {
    let temp_dir = TempDir::new().unwrap();

    let output = stylist_cmd(temp_dir.path())
        .env("STYLIST_API_KEY", "key-with-suffix-9876")
        .args(["doctor", "--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["ok"], true);
    let text = body.to_string();
    assert!(text.contains("***9876"));
    assert!(!text.contains("key-with-suffix"));
}
