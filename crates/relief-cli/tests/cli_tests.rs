//! End-to-end tests for the `relief` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn relief(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_relief"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn write_png(dir: &Path, width: u32, height: u32) -> PathBuf {
    let path = dir.join("input.png");
    image::GrayImage::from_fn(width, height, |x, y| image::Luma([((x + y) * 20) as u8]))
        .save(&path)
        .unwrap();
    path
}

#[test]
fn test_convert_then_info_json() {
    let dir = TempDir::new().unwrap();
    let image = write_png(dir.path(), 5, 4);
    let stl = dir.path().join("out.stl");

    let out = relief(&[
        "--format",
        "json",
        "convert",
        image.to_str().unwrap(),
        "-o",
        stl.to_str().unwrap(),
        "--max-height",
        "3",
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["faces"], 48);
    assert_eq!(report["vertices"], 40);
    assert_eq!(report["params"]["max_height"], 3.0);
    assert_eq!(report["params"]["layout"], "interleaved");

    let out = relief(&["--format", "json", "info", stl.to_str().unwrap()]);
    assert!(out.status.success());
    let info: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(info["triangles"], 48);
    assert_eq!(info["bounds"]["min"][2], -1.0);
}

#[test]
fn test_convert_ascii_text_output() {
    let dir = TempDir::new().unwrap();
    let image = write_png(dir.path(), 3, 3);
    let stl = dir.path().join("out.stl");

    let out = relief(&[
        "convert",
        image.to_str().unwrap(),
        "-o",
        stl.to_str().unwrap(),
        "--ascii",
        "--layout",
        "blocks",
    ]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("16 faces"));
    assert!(std::fs::read_to_string(&stl).unwrap().starts_with("solid relief"));
}

#[test]
fn test_invalid_parameter_exits_with_code() {
    let dir = TempDir::new().unwrap();
    let stl = dir.path().join("out.stl");

    let out = relief(&[
        "convert",
        dir.path().join("missing.png").to_str().unwrap(),
        "-o",
        stl.to_str().unwrap(),
        "--max-height=-2",
    ]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Failed to convert"));
    assert!(stderr.contains("invalid max_height = -2"));
    assert!(stderr.contains("RELIEF-2001"));
    assert!(stderr.contains("parameter `max_height`"));
    assert!(!stl.exists());
}

#[test]
fn test_missing_image_reports_load_error() {
    let dir = TempDir::new().unwrap();
    let out = relief(&[
        "convert",
        dir.path().join("missing.png").to_str().unwrap(),
        "-o",
        dir.path().join("out.stl").to_str().unwrap(),
    ]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("RELIEF-1001"));
}
