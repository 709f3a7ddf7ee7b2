//! `shanan-sentry` 可执行文件的命令行行为

#![allow(deprecated)] // cargo_bin 已被标记弃用

use assert_cmd::Command;
use predicates::prelude::*;

fn sentry(dir: &tempfile::TempDir) -> Command {
  let mut cmd = Command::cargo_bin("shanan-sentry").unwrap();
  cmd
    .current_dir(dir.path())
    .arg("--captures-dir")
    .arg(dir.path().join("captures"))
    .arg("--latest")
    .arg(dir.path().join("detection.jpg"));
  cmd
}

#[test]
fn missing_image_exits_with_one() {
  let dir = tempfile::tempdir().unwrap();

  sentry(&dir)
    .args(["-i", "nope.jpg"])
    .assert()
    .code(1)
    .stdout(predicate::str::contains("Image not found"));
  assert!(!dir.path().join("captures").exists());
}

#[test]
fn image_flag_is_required_in_practice() {
  let dir = tempfile::tempdir().unwrap();

  sentry(&dir).assert().code(1);
}

#[test]
fn unknown_color_mode_is_a_usage_error() {
  let dir = tempfile::tempdir().unwrap();

  sentry(&dir)
    .args(["-c", "yuv", "-i", "shot.jpg"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid value").and(predicate::str::contains("yuv")));
}

#[test]
fn mean_needs_three_values() {
  let dir = tempfile::tempdir().unwrap();

  sentry(&dir)
    .args(["-M", "1", "2", "-i", "shot.jpg"])
    .assert()
    .failure();
}

#[test]
fn help_lists_the_short_flags() {
  let mut cmd = Command::cargo_bin("shanan-sentry").unwrap();
  cmd.arg("--help").assert().success().stdout(
    predicate::str::contains("--graph")
      .and(predicate::str::contains("--colormode"))
      .and(predicate::str::contains("--threshold")),
  );
}

#[cfg(not(feature = "rknpu"))]
#[test]
fn build_without_backend_reports_no_device() {
  use image::{Rgb, RgbImage};

  let dir = tempfile::tempdir().unwrap();
  RgbImage::from_pixel(16, 16, Rgb([20, 20, 20]))
    .save(dir.path().join("shot.png"))
    .unwrap();
  std::fs::write(dir.path().join("labels.txt"), "classes\nbackground\n").unwrap();

  sentry(&dir)
    .args(["-i", "shot.png", "-l", "labels.txt", "-g", "missing-graph"])
    .assert()
    .code(3)
    .stdout(predicate::str::contains("No accelerator devices found"));
}
