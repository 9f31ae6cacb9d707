use assert_cmd::Command;
use image::{GrayImage, Luma};
use predicates::prelude::*;
use ring_align::*;
use std::path::Path;
use tempfile::TempDir;

fn write_captcha(dir: &Path, angle: f64) -> std::path::PathBuf {
    let source = Image::from_gray(GrayImage::from_fn(300, 300, |x, y| {
        let phi = (y as f64 - 150.0).atan2(x as f64 - 150.0);
        let v = 128.0
            + 60.0 * phi.cos()
            + 35.0 * (2.0 * phi + 0.5).sin()
            + 25.0 * (5.0 * phi).sin();
        Luma([v.round().clamp(0.0, 255.0) as u8])
    }));
    let path = dir.join("captcha.png");
    RotationRenderer::new(&source, 60)
        .unwrap()
        .render(angle)
        .save(&path)
        .unwrap();
    path
}

fn ringalign() -> Command {
    Command::cargo_bin("ringalign").unwrap()
}

#[test]
fn test_help_lists_subcommands() {
    ringalign()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("solve"))
        .stdout(predicate::str::contains("compare-methods"));
}

#[test]
fn test_solve_prints_json_report() {
    let dir = TempDir::new().unwrap();
    let image = write_captcha(dir.path(), 47.0);
    let output = dir.path().join("out/report.json");

    ringalign()
        .args(["solve", image.to_str().unwrap()])
        .args(["--inner-diameter", "120", "--outer-diameter", "296"])
        .args(["--output", output.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"best_shift\": 47"))
        .stdout(predicate::str::contains("\"aligned\": true"));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap();
    assert_eq!(saved["best_shift"], 47);
    assert_eq!(saved["strategy"], "point");
}

#[test]
fn test_solve_missing_image_fails() {
    ringalign()
        .args(["solve", "/no/such/captcha.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load image"));
}

#[test]
fn test_invalid_override_fails() {
    let dir = TempDir::new().unwrap();
    let image = write_captcha(dir.path(), 0.0);
    ringalign()
        .args(["solve", image.to_str().unwrap(), "--num-points", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid alignment configuration"));
}

#[test]
fn test_render_then_sweep() {
    let dir = TempDir::new().unwrap();
    let source = write_captcha(dir.path(), 0.0);
    let fixtures = dir.path().join("fixtures");

    ringalign()
        .args(["render", source.to_str().unwrap(), "--radius", "60", "--step", "120"])
        .args(["--out-dir", fixtures.to_str().unwrap()])
        .assert()
        .success();
    assert!(fixtures.join("rotated_000deg.png").exists());
    assert!(fixtures.join("rotated_120deg.png").exists());
    assert!(fixtures.join("rotated_240deg.png").exists());

    ringalign()
        .args(["sweep", fixtures.to_str().unwrap()])
        .args(["--inner-diameter", "120", "--outer-diameter", "296"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"hits\": 3"));
}

#[test]
fn test_config_file_is_applied() {
    let dir = TempDir::new().unwrap();
    let image = write_captcha(dir.path(), 90.0);
    let config = dir.path().join("ringalign.toml");
    std::fs::write(
        &config,
        concat!(
            "[alignment]\ninner_diameter = 120\nouter_diameter = 296\n",
            "method = \"brute-force\"\n\n[logging]\nlevel = \"warn\"\n",
        ),
    )
    .unwrap();

    ringalign()
        .args(["--config", config.to_str().unwrap(), "solve", image.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"best_shift\": 90"))
        .stdout(predicate::str::contains("\"method\": \"brute-force\""));
}

#[test]
fn test_compare_methods_reports_agreement() {
    let dir = TempDir::new().unwrap();
    let image = write_captcha(dir.path(), 10.0);
    ringalign()
        .args(["compare-methods", image.to_str().unwrap(), "--repetitions", "1"])
        .args(["--inner-diameter", "120", "--outer-diameter", "296"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"shifts_agree\": true"));
}
