use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

const CALIBRATION: &str = r#"{
  "calib": [[600.0, 0.0, 320.0], [0.0, 600.0, 240.0], [0.0, 0.0, 1.0]],
  "dist": [0.0, 0.0, 0.0, 0.0]
}"#;

// Frame 1 sees marker 0 half a marker-side away on the optical axis; the
// remaining frames see nothing, so the measurement sticks.
const SESSION: &str = r#"{
  "frames": [
    {
      "observations": [
        {
          "id": 0,
          "center": [16.0, 12.0],
          "corners": [[12.0, 8.0], [20.0, 8.0], [20.0, 16.0], [12.0, 16.0]],
          "confidence": 1.0
        }
      ],
      "pose": [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.5],
        [0.0, 0.0, 0.0, 1.0]
      ]
    },
    {},
    {}
  ]
}"#;

fn write_fixture(dir: &Path) {
    std::fs::write(dir.join("calibration.json"), CALIBRATION).expect("write calibration");
    std::fs::write(dir.join("session.json"), SESSION).expect("write session");
    for name in ["frame_a.png", "frame_b.png", "frame_c.png"] {
        let img = image::RgbImage::from_pixel(8, 8, image::Rgb([40, 80, 120]));
        img.save(dir.join(name)).expect("write frame");
    }
}

#[test]
fn replay_run_reports_the_sticky_distance() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixture(dir.path());

    Command::cargo_bin("marker-range")
        .expect("binary")
        .arg("--calibration")
        .arg(dir.path().join("calibration.json"))
        .arg("--replay")
        .arg(dir.path())
        .args(["--width", "32", "--height", "24", "--marker-size", "8"])
        .assert()
        .success()
        .stdout(predicate::str::contains("final distance: 4.0000"));

    // One composited frame per input image.
    let out = dir.path().join("composited");
    for name in ["frame_00000.png", "frame_00001.png", "frame_00002.png"] {
        assert!(out.join(name).exists(), "missing {name}");
    }
}

#[test]
fn missing_calibration_fails_with_a_clear_message() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixture(dir.path());

    Command::cargo_bin("marker-range")
        .expect("binary")
        .arg("--calibration")
        .arg(dir.path().join("does-not-exist.json"))
        .arg("--replay")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("calibration"));
}

#[test]
fn empty_replay_directory_fails_to_open() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("calibration.json"), CALIBRATION).expect("write calibration");
    std::fs::write(dir.path().join("session.json"), SESSION).expect("write session");

    Command::cargo_bin("marker-range")
        .expect("binary")
        .arg("--calibration")
        .arg(dir.path().join("calibration.json"))
        .arg("--replay")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no frame images"));
}
