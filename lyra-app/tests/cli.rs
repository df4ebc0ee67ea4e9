use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn sample_project() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("../lyra-io/tests/data/sample_project.xml");
    path
}

/// 在空的临时目录中运行，避免读到仓库里的配置文件。
fn lyra(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("lyra-app").expect("binary exists");
    cmd.current_dir(workdir).env_remove("LYRA_CONFIG");
    cmd
}

#[test]
fn demo_prints_report() {
    let dir = tempfile::tempdir().unwrap();
    lyra(dir.path())
        .arg("--demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("已构建内置示例工程"))
        .stdout(predicate::str::contains("图形 (7)："))
        .stdout(predicate::str::contains("绘制命令：11"));
}

#[test]
fn opens_project_in_requested_unit() {
    let dir = tempfile::tempdir().unwrap();
    lyra(dir.path())
        .args(["--unit", "nm"])
        .arg(sample_project())
        .assert()
        .success()
        .stdout(predicate::str::contains("Dot 1 [Point] 深度=1 位置=(1000.000, 2000.000) nm"))
        .stdout(predicate::str::contains("  束流: 100.000 pA"));
}

#[test]
fn commands_and_save_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.xml");

    lyra(dir.path())
        .args(["--command", "add_shape annulus", "--command", "add_shape cross"])
        .arg("--save")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("[命令] 已添加 Annulus 1"))
        .stdout(predicate::str::contains("选中：Cross 1"));

    let saved = fs::read_to_string(&target).unwrap();
    assert!(saved.contains(r#"<CircleAnnulus Name="Annulus 1""#));
    assert!(saved.contains(r#"<Cross Name="Cross 1""#));

    lyra(dir.path())
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("图形 (2)："));
}

#[test]
fn unknown_command_fails() {
    let dir = tempfile::tempdir().unwrap();
    lyra(dir.path())
        .args(["--demo", "--command", "explode"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("explode"));
}

#[test]
fn missing_project_fails() {
    let dir = tempfile::tempdir().unwrap();
    lyra(dir.path())
        .arg(dir.path().join("absent.xml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.xml"));
}

#[test]
fn invalid_unit_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    lyra(dir.path())
        .args(["--unit", "furlong"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown display unit"));
}

#[test]
fn config_file_sets_unit_and_guides() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("lyra.toml");
    fs::write(
        &config,
        "[logging]\nlevel = \"warn\"\n\n[editor]\ndisplay_unit = \"mm\"\nshow_grid = false\n",
    )
    .unwrap();

    lyra(dir.path())
        .arg("--config")
        .arg(&config)
        .arg(sample_project())
        .assert()
        .success()
        .stdout(predicate::str::contains("位置=(0.001, 0.002) mm"))
        .stdout(predicate::str::contains("网格线：").not())
        .stdout(predicate::str::contains("坐标轴："));
}

#[test]
fn discovers_default_config_in_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("config")).unwrap();
    fs::write(
        dir.path().join("config/default.toml"),
        "[editor]\ndisplay_unit = \"nm\"\n",
    )
    .unwrap();

    lyra(dir.path())
        .arg(sample_project())
        .assert()
        .success()
        .stdout(predicate::str::contains("宽度=2000.000 nm"));
}
