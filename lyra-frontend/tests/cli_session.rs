use std::path::PathBuf;

use lyra_config::EditorConfig;
use lyra_core::units::DisplayUnit;
use lyra_frontend::cli::{CliOptions, execute, render_report};
use lyra_frontend::loader::DocumentSource;
use lyra_io::{DocumentLoader, XmlProjectFacade};

fn sample_project() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("../lyra-io/tests/data/sample_project.xml");
    path
}

#[test]
fn demo_report_lists_shapes_and_draw_count() {
    let editor = EditorConfig::default();
    let options = CliOptions {
        demo: true,
        ..CliOptions::default()
    };
    let session = execute(&options, &editor).expect("运行示例失败");
    assert_eq!(session.loaded.source, DocumentSource::Demo);

    let report = render_report(&session, DisplayUnit::Micrometers, &editor);
    assert!(report.contains("已构建内置示例工程"));
    assert!(report.contains("图形 (7)："));
    assert!(report.contains("  - Circle 1 [Circle] 深度=1 中心=(1.000, 1.000) um 半径=1.000 um"));
    assert!(report.contains("选中：Circle 1, Filled rect 1"));
    assert!(report.contains("绘制命令：11"));
    assert!(report.contains("网格线："));
    assert!(report.contains("坐标轴："));
    assert!(report.contains("add_shape"));
}

#[test]
fn commands_run_in_order_and_result_is_saved() {
    let dir = tempfile::tempdir().expect("创建临时目录");
    let target = dir.path().join("edited.xml");
    let editor = EditorConfig::default();
    let options = CliOptions {
        project: None,
        demo: true,
        commands: vec![
            "select_all".to_string(),
            "duplicate_selection".to_string(),
            "remove_selection".to_string(),
            "add_shape filled circle".to_string(),
            "zoom_out 5".to_string(),
        ],
        save: Some(target.clone()),
        unit: DisplayUnit::Nanometers,
    };
    let session = execute(&options, &editor).expect("执行命令失败");
    assert_eq!(session.command_log.len(), 5);
    assert_eq!(session.command_log[3], "已添加 Filled circle 2");
    assert_eq!(session.saved_to.as_deref(), Some(target.as_path()));
    assert_eq!(session.loaded.scene.selection(), vec!["Filled circle 2"]);
    assert_eq!(session.loaded.scene.view().zoom(), 6.0);

    let reloaded = XmlProjectFacade::new().load(&target).expect("重新读取失败");
    assert_eq!(reloaded.len(), 8);
    assert_eq!(&reloaded, session.loaded.scene.document());

    let report = render_report(&session, options.unit, &editor);
    assert!(report.contains("  [命令] 已添加 Filled circle 2"));
    assert!(report.contains("半径=1000.000 nm"));
    assert!(report.contains("已保存到："));
}

#[test]
fn xml_project_report_uses_engineering_units() {
    let editor = EditorConfig {
        show_grid: false,
        show_axes: false,
        ..EditorConfig::default()
    };
    let options = CliOptions {
        project: Some(sample_project()),
        ..CliOptions::default()
    };
    let session = execute(&options, &editor).expect("读取样例失败");
    let report = render_report(&session, DisplayUnit::Micrometers, &editor);

    assert!(report.contains("已从 XML 加载工程："));
    assert!(report.contains("  材料配置: PMMA 950K"));
    assert!(report.contains("  描述: test & calibration"));
    assert!(report.contains("  能量: 30.000 kV"));
    assert!(report.contains("  扫描顺序: 并行"));
    assert!(report.contains(
        "  - Filled rect 1 [Filled Rectangle] 深度=4 中心=(4.000, 4.000) um \
         尺寸=2.000 um × 3.000 um 角度=30.0° 行稳定=0.500 ms 帧稳定=2.000 ms"
    ));
    assert!(report.contains("  - Ref A [Reference Point] 深度=1 中心=(-5.000, 5.000) um 宽度=2.000 um\n"));
    assert!(report.contains("当前尚未选中任何图形。"));
    assert!(!report.contains("网格线："));
    assert!(!report.contains("坐标轴："));
}
