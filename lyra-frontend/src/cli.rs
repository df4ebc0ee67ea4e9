use std::path::PathBuf;

use lyra_config::EditorConfig;
use lyra_core::document::ProjectSettings;
use lyra_core::geometry::Vec2;
use lyra_core::shape::{Shape, ShapeGeometry, ShapeKind};
use lyra_core::units::DisplayUnit;
use lyra_engine::command::{CommandBus, CommandContext, CommandRequest};
use lyra_engine::draw;
use lyra_io::{DocumentSaver, XmlProjectFacade};
use tracing::{info, warn};

use crate::errors::FrontendError;
use crate::loader::{DocumentSource, LoadedScene, load_scene};

/// 一次 CLI 运行的输入。
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub project: Option<PathBuf>,
    pub demo: bool,
    pub commands: Vec<String>,
    pub save: Option<PathBuf>,
    pub unit: DisplayUnit,
}

/// 执行完命令与保存后的会话。
#[derive(Debug)]
pub struct CliSession {
    pub loaded: LoadedScene,
    pub command_log: Vec<String>,
    pub saved_to: Option<PathBuf>,
}

/// 加载文档，依次执行命令，按需保存。任何一步失败都会中止。
pub fn execute(options: &CliOptions, editor: &EditorConfig) -> Result<CliSession, FrontendError> {
    let mut loaded = load_scene(options.project.as_deref(), options.demo, editor)?;

    let bus = CommandBus::new();
    let mut command_log = Vec::with_capacity(options.commands.len());
    {
        let mut context = CommandContext {
            scene: &mut loaded.scene,
        };
        for line in &options.commands {
            let message = dispatch_cli_command(&bus, line, &mut context)?;
            command_log.push(message);
        }
    }

    let saved_to = match &options.save {
        Some(path) => {
            XmlProjectFacade::new().save(loaded.scene.document(), path)?;
            info!(path = %path.display(), "工程已保存");
            Some(path.clone())
        }
        None => None,
    };

    Ok(CliSession {
        loaded,
        command_log,
        saved_to,
    })
}

/// 执行并打印报告。
pub fn run(options: &CliOptions, editor: &EditorConfig) -> Result<(), FrontendError> {
    let session = execute(options, editor)?;
    print!("{}", render_report(&session, options.unit, editor));
    Ok(())
}

fn dispatch_cli_command(
    bus: &CommandBus,
    line: &str,
    context: &mut CommandContext<'_>,
) -> Result<String, FrontendError> {
    let Some(request) = CommandRequest::parse(line) else {
        return Err(FrontendError::UnknownCommand(line.trim().to_string()));
    };
    if !bus.available_commands().contains(&request.name.as_str()) {
        warn!(command = %request.name, "未注册的命令");
        return Err(FrontendError::UnknownCommand(request.name));
    }

    let response = bus.dispatch(&request, context);
    let message = response.message.unwrap_or_default();
    if response.success {
        info!(command = %request.name, "命令执行成功");
        Ok(message)
    } else {
        Err(FrontendError::CommandFailed {
            command: request.name,
            message,
        })
    }
}

/// 生成文本报告：工艺参数、图形列表、视图与绘制统计。长度按 `unit` 换算。
pub fn render_report(session: &CliSession, unit: DisplayUnit, editor: &EditorConfig) -> String {
    let scene = &session.loaded.scene;
    let document = scene.document();
    let view = scene.view();
    let mut lines = vec!["LyraTool 曝光图形编辑器 (CLI)".to_string()];

    match &session.loaded.source {
        DocumentSource::Xml(path) => lines.push(format!("已从 XML 加载工程：{}", path.display())),
        DocumentSource::Demo => lines.push("已构建内置示例工程".to_string()),
        DocumentSource::New => lines.push("新建空白工程".to_string()),
    }

    if !session.command_log.is_empty() {
        lines.push("命令输出：".to_string());
        lines.extend(
            session
                .command_log
                .iter()
                .map(|message| format!("  [命令] {message}")),
        );
    }

    lines.extend(describe_settings(&document.settings));

    lines.push(format!("图形 ({})：", document.len()));
    for (name, shape) in document.shapes() {
        lines.push(format!(
            "  - {name} [{}] 深度={} {}",
            shape.kind().display_name(),
            shape.depth,
            describe_shape(shape, unit)
        ));
    }

    let selection = scene.selection();
    if selection.is_empty() {
        lines.push("当前尚未选中任何图形。".to_string());
    } else {
        lines.push(format!("选中：{}", selection.join(", ")));
    }

    lines.push(format!(
        "视图：缩放={:.3}, 中心={}",
        view.zoom(),
        format_point(view.offset(), unit)
    ));
    lines.push(format!("比例尺：{}", draw::scale_bar(view).label));
    lines.push(format!("绘制命令：{}", scene.draw_list().len()));
    if editor.show_grid {
        lines.push(format!("网格线：{}", draw::grid_lines(view).len()));
    }
    if editor.show_axes {
        lines.push(format!("坐标轴：{}", draw::axes(view).len()));
    }
    if let Some(path) = &session.saved_to {
        lines.push(format!("已保存到：{}", path.display()));
    }
    lines.push(format!(
        "支持的命令：{}",
        CommandBus::new().available_commands().join(", ")
    ));

    let mut report = lines.join("\n");
    report.push('\n');
    report
}

fn describe_settings(settings: &ProjectSettings) -> Vec<String> {
    let mut lines = vec![
        "材料：".to_string(),
        format!("  工艺: {}", settings.process),
        format!("  材料配置: {}", settings.material_name),
    ];
    if !settings.description.is_empty() {
        lines.push(format!("  描述: {}", settings.description));
    }
    lines.extend([
        format!("  能量: {:.3} kV", settings.energy * 1e-3),
        format!("  驻留时间: {:.3} us", settings.dwell_time * 1e6),
        format!("  重叠: {:.1}", settings.overlap),
        format!("  剂量: {:.3} uC/cm^2", settings.dose * 1e2),
        "设置：".to_string(),
        format!("  束流: {:.3} pA", settings.beam_current * 1e12),
        format!("  束斑: {:.3} nm", settings.spot_size * 1e9),
        format!(
            "  扫描顺序: {}",
            if settings.parallel { "并行" } else { "串行" }
        ),
    ]);
    lines
}

fn format_length(meters: f64, unit: DisplayUnit) -> String {
    format!("{:.3} {}", unit.to_display(meters), unit.suffix())
}

fn format_point(point: Vec2, unit: DisplayUnit) -> String {
    format!(
        "({:.3}, {:.3}) {}",
        unit.to_display(point.x()),
        unit.to_display(point.y()),
        unit.suffix()
    )
}

fn format_millis(seconds: f64) -> String {
    format!("{:.3} ms", seconds * 1e3)
}

fn describe_shape(shape: &Shape, unit: DisplayUnit) -> String {
    let mut text = match &shape.geometry {
        ShapeGeometry::Point(point) => format!("位置={}", format_point(point.center, unit)),
        ShapeGeometry::Cross(cross) | ShapeGeometry::ReferencePoint(cross) => format!(
            "中心={} 宽度={}",
            format_point(cross.center, unit),
            format_length(cross.width, unit)
        ),
        ShapeGeometry::Line(line) => format!(
            "起点={} 终点={} 长度={}",
            format_point(line.begin, unit),
            format_point(line.end, unit),
            format_length(line.length(), unit)
        ),
        ShapeGeometry::Rectangle(rect)
        | ShapeGeometry::FilledRectangle(rect)
        | ShapeGeometry::RectanglePolish(rect)
        | ShapeGeometry::RectangleStairs(rect) => format!(
            "中心={} 尺寸={} × {} 角度={:.1}° 行稳定={}",
            format_point(rect.center, unit),
            format_length(rect.dimensions.x(), unit),
            format_length(rect.dimensions.y(), unit),
            rect.angle,
            format_millis(rect.settle_time_line)
        ),
        ShapeGeometry::Circle(circle) | ShapeGeometry::FilledCircle(circle) => format!(
            "中心={} 半径={}",
            format_point(circle.center, unit),
            format_length(circle.radius, unit)
        ),
        ShapeGeometry::Annulus(annulus)
        | ShapeGeometry::CirclePolish(annulus)
        | ShapeGeometry::CircleStairs(annulus) => format!(
            "中心={} 外半径={} 内半径={}",
            format_point(annulus.center, unit),
            format_length(annulus.radius, unit),
            format_length(annulus.inner_radius, unit)
        ),
    };
    if shape.kind() != ShapeKind::ReferencePoint {
        text.push_str(&format!(" 帧稳定={}", format_millis(shape.settle_time_frame)));
    }
    text
}
