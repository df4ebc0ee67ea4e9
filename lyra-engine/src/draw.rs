//! 绘制描述：引擎只产出屏幕坐标下的图元列表，由渲染端负责实际绘制。

use lyra_core::geometry::Vec2;
use lyra_core::shape::{Shape, ShapeGeometry};
use lyra_core::units::{larger_pow, meters_pretty, round_to_next, smaller_pow};

use crate::viewport::ViewState;

const OUTLINE_THICKNESS: f64 = 2.0;
const LINE_THICKNESS: f64 = 4.0;
const POINT_RADIUS: f64 = 4.0;
const AXIS_THICKNESS: f64 = 3.0;
const MIN_GRID_PIXELS: f64 = 6.0;
const SCALE_BAR_PIXELS: f64 = 130.0;
const SCALE_BAR_MARGIN: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorRole {
    Normal,
    Selected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillMode {
    /// 半透明背景填充。
    Background,
    /// 前景色实心填充。
    Solid,
    Outline,
}

/// 屏幕坐标（像素）下的图元。
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Point {
        center: Vec2,
        radius: f64,
    },
    Cross {
        center: Vec2,
        half_width: f64,
        thickness: f64,
    },
    Line {
        start: Vec2,
        end: Vec2,
        thickness: f64,
    },
    Circle {
        center: Vec2,
        radius: f64,
        thickness: f64,
    },
    Annulus {
        center: Vec2,
        outer: f64,
        inner: f64,
    },
    Quad {
        corners: [Vec2; 4],
        thickness: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub primitive: Primitive,
    pub fill: FillMode,
    pub role: ColorRole,
}

impl DrawCommand {
    fn new(primitive: Primitive, fill: FillMode, role: ColorRole) -> Self {
        Self {
            primitive,
            fill,
            role,
        }
    }
}

/// 生成单个图形的绘制命令，填充层在前、轮廓在后。
pub fn shape_commands(shape: &Shape, view: &ViewState, role: ColorRole) -> Vec<DrawCommand> {
    let ppm = view.pixels_per_meter();
    let mut commands = Vec::new();

    match &shape.geometry {
        ShapeGeometry::Point(point) => {
            commands.push(DrawCommand::new(
                Primitive::Point {
                    center: view.to_screen(point.center),
                    radius: POINT_RADIUS,
                },
                FillMode::Solid,
                role,
            ));
        }
        ShapeGeometry::Cross(cross) | ShapeGeometry::ReferencePoint(cross) => {
            commands.push(DrawCommand::new(
                Primitive::Cross {
                    center: view.to_screen(cross.center),
                    half_width: cross.width * 0.5 * ppm,
                    thickness: OUTLINE_THICKNESS,
                },
                FillMode::Outline,
                role,
            ));
        }
        ShapeGeometry::Line(line) => {
            commands.push(DrawCommand::new(
                Primitive::Line {
                    start: view.to_screen(line.begin),
                    end: view.to_screen(line.end),
                    thickness: LINE_THICKNESS,
                },
                FillMode::Outline,
                role,
            ));
        }
        ShapeGeometry::Circle(circle) | ShapeGeometry::FilledCircle(circle) => {
            let center = view.to_screen(circle.center);
            let radius = circle.radius * ppm;
            if matches!(shape.geometry, ShapeGeometry::FilledCircle(_)) {
                commands.push(DrawCommand::new(
                    Primitive::Circle {
                        center,
                        radius,
                        thickness: 0.0,
                    },
                    FillMode::Background,
                    role,
                ));
            }
            commands.push(DrawCommand::new(
                Primitive::Circle {
                    center,
                    radius,
                    thickness: OUTLINE_THICKNESS,
                },
                FillMode::Outline,
                role,
            ));
        }
        ShapeGeometry::Annulus(annulus)
        | ShapeGeometry::CirclePolish(annulus)
        | ShapeGeometry::CircleStairs(annulus) => {
            let center = view.to_screen(annulus.center);
            let outer = annulus.radius * ppm;
            let inner = annulus.inner_radius * ppm;
            commands.push(DrawCommand::new(
                Primitive::Annulus {
                    center,
                    outer,
                    inner,
                },
                FillMode::Background,
                role,
            ));
            for radius in [inner, outer] {
                commands.push(DrawCommand::new(
                    Primitive::Circle {
                        center,
                        radius,
                        thickness: OUTLINE_THICKNESS,
                    },
                    FillMode::Outline,
                    role,
                ));
            }
        }
        ShapeGeometry::Rectangle(rect)
        | ShapeGeometry::FilledRectangle(rect)
        | ShapeGeometry::RectanglePolish(rect)
        | ShapeGeometry::RectangleStairs(rect) => {
            let corners = rect.corners().map(|corner| view.to_screen(corner));
            if shape.kind().is_filled_rectangle() {
                commands.push(DrawCommand::new(
                    Primitive::Quad {
                        corners,
                        thickness: 0.0,
                    },
                    FillMode::Background,
                    role,
                ));
            }
            commands.push(DrawCommand::new(
                Primitive::Quad {
                    corners,
                    thickness: OUTLINE_THICKNESS,
                },
                FillMode::Outline,
                role,
            ));
        }
    }

    commands
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuideStyle {
    MinorGrid,
    MajorGrid,
    Axis,
}

/// 背景参考线（网格与坐标轴），屏幕坐标。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideLine {
    pub start: Vec2,
    pub end: Vec2,
    pub style: GuideStyle,
    pub thickness: f64,
}

/// 网格间距：次网格不小于 6 像素，取 10 的整数次幂；主网格为次网格的 10 倍。
pub fn grid_spacing(view: &ViewState) -> (f64, f64) {
    let minor = larger_pow(MIN_GRID_PIXELS * view.meters_per_pixel(), 10.0);
    (minor, minor * 10.0)
}

/// 覆盖可见区域的次网格与主网格线，先次后主。
pub fn grid_lines(view: &ViewState) -> Vec<GuideLine> {
    let rect = view.visible_rect();
    let (minor, major) = grid_spacing(view);
    let mut lines = Vec::new();

    for (spacing, style) in [(minor, GuideStyle::MinorGrid), (major, GuideStyle::MajorGrid)] {
        if !(spacing.is_finite() && spacing > 0.0) {
            continue;
        }
        let mut x = round_to_next(rect.left(), spacing);
        while x < rect.right() {
            lines.push(guide(
                view,
                Vec2::new(x, rect.top()),
                Vec2::new(x, rect.bottom()),
                style,
            ));
            x += spacing;
        }
        let mut y = round_to_next(rect.bottom(), spacing);
        while y < rect.top() {
            lines.push(guide(
                view,
                Vec2::new(rect.left(), y),
                Vec2::new(rect.right(), y),
                style,
            ));
            y += spacing;
        }
    }
    lines
}

/// 可见时的 X 轴与 Y 轴。
pub fn axes(view: &ViewState) -> Vec<GuideLine> {
    let rect = view.visible_rect();
    let mut lines = Vec::new();
    if rect.bottom() <= 0.0 && rect.top() >= 0.0 {
        lines.push(guide(
            view,
            Vec2::new(rect.left(), 0.0),
            Vec2::new(rect.right(), 0.0),
            GuideStyle::Axis,
        ));
    }
    if rect.left() <= 0.0 && rect.right() >= 0.0 {
        lines.push(guide(
            view,
            Vec2::new(0.0, rect.top()),
            Vec2::new(0.0, rect.bottom()),
            GuideStyle::Axis,
        ));
    }
    lines
}

fn guide(view: &ViewState, start: Vec2, end: Vec2, style: GuideStyle) -> GuideLine {
    let thickness = match style {
        GuideStyle::Axis => AXIS_THICKNESS,
        GuideStyle::MinorGrid | GuideStyle::MajorGrid => 1.0,
    };
    GuideLine {
        start: view.to_screen(start),
        end: view.to_screen(end),
        style,
        thickness,
    }
}

/// 左下角比例尺。
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleBar {
    pub meters: f64,
    pub start: Vec2,
    pub end: Vec2,
    pub tick_height: f64,
    pub label: String,
}

/// 取 `s·i`（`i = 1..=5`）中屏幕长度小于 130 像素的最大值作为比例尺长度。
pub fn scale_bar(view: &ViewState) -> ScaleBar {
    let display_scale = view.display_scale();
    let max_pixels = SCALE_BAR_PIXELS * display_scale;
    let ppm = view.pixels_per_meter();
    let base = smaller_pow(max_pixels * view.meters_per_pixel(), 10.0);

    let mut meters = base;
    for step in 1..=5 {
        let candidate = base * f64::from(step);
        if candidate * ppm < max_pixels {
            meters = candidate;
        } else {
            break;
        }
    }

    let left = SCALE_BAR_MARGIN * display_scale;
    let bottom = view.height() - SCALE_BAR_MARGIN * display_scale;
    ScaleBar {
        meters,
        start: Vec2::new(left, bottom),
        end: Vec2::new(left + meters * ppm, bottom),
        tick_height: 5.0 * display_scale,
        label: meters_pretty(meters, 0),
    }
}
