use lyra_core::document::{Document, ProjectSettings};
use lyra_core::geometry::Vec2;
use lyra_core::shape::{Shape, ShapeGeometry, ShapeKind};
use tracing::warn;

use crate::IoError;
use crate::dom::XmlElement;
use crate::number::{format_exp, format_fixed, format_vec2, parse_bool, parse_f64, parse_vec2};

pub const FORMAT_VERSION: &str = "1.0";
const DEPTH_UNIT: &str = "scan";

pub fn shape_tag(kind: ShapeKind) -> &'static str {
    match kind {
        ShapeKind::Point => "Dot",
        ShapeKind::Cross => "Cross",
        ShapeKind::ReferencePoint => "ReferencePoint",
        ShapeKind::Line => "Line",
        ShapeKind::Rectangle => "Rectangle",
        ShapeKind::FilledRectangle => "RectangleFilled",
        ShapeKind::RectanglePolish => "RectanglePolish",
        ShapeKind::RectangleStairs => "RectangleStairs",
        ShapeKind::Circle => "Circle",
        ShapeKind::FilledCircle => "CircleFilled",
        ShapeKind::Annulus => "CircleAnnulus",
        ShapeKind::CirclePolish => "CirclePolish",
        ShapeKind::CircleStairs => "CircleStairs",
    }
}

pub fn tag_kind(tag: &str) -> Option<ShapeKind> {
    ShapeKind::ALL
        .into_iter()
        .find(|kind| shape_tag(*kind) == tag)
}

/// ReferencePoint 不带 SettleTimeFrame，其余种类读写都带。
fn has_settle_time_frame(kind: ShapeKind) -> bool {
    kind != ShapeKind::ReferencePoint
}

// ---- 编码 ----

fn settings_to_elements(settings: &ProjectSettings) -> [XmlElement; 2] {
    let mut material = XmlElement::new("Material");
    material.set_attribute("proc", settings.process.as_str());
    material.set_attribute("name", settings.material_name.as_str());
    material.set_attribute("energy", format_fixed(settings.energy));
    material.set_attribute("dwelltime", format_exp(settings.dwell_time));
    material.set_attribute("overlapping", format_fixed(settings.overlap));
    material.set_attribute("description", settings.description.as_str());
    material.set_attribute("dose", format_exp(settings.dose));

    let mut element = XmlElement::new("Settings");
    element.set_attribute("BeamCurrent", format_exp(settings.beam_current));
    element.set_attribute("SpotSize", format_exp(settings.spot_size));
    element.set_attribute("Parallel", if settings.parallel { "true" } else { "false" });

    [material, element]
}

fn shape_to_element(name: &str, shape: &Shape) -> XmlElement {
    let kind = shape.kind();
    let mut element = XmlElement::new(shape_tag(kind));
    element.set_attribute("Name", name);
    element.set_attribute("DepthUnit", DEPTH_UNIT);
    element.set_attribute("Depth", shape.depth.to_string());

    match &shape.geometry {
        ShapeGeometry::Point(point) => {
            element.set_attribute("Center", format_vec2(point.center));
        }
        ShapeGeometry::Cross(cross) | ShapeGeometry::ReferencePoint(cross) => {
            element.set_attribute("Center", format_vec2(cross.center));
            element.set_attribute("Width", format_exp(cross.width));
        }
        ShapeGeometry::Line(line) => {
            element.set_attribute("Begin", format_vec2(line.begin));
            element.set_attribute("End", format_vec2(line.end));
        }
        ShapeGeometry::Rectangle(rect)
        | ShapeGeometry::FilledRectangle(rect)
        | ShapeGeometry::RectanglePolish(rect)
        | ShapeGeometry::RectangleStairs(rect) => {
            element.set_attribute("Center", format_vec2(rect.center));
            element.set_attribute("Width", format_exp(rect.dimensions.x()));
            element.set_attribute("Height", format_exp(rect.dimensions.y()));
            element.set_attribute("Angle", format_fixed(rect.angle));
            element.set_attribute("SettleTimeLine", format_exp(rect.settle_time_line));
        }
        ShapeGeometry::Circle(circle) | ShapeGeometry::FilledCircle(circle) => {
            element.set_attribute("Center", format_vec2(circle.center));
            element.set_attribute("Radius", format_exp(circle.radius));
        }
        ShapeGeometry::Annulus(annulus)
        | ShapeGeometry::CirclePolish(annulus)
        | ShapeGeometry::CircleStairs(annulus) => {
            element.set_attribute("Center", format_vec2(annulus.center));
            element.set_attribute("RadiusA", format_exp(annulus.radius));
            element.set_attribute("RadiusB", format_exp(annulus.inner_radius));
        }
    }

    if has_settle_time_frame(kind) {
        element.set_attribute("SettleTimeFrame", format_exp(shape.settle_time_frame));
    }
    element
}

/// 文档转为 `Project` 元素树。
pub fn document_to_element(document: &Document) -> XmlElement {
    let mut project = XmlElement::new("Project");
    project.set_attribute("ver", FORMAT_VERSION);
    project
        .children
        .extend(settings_to_elements(&document.settings));

    let mut objects = XmlElement::new("ObjectList");
    objects.children = document
        .shapes()
        .map(|(name, shape)| shape_to_element(name, shape))
        .collect();
    project.children.push(objects);
    project
}

// ---- 解码 ----

fn malformed(element: &XmlElement, message: impl std::fmt::Display) -> IoError {
    match element.attribute("Name") {
        Some(name) => IoError::MalformedDocument(format!("{} `{name}`: {message}", element.name)),
        None => IoError::MalformedDocument(format!("{}: {message}", element.name)),
    }
}

fn required<'a>(element: &'a XmlElement, key: &str) -> Result<&'a str, IoError> {
    element
        .attribute(key)
        .ok_or_else(|| malformed(element, format!("缺少属性 {key}")))
}

fn parse_with<T>(
    element: &XmlElement,
    key: &str,
    expected: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, IoError> {
    let raw = required(element, key)?;
    parse(raw).ok_or_else(|| malformed(element, format!("属性 {key}=\"{raw}\" 不是合法的{expected}")))
}

fn float_attr(element: &XmlElement, key: &str) -> Result<f64, IoError> {
    parse_with(element, key, "浮点数", parse_f64)
}

fn vec2_attr(element: &XmlElement, key: &str) -> Result<Vec2, IoError> {
    parse_with(element, key, "坐标", parse_vec2)
}

fn depth_attr(element: &XmlElement) -> Result<u32, IoError> {
    parse_with(element, "Depth", "非负整数", |raw| raw.trim().parse::<u32>().ok())
}

fn settings_from_elements(
    material: &XmlElement,
    settings: &XmlElement,
) -> Result<ProjectSettings, IoError> {
    Ok(ProjectSettings {
        process: required(material, "proc")?.to_string(),
        material_name: required(material, "name")?.to_string(),
        energy: float_attr(material, "energy")?,
        dwell_time: float_attr(material, "dwelltime")?,
        overlap: float_attr(material, "overlapping")?,
        description: required(material, "description")?.to_string(),
        dose: float_attr(material, "dose")?,
        beam_current: float_attr(settings, "BeamCurrent")?,
        spot_size: float_attr(settings, "SpotSize")?,
        parallel: parse_with(settings, "Parallel", "布尔值", parse_bool)?,
    })
}

fn shape_from_element(kind: ShapeKind, element: &XmlElement) -> Result<(String, Shape), IoError> {
    let name = required(element, "Name")?.to_string();
    let depth_unit = required(element, "DepthUnit")?;
    if depth_unit != DEPTH_UNIT {
        warn!(name = %name, depth_unit, "未预期的 DepthUnit，按 scan 处理");
    }
    let depth = depth_attr(element)?;

    let mut geometry = ShapeGeometry::empty(kind);
    match &mut geometry {
        ShapeGeometry::Point(point) => {
            point.center = vec2_attr(element, "Center")?;
        }
        ShapeGeometry::Cross(cross) | ShapeGeometry::ReferencePoint(cross) => {
            cross.center = vec2_attr(element, "Center")?;
            cross.width = float_attr(element, "Width")?;
        }
        ShapeGeometry::Line(line) => {
            line.begin = vec2_attr(element, "Begin")?;
            line.end = vec2_attr(element, "End")?;
        }
        ShapeGeometry::Rectangle(rect)
        | ShapeGeometry::FilledRectangle(rect)
        | ShapeGeometry::RectanglePolish(rect)
        | ShapeGeometry::RectangleStairs(rect) => {
            rect.center = vec2_attr(element, "Center")?;
            rect.dimensions = Vec2::new(
                float_attr(element, "Width")?,
                float_attr(element, "Height")?,
            );
            rect.angle = float_attr(element, "Angle")?;
            rect.settle_time_line = float_attr(element, "SettleTimeLine")?;
        }
        ShapeGeometry::Circle(circle) | ShapeGeometry::FilledCircle(circle) => {
            circle.center = vec2_attr(element, "Center")?;
            circle.radius = float_attr(element, "Radius")?;
        }
        ShapeGeometry::Annulus(annulus)
        | ShapeGeometry::CirclePolish(annulus)
        | ShapeGeometry::CircleStairs(annulus) => {
            annulus.center = vec2_attr(element, "Center")?;
            annulus.radius = float_attr(element, "RadiusA")?;
            annulus.inner_radius = float_attr(element, "RadiusB")?;
        }
    }

    let settle_time_frame = if has_settle_time_frame(kind) {
        float_attr(element, "SettleTimeFrame")?
    } else {
        0.0
    };

    Ok((
        name,
        Shape {
            depth,
            settle_time_frame,
            geometry,
        },
    ))
}

/// 从顶层元素中找到 `Project` 并还原文档。结构错误时不返回部分结果。
pub fn document_from_elements(roots: &[XmlElement]) -> Result<Document, IoError> {
    let project = roots
        .iter()
        .find(|element| element.name == "Project")
        .ok_or_else(|| IoError::MalformedDocument("缺少 Project 根元素".to_string()))?;

    match project.attribute("ver") {
        Some(FORMAT_VERSION) => {}
        version => warn!(version = ?version, "未知的工程文件版本，按 1.0 解析"),
    }

    let section = |name: &str| {
        project
            .child(name)
            .ok_or_else(|| IoError::MalformedDocument(format!("Project 缺少 {name} 元素")))
    };
    let material = section("Material")?;
    let settings = section("Settings")?;
    let objects = section("ObjectList")?;

    let mut document = Document::new();
    document.settings = settings_from_elements(material, settings)?;

    for element in &objects.children {
        let Some(kind) = tag_kind(&element.name) else {
            warn!(tag = %element.name, "跳过无法识别的图形元素");
            continue;
        };
        let (name, shape) = shape_from_element(kind, element)?;
        document
            .insert_named(name, shape)
            .map_err(|err| IoError::MalformedDocument(err.to_string()))?;
    }

    Ok(document)
}
