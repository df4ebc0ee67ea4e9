pub mod geometry {
    use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

    use glam::{DMat3, DVec2, DVec3};
    use serde::{Deserialize, Serialize};

    /// 二维向量，内部以 `glam::DVec2` 表示，单位为米（世界坐标）或像素（屏幕坐标）。
    #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
    pub struct Vec2(pub DVec2);

    impl Vec2 {
        pub const ZERO: Vec2 = Vec2(DVec2::ZERO);

        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        /// 两个分量取相同值。
        #[inline]
        pub fn splat(value: f64) -> Self {
            Self(DVec2::splat(value))
        }

        #[inline]
        pub fn from_vec(vec: DVec2) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }

        #[inline]
        pub fn length(self) -> f64 {
            self.0.length()
        }

        /// 单位化；零向量返回零向量而不是 NaN，拖拽计算依赖这一点。
        pub fn normalized(self) -> Self {
            let len = self.length();
            if len == 0.0 {
                Self::ZERO
            } else {
                Self(self.0 / len)
            }
        }

        /// 注意参数顺序为 `atan2(x, y)`：返回相对 +Y 轴、顺时针为正的方位角（弧度）。
        #[inline]
        pub fn atan2(self) -> f64 {
            self.0.x.atan2(self.0.y)
        }

        #[inline]
        pub fn abs(self) -> Self {
            Self(self.0.abs())
        }

        /// 四舍六入五取偶，用于像素对齐。
        #[inline]
        pub fn round(self) -> Self {
            Self::new(self.0.x.round_ties_even(), self.0.y.round_ties_even())
        }

        #[inline]
        pub fn min(self, other: Vec2) -> Self {
            Self(self.0.min(other.0))
        }

        #[inline]
        pub fn max(self, other: Vec2) -> Self {
            Self(self.0.max(other.0))
        }

        /// 绕原点逆时针旋转 `degrees` 度。
        pub fn rotated(self, degrees: f64) -> Self {
            let (sin, cos) = degrees.to_radians().sin_cos();
            Self::new(
                self.0.x * cos - self.0.y * sin,
                self.0.x * sin + self.0.y * cos,
            )
        }

        /// 翻转 Y 分量（屏幕坐标 Y 向下，世界坐标 Y 向上）。
        #[inline]
        pub fn flip_y(self) -> Self {
            Self::new(self.0.x, -self.0.y)
        }
    }

    impl From<DVec2> for Vec2 {
        fn from(value: DVec2) -> Self {
            Self(value)
        }
    }

    impl Add for Vec2 {
        type Output = Vec2;

        fn add(self, rhs: Vec2) -> Vec2 {
            Vec2(self.0 + rhs.0)
        }
    }

    impl AddAssign for Vec2 {
        fn add_assign(&mut self, rhs: Vec2) {
            self.0 += rhs.0;
        }
    }

    impl Sub for Vec2 {
        type Output = Vec2;

        fn sub(self, rhs: Vec2) -> Vec2 {
            Vec2(self.0 - rhs.0)
        }
    }

    impl SubAssign for Vec2 {
        fn sub_assign(&mut self, rhs: Vec2) {
            self.0 -= rhs.0;
        }
    }

    impl Neg for Vec2 {
        type Output = Vec2;

        fn neg(self) -> Vec2 {
            Vec2(-self.0)
        }
    }

    impl Mul<f64> for Vec2 {
        type Output = Vec2;

        fn mul(self, rhs: f64) -> Vec2 {
            Vec2(self.0 * rhs)
        }
    }

    /// 逐分量相乘。
    impl Mul<Vec2> for Vec2 {
        type Output = Vec2;

        fn mul(self, rhs: Vec2) -> Vec2 {
            Vec2(self.0 * rhs.0)
        }
    }

    impl MulAssign<f64> for Vec2 {
        fn mul_assign(&mut self, rhs: f64) {
            self.0 *= rhs;
        }
    }

    impl Div<f64> for Vec2 {
        type Output = Vec2;

        fn div(self, rhs: f64) -> Vec2 {
            Vec2(self.0 / rhs)
        }
    }

    /// 轴对齐矩形：中心 + 半尺寸。半尺寸在每次修改时都被钳制为非负。
    #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
    pub struct Rect {
        center: Vec2,
        half_dims: Vec2,
    }

    impl Rect {
        pub fn new(center: Vec2, dimensions: Vec2) -> Self {
            let mut rect = Self {
                center,
                half_dims: Vec2::ZERO,
            };
            rect.set_dimensions(dimensions);
            rect
        }

        pub fn from_half_dims(center: Vec2, half_dims: Vec2) -> Self {
            let mut rect = Self {
                center,
                half_dims: Vec2::ZERO,
            };
            rect.set_half_dims(half_dims);
            rect
        }

        /// 由两个角点构造，角点顺序任意。
        pub fn from_corners(a: Vec2, b: Vec2) -> Self {
            let min = a.min(b);
            let max = a.max(b);
            Self::new((min + max) * 0.5, max - min)
        }

        #[inline]
        pub fn center(&self) -> Vec2 {
            self.center
        }

        #[inline]
        pub fn set_center(&mut self, center: Vec2) {
            self.center = center;
        }

        #[inline]
        pub fn half_dims(&self) -> Vec2 {
            self.half_dims
        }

        pub fn set_half_dims(&mut self, half_dims: Vec2) {
            self.half_dims = half_dims.max(Vec2::ZERO);
        }

        #[inline]
        pub fn dimensions(&self) -> Vec2 {
            self.half_dims * 2.0
        }

        pub fn set_dimensions(&mut self, dimensions: Vec2) {
            self.set_half_dims(dimensions * 0.5);
        }

        #[inline]
        pub fn width(&self) -> f64 {
            self.half_dims.x() * 2.0
        }

        pub fn set_width(&mut self, width: f64) {
            self.half_dims.0.x = width.max(0.0) * 0.5;
        }

        #[inline]
        pub fn height(&self) -> f64 {
            self.half_dims.y() * 2.0
        }

        pub fn set_height(&mut self, height: f64) {
            self.half_dims.0.y = height.max(0.0) * 0.5;
        }

        #[inline]
        pub fn min_point(&self) -> Vec2 {
            self.center - self.half_dims
        }

        #[inline]
        pub fn max_point(&self) -> Vec2 {
            self.center + self.half_dims
        }

        #[inline]
        pub fn left(&self) -> f64 {
            self.center.x() - self.half_dims.x()
        }

        #[inline]
        pub fn right(&self) -> f64 {
            self.center.x() + self.half_dims.x()
        }

        #[inline]
        pub fn bottom(&self) -> f64 {
            self.center.y() - self.half_dims.y()
        }

        #[inline]
        pub fn top(&self) -> f64 {
            self.center.y() + self.half_dims.y()
        }

        #[inline]
        pub fn bottom_left(&self) -> Vec2 {
            Vec2::new(self.left(), self.bottom())
        }

        /// 包含边界的点包含测试，只针对矩形自身（未旋转）的范围。
        pub fn overlaps_point(&self, point: Vec2) -> bool {
            let min = self.min_point();
            let max = self.max_point();
            if point.x() < min.x() || point.x() > max.x() {
                return false;
            }
            if point.y() < min.y() || point.y() > max.y() {
                return false;
            }
            true
        }

        pub fn overlaps_rect(&self, other: &Rect) -> bool {
            let delta = (self.center - other.center).abs();
            let reach = self.half_dims + other.half_dims;
            delta.x() <= reach.x() && delta.y() <= reach.y()
        }

        pub fn union(&self, other: &Rect) -> Rect {
            Rect::from_corners(
                self.min_point().min(other.min_point()),
                self.max_point().max(other.max_point()),
            )
        }
    }

    /// 二维仿射变换：先缩放、再旋转（角度制，逆时针）、最后平移。
    ///
    /// 向量本身保持 `(x, y)` 两个分量，只有在 [`AffineTransform::apply`]
    /// 内部才提升为齐次坐标参与 3×3 矩阵乘法。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct AffineTransform {
        pub scale: Vec2,
        pub rotation: f64,
        pub translation: Vec2,
    }

    impl AffineTransform {
        pub const IDENTITY: AffineTransform = AffineTransform {
            scale: Vec2(DVec2::ONE),
            rotation: 0.0,
            translation: Vec2::ZERO,
        };

        #[inline]
        pub fn from_rotation(degrees: f64) -> Self {
            Self::IDENTITY.with_rotation(degrees)
        }

        #[inline]
        pub fn with_scale(mut self, scale: Vec2) -> Self {
            self.scale = scale;
            self
        }

        #[inline]
        pub fn with_rotation(mut self, degrees: f64) -> Self {
            self.rotation = degrees;
            self
        }

        #[inline]
        pub fn with_translation(mut self, translation: Vec2) -> Self {
            self.translation = translation;
            self
        }

        pub fn matrix(&self) -> DMat3 {
            DMat3::from_scale_angle_translation(
                self.scale.0,
                self.rotation.to_radians(),
                self.translation.0,
            )
        }

        pub fn apply(&self, point: Vec2) -> Vec2 {
            let homogeneous = self.matrix() * DVec3::new(point.x(), point.y(), 1.0);
            Vec2::new(homogeneous.x, homogeneous.y)
        }
    }

    impl Default for AffineTransform {
        fn default() -> Self {
            Self::IDENTITY
        }
    }

}

pub mod units {
    use std::fmt;

    use serde::{Deserialize, Serialize};

    /// 界面显示单位。文档内部始终以米存储，显示单位只影响输入输出换算。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum DisplayUnit {
        #[serde(alias = "m")]
        Meters,
        #[serde(alias = "mm")]
        Millimeters,
        #[default]
        #[serde(alias = "um")]
        Micrometers,
        #[serde(alias = "nm")]
        Nanometers,
        #[serde(alias = "a")]
        Angstroms,
    }

    impl DisplayUnit {
        pub const ALL: [DisplayUnit; 5] = [
            DisplayUnit::Meters,
            DisplayUnit::Millimeters,
            DisplayUnit::Micrometers,
            DisplayUnit::Nanometers,
            DisplayUnit::Angstroms,
        ];

        pub fn suffix(self) -> &'static str {
            match self {
                DisplayUnit::Meters => "m",
                DisplayUnit::Millimeters => "mm",
                DisplayUnit::Micrometers => "um",
                DisplayUnit::Nanometers => "nm",
                DisplayUnit::Angstroms => "Å",
            }
        }

        /// 一个显示单位对应的米数。
        pub fn scale(self) -> f64 {
            match self {
                DisplayUnit::Meters => 1.0,
                DisplayUnit::Millimeters => 1e-3,
                DisplayUnit::Micrometers => 1e-6,
                DisplayUnit::Nanometers => 1e-9,
                DisplayUnit::Angstroms => 1e-10,
            }
        }

        #[inline]
        pub fn to_display(self, meters: f64) -> f64 {
            meters / self.scale()
        }

        #[inline]
        pub fn from_display(self, value: f64) -> f64 {
            value * self.scale()
        }

        /// 解析单位后缀（`m`、`mm`、`um`、`nm`、`Å`/`a`）或英文全称。
        pub fn parse(raw: &str) -> Option<Self> {
            match raw.trim().to_lowercase().as_str() {
                "m" | "meters" => Some(DisplayUnit::Meters),
                "mm" | "millimeters" => Some(DisplayUnit::Millimeters),
                "um" | "micrometers" => Some(DisplayUnit::Micrometers),
                "nm" | "nanometers" => Some(DisplayUnit::Nanometers),
                "a" | "å" | "angstroms" => Some(DisplayUnit::Angstroms),
                _ => None,
            }
        }
    }

    impl fmt::Display for DisplayUnit {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.suffix())
        }
    }

    /// 以合适的量级输出长度，例如 `2e-6` -> `"2 um"`。
    pub fn meters_pretty(meters: f64, fdigits: usize) -> String {
        let exponent = meters.log10();
        let (base, suffix) = if exponent >= 3.0 {
            (3, "km")
        } else if exponent >= 0.0 {
            (0, "m")
        } else if exponent >= -2.0 {
            (-2, "cm")
        } else if exponent >= -3.0 {
            (-3, "mm")
        } else if exponent >= -6.0 {
            (-6, "um")
        } else if exponent >= -9.0 {
            (-9, "nm")
        } else if exponent >= -12.0 {
            (-12, "pm")
        } else {
            (-15, "fm")
        };
        let value = meters / 10f64.powi(base);
        format!("{value:.fdigits$} {suffix}")
    }

    #[inline]
    pub fn approx_equal(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    /// 不大于 `value` 的最大 `base` 整数次幂。
    pub fn smaller_pow(value: f64, base: f64) -> f64 {
        base.powf(value.log(base).floor())
    }

    /// 不小于 `value` 的最小 `base` 整数次幂。
    pub fn larger_pow(value: f64, base: f64) -> f64 {
        base.powf(value.log(base).ceil())
    }

    /// 向上取整到 `div` 的整数倍。
    pub fn round_to_next(value: f64, div: f64) -> f64 {
        (value / div).ceil() * div
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn pretty_printing_picks_magnitude() {
            assert_eq!(meters_pretty(2e-6, 0), "2 um");
            assert_eq!(meters_pretty(5e-4, 0), "500 um");
            assert_eq!(meters_pretty(2e-3, 1), "2.0 mm");
            assert_eq!(meters_pretty(3.0, 0), "3 m");
            assert_eq!(meters_pretty(2500.0, 1), "2.5 km");
            assert_eq!(meters_pretty(4e-8, 0), "40 nm");
        }

        #[test]
        fn power_helpers_bracket_value() {
            assert!(approx_equal(smaller_pow(3.2e-6, 10.0), 1e-6, 1e-18));
            assert!(approx_equal(larger_pow(3.2e-6, 10.0), 1e-5, 1e-18));
            assert!(approx_equal(round_to_next(-2.5, 1.0), -2.0, 1e-12));
            assert!(approx_equal(round_to_next(2.1, 0.5), 2.5, 1e-12));
        }

        #[test]
        fn display_unit_conversion() {
            let unit = DisplayUnit::Micrometers;
            assert!(approx_equal(unit.to_display(2e-6), 2.0, 1e-9));
            assert!(approx_equal(unit.from_display(3.0), 3e-6, 1e-18));
            assert_eq!(DisplayUnit::parse("NM"), Some(DisplayUnit::Nanometers));
            assert_eq!(DisplayUnit::parse("Å"), Some(DisplayUnit::Angstroms));
            assert_eq!(DisplayUnit::parse("furlong"), None);
            assert_eq!(DisplayUnit::default().suffix(), "um");
        }
    }
}

pub mod errors {
    use thiserror::Error;

    use crate::shape::ShapeKind;

    #[derive(Debug, Error, PartialEq)]
    pub enum DocumentError {
        #[error("shape `{0}` not found")]
        NotFound(String),
        #[error("shape kind {0:?} has no name prefix and cannot be added")]
        UnsupportedVariant(ShapeKind),
        #[error("shape name `{0}` is already in use")]
        DuplicateName(String),
        #[error("index {index} out of range for {len} shapes")]
        IndexOutOfRange { index: usize, len: usize },
    }
}

pub mod shape {
    use std::fmt;

    use serde::{Deserialize, Serialize};

    use crate::geometry::{Rect, Vec2};

    /// 图形种类的封闭集合。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum ShapeKind {
        Point,
        Cross,
        ReferencePoint,
        Line,
        Rectangle,
        FilledRectangle,
        RectanglePolish,
        RectangleStairs,
        Circle,
        FilledCircle,
        Annulus,
        CirclePolish,
        CircleStairs,
    }

    impl ShapeKind {
        pub const ALL: [ShapeKind; 13] = [
            ShapeKind::Point,
            ShapeKind::Cross,
            ShapeKind::ReferencePoint,
            ShapeKind::Line,
            ShapeKind::Rectangle,
            ShapeKind::FilledRectangle,
            ShapeKind::RectanglePolish,
            ShapeKind::RectangleStairs,
            ShapeKind::Circle,
            ShapeKind::FilledCircle,
            ShapeKind::Annulus,
            ShapeKind::CirclePolish,
            ShapeKind::CircleStairs,
        ];

        /// 编辑器“添加”菜单中可以创建的种类，按菜单顺序排列。
        pub const CREATABLE: [ShapeKind; 8] = [
            ShapeKind::Point,
            ShapeKind::Cross,
            ShapeKind::Line,
            ShapeKind::Rectangle,
            ShapeKind::FilledRectangle,
            ShapeKind::Circle,
            ShapeKind::FilledCircle,
            ShapeKind::Annulus,
        ];

        /// 自动命名使用的前缀；没有前缀的种类只能由文件加载产生。
        pub fn name_prefix(self) -> Option<&'static str> {
            match self {
                ShapeKind::Point => Some("Dot"),
                ShapeKind::Cross => Some("Cross"),
                ShapeKind::Line => Some("Line"),
                ShapeKind::Rectangle => Some("Rectangle"),
                ShapeKind::FilledRectangle => Some("Filled rect"),
                ShapeKind::Circle => Some("Circle"),
                ShapeKind::FilledCircle => Some("Filled circle"),
                ShapeKind::Annulus => Some("Annulus"),
                ShapeKind::ReferencePoint
                | ShapeKind::RectanglePolish
                | ShapeKind::RectangleStairs
                | ShapeKind::CirclePolish
                | ShapeKind::CircleStairs => None,
            }
        }

        pub fn display_name(self) -> &'static str {
            match self {
                ShapeKind::Point => "Point",
                ShapeKind::Cross => "Cross",
                ShapeKind::ReferencePoint => "Reference Point",
                ShapeKind::Line => "Line",
                ShapeKind::Rectangle => "Rectangle",
                ShapeKind::FilledRectangle => "Filled Rectangle",
                ShapeKind::RectanglePolish => "Rectangle Polish",
                ShapeKind::RectangleStairs => "Rectangle Stairs",
                ShapeKind::Circle => "Circle",
                ShapeKind::FilledCircle => "Filled Circle",
                ShapeKind::Annulus => "Annulus",
                ShapeKind::CirclePolish => "Circle Polish",
                ShapeKind::CircleStairs => "Circle Stairs",
            }
        }

        /// 按显示名或变体名查找（忽略大小写、空格与下划线）。
        pub fn parse(raw: &str) -> Option<Self> {
            let key: String = raw
                .chars()
                .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
                .collect::<String>()
                .to_ascii_lowercase();
            Self::ALL.into_iter().find(|kind| {
                let name: String = kind
                    .display_name()
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect::<String>()
                    .to_ascii_lowercase();
                name == key || (key == "dot" && *kind == ShapeKind::Point)
            })
        }

        #[inline]
        pub fn is_cross_family(self) -> bool {
            matches!(self, ShapeKind::Cross | ShapeKind::ReferencePoint)
        }

        #[inline]
        pub fn is_point_family(self) -> bool {
            matches!(self, ShapeKind::Point) || self.is_cross_family()
        }

        #[inline]
        pub fn is_rectangle_family(self) -> bool {
            matches!(self, ShapeKind::Rectangle) || self.is_filled_rectangle()
        }

        #[inline]
        pub fn is_filled_rectangle(self) -> bool {
            matches!(
                self,
                ShapeKind::FilledRectangle | ShapeKind::RectanglePolish | ShapeKind::RectangleStairs
            )
        }

        #[inline]
        pub fn is_circle_family(self) -> bool {
            matches!(self, ShapeKind::Circle) || self.is_filled_circle()
        }

        /// 实心圆及其派生（圆环、Polish、Stairs）。
        #[inline]
        pub fn is_filled_circle(self) -> bool {
            matches!(self, ShapeKind::FilledCircle) || self.is_annulus_family()
        }

        #[inline]
        pub fn is_annulus_family(self) -> bool {
            matches!(
                self,
                ShapeKind::Annulus | ShapeKind::CirclePolish | ShapeKind::CircleStairs
            )
        }

        #[inline]
        pub fn is_filled(self) -> bool {
            self.is_filled_rectangle() || self.is_filled_circle()
        }
    }

    impl fmt::Display for ShapeKind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.display_name())
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
    pub struct PointGeometry {
        pub center: Vec2,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
    pub struct CrossGeometry {
        pub center: Vec2,
        pub width: f64,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
    pub struct LineGeometry {
        pub begin: Vec2,
        pub end: Vec2,
    }

    impl LineGeometry {
        /// 线段长度（派生量，不存储）。
        #[inline]
        pub fn length(&self) -> f64 {
            (self.end - self.begin).length()
        }

        #[inline]
        pub fn midpoint(&self) -> Vec2 {
            self.begin + (self.end - self.begin) * 0.5
        }
    }

    /// 矩形几何。`angle` 为角度制，不做归一化。
    #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
    pub struct RectangleGeometry {
        pub center: Vec2,
        pub dimensions: Vec2,
        pub angle: f64,
        pub settle_time_line: f64,
    }

    impl RectangleGeometry {
        /// 旋转后的四个角点：左下、左上、右上、右下（未旋转时）。
        pub fn corners(&self) -> [Vec2; 4] {
            let half = self.dimensions * 0.5;
            let right = Vec2::new(half.x(), 0.0).rotated(self.angle);
            let up = Vec2::new(0.0, half.y()).rotated(self.angle);
            [
                self.center - up - right,
                self.center + up - right,
                self.center + up + right,
                self.center - up + right,
            ]
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
    pub struct CircleGeometry {
        pub center: Vec2,
        pub radius: f64,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
    pub struct AnnulusGeometry {
        pub center: Vec2,
        pub radius: f64,
        pub inner_radius: f64,
    }

    /// 各种类的几何参数。同一几何结构被多个种类共享，种类由变体本身决定。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub enum ShapeGeometry {
        Point(PointGeometry),
        Cross(CrossGeometry),
        ReferencePoint(CrossGeometry),
        Line(LineGeometry),
        Rectangle(RectangleGeometry),
        FilledRectangle(RectangleGeometry),
        RectanglePolish(RectangleGeometry),
        RectangleStairs(RectangleGeometry),
        Circle(CircleGeometry),
        FilledCircle(CircleGeometry),
        Annulus(AnnulusGeometry),
        CirclePolish(AnnulusGeometry),
        CircleStairs(AnnulusGeometry),
    }

    impl ShapeGeometry {
        pub fn kind(&self) -> ShapeKind {
            match self {
                ShapeGeometry::Point(_) => ShapeKind::Point,
                ShapeGeometry::Cross(_) => ShapeKind::Cross,
                ShapeGeometry::ReferencePoint(_) => ShapeKind::ReferencePoint,
                ShapeGeometry::Line(_) => ShapeKind::Line,
                ShapeGeometry::Rectangle(_) => ShapeKind::Rectangle,
                ShapeGeometry::FilledRectangle(_) => ShapeKind::FilledRectangle,
                ShapeGeometry::RectanglePolish(_) => ShapeKind::RectanglePolish,
                ShapeGeometry::RectangleStairs(_) => ShapeKind::RectangleStairs,
                ShapeGeometry::Circle(_) => ShapeKind::Circle,
                ShapeGeometry::FilledCircle(_) => ShapeKind::FilledCircle,
                ShapeGeometry::Annulus(_) => ShapeKind::Annulus,
                ShapeGeometry::CirclePolish(_) => ShapeKind::CirclePolish,
                ShapeGeometry::CircleStairs(_) => ShapeKind::CircleStairs,
            }
        }

        /// 种类对应的零值几何。
        pub fn empty(kind: ShapeKind) -> Self {
            match kind {
                ShapeKind::Point => ShapeGeometry::Point(PointGeometry::default()),
                ShapeKind::Cross => ShapeGeometry::Cross(CrossGeometry::default()),
                ShapeKind::ReferencePoint => {
                    ShapeGeometry::ReferencePoint(CrossGeometry::default())
                }
                ShapeKind::Line => ShapeGeometry::Line(LineGeometry::default()),
                ShapeKind::Rectangle => ShapeGeometry::Rectangle(RectangleGeometry::default()),
                ShapeKind::FilledRectangle => {
                    ShapeGeometry::FilledRectangle(RectangleGeometry::default())
                }
                ShapeKind::RectanglePolish => {
                    ShapeGeometry::RectanglePolish(RectangleGeometry::default())
                }
                ShapeKind::RectangleStairs => {
                    ShapeGeometry::RectangleStairs(RectangleGeometry::default())
                }
                ShapeKind::Circle => ShapeGeometry::Circle(CircleGeometry::default()),
                ShapeKind::FilledCircle => ShapeGeometry::FilledCircle(CircleGeometry::default()),
                ShapeKind::Annulus => ShapeGeometry::Annulus(AnnulusGeometry::default()),
                ShapeKind::CirclePolish => ShapeGeometry::CirclePolish(AnnulusGeometry::default()),
                ShapeKind::CircleStairs => ShapeGeometry::CircleStairs(AnnulusGeometry::default()),
            }
        }
    }

    /// 图形对象：工艺参数（扫描深度、稳定时间）加几何参数。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Shape {
        pub depth: u32,
        pub settle_time_frame: f64,
        pub geometry: ShapeGeometry,
    }

    impl Shape {
        pub fn new(geometry: ShapeGeometry) -> Self {
            Self {
                depth: 1,
                settle_time_frame: 0.0,
                geometry,
            }
        }

        /// 编辑器新建图形时使用的默认尺寸（10um 量级）。
        pub fn template(kind: ShapeKind) -> Self {
            const SIZE: f64 = 1e-5;
            const INNER_RADIUS: f64 = 5e-6;

            let mut geometry = ShapeGeometry::empty(kind);
            match &mut geometry {
                ShapeGeometry::Point(_) => {}
                ShapeGeometry::Cross(cross) | ShapeGeometry::ReferencePoint(cross) => {
                    cross.width = SIZE;
                }
                ShapeGeometry::Line(line) => {
                    line.begin = Vec2::splat(-SIZE);
                    line.end = Vec2::splat(SIZE);
                }
                ShapeGeometry::Rectangle(rect)
                | ShapeGeometry::FilledRectangle(rect)
                | ShapeGeometry::RectanglePolish(rect)
                | ShapeGeometry::RectangleStairs(rect) => {
                    rect.dimensions = Vec2::splat(SIZE);
                }
                ShapeGeometry::Circle(circle) | ShapeGeometry::FilledCircle(circle) => {
                    circle.radius = SIZE;
                }
                ShapeGeometry::Annulus(annulus)
                | ShapeGeometry::CirclePolish(annulus)
                | ShapeGeometry::CircleStairs(annulus) => {
                    annulus.radius = SIZE;
                    annulus.inner_radius = INNER_RADIUS;
                }
            }
            Self::new(geometry)
        }

        #[inline]
        pub fn kind(&self) -> ShapeKind {
            self.geometry.kind()
        }

        /// 点、矩形、圆族的中心；线段返回 `None`。
        pub fn center(&self) -> Option<Vec2> {
            match &self.geometry {
                ShapeGeometry::Point(point) => Some(point.center),
                ShapeGeometry::Cross(cross) | ShapeGeometry::ReferencePoint(cross) => {
                    Some(cross.center)
                }
                ShapeGeometry::Line(_) => None,
                ShapeGeometry::Rectangle(rect)
                | ShapeGeometry::FilledRectangle(rect)
                | ShapeGeometry::RectanglePolish(rect)
                | ShapeGeometry::RectangleStairs(rect) => Some(rect.center),
                ShapeGeometry::Circle(circle) | ShapeGeometry::FilledCircle(circle) => {
                    Some(circle.center)
                }
                ShapeGeometry::Annulus(annulus)
                | ShapeGeometry::CirclePolish(annulus)
                | ShapeGeometry::CircleStairs(annulus) => Some(annulus.center),
            }
        }

        /// 按世界坐标位移平移图形：中心类移动中心，线段同时移动两端。
        pub fn translate(&mut self, delta: Vec2) {
            match &mut self.geometry {
                ShapeGeometry::Point(point) => point.center += delta,
                ShapeGeometry::Cross(cross) | ShapeGeometry::ReferencePoint(cross) => {
                    cross.center += delta
                }
                ShapeGeometry::Line(line) => {
                    line.begin += delta;
                    line.end += delta;
                }
                ShapeGeometry::Rectangle(rect)
                | ShapeGeometry::FilledRectangle(rect)
                | ShapeGeometry::RectanglePolish(rect)
                | ShapeGeometry::RectangleStairs(rect) => rect.center += delta,
                ShapeGeometry::Circle(circle) | ShapeGeometry::FilledCircle(circle) => {
                    circle.center += delta
                }
                ShapeGeometry::Annulus(annulus)
                | ShapeGeometry::CirclePolish(annulus)
                | ShapeGeometry::CircleStairs(annulus) => annulus.center += delta,
            }
        }

        /// 世界坐标下的轴对齐包围盒（矩形考虑旋转）。
        pub fn bounds(&self) -> Rect {
            match &self.geometry {
                ShapeGeometry::Point(point) => Rect::new(point.center, Vec2::ZERO),
                ShapeGeometry::Cross(cross) | ShapeGeometry::ReferencePoint(cross) => {
                    Rect::new(cross.center, Vec2::splat(cross.width.abs()))
                }
                ShapeGeometry::Line(line) => Rect::from_corners(line.begin, line.end),
                ShapeGeometry::Rectangle(rect)
                | ShapeGeometry::FilledRectangle(rect)
                | ShapeGeometry::RectanglePolish(rect)
                | ShapeGeometry::RectangleStairs(rect) => {
                    let corners = rect.corners();
                    let mut min = corners[0];
                    let mut max = corners[0];
                    for corner in &corners[1..] {
                        min = min.min(*corner);
                        max = max.max(*corner);
                    }
                    Rect::from_corners(min, max)
                }
                ShapeGeometry::Circle(circle) | ShapeGeometry::FilledCircle(circle) => {
                    Rect::new(circle.center, Vec2::splat(circle.radius.abs() * 2.0))
                }
                ShapeGeometry::Annulus(annulus)
                | ShapeGeometry::CirclePolish(annulus)
                | ShapeGeometry::CircleStairs(annulus) => {
                    Rect::new(annulus.center, Vec2::splat(annulus.radius.abs() * 2.0))
                }
            }
        }
    }

}

pub mod document {
    use serde::{Deserialize, Serialize};

    use crate::errors::DocumentError;
    use crate::geometry::Rect;
    use crate::shape::{Shape, ShapeKind};

    /// 全局工艺参数。数值对核心层来说是不透明的物理量。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ProjectSettings {
        pub process: String,
        pub material_name: String,
        pub description: String,
        pub energy: f64,
        pub dwell_time: f64,
        pub overlap: f64,
        pub dose: f64,
        pub beam_current: f64,
        pub spot_size: f64,
        pub parallel: bool,
    }

    impl Default for ProjectSettings {
        fn default() -> Self {
            Self {
                process: String::new(),
                material_name: String::new(),
                description: String::new(),
                energy: 0.0,
                dwell_time: 0.0,
                overlap: 1.0,
                dose: 0.0,
                beam_current: 0.0,
                spot_size: 0.0,
                parallel: false,
            }
        }
    }

    impl ProjectSettings {
        /// 新建工程时的电子束光刻默认参数。
        pub fn lithography_defaults() -> Self {
            Self {
                process: "E-Lithography".to_string(),
                material_name: "Default material".to_string(),
                description: String::new(),
                energy: 30_000.0,
                dwell_time: 1e-4,
                overlap: 1.0,
                dose: 2.0,
                beam_current: 1e-10,
                spot_size: 4e-8,
                parallel: false,
            }
        }
    }

    /// 曝光图形文档：工艺参数 + 按插入顺序排列、名称唯一的图形集合。
    ///
    /// 插入顺序即绘制与列表顺序，只能通过 [`Document::reorder`] 调整。
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Document {
        pub settings: ProjectSettings,
        objects: Vec<(String, Shape)>,
    }

    impl Document {
        pub fn new() -> Self {
            Self::default()
        }

        /// 使用默认工艺参数的空文档。
        pub fn new_default() -> Self {
            Self {
                settings: ProjectSettings::lithography_defaults(),
                objects: Vec::new(),
            }
        }

        #[inline]
        pub fn len(&self) -> usize {
            self.objects.len()
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.objects.is_empty()
        }

        #[inline]
        pub fn shapes(&self) -> impl Iterator<Item = (&str, &Shape)> {
            self.objects
                .iter()
                .map(|(name, shape)| (name.as_str(), shape))
        }

        #[inline]
        pub fn names(&self) -> impl Iterator<Item = &str> {
            self.objects.iter().map(|(name, _)| name.as_str())
        }

        pub fn index_of(&self, name: &str) -> Option<usize> {
            self.objects.iter().position(|(n, _)| n == name)
        }

        pub fn get(&self, name: &str) -> Option<&Shape> {
            self.objects
                .iter()
                .find_map(|(n, shape)| (n == name).then_some(shape))
        }

        /// 可变访问单个图形的字段；名称与顺序不受影响。
        pub fn get_mut(&mut self, name: &str) -> Option<&mut Shape> {
            self.objects
                .iter_mut()
                .find_map(|(n, shape)| (n == name).then_some(shape))
        }

        pub fn get_index(&self, index: usize) -> Option<(&str, &Shape)> {
            self.objects
                .get(index)
                .map(|(name, shape)| (name.as_str(), shape))
        }

        /// 为给定种类生成下一个可用名称：`"{前缀} {n}"`，`n` 为未被占用的最小正整数。
        pub fn next_shape_name(&self, kind: ShapeKind) -> Result<String, DocumentError> {
            let prefix = kind
                .name_prefix()
                .ok_or(DocumentError::UnsupportedVariant(kind))?;

            let mut used: Vec<u64> = self
                .objects
                .iter()
                .filter_map(|(name, _)| name.strip_prefix(prefix))
                .filter_map(|rest| rest.trim().parse::<i64>().ok())
                .filter(|index| *index > 0)
                .map(|index| index as u64)
                .collect();
            used.sort_unstable();
            used.dedup();

            let mut free = 1u64;
            for index in used {
                if index == free {
                    free += 1;
                } else if index > free {
                    break;
                }
            }
            Ok(format!("{prefix} {free}"))
        }

        /// 追加图形并返回自动生成的名称。
        pub fn add_shape(&mut self, shape: Shape) -> Result<String, DocumentError> {
            let name = self.next_shape_name(shape.kind())?;
            self.objects.push((name.clone(), shape));
            Ok(name)
        }

        /// 以指定名称追加图形（供文件加载使用），名称重复时报错。
        pub fn insert_named(
            &mut self,
            name: impl Into<String>,
            shape: Shape,
        ) -> Result<(), DocumentError> {
            let name = name.into();
            if self.index_of(&name).is_some() {
                return Err(DocumentError::DuplicateName(name));
            }
            self.objects.push((name, shape));
            Ok(())
        }

        pub fn remove_shape(&mut self, name: &str) -> Result<Shape, DocumentError> {
            let index = self
                .index_of(name)
                .ok_or_else(|| DocumentError::NotFound(name.to_string()))?;
            let (_, shape) = self.objects.remove(index);
            Ok(shape)
        }

        /// 先取出 `from` 处的条目再插入到 `to`，其余条目相对顺序不变。
        pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), DocumentError> {
            let len = self.objects.len();
            for index in [from, to] {
                if index >= len {
                    return Err(DocumentError::IndexOutOfRange { index, len });
                }
            }
            let entry = self.objects.remove(from);
            self.objects.insert(to, entry);
            Ok(())
        }

        /// 深拷贝指定图形并以新名称追加。
        pub fn duplicate(&mut self, name: &str) -> Result<String, DocumentError> {
            let copy = self
                .get(name)
                .cloned()
                .ok_or_else(|| DocumentError::NotFound(name.to_string()))?;
            self.add_shape(copy)
        }

        /// 所有图形包围盒的并集；空文档返回 `None`。
        pub fn bounds(&self) -> Option<Rect> {
            self.objects
                .iter()
                .map(|(_, shape)| shape.bounds())
                .reduce(|acc, bounds| acc.union(&bounds))
        }
    }

}
