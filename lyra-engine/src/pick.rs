//! 屏幕空间拾取与拖拽。

use lyra_core::geometry::{Rect, Vec2};
use lyra_core::shape::{Shape, ShapeGeometry};

use crate::viewport::ViewState;

/// 点击容差（像素），所有可点击区域都按此值向外扩展。
pub const CLICK_BUMP: f64 = 4.0;

/// 纯点图形的默认拾取半径（像素）。
const POINT_RADIUS: f64 = 2.0;

/// 距离落在 `[inner, outer]` 区间内即命中。
fn annulus_intersect(point: Vec2, center: Vec2, outer: f64, inner: f64) -> bool {
    let distance = (point - center).length();
    distance <= outer && distance >= inner
}

/// 旋转盒测试：先把点变换到盒子的局部坐标系，再做轴对齐包含测试。
/// `inner` 两个分量都为正时，落在内盒中的点不算命中。
fn box_intersect(
    point: Vec2,
    center: Vec2,
    half_dims: Vec2,
    angle: f64,
    inner: Option<Vec2>,
) -> bool {
    let local = (point - center).rotated(angle) + center;
    if !Rect::from_half_dims(center, half_dims).overlaps_point(local) {
        return false;
    }
    match inner {
        Some(inner) if inner.x() > 0.0 && inner.y() > 0.0 => {
            !Rect::from_half_dims(center, inner).overlaps_point(local)
        }
        _ => true,
    }
}

/// 判断屏幕坐标 `point` 是否命中图形。
pub fn intersect(shape: &Shape, view: &ViewState, point: Vec2) -> bool {
    let ppm = view.pixels_per_meter();

    match &shape.geometry {
        ShapeGeometry::Point(p) => {
            let center = view.to_screen(p.center);
            annulus_intersect(point, center, POINT_RADIUS + CLICK_BUMP, -CLICK_BUMP)
        }
        ShapeGeometry::Cross(cross) | ShapeGeometry::ReferencePoint(cross) => {
            let center = view.to_screen(cross.center);
            let half_width = cross.width * ppm * 0.5;
            let horizontal = Vec2::new(half_width, CLICK_BUMP);
            let vertical = Vec2::new(CLICK_BUMP, half_width);
            box_intersect(point, center, horizontal, 0.0, None)
                || box_intersect(point, center, vertical, 0.0, None)
                || annulus_intersect(point, center, POINT_RADIUS + CLICK_BUMP, -CLICK_BUMP)
        }
        ShapeGeometry::Line(line) => {
            let delta = line.end - line.begin;
            let center = view.to_screen(line.midpoint());
            let angle = -delta.atan2().to_degrees();
            let half_dims = Vec2::new(CLICK_BUMP * 2.0, line.length() * ppm * 0.5);
            box_intersect(point, center, half_dims, angle, None)
        }
        ShapeGeometry::Circle(circle) => {
            // 空心圆只有轮廓一圈可点
            let center = view.to_screen(circle.center);
            let radius = circle.radius * ppm;
            annulus_intersect(point, center, radius + CLICK_BUMP, radius - CLICK_BUMP)
        }
        ShapeGeometry::FilledCircle(circle) => {
            let center = view.to_screen(circle.center);
            let radius = circle.radius * ppm;
            annulus_intersect(point, center, radius + CLICK_BUMP, -CLICK_BUMP)
        }
        ShapeGeometry::Annulus(annulus)
        | ShapeGeometry::CirclePolish(annulus)
        | ShapeGeometry::CircleStairs(annulus) => {
            let center = view.to_screen(annulus.center);
            annulus_intersect(
                point,
                center,
                annulus.radius * ppm + CLICK_BUMP,
                annulus.inner_radius * ppm - CLICK_BUMP,
            )
        }
        ShapeGeometry::Rectangle(rect) => {
            let center = view.to_screen(rect.center);
            let half_dims = rect.dimensions * 0.5 * ppm;
            box_intersect(
                point,
                center,
                half_dims + Vec2::splat(CLICK_BUMP),
                rect.angle,
                Some(half_dims - Vec2::splat(CLICK_BUMP)),
            )
        }
        ShapeGeometry::FilledRectangle(rect)
        | ShapeGeometry::RectanglePolish(rect)
        | ShapeGeometry::RectangleStairs(rect) => {
            let center = view.to_screen(rect.center);
            let half_dims = rect.dimensions * 0.5 * ppm + Vec2::splat(CLICK_BUMP);
            box_intersect(point, center, half_dims, rect.angle, None)
        }
    }
}

/// 按屏幕像素位移拖动图形。
pub fn translate(shape: &mut Shape, view: &ViewState, screen_delta: Vec2) {
    shape.translate(view.screen_delta_to_world(screen_delta));
}

#[cfg(test)]
mod tests {
    use lyra_core::shape::{
        AnnulusGeometry, CircleGeometry, CrossGeometry, LineGeometry, PointGeometry,
        RectangleGeometry, ShapeKind,
    };

    use super::*;

    // 默认视图：100x100 像素，1 像素 = 1e-7 米，世界原点位于 (50, 50)。
    fn origin() -> Vec2 {
        Vec2::new(50.0, 50.0)
    }

    fn at(dx: f64, dy: f64) -> Vec2 {
        origin() + Vec2::new(dx, dy)
    }

    fn circle(radius: f64) -> Shape {
        Shape::new(ShapeGeometry::Circle(CircleGeometry {
            center: Vec2::ZERO,
            radius,
        }))
    }

    fn rectangle(kind: ShapeKind, dims: Vec2, angle: f64) -> Shape {
        let geometry = RectangleGeometry {
            center: Vec2::ZERO,
            dimensions: dims,
            angle,
            settle_time_line: 0.0,
        };
        Shape::new(match kind {
            ShapeKind::Rectangle => ShapeGeometry::Rectangle(geometry),
            ShapeKind::RectanglePolish => ShapeGeometry::RectanglePolish(geometry),
            _ => ShapeGeometry::FilledRectangle(geometry),
        })
    }

    #[test]
    fn point_has_small_fixed_target() {
        let view = ViewState::default();
        let point = Shape::new(ShapeGeometry::Point(PointGeometry { center: Vec2::ZERO }));
        assert!(intersect(&point, &view, origin()));
        assert!(intersect(&point, &view, at(5.9, 0.0)));
        assert!(!intersect(&point, &view, at(6.1, 0.0)));
    }

    #[test]
    fn circle_outline_boundary_uses_click_bump() {
        let view = ViewState::default();
        // 半径 1e-6 米 = 10 像素
        let shape = circle(1e-6);
        assert!(intersect(&shape, &view, at(14.0 - 0.01, 0.0)));
        assert!(!intersect(&shape, &view, at(14.0 + 0.01, 0.0)));
        assert!(intersect(&shape, &view, at(0.0, 6.01)));
        assert!(!intersect(&shape, &view, at(0.0, 5.99)));
        assert!(!intersect(&shape, &view, origin()));
    }

    #[test]
    fn filled_circle_accepts_interior() {
        let view = ViewState::default();
        let shape = Shape::new(ShapeGeometry::FilledCircle(CircleGeometry {
            center: Vec2::ZERO,
            radius: 1e-6,
        }));
        assert!(intersect(&shape, &view, origin()));
        assert!(intersect(&shape, &view, at(-9.0, 9.0)));
        assert!(!intersect(&shape, &view, at(0.0, 14.5)));
    }

    #[test]
    fn annulus_family_excludes_hole() {
        let view = ViewState::default();
        let geometry = AnnulusGeometry {
            center: Vec2::ZERO,
            radius: 2e-6,
            inner_radius: 1e-6,
        };
        for shape in [
            Shape::new(ShapeGeometry::Annulus(geometry)),
            Shape::new(ShapeGeometry::CircleStairs(geometry)),
        ] {
            assert!(!intersect(&shape, &view, origin()));
            assert!(!intersect(&shape, &view, at(5.5, 0.0)));
            assert!(intersect(&shape, &view, at(6.5, 0.0)));
            assert!(intersect(&shape, &view, at(0.0, -15.0)));
            assert!(!intersect(&shape, &view, at(0.0, -24.5)));
        }
    }

    #[test]
    fn cross_arms_extend_hit_area() {
        let view = ViewState::default();
        // 宽 4e-6 米 = 40 像素，臂长 20 像素
        let shape = Shape::new(ShapeGeometry::Cross(CrossGeometry {
            center: Vec2::ZERO,
            width: 4e-6,
        }));
        assert!(intersect(&shape, &view, at(19.0, 3.0)));
        assert!(intersect(&shape, &view, at(-3.0, -19.0)));
        assert!(!intersect(&shape, &view, at(21.0, 0.0)));
        assert!(!intersect(&shape, &view, at(10.0, 10.0)));
        assert!(intersect(&shape, &view, at(4.0, 4.0)));
    }

    #[test]
    fn outline_rectangle_hits_border_band_only() {
        let view = ViewState::default();
        let dims = Vec2::new(2e-6, 2e-6);
        let outline = rectangle(ShapeKind::Rectangle, dims, 0.0);
        assert!(!intersect(&outline, &view, origin()));
        assert!(!intersect(&outline, &view, at(5.0, 5.0)));
        assert!(intersect(&outline, &view, at(10.0, 0.0)));
        assert!(intersect(&outline, &view, at(-13.5, 2.0)));
        assert!(!intersect(&outline, &view, at(14.5, 0.0)));

        let filled = rectangle(ShapeKind::FilledRectangle, dims, 0.0);
        assert!(intersect(&filled, &view, origin()));
        assert!(intersect(&filled, &view, at(5.0, 5.0)));
        assert!(!intersect(&filled, &view, at(0.0, 14.5)));

        let polish = rectangle(ShapeKind::RectanglePolish, dims, 0.0);
        assert!(intersect(&polish, &view, origin()));
    }

    #[test]
    fn thin_outline_rectangle_has_no_hole() {
        let view = ViewState::default();
        // 高 4 像素：内盒半高为负，整个盒子都可点
        let outline = rectangle(ShapeKind::Rectangle, Vec2::new(2e-6, 4e-7), 0.0);
        assert!(intersect(&outline, &view, origin()));
    }

    #[test]
    fn rotated_rectangle_follows_screen_orientation() {
        let view = ViewState::default();
        // 40x4 像素的长条，世界坐标逆时针旋转 90° 后在屏幕上竖直
        let bar = rectangle(ShapeKind::FilledRectangle, Vec2::new(4e-6, 4e-7), 90.0);
        assert!(intersect(&bar, &view, at(0.0, 20.0)));
        assert!(intersect(&bar, &view, at(0.0, -20.0)));
        assert!(!intersect(&bar, &view, at(20.0, 0.0)));

        // 45°：世界右上方向在屏幕上是右上（屏幕 Y 向下）
        let diagonal = rectangle(ShapeKind::FilledRectangle, Vec2::new(4e-6, 4e-7), 45.0);
        assert!(intersect(&diagonal, &view, at(12.0, -12.0)));
        assert!(!intersect(&diagonal, &view, at(12.0, 12.0)));
    }

    #[test]
    fn line_hit_box_follows_segment() {
        let view = ViewState::default();
        let horizontal = Shape::new(ShapeGeometry::Line(LineGeometry {
            begin: Vec2::new(-2e-6, 0.0),
            end: Vec2::new(2e-6, 0.0),
        }));
        assert!(intersect(&horizontal, &view, at(19.0, 7.0)));
        assert!(!intersect(&horizontal, &view, at(0.0, 9.0)));
        assert!(!intersect(&horizontal, &view, at(21.0, 0.0)));

        let diagonal = Shape::new(ShapeGeometry::Line(LineGeometry {
            begin: Vec2::ZERO,
            end: Vec2::new(2e-6, 2e-6),
        }));
        // 屏幕上从 (50,50) 指向 (70,30)
        assert!(intersect(&diagonal, &view, at(10.0, -10.0)));
        assert!(intersect(&diagonal, &view, at(18.0, -18.0)));
        assert!(!intersect(&diagonal, &view, at(10.0, 10.0)));
    }

    #[test]
    fn translate_inverts_screen_y() {
        let view = ViewState::default();
        let mut shape = circle(1e-6);
        translate(&mut shape, &view, Vec2::new(10.0, 20.0));
        let center = shape.center().unwrap();
        assert!((center - Vec2::new(1e-6, -2e-6)).length() < 1e-18);

        let mut line = Shape::new(ShapeGeometry::Line(LineGeometry {
            begin: Vec2::ZERO,
            end: Vec2::new(1e-6, 0.0),
        }));
        translate(&mut line, &view, Vec2::new(0.0, -10.0));
        match &line.geometry {
            ShapeGeometry::Line(l) => {
                assert!((l.begin - Vec2::new(0.0, 1e-6)).length() < 1e-18);
                assert!((l.end - Vec2::new(1e-6, 1e-6)).length() < 1e-18);
            }
            other => panic!("unexpected geometry {other:?}"),
        }
    }
}
