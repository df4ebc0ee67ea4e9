use lyra_core::geometry::{AffineTransform, Rect, Vec2};

pub const MIN_ZOOM: f64 = 4.0;
pub const MAX_ZOOM: f64 = 10.0;
pub const ZOOM_STEP: f64 = 0.2;
pub const DEFAULT_ZOOM: f64 = 7.0;

const DEFAULT_SIZE: f64 = 100.0;

/// 视口状态：缩放级别、平移偏移（视口中心的世界坐标，单位米）、像素尺寸与界面缩放。
///
/// 缩放级别是以 10 为底的对数：`zoom = 7` 时一个像素对应 `1e-7` 米。
/// 派生量（每像素米数、可见区域）每次按需计算，不做缓存。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    width: f64,
    height: f64,
    display_scale: f64,
    zoom: f64,
    offset: Vec2,
}

impl ViewState {
    pub fn new(width: f64, height: f64, display_scale: f64) -> Self {
        let mut view = Self::default();
        view.resize(width, height);
        view.set_display_scale(display_scale);
        view
    }

    #[inline]
    fn clamp_zoom(value: f64) -> f64 {
        value.clamp(MIN_ZOOM, MAX_ZOOM)
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// 更新视口像素尺寸，负值按 0 处理。
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    #[inline]
    pub fn display_scale(&self) -> f64 {
        self.display_scale
    }

    /// 非正或非有限的缩放值会被忽略。
    pub fn set_display_scale(&mut self, scale: f64) {
        if scale.is_finite() && scale > 0.0 {
            self.display_scale = scale;
        }
    }

    #[inline]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = Self::clamp_zoom(zoom);
        }
    }

    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    #[inline]
    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    /// 恢复默认缩放并回到原点，像素尺寸与界面缩放保持不变。
    pub fn reset(&mut self) {
        self.zoom = DEFAULT_ZOOM;
        self.offset = Vec2::ZERO;
    }

    fn meters_per_pixel_at(&self, zoom: f64) -> f64 {
        10f64.powf(-zoom) / self.display_scale
    }

    #[inline]
    pub fn meters_per_pixel(&self) -> f64 {
        self.meters_per_pixel_at(self.zoom)
    }

    #[inline]
    pub fn pixels_per_meter(&self) -> f64 {
        1.0 / self.meters_per_pixel()
    }

    /// 当前可见的世界区域。
    pub fn visible_rect(&self) -> Rect {
        Rect::new(self.offset, self.size() * self.meters_per_pixel())
    }

    /// 世界坐标到屏幕坐标的仿射变换（未取整，Y 轴翻转）。
    pub fn screen_transform(&self) -> AffineTransform {
        let ppm = self.pixels_per_meter();
        let bottom_left = self.visible_rect().bottom_left();
        AffineTransform::IDENTITY
            .with_scale(Vec2::new(ppm, -ppm))
            .with_translation(Vec2::new(
                -bottom_left.x() * ppm,
                self.height + bottom_left.y() * ppm,
            ))
    }

    /// 世界坐标（米）转换为屏幕像素坐标，结果取整到像素。
    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        let mut screen = (world - self.visible_rect().bottom_left()) * self.pixels_per_meter();
        screen.0.y = self.height - screen.0.y;
        screen.round()
    }

    /// [`ViewState::to_screen`] 的精确逆变换，不取整。
    pub fn from_screen(&self, screen: Vec2) -> Vec2 {
        let flipped = Vec2::new(screen.x(), self.height - screen.y());
        flipped * self.meters_per_pixel() + self.visible_rect().bottom_left()
    }

    /// 屏幕像素位移转换为世界位移（Y 轴取反）。
    #[inline]
    pub fn screen_delta_to_world(&self, delta: Vec2) -> Vec2 {
        delta.flip_y() * self.meters_per_pixel()
    }

    /// 以 `steps * ZOOM_STEP` 调整缩放；给定锚点时保持锚点下的世界坐标不动。
    pub fn zoom_by(&mut self, steps: f64, anchor: Option<Vec2>) {
        if !steps.is_finite() {
            return;
        }
        let target = Self::clamp_zoom(self.zoom + steps * ZOOM_STEP);

        if let Some(anchor) = anchor {
            let anchor_world = self.from_screen(anchor);
            let previous = self.meters_per_pixel_at(self.zoom);
            let current = self.meters_per_pixel_at(target);
            let scaled = (anchor_world - self.offset) * (current / previous);
            self.offset = anchor_world - scaled;
        }

        self.zoom = target;
    }

    #[inline]
    pub fn zoom_in(&mut self, steps: u32, anchor: Option<Vec2>) {
        self.zoom_by(f64::from(steps), anchor);
    }

    #[inline]
    pub fn zoom_out(&mut self, steps: u32, anchor: Option<Vec2>) {
        self.zoom_by(-f64::from(steps), anchor);
    }

    /// 按屏幕像素位移平移视图（内容跟随鼠标移动）。
    pub fn pan_by(&mut self, screen_delta: Vec2) {
        self.offset -= self.screen_delta_to_world(screen_delta);
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            display_scale: 1.0,
            zoom: DEFAULT_ZOOM,
            offset: Vec2::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Vec2, expected: Vec2, tolerance: f64) {
        assert!(
            (actual - expected).length() <= tolerance,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn defaults_match_editor() {
        let view = ViewState::default();
        assert_eq!(view.zoom(), DEFAULT_ZOOM);
        assert_eq!(view.size(), Vec2::new(100.0, 100.0));
        assert!((view.meters_per_pixel() - 1e-7).abs() < 1e-20);

        let rect = view.visible_rect();
        assert!((rect.width() - 1e-5).abs() < 1e-18);
        assert!((rect.left() + 5e-6).abs() < 1e-18);
    }

    #[test]
    fn display_scale_shrinks_meters_per_pixel() {
        let view = ViewState::new(200.0, 100.0, 2.0);
        assert!((view.meters_per_pixel() - 5e-8).abs() < 1e-20);
        assert!((view.pixels_per_meter() - 2e7).abs() < 1e-3);

        let mut view = view;
        view.set_display_scale(0.0);
        assert_eq!(view.display_scale(), 2.0);
    }

    #[test]
    fn origin_maps_to_viewport_center() {
        let view = ViewState::default();
        assert_eq!(view.to_screen(Vec2::ZERO), Vec2::new(50.0, 50.0));
        // 世界 +Y 在屏幕上向上
        assert_eq!(view.to_screen(Vec2::new(1e-6, 1e-6)), Vec2::new(60.0, 40.0));
        assert_close(view.from_screen(Vec2::new(50.0, 50.0)), Vec2::ZERO, 1e-18);
    }

    #[test]
    fn screen_transform_agrees_with_to_screen() {
        let mut view = ViewState::new(640.0, 480.0, 1.25);
        view.set_offset(Vec2::new(3e-6, -2e-6));
        view.set_zoom(6.4);
        for world in [
            Vec2::ZERO,
            Vec2::new(1e-5, 2e-5),
            Vec2::new(-7.5e-6, 4e-6),
        ] {
            let exact = view.screen_transform().apply(world);
            assert_eq!(exact.round(), view.to_screen(world));
        }
    }

    #[test]
    fn screen_round_trip_is_identity_on_pixels() {
        let mut view = ViewState::new(800.0, 600.0, 1.0);
        let mut zoom = MIN_ZOOM;
        while zoom <= MAX_ZOOM {
            view.set_zoom(zoom);
            for offset in [Vec2::ZERO, Vec2::new(1e-5, -3e-6), Vec2::new(-2e-3, 5e-4)] {
                view.set_offset(offset);
                for pixel in [
                    Vec2::new(0.0, 0.0),
                    Vec2::new(17.0, 333.0),
                    Vec2::new(799.0, 599.0),
                    Vec2::new(400.0, 300.0),
                ] {
                    assert_eq!(view.to_screen(view.from_screen(pixel)), pixel);
                }
            }
            zoom += 0.5;
        }
    }

    #[test]
    fn zoom_is_clamped() {
        let mut view = ViewState::default();
        view.zoom_by(100.0, None);
        assert_eq!(view.zoom(), MAX_ZOOM);
        view.zoom_out(1_000, None);
        assert_eq!(view.zoom(), MIN_ZOOM);
        view.set_zoom(42.0);
        assert_eq!(view.zoom(), MAX_ZOOM);
        view.set_zoom(f64::NAN);
        assert_eq!(view.zoom(), MAX_ZOOM);
    }

    #[test]
    fn zoom_steps_by_fixed_increment() {
        let mut view = ViewState::default();
        view.zoom_in(2, None);
        assert!((view.zoom() - 7.4).abs() < 1e-12);
        view.zoom_out(1, None);
        assert!((view.zoom() - 7.2).abs() < 1e-12);
        assert_eq!(view.offset(), Vec2::ZERO);
    }

    #[test]
    fn anchored_zoom_keeps_anchor_fixed() {
        let mut view = ViewState::new(640.0, 480.0, 1.0);
        view.set_offset(Vec2::new(2e-6, -1e-6));
        let anchor = Vec2::new(100.0, 380.0);

        for steps in [1.0, 3.0, -2.0, -5.0] {
            let before = view.from_screen(anchor);
            view.zoom_by(steps, Some(anchor));
            let after = view.from_screen(anchor);
            let tolerance = view.meters_per_pixel() * 1e-6;
            assert_close(after, before, tolerance);
        }
    }

    #[test]
    fn pan_moves_content_with_cursor() {
        let mut view = ViewState::default();
        let world = Vec2::new(1e-6, 0.0);
        let before = view.to_screen(world);

        view.pan_by(Vec2::new(10.0, -5.0));
        assert_close(view.offset(), Vec2::new(-1e-6, -5e-7), 1e-18);
        assert_eq!(view.to_screen(world), before + Vec2::new(10.0, -5.0));
    }

    #[test]
    fn reset_keeps_size() {
        let mut view = ViewState::new(320.0, 240.0, 1.5);
        view.set_zoom(9.0);
        view.set_offset(Vec2::new(1.0, 1.0));
        view.reset();
        assert_eq!(view.zoom(), DEFAULT_ZOOM);
        assert_eq!(view.offset(), Vec2::ZERO);
        assert_eq!(view.width(), 320.0);
        assert_eq!(view.display_scale(), 1.5);
    }
}
