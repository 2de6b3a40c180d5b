// Viewport controller - Zoom/pan transform over the fixed content square
use crate::domain::plot::{BoundingBox, CONTENT_SIZE};

pub const MIN_SCALE: f64 = 0.5;
pub const MAX_SCALE: f64 = 8.0;
/// Scale factor applied per zoom button press
pub const ZOOM_STEP: f64 = 1.2;
/// Scale change per wheel delta unit
pub const WHEEL_SENSITIVITY: f64 = 0.001;
/// Pointer travel (screen px, either axis) that turns a press into a drag
pub const DRAG_THRESHOLD_PX: f64 = 2.0;

const BASE_STROKE_WIDTH: f64 = 2.0;
const MIN_STROKE_WIDTH: f64 = 0.5;
const BASE_FONT_SIZE: f64 = 24.0;
const MIN_FONT_SIZE: f64 = 14.0;
const MIN_LABEL_WIDTH_PX: f64 = 30.0;
const MIN_LABEL_HEIGHT_PX: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }
}

impl ViewportTransform {
    pub fn screen_to_content(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.translate_x) / self.scale,
            (screen.y - self.translate_y) / self.scale,
        )
    }

    pub fn content_to_screen(&self, content: Point) -> Point {
        Point::new(
            content.x * self.scale + self.translate_x,
            content.y * self.scale + self.translate_y,
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct PanGesture {
    start: Point,
    origin_offset: Point,
}

/// Owns the zoom/pan state of one map view.
#[derive(Debug, Clone)]
pub struct ViewportController {
    transform: ViewportTransform,
    width: f64,
    height: f64,
    pan: Option<PanGesture>,
    dragged: bool,
}

impl ViewportController {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            transform: ViewportTransform::default(),
            width,
            height,
            pan: None,
            dragged: false,
        }
    }

    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    pub fn scale(&self) -> f64 {
        self.transform.scale
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn screen_to_content(&self, screen: Point) -> Point {
        self.transform.screen_to_content(screen)
    }

    pub fn content_to_screen(&self, content: Point) -> Point {
        self.transform.content_to_screen(content)
    }

    /// Scales by `factor` (clamped to the zoom bounds) while keeping the
    /// content point under `screen` fixed on screen.
    pub fn zoom_at(&mut self, screen: Point, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }

        self.scale_about(screen, self.transform.scale * factor);
    }

    /// Wheel zoom around the pointer; negative `delta_y` zooms in.
    pub fn wheel(&mut self, screen: Point, delta_y: f64) {
        if !delta_y.is_finite() {
            return;
        }
        self.scale_about(screen, self.transform.scale - delta_y * WHEEL_SENSITIVITY);
    }

    fn scale_about(&mut self, screen: Point, target: f64) {
        let anchor = self.transform.screen_to_content(screen);
        let scale = target.clamp(MIN_SCALE, MAX_SCALE);

        self.transform = ViewportTransform {
            scale,
            translate_x: screen.x - anchor.x * scale,
            translate_y: screen.y - anchor.y * scale,
        };
    }

    pub fn zoom_in(&mut self) {
        self.zoom_at(self.center(), ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_at(self.center(), 1.0 / ZOOM_STEP);
    }

    pub fn reset_view(&mut self) {
        self.transform = ViewportTransform::default();
    }

    pub fn begin_pan(&mut self, screen: Point) {
        self.pan = Some(PanGesture {
            start: screen,
            origin_offset: Point::new(
                screen.x - self.transform.translate_x,
                screen.y - self.transform.translate_y,
            ),
        });
        self.dragged = false;
    }

    pub fn continue_pan(&mut self, screen: Point) {
        let Some(pan) = self.pan else {
            return;
        };

        self.transform.translate_x = screen.x - pan.origin_offset.x;
        self.transform.translate_y = screen.y - pan.origin_offset.y;

        if (screen.x - pan.start.x).abs() >= DRAG_THRESHOLD_PX
            || (screen.y - pan.start.y).abs() >= DRAG_THRESHOLD_PX
        {
            self.dragged = true;
        }
    }

    /// Ends the gesture. The drag flag survives until the next `begin_pan` so
    /// the click that follows the release can consult it.
    pub fn end_pan(&mut self) {
        self.pan = None;
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    pub fn was_dragged(&self) -> bool {
        self.dragged
    }

    /// Outline width in content units that renders at a constant screen width
    pub fn stroke_width(&self) -> f64 {
        (BASE_STROKE_WIDTH / self.transform.scale).max(MIN_STROKE_WIDTH)
    }

    pub fn selected_stroke_width(&self) -> f64 {
        self.stroke_width() * 2.0
    }

    pub fn label_font_size(&self) -> f64 {
        (BASE_FONT_SIZE / self.transform.scale).max(MIN_FONT_SIZE)
    }

    /// Labels are hidden once the box is too small on screen to read them.
    pub fn label_visible(&self, bbox: &BoundingBox) -> bool {
        bbox.width() * self.transform.scale >= MIN_LABEL_WIDTH_PX
            && bbox.height() * self.transform.scale >= MIN_LABEL_HEIGHT_PX
    }
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(CONTENT_SIZE, CONTENT_SIZE)
    }
}
