/// View rotation state and zoom scale
use nalgebra::{Rotation3, Vector3};

/// Smallest allowed zoom scale
pub const MIN_SCALE: f64 = 10.0;
/// Largest allowed zoom scale
pub const MAX_SCALE: f64 = 500.0;
/// Scale a freshly opened view starts with
pub const DEFAULT_SCALE: f64 = 100.0;
/// Additive scale change per mouse wheel notch
pub const WHEEL_STEP: f64 = 5.0;
/// Multiplier applied by a single zoom-in action
pub const ZOOM_FACTOR: f64 = 1.2;
/// Radians of rotation per pixel of pointer drag
pub const DRAG_SENSITIVITY: f64 = 0.01;
/// Radians added around the vertical axis per auto-rotation tick
pub const AUTO_ROTATE_STEP: f64 = 0.02;
/// Interval between auto-rotation ticks, in milliseconds
pub const AUTO_ROTATE_INTERVAL_MS: u64 = 50;

/// Rotation around the horizontal (`x`) and vertical (`y`) axes, in radians
///
/// Angles accumulate without wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationState {
    pub x: f64,
    pub y: f64,
}

impl RotationState {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Rotation applied to mesh-space points before projection
    ///
    /// Turns by `-y` around the vertical axis first, then by `x` around the
    /// horizontal axis, so that `x' = x cos y - z sin y`.
    pub fn rotation_matrix(&self) -> Rotation3<f64> {
        let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), self.x);
        let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), -self.y);
        rx * ry
    }
}

/// How a scale change is applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleAdjustment {
    /// Multiply the current scale
    Factor(f64),
    /// Add to the current scale
    Delta(f64),
}

impl ScaleAdjustment {
    /// Adjustment for a number of wheel notches; positive notches zoom out
    pub fn wheel(notches: i32) -> Self {
        Self::Delta(-WHEEL_STEP * f64::from(notches))
    }
}

/// Apply an adjustment and clamp the result to `[MIN_SCALE, MAX_SCALE]`
pub fn adjust_scale(current: f64, adjustment: ScaleAdjustment) -> f64 {
    let scaled = match adjustment {
        ScaleAdjustment::Factor(factor) => current * factor,
        ScaleAdjustment::Delta(delta) => current + delta,
    };
    scaled.clamp(MIN_SCALE, MAX_SCALE)
}

/// Camera state owned by whoever draws the mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub rotation: RotationState,
    scale: f64,
}

impl ViewState {
    pub fn new(rotation: RotationState, scale: f64) -> Self {
        Self {
            rotation,
            scale: scale.clamp(MIN_SCALE, MAX_SCALE),
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn adjust_scale(&mut self, adjustment: ScaleAdjustment) {
        self.scale = adjust_scale(self.scale, adjustment);
    }

    /// Pointer drag: horizontal motion turns around `y`, vertical around `x`
    pub fn drag(&mut self, dx: f64, dy: f64) {
        self.rotation
            .rotate(dy * DRAG_SENSITIVITY, dx * DRAG_SENSITIVITY);
    }

    /// One auto-rotation tick
    pub fn auto_rotate(&mut self) {
        self.rotation.rotate(0.0, AUTO_ROTATE_STEP);
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(RotationState::zero(), DEFAULT_SCALE)
    }
}
