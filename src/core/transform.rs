//! Two-stage data-to-screen transform with precision renormalization.
//!
//! Data coordinates first go through the renormalization matrix `R`, which
//! re-centers the numeric origin near the active view, and then through the
//! view matrix `V`, which maps the view rectangle onto `[-1, 1]^2`. The final
//! viewport map turns normalized device coordinates into container pixels.
//!
//! Rendering backends receive vertices that were pushed through `R` in double
//! precision and then stored as `f32`, together with a single-precision copy
//! of `V`. Keeping renormalized magnitudes small relative to the view extent
//! is what prevents visible jitter when panning far from the data origin.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::aspect::AspectPolicy;
use crate::core::matrix::AffineMatrix4;
use crate::core::types::{DataPoint, Rect, ScreenPoint};
use crate::error::{PlotError, PlotResult};

/// Half-width substituted on each side of a zero-width extent.
pub const MIN_HALF_EXTENT: f64 = 0.5;

/// Default precision budget: `K = 2^(23 - 2)` keeps two bits of sub-pixel
/// accuracy in a 24-bit single-precision mantissa.
pub const DEFAULT_RENORMALIZATION_BITS: i32 = 23 - 2;

/// Outcome of installing new view limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsUpdate {
    /// `true` when `R` was rebuilt and renormalized vertices must be refreshed.
    pub renormalized: bool,
    /// `true` when a degenerate extent was widened.
    pub widened: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateTransform {
    aspect: AspectPolicy,
    screen: Rect,
    limits: Rect,
    renorm: AffineMatrix4,
    renorm_inv: AffineMatrix4,
    view: AffineMatrix4,
    view_inv: AffineMatrix4,
    view_f32: [[f32; 4]; 4],
    renormalization_bits: i32,
    renormalization_generation: u64,
}

impl CoordinateTransform {
    /// Creates a transform looking at `limits` through the pixel box `screen`.
    ///
    /// The initial `R` is built from `limits`, so the renormalized view starts
    /// as `[-1, 1]^2` and `V` maps it straight onto NDC.
    pub fn new(
        limits: Rect,
        screen: Rect,
        aspect: AspectPolicy,
        renormalization_bits: i32,
    ) -> PlotResult<Self> {
        let (limits, _) = sanitize_limits(limits)?;
        let mut transform = Self {
            aspect,
            screen: sanitize_screen(screen),
            limits,
            renorm: AffineMatrix4::identity(),
            renorm_inv: AffineMatrix4::identity(),
            view: AffineMatrix4::identity(),
            view_inv: AffineMatrix4::identity(),
            view_f32: AffineMatrix4::identity().to_f32(),
            renormalization_bits,
            renormalization_generation: 0,
        };
        transform.renormalize();
        Ok(transform)
    }

    #[must_use]
    pub fn aspect(&self) -> AspectPolicy {
        self.aspect
    }

    /// Data-space rectangle currently in view.
    #[must_use]
    pub fn limits(&self) -> Rect {
        self.limits
    }

    /// Pixel box of the plot area in container coordinates.
    #[must_use]
    pub fn screen(&self) -> Rect {
        self.screen
    }

    #[must_use]
    pub fn pixel_extent(&self) -> (f64, f64) {
        (self.screen.width(), self.screen.height())
    }

    #[must_use]
    pub fn renormalization_matrix(&self) -> &AffineMatrix4 {
        &self.renorm
    }

    #[must_use]
    pub fn renormalization_inverse(&self) -> &AffineMatrix4 {
        &self.renorm_inv
    }

    #[must_use]
    pub fn view_matrix(&self) -> &AffineMatrix4 {
        &self.view
    }

    #[must_use]
    pub fn view_inverse(&self) -> &AffineMatrix4 {
        &self.view_inv
    }

    /// Single-precision `V` for the rendering backend.
    #[must_use]
    pub fn view_matrix_f32(&self) -> &[[f32; 4]; 4] {
        &self.view_f32
    }

    /// Number of times `R` has been rebuilt since construction.
    #[must_use]
    pub fn renormalization_generation(&self) -> u64 {
        self.renormalization_generation
    }

    #[must_use]
    pub fn renormalization_threshold(&self) -> f64 {
        2f64.powi(self.renormalization_bits)
    }

    /// Updates the pixel box without touching the data limits.
    ///
    /// Callers that must preserve a data point across a resize follow up with
    /// [`CoordinateTransform::pan_to`].
    pub fn set_screen(&mut self, screen: Rect) {
        self.screen = sanitize_screen(screen);
    }

    /// Installs a new data-space view rectangle and runs the renormalization
    /// test.
    ///
    /// Reversed bounds are reordered and zero-width extents are widened by
    /// [`MIN_HALF_EXTENT`] on each side. Non-finite bounds are rejected.
    pub fn set_limits(&mut self, limits: Rect) -> PlotResult<LimitsUpdate> {
        let (limits, widened) = sanitize_limits(limits)?;
        if widened {
            debug!(
                l = limits.l,
                r = limits.r,
                b = limits.b,
                t = limits.t,
                "widened degenerate view limits"
            );
        }
        self.limits = limits;

        let (ml, mb) = self.renorm.apply(limits.l, limits.b);
        let (mr, mt) = self.renorm.apply(limits.r, limits.t);
        self.set_view(ml, mr, mb, mt);

        let renormalized = self.needs_renormalization(ml, mr, mb, mt);
        if renormalized {
            self.renormalize();
        }
        trace!(
            l = limits.l,
            r = limits.r,
            b = limits.b,
            t = limits.t,
            renormalized,
            "set view limits"
        );

        Ok(LimitsUpdate {
            renormalized,
            widened,
        })
    }

    /// Re-centers the view so `data_point` lands exactly on `screen_point`,
    /// with the current extent multiplied by `(scale_x, scale_y)`.
    pub fn pan_to(
        &mut self,
        data_point: DataPoint,
        screen_point: ScreenPoint,
        scale_x: f64,
        scale_y: f64,
    ) -> PlotResult<LimitsUpdate> {
        for (name, value) in [("scale_x", scale_x), ("scale_y", scale_y)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PlotError::InvalidLimits(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        if !data_point.is_finite() || !screen_point.x.is_finite() || !screen_point.y.is_finite() {
            return Err(PlotError::InvalidLimits(
                "pan anchor must be finite".to_owned(),
            ));
        }

        let w = scale_x * self.limits.width();
        let h = scale_y * self.limits.height();
        self.install_dimensions_at_point(w, h, data_point, screen_point)
    }

    /// Installs a `w x h` view with `data_point` locked under `screen_point`.
    pub fn install_dimensions_at_point(
        &mut self,
        w: f64,
        h: f64,
        data_point: DataPoint,
        screen_point: ScreenPoint,
    ) -> PlotResult<LimitsUpdate> {
        let (pw, ph) = self.pixel_extent();
        let ratio_x = (screen_point.x - self.screen.l) / pw;
        let ratio_y = (screen_point.y - self.screen.b) / ph;
        let l = data_point.x - ratio_x * w;
        let b = data_point.y - ratio_y * h;
        self.set_limits(Rect::new(l, b, l + w, b + h))
    }

    /// Applies the aspect policy to a data extent using the current pixel box.
    #[must_use]
    pub fn apply_aspect(&self, extent: (f64, f64)) -> (f64, f64) {
        self.aspect.apply(extent, self.pixel_extent())
    }

    /// Width fixed, height derived from the aspect policy.
    #[must_use]
    pub fn adjust_vertical(&self, extent: (f64, f64)) -> (f64, f64) {
        self.aspect.adjust_vertical(extent, self.pixel_extent())
    }

    /// Height fixed, width derived from the aspect policy.
    #[must_use]
    pub fn adjust_horizontal(&self, extent: (f64, f64)) -> (f64, f64) {
        self.aspect.adjust_horizontal(extent, self.pixel_extent())
    }

    /// Scales `rect` by `(scale_x, scale_y)` about its center and grows it to
    /// satisfy the aspect policy, preserving the center.
    #[must_use]
    pub fn aspect_adjusted(&self, rect: Rect, scale_x: f64, scale_y: f64) -> Rect {
        let extent = self.apply_aspect((rect.width() * scale_x, rect.height() * scale_y));
        Rect::from_center(rect.center(), extent.0, extent.1)
    }

    /// Maps a data point to container pixels.
    #[must_use]
    pub fn data_to_screen(&self, point: DataPoint) -> ScreenPoint {
        let (rx, ry) = self.renorm.apply(point.x, point.y);
        let (nx, ny) = self.view.apply(rx, ry);
        ScreenPoint::new(
            (nx + 1.0) * self.screen.width() / 2.0 + self.screen.l,
            (ny + 1.0) * self.screen.height() / 2.0 + self.screen.b,
        )
    }

    /// Exact inverse of [`CoordinateTransform::data_to_screen`].
    #[must_use]
    pub fn screen_to_data(&self, point: ScreenPoint) -> DataPoint {
        let nx = 2.0 * (point.x - self.screen.l) / self.screen.width() - 1.0;
        let ny = 2.0 * (point.y - self.screen.b) / self.screen.height() - 1.0;
        let (rx, ry) = self.view_inv.apply(nx, ny);
        let (x, y) = self.renorm_inv.apply(rx, ry);
        DataPoint::new(x, y)
    }

    /// Maps a data point into renormalized space.
    #[must_use]
    pub fn renormalize_point(&self, point: DataPoint) -> (f64, f64) {
        self.renorm.apply(point.x, point.y)
    }

    /// View rectangle recovered from `Vi` and `Ri`.
    ///
    /// Matches [`CoordinateTransform::limits`] up to rounding; the stored
    /// limits stay authoritative so repeated updates never drift.
    #[must_use]
    pub fn derived_limits(&self) -> Rect {
        let vi = &self.view_inv;
        let l = vi.entry(0, 3) - vi.entry(0, 0);
        let r = vi.entry(0, 3) + vi.entry(0, 0);
        let b = vi.entry(1, 3) - vi.entry(1, 1);
        let t = vi.entry(1, 3) + vi.entry(1, 1);
        let (l, b) = self.renorm_inv.apply(l, b);
        let (r, t) = self.renorm_inv.apply(r, t);
        Rect::new(l, b, r, t)
    }

    fn set_view(&mut self, ml: f64, mr: f64, mb: f64, mt: f64) {
        self.view = AffineMatrix4::ortho(ml, mr, mb, mt, -1.0, 1.0);
        self.view_inv = AffineMatrix4::unortho(ml, mr, mb, mt, -1.0, 1.0);
        self.view_f32 = self.view.to_f32();
    }

    fn needs_renormalization(&self, ml: f64, mr: f64, mb: f64, mt: f64) -> bool {
        let k = self.renormalization_threshold();
        let (pw, ph) = self.pixel_extent();
        let view_w = 2.0 * self.view_inv.entry(0, 0);
        let view_h = 2.0 * self.view_inv.entry(1, 1);
        let max_x = ml.abs().max(mr.abs());
        let max_y = mb.abs().max(mt.abs());
        max_x > view_w * k / pw || max_y > view_h * k / ph
    }

    fn renormalize(&mut self) {
        let Rect { l, b, r, t } = self.limits;
        self.renorm = AffineMatrix4::ortho(l, r, b, t, -1.0, 1.0);
        self.renorm_inv = AffineMatrix4::unortho(l, r, b, t, -1.0, 1.0);
        self.set_view(-1.0, 1.0, -1.0, 1.0);
        self.renormalization_generation += 1;
        debug!(
            generation = self.renormalization_generation,
            center_x = (l + r) / 2.0,
            center_y = (b + t) / 2.0,
            "rebuilt renormalization matrix"
        );
    }
}

fn sanitize_limits(limits: Rect) -> PlotResult<(Rect, bool)> {
    if !limits.is_finite() {
        return Err(PlotError::InvalidLimits(format!(
            "view limits must be finite, got ({}, {}, {}, {})",
            limits.l, limits.b, limits.r, limits.t
        )));
    }

    let mut limits = limits.normalized();
    let mut widened = false;
    if is_degenerate(limits.l, limits.r) {
        limits.l -= MIN_HALF_EXTENT;
        limits.r += MIN_HALF_EXTENT;
        widened = true;
    }
    if is_degenerate(limits.b, limits.t) {
        limits.b -= MIN_HALF_EXTENT;
        limits.t += MIN_HALF_EXTENT;
        widened = true;
    }
    Ok((limits, widened))
}

fn is_degenerate(lo: f64, hi: f64) -> bool {
    let span = hi - lo;
    span <= 0.0 || !(2.0 / span).is_finite()
}

fn sanitize_screen(screen: Rect) -> Rect {
    let screen = screen.normalized();
    Rect::new(
        screen.l,
        screen.b,
        screen.l + screen.width().max(1.0),
        screen.b + screen.height().max(1.0),
    )
}
