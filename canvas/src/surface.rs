//! Drawing primitives the renderer needs, behind a trait.
//!
//! [`crate::render`] only talks to a [`Surface`]. The browser implementation
//! forwards to [`web_sys::CanvasRenderingContext2d`]; tests use the
//! recording surface below to assert on draw order without a browser.

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

/// The subset of the Canvas 2D API used by the renderer.
///
/// Fallible methods mirror the ones that can throw in the browser.
pub trait Surface {
    type Error;

    fn save(&self);
    fn restore(&self);

    /// Replace the current transform matrix.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the backing context rejects the matrix.
    fn set_transform(&self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Result<(), Self::Error>;
    fn clear_rect(&self, x: f64, y: f64, w: f64, h: f64);

    fn set_fill_style(&self, style: &str);
    fn set_stroke_style(&self, style: &str);
    fn set_line_width(&self, width: f64);
    fn set_line_cap(&self, cap: &str);
    fn set_line_join(&self, join: &str);
    fn set_shadow(&self, color: &str, blur: f64, offset_y: f64);
    fn set_font(&self, font: &str);
    fn set_text_align(&self, align: &str);
    fn set_text_baseline(&self, baseline: &str);

    fn begin_path(&self);
    fn move_to(&self, x: f64, y: f64);
    fn line_to(&self, x: f64, y: f64);
    fn close_path(&self);

    /// Full-circle or partial arc around `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns `Err` for a negative radius.
    fn arc(&self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), Self::Error>;

    /// Rounded corner between the current point and `(x2, y2)` via `(x1, y1)`.
    ///
    /// # Errors
    ///
    /// Returns `Err` for a negative radius.
    fn arc_to(&self, x1: f64, y1: f64, x2: f64, y2: f64, radius: f64) -> Result<(), Self::Error>;

    fn fill(&self);
    fn stroke(&self);
    fn fill_rect(&self, x: f64, y: f64, w: f64, h: f64);
    fn stroke_rect(&self, x: f64, y: f64, w: f64, h: f64);

    /// # Errors
    ///
    /// Returns `Err` if the context cannot render text.
    fn fill_text(&self, text: &str, x: f64, y: f64) -> Result<(), Self::Error>;
}

impl Surface for CanvasRenderingContext2d {
    type Error = JsValue;

    fn save(&self) {
        CanvasRenderingContext2d::save(self);
    }

    fn restore(&self) {
        CanvasRenderingContext2d::restore(self);
    }

    fn set_transform(&self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Result<(), JsValue> {
        CanvasRenderingContext2d::set_transform(self, a, b, c, d, e, f)
    }

    fn clear_rect(&self, x: f64, y: f64, w: f64, h: f64) {
        CanvasRenderingContext2d::clear_rect(self, x, y, w, h);
    }

    fn set_fill_style(&self, style: &str) {
        self.set_fill_style_str(style);
    }

    fn set_stroke_style(&self, style: &str) {
        self.set_stroke_style_str(style);
    }

    fn set_line_width(&self, width: f64) {
        CanvasRenderingContext2d::set_line_width(self, width);
    }

    fn set_line_cap(&self, cap: &str) {
        CanvasRenderingContext2d::set_line_cap(self, cap);
    }

    fn set_line_join(&self, join: &str) {
        CanvasRenderingContext2d::set_line_join(self, join);
    }

    fn set_shadow(&self, color: &str, blur: f64, offset_y: f64) {
        self.set_shadow_color(color);
        self.set_shadow_blur(blur);
        self.set_shadow_offset_y(offset_y);
    }

    fn set_font(&self, font: &str) {
        CanvasRenderingContext2d::set_font(self, font);
    }

    fn set_text_align(&self, align: &str) {
        CanvasRenderingContext2d::set_text_align(self, align);
    }

    fn set_text_baseline(&self, baseline: &str) {
        CanvasRenderingContext2d::set_text_baseline(self, baseline);
    }

    fn begin_path(&self) {
        CanvasRenderingContext2d::begin_path(self);
    }

    fn move_to(&self, x: f64, y: f64) {
        CanvasRenderingContext2d::move_to(self, x, y);
    }

    fn line_to(&self, x: f64, y: f64) {
        CanvasRenderingContext2d::line_to(self, x, y);
    }

    fn close_path(&self) {
        CanvasRenderingContext2d::close_path(self);
    }

    fn arc(&self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), JsValue> {
        CanvasRenderingContext2d::arc(self, x, y, radius, start, end)
    }

    fn arc_to(&self, x1: f64, y1: f64, x2: f64, y2: f64, radius: f64) -> Result<(), JsValue> {
        CanvasRenderingContext2d::arc_to(self, x1, y1, x2, y2, radius)
    }

    fn fill(&self) {
        CanvasRenderingContext2d::fill(self);
    }

    fn stroke(&self) {
        CanvasRenderingContext2d::stroke(self);
    }

    fn fill_rect(&self, x: f64, y: f64, w: f64, h: f64) {
        CanvasRenderingContext2d::fill_rect(self, x, y, w, h);
    }

    fn stroke_rect(&self, x: f64, y: f64, w: f64, h: f64) {
        CanvasRenderingContext2d::stroke_rect(self, x, y, w, h);
    }

    fn fill_text(&self, text: &str, x: f64, y: f64) -> Result<(), JsValue> {
        CanvasRenderingContext2d::fill_text(self, text, x, y)
    }
}
