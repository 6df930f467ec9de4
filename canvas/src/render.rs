//! Rendering: draws the full radar scene to a [`Surface`].
//!
//! The renderer receives a read-only [`Scene`] and produces pixels; it does
//! not mutate any application state. Layers, bottom first: room frame and
//! sensor marker, 1 m room grid, fan grid, fan, zones, targets, pose
//! controls, toolbar.
//!
//! All fallible surface calls propagate errors. The top-level caller
//! ([`crate::engine::Engine::render`]) handles the result.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::TAU;

use crate::consts::{FAN_HALF_ANGLE, RANGE_MAX_M};
use crate::hit::ZoneHandle;
use crate::input::UiState;
use crate::layout::Layout;
use crate::surface::Surface;
use crate::toolbar::{ButtonRect, ToolbarButton};
use crate::transform::Point;
use crate::zone::{Target, Zone};

/// Polyline segments used for each fan arc.
const FAN_STEPS: u32 = 96;

/// Radius of the orange sensor marker on the top wall.
const SENSOR_MARKER_RADIUS_PX: f64 = 4.0;

/// Drawn radius of the angle and range handles (hit radius is larger).
const POSE_HANDLE_DRAW_RADIUS_PX: f64 = 8.0;

/// Drawn radius of zone corner and edge handles.
const ZONE_HANDLE_DRAW_RADIUS_PX: f64 = 5.0;

/// Drawn radius of the zone centre handle.
const ZONE_CENTER_DRAW_RADIUS_PX: f64 = 6.0;

const TARGET_RADIUS_PX: f64 = 5.0;

/// Glow around occupied zones.
const OCCUPIED_GLOW_BLUR_PX: f64 = 12.0;

const SELECTION_STROKE: &str = "#0d6efd";
const POSE_HANDLE_FILL: &str = "rgba(255, 191, 0, 0.95)";
const POSE_HANDLE_STROKE: &str = "rgba(0, 0, 0, 0.45)";

/// Read-only inputs for one frame.
pub struct Scene<'a> {
    pub layout: &'a Layout,
    /// Stored zones with the in-flight drag preview already merged in.
    pub zones: &'a [Zone],
    pub targets: &'a [Target],
    pub ui: &'a UiState,
    pub dpr: f64,
}

/// Draw the full scene.
///
/// # Errors
///
/// Returns `Err` if any surface call fails.
pub fn draw<S: Surface>(s: &S, scene: &Scene<'_>) -> Result<(), S::Error> {
    let layout = scene.layout;

    s.set_transform(scene.dpr, 0.0, 0.0, scene.dpr, 0.0, 0.0)?;
    s.clear_rect(0.0, 0.0, layout.width, layout.height);

    draw_room_box(s, layout)?;
    draw_room_grid(s, layout);
    draw_fan_grid(s, layout);
    draw_fan(s, layout);
    draw_zones(s, scene)?;
    draw_targets(s, layout, scene.targets)?;
    if scene.ui.is_editing() {
        draw_pose_controls(s, layout, scene.ui)?;
    }
    draw_toolbar(s, &layout.buttons)
}

// =============================================================
// World layers
// =============================================================

fn draw_room_box<S: Surface>(s: &S, layout: &Layout) -> Result<(), S::Error> {
    let room = layout.room;
    s.save();
    s.set_line_width(1.5);
    s.set_stroke_style("rgba(0,0,0,0.6)");
    s.stroke_rect(room.x, room.y, room.size, room.size);

    let origin = layout.transform.origin;
    s.set_fill_style("rgba(255,128,0,0.9)");
    s.begin_path();
    s.arc(origin.x, origin.y, SENSOR_MARKER_RADIUS_PX, 0.0, TAU)?;
    s.fill();
    s.restore();
    Ok(())
}

/// Whole metres that fit in the range, as a loop bound.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_metres(range: f64) -> u32 {
    if range.is_finite() && range > 0.0 { range.floor() as u32 } else { 0 }
}

fn draw_room_grid<S: Surface>(s: &S, layout: &Layout) {
    let room = layout.room;
    let scale = layout.scale();
    s.save();
    s.set_stroke_style("rgba(0,0,0,0.15)");
    s.set_line_width(1.0);
    for m in 1..whole_metres(layout.transform.max_range) {
        let offset = f64::from(m) * scale;
        s.begin_path();
        s.move_to(room.x + offset, room.y);
        s.line_to(room.x + offset, room.y + room.size);
        s.stroke();
        s.begin_path();
        s.move_to(room.x, room.y + offset);
        s.line_to(room.x + room.size, room.y + offset);
        s.stroke();
    }
    s.restore();
}

/// Point on the fan arc at bearing `phi` and radius `r`, in sensor metres.
fn fan_point(phi: f64, r: f64) -> Point {
    Point::new(phi.sin() * r, -phi.cos() * r)
}

fn fan_bearing(step: u32) -> f64 {
    -FAN_HALF_ANGLE + f64::from(step) / f64::from(FAN_STEPS) * 2.0 * FAN_HALF_ANGLE
}

fn draw_fan_grid<S: Surface>(s: &S, layout: &Layout) {
    let t = &layout.transform;
    let range = t.max_range;
    if !range.is_finite() || range <= 0.0 {
        return;
    }
    s.save();
    s.set_stroke_style("rgba(0,0,0,0.18)");
    s.set_line_width(1.0);

    for ring in 1..=whole_metres(range) {
        let r = f64::from(ring);
        s.begin_path();
        for step in 0..=FAN_STEPS {
            let p = t.to_canvas(fan_point(fan_bearing(step), r));
            if step == 0 {
                s.move_to(p.x, p.y);
            } else {
                s.line_to(p.x, p.y);
            }
        }
        s.stroke();
    }

    let half = FAN_HALF_ANGLE;
    let p0 = t.to_canvas(Point::default());
    for phi in [-half, -half / 2.0, 0.0, half / 2.0, half] {
        let p1 = t.to_canvas(fan_point(phi, range));
        s.begin_path();
        s.move_to(p0.x, p0.y);
        s.line_to(p1.x, p1.y);
        s.stroke();
    }
    s.restore();
}

fn draw_fan<S: Surface>(s: &S, layout: &Layout) {
    let t = &layout.transform;
    let p0 = t.to_canvas(Point::default());
    s.save();
    s.begin_path();
    s.move_to(p0.x, p0.y);
    for step in 0..=FAN_STEPS {
        let p = t.to_canvas(fan_point(fan_bearing(step), t.max_range));
        s.line_to(p.x, p.y);
    }
    s.close_path();
    s.set_fill_style("rgba(13,110,253,0.20)");
    s.set_stroke_style("rgba(13,110,253,0.60)");
    s.set_line_width(2.0);
    s.fill();
    s.stroke();
    s.restore();
}

// =============================================================
// Zones and targets
// =============================================================

fn draw_zones<S: Surface>(s: &S, scene: &Scene<'_>) -> Result<(), S::Error> {
    let layout = scene.layout;
    s.save();
    s.set_font("12px monospace");
    s.set_text_align("center");
    s.set_text_baseline("middle");

    for zone in scene.zones.iter().filter(|z| z.enabled) {
        let n = zone.normalized();
        let p1 = layout.room_to_canvas(n.start);
        let p2 = layout.room_to_canvas(n.end);
        let (x, y, w, h) = (p1.x, p1.y, p2.x - p1.x, p2.y - p1.y);
        let palette = zone.id.palette();

        if zone.occupied {
            s.save();
            s.set_shadow(&palette.stroke(), OCCUPIED_GLOW_BLUR_PX, 0.0);
            s.stroke_rect(x, y, w, h);
            s.restore();
        }
        s.set_fill_style(&palette.fill(zone.occupied));
        s.set_stroke_style(&palette.stroke());
        s.set_line_width(1.5);
        s.fill_rect(x, y, w, h);
        s.stroke_rect(x, y, w, h);

        s.set_fill_style("black");
        s.fill_text(&zone.id.to_string(), x + w * 0.5, y + h * 0.5)?;

        let selected = scene.ui.is_editing() && scene.ui.selected == Some(zone.id);
        if selected {
            draw_zone_handles(s, layout, &n)?;
        }
        if selected || scene.ui.highlighted == Some(zone.id) {
            s.set_line_width(2.0);
            s.set_stroke_style(SELECTION_STROKE);
            s.stroke_rect(x, y, w, h);
        }
    }
    s.restore();
    Ok(())
}

fn draw_zone_handles<S: Surface>(s: &S, layout: &Layout, zone: &Zone) -> Result<(), S::Error> {
    for (handle, room_pt) in zone.handle_points() {
        let p = layout.room_to_canvas(room_pt);
        s.begin_path();
        match handle {
            ZoneHandle::Move => {
                s.set_fill_style("rgba(255,165,0,0.8)");
                s.arc(p.x, p.y, ZONE_CENTER_DRAW_RADIUS_PX, 0.0, TAU)?;
            }
            ZoneHandle::Resize(anchor) => {
                let (l, t, r, b) = anchor.edges();
                let corner = (l || r) && (t || b);
                s.set_fill_style(if corner { "#ffa500" } else { "#ffd166" });
                s.arc(p.x, p.y, ZONE_HANDLE_DRAW_RADIUS_PX, 0.0, TAU)?;
            }
        }
        s.fill();
    }
    Ok(())
}

fn draw_targets<S: Surface>(s: &S, layout: &Layout, targets: &[Target]) -> Result<(), S::Error> {
    s.save();
    s.set_font("11px monospace");
    s.set_text_align("left");
    s.set_text_baseline("middle");
    for target in targets {
        let p = layout.room_to_canvas(target.position());
        let alpha = target.intensity.unwrap_or(1.0).clamp(0.2, 1.0);
        s.begin_path();
        s.arc(p.x, p.y, TARGET_RADIUS_PX, 0.0, TAU)?;
        s.set_fill_style(&format!("rgba(200,10,10,{})", 0.5 * alpha));
        s.fill();
        s.set_line_width(1.0);
        s.set_stroke_style(&format!("rgba(13,110,253,{})", 0.8 * alpha));
        s.stroke();
        s.set_fill_style("black");
        s.fill_text(&format!("T{}", target.id), p.x + TARGET_RADIUS_PX + 2.0, p.y)?;
    }
    s.restore();
    Ok(())
}

// =============================================================
// Pose controls
// =============================================================

fn draw_handle_dot<S: Surface>(s: &S, p: Point) -> Result<(), S::Error> {
    s.set_fill_style(POSE_HANDLE_FILL);
    s.set_stroke_style(POSE_HANDLE_STROKE);
    s.set_line_width(1.5);
    s.begin_path();
    s.arc(p.x, p.y, POSE_HANDLE_DRAW_RADIUS_PX, 0.0, TAU)?;
    s.fill();
    s.stroke();
    Ok(())
}

fn draw_pose_controls<S: Surface>(s: &S, layout: &Layout, ui: &UiState) -> Result<(), S::Error> {
    s.save();
    s.set_line_cap("round");
    s.set_line_join("round");

    if ui.show_angle_handle {
        draw_handle_dot(s, layout.angle_handle)?;
    }
    if ui.show_range_handle {
        draw_range_ruler(s, layout)?;
        draw_handle_dot(s, layout.range_handle)?;
    }
    s.restore();
    Ok(())
}

fn draw_range_ruler<S: Surface>(s: &S, layout: &Layout) -> Result<(), S::Error> {
    const CAP_LEN: f64 = 14.0;
    const TICK_LEN: f64 = 10.0;
    const TICK_COUNT: u32 = 3;
    const LADDER_OFFSET: f64 = 6.0;

    let x = layout.ruler_x();
    let top = layout.room.y;
    let bottom = layout.room.y + layout.room.size;

    s.set_stroke_style("rgba(0, 0, 0, 0.85)");
    s.set_line_width(1.5);
    s.begin_path();
    s.move_to(x, top);
    s.line_to(x, bottom);
    s.stroke();

    s.begin_path();
    s.move_to(x - CAP_LEN / 2.0, top);
    s.line_to(x + CAP_LEN / 2.0, top);
    s.move_to(x - CAP_LEN / 2.0, bottom);
    s.line_to(x + CAP_LEN / 2.0, bottom);
    s.stroke();

    for i in 0..TICK_COUNT {
        let t = f64::from(i + 1) / f64::from(TICK_COUNT + 1);
        let ty = top + (bottom - top) * t;
        s.begin_path();
        s.move_to(x + LADDER_OFFSET, ty - TICK_LEN / 2.0);
        s.line_to(x + LADDER_OFFSET + TICK_LEN, ty - TICK_LEN / 2.0);
        s.stroke();
    }

    s.set_fill_style("rgba(0, 0, 0, 0.9)");
    s.set_font("12px sans-serif");
    s.set_text_align("left");
    s.set_text_baseline("middle");
    s.fill_text(&format!("{RANGE_MAX_M:.0}m"), x + CAP_LEN + 6.0, top)?;
    s.fill_text(&format!("{:.0}m", layout.transform.max_range), x + CAP_LEN + 6.0, bottom)?;
    Ok(())
}

// =============================================================
// Toolbar
// =============================================================

fn draw_toolbar<S: Surface>(s: &S, buttons: &[ButtonRect]) -> Result<(), S::Error> {
    s.save();
    s.set_text_align("center");
    s.set_text_baseline("middle");
    s.set_font("13px sans-serif");
    for rect in buttons {
        draw_tile(s, rect)?;
        draw_icon(s, rect)?;
        s.set_fill_style("#000");
        s.fill_text(rect.button.label(), rect.x + rect.w * 0.5, rect.y + rect.h + 18.0)?;
    }
    s.restore();
    Ok(())
}

fn rounded_rect<S: Surface>(s: &S, x: f64, y: f64, w: f64, h: f64, r: f64) -> Result<(), S::Error> {
    s.begin_path();
    s.move_to(x + r, y);
    s.arc_to(x + w, y, x + w, y + h, r)?;
    s.arc_to(x + w, y + h, x, y + h, r)?;
    s.arc_to(x, y + h, x, y, r)?;
    s.arc_to(x, y, x + w, y, r)?;
    s.close_path();
    Ok(())
}

fn draw_tile<S: Surface>(s: &S, rect: &ButtonRect) -> Result<(), S::Error> {
    let highlight = rect.button.is_highlighted();
    s.save();
    s.set_shadow("rgba(0,0,0,0.25)", 4.0, 2.0);
    rounded_rect(s, rect.x, rect.y, rect.w, rect.h, rect.w * 0.22)?;
    s.set_fill_style(if highlight { "rgba(180,200,255,0.35)" } else { "rgba(255,255,255,0.85)" });
    s.fill();
    s.set_line_width(1.5);
    s.set_stroke_style(if highlight { "rgba(50,80,200,0.8)" } else { "rgba(0,0,0,0.6)" });
    s.stroke();
    s.restore();
    Ok(())
}

fn line<S: Surface>(s: &S, from: (f64, f64), to: (f64, f64)) {
    s.begin_path();
    s.move_to(from.0, from.1);
    s.line_to(to.0, to.1);
    s.stroke();
}

/// Line icons on a 20-unit grid inside the tile.
fn draw_icon<S: Surface>(s: &S, rect: &ButtonRect) -> Result<(), S::Error> {
    let u = rect.w / 20.0;
    let g = |col: f64, row: f64| (rect.x + col * u, rect.y + row * u);

    s.save();
    s.set_line_width(2.0);
    s.set_stroke_style("#000");
    s.set_fill_style("#000");
    s.set_line_cap("round");
    s.set_line_join("round");

    match rect.button {
        ToolbarButton::Add => {
            line(s, g(10.0, 5.0), g(10.0, 15.0));
            line(s, g(5.0, 10.0), g(15.0, 10.0));
        }
        ToolbarButton::Edit => {
            line(s, g(6.0, 14.0), g(13.0, 7.0));
            line(s, g(13.0, 7.0), g(15.0, 9.0));
            line(s, g(15.0, 9.0), g(8.0, 16.0));
            line(s, g(8.0, 16.0), g(5.5, 16.5));
            line(s, g(5.5, 16.5), g(6.0, 14.0));
        }
        ToolbarButton::Save => {
            let (x, y) = g(5.0, 5.0);
            s.stroke_rect(x, y, 10.0 * u, 10.0 * u);
            let (ix, iy) = g(7.0, 5.0);
            s.stroke_rect(ix, iy, 6.0 * u, 3.5 * u);
            let (bx, by) = g(7.0, 11.0);
            s.stroke_rect(bx, by, 6.0 * u, 4.0 * u);
        }
        ToolbarButton::Discard => {
            line(s, g(6.0, 6.0), g(14.0, 14.0));
            line(s, g(14.0, 6.0), g(6.0, 14.0));
        }
        ToolbarButton::Angle => {
            line(s, g(5.0, 15.0), g(15.0, 15.0));
            line(s, g(5.0, 15.0), g(13.0, 6.0));
            let (cx, cy) = g(5.0, 15.0);
            s.begin_path();
            s.arc(cx, cy, 5.0 * u, -std::f64::consts::FRAC_PI_4, 0.0)?;
            s.stroke();
        }
        ToolbarButton::Range => {
            line(s, g(10.0, 4.0), g(10.0, 16.0));
            line(s, g(7.5, 4.0), g(12.5, 4.0));
            line(s, g(7.5, 16.0), g(12.5, 16.0));
            for row in [7.0, 10.0, 13.0] {
                line(s, g(10.0, row), g(12.0, row));
            }
        }
        ToolbarButton::Delete => {
            line(s, g(5.0, 6.5), g(15.0, 6.5));
            line(s, g(8.5, 6.5), g(8.5, 5.0));
            line(s, g(8.5, 5.0), g(11.5, 5.0));
            line(s, g(11.5, 5.0), g(11.5, 6.5));
            let (x, y) = g(6.5, 6.5);
            s.stroke_rect(x, y, 7.0 * u, 9.0 * u);
            line(s, g(9.0, 9.0), g(9.0, 13.5));
            line(s, g(11.0, 9.0), g(11.0, 13.5));
        }
    }
    s.restore();
    Ok(())
}
