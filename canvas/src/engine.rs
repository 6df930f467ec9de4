use std::collections::BTreeSet;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::consts::MAX_ZONES;
use crate::frame::{FrameRequest, Lifecycle};
use crate::hit::{HitPart, hit_test};
use crate::input::{InputState, Mode, PointerId, UiState};
use crate::layout::{Layout, angle_from_pointer, range_from_pointer};
use crate::model::{ExternalSnapshot, Model, Pose, PoseUpdate, Snapshot, SnapshotOutcome};
use crate::render::{self, Scene};
use crate::surface::Surface;
use crate::toolbar::ToolbarButton;
use crate::transform::Point;
use crate::zone::{Zone, ZoneSlot};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Everything a save hands to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    /// Pose and zones as edited.
    pub snapshot: Snapshot,
    /// Last host state, for diffing. `None` if the host never reported.
    pub baseline: Option<Snapshot>,
    /// Slots deleted during the session; the host must zero and disable them.
    pub cleared: Vec<ZoneSlot>,
}

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    CapturePointer(PointerId),
    ReleasePointer(PointerId),
    /// A pose drag finished; push it to the host right away.
    PoseCommitted(Pose),
    Save(SaveRequest),
    /// Local edits were dropped; re-read the host state.
    ReloadRequested,
}

/// Core engine state: everything that does not touch the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub model: Model,
    pub ui: UiState,
    pub input: InputState,
    pub lifecycle: Lifecycle,
    pub frames: FrameRequest,
    pub dpr: f64,
    deleted: BTreeSet<ZoneSlot>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineCore {
    /// Create a core whose model changes request a redraw.
    #[must_use]
    pub fn new() -> Self {
        let frames = FrameRequest::new();
        let mut model = Model::new();
        let on_change = frames.clone();
        model.on_change(move |_| {
            on_change.request();
        });
        Self {
            model,
            ui: UiState::default(),
            input: InputState::default(),
            lifecycle: Lifecycle::default(),
            frames,
            dpr: 1.0,
            deleted: BTreeSet::new(),
        }
    }

    // --- Data inputs ---

    /// Take a host snapshot through the model's edit gate.
    pub fn accept_external_snapshot(&mut self, snapshot: ExternalSnapshot) -> SnapshotOutcome {
        let outcome = self.model.accept_external_snapshot(snapshot);
        if outcome == SnapshotOutcome::Applied {
            if let Some(slot) = self.ui.selected {
                if self.model.zones().get(slot).is_none() {
                    self.ui.selected = None;
                }
            }
        }
        outcome
    }

    /// Highlight a zone at the host's request. While editing it also becomes the selection.
    pub fn select_zone(&mut self, slot: Option<ZoneSlot>) {
        self.ui.highlighted = slot;
        if self.ui.is_editing() {
            self.ui.selected = slot.filter(|s| self.model.zones().get(*s).is_some());
        }
        self.frames.request();
    }

    // --- Viewport ---

    /// Feed a size measurement. Returns whether the engine can draw.
    ///
    /// Always requests a frame: once ready it draws, while sizing it re-measures.
    pub fn observe_size(&mut self, width_css: f64, height_css: f64, dpr: f64) -> bool {
        self.dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        let was_ready = self.lifecycle.is_ready();
        self.lifecycle = self.lifecycle.observe_size(width_css, height_css);
        let ready = self.lifecycle.is_ready();
        if was_ready && !ready {
            log::debug!("viewport collapsed to {width_css}x{height_css}; waiting for layout");
        }
        self.frames.request();
        ready
    }

    /// Whether the next frame must measure the canvas before drawing.
    #[must_use]
    pub fn needs_measure(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Sizing { .. })
    }

    /// Geometry for the current frame, once the viewport is ready.
    #[must_use]
    pub fn layout(&self) -> Option<Layout> {
        let (w, h) = self.lifecycle.size()?;
        Some(Layout::compute(w, h, self.model.transform(), self.ui.mode, self.ui.selected.is_some()))
    }

    /// Stored zones with the in-flight preview merged in, in slot order.
    #[must_use]
    pub fn display_zones(&self) -> Vec<Zone> {
        let preview = self.input.preview_zone();
        self.model
            .zones()
            .iter()
            .map(|z| match preview {
                Some(p) if p.id == z.id => *p,
                _ => *z,
            })
            .collect()
    }

    /// The zone list as JSON, local edits included: `[{id, enabled, occupied, start, end}]`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a coordinate is not finite.
    pub fn zones_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self.display_zones())
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, pointer: PointerId, pt: Point) -> Vec<Action> {
        if !self.input.is_idle() {
            return Vec::new();
        }
        let Some(layout) = self.layout() else {
            return Vec::new();
        };
        let zones = self.display_zones();

        match hit_test(pt, &layout, &self.ui, &zones) {
            Some(HitPart::Button(button)) => self.press_button(button),
            Some(HitPart::AngleHandle) => {
                let preview_deg = self.model.pose().angle_deg;
                self.input = InputState::DraggingAngle { pointer, preview_deg };
                vec![Action::CapturePointer(pointer)]
            }
            Some(HitPart::RangeHandle) => {
                let preview_m = self.model.pose().range_m;
                self.input = InputState::DraggingRange { pointer, preview_m };
                vec![Action::CapturePointer(pointer)]
            }
            Some(HitPart::Zone { slot, handle }) => {
                let Some(zone) = zones.iter().find(|z| z.id == slot) else {
                    return Vec::new();
                };
                if !self.model.is_editing() {
                    self.model.begin_edit();
                }
                let original = zone.normalized();
                log::debug!("zone drag start: {slot} {handle:?}");
                self.input = InputState::DraggingZone {
                    pointer,
                    slot,
                    handle,
                    start_room: layout.canvas_to_room(pt),
                    original,
                    preview: original,
                };
                self.ui.selected = Some(slot);
                self.frames.request();
                vec![Action::CapturePointer(pointer)]
            }
            None => {
                if self.ui.is_editing() && self.ui.selected.take().is_some() {
                    self.frames.request();
                }
                Vec::new()
            }
        }
    }

    pub fn on_pointer_move(&mut self, pointer: PointerId, pt: Point) -> Vec<Action> {
        if self.input.pointer() != Some(pointer) {
            return Vec::new();
        }
        let Some(layout) = self.layout() else {
            return Vec::new();
        };

        match &mut self.input {
            InputState::DraggingAngle { preview_deg, .. } => {
                *preview_deg = angle_from_pointer(layout.room, pt.x);
                self.model.apply_local_preview(PoseUpdate::angle(*preview_deg));
            }
            InputState::DraggingRange { preview_m, .. } => {
                *preview_m = range_from_pointer(layout.room, pt.y);
                self.model.apply_local_preview(PoseUpdate::range(*preview_m));
            }
            InputState::DraggingZone { handle, start_room, original, preview, .. } => {
                let current = layout.canvas_to_room(pt);
                let delta = Point::new(current.x - start_room.x, current.y - start_room.y);
                *preview = original.dragged(*handle, delta, self.model.transform().max_range);
            }
            InputState::Idle => return Vec::new(),
        }
        self.frames.request();
        Vec::new()
    }

    /// Pointer released. Commits the gesture's preview.
    pub fn on_pointer_up(&mut self, pointer: PointerId) -> Vec<Action> {
        if self.input.pointer() != Some(pointer) {
            return Vec::new();
        }
        let mut actions = vec![Action::ReleasePointer(pointer)];

        match std::mem::take(&mut self.input) {
            InputState::DraggingZone { slot, original, preview, .. } => {
                if preview != original {
                    let zones: Vec<Zone> =
                        self.model.zones().iter().map(|z| if z.id == slot { preview } else { *z }).collect();
                    log::debug!("zone drag commit: {slot} {:?}-{:?}", preview.start, preview.end);
                    self.model.update_zones(zones);
                }
            }
            InputState::DraggingAngle { preview_deg, .. } => {
                self.model.commit_pose(PoseUpdate::angle(preview_deg));
                actions.push(Action::PoseCommitted(self.model.pose()));
            }
            InputState::DraggingRange { preview_m, .. } => {
                self.model.commit_pose(PoseUpdate::range(preview_m));
                actions.push(Action::PoseCommitted(self.model.pose()));
            }
            InputState::Idle => {}
        }
        self.frames.request();
        actions
    }

    /// Pointer cancelled or capture lost. Same cleanup as a release.
    pub fn on_pointer_cancel(&mut self, pointer: PointerId) -> Vec<Action> {
        self.on_pointer_up(pointer)
    }

    // --- Toolbar ---

    pub fn press_button(&mut self, button: ToolbarButton) -> Vec<Action> {
        log::debug!("toolbar: {}", button.label());
        match button {
            ToolbarButton::Add => self.add_zone(),
            ToolbarButton::Edit => {
                self.enter_edit();
                Vec::new()
            }
            ToolbarButton::Save => self.save(),
            ToolbarButton::Discard => self.discard(),
            ToolbarButton::Angle => {
                self.ui.show_angle_handle = !self.ui.show_angle_handle;
                self.frames.request();
                Vec::new()
            }
            ToolbarButton::Range => {
                self.ui.show_range_handle = !self.ui.show_range_handle;
                self.frames.request();
                Vec::new()
            }
            ToolbarButton::Delete => {
                self.delete_selected_zone();
                Vec::new()
            }
        }
    }

    pub fn enter_edit(&mut self) {
        self.ui.enter_edit();
        self.model.begin_edit();
        self.frames.request();
    }

    /// Add a default zone in the smallest free slot, select it and start editing.
    pub fn add_zone(&mut self) -> Vec<Action> {
        let Some(slot) = self.model.zones().next_free_slot() else {
            log::warn!("add zone ignored: all {MAX_ZONES} zone slots are in use");
            return Vec::new();
        };
        let zone = Zone::centered(slot, self.model.transform().max_range);
        let mut zones: Vec<Zone> = self.model.zones().iter().filter(|z| z.id != slot).copied().collect();
        zones.push(zone);

        self.deleted.remove(&slot);
        self.enter_edit();
        self.model.update_zones(zones);
        self.ui.selected = Some(slot);
        Vec::new()
    }

    /// Remove the selected zone; its slot is cleared on the host at the next save.
    pub fn delete_selected_zone(&mut self) {
        let Some(slot) = self.ui.selected.take() else {
            return;
        };
        let zones: Vec<Zone> = self.model.zones().iter().filter(|z| z.id != slot).copied().collect();
        self.model.begin_edit();
        self.model.update_zones(zones);
        self.deleted.insert(slot);
        if self.ui.highlighted == Some(slot) {
            self.ui.highlighted = None;
        }
    }

    /// Export the session for the host and return to view mode.
    pub fn save(&mut self) -> Vec<Action> {
        let request = SaveRequest {
            snapshot: self.model.export_snapshot(),
            baseline: self.model.host_baseline().map(ExternalSnapshot::to_snapshot),
            cleared: std::mem::take(&mut self.deleted).into_iter().collect(),
        };
        self.model.commit_edit();
        self.ui.leave_edit();
        self.frames.request();
        vec![Action::Save(request)]
    }

    /// Drop local edits, restore the host state and return to view mode.
    pub fn discard(&mut self) -> Vec<Action> {
        self.model.discard_edit();
        self.deleted.clear();
        self.input = InputState::Idle;
        self.ui.leave_edit();
        self.frames.request();
        vec![Action::ReloadRequested]
    }

    // --- Render ---

    /// Draw one frame onto `surface`. Returns whether anything was drawn.
    ///
    /// Draw errors are logged with the current geometry and the frame is abandoned.
    pub fn draw_frame<S>(&self, surface: &S) -> bool
    where
        S: Surface,
        S::Error: std::fmt::Debug,
    {
        let Some(layout) = self.layout() else {
            return false;
        };
        let zones = self.display_zones();
        let scene =
            Scene { layout: &layout, zones: &zones, targets: self.model.targets(), ui: &self.ui, dpr: self.dpr };
        match render::draw(surface, &scene) {
            Ok(()) => true,
            Err(err) => {
                let t = &layout.transform;
                log::error!(
                    "draw failed: {err:?} (origin=({:.1}, {:.1}) scale={:.3} theta={:.4} zones={} targets={})",
                    t.origin.x,
                    t.origin.y,
                    t.scale,
                    t.theta,
                    zones.len(),
                    self.model.targets().len()
                );
                false
            }
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.ui.mode
    }

    #[must_use]
    pub fn selection(&self) -> Option<ZoneSlot> {
        self.ui.selected
    }

    /// Slots deleted since the last save or discard.
    #[must_use]
    pub fn pending_deletes(&self) -> Vec<ZoneSlot> {
        self.deleted.iter().copied().collect()
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the canvas has no 2D context.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx, core: EngineCore::new() })
    }

    // --- Delegated data inputs ---

    pub fn accept_external_snapshot(&mut self, snapshot: ExternalSnapshot) -> SnapshotOutcome {
        self.core.accept_external_snapshot(snapshot)
    }

    pub fn select_zone(&mut self, slot: Option<ZoneSlot>) {
        self.core.select_zone(slot);
    }

    // --- Viewport ---

    /// Update viewport dimensions and device pixel ratio, resizing the backing store once ready.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> bool {
        if !self.core.observe_size(width_css, height_css, dpr) {
            return false;
        }
        let dpr = self.core.dpr;
        self.canvas.set_width(device_pixels(width_css * dpr));
        self.canvas.set_height(device_pixels(height_css * dpr));
        true
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, pointer: PointerId, pt: Point) -> Vec<Action> {
        self.core.on_pointer_down(pointer, pt)
    }

    pub fn on_pointer_move(&mut self, pointer: PointerId, pt: Point) -> Vec<Action> {
        self.core.on_pointer_move(pointer, pt)
    }

    pub fn on_pointer_up(&mut self, pointer: PointerId) -> Vec<Action> {
        self.core.on_pointer_up(pointer)
    }

    pub fn on_pointer_cancel(&mut self, pointer: PointerId) -> Vec<Action> {
        self.core.on_pointer_cancel(pointer)
    }

    // --- Render ---

    /// Draw the current state to the canvas. Call from the animation-frame callback.
    ///
    /// While the viewport is still sizing this measures the canvas first, so a
    /// single size report from the host is enough to reach the first draw.
    pub fn render(&mut self) -> bool {
        self.core.frames.begin_frame();
        if self.core.needs_measure() {
            let rect = self.canvas.get_bounding_client_rect();
            let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
            self.set_viewport(rect.width().round(), rect.height().round(), dpr);
        }
        self.core.draw_frame(&self.ctx)
    }

    /// Whether a frame was requested that the host has not scheduled yet.
    #[must_use]
    pub fn take_frame_schedule(&self) -> bool {
        self.core.frames.take_schedule()
    }

    /// Scheduling the animation frame failed; allow the next request to retry.
    pub fn cancel_frame(&self) {
        self.core.frames.cancel();
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.core.mode()
    }

    #[must_use]
    pub fn selection(&self) -> Option<ZoneSlot> {
        self.core.selection()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.core.lifecycle.is_ready()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn device_pixels(css: f64) -> u32 {
    css.round().max(0.0) as u32
}
