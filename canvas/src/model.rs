//! The single source of truth for pose, zones and targets.
//!
//! The model owns the zone store, the target list and the pose transform.
//! Host snapshots pass through an edit gate: while the user is editing, or
//! has unsaved changes, only targets are refreshed so a periodic host
//! update can never clobber a zone mid-gesture.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use serde::{Deserialize, Serialize};

use crate::consts::{ANGLE_LIMIT_DEG, DEFAULT_RANGE_M, RANGE_MAX_M, RANGE_MIN_M};
use crate::transform::Transform;
use crate::zone::{Target, Zone, ZoneStore};

// ── Pose ────────────────────────────────────────────────────────

/// Sensor mounting pose: installation angle and detection range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub angle_deg: f64,
    pub range_m: f64,
}

impl Default for Pose {
    fn default() -> Self {
        Self { angle_deg: 0.0, range_m: DEFAULT_RANGE_M }
    }
}

impl Pose {
    /// Copy with both scalars pulled into their allowed ranges.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self { angle_deg: clamp_angle(self.angle_deg), range_m: clamp_range(self.range_m) }
    }
}

fn clamp_angle(deg: f64) -> f64 {
    if deg.is_finite() { deg.clamp(-ANGLE_LIMIT_DEG, ANGLE_LIMIT_DEG) } else { 0.0 }
}

fn clamp_range(m: f64) -> f64 {
    if m.is_finite() { m.clamp(RANGE_MIN_M, RANGE_MAX_M) } else { DEFAULT_RANGE_M }
}

/// Sparse pose change. Absent fields are left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PoseUpdate {
    pub angle_deg: Option<f64>,
    pub range_m: Option<f64>,
}

impl PoseUpdate {
    #[must_use]
    pub fn angle(deg: f64) -> Self {
        Self { angle_deg: Some(deg), range_m: None }
    }

    #[must_use]
    pub fn range(m: f64) -> Self {
        Self { angle_deg: None, range_m: Some(m) }
    }
}

impl From<Pose> for PoseUpdate {
    fn from(pose: Pose) -> Self {
        Self { angle_deg: Some(pose.angle_deg), range_m: Some(pose.range_m) }
    }
}

// ── Snapshots ───────────────────────────────────────────────────

/// What gets persisted: pose and zones. Targets are never saved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub pose: Pose,
    pub zones: Vec<Zone>,
}

/// What the host reports: everything in a [`Snapshot`] plus live targets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExternalSnapshot {
    pub pose: Pose,
    pub zones: Vec<Zone>,
    #[serde(default)]
    pub targets: Vec<Target>,
}

impl ExternalSnapshot {
    /// The persistable part.
    #[must_use]
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot { pose: self.pose, zones: self.zones.clone() }
    }
}

/// How [`Model::accept_external_snapshot`] treated a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// Pose, zones and targets were replaced.
    Applied,
    /// An edit is pending; only targets were replaced.
    TargetsOnly,
}

// ── Change notification ─────────────────────────────────────────

/// What part of the model a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Zones,
    Targets,
    Transform,
}

/// Handle returned by [`Model::on_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(ChangeKind)>;

// ── Model ───────────────────────────────────────────────────────

/// Pose, zones, targets and the edit session.
pub struct Model {
    transform: Transform,
    zones: ZoneStore,
    targets: Vec<Target>,
    editing: bool,
    dirty: bool,
    last_external: Option<ExternalSnapshot>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    #[must_use]
    pub fn new() -> Self {
        Self {
            transform: Transform::default(),
            zones: ZoneStore::new(),
            targets: Vec::new(),
            editing: false,
            dirty: false,
            last_external: None,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    // --- Listeners ---

    /// Register a callback run synchronously after every completed mutation.
    pub fn on_change(&mut self, callback: impl FnMut(ChangeKind) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(callback)));
        id
    }

    /// Unregister a callback. Unknown ids are ignored.
    pub fn off_change(&mut self, id: ListenerId) {
        self.listeners.retain(|(lid, _)| *lid != id);
    }

    fn notify(&mut self, kind: ChangeKind) {
        for (_, listener) in &mut self.listeners {
            listener(kind);
        }
    }

    // --- Mutations ---

    /// Replace every zone as given. Marks the session dirty.
    pub fn update_zones(&mut self, zones: impl IntoIterator<Item = Zone>) {
        self.zones.load(zones);
        self.dirty = true;
        self.notify(ChangeKind::Zones);
    }

    /// Replace all targets. Always allowed and never dirties.
    pub fn update_targets(&mut self, targets: Vec<Target>) {
        self.targets = targets;
        self.notify(ChangeKind::Targets);
    }

    /// Change the pose for display only: no notification, no dirty flag.
    pub fn apply_local_preview(&mut self, update: PoseUpdate) {
        self.apply_pose(update);
    }

    /// Change the pose as a user edit: notifies and marks dirty.
    pub fn commit_pose(&mut self, update: PoseUpdate) {
        self.apply_pose(update);
        self.dirty = true;
        self.notify(ChangeKind::Transform);
    }

    fn apply_pose(&mut self, update: PoseUpdate) {
        if let Some(deg) = update.angle_deg {
            self.transform.set_angle_deg(clamp_angle(deg));
        }
        if let Some(m) = update.range_m {
            self.transform.set_max_range(clamp_range(m));
        }
    }

    // --- Edit session ---

    pub fn begin_edit(&mut self) {
        self.editing = true;
    }

    /// End the session and clear the dirty flag.
    pub fn commit_edit(&mut self) {
        self.editing = false;
        self.dirty = false;
    }

    /// End the session and restore the last host snapshot, if one was seen.
    pub fn discard_edit(&mut self) {
        self.commit_edit();
        if let Some(snapshot) = self.last_external.clone() {
            self.accept_external_snapshot(snapshot);
        }
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    #[must_use]
    pub fn has_dirty_changes(&self) -> bool {
        self.dirty
    }

    // --- Host data ---

    /// Take a host snapshot through the edit gate.
    ///
    /// The snapshot is remembered as the host baseline either way.
    pub fn accept_external_snapshot(&mut self, snapshot: ExternalSnapshot) -> SnapshotOutcome {
        let gated = self.editing || self.dirty;
        let ExternalSnapshot { pose, zones, targets } = snapshot.clone();
        self.last_external = Some(snapshot);

        if gated {
            log::debug!("external snapshot gated (editing={}, dirty={})", self.editing, self.dirty);
            self.update_targets(targets);
            return SnapshotOutcome::TargetsOnly;
        }

        let pose = pose.clamped();
        self.transform.set_angle_deg(pose.angle_deg);
        self.transform.set_max_range(pose.range_m);
        self.notify(ChangeKind::Transform);
        self.zones.load(zones);
        self.notify(ChangeKind::Zones);
        self.update_targets(targets);
        SnapshotOutcome::Applied
    }

    /// Pose and zones as they stand, for persisting.
    #[must_use]
    pub fn export_snapshot(&self) -> Snapshot {
        Snapshot { pose: self.pose(), zones: self.zones.to_vec() }
    }

    /// The last snapshot the host reported, gated or not.
    #[must_use]
    pub fn host_baseline(&self) -> Option<&ExternalSnapshot> {
        self.last_external.as_ref()
    }

    // --- Queries ---

    #[must_use]
    pub fn pose(&self) -> Pose {
        Pose { angle_deg: self.transform.angle_deg(), range_m: self.transform.max_range }
    }

    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    #[must_use]
    pub fn zones(&self) -> &ZoneStore {
        &self.zones
    }

    #[must_use]
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }
}
