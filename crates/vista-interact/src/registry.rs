//! Registration and pointer dispatch for interactive targets.

use std::collections::{BTreeMap, BTreeSet};

use glam::DVec3;
use vista_geo::Ray;

use crate::target::{EventTarget, MenuItem, PointerContext, TargetId, TargetKind};

/// Tracks registered targets plus the hovered and dragged subsets.
///
/// Invariants:
/// - `hovered` and `dragged` only ever contain registered ids.
/// - A target is hovered only if it has an enter or leave callback, and
///   dragged only if it has at least one drag callback.
/// - Registered targets iterate in ascending id order, which is also
///   registration order for ids handed out by [`add`](Self::add).
#[derive(Debug, Default)]
pub struct EventLayerRegistry {
    next_id: u64,
    targets: BTreeMap<TargetId, EventTarget>,
    hovered: BTreeSet<TargetId>,
    dragged: BTreeSet<TargetId>,
}

/// Hit list with duplicates and unregistered ids removed, order kept.
fn unique_hits(hits: &[TargetId]) -> Vec<TargetId> {
    let mut seen = BTreeSet::new();
    hits.iter().copied().filter(|id| seen.insert(*id)).collect()
}

impl EventLayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a target under a fresh id. Ids are never reused and never
    /// equal [`TargetId::RESERVED`].
    pub fn add(&mut self, target: EventTarget) -> TargetId {
        let id = TargetId(self.next_id);
        self.next_id += 1;
        self.targets.insert(id, target);
        id
    }

    /// Unregister a target, dropping it from the hover and drag sets without
    /// firing callbacks. Removing an absent id is a no-op.
    pub fn remove(&mut self, id: TargetId) -> Option<EventTarget> {
        self.hovered.remove(&id);
        self.dragged.remove(&id);
        self.targets.remove(&id)
    }

    pub fn contains(&self, id: TargetId) -> bool {
        self.targets.contains_key(&id)
    }

    pub fn get(&self, id: TargetId) -> Option<&EventTarget> {
        self.targets.get(&id)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn is_hovered(&self, id: TargetId) -> bool {
        self.hovered.contains(&id)
    }

    pub fn is_dragged(&self, id: TargetId) -> bool {
        self.dragged.contains(&id)
    }

    /// Whether a target drag session is in progress.
    pub fn is_dragging(&self) -> bool {
        !self.dragged.is_empty()
    }

    pub fn hovered(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.hovered.iter().copied()
    }

    pub fn dragged(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.dragged.iter().copied()
    }

    /// Mesh targets hit by `ray`, nearest first.
    ///
    /// Only meshes whose centre lies within `sphere_radius` of `eye` count;
    /// anything further away is outside the current panorama.
    pub fn hit_test(&self, ray: &Ray, eye: DVec3, sphere_radius: f64) -> Vec<TargetId> {
        let mut hits: Vec<(f64, TargetId)> = self
            .targets
            .iter()
            .filter_map(|(id, target)| match target.kind() {
                TargetKind::Mesh { center, radius } if center.distance(eye) < sphere_radius => {
                    ray.intersect_sphere(center, radius).map(|t| (t, *id))
                }
                _ => None,
            })
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits.into_iter().map(|(_, id)| id).collect()
    }

    /// Update hover state from the targets currently under the pointer.
    ///
    /// Leave callbacks fire before enter callbacks. Each transition fires
    /// exactly once.
    pub fn dispatch_pointer_move(&mut self, hits: &[TargetId]) {
        let hits = unique_hits(hits);

        let left: Vec<TargetId> = self
            .hovered
            .iter()
            .copied()
            .filter(|id| !hits.contains(id))
            .collect();
        for id in left {
            self.hovered.remove(&id);
            if let Some(target) = self.targets.get_mut(&id) {
                tracing::trace!(%id, "pointer leave");
                target.pointer_leave();
            }
        }

        for id in hits {
            if self.hovered.contains(&id) {
                continue;
            }
            let Some(target) = self.targets.get_mut(&id) else {
                continue;
            };
            if !target.tracks_hover() {
                continue;
            }
            self.hovered.insert(id);
            tracing::trace!(%id, "pointer enter");
            target.pointer_enter();
        }
    }

    /// Fire click callbacks on every hit target, in hit order.
    pub fn dispatch_click(&mut self, hits: &[TargetId], ctx: &PointerContext) {
        for id in unique_hits(hits) {
            if let Some(target) = self.targets.get_mut(&id) {
                target.click(ctx);
            }
        }
    }

    /// Collect context-menu items from every hit target, then from every
    /// registered layer. Returns `None` when nothing contributed, meaning
    /// the menu should be suppressed.
    pub fn dispatch_context_menu(
        &mut self,
        hits: &[TargetId],
        ctx: &PointerContext,
    ) -> Option<Vec<MenuItem>> {
        let mut items = Vec::new();
        for id in unique_hits(hits) {
            match self.targets.get_mut(&id) {
                Some(target) if matches!(target.kind(), TargetKind::Mesh { .. }) => {
                    items.extend(target.context_menu(ctx));
                }
                _ => {}
            }
        }
        for target in self.targets.values_mut() {
            if target.kind() == TargetKind::Layer {
                items.extend(target.context_menu(ctx));
            }
        }
        (!items.is_empty()).then_some(items)
    }

    /// Begin dragging every hit target that has a drag callback. Targets
    /// already being dragged are left alone.
    pub fn dispatch_drag_start(&mut self, hits: &[TargetId], ctx: &PointerContext) {
        for id in unique_hits(hits) {
            if self.dragged.contains(&id) {
                continue;
            }
            let Some(target) = self.targets.get_mut(&id) else {
                continue;
            };
            if !target.tracks_drag() {
                continue;
            }
            self.dragged.insert(id);
            tracing::trace!(%id, "drag start");
            target.drag_start(ctx);
        }
    }

    /// Fire drag callbacks on all dragged targets, whether or not the pointer
    /// is still over them.
    pub fn dispatch_drag(&mut self, ctx: &PointerContext) {
        for id in &self.dragged {
            if let Some(target) = self.targets.get_mut(id) {
                target.drag(ctx);
            }
        }
    }

    /// Fire drag-end callbacks and clear the drag set.
    pub fn dispatch_drag_end(&mut self) {
        for id in std::mem::take(&mut self.dragged) {
            if let Some(target) = self.targets.get_mut(&id) {
                tracing::trace!(%id, "drag end");
                target.drag_end();
            }
        }
    }
}
