//! Headless adapters that record every call.
//!
//! Used by the scripted host and by tests. Loads stay pending until resolved
//! explicitly, unless `auto_resolve` is set.

use std::collections::BTreeMap;

use crossbeam_channel::Sender;
use glam::{DVec2, DVec3};
use vista_interact::TargetId;
use vista_scene::{DepthMap, FloorId, NodeId};

use crate::adapter::{AssetError, Completion, MapAdapter, MarkerId, MarkerStyle, PanoramaRenderer, TextureHandle};

/// A call made on a [`RecordingRenderer`].
#[derive(Clone, Debug, PartialEq)]
pub enum RendererCall {
    LookAt(DVec3),
    Position(DVec3),
    Fov(f64),
    Aspect(f64),
    LoadTexture(String),
    LoadDepth(String),
    ShowPanorama(NodeId, TextureHandle),
    AddToScene(TargetId, DVec3, f64),
    RemoveFromScene(TargetId),
}

/// Renderer that only records.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub calls: Vec<RendererCall>,
    /// Answer every load immediately with success.
    pub auto_resolve: bool,
    next_texture: u64,
    pending_textures: Vec<(String, Sender<Result<TextureHandle, AssetError>>)>,
    pending_depth: Vec<(String, Sender<Result<DepthMap, AssetError>>)>,
    scene: BTreeMap<TargetId, (DVec3, f64)>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer that answers every load immediately.
    pub fn auto_resolving() -> Self {
        Self {
            auto_resolve: true,
            ..Self::default()
        }
    }

    fn fresh_texture(&mut self) -> TextureHandle {
        self.next_texture += 1;
        TextureHandle(self.next_texture)
    }

    /// URLs of texture loads not yet answered, oldest first.
    pub fn pending_textures(&self) -> Vec<&str> {
        self.pending_textures.iter().map(|(url, _)| url.as_str()).collect()
    }

    pub fn pending_depth(&self) -> Vec<&str> {
        self.pending_depth.iter().map(|(url, _)| url.as_str()).collect()
    }

    fn take_texture(&mut self, url: &str) -> Option<Sender<Result<TextureHandle, AssetError>>> {
        let index = self.pending_textures.iter().position(|(u, _)| u == url)?;
        Some(self.pending_textures.remove(index).1)
    }

    /// Answer a pending texture load with a fresh handle.
    pub fn resolve_texture(&mut self, url: &str) -> Option<TextureHandle> {
        let sender = self.take_texture(url)?;
        let handle = self.fresh_texture();
        let _ = sender.send(Ok(handle));
        Some(handle)
    }

    /// Answer a pending texture load with an error.
    pub fn fail_texture(&mut self, url: &str, error: AssetError) -> bool {
        match self.take_texture(url) {
            Some(sender) => {
                let _ = sender.send(Err(error));
                true
            }
            None => false,
        }
    }

    /// Drop a pending texture load without answering it.
    pub fn abandon_texture(&mut self, url: &str) -> bool {
        self.take_texture(url).is_some()
    }

    /// Answer a pending depth load.
    pub fn resolve_depth(&mut self, url: &str, depth: DepthMap) -> bool {
        let Some(index) = self.pending_depth.iter().position(|(u, _)| u == url) else {
            return false;
        };
        let (_, sender) = self.pending_depth.remove(index);
        let _ = sender.send(Ok(depth));
        true
    }

    /// Objects currently placed in the scene.
    pub fn scene(&self) -> &BTreeMap<TargetId, (DVec3, f64)> {
        &self.scene
    }

    /// Panoramas shown so far, in order.
    pub fn shown(&self) -> Vec<(NodeId, TextureHandle)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RendererCall::ShowPanorama(node, texture) => Some((*node, *texture)),
                _ => None,
            })
            .collect()
    }

    /// Last look-at direction set.
    pub fn look_at(&self) -> Option<DVec3> {
        self.calls.iter().rev().find_map(|call| match call {
            RendererCall::LookAt(dir) => Some(*dir),
            _ => None,
        })
    }
}

impl PanoramaRenderer for RecordingRenderer {
    fn set_camera_look_at(&mut self, direction: DVec3) {
        self.calls.push(RendererCall::LookAt(direction));
    }

    fn set_camera_position(&mut self, position: DVec3) {
        self.calls.push(RendererCall::Position(position));
    }

    fn set_camera_fov(&mut self, fov: f64) {
        self.calls.push(RendererCall::Fov(fov));
    }

    fn set_camera_aspect(&mut self, aspect: f64) {
        self.calls.push(RendererCall::Aspect(aspect));
    }

    fn load_texture(&mut self, url: &str) -> Completion<TextureHandle> {
        self.calls.push(RendererCall::LoadTexture(url.to_string()));
        let (tx, rx) = crossbeam_channel::bounded(1);
        if self.auto_resolve {
            let handle = self.fresh_texture();
            let _ = tx.send(Ok(handle));
        } else {
            self.pending_textures.push((url.to_string(), tx));
        }
        rx
    }

    fn load_depth(&mut self, url: &str) -> Completion<DepthMap> {
        self.calls.push(RendererCall::LoadDepth(url.to_string()));
        let (tx, rx) = crossbeam_channel::bounded(1);
        if self.auto_resolve {
            let _ = tx.send(Err(AssetError::Network {
                url: url.to_string(),
                reason: "no depth source attached".to_string(),
            }));
        } else {
            self.pending_depth.push((url.to_string(), tx));
        }
        rx
    }

    fn show_panorama(&mut self, node: NodeId, texture: TextureHandle) {
        self.calls.push(RendererCall::ShowPanorama(node, texture));
    }

    fn add_to_scene(&mut self, target: TargetId, position: DVec3, radius: f64) {
        self.calls.push(RendererCall::AddToScene(target, position, radius));
        self.scene.insert(target, (position, radius));
    }

    fn remove_from_scene(&mut self, target: TargetId) {
        self.calls.push(RendererCall::RemoveFromScene(target));
        self.scene.remove(&target);
    }
}

/// A feature currently on a [`RecordingMap`].
#[derive(Clone, Debug, PartialEq)]
pub enum MapFeature {
    Marker(DVec2, MarkerStyle),
    Polygon(Vec<DVec2>, MarkerStyle),
}

/// Map widget that keeps its state in memory.
#[derive(Debug)]
pub struct RecordingMap {
    pub center: Option<DVec2>,
    pub zoom: f64,
    pub visible_floors: Vec<FloorId>,
    pub redraws: usize,
    next_id: u64,
    features: BTreeMap<MarkerId, MapFeature>,
}

impl RecordingMap {
    pub fn new(zoom: f64) -> Self {
        Self {
            center: None,
            zoom,
            visible_floors: Vec::new(),
            redraws: 0,
            next_id: 0,
            features: BTreeMap::new(),
        }
    }

    pub fn features(&self) -> &BTreeMap<MarkerId, MapFeature> {
        &self.features
    }

    /// Point markers drawn with `style`.
    pub fn markers_with(&self, style: MarkerStyle) -> Vec<DVec2> {
        self.features
            .values()
            .filter_map(|feature| match feature {
                MapFeature::Marker(at, s) if *s == style => Some(*at),
                _ => None,
            })
            .collect()
    }

    pub fn polygons(&self) -> Vec<&[DVec2]> {
        self.features
            .values()
            .filter_map(|feature| match feature {
                MapFeature::Polygon(points, _) => Some(points.as_slice()),
                _ => None,
            })
            .collect()
    }

    fn insert(&mut self, feature: MapFeature) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        self.features.insert(id, feature);
        id
    }
}

impl Default for RecordingMap {
    fn default() -> Self {
        Self::new(20.0)
    }
}

impl MapAdapter for RecordingMap {
    fn set_center(&mut self, lon_lat: DVec2) {
        self.center = Some(lon_lat);
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn set_zoom(&mut self, level: f64) {
        self.zoom = level;
    }

    fn add_marker(&mut self, lon_lat: DVec2, style: MarkerStyle) -> MarkerId {
        self.insert(MapFeature::Marker(lon_lat, style))
    }

    fn remove_marker(&mut self, id: MarkerId) {
        self.features.remove(&id);
    }

    fn set_floor_visible(&mut self, floor: FloorId, visible: bool) {
        self.visible_floors.retain(|f| *f != floor);
        if visible {
            self.visible_floors.push(floor);
        }
    }

    fn set_polygon(&mut self, points: &[DVec2], style: MarkerStyle) -> MarkerId {
        self.insert(MapFeature::Polygon(points.to_vec(), style))
    }

    fn redraw(&mut self) {
        self.redraws += 1;
    }
}
