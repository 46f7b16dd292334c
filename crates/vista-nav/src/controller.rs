//! Input handling and navigation between panoramas.

use glam::{DVec2, DVec3};
use serde::Deserialize;
use vista_config::{Config, ControlsConfig, MapConfig, SceneConfig};
use vista_geo::{GeoPoint, HorizontalPlane, Ray, from_lon_lat, horizontal_heading};
use vista_interact::{EventLayerRegistry, EventTarget, MenuItem, PointerContext, TargetId, TargetKind};
use vista_scene::{Node, NodeId, NodeSet, nearest, nearest_by};

use crate::adapter::{MapAdapter, PanoramaRenderer};
use crate::camera::PanoramaCamera;
use crate::events::{EventBus, ViewerEvent};
use crate::loader::{PanoramaLoader, PollSummary};
use crate::map::MapOverlay;
use crate::view_state::ViewState;

/// Scene id of the marker under the hover-resolved node.
pub const HOVER_MARKER: TargetId = TargetId::RESERVED;

/// Radius of the hover marker in metres.
const HOVER_MARKER_RADIUS: f64 = 0.3;

/// Keyboard commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    /// Turn left.
    Left,
    /// Turn right.
    Right,
    /// Step forward.
    Up,
    /// Step back.
    Down,
    /// Narrow the field of view (`+`).
    ZoomIn,
    /// Widen the field of view (`-`).
    ZoomOut,
}

#[derive(Clone, Copy, Debug)]
struct DragOrigin {
    pointer: DVec2,
    view: ViewState,
}

#[derive(Debug, Default)]
struct ActiveSession {
    node: Option<NodeId>,
    pointer: Option<DVec2>,
    /// Armed between pointer-down and pointer-up.
    drag: Option<DragOrigin>,
    /// Node resolved under the cursor by hover tracking.
    hover: Option<NodeId>,
}

/// Owns the view state of a session and routes user input.
///
/// Pointer positions are screen pixels with the origin at the top left;
/// call [`on_resize`](Self::on_resize) before any pointer input.
pub struct NavigationController<R, M> {
    controls: ControlsConfig,
    scene: SceneConfig,
    map_config: MapConfig,
    nodes: NodeSet,
    view: ViewState,
    camera: PanoramaCamera,
    viewport: DVec2,
    session: ActiveSession,
    renderer: R,
    map: MapOverlay<M>,
    loader: PanoramaLoader,
    registry: EventLayerRegistry,
    events: EventBus,
}

impl<R: PanoramaRenderer, M: MapAdapter> NavigationController<R, M> {
    pub fn new(config: &Config, nodes: NodeSet, mut renderer: R, map: M) -> Self {
        let view = ViewState::from_config(&config.view);
        let mut camera = PanoramaCamera::default();
        camera.apply_view(&view);
        renderer.set_camera_look_at(camera.look);
        renderer.set_camera_fov(camera.fov);

        let mut map = MapOverlay::new(map, config.map.scaling_map);
        map.adapter_mut().set_zoom(config.map.initial_zoom);

        Self {
            controls: config.controls.clone(),
            scene: config.scene.clone(),
            map_config: config.map.clone(),
            loader: PanoramaLoader::new(config.scene.base_url.clone(), config.scene.max_resolution),
            nodes,
            view,
            camera,
            viewport: DVec2::ZERO,
            session: ActiveSession::default(),
            renderer,
            map,
            registry: EventLayerRegistry::new(),
            events: EventBus::new(),
        }
    }

    // --- Accessors ---

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn camera(&self) -> &PanoramaCamera {
        &self.camera
    }

    pub fn nodes(&self) -> &NodeSet {
        &self.nodes
    }

    pub fn current_node(&self) -> Option<NodeId> {
        self.session.node
    }

    /// Node resolved under the cursor by the last [`on_hover`](Self::on_hover).
    pub fn hovered_node(&self) -> Option<NodeId> {
        self.session.hover
    }

    /// Last pointer position seen.
    pub fn pointer(&self) -> Option<DVec2> {
        self.session.pointer
    }

    /// Whether a view drag is armed.
    pub fn is_dragging(&self) -> bool {
        self.session.drag.is_some()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn map(&self) -> &MapOverlay<M> {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut MapOverlay<M> {
        &mut self.map
    }

    pub fn registry(&self) -> &EventLayerRegistry {
        &self.registry
    }

    pub fn loader(&self) -> &PanoramaLoader {
        &self.loader
    }

    /// Register a listener for [`ViewerEvent`]s.
    pub fn subscribe(&mut self, listener: impl FnMut(&ViewerEvent) + 'static) {
        self.events.subscribe(listener);
    }

    // --- Internals ---

    fn current(&self) -> Option<&Node> {
        self.session.node.and_then(|id| self.nodes.node(id))
    }

    fn apply_view(&mut self) {
        self.camera.apply_view(&self.view);
        self.renderer.set_camera_look_at(self.camera.look);
        self.renderer.set_camera_fov(self.camera.fov);
    }

    fn emit_viewed(&mut self) {
        self.events.emit(ViewerEvent::Viewed {
            lonov: self.view.lonov(),
            latov: self.view.latov(),
            fov: self.view.fov(),
        });
    }

    fn redraw_map(&mut self) {
        if let Some(node) = self.session.node.and_then(|id| self.nodes.node(id)) {
            self.map.redraw(&self.nodes, node, &self.view);
        }
    }

    /// Screen pixels to normalized device coordinates.
    fn ndc(&self, pos: DVec2) -> DVec2 {
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            return DVec2::ZERO;
        }
        DVec2::new(
            2.0 * pos.x / self.viewport.x - 1.0,
            1.0 - 2.0 * pos.y / self.viewport.y,
        )
    }

    fn pointer_ray(&self, pos: DVec2) -> Option<Ray> {
        self.camera.ray_through(self.ndc(pos))
    }

    fn set_hover(&mut self, best: Option<(NodeId, DVec3)>) {
        let id = best.map(|(id, _)| id);
        if id == self.session.hover {
            return;
        }
        if self.session.hover.is_some() {
            self.renderer.remove_from_scene(HOVER_MARKER);
        }
        if let Some((_, at)) = best {
            self.renderer.add_to_scene(HOVER_MARKER, at, HOVER_MARKER_RADIUS);
        }
        self.session.hover = id;
    }

    // --- Navigation ---

    /// Make `id` the active node: move the camera there and start loading
    /// its panorama. The view is reset only if the node defines its own.
    /// Emits nothing.
    pub fn display(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.node(id) else {
            tracing::warn!(node = %id, "cannot display unknown node");
            return false;
        };
        let (position, default_view) = (node.position, node.default_view);

        self.session.node = Some(id);
        self.camera.position = position;
        self.renderer.set_camera_position(position);
        if let Some((lonov, latov)) = default_view {
            self.view.set_lonov(lonov);
            self.view.set_latov(latov);
        }
        self.apply_view();
        self.set_hover(None);
        self.loader.start(id, &mut self.renderer);
        tracing::info!(node = %id, "displaying panorama");
        true
    }

    /// Display `id`, redraw the map and emit [`ViewerEvent::Moved`].
    pub fn navigate_to(&mut self, id: NodeId) -> bool {
        if !self.display(id) {
            return false;
        }
        self.redraw_map();
        self.events.emit(ViewerEvent::Moved { node: id });
        true
    }

    /// Go to the node nearest to a global position, on the current floor or,
    /// before any node is shown, on the floor matching the height.
    ///
    /// Staying on the current node reloads nothing but still reports the move.
    pub fn move_to(&mut self, global: GeoPoint) -> Option<NodeId> {
        let floor = match self.current() {
            Some(node) => node.floor,
            None => self.nodes.floor_for_height(global.z)?,
        };
        let local = self.nodes.frame().to_local(global);
        let best = nearest(local.truncate(), self.nodes.nodes_on_floor(floor), f64::INFINITY)?.id;

        if Some(best) == self.session.node {
            self.events.emit(ViewerEvent::Moved { node: best });
        } else {
            self.navigate_to(best);
        }
        Some(best)
    }

    /// Set the view programmatically. Emits nothing.
    pub fn view(&mut self, lonov: f64, latov: f64, fov: f64) {
        self.view.set_lonov(lonov);
        self.view.set_latov(latov);
        self.view.set_fov(fov);
        self.apply_view();
        self.map.show_direction(&self.view);
    }

    /// Apply completed panorama and depth loads.
    pub fn poll_loads(&mut self) -> PollSummary {
        self.loader.poll(&mut self.renderer)
    }

    pub fn on_resize(&mut self, width: f64, height: f64) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.viewport = DVec2::new(width, height);
        self.camera.set_aspect_ratio(width, height);
        self.renderer.set_camera_aspect(self.camera.aspect);
    }

    // --- Pointer and keyboard ---

    /// Arm a view drag from `pos`.
    pub fn on_pointer_down(&mut self, pos: DVec2) {
        self.session.pointer = Some(pos);
        self.session.drag = Some(DragOrigin {
            pointer: pos,
            view: self.view,
        });
    }

    /// Pan the view relative to the drag origin. Returns `false` outside an
    /// armed drag.
    pub fn on_pointer_move(&mut self, pos: DVec2) -> bool {
        self.session.pointer = Some(pos);
        let Some(origin) = self.session.drag else {
            return false;
        };
        let delta = pos - origin.pointer;
        let step = self.controls.pan_speed * self.view.zoom_scale();
        self.view.set_lonov(origin.view.lonov() + delta.x * step);
        self.view.set_latov(origin.view.latov() + delta.y * step);
        self.apply_view();
        self.map.show_direction(&self.view);
        true
    }

    /// Disarm the view drag and report the final view.
    pub fn on_pointer_up(&mut self) -> bool {
        if self.session.drag.take().is_none() {
            return false;
        }
        self.emit_viewed();
        true
    }

    pub fn on_wheel(&mut self, delta_y: f64) {
        self.view.set_fov(self.view.fov() + delta_y * self.controls.zoom_speed);
        self.apply_view();
        self.emit_viewed();
        self.map.show_direction(&self.view);
    }

    pub fn on_key(&mut self, key: Key) {
        match key {
            Key::Left | Key::Right => {
                let step = self.controls.arrow_rotate_deg;
                let step = if key == Key::Left { step } else { -step };
                self.view.set_lonov(self.view.lonov() + step);
                self.apply_view();
                self.emit_viewed();
            }
            Key::Up | Key::Down => {
                let distance = self.controls.arrow_move_distance;
                let distance = if key == Key::Up { distance } else { -distance };
                if let Some(node) = self.current() {
                    let local = node.position + horizontal_heading(self.view.lonov()) * distance;
                    let global = self.nodes.frame().to_global(local);
                    self.move_to(global);
                }
            }
            Key::ZoomIn | Key::ZoomOut => {
                let step = self.controls.key_zoom_step;
                let step = if key == Key::ZoomIn { -step } else { step };
                self.view.set_fov(self.view.fov() + step);
                self.apply_view();
                self.emit_viewed();
            }
        }
        self.map.show_direction(&self.view);
    }

    /// Resolve the node under the cursor by intersecting the pointer ray with
    /// the floor. Rays that do not point down or miss the floor leave the
    /// previous result in place.
    pub fn on_hover(&mut self, pos: DVec2) -> Option<NodeId> {
        self.session.pointer = Some(pos);
        let Some(floor_z) = self
            .current()
            .and_then(|node| self.nodes.floor(node.floor))
            .map(|floor| self.nodes.frame().local_z(floor.z))
        else {
            return self.session.hover;
        };
        let Some(ray) = self.pointer_ray(pos).filter(Ray::points_down) else {
            return self.session.hover;
        };
        let Some(hit) = HorizontalPlane::at_height(floor_z).intersect(&ray, f64::INFINITY) else {
            return self.session.hover;
        };

        let radius = self.scene.sphere_radius;
        let candidates = self.nodes.nodes_in_sphere(self.camera.position, radius);
        let best = nearest(hit.truncate(), candidates, radius + self.scene.hover_margin)
            .map(|node| (node.id, node.position.truncate().extend(floor_z)));
        self.set_hover(best);
        self.session.hover
    }

    /// Navigate to `target`, or to the hover-resolved node when `None`.
    pub fn on_double_click(&mut self, target: Option<NodeId>) -> bool {
        match target.or(self.session.hover) {
            Some(id) => self.navigate_to(id),
            None => false,
        }
    }

    /// Navigate to the node of the current floor nearest to a map click
    /// given in Web-Mercator metres. Clicks farther than the configured
    /// threshold from every node are ignored.
    pub fn on_map_double_click(&mut self, map_coord: DVec2) -> bool {
        let Some(floor) = self.current().map(|node| node.floor) else {
            return false;
        };
        let best = nearest_by(
            map_coord,
            self.nodes.nodes_on_floor(floor),
            self.map_config.double_click_threshold,
            |node: &Node| from_lon_lat(node.global.lon, node.global.lat),
        )
        .map(|node| node.id);
        match best {
            Some(id) => self.navigate_to(id),
            None => false,
        }
    }

    // --- Depth ---

    /// Distance in metres to the surface under the cursor, once the depth
    /// image of the current node has loaded.
    pub fn depth_at(&self, pos: DVec2) -> Option<f64> {
        let node = self.current()?;
        let depth = self.loader.depth()?;
        let ray = self.pointer_ray(pos)?;
        Some(depth.depth_along(ray.dir, node.orientation))
    }

    /// Local position of the surface under the cursor.
    pub fn cursor_location(&self, pos: DVec2) -> Option<DVec3> {
        let distance = self.depth_at(pos)?;
        Some(self.pointer_ray(pos)?.at(distance))
    }

    pub fn pointer_context(&self, pos: DVec2) -> PointerContext {
        PointerContext {
            screen: pos,
            location: self.cursor_location(pos),
        }
    }

    // --- Interactive targets ---

    /// Register a target. Meshes are also placed in the scene.
    pub fn add_layer(&mut self, target: EventTarget) -> TargetId {
        let kind = target.kind();
        let id = self.registry.add(target);
        if let TargetKind::Mesh { center, radius } = kind {
            self.renderer.add_to_scene(id, center, radius);
        }
        id
    }

    /// Unregister a target and take it out of the scene.
    pub fn remove_layer(&mut self, id: TargetId) -> bool {
        match self.registry.remove(id) {
            Some(target) => {
                if matches!(target.kind(), TargetKind::Mesh { .. }) {
                    self.renderer.remove_from_scene(id);
                }
                true
            }
            None => false,
        }
    }

    fn target_hits(&self, pos: DVec2) -> Vec<TargetId> {
        match self.pointer_ray(pos) {
            Some(ray) => self
                .registry
                .hit_test(&ray, self.camera.position, self.scene.sphere_radius),
            None => Vec::new(),
        }
    }

    pub fn on_click(&mut self, pos: DVec2) {
        let hits = self.target_hits(pos);
        let ctx = self.pointer_context(pos);
        self.registry.dispatch_click(&hits, &ctx);
    }

    /// Menu items offered at `pos`; `None` suppresses the menu.
    pub fn on_context_menu(&mut self, pos: DVec2) -> Option<Vec<MenuItem>> {
        let hits = self.target_hits(pos);
        let ctx = self.pointer_context(pos);
        self.registry.dispatch_context_menu(&hits, &ctx)
    }

    pub fn on_target_hover(&mut self, pos: DVec2) {
        let hits = self.target_hits(pos);
        self.registry.dispatch_pointer_move(&hits);
    }

    pub fn on_target_drag_start(&mut self, pos: DVec2) {
        let hits = self.target_hits(pos);
        let ctx = self.pointer_context(pos);
        self.registry.dispatch_drag_start(&hits, &ctx);
    }

    pub fn on_target_drag(&mut self, pos: DVec2) {
        let ctx = self.pointer_context(pos);
        self.registry.dispatch_drag(&ctx);
    }

    pub fn on_target_drag_end(&mut self) {
        self.registry.dispatch_drag_end();
    }
}

impl<R, M> std::fmt::Debug for NavigationController<R, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationController")
            .field("view", &self.view)
            .field("node", &self.session.node)
            .field("hover", &self.session.hover)
            .field("dragging", &self.session.drag.is_some())
            .field("loader", &self.loader)
            .finish_non_exhaustive()
    }
}
