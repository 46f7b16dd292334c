//! Progressive panorama loading.
//!
//! Displaying a node requests its lowest resolution image and its depth
//! image. Every completed resolution below the maximum requests the next
//! one. Switching nodes drops every pending request of the previous node.
//! Each request carries a [`LoadTicket`], and completions whose generation no
//! longer matches the loader's never touch the scene.

use crossbeam_channel::TryRecvError;
use vista_scene::{DepthMap, NodeId};

use crate::adapter::{AssetError, Completion, PanoramaRenderer, TextureHandle};

/// URL of a panorama image. Images are grouped in directories of one
/// hundred by id.
pub fn panorama_url(base_url: &str, node: NodeId, resolution: u8) -> String {
    format!("{base_url}{}/{}r{resolution}.jpg", node.0 / 100, node.0)
}

/// URL of a depth image.
pub fn depth_url(base_url: &str, node: NodeId) -> String {
    format!("{base_url}{}/{}d.png", node.0 / 100, node.0)
}

/// Identity of one in-flight request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    pub node: NodeId,
    /// Image resolution level; `None` for the depth image.
    pub resolution: Option<u8>,
    pub generation: u64,
}

/// What one [`PanoramaLoader::poll`] call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Completions applied to the scene.
    pub applied: usize,
    /// Completions dropped because their node was superseded or a sharper
    /// image is already shown.
    pub discarded: usize,
    /// Completions that reported an error.
    pub failed: usize,
}

struct Pending<T> {
    ticket: LoadTicket,
    url: String,
    completion: Completion<T>,
}

enum Polled<T> {
    Waiting(Pending<T>),
    Done(LoadTicket, Result<T, AssetError>),
}

fn poll_one<T>(pending: Pending<T>) -> Polled<T> {
    match pending.completion.try_recv() {
        Ok(result) => Polled::Done(pending.ticket, result),
        Err(TryRecvError::Empty) => Polled::Waiting(pending),
        Err(TryRecvError::Disconnected) => Polled::Done(
            pending.ticket,
            Err(AssetError::Cancelled { url: pending.url }),
        ),
    }
}

/// Drives image and depth loads for the active node.
pub struct PanoramaLoader {
    base_url: String,
    max_resolution: u8,
    generation: u64,
    active: Option<NodeId>,
    shown_resolution: Option<u8>,
    depth: Option<DepthMap>,
    textures: Vec<Pending<TextureHandle>>,
    depths: Vec<Pending<DepthMap>>,
}

impl PanoramaLoader {
    pub fn new(base_url: impl Into<String>, max_resolution: u8) -> Self {
        Self {
            base_url: base_url.into(),
            max_resolution,
            generation: 0,
            active: None,
            shown_resolution: None,
            depth: None,
            textures: Vec::new(),
            depths: Vec::new(),
        }
    }

    pub fn active(&self) -> Option<NodeId> {
        self.active
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Highest resolution shown for the active node.
    pub fn shown_resolution(&self) -> Option<u8> {
        self.shown_resolution
    }

    /// Depth image of the active node, once loaded.
    pub fn depth(&self) -> Option<&DepthMap> {
        self.depth.as_ref()
    }

    /// Number of requests of the active node not yet completed.
    pub fn in_flight(&self) -> usize {
        self.textures.len() + self.depths.len()
    }

    /// Switch to `node`, superseding every earlier request.
    ///
    /// Pending completions of earlier nodes are dropped, so the renderer sees
    /// a disconnected channel for them. The previous panorama stays on screen
    /// until the new one arrives.
    pub fn start<R: PanoramaRenderer + ?Sized>(&mut self, node: NodeId, renderer: &mut R) {
        let superseded = self.in_flight();
        self.textures.clear();
        self.depths.clear();
        self.generation += 1;
        self.active = Some(node);
        self.shown_resolution = None;
        self.depth = None;
        tracing::debug!(%node, generation = self.generation, superseded, "loading panorama");

        self.request_texture(node, 0, renderer);

        let url = depth_url(&self.base_url, node);
        let completion = renderer.load_depth(&url);
        self.depths.push(Pending {
            ticket: LoadTicket {
                node,
                resolution: None,
                generation: self.generation,
            },
            url,
            completion,
        });
    }

    fn request_texture<R: PanoramaRenderer + ?Sized>(&mut self, node: NodeId, resolution: u8, renderer: &mut R) {
        let url = panorama_url(&self.base_url, node, resolution);
        let completion = renderer.load_texture(&url);
        self.textures.push(Pending {
            ticket: LoadTicket {
                node,
                resolution: Some(resolution),
                generation: self.generation,
            },
            url,
            completion,
        });
    }

    fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation && Some(ticket.node) == self.active
    }

    /// Apply every completion that has arrived since the last call.
    pub fn poll<R: PanoramaRenderer + ?Sized>(&mut self, renderer: &mut R) -> PollSummary {
        let mut summary = PollSummary::default();

        for pending in std::mem::take(&mut self.textures) {
            let (ticket, result) = match poll_one(pending) {
                Polled::Waiting(pending) => {
                    self.textures.push(pending);
                    continue;
                }
                Polled::Done(ticket, result) => (ticket, result),
            };
            if !self.is_current(&ticket) {
                tracing::trace!(node = %ticket.node, "discarding superseded panorama");
                summary.discarded += 1;
                continue;
            }
            let resolution = ticket.resolution.unwrap_or(0);
            match result {
                Ok(texture) => {
                    // A lower resolution finishing late must not replace a sharper image.
                    if self.shown_resolution.is_some_and(|shown| shown >= resolution) {
                        summary.discarded += 1;
                        continue;
                    }
                    renderer.show_panorama(ticket.node, texture);
                    self.shown_resolution = Some(resolution);
                    summary.applied += 1;
                    if resolution < self.max_resolution {
                        self.request_texture(ticket.node, resolution + 1, renderer);
                    }
                }
                Err(err) => {
                    tracing::warn!(node = %ticket.node, resolution, %err, "panorama load failed");
                    summary.failed += 1;
                }
            }
        }

        for pending in std::mem::take(&mut self.depths) {
            let (ticket, result) = match poll_one(pending) {
                Polled::Waiting(pending) => {
                    self.depths.push(pending);
                    continue;
                }
                Polled::Done(ticket, result) => (ticket, result),
            };
            if !self.is_current(&ticket) {
                summary.discarded += 1;
                continue;
            }
            match result {
                Ok(depth) => {
                    self.depth = Some(depth);
                    summary.applied += 1;
                }
                Err(err) => {
                    tracing::warn!(node = %ticket.node, %err, "depth load failed");
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

impl std::fmt::Debug for PanoramaLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanoramaLoader")
            .field("base_url", &self.base_url)
            .field("generation", &self.generation)
            .field("active", &self.active)
            .field("shown_resolution", &self.shown_resolution)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
