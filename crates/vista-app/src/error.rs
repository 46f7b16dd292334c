//! Errors of the scripted host.

use std::path::PathBuf;

use vista_scene::{MetadataError, NodeId};

/// Anything that stops a scripted session from starting or finishing.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// A metadata, manifest or script file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A manifest or script is not valid RON.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    /// Node or POI metadata is malformed.
    #[error("bad metadata in {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: MetadataError,
    },

    /// The site defines no nodes.
    #[error("site has no panorama nodes")]
    EmptySite,

    /// The script refers to a node the site does not contain.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// An emitted event could not be serialized.
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),

    /// Writing emitted events failed.
    #[error("failed to write events: {0}")]
    Write(#[source] std::io::Error),
}
