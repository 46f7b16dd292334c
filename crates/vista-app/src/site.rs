//! Loading a site: floors, their node metadata and optional start views.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use vista_config::SceneConfig;
use vista_geo::{GeoPoint, LocalFrame};
use vista_scene::{FloorMap, NodeId, NodeRecord, NodeSet, PoiSet, parse_nodes, parse_pois};

use crate::error::ScriptError;

/// RON description of a multi-floor site.
///
/// ```ron
/// (
///     origin: Some((lon: 11.5, lat: 48.1, z: 500.0)),
///     floors: [
///         (name: "eg", z: 500.0, map: (name: "eg", density: 0.05, x: 120.0, y: 80.0, width: 900.0, height: 700.0),
///          nodes: "eg.txt", default_views: [(12, 90.0, 0.0)]),
///     ],
/// )
/// ```
#[derive(Debug, Deserialize)]
pub struct SiteManifest {
    /// Global point mapped to the local origin. Defaults to the first node.
    #[serde(default)]
    pub origin: Option<GeoPoint>,
    pub floors: Vec<FloorSpec>,
}

#[derive(Debug, Deserialize)]
pub struct FloorSpec {
    pub name: String,
    /// Global height of the floor surface.
    pub z: f64,
    pub map: FloorMap,
    /// Node metadata file, relative to the manifest.
    pub nodes: PathBuf,
    /// `(node, lonov, latov)` views to face on arrival.
    #[serde(default)]
    pub default_views: Vec<(u32, f64, f64)>,
}

pub(crate) fn read(path: &Path) -> Result<String, ScriptError> {
    std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_nodes(path: &Path) -> Result<Vec<NodeRecord>, ScriptError> {
    parse_nodes(&read(path)?).map_err(|source| ScriptError::Metadata {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_pois(path: &Path) -> Result<PoiSet, ScriptError> {
    parse_pois(&read(path)?).map_err(|source| ScriptError::Metadata {
        path: path.to_path_buf(),
        source,
    })
}

/// Build the node set described by a manifest. Node paths are resolved
/// against `dir`.
pub fn build_site(manifest: &SiteManifest, dir: &Path, scene: &SceneConfig) -> Result<NodeSet, ScriptError> {
    let floors = manifest
        .floors
        .iter()
        .map(|spec| Ok((spec, read_nodes(&dir.join(&spec.nodes))?)))
        .collect::<Result<Vec<_>, ScriptError>>()?;

    let origin = manifest
        .origin
        .or_else(|| floors.iter().find_map(|(_, records)| records.first()).map(|r| r.position))
        .ok_or(ScriptError::EmptySite)?;

    let frame = LocalFrame::new(origin, scene.lon_scalar_km, scene.lat_scalar_km);
    let mut nodes = NodeSet::new(frame);
    for (spec, records) in &floors {
        let floor = nodes.add_floor(spec.name.clone(), spec.z, spec.map.clone());
        nodes.add_nodes(floor, records).map_err(|source| ScriptError::Metadata {
            path: dir.join(&spec.nodes),
            source,
        })?;
        for &(id, lonov, latov) in &spec.default_views {
            if !nodes.set_default_view(NodeId(id), lonov, latov) {
                return Err(ScriptError::UnknownNode(NodeId(id)));
            }
        }
        tracing::info!(floor = %spec.name, nodes = records.len(), "loaded floor");
    }
    if nodes.is_empty() {
        return Err(ScriptError::EmptySite);
    }
    Ok(nodes)
}

/// Load a site from a `.ron` manifest, or from a bare node metadata file
/// treated as a single floor at the height of its lowest node.
pub fn load_site(path: &Path, scene: &SceneConfig) -> Result<NodeSet, ScriptError> {
    if path.extension().is_some_and(|ext| ext == "ron") {
        let manifest: SiteManifest = ron::from_str(&read(path)?).map_err(|source| ScriptError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        return build_site(&manifest, dir, scene);
    }

    let records = read_nodes(path)?;
    let first = records.first().ok_or(ScriptError::EmptySite)?;
    let floor_z = records
        .iter()
        .map(|r| r.position.z)
        .fold(f64::INFINITY, f64::min);
    let origin = GeoPoint::new(first.position.lon, first.position.lat, floor_z);

    let mut nodes = NodeSet::new(LocalFrame::new(origin, scene.lon_scalar_km, scene.lat_scalar_km));
    let floor = nodes.add_floor("0", floor_z, FloorMap::default());
    nodes.add_nodes(floor, &records).map_err(|source| ScriptError::Metadata {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NODES: &str = "(1,[11.0,48.0,501.5],[0,0,0,1])(2,[11.00003,48.0,501.5],[0,0,0,1])";

    #[test]
    fn test_bare_node_file_is_single_floor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodes.txt");
        std::fs::write(&path, NODES).unwrap();

        let nodes = load_site(&path, &SceneConfig::default()).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes.floors().len(), 1);
        assert_eq!(nodes.floors()[0].z, 501.5);
        let first = nodes.node(NodeId(1)).unwrap();
        assert!(first.position.length() < 1e-9);
    }

    #[test]
    fn test_manifest_with_floors_and_default_views() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("eg.txt"), NODES).unwrap();
        std::fs::write(dir.path().join("og.txt"), "(7,[11.0,48.0,505.5],[0,0,0,1])").unwrap();
        let manifest = r#"(
            origin: Some((lon: 11.0, lat: 48.0, z: 500.0)),
            floors: [
                (name: "eg", z: 500.0, map: (name: "eg", density: 0.05, x: 1.0, y: 2.0, width: 3.0, height: 4.0),
                 nodes: "eg.txt", default_views: [(2, 90.0, -5.0)]),
                (name: "og", z: 504.0, map: (name: "og", density: 0.05, x: 1.0, y: 2.0, width: 3.0, height: 4.0),
                 nodes: "og.txt"),
            ],
        )"#;
        let path = dir.path().join("site.ron");
        std::fs::write(&path, manifest).unwrap();

        let nodes = load_site(&path, &SceneConfig::default()).unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes.floors().len(), 2);
        assert_eq!(nodes.node(NodeId(2)).unwrap().default_view, Some((90.0, -5.0)));
        assert!((nodes.node(NodeId(7)).unwrap().position.z - 5.5).abs() < 1e-9);
    }

    #[test]
    fn test_default_view_for_unknown_node_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("eg.txt"), NODES).unwrap();
        let manifest = SiteManifest {
            origin: None,
            floors: vec![FloorSpec {
                name: "eg".into(),
                z: 500.0,
                map: FloorMap::default(),
                nodes: "eg.txt".into(),
                default_views: vec![(42, 0.0, 0.0)],
            }],
        };
        let err = build_site(&manifest, dir.path(), &SceneConfig::default()).unwrap_err();
        assert!(matches!(err, ScriptError::UnknownNode(NodeId(42))));
    }

    #[test]
    fn test_malformed_metadata_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        std::fs::write(&path, "(x,[1,2,3],[0,0,0,1])").unwrap();
        let err = load_site(&path, &SceneConfig::default()).unwrap_err();
        assert!(matches!(err, ScriptError::Metadata { .. }));
        assert!(err.to_string().contains("bad.txt"));
    }

    #[test]
    fn test_empty_node_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(
            load_site(&path, &SceneConfig::default()),
            Err(ScriptError::EmptySite)
        ));
    }
}
