//! Parsers for the flat node and POI metadata strings.
//!
//! Both formats are a sequence of `(`-delimited records. Anything before the
//! first `(` is ignored. Within a record, the first comma-separated field is
//! an integer id and bracketed groups `[a, b, ...]` hold float lists:
//!
//! ```text
//! nodes: (12, [11.57, 48.13, 520.3], [0.0, 0.0, 0.7071, 0.7071]) (13, ...)
//! pois:  x(3,[1.0,2.0,3.0])(7,[4,5,6])
//! ```
//!
//! A malformed record aborts the whole parse; coordinates are never guessed.

use std::collections::BTreeMap;

use glam::DQuat;
use thiserror::Error;
use vista_geo::GeoPoint;

use crate::node::NodeId;
use crate::poi::{Poi, PoiSet};

/// Errors produced while parsing metadata. `record` is the zero-based index of
/// the offending record.
#[derive(Debug, Error, PartialEq)]
pub enum MetadataError {
    /// The leading id field is not an integer.
    #[error("record {record}: malformed id {text:?}")]
    MalformedId { record: usize, text: String },

    /// A required `[...]` group is missing or unterminated.
    #[error("record {record}: missing bracketed coordinate list")]
    MissingBrackets { record: usize },

    /// A coordinate is not a float.
    #[error("record {record}: invalid coordinate {text:?}")]
    InvalidCoordinate { record: usize, text: String },

    /// A coordinate list has the wrong number of entries.
    #[error("record {record}: expected {expected} values, found {found}")]
    WrongArity {
        record: usize,
        expected: usize,
        found: usize,
    },

    /// Two records share an id.
    #[error("record {record}: duplicate id {id}")]
    DuplicateId { record: usize, id: i64 },
}

/// One parsed node record, still in global coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeRecord {
    /// Node id.
    pub id: NodeId,
    /// Global position.
    pub position: GeoPoint,
    /// Orientation of the panorama image.
    pub orientation: DQuat,
}

/// Split a metadata string into `(index, record body)` pairs.
fn records(src: &str) -> impl Iterator<Item = (usize, &str)> {
    src.split('(').skip(1).enumerate()
}

fn parse_id(record: usize, body: &str) -> Result<i64, MetadataError> {
    let text = body.split(',').next().unwrap_or("").trim();
    text.parse::<i64>()
        .map_err(|_| MetadataError::MalformedId {
            record,
            text: text.to_string(),
        })
}

/// Bracketed groups of a record body in order of appearance.
fn bracket_groups(record: usize, body: &str, wanted: usize) -> Result<Vec<&str>, MetadataError> {
    let mut groups = Vec::with_capacity(wanted);
    let mut rest = body;
    while groups.len() < wanted {
        let open = rest.find('[').ok_or(MetadataError::MissingBrackets { record })?;
        let after = &rest[open + 1..];
        let close = after.find(']').ok_or(MetadataError::MissingBrackets { record })?;
        groups.push(&after[..close]);
        rest = &after[close + 1..];
    }
    Ok(groups)
}

fn parse_floats(record: usize, group: &str) -> Result<Vec<f64>, MetadataError> {
    group
        .split(',')
        .map(|field| {
            let text = field.trim();
            text.parse::<f64>()
                .map_err(|_| MetadataError::InvalidCoordinate {
                    record,
                    text: text.to_string(),
                })
        })
        .collect()
}

fn expect_arity(record: usize, values: &[f64], expected: usize) -> Result<(), MetadataError> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(MetadataError::WrongArity {
            record,
            expected,
            found: values.len(),
        })
    }
}

/// Parse POI metadata into a map keyed by POI id.
pub fn parse_pois(src: &str) -> Result<PoiSet, MetadataError> {
    let mut pois = BTreeMap::new();
    for (record, body) in records(src) {
        let id = parse_id(record, body)?;
        let groups = bracket_groups(record, body, 1)?;
        let coords = parse_floats(record, groups[0])?;
        if pois.insert(id, Poi { id, coords }).is_some() {
            return Err(MetadataError::DuplicateId { record, id });
        }
    }
    tracing::debug!(count = pois.len(), "parsed POI metadata");
    Ok(PoiSet::from_map(pois))
}

/// Parse node metadata. Records keep their source order.
pub fn parse_nodes(src: &str) -> Result<Vec<NodeRecord>, MetadataError> {
    let mut out: Vec<NodeRecord> = Vec::new();
    for (record, body) in records(src) {
        let raw_id = parse_id(record, body)?;
        let id = u32::try_from(raw_id).map_err(|_| MetadataError::MalformedId {
            record,
            text: raw_id.to_string(),
        })?;
        if out.iter().any(|n| n.id.0 == id) {
            return Err(MetadataError::DuplicateId { record, id: raw_id });
        }

        let groups = bracket_groups(record, body, 2)?;
        let pos = parse_floats(record, groups[0])?;
        expect_arity(record, &pos, 3)?;
        let quat = parse_floats(record, groups[1])?;
        expect_arity(record, &quat, 4)?;

        let raw = DQuat::from_xyzw(quat[0], quat[1], quat[2], quat[3]);
        if !(raw.length() > f64::EPSILON) {
            return Err(MetadataError::InvalidCoordinate {
                record,
                text: groups[1].trim().to_string(),
            });
        }
        let orientation = raw.normalize();

        out.push(NodeRecord {
            id: NodeId(id),
            position: GeoPoint::new(pos[0], pos[1], pos[2]),
            orientation,
        });
    }
    tracing::debug!(count = out.len(), "parsed node metadata");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pois_example() {
        let pois = parse_pois("x(3,[1.0,2.0,3.0])(7,[4,5,6])").unwrap();
        assert_eq!(pois.len(), 2);
        assert_eq!(pois.get(3).unwrap().coords, vec![1.0, 2.0, 3.0]);
        assert_eq!(pois.get(7).unwrap().coords, vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_parse_pois_tolerates_whitespace() {
        let pois = parse_pois("( 1 , [ 0.5 , -2 , 3e2 ] )\n").unwrap();
        assert_eq!(pois.get(1).unwrap().coords, vec![0.5, -2.0, 300.0]);
    }

    #[test]
    fn test_empty_input_yields_no_pois() {
        assert!(parse_pois("").unwrap().is_empty());
        assert!(parse_pois("no records here").unwrap().is_empty());
    }

    #[test]
    fn test_non_numeric_id_reports_record() {
        let err = parse_pois("(1,[1,2,3])(abc,[1,2,3])").unwrap_err();
        assert_eq!(
            err,
            MetadataError::MalformedId {
                record: 1,
                text: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_missing_brackets_is_error() {
        let err = parse_pois("(4, 1.0, 2.0)").unwrap_err();
        assert_eq!(err, MetadataError::MissingBrackets { record: 0 });
    }

    #[test]
    fn test_unterminated_bracket_is_error() {
        let err = parse_pois("(4, [1.0, 2.0").unwrap_err();
        assert_eq!(err, MetadataError::MissingBrackets { record: 0 });
    }

    #[test]
    fn test_bad_coordinate_is_error() {
        let err = parse_pois("(4,[1.0,north,2])").unwrap_err();
        assert!(matches!(err, MetadataError::InvalidCoordinate { record: 0, .. }));
    }

    #[test]
    fn test_duplicate_poi_id_is_error() {
        let err = parse_pois("(4,[1,2,3])(4,[1,2,3])").unwrap_err();
        assert_eq!(err, MetadataError::DuplicateId { record: 1, id: 4 });
    }

    #[test]
    fn test_parse_nodes_keeps_order() {
        let src = "(20, [11.5, 48.1, 500.0], [0, 0, 0, 1]) (10, [11.6, 48.2, 501.0], [0, 0, 0, 2])";
        let nodes = parse_nodes(src).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].id, NodeId(20));
        assert_eq!(nodes[1].id, NodeId(10));
        assert_eq!(nodes[1].position, GeoPoint::new(11.6, 48.2, 501.0));
        // Quaternions are normalized on load.
        assert!((nodes[1].orientation.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_node_position_arity_checked() {
        let err = parse_nodes("(1, [1, 2], [0, 0, 0, 1])").unwrap_err();
        assert_eq!(
            err,
            MetadataError::WrongArity {
                record: 0,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_node_without_orientation_is_error() {
        let err = parse_nodes("(1, [1, 2, 3])").unwrap_err();
        assert_eq!(err, MetadataError::MissingBrackets { record: 0 });
    }

    #[test]
    fn test_negative_node_id_rejected() {
        let err = parse_nodes("(-1, [1, 2, 3], [0, 0, 0, 1])").unwrap_err();
        assert!(matches!(err, MetadataError::MalformedId { record: 0, .. }));
    }

    #[test]
    fn test_zero_quaternion_rejected() {
        let err = parse_nodes("(1, [1, 2, 3], [0, 0, 0, 0])").unwrap_err();
        assert!(matches!(err, MetadataError::InvalidCoordinate { record: 0, .. }));
    }
}
