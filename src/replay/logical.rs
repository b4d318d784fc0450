//! Seek + replay for Case-03/04: the index carries no payload offsets, so
//! "replay" is a purely logical `row -> t_min` projection after a SHA-256
//! binding check against the STAR blob. This mirrors the reference scripts'
//! own choice not to reconstruct row payloads from a zero offset.

use crate::error::StarError;
use crate::index::logical::{nearest_anchor, sha256_bytes, LogicalAnchor, LogicalIndex};

pub struct Resolved {
    pub target_row: u32,
    pub nearest_anchor_row: u32,
    pub nearest_anchor_t_min: i64,
    pub projection: Vec<(u32, i64)>,
}

/// Resolve a seek request against a loaded index, verify the index is bound
/// to `star`'s current bytes, and produce the `row -> t_min` preview.
#[allow(clippy::too_many_arguments)]
pub fn resolve(
    star: &[u8],
    index: &LogicalIndex,
    seek_row: Option<u32>,
    seek_time_min: Option<i64>,
    rows_hint: Option<u32>,
    cadence_override: Option<i64>,
    rows: u32,
) -> Result<Resolved, StarError> {
    if sha256_bytes(star) != index.star_sha256 {
        return Err(StarError::binding_mismatch());
    }
    let cadence_min = cadence_override.unwrap_or(index.cadence_min);

    let mut target_row = match seek_time_min {
        Some(t) => (t.div_euclid(cadence_min)).max(0) as u32,
        None => seek_row.unwrap_or(0),
    };
    if let Some(hint) = rows_hint {
        if hint == 0 {
            target_row = 0;
        } else {
            target_row = target_row.min(hint - 1);
        }
    }

    let anchor: &LogicalAnchor = nearest_anchor(&index.anchors, target_row);

    let mut projection = Vec::new();
    for i in 0..rows {
        let r = target_row + i;
        if let Some(hint) = rows_hint {
            if r >= hint {
                break;
            }
        }
        projection.push((r, r as i64 * cadence_min));
    }

    Ok(Resolved {
        target_row,
        nearest_anchor_row: anchor.row,
        nearest_anchor_t_min: anchor.t_min,
        projection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::logical::build;

    #[test]
    fn binding_mismatch_is_detected() {
        let star = b"some star bytes".to_vec();
        let sha = sha256_bytes(&star);
        let index = build(10, 1, 4, sha).unwrap();

        let tampered = b"different star bytes".to_vec();
        let err = resolve(&tampered, &index, Some(0), None, None, None, 5);
        assert!(err.is_err());
    }

    #[test]
    fn projection_stops_at_rows_hint() {
        let star = b"abc".to_vec();
        let sha = sha256_bytes(&star);
        let index = build(100, 1, 10, sha).unwrap();

        let resolved = resolve(&star, &index, Some(8), None, Some(10), None, 20).unwrap();
        assert_eq!(resolved.projection.len(), 2);
        assert_eq!(resolved.projection[0], (8, 8));
    }

    #[test]
    fn seek_time_resolves_through_cadence() {
        let star = b"abc".to_vec();
        let sha = sha256_bytes(&star);
        let index = build(100, 5, 10, sha).unwrap();

        let resolved = resolve(&star, &index, None, Some(37), None, None, 1).unwrap();
        assert_eq!(resolved.target_row, 7);
    }
}
