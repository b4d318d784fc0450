//! Shared logical-anchor index layout for Case-03 and Case-04: arithmetic
//! `(row, t_min)` anchors plus a SHA-256 seal binding the index to the exact
//! STAR blob bytes it describes. Case-03 and Case-04 differ only in magic
//! and version; both carry the offsets field as a literal zero, since
//! neither case supports payload-level seeking (see the replay engine).

use sha2::{Digest, Sha256};

use crate::error::StarError;

pub struct LogicalAnchor {
    pub row: u32,
    pub t_min: i64,
}

pub struct LogicalIndex {
    pub anchor_every: u32,
    pub cadence_min: i64,
    pub star_sha256: [u8; 32],
    pub anchors: Vec<LogicalAnchor>,
}

pub fn sha256_bytes(buf: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(buf);
    hasher.finalize().into()
}

/// Arithmetic anchors at `0, anchor_every, 2*anchor_every, ...`, plus a
/// trailing anchor for the final row if it wasn't already included, plus a
/// fallback single anchor at row 0 if `rows > 0` and none were produced.
pub fn build(rows: u32, cadence_min: i64, anchor_every: u32, star_sha256: [u8; 32]) -> Result<LogicalIndex, StarError> {
    if rows == 0 {
        return Err(StarError::usage("--rows must be > 0"));
    }
    if anchor_every == 0 {
        return Err(StarError::usage("--anchor_every must be > 0"));
    }
    if cadence_min <= 0 {
        return Err(StarError::usage("--cadence_min must be > 0"));
    }

    let mut anchors = Vec::new();
    let mut r = 0u32;
    while r < rows {
        anchors.push(LogicalAnchor {
            row: r,
            t_min: r as i64 * cadence_min,
        });
        r += anchor_every;
    }
    let last_row = rows - 1;
    if anchors.last().map(|a| a.row) != Some(last_row) {
        anchors.push(LogicalAnchor {
            row: last_row,
            t_min: last_row as i64 * cadence_min,
        });
    }
    Ok(LogicalIndex {
        anchor_every,
        cadence_min,
        star_sha256,
        anchors,
    })
}

pub fn write(magic: &[u8], version: u32, index: &LogicalIndex) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(magic);
    out.extend_from_slice(&version.to_le_bytes());
    out.extend_from_slice(&index.anchor_every.to_le_bytes());
    out.extend_from_slice(&(index.anchors.len() as u32).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // flags: no offsets
    out.extend_from_slice(&index.cadence_min.to_le_bytes());
    out.extend_from_slice(&index.star_sha256);
    for a in &index.anchors {
        out.extend_from_slice(&a.row.to_le_bytes());
        out.extend_from_slice(&a.t_min.to_le_bytes());
        out.extend_from_slice(&0u64.to_le_bytes()); // offset, always zero
    }
    out
}

fn read_u32(buf: &[u8], pos: usize) -> Result<(u32, usize), StarError> {
    if pos + 4 > buf.len() {
        return Err(StarError::truncated_body());
    }
    Ok((u32::from_le_bytes(buf[pos..pos + 4].try_into().unwrap()), pos + 4))
}

fn read_i64(buf: &[u8], pos: usize) -> Result<(i64, usize), StarError> {
    if pos + 8 > buf.len() {
        return Err(StarError::truncated_body());
    }
    Ok((i64::from_le_bytes(buf[pos..pos + 8].try_into().unwrap()), pos + 8))
}

fn read_u64(buf: &[u8], pos: usize) -> Result<(u64, usize), StarError> {
    if pos + 8 > buf.len() {
        return Err(StarError::truncated_body());
    }
    Ok((u64::from_le_bytes(buf[pos..pos + 8].try_into().unwrap()), pos + 8))
}

/// Parse an index written by [`write`], accepting either `magic` (the
/// preferred, NUL-terminated form) or `magic` with its trailing NUL byte
/// stripped (an older writer this reader stays tolerant of).
pub fn read(magic: &[u8], buf: &[u8]) -> Result<LogicalIndex, StarError> {
    let bare = &magic[..magic.len() - 1];
    let mut pos = if buf.starts_with(magic) {
        magic.len()
    } else if buf.starts_with(bare) {
        bare.len()
    } else {
        return Err(StarError::bad_magic("STARIDX0x"));
    };

    let (_version, next) = read_u32(buf, pos)?;
    pos = next;
    let (anchor_every, next) = read_u32(buf, pos)?;
    pos = next;
    let (n_anchors, next) = read_u32(buf, pos)?;
    pos = next;
    let (_flags, next) = read_u32(buf, pos)?;
    pos = next;
    let (cadence_min, next) = read_i64(buf, pos)?;
    pos = next;
    if pos + 32 > buf.len() {
        return Err(StarError::truncated_body());
    }
    let mut star_sha256 = [0u8; 32];
    star_sha256.copy_from_slice(&buf[pos..pos + 32]);
    pos += 32;

    let mut anchors = Vec::with_capacity(n_anchors as usize);
    for _ in 0..n_anchors {
        let (row, next) = read_u32(buf, pos)?;
        pos = next;
        let (t_min, next) = read_i64(buf, pos)?;
        pos = next;
        let (_off, next) = read_u64(buf, pos)?;
        pos = next;
        anchors.push(LogicalAnchor { row, t_min });
    }
    Ok(LogicalIndex {
        anchor_every,
        cadence_min,
        star_sha256,
        anchors,
    })
}

/// Rightmost anchor whose row is `<= target_row`, clamped to the first
/// anchor if `target_row` precedes every anchor.
pub fn nearest_anchor(anchors: &[LogicalAnchor], target_row: u32) -> &LogicalAnchor {
    let idx = match anchors.binary_search_by_key(&target_row, |a| a.row) {
        Ok(i) => i,
        Err(0) => 0,
        Err(i) => i - 1,
    };
    &anchors[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_anchors_cover_first_and_last_row() {
        let index = build(1000, 1, 256, [0u8; 32]).unwrap();
        assert_eq!(index.anchors[0].row, 0);
        assert_eq!(index.anchors.last().unwrap().row, 999);
    }

    #[test]
    fn write_then_read_round_trips_and_binds_sha() {
        let sha = sha256_bytes(b"hello");
        let index = build(10, 5, 4, sha).unwrap();
        let bytes = write(b"STARIDX04\0", 4, &index);
        let reloaded = read(b"STARIDX04\0", &bytes).unwrap();
        assert_eq!(reloaded.star_sha256, sha);
        assert_eq!(reloaded.anchors.len(), index.anchors.len());
    }

    #[test]
    fn nearest_anchor_picks_rightmost_at_or_before_target() {
        let anchors = vec![
            LogicalAnchor { row: 0, t_min: 0 },
            LogicalAnchor { row: 10, t_min: 100 },
            LogicalAnchor { row: 20, t_min: 200 },
        ];
        assert_eq!(nearest_anchor(&anchors, 15).row, 10);
        assert_eq!(nearest_anchor(&anchors, 20).row, 20);
        assert_eq!(nearest_anchor(&anchors, 0).row, 0);
    }
}
