//! `SIDX1` / `CASE01` anchor index for Case-01 STAR blobs.

use crate::block::build_anchors;
use crate::case::case01;
use crate::error::StarError;
use crate::model::Bar;

pub const MAGIC: &[u8] = b"SIDX1";
const CASE_TAG: &[u8] = b"CASE01\0";

pub struct Anchor {
    pub row: u32,
    pub byte_offset: u32,
    pub state: Bar,
}

pub struct Index {
    pub anchor_every: u32,
    pub n_rows: u32,
    pub anchors: Vec<Anchor>,
}

/// Build an anchor index over a STAR1 blob, one anchor roughly every
/// `anchor_every` rows, always at block boundaries.
pub fn build(star: &[u8], anchor_every: u32) -> Result<Index, StarError> {
    if anchor_every == 0 {
        return Err(StarError::usage("--anchor_every must be > 0"));
    }
    let (n, base, body_pos) = case01::parse_header(star)?;
    let raw = build_anchors(star, body_pos, base.as_tuple(), n, anchor_every as usize)?;
    let anchors = raw
        .into_iter()
        .map(|(row, off, state)| Anchor {
            row: row as u32,
            byte_offset: off as u32,
            state: Bar::from_tuple(state),
        })
        .collect();
    Ok(Index {
        anchor_every,
        n_rows: n as u32,
        anchors,
    })
}

pub fn write(index: &Index) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(CASE_TAG);
    out.extend_from_slice(&index.anchor_every.to_le_bytes());
    out.extend_from_slice(&index.n_rows.to_le_bytes());
    out.extend_from_slice(&(index.anchors.len() as u32).to_le_bytes());
    for a in &index.anchors {
        out.extend_from_slice(&a.row.to_le_bytes());
        out.extend_from_slice(&a.byte_offset.to_le_bytes());
        out.extend_from_slice(&(a.state.d_days as i32).to_le_bytes());
        out.extend_from_slice(&a.state.open.to_le_bytes());
        out.extend_from_slice(&a.state.high.to_le_bytes());
        out.extend_from_slice(&a.state.low.to_le_bytes());
        out.extend_from_slice(&a.state.close.to_le_bytes());
        out.extend_from_slice(&a.state.volume.to_le_bytes());
    }
    out
}

fn read_u32(buf: &[u8], pos: usize) -> Result<(u32, usize), StarError> {
    if pos + 4 > buf.len() {
        return Err(StarError::truncated_body());
    }
    Ok((u32::from_le_bytes(buf[pos..pos + 4].try_into().unwrap()), pos + 4))
}

fn read_i32(buf: &[u8], pos: usize) -> Result<(i32, usize), StarError> {
    if pos + 4 > buf.len() {
        return Err(StarError::truncated_body());
    }
    Ok((i32::from_le_bytes(buf[pos..pos + 4].try_into().unwrap()), pos + 4))
}

fn read_i64(buf: &[u8], pos: usize) -> Result<(i64, usize), StarError> {
    if pos + 8 > buf.len() {
        return Err(StarError::truncated_body());
    }
    Ok((i64::from_le_bytes(buf[pos..pos + 8].try_into().unwrap()), pos + 8))
}

pub fn read(buf: &[u8]) -> Result<Index, StarError> {
    let prefix_len = MAGIC.len() + CASE_TAG.len();
    if buf.len() < prefix_len || &buf[..MAGIC.len()] != MAGIC || &buf[MAGIC.len()..prefix_len] != CASE_TAG {
        return Err(StarError::bad_magic("SIDX1CASE01"));
    }
    let mut pos = prefix_len;
    let (anchor_every, next) = read_u32(buf, pos)?;
    pos = next;
    let (n_rows, next) = read_u32(buf, pos)?;
    pos = next;
    let (n_anchors, next) = read_u32(buf, pos)?;
    pos = next;

    let mut anchors = Vec::with_capacity(n_anchors as usize);
    for _ in 0..n_anchors {
        let (row, next) = read_u32(buf, pos)?;
        pos = next;
        let (byte_offset, next) = read_u32(buf, pos)?;
        pos = next;
        let (d_days, next) = read_i32(buf, pos)?;
        pos = next;
        let (open, next) = read_i64(buf, pos)?;
        pos = next;
        let (high, next) = read_i64(buf, pos)?;
        pos = next;
        let (low, next) = read_i64(buf, pos)?;
        pos = next;
        let (close, next) = read_i64(buf, pos)?;
        pos = next;
        let (volume, next) = read_i64(buf, pos)?;
        pos = next;
        anchors.push(Anchor {
            row,
            byte_offset,
            state: Bar {
                d_days: d_days as i64,
                open,
                high,
                low,
                close,
                volume,
            },
        });
    }
    Ok(Index {
        anchor_every,
        n_rows,
        anchors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::case01::encode;

    #[test]
    fn anchors_cover_row_zero_and_final_row() {
        let bars: Vec<Bar> = (0..500i64)
            .map(|i| Bar {
                d_days: i,
                open: i,
                high: i,
                low: i,
                close: i,
                volume: i,
            })
            .collect();
        let blob = encode(&bars, 100);
        let index = build(&blob, 64).unwrap();
        assert_eq!(index.anchors[0].row, 0);
        assert_eq!(index.anchors.last().unwrap().row, 499);
    }

    #[test]
    fn write_then_read_round_trips() {
        let bars: Vec<Bar> = (0..10i64)
            .map(|i| Bar {
                d_days: i,
                open: i,
                high: i,
                low: i,
                close: i,
                volume: i,
            })
            .collect();
        let blob = encode(&bars, 1);
        let index = build(&blob, 4).unwrap();
        let bytes = write(&index);
        let reloaded = read(&bytes).unwrap();
        assert_eq!(reloaded.n_rows, index.n_rows);
        assert_eq!(reloaded.anchors.len(), index.anchors.len());
    }
}
