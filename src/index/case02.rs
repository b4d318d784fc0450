//! `STARIDX2` anchor index for Case-02 STAR blobs.

use crate::block::build_anchors;
use crate::case::case02;
use crate::error::StarError;
use crate::model::AirTick;

pub const MAGIC: &[u8] = b"STARIDX2";
const VERSION: u8 = 1;

pub struct Anchor {
    pub row: u64,
    pub byte_offset: u64,
    pub state: AirTick,
}

pub struct Index {
    pub anchor_every: u32,
    pub n_rows: u64,
    pub anchors: Vec<Anchor>,
}

pub fn build(star: &[u8], anchor_every: u32) -> Result<Index, StarError> {
    if anchor_every == 0 {
        return Err(StarError::usage("--anchor_every must be > 0"));
    }
    let (n, base, body_pos) = case02::parse_header(star)?;
    let raw = build_anchors(star, body_pos, base.as_tuple(), n, anchor_every as usize)?;
    let anchors = raw
        .into_iter()
        .map(|(row, off, state)| Anchor {
            row: row as u64,
            byte_offset: off as u64,
            state: AirTick::from_tuple(state),
        })
        .collect();
    Ok(Index {
        anchor_every,
        n_rows: n as u64,
        anchors,
    })
}

pub fn write(index: &Index) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.push(VERSION);
    out.extend_from_slice(&index.anchor_every.to_le_bytes());
    out.extend_from_slice(&index.n_rows.to_le_bytes());
    out.extend_from_slice(&(index.anchors.len() as u32).to_le_bytes());
    for a in &index.anchors {
        out.extend_from_slice(&a.row.to_le_bytes());
        out.extend_from_slice(&a.byte_offset.to_le_bytes());
        for v in a.state.as_tuple() {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }
    out
}

fn read_u32(buf: &[u8], pos: usize) -> Result<(u32, usize), StarError> {
    if pos + 4 > buf.len() {
        return Err(StarError::truncated_body());
    }
    Ok((u32::from_le_bytes(buf[pos..pos + 4].try_into().unwrap()), pos + 4))
}

fn read_u64(buf: &[u8], pos: usize) -> Result<(u64, usize), StarError> {
    if pos + 8 > buf.len() {
        return Err(StarError::truncated_body());
    }
    Ok((u64::from_le_bytes(buf[pos..pos + 8].try_into().unwrap()), pos + 8))
}

fn read_i64(buf: &[u8], pos: usize) -> Result<(i64, usize), StarError> {
    if pos + 8 > buf.len() {
        return Err(StarError::truncated_body());
    }
    Ok((i64::from_le_bytes(buf[pos..pos + 8].try_into().unwrap()), pos + 8))
}

pub fn read(buf: &[u8]) -> Result<Index, StarError> {
    if !buf.starts_with(MAGIC) {
        return Err(StarError::bad_magic("STARIDX2"));
    }
    let mut pos = MAGIC.len();
    if pos >= buf.len() {
        return Err(StarError::truncated_body());
    }
    let _version = buf[pos];
    pos += 1;
    let (anchor_every, next) = read_u32(buf, pos)?;
    pos = next;
    let (n_rows, next) = read_u64(buf, pos)?;
    pos = next;
    let (n_anchors, next) = read_u32(buf, pos)?;
    pos = next;

    let mut anchors = Vec::with_capacity(n_anchors as usize);
    for _ in 0..n_anchors {
        let (row, next) = read_u64(buf, pos)?;
        pos = next;
        let (byte_offset, next) = read_u64(buf, pos)?;
        pos = next;
        let mut tuple = [0i64; 8];
        for slot in tuple.iter_mut() {
            let (v, next) = read_i64(buf, pos)?;
            *slot = v;
            pos = next;
        }
        anchors.push(Anchor {
            row,
            byte_offset,
            state: AirTick::from_tuple(tuple),
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
    use crate::case::case02::encode;

    fn tick(t: i64) -> AirTick {
        AirTick {
            t_min: t,
            co_x10: t,
            c6h6_x10: t,
            nox: t,
            no2: t,
            t_x10: t,
            rh_x10: t,
            ah_x1000: t,
        }
    }

    #[test]
    fn anchors_cover_row_zero_and_final_row() {
        let ticks: Vec<AirTick> = (0..300i64).map(tick).collect();
        let blob = encode(&ticks);
        let index = build(&blob, 32).unwrap();
        assert_eq!(index.anchors[0].row, 0);
        assert_eq!(index.anchors.last().unwrap().row, 299);
    }

    #[test]
    fn write_then_read_round_trips() {
        let ticks: Vec<AirTick> = (0..20i64).map(tick).collect();
        let blob = encode(&ticks);
        let index = build(&blob, 4).unwrap();
        let bytes = write(&index);
        let reloaded = read(&bytes).unwrap();
        assert_eq!(reloaded.n_rows, index.n_rows);
        assert_eq!(reloaded.anchors.len(), index.anchors.len());
    }
}
