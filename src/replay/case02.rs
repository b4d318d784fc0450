//! Seek + replay for Case-02 (STAR2A + STARIDX2).

use crate::block::{replay_from, rightmost_at_or_before};
use crate::case::case02;
use crate::error::StarError;
use crate::index::case02 as index02;
use crate::model::AirTick;

pub enum Seek {
    Row(u64),
    TimeMin(i64),
}

pub fn replay(
    star: &[u8],
    index: &index02::Index,
    seek: Seek,
    out_rows: usize,
) -> Result<Vec<(u64, AirTick)>, StarError> {
    let (n_rows, _base, _body_pos) = case02::parse_header(star)?;
    if index.n_rows as usize != n_rows {
        return Err(StarError::index_mismatch("index n_rows does not match STAR file"));
    }
    if index.anchors.is_empty() {
        return Ok(Vec::new());
    }

    let anchor_idx = match seek {
        Seek::Row(target) => {
            let keys: Vec<i64> = index.anchors.iter().map(|a| a.row as i64).collect();
            rightmost_at_or_before(&keys, target as i64)
        }
        Seek::TimeMin(target) => {
            let keys: Vec<i64> = index.anchors.iter().map(|a| a.state.t_min).collect();
            rightmost_at_or_before(&keys, target)
        }
    };
    let anchor = &index.anchors[anchor_idx];

    let want_now = move |row: usize, state: [i64; 8]| -> bool {
        match seek {
            Seek::Row(target) => row as u64 >= target,
            Seek::TimeMin(target) => state[0] >= target,
        }
    };

    let out = replay_from(
        star,
        anchor.row as usize,
        anchor.byte_offset as usize,
        anchor.state.as_tuple(),
        n_rows,
        want_now,
        out_rows,
    )?;
    Ok(out.into_iter().map(|(row, state)| (row as u64, AirTick::from_tuple(state))).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::case02::encode;
    use crate::index::case02::build;

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
    fn replay_from_row_matches_full_decode_slice() {
        let ticks: Vec<AirTick> = (0..1000i64).map(tick).collect();
        let blob = encode(&ticks);
        let index = build(&blob, 128).unwrap();

        let out = replay(&blob, &index, Seek::Row(500), 5).unwrap();
        let expected: Vec<(u64, AirTick)> = (500..505).map(|i| (i as u64, ticks[i as usize])).collect();
        assert_eq!(out, expected);
    }
}
