//! Seek + replay for Case-01 (STAR1 + SIDX1/CASE01).

use crate::block::{replay_from, rightmost_at_or_before};
use crate::case::case01;
use crate::error::StarError;
use crate::index::case01 as index01;
use crate::model::Bar;

/// Seek request: by row index or by calendar day (caller resolves
/// `YYYY-MM-DD` to a day count before calling). Exactly one must be set.
pub enum Seek {
    Row(u32),
    Day(i64),
}

/// Resume from the nearest anchor at or before the seek target, replaying
/// forward until `out_rows` matching rows are collected.
pub fn replay(
    star: &[u8],
    index: &index01::Index,
    seek: Seek,
    out_rows: usize,
) -> Result<Vec<(u32, Bar)>, StarError> {
    let (n_rows, _base, _body_pos) = case01::parse_header(star)?;
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
        Seek::Day(target) => {
            let keys: Vec<i64> = index.anchors.iter().map(|a| a.state.d_days).collect();
            rightmost_at_or_before(&keys, target)
        }
    };
    let anchor = &index.anchors[anchor_idx];

    let want_now = move |_row: usize, state: [i64; 6]| -> bool {
        match seek {
            Seek::Row(target) => _row as u32 >= target,
            Seek::Day(target) => state[0] >= target,
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
    Ok(out.into_iter().map(|(row, state)| (row as u32, Bar::from_tuple(state))).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::case01::encode;
    use crate::index::case01::build;

    fn bar(d: i64) -> Bar {
        Bar {
            d_days: d,
            open: d,
            high: d,
            low: d,
            close: d,
            volume: d,
        }
    }

    #[test]
    fn replay_from_row_matches_full_decode_slice() {
        let bars: Vec<Bar> = (0..1000i64).map(bar).collect();
        let blob = encode(&bars, 1);
        let index = build(&blob, 128).unwrap();

        let out = replay(&blob, &index, Seek::Row(500), 10).unwrap();
        let expected: Vec<(u32, Bar)> = (500..510).map(|i| (i as u32, bars[i])).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn replay_from_day_matches_full_decode_slice() {
        let bars: Vec<Bar> = (0..1000i64).map(bar).collect();
        let blob = encode(&bars, 1);
        let index = build(&blob, 128).unwrap();

        let out = replay(&blob, &index, Seek::Day(500), 3).unwrap();
        let expected: Vec<(u32, Bar)> = (500..503).map(|i| (i as u32, bars[i])).collect();
        assert_eq!(out, expected);
    }
}
