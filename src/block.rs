//! The delta + run-length block codec shared by Case-01 and Case-02.
//!
//! After a base row is written verbatim, every following row is expressed as
//! a field-wise delta against its predecessor. Consecutive identical deltas
//! are folded into a single run record; everything else falls back to a
//! one-row literal record. Both record kinds share an 8-byte tag:
//!
//! ```text
//! run record:      0x00 | uvarint(run_len) | zigzag(delta_0) .. zigzag(delta_{N-1})
//! literal record:  0x01 | zigzag(delta_0) .. zigzag(delta_{N-1})
//! ```

use crate::error::StarError;
use crate::varint::{read_uvarint, read_zigzag, write_uvarint, write_zigzag};

/// A run is only worth its tag+length overhead once it covers this many rows.
const RUN_THRESHOLD: usize = 3;
/// Caps a single run record so its length field stays a modestly sized varint.
const RUN_CAP: u64 = 10_000_000;

fn sub<const N: usize>(a: [i64; N], b: [i64; N]) -> [i64; N] {
    let mut out = [0i64; N];
    for i in 0..N {
        out[i] = a[i] - b[i];
    }
    out
}

fn add<const N: usize>(a: [i64; N], b: [i64; N]) -> [i64; N] {
    let mut out = [0i64; N];
    for i in 0..N {
        out[i] = a[i] + b[i];
    }
    out
}

fn write_tuple<const N: usize>(out: &mut Vec<u8>, t: [i64; N]) {
    for v in t {
        write_zigzag(out, v);
    }
}

fn read_tuple<const N: usize>(buf: &[u8], mut pos: usize) -> Result<([i64; N], usize), StarError> {
    let mut t = [0i64; N];
    for slot in t.iter_mut() {
        let (v, next) = read_zigzag(buf, pos)?;
        *slot = v;
        pos = next;
    }
    Ok((t, pos))
}

/// Encode `rows[0]` as the base (caller writes it) followed by the delta body
/// for `rows[1..]`.
pub fn encode_body<const N: usize>(rows: &[[i64; N]]) -> Vec<u8> {
    let mut out = Vec::new();
    if rows.len() < 2 {
        return out;
    }
    let deltas: Vec<[i64; N]> = rows.windows(2).map(|w| sub(w[1], w[0])).collect();

    let mut i = 0usize;
    while i < deltas.len() {
        let mut run_len = 1usize;
        while i + run_len < deltas.len()
            && deltas[i + run_len] == deltas[i]
            && (run_len as u64) < RUN_CAP
        {
            run_len += 1;
        }
        if run_len >= RUN_THRESHOLD {
            out.push(0x00);
            write_uvarint(&mut out, run_len as u64);
            write_tuple(&mut out, deltas[i]);
            i += run_len;
        } else {
            out.push(0x01);
            write_tuple(&mut out, deltas[i]);
            i += 1;
        }
    }
    out
}

/// Walks a delta body block by block, tracking the row index, absolute
/// reconstructed state, and byte offset at each block boundary. Shared by the
/// plain decoder (which collects every row), the index builder (which only
/// cares about boundaries), and the replay engine (which resumes from one).
pub struct BlockWalker<'a, const N: usize> {
    buf: &'a [u8],
    pos: usize,
    row: usize,
    state: [i64; N],
    n_rows: usize,
}

impl<'a, const N: usize> BlockWalker<'a, N> {
    pub fn new(buf: &'a [u8], pos: usize, start_row: usize, state: [i64; N], n_rows: usize) -> Self {
        BlockWalker {
            buf,
            pos,
            row: start_row,
            state,
            n_rows,
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn state(&self) -> [i64; N] {
        self.state
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn done(&self) -> bool {
        self.n_rows == 0 || self.row >= self.n_rows - 1
    }

    /// Consume one run or literal block, calling `emit` for every row it
    /// produces (in order). Does nothing if already `done()`.
    pub fn step(&mut self, mut emit: impl FnMut(usize, [i64; N])) -> Result<(), StarError> {
        if self.done() {
            return Ok(());
        }
        if self.pos >= self.buf.len() {
            return Err(StarError::truncated_body());
        }
        let tag = self.buf[self.pos];
        self.pos += 1;
        match tag {
            0x00 => {
                let (run_len_u, next) = read_uvarint(self.buf, self.pos)?;
                self.pos = next;
                let (delta, next) = read_tuple::<N>(self.buf, self.pos)?;
                self.pos = next;
                let run_len = run_len_u as usize;
                for _ in 0..run_len {
                    if self.row >= self.n_rows - 1 {
                        break;
                    }
                    self.state = add(self.state, delta);
                    self.row += 1;
                    emit(self.row, self.state);
                }
            }
            0x01 => {
                let (delta, next) = read_tuple::<N>(self.buf, self.pos)?;
                self.pos = next;
                self.state = add(self.state, delta);
                self.row += 1;
                emit(self.row, self.state);
            }
            other => return Err(StarError::bad_tag(other)),
        }
        Ok(())
    }
}

/// Decode the full body given the base row and declared row count.
pub fn decode_body<const N: usize>(
    buf: &[u8],
    pos: usize,
    base: [i64; N],
    n_rows: usize,
) -> Result<(Vec<[i64; N]>, usize), StarError> {
    if n_rows == 0 {
        return Ok((Vec::new(), pos));
    }
    let mut rows = Vec::with_capacity(n_rows);
    rows.push(base);
    let mut walker = BlockWalker::new(buf, pos, 0, base, n_rows);
    while !walker.done() {
        walker.step(|_, state| rows.push(state))?;
    }
    Ok((rows, walker.pos()))
}

/// Walk a body collecting `(row, byte_offset, state)` anchors at block
/// boundaries: one candidate per block, tested against `anchor_every` using
/// the row count as of the *start* of that block, always including row 0 and
/// a trailing anchor for the final row.
pub fn build_anchors<const N: usize>(
    buf: &[u8],
    body_pos: usize,
    base: [i64; N],
    n_rows: usize,
    anchor_every: usize,
) -> Result<Vec<(usize, usize, [i64; N])>, StarError> {
    if n_rows == 0 {
        return Ok(vec![(0, body_pos, base)]);
    }
    let mut anchors = vec![(0usize, body_pos, base)];
    let mut walker = BlockWalker::<N>::new(buf, body_pos, 0, base, n_rows);
    while !walker.done() {
        if walker.row() != 0 && walker.row() % anchor_every == 0 {
            anchors.push((walker.row(), walker.pos(), walker.state()));
        }
        walker.step(|_, _| {})?;
    }
    if anchors.last().expect("always has row 0").0 != walker.row() {
        anchors.push((walker.row(), walker.pos(), walker.state()));
    }
    Ok(anchors)
}

/// Index of the rightmost entry of a sorted-ascending `keys` slice that is
/// `<= target`, clamped to `0` if every entry exceeds `target`. Shared by the
/// Case-01/02 replay engines to pick an anchor by row or by the anchor's own
/// day/time-minute state.
pub fn rightmost_at_or_before<T: Ord + Copy>(keys: &[T], target: T) -> usize {
    keys.partition_point(|&k| k <= target).saturating_sub(1)
}

/// Resume decoding from an anchor's `(row, pos, state)`, collecting every
/// row for which `want_now` holds, until `out_rows` have been collected or
/// the body is exhausted.
pub fn replay_from<const N: usize>(
    buf: &[u8],
    start_row: usize,
    start_pos: usize,
    start_state: [i64; N],
    n_rows: usize,
    want_now: impl Fn(usize, [i64; N]) -> bool,
    out_rows: usize,
) -> Result<Vec<(usize, [i64; N])>, StarError> {
    let mut walker = BlockWalker::new(buf, start_pos, start_row, start_state, n_rows);
    let mut results = Vec::new();
    if want_now(walker.row(), walker.state()) {
        results.push((walker.row(), walker.state()));
    }
    while !walker.done() && results.len() < out_rows {
        let mut produced = Vec::new();
        walker.step(|row, state| produced.push((row, state)))?;
        for (row, state) in produced {
            if results.len() >= out_rows {
                break;
            }
            if want_now(row, state) {
                results.push((row, state));
            }
        }
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_mix_of_runs_and_literals() {
        let rows: Vec<[i64; 3]> = vec![
            [0, 0, 0],
            [1, 1, 1],
            [2, 2, 2],
            [3, 3, 3],
            [10, -5, 0],
            [11, -4, 1],
        ];
        let body = encode_body(&rows);
        let (decoded, end) = decode_body(&body, 0, rows[0], rows.len()).unwrap();
        assert_eq!(decoded, rows);
        assert_eq!(end, body.len());
    }

    #[test]
    fn two_equal_deltas_stay_literal_three_become_a_run() {
        let two: Vec<[i64; 1]> = vec![[0], [1], [2]];
        let body_two = encode_body(&two);
        assert_eq!(body_two[0], 0x01);

        let three: Vec<[i64; 1]> = vec![[0], [1], [2], [3]];
        let body_three = encode_body(&three);
        assert_eq!(body_three[0], 0x00);
    }

    #[test]
    fn single_row_has_empty_body() {
        let one: Vec<[i64; 2]> = vec![[5, 5]];
        assert!(encode_body(&one).is_empty());
    }

    #[test]
    fn anchors_land_on_block_boundaries_and_cover_every_row_via_replay() {
        let rows: Vec<[i64; 2]> = (0..1000i64).map(|i| [i, i * 2]).collect();
        let base = rows[0];
        let body = encode_body(&rows);
        let anchors = build_anchors(&body, 0, base, rows.len(), 128).unwrap();

        assert_eq!(anchors[0].0, 0);
        assert_eq!(anchors.last().unwrap().0, rows.len() - 1);

        for &(row, pos, state) in &anchors {
            let mut walker = BlockWalker::<2>::new(&body, pos, row, state, rows.len());
            let mut collected = vec![state];
            while !walker.done() {
                walker.step(|_, s| collected.push(s)).unwrap();
            }
            assert_eq!(collected, rows[row..]);
        }
    }

    #[test]
    fn rightmost_at_or_before_picks_the_last_key_not_past_target() {
        let keys = [0i64, 10, 20, 30];
        assert_eq!(rightmost_at_or_before(&keys, 25), 2);
        assert_eq!(rightmost_at_or_before(&keys, 30), 3);
        assert_eq!(rightmost_at_or_before(&keys, -5), 0);
    }

    #[test]
    fn replay_from_an_anchor_matches_a_full_decode_slice() {
        let rows: Vec<[i64; 2]> = (0..500i64).map(|i| [i, i * 3]).collect();
        let base = rows[0];
        let body = encode_body(&rows);
        let anchors = build_anchors(&body, 0, base, rows.len(), 64).unwrap();

        let (anchor_row, anchor_pos, anchor_state) = anchors[2];
        let target = anchor_row + 10;
        let out = replay_from(&body, anchor_row, anchor_pos, anchor_state, rows.len(), |row, _| row >= target, 5).unwrap();
        let expected: Vec<(usize, [i64; 2])> = (target..target + 5).map(|r| (r, rows[r])).collect();
        assert_eq!(out, expected);
    }
}
