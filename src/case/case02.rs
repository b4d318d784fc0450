//! Case-02: UCI Air Quality ticks, semicolon-delimited, decimal-comma CSV,
//! delta + run-length coded the same way as Case-01 but over an 8-field
//! tuple.

use std::path::Path;

use chrono::NaiveDateTime;

use crate::block::{decode_body, encode_body};
use crate::error::StarError;
use crate::model::AirTick;
use crate::varint::{read_uvarint, read_zigzag, write_uvarint, write_zigzag};

pub const MAGIC: &[u8] = b"STAR2A";

fn clean_token(s: &str) -> &str {
    s.trim().trim_matches('"').trim()
}

fn parse_decimal_maybe_comma(s: &str) -> Option<f64> {
    let t = clean_token(s);
    if t.is_empty() || t == "-200" {
        return None;
    }
    t.replace(',', ".").parse::<f64>().ok()
}

fn parse_int_or_none(s: &str) -> Option<i64> {
    let t = clean_token(s);
    if t.is_empty() || t == "-200" {
        return None;
    }
    t.replace(',', ".").parse::<f64>().ok().map(|v| v as i64)
}

fn parse_datetime_to_minutes(date_s: &str, time_s: &str) -> Option<i64> {
    let date_s = clean_token(date_s);
    let time_s = clean_token(time_s);
    if date_s.is_empty() || time_s.is_empty() {
        return None;
    }
    let combined = format!("{date_s} {time_s}");
    let dt = NaiveDateTime::parse_from_str(&combined, "%d/%m/%Y %H.%M.%S").ok()?;
    let epoch = NaiveDateTime::parse_from_str("1970-01-01 00:00:00", "%Y-%m-%d %H:%M:%S").ok()?;
    Some((dt - epoch).num_seconds().div_euclid(60))
}

const COLUMN_NAMES: [&str; 9] = [
    "Date", "Time", "CO(GT)", "C6H6(GT)", "NOx(GT)", "NO2(GT)", "T", "RH", "AH",
];

/// Read a semicolon-delimited `AirQualityUCI.csv`-shaped file, dropping rows
/// with an unparseable timestamp or a `-200` sentinel on any measured field.
///
/// The real UCI release carries latin-1 bytes (the `µg/m³` header, for one),
/// so the file is transcoded to UTF-8 before `csv` ever sees it rather than
/// parsed directly, which would reject those bytes as invalid UTF-8.
pub fn read_csv(path: &Path, max_rows: Option<usize>) -> Result<Vec<AirTick>, StarError> {
    let raw = std::fs::read(path)?;
    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(&raw);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = reader.records();

    let Some(header) = records.next() else {
        return Ok(Vec::new());
    };
    let header = header?;
    let cols: Vec<String> = header.iter().map(|c| clean_token(c).to_string()).collect();
    let find_col = |name: &str| cols.iter().position(|c| c == name);
    let idx: Vec<usize> = COLUMN_NAMES
        .iter()
        .map(|name| find_col(name))
        .collect::<Option<Vec<usize>>>()
        .ok_or_else(|| StarError::usage("AirQualityUCI.csv header missing expected columns"))?;
    let (i_date, i_time, i_co, i_c6, i_nox, i_no2, i_t, i_rh, i_ah) = (
        idx[0], idx[1], idx[2], idx[3], idx[4], idx[5], idx[6], idx[7], idx[8],
    );
    let max_idx = idx.iter().copied().max().unwrap_or(0);

    let mut ticks = Vec::new();
    for record in records {
        let record = record?;
        if record.len() <= max_idx {
            continue;
        }
        let Some(t_min) = parse_datetime_to_minutes(&record[i_date], &record[i_time]) else {
            continue;
        };
        let co = parse_decimal_maybe_comma(&record[i_co]);
        let c6 = parse_decimal_maybe_comma(&record[i_c6]);
        let nox = parse_int_or_none(&record[i_nox]);
        let no2 = parse_int_or_none(&record[i_no2]);
        let tt = parse_decimal_maybe_comma(&record[i_t]);
        let rh = parse_decimal_maybe_comma(&record[i_rh]);
        let ah = parse_decimal_maybe_comma(&record[i_ah]);
        let (Some(co), Some(c6), Some(nox), Some(no2), Some(tt), Some(rh), Some(ah)) =
            (co, c6, nox, no2, tt, rh, ah)
        else {
            continue;
        };
        ticks.push(AirTick {
            t_min,
            co_x10: (co * 10.0).round() as i64,
            c6h6_x10: (c6 * 10.0).round() as i64,
            nox,
            no2,
            t_x10: (tt * 10.0).round() as i64,
            rh_x10: (rh * 10.0).round() as i64,
            ah_x1000: (ah * 1000.0).round() as i64,
        });
        if let Some(max) = max_rows {
            if ticks.len() >= max {
                break;
            }
        }
    }
    Ok(ticks)
}

pub fn encode(ticks: &[AirTick]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    write_uvarint(&mut out, ticks.len() as u64);
    if ticks.is_empty() {
        return out;
    }
    for v in ticks[0].as_tuple() {
        write_zigzag(&mut out, v);
    }
    let tuples: Vec<[i64; 8]> = ticks.iter().map(AirTick::as_tuple).collect();
    out.extend_from_slice(&encode_body(&tuples));
    out
}

/// Parse a STAR2A blob's header: row count, base tick, and the byte offset
/// its delta body starts at. Shared by the plain decoder and the index
/// builder.
pub fn parse_header(buf: &[u8]) -> Result<(usize, AirTick, usize), StarError> {
    if !buf.starts_with(MAGIC) {
        return Err(StarError::bad_magic("STAR2A"));
    }
    let mut pos = MAGIC.len();
    let (n_u, next) = read_uvarint(buf, pos)?;
    pos = next;
    let n = n_u as usize;
    if n == 0 {
        return Ok((0, AirTick::ZERO, pos));
    }
    let mut base = [0i64; 8];
    for slot in base.iter_mut() {
        let (v, next) = read_zigzag(buf, pos)?;
        *slot = v;
        pos = next;
    }
    Ok((n, AirTick::from_tuple(base), pos))
}

pub fn decode(buf: &[u8]) -> Result<Vec<AirTick>, StarError> {
    let (n, base, body_pos) = parse_header(buf)?;
    if n == 0 {
        return Ok(Vec::new());
    }
    let (tuples, _end) = decode_body(buf, body_pos, base.as_tuple(), n)?;
    Ok(tuples.into_iter().map(AirTick::from_tuple).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(t: i64) -> AirTick {
        AirTick {
            t_min: t,
            co_x10: 10,
            c6h6_x10: 20,
            nox: 30,
            no2: 40,
            t_x10: 200,
            rh_x10: 500,
            ah_x1000: 700,
        }
    }

    #[test]
    fn empty_encode_round_trips() {
        let encoded = encode(&[]);
        assert_eq!(encoded, b"STAR2A\x00");
        assert_eq!(decode(&encoded).unwrap(), Vec::<AirTick>::new());
    }

    #[test]
    fn run_of_identical_deltas_round_trips() {
        let ticks: Vec<AirTick> = (0..6).map(tick).collect();
        let encoded = encode(&ticks);
        assert_eq!(decode(&encoded).unwrap(), ticks);
    }

    #[test]
    fn datetime_parses_uci_format() {
        assert_eq!(parse_datetime_to_minutes("10/03/2004", "18.00.00"), Some(17982360));
    }

    #[test]
    fn sentinel_is_none() {
        assert_eq!(parse_decimal_maybe_comma("-200"), None);
        assert_eq!(parse_decimal_maybe_comma("2,6"), Some(2.6));
    }
}
