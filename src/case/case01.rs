//! Case-01: daily OHLCV bars, delta + run-length coded against the previous
//! bar, with prices pre-scaled to integers by the caller's `price_scale`.

use std::path::Path;

use chrono::NaiveDate;

use crate::block::{decode_body, encode_body};
use crate::error::StarError;
use crate::model::Bar;
use crate::varint::{read_uvarint, read_zigzag, write_uvarint, write_zigzag};

pub const MAGIC: &[u8] = b"STAR1";

pub fn date_to_days(s: &str) -> Option<i64> {
    let mut parts = s.trim().splitn(3, '-');
    let y: i32 = parts.next()?.parse().ok()?;
    let m: u32 = parts.next()?.parse().ok()?;
    let d: u32 = parts.next()?.parse().ok()?;
    let date = NaiveDate::from_ymd_opt(y, m, d)?;
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    Some((date - epoch).num_days())
}

pub fn days_to_date(days: i64) -> String {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch");
    (epoch + chrono::Duration::days(days)).format("%Y-%m-%d").to_string()
}

fn parse_price(field: &str) -> Option<f64> {
    let t = field.trim();
    if t.is_empty() {
        return None;
    }
    match t.to_ascii_lowercase().as_str() {
        "nan" | "null" => None,
        _ => t.parse::<f64>().ok(),
    }
}

fn parse_volume(field: &str) -> i64 {
    let vs: String = field.trim().chars().filter(|c| *c != ',').collect();
    if vs.is_empty() {
        return 0;
    }
    if vs.contains('.') || vs.to_ascii_lowercase().contains('e') {
        vs.parse::<f64>().map(|v| v as i64).unwrap_or(0)
    } else {
        vs.parse::<i64>().unwrap_or(0)
    }
}

/// Read a `Date,Open,High,Low,Close,Volume`-shaped CSV, skipping a leading
/// header row and any row that fails to parse.
pub fn read_csv(path: &Path, price_scale: i64, max_rows: Option<usize>) -> Result<Vec<Bar>, StarError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut bars = Vec::new();

    for record in reader.records() {
        let record = record?;
        if record.is_empty() {
            continue;
        }
        let first = record.get(0).unwrap_or("").trim().to_ascii_lowercase();
        if first == "date" || first == "timestamp" {
            continue;
        }
        if record.len() < 6 {
            continue;
        }
        let (Some(o), Some(h), Some(l), Some(c)) = (
            parse_price(record.get(1).unwrap_or("")),
            parse_price(record.get(2).unwrap_or("")),
            parse_price(record.get(3).unwrap_or("")),
            parse_price(record.get(4).unwrap_or("")),
        ) else {
            continue;
        };
        let Some(d_days) = date_to_days(record.get(0).unwrap_or("")) else {
            continue;
        };
        let v = parse_volume(record.get(5).unwrap_or(""));
        let scale = price_scale as f64;
        bars.push(Bar {
            d_days,
            open: (o * scale).round() as i64,
            high: (h * scale).round() as i64,
            low: (l * scale).round() as i64,
            close: (c * scale).round() as i64,
            volume: v,
        });
        if let Some(max) = max_rows {
            if bars.len() >= max {
                break;
            }
        }
    }
    Ok(bars)
}

/// Encode a sequence of bars into a STAR1 blob.
pub fn encode(bars: &[Bar], price_scale: i64) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    write_uvarint(&mut out, bars.len() as u64);
    if bars.is_empty() {
        return out;
    }
    write_uvarint(&mut out, price_scale as u64);
    let base = bars[0].as_tuple();
    for v in base {
        write_zigzag(&mut out, v);
    }
    let tuples: Vec<[i64; 6]> = bars.iter().map(Bar::as_tuple).collect();
    out.extend_from_slice(&encode_body(&tuples));
    out
}

/// Parse a STAR1 blob's header: row count, base bar, and the byte offset its
/// delta body starts at. Shared by the plain decoder and the index builder.
pub fn parse_header(buf: &[u8]) -> Result<(usize, Bar, usize), StarError> {
    if !buf.starts_with(MAGIC) {
        return Err(StarError::bad_magic("STAR1"));
    }
    let mut pos = MAGIC.len();
    let (n_u, next) = read_uvarint(buf, pos)?;
    pos = next;
    let n = n_u as usize;
    if n == 0 {
        return Ok((0, Bar::ZERO, pos));
    }
    let (_price_scale, next) = read_uvarint(buf, pos)?;
    pos = next;
    let mut base = [0i64; 6];
    for slot in base.iter_mut() {
        let (v, next) = read_zigzag(buf, pos)?;
        *slot = v;
        pos = next;
    }
    Ok((n, Bar::from_tuple(base), pos))
}

/// Decode a STAR1 blob back into its bars, verifying the magic and body.
pub fn decode(buf: &[u8]) -> Result<Vec<Bar>, StarError> {
    let (n, base, body_pos) = parse_header(buf)?;
    if n == 0 {
        return Ok(Vec::new());
    }
    let (tuples, _end) = decode_body(buf, body_pos, base.as_tuple(), n)?;
    Ok(tuples.into_iter().map(Bar::from_tuple).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(d: i64, o: i64, h: i64, l: i64, c: i64, v: i64) -> Bar {
        Bar {
            d_days: d,
            open: o,
            high: h,
            low: l,
            close: c,
            volume: v,
        }
    }

    #[test]
    fn empty_encode_round_trips() {
        let encoded = encode(&[], 100);
        assert_eq!(encoded, b"STAR1\x00");
        assert_eq!(decode(&encoded).unwrap(), Vec::<Bar>::new());
    }

    #[test]
    fn three_row_run_round_trips() {
        let bars = vec![bar(0, 100, 110, 90, 105, 1000), bar(1, 101, 111, 91, 106, 1001), bar(2, 102, 112, 92, 107, 1002), bar(3, 103, 113, 93, 108, 1003)];
        let encoded = encode(&bars, 1);
        assert_eq!(decode(&encoded).unwrap(), bars);
    }

    #[test]
    fn mixed_run_and_literal_round_trips() {
        let bars = vec![bar(0, 1, 1, 1, 1, 1), bar(5, 2, 2, 2, 2, 2), bar(9, 9, 9, 9, 9, 9)];
        let encoded = encode(&bars, 1);
        assert_eq!(decode(&encoded).unwrap(), bars);
    }

    #[test]
    fn date_round_trip() {
        assert_eq!(date_to_days("1970-01-02"), Some(1));
        assert_eq!(days_to_date(1), "1970-01-02");
    }
}
