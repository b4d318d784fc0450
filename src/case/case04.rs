//! Case-04: crypto transaction ledger rows, with four categorical columns
//! dictionary-coded and the remaining seven fields stored as literal
//! length-prefixed strings.

use std::collections::HashMap;
use std::path::Path;

use crate::error::StarError;
use crate::model::{CryptoTx, CRYPTO_DICT_COLUMNS, CRYPTO_REQUIRED_COLUMNS};
use crate::varint::{read_uvarint, write_uvarint};

pub const MAGIC: &[u8] = b"STAR4\x04OF";

const DELIMITER_CANDIDATES: [u8; 4] = [b',', b'\t', b';', b'|'];

/// Guess the field delimiter by checking which candidate's header row names
/// every required column.
fn sniff_delimiter(raw: &[u8]) -> u8 {
    let first_line = raw.split(|&b| b == b'\n').next().unwrap_or(raw);
    for &delim in &DELIMITER_CANDIDATES {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delim)
            .has_headers(true)
            .from_reader(first_line);
        if let Ok(headers) = rdr.headers() {
            let names: Vec<&str> = headers.iter().collect();
            if CRYPTO_REQUIRED_COLUMNS.iter().all(|c| names.contains(c)) {
                return delim;
            }
        }
    }
    b','
}

pub fn read_csv(path: &Path) -> Result<Vec<CryptoTx>, StarError> {
    let raw = std::fs::read(path)?;
    let delimiter = sniff_delimiter(&raw);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(raw.as_slice());

    let headers = reader.headers()?.clone();
    for required in CRYPTO_REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            return Err(StarError::usage(&format!("missing required column: {required}")));
        }
    }
    let col = |name: &str| headers.iter().position(|h| h == name).unwrap();
    let get = |record: &csv::StringRecord, name: &str| {
        record.get(col(name)).unwrap_or("").to_string()
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(CryptoTx {
            transaction_id: get(&record, "Transaction_ID"),
            sender_address: get(&record, "Sender_Address"),
            receiver_address: get(&record, "Receiver_Address"),
            amount: get(&record, "Amount"),
            transaction_fee: get(&record, "Transaction_Fee"),
            timestamp: get(&record, "Timestamp"),
            block_id: get(&record, "Block_ID"),
            mining_pool: get(&record, "Mining_Pool"),
            currency: get(&record, "Currency"),
            transaction_type: get(&record, "Transaction_Type"),
            transaction_status: get(&record, "Transaction_Status"),
            gas_price_gwei: get(&record, "Gas_Price_Gwei"),
        });
    }
    Ok(rows)
}

fn write_str(out: &mut Vec<u8>, s: &str) {
    write_uvarint(out, s.len() as u64);
    out.extend_from_slice(s.as_bytes());
}

fn read_str(buf: &[u8], pos: usize) -> Result<(String, usize), StarError> {
    let (len, next) = read_uvarint(buf, pos)?;
    let len = len as usize;
    let mut pos = next;
    if pos + len > buf.len() {
        return Err(StarError::truncated_body());
    }
    let s = String::from_utf8_lossy(&buf[pos..pos + len]).into_owned();
    pos += len;
    Ok((s, pos))
}

/// First-occurrence-order unique value -> index mapping for one categorical
/// column.
fn build_dict(values: impl Iterator<Item = String>) -> (Vec<String>, HashMap<String, u32>) {
    let mut order = Vec::new();
    let mut index = HashMap::new();
    for v in values {
        if !index.contains_key(&v) {
            index.insert(v.clone(), order.len() as u32);
            order.push(v);
        }
    }
    (order, index)
}

fn dict_value<'a>(tx: &'a CryptoTx, col: &str) -> &'a str {
    match col {
        "Mining_Pool" => &tx.mining_pool,
        "Currency" => &tx.currency,
        "Transaction_Type" => &tx.transaction_type,
        "Transaction_Status" => &tx.transaction_status,
        _ => unreachable!("not a dictionary column"),
    }
}

pub fn encode(rows: &[CryptoTx]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&(rows.len() as u32).to_le_bytes());
    out.extend_from_slice(&(CRYPTO_REQUIRED_COLUMNS.len() as u32).to_le_bytes());

    let dicts: Vec<(Vec<String>, HashMap<String, u32>)> = CRYPTO_DICT_COLUMNS
        .iter()
        .map(|col| build_dict(rows.iter().map(|r| dict_value(r, col).to_string())))
        .collect();

    for (order, _) in &dicts {
        out.extend_from_slice(&(order.len() as u32).to_le_bytes());
        for value in order {
            out.extend_from_slice(&(value.len() as u32).to_le_bytes());
            out.extend_from_slice(value.as_bytes());
        }
    }

    for row in rows {
        write_str(&mut out, &row.transaction_id);
        write_str(&mut out, &row.sender_address);
        write_str(&mut out, &row.receiver_address);
        write_str(&mut out, &row.amount);
        write_str(&mut out, &row.transaction_fee);
        write_str(&mut out, &row.timestamp);
        write_str(&mut out, &row.block_id);
        for (col, (_, index)) in CRYPTO_DICT_COLUMNS.iter().zip(&dicts) {
            let code = index[dict_value(row, col)];
            write_uvarint(&mut out, code as u64);
        }
        write_str(&mut out, &row.gas_price_gwei);
    }
    out
}

fn read_u32(buf: &[u8], pos: usize) -> Result<(u32, usize), StarError> {
    if pos + 4 > buf.len() {
        return Err(StarError::truncated_body());
    }
    let v = u32::from_le_bytes(buf[pos..pos + 4].try_into().expect("4 bytes"));
    Ok((v, pos + 4))
}

pub fn decode(buf: &[u8]) -> Result<Vec<CryptoTx>, StarError> {
    if !buf.starts_with(MAGIC) {
        return Err(StarError::bad_magic("STAR4\\x04OF"));
    }
    let mut pos = MAGIC.len();
    let (n_rows, next) = read_u32(buf, pos)?;
    pos = next;
    let (_n_cols, next) = read_u32(buf, pos)?;
    pos = next;

    let mut dicts: Vec<Vec<String>> = Vec::with_capacity(CRYPTO_DICT_COLUMNS.len());
    for _ in CRYPTO_DICT_COLUMNS {
        let (count, next) = read_u32(buf, pos)?;
        pos = next;
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let (len, next) = read_u32(buf, pos)?;
            pos = next;
            let len = len as usize;
            if pos + len > buf.len() {
                return Err(StarError::truncated_body());
            }
            entries.push(String::from_utf8_lossy(&buf[pos..pos + len]).into_owned());
            pos += len;
        }
        dicts.push(entries);
    }

    let mut rows = Vec::with_capacity(n_rows as usize);
    for _ in 0..n_rows {
        let (transaction_id, next) = read_str(buf, pos)?;
        pos = next;
        let (sender_address, next) = read_str(buf, pos)?;
        pos = next;
        let (receiver_address, next) = read_str(buf, pos)?;
        pos = next;
        let (amount, next) = read_str(buf, pos)?;
        pos = next;
        let (transaction_fee, next) = read_str(buf, pos)?;
        pos = next;
        let (timestamp, next) = read_str(buf, pos)?;
        pos = next;
        let (block_id, next) = read_str(buf, pos)?;
        pos = next;

        let mut codes = [0u32; 4];
        for slot in codes.iter_mut() {
            let (code, next) = read_uvarint(buf, pos)?;
            pos = next;
            *slot = code as u32;
        }
        let (gas_price_gwei, next) = read_str(buf, pos)?;
        pos = next;

        let lookup = |dict_idx: usize, code: u32| -> Result<String, StarError> {
            dicts[dict_idx]
                .get(code as usize)
                .cloned()
                .ok_or_else(|| StarError::index_mismatch("dictionary code out of range"))
        };

        rows.push(CryptoTx {
            transaction_id,
            sender_address,
            receiver_address,
            amount,
            transaction_fee,
            timestamp,
            block_id,
            mining_pool: lookup(0, codes[0])?,
            currency: lookup(1, codes[1])?,
            transaction_type: lookup(2, codes[2])?,
            transaction_status: lookup(3, codes[3])?,
            gas_price_gwei,
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: &str, pool: &str) -> CryptoTx {
        CryptoTx {
            transaction_id: id.to_string(),
            sender_address: "0xabc".to_string(),
            receiver_address: "0xdef".to_string(),
            amount: "1.5".to_string(),
            transaction_fee: "0.01".to_string(),
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            block_id: "100".to_string(),
            mining_pool: pool.to_string(),
            currency: "BTC".to_string(),
            transaction_type: "transfer".to_string(),
            transaction_status: "confirmed".to_string(),
            gas_price_gwei: "20".to_string(),
        }
    }

    #[test]
    fn dictionary_coding_round_trips() {
        let rows = vec![tx("t1", "PoolA"), tx("t2", "PoolB"), tx("t3", "PoolA")];
        let encoded = encode(&rows);
        assert_eq!(decode(&encoded).unwrap(), rows);
    }

    #[test]
    fn dictionary_assigns_first_occurrence_order() {
        let rows = vec![tx("t1", "PoolB"), tx("t2", "PoolA"), tx("t3", "PoolB")];
        let (order, index) = build_dict(rows.iter().map(|r| r.mining_pool.clone()));
        assert_eq!(order, vec!["PoolB".to_string(), "PoolA".to_string()]);
        assert_eq!(index["PoolB"], 0);
        assert_eq!(index["PoolA"], 1);
    }

    #[test]
    fn empty_rows_round_trip() {
        let encoded = encode(&[]);
        assert_eq!(decode(&encoded).unwrap(), Vec::<CryptoTx>::new());
    }
}
