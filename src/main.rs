use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use star::case::{case01, case02, case03, case04, CaseId};
use star::error::StarError;
use star::index;
use star::replay;
use star::report::{self, EncodeReport};
use star::{dispatch, model::Bar};

mod cli;

fn main() -> ExitCode {
    let args = cli::Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(args.verbose.filter()).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let result = match args.command {
        cli::Commands::Encode {
            case,
            csv,
            out,
            max_rows,
            price_scale,
        } => run_encode(case, &csv, &out, max_rows, price_scale),
        cli::Commands::Index {
            star,
            out,
            anchor_every,
            rows,
            cadence,
        } => run_index(&star, &out, anchor_every, rows, cadence),
        cli::Commands::Replay {
            star,
            idx,
            seek_row,
            seek_time,
            rows,
            rows_hint,
            cadence,
        } => run_replay(&star, &idx, seek_row, seek_time, rows, rows_hint, cadence),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            if err.is_usage() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn ensure_star_suffix(path: &Path) -> PathBuf {
    if path.extension().map(|ext| ext == "star").unwrap_or(false) {
        path.to_path_buf()
    } else {
        let mut s = path.as_os_str().to_os_string();
        s.push(".star");
        PathBuf::from(s)
    }
}

fn run_encode(case: CaseId, csv: &Path, out: &Path, max_rows: Option<usize>, price_scale: i64) -> Result<(), StarError> {
    let out = ensure_star_suffix(out);
    let raw = std::fs::read(csv)?;

    let (blob, n_rows) = match case {
        CaseId::Case01 => {
            let bars = case01::read_csv(csv, price_scale, max_rows)?;
            let blob = case01::encode(&bars, price_scale);
            if case01::decode(&blob)? != bars {
                return Err(StarError::round_trip_failed("case01"));
            }
            (blob, bars.len())
        }
        CaseId::Case02 => {
            let ticks = case02::read_csv(csv, max_rows)?;
            let blob = case02::encode(&ticks);
            if case02::decode(&blob)? != ticks {
                return Err(StarError::round_trip_failed("case02"));
            }
            (blob, ticks.len())
        }
        CaseId::Case03 => {
            let (header, lines) = case03::read_lines(csv, max_rows)?;
            let blob = case03::encode(&header, &lines);
            let (decoded_header, decoded_lines) = case03::decode(&blob)?;
            if decoded_header != header || decoded_lines != lines {
                return Err(StarError::round_trip_failed("case03"));
            }
            (blob, lines.len())
        }
        CaseId::Case04 => {
            let mut rows = case04::read_csv(csv)?;
            if let Some(max) = max_rows {
                rows.truncate(max);
            }
            let blob = case04::encode(&rows);
            if case04::decode(&blob)? != rows {
                return Err(StarError::round_trip_failed("case04"));
            }
            (blob, rows.len())
        }
    };

    std::fs::write(&out, &blob)?;
    let zlib_path = {
        let mut s = out.as_os_str().to_os_string();
        s.push(".zlib");
        PathBuf::from(s)
    };
    let zpacked = report::zlib_compress(&blob);
    std::fs::write(&zlib_path, &zpacked)?;

    EncodeReport {
        case_label: case.label().to_string(),
        n_rows,
        raw_len: raw.len(),
        zraw_len: report::zlib_compress(&raw).len(),
        packed_len: blob.len(),
        zpacked_len: zpacked.len(),
    }
    .print();
    Ok(())
}

fn run_index(star_path: &Path, out: &Path, anchor_every: Option<u32>, rows: Option<u32>, cadence: Option<i64>) -> Result<(), StarError> {
    let star = std::fs::read(star_path)?;
    let case = dispatch::sniff_case(&star)?;

    let bytes = match case {
        CaseId::Case01 => {
            let idx = index::case01::build(&star, anchor_every.unwrap_or(256))?;
            index::case01::write(&idx)
        }
        CaseId::Case02 => {
            let idx = index::case02::build(&star, anchor_every.unwrap_or(1024))?;
            index::case02::write(&idx)
        }
        CaseId::Case03 => {
            let rows = rows.ok_or_else(|| StarError::usage("--rows is required to index case03"))?;
            let cadence = cadence.ok_or_else(|| StarError::usage("--cadence is required to index case03"))?;
            let sha = index::logical::sha256_bytes(&star);
            let idx = index::logical::build(rows, cadence, anchor_every.unwrap_or(256), sha)?;
            println!("bound to sha256={}", hex::encode(sha));
            index::logical::write(b"STARIDX03\0", 3, &idx)
        }
        CaseId::Case04 => {
            let rows = rows.ok_or_else(|| StarError::usage("--rows is required to index case04"))?;
            let cadence = cadence.ok_or_else(|| StarError::usage("--cadence is required to index case04"))?;
            let sha = index::logical::sha256_bytes(&star);
            let idx = index::logical::build(rows, cadence, anchor_every.unwrap_or(256), sha)?;
            println!("bound to sha256={}", hex::encode(sha));
            index::logical::write(b"STARIDX04\0", 4, &idx)
        }
    };

    std::fs::write(out, &bytes)?;
    println!("wrote {} index ({} bytes)", case.label(), bytes.len());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_replay(
    star_path: &Path,
    idx_path: &Path,
    seek_row: Option<u32>,
    seek_time: Option<String>,
    rows: u32,
    rows_hint: Option<u32>,
    cadence: Option<i64>,
) -> Result<(), StarError> {
    let star = std::fs::read(star_path)?;
    let idx_bytes = std::fs::read(idx_path)?;
    let case = dispatch::sniff_case(&star)?;

    match case {
        CaseId::Case01 => {
            let idx = index::case01::read(&idx_bytes)?;
            let seek = match &seek_time {
                Some(t) => {
                    let days = case01::date_to_days(t).ok_or_else(|| StarError::usage("--seek_time must be YYYY-MM-DD for case01"))?;
                    replay::case01::Seek::Day(days)
                }
                None => replay::case01::Seek::Row(seek_row.unwrap_or(0)),
            };
            let out = replay::case01::replay(&star, &idx, seek, rows as usize)?;
            print_bars(&out);
        }
        CaseId::Case02 => {
            let idx = index::case02::read(&idx_bytes)?;
            let seek = match &seek_time {
                Some(t) => {
                    let t_min: i64 = t.parse().map_err(|_| StarError::usage("--seek_time must be integer minutes for case02"))?;
                    replay::case02::Seek::TimeMin(t_min)
                }
                None => replay::case02::Seek::Row(seek_row.unwrap_or(0) as u64),
            };
            let out = replay::case02::replay(&star, &idx, seek, rows as usize)?;
            for (row, tick) in out {
                println!(
                    "{row}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    tick.t_min, tick.co_x10, tick.c6h6_x10, tick.nox, tick.no2, tick.t_x10, tick.rh_x10, tick.ah_x1000
                );
            }
        }
        CaseId::Case03 => {
            let idx = index::logical::read(b"STARIDX03\0", &idx_bytes)?;
            let seek_time_min = seek_time
                .as_deref()
                .map(str::parse::<i64>)
                .transpose()
                .map_err(|_| StarError::usage("--seek_time must be integer minutes for case03"))?;
            let resolved = replay::logical::resolve(&star, &idx, seek_row, seek_time_min, rows_hint, cadence, rows)?;
            print_logical_resolution(&resolved);
        }
        CaseId::Case04 => {
            let idx = index::logical::read(b"STARIDX04\0", &idx_bytes)?;
            let seek_time_min = seek_time
                .as_deref()
                .map(str::parse::<i64>)
                .transpose()
                .map_err(|_| StarError::usage("--seek_time must be integer minutes for case04"))?;
            let resolved = replay::logical::resolve(&star, &idx, seek_row, seek_time_min, rows_hint, cadence, rows)?;
            print_logical_resolution(&resolved);
        }
    }
    Ok(())
}

fn print_bars(out: &[(u32, Bar)]) {
    for (row, bar) in out {
        println!(
            "{row}\t{}\t{}\t{}\t{}\t{}\t{}",
            case01::days_to_date(bar.d_days),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        );
    }
}

fn print_logical_resolution(resolved: &replay::logical::Resolved) {
    println!(
        "target row {} (nearest anchor row {} t_min {})",
        resolved.target_row, resolved.nearest_anchor_row, resolved.nearest_anchor_t_min
    );
    for (row, t_min) in &resolved.projection {
        println!("{row}\t{t_min}");
    }
}
