//! Command line surface: `star encode|index|replay`, mirroring the three
//! standalone driver scripts the case codecs used to be invoked from.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use star::case::CaseId;

/// Arguments to star.
#[derive(Parser, Debug)]
#[command(author, version, about = "Lossless columnar compressors for tabular time-series data", long_about = None)]
pub struct Args {
    /// Command passed
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level.
    #[arg(short, long, help = "verbosity level", default_value = "normal")]
    pub verbose: Verbosity,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    pub fn filter(self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
        }
    }
}

/// Defines the types of commands that can be executed from the CLI.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// star encode --case <case> --csv <path> --out <path> - parse a CSV/text
    /// source and write its structural STAR encoding.
    Encode {
        /// Which case codec to encode with.
        #[arg(long, value_enum, help = "case codec")]
        case: CaseId,

        /// Source CSV or text file.
        #[arg(long, help = "input CSV path")]
        csv: PathBuf,

        /// Destination for the `.star` blob (and its `.star.zlib` sibling).
        #[arg(long, help = "output path, \".star\" appended if missing")]
        out: PathBuf,

        /// Stop after this many data rows.
        #[arg(long, help = "row cap")]
        max_rows: Option<usize>,

        /// Integer scale applied to case01 prices before delta coding.
        #[arg(long, default_value_t = 100, help = "case01 price scale")]
        price_scale: i64,
    },

    /// star index --star <path> --out <path> - build a sparse anchor index
    /// over an existing STAR blob. The case is detected from the blob's own
    /// magic bytes.
    Index {
        /// STAR blob to index.
        #[arg(long, help = "input .star path")]
        star: PathBuf,

        /// Destination for the index file.
        #[arg(long, help = "output index path")]
        out: PathBuf,

        /// Anchor spacing, in rows. Defaults depend on the case.
        #[arg(long, help = "anchors every N rows")]
        anchor_every: Option<u32>,

        /// Row count. Required for case03/case04, whose blobs don't store one.
        #[arg(long, help = "row count, required for case03/case04")]
        rows: Option<u32>,

        /// Minutes between consecutive rows. Required for case03/case04.
        #[arg(long, help = "row cadence in minutes, required for case03/case04")]
        cadence: Option<i64>,
    },

    /// star replay --star <path> --idx <path> - resume decoding from the
    /// nearest anchor at or before a seek target.
    Replay {
        /// STAR blob to replay from.
        #[arg(long, help = "input .star path")]
        star: PathBuf,

        /// Index built over that blob.
        #[arg(long, help = "input index path")]
        idx: PathBuf,

        /// Row to seek to.
        #[arg(long, help = "seek to this row")]
        seek_row: Option<u32>,

        /// Seek target in the case's native time unit: `YYYY-MM-DD` for
        /// case01, integer minutes for case02/case03/case04.
        #[arg(long, help = "seek to this time (case-dependent format)")]
        seek_time: Option<String>,

        /// How many rows to print after the seek target.
        #[arg(long, default_value_t = 10, help = "rows to print")]
        rows: u32,

        /// Total row count, for case03/case04 previews that must not run
        /// past the end of data the index wasn't told about.
        #[arg(long, help = "row count hint, case03/case04 only")]
        rows_hint: Option<u32>,

        /// Override the index's recorded cadence, case03/case04 only.
        #[arg(long, help = "cadence override in minutes, case03/case04 only")]
        cadence: Option<i64>,
    },
}
