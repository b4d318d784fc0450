use colored::Colorize;
use std::{error::Error, fmt::Display};
use thiserror::Error;

/// Errors produced by the STAR codecs, indices, and replay engine.
#[derive(Error, Debug)]
#[non_exhaustive]
pub struct StarError {
    kind: StarErrorKind,
}

impl StarError {
    pub fn bad_magic(expected: &'static str) -> Self {
        Self {
            kind: StarErrorKind::BadMagic(expected),
        }
    }

    pub fn truncated_varint() -> Self {
        Self {
            kind: StarErrorKind::TruncatedVarint,
        }
    }

    pub fn overlong_varint() -> Self {
        Self {
            kind: StarErrorKind::OverlongVarint,
        }
    }

    pub fn truncated_body() -> Self {
        Self {
            kind: StarErrorKind::TruncatedBody,
        }
    }

    pub fn bad_tag(tag: u8) -> Self {
        Self {
            kind: StarErrorKind::BadTag(tag),
        }
    }

    pub fn round_trip_failed(detail: &str) -> Self {
        Self {
            kind: StarErrorKind::RoundTripFailed(detail.to_string()),
        }
    }

    pub fn binding_mismatch() -> Self {
        Self {
            kind: StarErrorKind::BindingMismatch,
        }
    }

    pub fn index_mismatch(detail: &str) -> Self {
        Self {
            kind: StarErrorKind::IndexMismatch(detail.to_string()),
        }
    }

    pub fn unknown_magic() -> Self {
        Self {
            kind: StarErrorKind::UnknownMagic,
        }
    }

    pub fn usage(detail: &str) -> Self {
        Self {
            kind: StarErrorKind::Usage(detail.to_string()),
        }
    }

    pub fn io_error(err: std::io::Error) -> Self {
        Self {
            kind: StarErrorKind::IoError(err),
        }
    }

    pub fn csv_error(err: csv::Error) -> Self {
        Self {
            kind: StarErrorKind::CsvError(err),
        }
    }

    /// Whether this is a user-facing usage error, for CLI exit-code mapping.
    pub fn is_usage(&self) -> bool {
        matches!(self.kind, StarErrorKind::Usage(_))
    }
}

#[derive(Debug)]
enum StarErrorKind {
    /// The leading magic bytes of a blob or index did not match any known case.
    BadMagic(&'static str),
    /// A varint ran off the end of the buffer before terminating.
    TruncatedVarint,
    /// A varint used more bytes than a u64 can legitimately need.
    OverlongVarint,
    /// A body ended before all declared rows/fields were read.
    TruncatedBody,
    /// A block tag byte was neither 0x00 (run) nor 0x01 (literal).
    BadTag(u8),
    /// Re-decoding a freshly encoded blob did not reproduce the input rows.
    RoundTripFailed(String),
    /// sha256(star) did not match the binding recorded in its index.
    BindingMismatch,
    /// An index's own bookkeeping (row count, anchor ordering) is inconsistent.
    IndexMismatch(String),
    /// Magic sniffing could not associate the blob with a known case.
    UnknownMagic,
    /// Invalid CLI invocation.
    Usage(String),
    /// Underlying I/O failure.
    IoError(std::io::Error),
    /// Underlying CSV parsing failure.
    CsvError(csv::Error),
}

impl Display for StarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match &self.kind {
            StarErrorKind::BadMagic(expected) => {
                format!("{} expected {expected}", "BAD MAGIC:".underline())
            }
            StarErrorKind::TruncatedVarint => "TRUNCATED VARINT".underline().to_string(),
            StarErrorKind::OverlongVarint => "OVERLONG VARINT".underline().to_string(),
            StarErrorKind::TruncatedBody => "TRUNCATED BODY".underline().to_string(),
            StarErrorKind::BadTag(tag) => format!("{} 0x{tag:02x}", "BAD TAG:".underline()),
            StarErrorKind::RoundTripFailed(detail) => {
                format!("{} {detail}", "ROUND TRIP FAILED:".underline())
            }
            StarErrorKind::BindingMismatch => "INDEX BINDING MISMATCH".underline().to_string(),
            StarErrorKind::IndexMismatch(detail) => {
                format!("{} {detail}", "INDEX MISMATCH:".underline())
            }
            StarErrorKind::UnknownMagic => "UNKNOWN MAGIC".underline().to_string(),
            StarErrorKind::Usage(detail) => format!("{} {detail}", "USAGE:".underline()),
            StarErrorKind::IoError(err) => format!("{} {err}", "IO ERROR:".underline()),
            StarErrorKind::CsvError(err) => format!("{} {err}", "CSV ERROR:".underline()),
        };

        write!(f, "{prefix}")?;

        let mut next_err = self.source();
        while let Some(err) = next_err {
            write!(f, ": {err}")?;
            next_err = err.source();
        }

        Ok(())
    }
}

impl From<std::io::Error> for StarError {
    fn from(value: std::io::Error) -> Self {
        Self::io_error(value)
    }
}

impl From<csv::Error> for StarError {
    fn from(value: csv::Error) -> Self {
        Self::csv_error(value)
    }
}
