//! The four STAR case codecs. Each module owns a magic, a CSV reader, and a
//! bit-exact encode/decode pair; shared plumbing (varints, the delta+RLE
//! block format) lives in [`crate::varint`] and [`crate::block`].

pub mod case01;
pub mod case02;
pub mod case03;
pub mod case04;

/// Which of the four case codecs a blob, index, or CLI invocation names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CaseId {
    Case01,
    Case02,
    Case03,
    Case04,
}

impl CaseId {
    pub fn label(self) -> &'static str {
        match self {
            CaseId::Case01 => "case01",
            CaseId::Case02 => "case02",
            CaseId::Case03 => "case03",
            CaseId::Case04 => "case04",
        }
    }
}
