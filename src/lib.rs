//! STAR: lossless columnar compressors for tabular time-series data.
//!
//! Four independent case codecs ([`case::case01`] OHLCV bars,
//! [`case::case02`] air quality ticks, [`case::case03`] front-coded text
//! lines, [`case::case04`] dictionary-coded ledger rows) share a common
//! varint/zig-zag wire primitive ([`varint`]) and, for the two delta-coded
//! cases, a common run-length block format ([`block`]). Each case has a
//! matching anchor index ([`index`]) and seek-replay engine ([`replay`]);
//! [`dispatch`] routes a blob to its case by magic bytes.

pub mod block;
pub mod case;
pub mod dispatch;
pub mod error;
pub mod index;
pub mod model;
pub mod replay;
pub mod report;
pub mod varint;
