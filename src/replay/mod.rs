//! Seek-and-replay: given a blob and its index, resume decoding from the
//! nearest anchor at or before a requested row/time instead of decoding
//! from the start.

pub mod case01;
pub mod case02;
pub mod logical;
