//! Sparse anchor indices, one module per STAR case family. Case-01/02 bind
//! `(row, byte_offset, decoder_state)` anchors into a delta-coded body;
//! Case-03/04 bind purely logical `(row, t_min)` anchors plus a SHA-256 seal
//! over the STAR blob they describe.

pub mod case01;
pub mod case02;
pub mod logical;
