//! Compressibility reporting: the `.star.zlib` side artifact and the
//! human-readable baseline/structural/ratio summary an encode run prints.

use bytesize::ByteSize;
use colored::Colorize;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

/// DEFLATE-compress `buf` at the highest compression level, purely to
/// measure how compressible the structural encoding left the data. Never
/// read back by any STAR operation.
pub fn zlib_compress(buf: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(9));
    encoder.write_all(buf).expect("writing to an in-memory encoder cannot fail");
    encoder.finish().expect("finishing an in-memory encoder cannot fail")
}

/// One encode run's baseline/structural size comparison, ready to print.
pub struct EncodeReport {
    pub case_label: String,
    pub n_rows: usize,
    pub raw_len: usize,
    pub zraw_len: usize,
    pub packed_len: usize,
    pub zpacked_len: usize,
}

impl EncodeReport {
    pub fn print(&self) {
        println!("{}", format!("STAR — {}", self.case_label).bold());
        println!("rows parsed: n={}", self.n_rows);
        println!();
        println!("{}", "Baseline:".underline());
        println!("  raw bytes:             {}", ByteSize(self.raw_len as u64));
        println!("  zlib(raw) bytes:       {}", ByteSize(self.zraw_len as u64));
        println!();
        println!("{}", "Structural (STAR):".underline());
        println!("  packed bytes:          {}", ByteSize(self.packed_len as u64));
        println!("  zlib(packed) bytes:    {}", ByteSize(self.zpacked_len as u64));
        println!();
        println!("{}", "Ratios (smaller is better):".underline());
        println!(
            "  packed / raw:          {:.4}",
            self.packed_len as f64 / self.raw_len.max(1) as f64
        );
        println!(
            "  zlib(packed)/zlib(raw):{:.4}",
            self.zpacked_len as f64 / self.zraw_len.max(1) as f64
        );
    }
}
