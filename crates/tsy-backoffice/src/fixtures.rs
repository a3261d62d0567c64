//! Sample input-file generation for demos and end-to-end tests.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

/// Write a small, deterministic set of the four input files into `data_dir`.
///
/// The set exercises every leg of the pipeline: repeated prices (stream size
/// toggling), a tight book (algo execution fires), a wide book (no signal),
/// external trades across books, and inquiries.
pub fn write_sample_inputs(data_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data dir {:?}", data_dir))?;

    write(
        data_dir,
        "prices.txt",
        // 32nds are spelled with the explicit eighths digit; the T30Y
        // spread uses the two-character raw-tick shorthand (one tick).
        "T2Y 99-16+ 0-001\n\
         T2Y 99-16+ 0-001\n\
         T3Y 100-00+ 0-002\n\
         T5Y 99-080 0-002\n\
         T7Y 99-240 0-004\n\
         T10Y 98-24+ 0-004\n\
         T20Y 98-00 0-00+\n\
         T30Y 97-160 0-01\n\
         T10Y 98-250 0-004\n",
    )?;

    write(
        data_dir,
        "marketdata.txt",
        // T3Y's one-tick top-of-book spread trips the signal; T7Y's is wide.
        "T3Y, 100-00, 1000000, 99-317, 2000000, 99-316, 3000000, 99-31+, 4000000, 99-313, 5000000, \
         100-001, 1000000, 100-002, 2000000, 100-003, 3000000, 100-00+, 4000000, 100-005, 5000000\n\
         T7Y, 99-240, 1000000, 99-23+, 2000000, 99-230, 3000000, 99-22+, 4000000, 99-220, 5000000, \
         99-260, 1000000, 99-26+, 2000000, 99-270, 3000000, 99-27+, 4000000, 99-280, 5000000\n",
    )?;

    write(
        data_dir,
        "trades.txt",
        "T5Y, TRADE_B1, 99-080, TRSY1, 1000, BUY\n\
         T5Y, TRADE_S1, 99-080, TRSY2, 2000, SELL\n\
         T10Y, TRADE_B2, 98.75, TRSY3, 5000, BUY\n\
         T2Y, TRADE_B3, 99-160, TRSY1, 3000, BUY\n",
    )?;

    write(
        data_dir,
        "inquiries.txt",
        "INQ1 T2Y BUY 5000\n\
         INQ2 T10Y SELL 10000\n",
    )?;

    info!(dir = %data_dir.display(), "sample inputs written");
    Ok(())
}

fn write(dir: &Path, name: &str, contents: &str) -> Result<()> {
    let path = dir.join(name);
    let mut file =
        File::create(&path).with_context(|| format!("failed to create {:?}", path))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_all_four_feeds() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_inputs(dir.path()).unwrap();
        for name in ["prices.txt", "marketdata.txt", "trades.txt", "inquiries.txt"] {
            assert!(dir.path().join(name).exists(), "missing {}", name);
        }
    }
}
