//! Byte-oriented I/O helpers for the CLI: whole-file reads (the pipeline
//! consumes complete buffers), output writing, and the `-` path convention
//! for standard streams.

use std::{
    fs,
    io::{self, Read, Write},
    path::Path,
};

use anyhow::{Context, Result};

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

/// Reads the whole input into memory; `-` reads standard input.
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    if is_dash(path) {
        let mut buffer = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut buffer)
            .context("Reading standard input")?;
        Ok(buffer)
    } else {
        fs::read(path).with_context(|| format!("Reading input file {path:?}"))
    }
}

/// Writes `bytes` to `path`, or to standard output when absent or `-`.
pub fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) if !is_dash(path) => {
            fs::write(path, bytes).with_context(|| format!("Writing output file {path:?}"))
        }
        _ => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes).context("Writing standard output")?;
            stdout.flush().context("Flushing standard output")
        }
    }
}
