// SPDX-License-Identifier: AGPL-3.0-only

//! Hex pixel stream codec
//!
//! The simulator consumes one two-digit lowercase hex token per line in
//! row-major order (`$readmemh` format) and emits its results the same way.
//! Output tokens may be any width but must fit in 8 bits.

use crate::error::{Result, SobelError};
use crate::grid::IntensityGrid;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

/// Serialize a grid to its pixel stream text
#[must_use]
pub fn encode_stream(grid: &IntensityGrid) -> String {
    encode_samples(grid.as_slice())
}

/// Serialize samples as two-digit hex tokens, one per line
#[must_use]
pub fn encode_samples(samples: &[u8]) -> String {
    let mut out = String::with_capacity(samples.len() * 3);
    for &sample in samples {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{sample:02x}");
    }
    out
}

/// Write a grid's pixel stream to `path`, replacing any previous contents
///
/// # Errors
///
/// Returns an I/O error naming `path` if the file cannot be created or written.
pub fn write_stream(grid: &IntensityGrid, path: &Path) -> Result<()> {
    tracing::debug!("Encoding {} frame", grid.dims());
    write_samples(grid.as_slice(), path)?;
    tracing::info!("Pixel stream written: {}", path.display());
    Ok(())
}

/// Write samples as a hex token stream to `path`, replacing any previous
/// contents
///
/// # Errors
///
/// Returns an I/O error naming `path` if the file cannot be created or written.
pub fn write_samples(samples: &[u8], path: &Path) -> Result<()> {
    tracing::debug!("Writing {} tokens to {}", samples.len(), path.display());

    let file = std::fs::File::create(path).map_err(|e| SobelError::io(path, e))?;
    let mut writer = std::io::BufWriter::new(file);
    writer
        .write_all(encode_samples(samples).as_bytes())
        .map_err(|e| SobelError::io(path, e))?;
    writer.flush().map_err(|e| SobelError::io(path, e))?;
    Ok(())
}

/// Parse a stream of hex tokens, one per line
///
/// # Errors
///
/// Returns a parse error for the first token that is empty, not hexadecimal,
/// or larger than `0xff`.
pub fn parse_samples(text: &str) -> Result<Vec<u8>> {
    let mut samples = Vec::with_capacity(text.len() / 3);

    for (idx, line) in text.lines().enumerate() {
        samples.push(parse_token(idx + 1, line.trim())?);
    }

    tracing::debug!("Parsed {} samples", samples.len());
    Ok(samples)
}

/// Read and parse a sample stream from `path`
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read, or a parse error for the
/// first malformed token.
pub fn read_samples(path: &Path) -> Result<Vec<u8>> {
    let text = std::fs::read_to_string(path).map_err(|e| SobelError::io(path, e))?;
    let samples = parse_samples(&text)?;
    tracing::info!("Read {} samples from {}", samples.len(), path.display());
    Ok(samples)
}

fn parse_token(line: usize, token: &str) -> Result<u8> {
    if token.is_empty() {
        return Err(SobelError::parse(line, token, "empty line"));
    }

    let value = u32::from_str_radix(token, 16)
        .map_err(|e| SobelError::parse(line, token, e.to_string()))?;

    u8::try_from(value).map_err(|_| {
        tracing::error!("Sample out of 8-bit range at line {line}: {token}");
        SobelError::parse(line, token, format!("value {value} exceeds 255"))
    })
}
