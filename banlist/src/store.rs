//! Banfile reader.
//!
//! The banfile is plain text with one identifier per line. Lines are kept
//! verbatim (apart from the line terminator) and in file order; nothing is
//! trimmed, deduplicated or validated. Bytes that are not valid UTF-8 are
//! decoded lossily rather than rejected.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, error, info};

use crate::errors::{BanlistError, Result};

/// Read every identifier from the banfile.
///
/// A missing banfile is created empty and read as an empty list.
pub fn read_banfile(path: &Path) -> Result<Vec<String>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(open_err) => {
            info!(
                "Creating new banfile {:?} since open failed: {}",
                path, open_err
            );
            OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(path)
                .map_err(|e| {
                    error!("Error creating banfile {:?}: {}", path, e);
                    BanlistError::io(path, e)
                })?
        }
    };

    let mut identifiers = Vec::new();
    let mut reader = BufReader::new(file);
    let mut line = Vec::new();
    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .map_err(|e| BanlistError::parse(path, e))?;
        if read == 0 {
            break;
        }
        // Undecodable bytes become U+FFFD; such a line can never match a
        // query but the rest of the file still loads
        let identifier = String::from_utf8_lossy(strip_line_ending(&line)).into_owned();
        debug!("Adding banned identifier to list: {}", identifier);
        identifiers.push(identifier);
    }

    Ok(identifiers)
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests;
