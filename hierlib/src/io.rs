use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use log::warn;
use regex::Regex;
use thiserror::Error;

/// An address literal: `0x`-prefixed hexadecimal (at most 16 digits) or
/// decimal
const ADDRESS_PATTERN: &str = r"^(?:0[xX][0-9a-fA-F]{1,16}|[0-9]+)$";

/// Failures while getting a trace off disk. Malformed literals inside the
/// trace are not errors - they are skipped with a logged warning
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("couldn't open the trace file at path {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("couldn't read the trace file: {0}")]
    Read(#[from] std::io::Error),
}

pub fn get_reader(file: File) -> Result<impl Read + Seek, TraceError> {
    // Compatibility on other systems
    #[cfg(not(unix))]
    {
        use std::io::BufReader;
        const BUFFER_SIZE: usize = 64 * 1024;
        Ok(BufReader::with_capacity(BUFFER_SIZE, file))
    }
    // Memory map the file for speed on unix systems
    #[cfg(unix)]
    {
        use memmap2::{Advice, Mmap};
        use std::io::Cursor;
        // Traces are replayed front to back, so advise sequential reads
        unsafe {
            let m = Mmap::map(&file)?;
            m.advise(Advice::Sequential)?;
            Ok(Cursor::new(m))
        }
    }
}

/// Reads and parses an address trace file.
///
/// The file holds decimal or `0x`-prefixed hexadecimal literals, separated by
/// commas and/or whitespace. Invalid literals are skipped with a warning
/// rather than failing the whole trace.
///
/// # Arguments
///
/// * `path`: Path of the trace file
///
/// returns: Result<Vec<u64>, TraceError>
pub fn read_trace(path: &Path) -> Result<Vec<u64>, TraceError> {
    let file = File::open(path).map_err(|e| TraceError::Open {
        path: path.display().to_string(),
        source: e,
    })?;
    let mut reader = get_reader(file)?;
    let mut text = String::new();
    let _ = reader.read_to_string(&mut text)?;
    Ok(parse_trace(&text))
}

/// Parses a trace out of a string of comma/whitespace separated address
/// literals, skipping invalid ones with a warning.
///
/// # Examples
///
/// ```
/// use hierlib::io::parse_trace;
/// assert_eq!(parse_trace("0x1000, 4096 0x1004"), vec![4096, 4096, 4100]);
/// ```
pub fn parse_trace(input: &str) -> Vec<u64> {
    // The pattern is a constant, compilation can't fail
    let literal = Regex::new(ADDRESS_PATTERN).unwrap();
    let mut addresses = Vec::new();
    for token in input.split(|c: char| c == ',' || c.is_whitespace()) {
        if token.is_empty() {
            continue;
        }
        if !literal.is_match(token) {
            warn!("skipping invalid address literal {token:?}");
            continue;
        }
        match parse_address(token) {
            Some(address) => addresses.push(address),
            // Matched the pattern but overflows 64 bits (long decimal literal)
            None => warn!("skipping out-of-range address literal {token:?}"),
        }
    }
    addresses
}

/// Parses a single decimal or `0x`-prefixed hexadecimal literal as a 64-bit
/// address.
///
/// # Examples
///
/// ```
/// use hierlib::io::parse_address;
/// assert_eq!(parse_address("0x1000"), Some(4096));
/// assert_eq!(parse_address("4096"), Some(4096));
/// assert_eq!(parse_address("0xfff"), Some(4095));
/// assert_eq!(parse_address("fff"), None);
/// ```
pub fn parse_address(literal: &str) -> Option<u64> {
    if let Some(digits) = literal
        .strip_prefix("0x")
        .or_else(|| literal.strip_prefix("0X"))
    {
        u64::from_str_radix(digits, 16).ok()
    } else {
        literal.parse().ok()
    }
}
