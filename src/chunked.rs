//! Chunk framing: size lines, extensions, inter-chunk CRLF.

use core::ops::Range;

use crate::bnf::{self, ChunkExt};
use crate::chars;
use crate::error::{Error, Result};
use crate::startline::find_line;

#[derive(Debug, PartialEq)]
pub(crate) struct ChunkHeader {
    pub size: u64,
    /// Extension text between the size digits and the CRLF, verbatim
    /// (including the leading `;`). Empty when there is none.
    pub ext: Range<usize>,
    pub next: usize,
}

/// Parse `chunk-size [ chunk-ext ] CRLF` at `at`.
///
/// `Ok(None)` until the whole line is available. Any deviation, including
/// a declared size that overflows, is [`Error::BadChunk`].
pub(crate) fn parse_chunk_header(buf: &[u8], at: usize) -> Result<Option<ChunkHeader>> {
    let Some((end, next)) = find_line(buf, at).map_err(|_| Error::BadChunk)? else {
        return Ok(None);
    };

    let d_end = chars::skip_while(&buf[..end], at, chars::is_hex_digit);
    if d_end == at {
        return Err(Error::BadChunk);
    }

    let mut size: u64 = 0;
    for b in &buf[at..d_end] {
        size = size
            .checked_mul(16)
            .and_then(|s| s.checked_add(hex_val(*b) as u64))
            .ok_or(Error::BadChunk)?;
    }

    if !bnf::is_valid::<ChunkExt>(&buf[d_end..end]) {
        return Err(Error::BadChunk);
    }

    Ok(Some(ChunkHeader {
        size,
        ext: d_end..end,
        next,
    }))
}

/// Consume the strict CRLF that terminates chunk data.
pub(crate) fn parse_chunk_crlf(buf: &[u8], at: usize) -> Result<Option<usize>> {
    match buf.get(at) {
        None => Ok(None),
        Some(b'\r') => match buf.get(at + 1) {
            None => Ok(None),
            Some(b'\n') => Ok(Some(at + 2)),
            Some(_) => Err(Error::BadChunk),
        },
        Some(_) => Err(Error::BadChunk),
    }
}

fn hex_val(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => unreachable!("caller checked is_hex_digit"),
    }
}
