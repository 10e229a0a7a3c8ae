//! Parsing of one `field-name ":" OWS field-value OWS CRLF` line.

use core::ops::Range;

use crate::chars;
use crate::error::{Error, Result};

pub(crate) struct FieldLine {
    pub name: Range<usize>,
    pub value: Range<usize>,
    /// Offset just past the terminating CRLF.
    pub next: usize,
}

/// Parse one field line starting at `at`. The caller has already ruled out
/// the blank line that terminates the field block.
///
/// `Ok(None)` means the line cannot be decided yet; nothing has been
/// consumed or mutated, so the call can simply be repeated once more bytes
/// are committed. Deciding a line ending needs up to three bytes past the
/// CRLF candidate (obs-fold look-ahead).
///
/// On success, every obsolete line fold inside the value has been
/// overwritten in place with three SP bytes, so the returned value span is
/// one flat run. The span excludes the whitespace around the value.
pub(crate) fn parse_field_line(buf: &mut [u8], at: usize) -> Result<Option<FieldLine>> {
    let len = buf.len();

    // field-name, then the colon with no whitespace in between.
    let n_end = chars::skip_tchar(buf, at);
    if n_end == len {
        return Ok(None);
    }
    if n_end == at {
        return Err(if buf[at] == b'\n' {
            Error::BadLineEnding
        } else {
            Error::BadField
        });
    }
    if buf[n_end] != b':' {
        return Err(Error::BadField);
    }

    // First pass: locate the terminating CRLF (one not followed by SP or
    // HTAB) and validate every byte. No mutation yet, so a need-more
    // return commits nothing.
    let mut i = n_end + 1;
    let term;
    let next;
    loop {
        if i == len {
            return Ok(None);
        }
        match buf[i] {
            b'\r' => {
                if i + 1 == len {
                    return Ok(None);
                }
                if buf[i + 1] != b'\n' {
                    return Err(Error::BadLineEnding);
                }
                if i + 2 == len {
                    return Ok(None);
                }
                if chars::is_ows(buf[i + 2]) {
                    // Obsolete line fold. The next non-whitespace must not
                    // be another line ending.
                    let j = chars::skip_ows(buf, i + 3);
                    if j == len {
                        return Ok(None);
                    }
                    if buf[j] == b'\r' || buf[j] == b'\n' {
                        return Err(Error::BadValue);
                    }
                    i = j;
                } else {
                    term = i;
                    next = i + 2;
                    break;
                }
            }
            b'\n' => return Err(Error::BadLineEnding),
            b if chars::is_field_content(b) => i += 1,
            _ => return Err(Error::BadValue),
        }
    }

    // Second pass: flatten the folds. Every CR before the terminator is
    // the start of a validated CRLF + continuation triple.
    let mut p = n_end + 1;
    while p < term {
        if buf[p] == b'\r' {
            buf[p] = b' ';
            buf[p + 1] = b' ';
            buf[p + 2] = b' ';
            p += 3;
        } else {
            p += 1;
        }
    }

    // The value span, stripped of surrounding OWS.
    let v_start = chars::skip_ows(buf, n_end + 1);
    let mut v_end = term;
    while v_end > v_start && chars::is_ows(buf[v_end - 1]) {
        v_end -= 1;
    }

    Ok(Some(FieldLine {
        name: at..n_end,
        value: v_start..v_end,
        next,
    }))
}
