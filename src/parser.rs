//! The resumable HTTP/1.1 message parser.

use core::ops::{Deref, Range};

use crate::bnf;
use crate::chars;
use crate::chunked::{parse_chunk_crlf, parse_chunk_header};
use crate::error::{Error, Result};
use crate::field::FieldId;
use crate::fieldline::parse_field_line;
use crate::headers::{Entry, Headers, Span};
use crate::startline::{parse_request_line, parse_status_line, Version};

/// Buffer growth increment.
const GROW: usize = 4096;

/// Which start-line grammar the parser runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// `method SP request-target SP HTTP-version`
    Request,
    /// `HTTP-version SP status-code SP reason-phrase`
    Response,
}

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Start-line grammar. Default [`Variant::Request`].
    pub variant: Variant,
    /// Maximum size of start-line + fields + terminating CRLF.
    /// Default 8192 bytes. Also applied to a chunked trailer block.
    pub header_limit: usize,
    /// Maximum decoded body size. Default unbounded.
    pub body_limit: Option<u64>,
    /// Whether containers produced by this parser validate values appended
    /// to them later. Default `true`.
    pub validate_field_characters: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            variant: Variant::Request,
            header_limit: 8192,
            body_limit: None,
            validate_field_characters: true,
        }
    }
}

/// Outcome of a parse operation that can suspend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The operation ran to its end.
    Complete,
    /// More committed input is required; call again after feeding bytes.
    NeedMore,
}

impl Status {
    /// Whether this is [`Status::Complete`].
    pub fn is_complete(&self) -> bool {
        *self == Status::Complete
    }
}

/// A borrowed run of decoded body bytes.
///
/// An empty, unfinished part means the parser needs more input.
#[derive(Debug)]
pub struct BodyPart<'a> {
    data: &'a [u8],
    finished: bool,
}

impl<'a> BodyPart<'a> {
    pub(crate) fn empty() -> BodyPart<'a> {
        BodyPart {
            data: &[],
            finished: false,
        }
    }

    /// The decoded bytes. Valid until the next call on the parser.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Whether the body has been decoded to its end.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Deref for BodyPart<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.data
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NothingYet,
    StartLine,
    Fields,
    Body,
    ChunkHeader,
    ChunkBody,
    ChunkTrailer,
    Complete,
    Failed,
}

/// How many body bytes belong to this message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    Length(u64),
    Chunked,
    UntilEof,
}

/// Flags accumulated by per-field semantic handlers while the field block
/// is parsed. Handlers never mutate anything else.
#[derive(Debug, Default)]
struct Semantics {
    content_length: Option<u64>,
    te_present: bool,
    chunked: bool,
    saw_close: bool,
    saw_keep_alive: bool,
    saw_upgrade_token: bool,
    upgrade_field: bool,
}

/// Outcome of one internal state-machine step.
enum Advance {
    NeedMore,
    Moved,
    Done,
}

/// Incremental HTTP/1.1 message parser.
///
/// The parser owns its input buffer. A caller asks for a writable region
/// with [`prepare`][Parser::prepare], copies bytes in, commits a count,
/// then drives [`parse_header`][Parser::parse_header] and
/// [`parse_body`][Parser::parse_body] (or the streaming and chunk-level
/// variants) until they report [`Status::Complete`] or fail. The input may
/// be fragmented arbitrarily; any operation that cannot be decided yet
/// reports [`Status::NeedMore`] without consuming partial elements.
///
/// ```
/// use hark::{Parser, Status};
///
/// let mut p = Parser::request();
/// let input = b"GET / HTTP/1.1\r\nHost: x\r\n\r\n";
///
/// let region = p.prepare();
/// region[..input.len()].copy_from_slice(input);
/// p.commit(input.len()).unwrap();
///
/// assert_eq!(p.parse_header().unwrap(), Status::Complete);
/// assert_eq!(p.method(), Some("GET"));
/// assert_eq!(p.headers().unwrap().value("host").unwrap(), b"x");
/// ```
pub struct Parser {
    cfg: Config,

    buf: Vec<u8>,
    committed: usize,
    parsed: usize,
    eof: bool,

    state: State,
    failure: Option<Error>,

    version: Option<Version>,
    method: Option<Range<usize>>,
    target: Option<Range<usize>>,
    status: Option<u16>,
    reason: Option<Range<usize>>,
    fields_start: usize,

    entries: Vec<Entry>,
    sem: Semantics,

    head_end: usize,
    framing: Option<Framing>,
    keep_alive: bool,
    upgrade: bool,
    headers: Option<Headers>,

    body_end: usize,
    body_read: usize,
    body_total: u64,
    remaining: u64,

    chunk_remaining: u64,
    chunk_crlf_due: bool,
    chunk_ext: Option<Range<usize>>,
    trailer_start: usize,
    trailers: Option<Headers>,
}

impl Parser {
    /// A parser for request messages, default configuration.
    pub fn request() -> Parser {
        Self::with_config(Config::default())
    }

    /// A parser for response messages, default configuration.
    pub fn response() -> Parser {
        Self::with_config(Config {
            variant: Variant::Response,
            ..Config::default()
        })
    }

    /// A parser with explicit configuration.
    pub fn with_config(cfg: Config) -> Parser {
        Parser {
            cfg,
            buf: Vec::new(),
            committed: 0,
            parsed: 0,
            eof: false,
            state: State::NothingYet,
            failure: None,
            version: None,
            method: None,
            target: None,
            status: None,
            reason: None,
            fields_start: 0,
            entries: Vec::new(),
            sem: Semantics::default(),
            head_end: 0,
            framing: None,
            keep_alive: false,
            upgrade: false,
            headers: None,
            body_end: 0,
            body_read: 0,
            body_total: 0,
            remaining: 0,
            chunk_remaining: 0,
            chunk_crlf_due: false,
            chunk_ext: None,
            trailer_start: 0,
            trailers: None,
        }
    }

    // ---- input side -----------------------------------------------------

    /// A writable region at the tail of the input buffer, at least one
    /// byte long. Growing relocates the buffer; spans handed out earlier
    /// as slices are invalidated, internal offsets are not.
    pub fn prepare(&mut self) -> &mut [u8] {
        if self.committed == self.buf.len() {
            let grown = self.buf.len() + GROW;
            self.buf.resize(grown, 0);
        }
        &mut self.buf[self.committed..]
    }

    /// Declare `n` bytes of the prepared region filled. `commit(0)` is a
    /// no-op. Committing more than the prepared region, or committing
    /// after [`commit_eof`][Parser::commit_eof], is
    /// [`Error::InvalidArgument`].
    pub fn commit(&mut self, n: usize) -> Result<()> {
        if self.eof || n > self.buf.len() - self.committed {
            return Err(Error::InvalidArgument);
        }
        self.committed += n;
        Ok(())
    }

    /// Mark the input stream as ended. An operation that still needs
    /// input afterwards fails with [`Error::Incomplete`].
    pub fn commit_eof(&mut self) {
        self.eof = true;
    }

    // ---- header parsing -------------------------------------------------

    /// Parse the start-line and field block.
    ///
    /// Once this returns [`Status::Complete`] the header container and the
    /// framing summary accessors are available, and the parser is
    /// positioned at the first body byte. Calling it again afterwards is a
    /// no-op reporting `Complete`.
    pub fn parse_header(&mut self) -> Result<Status> {
        if let Some(e) = self.failure {
            return Err(e);
        }
        loop {
            match self.state {
                State::NothingYet => {
                    if self.committed == 0 {
                        if self.eof {
                            return Err(self.fail(Error::Incomplete));
                        }
                        return Ok(Status::NeedMore);
                    }
                    self.state = State::StartLine;
                }
                State::StartLine => match self.parse_start_line() {
                    Err(e) => return Err(self.fail(e)),
                    Ok(None) => return self.need_more_header(),
                    Ok(Some(next)) => {
                        self.parsed = next;
                        self.fields_start = next;
                        self.state = State::Fields;
                    }
                },
                State::Fields => match self.step_field() {
                    Err(e) => return Err(self.fail(e)),
                    Ok(Advance::NeedMore) => return self.need_more_header(),
                    Ok(Advance::Moved) => {}
                    Ok(Advance::Done) => {
                        if let Err(e) = self.finish_header() {
                            return Err(self.fail(e));
                        }
                        return Ok(Status::Complete);
                    }
                },
                _ => return Ok(Status::Complete),
            }
        }
    }

    fn parse_start_line(&mut self) -> Result<Option<usize>> {
        let buf = &self.buf[..self.committed];
        match self.cfg.variant {
            Variant::Request => {
                let Some(line) = parse_request_line(buf, 0)? else {
                    return Ok(None);
                };
                trace!(
                    "request line: {} {} HTTP/1.{}",
                    String::from_utf8_lossy(&buf[line.method.clone()]),
                    String::from_utf8_lossy(&buf[line.target.clone()]),
                    line.version.minor()
                );
                self.method = Some(line.method);
                self.target = Some(line.target);
                self.version = Some(line.version);
                Ok(Some(line.next))
            }
            Variant::Response => {
                let Some(line) = parse_status_line(buf, 0)? else {
                    return Ok(None);
                };
                trace!("status line: HTTP/1.{} {}", line.version.minor(), line.status);
                self.version = Some(line.version);
                self.status = Some(line.status);
                self.reason = Some(line.reason);
                Ok(Some(line.next))
            }
        }
    }

    /// Parse one field line or the blank line ending the block.
    fn step_field(&mut self) -> Result<Advance> {
        if self.committed > self.parsed && self.buf[self.parsed] == b'\r' {
            if self.committed - self.parsed < 2 {
                return Ok(Advance::NeedMore);
            }
            if self.buf[self.parsed + 1] != b'\n' {
                return Err(Error::BadLineEnding);
            }
            self.parsed += 2;
            if self.parsed > self.cfg.header_limit {
                return Err(Error::HeaderLimit);
            }
            self.head_end = self.parsed;
            return Ok(Advance::Done);
        }
        if self.committed == self.parsed {
            return Ok(Advance::NeedMore);
        }

        let committed = self.committed;
        match parse_field_line(&mut self.buf[..committed], self.parsed)? {
            None => Ok(Advance::NeedMore),
            Some(fl) => {
                if fl.next > self.cfg.header_limit {
                    return Err(Error::HeaderLimit);
                }
                let id = FieldId::from_name(&self.buf[fl.name.clone()]);
                apply_field(&mut self.sem, id, &self.buf[fl.value.clone()])?;
                self.entries.push(entry(id, fl.name, fl.value));
                self.parsed = fl.next;
                Ok(Advance::Moved)
            }
        }
    }

    /// Decide framing, connection disposition and the header container.
    fn finish_header(&mut self) -> Result<()> {
        if self.sem.te_present && self.sem.content_length.is_some() {
            // Transfer-Encoding wins per RFC 7230, but the framing is
            // ambiguous enough to smuggle requests. Reject.
            return Err(Error::BadMessage);
        }

        let framing = match self.cfg.variant {
            Variant::Request => {
                if self.sem.chunked {
                    Framing::Chunked
                } else {
                    Framing::Length(self.sem.content_length.unwrap_or(0))
                }
            }
            Variant::Response => {
                let status = self.status.unwrap_or(0);
                if matches!(status, 100..=199 | 204 | 304) {
                    // These responses never carry a body, whatever the
                    // fields declare.
                    Framing::Length(0)
                } else if self.sem.chunked {
                    Framing::Chunked
                } else if let Some(n) = self.sem.content_length {
                    Framing::Length(n)
                } else {
                    Framing::UntilEof
                }
            }
        };

        self.keep_alive = match self.version.unwrap_or(Version::Http11) {
            Version::Http11 => !self.sem.saw_close,
            Version::Http10 => self.sem.saw_keep_alive && !self.sem.saw_close,
        };
        if framing == Framing::UntilEof {
            // The connection close is the framing.
            self.keep_alive = false;
        }
        self.upgrade = self.sem.saw_upgrade_token || self.sem.upgrade_field;

        if let (Framing::Length(n), Some(limit)) = (framing, self.cfg.body_limit) {
            if n > limit {
                return Err(Error::BodyLimit);
            }
        }

        let head = self.buf[..self.head_end].to_vec();
        let entries = core::mem::take(&mut self.entries);
        self.headers = Some(Headers::from_parsed(
            head,
            self.fields_start,
            entries,
            self.cfg.validate_field_characters,
        ));

        self.body_end = self.head_end;
        self.body_read = self.head_end;

        self.state = match framing {
            Framing::Chunked => State::ChunkHeader,
            Framing::Length(0) => State::Complete,
            Framing::Length(n) => {
                self.remaining = n;
                State::Body
            }
            Framing::UntilEof => State::Body,
        };
        self.framing = Some(framing);
        trace!("headers complete: {:?} keep_alive={}", framing, self.keep_alive);
        Ok(())
    }

    // ---- body parsing ---------------------------------------------------

    /// Decode and aggregate body bytes inside the parser buffer.
    ///
    /// For chunked framing the chunk data is compacted in place over the
    /// framing bytes, so [`body`][Parser::body] is one contiguous run.
    /// Drives header parsing first if that has not finished.
    pub fn parse_body(&mut self) -> Result<Status> {
        if let Some(e) = self.failure {
            return Err(e);
        }
        if self.in_header_phase() && !self.parse_header()?.is_complete() {
            return Ok(Status::NeedMore);
        }
        loop {
            match self.state {
                State::Complete => return Ok(Status::Complete),
                State::Body => {
                    let framing = self.framing.expect("framing decided with headers");
                    let avail = (self.committed - self.parsed) as u64;
                    let take = match framing {
                        Framing::Length(_) => avail.min(self.remaining),
                        _ => avail,
                    } as usize;

                    if let Err(e) = self.ingest_body(take) {
                        return Err(self.fail(e));
                    }
                    if let Framing::Length(_) = framing {
                        self.remaining -= take as u64;
                        if self.remaining == 0 {
                            self.state = State::Complete;
                            trace!("body complete: {} bytes", self.body_total);
                            continue;
                        }
                    } else if self.eof && self.parsed == self.committed {
                        self.state = State::Complete;
                        trace!("body complete at eof: {} bytes", self.body_total);
                        continue;
                    }
                    return self.need_more_body();
                }
                State::ChunkHeader => match self.step_chunk_header() {
                    Err(e) => return Err(self.fail(e)),
                    Ok(Advance::NeedMore) => return self.need_more_body(),
                    Ok(_) => {}
                },
                State::ChunkBody => {
                    let avail = (self.committed - self.parsed) as u64;
                    let take = avail.min(self.chunk_remaining) as usize;
                    if let Err(e) = self.ingest_body(take) {
                        return Err(self.fail(e));
                    }
                    self.chunk_remaining -= take as u64;
                    if self.chunk_remaining == 0 {
                        self.chunk_crlf_due = true;
                        self.state = State::ChunkHeader;
                        continue;
                    }
                    return self.need_more_body();
                }
                State::ChunkTrailer => match self.step_trailer() {
                    Err(e) => return Err(self.fail(e)),
                    Ok(Advance::NeedMore) => return self.need_more_body(),
                    Ok(_) => {}
                },
                _ => return Err(Error::InvalidArgument),
            }
        }
    }

    /// Hand out the next run of decoded body bytes without copying.
    ///
    /// Bytes already aggregated by [`parse_body`][Parser::parse_body] and
    /// not yet observed through [`body`][Parser::body] are yielded first.
    pub fn parse_body_part(&mut self) -> Result<BodyPart<'_>> {
        if let Some(e) = self.failure {
            return Err(e);
        }
        if self.in_header_phase() && !self.parse_header()?.is_complete() {
            return Ok(BodyPart::empty());
        }

        if self.body_read < self.body_end {
            let r = self.body_read..self.body_end;
            self.body_read = self.body_end;
            let finished = matches!(self.state, State::Complete | State::ChunkTrailer);
            return Ok(BodyPart {
                data: &self.buf[r],
                finished,
            });
        }

        loop {
            match self.state {
                State::Complete => {
                    return Ok(BodyPart {
                        data: &[],
                        finished: true,
                    })
                }
                State::Body => {
                    let framing = self.framing.expect("framing decided with headers");
                    let avail = (self.committed - self.parsed) as u64;
                    let take = match framing {
                        Framing::Length(_) => avail.min(self.remaining),
                        _ => avail,
                    } as usize;

                    if take == 0 {
                        if self.eof {
                            if framing == Framing::UntilEof {
                                self.state = State::Complete;
                                continue;
                            }
                            return Err(self.fail(Error::Incomplete));
                        }
                        return Ok(BodyPart::empty());
                    }

                    let start = self.parsed;
                    self.parsed += take;
                    self.body_total += take as u64;
                    if let Some(limit) = self.cfg.body_limit {
                        if self.body_total > limit {
                            return Err(self.fail(Error::BodyLimit));
                        }
                    }
                    let finished = match framing {
                        Framing::Length(_) => {
                            self.remaining -= take as u64;
                            if self.remaining == 0 {
                                self.state = State::Complete;
                            }
                            self.state == State::Complete
                        }
                        _ => {
                            if self.eof && self.parsed == self.committed {
                                self.state = State::Complete;
                            }
                            self.state == State::Complete
                        }
                    };
                    return Ok(BodyPart {
                        data: &self.buf[start..start + take],
                        finished,
                    });
                }
                State::ChunkHeader => match self.step_chunk_header() {
                    Err(e) => return Err(self.fail(e)),
                    Ok(Advance::NeedMore) => {
                        if self.eof {
                            return Err(self.fail(Error::Incomplete));
                        }
                        return Ok(BodyPart::empty());
                    }
                    Ok(_) => {}
                },
                State::ChunkBody => {
                    let avail = (self.committed - self.parsed) as u64;
                    let take = avail.min(self.chunk_remaining) as usize;
                    if take == 0 {
                        if self.eof {
                            return Err(self.fail(Error::Incomplete));
                        }
                        return Ok(BodyPart::empty());
                    }
                    let start = self.parsed;
                    self.parsed += take;
                    self.chunk_remaining -= take as u64;
                    self.body_total += take as u64;
                    if let Some(limit) = self.cfg.body_limit {
                        if self.body_total > limit {
                            return Err(self.fail(Error::BodyLimit));
                        }
                    }
                    if self.chunk_remaining == 0 {
                        self.chunk_crlf_due = true;
                        self.state = State::ChunkHeader;
                    }
                    return Ok(BodyPart {
                        data: &self.buf[start..start + take],
                        finished: false,
                    });
                }
                State::ChunkTrailer => match self.step_trailer() {
                    Err(e) => return Err(self.fail(e)),
                    Ok(Advance::NeedMore) => {
                        if self.eof {
                            return Err(self.fail(Error::Incomplete));
                        }
                        return Ok(BodyPart::empty());
                    }
                    Ok(_) => {}
                },
                _ => return Err(Error::InvalidArgument),
            }
        }
    }

    // ---- chunk-level operations ----------------------------------------

    /// Consume the current chunk-size line, making
    /// [`chunk_ext`][Parser::chunk_ext] available.
    ///
    /// Only legal once framing is chunked; [`Error::InvalidArgument`]
    /// otherwise. Reports `Complete` when the line (and the CRLF closing
    /// the previous chunk) has been consumed, or immediately when the
    /// parser is already past it.
    pub fn parse_chunk_ext(&mut self) -> Result<Status> {
        if let Some(e) = self.failure {
            return Err(e);
        }
        match self.state {
            State::ChunkHeader => match self.step_chunk_header() {
                Err(e) => Err(self.fail(e)),
                Ok(Advance::NeedMore) => self.need_more_body(),
                Ok(_) => Ok(Status::Complete),
            },
            State::ChunkBody | State::ChunkTrailer | State::Complete => Ok(Status::Complete),
            _ => Err(Error::InvalidArgument),
        }
    }

    /// Extension text of the current chunk, verbatim including the leading
    /// `;`, empty when the chunk had none. `None` before the first
    /// chunk-size line.
    pub fn chunk_ext(&self) -> Option<&[u8]> {
        self.chunk_ext.as_ref().map(|r| &self.buf[r.clone()])
    }

    /// Hand out available bytes of the current chunk's data without
    /// copying. A finished part means the final (size zero) chunk has been
    /// reached and the trailer follows.
    pub fn parse_chunk_part(&mut self) -> Result<BodyPart<'_>> {
        if let Some(e) = self.failure {
            return Err(e);
        }
        loop {
            match self.state {
                State::ChunkHeader => match self.step_chunk_header() {
                    Err(e) => return Err(self.fail(e)),
                    Ok(Advance::NeedMore) => {
                        if self.eof {
                            return Err(self.fail(Error::Incomplete));
                        }
                        return Ok(BodyPart::empty());
                    }
                    Ok(_) => {}
                },
                State::ChunkBody => {
                    let avail = (self.committed - self.parsed) as u64;
                    let take = avail.min(self.chunk_remaining) as usize;
                    if take == 0 {
                        if self.eof {
                            return Err(self.fail(Error::Incomplete));
                        }
                        return Ok(BodyPart::empty());
                    }
                    let start = self.parsed;
                    self.parsed += take;
                    self.chunk_remaining -= take as u64;
                    self.body_total += take as u64;
                    if let Some(limit) = self.cfg.body_limit {
                        if self.body_total > limit {
                            return Err(self.fail(Error::BodyLimit));
                        }
                    }
                    if self.chunk_remaining == 0 {
                        self.chunk_crlf_due = true;
                        self.state = State::ChunkHeader;
                    }
                    return Ok(BodyPart {
                        data: &self.buf[start..start + take],
                        finished: false,
                    });
                }
                State::ChunkTrailer | State::Complete => {
                    return Ok(BodyPart {
                        data: &[],
                        finished: true,
                    })
                }
                _ => return Err(Error::InvalidArgument),
            }
        }
    }

    /// Parse the trailer fields after the final chunk into the
    /// [`trailers`][Parser::trailers] container. Reports `Complete` once
    /// the trailer CRLF has been consumed; the message is then complete.
    pub fn parse_chunk_trailer(&mut self) -> Result<Status> {
        if let Some(e) = self.failure {
            return Err(e);
        }
        loop {
            match self.state {
                State::ChunkTrailer => match self.step_trailer() {
                    Err(e) => return Err(self.fail(e)),
                    Ok(Advance::NeedMore) => return self.need_more_body(),
                    Ok(_) => {}
                },
                State::Complete => return Ok(Status::Complete),
                _ => return Err(Error::InvalidArgument),
            }
        }
    }

    // ---- internal steps -------------------------------------------------

    fn step_chunk_header(&mut self) -> Result<Advance> {
        if self.chunk_crlf_due {
            match parse_chunk_crlf(&self.buf[..self.committed], self.parsed)? {
                None => return Ok(Advance::NeedMore),
                Some(next) => {
                    self.parsed = next;
                    self.chunk_crlf_due = false;
                }
            }
        }
        match parse_chunk_header(&self.buf[..self.committed], self.parsed)? {
            None => Ok(Advance::NeedMore),
            Some(h) => {
                trace!("chunk header: size={}", h.size);
                self.chunk_ext = Some(h.ext.clone());
                self.parsed = h.next;
                if h.size == 0 {
                    self.trailer_start = self.parsed;
                    self.state = State::ChunkTrailer;
                } else {
                    self.chunk_remaining = h.size;
                    self.state = State::ChunkBody;
                }
                Ok(Advance::Moved)
            }
        }
    }

    fn step_trailer(&mut self) -> Result<Advance> {
        if self.committed > self.parsed && self.buf[self.parsed] == b'\r' {
            if self.committed - self.parsed < 2 {
                return Ok(Advance::NeedMore);
            }
            if self.buf[self.parsed + 1] != b'\n' {
                return Err(Error::BadLineEnding);
            }
            self.parsed += 2;
            if self.parsed - self.trailer_start > self.cfg.header_limit {
                return Err(Error::HeaderLimit);
            }
            self.finish_trailer();
            self.state = State::Complete;
            return Ok(Advance::Done);
        }
        if self.committed == self.parsed {
            return Ok(Advance::NeedMore);
        }

        let committed = self.committed;
        match parse_field_line(&mut self.buf[..committed], self.parsed)? {
            None => {
                if self.committed - self.trailer_start >= self.cfg.header_limit {
                    return Err(Error::HeaderLimit);
                }
                Ok(Advance::NeedMore)
            }
            Some(fl) => {
                if fl.next - self.trailer_start > self.cfg.header_limit {
                    return Err(Error::HeaderLimit);
                }
                let id = FieldId::from_name(&self.buf[fl.name.clone()]);
                self.entries.push(entry(id, fl.name, fl.value));
                self.parsed = fl.next;
                Ok(Advance::Moved)
            }
        }
    }

    fn finish_trailer(&mut self) {
        let start = self.trailer_start;
        let buf = self.buf[start..self.parsed].to_vec();
        let mut entries = core::mem::take(&mut self.entries);
        for e in &mut entries {
            e.name.off -= start;
            e.value.off -= start;
        }
        self.trailers = Some(Headers::from_parsed(
            buf,
            0,
            entries,
            self.cfg.validate_field_characters,
        ));
        trace!("message complete: {} trailer fields", self.trailers.as_ref().map(|t| t.len()).unwrap_or(0));
    }

    /// Move `n` decoded body bytes down to the end of the aggregated body
    /// region. With no framing bytes in between this is a no-op advance.
    fn ingest_body(&mut self, n: usize) -> Result<()> {
        if n == 0 {
            return Ok(());
        }
        self.buf.copy_within(self.parsed..self.parsed + n, self.body_end);
        self.parsed += n;
        self.body_end += n;
        self.body_total += n as u64;
        if let Some(limit) = self.cfg.body_limit {
            if self.body_total > limit {
                return Err(Error::BodyLimit);
            }
        }
        Ok(())
    }

    fn in_header_phase(&self) -> bool {
        matches!(
            self.state,
            State::NothingYet | State::StartLine | State::Fields
        )
    }

    fn need_more_header(&mut self) -> Result<Status> {
        // Everything committed so far is part of the unfinished header
        // block, and at least one more byte is required to finish it.
        if self.committed >= self.cfg.header_limit {
            return Err(self.fail(Error::HeaderLimit));
        }
        if self.eof {
            return Err(self.fail(Error::Incomplete));
        }
        Ok(Status::NeedMore)
    }

    fn need_more_body(&mut self) -> Result<Status> {
        if self.eof {
            return Err(self.fail(Error::Incomplete));
        }
        Ok(Status::NeedMore)
    }

    fn fail(&mut self, e: Error) -> Error {
        self.failure = Some(e);
        self.state = State::Failed;
        e
    }

    // ---- observers ------------------------------------------------------

    /// The header container, once [`parse_header`][Parser::parse_header]
    /// has completed.
    pub fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    /// Detach the header container as an independent value.
    pub fn take_headers(&mut self) -> Option<Headers> {
        self.headers.take()
    }

    /// The trailer container, once a chunked message has completed.
    /// Present and empty when the trailer had no fields.
    pub fn trailers(&self) -> Option<&Headers> {
        self.trailers.as_ref()
    }

    /// Detach the trailer container as an independent value.
    pub fn take_trailers(&mut self) -> Option<Headers> {
        self.trailers.take()
    }

    /// Aggregated body bytes not yet handed out through
    /// [`parse_body_part`][Parser::parse_body_part]. Empty when the body
    /// was streamed.
    pub fn body(&self) -> &[u8] {
        &self.buf[self.body_read..self.body_end]
    }

    /// HTTP version from the start-line.
    pub fn version(&self) -> Option<Version> {
        self.version
    }

    /// Request method (request variant).
    pub fn method(&self) -> Option<&str> {
        self.method
            .as_ref()
            .map(|r| core::str::from_utf8(&self.buf[r.clone()]).expect("method is a token"))
    }

    /// Request-target bytes, verbatim (request variant).
    pub fn target(&self) -> Option<&[u8]> {
        self.target.as_ref().map(|r| &self.buf[r.clone()])
    }

    /// Status code (response variant).
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Reason-phrase bytes, verbatim (response variant).
    pub fn reason(&self) -> Option<&[u8]> {
        self.reason.as_ref().map(|r| &self.buf[r.clone()])
    }

    /// Connection disposition after the header block: `true` to keep the
    /// connection open for another message.
    pub fn is_keep_alive(&self) -> bool {
        self.keep_alive
    }

    /// Whether the message asks for a protocol upgrade.
    pub fn is_upgrade(&self) -> bool {
        self.upgrade
    }

    /// Whether body framing is chunked.
    pub fn is_chunked(&self) -> bool {
        self.framing == Some(Framing::Chunked)
    }

    /// The declared Content-Length, if any.
    pub fn content_length(&self) -> Option<u64> {
        self.sem.content_length
    }

    /// Whether the message has a body (possibly empty only for a
    /// close-delimited response).
    pub fn has_body(&self) -> bool {
        !matches!(self.framing, None | Some(Framing::Length(0)))
    }

    /// Whether the whole message has been parsed.
    pub fn is_complete(&self) -> bool {
        self.state == State::Complete
    }

    /// Return to the initial state, retaining buffer capacity. No state
    /// leaks across messages.
    pub fn reset(&mut self) {
        self.committed = 0;
        self.parsed = 0;
        self.eof = false;
        self.state = State::NothingYet;
        self.failure = None;
        self.version = None;
        self.method = None;
        self.target = None;
        self.status = None;
        self.reason = None;
        self.fields_start = 0;
        self.entries.clear();
        self.sem = Semantics::default();
        self.head_end = 0;
        self.framing = None;
        self.keep_alive = false;
        self.upgrade = false;
        self.headers = None;
        self.trailers = None;
        self.body_end = 0;
        self.body_read = 0;
        self.body_total = 0;
        self.remaining = 0;
        self.chunk_remaining = 0;
        self.chunk_crlf_due = false;
        self.chunk_ext = None;
        self.trailer_start = 0;
    }
}

fn entry(id: FieldId, name: Range<usize>, value: Range<usize>) -> Entry {
    Entry {
        id,
        name: Span {
            off: name.start,
            len: name.end - name.start,
        },
        value: Span {
            off: value.start,
            len: value.end - value.start,
        },
    }
}

/// Per-field semantic dispatch. Only accumulates into `sem`; prior parser
/// state is never touched.
fn apply_field(sem: &mut Semantics, id: FieldId, value: &[u8]) -> Result<()> {
    match id {
        FieldId::Connection | FieldId::ProxyConnection => {
            for tok in bnf::list_items(value) {
                if tok.eq_ignore_ascii_case(b"close") {
                    sem.saw_close = true;
                } else if tok.eq_ignore_ascii_case(b"keep-alive") {
                    sem.saw_keep_alive = true;
                } else if tok.eq_ignore_ascii_case(b"upgrade") {
                    sem.saw_upgrade_token = true;
                }
            }
            Ok(())
        }
        FieldId::ContentLength => {
            let n = parse_content_length(value)?;
            match sem.content_length {
                Some(prev) if prev != n => Err(Error::BadContentLength),
                _ => {
                    sem.content_length = Some(n);
                    Ok(())
                }
            }
        }
        FieldId::TransferEncoding => {
            sem.te_present = true;
            for item in bnf::list_items(value) {
                if sem.chunked {
                    // A coding after chunked: chunked must be final.
                    return Err(Error::BadTransferEncoding);
                }
                let coding = item.split(|b| *b == b';').next().unwrap_or(item);
                if chars::trim_ows(coding).eq_ignore_ascii_case(b"chunked") {
                    sem.chunked = true;
                }
            }
            Ok(())
        }
        FieldId::Upgrade => {
            sem.upgrade_field = true;
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Unsigned decimal with no sign, no whitespace, no overflow.
fn parse_content_length(v: &[u8]) -> Result<u64> {
    if v.is_empty() {
        return Err(Error::BadContentLength);
    }
    let mut n: u64 = 0;
    for b in v {
        if !chars::is_digit(*b) {
            return Err(Error::BadContentLength);
        }
        n = n
            .checked_mul(10)
            .and_then(|n| n.checked_add((b - b'0') as u64))
            .ok_or(Error::BadContentLength)?;
    }
    Ok(n)
}

#[cfg(test)]
mod test {
    use super::*;

    fn deliver(p: &mut Parser, mut input: &[u8]) {
        while !input.is_empty() {
            let region = p.prepare();
            let n = region.len().min(input.len());
            region[..n].copy_from_slice(&input[..n]);
            p.commit(n).unwrap();
            input = &input[n..];
        }
    }

    fn request(input: &[u8]) -> Parser {
        let mut p = Parser::request();
        deliver(&mut p, input);
        p
    }

    fn response(input: &[u8]) -> Parser {
        let mut p = Parser::response();
        deliver(&mut p, input);
        p
    }

    #[test]
    fn minimal_get() {
        let mut p = request(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n");
        assert_eq!(p.parse_header().unwrap(), Status::Complete);
        assert_eq!(p.method(), Some("GET"));
        assert_eq!(p.target(), Some(b"/".as_ref()));
        assert_eq!(p.version(), Some(Version::Http11));
        assert!(p.is_keep_alive());
        assert!(!p.has_body());

        let h = p.headers().unwrap();
        assert_eq!(h.len(), 1);
        assert_eq!(h.value("Host").unwrap(), b"x");

        assert_eq!(p.parse_body().unwrap(), Status::Complete);
        assert!(p.is_complete());
        assert_eq!(p.body(), b"");
    }

    #[test]
    fn obs_fold_normalized() {
        let mut p = request(b"GET / HTTP/1.1\r\nX: a\r\n b\r\n\r\n");
        assert_eq!(p.parse_header().unwrap(), Status::Complete);
        assert_eq!(p.headers().unwrap().value("X").unwrap(), b"a   b");
    }

    const CHUNKED_RESPONSE: &[u8] =
        b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n";

    #[test]
    fn chunked_response() {
        let mut p = response(CHUNKED_RESPONSE);
        assert_eq!(p.parse_header().unwrap(), Status::Complete);
        assert_eq!(p.status(), Some(200));
        assert_eq!(p.reason(), Some(b"OK".as_ref()));
        assert!(p.is_chunked());
        assert!(p.has_body());

        assert_eq!(p.parse_body().unwrap(), Status::Complete);
        assert!(p.is_complete());
        assert_eq!(p.body(), b"Wikipedia");
        assert!(p.trailers().unwrap().is_empty());
    }

    #[test]
    fn conflicting_content_length() {
        let mut p = request(b"POST / HTTP/1.1\r\nContent-Length: 5\r\nContent-Length: 6\r\n\r\n");
        assert_eq!(p.parse_header(), Err(Error::BadContentLength));
        // Failed is terminal until reset.
        assert_eq!(p.parse_header(), Err(Error::BadContentLength));
        assert_eq!(p.parse_body(), Err(Error::BadContentLength));
    }

    #[test]
    fn identical_content_length_ok() {
        let mut p = request(b"POST / HTTP/1.1\r\nContent-Length: 5\r\nContent-Length: 5\r\n\r\nhello");
        assert_eq!(p.parse_header().unwrap(), Status::Complete);
        assert_eq!(p.content_length(), Some(5));
        assert_eq!(p.parse_body().unwrap(), Status::Complete);
        assert_eq!(p.body(), b"hello");
    }

    #[test]
    fn header_limit_at_boundary() {
        // Block layout: request line (16) + "X: " + payload + "\r\n\r\n".
        let line = b"GET / HTTP/1.1\r\n";
        let build = |payload: usize| {
            let mut v = line.to_vec();
            v.extend_from_slice(b"X: ");
            v.extend(core::iter::repeat(b'a').take(payload));
            v.extend_from_slice(b"\r\n\r\n");
            v
        };

        // Exactly 8192 is accepted.
        let exact = build(8192 - line.len() - 7);
        assert_eq!(exact.len(), 8192);
        let mut p = request(&exact);
        assert_eq!(p.parse_header().unwrap(), Status::Complete);

        // One more byte is not.
        let over = build(8192 - line.len() - 6);
        let mut p = request(&over);
        assert_eq!(p.parse_header(), Err(Error::HeaderLimit));
    }

    #[test]
    fn byte_by_byte_equals_one_shot() {
        let mut whole = Parser::response();
        deliver(&mut whole, CHUNKED_RESPONSE);
        whole.parse_header().unwrap();
        whole.parse_body().unwrap();

        let mut p = Parser::response();
        for b in CHUNKED_RESPONSE {
            let region = p.prepare();
            region[0] = *b;
            p.commit(1).unwrap();
            p.parse_header().unwrap();
            p.parse_body().unwrap();
        }
        assert!(p.is_complete());
        assert_eq!(p.body(), b"Wikipedia");
        assert_eq!(p.headers().unwrap(), whole.headers().unwrap());
    }

    #[test]
    fn byte_by_byte_with_folds() {
        let input = b"GET /p%20q HTTP/1.1\r\nHost: h\r\nX: a\r\n \r\n\r\n";
        // This one is malformed (fold into line ending) and must fail the
        // same way regardless of partitioning.
        let mut whole = Parser::request();
        deliver(&mut whole, input);
        let one_shot = whole.parse_header();

        let mut p = Parser::request();
        let mut dripped = Ok(Status::NeedMore);
        for b in input.iter() {
            let region = p.prepare();
            region[0] = *b;
            p.commit(1).unwrap();
            dripped = p.parse_header();
            if dripped.is_err() {
                break;
            }
        }
        assert_eq!(one_shot, Err(Error::BadValue));
        assert_eq!(dripped, one_shot);
    }

    #[test]
    fn round_trip_header_container() {
        let mut p = request(b"GET /a/b?c=d HTTP/1.1\r\nHost: h\r\nSet-Cookie: a=1\r\nset-cookie: b=2\r\n\r\n");
        p.parse_header().unwrap();
        let h = p.take_headers().unwrap();
        assert!(p.headers().is_none());

        let mut again = Parser::request();
        deliver(&mut again, h.as_bytes());
        again.parse_header().unwrap();
        assert_eq!(again.headers().unwrap(), &h);
    }

    #[test]
    fn content_length_body() {
        let mut p = request(b"POST /submit HTTP/1.1\r\nContent-Length: 11\r\n\r\nhello world");
        assert_eq!(p.parse_header().unwrap(), Status::Complete);
        assert!(p.has_body());
        assert!(!p.is_chunked());
        assert_eq!(p.parse_body().unwrap(), Status::Complete);
        assert_eq!(p.body(), b"hello world");
    }

    #[test]
    fn content_length_split_body() {
        let mut p = request(b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nhello");
        assert_eq!(p.parse_header().unwrap(), Status::Complete);
        assert_eq!(p.parse_body().unwrap(), Status::NeedMore);
        deliver(&mut p, b"world");
        assert_eq!(p.parse_body().unwrap(), Status::Complete);
        assert_eq!(p.body(), b"helloworld");
    }

    #[test]
    fn malformed_content_length() {
        for v in [&b"+5"[..], b"-5", b"5 5", b"0x5", b""] {
            let mut input = b"POST / HTTP/1.1\r\nContent-Length: ".to_vec();
            input.extend_from_slice(v);
            input.extend_from_slice(b"\r\n\r\n");
            let mut p = request(&input);
            assert_eq!(p.parse_header(), Err(Error::BadContentLength), "value {:?}", v);
        }
    }

    #[test]
    fn content_length_overflow() {
        let mut p = request(b"POST / HTTP/1.1\r\nContent-Length: 99999999999999999999\r\n\r\n");
        assert_eq!(p.parse_header(), Err(Error::BadContentLength));
    }

    #[test]
    fn transfer_encoding_with_content_length() {
        let mut p = request(
            b"POST / HTTP/1.1\r\nContent-Length: 5\r\nTransfer-Encoding: chunked\r\n\r\n",
        );
        assert_eq!(p.parse_header(), Err(Error::BadMessage));
    }

    #[test]
    fn chunked_must_be_final() {
        let mut p = request(b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked, gzip\r\n\r\n");
        assert_eq!(p.parse_header(), Err(Error::BadTransferEncoding));

        // Also across repeated fields.
        let mut p = request(
            b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\nTransfer-Encoding: gzip\r\n\r\n",
        );
        assert_eq!(p.parse_header(), Err(Error::BadTransferEncoding));
    }

    #[test]
    fn chunked_after_other_codings() {
        let mut p = request(b"POST / HTTP/1.1\r\nTransfer-Encoding: gzip, chunked\r\n\r\n0\r\n\r\n");
        assert_eq!(p.parse_header().unwrap(), Status::Complete);
        assert!(p.is_chunked());
        assert_eq!(p.parse_body().unwrap(), Status::Complete);
        assert_eq!(p.body(), b"");
    }

    #[test]
    fn unknown_codings_pass_through() {
        let mut p = request(b"POST / HTTP/1.1\r\nTransfer-Encoding: frobnicate\r\n\r\n");
        assert_eq!(p.parse_header().unwrap(), Status::Complete);
        assert!(!p.is_chunked());
        assert_eq!(
            p.headers().unwrap().value(FieldId::TransferEncoding).unwrap(),
            b"frobnicate"
        );
    }

    #[test]
    fn keep_alive_defaults() {
        let mut p = request(b"GET / HTTP/1.1\r\nHost: h\r\n\r\n");
        p.parse_header().unwrap();
        assert!(p.is_keep_alive());

        let mut p = request(b"GET / HTTP/1.1\r\nConnection: close\r\n\r\n");
        p.parse_header().unwrap();
        assert!(!p.is_keep_alive());

        let mut p = request(b"GET / HTTP/1.0\r\n\r\n");
        p.parse_header().unwrap();
        assert!(!p.is_keep_alive());

        let mut p = request(b"GET / HTTP/1.0\r\nConnection: keep-alive\r\n\r\n");
        p.parse_header().unwrap();
        assert!(p.is_keep_alive());

        let mut p = request(b"GET / HTTP/1.0\r\nConnection: keep-alive, close\r\n\r\n");
        p.parse_header().unwrap();
        assert!(!p.is_keep_alive());

        // Proxy-Connection is honored the same way.
        let mut p = request(b"GET / HTTP/1.1\r\nProxy-Connection: close\r\n\r\n");
        p.parse_header().unwrap();
        assert!(!p.is_keep_alive());
    }

    #[test]
    fn upgrade_detected() {
        let mut p = request(
            b"GET /chat HTTP/1.1\r\nConnection: Upgrade\r\nUpgrade: websocket\r\n\r\n",
        );
        p.parse_header().unwrap();
        assert!(p.is_upgrade());
        assert_eq!(p.headers().unwrap().value(FieldId::Upgrade).unwrap(), b"websocket");

        let mut p = request(b"GET / HTTP/1.1\r\nHost: h\r\n\r\n");
        p.parse_header().unwrap();
        assert!(!p.is_upgrade());
    }

    #[test]
    fn close_delimited_response() {
        let mut p = response(b"HTTP/1.1 200 OK\r\n\r\nhello");
        assert_eq!(p.parse_header().unwrap(), Status::Complete);
        assert!(p.has_body());
        assert!(!p.is_keep_alive());
        assert_eq!(p.parse_body().unwrap(), Status::NeedMore);
        deliver(&mut p, b" world");
        p.commit_eof();
        assert_eq!(p.parse_body().unwrap(), Status::Complete);
        assert_eq!(p.body(), b"hello world");
    }

    #[test]
    fn no_body_statuses() {
        for status in [b"204 No Content".as_ref(), b"304 Not Modified", b"100 Continue"] {
            let mut input = b"HTTP/1.1 ".to_vec();
            input.extend_from_slice(status);
            input.extend_from_slice(b"\r\nContent-Length: 10\r\n\r\n");
            let mut p = response(&input);
            assert_eq!(p.parse_header().unwrap(), Status::Complete);
            assert!(!p.has_body());
            assert_eq!(p.content_length(), Some(10));
            assert_eq!(p.parse_body().unwrap(), Status::Complete);
            assert_eq!(p.body(), b"");
        }
    }

    #[test]
    fn request_without_framing_has_no_body() {
        let mut p = request(b"GET / HTTP/1.1\r\nHost: h\r\n\r\n");
        p.parse_header().unwrap();
        assert!(!p.has_body());
        assert!(p.is_complete());
    }

    #[test]
    fn eof_mid_message_is_incomplete() {
        let mut p = request(b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nhel");
        p.parse_header().unwrap();
        p.commit_eof();
        assert_eq!(p.parse_body(), Err(Error::Incomplete));

        let mut p = request(b"GET / HTTP/1.1\r\nHost");
        p.commit_eof();
        assert_eq!(p.parse_header(), Err(Error::Incomplete));

        let mut p = response(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWi");
        p.parse_header().unwrap();
        p.commit_eof();
        assert_eq!(p.parse_body(), Err(Error::Incomplete));
    }

    #[test]
    fn body_limit_from_content_length() {
        let mut p = Parser::with_config(Config {
            body_limit: Some(4),
            ..Config::default()
        });
        deliver(&mut p, b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello");
        assert_eq!(p.parse_header(), Err(Error::BodyLimit));
    }

    #[test]
    fn body_limit_on_chunked() {
        let mut p = Parser::with_config(Config {
            variant: Variant::Response,
            body_limit: Some(6),
            ..Config::default()
        });
        deliver(&mut p, CHUNKED_RESPONSE);
        p.parse_header().unwrap();
        assert_eq!(p.parse_body(), Err(Error::BodyLimit));
    }

    #[test]
    fn streamed_body_parts() {
        let mut p = request(b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nhello");
        p.parse_header().unwrap();

        let part = p.parse_body_part().unwrap();
        assert_eq!(part.data(), b"hello");
        assert!(!part.is_finished());

        let part = p.parse_body_part().unwrap();
        assert!(part.is_empty());
        assert!(!part.is_finished());

        deliver(&mut p, b"world");
        let part = p.parse_body_part().unwrap();
        assert_eq!(part.data(), b"world");
        assert!(part.is_finished());

        // Streamed bytes are not aggregated.
        assert_eq!(p.body(), b"");
        assert!(p.is_complete());
    }

    #[test]
    fn streamed_chunked_parts() {
        let mut p = response(CHUNKED_RESPONSE);
        p.parse_header().unwrap();

        let mut out = Vec::new();
        loop {
            let part = p.parse_body_part().unwrap();
            out.extend_from_slice(part.data());
            if part.is_finished() {
                break;
            }
        }
        assert_eq!(out, b"Wikipedia");
        assert!(p.is_complete());
        assert_eq!(p.body(), b"");
    }

    #[test]
    fn aggregated_then_streamed() {
        let mut p = request(b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nhello");
        p.parse_header().unwrap();
        p.parse_body().unwrap();
        assert_eq!(p.body(), b"hello");

        // parse_body_part yields what parse_body aggregated first.
        let part = p.parse_body_part().unwrap();
        assert_eq!(part.data(), b"hello");
        assert_eq!(p.body(), b"");

        deliver(&mut p, b"world");
        let part = p.parse_body_part().unwrap();
        assert_eq!(part.data(), b"world");
        assert!(part.is_finished());
    }

    #[test]
    fn chunk_level_operations() {
        let mut p = response(
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4;voice=\"alto\"\r\nWiki\r\n0\r\nExpires: never\r\n\r\n",
        );
        p.parse_header().unwrap();

        assert_eq!(p.parse_chunk_ext().unwrap(), Status::Complete);
        assert_eq!(p.chunk_ext(), Some(b";voice=\"alto\"".as_ref()));

        let part = p.parse_chunk_part().unwrap();
        assert_eq!(part.data(), b"Wiki");
        assert!(!part.is_finished());

        let part = p.parse_chunk_part().unwrap();
        assert!(part.is_finished());
        assert_eq!(p.chunk_ext(), Some(b"".as_ref()));

        assert_eq!(p.parse_chunk_trailer().unwrap(), Status::Complete);
        assert!(p.is_complete());
        let t = p.trailers().unwrap();
        assert_eq!(t.value("expires").unwrap(), b"never");
    }

    #[test]
    fn chunk_operations_wrong_phase() {
        let mut p = request(b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello");
        p.parse_header().unwrap();
        assert_eq!(p.parse_chunk_ext(), Err(Error::InvalidArgument));
        assert_eq!(p.parse_chunk_trailer(), Err(Error::InvalidArgument));
        // Misuse does not poison the parser.
        assert_eq!(p.parse_body().unwrap(), Status::Complete);
    }

    #[test]
    fn bad_chunk_framing() {
        let mut p = response(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nzz\r\n");
        p.parse_header().unwrap();
        assert_eq!(p.parse_body(), Err(Error::BadChunk));

        // Data not followed by CRLF.
        let mut p = response(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWikiX\r\n");
        p.parse_header().unwrap();
        assert_eq!(p.parse_body(), Err(Error::BadChunk));
    }

    #[test]
    fn trailer_fields_parsed_with_field_grammar() {
        let mut p = response(
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n0\r\nX-Sum: abc\r\n def\r\n\r\n",
        );
        p.parse_header().unwrap();
        assert_eq!(p.parse_body().unwrap(), Status::Complete);
        // Obs-fold normalization applies in trailers too.
        assert_eq!(p.trailers().unwrap().value("X-Sum").unwrap(), b"abc   def");
    }

    #[test]
    fn commit_zero_is_a_noop() {
        let mut p = Parser::request();
        p.prepare();
        p.commit(0).unwrap();
        assert_eq!(p.parse_header().unwrap(), Status::NeedMore);
        deliver(&mut p, b"GET / HTTP/1.1\r\n\r\n");
        assert_eq!(p.parse_header().unwrap(), Status::Complete);
    }

    #[test]
    fn commit_preconditions() {
        let mut p = Parser::request();
        let n = p.prepare().len();
        assert_eq!(p.commit(n + 1), Err(Error::InvalidArgument));
        p.commit_eof();
        assert_eq!(p.commit(1), Err(Error::InvalidArgument));
    }

    #[test]
    fn prepare_always_has_room() {
        let mut p = Parser::request();
        for _ in 0..3 {
            let len = {
                let region = p.prepare();
                assert!(!region.is_empty());
                region.len()
            };
            p.commit(len).unwrap();
        }
    }

    #[test]
    fn reset_reuses_parser() {
        let mut p = request(b"GET /one HTTP/1.1\r\nHost: a\r\n\r\n");
        p.parse_header().unwrap();
        p.parse_body().unwrap();
        assert!(p.is_complete());

        p.reset();
        assert!(p.headers().is_none());
        deliver(&mut p, b"POST /two HTTP/1.1\r\nContent-Length: 2\r\n\r\nok");
        p.parse_header().unwrap();
        p.parse_body().unwrap();
        assert_eq!(p.method(), Some("POST"));
        assert_eq!(p.body(), b"ok");

        // Reset also clears a failure.
        let mut p = request(b"GET / HTTP/2.0\r\n\r\n");
        assert_eq!(p.parse_header(), Err(Error::BadVersion));
        p.reset();
        deliver(&mut p, b"GET / HTTP/1.1\r\n\r\n");
        assert_eq!(p.parse_header().unwrap(), Status::Complete);
    }

    #[test]
    fn growth_over_many_commits() {
        // Push the buffer through several growth steps.
        let body = vec![b'x'; 3 * GROW];
        let mut input = format!("POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\n", body.len())
            .into_bytes();
        input.extend_from_slice(&body);

        let mut p = request(&input);
        p.parse_header().unwrap();
        assert_eq!(p.parse_body().unwrap(), Status::Complete);
        assert_eq!(p.body().len(), body.len());
        assert!(p.body().iter().all(|b| *b == b'x'));
    }

    #[test]
    fn differential_with_httparse_request() {
        let input = b"GET /pa/th?q=1 HTTP/1.1\r\nHost: example.com\r\nAccept: */*\r\nX-Odd: a b\r\n\r\n";

        let mut p = request(input);
        p.parse_header().unwrap();

        let mut headers = [httparse::EMPTY_HEADER; 8];
        let mut r = httparse::Request::new(&mut headers);
        let n = match r.parse(input).unwrap() {
            httparse::Status::Complete(n) => n,
            httparse::Status::Partial => panic!("oracle saw a partial request"),
        };
        assert_eq!(n, input.len());

        assert_eq!(p.method(), r.method);
        assert_eq!(p.target(), r.path.map(|p| p.as_bytes()));
        assert_eq!(p.version().unwrap().minor(), r.version.unwrap());

        let h = p.headers().unwrap();
        assert_eq!(h.len(), r.headers.len());
        for (ours, theirs) in h.iter().zip(r.headers.iter()) {
            assert_eq!(ours.name(), theirs.name);
            assert_eq!(ours.value(), theirs.value);
        }
    }

    #[test]
    fn differential_with_httparse_response() {
        let input = b"HTTP/1.0 301 Moved Permanently\r\nLocation: /new\r\nContent-Length: 0\r\n\r\n";

        let mut p = response(input);
        p.parse_header().unwrap();

        let mut headers = [httparse::EMPTY_HEADER; 8];
        let mut r = httparse::Response::new(&mut headers);
        assert!(r.parse(input).unwrap().is_complete());

        assert_eq!(p.status(), r.code);
        assert_eq!(p.version().unwrap().minor(), r.version.unwrap());
        assert_eq!(p.reason(), r.reason.map(|s| s.as_bytes()));

        let h = p.headers().unwrap();
        assert_eq!(h.len(), r.headers.len());
        for (ours, theirs) in h.iter().zip(r.headers.iter()) {
            assert_eq!(ours.name(), theirs.name);
            assert_eq!(ours.value(), theirs.value);
        }
    }

    #[test]
    fn detached_headers_survive_reset() {
        let mut p = request(b"GET / HTTP/1.1\r\nHost: h\r\n\r\n");
        p.parse_header().unwrap();
        let h = p.take_headers().unwrap();
        p.reset();
        assert_eq!(h.value("host").unwrap(), b"h");
        assert!(h.as_bytes().starts_with(b"GET / HTTP/1.1\r\n"));
    }
}
