use thiserror::Error;

/// Faults reported by the parser and the header container.
///
/// Syntax and policy errors move the parser to its failed state, which is
/// terminal until [`Parser::reset()`][crate::Parser::reset]. Needing more
/// input is not a fault and is reported as
/// [`Status::NeedMore`][crate::Status] instead.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// HTTP-version is not literally `HTTP/1.0` or `HTTP/1.1`.
    #[error("invalid http version")]
    BadVersion,

    /// Request method is empty or not a token.
    #[error("invalid request method")]
    BadMethod,

    /// Request-target is empty or malformed.
    #[error("invalid request target")]
    BadTarget,

    /// Status-code is not exactly three digits.
    #[error("invalid status code")]
    BadStatus,

    /// Invalid byte in the reason-phrase.
    #[error("invalid reason phrase")]
    BadReason,

    /// Field name is empty, not a token, or not followed immediately by a colon.
    #[error("invalid field name")]
    BadField,

    /// Bare CR or LF, or CR not followed by LF.
    #[error("invalid line ending")]
    BadLineEnding,

    /// Invalid byte in a field value, or an obs-fold continuing straight
    /// into a line ending.
    #[error("invalid field value")]
    BadValue,

    /// Content-Length is not a plain decimal number, overflows, or conflicts
    /// with another Content-Length field.
    #[error("invalid content-length")]
    BadContentLength,

    /// `chunked` appears in Transfer-Encoding in a non-final position.
    #[error("invalid transfer-encoding")]
    BadTransferEncoding,

    /// Malformed chunk framing: size, extension, or inter-chunk CRLF.
    #[error("invalid chunk")]
    BadChunk,

    /// Framing is ambiguous, such as Content-Length combined with
    /// Transfer-Encoding.
    #[error("ambiguous message framing")]
    BadMessage,

    /// Start-line plus fields plus terminating CRLF exceed the configured
    /// header limit.
    #[error("header block too large")]
    HeaderLimit,

    /// Body exceeds the configured body limit.
    #[error("body too large")]
    BodyLimit,

    /// End of input before the message was complete.
    #[error("incomplete message")]
    Incomplete,

    /// No field matched the lookup.
    #[error("field not found")]
    NotFound,

    /// Index past the end of the container.
    #[error("index out of range")]
    OutOfRange,

    /// Input failed grammar validation.
    #[error("invalid argument")]
    InvalidArgument,
}

/// `Result` alias used throughout this crate.
pub type Result<T> = core::result::Result<T, Error>;
