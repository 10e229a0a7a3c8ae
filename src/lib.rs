//! Sans-IO HTTP/1.1 message parsing.
//!
//! hark is a container/algorithm toolkit for producers and consumers of
//! HTTP/1.1 messages. It never opens sockets or performs I/O: callers feed
//! it bytes through [`Parser::prepare`]/[`Parser::commit`] and drive the
//! parse operations until they complete. Input may be fragmented
//! arbitrarily; an operation that cannot be decided yet suspends with
//! [`Status::NeedMore`] and resumes exactly where it left off.
//!
//! # In scope:
//!
//! * Strict RFC 7230 message grammar on an in-place mutable buffer
//! * Resumable parsing of arbitrarily fragmented input
//! * Body framing: Content-Length, chunked transfer coding, read-to-close
//! * Connection disposition (keep-alive/close) and upgrade detection
//! * A zero-copy, indexable, multi-valued header container ([`Headers`])
//!
//! # Out of scope:
//!
//! * Opening/closing sockets, timeouts
//! * TLS (https)
//! * HTTP/2, header compression
//! * Routing, cookies, body transformations
//!
//! Parsed values stay in one buffer and are exposed as borrowed views;
//! the only normalization applied is the flattening of obsolete line
//! folds inside field values.

#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::uninlined_format_args)]
#![deny(missing_docs)]

#[macro_use]
extern crate log;

mod chars;

pub mod bnf;

mod error;
pub use error::{Error, Result};

mod field;
pub use field::FieldId;

mod headers;
pub use headers::{Field, Headers, Lookup, Matching};

mod startline;
pub use startline::Version;

mod chunked;
mod fieldline;

mod parser;
pub use parser::{BodyPart, Config, Parser, Status, Variant};
