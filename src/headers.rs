//! Field container over one contiguous byte buffer.

use core::fmt;
use core::ops::Range;

use crate::bnf::{self, FieldValue, Token};
use crate::error::{Error, Result};
use crate::field::FieldId;

/// Offset + length into the container buffer. Buffer growth relocates
/// memory but never invalidates spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub off: usize,
    pub len: usize,
}

impl Span {
    pub(crate) fn range(&self) -> Range<usize> {
        self.off..self.off + self.len
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Entry {
    pub id: FieldId,
    pub name: Span,
    pub value: Span,
}

/// An ordered, multi-valued collection of HTTP fields.
///
/// The container owns a single byte buffer holding an optional prefix
/// region (start-line text for parsed messages), the serialized field
/// lines, and the terminating CRLF. Lookups never allocate; all views
/// borrow from the buffer. [`Headers::as_bytes`] is the exact on-wire
/// serialization and parses back to the same field sequence.
#[derive(Clone)]
pub struct Headers {
    buf: Vec<u8>,
    prefix: usize,
    entries: Vec<Entry>,
    validate: bool,
}

/// One field: id, name and verbatim value bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    id: FieldId,
    name: &'a str,
    value: &'a [u8],
}

impl<'a> Field<'a> {
    /// The well-known id, or [`FieldId::Unknown`].
    pub fn id(&self) -> FieldId {
        self.id
    }

    /// Field name exactly as it appears on the wire.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Value bytes, verbatim apart from obs-fold flattening.
    pub fn value(&self) -> &'a [u8] {
        self.value
    }

    /// Value as text, when it is valid UTF-8.
    pub fn value_str(&self) -> Option<&'a str> {
        core::str::from_utf8(self.value).ok()
    }
}

impl fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Field");
        d.field("name", &self.name);
        if let Some(v) = self.value_str() {
            d.field("value", &v);
        } else {
            d.field("value", &self.value);
        }
        d.finish()
    }
}

/// A query that selects fields, either by [`FieldId`] or by name
/// (ASCII case-insensitive).
pub trait Lookup {
    /// Whether a field with this id and wire name matches the query.
    fn matches(&self, id: FieldId, name: &[u8]) -> bool;
}

impl Lookup for FieldId {
    fn matches(&self, id: FieldId, _name: &[u8]) -> bool {
        *self == id
    }
}

impl Lookup for &str {
    fn matches(&self, _id: FieldId, name: &[u8]) -> bool {
        self.as_bytes().eq_ignore_ascii_case(name)
    }
}

impl Headers {
    /// An empty container that validates names and values on
    /// [`append`][Headers::append].
    pub fn new() -> Headers {
        Self::with_validation(true)
    }

    /// An empty container that trusts the caller and skips grammar
    /// validation on append. For serialization paths that construct
    /// values from already-checked parts.
    pub fn trusted() -> Headers {
        Self::with_validation(false)
    }

    fn with_validation(validate: bool) -> Headers {
        Headers {
            buf: b"\r\n".to_vec(),
            prefix: 0,
            entries: Vec::new(),
            validate,
        }
    }

    pub(crate) fn from_parsed(
        buf: Vec<u8>,
        prefix: usize,
        entries: Vec<Entry>,
        validate: bool,
    ) -> Headers {
        Headers {
            buf,
            prefix,
            entries,
            validate,
        }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the container holds no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Field by insertion index.
    pub fn get(&self, i: usize) -> Option<Field<'_>> {
        self.entries.get(i).map(|e| self.field(e))
    }

    /// Field by insertion index, with an [`Error::OutOfRange`] error past
    /// the end.
    pub fn at(&self, i: usize) -> Result<Field<'_>> {
        self.get(i).ok_or(Error::OutOfRange)
    }

    /// Whether any field matches.
    pub fn exists(&self, q: impl Lookup) -> bool {
        self.find(q).is_some()
    }

    /// Number of matching fields.
    pub fn count(&self, q: impl Lookup) -> usize {
        self.matching(q).count()
    }

    /// First matching field.
    pub fn find(&self, q: impl Lookup) -> Option<Field<'_>> {
        self.matching(q).next()
    }

    /// Value of the first matching field, or [`Error::NotFound`].
    pub fn value(&self, q: impl Lookup) -> Result<&[u8]> {
        self.find(q).map(|f| f.value).ok_or(Error::NotFound)
    }

    /// Value of the first matching field, or the supplied default.
    pub fn value_or<'a>(&'a self, q: impl Lookup, default: &'a [u8]) -> &'a [u8] {
        self.find(q).map(|f| f.value).unwrap_or(default)
    }

    /// All matching fields, in insertion (on-wire) order.
    pub fn matching<Q: Lookup>(&self, q: Q) -> Matching<'_, Q> {
        Matching {
            headers: self,
            q,
            i: 0,
        }
    }

    /// All fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = Field<'_>> + '_ {
        self.entries.iter().map(|e| self.field(e))
    }

    /// The full serialization: prefix, field lines, terminating CRLF.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// The prefix region bytes.
    pub fn prefix(&self) -> &[u8] {
        &self.buf[..self.prefix]
    }

    /// Reserve exactly `n` bytes of prefix and return the writable region.
    ///
    /// Existing prefix content is kept up to the new size; bytes added by
    /// growing are space-filled. Previously returned views are invalidated
    /// by the relocation.
    pub fn resize_prefix(&mut self, n: usize) -> &mut [u8] {
        let old = self.prefix;
        if n > old {
            self.buf
                .splice(old..old, core::iter::repeat(b' ').take(n - old));
        } else {
            self.buf.drain(n..old);
        }
        for e in &mut self.entries {
            // Entries always sit after the prefix region.
            if n > old {
                e.name.off += n - old;
                e.value.off += n - old;
            } else {
                e.name.off -= old - n;
                e.value.off -= old - n;
            }
        }
        self.prefix = n;
        &mut self.buf[..n]
    }

    /// Reserve room for at least `n` more serialized bytes.
    pub fn reserve(&mut self, n: usize) {
        self.buf.reserve(n);
    }

    /// Drop excess capacity.
    pub fn shrink_to_fit(&mut self) {
        self.buf.shrink_to_fit();
        self.entries.shrink_to_fit();
    }

    /// Remove all fields and the prefix, keeping capacity.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.buf.extend_from_slice(b"\r\n");
        self.prefix = 0;
        self.entries.clear();
    }

    /// Append a well-known field with its canonical name.
    ///
    /// The value must be `field-content` (no CR, LF or control bytes, no
    /// leading/trailing whitespace) unless the container was created with
    /// [`Headers::trusted`].
    pub fn append(&mut self, id: FieldId, value: &[u8]) -> Result<()> {
        let name = id.name().ok_or(Error::InvalidArgument)?;
        self.append_entry(id, name, value)
    }

    /// Append a field by name, preserving the given spelling.
    ///
    /// The name must be a token and the value `field-content`, unless the
    /// container was created with [`Headers::trusted`].
    pub fn append_named(&mut self, name: &str, value: &[u8]) -> Result<()> {
        if self.validate {
            bnf::validate::<Token>(name.as_bytes()).map_err(|_| Error::BadField)?;
        }
        self.append_entry(FieldId::from_name(name.as_bytes()), name, value)
    }

    fn append_entry(&mut self, id: FieldId, name: &str, value: &[u8]) -> Result<()> {
        if self.validate {
            bnf::validate::<FieldValue>(value).map_err(|_| Error::BadValue)?;
        }

        // Insert the new line just before the terminating CRLF.
        let at = self.buf.len() - 2;
        let mut line = Vec::with_capacity(name.len() + value.len() + 4);
        line.extend_from_slice(name.as_bytes());
        line.extend_from_slice(b": ");
        line.extend_from_slice(value);
        line.extend_from_slice(b"\r\n");
        self.buf.splice(at..at, line);

        self.entries.push(Entry {
            id,
            name: Span {
                off: at,
                len: name.len(),
            },
            value: Span {
                off: at + name.len() + 2,
                len: value.len(),
            },
        });
        Ok(())
    }

    fn field(&self, e: &Entry) -> Field<'_> {
        // Names are tokens (parser) or &str (append); both are valid UTF-8.
        let name = core::str::from_utf8(&self.buf[e.name.range()]).expect("ascii field name");
        Field {
            id: e.id,
            name,
            value: &self.buf[e.value.range()],
        }
    }
}

impl Default for Headers {
    fn default() -> Self {
        Headers::new()
    }
}

impl PartialEq for Headers {
    fn eq(&self, other: &Headers) -> bool {
        self.prefix() == other.prefix()
            && self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| a.name == b.name && a.value == b.value)
    }
}

impl Eq for Headers {}

impl fmt::Debug for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Iterator over fields matching a [`Lookup`] query, in insertion order.
pub struct Matching<'a, Q: Lookup> {
    headers: &'a Headers,
    q: Q,
    i: usize,
}

impl<'a, Q: Lookup> Iterator for Matching<'a, Q> {
    type Item = Field<'a>;

    fn next(&mut self) -> Option<Field<'a>> {
        while self.i < self.headers.entries.len() {
            let e = &self.headers.entries[self.i];
            self.i += 1;
            let name = &self.headers.buf[e.name.range()];
            if self.q.matches(e.id, name) {
                return Some(self.headers.field(e));
            }
        }
        None
    }
}
