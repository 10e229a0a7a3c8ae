//! Well-known field names.

/// Identifier for a well-known HTTP field, or [`FieldId::Unknown`].
///
/// The set is closed and compile-time known. Lookup from a wire name is
/// ASCII case-insensitive; the wire bytes themselves are never rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
#[non_exhaustive]
pub enum FieldId {
    Accept,
    AcceptCharset,
    AcceptEncoding,
    AcceptLanguage,
    AcceptRanges,
    AccessControlAllowCredentials,
    AccessControlAllowHeaders,
    AccessControlAllowMethods,
    AccessControlAllowOrigin,
    AccessControlExposeHeaders,
    AccessControlMaxAge,
    AccessControlRequestHeaders,
    AccessControlRequestMethod,
    Age,
    AltSvc,
    Allow,
    Authorization,
    CacheControl,
    Connection,
    ContentDisposition,
    ContentEncoding,
    ContentLanguage,
    ContentLength,
    ContentLocation,
    ContentRange,
    ContentSecurityPolicy,
    ContentType,
    Cookie,
    Date,
    Etag,
    Expect,
    Expires,
    Forwarded,
    From,
    Host,
    IfMatch,
    IfModifiedSince,
    IfNoneMatch,
    IfRange,
    IfUnmodifiedSince,
    KeepAlive,
    LastModified,
    Link,
    Location,
    MaxForwards,
    Origin,
    Pragma,
    ProxyAuthenticate,
    ProxyAuthorization,
    ProxyConnection,
    Range,
    Referer,
    RetryAfter,
    SecWebsocketAccept,
    SecWebsocketKey,
    SecWebsocketProtocol,
    SecWebsocketVersion,
    Server,
    SetCookie,
    StrictTransportSecurity,
    Te,
    Trailer,
    TransferEncoding,
    Upgrade,
    UserAgent,
    Vary,
    Via,
    Warning,
    WwwAuthenticate,
    XContentTypeOptions,
    XForwardedFor,
    XForwardedHost,
    XForwardedProto,
    XFrameOptions,
    XRequestId,
    /// A field name outside the well-known set.
    Unknown,
}

// The frozen name table. Lookup filters on length before comparing, so the
// common miss is a handful of integer compares.
static NAMES: &[(&str, FieldId)] = &[
    ("Accept", FieldId::Accept),
    ("Accept-Charset", FieldId::AcceptCharset),
    ("Accept-Encoding", FieldId::AcceptEncoding),
    ("Accept-Language", FieldId::AcceptLanguage),
    ("Accept-Ranges", FieldId::AcceptRanges),
    ("Access-Control-Allow-Credentials", FieldId::AccessControlAllowCredentials),
    ("Access-Control-Allow-Headers", FieldId::AccessControlAllowHeaders),
    ("Access-Control-Allow-Methods", FieldId::AccessControlAllowMethods),
    ("Access-Control-Allow-Origin", FieldId::AccessControlAllowOrigin),
    ("Access-Control-Expose-Headers", FieldId::AccessControlExposeHeaders),
    ("Access-Control-Max-Age", FieldId::AccessControlMaxAge),
    ("Access-Control-Request-Headers", FieldId::AccessControlRequestHeaders),
    ("Access-Control-Request-Method", FieldId::AccessControlRequestMethod),
    ("Age", FieldId::Age),
    ("Alt-Svc", FieldId::AltSvc),
    ("Allow", FieldId::Allow),
    ("Authorization", FieldId::Authorization),
    ("Cache-Control", FieldId::CacheControl),
    ("Connection", FieldId::Connection),
    ("Content-Disposition", FieldId::ContentDisposition),
    ("Content-Encoding", FieldId::ContentEncoding),
    ("Content-Language", FieldId::ContentLanguage),
    ("Content-Length", FieldId::ContentLength),
    ("Content-Location", FieldId::ContentLocation),
    ("Content-Range", FieldId::ContentRange),
    ("Content-Security-Policy", FieldId::ContentSecurityPolicy),
    ("Content-Type", FieldId::ContentType),
    ("Cookie", FieldId::Cookie),
    ("Date", FieldId::Date),
    ("ETag", FieldId::Etag),
    ("Expect", FieldId::Expect),
    ("Expires", FieldId::Expires),
    ("Forwarded", FieldId::Forwarded),
    ("From", FieldId::From),
    ("Host", FieldId::Host),
    ("If-Match", FieldId::IfMatch),
    ("If-Modified-Since", FieldId::IfModifiedSince),
    ("If-None-Match", FieldId::IfNoneMatch),
    ("If-Range", FieldId::IfRange),
    ("If-Unmodified-Since", FieldId::IfUnmodifiedSince),
    ("Keep-Alive", FieldId::KeepAlive),
    ("Last-Modified", FieldId::LastModified),
    ("Link", FieldId::Link),
    ("Location", FieldId::Location),
    ("Max-Forwards", FieldId::MaxForwards),
    ("Origin", FieldId::Origin),
    ("Pragma", FieldId::Pragma),
    ("Proxy-Authenticate", FieldId::ProxyAuthenticate),
    ("Proxy-Authorization", FieldId::ProxyAuthorization),
    ("Proxy-Connection", FieldId::ProxyConnection),
    ("Range", FieldId::Range),
    ("Referer", FieldId::Referer),
    ("Retry-After", FieldId::RetryAfter),
    ("Sec-WebSocket-Accept", FieldId::SecWebsocketAccept),
    ("Sec-WebSocket-Key", FieldId::SecWebsocketKey),
    ("Sec-WebSocket-Protocol", FieldId::SecWebsocketProtocol),
    ("Sec-WebSocket-Version", FieldId::SecWebsocketVersion),
    ("Server", FieldId::Server),
    ("Set-Cookie", FieldId::SetCookie),
    ("Strict-Transport-Security", FieldId::StrictTransportSecurity),
    ("TE", FieldId::Te),
    ("Trailer", FieldId::Trailer),
    ("Transfer-Encoding", FieldId::TransferEncoding),
    ("Upgrade", FieldId::Upgrade),
    ("User-Agent", FieldId::UserAgent),
    ("Vary", FieldId::Vary),
    ("Via", FieldId::Via),
    ("Warning", FieldId::Warning),
    ("WWW-Authenticate", FieldId::WwwAuthenticate),
    ("X-Content-Type-Options", FieldId::XContentTypeOptions),
    ("X-Forwarded-For", FieldId::XForwardedFor),
    ("X-Forwarded-Host", FieldId::XForwardedHost),
    ("X-Forwarded-Proto", FieldId::XForwardedProto),
    ("X-Frame-Options", FieldId::XFrameOptions),
    ("X-Request-Id", FieldId::XRequestId),
];

impl FieldId {
    /// Look up a wire name, case-insensitively.
    pub fn from_name(name: &[u8]) -> FieldId {
        for (n, id) in NAMES {
            if n.len() == name.len() && n.as_bytes().eq_ignore_ascii_case(name) {
                return *id;
            }
        }
        FieldId::Unknown
    }

    /// The canonical wire spelling, or `None` for [`FieldId::Unknown`].
    pub fn name(&self) -> Option<&'static str> {
        NAMES.iter().find(|(_, id)| id == self).map(|(n, _)| *n)
    }
}
