//! NNTP response framing.
//!
//! This module implements the response side of the protocol: reading raw
//! lines from the connection, parsing the three-digit status line that opens
//! every reply, and consuming the multi-line header and body blocks that
//! follow some status codes.
//!
//! The entry points are deliberately policy-free. Nothing here knows which
//! status codes carry which payload shape; that knowledge lives in the
//! per-command methods on [`Client`](crate::Client), which call
//! [`read_headers`] and/or [`read_body`] as the reply requires.

mod article;
mod headers;
mod metadata;

pub use article::{Article, Attachment};
pub use headers::Headers;
pub use metadata::{
    ActiveGroup, ArticlePointer, Capabilities, DistribPattern, GroupCreation, GroupListing,
    GroupSummary, NewsgroupDescription, ServerDate,
};

use std::io::{Read, Write};

use bytes::{Buf, Bytes, BytesMut};

use crate::error::{Error, Result};

/// Every response line ends with this byte, regardless of whether the
/// server terminates lines with CRLF or a bare LF.
pub(crate) const LINE_TERMINATOR: u8 = 0x0a;

const READ_CHUNK_SIZE: usize = 4096;

/// Convert bytes with various text encodings to a UTF-8 string.
///
/// NNTP predates the UTF-8 consensus and plenty of servers still emit
/// Windows-1252 or ISO-8859 variants in status messages and header values.
/// UTF-8 is tried first, then the encodings most common on news servers,
/// falling back to lossy UTF-8 conversion.
pub(crate) fn decode_text(data: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(data) {
        return text.to_string();
    }

    let encodings_to_try = [
        encoding_rs::WINDOWS_1252,
        encoding_rs::ISO_8859_15,
        encoding_rs::ISO_8859_2,
    ];

    for encoding in &encodings_to_try {
        let (decoded, _, had_errors) = encoding.decode(data);
        if !had_errors {
            return decoded.into_owned();
        }
    }

    String::from_utf8_lossy(data).into_owned()
}

/// Strip the trailing line terminator (`\r\n` or `\n`) from a raw line.
fn strip_line_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// A parsed status line: the three-digit code and the trailing message.
///
/// No interpretation of the code happens at this level. The same code can
/// mean different things to different commands, so mapping codes onto typed
/// outcomes is the caller's job.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    /// Three-digit response code.
    pub code: u16,
    /// Free text following the code, with surrounding whitespace trimmed.
    pub message: String,
}

/// Parse a raw status line into a [`StatusLine`].
///
/// The line must begin with three ASCII decimal digits; anything else is a
/// [`MalformedResponse`](Error::MalformedResponse). The message is whatever
/// follows the code, trimmed, and may be empty.
pub fn parse_status_line(line: &[u8]) -> Result<StatusLine> {
    let digits = line.get(..3).ok_or_else(|| {
        Error::MalformedResponse(format!(
            "status line too short: {:?}",
            decode_text(strip_line_terminator(line))
        ))
    })?;

    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(Error::MalformedResponse(format!(
            "status line does not start with a response code: {:?}",
            decode_text(strip_line_terminator(line))
        )));
    }

    let code = digits
        .iter()
        .fold(0u16, |acc, d| acc * 10 + u16::from(d - b'0'));
    let message = decode_text(strip_line_terminator(&line[3..]))
        .trim()
        .to_string();

    Ok(StatusLine { code, message })
}

/// Buffered read cursor over one response.
///
/// A cursor owns the buffered state between the raw stream and the line
/// oriented parsers. [`Client::send_command`](crate::Client::send_command)
/// creates a fresh cursor for every exchange, so leftover bytes from an
/// earlier, partially consumed response can never be mistaken for the next
/// reply. All block reads belonging to one exchange must go through the
/// cursor created for that exchange.
#[derive(Debug, Default)]
pub struct ResponseCursor {
    buffer: BytesMut,
}

impl ResponseCursor {
    /// Create an empty cursor.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
        }
    }

    /// Read one raw line from `stream`, including its terminator byte.
    ///
    /// Returns every byte up to and including the next `\n`. If the stream
    /// closes before a terminator is seen, the accumulated partial bytes are
    /// handed back inside [`Error::EndOfStream`] rather than discarded. Any
    /// other I/O fault is propagated immediately without retry.
    pub fn read_line<R: Read>(&mut self, stream: &mut R) -> Result<Bytes> {
        loop {
            if let Some(pos) = self
                .buffer
                .iter()
                .position(|&byte| byte == LINE_TERMINATOR)
            {
                return Ok(self.buffer.split_to(pos + 1).freeze());
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let count = stream.read(&mut chunk).map_err(Error::from)?;
            if count == 0 {
                let partial = self.buffer.split().freeze();
                return Err(Error::EndOfStream {
                    partial: partial.to_vec(),
                });
            }
            self.buffer.extend_from_slice(&chunk[..count]);
        }
    }

    /// Number of bytes buffered but not yet consumed.
    pub fn buffered(&self) -> usize {
        self.buffer.remaining()
    }
}

/// Read a header block from the cursor.
///
/// Lines are consumed until a terminator: either the empty line separating
/// an article's headers from its body, or the lone-dot line that ends a
/// headers-only reply such as `HEAD`. Returns the parsed block and the total
/// number of bytes consumed, terminator line included (for an article, the
/// offset at which the body begins).
///
/// A continuation line (leading space or tab) extends the last value of the
/// most recently seen header name; a continuation with no preceding header,
/// or a header line with no colon, is [`MalformedHeaders`]. Reaching end of
/// stream before the terminator is always
/// [`UnexpectedEndOfResponse`], never an empty success.
///
/// [`MalformedHeaders`]: Error::MalformedHeaders
/// [`UnexpectedEndOfResponse`]: Error::UnexpectedEndOfResponse
pub fn read_headers<R: Read>(
    cursor: &mut ResponseCursor,
    stream: &mut R,
) -> Result<(Headers, usize)> {
    let mut block = Headers::new();
    // Most recently seen header name; folded values extend its last entry.
    let mut last_name: Option<String> = None;
    let mut consumed = 0;

    loop {
        let line = match cursor.read_line(stream) {
            Ok(line) => line,
            Err(Error::EndOfStream { partial }) => {
                return Err(Error::UnexpectedEndOfResponse { partial });
            }
            Err(err) => return Err(err),
        };
        consumed += line.len();

        let content = strip_line_terminator(&line);
        if content.is_empty() || content == b"." {
            break;
        }

        if content[0] == b' ' || content[0] == b'\t' {
            // Folded value. The leading whitespace is part of the value.
            let Some(name) = &last_name else {
                return Err(Error::MalformedHeaders(
                    "found folded value without a preceding header name".to_string(),
                ));
            };
            block.extend_last(name, &decode_text(content));
            continue;
        }

        let Some(colon) = content.iter().position(|&byte| byte == b':') else {
            return Err(Error::MalformedHeaders(format!(
                "header line has no colon: {:?}",
                decode_text(content)
            )));
        };

        let name = decode_text(&content[..colon]);
        // Skip at most one separator space after the colon.
        let mut value = &content[colon + 1..];
        if value.first() == Some(&b' ') {
            value = &value[1..];
        }
        block.add(&name, decode_text(value));
        last_name = Some(name);
    }

    Ok((block, consumed))
}

/// Read a body block from the cursor, writing it to `sink`.
///
/// Every line that is not the lone-dot terminator is forwarded to the sink
/// verbatim, original line terminator included. The body is never buffered
/// here; callers that want it in memory can write into a `Vec<u8>`.
///
/// Dot-stuffing is not undone: a body line arriving as `..example` is
/// forwarded exactly as received, and collapsing the doubled dot is the
/// caller's responsibility.
///
/// If the stream closes before the terminator, whatever fragment of the
/// final line was received is still written to the sink (best effort, so a
/// caller streaming to a persistent destination can inspect how much
/// arrived) and the call fails with
/// [`UnexpectedEndOfResponse`](Error::UnexpectedEndOfResponse); the bytes
/// delivered must then be treated as incomplete. Any other I/O fault aborts
/// immediately without a flush attempt.
pub fn read_body<R: Read, W: Write>(
    cursor: &mut ResponseCursor,
    stream: &mut R,
    sink: &mut W,
) -> Result<()> {
    loop {
        let line = match cursor.read_line(stream) {
            Ok(line) => line,
            Err(Error::EndOfStream { partial }) => {
                sink.write_all(&partial).map_err(Error::from)?;
                return Err(Error::UnexpectedEndOfResponse { partial });
            }
            Err(err) => return Err(err),
        };

        if strip_line_terminator(&line) == b"." {
            return Ok(());
        }

        sink.write_all(&line).map_err(Error::from)?;
    }
}
