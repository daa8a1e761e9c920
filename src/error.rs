//! Error types for the NNTP client library.

use std::fmt;

/// Result type used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur when using the NNTP client.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// I/O failure on the underlying stream, unrelated to protocol framing.
    Io(String),

    /// The stream closed before a line terminator was read.
    ///
    /// `partial` holds whatever bytes were accumulated before the stream
    /// closed, so callers can surface or log the truncated fragment.
    EndOfStream {
        /// Bytes read before the stream closed.
        partial: Vec<u8>,
    },

    /// A header or body block ended before its terminator line was seen.
    ///
    /// `partial` holds the truncated fragment of the last line, if any. For
    /// body reads the fragment has already been delivered to the sink and
    /// must be treated as possibly incomplete.
    UnexpectedEndOfResponse {
        /// Bytes of the truncated final line.
        partial: Vec<u8>,
    },

    /// A status line did not start with a three-digit response code.
    MalformedResponse(String),

    /// A header block violated the header line grammar.
    MalformedHeaders(String),

    /// Invalid command or command parameters.
    InvalidCommand(String),

    /// Connection establishment failed (dial error or rejected greeting).
    Connection(String),

    /// Authentication was rejected by the server.
    Auth {
        /// Response code from the server.
        code: u16,
        /// Response message from the server.
        message: String,
    },

    /// The server answered with a code the command does not expect.
    Unexpected {
        /// Response code from the server.
        code: u16,
        /// Response message from the server.
        message: String,
    },

    /// The current article number is invalid (420).
    CurrentArticleInvalid,

    /// No article with that message-id (430).
    NoArticleWithId,

    /// No article with that number (423).
    NoArticleWithNumber,

    /// No newsgroup has been selected (412).
    NoGroupSelected,

    /// No next article in this group (421).
    NoNextArticle,

    /// No previous article in this group (422).
    NoPreviousArticle,

    /// Reading service is permanently unavailable (502).
    ReadingUnavailable,

    /// No such newsgroup found (411).
    NoSuchGroup,

    /// TLS negotiation or configuration failure.
    #[cfg(feature = "tls")]
    Tls(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(msg) => write!(f, "I/O error: {msg}"),
            Error::EndOfStream { partial } => {
                write!(f, "end of stream after {} bytes", partial.len())
            }
            Error::UnexpectedEndOfResponse { .. } => {
                write!(f, "unexpected end of response")
            }
            Error::MalformedResponse(msg) => write!(f, "malformed response: {msg}"),
            Error::MalformedHeaders(msg) => write!(f, "malformed headers: {msg}"),
            Error::InvalidCommand(msg) => write!(f, "invalid command: {msg}"),
            Error::Connection(msg) => write!(f, "connection error: {msg}"),
            Error::Auth { code, message } => {
                write!(f, "auth failed with code {code} ({message})")
            }
            Error::Unexpected { code, message } => {
                write!(f, "unexpected response code: {code} ({message})")
            }
            Error::CurrentArticleInvalid => write!(f, "current article number is invalid"),
            Error::NoArticleWithId => write!(f, "no article with that message-id"),
            Error::NoArticleWithNumber => write!(f, "no article with that number"),
            Error::NoGroupSelected => write!(f, "no newsgroup selected"),
            Error::NoNextArticle => write!(f, "no next article in this group"),
            Error::NoPreviousArticle => write!(f, "no previous article in this group"),
            Error::ReadingUnavailable => write!(f, "reading service permanently unavailable"),
            Error::NoSuchGroup => write!(f, "no such newsgroup found"),
            #[cfg(feature = "tls")]
            Error::Tls(msg) => write!(f, "TLS error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

#[cfg(feature = "tls")]
impl From<rustls::Error> for Error {
    fn from(err: rustls::Error) -> Self {
        Error::Tls(err.to_string())
    }
}
