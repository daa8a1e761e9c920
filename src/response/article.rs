//! Buffered article representation.
//!
//! [`Article`] holds a fully retrieved article (parsed header block plus raw
//! body bytes) and provides structured access to its content through the
//! mail_parser Message interface. Parsing is lazy; MIME content is only
//! parsed when an accessor method is called.

use mail_parser::{Message, MessageParser, MimeHeaders};

use super::headers::Headers;

/// A fully retrieved article.
///
/// Produced by the buffering retrieval methods
/// ([`Client::article_as_bytes`](crate::Client::article_as_bytes)); the
/// streaming variants hand the body to a caller-supplied sink instead and
/// never build this type.
#[derive(Debug, Clone)]
pub struct Article {
    headers: Headers,
    /// Reassembled wire form: headers, blank line, body.
    raw: Vec<u8>,
    body_start: usize,
}

impl Article {
    /// Build an article from a parsed header block and raw body bytes.
    pub fn new(headers: Headers, body: Vec<u8>) -> Self {
        let mut raw = headers.to_wire();
        raw.extend_from_slice(b"\r\n");
        let body_start = raw.len();
        raw.extend_from_slice(&body);
        Self {
            headers,
            raw,
            body_start,
        }
    }

    /// The article's header block.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Raw body bytes, exactly as received (dot-stuffing not undone).
    pub fn body(&self) -> &[u8] {
        &self.raw[self.body_start..]
    }

    /// The whole article in wire form: headers, blank line, body.
    pub fn raw_content(&self) -> &[u8] {
        &self.raw
    }

    // === MIME parsing (lazy - parses on each call) ===

    /// Parse the article and get a mail_parser [`Message`].
    ///
    /// Content is parsed each time this is called; for repeated access to
    /// multiple fields, call once and work with the returned `Message`.
    pub fn message(&self) -> Option<Message<'_>> {
        MessageParser::default().parse(&self.raw)
    }

    /// The Subject header value, decoded.
    pub fn subject(&self) -> Option<String> {
        self.message()?.subject().map(|s| s.to_string())
    }

    /// The From header as an email address.
    pub fn from(&self) -> Option<String> {
        self.message()?
            .from()?
            .first()?
            .address()
            .map(|s| s.to_string())
    }

    /// The Date header as an RFC 3339 formatted string.
    pub fn date(&self) -> Option<String> {
        self.message()?.date().map(|d| d.to_rfc3339())
    }

    /// The article body as plain text (first text part).
    pub fn body_text(&self) -> Option<String> {
        self.message()?.body_text(0).map(|s| s.to_string())
    }

    /// The article body as HTML, if the message carries one.
    pub fn body_html(&self) -> Option<String> {
        self.message()?.body_html(0).map(|s| s.to_string())
    }

    /// Whether this is a multi-part MIME message.
    pub fn is_multipart(&self) -> bool {
        self.message().map(|m| m.parts.len() > 1).unwrap_or(false)
    }

    /// Attachments found in the MIME message, already transfer-decoded.
    pub fn attachments(&self) -> Vec<Attachment> {
        let Some(message) = self.message() else {
            return vec![];
        };

        message
            .attachments()
            .map(|att| Attachment {
                filename: att.attachment_name().map(|s| s.to_string()),
                content_type: att.content_type().map(|ct| ct.ctype().to_string()),
                data: att.contents().to_vec(),
            })
            .collect()
    }
}

/// An attachment in a MIME message.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    /// Attachment filename if specified in Content-Disposition.
    pub filename: Option<String>,
    /// MIME content type (e.g., "image/png", "application/pdf").
    pub content_type: Option<String>,
    /// Raw attachment data (already decoded from base64/quoted-printable).
    pub data: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_headers() -> Headers {
        let mut headers = Headers::new();
        headers.add("From", "\"Demo User\" <nobody@example.com>".to_string());
        headers.add("Newsgroups", "misc.test".to_string());
        headers.add("Subject", "I am just a test article".to_string());
        headers.add("Date", "Wed, 06 Oct 1998 04:38:40 -0500".to_string());
        headers
    }

    #[test]
    fn test_article_accessors() {
        let article = Article::new(
            sample_headers(),
            b"This is just a test article body.\r\n".to_vec(),
        );

        assert_eq!(article.headers().get("Newsgroups"), Some("misc.test"));
        assert_eq!(article.body(), b"This is just a test article body.\r\n");

        assert!(article.message().is_some());
        assert_eq!(
            article.subject(),
            Some("I am just a test article".to_string())
        );
        assert_eq!(article.from(), Some("nobody@example.com".to_string()));
        assert_eq!(
            article.body_text(),
            Some("This is just a test article body.\r\n".to_string())
        );
        assert!(!article.is_multipart());
        assert!(article.attachments().is_empty());
    }

    #[test]
    fn test_article_raw_content_shape() {
        let mut headers = Headers::new();
        headers.add("Subject", "Test".to_string());
        let article = Article::new(headers, b"Body\r\n".to_vec());

        let raw = article.raw_content();
        assert_eq!(raw, b"Subject: Test\r\n\r\nBody\r\n");
    }

    #[test]
    fn test_article_date() {
        let mut headers = Headers::new();
        headers.add("From", "test@example.com".to_string());
        headers.add("Date", "Mon, 01 Jan 2024 12:00:00 +0000".to_string());
        headers.add("Subject", "Test".to_string());
        let article = Article::new(headers, b"Body\r\n".to_vec());

        assert!(article.date().is_some());
    }

    #[test]
    fn test_article_empty_body() {
        let mut headers = Headers::new();
        headers.add("Subject", "Test".to_string());
        let article = Article::new(headers, Vec::new());

        assert!(article.body().is_empty());
        assert_eq!(article.subject(), Some("Test".to_string()));
    }
}
