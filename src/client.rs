//! Blocking NNTP client.
//!
//! [`Client`] drives a single persistent connection: it writes one command
//! line, reads the status line that answers it, and, for replies that carry
//! a payload, reads the header and/or body block through the response
//! cursor created for that exchange. The stream type `S` can be anything
//! implementing [`Read`] and [`Write`]: a plain [`TcpStream`], a TLS stream,
//! or an in-memory test double.
//!
//! # Examples
//!
//! ```rust,no_run
//! use nntp_client::{ArticleSpec, Client};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = Client::connect("news.example.com", 119)?;
//! client.mode_reader()?;
//!
//! let stats = client.group("misc.test")?;
//! println!("{} articles ({}-{})", stats.count, stats.low, stats.high);
//!
//! let article = client.article_as_bytes(&ArticleSpec::Number(stats.high))?;
//! println!("subject: {:?}", article.subject());
//!
//! client.quit()?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpStream;

use tracing::{debug, trace};

use crate::command::{ArticleSpec, Command, ListVariant};
use crate::error::{Error, Result};
use crate::response::{
    parse_status_line, read_body, read_headers, ActiveGroup, Article, ArticlePointer,
    Capabilities, DistribPattern, GroupCreation, GroupListing, GroupSummary, Headers,
    NewsgroupDescription, ResponseCursor, ServerDate, StatusLine,
};

#[cfg(feature = "tls")]
use std::sync::Arc;

/// A TLS-wrapped stream, as produced by [`Client::connect_tls`] and
/// [`Client::starttls`].
#[cfg(feature = "tls")]
#[cfg_attr(docsrs, doc(cfg(feature = "tls")))]
pub type TlsStream<S> = rustls::StreamOwned<rustls::ClientConnection, S>;

/// A blocking NNTP client over a single connection.
///
/// Every operation takes `&mut self` and blocks until the server has
/// answered, so exactly one exchange is ever in flight on a connection.
/// Sharing a client between threads must be serialized externally (for
/// example behind a mutex); the client itself provides no locking, queuing
/// or pipelining.
#[derive(Debug)]
pub struct Client<S> {
    stream: S,
    cursor: ResponseCursor,
    posting_allowed: bool,
}

impl Client<TcpStream> {
    /// Connect to the server over plain TCP and read the greeting.
    ///
    /// The conventional port for plaintext NNTP is 119.
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let stream = TcpStream::connect((host, port))
            .map_err(|e| Error::Connection(format!("failed to connect: {e}")))?;
        Self::from_stream(stream)
    }
}

#[cfg(feature = "tls")]
#[cfg_attr(docsrs, doc(cfg(feature = "tls")))]
impl Client<TlsStream<TcpStream>> {
    /// Connect to the server over implicit TLS and read the greeting.
    ///
    /// The conventional port for NNTP over TLS is 563. Certificates are
    /// verified against the webpki root store, with `host` as the expected
    /// server name.
    pub fn connect_tls(host: &str, port: u16) -> Result<Self> {
        let tcp = TcpStream::connect((host, port))
            .map_err(|e| Error::Connection(format!("failed to connect: {e}")))?;
        Self::from_stream(tls_wrap(tcp, host)?)
    }
}

impl<S: Read + Write> Client<S> {
    /// Build a client over an already established stream and read the
    /// initial server greeting.
    ///
    /// The greeting must carry code 200 (posting allowed) or 201 (posting
    /// prohibited); any other code fails with [`Error::Connection`].
    pub fn from_stream(stream: S) -> Result<Self> {
        let mut client = Self {
            stream,
            cursor: ResponseCursor::new(),
            posting_allowed: false,
        };

        let line = client.cursor.read_line(&mut client.stream)?;
        let status = parse_status_line(&line)?;
        match status.code {
            200 => client.posting_allowed = true,
            201 => client.posting_allowed = false,
            code => {
                return Err(Error::Connection(format!(
                    "connection failure (code {code}): {}",
                    status.message
                )));
            }
        }
        debug!(code = status.code, "connected");

        Ok(client)
    }

    /// Whether the server will allow this client to post articles, per the
    /// greeting and the latest MODE READER reply. Tracked for completeness;
    /// posting itself is not implemented.
    pub fn posting_allowed(&self) -> bool {
        self.posting_allowed
    }

    // ===== Core exchange primitives =====

    /// Send one command and read the status line that answers it.
    ///
    /// The command is written as a single CRLF-terminated line, a fresh
    /// response cursor is bound to the stream (discarding any buffered
    /// leftovers from a previous exchange), and exactly one line is read and
    /// parsed. The status code is not interpreted here: the caller decides,
    /// from protocol knowledge of the code, whether to follow up with
    /// [`read_header_block`](Self::read_header_block),
    /// [`read_body_block`](Self::read_body_block), both, or neither.
    ///
    /// Sending a new command while a previous reply's block lines are still
    /// unconsumed leaves the stream position undefined; nothing below this
    /// layer can detect that, so consuming every pending block first is part
    /// of the calling contract.
    pub fn send_command(&mut self, command: Command) -> Result<StatusLine> {
        let bytes = command.encode()?;
        self.stream.write_all(&bytes)?;
        self.stream.flush()?;

        // Stale buffered state from a prior response must not bleed into
        // this exchange.
        self.cursor = ResponseCursor::new();

        let line = self.cursor.read_line(&mut self.stream)?;
        let status = parse_status_line(&line).map_err(|err| match err {
            Error::MalformedResponse(msg) => {
                Error::MalformedResponse(format!("could not process response code: {msg}"))
            }
            other => other,
        })?;

        trace!(
            command = command.keyword(),
            code = status.code,
            "command dispatched"
        );
        Ok(status)
    }

    /// Read a header block from the current reply.
    ///
    /// Call immediately after [`send_command`](Self::send_command) when the
    /// reply code indicates a header payload follows (for example 220 or
    /// 221).
    pub fn read_header_block(&mut self) -> Result<Headers> {
        read_headers(&mut self.cursor, &mut self.stream).map(|(headers, _)| headers)
    }

    /// Read a body block from the current reply into `sink`.
    ///
    /// Call immediately after [`send_command`](Self::send_command), or
    /// after [`read_header_block`](Self::read_header_block) for replies
    /// carrying both blocks, when the reply code indicates a body payload
    /// follows. Lines reach the sink verbatim; dot-stuffed lines are not
    /// collapsed.
    pub fn read_body_block<W: Write>(&mut self, sink: &mut W) -> Result<()> {
        read_body(&mut self.cursor, &mut self.stream, sink)
    }

    /// Read a body block into memory and decode it to text.
    fn read_body_string(&mut self) -> Result<String> {
        let mut body = Vec::new();
        self.read_body_block(&mut body)?;
        Ok(crate::response::decode_text(&body))
    }

    // ===== Session commands =====

    /// Get a mapping of all capability labels to their arguments.
    pub fn capabilities(&mut self) -> Result<Capabilities> {
        let status = self.send_command(Command::Capabilities)?;
        debug!(code = status.code, message = %status.message, "capabilities");

        if status.code != 101 {
            return Err(unexpected(status));
        }

        let body = self.read_body_string()?;
        Ok(Capabilities::parse(&body))
    }

    /// Toggle the connection mode to "reader".
    ///
    /// Returns whether posting is allowed, per the reply code.
    pub fn mode_reader(&mut self) -> Result<bool> {
        let status = self.send_command(Command::ModeReader)?;

        match status.code {
            200 => self.posting_allowed = true,
            201 => self.posting_allowed = false,
            502 => return Err(Error::ReadingUnavailable),
            _ => return Err(unexpected(status)),
        }

        Ok(self.posting_allowed)
    }

    /// Username and password authentication through the AUTHINFO extension
    /// (RFC 4643). The absence of an error indicates success.
    pub fn authenticate(&mut self, user: &str, pass: &str) -> Result<()> {
        let status = self.send_command(Command::AuthInfoUser(user.to_string()))?;
        match status.code {
            // Some servers accept a username alone.
            281 => return Ok(()),
            381 => {}
            _ => return Err(unexpected(status)),
        }

        let status = self.send_command(Command::AuthInfoPass(pass.to_string()))?;
        if status.code != 281 {
            return Err(Error::Auth {
                code: status.code,
                message: status.message,
            });
        }

        Ok(())
    }

    // ===== Group commands =====

    /// Select a group and return its summary.
    pub fn group(&mut self, name: &str) -> Result<GroupSummary> {
        let status = self.send_command(Command::Group(name.to_string()))?;
        if status.code == 411 {
            return Err(Error::NoSuchGroup);
        }
        if status.code != 211 {
            return Err(unexpected(status));
        }

        GroupSummary::parse(&status.message)
    }

    /// Select a group and return its summary along with the group-local
    /// article numbers. With `None`, re-lists the currently selected group.
    pub fn listgroup(&mut self, name: Option<&str>) -> Result<GroupListing> {
        let status = self.send_command(Command::ListGroup(name.map(str::to_string)))?;
        match status.code {
            411 => return Err(Error::NoSuchGroup),
            412 => return Err(Error::NoGroupSelected),
            211 => {}
            _ => return Err(unexpected(status)),
        }

        let summary = GroupSummary::parse(&status.message)?;
        let body = self.read_body_string()?;
        let article_numbers = body.lines().filter_map(|line| line.parse().ok()).collect();

        Ok(GroupListing {
            summary,
            article_numbers,
        })
    }

    // ===== Article commands =====

    /// Retrieve an article, streaming its body into `sink`.
    ///
    /// The parsed header block is returned once the body has been fully
    /// consumed. If an error occurs mid-body, whatever part of the body was
    /// read has already been written to the sink and must be treated as
    /// incomplete.
    pub fn article<W: Write>(&mut self, spec: &ArticleSpec, sink: &mut W) -> Result<Headers> {
        let status = self.send_command(Command::Article(spec.clone()))?;
        article_outcome(&status, 220)?;

        let headers = self.read_header_block()?;
        self.read_body_block(sink)?;
        Ok(headers)
    }

    /// Retrieve an article, buffering the whole body in memory.
    pub fn article_as_bytes(&mut self, spec: &ArticleSpec) -> Result<Article> {
        let mut body = Vec::new();
        let headers = self.article(spec, &mut body)?;
        Ok(Article::new(headers, body))
    }

    /// Retrieve only the headers of an article.
    pub fn head(&mut self, spec: &ArticleSpec) -> Result<Headers> {
        let status = self.send_command(Command::Head(spec.clone()))?;
        article_outcome(&status, 221)?;

        self.read_header_block()
    }

    /// Retrieve only the body of an article, streaming it into `sink`.
    pub fn body<W: Write>(&mut self, spec: &ArticleSpec, sink: &mut W) -> Result<()> {
        let status = self.send_command(Command::Body(spec.clone()))?;
        article_outcome(&status, 222)?;

        self.read_body_block(sink)
    }

    /// Retrieve only the body of an article, buffered in memory.
    pub fn body_as_bytes(&mut self, spec: &ArticleSpec) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        self.body(spec, &mut body)?;
        Ok(body)
    }

    /// Check whether an article exists without retrieving it.
    pub fn stat(&mut self, spec: &ArticleSpec) -> Result<ArticlePointer> {
        let status = self.send_command(Command::Stat(spec.clone()))?;
        article_outcome(&status, 223)?;

        ArticlePointer::parse(&status.message)
    }

    /// Move the current article pointer to the previous article.
    pub fn last(&mut self) -> Result<ArticlePointer> {
        let status = self.send_command(Command::Last)?;
        match status.code {
            412 => return Err(Error::NoGroupSelected),
            420 => return Err(Error::CurrentArticleInvalid),
            422 => return Err(Error::NoPreviousArticle),
            223 => {}
            _ => return Err(unexpected(status)),
        }

        ArticlePointer::parse(&status.message)
    }

    /// Move the current article pointer to the next article.
    pub fn next(&mut self) -> Result<ArticlePointer> {
        let status = self.send_command(Command::Next)?;
        match status.code {
            412 => return Err(Error::NoGroupSelected),
            420 => return Err(Error::CurrentArticleInvalid),
            421 => return Err(Error::NoNextArticle),
            223 => {}
            _ => return Err(unexpected(status)),
        }

        ArticlePointer::parse(&status.message)
    }

    // ===== List commands =====

    /// Retrieve the active groups list, keyed by group name. The wildmat
    /// can be `None` for "all groups".
    pub fn list_active(&mut self, wildmat: Option<&str>) -> Result<HashMap<String, ActiveGroup>> {
        let body = self.list_body(ListVariant::Active(wildmat.map(str::to_string)))?;
        Ok(body
            .lines()
            .filter_map(ActiveGroup::parse_line)
            .map(|group| (group.name.clone(), group))
            .collect())
    }

    /// Retrieve group creation times, keyed by group name.
    pub fn list_active_times(
        &mut self,
        wildmat: Option<&str>,
    ) -> Result<HashMap<String, GroupCreation>> {
        let body = self.list_body(ListVariant::ActiveTimes(wildmat.map(str::to_string)))?;
        Ok(body
            .lines()
            .filter_map(GroupCreation::parse_line)
            .map(|creation| (creation.name.clone(), creation))
            .collect())
    }

    /// Retrieve the distribution header patterns supported by the server.
    pub fn list_distrib_pats(&mut self) -> Result<Vec<DistribPattern>> {
        let body = self.list_body(ListVariant::DistribPats)?;
        Ok(body.lines().filter_map(DistribPattern::parse_line).collect())
    }

    /// Retrieve newsgroup descriptions, keyed by group name.
    pub fn list_newsgroups(
        &mut self,
        wildmat: Option<&str>,
    ) -> Result<HashMap<String, NewsgroupDescription>> {
        let body = self.list_body(ListVariant::Newsgroups(wildmat.map(str::to_string)))?;
        Ok(body
            .lines()
            .filter_map(NewsgroupDescription::parse_line)
            .map(|desc| (desc.name.clone(), desc))
            .collect())
    }

    fn list_body(&mut self, variant: ListVariant) -> Result<String> {
        let status = self.send_command(Command::List(variant))?;
        if status.code != 215 {
            return Err(unexpected(status));
        }
        self.read_body_string()
    }

    /// Groups created since the given date and time, keyed by group name.
    ///
    /// `date` is `YYMMDD` or `YYYYMMDD`, `time` is `HHMMSS`; set `gmt` when
    /// the timestamp is UTC, otherwise its interpretation is left to the
    /// server.
    pub fn newgroups(
        &mut self,
        date: &str,
        time: &str,
        gmt: bool,
    ) -> Result<HashMap<String, ActiveGroup>> {
        let status = self.send_command(Command::NewGroups {
            date: date.to_string(),
            time: time.to_string(),
            gmt,
        })?;
        if status.code != 231 {
            return Err(unexpected(status));
        }

        let body = self.read_body_string()?;
        Ok(body
            .lines()
            .filter_map(ActiveGroup::parse_line)
            .map(|group| (group.name.clone(), group))
            .collect())
    }

    /// Message-ids of articles posted since the given date and time in
    /// groups matching `wildmat`.
    pub fn newnews(
        &mut self,
        wildmat: &str,
        date: &str,
        time: &str,
        gmt: bool,
    ) -> Result<Vec<String>> {
        let status = self.send_command(Command::NewNews {
            wildmat: wildmat.to_string(),
            date: date.to_string(),
            time: time.to_string(),
            gmt,
        })?;
        if status.code != 230 {
            return Err(unexpected(status));
        }

        let body = self.read_body_string()?;
        Ok(body.lines().map(str::to_string).collect())
    }

    // ===== Server information =====

    /// The current date and time as known by the server.
    pub fn date(&mut self) -> Result<ServerDate> {
        let status = self.send_command(Command::Date)?;
        if status.code != 111 {
            return Err(unexpected(status));
        }

        ServerDate::parse(&status.message)
    }

    /// The server's help text.
    pub fn help(&mut self) -> Result<String> {
        let status = self.send_command(Command::Help)?;
        if status.code != 100 {
            return Err(unexpected(status));
        }

        self.read_body_string()
    }

    /// Send QUIT and terminate the connection.
    pub fn quit(mut self) -> Result<()> {
        self.send_command(Command::Quit)?;
        Ok(())
    }

    /// Upgrade the connection to TLS (RFC 4642).
    ///
    /// Sends STARTTLS, performs the handshake with `server_name` as the
    /// expected certificate name, and verifies the upgraded channel with a
    /// DATE round-trip; certificate problems typically surface there. On
    /// success the client continues the same NNTP session over the
    /// encrypted stream.
    #[cfg(feature = "tls")]
    #[cfg_attr(docsrs, doc(cfg(feature = "tls")))]
    pub fn starttls(mut self, server_name: &str) -> Result<Client<TlsStream<S>>> {
        let status = self.send_command(Command::StartTls)?;
        if status.code != 382 {
            return Err(unexpected(status));
        }

        let mut client = Client {
            stream: tls_wrap(self.stream, server_name)?,
            cursor: ResponseCursor::new(),
            posting_allowed: self.posting_allowed,
        };
        client.date()?;
        Ok(client)
    }
}

/// Map the shared 4xx outcomes of the article retrieval commands, then
/// require `expected` for success.
fn article_outcome(status: &StatusLine, expected: u16) -> Result<()> {
    match status.code {
        412 => Err(Error::NoGroupSelected),
        420 => Err(Error::CurrentArticleInvalid),
        423 => Err(Error::NoArticleWithNumber),
        430 => Err(Error::NoArticleWithId),
        code if code == expected => Ok(()),
        _ => Err(unexpected(status.clone())),
    }
}

fn unexpected(status: StatusLine) -> Error {
    Error::Unexpected {
        code: status.code,
        message: status.message,
    }
}

#[cfg(feature = "tls")]
fn tls_wrap<S: Read + Write>(stream: S, server_name: &str) -> Result<TlsStream<S>> {
    let mut roots = rustls::RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let config = rustls::ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();

    let name = rustls::pki_types::ServerName::try_from(server_name.to_string())
        .map_err(|e| Error::Tls(e.to_string()))?;
    let conn = rustls::ClientConnection::new(Arc::new(config), name)?;

    Ok(rustls::StreamOwned::new(conn, stream))
}
