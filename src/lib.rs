//! # nntp-client
//!
//! A synchronous NNTP (Network News Transfer Protocol, RFC 3977) client
//! library for Rust.
//!
//! The library drives a single persistent connection with blocking I/O. At
//! its center sits the response framing layer ([`response`]): reading raw
//! lines, parsing the three-digit status line that opens every reply, and
//! consuming the header and body blocks that some replies carry, delimited
//! only by line terminators and sentinel lines. The [`Client`] builds the
//! per-command surface (group selection, article retrieval, list queries,
//! authentication) on top of three primitives:
//! [`Client::send_command`], [`Client::read_header_block`] and
//! [`Client::read_body_block`].
//!
//! ## Examples
//!
//! ```rust,no_run
//! use nntp_client::{ArticleSpec, Client};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = Client::connect("news.example.com", 119)?;
//! let caps = client.capabilities()?;
//! if caps.supports("READER") {
//!     client.group("misc.test")?;
//!     let headers = client.head(&ArticleSpec::Current)?;
//!     println!("subject: {:?}", headers.get("Subject"));
//! }
//! client.quit()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Scope
//!
//! One exchange at a time, no pipelining, no reconnection; timeouts are the
//! transport's concern (see [`std::net::TcpStream::set_read_timeout`]).
//! Posting is not implemented, though the greeting's posting-allowed flag is
//! tracked. TLS support (implicit TLS and STARTTLS) is available behind the
//! `tls` feature.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod client;
pub mod command;
pub mod error;
pub mod response;

// Scripted streams and a local test server for exercising the client.
pub mod mock;

pub use client::Client;
#[cfg(feature = "tls")]
pub use client::TlsStream;
pub use command::{ArticleSpec, Command, ListVariant};
pub use error::{Error, Result};
pub use response::{
    ActiveGroup, Article, ArticlePointer, Capabilities, DistribPattern, GroupCreation,
    GroupListing, GroupSummary, Headers, NewsgroupDescription, ServerDate, StatusLine,
};
