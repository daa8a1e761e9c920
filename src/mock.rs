//! Mock streams and a local NNTP server for testing purposes.
//!
//! Two test doubles are provided:
//!
//! - [`ScriptedStream`]: an in-memory stream that replays a canned server
//!   script and records everything the client writes. Suited to unit tests,
//!   including truncation scenarios (the script simply ends).
//! - [`TestServer`]: a real TCP listener on a loopback port with a
//!   per-command handler, for integration tests against
//!   [`Client::connect`](crate::Client::connect).

use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

/// In-memory stream with a scripted server side.
///
/// Reads are paced one response line per call, the way a strict
/// request-reply connection delivers them; once the script runs out, reads
/// report end of stream. [`from_chunks`](Self::from_chunks) gives explicit
/// control over how bytes coalesce into reads instead. Writes are captured
/// and can be inspected through the [`WriteLog`] handle obtained before
/// handing the stream to a client.
#[derive(Debug)]
pub struct ScriptedStream {
    chunks: VecDeque<Vec<u8>>,
    written: WriteLog,
    fail_writes: bool,
}

impl ScriptedStream {
    /// Create a stream that replays `script`, one line per read.
    pub fn new(script: impl Into<Vec<u8>>) -> Self {
        Self::from_chunks(split_lines(&script.into()))
    }

    /// Create a stream that replays exactly one chunk per read call.
    ///
    /// Useful for simulating TCP coalescing, where one read returns a status
    /// line together with payload bytes the server sent after it.
    pub fn from_chunks(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks: chunks.into(),
            written: WriteLog::default(),
            fail_writes: false,
        }
    }

    /// Create a stream whose writes all fail, while replaying `script`
    /// normally on the read side.
    pub fn with_failing_writes(script: impl Into<Vec<u8>>) -> Self {
        Self {
            fail_writes: true,
            ..Self::new(script)
        }
    }

    /// A handle onto the bytes written to this stream.
    pub fn write_log(&self) -> WriteLog {
        self.written.clone()
    }
}

/// Split a script into chunks of one line each, terminators included; a
/// trailing fragment with no terminator becomes a chunk of its own.
fn split_lines(script: &[u8]) -> Vec<Vec<u8>> {
    let mut chunks = Vec::new();
    let mut start = 0;
    for (index, &byte) in script.iter().enumerate() {
        if byte == b'\n' {
            chunks.push(script[start..=index].to_vec());
            start = index + 1;
        }
    }
    if start < script.len() {
        chunks.push(script[start..].to_vec());
    }
    chunks
}

impl Read for ScriptedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(chunk) = self.chunks.front_mut() else {
            return Ok(0);
        };

        let count = buf.len().min(chunk.len());
        buf[..count].copy_from_slice(&chunk[..count]);
        chunk.drain(..count);
        if chunk.is_empty() {
            self.chunks.pop_front();
        }
        Ok(count)
    }
}

impl Write for ScriptedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(io::Error::other("scripted write failure"));
        }
        self.written.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Shared view of the bytes a [`ScriptedStream`] has captured.
#[derive(Debug, Clone, Default)]
pub struct WriteLog(Arc<Mutex<Vec<u8>>>);

impl WriteLog {
    /// All bytes written so far.
    pub fn bytes(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }

    /// All bytes written so far, lossily decoded for assertions.
    pub fn as_string(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }
}

/// Handler invoked once per received command line.
///
/// Receives the lowercased command name and its parameters, and returns the
/// response lines to send back; each is CRLF-terminated on the wire.
pub type CommandHandler = Arc<dyn Fn(&str, &[&str]) -> Vec<String> + Send + Sync>;

/// A minimal NNTP server on a loopback port.
///
/// Every accepted connection is greeted with `200 welcome`, then each
/// command line is routed to the handler. The accept loop runs on a
/// background thread for the lifetime of the process.
pub struct TestServer {
    addr: SocketAddr,
}

impl TestServer {
    /// Bind a listener on an ephemeral loopback port and start serving.
    pub fn spawn(handler: CommandHandler) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;

        thread::spawn(move || {
            for conn in listener.incoming() {
                let Ok(conn) = conn else { break };
                let handler = Arc::clone(&handler);
                thread::spawn(move || {
                    let _ = serve_connection(conn, handler);
                });
            }
        });

        Ok(Self { addr })
    }

    /// The host the server is listening on.
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    /// The port the server is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

fn serve_connection(conn: TcpStream, handler: CommandHandler) -> io::Result<()> {
    let mut writer = conn.try_clone()?;
    writer.write_all(b"200 welcome\r\n")?;

    let reader = BufReader::new(conn);
    for line in reader.lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else { continue };
        let name = name.to_ascii_lowercase();
        let params: Vec<&str> = parts.collect();

        for response in handler(&name, &params) {
            writer.write_all(response.as_bytes())?;
            writer.write_all(b"\r\n")?;
        }

        if name == "quit" {
            break;
        }
    }

    Ok(())
}
