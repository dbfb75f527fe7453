//! Newline-delimited JSON-RPC transport
//!
//! One message per line. Stdio in production; any async reader/writer pair
//! in tests.

use super::protocol::{JsonRpcRequest, JsonRpcResponse};
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Line transport over an async reader/writer pair
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
}

impl LineTransport<BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Read the next request; `Ok(None)` at end of input.
    ///
    /// Blank lines are skipped. A line that is not a valid request yields an
    /// `InvalidData` error and the stream stays usable.
    pub async fn read_request(&mut self) -> io::Result<Option<JsonRpcRequest>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line).await? == 0 {
                return Ok(None);
            }
            if !line.trim().is_empty() {
                break;
            }
        }

        serde_json::from_str(line.trim()).map(Some).map_err(|e| {
            tracing::error!("Failed to parse JSON-RPC request: {}", e);
            io::Error::new(io::ErrorKind::InvalidData, e)
        })
    }

    /// Write one response line and flush
    pub async fn write_response(&mut self, response: &JsonRpcResponse) -> io::Result<()> {
        let json = serde_json::to_string(response)?;
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}
