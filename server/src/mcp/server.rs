//! MCP Stdio Server
//!
//! Reads line-delimited JSON-RPC messages from stdin and writes responses to
//! stdout. Logging goes to stderr so it never mixes with responses.
//!
//! Each request is handled on its own task, so a long bulk call does not
//! block status queries sent after it. Responses are written by a single
//! writer task in completion order, one JSON document per line.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::mcp::handler::McpHandler;
use crate::mcp::protocol::{error_codes, JsonRpcError, JsonRpcResponse};

pub struct McpStdioServer {
    handler: McpHandler,
}

impl McpStdioServer {
    pub fn new(handler: McpHandler) -> Self {
        Self { handler }
    }

    /// Serve until stdin reaches EOF
    pub async fn run(&self) -> anyhow::Result<()> {
        info!("Starting MCP stdio server");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await?;
        info!("MCP stdio server shutting down (EOF received)");
        Ok(())
    }

    /// Serve line-delimited JSON-RPC from `reader` until EOF.
    ///
    /// Returns once every in-flight request has answered and the writer
    /// has flushed.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> anyhow::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
        let writer_task = tokio::spawn(Self::write_responses(writer, rx));
        let mut lines = BufReader::new(reader).lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            debug!(line = %line, "Received input line");

            let request = match serde_json::from_str(&line) {
                Ok(request) => request,
                Err(e) => {
                    warn!(error = %e, "Failed to parse JSON-RPC request");
                    let response = JsonRpcResponse::failure(
                        None,
                        JsonRpcError {
                            code: error_codes::PARSE_ERROR,
                            message: format!("Parse error: {}", e),
                            data: None,
                        },
                    );
                    if tx.send(response).is_err() {
                        break;
                    }
                    continue;
                }
            };

            let handler = self.handler.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(response) = handler.handle_request(request).await {
                    // Receiver only goes away when the writer failed
                    let _ = tx.send(response);
                }
            });
        }

        // The writer ends once every spawned request has dropped its sender
        drop(tx);
        writer_task.await??;
        Ok(())
    }

    async fn write_responses<W>(
        mut writer: W,
        mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>,
    ) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while let Some(response) = rx.recv().await {
            Self::write_response(&mut writer, &response).await?;
        }
        Ok(())
    }

    async fn write_response<W>(writer: &mut W, response: &JsonRpcResponse) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let json = serde_json::to_string(response)?;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok(())
    }
}
