//! Stdio transport for MCP JSON-RPC communication.
//!
//! MCP uses newline-delimited JSON over stdin/stdout. The transport is split
//! into a reader and a writer half so responses can be written while further
//! requests are still being read and served.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};

use crate::protocol::{JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};

/// Message that can be received from the client.
#[derive(Debug)]
pub enum IncomingMessage {
    Request(JsonRpcRequest),
    Notification(JsonRpcNotification),
}

/// Parse one JSON-RPC message. Shared by the stdio and HTTP transports.
pub fn parse_message(raw: &str) -> Result<IncomingMessage, JsonRpcError> {
    // Try to parse as request first (has id field)
    if let Ok(request) = serde_json::from_str::<JsonRpcRequest>(raw) {
        return Ok(IncomingMessage::Request(request));
    }

    // Try as notification (no id field)
    if let Ok(notification) = serde_json::from_str::<JsonRpcNotification>(raw) {
        return Ok(IncomingMessage::Notification(notification));
    }

    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(_) => Err(JsonRpcError::invalid_request("not a JSON-RPC request or notification")),
        Err(e) => Err(JsonRpcError::parse_error(&e.to_string())),
    }
}

/// Outcome of reading one line.
#[derive(Debug)]
pub enum ReadOutcome {
    Message(IncomingMessage),
    /// The line could not be understood; answered with a null-id error.
    Invalid(JsonRpcError),
    Eof,
}

/// Reading half of the transport.
pub struct MessageReader<R> {
    reader: R,
    line: String,
}

impl<R: AsyncBufRead + Unpin> MessageReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
        }
    }

    /// Read the next message, skipping blank lines.
    pub async fn read_message(&mut self) -> io::Result<ReadOutcome> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line).await? == 0 {
                return Ok(ReadOutcome::Eof);
            }

            let line = self.line.trim();
            if line.is_empty() {
                continue;
            }

            tracing::debug!("Received: {}", line);

            return Ok(match parse_message(line) {
                Ok(message) => ReadOutcome::Message(message),
                Err(err) => {
                    tracing::warn!("Failed to parse message: {}", line);
                    ReadOutcome::Invalid(err)
                }
            });
        }
    }
}

/// Writing half of the transport.
pub struct MessageWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> MessageWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write a JSON-RPC response as one line.
    pub async fn write_response(&mut self, response: &JsonRpcResponse) -> io::Result<()> {
        let json = serde_json::to_string(response).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("Serialization error: {}", e))
        })?;

        tracing::debug!("Sending: {}", json);

        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }
}

/// Transport for reading/writing JSON-RPC messages.
pub struct StdioTransport<R, W> {
    reader: MessageReader<R>,
    writer: MessageWriter<W>,
}

impl StdioTransport<BufReader<Stdin>, Stdout> {
    /// Create a transport using stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin> StdioTransport<R, W> {
    /// Create a transport with custom reader/writer.
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: MessageReader::new(reader),
            writer: MessageWriter::new(writer),
        }
    }

    pub fn into_split(self) -> (MessageReader<R>, MessageWriter<W>) {
        (self.reader, self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::RequestId;
    use std::io::Cursor;

    fn reader(input: &str) -> MessageReader<Cursor<Vec<u8>>> {
        MessageReader::new(Cursor::new(input.as_bytes().to_vec()))
    }

    #[tokio::test]
    async fn test_read_request() {
        let mut reader = reader(r#"{"jsonrpc":"2.0","id":1,"method":"test","params":{}}"#);

        match reader.read_message().await.unwrap() {
            ReadOutcome::Message(IncomingMessage::Request(req)) => {
                assert_eq!(req.method, "test");
                assert_eq!(req.id, RequestId::Number(1));
            }
            other => panic!("Expected request, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_notification() {
        let mut reader = reader("{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n");

        match reader.read_message().await.unwrap() {
            ReadOutcome::Message(IncomingMessage::Notification(notif)) => {
                assert_eq!(notif.method, "notifications/initialized");
            }
            other => panic!("Expected notification, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_blank_lines_are_skipped() {
        let mut reader = reader("\n\n{\"jsonrpc\":\"2.0\",\"id\":\"a\",\"method\":\"ping\"}\n");

        match reader.read_message().await.unwrap() {
            ReadOutcome::Message(IncomingMessage::Request(req)) => {
                assert_eq!(req.id, RequestId::String("a".to_string()));
            }
            other => panic!("Expected request, got {:?}", other),
        }
        assert!(matches!(
            reader.read_message().await.unwrap(),
            ReadOutcome::Eof
        ));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let mut reader = reader("{not json}\n");

        match reader.read_message().await.unwrap() {
            ReadOutcome::Invalid(err) => assert_eq!(err.code, JsonRpcError::PARSE_ERROR),
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_json_but_not_jsonrpc() {
        let mut reader = reader("[1, 2, 3]\n");

        match reader.read_message().await.unwrap() {
            ReadOutcome::Invalid(err) => assert_eq!(err.code, JsonRpcError::INVALID_REQUEST),
            other => panic!("Expected invalid request, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_wrong_jsonrpc_version() {
        let mut reader = reader(r#"{"jsonrpc":"1.0","id":1,"method":"ping"}"#);

        match reader.read_message().await.unwrap() {
            ReadOutcome::Invalid(err) => assert_eq!(err.code, JsonRpcError::INVALID_REQUEST),
            other => panic!("Expected invalid request, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_eof() {
        let mut reader = reader("");
        assert!(matches!(
            reader.read_message().await.unwrap(),
            ReadOutcome::Eof
        ));
    }

    #[tokio::test]
    async fn test_write_response() {
        let mut writer = MessageWriter::new(Vec::new());

        let response = JsonRpcResponse::ok(RequestId::Number(1), &serde_json::json!({"ok": 1}));
        writer.write_response(&response).await.unwrap();

        let output = String::from_utf8(writer.writer).unwrap();
        assert!(output.ends_with('\n'));
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains("\"jsonrpc\":\"2.0\""));
        assert!(output.contains("\"id\":1"));
    }
}
