//! One-shot status probe against a single remote server.

use log::debug;
use protocol::{handshake, online_count, read_status_response, status_request};
use protocol::{ProtocolError, PROTOCOL_VERSION};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("connect timed out")]
    ConnectTimeout,
    #[error("read timed out")]
    ReadTimeout,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("status response carries no player count")]
    MissingCount,
}

/// Run one handshake + status exchange and return the online count.
///
/// Opens a fresh connection per call; the socket is dropped on every exit
/// path. The connect phase is bounded by `connect_timeout` and the whole
/// response read by `read_timeout`. Any transport, protocol or extraction
/// failure maps to a [`ProbeError`] — callers treat them all uniformly as
/// "probe failed".
pub async fn probe(
    host: &str,
    port: u16,
    connect_timeout: Duration,
    read_timeout: Duration,
) -> Result<u32, ProbeError> {
    let mut stream = timeout(connect_timeout, TcpStream::connect((host, port)))
        .await
        .map_err(|_| ProbeError::ConnectTimeout)??;

    stream
        .write_all(&handshake(PROTOCOL_VERSION, host, port))
        .await?;
    stream.write_all(&status_request()).await?;

    let mut reader = BufReader::new(stream);
    let json = timeout(read_timeout, read_status_response(&mut reader))
        .await
        .map_err(|_| ProbeError::ReadTimeout)??;
    debug!("{}:{} answered with {} bytes of status JSON", host, port, json.len());

    online_count(&json).ok_or(ProbeError::MissingCount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{frame, read_varint, write_string, write_varint};
    use std::net::SocketAddr;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    const TIMEOUT: Duration = Duration::from_millis(500);

    /// Accepts one connection, consumes the two request frames and answers
    /// with `json` under `packet_id`.
    async fn one_shot_server(packet_id: i32, json: &'static str) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(stream);

            for _ in 0..2 {
                let length = read_varint(&mut reader).await.unwrap();
                let mut body = vec![0u8; length as usize];
                reader.read_exact(&mut body).await.unwrap();
            }

            let mut packet = Vec::new();
            write_varint(&mut packet, packet_id);
            write_string(&mut packet, json);
            let mut stream = reader.into_inner();
            stream.write_all(&frame(packet)).await.unwrap();
        });

        addr
    }

    #[tokio::test]
    async fn reads_online_count() {
        let addr = one_shot_server(0x00, r#"{"players":{"online":42,"max":100}}"#).await;
        let count = probe("127.0.0.1", addr.port(), TIMEOUT, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(count, 42);
    }

    #[tokio::test]
    async fn connection_refused_is_an_error() {
        // Bind and immediately drop to find a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = probe("127.0.0.1", port, TIMEOUT, TIMEOUT).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn wrong_packet_id_is_an_error() {
        let addr = one_shot_server(0x01, r#"{"players":{"online":42}}"#).await;
        let result = probe("127.0.0.1", addr.port(), TIMEOUT, TIMEOUT).await;
        assert!(matches!(
            result,
            Err(ProbeError::Protocol(ProtocolError::UnexpectedPacket(0x01)))
        ));
    }

    #[tokio::test]
    async fn missing_count_is_an_error() {
        let addr = one_shot_server(0x00, r#"{"description":{"text":"hi"}}"#).await;
        let result = probe("127.0.0.1", addr.port(), TIMEOUT, TIMEOUT).await;
        assert!(matches!(result, Err(ProbeError::MissingCount)));
    }

    #[tokio::test]
    async fn stalled_server_hits_read_timeout() {
        // Accept the connection but never answer.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let result = probe(
            "127.0.0.1",
            addr.port(),
            TIMEOUT,
            Duration::from_millis(100),
        )
        .await;
        assert!(matches!(result, Err(ProbeError::ReadTimeout)));
    }
}
