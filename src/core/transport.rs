use crate::domain::model::Destination;
use crate::domain::ports::Transport;
use crate::utils::error::{LabelError, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(5);

/// 每次呼叫都開新的 TCP 連線：寫入、flush、關閉，不讀取印表機回應
#[derive(Debug, Clone)]
pub struct TcpTransport {
    io_timeout: Duration,
}

impl TcpTransport {
    pub fn new(io_timeout: Duration) -> Self {
        Self { io_timeout }
    }

    async fn connect(&self, destination: &Destination) -> Result<TcpStream> {
        let connect = TcpStream::connect((destination.host.as_str(), destination.port));
        match tokio::time::timeout(self.io_timeout, connect).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => {
                Err(LabelError::ConnectionRefused {
                    destination: destination.to_string(),
                })
            }
            Ok(Err(e)) => Err(transport_error(destination, e)),
            Err(_) => Err(timeout_error(destination, "connect", self.io_timeout)),
        }
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_IO_TIMEOUT)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send(&self, destination: &Destination, payload: &str) -> Result<usize> {
        let mut stream = self.connect(destination).await?;
        tracing::debug!("Connected to {}", destination);

        let bytes = payload.as_bytes();
        let write = async {
            stream.write_all(bytes).await?;
            stream.flush().await?;
            stream.shutdown().await?;
            Ok::<(), std::io::Error>(())
        };

        match tokio::time::timeout(self.io_timeout, write).await {
            Ok(Ok(())) => Ok(bytes.len()),
            Ok(Err(e)) => Err(transport_error(destination, e)),
            Err(_) => Err(timeout_error(destination, "write", self.io_timeout)),
        }
    }
}

fn transport_error(destination: &Destination, message: impl ToString) -> LabelError {
    LabelError::TransportError {
        destination: destination.to_string(),
        message: message.to_string(),
    }
}

fn timeout_error(destination: &Destination, stage: &str, timeout: Duration) -> LabelError {
    transport_error(destination, format!("{} timed out after {:?}", stage, timeout))
}

/// 試跑模式：把渲染結果印到 stdout，不開任何連線
#[derive(Debug, Clone, Default)]
pub struct DryRunTransport;

#[async_trait]
impl Transport for DryRunTransport {
    async fn send(&self, destination: &Destination, payload: &str) -> Result<usize> {
        println!("----- {} ({} bytes) -----", destination, payload.len());
        println!("{}", payload);
        Ok(payload.len())
    }
}
