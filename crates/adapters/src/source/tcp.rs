// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live source: a line-delimited TCP feed from the board bridge.

use super::{SnapshotSource, SourceError};
use async_trait::async_trait;
use std::io;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// Streaming source over a TCP connection.
///
/// A clean shutdown by the peer is a fatal `Closed` error: the board
/// bridge going away must surface as a disconnect, never as an endless
/// quiet feed.
pub struct TcpSource {
    stream: TcpStream,
    buf: Vec<u8>,
    peer: String,
}

impl TcpSource {
    pub async fn connect(addr: &str) -> Result<Self, SourceError> {
        let stream = TcpStream::connect(addr).await?;
        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| addr.to_string());
        Ok(Self {
            stream,
            buf: Vec::new(),
            peer,
        })
    }

    /// Pull everything currently available off the socket without blocking.
    fn fill(&mut self) -> Result<(), SourceError> {
        let mut chunk = [0u8; 4096];
        loop {
            match self.stream.try_read(&mut chunk) {
                Ok(0) => return Err(SourceError::Closed),
                Ok(n) => self.buf.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[async_trait]
impl SnapshotSource for TcpSource {
    async fn is_readable(&mut self) -> Result<bool, SourceError> {
        self.fill()?;
        Ok(self.buf.contains(&b'\n'))
    }

    async fn read_line(&mut self) -> Result<Option<Vec<u8>>, SourceError> {
        self.fill()?;
        let Some(end) = self.buf.iter().position(|&b| b == b'\n') else {
            return Ok(None);
        };
        let mut line: Vec<u8> = self.buf.drain(..=end).collect();
        line.pop(); // the newline itself
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    async fn reset_buffer(&mut self) -> Result<(), SourceError> {
        self.fill()?;
        self.buf.clear();
        Ok(())
    }

    async fn close(&mut self) {
        let _ = self.stream.shutdown().await;
    }

    fn describe(&self) -> String {
        format!("tcp://{}", self.peer)
    }
}

#[cfg(test)]
#[path = "tcp_tests.rs"]
mod tests;
