//! Package-protocol test client for driver tests.
//!
//! Provides a TestClient that connects over TCP and performs the handshake.

use std::net::SocketAddr;

use hybridsock::codec::{PackageReader, PackageWriter};
use hybridsock::{Config, Frame, PackageType, Result};
use tokio::io::{ReadHalf, WriteHalf};
use tokio::net::TcpStream;

use super::{notify, package};

/// Client side of a package-protocol connection.
pub struct TestClient {
    reader: PackageReader<ReadHalf<TcpStream>>,
    writer: PackageWriter<WriteHalf<TcpStream>>,
}

impl TestClient {
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let (read_half, write_half) = tokio::io::split(stream);
        Ok(Self {
            reader: PackageReader::new(read_half, &Config::default()),
            writer: PackageWriter::new(write_half),
        })
    }

    /// Connect and complete the handshake: request, response, ack.
    pub async fn connect_and_handshake(addr: SocketAddr) -> Result<Self> {
        let mut client = Self::connect(addr).await?;
        client.send_raw(&package(PackageType::Handshake, b"{}")).await?;

        let response = client.recv().await?.expect("handshake response");
        assert_eq!(response.kind, PackageType::Handshake);

        client.send_raw(&package(PackageType::HandshakeAck, b"")).await?;
        Ok(client)
    }

    pub async fn send_raw(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_package(data).await
    }

    pub async fn send_notify(&mut self, route: &str, body: &str) -> Result<()> {
        self.send_raw(&notify(route, body)).await
    }

    /// Next package from the server, `None` once the server closed.
    pub async fn recv(&mut self) -> Result<Option<Frame>> {
        match self.reader.read_package().await? {
            Some(raw) => Ok(Some(Frame::decode(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.writer.shutdown().await
    }
}
