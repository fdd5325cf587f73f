//! Minimal Modbus-TCP client: read one holding register, write one register.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, trace, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::codec::{self, Address, Word, READ_RESPONSE_SIZE, WRITE_RESPONSE_SIZE};
use crate::config::ClientConfig;
use crate::core::RegisterClient;
use crate::error::{Error, Result};
use crate::transaction::TransactionIds;

/// Client for a single device endpoint.
///
/// Holds at most one TCP connection, opened on first use. Any failed call
/// drops the connection and the next call reconnects. Calls take `&mut self`,
/// so a shared client has to be wrapped in a mutex by the caller.
#[derive(Debug)]
pub struct ModbusClient {
    config: ClientConfig,
    stream: Option<TcpStream>,
    transaction_ids: TransactionIds,
}

impl ModbusClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            stream: None,
            transaction_ids: TransactionIds::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Number of requests currently awaiting a response.
    pub fn outstanding_transactions(&self) -> usize {
        self.transaction_ids.outstanding()
    }

    /// Read one holding register.
    pub async fn read(&mut self, address: Address) -> Result<Word> {
        self.ensure_connected().await?;

        let tid = self.transaction_ids.acquire()?;
        let request = codec::build_read_frame(address, tid.get());
        let response = self.transact::<READ_RESPONSE_SIZE>(&request).await?;
        tid.release();

        if let Err(err) = codec::check_read_response(&request, &response) {
            if self.config.verify_read_responses {
                self.drop_connection();
                return Err(err);
            }
            warn!("register {address}: {err}");
        }

        let value = codec::decode_read_response(&response);
        debug!("read register {address} = {value}");
        Ok(value)
    }

    /// Write one register through function 16 and verify the echo.
    pub async fn write(&mut self, address: Address, value: Word) -> Result<()> {
        self.ensure_connected().await?;

        let tid = self.transaction_ids.acquire()?;
        let request = codec::build_write_frame(address, value, tid.get());
        let response = self.transact::<WRITE_RESPONSE_SIZE>(&request).await?;
        tid.release();

        if response != codec::expected_write_response(&request) {
            self.drop_connection();
            return Err(Error::Protocol("write response invalid".to_string()));
        }

        debug!("wrote register {address} = {value}");
        Ok(())
    }

    /// Write `value`, then read the register back.
    pub async fn update(&mut self, address: Address, value: Word) -> Result<Word> {
        self.write(address, value).await?;
        self.read(address).await
    }

    /// Close the connection. Errors while closing are ignored.
    pub async fn disconnect(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            debug!("disconnecting from {}", self.config.endpoint());
            let _ = stream.shutdown().await;
        }
    }

    async fn ensure_connected(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let endpoint = self.config.endpoint();
        debug!("connecting to {endpoint}");
        let connect = TcpStream::connect((self.config.host.as_str(), self.config.port));
        let stream = match timeout(self.config.timeout(), connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(Error::Connection { endpoint, source }),
            Err(_) => {
                return Err(Error::Connection {
                    endpoint,
                    source: io::Error::new(io::ErrorKind::TimedOut, "connect timed out"),
                })
            }
        };
        if let Err(err) = stream.set_nodelay(true) {
            warn!("{endpoint}: could not disable Nagle's algorithm: {err}");
        }

        self.stream = Some(stream);
        Ok(())
    }

    /// Send `request` and receive exactly `N` response bytes. On failure the
    /// connection is dropped so that the socket is closed.
    async fn transact<const N: usize>(&mut self, request: &[u8]) -> Result<[u8; N]> {
        let limit = self.config.timeout();
        let Some(stream) = self.stream.as_mut() else {
            return Err(io::Error::from(io::ErrorKind::NotConnected).into());
        };

        let result = exchange::<_, N>(stream, request, limit).await;
        if let Err(err) = &result {
            debug!("{}: {err}, dropping connection", self.config.endpoint());
            self.drop_connection();
        }
        result
    }

    fn drop_connection(&mut self) {
        self.stream = None;
    }
}

#[async_trait]
impl RegisterClient for ModbusClient {
    async fn read(&mut self, address: Address) -> Result<Word> {
        ModbusClient::read(self, address).await
    }

    async fn write(&mut self, address: Address, value: Word) -> Result<()> {
        ModbusClient::write(self, address, value).await
    }

    async fn update(&mut self, address: Address, value: Word) -> Result<Word> {
        ModbusClient::update(self, address, value).await
    }
}

async fn exchange<S, const N: usize>(
    stream: &mut S,
    request: &[u8],
    limit: Duration,
) -> Result<[u8; N]>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    trace!("-> {request:02x?}");
    timeout(limit, stream.write_all(request))
        .await
        .map_err(|_| Error::Timeout {
            operation: "sending request",
            timeout: limit,
        })??;

    let mut response = [0u8; N];
    timeout(limit, read_frame(stream, &mut response))
        .await
        .map_err(|_| Error::Timeout {
            operation: "receiving response",
            timeout: limit,
        })??;
    trace!("<- {response:02x?}");

    Ok(response)
}

/// Fill `buffer` completely. A zero-byte read means the peer closed.
async fn read_frame<S>(stream: &mut S, buffer: &mut [u8]) -> io::Result<()>
where
    S: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buffer.len() {
        let read = stream.read(&mut buffer[filled..]).await?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "connection closed after {filled} of {} response bytes",
                    buffer.len()
                ),
            ));
        }
        filled += read;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn exchange_collects_partial_reads() {
        let (mut client, mut device) = duplex(64);
        let peer = tokio::spawn(async move {
            let mut request = [0u8; 12];
            device.read_exact(&mut request).await.unwrap();
            device.write_all(&[0, 0, 0, 0, 0]).await.unwrap();
            tokio::task::yield_now().await;
            device.write_all(&[5, 0, 3, 2, 0, 42]).await.unwrap();
            request
        });

        let request = codec::build_read_frame(1, 0);
        let response: [u8; READ_RESPONSE_SIZE] =
            exchange(&mut client, &request, Duration::from_secs(1))
                .await
                .unwrap();
        assert_eq!(codec::decode_read_response(&response), 42);
        assert_eq!(peer.await.unwrap().to_vec(), request);
    }

    #[tokio::test]
    async fn peer_closing_mid_frame_is_an_io_error() {
        let (mut client, mut device) = duplex(64);
        tokio::spawn(async move {
            let mut request = [0u8; 12];
            device.read_exact(&mut request).await.unwrap();
            device.write_all(&[0, 0, 0, 0]).await.unwrap();
        });

        let request = codec::build_read_frame(1, 0);
        let result =
            exchange::<_, READ_RESPONSE_SIZE>(&mut client, &request, Duration::from_secs(1)).await;
        match result {
            Err(Error::Io(err)) => assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[tokio::test]
    async fn silent_peer_times_out() {
        let (mut client, _device) = duplex(64);
        let request = codec::build_read_frame(1, 0);
        let result =
            exchange::<_, READ_RESPONSE_SIZE>(&mut client, &request, Duration::from_millis(50))
                .await;
        assert!(matches!(
            result,
            Err(Error::Timeout {
                operation: "receiving response",
                ..
            })
        ));
    }
}
