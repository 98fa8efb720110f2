use crate::counters::TransferCounters;
use crate::error::MessageError;
use bytes::Bytes;
use quinn::{Connection, ConnectionError, Endpoint, SendDatagramError};
use std::ops::Deref;
use std::sync::Arc;

/// QUIC connection whose datagram (message) traffic is counted.
///
/// Datagrams go through the counted methods here, which shadow the
/// [`Connection`] methods of the same name. Everything else is reachable
/// through `Deref`. Datagrams moved through [`get_ref`](Self::get_ref) or
/// [`into_inner`](Self::into_inner) are not counted.
#[derive(Debug)]
pub struct CountingQuicConnection {
    inner: Connection,
    endpoint: Endpoint,
    counters: Arc<TransferCounters>,
}

impl CountingQuicConnection {
    pub(crate) fn new(
        inner: Connection,
        endpoint: Endpoint,
        counters: Arc<TransferCounters>,
    ) -> Self {
        Self {
            inner,
            endpoint,
            counters,
        }
    }

    /// Waits for the next datagram from the peer.
    pub async fn receive_message(&self) -> Result<Bytes, MessageError> {
        Ok(self.read_datagram().await?)
    }

    /// Queues `message` as a single datagram. Either the whole message is
    /// accepted or nothing is.
    pub fn send_message(&self, message: Bytes) -> Result<(), MessageError> {
        Ok(self.send_datagram(message)?)
    }

    /// Like [`send_message`](Self::send_message), but waits for room in the
    /// send buffer instead of dropping older datagrams.
    pub async fn send_message_wait(&self, message: Bytes) -> Result<(), MessageError> {
        Ok(self.send_datagram_wait(message).await?)
    }

    /// Counted [`Connection::read_datagram`].
    pub async fn read_datagram(&self) -> Result<Bytes, ConnectionError> {
        let datagram = self.inner.read_datagram().await?;
        self.counters.add_read(datagram.len());
        Ok(datagram)
    }

    /// Counted [`Connection::send_datagram`].
    pub fn send_datagram(&self, data: Bytes) -> Result<(), SendDatagramError> {
        let length = data.len();
        self.inner.send_datagram(data)?;
        self.counters.add_written(length);
        Ok(())
    }

    /// Counted [`Connection::send_datagram_wait`].
    pub async fn send_datagram_wait(&self, data: Bytes) -> Result<(), SendDatagramError> {
        let length = data.len();
        self.inner.send_datagram_wait(data).await?;
        self.counters.add_written(length);
        Ok(())
    }

    pub fn counters(&self) -> &Arc<TransferCounters> {
        &self.counters
    }

    /// The client endpoint the connection was dialed from.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn get_ref(&self) -> &Connection {
        &self.inner
    }

    pub fn into_inner(self) -> Connection {
        self.inner
    }
}

impl Deref for CountingQuicConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.inner
    }
}
