//! Task-per-session driver over an async byte stream.
//!
//! Three tasks cooperate per connection:
//!
//! - the **reader** splits the stream into packages,
//! - the **writer** owns the write half and executes [`Outbound`] instructions,
//! - the **session task** owns the [`Session`] and consumes one channel that
//!   carries reader notifications, writer notifications and handle commands.
//!
//! Every mutation of the session goes through that single consumer, so no
//! locking is needed.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::codec::{PackageReader, PackageWriter};
use crate::config::Config;
use crate::connection::{Session, SessionId, SessionState};
use crate::error::{Error, Result};
use crate::event::SessionEvent;
use crate::payload::Payload;
use crate::transport::{ChannelTransport, Outbound, RemoteAddress};

#[derive(Debug)]
enum Command {
    Send(Payload),
    SendBatch(Vec<Payload>),
    SendForce(Bytes),
    RespondHandshake(Bytes),
    Disconnect,
}

#[derive(Debug)]
enum Inbound {
    Bytes(Bytes),
    Error(Error),
    Closed,
    Command(Command),
}

/// Cloneable handle to a session running in its own task.
///
/// Calls are queued to the session task and applied in order. Sends fail
/// with `Error::SessionClosed` only once that task has finished; state-gated
/// no-ops inside the session are not reported. `disconnect` never fails.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    remote: RemoteAddress,
    tx: mpsc::UnboundedSender<Inbound>,
    state: watch::Receiver<SessionState>,
}

impl SessionHandle {
    /// Session identifier.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Peer address.
    pub fn remote_address(&self) -> RemoteAddress {
        self.remote
    }

    /// Most recently published session state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Queue [`Session::send`].
    pub fn send(&self, payload: impl Into<Payload>) -> Result<()> {
        self.command(Command::Send(payload.into()))
    }

    /// Queue [`Session::send_batch`].
    pub fn send_batch<I>(&self, payloads: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Payload>,
    {
        let payloads = payloads.into_iter().map(Into::into).collect();
        self.command(Command::SendBatch(payloads))
    }

    /// Queue [`Session::send_force`].
    pub fn send_force(&self, data: impl Into<Bytes>) -> Result<()> {
        self.command(Command::SendForce(data.into()))
    }

    /// Queue [`Session::respond_handshake`].
    pub fn respond_handshake(&self, data: impl Into<Bytes>) -> Result<()> {
        self.command(Command::RespondHandshake(data.into()))
    }

    /// Queue [`Session::disconnect`].
    ///
    /// Always callable. Returns `false` if the session task has already
    /// finished, in which case there is nothing left to close.
    pub fn disconnect(&self) -> bool {
        self.command(Command::Disconnect).is_ok()
    }

    /// Wait until the session reaches a state matching `f`.
    ///
    /// Returns the matching state, or `Error::SessionClosed` if the session
    /// task finished first.
    pub async fn wait_for(&self, f: impl FnMut(&SessionState) -> bool) -> Result<SessionState> {
        let mut rx = self.state.clone();
        let state = rx.wait_for(f).await.map_err(|_| Error::SessionClosed)?;
        Ok(*state)
    }

    /// Wait until the session is closed.
    pub async fn closed(&self) {
        let _ = self.wait_for(|state| !state.is_active()).await;
    }

    fn command(&self, command: Command) -> Result<()> {
        self.tx
            .send(Inbound::Command(command))
            .map_err(|_| Error::SessionClosed)
    }
}

/// Run a session over an accepted TCP stream.
///
/// ## Errors
///
/// Returns an I/O error if the peer address cannot be read.
pub fn spawn_tcp(
    id: impl Into<SessionId>,
    stream: TcpStream,
    config: Config,
) -> Result<(SessionHandle, mpsc::UnboundedReceiver<SessionEvent>)> {
    let remote = RemoteAddress::from(stream.peer_addr()?);
    Ok(spawn(id, stream, remote, config))
}

/// Run a session over any bidirectional byte stream.
///
/// Must be called from within a tokio runtime. Returns the handle and the
/// receiving end of the session's event channel.
pub fn spawn<IO>(
    id: impl Into<SessionId>,
    io: IO,
    remote: RemoteAddress,
    config: Config,
) -> (SessionHandle, mpsc::UnboundedReceiver<SessionEvent>)
where
    IO: AsyncRead + AsyncWrite + Send + 'static,
{
    let id = id.into();
    let (read_half, write_half) = tokio::io::split(io);
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(SessionState::Init);

    let reader = tokio::spawn(read_loop(
        PackageReader::new(read_half, &config),
        inbound_tx.clone(),
    ));
    tokio::spawn(write_loop(
        PackageWriter::new(write_half),
        outbound_rx,
        inbound_tx.clone(),
    ));

    let session = Session::with_config(
        id.clone(),
        ChannelTransport::new(outbound_tx, remote),
        event_tx,
        config,
    );
    tokio::spawn(run(session, inbound_rx, state_tx, reader));

    let handle = SessionHandle {
        id,
        remote,
        tx: inbound_tx,
        state: state_rx,
    };
    (handle, event_rx)
}

async fn run(
    mut session: Session<ChannelTransport, mpsc::UnboundedSender<SessionEvent>>,
    mut inbound: mpsc::UnboundedReceiver<Inbound>,
    state: watch::Sender<SessionState>,
    reader: JoinHandle<()>,
) {
    while let Some(next) = inbound.recv().await {
        let transport_closed = matches!(next, Inbound::Closed);
        match next {
            Inbound::Bytes(bytes) => session.on_bytes(&bytes),
            Inbound::Error(err) => session.on_transport_error(err),
            Inbound::Closed => session.on_transport_close(),
            Inbound::Command(command) => apply(&mut session, command),
        }
        state.send_replace(session.state());
        if transport_closed {
            break;
        }
    }

    reader.abort();
    debug!(session = %session.id(), "session task finished");
}

fn apply(
    session: &mut Session<ChannelTransport, mpsc::UnboundedSender<SessionEvent>>,
    command: Command,
) {
    match command {
        Command::Send(payload) => {
            session.send(payload);
        }
        Command::SendBatch(payloads) => {
            session.send_batch(payloads);
        }
        Command::SendForce(data) => {
            session.send_force(data);
        }
        Command::RespondHandshake(data) => {
            session.respond_handshake(data);
        }
        Command::Disconnect => {
            session.disconnect();
        }
    }
}

async fn read_loop<R: AsyncRead + Unpin>(
    mut reader: PackageReader<R>,
    tx: mpsc::UnboundedSender<Inbound>,
) {
    loop {
        match reader.read_package().await {
            Ok(Some(package)) => {
                if tx.send(Inbound::Bytes(package)).is_err() {
                    return;
                }
            }
            Ok(None) => {
                trace!("peer closed stream");
                break;
            }
            Err(err) => {
                let _ = tx.send(Inbound::Error(err));
                break;
            }
        }
    }
    let _ = tx.send(Inbound::Closed);
}

async fn write_loop<W: AsyncWrite + Unpin>(
    mut writer: PackageWriter<W>,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    tx: mpsc::UnboundedSender<Inbound>,
) {
    while let Some(next) = outbound.recv().await {
        match next {
            Outbound::Data(bytes) => {
                if let Err(err) = writer.write_package(&bytes).await {
                    let _ = tx.send(Inbound::Error(err));
                    break;
                }
            }
            Outbound::Close => {
                if let Err(err) = writer.shutdown().await {
                    warn!(error = %err, "stream shutdown failed");
                }
                break;
            }
        }
    }
    let _ = tx.send(Inbound::Closed);
}
