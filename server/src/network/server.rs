//! UDP game server.
//!
//! Decodes client packets, forwards them to [`GameService`] and writes the
//! replies back. Each client address gets its own session and writer task,
//! so hunting and arena events reach the client without going through the
//! receive loop.

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use idle_shared::{ClientMessage, ServerMessage, PROTOCOL_VERSION};

use super::NetworkError;
use crate::arena::JoinOutcome;
use crate::service::GameService;
use crate::session::{EventSender, SessionId};

/// Maximum packet size
const MAX_PACKET_SIZE: usize = 1200;

/// How often idle connections are checked
const TIMEOUT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Client connection state
struct ClientConnection {
    session: SessionId,
    last_seen: Instant,
    outbound: EventSender,
    writer: JoinHandle<()>,
}

impl ClientConnection {
    fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// Game server
pub struct Server {
    socket: Arc<UdpSocket>,
    service: Arc<GameService>,
    clients: HashMap<SocketAddr, ClientConnection>,
    next_session_id: u64,
    session_timeout: Duration,
}

impl Server {
    /// Create a new server listening on the given port
    pub async fn new(port: u16, service: Arc<GameService>, session_timeout: Duration) -> Result<Self, NetworkError> {
        let addr = format!("0.0.0.0:{}", port);
        let socket = UdpSocket::bind(&addr).await?;
        info!("Listening on {}", socket.local_addr()?);

        Ok(Self {
            socket: Arc::new(socket),
            service,
            clients: HashMap::new(),
            next_session_id: 1,
            session_timeout,
        })
    }

    /// Serve until `shutdown` resolves, then end every session
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) {
        let mut buf = [0u8; MAX_PACKET_SIZE];
        let mut sweep = tokio::time::interval(TIMEOUT_SWEEP_INTERVAL);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                received = self.socket.recv_from(&mut buf) => match received {
                    Ok((len, addr)) => self.handle_packet(&buf[..len], addr).await,
                    Err(e) => error!("Error receiving packet: {}", e),
                },
                _ = sweep.tick() => self.check_timeouts().await,
            }
        }

        let addrs: Vec<SocketAddr> = self.clients.keys().copied().collect();
        for addr in addrs {
            self.drop_client(addr).await;
        }
        self.service.shutdown().await;
    }

    /// Handle a received packet
    async fn handle_packet(&mut self, data: &[u8], addr: SocketAddr) {
        let message = match ClientMessage::deserialize(data) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("Failed to deserialize packet from {}: {}", addr, e);
                return;
            }
        };

        let (session, outbound) = self.connection(addr);

        match message {
            ClientMessage::JoinGame { protocol_version, character_id } => {
                let reply = self.handle_join(session, &outbound, protocol_version, character_id).await;
                send(&outbound, reply);
            }
            ClientMessage::StartHunting => {
                let reply = match self.service.on_start_hunting(session).await {
                    Ok(interval) => ServerMessage::HuntingStarted { interval_secs: interval.as_secs().max(1) },
                    Err(e) => ServerMessage::HuntingFailed { reason: e.to_string() },
                };
                send(&outbound, reply);
            }
            ClientMessage::StopHunting => {
                let reply = match self.service.on_stop_hunting(session).await {
                    Ok(_) => ServerMessage::HuntingStopped,
                    Err(e) => ServerMessage::HuntingFailed { reason: e.to_string() },
                };
                send(&outbound, reply);
            }
            ClientMessage::JoinArena => match self.service.on_join_arena(session).await {
                Ok(JoinOutcome::Queued { level_min, level_max }) => {
                    send(&outbound, ServerMessage::ArenaQueued { level_min, level_max });
                }
                // Both participants were already notified
                Ok(JoinOutcome::Matched(_)) => {}
                Err(e) => send(&outbound, ServerMessage::ArenaFailed { reason: e.to_string() }),
            },
            ClientMessage::LeaveArena => {
                let reply = match self.service.on_leave_arena(session).await {
                    Ok(_) => ServerMessage::ArenaLeft,
                    Err(e) => ServerMessage::ArenaFailed { reason: e.to_string() },
                };
                send(&outbound, reply);
            }
            ClientMessage::GetArenaLeaderboard => {
                let reply = match self.service.on_arena_leaderboard().await {
                    Ok(entries) => ServerMessage::ArenaLeaderboard { entries },
                    Err(e) => ServerMessage::ArenaFailed { reason: e.to_string() },
                };
                send(&outbound, reply);
            }
            ClientMessage::EquipItem { item_name } => {
                let reply = match self.service.on_equip_item(session, &item_name).await {
                    Ok(outcome) => ServerMessage::EquipResult {
                        success: outcome.success,
                        message: outcome.message,
                        damage: outcome.stats.map(|s| s.damage),
                        defense: outcome.stats.map(|s| s.defense),
                    },
                    Err(e) => ServerMessage::EquipResult {
                        success: false,
                        message: e.to_string(),
                        damage: None,
                        defense: None,
                    },
                };
                send(&outbound, reply);
            }
            ClientMessage::Heartbeat => {}
            ClientMessage::Disconnect => {
                info!("Client {} disconnected", addr);
                drop(outbound);
                self.drop_client(addr).await;
            }
        }
    }

    async fn handle_join(
        &self,
        session: SessionId,
        outbound: &EventSender,
        protocol_version: u32,
        character_id: u64,
    ) -> ServerMessage {
        if protocol_version != PROTOCOL_VERSION {
            return ServerMessage::JoinFailed {
                reason: format!(
                    "Protocol version mismatch: server {}, client {}",
                    PROTOCOL_VERSION, protocol_version
                ),
            };
        }
        let Ok(character_id) = i64::try_from(character_id) else {
            return ServerMessage::JoinFailed { reason: format!("invalid character id {}", character_id) };
        };

        match self.service.on_session_join(session, character_id, outbound.clone()).await {
            Ok(character) => ServerMessage::GameJoined {
                character_id: character.id as u64,
                name: character.name,
                level: character.level,
                current_map: character.current_map,
            },
            Err(e) => ServerMessage::JoinFailed { reason: e.to_string() },
        }
    }

    /// Session and outbound channel for `addr`, creating them on first contact
    fn connection(&mut self, addr: SocketAddr) -> (SessionId, EventSender) {
        if let Some(client) = self.clients.get_mut(&addr) {
            client.last_seen = Instant::now();
            return (client.session, client.outbound.clone());
        }

        let session = SessionId(self.next_session_id);
        self.next_session_id += 1;

        let (outbound, rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(write_loop(Arc::clone(&self.socket), addr, rx));
        self.clients.insert(addr, ClientConnection {
            session,
            last_seen: Instant::now(),
            outbound: outbound.clone(),
            writer,
        });
        debug!("New session {} for {}", session, addr);
        (session, outbound)
    }

    async fn drop_client(&mut self, addr: SocketAddr) {
        if let Some(client) = self.clients.remove(&addr) {
            self.service.on_session_end(client.session).await;
            // Closing the last sender lets the writer flush and exit
            drop(client.outbound);
            if let Err(e) = client.writer.await {
                warn!("Writer for {} ended abnormally: {}", addr, e);
            }
        }
    }

    async fn check_timeouts(&mut self) {
        let timed_out: Vec<SocketAddr> = self
            .clients
            .iter()
            .filter(|(_, c)| c.is_timed_out(self.session_timeout))
            .map(|(addr, _)| *addr)
            .collect();

        for addr in timed_out {
            warn!("Client {} timed out", addr);
            self.drop_client(addr).await;
        }
    }
}

fn send(outbound: &EventSender, msg: ServerMessage) {
    if outbound.send(msg).is_err() {
        debug!("Dropping reply for a closed session");
    }
}

/// Drain a session's outbound channel onto the socket
async fn write_loop(socket: Arc<UdpSocket>, addr: SocketAddr, mut rx: mpsc::UnboundedReceiver<ServerMessage>) {
    while let Some(msg) = rx.recv().await {
        if let Err(e) = send_to(&socket, addr, &msg).await {
            error!("Failed to send to {}: {}", addr, e);
        }
    }
}

async fn send_to(socket: &UdpSocket, addr: SocketAddr, msg: &ServerMessage) -> Result<(), NetworkError> {
    let data = msg.serialize()?;
    socket.send_to(&data, addr).await?;
    Ok(())
}
