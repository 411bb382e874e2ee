use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, WebSocketStream};

use crate::browser::SharedBrowser;
use crate::error::ServiceError;
use crate::models::events::{DataSaved, DATA_SAVED};
use crate::services::push_packet::{EnginePacket, SocketPacket, SocketPacketKind};

/// The single push channel subscription of the view.
///
/// Mounting opens the connection and spawns the task that applies `dataSaved`
/// events; unmounting, or dropping the listener, stops that task. A lost
/// connection is logged and not retried.
pub struct LiveUpdateListener {
    handle: JoinHandle<()>,
}

/// Websocket endpoint of the push channel for an `http(s)://` service url.
pub fn push_channel_url(service_url: &str) -> Result<String, ServiceError> {
    let base = service_url.trim_end_matches('/');
    let ws = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if base.starts_with("ws://") || base.starts_with("wss://") {
        base.to_string()
    } else {
        return Err(ServiceError::InvalidUrl(service_url.to_string()));
    };
    Ok(format!("{ws}/socket.io/?EIO=4&transport=websocket"))
}

impl LiveUpdateListener {
    /// Opens the push channel, giving up when the handshake has not finished
    /// within `connect_timeout`.
    pub async fn mount(
        service_url: &str,
        browser: SharedBrowser,
        connect_timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let url = push_channel_url(service_url)?;
        log::info!("Opening push channel {}...", url);
        let (ws, _) = tokio::time::timeout(connect_timeout, connect_async(url.as_str()))
            .await
            .map_err(|_| ServiceError::Timeout(connect_timeout))??;
        Ok(Self::attach(ws, browser))
    }

    /// Runs the listener over an already established websocket.
    pub fn attach<S>(ws: WebSocketStream<S>, browser: SharedBrowser) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            match listen(ws, browser).await {
                Ok(()) => log::info!("Push channel closed"),
                Err(e) => log::warn!("Push channel lost: {}", e),
            }
        });
        LiveUpdateListener { handle }
    }

    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stops the listener and waits until its connection has been dropped.
    pub async fn unmount(mut self) {
        self.handle.abort();
        let _ = (&mut self.handle).await;
        log::info!("Push channel unsubscribed");
    }
}

impl Drop for LiveUpdateListener {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn listen<S>(mut ws: WebSocketStream<S>, browser: SharedBrowser) -> Result<(), ServiceError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    while let Some(frame) = ws.next().await {
        let text = match frame? {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        let packet = match EnginePacket::decode(&text) {
            Ok(packet) => packet,
            Err(e) => {
                log::warn!("Ignoring push frame {:?}: {}", text, e);
                continue;
            }
        };

        match packet {
            EnginePacket::Open(handshake) => {
                log::debug!("Push channel open, sid {}", handshake.sid);
                let connect = EnginePacket::Message(SocketPacket::connect());
                ws.send(Message::Text(connect.encode())).await?;
            }
            EnginePacket::Ping(payload) => {
                ws.send(Message::Text(EnginePacket::Pong(payload).encode()))
                    .await?;
            }
            EnginePacket::Close => break,
            EnginePacket::Message(packet) => match packet.kind {
                SocketPacketKind::Event => handle_event(&packet, &browser).await,
                SocketPacketKind::Disconnect => break,
                SocketPacketKind::ConnectError => {
                    log::error!("Push channel refused connection: {:?}", packet.data);
                    break;
                }
                SocketPacketKind::Connect => log::info!("Push channel subscribed"),
                SocketPacketKind::Ack => {}
            },
            EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => {}
        }
    }
    Ok(())
}

async fn handle_event(packet: &SocketPacket, browser: &SharedBrowser) {
    let Some((name, arg)) = packet.event() else {
        return;
    };
    if name != DATA_SAVED {
        log::debug!("Ignoring push event {}", name);
        return;
    }

    let payload = match arg.map(|value| DataSaved::deserialize(value)) {
        Some(Ok(payload)) => payload,
        Some(Err(e)) => {
            log::warn!("Malformed {} payload: {}", DATA_SAVED, e);
            return;
        }
        None => {
            log::warn!("{} event without payload", DATA_SAVED);
            return;
        }
    };

    log::info!(
        "Received {} for {:?}",
        DATA_SAVED,
        payload.user.as_ref().map(|u| u.login.as_str())
    );
    let mut browser = browser.lock().await;
    let ticket = browser.issue_ticket();
    browser.apply_push(ticket, payload.user);
}
