//! Socket.IO client - one session per fired request, streamed into the viewer

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::constants::SOCKET_DISCONNECT_TIMEOUT;
use crate::messages::SocketEvent;
use crate::models::SocketIoRequest;
use crate::network::socketio::{
    decode_engine, decode_socket, encode_connect, encode_disconnect, encode_event, encode_pong,
    socket_url, EnginePacket, SocketPacket,
};
use crate::viewer::SharedDisplay;

/// Ack id attached to the single emit of a session
const EMIT_ACK_ID: u64 = 0;

/// A running Socket.IO session
pub struct SocketClient {
    cancel_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SocketClient {
    /// Spawn the session on `runtime`. Everything it observes is printed to `display`.
    pub fn start(
        runtime: &Handle,
        request: SocketIoRequest,
        display: SharedDisplay,
    ) -> Result<Self> {
        let url = socket_url(&request.endpoint, &request.params)?;
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let task = runtime.spawn(async move {
            let report = move |event: SocketEvent| {
                tracing::debug!(?event, "Socket.IO event");
                event.print_to(&mut display.lock());
            };
            run_session(&url, &request, report, cancel_rx).await;
        });
        Ok(SocketClient {
            cancel_tx: Some(cancel_tx),
            task,
        })
    }

    /// Disconnect and wait a bounded time for the session to wind down
    pub fn stop(mut self, runtime: &Handle) {
        if let Some(tx) = self.cancel_tx.take() {
            let _ = tx.send(());
        }
        let task = &mut self.task;
        if runtime
            .block_on(tokio::time::timeout(SOCKET_DISCONNECT_TIMEOUT, task))
            .is_err()
        {
            tracing::warn!("Socket.IO session did not stop in time");
            self.task.abort();
        }
    }
}

/// Connect, join the default namespace, emit the configured event, then
/// report traffic until the server leaves or `cancel_rx` fires
pub async fn run_session<F>(
    url: &str,
    request: &SocketIoRequest,
    mut report: F,
    mut cancel_rx: oneshot::Receiver<()>,
) where
    F: FnMut(SocketEvent),
{
    report(SocketEvent::Connecting { url: url.to_string() });
    tracing::info!(url = %url, "Connecting to Socket.IO server");

    let ws_stream = match connect_async(url).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            report(SocketEvent::Failed {
                error: format!("Connection failed: {}", e),
            });
            return;
        }
    };

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;

            _ = &mut cancel_rx => {
                let _ = write.send(Message::Text(encode_disconnect())).await;
                let _ = write.close().await;
                report(SocketEvent::Disconnected);
                return;
            }

            msg = read.next() => {
                let text = match msg {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Ping(data))) => {
                        let _ = write.send(Message::Pong(data)).await;
                        continue;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        report(SocketEvent::Disconnected);
                        return;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        report(SocketEvent::Failed {
                            error: format!("Receive error: {}", e),
                        });
                        return;
                    }
                };

                let packet = match decode_engine(&text) {
                    Ok(packet) => packet,
                    Err(e) => {
                        tracing::warn!(error = %e, packet = %text, "Ignoring Engine.IO packet");
                        continue;
                    }
                };

                let reply = match packet {
                    EnginePacket::Open(_) => Some(encode_connect()),
                    EnginePacket::Ping(payload) => Some(encode_pong(&payload)),
                    EnginePacket::Close => {
                        report(SocketEvent::Disconnected);
                        return;
                    }
                    EnginePacket::Message(payload) => match decode_socket(&payload) {
                        Ok(SocketPacket::Connect(_)) => {
                            report(SocketEvent::Connected);
                            emit_on_connect(request, &mut report)
                        }
                        Ok(SocketPacket::Event { name, data, .. }) => {
                            report(SocketEvent::Event { name, data });
                            None
                        }
                        Ok(SocketPacket::Ack { data, .. }) => {
                            report(SocketEvent::Ack { data });
                            None
                        }
                        Ok(SocketPacket::ConnectError(data)) => {
                            report(SocketEvent::ConnectError { data });
                            None
                        }
                        Ok(SocketPacket::Disconnect) => {
                            report(SocketEvent::Disconnected);
                            return;
                        }
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                packet = %payload,
                                "Ignoring Socket.IO packet"
                            );
                            None
                        }
                    },
                    EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => None,
                };

                if let Some(reply) = reply {
                    if let Err(e) = write.send(Message::Text(reply)).await {
                        report(SocketEvent::Failed {
                            error: format!("Send failed: {}", e),
                        });
                        return;
                    }
                }
            }
        }
    }
}

/// The emit packet for the configured event, if there is one
fn emit_on_connect<F>(request: &SocketIoRequest, report: &mut F) -> Option<String>
where
    F: FnMut(SocketEvent),
{
    if request.event.is_empty() {
        return None;
    }
    let data = if request.data.is_null() {
        serde_json::json!({})
    } else {
        request.data.clone()
    };
    report(SocketEvent::Emitting {
        event: request.event.clone(),
        data: data.clone(),
    });
    Some(encode_event(Some(EMIT_ACK_ID), &request.event, &data))
}
