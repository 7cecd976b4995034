//! WebSocket connection lifecycle: forwards broadcast `WorkflowEvent`s out to the
//! client and parses inbound `Command` frames back into the orchestrator's command
//! channel.

use axum::extract::ws::{Message, WebSocket};
use chronograph_event::{Command, WorkflowEvent};
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc, oneshot};

use super::response::encode_event;

pub(crate) async fn handle_socket(
    socket: WebSocket,
    shutdown_tx: Option<oneshot::Sender<()>>,
    mut events: broadcast::Receiver<WorkflowEvent>,
    commands: mpsc::Sender<Command>,
) {
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        if sink.send(Message::Text(encode_event(&event))).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "relay client lagged behind event stream");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        handle_inbound(&text, &commands).await;
                    }
                    Some(Ok(Message::Binary(bytes))) => {
                        handle_inbound(&String::from_utf8_lossy(&bytes), &commands).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        tracing::warn!(error = %err, "read error (client closed?)");
                        break;
                    }
                }
            }
        }
    }

    let _ = sink.close().await;
    if let Some(tx) = shutdown_tx {
        let _ = tx.send(());
    }
}

async fn handle_inbound(text: &str, commands: &mpsc::Sender<Command>) {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(err) => {
            tracing::warn!(error = %err, "malformed command frame");
            return;
        }
    };
    if !Command::is_known_type(&value) {
        tracing::warn!(frame = %value, "unrecognized command type");
        return;
    }
    match serde_json::from_value::<Command>(value) {
        Ok(command) => {
            if commands.send(command).await.is_err() {
                tracing::warn!("command channel closed; orchestrator no longer listening");
            }
        }
        Err(err) => tracing::warn!(error = %err, "failed to decode known command type"),
    }
}
