//! WebSocket bridge for the orchestration core (axum + ws).
//!
//! Broadcasts the orchestrator's `WorkflowEvent` stream to any number of connected
//! dashboards and turns inbound `Command` frames into entries on a channel the
//! orchestrator's command loop reads from. Transport is explicitly not prescribed
//! by the core (spec §6) — this crate is one ambient reference transport, not a
//! requirement.
//!
//! **Public API**: [`run_relay`], [`run_relay_on_listener`].

mod app;
mod connection;
mod response;

use chronograph_event::{Command, WorkflowEvent};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::info;

use app::{router, AppState};

const DEFAULT_WS_ADDR: &str = "127.0.0.1:8080";

/// Runs the relay on an existing listener. Used by tests (bind to 127.0.0.1:0, then
/// pass the listener in). When `once` is true, accepts one connection, handles it,
/// then returns.
pub async fn run_relay_on_listener(
    listener: TcpListener,
    once: bool,
    events: broadcast::Sender<WorkflowEvent>,
    commands: mpsc::Sender<Command>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = listener.local_addr()?;
    info!("relay listening on ws://{}", addr);
    if once {
        info!("will exit after first connection is done (once mode, used by tests)");
    }

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let state = Arc::new(AppState {
        shutdown_tx: Arc::new(std::sync::Mutex::new(if once { Some(shutdown_tx) } else { None })),
        events,
        commands,
    });

    let app = router(state);

    if once {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await?;
        info!("connection done, exiting (once mode)");
    } else {
        axum::serve(listener, app).await?;
    }
    Ok(())
}

/// Runs the relay. Listens on `addr` (default 127.0.0.1:8080); `events` is fed by the
/// orchestrator, `commands` is read by the orchestrator's command loop.
pub async fn run_relay(
    addr: Option<&str>,
    once: bool,
    events: broadcast::Sender<WorkflowEvent>,
    commands: mpsc::Sender<Command>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = addr.unwrap_or(DEFAULT_WS_ADDR);
    let listener = TcpListener::bind(addr).await?;
    run_relay_on_listener(listener, once, events, commands).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronograph_event::WorkflowEvent;
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message;

    /// **Scenario**: a broadcast event reaches a connected client as a JSON text
    /// frame carrying the same `type` tag.
    #[tokio::test]
    async fn broadcasts_workflow_event_to_connected_client() {
        let (events_tx, _events_rx) = broadcast::channel(16);
        let (commands_tx, _commands_rx) = mpsc::channel(16);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let events_tx_clone = events_tx.clone();
        tokio::spawn(run_relay_on_listener(listener, true, events_tx_clone, commands_tx));

        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .unwrap();

        events_tx
            .send(WorkflowEvent::WorkflowStarted {
                workflow_id: "wf-1".to_string(),
                name: "demo".to_string(),
            })
            .unwrap();

        let message = ws.next().await.unwrap().unwrap();
        let Message::Text(text) = message else {
            panic!("expected text frame");
        };
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "WORKFLOW_STARTED");
        assert_eq!(value["workflow_id"], "wf-1");
        let _ = ws.close(None).await;
    }

    /// **Scenario**: a known command frame from the client is forwarded onto the
    /// relay's command channel.
    #[tokio::test]
    async fn forwards_known_command_frame_to_command_channel() {
        let (events_tx, _events_rx) = broadcast::channel(16);
        let (commands_tx, mut commands_rx) = mpsc::channel(16);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(run_relay_on_listener(listener, true, events_tx, commands_tx));

        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .unwrap();
        ws.send(Message::Text(r#"{"type":"PAUSE_WORKFLOW"}"#.to_string()))
            .await
            .unwrap();

        let command = commands_rx.recv().await.unwrap();
        assert!(matches!(command, Command::PauseWorkflow));
    }
}
