//! WebSocket transport for signal subscribers.
//!
//! Every connection first receives the current cache snapshot as one text
//! frame, then one frame per published batch. Frames are JSON objects keyed
//! by instrument symbol.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use signal_core::types::SignalsBatch;
use tokio::net::{TcpListener, TcpStream};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::error::ServerError;
use crate::hub::{SignalHub, Subscription};
use crate::shutdown::ShutdownListener;

/// Accept subscriber connections until shutdown is triggered.
pub async fn serve(
    listener: TcpListener,
    hub: Arc<SignalHub>,
    mut shutdown: ShutdownListener,
) -> Result<(), ServerError> {
    let address = listener.local_addr()?;
    info!(address = %address, "WebSocket server listening");

    let connection_shutdown = shutdown.clone();

    loop {
        tokio::select! {
            _ = shutdown.wait() => {
                info!("WebSocket server shutting down");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let hub = Arc::clone(&hub);
                    let shutdown = connection_shutdown.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, peer, hub, shutdown).await {
                            warn!(peer = %peer, error = %e, "Subscriber connection failed");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    Ok(())
}

/// Serve one subscriber: snapshot first, then every batch until either side
/// closes or shutdown is triggered.
pub async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    hub: Arc<SignalHub>,
    mut shutdown: ShutdownListener,
) -> Result<(), ServerError> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut write, mut read) = ws_stream.split();

    let Subscription {
        id,
        snapshot,
        mut feed,
    } = hub.attach();
    info!(peer = %peer, subscriber = %id, "Subscriber connected");

    let result = async {
        write.send(encode(&snapshot)?).await?;

        loop {
            tokio::select! {
                _ = shutdown.wait() => {
                    write.send(Message::Close(None)).await?;
                    break;
                }
                batch = feed.next() => match batch {
                    Some(Ok(batch)) => write.send(encode(&batch)?).await?,
                    Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                        // Buffered batches are older than the cache; resend from a fresh snapshot.
                        warn!(subscriber = %id, skipped, "Subscriber lagged, resending snapshot");
                        let fresh = hub.attach();
                        feed = fresh.feed;
                        write.send(encode(&fresh.snapshot)?).await?;
                    }
                    None => break,
                },
                incoming = read.next() => match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                },
            }
        }

        Ok::<(), ServerError>(())
    }
    .await;

    info!(peer = %peer, subscriber = %id, "Subscriber disconnected");
    result
}

fn encode(batch: &SignalsBatch) -> Result<Message, ServerError> {
    let payload = serde_json::to_string(batch)?;
    debug!(bytes = payload.len(), "Encoded batch");
    Ok(Message::Text(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use signal_core::types::{InstrumentSymbol, Signal};
    use std::time::Duration;
    use tokio_tungstenite::connect_async;

    use crate::shutdown::ShutdownSignal;

    fn text(message: Message) -> SignalsBatch {
        match message {
            Message::Text(payload) => serde_json::from_str(&payload).unwrap(),
            other => panic!("expected text frame, got {:?}", other),
        }
    }

    async fn start_server(
        hub: Arc<SignalHub>,
    ) -> (
        SocketAddr,
        ShutdownSignal,
        tokio::task::JoinHandle<Result<(), ServerError>>,
    ) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = ShutdownSignal::new();
        let server = tokio::spawn(serve(listener, hub, shutdown.listener()));
        (addr, shutdown, server)
    }

    #[tokio::test]
    async fn test_snapshot_then_batches() {
        let hub = Arc::new(SignalHub::new(8));
        hub.publish(
            [(
                InstrumentSymbol::new("EURUSD"),
                Signal::buy(1.08, 1.12, Utc::now()),
            )]
            .into_iter()
            .collect(),
        );
        let (addr, shutdown, server) = start_server(Arc::clone(&hub)).await;

        let (mut ws, _) = connect_async(format!("ws://{}", addr)).await.unwrap();

        let snapshot = text(ws.next().await.unwrap().unwrap());
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains_key("EURUSD"));

        hub.publish(
            [(InstrumentSymbol::new("GBPUSD"), Signal::hold(Utc::now()))]
                .into_iter()
                .collect(),
        );
        let batch = text(ws.next().await.unwrap().unwrap());
        assert_eq!(batch.len(), 1);
        assert!(batch.contains_key("GBPUSD"));

        shutdown.trigger();
        let closing = ws.next().await.unwrap().unwrap();
        assert!(matches!(closing, Message::Close(_)));

        tokio::time::timeout(Duration::from_secs(1), server)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_lagging_subscriber_is_resynced_with_snapshot() {
        let hub = Arc::new(SignalHub::new(1));
        let (addr, shutdown, _server) = start_server(Arc::clone(&hub)).await;

        let (mut ws, _) = connect_async(format!("ws://{}", addr)).await.unwrap();
        assert!(text(ws.next().await.unwrap().unwrap()).is_empty());

        // No yield between publishes, so the connection task overflows its feed.
        for symbols in [vec!["EURUSD"], vec!["GBPUSD"], vec!["EURUSD", "GBPUSD", "XAUUSD"]] {
            hub.publish(
                symbols
                    .into_iter()
                    .map(|s| (InstrumentSymbol::new(s), Signal::hold(Utc::now())))
                    .collect(),
            );
        }

        let resync = text(ws.next().await.unwrap().unwrap());
        assert_eq!(resync.len(), 3);
        assert!(resync.keys().eq(hub.snapshot().keys()));
        assert_eq!(hub.subscriber_count(), 1);

        hub.publish(
            [(InstrumentSymbol::new("USDJPY"), Signal::hold(Utc::now()))]
                .into_iter()
                .collect(),
        );
        let next = text(ws.next().await.unwrap().unwrap());
        assert_eq!(next.len(), 1);
        assert!(next.contains_key("USDJPY"));

        shutdown.trigger();
    }

    #[tokio::test]
    async fn test_first_frame_is_empty_object_before_any_cycle() {
        let hub = Arc::new(SignalHub::new(8));
        let (addr, shutdown, _server) = start_server(hub).await;

        let (mut ws, _) = connect_async(format!("ws://{}", addr)).await.unwrap();
        match ws.next().await.unwrap().unwrap() {
            Message::Text(payload) => assert_eq!(payload, "{}"),
            other => panic!("expected text frame, got {:?}", other),
        }

        shutdown.trigger();
    }

    #[tokio::test]
    async fn test_client_close_detaches_subscriber() {
        let hub = Arc::new(SignalHub::new(8));
        let (addr, shutdown, _server) = start_server(Arc::clone(&hub)).await;

        let (mut ws, _) = connect_async(format!("ws://{}", addr)).await.unwrap();
        ws.next().await.unwrap().unwrap();
        assert_eq!(hub.subscriber_count(), 1);

        ws.close(None).await.unwrap();
        for _ in 0..50 {
            if hub.subscriber_count() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(hub.subscriber_count(), 0);

        shutdown.trigger();
    }
}
