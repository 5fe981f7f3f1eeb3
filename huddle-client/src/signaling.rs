use crate::error::ClientError;
use futures::{SinkExt, StreamExt};
use huddle_core::{ClientMessage, ServerMessage};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{error, info, warn};

/// Opens the signaling channel to the relay and bridges it to a pair of
/// message queues. Either pump finishing closes the channel; there is no
/// automatic reconnection.
pub async fn connect(
    url: &str,
) -> Result<
    (
        mpsc::UnboundedSender<ClientMessage>,
        mpsc::UnboundedReceiver<ServerMessage>,
    ),
    ClientError,
> {
    let (ws, _) = connect_async(url).await?;
    info!("Connected to signaling relay at {}", url);

    let (mut sink, mut stream) = ws.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ClientMessage>();
    let (in_tx, in_rx) = mpsc::unbounded_channel::<ServerMessage>();

    tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize client message: {}", e);
                    continue;
                }
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    tokio::spawn(async move {
        while let Some(Ok(msg)) = stream.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ServerMessage>(&text) {
                    Ok(msg) => {
                        if in_tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Invalid server message: {:?}", e),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
        info!("Signaling channel closed");
    });

    Ok((out_tx, in_rx))
}
