/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::{
    common::types::{ClientId, FoodEvent, SessionId, SocketFrame},
    tools::prometheus::{CONNECTED_SESSIONS, CONNECTION_ATTEMPTS, TOTAL_EVENTS},
};
use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc::UnboundedSender, oneshot};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::*;
use url::Url;
use uuid::Uuid;

/// Owns the single live connection for one identity. A `None` identity is a
/// silent no-op. Connection failures are logged and the task returns, there
/// is no retry in this layer : the dashboard simply receives no live updates.
/// The shutdown signal closes the socket explicitly.
pub async fn run_socket_connection(
    client_id: Option<ClientId>,
    endpoint: Url,
    event_tx: UnboundedSender<FoodEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let Some(client_id) = client_id else {
        info!("[No Identity] : skipping socket connection");
        return;
    };

    CONNECTION_ATTEMPTS.inc();
    let (socket, _response) = match connect_async(endpoint.as_str()).await {
        Ok(connection) => connection,
        Err(error) => {
            error!("[CONNECTION_FAILED] : {} : {}", endpoint, error);
            return;
        }
    };

    let session_id = SessionId(Uuid::new_v4().to_string());
    info!(
        "[Client Connected] : {:?} - Session : {:?}",
        client_id, session_id
    );
    CONNECTED_SESSIONS.inc();

    let (mut sink, mut stream) = socket.split();

    // Join the per-identity broadcast group so the server can target events.
    match serde_json::to_string(&SocketFrame::Join(client_id.clone())) {
        Ok(join_frame) => {
            if let Err(error) = sink.send(Message::Text(join_frame)).await {
                error!("[JOIN_FAILED] : {:?} : {}", client_id, error);
                return;
            }
        }
        Err(error) => {
            error!("[JOIN_ENCODE_FAILED] : {:?} : {}", client_id, error);
            return;
        }
    }

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                let _ = sink.send(Message::Close(None)).await;
                info!("[Client Disconnected] : {:?} - Session : {:?}", client_id, session_id);
                break;
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => handle_inbound_frame(&text, &event_tx),
                Some(Ok(Message::Close(_))) | None => {
                    warn!("[Connection Closed] : {:?} - Session : {:?}", client_id, session_id);
                    break;
                }
                Some(Ok(_)) => {} // ping/pong/binary frames are not part of the protocol
                Some(Err(error)) => {
                    error!("[STREAM_ERROR] : {:?} : {}", client_id, error);
                    break;
                }
            }
        }
    }
}

/// Event receiver glue : only the `new-food-nearby` topic is forwarded.
/// Malformed frames and unknown topics are tolerated, never surfaced.
fn handle_inbound_frame(text: &str, event_tx: &UnboundedSender<FoodEvent>) {
    match serde_json::from_str::<SocketFrame>(text) {
        Ok(SocketFrame::NewFoodNearby(event)) => {
            TOTAL_EVENTS.inc();
            if let Err(error) = event_tx.send(event) {
                error!("[FORWARD_FAILED] : {}", error);
            }
        }
        Ok(frame) => {
            debug!("[Ignored Frame] : {:?}", frame);
        }
        Err(error) => {
            debug!("[Malformed Frame] : {} : {}", error, text);
        }
    }
}
