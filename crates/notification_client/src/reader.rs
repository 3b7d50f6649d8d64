/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::{common::types::FoodEvent, dashboard::Dashboard};
use std::sync::Arc;
use tokio::sync::{mpsc::UnboundedReceiver, oneshot};
use tracing::*;

/// Fan-out loop between the connection and the in-memory state. Events are
/// delivered strictly serially and each one is processed to completion before
/// the next is taken, so store and listing mutations are atomic with respect
/// to observation.
pub async fn run_notification_reader(
    mut event_rx: UnboundedReceiver<FoodEvent>,
    mut graceful_termination_signal_rx: oneshot::Receiver<()>,
    dashboard: Arc<Dashboard>,
) {
    loop {
        tokio::select! {
            event = event_rx.recv() => match event {
                Some(event) => {
                    dashboard.handle_new_food(event).await;
                }
                None => {
                    warn!("[EVENT_CHANNEL_CLOSED] : no further live updates");
                    break;
                }
            },
            _ = &mut graceful_termination_signal_rx => {
                info!("[Graceful Shutting Down] => aborting pending highlight tasks");
                dashboard.teardown().await;
                break;
            }
        }
    }
}
