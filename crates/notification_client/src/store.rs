/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::{
    common::{
        types::{FoodEvent, NotificationId},
        utils::IdGenerator,
    },
    tools::prometheus::DROPPED_NOTIFICATIONS,
};
use std::{collections::VecDeque, sync::Arc};
use tokio::sync::RwLock;
use tracing::*;

#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub read: bool,
    pub payload: FoodEvent,
}

/// Application-scoped notification list, newest first. Entries are created on
/// event receipt and only ever mutated in bulk by `mark_all_read`. Growth is
/// bounded by `cap` (oldest dropped first); a cap of 0 keeps the store
/// session-bounded.
pub struct NotificationStore {
    entries: RwLock<VecDeque<Notification>>,
    id_generator: Arc<IdGenerator>,
    cap: usize,
}

impl NotificationStore {
    pub fn new(id_generator: Arc<IdGenerator>, cap: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            id_generator,
            cap,
        }
    }

    /// Prepends a notification for the payload. The id is assigned at receipt
    /// time and doubles as received-time in millis.
    pub async fn add_notification(&self, payload: FoodEvent) -> NotificationId {
        let id = NotificationId(self.id_generator.next_id());
        let mut entries = self.entries.write().await;
        entries.push_front(Notification {
            id,
            read: false,
            payload,
        });
        if self.cap > 0 && entries.len() > self.cap {
            entries.pop_back();
            DROPPED_NOTIFICATIONS.inc();
            warn!("[Notification Dropped] : store at cap {}", self.cap);
        }
        id
    }

    /// Flips every existing entry to read. Entries added afterward are
    /// unaffected.
    pub async fn mark_all_read(&self) {
        let mut entries = self.entries.write().await;
        for notification in entries.iter_mut() {
            notification.read = true;
        }
    }

    pub async fn unread_count(&self) -> usize {
        self.entries
            .read()
            .await
            .iter()
            .filter(|notification| !notification.read)
            .count()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Snapshot for presentation, newest first.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.entries.read().await.iter().cloned().collect()
    }
}
