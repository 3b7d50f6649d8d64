/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::{
    common::{
        types::{DashboardTab, FoodEvent, ListingId, ListingStatus},
        utils::{leading_number, IdGenerator},
    },
    store::NotificationStore,
    tools::{error::AppError, prometheus::CLEARED_HIGHLIGHTS},
};
use chrono::Local;
use rustc_hash::FxHashMap;
use std::{sync::Arc, time::Duration};
use tokio::{sync::RwLock, task::AbortHandle, time::sleep};
use tracing::*;

const FALLBACK_TITLE: &str = "New Food Available";
const FALLBACK_TYPE: &str = "Veg · Cooked";
const FALLBACK_QTY: &str = "10 meals";
const FALLBACK_EXPIRY: &str = "Today";
const FALLBACK_ADDRESS: &str = "Nearby pickup point";
const FALLBACK_DONOR: &str = "Community Donor";

#[derive(Clone, Debug, PartialEq)]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub food_type: String,
    pub qty: String,
    pub expiry: String,
    pub address: String,
    pub donor: String,
    pub distance_text: Option<String>,
    pub match_score: Option<u32>,
    pub status: ListingStatus,
    pub urgent: bool,
    pub is_new: bool,
    pub claimed_at: Option<String>,
    pub pickup_eta: Option<String>,
    pub meals_served: Option<u32>,
}

impl Listing {
    fn from_event(id: ListingId, event: &FoodEvent) -> Self {
        let food = event.food.clone().unwrap_or_default();
        Listing {
            id,
            title: food.title.unwrap_or_else(|| FALLBACK_TITLE.to_string()),
            food_type: food.food_type.unwrap_or_else(|| FALLBACK_TYPE.to_string()),
            qty: food.qty.unwrap_or_else(|| FALLBACK_QTY.to_string()),
            expiry: food.expiry.unwrap_or_else(|| FALLBACK_EXPIRY.to_string()),
            address: food.address.unwrap_or_else(|| FALLBACK_ADDRESS.to_string()),
            donor: food.donor.unwrap_or_else(|| FALLBACK_DONOR.to_string()),
            distance_text: event.distance_text.clone(),
            match_score: event.match_score,
            status: ListingStatus::Available,
            urgent: event.is_urgent(),
            is_new: true,
            claimed_at: None,
            pickup_eta: None,
            meals_served: None,
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DashboardStats {
    pub total_claimed: usize,
    pub meals_received: u32,
    pub urgent_nearby: usize,
}

#[derive(Default)]
struct DashboardInner {
    listings: Vec<Listing>,
    active_tab: Option<DashboardTab>,
    highlight_tasks: FxHashMap<ListingId, AbortHandle>,
}

/// Listings collection of the NGO dashboard plus the live-update handler that
/// feeds it. New listings carry a transient `is_new` highlight cleared by a
/// scheduled task tied to the listing's lifetime.
pub struct Dashboard {
    inner: Arc<RwLock<DashboardInner>>,
    notifications: Arc<NotificationStore>,
    id_generator: Arc<IdGenerator>,
    highlight_delay: Duration,
}

impl Dashboard {
    pub fn new(
        notifications: Arc<NotificationStore>,
        id_generator: Arc<IdGenerator>,
        highlight_delay: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(RwLock::new(DashboardInner::default())),
            notifications,
            id_generator,
            highlight_delay,
        }
    }

    /// Seeds the illustrative listings the dashboard starts with. Ids come
    /// from the same authority as live listings, so the two insert paths can
    /// never collide.
    pub async fn seed_sample_listings(&self) {
        let samples = [
            (
                "Rice & Dal (Boxed)",
                "Veg · Cooked",
                "40 meals",
                "Today, 20:00",
                "Sector 12, Community Hall",
                "Ananya Sharma",
                ListingStatus::Available,
                true,
            ),
            (
                "Mixed Fruit Pack",
                "Veg · Fruits & Vegetables",
                "30 packs",
                "Tomorrow, 14:00",
                "MG Road, Baker's Store",
                "Fresh Mart",
                ListingStatus::Available,
                false,
            ),
            (
                "Event Leftovers (Meals)",
                "Non-Veg · Cooked",
                "120 meals",
                "Today, 22:00",
                "City Convention Centre",
                "Raj Caterers",
                ListingStatus::Claimed,
                true,
            ),
            (
                "Bread & Pastries",
                "Veg · Bakery",
                "60 packs",
                "Today, 21:00",
                "Civil Lines, The Bread Co.",
                "The Bread Co.",
                ListingStatus::Available,
                false,
            ),
            (
                "Biryani (Bulk)",
                "Non-Veg · Cooked",
                "200 meals",
                "Yesterday, 20:00",
                "Phoenix Mall Food Court",
                "Spice Garden",
                ListingStatus::Completed,
                false,
            ),
        ];

        let mut inner = self.inner.write().await;
        for (title, food_type, qty, expiry, address, donor, status, urgent) in samples {
            let mut listing = Listing {
                id: ListingId(self.id_generator.next_id()),
                title: title.to_string(),
                food_type: food_type.to_string(),
                qty: qty.to_string(),
                expiry: expiry.to_string(),
                address: address.to_string(),
                donor: donor.to_string(),
                distance_text: None,
                match_score: None,
                status,
                urgent,
                is_new: false,
                claimed_at: None,
                pickup_eta: None,
                meals_served: None,
            };
            match status {
                ListingStatus::Claimed => {
                    listing.claimed_at = Some("10:30 AM".to_string());
                    listing.pickup_eta = Some("6:00 PM".to_string());
                }
                ListingStatus::Completed => {
                    listing.meals_served = leading_number(&listing.qty);
                }
                ListingStatus::Available => {}
            }
            inner.listings.push(listing);
        }
    }

    /// Live-update entry point. Synthesizes a listing from the payload,
    /// prepends it, forces the Available tab, forwards the raw payload to the
    /// notification store and schedules the highlight clear.
    pub async fn handle_new_food(&self, event: FoodEvent) -> ListingId {
        let id = ListingId(self.id_generator.next_id());
        let listing = Listing::from_event(id, &event);

        info!(
            "[New Food Nearby] : {:?} - Urgent : {}",
            listing.title, listing.urgent
        );

        {
            let mut inner = self.inner.write().await;
            inner.listings.insert(0, listing);
            inner.active_tab = Some(DashboardTab::Available);

            let inner_handle = Arc::clone(&self.inner);
            let highlight_delay = self.highlight_delay;
            let highlight_task = tokio::spawn(async move {
                sleep(highlight_delay).await;
                clear_highlight_for(&inner_handle, id).await;
            });
            inner.highlight_tasks.insert(id, highlight_task.abort_handle());
        }

        self.notifications.add_notification(event).await;
        id
    }

    /// Unconditional highlight clear. A missing id is a no-op, the listing
    /// may have been removed while the task was pending.
    pub async fn clear_highlight(&self, id: ListingId) {
        clear_highlight_for(&self.inner, id).await;
    }

    pub async fn claim(&self, id: ListingId) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let listing = find_listing(&mut inner.listings, id)?;
        match listing.status {
            ListingStatus::Available => {
                listing.status = ListingStatus::Claimed;
                listing.claimed_at = Some(Local::now().format("%I:%M %p").to_string());
                listing.pickup_eta = Some("TBD".to_string());
                Ok(())
            }
            from => Err(AppError::InvalidTransition {
                id: id.inner(),
                from,
                to: ListingStatus::Claimed,
            }),
        }
    }

    pub async fn mark_completed(&self, id: ListingId) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let listing = find_listing(&mut inner.listings, id)?;
        match listing.status {
            ListingStatus::Claimed => {
                listing.status = ListingStatus::Completed;
                listing.meals_served = Some(leading_number(&listing.qty).unwrap_or(0));
                Ok(())
            }
            from => Err(AppError::InvalidTransition {
                id: id.inner(),
                from,
                to: ListingStatus::Completed,
            }),
        }
    }

    pub async fn release(&self, id: ListingId) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let listing = find_listing(&mut inner.listings, id)?;
        match listing.status {
            ListingStatus::Claimed => {
                listing.status = ListingStatus::Available;
                listing.claimed_at = None;
                listing.pickup_eta = None;
                Ok(())
            }
            from => Err(AppError::InvalidTransition {
                id: id.inner(),
                from,
                to: ListingStatus::Available,
            }),
        }
    }

    /// Removes a listing and invalidates its pending highlight task.
    pub async fn remove_listing(&self, id: ListingId) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        if let Some(highlight_task) = inner.highlight_tasks.remove(&id) {
            highlight_task.abort();
        }
        let position = inner
            .listings
            .iter()
            .position(|listing| listing.id == id)
            .ok_or(AppError::ListingNotFound(id.inner()))?;
        inner.listings.remove(position);
        Ok(())
    }

    pub async fn set_active_tab(&self, tab: DashboardTab) {
        self.inner.write().await.active_tab = Some(tab);
    }

    pub async fn active_tab(&self) -> Option<DashboardTab> {
        self.inner.read().await.active_tab
    }

    pub async fn listings(&self) -> Vec<Listing> {
        self.inner.read().await.listings.clone()
    }

    pub async fn listings_for(&self, tab: DashboardTab) -> Vec<Listing> {
        let status = match tab {
            DashboardTab::Available => ListingStatus::Available,
            DashboardTab::Claimed => ListingStatus::Claimed,
            DashboardTab::Completed => ListingStatus::Completed,
        };
        self.inner
            .read()
            .await
            .listings
            .iter()
            .filter(|listing| listing.status == status)
            .cloned()
            .collect()
    }

    pub async fn stats(&self) -> DashboardStats {
        let inner = self.inner.read().await;
        DashboardStats {
            total_claimed: inner
                .listings
                .iter()
                .filter(|listing| {
                    matches!(
                        listing.status,
                        ListingStatus::Claimed | ListingStatus::Completed
                    )
                })
                .count(),
            meals_received: inner
                .listings
                .iter()
                .filter(|listing| listing.status == ListingStatus::Completed)
                .map(|listing| listing.meals_served.unwrap_or(0))
                .sum(),
            urgent_nearby: inner
                .listings
                .iter()
                .filter(|listing| listing.status == ListingStatus::Available && listing.urgent)
                .count(),
        }
    }

    /// Aborts every pending highlight task. Called on view teardown so no
    /// scheduled clear runs against disposed state.
    pub async fn teardown(&self) {
        let mut inner = self.inner.write().await;
        for (_, highlight_task) in inner.highlight_tasks.drain() {
            highlight_task.abort();
        }
    }
}

async fn clear_highlight_for(inner: &Arc<RwLock<DashboardInner>>, id: ListingId) {
    let mut inner = inner.write().await;
    inner.highlight_tasks.remove(&id);
    if let Some(listing) = inner.listings.iter_mut().find(|listing| listing.id == id) {
        listing.is_new = false;
        CLEARED_HIGHLIGHTS.inc();
    }
}

fn find_listing(listings: &mut [Listing], id: ListingId) -> Result<&mut Listing, AppError> {
    listings
        .iter_mut()
        .find(|listing| listing.id == id)
        .ok_or(AppError::ListingNotFound(id.inner()))
}
