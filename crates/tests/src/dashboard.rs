/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use notification_client::{
    common::{
        types::{DashboardTab, FoodDescriptor, FoodEvent, ListingStatus, UrgencyLevel},
        utils::IdGenerator,
    },
    dashboard::Dashboard,
    store::NotificationStore,
    tools::error::AppError,
};
use std::{sync::Arc, time::Duration};
use tokio::time::sleep;

const SHORT_HIGHLIGHT: Duration = Duration::from_millis(50);
const LONG_HIGHLIGHT: Duration = Duration::from_secs(30);

fn dashboard_with_delay(highlight_delay: Duration) -> (Arc<Dashboard>, Arc<NotificationStore>) {
    let id_generator = Arc::new(IdGenerator::new());
    let store = Arc::new(NotificationStore::new(id_generator.clone(), 0));
    let dashboard = Arc::new(Dashboard::new(store.clone(), id_generator, highlight_delay));
    (dashboard, store)
}

fn event_titled(title: &str) -> FoodEvent {
    FoodEvent {
        food: Some(FoodDescriptor {
            title: Some(title.to_string()),
            qty: Some("40 meals".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[tokio::test]
async fn live_event_synthesizes_available_listing_and_forces_tab() {
    let (dashboard, store) = dashboard_with_delay(LONG_HIGHLIGHT);
    dashboard.set_active_tab(DashboardTab::Completed).await;

    let event = FoodEvent {
        food: Some(FoodDescriptor {
            title: Some("X".to_string()),
            ..Default::default()
        }),
        distance_text: Some("1km".to_string()),
        urgency_level: Some(UrgencyLevel::Critical),
        ..Default::default()
    };
    dashboard.handle_new_food(event).await;

    let listings = dashboard.listings().await;
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].title, "X");
    assert_eq!(listings[0].status, ListingStatus::Available);
    assert!(listings[0].urgent);
    assert!(listings[0].is_new);
    assert_eq!(listings[0].distance_text.as_deref(), Some("1km"));
    assert_eq!(dashboard.active_tab().await, Some(DashboardTab::Available));
    assert_eq!(store.unread_count().await, 1);
}

#[tokio::test]
async fn absent_payload_fields_get_placeholder_defaults() {
    let (dashboard, _store) = dashboard_with_delay(LONG_HIGHLIGHT);
    dashboard.handle_new_food(FoodEvent::default()).await;

    let listings = dashboard.listings().await;
    assert_eq!(listings[0].title, "New Food Available");
    assert!(!listings[0].urgent, "absent urgency must not be urgent");
    assert!(!listings[0].qty.is_empty());
    assert!(!listings[0].donor.is_empty());
}

#[tokio::test]
async fn urgency_classification_follows_level() {
    for (payload, expected) in [
        (serde_json::json!({ "urgencyLevel": "critical" }), true),
        (serde_json::json!({ "urgencyLevel": "high" }), true),
        (serde_json::json!({ "urgencyLevel": "medium" }), false),
        (serde_json::json!({ "urgencyLevel": "low" }), false),
        (serde_json::json!({ "urgencyLevel": "apocalyptic" }), false),
        (serde_json::json!({}), false),
    ] {
        let event: FoodEvent =
            serde_json::from_value(payload.clone()).expect("payload must always decode");
        assert_eq!(event.is_urgent(), expected, "payload: {payload}");
    }
}

#[tokio::test]
async fn highlight_clears_after_delay_even_when_claimed() {
    let (dashboard, _store) = dashboard_with_delay(SHORT_HIGHLIGHT);
    let id = dashboard.handle_new_food(event_titled("Rice & Dal")).await;

    assert!(dashboard.listings().await[0].is_new);
    dashboard.claim(id).await.expect("claim must succeed");

    sleep(SHORT_HIGHLIGHT * 4).await;

    let listings = dashboard.listings().await;
    assert!(!listings[0].is_new, "highlight must clear exactly once");
    assert_eq!(listings[0].status, ListingStatus::Claimed);
}

#[tokio::test]
async fn highlight_clear_is_a_noop_on_removed_listing() {
    let (dashboard, _store) = dashboard_with_delay(SHORT_HIGHLIGHT);
    let id = dashboard.handle_new_food(event_titled("Bread")).await;

    dashboard.remove_listing(id).await.expect("listing exists");
    assert!(dashboard.listings().await.is_empty());

    // The scheduled clear must have been invalidated; calling it directly
    // on the missing id must still be a no-op.
    dashboard.clear_highlight(id).await;
    sleep(SHORT_HIGHLIGHT * 4).await;
    assert!(dashboard.listings().await.is_empty());
}

#[tokio::test]
async fn teardown_aborts_pending_highlight_tasks() {
    let (dashboard, _store) = dashboard_with_delay(SHORT_HIGHLIGHT);
    dashboard.handle_new_food(event_titled("Fruit Pack")).await;

    dashboard.teardown().await;
    sleep(SHORT_HIGHLIGHT * 4).await;

    // The clear task was aborted with the owning view, the listing is left
    // untouched and nothing panics.
    assert!(dashboard.listings().await[0].is_new);
}

#[tokio::test]
async fn listing_state_machine_transitions() {
    let (dashboard, _store) = dashboard_with_delay(LONG_HIGHLIGHT);
    let id = dashboard.handle_new_food(event_titled("Event Leftovers")).await;

    // available -> claimed
    dashboard.claim(id).await.expect("claim from available");
    let listing = dashboard.listings().await[0].clone();
    assert_eq!(listing.status, ListingStatus::Claimed);
    assert!(listing.claimed_at.is_some());
    assert_eq!(listing.pickup_eta.as_deref(), Some("TBD"));

    // claimed -> claimed is invalid
    assert!(matches!(
        dashboard.claim(id).await,
        Err(AppError::InvalidTransition { .. })
    ));

    // claimed -> available (release) clears claim metadata
    dashboard.release(id).await.expect("release from claimed");
    let listing = dashboard.listings().await[0].clone();
    assert_eq!(listing.status, ListingStatus::Available);
    assert!(listing.claimed_at.is_none());
    assert!(listing.pickup_eta.is_none());

    // available -> completed is invalid
    assert!(matches!(
        dashboard.mark_completed(id).await,
        Err(AppError::InvalidTransition { .. })
    ));

    // available -> claimed -> completed records meals served from qty
    dashboard.claim(id).await.expect("claim again");
    dashboard.mark_completed(id).await.expect("complete from claimed");
    let listing = dashboard.listings().await[0].clone();
    assert_eq!(listing.status, ListingStatus::Completed);
    assert_eq!(listing.meals_served, Some(40));

    // nothing is reachable from completed
    assert!(matches!(
        dashboard.claim(id).await,
        Err(AppError::InvalidTransition { .. })
    ));
    assert!(matches!(
        dashboard.release(id).await,
        Err(AppError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn operations_on_unknown_listing_fail_cleanly() {
    let (dashboard, _store) = dashboard_with_delay(LONG_HIGHLIGHT);
    let id = dashboard.handle_new_food(event_titled("Biryani")).await;
    dashboard.remove_listing(id).await.expect("listing exists");

    assert!(matches!(
        dashboard.claim(id).await,
        Err(AppError::ListingNotFound(_))
    ));
    assert!(matches!(
        dashboard.remove_listing(id).await,
        Err(AppError::ListingNotFound(_))
    ));
}

#[tokio::test]
async fn seeded_and_live_listings_share_one_id_space() {
    let (dashboard, _store) = dashboard_with_delay(LONG_HIGHLIGHT);
    dashboard.seed_sample_listings().await;

    let stats = dashboard.stats().await;
    assert_eq!(stats.total_claimed, 2);
    assert_eq!(stats.meals_received, 200);
    assert_eq!(stats.urgent_nearby, 1);

    let live_id = dashboard.handle_new_food(event_titled("Fresh Drop")).await;
    let mut ids: Vec<_> = dashboard
        .listings()
        .await
        .iter()
        .map(|listing| listing.id)
        .collect();
    assert!(ids.contains(&live_id));
    let unique = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), unique, "seeded and live ids must never collide");

    // seeded entries start without the transient highlight
    assert!(dashboard
        .listings_for(DashboardTab::Claimed)
        .await
        .iter()
        .all(|listing| !listing.is_new));
}
