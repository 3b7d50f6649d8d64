/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(clippy::expect_used)]

use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};
use tracing::error;

pub static CONNECTION_ATTEMPTS: once_cell::sync::Lazy<IntCounter> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter!("connection_attempts", "Connection Attempts")
            .expect("Failed to register connection attempts metrics")
    });

pub static CONNECTED_SESSIONS: once_cell::sync::Lazy<IntCounter> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter!("connected_sessions", "Connected Sessions")
            .expect("Failed to register connected sessions metrics")
    });

pub static TOTAL_EVENTS: once_cell::sync::Lazy<IntCounter> = once_cell::sync::Lazy::new(|| {
    register_int_counter!("total_events", "Total Events")
        .expect("Failed to register total events metrics")
});

pub static DROPPED_NOTIFICATIONS: once_cell::sync::Lazy<IntCounter> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter!("dropped_notifications", "Dropped Notifications")
            .expect("Failed to register dropped notifications metrics")
    });

pub static CLEARED_HIGHLIGHTS: once_cell::sync::Lazy<IntCounter> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter!("cleared_highlights", "Cleared Highlights")
            .expect("Failed to register cleared highlights metrics")
    });

pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(error) = encoder.encode(&prometheus::gather(), &mut buffer) {
        error!(%error, "could not encode prometheus metrics");
    }
    String::from_utf8(buffer).unwrap_or_default()
}
