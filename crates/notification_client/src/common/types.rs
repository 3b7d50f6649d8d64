/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::utils::lenient_urgency;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq)]
pub struct ClientId(pub String);

impl ClientId {
    pub fn inner(&self) -> String {
        self.0.to_owned()
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn inner(&self) -> String {
        self.0.to_owned()
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NotificationId(pub i64);

impl NotificationId {
    pub fn inner(&self) -> i64 {
        self.0
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ListingId(pub i64);

impl ListingId {
    pub fn inner(&self) -> i64 {
        self.0
    }
}

#[derive(
    Debug, Clone, Copy, EnumString, EnumIter, Display, Serialize, Deserialize, Eq, Hash, PartialEq,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl UrgencyLevel {
    pub fn is_urgent(&self) -> bool {
        matches!(self, UrgencyLevel::High | UrgencyLevel::Critical)
    }
}

#[derive(
    Debug, Clone, Copy, EnumString, EnumIter, Display, Serialize, Deserialize, Eq, Hash, PartialEq,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ListingStatus {
    Available,
    Claimed,
    Completed,
}

#[derive(
    Debug, Clone, Copy, EnumString, EnumIter, Display, Serialize, Deserialize, Eq, Hash, PartialEq,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DashboardTab {
    Available,
    Claimed,
    Completed,
}

/// Food descriptor carried inside a live event. Every field is optional by
/// convention, the server does not guarantee any shape beyond JSON.
#[derive(Deserialize, Serialize, Clone, Debug, Default, Eq, PartialEq)]
#[serde(default)]
pub struct FoodDescriptor {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub food_type: Option<String>,
    pub qty: Option<String>,
    pub expiry: Option<String>,
    pub address: Option<String>,
    pub donor: Option<String>,
}

/// Inbound `new-food-nearby` payload with every access defended by a default.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FoodEvent {
    pub food: Option<FoodDescriptor>,
    pub distance_text: Option<String>,
    pub match_score: Option<u32>,
    #[serde(deserialize_with = "lenient_urgency")]
    pub urgency_level: Option<UrgencyLevel>,
}

impl FoodEvent {
    pub fn is_urgent(&self) -> bool {
        self.urgency_level
            .as_ref()
            .map(UrgencyLevel::is_urgent)
            .unwrap_or(false)
    }
}

/// Wire envelope for the socket connection : `{"event": ..., "data": ...}`.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum SocketFrame {
    #[serde(rename = "join")]
    Join(ClientId),
    #[serde(rename = "new-food-nearby")]
    NewFoodNearby(FoodEvent),
}
