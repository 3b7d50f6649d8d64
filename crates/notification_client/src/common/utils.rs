/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::types::UrgencyLevel;
use chrono::Utc;
use serde::{Deserialize, Deserializer};
use std::{
    str::FromStr,
    sync::atomic::{AtomicI64, Ordering},
};

/// Single id authority shared by notifications, live listings and seeded
/// listings. Ids are millisecond timestamps bumped past the last issued id,
/// so they stay strictly increasing even within the same millisecond.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last_issued: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            last_issued: AtomicI64::new(0),
        }
    }

    pub fn next_id(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let prev = self
            .last_issued
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(last.max(now - 1) + 1)
            })
            .unwrap_or(now - 1);
        prev.max(now - 1) + 1
    }
}

/// Unknown or unparseable urgency values map to `None` instead of rejecting
/// the whole payload.
pub fn lenient_urgency<'de, D>(deserializer: D) -> Result<Option<UrgencyLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|level| UrgencyLevel::from_str(&level).ok()))
}

/// Leading integer of a quantity string, e.g. "40 meals" -> 40.
pub fn leading_number(quantity: &str) -> Option<u32> {
    let digits: String = quantity
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
