/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::{
    common::utils::IdGenerator, dashboard::Dashboard, store::NotificationStore,
    tools::logger::LoggerConfig,
};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{env::var, sync::Arc, time::Duration};
use url::Url;

const DEFAULT_SOCKET_ENDPOINT: &str = "ws://127.0.0.1:5000/socket";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub socket_endpoint: String,
    pub http_server_port: u16,
    pub logger_cfg: LoggerConfig,
    pub notification_cap: usize,
    pub highlight_delay_millis: u64,
}

/// Explicit application-scoped state, constructed once at startup and passed
/// by injection instead of ambient lookup.
#[derive(Clone)]
pub struct AppState {
    pub notifications: Arc<NotificationStore>,
    pub dashboard: Arc<Dashboard>,
    pub id_generator: Arc<IdGenerator>,
    pub socket_endpoint: Url,
    pub http_server_port: u16,
}

impl AppState {
    pub fn new(app_config: AppConfig) -> Result<AppState> {
        let endpoint = var("SOCKET_ENDPOINT")
            .ok()
            .filter(|endpoint| !endpoint.is_empty())
            .or_else(|| Some(app_config.socket_endpoint).filter(|endpoint| !endpoint.is_empty()))
            .unwrap_or_else(|| DEFAULT_SOCKET_ENDPOINT.to_string());
        let socket_endpoint = Url::parse(&endpoint)
            .with_context(|| format!("Failed to parse socket endpoint : {endpoint}"))?;

        let id_generator = Arc::new(IdGenerator::new());
        let notifications = Arc::new(NotificationStore::new(
            id_generator.clone(),
            app_config.notification_cap,
        ));
        let dashboard = Arc::new(Dashboard::new(
            notifications.clone(),
            id_generator.clone(),
            Duration::from_millis(app_config.highlight_delay_millis),
        ));

        Ok(AppState {
            notifications,
            dashboard,
            id_generator,
            socket_endpoint,
            http_server_port: app_config.http_server_port,
        })
    }
}
