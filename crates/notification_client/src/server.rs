/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::{
    common::types::{ClientId, FoodEvent},
    connection::run_socket_connection,
    environment::{AppConfig, AppState},
    reader::run_notification_reader,
    tools::{logger::setup_tracing, prometheus::encode_metrics},
};
use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::{anyhow, Result};
use std::{env::var, net::Ipv4Addr};
use tokio::{
    signal::unix::{signal, SignalKind},
    sync::{
        mpsc::{self, UnboundedReceiver, UnboundedSender},
        oneshot,
    },
};
use tracing::*;

pub async fn run_server() -> Result<()> {
    let dhall_config_path = var("DHALL_CONFIG")
        .unwrap_or_else(|_| "./dhall-configs/dev/notification_client.dhall".to_string());
    let app_config = serde_dhall::from_file(dhall_config_path).parse::<AppConfig>()?;

    let _guard = setup_tracing(app_config.logger_cfg.clone());

    std::panic::set_hook(Box::new(|panic_info| {
        error!("Panic Occured : {:?}", panic_info);
    }));

    let app_state = AppState::new(app_config)?;
    app_state.dashboard.seed_sample_listings().await;

    // Identity comes from the external auth layer; absence means no live
    // connection is established.
    let client_id = var("CLIENT_ID")
        .ok()
        .filter(|client_id| !client_id.is_empty())
        .map(ClientId);

    let (event_tx, event_rx): (UnboundedSender<FoodEvent>, UnboundedReceiver<FoodEvent>) =
        mpsc::unbounded_channel();

    let (connection_signal_tx, connection_signal_rx) = oneshot::channel();
    let (reader_signal_tx, reader_signal_rx) = oneshot::channel();
    tokio::spawn(async move {
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install signal handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to install signal handler");
        tokio::select! {
            _ = sigterm.recv() => {
                error!("SIGTERM received: shutting down");
            },
            _ = sigint.recv() => {
                error!("SIGINT received: shutting down");
            }
        }
        let _ = connection_signal_tx.send(());
        let _ = reader_signal_tx.send(());
    });

    let connection_task = run_socket_connection(
        client_id,
        app_state.socket_endpoint.clone(),
        event_tx,
        connection_signal_rx,
    );

    let reader_task =
        run_notification_reader(event_rx, reader_signal_rx, app_state.dashboard.clone());

    let http_server = HttpServer::new(move || {
        App::new()
            .route(
                "/health",
                web::get().to(|| {
                    Box::pin(async { HttpResponse::Ok().body("Notification Client Is Up!") })
                }),
            )
            .route(
                "/metrics",
                web::get().to(|| Box::pin(async { HttpResponse::Ok().body(encode_metrics()) })),
            )
    })
    .bind((Ipv4Addr::UNSPECIFIED, app_state.http_server_port))?
    .shutdown_timeout(60)
    .run();

    tokio::select! {
        res = http_server => {
            error!("[HTTP_SERVER_ENDED] : {:?}", res);
            Err(anyhow!("[HTTP_SERVER] : {:?}", res))
        }
        _ = async { tokio::join!(connection_task, reader_task) } => {
            info!("[PIPELINE_ENDED]");
            Ok(())
        }
    }
}
