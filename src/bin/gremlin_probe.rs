//! Connectivity probe for a Gremlin endpoint
//!
//! Connects, keeps the connection alive with heartbeats, sends one query
//! and prints every response frame until the final one arrives.
//!
//! ```text
//! gremlin_probe [query]          # default query: g.V().count()
//! GREMLIN_HOST=wss://... gremlin_probe
//! ```

use anyhow::{Context, Result};
use gremlin_api::{to_values, Graph, GremlinRequest, GremlinResponse};
use gremlin_client::bin_common::{
    init_tracing_with_level, load_config_from_env, parse_args, GremlinConfig,
};
use gremsocket::{spawn_heartbeat, ErrorCategory, PongTracker, WebSocketSession, WsMessage};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = load_config_from_env();
    let config = GremlinConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    init_tracing_with_level(&config.log_level);
    config.log();

    let query = match parse_args().into_iter().next() {
        Some(query) => query,
        None => Graph::new("g").v().count().to_string(),
    };

    let tracker = Arc::new(PongTracker::new(config.pong_timeout()));
    let session = Arc::new(WebSocketSession::new(
        config.host.clone(),
        config.session_config().with_pong_handler(tracker.clone()),
    )?);

    if let Err(e) = session.connect().await {
        error!("{}", e);
        return Err(e.into());
    }

    let heartbeat = spawn_heartbeat(Arc::clone(&session), config.heartbeat_interval());

    let request = GremlinRequest::eval(query);
    info!("Sending {} ({})", request.args.gremlin, request.request_id);
    session.write(&request.encode()?).await?;

    let outcome = read_responses(&session, &request).await;

    while let Some(event) = heartbeat.try_recv_event() {
        debug!("Heartbeat event: {:?}", event);
    }
    heartbeat.stop().await;
    session.close().await?;

    let metrics = session.metrics();
    info!(
        "Frames sent: {}, received: {}, pings: {}, pongs: {}",
        metrics.frames_sent,
        metrics.frames_received,
        metrics.pings_sent,
        tracker.pongs_received()
    );

    outcome
}

async fn read_responses(session: &WebSocketSession, request: &GremlinRequest) -> Result<()> {
    loop {
        let frame = match session.read().await {
            Ok(frame) => frame,
            Err(e) if e.category() == ErrorCategory::Deadline => {
                warn!("No response within the read window: {}", e);
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        let payload = match frame {
            WsMessage::Text(text) => text.into_bytes(),
            WsMessage::Binary(data) => data,
            WsMessage::Pong(_) | WsMessage::Ping(_) => continue,
            WsMessage::Close(reason) => {
                warn!("Server closed the connection: {:?}", reason);
                return Ok(());
            }
        };

        let response = GremlinResponse::decode(&payload)?;
        if !response.answers(request) {
            debug!("Skipping response for {:?}", response.request_id);
            continue;
        }

        if !response.status.is_success() {
            anyhow::bail!("query failed: {}", response.status);
        }

        match to_values(response.data()) {
            Ok(values) => {
                for value in values {
                    println!("{}", value);
                }
            }
            Err(_) => info!("Status {}", response.status),
        }

        if !response.status.is_partial() {
            return Ok(());
        }
    }
}
