use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, info_span, warn};
use tracing_futures::Instrument;

use super::signature::{self, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::Data;

const RETRY_HEADER: &str = "x-slack-retry-num";

//
// Events API envelopes
// https://api.slack.com/apis/events-api#callback-field
//
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Envelope {
    UrlVerification { challenge: String },
    EventCallback { event: Event },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub channel: String,

    pub channel_type: Option<String>,
    pub user: Option<String>,
    pub bot_id: Option<String>,
    pub subtype: Option<String>,
    pub ts: Option<String>,
    pub thread_ts: Option<String>,
}

impl Event {
    /// Mentions anywhere, plus plain direct messages. Bot posts and edits are ignored.
    pub fn is_query(&self) -> bool {
        let wanted = match self.kind.as_str() {
            "app_mention" => true,
            "message" => self.channel_type.as_deref() == Some("im"),
            _ => false,
        };

        wanted && self.subtype.is_none() && self.bot_id.is_none() && !self.channel.is_empty()
    }
}

pub fn router(data: Arc<Data>) -> Router {
    Router::new()
        .route("/slack/events", post(events))
        .route("/healthz", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .with_state(data)
}

/// Authenticate a raw request body and only then decode it.
pub fn verified_envelope(
    signing_secret: &str,
    headers: &HeaderMap,
    body: &[u8],
    now: i64,
) -> Result<Envelope, StatusCode> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    signature::verify(
        signing_secret,
        header(TIMESTAMP_HEADER),
        header(SIGNATURE_HEADER),
        body,
        now,
    )
    .map_err(|e| {
        warn!(error = %e, "rejected unsigned request");
        StatusCode::UNAUTHORIZED
    })?;

    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "malformed event payload");
        StatusCode::BAD_REQUEST
    })
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

async fn events(State(data): State<Arc<Data>>, headers: HeaderMap, body: Bytes) -> Response {
    let envelope = match verified_envelope(&data.signing_secret, &headers, &body, unix_now()) {
        Ok(envelope) => envelope,
        Err(status) => return status.into_response(),
    };

    match envelope {
        Envelope::UrlVerification { challenge } => {
            info!("url verification");
            challenge.into_response()
        }
        Envelope::EventCallback { event } => {
            if let Some(retry) = headers.get(RETRY_HEADER) {
                debug!(?retry, "dropping redelivered event");
                return StatusCode::OK.into_response();
            }

            if !event.is_query() {
                debug!(kind = %event.kind, subtype = ?event.subtype, "ignored event");
                return StatusCode::OK.into_response();
            }

            // Slack wants an answer within three seconds; the lookup runs after we ack.
            let span = info_span!("slack_event", channel = %event.channel, user = ?event.user);
            tokio::spawn(handle_event(data, event).instrument(span));

            StatusCode::OK.into_response()
        }
        Envelope::Other => StatusCode::OK.into_response(),
    }
}

async fn handle_event(data: Arc<Data>, event: Event) {
    info!(text = %event.text, "query received");

    let Some(reply) = data.lookup.respond(&event.text).await else {
        debug!("no symbol in message");
        return;
    };

    let thread_ts = event.thread_ts.as_deref();
    if let Err(e) = data
        .slack
        .post_reply(&event.channel, thread_ts, &reply)
        .await
    {
        error!(error = ?e, "failed to post reply");
    }
}
