use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive};
use bytes::Bytes;
use futures::stream::Stream;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tracing::warn;

use crate::config::SSE_KEEPALIVE_SECS;
use crate::state::{AppState, SearchEvent};

/// Stream search progress and completion events. On connect (and whenever a
/// subscriber falls behind the broadcast buffer) the last completed result is
/// replayed so the client starts from a known state.
pub async fn search_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = async_stream::stream! {
        if let Some((seq, json)) = last_completed(&state).await {
            if let Some(payload) = event_payload(json.as_ref()) {
                yield Ok(
                    Event::default()
                        .id(seq.to_string())
                        .event("complete")
                        .data(payload),
                );
            } else {
                warn!("last search payload is not valid utf-8, skipping replay event");
            }
        }

        let rx = state.event_tx.subscribe();
        let mut stream = BroadcastStream::new(rx);

        while let Some(result) = stream.next().await {
            match result {
                Ok(event) => {
                    let (event_type, seq, json) = match event {
                        SearchEvent::Progress { seq, json } => ("progress", seq, json),
                        SearchEvent::Completed { seq, json } => ("complete", seq, json),
                    };
                    let Some(payload) = event_payload(json.as_ref()) else {
                        warn!(
                            seq,
                            event = event_type,
                            "event payload is not valid utf-8, dropping SSE event"
                        );
                        continue;
                    };
                    yield Ok(
                        Event::default()
                            .id(seq.to_string())
                            .event(event_type)
                            .data(payload),
                    );
                }
                Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(
                        skipped_events = skipped,
                        "SSE client lagged behind progress buffer, replaying last result"
                    );
                    if let Some((seq, json)) = last_completed(&state).await
                        && let Some(payload) = event_payload(json.as_ref())
                    {
                        yield Ok(
                            Event::default()
                                .id(seq.to_string())
                                .event("complete")
                                .data(payload),
                        );
                    }
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(SSE_KEEPALIVE_SECS))
            .text("keep-alive"),
    )
}

async fn last_completed(state: &AppState) -> Option<(u64, Arc<Bytes>)> {
    let slot = state.last_search.read().await;
    slot.as_ref()
        .map(|stored| (stored.seq(), Arc::clone(&stored.json)))
}

fn event_payload(bytes: &Bytes) -> Option<&str> {
    std::str::from_utf8(bytes.as_ref()).ok()
}
