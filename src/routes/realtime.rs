use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::Router;
use futures::Stream;

use crate::response::AppError;
use crate::state::AppState;

static SSE_CONNECTION_COUNT: AtomicUsize = AtomicUsize::new(0);

struct SseGuard;
impl Drop for SseGuard {
    fn drop(&mut self) {
        SSE_CONNECTION_COUNT.fetch_sub(1, Ordering::SeqCst);
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/sessions/:id/events", get(sse_handler))
}

/// 平滑指标推流：按固定周期把会话的平滑分数对推给前端。
/// 会话结束或服务关停时流随之结束。
pub async fn sse_handler(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let max_sse = state.config().session.max_sse_connections;
    let current = SSE_CONNECTION_COUNT.fetch_add(1, Ordering::SeqCst);
    if current >= max_sse {
        SSE_CONNECTION_COUNT.fetch_sub(1, Ordering::SeqCst);
        return Err(AppError::too_many_requests("Too many SSE connections"));
    }

    if state.sessions().get(&session_id).await.is_none() {
        SSE_CONNECTION_COUNT.fetch_sub(1, Ordering::SeqCst);
        return Err(AppError::not_found("Session not found"));
    }

    let mut shutdown_rx = state.shutdown_rx();
    let tick = Duration::from_secs(state.config().session.sse_tick_secs.max(1));

    let stream = async_stream::stream! {
        let _guard = SseGuard;
        let mut interval = tokio::time::interval(tick);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let scores = match state.sessions().get(&session_id).await {
                        Some(slot) => {
                            let session = slot.lock().await;
                            session.analyzer.smoothed_scores()
                        }
                        None => {
                            // 会话已结束，通知前端后收尾
                            yield Ok(Event::default().event("session_ended").data("{}"));
                            break;
                        }
                    };
                    let (engagement, positivity) = scores;

                    let event_data = serde_json::json!({
                        "type": "metrics",
                        "engagementScore": engagement,
                        "positivityScore": positivity,
                    });

                    if let Ok(json) = serde_json::to_string(&event_data) {
                        yield Ok(Event::default().event("metrics").data(json));
                    }
                }
                _ = shutdown_rx.recv() => {
                    break;
                }
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive"),
    ))
}
