use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tokio::sync::Mutex;

use crate::response::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u64,
    window_start: Instant,
}

/// 固定窗口限流状态，按客户端 IP 计数
#[derive(Debug)]
pub struct RateLimitState {
    window_secs: u64,
    max_requests: u64,
    entries: Mutex<HashMap<IpAddr, WindowEntry>>,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u64,
    pub remaining: u64,
}

impl RateLimitState {
    pub fn new(window_secs: u64, max_requests: u64) -> Self {
        Self {
            window_secs,
            max_requests,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn check(&self, ip: IpAddr) -> RateLimitDecision {
        let now = Instant::now();
        let mut map = self.entries.lock().await;

        // 偶发清理：窗口早已过期的条目直接丢弃，避免 map 无界增长
        if map.len() > 10_000 {
            let window = self.window_secs;
            map.retain(|_, e| now.duration_since(e.window_start).as_secs() <= window * 2);
        }

        let entry = map.entry(ip).or_insert(WindowEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start).as_secs() >= self.window_secs {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;

        RateLimitDecision {
            allowed: entry.count <= self.max_requests,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(entry.count),
        }
    }
}

/// 提取客户端 IP：仅在 TRUST_PROXY 开启时信任 x-forwarded-for 的第一跳
fn client_ip(req: &Request, trust_proxy: bool) -> IpAddr {
    if trust_proxy {
        if let Some(forwarded) = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
        {
            if let Some(first) = forwarded.split(',').next() {
                if let Ok(ip) = first.trim().parse::<IpAddr>() {
                    return ip;
                }
            }
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(std::net::Ipv4Addr::LOCALHOST))
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&req, state.config().trust_proxy);
    let decision = state.rate_limit().check(ip).await;

    if !decision.allowed {
        tracing::warn!(%ip, "Rate limit exceeded");
        return AppError::too_many_requests("Too many requests, slow down").into_response();
    }

    let mut response = next.run(req).await;

    let headers = response.headers_mut();
    if let Ok(v) = HeaderValue::from_str(&decision.limit.to_string()) {
        headers.insert("x-ratelimit-limit", v);
    }
    if let Ok(v) = HeaderValue::from_str(&decision.remaining.to_string()) {
        headers.insert("x-ratelimit-remaining", v);
    }

    response
}
