#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr};

use axum::Router;
use tokio::sync::broadcast;

use interview_backend::config::{
    Config, DetectorConfig, LLMConfig, RateLimitConfig, SessionConfig, WorkerConfig,
};
use interview_backend::engagement::detector::build_detectors;
use interview_backend::engagement::EngagementConfig;
use interview_backend::routes::build_router;
use interview_backend::state::AppState;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
}

async fn spawn_with_limits(api_limit: u64) -> TestApp {
    // 直接构造 Config，避免使用 set_var 造成多线程测试环境变量竞态
    let config = Config {
        host: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
        port: 5000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        cors_origin: "http://localhost:3000".to_string(),
        trust_proxy: false,
        rate_limit: RateLimitConfig {
            window_secs: 60,
            max_requests: api_limit,
        },
        worker: WorkerConfig {
            is_leader: false,
            enable_metrics_log: false,
        },
        session: SessionConfig {
            idle_ttl_secs: 1800,
            max_sessions: 16,
            max_sse_connections: 16,
            sse_tick_secs: 1,
        },
        detector: DetectorConfig {
            mock: true,
            base_url: String::new(),
            timeout_secs: 1,
        },
        llm: LLMConfig {
            enabled: true,
            mock: true,
            api_url: String::new(),
            api_key: String::new(),
            timeout_secs: 5,
        },
    };

    let (landmarks, emotions) = build_detectors(&config.detector);
    let (shutdown_tx, _) = broadcast::channel::<()>(8);

    let state = AppState::new(
        landmarks,
        emotions,
        EngagementConfig::default(),
        &config,
        shutdown_tx,
    );

    let app = build_router(state.clone());

    TestApp { app, state, config }
}

pub async fn spawn_test_app() -> TestApp {
    spawn_with_limits(100).await
}

pub async fn spawn_test_app_with_limit(api_limit: u64) -> TestApp {
    spawn_with_limits(api_limit).await
}
