use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

use crate::config::Config;
use crate::engagement::detector::{EmotionClassifier, LandmarkDetector};
use crate::engagement::{AnalysisMetrics, EngagementConfig, FrameAnalyzer};
use crate::middleware::rate_limit::RateLimitState;
use crate::services::llm_provider::LlmProvider;
use crate::sessions::SessionRegistry;

#[derive(Clone)]
pub struct AppState {
    sessions: Arc<SessionRegistry>,
    llm: Arc<LlmProvider>,
    landmark_detector: Arc<dyn LandmarkDetector>,
    emotion_classifier: Arc<dyn EmotionClassifier>,
    engagement_config: EngagementConfig,
    analysis_metrics: Arc<AnalysisMetrics>,
    rate_limit: Arc<RateLimitState>,
    config: Arc<Config>,
    shutdown_tx: broadcast::Sender<()>,
    started_at: Instant,
}

impl AppState {
    pub fn new(
        landmark_detector: Arc<dyn LandmarkDetector>,
        emotion_classifier: Arc<dyn EmotionClassifier>,
        engagement_config: EngagementConfig,
        config: &Config,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        let sessions = Arc::new(SessionRegistry::new(
            Duration::from_secs(config.session.idle_ttl_secs),
            config.session.max_sessions,
        ));
        let rate_limit = Arc::new(RateLimitState::new(
            config.rate_limit.window_secs,
            config.rate_limit.max_requests,
        ));

        Self {
            sessions,
            llm: Arc::new(LlmProvider::new(&config.llm)),
            landmark_detector,
            emotion_classifier,
            engagement_config,
            analysis_metrics: Arc::new(AnalysisMetrics::new()),
            rate_limit,
            config: Arc::new(config.clone()),
            shutdown_tx,
            started_at: Instant::now(),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    pub fn llm(&self) -> &LlmProvider {
        &self.llm
    }

    /// 为新会话装配一个帧分析器（共享检测器与计数器，状态独立）
    pub fn new_analyzer(&self) -> FrameAnalyzer {
        FrameAnalyzer::new(
            self.landmark_detector.clone(),
            self.emotion_classifier.clone(),
            self.engagement_config.clone(),
            self.analysis_metrics.clone(),
        )
    }

    pub fn analysis_metrics(&self) -> &Arc<AnalysisMetrics> {
        &self.analysis_metrics
    }

    pub fn rate_limit(&self) -> &Arc<RateLimitState> {
        &self.rate_limit
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shutdown_rx(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn shutdown_tx(&self) -> &broadcast::Sender<()> {
        &self.shutdown_tx
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
