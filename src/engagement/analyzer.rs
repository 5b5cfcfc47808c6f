//! 帧分析编排器
//!
//! 每帧入口：解码 → 调用两个外部检测器 → 几何信号 → 评分融合 → 时间平滑。
//! 所有会话内可变状态（眨眼计数、窗口计时、上一帧中心、历史）由此持有，
//! 任何内部失败都不会越过 `analyze_frame` 边界：失败路径一律返回中性兜底
//! 结果，只通过计数器和日志外显，且不破坏会话状态。

use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::engagement::config::EngagementConfig;
use crate::engagement::detector::{decode_frame, EmotionClassifier, LandmarkDetector};
use crate::engagement::fusion::{self, FusionInputs};
use crate::engagement::geometry;
use crate::engagement::metrics::AnalysisMetrics;
use crate::engagement::session::SessionState;
use crate::engagement::types::{AnalysisResult, Emotion};

pub struct FrameAnalyzer {
    landmarks: Arc<dyn LandmarkDetector>,
    emotions: Arc<dyn EmotionClassifier>,
    config: EngagementConfig,
    metrics: Arc<AnalysisMetrics>,
    state: SessionState,
}

impl FrameAnalyzer {
    pub fn new(
        landmarks: Arc<dyn LandmarkDetector>,
        emotions: Arc<dyn EmotionClassifier>,
        config: EngagementConfig,
        metrics: Arc<AnalysisMetrics>,
    ) -> Self {
        let state = SessionState::new(&config, Instant::now());
        Self {
            landmarks,
            emotions,
            config,
            metrics,
            state,
        }
    }

    /// 固定 RNG 种子与起始时刻的构造器，供确定性回放测试使用
    pub fn with_seeded_rng(
        landmarks: Arc<dyn LandmarkDetector>,
        emotions: Arc<dyn EmotionClassifier>,
        config: EngagementConfig,
        metrics: Arc<AnalysisMetrics>,
        seed: u64,
        start: Instant,
    ) -> Self {
        let state = SessionState::with_rng(&config, start, StdRng::seed_from_u64(seed));
        Self {
            landmarks,
            emotions,
            config,
            metrics,
            state,
        }
    }

    pub async fn analyze_frame(&mut self, raw: &[u8]) -> AnalysisResult {
        self.analyze_frame_at(raw, Instant::now()).await
    }

    /// 以显式时刻分析一帧；时间注入使眨眼窗口与采样节流可以被测试驱动
    pub async fn analyze_frame_at(&mut self, raw: &[u8], now: Instant) -> AnalysisResult {
        self.metrics.record_frame();

        let frame = match decode_frame(raw) {
            Ok(frame) => frame,
            Err(e) => {
                self.metrics.record_decode_failure();
                tracing::warn!(error = %e, "Frame decode failed, returning neutral result");
                return AnalysisResult::fallback();
            }
        };

        // 两个检测器互相独立，并行等待
        let (emotion_result, landmark_result) = tokio::join!(
            self.emotions.classify_emotion(&frame),
            self.landmarks.detect_landmarks(&frame),
        );

        // 情绪分类失败可容忍：降级为 neutral 继续本帧
        let emotion = match emotion_result {
            Ok(emotion) => emotion,
            Err(e) => {
                self.metrics.record_detector_failure();
                tracing::warn!(error = %e, "Emotion classification failed, defaulting to neutral");
                Emotion::Neutral
            }
        };

        let positivity = fusion::positivity_score(emotion, &mut self.state.rng);

        // 关键点检测失败视为帧级异常：兜底返回，不写入历史
        let (head_movement, tilt_penalty) = match landmark_result {
            Ok(Some(set)) => {
                let set = set.to_pixel(frame.width, frame.height);

                if geometry::mean_eye_aspect_ratio(&set) < self.config.ear_blink_threshold {
                    self.state.note_blink();
                }

                let center = geometry::face_center(&set);
                let movement = self.state.movement_from(center);
                let tilt = geometry::head_tilt_penalty(&set, &self.config);
                (Some(movement), tilt)
            }
            Ok(None) => {
                self.metrics.record_no_face();
                (None, 0.0)
            }
            Err(e) => {
                self.metrics.record_detector_failure();
                tracing::warn!(error = %e, "Landmark detection failed, returning neutral result");
                return AnalysisResult::fallback();
            }
        };

        let blink_rate = self.state.blinks_per_second(now);

        let engagement = fusion::engagement_score(
            &FusionInputs {
                emotion,
                blinks_per_sec: blink_rate,
                head_movement,
                tilt_penalty,
            },
            &self.config,
        );

        self.state.smoother.record(engagement, positivity, now);

        AnalysisResult {
            engagement,
            positivity,
            emotion,
            blink_rate,
            head_movement: head_movement.unwrap_or(0.0),
        }
    }

    /// 平滑读数，空历史返回 (0.5, 0.5)
    pub fn smoothed_scores(&self) -> (f64, f64) {
        self.state.smoother.smoothed()
    }

    pub fn history_len(&self) -> usize {
        self.state.smoother.len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::engagement::detector::mock;

    fn png_frame() -> Vec<u8> {
        let mut bytes = Vec::new();
        image::DynamicImage::new_rgb8(64, 64)
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )
            .unwrap();
        bytes
    }

    fn no_face_analyzer(emotion: Emotion, start: Instant) -> FrameAnalyzer {
        FrameAnalyzer::with_seeded_rng(
            Arc::new(mock::NoFace),
            Arc::new(mock::FixedEmotion(emotion)),
            EngagementConfig::default(),
            Arc::new(AnalysisMetrics::new()),
            7,
            start,
        )
    }

    #[tokio::test]
    async fn malformed_bytes_return_fallback_without_recording() {
        let t0 = Instant::now();
        let mut analyzer = no_face_analyzer(Emotion::Neutral, t0);

        let result = analyzer.analyze_frame_at(b"broken", t0).await;

        assert_eq!(result.engagement, 0.5);
        assert_eq!(result.positivity, 0.5);
        assert_eq!(result.emotion, Emotion::Neutral);
        assert_eq!(result.blink_rate, 0.0);
        assert_eq!(result.head_movement, 0.0);
        assert_eq!(analyzer.history_len(), 0);
        assert_eq!(analyzer.smoothed_scores(), (0.5, 0.5));
    }

    #[tokio::test]
    async fn no_face_neutral_frame_scores_low() {
        let t0 = Instant::now();
        let mut analyzer = no_face_analyzer(Emotion::Neutral, t0);

        let result = analyzer.analyze_frame_at(&png_frame(), t0).await;

        assert_eq!(result.emotion, Emotion::Neutral);
        assert_eq!(result.head_movement, 0.0);
        assert_eq!(result.blink_rate, 0.0);
        // 0.4*0.5 + 0.3*0 + 0.2*0.1 + 0.1*0
        assert!((result.engagement - 0.22).abs() < 1e-12);
        assert!((0.4..0.8).contains(&result.positivity));
    }

    #[tokio::test]
    async fn landmark_detector_failure_returns_fallback() {
        let t0 = Instant::now();
        let metrics = Arc::new(AnalysisMetrics::new());
        let mut analyzer = FrameAnalyzer::with_seeded_rng(
            Arc::new(mock::Failing),
            Arc::new(mock::FixedEmotion(Emotion::Happy)),
            EngagementConfig::default(),
            metrics.clone(),
            7,
            t0,
        );

        let result = analyzer.analyze_frame_at(&png_frame(), t0).await;

        assert_eq!(result.engagement, 0.5);
        assert_eq!(analyzer.history_len(), 0);
        assert_eq!(metrics.snapshot().detector_failures, 1);
    }

    #[tokio::test]
    async fn emotion_failure_degrades_to_neutral_and_continues() {
        let t0 = Instant::now();
        let metrics = Arc::new(AnalysisMetrics::new());
        let mut analyzer = FrameAnalyzer::with_seeded_rng(
            Arc::new(mock::NoFace),
            Arc::new(mock::Failing),
            EngagementConfig::default(),
            metrics.clone(),
            7,
            t0,
        );

        let result = analyzer.analyze_frame_at(&png_frame(), t0).await;

        assert_eq!(result.emotion, Emotion::Neutral);
        assert!((result.engagement - 0.22).abs() < 1e-12);
        assert_eq!(analyzer.history_len(), 1);
        assert_eq!(metrics.snapshot().detector_failures, 1);
    }

    #[tokio::test]
    async fn history_updates_are_throttled_to_one_hz() {
        let t0 = Instant::now();
        let mut analyzer = no_face_analyzer(Emotion::Neutral, t0);
        let frame = png_frame();

        analyzer.analyze_frame_at(&frame, t0).await;
        analyzer
            .analyze_frame_at(&frame, t0 + Duration::from_millis(200))
            .await;
        analyzer
            .analyze_frame_at(&frame, t0 + Duration::from_millis(700))
            .await;
        assert_eq!(analyzer.history_len(), 1);

        analyzer
            .analyze_frame_at(&frame, t0 + Duration::from_millis(1500))
            .await;
        assert_eq!(analyzer.history_len(), 2);
    }

    #[tokio::test]
    async fn smoothed_scores_average_history() {
        let t0 = Instant::now();
        let mut analyzer = no_face_analyzer(Emotion::Neutral, t0);
        let frame = png_frame();

        for i in 0..3u64 {
            analyzer
                .analyze_frame_at(&frame, t0 + Duration::from_secs(i))
                .await;
        }

        let (engagement, positivity) = analyzer.smoothed_scores();
        assert!((engagement - 0.22).abs() < 1e-12);
        assert!((0.4..0.8).contains(&positivity));
    }
}
