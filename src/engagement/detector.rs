//! 外部检测能力边界
//!
//! 关键点提取与情绪分类由旁路推理服务提供，这里只定义两个窄接口并给出
//! HTTP 实现。实现约定：
//! - 合法图像但画面中无人脸 → Ok(None)，不是错误
//! - 分类服务不确定时返回 neutral，未知标签在此边界降级为 neutral
//! - 传输层失败 → DetectorError，由编排器按帧级降级处理

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::DetectorConfig;
use crate::engagement::types::{
    DecodeError, DecodedFrame, DetectorError, Emotion, LandmarkSet, Point,
};

/// 把原始帧字节解码为结构化图像
///
/// 只校验并提取尺寸；原始字节原样保留用于转发给检测服务。
pub fn decode_frame(raw: &[u8]) -> Result<DecodedFrame, DecodeError> {
    let img = image::load_from_memory(raw).map_err(|e| DecodeError(e.to_string()))?;
    Ok(DecodedFrame {
        width: img.width(),
        height: img.height(),
        raw: raw.to_vec(),
    })
}

#[async_trait]
pub trait LandmarkDetector: Send + Sync {
    /// 返回归一化关键点集合；无人脸时返回 None
    async fn detect_landmarks(
        &self,
        frame: &DecodedFrame,
    ) -> Result<Option<LandmarkSet>, DetectorError>;
}

#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// 返回主导情绪；不确定时应返回 Neutral 而不是失败
    async fn classify_emotion(&self, frame: &DecodedFrame) -> Result<Emotion, DetectorError>;
}

fn map_reqwest_error(e: reqwest::Error) -> DetectorError {
    if e.is_timeout() {
        DetectorError::Timeout
    } else {
        DetectorError::Network(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct LandmarkPayload {
    landmarks: Option<Vec<RawPoint>>,
}

#[derive(Debug, Deserialize)]
struct RawPoint {
    x: f64,
    y: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmotionPayload {
    dominant_emotion: String,
}

/// 基于旁路推理服务的关键点检测器
///
/// POST {base}/landmarks，请求体为原始图像字节（octet-stream）。
#[derive(Debug, Clone)]
pub struct HttpLandmarkDetector {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpLandmarkDetector {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            client: build_client(config.timeout_secs),
            endpoint: format!("{}/landmarks", config.base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl LandmarkDetector for HttpLandmarkDetector {
    async fn detect_landmarks(
        &self,
        frame: &DecodedFrame,
    ) -> Result<Option<LandmarkSet>, DetectorError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(frame.raw.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DetectorError::Network(format!(
                "landmark service returned {status}"
            )));
        }

        let payload: LandmarkPayload = response.json().await.map_err(map_reqwest_error)?;

        match payload.landmarks {
            None => Ok(None),
            Some(raw) => {
                let points: Vec<Point> = raw.into_iter().map(|p| Point::new(p.x, p.y)).collect();
                let count = points.len();
                LandmarkSet::new(points).map(Some).ok_or_else(|| {
                    DetectorError::InvalidPayload(format!("expected 468 landmarks, got {count}"))
                })
            }
        }
    }
}

/// 基于旁路推理服务的情绪分类器
#[derive(Debug, Clone)]
pub struct HttpEmotionClassifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpEmotionClassifier {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            client: build_client(config.timeout_secs),
            endpoint: format!("{}/emotion", config.base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl EmotionClassifier for HttpEmotionClassifier {
    async fn classify_emotion(&self, frame: &DecodedFrame) -> Result<Emotion, DetectorError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(frame.raw.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DetectorError::Network(format!(
                "emotion service returned {status}"
            )));
        }

        let payload: EmotionPayload = response.json().await.map_err(map_reqwest_error)?;

        // 未知标签不跨越此边界：按接口约定降级为 neutral
        Ok(Emotion::parse_label(&payload.dominant_emotion).unwrap_or(Emotion::Neutral))
    }
}

fn build_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// 按配置装配检测器对：mock 模式返回无人脸 + neutral 的确定性替身
pub fn build_detectors(
    config: &DetectorConfig,
) -> (Arc<dyn LandmarkDetector>, Arc<dyn EmotionClassifier>) {
    if config.mock {
        tracing::info!("Detector mock mode enabled; frames will report no face / neutral");
        (
            Arc::new(mock::NoFace),
            Arc::new(mock::FixedEmotion(Emotion::Neutral)),
        )
    } else {
        (
            Arc::new(HttpLandmarkDetector::new(config)),
            Arc::new(HttpEmotionClassifier::new(config)),
        )
    }
}

/// 确定性替身，用于测试与 DETECTOR_MOCK 模式
pub mod mock {
    use super::*;

    /// 始终报告无人脸
    #[derive(Debug, Clone, Default)]
    pub struct NoFace;

    #[async_trait]
    impl LandmarkDetector for NoFace {
        async fn detect_landmarks(
            &self,
            _frame: &DecodedFrame,
        ) -> Result<Option<LandmarkSet>, DetectorError> {
            Ok(None)
        }
    }

    /// 始终返回同一组关键点
    #[derive(Debug, Clone)]
    pub struct FixedLandmarks(pub LandmarkSet);

    #[async_trait]
    impl LandmarkDetector for FixedLandmarks {
        async fn detect_landmarks(
            &self,
            _frame: &DecodedFrame,
        ) -> Result<Option<LandmarkSet>, DetectorError> {
            Ok(Some(self.0.clone()))
        }
    }

    /// 始终返回同一情绪
    #[derive(Debug, Clone, Copy)]
    pub struct FixedEmotion(pub Emotion);

    #[async_trait]
    impl EmotionClassifier for FixedEmotion {
        async fn classify_emotion(&self, _frame: &DecodedFrame) -> Result<Emotion, DetectorError> {
            Ok(self.0)
        }
    }

    /// 始终失败，用于降级路径测试
    #[derive(Debug, Clone, Default)]
    pub struct Failing;

    #[async_trait]
    impl LandmarkDetector for Failing {
        async fn detect_landmarks(
            &self,
            _frame: &DecodedFrame,
        ) -> Result<Option<LandmarkSet>, DetectorError> {
            Err(DetectorError::Network("mock failure".to_string()))
        }
    }

    #[async_trait]
    impl EmotionClassifier for Failing {
        async fn classify_emotion(&self, _frame: &DecodedFrame) -> Result<Emotion, DetectorError> {
            Err(DetectorError::Network("mock failure".to_string()))
        }
    }
}
