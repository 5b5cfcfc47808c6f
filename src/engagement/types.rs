use serde::{Deserialize, Serialize};

/// MediaPipe Face Mesh 输出的关键点数量
pub const LANDMARK_COUNT: usize = 468;

/// 2D 点（像素或归一化坐标，由上下文决定）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// 单帧面部关键点集合
///
/// 检测器返回归一化坐标（[0,1]），分析前用 `to_pixel` 映射到像素空间。
/// 索引顺序与 MediaPipe Face Mesh 一致（0..467）。
#[derive(Debug, Clone)]
pub struct LandmarkSet {
    points: Vec<Point>,
}

impl LandmarkSet {
    /// 仅接受完整的 468 点集合，残缺数据在检测器边界被拒绝
    pub fn new(points: Vec<Point>) -> Option<Self> {
        if points.len() == LANDMARK_COUNT {
            Some(Self { points })
        } else {
            None
        }
    }

    pub fn point(&self, index: usize) -> Point {
        self.points[index]
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn to_pixel(&self, width: u32, height: u32) -> LandmarkSet {
        let (w, h) = (width as f64, height as f64);
        LandmarkSet {
            points: self
                .points
                .iter()
                .map(|p| Point::new(p.x * w, p.y * h))
                .collect(),
        }
    }
}

/// 离散主导情绪标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Surprise,
    Neutral,
    Angry,
    Sad,
    Fear,
    Disgust,
}

impl Emotion {
    /// 解析外部分类服务返回的标签；无法识别的标签返回 None，
    /// 由调用方按接口约定降级为 Neutral。
    pub fn parse_label(label: &str) -> Option<Emotion> {
        match label.trim().to_ascii_lowercase().as_str() {
            "happy" => Some(Emotion::Happy),
            "surprise" => Some(Emotion::Surprise),
            "neutral" => Some(Emotion::Neutral),
            "angry" => Some(Emotion::Angry),
            "sad" => Some(Emotion::Sad),
            "fear" => Some(Emotion::Fear),
            "disgust" => Some(Emotion::Disgust),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Surprise => "surprise",
            Emotion::Neutral => "neutral",
            Emotion::Angry => "angry",
            Emotion::Sad => "sad",
            Emotion::Fear => "fear",
            Emotion::Disgust => "disgust",
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单帧分析结果，原样返回给传输层
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub engagement: f64,
    pub positivity: f64,
    pub emotion: Emotion,
    pub blink_rate: f64,
    pub head_movement: f64,
}

impl AnalysisResult {
    /// 任何内部失败时的中性兜底结果：UI 看到的是一次中性波动而非故障
    pub fn fallback() -> Self {
        Self {
            engagement: 0.5,
            positivity: 0.5,
            emotion: Emotion::Neutral,
            blink_rate: 0.0,
            head_movement: 0.0,
        }
    }
}

/// 帧字节无法解码为图像
#[derive(Debug, thiserror::Error)]
#[error("frame decode failed: {0}")]
pub struct DecodeError(pub String);

/// 外部检测服务调用失败（网络、超时、响应格式）
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    #[error("detector request failed: {0}")]
    Network(String),
    #[error("detector request timed out")]
    Timeout,
    #[error("detector returned invalid payload: {0}")]
    InvalidPayload(String),
}

/// 解码后的帧：尺寸用于关键点映射，原始字节转发给外部检测服务
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    pub width: u32,
    pub height: u32,
    pub raw: Vec<u8>,
}
