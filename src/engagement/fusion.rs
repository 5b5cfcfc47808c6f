//! 评分融合
//!
//! 把情绪标签、眨眼频率、头部移动和姿态惩罚融合为 [0,1] 的参与度评分，
//! 并把情绪桶映射为 [0,1] 的积极度评分。
//!
//! 积极度按情绪桶做区间内均匀抽样（刻意保留的抖动行为）：
//! 相同情绪输入不保证产生相同输出。RNG 由会话状态持有，测试中可注入种子。

use rand::Rng;

use crate::engagement::config::EngagementConfig;
use crate::engagement::types::Emotion;

/// 情绪桶，决定积极度抽样区间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmotionBucket {
    Positive,
    Neutral,
    Negative,
}

impl Emotion {
    /// 参与度融合中的情绪权重
    pub fn engagement_weight(&self) -> f64 {
        match self {
            Emotion::Happy => 1.0,
            Emotion::Surprise => 0.8,
            Emotion::Neutral => 0.5,
            Emotion::Fear => 0.3,
            Emotion::Angry => 0.2,
            Emotion::Disgust => 0.2,
            Emotion::Sad => 0.1,
        }
    }

    pub fn bucket(&self) -> EmotionBucket {
        match self {
            Emotion::Happy | Emotion::Surprise => EmotionBucket::Positive,
            Emotion::Neutral => EmotionBucket::Neutral,
            Emotion::Angry | Emotion::Sad | Emotion::Fear | Emotion::Disgust => {
                EmotionBucket::Negative
            }
        }
    }
}

/// 参与度融合输入
///
/// `head_movement` 为 None 表示本帧没有可用的移动信号（未检测到人脸），
/// 此时移动分量取下限值——信号缺失不等于静止。
#[derive(Debug, Clone, Copy)]
pub struct FusionInputs {
    pub emotion: Emotion,
    pub blinks_per_sec: f64,
    pub head_movement: Option<f64>,
    pub tilt_penalty: f64,
}

/// 加权融合参与度评分，结果截断到 [0,1]
pub fn engagement_score(inputs: &FusionInputs, config: &EngagementConfig) -> f64 {
    let emotion_score = inputs.emotion.engagement_weight();

    let blink_score = (inputs.blinks_per_sec / config.blink_rate_full_score).min(1.0);

    // 移动越大分越低，下限保护避免整体评分被单一信号拖垮
    let movement_score = match inputs.head_movement {
        Some(movement) => {
            (1.0 - (movement / config.movement_norm).min(1.0)).max(config.movement_score_floor)
        }
        None => config.movement_score_floor,
    };

    let w = &config.weights;
    let score = w.emotion * emotion_score
        + w.blink * blink_score
        + w.movement * movement_score
        + w.tilt * inputs.tilt_penalty;

    score.clamp(0.0, 1.0)
}

/// 积极度评分：positive → [0.8,1.0)，neutral → [0.4,0.8)，negative → [0.0,0.4)
pub fn positivity_score<R: Rng + ?Sized>(emotion: Emotion, rng: &mut R) -> f64 {
    match emotion.bucket() {
        EmotionBucket::Positive => rng.gen_range(0.8..1.0),
        EmotionBucket::Neutral => rng.gen_range(0.4..0.8),
        EmotionBucket::Negative => rng.gen_range(0.0..0.4),
    }
}
