use serde::{Deserialize, Serialize};

/// 参与度融合权重（情绪 40% / 眨眼 30% / 头部移动 20% / 头部姿态 10%）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FusionWeights {
    pub emotion: f64,
    pub blink: f64,
    pub movement: f64,
    pub tilt: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            emotion: 0.40,
            blink: 0.30,
            movement: 0.20,
            tilt: 0.10,
        }
    }
}

/// 参与度/积极度分析管线配置
///
/// 默认值与线上行为一致；`validate` 在启动和热加载时拒绝越界配置。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementConfig {
    /// EAR 低于此阈值视为一次眨眼帧
    pub ear_blink_threshold: f64,
    /// 眨眼计数窗口（秒），超出后计数器归零
    pub blink_window_secs: f64,
    /// 达到满分眨眼分量所需的每秒眨眼次数
    pub blink_rate_full_score: f64,
    /// 头部移动归一化基准（像素）
    pub movement_norm: f64,
    /// 移动分量下限（信号缺失时同样取此值）
    pub movement_score_floor: f64,
    /// 头部垂直比低于此阈值视为低头/分心
    pub tilt_vertical_ratio_min: f64,
    /// 低头时的姿态惩罚
    pub tilt_penalty: f64,
    /// 平滑历史容量（FIFO）
    pub history_capacity: usize,
    /// 历史采样最小间隔（秒），限制为 ≤1 Hz
    pub sample_interval_secs: f64,
    #[serde(default)]
    pub weights: FusionWeights,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            ear_blink_threshold: 0.25,
            blink_window_secs: 10.0,
            blink_rate_full_score: 5.0,
            movement_norm: 50.0,
            movement_score_floor: 0.1,
            tilt_vertical_ratio_min: 0.8,
            tilt_penalty: -0.5,
            history_capacity: 10,
            sample_interval_secs: 1.0,
            weights: FusionWeights::default(),
        }
    }
}

impl EngagementConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.ear_blink_threshold <= 0.0 {
            return Err("ear_blink_threshold must be > 0".to_string());
        }
        if self.blink_window_secs <= 0.0 {
            return Err("blink_window_secs must be > 0".to_string());
        }
        if self.blink_rate_full_score <= 0.0 {
            return Err("blink_rate_full_score must be > 0".to_string());
        }
        if self.movement_norm <= 0.0 {
            return Err("movement_norm must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.movement_score_floor) {
            return Err("movement_score_floor must be in [0,1]".to_string());
        }
        if self.tilt_vertical_ratio_min <= 0.0 {
            return Err("tilt_vertical_ratio_min must be > 0".to_string());
        }
        if !(-1.0..=0.0).contains(&self.tilt_penalty) {
            return Err("tilt_penalty must be in [-1,0]".to_string());
        }
        if self.history_capacity == 0 {
            return Err("history_capacity must be > 0".to_string());
        }
        if self.sample_interval_secs <= 0.0 {
            return Err("sample_interval_secs must be > 0".to_string());
        }

        let w = &self.weights;
        if w.emotion < 0.0 || w.blink < 0.0 || w.movement < 0.0 || w.tilt < 0.0 {
            return Err("fusion weights must be >= 0".to_string());
        }
        let sum = w.emotion + w.blink + w.movement + w.tilt;
        if (sum - 1.0).abs() > 0.01 {
            return Err(format!("fusion weights should sum to ~1.0 (got {sum:.3})"));
        }

        Ok(())
    }
}
