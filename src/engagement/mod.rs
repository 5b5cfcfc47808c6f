//! 实时参与度/积极度评分管线
//!
//! 把一帧原始视频字节变成两条有界、平滑、可解释的实时信号：
//! - `analyzer`: 每帧编排入口，持有全部会话内可变状态
//! - `geometry`: EAR / 头部姿态 / 面部中心的纯函数几何分析
//! - `fusion`: 多信号加权融合与情绪桶积极度映射
//! - `smoother`: 滚动历史与平滑读数
//! - `detector`: 外部关键点/情绪检测能力边界（HTTP 实现与测试替身）
//! - `session`: 眨眼窗口、移动基准等会话状态
//! - `metrics`: 帧级失败的可观测性计数器

pub mod analyzer;
pub mod config;
pub mod detector;
pub mod fusion;
pub mod geometry;
pub mod metrics;
pub mod session;
pub mod smoother;
pub mod types;

pub use analyzer::FrameAnalyzer;
pub use config::EngagementConfig;
pub use metrics::AnalysisMetrics;
pub use types::{AnalysisResult, Emotion};
