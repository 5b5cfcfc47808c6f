//! 帧分析可观测性计数器
//!
//! 帧级失败不会越过 `analyze_frame` 边界，唯一的外显通道是这里的计数器
//! 和 tracing 日志。计数器通过 /health/metrics 暴露。

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct AnalysisMetrics {
    frames_analyzed: AtomicU64,
    decode_failures: AtomicU64,
    detector_failures: AtomicU64,
    no_face_frames: AtomicU64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub frames_analyzed: u64,
    pub decode_failures: u64,
    pub detector_failures: u64,
    pub no_face_frames: u64,
}

impl AnalysisMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_frame(&self) {
        self.frames_analyzed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_detector_failure(&self) {
        self.detector_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_no_face(&self) {
        self.no_face_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_analyzed: self.frames_analyzed.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            detector_failures: self.detector_failures.load(Ordering::Relaxed),
            no_face_frames: self.no_face_frames.load(Ordering::Relaxed),
        }
    }
}
