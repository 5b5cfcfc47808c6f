//! 时间平滑
//!
//! 维护参与度/积极度各自最近 N 次采样的滚动历史（FIFO，容量默认 10），
//! 采样节流到 ≤1 Hz，对外只暴露均值读数。历史为空时返回中性默认 (0.5, 0.5)。

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// 双历史评分平滑器
///
/// 不变式：两个历史长度始终相等（同时追加、同时淘汰）。
#[derive(Debug)]
pub struct ScoreSmoother {
    engagement: VecDeque<f64>,
    positivity: VecDeque<f64>,
    capacity: usize,
    min_interval: Duration,
    last_sample_at: Option<Instant>,
}

impl ScoreSmoother {
    pub fn new(capacity: usize, min_interval: Duration) -> Self {
        Self {
            engagement: VecDeque::with_capacity(capacity),
            positivity: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            min_interval,
            last_sample_at: None,
        }
    }

    /// 记录一对评分
    ///
    /// 距离上一次成功记录不足最小间隔时为幂等空操作（返回 false）。
    /// 第一次记录总是被接受。
    pub fn record(&mut self, engagement: f64, positivity: f64, now: Instant) -> bool {
        if let Some(last) = self.last_sample_at {
            if now.duration_since(last) < self.min_interval {
                return false;
            }
        }

        self.engagement.push_back(engagement);
        self.positivity.push_back(positivity);
        while self.engagement.len() > self.capacity {
            self.engagement.pop_front();
            self.positivity.pop_front();
        }
        self.last_sample_at = Some(now);

        debug_assert_eq!(self.engagement.len(), self.positivity.len());
        true
    }

    /// 平滑读数：各历史的算术平均；空历史返回 (0.5, 0.5)
    pub fn smoothed(&self) -> (f64, f64) {
        if self.engagement.is_empty() {
            return (0.5, 0.5);
        }
        let n = self.engagement.len() as f64;
        let e: f64 = self.engagement.iter().sum();
        let p: f64 = self.positivity.iter().sum();
        (e / n, p / n)
    }

    pub fn len(&self) -> usize {
        self.engagement.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engagement.is_empty()
    }
}
