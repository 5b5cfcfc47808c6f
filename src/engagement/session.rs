//! 会话内可变状态
//!
//! 每个面试会话独立持有一份：眨眼计数与窗口计时、上一帧面部中心、
//! 评分平滑历史以及积极度抽样用的 RNG。单写者约定由调用层保证，
//! 状态本身不做并发控制。

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::engagement::config::EngagementConfig;
use crate::engagement::smoother::ScoreSmoother;
use crate::engagement::types::Point;

/// 眨眼窗口状态机只有两个状态：累计中 → 到期归零，循环往复。
#[derive(Debug)]
pub struct SessionState {
    blink_counter: u32,
    window_start: Instant,
    prev_face_center: Option<Point>,
    pub smoother: ScoreSmoother,
    pub rng: StdRng,
    window_secs: f64,
}

impl SessionState {
    pub fn new(config: &EngagementConfig, now: Instant) -> Self {
        Self::with_rng(config, now, StdRng::from_entropy())
    }

    /// 注入 RNG，测试中用固定种子获得确定性的积极度序列
    pub fn with_rng(config: &EngagementConfig, now: Instant, rng: StdRng) -> Self {
        Self {
            blink_counter: 0,
            window_start: now,
            prev_face_center: None,
            smoother: ScoreSmoother::new(
                config.history_capacity,
                std::time::Duration::from_secs_f64(config.sample_interval_secs),
            ),
            rng,
            window_secs: config.blink_window_secs,
        }
    }

    /// 记一次 EAR 低帧
    pub fn note_blink(&mut self) {
        self.blink_counter += 1;
    }

    /// 当前窗口内的每秒眨眼次数
    ///
    /// 先按已流逝时间计算速率，再在窗口超期时把计数器归零并重开窗口。
    /// 流逝时间为 0 时速率为 0。
    pub fn blinks_per_second(&mut self, now: Instant) -> f64 {
        let elapsed = now.duration_since(self.window_start).as_secs_f64();

        let rate = if elapsed > 0.0 {
            f64::from(self.blink_counter) / elapsed
        } else {
            0.0
        };

        if elapsed > self.window_secs {
            self.blink_counter = 0;
            self.window_start = now;
        }

        rate
    }

    /// 相对上一帧面部中心的移动量；首帧（无基准）为 0
    ///
    /// 已知怪癖（按规格保留）：基准一旦建立便不会因丢脸帧而清除，
    /// 下一次检测到人脸时会跨越缺口比较，移动读数可能偏大。
    pub fn movement_from(&mut self, center: Point) -> f64 {
        let movement = match self.prev_face_center {
            Some(prev) => center.distance(&prev),
            None => 0.0,
        };
        self.prev_face_center = Some(center);
        movement
    }

    #[cfg(test)]
    pub(crate) fn blink_counter(&self) -> u32 {
        self.blink_counter
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn state_at(t0: Instant) -> SessionState {
        SessionState::with_rng(
            &EngagementConfig::default(),
            t0,
            StdRng::seed_from_u64(1),
        )
    }

    #[test]
    fn rate_is_zero_with_zero_elapsed() {
        let t0 = Instant::now();
        let mut s = state_at(t0);
        s.note_blink();
        assert_eq!(s.blinks_per_second(t0), 0.0);
    }

    #[test]
    fn rate_is_count_over_elapsed() {
        let t0 = Instant::now();
        let mut s = state_at(t0);
        for _ in 0..10 {
            s.note_blink();
        }
        let rate = s.blinks_per_second(t0 + Duration::from_secs(2));
        assert!((rate - 5.0).abs() < 1e-12);
    }

    #[test]
    fn window_resets_after_ten_seconds() {
        let t0 = Instant::now();
        let mut s = state_at(t0);
        for _ in 0..5 {
            s.note_blink();
        }

        // 超过 10 秒：本次仍按旧窗口计算速率，随后计数归零
        let rate = s.blinks_per_second(t0 + Duration::from_secs(11));
        assert!(rate > 0.0);
        assert_eq!(s.blink_counter(), 0);

        // 下一次读数基于新窗口
        let rate = s.blinks_per_second(t0 + Duration::from_secs(12));
        assert_eq!(rate, 0.0);
    }

    #[test]
    fn window_does_not_reset_early() {
        let t0 = Instant::now();
        let mut s = state_at(t0);
        s.note_blink();
        s.blinks_per_second(t0 + Duration::from_secs(9));
        assert_eq!(s.blink_counter(), 1);
    }

    #[test]
    fn first_sighting_has_zero_movement() {
        let mut s = state_at(Instant::now());
        assert_eq!(s.movement_from(Point::new(100.0, 100.0)), 0.0);
    }

    #[test]
    fn movement_is_distance_between_consecutive_centers() {
        let mut s = state_at(Instant::now());
        s.movement_from(Point::new(0.0, 0.0));
        let moved = s.movement_from(Point::new(3.0, 4.0));
        assert!((moved - 5.0).abs() < 1e-12);
    }

    #[test]
    fn baseline_survives_and_updates() {
        let mut s = state_at(Instant::now());
        s.movement_from(Point::new(0.0, 0.0));
        s.movement_from(Point::new(3.0, 4.0));
        // 基准应已更新到最近一次中心
        let moved = s.movement_from(Point::new(3.0, 4.0));
        assert_eq!(moved, 0.0);
    }
}
