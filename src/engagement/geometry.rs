//! 面部几何分析
//!
//! 从单帧关键点推导三类几何信号：
//! - EAR（眼部纵横比）：眨眼检测，6 点公式 EAR = (|p2-p6| + |p3-p5|) / (2 * |p1-p4|)
//! - 头部垂直比：低头/分心姿态
//! - 面部中心：相邻有脸帧之间的头部移动
//!
//! 全部为关键点集合的纯函数，不持有状态。

use crate::engagement::config::EngagementConfig;
use crate::engagement::types::{LandmarkSet, Point, LANDMARK_COUNT};

/// 左眼 6 点索引（MediaPipe Face Mesh）
pub const LEFT_EYE: [usize; 6] = [33, 160, 158, 133, 153, 144];
/// 右眼 6 点索引
pub const RIGHT_EYE: [usize; 6] = [362, 385, 387, 263, 373, 380];

pub const NOSE_TIP: usize = 1;
pub const CHIN: usize = 199;
pub const LEFT_EAR: usize = 234;
pub const RIGHT_EAR: usize = 454;

const EPSILON: f64 = 1e-6;

/// 单眼 6 点 EAR
///
/// 索引含义：eye[0]/eye[3] 为眼角（水平），eye[1]/eye[5] 与 eye[2]/eye[4]
/// 为上下眼睑配对点。水平距离退化时返回 0.0。
pub fn eye_aspect_ratio(landmarks: &LandmarkSet, eye: &[usize; 6]) -> f64 {
    let p = |i: usize| landmarks.point(eye[i]);

    let horizontal = p(0).distance(&p(3));
    if horizontal < EPSILON {
        return 0.0;
    }

    let vertical1 = p(1).distance(&p(5));
    let vertical2 = p(2).distance(&p(4));

    (vertical1 + vertical2) / (2.0 * horizontal)
}

/// 整帧 EAR：左右眼独立计算后取算术平均
pub fn mean_eye_aspect_ratio(landmarks: &LandmarkSet) -> f64 {
    let left = eye_aspect_ratio(landmarks, &LEFT_EYE);
    let right = eye_aspect_ratio(landmarks, &RIGHT_EYE);
    (left + right) / 2.0
}

/// 头部姿态惩罚
///
/// vertical_ratio = |nose.y - chin.y| / (|left_ear.x - right_ear.x| + ε)。
/// 比值低于阈值说明头部明显低垂（可能在看手机），返回惩罚值；否则 0。
pub fn head_tilt_penalty(landmarks: &LandmarkSet, config: &EngagementConfig) -> f64 {
    let nose = landmarks.point(NOSE_TIP);
    let chin = landmarks.point(CHIN);
    let left_ear = landmarks.point(LEFT_EAR);
    let right_ear = landmarks.point(RIGHT_EAR);

    let vertical_ratio = (nose.y - chin.y).abs() / ((left_ear.x - right_ear.x).abs() + EPSILON);

    if vertical_ratio < config.tilt_vertical_ratio_min {
        config.tilt_penalty
    } else {
        0.0
    }
}

/// 面部中心：全部 468 个关键点的均值
pub fn face_center(landmarks: &LandmarkSet) -> Point {
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    for p in landmarks.points() {
        sum_x += p.x;
        sum_y += p.y;
    }
    let n = LANDMARK_COUNT as f64;
    Point::new(sum_x / n, sum_y / n)
}
