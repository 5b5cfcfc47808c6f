#![allow(dead_code)]

use interview_backend::engagement::geometry::{
    CHIN, LEFT_EAR, LEFT_EYE, NOSE_TIP, RIGHT_EAR, RIGHT_EYE,
};
use interview_backend::engagement::types::{LandmarkSet, Point, LANDMARK_COUNT};

/// 内存中编码一张小 PNG，作为合法帧字节
pub fn png_frame() -> Vec<u8> {
    png_frame_sized(64, 64)
}

pub fn png_frame_sized(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::DynamicImage::new_rgb8(width, height)
        .write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
    bytes
}

fn base_points() -> Vec<Point> {
    vec![Point::new(0.5, 0.5); LANDMARK_COUNT]
}

fn set_eye(points: &mut [Point], eye: &[usize; 6], corner_dx: f64, lid_dy: f64) {
    points[eye[0]] = Point::new(0.5 - corner_dx, 0.5);
    points[eye[3]] = Point::new(0.5 + corner_dx, 0.5);
    points[eye[1]] = Point::new(0.5 - corner_dx / 2.0, 0.5 - lid_dy);
    points[eye[5]] = Point::new(0.5 - corner_dx / 2.0, 0.5 + lid_dy);
    points[eye[2]] = Point::new(0.5 + corner_dx / 2.0, 0.5 - lid_dy);
    points[eye[4]] = Point::new(0.5 + corner_dx / 2.0, 0.5 + lid_dy);
}

fn set_upright_head(points: &mut [Point]) {
    points[NOSE_TIP] = Point::new(0.5, 0.4);
    points[CHIN] = Point::new(0.5, 0.6);
    points[LEFT_EAR] = Point::new(0.4, 0.5);
    points[RIGHT_EAR] = Point::new(0.6, 0.5);
}

/// 睁眼、抬头的标准人脸（EAR = 0.4，无姿态惩罚）
pub fn open_eye_face() -> LandmarkSet {
    let mut points = base_points();
    set_eye(&mut points, &LEFT_EYE, 0.05, 0.02);
    set_eye(&mut points, &RIGHT_EYE, 0.05, 0.02);
    set_upright_head(&mut points);
    LandmarkSet::new(points).unwrap()
}

/// 闭眼帧（EAR = 0.05，计入眨眼）
pub fn closed_eye_face() -> LandmarkSet {
    let mut points = base_points();
    set_eye(&mut points, &LEFT_EYE, 0.05, 0.0025);
    set_eye(&mut points, &RIGHT_EYE, 0.05, 0.0025);
    set_upright_head(&mut points);
    LandmarkSet::new(points).unwrap()
}

/// 整体平移后的睁眼人脸，用于触发移动信号
pub fn shifted_open_eye_face(dx: f64, dy: f64) -> LandmarkSet {
    let shifted: Vec<Point> = open_eye_face()
        .points()
        .iter()
        .map(|p| Point::new(p.x + dx, p.y + dy))
        .collect();
    LandmarkSet::new(shifted).unwrap()
}
