use crate::engagement::AnalysisMetrics;
use crate::sessions::SessionRegistry;

/// 周期性输出帧分析聚合计数，便于在日志侧观察检测服务健康度
pub async fn run(metrics: &AnalysisMetrics, sessions: &SessionRegistry) {
    let snap = metrics.snapshot();
    let active_sessions = sessions.len().await;
    tracing::info!(
        frames_analyzed = snap.frames_analyzed,
        decode_failures = snap.decode_failures,
        detector_failures = snap.detector_failures,
        no_face_frames = snap.no_face_frames,
        active_sessions = active_sessions,
        "analysis metrics"
    );
}
