use crate::sessions::SessionRegistry;

pub async fn run(sessions: &SessionRegistry) {
    tracing::debug!("session_cleanup: start");
    let cleaned = sessions.cleanup_idle().await;
    tracing::info!(cleaned, "session_cleanup: done");
}
