//! 面试会话注册表
//!
//! 每个会话对应一路候选人视频流，持有自己的帧分析器与问题进度，
//! 全部状态驻留内存，进程重启即消失。注册表把每个会话包在独立的
//! `Mutex` 里：帧提交按会话串行（单写者约定），不同会话完全并行。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::engagement::FrameAnalyzer;
use crate::services::llm_provider::Question;

pub struct InterviewSession {
    pub id: String,
    pub analyzer: FrameAnalyzer,
    pub questions: Vec<Question>,
    pub current_question: usize,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: Instant,
}

impl InterviewSession {
    pub fn touch(&mut self) {
        self.last_activity_at = Instant::now();
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_question)
    }

    /// 前进到下一题；已到末尾时停在最后一题之后（面试结束态）
    pub fn advance(&mut self) -> usize {
        if self.current_question < self.questions.len() {
            self.current_question += 1;
        }
        self.current_question
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("session capacity reached ({0})")]
    CapacityReached(usize),
}

pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<Mutex<InterviewSession>>>>,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl SessionRegistry {
    pub fn new(idle_ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl,
            max_sessions,
        }
    }

    pub async fn create(
        &self,
        analyzer: FrameAnalyzer,
        questions: Vec<Question>,
    ) -> Result<String, RegistryError> {
        let mut sessions = self.sessions.lock().await;
        if sessions.len() >= self.max_sessions {
            return Err(RegistryError::CapacityReached(self.max_sessions));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let session = InterviewSession {
            id: id.clone(),
            analyzer,
            questions,
            current_question: 0,
            created_at: Utc::now(),
            last_activity_at: Instant::now(),
        };
        sessions.insert(id.clone(), Arc::new(Mutex::new(session)));

        tracing::info!(session_id = %id, "Interview session created");
        Ok(id)
    }

    pub async fn get(&self, id: &str) -> Option<Arc<Mutex<InterviewSession>>> {
        self.sessions.lock().await.get(id).cloned()
    }

    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.lock().await.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Interview session removed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// 回收空闲超过 TTL 的会话，返回回收数量
    ///
    /// 正在被处理的会话（锁被持有）视为活跃，跳过本轮。
    pub async fn cleanup_idle(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        let mut expired: Vec<String> = Vec::new();

        for (id, slot) in sessions.iter() {
            if let Ok(session) = slot.try_lock() {
                if now.duration_since(session.last_activity_at) > self.idle_ttl {
                    expired.push(id.clone());
                }
            }
        }

        for id in &expired {
            sessions.remove(id);
            tracing::info!(session_id = %id, "Idle interview session evicted");
        }

        expired.len()
    }
}
