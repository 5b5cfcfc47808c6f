use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

#[derive(Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub cors_origin: String,
    pub trust_proxy: bool,
    pub rate_limit: RateLimitConfig,
    pub worker: WorkerConfig,
    pub session: SessionConfig,
    pub detector: DetectorConfig,
    pub llm: LLMConfig,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub window_secs: u64,
    pub max_requests: u64,
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub is_leader: bool,
    pub enable_metrics_log: bool,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// 空闲会话回收阈值（秒）
    pub idle_ttl_secs: u64,
    pub max_sessions: usize,
    pub max_sse_connections: usize,
    /// SSE 指标推送周期（秒）
    pub sse_tick_secs: u64,
}

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub mock: bool,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Clone)]
pub struct LLMConfig {
    pub enabled: bool,
    pub mock: bool,
    pub api_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("enable_file_logs", &self.enable_file_logs)
            .field("log_dir", &self.log_dir)
            .field("cors_origin", &self.cors_origin)
            .field("trust_proxy", &self.trust_proxy)
            .field("rate_limit", &self.rate_limit)
            .field("worker", &self.worker)
            .field("session", &self.session)
            .field("detector", &self.detector)
            .field("llm", &self.llm)
            .finish()
    }
}

impl fmt::Debug for LLMConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LLMConfig")
            .field("enabled", &self.enabled)
            .field("mock", &self.mock)
            .field("api_url", &self.api_url)
            .field("api_key", &"***REDACTED***")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 5000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:3000"),
            trust_proxy: env_or_bool("TRUST_PROXY", false),
            rate_limit: RateLimitConfig {
                window_secs: env_or_parse("RATE_LIMIT_WINDOW_SECS", 60_u64),
                max_requests: env_or_parse("RATE_LIMIT_MAX", 600_u64),
            },
            worker: WorkerConfig {
                is_leader: env_or_bool("WORKER_LEADER", true),
                enable_metrics_log: env_or_bool("ENABLE_METRICS_LOG_WORKER", true),
            },
            session: SessionConfig {
                idle_ttl_secs: env_or_parse("SESSION_IDLE_TTL_SECS", 1800_u64),
                max_sessions: env_or_parse("MAX_SESSIONS", 256_usize),
                max_sse_connections: env_or_parse("MAX_SSE_CONNECTIONS", 256_usize),
                sse_tick_secs: env_or_parse("SSE_TICK_SECS", 2_u64),
            },
            detector: DetectorConfig {
                mock: env_or_bool("DETECTOR_MOCK", true),
                base_url: env_or("DETECTOR_BASE_URL", "http://127.0.0.1:8500"),
                timeout_secs: env_or_parse("DETECTOR_TIMEOUT_SECS", 5_u64),
            },
            llm: LLMConfig {
                enabled: env_or_bool("LLM_ENABLED", true),
                mock: env_or_bool("LLM_MOCK", true),
                api_url: env_or("LLM_API_URL", ""),
                api_key: env_or("LLM_API_KEY", ""),
                timeout_secs: env_or_parse("LLM_TIMEOUT_SECS", 30_u64),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
