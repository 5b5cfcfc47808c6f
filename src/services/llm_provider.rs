//! 生成式语言服务封装
//!
//! 面试问题生成与回答反馈都经由此模块调用外部生成式 API；其余模块不得
//! 直接发起 LLM 请求。mock 模式返回确定性内容，供开发环境与测试使用。

use serde::{Deserialize, Serialize};

use crate::config::LLMConfig;
use crate::constants::{MAX_QUESTION_CHARS, MAX_RESPONSE_CHARS, QUESTIONS_PER_INTERVIEW};

const MAX_RETRIES: u32 = 3;
/// 简历摘录最多取多少段
const MAX_RESUME_EXCERPTS: usize = 5;

#[derive(Debug, Clone)]
pub struct LlmProvider {
    config: LLMConfig,
    client: reqwest::Client,
}

/// 问题生成请求（简历文本由上游文档抽取服务提供）
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRequest {
    pub resume_text: String,
    pub job_role: String,
    pub company: String,
    pub job_description: String,
    pub question_type: String,
    pub experience_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u32,
    pub question: String,
}

#[derive(Debug, Deserialize)]
struct QuestionList {
    questions: Vec<Question>,
}

/// 回答反馈，字段与前端展示一一对应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub concise_feedback: String,
    pub technical_score: u8,
    pub communication_score: u8,
    pub overall_score: u8,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub suggested_answer: String,
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("llm is disabled")]
    Disabled,
    #[error("llm request timed out")]
    Timeout,
    #[error("llm network error: {0}")]
    Network(String),
    #[error("llm api error: status={status}, message={message}")]
    ApiError { status: u16, message: String },
    #[error("llm returned invalid content: {0}")]
    InvalidResponse(String),
}

// Gemini generateContent 风格的请求/响应体
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}

impl LlmProvider {
    pub fn new(config: &LLMConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            config: config.clone(),
            client,
        }
    }

    /// 启动时校验 LLM 配置。
    /// 真实模式必须提供 API 地址和密钥，否则视为部署错误立即终止。
    pub fn validate_config(config: &LLMConfig) {
        if config.enabled && !config.mock && (config.api_url.is_empty() || config.api_key.is_empty())
        {
            panic!(
                "Invalid LLM configuration: enabled=true and mock=false \
                 require LLM_API_URL and LLM_API_KEY. \
                 Set them or switch to LLM_MOCK=true."
            );
        }
    }

    /// 由简历摘录与岗位信息生成固定数量的面试问题
    pub async fn generate_questions(&self, req: &QuestionRequest) -> Result<Vec<Question>, LlmError> {
        if !self.config.enabled {
            return Err(LlmError::Disabled);
        }
        if self.config.mock {
            return Ok(mock_questions(req));
        }

        let query = format!("{} {}", req.job_role, req.question_type);
        let excerpts = select_relevant_excerpts(&req.resume_text, &query, MAX_RESUME_EXCERPTS);
        let prompt = question_prompt(req, &excerpts);

        let text = self.generate_text(&prompt).await?;
        let list: QuestionList = serde_json::from_str(strip_json_fences(&text))
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        if list.questions.len() != QUESTIONS_PER_INTERVIEW {
            return Err(LlmError::InvalidResponse(format!(
                "expected {} questions, got {}",
                QUESTIONS_PER_INTERVIEW,
                list.questions.len()
            )));
        }

        Ok(list.questions)
    }

    /// 针对一问一答生成结构化反馈
    pub async fn analyze_response(
        &self,
        question: &str,
        answer: &str,
    ) -> Result<Feedback, LlmError> {
        if !self.config.enabled {
            return Err(LlmError::Disabled);
        }
        if self.config.mock {
            return Ok(mock_feedback());
        }

        // 限长保护，避免把超长输入透传给外部服务
        let question = truncate_chars(question, MAX_QUESTION_CHARS);
        let answer = truncate_chars(answer, MAX_RESPONSE_CHARS);
        let prompt = feedback_prompt(&question, &answer);

        let text = self.generate_text(&prompt).await?;
        let feedback: Feedback = serde_json::from_str(strip_json_fences(&text))
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        validate_feedback(&feedback)?;
        Ok(feedback)
    }

    /// 对 429/5xx 指数退避重试的底层文本生成调用
    async fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                tracing::warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "LLM call failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.config.api_url)
                .header("x-goog-api-key", &self.config.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) if e.is_timeout() => {
                    last_error = Some(LlmError::Timeout);
                    continue;
                }
                Err(e) => {
                    last_error = Some(LlmError::Network(e.to_string()));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                last_error = Some(LlmError::ApiError {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::ApiError {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let parsed: GenerateResponse = response
                .json()
                .await
                .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

            let text = parsed
                .candidates
                .first()
                .and_then(|c| c.content.parts.first())
                .map(|p| p.text.clone())
                .ok_or_else(|| LlmError::InvalidResponse("empty candidates".to_string()))?;

            return Ok(text);
        }

        Err(last_error.unwrap_or(LlmError::Network("retries exhausted".to_string())))
    }
}

fn question_prompt(req: &QuestionRequest, excerpts: &[String]) -> String {
    format!(
        "You are an AI specialized in generating structured interview questions. \
Generate exactly {count} {qtype} interview questions for a {level} {role} position at {company}.\n\n\
Job description:\n{jd}\n\n\
Candidate resume highlights:\n{resume}\n\n\
Return only valid JSON of the form \
{{\"questions\": [{{\"id\": 1, \"question\": \"...\"}}, ...]}} with exactly {count} entries. \
No additional text or markdown.",
        count = QUESTIONS_PER_INTERVIEW,
        qtype = req.question_type,
        level = req.experience_level,
        role = req.job_role,
        company = req.company,
        jd = req.job_description,
        resume = excerpts.join("\n"),
    )
}

fn feedback_prompt(question: &str, answer: &str) -> String {
    format!(
        "Analyze this interview question and response.\n\n\
QUESTION: {question}\nRESPONSE: {answer}\n\n\
Provide feedback as valid JSON with exactly these fields: \
conciseFeedback (string), technicalScore (1-5), communicationScore (1-5), \
overallScore (1-100), strengths (string array), improvements (string array), \
suggestedAnswer (string). Only return valid JSON, no additional text or markdown."
    )
}

fn validate_feedback(feedback: &Feedback) -> Result<(), LlmError> {
    if !(1..=5).contains(&feedback.technical_score)
        || !(1..=5).contains(&feedback.communication_score)
        || !(1..=100).contains(&feedback.overall_score)
    {
        return Err(LlmError::InvalidResponse(
            "feedback scores out of range".to_string(),
        ));
    }
    Ok(())
}

/// 简历段落相关性排序：按与查询词的词项重合度打分，取前 N 段。
/// 真正的向量检索由外部存储负责，这里只做无依赖的退化实现。
pub fn select_relevant_excerpts(resume_text: &str, query: &str, max: usize) -> Vec<String> {
    let query_terms: Vec<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(|t| t.to_string())
        .collect();

    let mut scored: Vec<(usize, String)> = resume_text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            let lower = p.to_lowercase();
            let score = query_terms.iter().filter(|t| lower.contains(*t)).count();
            (score, p.to_string())
        })
        .collect();

    // 分数降序，同分保持原文顺序
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().take(max).map(|(_, p)| p).collect()
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// 剥掉模型偶尔包裹的 ```json ... ``` 围栏
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(str::trim)
            .unwrap_or_else(|| stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(str::trim)
            .unwrap_or_else(|| stripped.trim_start())
    } else {
        text
    }
}

fn mock_questions(req: &QuestionRequest) -> Vec<Question> {
    (1..=QUESTIONS_PER_INTERVIEW as u32)
        .map(|id| Question {
            id,
            question: format!(
                "Mock {} question {} for a {} {} at {}",
                req.question_type.to_lowercase(),
                id,
                req.experience_level,
                req.job_role,
                req.company
            ),
        })
        .collect()
}

fn mock_feedback() -> Feedback {
    Feedback {
        concise_feedback: "Mock feedback: clear structure, add more concrete examples".to_string(),
        technical_score: 4,
        communication_score: 4,
        overall_score: 78,
        strengths: vec![
            "Clear structure".to_string(),
            "Relevant terminology".to_string(),
        ],
        improvements: vec!["Quantify the impact of your work".to_string()],
        suggested_answer: "Mock suggested answer".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_config() -> LLMConfig {
        LLMConfig {
            enabled: true,
            mock: true,
            api_url: String::new(),
            api_key: String::new(),
            timeout_secs: 1,
        }
    }

    fn sample_request() -> QuestionRequest {
        QuestionRequest {
            resume_text: "Built a Rust backend.\n\nLed a team of four engineers.".to_string(),
            job_role: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
            job_description: "Own the realtime scoring service".to_string(),
            question_type: "Technical".to_string(),
            experience_level: "Mid-level".to_string(),
        }
    }

    #[tokio::test]
    async fn disabled_mode_returns_error() {
        let mut cfg = mock_config();
        cfg.enabled = false;
        let provider = LlmProvider::new(&cfg);
        let result = provider.generate_questions(&sample_request()).await;
        assert!(matches!(result, Err(LlmError::Disabled)));
    }

    #[tokio::test]
    async fn mock_mode_returns_ten_questions() {
        let provider = LlmProvider::new(&mock_config());
        let questions = provider.generate_questions(&sample_request()).await.unwrap();
        assert_eq!(questions.len(), QUESTIONS_PER_INTERVIEW);
        assert_eq!(questions[0].id, 1);
        assert!(questions[0].question.contains("Backend Engineer"));
    }

    #[tokio::test]
    async fn mock_feedback_passes_validation() {
        let provider = LlmProvider::new(&mock_config());
        let feedback = provider
            .analyze_response("Tell me about Rust", "I like Rust")
            .await
            .unwrap();
        assert!(validate_feedback(&feedback).is_ok());
    }

    #[test]
    fn feedback_score_ranges_are_enforced() {
        let mut fb = mock_feedback();
        fb.technical_score = 0;
        assert!(validate_feedback(&fb).is_err());
        let mut fb = mock_feedback();
        fb.overall_score = 0;
        assert!(validate_feedback(&fb).is_err());
    }

    #[test]
    fn excerpt_selection_prefers_matching_paragraphs() {
        let resume = "Shipped a payments service.\n\n\
                      Maintained Kubernetes clusters.\n\n\
                      Built a backend engineer onboarding guide.";
        let picked = select_relevant_excerpts(resume, "backend engineer", 1);
        assert_eq!(picked.len(), 1);
        assert!(picked[0].contains("onboarding guide"));
    }

    #[test]
    fn excerpt_selection_caps_count() {
        let resume = "a\n\nb\n\nc\n\nd\n\ne\n\nf";
        assert_eq!(select_relevant_excerpts(resume, "x", 5).len(), 5);
    }

    #[test]
    fn fences_are_stripped() {
        assert_eq!(
            strip_json_fences("```json\n{\"a\":1}\n```"),
            "{\"a\":1}"
        );
        assert_eq!(strip_json_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_json_fences("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }

    #[test]
    fn validate_config_accepts_mock_mode() {
        LlmProvider::validate_config(&mock_config());
    }
}
