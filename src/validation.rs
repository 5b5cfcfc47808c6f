/// 请求表单验证
/// 问题生成与反馈接口共用的输入检查，全部为纯函数。
use crate::constants::{
    MAX_FIELD_CHARS, MAX_JOB_DESCRIPTION_CHARS, MAX_QUESTION_CHARS, MAX_RESPONSE_CHARS,
    MAX_RESUME_CHARS,
};

/// 必填短字段：非空白且不超过 200 字符
pub fn validate_required_field(name: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{name} is required"));
    }
    if value.chars().count() > MAX_FIELD_CHARS {
        return Err(format!("{name} must be at most {MAX_FIELD_CHARS} characters"));
    }
    Ok(())
}

pub fn validate_job_description(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("jobDescription is required".to_string());
    }
    if value.chars().count() > MAX_JOB_DESCRIPTION_CHARS {
        return Err(format!(
            "jobDescription must be at most {MAX_JOB_DESCRIPTION_CHARS} characters"
        ));
    }
    Ok(())
}

pub fn validate_resume_text(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("resumeText is required".to_string());
    }
    if value.chars().count() > MAX_RESUME_CHARS {
        return Err(format!(
            "resumeText must be at most {MAX_RESUME_CHARS} characters"
        ));
    }
    Ok(())
}

pub fn validate_feedback_input(question: &str, response: &str) -> Result<(), String> {
    if question.trim().is_empty() {
        return Err("question is required".to_string());
    }
    if response.trim().is_empty() {
        return Err("response is required".to_string());
    }
    if question.chars().count() > MAX_QUESTION_CHARS {
        return Err(format!(
            "question must be at most {MAX_QUESTION_CHARS} characters"
        ));
    }
    if response.chars().count() > MAX_RESPONSE_CHARS {
        return Err(format!(
            "response must be at most {MAX_RESPONSE_CHARS} characters"
        ));
    }
    Ok(())
}
