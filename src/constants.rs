/// 每场面试生成的问题数量
pub const QUESTIONS_PER_INTERVIEW: usize = 10;

/// 反馈分析时问题文本的最大字符数
pub const MAX_QUESTION_CHARS: usize = 1_000;

/// 反馈分析时回答文本的最大字符数
pub const MAX_RESPONSE_CHARS: usize = 5_000;

/// 简历文本上限（字符）
pub const MAX_RESUME_CHARS: usize = 100_000;

/// 岗位表单字段上限（字符）
pub const MAX_FIELD_CHARS: usize = 200;

/// 岗位描述上限（字符）
pub const MAX_JOB_DESCRIPTION_CHARS: usize = 20_000;

/// 单帧图像字节上限：2 MiB
pub const MAX_FRAME_BYTES: usize = 2 * 1024 * 1024;

/// 请求体上限：帧字节上限加余量
pub const MAX_BODY_SIZE: usize = 4 * 1024 * 1024;
