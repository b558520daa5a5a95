use crate::services::allocation::RoundingPolicy;
use crate::services::generation_service::SamplingConfig;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 分配表（TOML）路径
    pub sheet_path: String,
    /// 源文档路径（覆盖分配表中的 `document`）
    pub document_path: Option<String>,
    /// 取整策略
    pub rounding_policy: RoundingPolicy,
    /// 是否校验"每题恰有一个正确答案"
    pub validate_answer_key: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 生成服务配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    pub llm_temperature: f64,
    pub llm_top_p: f64,
    pub llm_top_k: u32,
    pub llm_max_output_tokens: u32,
}

impl Default for Config {
    fn default() -> Self {
        let sampling = SamplingConfig::default();
        Self {
            sheet_path: "tos.toml".to_string(),
            document_path: None,
            rounding_policy: RoundingPolicy::Independent,
            validate_answer_key: false,
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            llm_model_name: "gemini-2.0-flash-lite".to_string(),
            request_timeout_secs: 120,
            llm_temperature: sampling.temperature,
            llm_top_p: sampling.top_p,
            llm_top_k: sampling.top_k,
            llm_max_output_tokens: sampling.max_output_tokens,
        }
    }
}

impl Config {
    /// 从环境变量读取，无法解析的值回退到默认值
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取（便于测试）
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        Self {
            sheet_path: lookup("TOS_SHEET").unwrap_or(default.sheet_path),
            document_path: lookup("TOS_DOCUMENT").filter(|v| !v.trim().is_empty()),
            rounding_policy: lookup("ROUNDING_POLICY").and_then(|v| RoundingPolicy::parse(&v)).unwrap_or(default.rounding_policy),
            validate_answer_key: lookup("VALIDATE_ANSWER_KEY").and_then(|v| v.parse().ok()).unwrap_or(default.validate_answer_key),
            verbose_logging: lookup("VERBOSE_LOGGING").and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            llm_api_key: lookup("GEMINI_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: lookup("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: lookup("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()).filter(|s| *s > 0).unwrap_or(default.request_timeout_secs),
            llm_temperature: lookup("LLM_TEMPERATURE").and_then(|v| v.parse().ok()).unwrap_or(default.llm_temperature),
            llm_top_p: lookup("LLM_TOP_P").and_then(|v| v.parse().ok()).unwrap_or(default.llm_top_p),
            llm_top_k: lookup("LLM_TOP_K").and_then(|v| v.parse().ok()).unwrap_or(default.llm_top_k),
            llm_max_output_tokens: lookup("LLM_MAX_OUTPUT_TOKENS").and_then(|v| v.parse().ok()).unwrap_or(default.llm_max_output_tokens),
        }
    }

    /// 采样参数
    pub fn sampling(&self) -> SamplingConfig {
        SamplingConfig {
            temperature: self.llm_temperature,
            top_p: self.llm_top_p,
            top_k: self.llm_top_k,
            max_output_tokens: self.llm_max_output_tokens,
        }
    }
}
