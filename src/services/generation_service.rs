//! 生成服务 - 业务能力层
//!
//! 只负责"把请求交给语言模型并拿回文本"这一能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `reqwest` 直接调用 Gemini `generateContent` REST 接口
//! - 文档以 `inlineData`（base64）随请求发送
//! - 通过 `responseSchema` 要求模型输出结构化 JSON

use anyhow::Context;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::GenerationError;
use crate::models::EncodedDocument;

/// 采样参数
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
        }
    }
}

/// 一次生成请求的全部内容
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_instruction: String,
    /// 分配说明（自然语言）
    pub prompt: String,
    pub document: EncodedDocument,
    pub response_schema: Value,
    pub sampling: SamplingConfig,
}

/// 外部生成服务
///
/// 返回模型输出的原始文本，解析由调用方负责
pub trait GenerationService: Send + Sync {
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, Result<String, GenerationError>>;
}

/// Gemini 生成服务
pub struct GeminiService {
    client: reqwest::Client,
    api_key: String,
    api_base_url: String,
    model_name: String,
    timeout_secs: u64,
}

impl GeminiService {
    /// 创建新的 Gemini 服务
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("无法创建 HTTP 客户端")?;

        Ok(Self {
            client,
            api_key: config.llm_api_key.clone(),
            api_base_url: config.llm_api_base_url.clone(),
            model_name: config.llm_model_name.clone(),
            timeout_secs: config.request_timeout_secs,
        })
    }

    /// `{base}/models/{model}:generateContent`
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base_url.trim_end_matches('/'),
            self.model_name
        )
    }

    async fn send(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let endpoint = self.endpoint();
        debug!("调用生成服务，模型: {}", self.model_name);
        debug!(
            "提示词长度: {} 字符, 文档: {} 字节 ({})",
            request.prompt.len(),
            request.document.byte_len,
            request.document.mime_type
        );

        let body = build_request_body(request);

        let response = self
            .client
            .post(&endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.request_error(&endpoint, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.request_error(&endpoint, e))?;

        if !status.is_success() {
            warn!("生成服务返回错误状态: {}", status);
            return Err(GenerationError::BadStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let payload: GenerateContentResponse = serde_json::from_str(&text)?;
        let content = extract_text(payload)?;

        debug!("生成服务调用成功，返回 {} 字符", content.len());

        Ok(content)
    }

    fn request_error(&self, endpoint: &str, err: reqwest::Error) -> GenerationError {
        warn!("生成服务调用失败: {}", err);
        if err.is_timeout() {
            GenerationError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            GenerationError::RequestFailed {
                endpoint: endpoint.to_string(),
                source: err,
            }
        }
    }
}

impl GenerationService for GeminiService {
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, Result<String, GenerationError>> {
        Box::pin(self.send(request))
    }
}

/// 构建 `generateContent` 请求体
///
/// 文档在前、说明文本在后，与交互界面中的上传顺序一致
pub fn build_request_body(request: &GenerationRequest) -> Value {
    let mut generation_config = json!(request.sampling);
    generation_config["responseMimeType"] = json!("application/json");
    generation_config["responseSchema"] = request.response_schema.clone();

    json!({
        "systemInstruction": {
            "parts": [{ "text": request.system_instruction }]
        },
        "contents": [{
            "role": "user",
            "parts": [
                {
                    "inlineData": {
                        "mimeType": request.document.mime_type,
                        "data": request.document.data
                    }
                },
                { "text": request.prompt }
            ]
        }],
        "generationConfig": generation_config
    })
}

// ========== 响应结构 ==========

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

/// 取第一个候选的全部文本片段
fn extract_text(payload: GenerateContentResponse) -> Result<String, GenerationError> {
    let Some(candidate) = payload.candidates.into_iter().next() else {
        let reason = match payload.prompt_feedback {
            Some(feedback) => format!("no candidates, feedback: {}", feedback),
            None => "no candidates".to_string(),
        };
        return Err(GenerationError::EmptyResponse { reason });
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse {
            reason: format!(
                "empty content, finish reason: {}",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ),
        });
    }

    Ok(text)
}
