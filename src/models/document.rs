//! 源文档
//!
//! 核心逻辑只把文档当作字节流，不解析内容

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 默认（也是唯一声明支持的）MIME 类型
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// 教师上传的源文档
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDocument {
    /// 磁盘上的文件，提交时才读取
    File { path: PathBuf, mime_type: String },
    /// 已在内存中的内容（例如上层已经接收了上传）
    InMemory {
        name: String,
        mime_type: String,
        bytes: Vec<u8>,
    },
}

/// 编码后的文档，可直接放入请求体
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDocument {
    pub mime_type: String,
    /// base64 (标准字母表，带填充)
    pub data: String,
    /// 原始字节数
    pub byte_len: usize,
}

impl SourceDocument {
    /// 磁盘上的 PDF
    pub fn pdf(path: impl Into<PathBuf>) -> Self {
        SourceDocument::File {
            path: path.into(),
            mime_type: PDF_MIME_TYPE.to_string(),
        }
    }

    /// 内存中的 PDF
    pub fn pdf_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        SourceDocument::InMemory {
            name: name.into(),
            mime_type: PDF_MIME_TYPE.to_string(),
            bytes,
        }
    }

    /// 显示用名称
    pub fn name(&self) -> String {
        match self {
            SourceDocument::File { path, .. } => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            SourceDocument::InMemory { name, .. } => name.clone(),
        }
    }

    pub fn mime_type(&self) -> &str {
        match self {
            SourceDocument::File { mime_type, .. } | SourceDocument::InMemory { mime_type, .. } => {
                mime_type
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            SourceDocument::File { path, .. } => Some(path),
            SourceDocument::InMemory { .. } => None,
        }
    }

    /// 完整读入内存
    pub async fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        match self {
            SourceDocument::File { path, .. } => fs::read(path).await,
            SourceDocument::InMemory { bytes, .. } => Ok(bytes.clone()),
        }
    }

    /// 读取并编码；空文档视为不可读
    pub async fn read_encoded(&self) -> std::io::Result<EncodedDocument> {
        let bytes = self.read_bytes().await?;
        if bytes.is_empty() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("文档为空: {}", self.name()),
            ));
        }

        Ok(EncodedDocument {
            mime_type: self.mime_type().to_string(),
            data: BASE64.encode(&bytes),
            byte_len: bytes.len(),
        })
    }
}
