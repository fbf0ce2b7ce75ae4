//! 命令枢纽统一错误定义
//!
//! - `DecodeError`：入站文本无法还原为已注册的命令（格式错误、缺少名称、未知名称等）；
//! - `NexusError`：对外统一错误，涵盖解码、分发、处理器失败与投递失败。
//!
//! 查询类操作（按名称/类型查找处理器）以 `Option` 表达未命中，不属于错误。
//!
use thiserror::Error;

/// 解码错误：原样返回给 `on_command` / `parse_command` 的调用方
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed envelope: {source}")]
    Malformed {
        #[source]
        source: serde_json::Error,
    },

    #[error("envelope is not an object: found={found}")]
    NotAnObject { found: &'static str },

    #[error("envelope missing string field `{key}`")]
    MissingName { key: &'static str },

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("payload does not fit shape: command={command}, shape={shape}, reason={source}")]
    Shape {
        command: String,
        shape: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum NexusError {
    #[error("decode: {0}")]
    Decode(#[from] DecodeError),

    #[error("encode failed: shape={shape}, reason={reason}")]
    Encode { shape: &'static str, reason: String },

    #[error("command name must not be empty: shape={shape}")]
    EmptyCommandName { shape: &'static str },

    #[error("command name mismatch: registered={registered}, declared={declared}")]
    NameMismatch {
        registered: String,
        declared: &'static str,
    },

    #[error("handler not found: command={command}, shape={shape}")]
    HandlerNotFound { command: String, shape: &'static str },

    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("handler failed: command={command}, reason={source}")]
    Handler {
        command: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("delivery failed: {0}")]
    Delivery(#[from] std::io::Error),
}

impl NexusError {
    /// 是否为解码类错误（嵌入方通常据此断开行为异常的发送方）
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

/// 统一 Result 类型别名
pub type NexusResult<T> = Result<T, NexusError>;
