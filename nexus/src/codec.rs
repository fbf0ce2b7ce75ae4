//! 信封编解码（Codec）
//!
//! 负责结构化值与线上文本之间的转换，枢纽本身只操作 `serde_json::Value`。
//! 默认实现为 [`JsonCodec`]，可通过 builder 调整输出格式。
//!
use bon::Builder;
use serde_json::Value;

/// 文本编解码器：构造枢纽时注入，缺省为 [`JsonCodec`]
///
/// 仅负责 `serde_json::Value` 与文本之间的转换；形状自身字段的编码方式由其
/// `Serialize`/`Deserialize` 实现决定（如 `#[serde(rename = ...)]`），无法通过 codec 改变。
pub trait Codec: Send + Sync {
    /// 将信封值编码为线上文本
    fn encode(&self, value: &Value) -> serde_json::Result<String>;

    /// 将线上文本解析为结构化值（不做形状校验）
    fn decode(&self, raw: &str) -> serde_json::Result<Value>;
}

/// 标准 JSON 编解码器
///
/// ```rust
/// use nexus::codec::{Codec, JsonCodec};
///
/// let codec = JsonCodec::builder().pretty(true).build();
/// let text = codec.encode(&serde_json::json!({"commandname": "ping"})).unwrap();
/// assert!(text.contains('\n'));
/// ```
#[derive(Debug, Clone, Default, Builder)]
pub struct JsonCodec {
    /// 是否输出带缩进的多行 JSON
    #[builder(default)]
    pretty: bool,
}

impl JsonCodec {
    pub fn pretty(&self) -> bool {
        self.pretty
    }
}

impl Codec for JsonCodec {
    fn encode(&self, value: &Value) -> serde_json::Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
    }

    fn decode(&self, raw: &str) -> serde_json::Result<Value> {
        serde_json::from_str(raw)
    }
}
