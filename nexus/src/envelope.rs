//! 命令信封（Envelope）
//!
//! 线上形态为一个平铺的结构化对象：顶层必含字符串字段 `commandname`，
//! 其余字段属于具体形状，在形状确定之前对枢纽不透明。
//!
use crate::{
    codec::Codec,
    command::{COMMAND_NAME_KEY, Command},
    error::{DecodeError, NexusError, NexusResult},
};
use serde_json::{Map, Value};
use std::any::type_name;

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// 命令名称（`commandname` 字段的取值）
    name: String,
    /// 形状相关字段（不含 `commandname`）
    fields: Map<String, Value>,
}

impl Envelope {
    /// 使用编解码器解析线上文本
    pub fn decode(codec: &dyn Codec, raw: &str) -> Result<Self, DecodeError> {
        let value = codec
            .decode(raw)
            .map_err(|source| DecodeError::Malformed { source })?;
        Self::from_value(value)
    }

    /// 从结构化值构造信封，要求为对象且含字符串 `commandname`
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let mut fields = match value {
            Value::Object(map) => map,
            other => {
                return Err(DecodeError::NotAnObject {
                    found: value_kind(&other),
                });
            }
        };

        let Some(Value::String(name)) = fields.remove(COMMAND_NAME_KEY) else {
            return Err(DecodeError::MissingName {
                key: COMMAND_NAME_KEY,
            });
        };

        Ok(Self { name, fields })
    }

    /// 将命令封装为信封：形状字段平铺，名称取 `C::NAME`
    pub fn seal<C: Command>(cmd: &C) -> NexusResult<Self> {
        let value = serde_json::to_value(cmd).map_err(|e| NexusError::Encode {
            shape: type_name::<C>(),
            reason: e.to_string(),
        })?;

        let Value::Object(mut fields) = value else {
            return Err(NexusError::Encode {
                shape: type_name::<C>(),
                reason: format!("expected object, found {}", value_kind(&value)),
            });
        };
        // 形状自带的同名字段以注册名称为准
        fields.remove(COMMAND_NAME_KEY);

        Ok(Self {
            name: C::NAME.to_string(),
            fields,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// 按形状 `C` 反序列化负载
    pub fn open<C: Command>(self) -> Result<C, DecodeError> {
        let Self { name, fields } = self;
        serde_json::from_value(Value::Object(fields)).map_err(|source| DecodeError::Shape {
            command: name,
            shape: type_name::<C>(),
            source,
        })
    }

    /// 还原为完整的线上结构（含 `commandname`）
    pub fn into_value(self) -> Value {
        let Self { name, mut fields } = self;
        fields.insert(COMMAND_NAME_KEY.to_string(), Value::String(name));
        Value::Object(fields)
    }

    /// 使用编解码器编码为线上文本
    pub fn encode(self, codec: &dyn Codec) -> NexusResult<String> {
        let name = self.name.clone();
        codec
            .encode(&self.into_value())
            .map_err(|e| NexusError::Encode {
                shape: "envelope",
                reason: format!("command={name}, {e}"),
            })
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Move {
        x: i32,
        y: i32,
    }

    impl Command for Move {
        const NAME: &'static str = "move";
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct Bare(u8);

    impl Command for Bare {
        const NAME: &'static str = "bare";
    }

    #[test]
    fn name_is_split_from_fields() {
        let env = Envelope::from_value(json!({"commandname": "move", "x": 1, "y": 2})).unwrap();
        assert_eq!(env.name(), "move");
        assert!(!env.fields().contains_key(COMMAND_NAME_KEY));
        assert_eq!(env.open::<Move>().unwrap(), Move { x: 1, y: 2 });
    }

    #[test]
    fn rejects_non_object() {
        let err = Envelope::decode(&JsonCodec::default(), "[1, 2]").unwrap_err();
        assert!(matches!(err, DecodeError::NotAnObject { found: "array" }));
    }

    #[test]
    fn rejects_missing_or_non_string_name() {
        let err = Envelope::from_value(json!({})).unwrap_err();
        assert!(matches!(err, DecodeError::MissingName { .. }));

        let err = Envelope::from_value(json!({"commandname": 7})).unwrap_err();
        assert!(matches!(err, DecodeError::MissingName { .. }));
    }

    #[test]
    fn rejects_malformed_text() {
        let err = Envelope::decode(&JsonCodec::default(), "{\"commandname\":").unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { .. }));
    }

    #[test]
    fn open_reports_shape_mismatch() {
        let env = Envelope::from_value(json!({"commandname": "move", "x": "left"})).unwrap();
        match env.open::<Move>().unwrap_err() {
            DecodeError::Shape { command, shape, .. } => {
                assert_eq!(command, "move");
                assert!(shape.contains("Move"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn seal_injects_name_at_top_level() {
        let value = Envelope::seal(&Move { x: 3, y: 4 }).unwrap().into_value();
        assert_eq!(value, json!({"commandname": "move", "x": 3, "y": 4}));
    }

    #[test]
    fn seal_requires_object_shape() {
        let err = Envelope::seal(&Bare(1)).unwrap_err();
        match err {
            NexusError::Encode { shape, reason } => {
                assert!(shape.contains("Bare"));
                assert!(reason.contains("number"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
