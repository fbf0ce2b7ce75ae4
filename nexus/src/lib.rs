//! 命令枢纽（nexus）
//!
//! 一个通用的双向命令分发中心：将文本命令名称与具体的消息形状、以及处理该形状的
//! 处理器关联起来，负责带名称标记的消息编解码，并把入站命令路由到正确的处理器。
//!
//! - `command`：命令形状协议与线上名称键；
//! - `command_handler`：处理器协议与闭包适配；
//! - `envelope` / `codec`：信封结构与文本编解码；
//! - `registry`：注册表条目（形状描述、类型擦除的处理器、已解码命令）；
//! - `command_nexus`：枢纽本体。
//!
//! 传输层（套接字、队列等）不在本 crate 范围内，仅通过构造时注入的投递函数触达。
//!
pub mod codec;
pub mod command;
pub mod command_handler;
pub mod command_nexus;
pub mod envelope;
pub mod error;
pub mod registry;

pub use command_nexus::CommandNexus;
pub use error::{DecodeError, NexusError, NexusResult};
pub use nexus_macros::command;

// 允许在本 crate 内部通过 ::nexus 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::nexus 路径。
extern crate self as nexus;
