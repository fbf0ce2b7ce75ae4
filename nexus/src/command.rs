use serde::{Serialize, de::DeserializeOwned};

/// 线上信封中携带命令名称的固定键
pub const COMMAND_NAME_KEY: &str = "commandname";

/// 命令（Command）
///
/// 一个具名的消息形状（shape）：结构体的字段即命令负载，`NAME` 为其在线上的名称标记。
/// - 序列化时 `NAME` 以 `commandname` 字段注入信封顶层，负载字段与之平铺；
/// - `NAME` 应与注册时使用的名称一致，且在同一个 [`CommandNexus`](crate::CommandNexus)
///   中全局唯一；
/// - 通常借助 [`command`](macro@crate::command) 属性宏实现，无需手写。
///
/// ```rust
/// use nexus::command::Command;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct Chat {
///     text: String,
/// }
///
/// impl Command for Chat {
///     const NAME: &'static str = "chat";
/// }
/// ```
pub trait Command: Serialize + DeserializeOwned + Send + 'static {
    /// 命令的稳定名称（线上 `commandname` 字段的取值）
    const NAME: &'static str;
}
