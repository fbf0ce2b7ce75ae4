use crate::{
    codec::{Codec, JsonCodec},
    command::Command,
    command_handler::{CommandHandler, FnHandler},
    envelope::Envelope,
    error::{DecodeError, NexusError, NexusResult},
    registry::{CommandShape, ParsedCommand, RegisteredHandler},
};
use dashmap::DashMap;
use std::any::{TypeId, type_name};
use std::fmt;
use std::io;
use std::sync::Arc;

type DeliverFn<S> = Arc<dyn Fn(&S, String) -> io::Result<()> + Send + Sync>;

/// 命令枢纽（CommandNexus）
///
/// 双向的命令分发中心：
/// - 入站：文本 -> 信封 -> 按名称解析形状 -> 反序列化 -> 按形状找到处理器 -> 调用；
/// - 出站：命令 -> 注入 `commandname` 后序列化 -> 交给嵌入方提供的投递函数。
///
/// 名称 -> 形状、形状 -> 处理器 两张表均为并发安全的 `DashMap`，注册采用“后写覆盖”语义。
/// 枢纽自身不做任何 I/O、不派生任务，所有失败原样返回给直接调用方。
///
/// `S` 为发送方类型，由嵌入方定义（连接句柄、会话 ID 等），枢纽仅将其透传给处理器与投递函数。
pub struct CommandNexus<S> {
    shapes: DashMap<String, CommandShape>,
    handlers: DashMap<TypeId, RegisteredHandler<S>>,
    codec: Arc<dyn Codec>,
    deliver: DeliverFn<S>,
}

impl<S: 'static> CommandNexus<S> {
    /// 使用默认 [`JsonCodec`] 创建枢纽
    pub fn new<F>(deliver: F) -> Self
    where
        F: Fn(&S, String) -> io::Result<()> + Send + Sync + 'static,
    {
        Self::with_codec(JsonCodec::default(), deliver)
    }

    /// 使用自定义编解码器创建枢纽
    pub fn with_codec<K, F>(codec: K, deliver: F) -> Self
    where
        K: Codec + 'static,
        F: Fn(&S, String) -> io::Result<()> + Send + Sync + 'static,
    {
        Self {
            shapes: DashMap::new(),
            handlers: DashMap::new(),
            codec: Arc::new(codec),
            deliver: Arc::new(deliver),
        }
    }

    /// 注册命令处理器
    ///
    /// 将 `C` 登记为名称 `name` 的反序列化目标，并将 `handler` 登记为形状 `C` 的处理器。
    /// `name` 必须与 `C::NAME` 一致，否则返回 `NameMismatch`。
    /// 同名或同形状重复注册时后者覆盖前者。
    pub fn handle_command<C, H>(&self, name: impl Into<String>, handler: H) -> NexusResult<()>
    where
        C: Command,
        H: CommandHandler<S, C> + 'static,
    {
        let name = self.insert_shape::<C>(name.into())?;
        self.handlers
            .insert(TypeId::of::<C>(), RegisteredHandler::new::<C, H>(handler));

        tracing::debug!(command = %name, shape = type_name::<C>(), "command handler registered");
        Ok(())
    }

    /// 以闭包注册命令处理器，语义同 [`handle_command`](Self::handle_command)
    pub fn handle_command_fn<C, F>(&self, name: impl Into<String>, f: F) -> NexusResult<()>
    where
        C: Command,
        F: Fn(&S, C) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.handle_command::<C, _>(name, FnHandler::new(f))
    }

    /// 仅登记名称 -> 形状，不登记处理器
    ///
    /// 适用于只需解析的端点；对该名称调用 `on_command` 将返回 `HandlerNotFound`。
    pub fn register_command<C: Command>(&self, name: impl Into<String>) -> NexusResult<()> {
        let name = self.insert_shape::<C>(name.into())?;

        tracing::debug!(command = %name, shape = type_name::<C>(), "command shape registered");
        Ok(())
    }

    fn insert_shape<C: Command>(&self, name: String) -> NexusResult<String> {
        if name.is_empty() {
            return Err(NexusError::EmptyCommandName {
                shape: type_name::<C>(),
            });
        }
        // 出站名称取自 C::NAME，二者不一致时本端发出的命令将无法被自身解析
        if name != C::NAME {
            return Err(NexusError::NameMismatch {
                registered: name,
                declared: C::NAME,
            });
        }

        self.shapes.insert(name.clone(), CommandShape::of::<C>());
        Ok(name)
    }

    /// 处理入站命令：解码后同步调用已注册的处理器
    pub fn on_command(&self, sender: &S, raw: &str) -> NexusResult<()> {
        let parsed = self.parse_command(raw)?;

        // 先取出处理器再调用，避免处理器内部访问枢纽时与表锁冲突
        let Some(handler) = self.handlers.get(&parsed.shape_id()).map(|h| h.clone()) else {
            return Err(NexusError::HandlerNotFound {
                command: parsed.name().to_string(),
                shape: parsed.shape(),
            });
        };

        tracing::trace!(command = parsed.name(), shape = parsed.shape(), "dispatching command");
        handler.call(sender, parsed)
    }

    /// 解码入站文本为已注册形状的命令（不分发）
    pub fn parse_command(&self, raw: &str) -> NexusResult<ParsedCommand> {
        let envelope = Envelope::decode(self.codec.as_ref(), raw)?;

        let shape = self
            .command_type(envelope.name())
            .ok_or_else(|| DecodeError::UnknownCommand(envelope.name().to_string()))?;

        Ok(shape.decode(envelope)?)
    }

    /// 解码为指定形状；名称解析出的形状与 `C` 不符时返回 `TypeMismatch`
    pub fn parse_command_as<C: Command>(&self, raw: &str) -> NexusResult<C> {
        self.parse_command(raw)?
            .downcast::<C>()
            .map_err(|parsed| NexusError::TypeMismatch {
                expected: type_name::<C>(),
                found: parsed.shape(),
            })
    }

    /// 按名称查找形状
    pub fn command_type(&self, name: &str) -> Option<CommandShape> {
        self.shapes.get(name).map(|e| e.value().clone())
    }

    /// 按名称查找处理器；名称或处理器未注册时返回 `None`
    pub fn command_handler(&self, name: &str) -> Option<RegisteredHandler<S>> {
        let shape_id = self.shapes.get(name)?.shape_id();
        self.handlers.get(&shape_id).map(|h| h.clone())
    }

    /// 按形状查找处理器
    pub fn handler_for<C: Command>(&self) -> Option<Arc<dyn CommandHandler<S, C>>> {
        self.handlers
            .get(&TypeId::of::<C>())
            .and_then(|h| h.downcast::<C>())
    }

    /// 发送命令：序列化后交给投递函数，投递失败原样返回，不重试
    pub fn send_command<C: Command>(&self, recipient: &S, cmd: &C) -> NexusResult<()> {
        let text = self.convert_to_json(cmd)?;

        tracing::trace!(command = C::NAME, bytes = text.len(), "sending command");
        (self.deliver)(recipient, text)?;
        Ok(())
    }

    /// 将命令编码为线上文本（纯函数，无 I/O）
    pub fn convert_to_json<C: Command>(&self, cmd: &C) -> NexusResult<String> {
        Envelope::seal(cmd)?.encode(self.codec.as_ref())
    }

    /// 获取已注册的命令名称（按字典序）
    pub fn registered_commands(&self) -> Vec<String> {
        let mut names: Vec<String> = self.shapes.iter().map(|e| e.key().clone()).collect();
        names.sort_unstable();
        names
    }
}

impl<S> fmt::Debug for CommandNexus<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNexus")
            .field("commands", &self.shapes.len())
            .field("handlers", &self.handlers.len())
            .finish_non_exhaustive()
    }
}
