//! 注册表条目
//!
//! - [`CommandShape`]：名称解析出的形状描述，携带该形状的反序列化策略；
//! - [`RegisteredHandler`]：以类型擦除方式保存的处理器，可按形状还原或直接调用；
//! - [`ParsedCommand`]：解码后尚未分发的命令，可向下转型为具体形状。
//!
use crate::{
    command::Command,
    command_handler::CommandHandler,
    envelope::Envelope,
    error::{DecodeError, NexusError, NexusResult},
};
use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;

type BoxAnySend = Box<dyn Any + Send>;

type DecodeFn = Arc<dyn Fn(Envelope) -> Result<BoxAnySend, DecodeError> + Send + Sync>;

type InvokeFn<S> = Arc<dyn Fn(&S, BoxAnySend, &str) -> NexusResult<()> + Send + Sync>;

/// 命令形状描述
#[derive(Clone)]
pub struct CommandShape {
    type_id: TypeId,
    type_name: &'static str,
    decode: DecodeFn,
}

impl CommandShape {
    pub fn of<C: Command>() -> Self {
        let decode: DecodeFn = Arc::new(|envelope: Envelope| {
            envelope
                .open::<C>()
                .map(|cmd| Box::new(cmd) as BoxAnySend)
        });

        Self {
            type_id: TypeId::of::<C>(),
            type_name: type_name::<C>(),
            decode,
        }
    }

    pub fn shape_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<C: Command>(&self) -> bool {
        self.type_id == TypeId::of::<C>()
    }

    /// 按本形状反序列化信封负载
    pub fn decode(&self, envelope: Envelope) -> Result<ParsedCommand, DecodeError> {
        let name = envelope.name().to_string();
        let payload = (self.decode)(envelope)?;

        Ok(ParsedCommand {
            name,
            shape: self.type_name,
            type_id: self.type_id,
            payload,
        })
    }
}

impl fmt::Debug for CommandShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandShape")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// 解码后的命令（类型擦除）
pub struct ParsedCommand {
    name: String,
    shape: &'static str,
    type_id: TypeId,
    payload: BoxAnySend,
}

impl ParsedCommand {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &'static str {
        self.shape
    }

    pub fn shape_id(&self) -> TypeId {
        self.type_id
    }

    pub fn is<C: Command>(&self) -> bool {
        self.type_id == TypeId::of::<C>()
    }

    /// 还原为具体形状；形状不符时原样退回
    pub fn downcast<C: Command>(self) -> Result<C, Self> {
        let Self {
            name,
            shape,
            type_id,
            payload,
        } = self;

        match payload.downcast::<C>() {
            Ok(cmd) => Ok(*cmd),
            Err(payload) => Err(Self {
                name,
                shape,
                type_id,
                payload,
            }),
        }
    }
}

impl fmt::Debug for ParsedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedCommand")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

/// 已注册的处理器（类型擦除）
pub struct RegisteredHandler<S> {
    shape: &'static str,
    type_id: TypeId,
    // 实际保存 Arc<dyn CommandHandler<S, C>>，供按形状还原
    handler: Arc<dyn Any + Send + Sync>,
    invoke: InvokeFn<S>,
}

impl<S> Clone for RegisteredHandler<S> {
    fn clone(&self) -> Self {
        Self {
            shape: self.shape,
            type_id: self.type_id,
            handler: self.handler.clone(),
            invoke: self.invoke.clone(),
        }
    }
}

impl<S: 'static> RegisteredHandler<S> {
    pub(crate) fn new<C, H>(handler: H) -> Self
    where
        C: Command,
        H: CommandHandler<S, C> + 'static,
    {
        let handler: Arc<dyn CommandHandler<S, C>> = Arc::new(handler);

        let invoke: InvokeFn<S> = {
            let handler = handler.clone();

            Arc::new(move |sender: &S, boxed_cmd: BoxAnySend, command: &str| {
                // 键与闭包同为泛型 C，正常情况下 downcast 不会失败
                match boxed_cmd.downcast::<C>() {
                    Ok(cmd) => handler
                        .handle(sender, *cmd)
                        .map_err(|source| NexusError::Handler {
                            command: command.to_string(),
                            source,
                        }),
                    Err(_) => Err(NexusError::TypeMismatch {
                        expected: type_name::<C>(),
                        found: "unknown",
                    }),
                }
            })
        };

        Self {
            shape: type_name::<C>(),
            type_id: TypeId::of::<C>(),
            handler: Arc::new(handler),
            invoke,
        }
    }

    pub fn shape(&self) -> &'static str {
        self.shape
    }

    /// 以已解码命令调用处理器
    pub fn call(&self, sender: &S, parsed: ParsedCommand) -> NexusResult<()> {
        if parsed.type_id != self.type_id {
            return Err(NexusError::TypeMismatch {
                expected: self.shape,
                found: parsed.shape,
            });
        }

        (self.invoke)(sender, parsed.payload, &parsed.name)
    }

    /// 还原为具体形状的处理器
    pub fn downcast<C: Command>(&self) -> Option<Arc<dyn CommandHandler<S, C>>> {
        self.handler
            .downcast_ref::<Arc<dyn CommandHandler<S, C>>>()
            .cloned()
    }
}

impl<S> fmt::Debug for RegisteredHandler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredHandler")
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}
