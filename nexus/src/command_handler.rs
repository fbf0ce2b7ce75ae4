use crate::command::Command;
use std::marker::PhantomData;

/// 命令处理器：响应某一形状的命令
///
/// - `S`：发送方类型，由嵌入方定义，枢纽不做解释；
/// - 处理器同步执行，返回的错误由 `on_command` 原样上抛。
pub trait CommandHandler<S, C>: Send + Sync
where
    C: Command,
{
    fn handle(&self, sender: &S, cmd: C) -> anyhow::Result<()>;
}

/// 闭包适配器：将 `Fn(&S, C)` 包装为 [`CommandHandler`]
pub struct FnHandler<S, C, F> {
    f: F,
    _marker: PhantomData<fn(&S, C)>,
}

impl<S, C, F> FnHandler<S, C, F> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

impl<S, C, F> CommandHandler<S, C> for FnHandler<S, C, F>
where
    C: Command,
    F: Fn(&S, C) -> anyhow::Result<()> + Send + Sync,
{
    fn handle(&self, sender: &S, cmd: C) -> anyhow::Result<()> {
        (self.f)(sender, cmd)
    }
}
