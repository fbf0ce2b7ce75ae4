use proc_macro::TokenStream;

mod command;
mod derives;

/// 命令宏
/// - 仅支持具名字段结构体（含空结构体 `struct Ping {}`）
/// - 合并/追加派生：`serde::Serialize`, `serde::Deserialize`
/// - 自动为目标结构体实现 `::nexus::command::Command`，`NAME` 即线上 `commandname` 取值
/// - 支持参数：`#[command(name = "...")]`，缺省为结构体名的小写形式
#[proc_macro_attribute]
pub fn command(attr: TokenStream, item: TokenStream) -> TokenStream {
    command::expand(attr.into(), item.into())
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
