use nexus::CommandNexus;
use nexus_macros::command;
use serde::Serialize;

// 已有的 Serialize 派生与 serde 辅助属性应与宏共存
#[command(name = "login")]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Login {
    user_name: String,
    #[serde(default)]
    remember_me: bool,
}

fn main() {
    let nexus: CommandNexus<()> = CommandNexus::new(|_: &(), _: String| Ok(()));
    nexus.register_command::<Login>("login").unwrap();
    let _ = nexus.parse_command_as::<Login>(r#"{"commandname":"login","userName":"a"}"#);
}
