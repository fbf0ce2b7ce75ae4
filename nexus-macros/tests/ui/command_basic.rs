use nexus::command::Command;
use nexus_macros::command;

#[command(name = "chat.say")]
#[derive(Debug, Clone, PartialEq)]
struct Say {
    text: String,
}

#[command]
struct Ping {}

fn main() {
    assert_eq!(Say::NAME, "chat.say");
    assert_eq!(Ping::NAME, "ping");

    // Serialize/Deserialize 已由宏派生
    let say = Say { text: "hi".into() };
    let _ = say.clone() == say;
    let _ = serde_json::to_string(&Ping {});
}
