use nexus::command::Command;
use nexus::{CommandNexus, NexusError, command};
use std::sync::{Arc, Mutex};

#[command(name = "say")]
#[derive(Debug)]
struct Say {
    text: String,
}

#[command(name = "heard")]
#[derive(Debug)]
struct Heard {
    text: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 投递函数：这里把文本写入发送方自己的“收件箱”，真实场景中替换为套接字写入
    let nexus = Arc::new(CommandNexus::new(
        |inbox: &Arc<Mutex<Vec<String>>>, text: String| {
            inbox.lock().unwrap().push(text);
            Ok(())
        },
    ));

    let weak = Arc::downgrade(&nexus);
    nexus.handle_command_fn(Say::NAME, move |sender, cmd: Say| {
        println!("Say: text={}", cmd.text);
        if let Some(nexus) = weak.upgrade() {
            nexus.send_command(sender, &Heard { text: cmd.text })?;
        }
        Ok(())
    })?;
    nexus.register_command::<Heard>(Heard::NAME)?;

    let inbox: Arc<Mutex<Vec<String>>> = Arc::default();
    nexus.on_command(&inbox, r#"{"commandname":"say","text":"hello"}"#)?;

    for text in inbox.lock().unwrap().iter() {
        let heard: Heard = nexus.parse_command_as(text)?;
        println!("reply: {text} -> heard={}", heard.text);
    }

    // 未注册的命令 -> 返回解码错误
    if let Err(NexusError::Decode(e)) = nexus.on_command(&inbox, r#"{"commandname":"shout"}"#) {
        eprintln!("rejected as expected: {e}");
    }
    Ok(())
}
