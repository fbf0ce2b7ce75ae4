use nexus::{CommandNexus, NexusError, command};
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;

/// 连接句柄：枢纽只负责透传，由投递函数写入对端的收件通道
#[derive(Clone, Debug)]
struct Peer {
    name: &'static str,
    tx: mpsc::UnboundedSender<String>,
}

impl Peer {
    fn deliver(&self, text: String) -> io::Result<()> {
        self.tx
            .send(text)
            .map_err(|e| io::Error::new(io::ErrorKind::BrokenPipe, e.to_string()))
    }
}

#[command(name = "login")]
#[derive(Debug)]
struct Login {
    user: String,
}

#[command(name = "chat")]
#[derive(Debug)]
struct Chat {
    text: String,
}

#[command(name = "welcome")]
#[derive(Debug)]
struct Welcome {
    motd: String,
}

#[command(name = "echo")]
#[derive(Debug)]
struct Echo {
    from: String,
    text: String,
}

fn server_nexus() -> Result<Arc<CommandNexus<Peer>>, NexusError> {
    let nexus = Arc::new(CommandNexus::new(|peer: &Peer, text: String| peer.deliver(text)));

    let weak = Arc::downgrade(&nexus);
    nexus.handle_command_fn("login", move |peer: &Peer, cmd: Login| {
        tracing::info!(peer = peer.name, user = %cmd.user, "login");
        if let Some(nexus) = weak.upgrade() {
            nexus.send_command(peer, &Welcome {
                motd: format!("hello, {}", cmd.user),
            })?;
        }
        Ok(())
    })?;

    let weak = Arc::downgrade(&nexus);
    nexus.handle_command_fn("chat", move |peer: &Peer, cmd: Chat| {
        if let Some(nexus) = weak.upgrade() {
            nexus.send_command(peer, &Echo {
                from: "server".into(),
                text: cmd.text.to_uppercase(),
            })?;
        }
        Ok(())
    })?;

    Ok(nexus)
}

fn client_nexus() -> Result<CommandNexus<Peer>, NexusError> {
    let nexus = CommandNexus::new(|peer: &Peer, text: String| peer.deliver(text));
    nexus.handle_command_fn("welcome", |peer: &Peer, cmd: Welcome| {
        tracing::info!(from = peer.name, motd = %cmd.motd, "welcome received");
        Ok(())
    })?;
    nexus.handle_command_fn("echo", |_: &Peer, cmd: Echo| {
        tracing::info!(from = %cmd.from, text = %cmd.text, "echo received");
        Ok(())
    })?;
    Ok(nexus)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let (to_server, mut server_inbox) = mpsc::unbounded_channel::<String>();
    let (to_client, mut client_inbox) = mpsc::unbounded_channel::<String>();
    let server_peer = Peer {
        name: "server",
        tx: to_server,
    };
    let client_peer = Peer {
        name: "client",
        tx: to_client,
    };

    let server = server_nexus()?;
    let server_task = tokio::spawn(async move {
        while let Some(text) = server_inbox.recv().await {
            // 解码失败视为对端行为异常，断开连接
            if let Err(e) = server.on_command(&client_peer, &text) {
                tracing::warn!(error = %e, "dropping misbehaving client");
                break;
            }
        }
    });

    let client = client_nexus()?;
    client.send_command(&server_peer, &Login {
        user: "alice".into(),
    })?;
    client.send_command(&server_peer, &Chat {
        text: "ping".into(),
    })?;

    for _ in 0..2 {
        let Some(text) = client_inbox.recv().await else {
            break;
        };
        client.on_command(&server_peer, &text)?;
    }

    // 未注册的命令：服务端返回解码错误并断开
    server_peer.deliver(r#"{"commandname":"shutdown"}"#.to_string())?;
    server_task.await?;

    Ok(())
}
