use anyhow::Result as AnyResult;
use nexus::command::{COMMAND_NAME_KEY, Command};
use nexus::{CommandNexus, DecodeError, NexusError, command};
use std::io;
use std::sync::{Arc, Mutex};

const MOCK_JSON: &str = include_str!("fixtures/mockcommand.json");

/// 测试用发送方：记录最后一次收到的文本
#[derive(Debug, Default)]
struct MockSender {
    id: u32,
    last_received: Mutex<Option<String>>,
    received: Mutex<usize>,
}

impl MockSender {
    fn new(id: u32) -> Arc<Self> {
        Arc::new(Self {
            id,
            ..Default::default()
        })
    }

    fn receive(&self, text: String) -> io::Result<()> {
        *self.last_received.lock().unwrap() = Some(text);
        *self.received.lock().unwrap() += 1;
        Ok(())
    }

    fn last_received(&self) -> Option<String> {
        self.last_received.lock().unwrap().clone()
    }
}

#[command(name = "mock")]
#[derive(Debug, Clone, PartialEq)]
struct MockCommand {
    message: String,
}

#[command(name = "mock")]
#[derive(Debug, Clone, PartialEq)]
struct OtherMockCommand {
    message: String,
    priority: u8,
}

#[command(name = "move")]
#[derive(Debug, Clone, PartialEq)]
struct MoveCommand {
    x: i64,
    y: i64,
    label: Option<String>,
    tags: Vec<String>,
}

fn setup() -> CommandNexus<Arc<MockSender>> {
    // RUST_LOG=nexus=trace 可查看注册与分发过程
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    CommandNexus::new(|sender: &Arc<MockSender>, text: String| sender.receive(text))
}

#[test]
fn receive_command_from_fixture() -> AnyResult<()> {
    let sender = MockSender::new(1);
    let nexus = setup();

    let seen: Arc<Mutex<Vec<(u32, String)>>> = Arc::default();
    let sink = seen.clone();
    nexus.handle_command_fn("mock", move |sender: &Arc<MockSender>, cmd: MockCommand| {
        sink.lock().unwrap().push((sender.id, cmd.message));
        Ok(())
    })?;

    nexus.on_command(&sender, MOCK_JSON)?;

    assert_eq!(*seen.lock().unwrap(), vec![(1, "mock123".to_string())]);
    Ok(())
}

#[test]
fn send_command_reaches_recipient() -> AnyResult<()> {
    let sender = MockSender::new(2);
    let nexus = setup();
    nexus.register_command::<MockCommand>("mock")?;
    assert!(sender.last_received().is_none());

    let cmd = MockCommand {
        message: "abc".into(),
    };
    nexus.send_command(&sender, &cmd)?;

    assert_eq!(*sender.received.lock().unwrap(), 1);
    let text = sender.last_received().expect("delivered");
    assert_eq!(nexus.parse_command_as::<MockCommand>(&text)?, cmd);
    Ok(())
}

#[test]
fn round_trip_preserves_fields_and_name() -> AnyResult<()> {
    let nexus = setup();
    nexus.register_command::<MoveCommand>(MoveCommand::NAME)?;

    let cmds = [
        MoveCommand {
            x: -3,
            y: 9_000_000_000,
            label: Some("jump \"high\"".into()),
            tags: vec!["a".into(), "ü".into()],
        },
        MoveCommand {
            x: 0,
            y: 0,
            label: None,
            tags: vec![],
        },
    ];

    for cmd in cmds {
        let text = nexus.convert_to_json(&cmd)?;
        let value: serde_json::Value = serde_json::from_str(&text)?;
        assert_eq!(value[COMMAND_NAME_KEY], "move");

        let parsed = nexus.parse_command(&text)?;
        assert_eq!(parsed.name(), "move");
        assert_eq!(parsed.downcast::<MoveCommand>().ok(), Some(cmd));
    }
    Ok(())
}

#[test]
fn second_registration_of_a_name_wins() -> AnyResult<()> {
    let sender = MockSender::new(3);
    let nexus = setup();

    let hits: Arc<Mutex<Vec<&'static str>>> = Arc::default();
    let h1 = hits.clone();
    nexus.handle_command_fn("mock", move |_: &Arc<MockSender>, _: MockCommand| {
        h1.lock().unwrap().push("first");
        Ok(())
    })?;
    let h2 = hits.clone();
    nexus.handle_command_fn("mock", move |_: &Arc<MockSender>, cmd: OtherMockCommand| {
        assert_eq!(cmd.priority, 2);
        h2.lock().unwrap().push("second");
        Ok(())
    })?;

    nexus.on_command(&sender, r#"{"commandname":"mock","message":"m","priority":2}"#)?;

    assert_eq!(*hits.lock().unwrap(), vec!["second"]);
    // 第一个形状的负载不再满足当前注册的形状
    let err = nexus.on_command(&sender, MOCK_JSON).unwrap_err();
    assert!(matches!(err, NexusError::Decode(DecodeError::Shape { .. })));
    Ok(())
}

#[test]
fn decode_failures_invoke_no_handler() -> AnyResult<()> {
    let sender = MockSender::new(4);
    let nexus = setup();

    let calls: Arc<Mutex<usize>> = Arc::default();
    let c = calls.clone();
    nexus.handle_command_fn("mock", move |_: &Arc<MockSender>, _: MockCommand| {
        *c.lock().unwrap() += 1;
        Ok(())
    })?;

    let cases = [
        r#"{"commandname":"doesnotexist"}"#,
        "{}",
        "not json",
        r#"["mock"]"#,
        r#"{"commandname":null,"message":"x"}"#,
        r#"{"commandname":"mock"}"#,
    ];
    for raw in cases {
        let err = nexus.on_command(&sender, raw).unwrap_err();
        assert!(err.is_decode(), "{raw}: {err}");
    }

    assert_eq!(*calls.lock().unwrap(), 0);
    assert!(sender.last_received().is_none());
    Ok(())
}

#[test]
fn lookups_by_name_and_shape() -> AnyResult<()> {
    let nexus = setup();
    assert!(nexus.command_handler("mock").is_none());

    nexus.handle_command_fn("mock", |_: &Arc<MockSender>, _: MockCommand| Ok(()))?;
    nexus.register_command::<MoveCommand>("move")?;

    assert_eq!(nexus.registered_commands(), vec!["mock", "move"]);
    assert!(nexus.command_handler("mock").is_some());
    assert!(nexus.command_handler("move").is_none());
    assert!(nexus.handler_for::<MockCommand>().is_some());
    assert!(nexus.handler_for::<MoveCommand>().is_none());
    assert!(nexus.command_type("move").is_some_and(|s| s.is::<MoveCommand>()));
    Ok(())
}
