//! Per-call override > programmatic value > file value > default.

use tl_config::{resolve, CallOverrides, ConfigStore};

const FILE: &str = r#"
[SessionGroup.SessionList.Prices]
Channel = "A"

[ChannelGroup.ChannelList.A]
ChannelType = "Socket"
Host = "file-host"
Port = "14010"
"#;

fn host_of(store: &ConfigStore, overrides: &CallOverrides) -> String {
    let resolved = resolve(store, overrides, "Prices", 1).unwrap();
    resolved.config.channel_set[0]
        .socket_config()
        .unwrap()
        .host
        .clone()
}

#[test]
fn file_value_applies_without_overrides() {
    let store = ConfigStore::with_file_text(FILE).unwrap();
    assert_eq!(host_of(&store, &CallOverrides::default()), "file-host");
}

#[test]
fn programmatic_value_beats_file() {
    let mut store = ConfigStore::with_file_text(FILE).unwrap();
    store
        .set_programmatic_text(
            r#"
[ChannelGroup.ChannelList.A]
Host = "prog-host"
"#,
        )
        .unwrap();
    assert_eq!(host_of(&store, &CallOverrides::default()), "prog-host");
}

#[test]
fn call_override_beats_everything() {
    let mut store = ConfigStore::with_file_text(FILE).unwrap();
    store
        .set_programmatic_text(
            r#"
[ChannelGroup.ChannelList.A]
Host = "prog-host"
"#,
        )
        .unwrap();
    let overrides = CallOverrides {
        host: Some("call-host".to_string()),
        ..CallOverrides::default()
    };
    assert_eq!(host_of(&store, &overrides), "call-host");

    // The file port survives: the override only names the host.
    let resolved = resolve(&store, &overrides, "Prices", 1).unwrap();
    assert_eq!(
        resolved.config.channel_set[0].socket_config().unwrap().service,
        "14010"
    );
}

#[test]
fn defaults_fill_the_gaps() {
    let resolved = resolve(&ConfigStore::new(), &CallOverrides::default(), "Prices", 1).unwrap();
    let config = resolved.config;
    // No channel or warm-standby set configured: exactly one synthesized
    // socket channel named "Channel".
    assert_eq!(config.channel_set.len(), 1);
    assert_eq!(config.channel_set[0].name, "Channel");
    assert!(config.warm_standby_set.is_empty());
}
