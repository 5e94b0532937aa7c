//! Warm-standby resolution skips dangling channel references instead of
//! failing the resolve, and bring-up proceeds.

use serial_test::serial;
use tl_config::{resolve, CallOverrides, ConfigStore};
use tl_core::ErrorCode;
use tl_reactor::stub::StubReactor;
use tl_reactor::Reactor;
use tl_session::SessionBuilder;

use crate::prelude::quiet_logger;

const WSB_WITH_MISSING_CHANNEL: &str = r#"
[SessionGroup.SessionList.Prices]
WarmStandbyChannelSet = "WSB1"
LoginRequestTimeOut = 200

[WarmStandbyGroup.WarmStandbyList.WSB1]
StartingActiveServer = "SrvA"

[WarmStandbyServerInfoGroup.WarmStandbyServerInfoList.SrvA]
Channel = "MissingChannel"
"#;

#[test]
fn missing_starting_active_channel_is_skipped() {
    let store = ConfigStore::with_file_text(WSB_WITH_MISSING_CHANNEL).unwrap();
    let resolved = resolve(&store, &CallOverrides::default(), "Prices", 1).unwrap();
    let config = resolved.config;

    // Resolve succeeds; the group survives without a starting server and
    // the warm-standby channel collection stays empty.
    assert_eq!(config.warm_standby_set.len(), 1);
    assert!(config.warm_standby_set[0].starting_active.is_none());
    assert!(config.channel_set_for_warm_standby.is_empty());
    // No default channel was synthesized: the warm-standby set is not
    // empty.
    assert!(config.channel_set.is_empty());
}

#[test]
#[serial]
fn bring_up_proceeds_past_resolution() {
    // With nothing to connect, bring-up reaches the login wait and fails
    // on the watchdog -- proof that resolution itself did not fail.
    let stub = StubReactor::new().unwrap();
    let store = ConfigStore::with_file_text(WSB_WITH_MISSING_CHANNEL).unwrap();
    let err = SessionBuilder::new("Prices")
        .config_store(store)
        .logger(quiet_logger())
        .reactor_factory(move |_options| Ok(Box::new(stub) as Box<dyn Reactor>))
        .initialize()
        .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::LoginRequestTimeout));
}

#[test]
fn standby_servers_resolve_into_the_dedicated_collection() {
    let store = ConfigStore::with_file_text(
        r#"
[SessionGroup.SessionList.Prices]
WarmStandbyChannelSet = "WSB1"

[WarmStandbyGroup.WarmStandbyList.WSB1]
StartingActiveServer = "SrvA"
StandbyServerSet = "SrvB, SrvMissing"
WarmStandbyMode = "ServiceBased"

[WarmStandbyServerInfoGroup.WarmStandbyServerInfoList.SrvA]
Channel = "A"
PerServiceNameSet = "FEED"

[WarmStandbyServerInfoGroup.WarmStandbyServerInfoList.SrvB]
Channel = "B"

[WarmStandbyServerInfoGroup.WarmStandbyServerInfoList.SrvMissing]
Channel = "Nope"

[ChannelGroup.ChannelList.A]
ChannelType = "Socket"
Host = "active"

[ChannelGroup.ChannelList.B]
ChannelType = "Socket"
Host = "standby"
"#,
    )
    .unwrap();
    let resolved = resolve(&store, &CallOverrides::default(), "Prices", 1).unwrap();
    let config = resolved.config;

    let group = &config.warm_standby_set[0];
    assert!(group.starting_active.is_some());
    // SrvMissing references an unknown channel and is dropped from the
    // standby set.
    assert_eq!(group.standby_set.len(), 1);
    assert_eq!(group.standby_set[0].name, "SrvB");

    // Channels reached via warm standby land in their own collection and
    // are not merged into the primary set.
    assert_eq!(config.channel_set_for_warm_standby.len(), 2);
    assert!(config.channel_set.is_empty());
}
