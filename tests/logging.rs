//! Subscriber installation runs in its own test binary since it sets
//! process-global state.

#![allow(clippy::expect_used)]

use radar_hub_protocol::config::LoggingConfig;
use radar_hub_protocol::utils::logging::init_logging;
use radar_hub_protocol::utils::metrics::global_metrics;
use radar_hub_protocol::{ErrorKind, HubMessage, HubProtocol};

#[test]
fn test_logging_installs_once() {
    let config = LoggingConfig {
        json_format: true,
        ..LoggingConfig::default()
    };
    init_logging(&config).expect("first install succeeds");

    let err = init_logging(&config).expect_err("second install fails");
    assert_eq!(err.kind(), ErrorKind::Config);

    // Encoding with a subscriber installed emits events and updates metrics
    radar_hub_protocol::init();
    let before = global_metrics().snapshot().frames_encoded;
    HubProtocol::default()
        .message_bytes(&HubMessage::Ping)
        .expect("ping encodes");
    assert!(global_metrics().snapshot().frames_encoded > before);
    global_metrics().log_metrics();
}
