#![no_main]

use libfuzzer_sys::fuzz_target;
use radar_hub_protocol::{
    DecodeOutcome, FrameCodec, PayloadType, RadarUpdate, StaticBinder, Vector3,
};
use std::sync::OnceLock;

static BINDER: OnceLock<StaticBinder> = OnceLock::new();

fn binder() -> &'static StaticBinder {
    BINDER.get_or_init(|| {
        let binder = StaticBinder::new();
        let _ = binder.bind_target("Move", vec![PayloadType::of::<Vector3>()]);
        let _ = binder.bind_invocation("1", PayloadType::of::<RadarUpdate>());
        binder
    })
}

fuzz_target!(|data: &[u8]| {
    // Decode must never panic or claim more bytes than it was given
    let codec = FrameCodec::default();
    if let Ok(DecodeOutcome::Message { consumed, .. }) = codec.try_decode(data, binder()) {
        assert!(consumed <= data.len());
    }
});
