//! Example: Broadcasting radar snapshots over a hub connection
//!
//! A producer stamps radar updates and streams them as `StreamItem` frames;
//! a consumer decodes them through `FramedRead` and drops stale versions.
//! Both ends share an in-memory duplex pipe in place of a socket.
//!
//! Run with: `cargo run --example radar_broadcast`

#![allow(clippy::uninlined_format_args)]

use futures::{SinkExt, StreamExt};
use radar_hub_protocol::{
    HubMessage, HubProtocol, Payload, PayloadType, PlayerCategory, RadarPlayer, RadarUpdate,
    StaticBinder, UpdateSequencer, Vector2, Vector3, VersionGate,
};
use std::sync::Arc;
use tokio_util::codec::{FramedRead, FramedWrite};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    radar_hub_protocol::init();

    let protocol = HubProtocol::default();
    println!(
        "Protocol: {} v{} ({:?})",
        protocol.name(),
        protocol.version(),
        protocol.transfer_format()
    );

    // Both ends know the stream "radar" yields RadarUpdate items
    let binder = Arc::new(StaticBinder::new());
    binder.bind_invocation("radar", PayloadType::of::<RadarUpdate>())?;

    let (producer_io, consumer_io) = tokio::io::duplex(4096);

    let producer_protocol = protocol.clone();
    let producer_binder = Arc::clone(&binder);
    let producer = tokio::spawn(async move {
        let mut sink = FramedWrite::new(producer_io, producer_protocol.codec(producer_binder));
        let sequencer = UpdateSequencer::new();

        for tick in 0..5u8 {
            let players = vec![RadarPlayer {
                name: "operator".to_string(),
                category: PlayerCategory::LocalPlayer,
                is_active: true,
                is_alive: true,
                position: Vector3::new(f32::from(tick) * 2.5, 0.0, 10.0),
                rotation: Vector2::new(90.0, 0.0),
            }];
            let update = sequencer.stamp(true, Some("customs".to_string()), players);
            sink.send(HubMessage::StreamItem {
                invocation_id: "radar".to_string(),
                item: Payload::new(update),
            })
            .await?;
        }

        sink.send(HubMessage::empty_completion("radar")).await?;
        Ok::<_, radar_hub_protocol::ProtocolError>(())
    });

    let mut stream = FramedRead::new(consumer_io, protocol.codec(binder));
    let mut gate = VersionGate::new();
    while let Some(message) = stream.next().await {
        match message? {
            HubMessage::StreamItem { item, .. } => {
                if let Some(update) = item.downcast_ref::<RadarUpdate>() {
                    if gate.admit(update) {
                        println!(
                            "v{} on {:?}: {} player(s), first at {:?}",
                            update.version,
                            update.map_id,
                            update.players.len(),
                            update.players.first().map(|p| p.position)
                        );
                    }
                }
            }
            HubMessage::Completion { invocation_id, .. } => {
                println!("Stream {} completed", invocation_id);
                break;
            }
            other => println!("Ignoring {:?}", other.message_type()),
        }
    }

    producer.await??;
    println!("Dropped {} stale update(s)", gate.dropped());
    Ok(())
}
