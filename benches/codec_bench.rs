use bytes::BytesMut;
use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use radar_hub_protocol::{
    HubMessage, HubProtocol, Payload, PayloadType, PlayerCategory, RadarPlayer, RadarUpdate,
    StaticBinder, Vector2, Vector3,
};

fn update_with(players: usize) -> RadarUpdate {
    RadarUpdate {
        version: 1,
        in_game: true,
        map_id: Some("interchange".into()),
        players: (0..players)
            .map(|n| RadarPlayer {
                name: format!("player-{n}"),
                category: PlayerCategory::Player,
                is_active: true,
                is_alive: true,
                position: Vector3::new(n as f32, 1.5, -(n as f32)),
                rotation: Vector2::new(45.0, 0.0),
            })
            .collect(),
    }
}

#[allow(clippy::unwrap_used)]
fn bench_frame_encode_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_encode_decode");
    let protocol = HubProtocol::default();
    let binder = StaticBinder::new();
    binder
        .bind_invocation("radar", PayloadType::of::<RadarUpdate>())
        .unwrap();

    let player_counts = [0usize, 8, 32, 128];
    for &count in &player_counts {
        let message = HubMessage::StreamItem {
            invocation_id: "radar".into(),
            item: Payload::new(update_with(count)),
        };
        let frame = protocol.message_bytes(&message).unwrap();
        group.throughput(Throughput::Bytes(frame.len() as u64));

        group.bench_function(format!("encode_{count}_players"), |b| {
            b.iter_batched(
                || BytesMut::with_capacity(frame.len()),
                |mut buf| protocol.write_message(&message, &mut buf).unwrap(),
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("decode_{count}_players"), |b| {
            b.iter_batched(
                || BytesMut::from(&frame[..]),
                |mut buf| {
                    let decoded = protocol.try_parse_message(&mut buf, &binder).unwrap();
                    assert!(decoded.is_some());
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.bench_function("ping_round_trip", |b| {
        let mut buf = BytesMut::with_capacity(16);
        b.iter(|| {
            protocol.write_message(&HubMessage::Ping, &mut buf).unwrap();
            protocol.try_parse_message(&mut buf, &binder).unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_frame_encode_decode);
criterion_main!(benches);
