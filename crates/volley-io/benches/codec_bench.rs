use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use volley_core::math::Vec3;
use volley_core::world::{OutgoingCommand, RigidBodyState, WorldSnapshot};
use volley_io::{WireCodec, WireFormat};

fn arena_snapshot() -> WorldSnapshot {
    let ids = [
        "wall_top", "wall_bottom", "wall_front", "wall_back", "paddle1", "paddle2", "ball",
    ];
    let bodies = ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            RigidBodyState::from_extents(
                *id,
                Vec3::new(i as f32, -(i as f32), 0.5),
                Vec3::new(-10.0, 1.0, 0.0),
                Vec3::ONE,
                1.0,
                0.9,
                *id == "ball",
            )
        })
        .collect();

    WorldSnapshot {
        bodies,
        simulation_time: 42.0,
        score_player1: 1,
        score_player2: 2,
    }
}

fn bench_codec(c: &mut Criterion) {
    let snapshot = arena_snapshot();
    let command = OutgoingCommand::from_body(&snapshot.bodies[4], Vec3::new(0.0, 15.0, 0.0));

    let mut group = c.benchmark_group("Wire Codec");

    for format in [WireFormat::MessagePack, WireFormat::Bincode] {
        let codec = WireCodec::new(format);
        let Ok(encoded) = codec.encode_snapshot(&snapshot) else {
            continue;
        };

        group.bench_function(format!("decode_snapshot/{format}"), |b| {
            b.iter(|| black_box(codec.decode_snapshot(black_box(&encoded))).is_ok());
        });

        group.bench_function(format!("encode_command/{format}"), |b| {
            b.iter(|| black_box(codec.encode_command(black_box(&command))).is_ok());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
