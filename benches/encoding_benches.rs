//! Encoding and parsing benchmarks
//!
//! Measures the per-command CPU cost on the client side: building move lines,
//! classifying responses and a full request/response cycle over an in-memory
//! transport.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mappdk::{
    parse_named_values, ClientConfig, MoveCommand, ProtocolRevision, Response, Robot, RobotError,
    Transport,
};

/// Transport that answers every command with the same line.
struct EchoTransport {
    reply: &'static str,
}

impl Transport for EchoTransport {
    fn send_line(&mut self, line: &str) -> mappdk::Result<()> {
        black_box(line);
        Ok(())
    }

    fn recv_line(&mut self) -> mappdk::Result<String> {
        Ok(self.reply.to_string())
    }
}

fn bench_encode_joint_move(c: &mut Criterion) {
    let command = MoveCommand::joint(vec![0.0, -12.5, 30.0, 0.0, -90.0, 180.0])
        .with_velocity(100)
        .with_acceleration(100);

    c.bench_function("encode_joint_move", |b| {
        b.iter(|| black_box(command.encode(ProtocolRevision::Current)))
    });
}

fn bench_encode_pose_move_legacy(c: &mut Criterion) {
    let command = MoveCommand::pose(vec![350.0, -150.0, 280.0, -180.0, 0.0, 90.0])
        .with_velocity(200)
        .with_blend(50)
        .with_linear(true);

    c.bench_function("encode_pose_move_legacy", |b| {
        b.iter(|| black_box(command.encode(ProtocolRevision::Legacy)))
    });
}

fn bench_parse_response(c: &mut Criterion) {
    c.bench_function("parse_response", |b| {
        b.iter(|| black_box(Response::parse(black_box("0:Move complete"))))
    });
}

fn bench_parse_pose_payload(c: &mut Criterion) {
    let payload = "X=350.0,Y=-150.0,Z=280.0,W=-180.0,P=0.0,R=90.0,E1=none";

    c.bench_function("parse_pose_payload", |b| {
        b.iter(|| black_box(parse_named_values(black_box(payload))))
    });
}

fn bench_move_roundtrip(c: &mut Criterion) {
    let mut robot = Robot::with_config(ClientConfig::new("Fanuc", "127.0.0.1"));
    robot
        .connect_with(EchoTransport { reply: "0:ok" })
        .expect("handshake");
    let command = MoveCommand::joint(vec![0.0; 6]);

    c.bench_function("move_roundtrip", |b| {
        b.iter(|| {
            let response: Result<Response, RobotError> = robot.move_robot(&command, false);
            black_box(response)
        })
    });
}

criterion_group!(
    benches,
    bench_encode_joint_move,
    bench_encode_pose_move_legacy,
    bench_parse_response,
    bench_parse_pose_payload,
    bench_move_roundtrip
);
criterion_main!(benches);
