//! Criterion microbenches for seqlabel interpolation and parsing.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure the performance of:
//! - frame interpolation over a densely keyframed sequence
//! - exchange line parsing

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

use seqlabel::import::parse_lines;
use seqlabel::interp::interpolate;
use seqlabel::model::{
    BoundingBox, BoundingBoxSequence, InterpolationKind, InterpolationSegment,
};

/// A sequence with a keyframe every 10 frames and linear segments between.
fn dense_sequence(keyframes: u32) -> BoundingBoxSequence {
    let mut boxes = Vec::new();
    let mut segments = Vec::new();
    for i in 0..keyframes {
        let frame = i * 10;
        boxes.push(BoundingBox::keyframe(
            frame,
            f64::from(i),
            f64::from(i) * 0.5,
            40.0,
            30.0,
        ));
        if i > 0 {
            segments.push(InterpolationSegment::new(
                frame - 10,
                frame,
                InterpolationKind::Linear,
            ));
        }
    }
    BoundingBoxSequence::new(boxes, segments, vec![])
}

/// A small exchange batch for parser throughput.
fn exchange_fixture(lines: usize) -> String {
    let mut out = String::new();
    out.push_str("{\"type\":\"video\",\"data\":{\"id\":\"v1\"}}\n");
    out.push_str("{\"type\":\"world-entity\",\"data\":{\"id\":\"e1\",\"name\":\"Car\"}}\n");
    for i in 0..lines {
        out.push_str(&format!(
            "{{\"type\":\"annotation\",\"data\":{{\"id\":\"a{i}\",\"videoId\":\"v1\",\
             \"kind\":\"object\",\"linkedKind\":\"entity\",\"linkedId\":\"e1\",\
             \"sequence\":{{\"boxes\":[{{\"x\":1.0,\"y\":2.0,\"width\":3.0,\"height\":4.0,\
             \"frameNumber\":0,\"isKeyframe\":true}},{{\"x\":5.0,\"y\":6.0,\"width\":3.0,\
             \"height\":4.0,\"frameNumber\":30,\"isKeyframe\":true}}],\
             \"interpolationSegments\":[{{\"startFrame\":0,\"endFrame\":30,\
             \"kind\":\"linear\"}}],\"totalFrames\":31,\"keyframeCount\":2,\
             \"interpolatedFrameCount\":29}}}}}}\n"
        ));
    }
    out
}

/// Benchmark interpolation across the whole span of a dense sequence.
fn bench_interpolate_dense(c: &mut Criterion) {
    let sequence = dense_sequence(1_000);
    let span = sequence.keyframe_span().unwrap();

    let mut group = c.benchmark_group("interpolate");
    group.throughput(Throughput::Elements(u64::from(span.1 - span.0 + 1)));

    group.bench_function("dense_1000_keyframes", |b| {
        b.iter(|| {
            let mut derived = 0usize;
            for frame in span.0..=span.1 {
                if interpolate(black_box(&sequence), black_box(frame)).is_some() {
                    derived += 1;
                }
            }
            black_box(derived)
        })
    });

    group.finish();
}

/// Benchmark exchange parsing throughput.
fn bench_exchange_parse(c: &mut Criterion) {
    let fixture = exchange_fixture(500);

    let mut group = c.benchmark_group("exchange_parse");
    group.throughput(Throughput::Bytes(fixture.len() as u64));

    group.bench_function("parse_lines_500_annotations", |b| {
        b.iter(|| {
            let records = parse_lines(black_box(fixture.as_bytes())).unwrap();
            black_box(records)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_interpolate_dense, bench_exchange_parse);
criterion_main!(benches);
