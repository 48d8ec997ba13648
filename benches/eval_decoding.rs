//! Benchmarks for evaluation-reply decoding
//!
//! This benchmark measures:
//! - Per-line routing for both protocol revisions
//! - Whole-payload decoding from memory
//! - Lazy decoding over a chunked byte stream

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use langroid_client::pipeline::{create_decoder, decode_bytes, decode_stream, LineDecoder, RoutingKey};
use langroid_client::protocol::ProtocolRevision;
use langroid_client::{BoxStream, EvaluationRecords};

const TYPED_LINE: &str = r#"{"type":"EVAL","candidate":"resume.pdf","requirement":"Five years of Rust","verdict":"met","evidence":"Eight years of Rust, maintainer of a tokio-based proxy."}"#;
const TAGGED_LINE: &str = r#"EVAL {"candidate":"resume.pdf","requirement":"Five years of Rust","verdict":"met","evidence":"Eight years of Rust, maintainer of a tokio-based proxy."}"#;

/// N candidates x K requirements, one SCORE line after each candidate's evals.
fn typed_payload(candidates: usize, requirements: usize) -> String {
    let mut out = String::new();
    for c in 0..candidates {
        for r in 0..requirements {
            out.push_str(&format!(
                r#"{{"type":"EVAL","candidate":{c},"requirement":{r},"verdict":"partially met","evidence":"lorem ipsum dolor sit amet"}}"#
            ));
            out.push('\n');
        }
        out.push_str(&format!(r#"{{"type":"SCORE","candidate":{c},"score":0.75}}"#));
        out.push('\n');
    }
    out
}

fn bench_line_routing(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_routing");
    group.throughput(Throughput::Bytes(TYPED_LINE.len() as u64));

    let typed = create_decoder(ProtocolRevision::Current, RoutingKey::Strip);
    group.bench_function("typed_strip", |b| {
        b.iter(|| typed.decode_line(black_box(TYPED_LINE)).unwrap())
    });

    let retained = create_decoder(ProtocolRevision::Current, RoutingKey::Retain);
    group.bench_function("typed_retain", |b| {
        b.iter(|| retained.decode_line(black_box(TYPED_LINE)).unwrap())
    });

    let tagged = create_decoder(ProtocolRevision::Legacy, RoutingKey::Strip);
    group.bench_function("tagged", |b| {
        b.iter(|| tagged.decode_line(black_box(TAGGED_LINE)).unwrap())
    });

    group.finish();
}

fn bench_payload_decoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("payload_decoding");
    let payload = typed_payload(20, 25);
    group.throughput(Throughput::Bytes(payload.len() as u64));

    group.bench_function("decode_bytes", |b| {
        b.iter(|| {
            decode_bytes(
                black_box(payload.as_bytes()),
                create_decoder(ProtocolRevision::Current, RoutingKey::Strip),
            )
            .unwrap()
        })
    });

    let rt = tokio::runtime::Runtime::new().unwrap();
    let chunks: Vec<Bytes> = payload
        .as_bytes()
        .chunks(1024)
        .map(Bytes::copy_from_slice)
        .collect();
    group.bench_function("decode_stream_1k_chunks", |b| {
        b.to_async(&rt).iter(|| async {
            let input: BoxStream<'static, Bytes> =
                Box::pin(futures::stream::iter(chunks.clone().into_iter().map(Ok)));
            let records = EvaluationRecords::try_collect_stream(decode_stream(
                input,
                create_decoder(ProtocolRevision::Current, RoutingKey::Strip),
            ))
            .await
            .unwrap();
            black_box(records)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_line_routing, bench_payload_decoding);
criterion_main!(benches);
