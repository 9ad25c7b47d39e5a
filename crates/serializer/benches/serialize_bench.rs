//! 직렬화 엔진 벤치마크
//!
//! 라인 매핑, 컨테이너 인코딩, raw 폴백, 컨테이너 디코딩의 처리량을 측정합니다.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;

use logfwd_serializer::{
    ContainerDecoder, ContainerEncoder, SerializationEngine, SerializerConfig, Serialized,
};

const ACCESS_CONFIG: &str = r#"pattern: (\S+) \S+ \S+ \[([^\]]+)\] "(\w+) (\S+) [^"]*" (\d+) (\d+)
//--AVRO--
{"type":"record","name":"Access","fields":[
  {"name":"client","type":"string"},
  {"name":"time","type":"string"},
  {"name":"method","type":"string"},
  {"name":"path","type":"string"},
  {"name":"status","type":"int"},
  {"name":"bytes","type":"long"}
]}"#;

/// 매칭되는 접근 로그 라인
const ACCESS_LINE: &str = r#"192.168.1.100 - admin [15/Jan/2024:12:00:00 +0000] "GET /api/v1/users HTTP/1.1" 200 5123"#;

/// 매칭되지 않는 라인 (폴백 경로)
const UNMATCHED_LINE: &str = "kernel: [12345.678] eth0: link up, 1000Mbps, full-duplex";

fn engine() -> SerializationEngine<StdRng> {
    let mut engine = SerializationEngine::with_rng(
        SerializerConfig::default(),
        ContainerEncoder::with_rng(StdRng::seed_from_u64(0)),
    );
    engine.configure_from_str(ACCESS_CONFIG);
    engine
}

fn bench_serialize(c: &mut Criterion) {
    let mut engine = engine();

    let mut group = c.benchmark_group("serialize");
    group.throughput(Throughput::Elements(1));

    group.bench_function("encoded", |b| {
        b.iter(|| engine.serialize(black_box(ACCESS_LINE)).unwrap())
    });

    group.bench_function("fallback_raw", |b| {
        b.iter(|| engine.serialize(black_box(UNMATCHED_LINE)).unwrap())
    });

    let mut raw = SerializationEngine::new(SerializerConfig::default());
    group.bench_function("raw_mode", |b| {
        b.iter(|| raw.serialize(black_box(ACCESS_LINE)).unwrap())
    });

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut engine = engine();
    let Ok(Serialized::Encoded(container)) = engine.serialize(ACCESS_LINE) else {
        panic!("benchmark line must encode");
    };
    let decoder = ContainerDecoder::new();

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(container.len() as u64));
    group.bench_function("single_record_container", |b| {
        b.iter(|| decoder.decode(black_box(&container)).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_serialize, bench_decode);
criterion_main!(benches);
