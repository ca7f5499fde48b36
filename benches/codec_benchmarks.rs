//! Codec and assembly benchmarks
//!
//! - `key_*`: key encode/decode
//! - `value_*`: value serialize/deserialize per variant
//! - `assemble/*`: documents rebuilt from sorted Store entries
//!
//! ## Running
//!
//! ```bash
//! cargo bench --bench codec_benchmarks
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use docstore::{encode_key, marker_key, StoreEntry, Value};
use docstore_engine::assembler::next_document;

fn bench_keys(c: &mut Criterion) {
    let key = encode_key("user:000123", "display_name");

    c.bench_function("key_encode", |b| {
        b.iter(|| encode_key(black_box("user:000123"), black_box("display_name")))
    });
    c.bench_function("key_decode", |b| {
        b.iter(|| docstore::decode_key(black_box(&key)))
    });
}

fn bench_values(c: &mut Criterion) {
    let values = [
        ("string", Value::from("hello world!")),
        ("int", Value::Int(10)),
        ("float", Value::Float(10.5)),
        ("binary_1k", Value::Binary(vec![0xAB; 1024])),
    ];

    let mut group = c.benchmark_group("value_codec");
    for (name, value) in &values {
        let bytes = value.to_bytes();
        group.bench_with_input(BenchmarkId::new("serialize", name), value, |b, v| {
            b.iter(|| black_box(v).to_bytes())
        });
        group.bench_with_input(BenchmarkId::new("deserialize", name), &bytes, |b, bytes| {
            b.iter(|| Value::from_bytes(black_box(bytes)))
        });
    }
    group.finish();
}

fn entries(docs: usize, properties: usize) -> Vec<StoreEntry> {
    let mut entries = Vec::with_capacity(docs * (properties + 1));
    for d in 0..docs {
        let docid = format!("doc{:06}", d);
        entries.push(StoreEntry::new(
            marker_key(&docid),
            Value::Iri(docid.clone()).to_bytes(),
        ));
        for p in 0..properties {
            entries.push(StoreEntry::new(
                encode_key(&docid, &format!("p{:03}", p)),
                Value::Int(p as i64).to_bytes(),
            ));
        }
    }
    entries
}

fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble");
    for properties in [1usize, 8, 64] {
        let input = entries(1000, properties);
        group.throughput(Throughput::Elements(input.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(properties),
            &input,
            |b, input| {
                b.iter(|| {
                    let mut iter = input.clone().into_iter().peekable();
                    let mut count = 0usize;
                    while let Ok(Some(_)) = next_document(&mut iter) {
                        count += 1;
                    }
                    count
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_keys, bench_values, bench_assemble);
criterion_main!(benches);
