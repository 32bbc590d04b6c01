//! Criterion comparison of the document output paths over the same in-memory result
//! set, plus one end-to-end SQLite query. Row count comes from `BENCH_ROWS`.

use std::hint::black_box;
use std::sync::LazyLock;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sql_rowdoc::convert::{ConverterSet, FnConverter, to_array_node};
use sql_rowdoc::encode::{self, TextEncoding};
use sql_rowdoc::prelude::*;
use sql_rowdoc::test_utils::{monster_result_set, monsters};
use tokio::runtime::Runtime;

static TOKIO_RUNTIME: LazyLock<Runtime> =
    LazyLock::new(|| Runtime::new().expect("create tokio runtime"));

fn bench_rows() -> usize {
    std::env::var("BENCH_ROWS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1_000)
}

fn encode_paths(c: &mut Criterion) {
    let rows = bench_rows();
    let rs = monster_result_set(rows);
    let node = to_array_node(&rs, &ConverterSet::new()).expect("build array node");

    let mut group = c.benchmark_group("encode_paths");
    group.throughput(Throughput::Elements(rows as u64));

    group.bench_function(BenchmarkId::new("to_array_node", rows), |b| {
        b.iter(|| to_array_node(black_box(&rs), &ConverterSet::new()));
    });
    let upper = ConverterSet::new().with(FnConverter::text("upper", |s| s.to_uppercase()));
    group.bench_function(BenchmarkId::new("to_array_node_converted", rows), |b| {
        b.iter(|| to_array_node(black_box(&rs), &upper));
    });
    for encoding in [TextEncoding::Utf8, TextEncoding::Utf16Le] {
        group.bench_function(BenchmarkId::new(format!("json_{}", encoding.name()), rows), |b| {
            b.iter(|| encode::json_stream(black_box(&node), encoding));
        });
    }
    group.bench_function(BenchmarkId::new("bson_bytes", rows), |b| {
        b.iter(|| encode::bson_bytes(black_box(&node)));
    });
    group.bench_function(BenchmarkId::new("bson_base64", rows), |b| {
        b.iter(|| encode::bson_base64(black_box(&node)));
    });
    group.finish();
}

fn sqlite_query(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("bench_monsters.db");
    let cap = TOKIO_RUNTIME
        .block_on(async {
            let cap = ConfigAndPool::sqlite_builder(path.to_string_lossy())
                .build()
                .await?;
            let conn = cap.get_connection().await?;
            monsters::create_schema(&conn).await?;
            monsters::seed_monsters(&conn).await?;
            Ok::<_, RowDocError>(cap)
        })
        .expect("seed sqlite dataset");

    let cap = &cap;
    let sql = r#"SELECT * FROM "SimpleMonsters" ORDER BY "Id""#;
    let mut group = c.benchmark_group("sqlite_query");
    for buffered in [true, false] {
        group.bench_function(BenchmarkId::new("to_json_string", buffered), |b| {
            b.to_async(&*TOKIO_RUNTIME).iter(|| async move {
                let conn = cap.get_connection().await.expect("checkout");
                conn.query(sql)
                    .buffered(buffered)
                    .to_json_string()
                    .await
                    .expect("query")
            });
        });
    }
    group.finish();
}

criterion_group!(benches, encode_paths, sqlite_query);
criterion_main!(benches);
