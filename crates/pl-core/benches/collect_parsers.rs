//! Criterion benchmarks for row decoding in `pl-core`.
//!
//! Inputs are canned utility output so the benchmarks run anywhere.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pl_core::collect::{collect_records, parse_line, QueryMode, Schema};

fn bench_parse_line(c: &mut Criterion) {
    let rows = [
        (
            QueryMode::Default,
            r#""notepad.exe","1234","Console","1","6,000 K""#,
        ),
        (
            QueryMode::Verbose,
            r#""explorer.exe","4321","Console","1","120,512 K","Running","HOST\alice","0:12:34","Program Manager""#,
        ),
        (
            QueryMode::Modules,
            r#""svchost.exe","1000","ntdll.dll,KERNEL32.DLL,KERNELBASE.dll,RPCRT4.dll,combase.dll""#,
        ),
    ];

    let mut group = c.benchmark_group("collect_parsers");

    for (mode, line) in rows {
        let schema = Schema::for_mode(mode);
        group.bench_with_input(
            BenchmarkId::new("parse_line", mode.to_string()),
            &line,
            |b, input| {
                b.iter(|| black_box(parse_line(black_box(input), &schema)));
            },
        );
    }

    group.finish();
}

fn bench_collect_records(c: &mut Criterion) {
    // A busy machine's worth of rows.
    let mut stream = String::new();
    for pid in 0..2_000u32 {
        stream.push_str(&format!(
            "\"proc{}.exe\",\"{}\",\"Services\",\"0\",\"{} K\"\r\n",
            pid,
            pid,
            pid * 12
        ));
    }
    let schema = Schema::for_mode(QueryMode::Default);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");

    c.bench_function("collect_parsers/collect_records_2000", |b| {
        b.iter(|| {
            let collected = runtime
                .block_on(collect_records(black_box(stream.as_bytes()), &schema))
                .expect("in-memory read");
            black_box(collected);
        })
    });
}

criterion_group!(benches, bench_parse_line, bench_collect_records);
criterion_main!(benches);
