use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use prism_icc::{
    IntegerSource, ResultSink, SharedIntegerSource, SharedIntegerWriter, SharedResultSink,
    bytes_for_ints, bytes_for_records,
};
use prism_perf::temp_shm_path;

const CAPACITY: usize = 65536;

fn bench_source_next(c: &mut Criterion) {
    let path = temp_shm_path("crit_next");
    let mut writer = SharedIntegerWriter::create(&path, bytes_for_ints(CAPACITY))
        .expect("failed to create writer");
    // fill every cell so the reader never sees the sentinel or an idle slot
    for i in 0..CAPACITY {
        writer.put(i as i32 + 1);
    }
    let mut source = SharedIntegerSource::open(&path).expect("failed to open source");

    let mut group = c.benchmark_group("shared_regions");
    group.throughput(Throughput::Elements(1));

    group.bench_function("source_next", |b| {
        b.iter(|| black_box(source.next()));
    });

    drop(group);
    drop(source);
    drop(writer);
    let _ = std::fs::remove_file(&path);
}

fn bench_sink_write(c: &mut Criterion) {
    let path = temp_shm_path("crit_write");
    let mut sink = SharedResultSink::create(&path, bytes_for_records(CAPACITY))
        .expect("failed to create sink");

    let mut group = c.benchmark_group("shared_regions");
    group.throughput(Throughput::Elements(1));

    let mut n = 0i32;
    group.bench_function("sink_write", |b| {
        b.iter(|| {
            n = n.wrapping_add(1);
            sink.write(black_box(n), black_box(n & 1 == 1));
        });
    });

    drop(group);
    drop(sink);
    let _ = std::fs::remove_file(&path);
}

criterion_group!(benches, bench_source_next, bench_sink_write);
criterion_main!(benches);
