//! Benchmarks for bundle store operations

use std::io::Write;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use jbundle::{BundleStore, Config, MemFs};

fn populate(store: &mut BundleStore, count: usize) {
    for i in 0..count {
        let mut writer = store.create_file(&format!("dir\\file{i}.dat")).unwrap();
        writer.write_all(&[0u8; 64]).unwrap();
        writer.close().unwrap();
    }
}

fn store_benchmarks(c: &mut Criterion) {
    c.bench_function("create_100_files", |b| {
        b.iter(|| {
            let fs = MemFs::new();
            let mut store = BundleStore::create("bench.jbd", &fs, Config::default()).unwrap();
            populate(&mut store, 100);
            black_box(store);
        })
    });

    c.bench_function("lookup_among_1000_files", |b| {
        let fs = MemFs::new();
        let mut store = BundleStore::create("bench.jbd", &fs, Config::default()).unwrap();
        populate(&mut store, 1000);
        b.iter(|| black_box(store.read_file("dir\\file500.dat").unwrap()))
    });

    c.bench_function("enumerate_1000_files", |b| {
        let fs = MemFs::new();
        let mut store = BundleStore::create("bench.jbd", &fs, Config::default()).unwrap();
        populate(&mut store, 1000);
        b.iter(|| black_box(store.get_files(None).unwrap()))
    });
}

criterion_group!(benches, store_benchmarks);
criterion_main!(benches);
