//! Load/sort, plot building and selection over a synthetic materials table.
//!
//! Run with: `cargo bench`

use std::fmt::Write as _;
use std::path::PathBuf;

use co2_explorer::data::loader::parse_dataset;
use co2_explorer::plot::build_plot;
use co2_explorer::selection::on_select;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn synthetic_table(rows: usize) -> String {
    let mut csv = String::from("material,capacity,surface_area,pore_volume,doi\n");
    for i in 0..rows {
        // Deterministic scatter so the sort has real work to do.
        let capacity = ((i * 7919) % 1000) as f64 / 100.0;
        let _ = writeln!(
            csv,
            "material-{i},{capacity},{},{:.2},10.5555/bench.{i}",
            500 + (i % 2000),
            (i % 90) as f64 / 100.0
        );
    }
    csv
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    for rows in [100usize, 10_000] {
        let table = synthetic_table(rows);
        group.throughput(Throughput::Elements(rows as u64));

        group.bench_function(format!("load_sort_{rows}"), |bencher| {
            bencher.iter(|| {
                parse_dataset(PathBuf::from("bench.csv"), black_box(table.as_bytes()), b',')
                    .expect("synthetic table should parse")
            })
        });

        let dataset = parse_dataset(PathBuf::from("bench.csv"), table.as_bytes(), b',')
            .expect("synthetic table should parse");
        group.bench_function(format!("build_plot_{rows}"), |bencher| {
            bencher.iter(|| build_plot(black_box(&dataset)))
        });
        group.bench_function(format!("select_{rows}"), |bencher| {
            bencher.iter(|| on_select(black_box(&dataset), black_box(rows / 2)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
