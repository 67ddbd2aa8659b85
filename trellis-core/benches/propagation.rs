//! Benchmarks for write propagation through the scheduler.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trellis_core::{Container, Runtime, Task, Value};

fn observed(runtime: &Runtime) -> Container {
    runtime
        .observe_container(&Container::new().with("source", 0).with("sink", 0))
        .unwrap()
}

fn bench_observe(c: &mut Criterion) {
    let mut group = c.benchmark_group("observe");

    for size in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("flat", size), &size, |b, &size| {
            let runtime = Runtime::new();
            b.iter(|| {
                let container: Container =
                    (0..size).map(|i| (format!("k{i}"), i as u32)).collect();
                runtime.observe_container(black_box(&container)).unwrap()
            })
        });
    }

    group.finish();
}

fn bench_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("fan_out");

    for size in [1, 10, 100, 1000] {
        let runtime = Runtime::new();
        let container = observed(&runtime);
        for _ in 0..size {
            let source = container.clone();
            runtime
                .computed(&Task::new(move || {
                    black_box(source.get("source"));
                    Ok(())
                }))
                .unwrap();
        }

        group.bench_with_input(BenchmarkId::new("write", size), &container, |b, container| {
            let mut n = 0u32;
            b.iter(|| {
                n = n.wrapping_add(1);
                container.set("source", Value::from(n)).unwrap()
            })
        });
    }

    group.finish();
}

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain");

    for depth in [1, 10, 100] {
        let runtime = Runtime::new();
        let container: Container = (0..=depth).map(|i| (format!("k{i}"), 0)).collect();
        let container = runtime.observe_container(&container).unwrap();

        for i in 0..depth {
            let link = container.clone();
            runtime
                .computed(&Task::new(move || {
                    let value = link.get(&format!("k{i}"));
                    link.set(&format!("k{}", i + 1), value)
                }))
                .unwrap();
        }

        group.bench_with_input(BenchmarkId::new("write", depth), &container, |b, container| {
            let mut n = 0u32;
            b.iter(|| {
                n = n.wrapping_add(1);
                container.set("k0", Value::from(n)).unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_observe, bench_fan_out, bench_chain);
criterion_main!(benches);
