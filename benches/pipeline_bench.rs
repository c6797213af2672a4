//! Benchmarks for sitefmt
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn benchmark_queue_operations(c: &mut Criterion) {
    use sitefmt::pipeline::{Task, TaskQueue};
    use std::path::PathBuf;

    c.bench_function("queue_send_recv", |b| {
        let (sender, receiver) = TaskQueue::new(64).split();

        b.iter(|| {
            let task = Task::new(PathBuf::from("/site/page.html"), Vec::new());
            sender.send(task).unwrap();
            let received = receiver.recv().unwrap();
            black_box(received);
        })
    });
}

fn benchmark_tidy(c: &mut Criterion) {
    use sitefmt::transform::{Tidy, Transform};

    let page: String = (0..500)
        .map(|i| format!("  <div class=\"row-{}\">  \r\n\r\n\r\n    <p>cell</p>\t\r\n", i))
        .collect();
    let tidy = Tidy::default();
    let clean = tidy.apply(page.as_bytes());

    c.bench_function("tidy_messy_page", |b| {
        b.iter(|| black_box(tidy.apply(black_box(page.as_bytes()))))
    });

    c.bench_function("tidy_clean_page", |b| {
        b.iter(|| black_box(tidy.apply(black_box(&clean))))
    });
}

criterion_group!(benches, benchmark_queue_operations, benchmark_tidy);
criterion_main!(benches);
