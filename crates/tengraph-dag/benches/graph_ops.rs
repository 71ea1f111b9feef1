//! Benchmarks for DAG submission and frontier queries

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::sync::Arc;
use tengraph_core::{ElementType, TensorOperation, TensorRef};
use tengraph_dag::TensorGraph;

fn bench_add_operation_chain(c: &mut Criterion) {
    // Worst case for the epoch table: every operation writes the same tensor,
    // so each submission replaces the write epoch and adds one edge.
    c.bench_function("add_operation/chain_1000", |b| {
        let t = TensorRef::new("T", &[64, 64], ElementType::F64);
        b.iter(|| {
            let graph = TensorGraph::new();
            for _ in 0..1000 {
                graph
                    .add_operation(Arc::new(TensorOperation::assign(t.clone())))
                    .unwrap();
            }
            black_box(graph.num_dependencies())
        })
    });
}

fn bench_add_operation_fanout(c: &mut Criterion) {
    // One writer, many readers: the read epoch grows but no reader depends
    // on another.
    c.bench_function("add_operation/fanout_1000", |b| {
        let a = TensorRef::new("A", &[64, 64], ElementType::F64);
        b.iter(|| {
            let graph = TensorGraph::new();
            graph
                .add_operation(Arc::new(TensorOperation::assign(a.clone())))
                .unwrap();
            for i in 0..1000 {
                let out = TensorRef::new(format!("C{}", i), &[64, 64], ElementType::F64);
                let b_in = TensorRef::new(format!("B{}", i), &[64, 64], ElementType::F64);
                let op = TensorOperation::contract(out, a.clone(), b_in, "").unwrap();
                graph.add_operation(Arc::new(op)).unwrap();
            }
            black_box(graph.num_dependencies())
        })
    });
}

fn bench_frontier(c: &mut Criterion) {
    let graph = TensorGraph::new();
    for i in 0..1000 {
        let t = TensorRef::new(format!("T{}", i), &[8, 8], ElementType::F64);
        graph
            .add_operation(Arc::new(TensorOperation::assign(t)))
            .unwrap();
    }
    c.bench_function("frontier/independent_1000", |b| {
        b.iter(|| black_box(graph.frontier()))
    });
}

criterion_group!(
    benches,
    bench_add_operation_chain,
    bench_add_operation_fanout,
    bench_frontier
);
criterion_main!(benches);
