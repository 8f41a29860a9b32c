// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use latchwork::{Flag, FlagSet, ValidationGraph};

const ROOT: Flag = Flag::new(0);

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 32) as u32
    }

    fn gen_range_u8(&mut self, upper_exclusive: u8) -> u8 {
        if upper_exclusive == 0 {
            return 0;
        }
        (self.next_u32() % u32::from(upper_exclusive)) as u8
    }
}

/// Builds a full 64-node graph whose edges only point at earlier bits, so
/// the result is a DAG rooted (at worst transitively) at bit 0.
fn build_graph(edges_per_node: u8, seed: u64) -> ValidationGraph {
    let mut graph = ValidationGraph::new();
    let mut rng = Lcg::new(seed);

    for n in 0..64_u8 {
        let mut deps = FlagSet::EMPTY;
        if n > 0 {
            // At least one edge keeps every node reachable from the root.
            deps.insert(Flag::new(rng.gen_range_u8(n)));
            for _ in 1..edges_per_node {
                deps.insert(Flag::new(rng.gen_range_u8(n)));
            }
        }
        graph
            .add_node(Flag::new(n).mask(), deps, FlagSet::EMPTY, |_| {})
            .expect("bits are unique and deps precede their dependents");
    }
    graph
}

fn bench_frame_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("latchwork");
    group.sample_size(50);

    for &edges_per_node in &[1_u8, 4_u8] {
        group.bench_function(format!("register(n=64,e={edges_per_node})"), |b| {
            b.iter(|| black_box(build_graph(edges_per_node, 0x1A7C_0000_0000_0001)));
        });

        group.bench_function(format!("invalidate_root(n=64,e={edges_per_node})"), |b| {
            b.iter_batched(
                || {
                    let mut graph = build_graph(edges_per_node, 0x1A7C_0000_0000_0002);
                    graph.validate_all();
                    graph
                },
                |mut graph| {
                    black_box(graph.invalidate(ROOT.mask()));
                },
                BatchSize::LargeInput,
            );
        });

        // The steady-state per-frame loop: one upstream mutation, one full
        // revalidation. The graph returns to all-valid each iteration.
        group.bench_function(format!("frame_revalidate(n=64,e={edges_per_node})"), |b| {
            let mut graph = build_graph(edges_per_node, 0x1A7C_0000_0000_0003);
            graph.validate_all();
            b.iter(|| {
                black_box(graph.invalidate(ROOT.mask()));
                black_box(graph.validate_all());
            });
        });

        // Targeted validation of a single leaf pulls in only its dependency
        // chain.
        group.bench_function(format!("leaf_validate(n=64,e={edges_per_node})"), |b| {
            let mut graph = build_graph(edges_per_node, 0x1A7C_0000_0000_0004);
            graph.validate_all();
            let leaf = Flag::new(63).mask();
            b.iter(|| {
                black_box(graph.invalidate(ROOT.mask()));
                black_box(graph.validate(leaf));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_frame_validate);
criterion_main!(benches);
