//! Search benchmarks on a synthetic street grid.
//!
//! Run with: cargo bench -p urbanroute_core

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use geo::Point;
use petgraph::graph::NodeIndex;
use urbanroute_core::model::{Link, Place, PlaceKind};
use urbanroute_core::routing::{EdgeFilter, astar_emergency, dijkstra};
use urbanroute_core::{NetworkGraph, TimePeriod, TrafficTable, TransportMode};

/// Square grid of `side * side` places 0.01 degrees apart, with a road to
/// the right and downward neighbour of every place.
fn grid(side: usize) -> NetworkGraph {
    let mut network = NetworkGraph::new();
    let mut nodes = Vec::with_capacity(side * side);
    for row in 0..side {
        for col in 0..side {
            let id = format!("{row}-{col}");
            nodes.push(network.add_place(Place {
                id: id.clone(),
                name: id,
                geometry: Point::new(31.0 + col as f64 * 0.01, 30.0 + row as f64 * 0.01),
                kind: PlaceKind::Neighborhood,
                population: Some(10_000.0),
                facility: None,
                district: None,
            }));
        }
    }
    for row in 0..side {
        for col in 0..side {
            let here = nodes[row * side + col];
            if col + 1 < side {
                network.add_link(here, nodes[row * side + col + 1], Link::road(1110.0, 2000.0, 7.0));
            }
            if row + 1 < side {
                network.add_link(here, nodes[(row + 1) * side + col], Link::road(960.0, 2000.0, 7.0));
            }
        }
    }
    network.rebuild_spatial_index();
    network
}

fn bench_searches(c: &mut Criterion) {
    let traffic = TrafficTable::new();
    let mut group = c.benchmark_group("search");
    for side in [10_usize, 30, 60] {
        let network = grid(side);
        let start = NodeIndex::new(0);
        let end = NodeIndex::new(side * side - 1);

        group.bench_with_input(BenchmarkId::new("dijkstra", side), &side, |b, _| {
            b.iter(|| {
                dijkstra(
                    black_box(&network),
                    &traffic,
                    start,
                    end,
                    TransportMode::Car,
                    TimePeriod::Morning,
                    EdgeFilter::NONE,
                )
            });
        });
        group.bench_with_input(BenchmarkId::new("astar_emergency", side), &side, |b, _| {
            b.iter(|| {
                astar_emergency(
                    black_box(&network),
                    &traffic,
                    start,
                    end,
                    TimePeriod::Morning,
                )
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_searches);
criterion_main!(benches);
