use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::StatefulWidget;
use tui_tree_filter::{
    search_tree, FilterTree, SearchConfig, TracingNotifier, Tree, TreeItem, TreeState,
};

const WORDS: [&str; 8] = [
    "Alfa", "Bravo", "Charlie", "Delta", "Echo", "Foxtrot", "Golf", "Hotel",
];

/// 8 top level nodes, 8 children each, 8 grandchildren each and 8 below that: 4680 nodes.
fn large_items() -> Vec<TreeItem> {
    fn level(prefix: &str, depth: usize) -> Vec<TreeItem> {
        WORDS
            .iter()
            .enumerate()
            .map(|(index, word)| {
                let name = format!("{prefix}{word} {index}");
                if depth == 0 {
                    TreeItem::new_leaf(index.to_string(), name)
                } else {
                    let children = level(&format!("{name} / "), depth - 1);
                    TreeItem::new(index.to_string(), name, children)
                        .expect("all item identifiers are unique")
                }
            })
            .collect()
    }
    level("", 3)
}

fn large_tree() -> FilterTree {
    FilterTree::normalized(large_items()).expect("all item identifiers are unique")
}

fn init(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("init");
    group.throughput(Throughput::Elements(1));

    group.bench_function("large", |bencher| {
        bencher.iter_batched(
            large_items,
            |items| black_box(FilterTree::normalized(black_box(items)).unwrap()),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn searches(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("search");
    group.throughput(Throughput::Elements(1)); // Searches per second

    let config = SearchConfig::default();
    let tree = large_tree();
    for keyword in ["Hotel 7 / Hotel 7 / Hotel 7 / Hotel", "Echo", "o", "missing", ""] {
        group.bench_function(format!("{keyword:?}"), |bencher| {
            bencher.iter_batched(
                || tree.clone(),
                |mut tree| {
                    black_box(search_tree(
                        &mut tree,
                        black_box(keyword),
                        &config,
                        &mut TracingNotifier,
                    ))
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn renders(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("render");
    group.throughput(Throughput::Elements(1)); // Frames per second

    let buffer_size = Rect::new(0, 0, 100, 100);

    let tree = large_tree();
    group.bench_function("collapsed", |bencher| {
        bencher.iter_batched(
            TreeState::default,
            |mut state| {
                let mut buffer = Buffer::empty(buffer_size);
                Tree::new(black_box(&tree)).render(
                    buffer_size,
                    black_box(&mut buffer),
                    &mut state,
                );
            },
            BatchSize::SmallInput,
        );
    });

    let mut tree = large_tree();
    search_tree(&mut tree, "Echo", &SearchConfig::default(), &mut TracingNotifier).unwrap();
    group.bench_function("search-result", |bencher| {
        bencher.iter_batched(
            TreeState::default,
            |mut state| {
                let mut buffer = Buffer::empty(buffer_size);
                Tree::new(black_box(&tree)).render(
                    buffer_size,
                    black_box(&mut buffer),
                    &mut state,
                );
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

/// Create flamegraphs with `cargo bench --bench bench -- --profile-time=5`
#[cfg(unix)]
fn profiled() -> Criterion {
    use pprof::criterion::{Output, PProfProfiler};
    Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}
#[cfg(not(unix))]
fn profiled() -> Criterion {
    Criterion::default()
}

criterion_group! {
    name = benches;
    config = profiled();
    targets = init, searches, renders
}
criterion_main!(benches);
