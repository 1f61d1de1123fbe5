use criterion::{black_box, criterion_group, criterion_main, Criterion};
use grid_astar::{GridLayout, GridSize, GridView, LinkedGrid, OffloadedBackend, Position, SynchronousBackend};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn shuffled_grid(side: usize) -> (GridLayout, Position, Position) {
    let mut rng = StdRng::seed_from_u64(0xA57A);
    let size = GridSize::new(side, side);
    let layout = GridLayout::random(size, 0.25, &mut rng).unwrap();
    (layout, Position::new(0, 0), Position::new(side - 1, side - 1))
}

fn bench_grid(c: &mut Criterion, side: usize) {
    let (layout, start, goal) = shuffled_grid(side);
    let mut linked = LinkedGrid::from_layout(&layout).unwrap();
    let snapshot = linked.snapshot();
    let mut offloaded = OffloadedBackend::new();

    c.bench_function(&format!("synchronous_{}x{}", side, side), |b| {
        b.iter(|| {
            SynchronousBackend::new(&mut linked)
                .search(black_box(start), black_box(goal))
                .unwrap()
        })
    });

    c.bench_function(&format!("offloaded_{}x{}", side, side), |b| {
        b.iter(|| {
            let handle = offloaded
                .dispatch(snapshot.cells(), snapshot.size(), black_box(start), black_box(goal))
                .unwrap();
            offloaded.join(handle).unwrap()
        })
    });
}

pub fn grid_small(c: &mut Criterion) {
    bench_grid(c, 16);
}

pub fn grid_medium(c: &mut Criterion) {
    bench_grid(c, 48);
}

criterion_group!(benches, grid_small, grid_medium);
criterion_main!(benches);
