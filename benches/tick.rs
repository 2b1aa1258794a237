use std::time::Duration;

use criterion::*;
use rand::Rng;
use tickgraph::system::Access;
use tickgraph::{tracer, world, View, World};

struct Position([f64; 3]);
struct Velocity([f64; 3]);
struct Health(f64);

fn populate(world: &mut World, num_entities: u64) {
    let mut rng = rand::thread_rng();
    for _ in 0..num_entities {
        let entity = world.create_entity();
        world.emplace(entity, Position([(); 3].map(|()| rng.gen_range(-65536.0..=65536.0))));
        world.emplace(entity, Velocity([(); 3].map(|()| rng.gen_range(-65536.0..=65536.0))));
        world.emplace(entity, Health(rng.gen_range(0.0..=100.0)));
    }
}

fn build_view(concurrency: usize) -> World {
    let mut builder = world::Builder::new(concurrency);
    builder.schedule_fn(
        "integrate",
        [Access::write::<Position>(), Access::read::<Velocity>()],
        |args| {
            let mut positions = args.write::<Position>();
            let velocities = args.read::<Velocity>();
            View::new((&mut *positions, &*velocities)).each(|_, (p, v)| {
                for i in 0..3 {
                    p.0[i] += v.0[i];
                }
            });
            Ok(())
        },
    );
    builder.schedule_fn("regen", [Access::write::<Health>()], |args| {
        args.write::<Health>().as_mut_slice().iter_mut().for_each(|h| h.0 = (h.0 + 1.0).min(100.0));
        Ok(())
    });
    builder.build().expect("systems should organize without errors")
}

fn build_subdivided(concurrency: usize) -> World {
    let mut builder = world::Builder::new(concurrency);
    builder.schedule_fn("damp", [Access::write::<Velocity>()], |args| {
        let mut velocities = args.write::<Velocity>();
        args.subdivider().for_each_chunk_mut(velocities.as_mut_slice(), |_, chunk| {
            for v in chunk {
                v.0 = v.0.map(|x| x * 0.99);
            }
        });
        Ok(())
    });
    builder.build().expect("systems should organize without errors")
}

fn tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    group.measurement_time(Duration::from_secs(10));

    for log_entities in (4..=16).step_by(4) {
        let num_entities = 1 << log_entities;
        group.throughput(Throughput::Elements(num_entities));

        for concurrency in [0, 4] {
            for (name, build) in [
                ("view", build_view as fn(usize) -> World),
                ("subdivided", build_subdivided),
            ] {
                group.bench_with_input(
                    BenchmarkId::new(
                        format!("{name}/{concurrency} workers"),
                        format!("{num_entities} entities"),
                    ),
                    &num_entities,
                    |b, &num_entities| {
                        let mut world = build(concurrency);
                        populate(&mut world, num_entities);
                        b.iter(|| {
                            world.execute(&tracer::Noop).expect("systems do not fail");
                        })
                    },
                );
            }
        }
    }
}

criterion_group!(benches, tick);
criterion_main!(benches);
