//! A particle simulation must reach the same state regardless of the worker count.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tickgraph::context::FixedDelta;
use tickgraph::system::Access;
use tickgraph::{world, Entity, View, World};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Position([f32; 2]);

#[derive(Debug, Clone, Copy, PartialEq)]
struct Velocity([f32; 2]);

#[derive(Debug, Clone, Copy, PartialEq)]
struct Lifetime(u32);

const GRAVITY: f32 = -9.8;
const TICKS: usize = 300;

fn build(concurrency: usize) -> World {
    let mut builder = world::Builder::new(concurrency);

    let mut rng = StdRng::seed_from_u64(7);
    builder.schedule_fn("emit", [], move |args| {
        for _ in 0..rng.gen_range(1..4) {
            let velocity = Velocity([rng.gen_range(-1.0..1.0), rng.gen_range(5.0..10.0)]);
            let lifetime = Lifetime(rng.gen_range(10..60));
            args.commands().spawn((Position([0.0, 0.0]), velocity, lifetime));
        }
        Ok(())
    });

    builder.schedule_fn("gravity", [Access::write::<Velocity>()], |args| {
        let dt = args.context().get::<FixedDelta>().seconds;
        let mut velocities = args.write::<Velocity>();
        args.subdivider().for_each_chunk_mut(velocities.as_mut_slice(), |_, chunk| {
            for velocity in chunk {
                velocity.0[1] += GRAVITY * dt;
            }
        });
        Ok(())
    });

    builder.schedule_fn(
        "integrate",
        [Access::write::<Position>(), Access::read::<Velocity>()],
        |args| {
            let dt = args.context().get::<FixedDelta>().seconds;
            let mut positions = args.write::<Position>();
            let velocities = args.read::<Velocity>();
            View::new((&mut *positions, &*velocities)).each(|_, (position, velocity)| {
                position.0[0] += velocity.0[0] * dt;
                position.0[1] += velocity.0[1] * dt;
            });
            Ok(())
        },
    );

    builder.schedule_fn("age", [Access::write::<Lifetime>()], |args| {
        let mut dead = Vec::new();
        for (entity, lifetime) in args.write::<Lifetime>().iter_mut() {
            lifetime.0 = lifetime.0.saturating_sub(1);
            if lifetime.0 == 0 {
                dead.push(entity);
            }
        }
        for entity in dead {
            args.commands().destroy(entity);
        }
        Ok(())
    });

    builder.build().expect("systems should organize without errors")
}

fn snapshot(world: &World) -> Vec<(Entity, [u32; 2], u32)> {
    let positions = world.read::<Position>();
    let lifetimes = world.read::<Lifetime>();

    let mut items = Vec::new();
    View::new((&*positions, &*lifetimes)).each(|entity, (position, lifetime)| {
        items.push((entity, position.0.map(f32::to_bits), lifetime.0));
    });
    items
}

#[test]
fn same_state_for_every_concurrency() {
    let _ = env_logger::builder().is_test(true).try_init();

    let states: Vec<_> = (0..5)
        .map(|concurrency| {
            let mut world = build(concurrency);
            for _ in 0..TICKS {
                world.run_tick().expect("systems do not fail");
            }
            (world.entity_count(), snapshot(&world))
        })
        .collect();

    assert!(states[0].0 > 0, "some particles should be alive");
    for (concurrency, state) in states.iter().enumerate().skip(1) {
        assert_eq!(&states[0], state, "state diverged with {concurrency} workers");
    }
}

#[test]
fn graph_is_the_same_for_every_concurrency() {
    let dots: Vec<String> = (0..3).map(|c| build(c).graph().dot().to_string()).collect();
    assert!(dots.windows(2).all(|pair| pair[0] == pair[1]));
    assert!(dots[0].contains("n1 -> n2;"), "integrate waits for gravity:\n{}", dots[0]);
}
