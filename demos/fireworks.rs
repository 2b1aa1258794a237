//! A fireworks particle simulation.
//!
//! Rockets rise with propulsion, leave a trail of short-lived particles
//! and explode into hundreds of particles after a few seconds.
//! Every exploded rocket is replaced with a new one.
//!
//! Run with `RUST_LOG=debug cargo run --example fireworks` to see the scheduler logs.

use std::f32::consts::{PI, TAU};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tickgraph::context::FixedDelta;
use tickgraph::system::{self, Access, Args, Spec};
use tickgraph::{world, View};

#[derive(Debug, Clone, Copy)]
struct Particle {
    pos:       [f32; 2],
    vel:       [f32; 2],
    dampening: f32,
}

#[derive(Debug, Clone, Copy)]
struct Color([f32; 3]);

#[derive(Debug, Clone, Copy)]
struct Lifetime(f32);

#[derive(Debug, Clone, Copy)]
struct Propulsion {
    dir:    f32,
    amount: f32,
}

#[derive(Debug, Clone, Copy)]
enum ExplosionKind {
    Full,
    FullSplit,
    Circle,
    Circle2,
}

#[derive(Debug, Clone, Copy)]
struct Explosion {
    kind:      ExplosionKind,
    amount:    u16,
    amount2:   u16,
    strength:  f32,
    strength2: f32,
    color:     [f32; 3],
    color2:    [f32; 3],
}

#[derive(Debug, Clone, Copy)]
struct Rocket {
    trail_amount:    f32,
    trail_accu:      f32,
    trail_color:     [f32; 3],
    explosion_timer: f32,
    explosion:       Explosion,
}

const COLORS: [[f32; 3]; 11] = [
    [1.0, 1.0, 1.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [1.0, 1.0, 0.0],
    [0.6, 1.0, 0.0],
    [0.8, 0.8, 1.0],
    [0.8, 0.0, 1.0],
    [0.3, 0.9, 0.3],
];

const INITIAL_ROCKETS: usize = 4;
const TICKS: usize = 1000;

fn unit(dir: f32) -> [f32; 2] { [dir.cos(), dir.sin()] }

/// Launches, steers and explodes rockets.
///
/// The random generator is owned by the system so that the simulation is reproducible.
struct Fireworks {
    rng:     StdRng,
    pending: usize,
}

impl Fireworks {
    fn new() -> Self { Self { rng: StdRng::seed_from_u64(1337 + 42), pending: INITIAL_ROCKETS } }

    fn launch(&mut self, args: &mut Args<'_>) {
        let rng = &mut self.rng;

        let explosion = Explosion {
            kind:      match rng.gen_range(0..4) {
                0 => ExplosionKind::Full,
                1 => ExplosionKind::FullSplit,
                2 => ExplosionKind::Circle,
                _ => ExplosionKind::Circle2,
            },
            amount:    500,
            amount2:   500,
            strength:  80.0,
            strength2: 80.0,
            color:     COLORS[rng.gen_range(0..COLORS.len())],
            color2:    COLORS[rng.gen_range(0..COLORS.len())],
        };
        let rocket = Rocket {
            trail_amount: 800.0,
            trail_accu: 0.0,
            trail_color: [1.0, 0.8, 0.8],
            explosion_timer: rng.gen_range(3.5..=4.5),
            explosion,
        };
        let particle =
            Particle { pos: [rng.gen_range(-100.0..=100.0), -70.0], vel: [0.0, 0.0], dampening: 0.5 };
        let propulsion = Propulsion {
            dir:    (1.5 + rng.gen_range(-0.05f32..=0.05)) * PI,
            amount: rng.gen_range(27.0..=33.0),
        };

        args.commands().spawn((rocket, particle, propulsion));
    }

    fn explode(&mut self, args: &mut Args<'_>, pos: [f32; 2], explosion: &Explosion) {
        match explosion.kind {
            ExplosionKind::Full => {
                self.burst(args, pos, explosion.amount, explosion.strength, explosion.color, false)
            }
            ExplosionKind::FullSplit => {
                self.burst(args, pos, explosion.amount, explosion.strength, explosion.color, false);
                self.burst(args, pos, explosion.amount2, explosion.strength2, explosion.color2, false);
            }
            ExplosionKind::Circle => {
                self.burst(args, pos, explosion.amount, explosion.strength, explosion.color, true)
            }
            ExplosionKind::Circle2 => {
                self.burst(args, pos, explosion.amount, explosion.strength, explosion.color, true);
                self.burst(args, pos, explosion.amount2, explosion.strength2, explosion.color2, true);
            }
        }
    }

    /// Spawns `amount` particles moving away from `pos`.
    ///
    /// Circle bursts share a dampening and a speed, so the particles stay on a ring.
    fn burst(
        &mut self,
        args: &mut Args<'_>,
        pos: [f32; 2],
        amount: u16,
        strength: f32,
        color: [f32; 3],
        circle: bool,
    ) {
        let shared_dampening = 1.0 + self.rng.gen_range(0.0f32..=0.5);

        for _ in 0..amount {
            let [x, y] = unit(self.rng.gen_range(0.0..TAU));
            let (speed, dampening) = if circle {
                (strength, shared_dampening)
            } else {
                (strength * self.rng.gen_range(0.0f32..=1.0), 1.0 + self.rng.gen_range(0.0f32..=0.5))
            };

            args.commands().spawn((
                Particle { pos, vel: [x * speed, y * speed], dampening },
                Color(color),
                Lifetime(self.rng.gen_range(0.3..=5.3)),
            ));
        }
    }
}

impl system::System for Fireworks {
    fn get_spec(&self) -> Spec {
        Spec::new("particle_fireworks_rocket")
            .write::<Rocket>()
            .write::<Propulsion>()
            .read::<Particle>()
    }

    fn run(&mut self, args: &mut Args<'_>) -> Result<(), system::Error> {
        for _ in 0..std::mem::take(&mut self.pending) {
            self.launch(args);
        }

        let dt = args.context().get::<FixedDelta>().seconds;

        let mut exploded = Vec::new();
        let mut trails = Vec::new();
        {
            let mut rockets = args.write::<Rocket>();
            let mut propulsions = args.write::<Propulsion>();
            let particles = args.read::<Particle>();

            View::new((&mut *rockets, &mut *propulsions, &*particles)).each(
                |entity, (rocket, propulsion, particle)| {
                    rocket.explosion_timer -= dt;
                    if rocket.explosion_timer <= 0.0 {
                        exploded.push((entity, particle.pos, rocket.explosion));
                        return;
                    }

                    let vel_dir = particle.vel[1].atan2(particle.vel[0]) + PI;
                    propulsion.dir += (vel_dir - propulsion.dir) * (4.5 * dt);

                    rocket.trail_accu += rocket.trail_amount * dt;
                    while rocket.trail_accu >= 1.0 {
                        rocket.trail_accu -= 1.0;
                        trails.push((particle.pos, *propulsion, rocket.trail_color));
                    }
                },
            );
        }

        for (pos, propulsion, color) in trails {
            let dir = (propulsion.dir + self.rng.gen_range(-0.1f32..=0.1)).rem_euclid(TAU);
            let [x, y] = unit(dir);
            let speed = propulsion.amount * 1.5;
            args.commands().spawn((
                Particle { pos, vel: [x * speed, y * speed], dampening: 5.0 },
                Color(color),
                Lifetime(self.rng.gen_range(0.3..=0.6)),
            ));
        }

        for (entity, pos, explosion) in exploded {
            self.explode(args, pos, &explosion);
            args.commands().remove::<Rocket>(entity);
            args.commands().insert(entity, Lifetime(0.0));
            self.pending += 1;
        }

        Ok(())
    }
}

struct FireworksBundle;

impl world::Bundle for FireworksBundle {
    fn register(&self, builder: &mut world::Builder) {
        builder.schedule(Box::new(Fireworks::new()));

        builder.schedule_fn(
            "particle_2d_propulsion",
            [Access::write::<Particle>(), Access::read::<Propulsion>()],
            |args| {
                let dt = args.context().get::<FixedDelta>().seconds;
                let mut particles = args.write::<Particle>();
                let propulsions = args.read::<Propulsion>();
                View::new((&mut *particles, &*propulsions)).each(|_, (particle, propulsion)| {
                    let [x, y] = unit(propulsion.dir + PI);
                    particle.vel[0] += x * propulsion.amount * dt;
                    particle.vel[1] += y * propulsion.amount * dt;
                });
                Ok(())
            },
        );

        builder.schedule_fn("particle_2d_gravity", [Access::write::<Particle>()], |args| {
            let dt = args.context().get::<FixedDelta>().seconds;
            for particle in args.write::<Particle>().as_mut_slice() {
                particle.vel[1] -= 10.0 * dt;
            }
            Ok(())
        });

        builder.schedule_fn("particle_2d_vel", [Access::write::<Particle>()], |args| {
            let dt = args.context().get::<FixedDelta>().seconds;
            let mut particles = args.write::<Particle>();
            args.subdivider().for_each_chunk_mut(particles.as_mut_slice(), |_, chunk| {
                for p in chunk {
                    for axis in 0..2 {
                        p.vel[axis] -= p.vel[axis] * p.dampening * dt;
                        p.pos[axis] += p.vel[axis] * dt;
                    }
                }
            });
            Ok(())
        });

        builder.schedule_fn("particle_life", [Access::write::<Lifetime>()], |args| {
            let dt = args.context().get::<FixedDelta>().seconds;
            for lifetime in args.write::<Lifetime>().as_mut_slice() {
                lifetime.0 -= dt;
            }
            Ok(())
        });

        builder.schedule_fn("particle_death", [Access::read::<Lifetime>()], |args| {
            let dead: Vec<_> = args
                .read::<Lifetime>()
                .iter()
                .filter(|(_, lifetime)| lifetime.0 <= 0.0)
                .map(|(entity, _)| entity)
                .collect();
            for entity in dead {
                args.commands().destroy(entity);
            }
            Ok(())
        });
    }
}

fn main() {
    env_logger::init();

    let mut world = match world::new([&FireworksBundle as &dyn world::Bundle]) {
        Ok(world) => world,
        Err(err) => {
            eprintln!("Cannot build the fireworks world: {err}");
            std::process::exit(1);
        }
    };

    println!("dependency graph:\n{}", world.graph().dot());

    for tick in 0..TICKS {
        if let Err(err) = world.run_tick() {
            eprintln!("Tick {tick} failed: {err}");
            std::process::exit(1);
        }
        if tick % 100 == 0 {
            log::info!("tick {tick}: {} entities", world.entity_count());
        }
    }

    println!(
        "{} ticks with {} workers, {} entities alive",
        world.tick_count(),
        world.concurrency(),
        world.entity_count()
    );
}
