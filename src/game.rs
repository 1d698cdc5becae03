use std::collections::HashSet;
use std::f64::consts::TAU;

use log::{debug, info, warn};
use rand::Rng;
use rand::rngs::ThreadRng;

use crate::grid::{self, Cell, GRID_H, GRID_W};
use crate::powerup::{self, ActiveEffects, PowerUp, PowerUpKind};
use crate::snake::{Direction, Snake};

pub const INITIAL_SNAKE_LENGTH: usize = 3;

pub const BASE_MOVES_PER_SEC: f64 = 7.0;
pub const MAX_MOVES_PER_SEC: f64 = 20.0;
pub const SPEED_PER_POINT: f64 = 0.18;

pub const PARTICLES_PER_BITE: usize = 18;
pub const PARTICLE_LIFETIME: f64 = 0.6;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Running,
    Paused,
    GameOver,
}

/// Purely decorative spark thrown off when food is eaten.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Particle {
    pub born_at: f64,
    pub origin: Cell,
    pub angle: f64,
    pub speed: f64,
}

impl Particle {
    /// Offset from the origin in cells after `age` time units.
    pub fn drift(&self, now: f64) -> (f64, f64) {
        let age = now - self.born_at;
        (self.angle.cos() * age * self.speed, self.angle.sin() * age * self.speed)
    }
}

pub struct Game<R = ThreadRng> {
    rng: R,
    snake: Snake,
    food: Cell,
    powerups: Vec<PowerUp>,
    effects: ActiveEffects,
    particles: Vec<Particle>,
    status: Status,
    score: u32,
    best: u32,
    apples_eaten: u32,
    multiplier: u32,
    slow_factor: f64,
    move_interval: f64,
    move_accum: f64,
    last_step_head: Cell,
}

impl Game<ThreadRng> {
    pub fn new() -> Self {
        Game::with_rng(rand::thread_rng())
    }
}

impl<R: Rng> Game<R> {
    pub fn with_rng(rng: R) -> Self {
        let head = Cell::new(GRID_W / 2, GRID_H / 2);
        let mut game = Game {
            rng,
            snake: Snake::new(head, INITIAL_SNAKE_LENGTH, Direction::Right),
            food: head,
            powerups: vec![],
            effects: ActiveEffects::default(),
            particles: vec![],
            status: Status::Running,
            score: 0,
            best: 0,
            apples_eaten: 0,
            multiplier: 1,
            slow_factor: 1.0,
            move_interval: 1.0 / BASE_MOVES_PER_SEC,
            move_accum: 0.0,
            last_step_head: head,
        };
        game.reset();
        game
    }

    /// Starts a fresh round. The best score survives.
    pub fn reset(&mut self) {
        let head = Cell::new(GRID_W / 2, GRID_H / 2);
        self.snake = Snake::new(head, INITIAL_SNAKE_LENGTH, Direction::Right);
        self.powerups.clear();
        self.effects = ActiveEffects::default();
        self.particles.clear();
        self.status = Status::Running;
        self.score = 0;
        self.apples_eaten = 0;
        self.multiplier = 1;
        self.slow_factor = 1.0;
        self.move_accum = 0.0;
        self.last_step_head = head;
        self.recompute_speed();

        let excluded: HashSet<Cell> = self.snake.body().iter().copied().collect();
        // A three cell snake always leaves room
        self.food = grid::random_empty_cell(&mut self.rng, &excluded).unwrap_or(head);

        info!("New round, best score {}", self.best);
    }

    pub fn turn(&mut self, direction: Direction) {
        self.snake.turn(direction);
    }

    pub fn toggle_pause(&mut self) {
        self.status = match self.status {
            Status::Running => Status::Paused,
            Status::Paused => Status::Running,
            Status::GameOver => Status::GameOver,
        };
    }

    /// Advances the simulation by `dt` of real time, `now` being the current timestamp.
    pub fn update(&mut self, dt: f64, now: f64) {
        if self.status != Status::Running {
            return;
        }

        self.update_effects(now);
        self.move_accum += dt;

        while self.move_accum >= self.move_interval {
            self.move_accum -= self.move_interval;
            self.last_step_head = self.snake.head();
            self.snake.step();
            let head = self.snake.head();

            if head == self.food {
                self.eat_food(now);
            }

            if let Some(idx) = self.powerups.iter().position(|pu| pu.cell == head) {
                let pu = self.powerups.remove(idx);
                self.apply_powerup(pu.kind, now);
            }

            if self.snake.hit_self() {
                if self.snake.consume_shield() {
                    debug!("Shield absorbed a self collision at ({}, {})", head.x, head.y);
                    self.snake.repair_self_intersection();
                } else {
                    self.end_round();
                }
            }

            self.prune_powerups(now);

            if self.status == Status::GameOver {
                break;
            }
        }

        self.prune_powerups(now);
        self.particles.retain(|p| now - p.born_at < PARTICLE_LIFETIME);
    }

    fn eat_food(&mut self, now: f64) {
        self.apples_eaten += 1;
        self.score += self.multiplier;
        self.snake.grow();
        self.recompute_speed();
        debug!("Ate food #{}, score {}", self.apples_eaten, self.score);

        let origin = self.snake.head();
        for _ in 0..PARTICLES_PER_BITE {
            let angle = self.rng.gen::<f64>() * TAU;
            let speed = self.rng.gen_range(30.0..110.0) * 0.012;
            self.particles.push(Particle { born_at: now, origin, angle, speed });
        }

        if self.rng.gen::<f64>() < powerup::SPAWN_CHANCE {
            self.spawn_powerup(now);
        }

        let mut excluded: HashSet<Cell> = self.snake.body().iter().copied().collect();
        excluded.extend(self.powerups.iter().map(|pu| pu.cell));
        match grid::random_empty_cell(&mut self.rng, &excluded) {
            Some(cell) => self.food = cell,
            None => {
                warn!("No free cell left for food");
                self.end_round();
            }
        }
    }

    fn spawn_powerup(&mut self, now: f64) {
        if self.powerups.len() >= powerup::ONBOARD_MAX {
            return;
        }

        let kind = PowerUpKind::random(&mut self.rng);
        let mut excluded: HashSet<Cell> = self.snake.body().iter().copied().collect();
        excluded.insert(self.food);
        excluded.extend(self.powerups.iter().map(|pu| pu.cell));

        if let Some(cell) = grid::random_empty_cell(&mut self.rng, &excluded) {
            debug!("Spawned {} at ({}, {})", kind.label(), cell.x, cell.y);
            self.powerups.push(PowerUp::new(kind, cell, now));
        }
    }

    fn apply_powerup(&mut self, kind: PowerUpKind, now: f64) {
        info!("Collected {}", kind.label());
        self.effects.start(kind, now);

        match kind {
            PowerUpKind::Double => self.multiplier = powerup::DOUBLE_MULTIPLIER,
            PowerUpKind::Slow => {
                self.slow_factor = powerup::SLOW_FACTOR;
                self.recompute_speed();
            }
            PowerUpKind::Shrink => self.snake.shrink(powerup::SHRINK_AMOUNT),
            PowerUpKind::Shield => self.snake.set_shield_charges(1),
        }
    }

    fn update_effects(&mut self, now: f64) {
        for kind in self.effects.expire(now) {
            info!("{} wore off", kind.label());
            match kind {
                PowerUpKind::Double => self.multiplier = 1,
                PowerUpKind::Slow => {
                    self.slow_factor = 1.0;
                    self.recompute_speed();
                }
                PowerUpKind::Shield => self.snake.set_shield_charges(0),
                PowerUpKind::Shrink => {}
            }
        }
    }

    fn prune_powerups(&mut self, now: f64) {
        self.powerups.retain(|pu| {
            let alive = pu.is_alive(now);
            if !alive {
                debug!("{} at ({}, {}) expired", pu.kind.label(), pu.cell.x, pu.cell.y);
            }
            alive
        });
    }

    fn recompute_speed(&mut self) {
        let target = MAX_MOVES_PER_SEC.min(BASE_MOVES_PER_SEC + self.score as f64 * SPEED_PER_POINT);
        self.move_interval = 1.0 / (target * self.slow_factor);
    }

    fn end_round(&mut self) {
        self.status = Status::GameOver;
        self.best = self.best.max(self.score);
        info!("Game over with score {} (best {})", self.score, self.best);
    }

    ///////////////////////////////////////////////////////////////////////////

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    pub fn powerups(&self) -> &[PowerUp] {
        &self.powerups
    }

    pub fn effects(&self) -> &ActiveEffects {
        &self.effects
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn apples_eaten(&self) -> u32 {
        self.apples_eaten
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn move_interval(&self) -> f64 {
        self.move_interval
    }

    /// How far the head is drawn between its previous and current cell.
    pub fn head_interpolation(&self) -> f64 {
        (1.0 - self.move_accum / self.move_interval.max(1e-6)).clamp(0.0, 1.0)
    }

    pub fn interpolated_head(&self) -> (f64, f64) {
        let t = self.head_interpolation();
        let (from, to) = (self.last_step_head, self.snake.head());
        (
            from.x as f64 + (to.x - from.x) as f64 * t,
            from.y as f64 + (to.y - from.y) as f64 * t,
        )
    }
}
