use rand::Rng;

use crate::grid::Cell;

pub const SPAWN_CHANCE: f64 = 0.35;
pub const ONBOARD_MAX: usize = 2;
pub const LIFETIME: f64 = 10.0;

pub const SHRINK_AMOUNT: usize = 4;
pub const SLOW_FACTOR: f64 = 0.6;
pub const DOUBLE_MULTIPLIER: u32 = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PowerUpKind {
    Double,
    Slow,
    Shrink,
    Shield,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [PowerUpKind::Double, PowerUpKind::Slow, PowerUpKind::Shrink, PowerUpKind::Shield];

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Effect duration once collected. Shrink is instantaneous.
    pub fn duration(self) -> Option<f64> {
        match self {
            PowerUpKind::Double => Some(10.0),
            PowerUpKind::Slow => Some(8.0),
            PowerUpKind::Shrink => None,
            PowerUpKind::Shield => Some(12.0),
        }
    }

    /// Single letter shown on the board.
    pub fn initial(self) -> char {
        match self {
            PowerUpKind::Double => 'D',
            PowerUpKind::Slow => 'S',
            PowerUpKind::Shrink => 'K',
            PowerUpKind::Shield => 'H',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PowerUpKind::Double => "DOUBLE",
            PowerUpKind::Slow => "SLOW",
            PowerUpKind::Shrink => "SHRINK",
            PowerUpKind::Shield => "SHIELD",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub cell: Cell,
    pub spawned_at: f64,
    pub ttl: f64,
}

impl PowerUp {
    pub fn new(kind: PowerUpKind, cell: Cell, spawned_at: f64) -> Self {
        PowerUp { kind, cell, spawned_at, ttl: LIFETIME }
    }

    pub fn is_alive(&self, now: f64) -> bool {
        now - self.spawned_at <= self.ttl
    }

    /// Share of the lifetime still left, in [0, 1].
    pub fn remaining_fraction(&self, now: f64) -> f64 {
        (1.0 - (now - self.spawned_at) / self.ttl).clamp(0.0, 1.0)
    }
}

/// Expiry timestamps of the timed effects; `None` means inactive.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActiveEffects {
    pub double_until: Option<f64>,
    pub slow_until: Option<f64>,
    pub shield_until: Option<f64>,
}

impl ActiveEffects {
    fn slot(&mut self, kind: PowerUpKind) -> Option<&mut Option<f64>> {
        match kind {
            PowerUpKind::Double => Some(&mut self.double_until),
            PowerUpKind::Slow => Some(&mut self.slow_until),
            PowerUpKind::Shield => Some(&mut self.shield_until),
            PowerUpKind::Shrink => None,
        }
    }

    pub fn expiry(&self, kind: PowerUpKind) -> Option<f64> {
        match kind {
            PowerUpKind::Double => self.double_until,
            PowerUpKind::Slow => self.slow_until,
            PowerUpKind::Shield => self.shield_until,
            PowerUpKind::Shrink => None,
        }
    }

    /// Starts or restarts the countdown for a timed effect.
    pub fn start(&mut self, kind: PowerUpKind, now: f64) {
        if let (Some(slot), Some(duration)) = (self.slot(kind), kind.duration()) {
            *slot = Some(now + duration);
        }
    }

    /// Clears every effect whose expiry has passed and returns the kinds that ended.
    pub fn expire(&mut self, now: f64) -> Vec<PowerUpKind> {
        let mut ended = Vec::new();
        for kind in PowerUpKind::ALL {
            if let Some(slot) = self.slot(kind) {
                if matches!(*slot, Some(until) if now > until) {
                    *slot = None;
                    ended.push(kind);
                }
            }
        }
        ended
    }

    pub fn remaining(&self, kind: PowerUpKind, now: f64) -> Option<f64> {
        self.expiry(kind).map(|until| (until - now).max(0.0))
    }

    /// Active timed effects with the fraction of their countdown still left.
    pub fn countdowns(&self, now: f64) -> Vec<(PowerUpKind, f64)> {
        PowerUpKind::ALL
            .iter()
            .filter_map(|&kind| {
                let remaining = self.remaining(kind, now)?;
                let duration = kind.duration()?;
                Some((kind, (remaining / duration).clamp(0.0, 1.0)))
            })
            .collect()
    }
}
