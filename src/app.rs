use std::thread::sleep;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::Event;
use log::info;

use crate::game::Game;
use crate::input::{Intent, intent_for};
use crate::term::TermManager;

const RENDER_FPS: f64 = 120.0;

pub struct App {
    game: Game,
    term: TermManager,
    started: Instant,
}

impl App {
    pub fn new() -> Result<Self> {
        Ok(App { game: Game::new(), term: TermManager::new()?, started: Instant::now() })
    }

    pub fn run(&mut self) -> Result<()> {
        self.term.setup()?;

        // Always hand the terminal back, even if the loop failed
        let result = self.main_loop();
        let restored = self.term.restore();
        result.and(restored)
    }

    fn main_loop(&mut self) -> Result<()> {
        let frame_budget = Duration::from_secs_f64(1.0 / RENDER_FPS);
        let mut last_frame = Instant::now();

        loop {
            let frame_start = Instant::now();

            for event in self.term.read_events_queue()? {
                match event {
                    Event::Key(key) => match intent_for(&key) {
                        Some(Intent::Quit) => {
                            info!("Quit requested");
                            return Ok(());
                        }
                        Some(intent) => self.apply(intent),
                        None => {}
                    },
                    Event::Resize(..) => self.term.invalidate()?,
                    _ => {}
                }
            }

            let dt = frame_start.duration_since(last_frame).as_secs_f64();
            last_frame = frame_start;
            let now = frame_start.duration_since(self.started).as_secs_f64();

            self.game.update(dt, now);
            self.term.draw(&self.game, now)?;

            if let Some(rest) = frame_budget.checked_sub(frame_start.elapsed()) {
                sleep(rest);
            }
        }
    }

    fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::Turn(direction) => self.game.turn(direction),
            Intent::TogglePause => {
                self.game.toggle_pause();
                info!("Status now {:?}", self.game.status());
            }
            Intent::Reset => self.game.reset(),
            Intent::Quit => {}
        }
    }
}
