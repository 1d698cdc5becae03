use std::io::{Stdout, Write, stdout};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::event::{Event, poll, read};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use rand::Rng;

use crate::game::{Game, Status};
use crate::grid::{Cell, GRID_H, GRID_W};
use crate::snake::Direction;

// Every grid cell takes two terminal columns so the board looks square
const CELL_COLS: u16 = 2;
const HUD_ROWS: u16 = 2;
const BAR_WIDTH: usize = 10;

pub const FRAME_W: u16 = GRID_W as u16 * CELL_COLS + 2;
pub const FRAME_H: u16 = HUD_ROWS + GRID_H as u16 + 3;

const SNAKE_BODY: [char; 2] = ['█', '█'];
const FOOD: [char; 2] = ['(', ')'];
const PARTICLE_CHAR: char = '·';
const BLANK: char = ' ';

/// Draws the game into an off-screen frame and flushes only what changed.
pub struct TermManager {
    stdout: Stdout,
    // What the terminal currently shows, `None` when unknown
    front: Vec<Option<char>>,
    back: Vec<char>,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size().context("Failed to read terminal size")?;
        ensure!(
            width >= FRAME_W && height >= FRAME_H,
            "Terminal is {}x{}, the game needs at least {}x{}",
            width,
            height,
            FRAME_W,
            FRAME_H
        );

        let len = FRAME_W as usize * FRAME_H as usize;
        Ok(TermManager { stdout: stdout(), front: vec![None; len], back: vec![BLANK; len] })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        terminal::enable_raw_mode().context("Failed to enable raw mode")?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking, terminal::Clear(ClearType::All))
            .context("Failed to prepare the screen")?;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        Ok(())
    }

    pub fn read_events_queue(&self) -> Result<Vec<Event>> {
        let mut events = vec![];

        while poll(Duration::ZERO).context("Failed to poll terminal events")? {
            events.push(read().context("Failed to read terminal event")?);
        }

        Ok(events)
    }

    /// Forgets what is on screen so the next draw repaints everything.
    pub fn invalidate(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All)).context("Failed to clear screen")?;
        self.front.iter_mut().for_each(|c| *c = None);
        Ok(())
    }

    pub fn draw<R: Rng>(&mut self, game: &Game<R>, now: f64) -> Result<()> {
        self.back.iter_mut().for_each(|c| *c = BLANK);

        self.draw_hud(game, now);
        self.draw_borders();
        self.draw_board(game, now);

        match game.status() {
            Status::Paused => self.overlay(&["PAUSED", "", "Press P to resume"]),
            Status::GameOver => {
                let score = format!("Score: {}", game.score());
                self.overlay(&["GAME OVER", &score, "", "Press R to restart"]);
            }
            Status::Running => {}
        }

        self.present()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn draw_hud<R: Rng>(&mut self, game: &Game<R>, now: f64) {
        let mut top = format!("SCORE {}   BEST {}", game.score(), game.best());
        if game.multiplier() > 1 {
            top.push_str(&format!("   x{}", game.multiplier()));
        }
        if game.snake().shield_charges() > 0 {
            top.push_str("   SHIELDED");
        }
        self.print_str((0, 0), &top);

        let stats = format!(
            "LEN {}  APPLES {}  {:.1} moves/s",
            game.snake().len(),
            game.apples_eaten(),
            1.0 / game.move_interval()
        );
        let stats_x = FRAME_W.saturating_sub(stats.chars().count() as u16);
        self.print_str((stats_x, 0), &stats);

        let bars: Vec<String> = game
            .effects()
            .countdowns(now)
            .into_iter()
            .map(|(kind, left)| {
                let fill = (left * BAR_WIDTH as f64).ceil() as usize;
                format!("{} [{}{}]", kind.label(), "#".repeat(fill), " ".repeat(BAR_WIDTH - fill))
            })
            .collect();
        self.print_str((0, 1), &bars.join("  "));

        let footer = "Arrows/WASD move  P pause  R restart  Esc quit";
        self.print_str((0, FRAME_H - 1), footer);
    }

    fn draw_borders(&mut self) {
        let end_x = FRAME_W - 1;
        let (top, bottom) = (HUD_ROWS, HUD_ROWS + GRID_H as u16 + 1);

        for x in 0..FRAME_W {
            let ch = if x == 0 || x == end_x {'+'} else {'-'};
            self.put((x, top), ch);
            self.put((x, bottom), ch);
        }

        for y in top + 1..bottom {
            self.put((0, y), '|');
            self.put((end_x, y), '|');
        }
    }

    fn draw_board<R: Rng>(&mut self, game: &Game<R>, now: f64) {
        self.put_cell(game.food(), FOOD);

        for pu in game.powerups() {
            // Kind initial plus the tenths of lifetime left
            let tenths = (pu.remaining_fraction(now) * 10.0).floor().min(9.0) as u32;
            let digit = std::char::from_digit(tenths, 10).unwrap_or('0');
            self.put_cell(pu.cell, [pu.kind.initial(), digit]);
        }

        for seg in game.snake().body().iter().skip(1) {
            self.put_cell(*seg, SNAKE_BODY);
        }

        for particle in game.particles() {
            let (dx, dy) = particle.drift(now);
            let col = ((particle.origin.x as f64 + 0.5 + dx) * CELL_COLS as f64).floor();
            let row = (particle.origin.y as f64 + 0.5 + dy).floor();
            if col < 0.0 || row < 0.0 || col >= (GRID_W as u16 * CELL_COLS) as f64 || row >= GRID_H as f64 {
                continue;
            }
            let pos = board_pos(col as u16, row as u16);
            if self.back[index(pos)] == BLANK {
                self.put(pos, PARTICLE_CHAR);
            }
        }

        let head = game.snake().head();
        let head_ch = head_char(game.snake().direction());
        self.put_cols(head_screen_col(game), head.y as u16, [head_ch, head_ch]);
    }

    fn overlay(&mut self, lines: &[&str]) {
        let msg_height = lines.len() as u16 + 2;
        let msg_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16 + 4;
        let center = (FRAME_W / 2, HUD_ROWS + 1 + GRID_H as u16 / 2);
        let top_left = (center.0 - msg_width / 2, center.1 - msg_height / 2);

        let blank_line = " ".repeat(msg_width as usize);
        self.print_str(top_left, &blank_line);
        self.print_str((top_left.0, top_left.1 + msg_height - 1), &blank_line);

        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            self.print_str((top_left.0, top_left.1 + i as u16 + 1), &padded_line);
        }
    }

    fn present(&mut self) -> Result<()> {
        for (i, &ch) in self.back.iter().enumerate() {
            if self.front[i] == Some(ch) {
                continue;
            }
            let x = (i % FRAME_W as usize) as u16;
            let y = (i / FRAME_W as usize) as u16;
            queue!(self.stdout, cursor::MoveTo(x, y), style::Print(ch))
                .context("Failed to queue frame output")?;
            self.front[i] = Some(ch);
        }

        self.stdout.flush().context("Failed to flush frame")
    }

    fn put_cell(&mut self, cell: Cell, glyph: [char; 2]) {
        self.put_cols(cell.x as u16 * CELL_COLS, cell.y as u16, glyph);
    }

    fn put_cols(&mut self, col: u16, row: u16, glyph: [char; 2]) {
        let board_cols = GRID_W as u16 * CELL_COLS;
        for (i, ch) in glyph.iter().enumerate() {
            // The half-cell head offset may spill over the right edge; wrap it
            let c = (col + i as u16) % board_cols;
            self.put(board_pos(c, row), *ch);
        }
    }

    fn print_str(&mut self, (x, y): (u16, u16), text: &str) {
        for (i, ch) in text.chars().enumerate() {
            let col = x as usize + i;
            if col >= FRAME_W as usize {
                break;
            }
            self.put((col as u16, y), ch);
        }
    }

    fn put(&mut self, pos: (u16, u16), ch: char) {
        let i = index(pos);
        if let Some(slot) = self.back.get_mut(i) {
            *slot = ch;
        }
    }
}

fn head_char(direction: Direction) -> char {
    match direction {
        Direction::Up => '^',
        Direction::Down => 'v',
        Direction::Left => '<',
        Direction::Right => '>',
    }
}

fn index((x, y): (u16, u16)) -> usize {
    y as usize * FRAME_W as usize + x as usize
}

fn board_pos(col: u16, row: u16) -> (u16, u16) {
    (col + 1, row + HUD_ROWS + 1)
}

/// Board column of the head, eased towards the previous cell by the interpolation
/// ratio. Falls back to the real cell when the last step wrapped around an edge.
fn head_screen_col<R: Rng>(game: &Game<R>) -> u16 {
    let head = game.snake().head();
    let (fx, fy) = game.interpolated_head();
    let wrapped = (fx - head.x as f64).abs() > 1.0 || (fy - head.y as f64).abs() > 1.0;
    if wrapped {
        return head.x as u16 * CELL_COLS;
    }
    (fx * CELL_COLS as f64).round().max(0.0) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_frame_fits_board() {
        assert_eq!(FRAME_W, 82);
        assert_eq!(FRAME_H, 35);
        assert_eq!(board_pos(0, 0), (1, 3));
        assert_eq!(index(board_pos(GRID_W as u16 * 2 - 1, GRID_H as u16 - 1)), 32 * 82 + 80);
    }

    #[test]
    fn test_head_char_follows_direction() {
        assert_eq!(head_char(Direction::Right), '>');
        assert_eq!(head_char(Direction::Down), 'v');
    }

    #[test]
    fn test_head_col_without_motion() {
        let game = Game::with_rng(StdRng::seed_from_u64(5));
        assert_eq!(head_screen_col(&game), game.snake().head().x as u16 * CELL_COLS);
    }

    #[test]
    fn test_head_col_eases_between_cells() {
        let mut game = Game::with_rng(StdRng::seed_from_u64(5));
        let interval = game.move_interval();
        // One step right, then half an interval of drift back towards the old cell
        game.update(interval, 0.01);
        game.update(interval * 0.5, 0.02);
        let head = game.snake().head();
        assert_eq!(head_screen_col(&game), head.x as u16 * CELL_COLS - 1);
    }
}
