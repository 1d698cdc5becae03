use std::collections::{HashSet, VecDeque};

use crate::grid::Cell;
use Direction::*;

pub const MIN_LENGTH: usize = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        matches!((self, other), (Up, Down) | (Down, Up) | (Right, Left) | (Left, Right))
    }
}

#[derive(Clone, Debug)]
pub struct Snake {
    // Head at the front
    body: VecDeque<Cell>,
    direction: Direction,
    next_direction: Direction,
    growth_pending: u32,
    shield_charges: u32,
}

impl Snake {
    /// Lays out `length` segments trailing behind `head`, opposite to `direction`.
    pub fn new(head: Cell, length: usize, direction: Direction) -> Self {
        debug_assert!(length >= MIN_LENGTH);

        let (dx, dy) = direction.delta();
        let body = (0..length as i32)
            .map(|i| head.offset((-dx * i, -dy * i)))
            .collect();

        Snake { body, direction, next_direction: direction, growth_pending: 0, shield_charges: 0 }
    }

    pub fn body(&self) -> &VecDeque<Cell> {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn shield_charges(&self) -> u32 {
        self.shield_charges
    }

    pub fn set_shield_charges(&mut self, charges: u32) {
        self.shield_charges = charges;
    }

    /// Spends one shield charge, returning false if there was none.
    pub fn consume_shield(&mut self) -> bool {
        if self.shield_charges == 0 {
            return false;
        }
        self.shield_charges -= 1;
        true
    }

    /// Buffers the direction for the next step. Reversals are ignored.
    pub fn turn(&mut self, new_direction: Direction) {
        if !new_direction.is_opposite(self.direction) {
            self.next_direction = new_direction;
        }
    }

    pub fn grow(&mut self) {
        self.growth_pending += 1;
    }

    pub fn step(&mut self) {
        self.direction = self.next_direction;
        let new_head = self.head().offset(self.direction.delta());
        self.body.push_front(new_head);

        if self.growth_pending > 0 {
            self.growth_pending -= 1;
        } else {
            self.body.pop_back();
        }
    }

    pub fn hit_self(&self) -> bool {
        let head = self.head();
        self.body.iter().skip(1).any(|seg| *seg == head)
    }

    /// Drops up to `count` tail segments without going below the minimum length.
    pub fn shrink(&mut self, count: usize) {
        let removable = self.body.len().saturating_sub(MIN_LENGTH).min(count);
        self.body.truncate(self.body.len() - removable);
    }

    /// Cuts the body at the first repeated cell, collapsing the loop the head ran into.
    pub fn repair_self_intersection(&mut self) {
        let mut seen = HashSet::with_capacity(self.body.len());
        let keep = self.body.iter().take_while(|seg| seen.insert(**seg)).count();
        self.body.truncate(keep);

        debug_assert!(self.body.len() >= MIN_LENGTH);
    }

    #[cfg(test)]
    pub fn contains(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    #[cfg(test)]
    pub fn next_direction(&self) -> Direction {
        self.next_direction
    }

    #[cfg(test)]
    pub fn from_cells(cells: &[Cell], direction: Direction) -> Self {
        Snake {
            body: cells.iter().copied().collect(),
            direction,
            next_direction: direction,
            growth_pending: 0,
            shield_charges: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GRID_W;

    fn cells(points: &[(i32, i32)]) -> Vec<Cell> {
        points.iter().map(|&(x, y)| Cell::new(x, y)).collect()
    }

    #[test]
    fn test_snake_creation() {
        let snake = Snake::new(Cell::new(20, 15), 3, Right);
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), Cell::new(20, 15));
        assert_eq!(snake.body()[1], Cell::new(19, 15));
        assert_eq!(snake.body()[2], Cell::new(18, 15));
    }

    #[test]
    fn test_step_moves_without_growing() {
        let mut snake = Snake::new(Cell::new(5, 5), 3, Right);
        snake.step();
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), Cell::new(6, 5));
        assert!(!snake.contains(Cell::new(3, 5)));
    }

    #[test]
    fn test_step_grows_once_per_pending() {
        let mut snake = Snake::new(Cell::new(5, 5), 3, Right);
        snake.grow();
        snake.grow();
        snake.step();
        snake.step();
        snake.step();
        assert_eq!(snake.len(), 5);
        assert_eq!(snake.head(), Cell::new(8, 5));
    }

    #[test]
    fn test_step_wraps_around_edge() {
        let mut snake = Snake::new(Cell::new(GRID_W - 1, 2), 3, Right);
        snake.step();
        assert_eq!(snake.head(), Cell::new(0, 2));
    }

    #[test]
    fn test_reverse_turn_ignored() {
        let mut snake = Snake::new(Cell::new(5, 5), 3, Right);
        snake.turn(Left);
        assert_eq!(snake.next_direction(), Right);
        snake.step();
        assert_eq!(snake.direction(), Right);
    }

    #[test]
    fn test_turn_is_buffered_until_step() {
        let mut snake = Snake::new(Cell::new(5, 5), 3, Right);
        snake.turn(Up);
        assert_eq!(snake.direction(), Right);
        assert_eq!(snake.next_direction(), Up);
        snake.step();
        assert_eq!(snake.direction(), Up);
        assert_eq!(snake.head(), Cell::new(5, 4));
    }

    #[test]
    fn test_last_turn_before_step_wins() {
        let mut snake = Snake::new(Cell::new(5, 5), 3, Right);
        snake.turn(Up);
        snake.turn(Down);
        snake.step();
        assert_eq!(snake.head(), Cell::new(5, 6));
    }

    #[test]
    fn test_hit_self() {
        // Head at (5,5) about to run into its own body going up
        let mut snake = Snake::from_cells(
            &cells(&[(5, 6), (6, 6), (6, 5), (5, 5), (4, 5)]),
            Left,
        );
        assert!(!snake.hit_self());
        snake.turn(Up);
        snake.step();
        assert!(snake.hit_self());
    }

    #[test]
    fn test_repair_self_intersection_collapses_loop() {
        let mut snake = Snake::from_cells(
            &cells(&[(5, 5), (5, 6), (6, 6), (6, 5), (5, 5), (4, 5), (3, 5)]),
            Up,
        );
        assert!(snake.hit_self());
        snake.repair_self_intersection();
        assert_eq!(snake.body().iter().copied().collect::<Vec<_>>(), cells(&[(5, 5), (5, 6), (6, 6), (6, 5)]));
        assert!(!snake.hit_self());
    }

    #[test]
    fn test_shrink_clamps_to_minimum() {
        let mut snake = Snake::new(Cell::new(10, 10), 9, Right);
        snake.shrink(4);
        assert_eq!(snake.len(), 5);
        assert_eq!(snake.head(), Cell::new(10, 10));
        snake.shrink(4);
        assert_eq!(snake.len(), MIN_LENGTH);
        snake.shrink(4);
        assert_eq!(snake.len(), MIN_LENGTH);
    }

    #[test]
    fn test_shield_charges() {
        let mut snake = Snake::new(Cell::new(10, 10), 3, Right);
        assert!(!snake.consume_shield());
        snake.set_shield_charges(1);
        assert!(snake.consume_shield());
        assert_eq!(snake.shield_charges(), 0);
        assert!(!snake.consume_shield());
    }
}
