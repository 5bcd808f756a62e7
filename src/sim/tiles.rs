//! Falling problem tiles
//!
//! The queue is strictly FIFO: tiles enter at the tail and leave from the
//! head. Only the head is answerable.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::difficulty::fall_speed;
use super::problem::Problem;
use crate::consts::*;

/// A problem falling through the play area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub id: u32,
    pub problem: Problem,
    /// Top-left corner
    pub pos: Vec2,
    /// Pixels per second
    pub fall_speed: f32,
    /// Answer candidates in display order; exactly one equals the answer
    pub choices: [i32; CHOICE_COUNT],
}

impl Tile {
    pub fn new(id: u32, problem: Problem, choices: [i32; CHOICE_COUNT], score: u32) -> Self {
        Self {
            id,
            problem,
            pos: Vec2::new(TILE_SPAWN_X, TILE_SPAWN_Y),
            fall_speed: fall_speed(score),
            choices,
        }
    }

    pub fn answer(&self) -> i32 {
        self.problem.answer
    }

    /// True once the tile has dropped past the bottom of the play area
    pub fn is_past_bottom(&self) -> bool {
        self.pos.y > PLAY_AREA_BOTTOM
    }

    /// Fraction of the fall completed, 0 at spawn and 1 at the bottom line
    pub fn progress(&self) -> f32 {
        ((self.pos.y - TILE_SPAWN_Y) / (PLAY_AREA_BOTTOM - TILE_SPAWN_Y)).clamp(0.0, 1.0)
    }
}

/// Ordered queue of falling tiles
#[derive(Debug, Clone, Default)]
pub struct TileQueue {
    tiles: VecDeque<Tile>,
}

impl TileQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tile: Tile) {
        self.tiles.push_back(tile);
    }

    /// The active tile (head of the queue)
    pub fn active(&self) -> Option<&Tile> {
        self.tiles.front()
    }

    /// Remove and return the active tile
    pub fn pop_active(&mut self) -> Option<Tile> {
        self.tiles.pop_front()
    }

    /// Recompute every tile's speed from the current score and move it down
    pub fn advance(&mut self, score: u32, dt: f32) {
        let speed = fall_speed(score);
        for tile in &mut self.tiles {
            tile.fall_speed = speed;
            tile.pos.y += tile.fall_speed * dt;
        }
    }

    /// Pop the head if it has fallen past the bottom. Only the head is
    /// checked; a trailing tile is caught on a later tick once it leads.
    pub fn pop_missed(&mut self) -> Option<Tile> {
        if self.active().is_some_and(Tile::is_past_bottom) {
            self.pop_active()
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
