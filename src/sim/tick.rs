//! Per-frame simulation step
//!
//! Moves tiles, detects misses, and runs the spawn timer.

use super::state::{GameEvent, Session};

/// Advance the session by `dt` seconds. Does nothing once the session is over.
pub fn tick(session: &mut Session, dt: f32) {
    if session.game_over {
        return;
    }

    // In-flight tiles pick up the speed for the current score
    session.tiles.advance(session.score, dt);

    if let Some(missed) = session.tiles.pop_missed() {
        session.events.push(GameEvent::Missed { id: missed.id });
        session.apply_penalty();
        if session.game_over {
            return;
        }
    }

    session.spawn_timer += dt;
    if session.spawn_timer >= session.spawn_interval {
        session.spawn_timer = 0.0;
        session.spawn_tile();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::economy::{Economy, Inventory};

    fn fresh(seed: u64) -> Session {
        let mut s = Session::new(seed, STARTING_LIVES, 0, Economy::default());
        s.drain_events();
        s
    }

    #[test]
    fn test_spawn_timer() {
        let mut s = fresh(1);
        tick(&mut s, 1.0);
        assert_eq!(s.tiles().len(), 1);
        tick(&mut s, 1.0);
        assert_eq!(s.tiles().len(), 2);
        assert_eq!(s.spawn_timer(), 0.0);
        assert_eq!(s.drain_events(), vec![GameEvent::TileSpawned { id: 2 }]);
    }

    #[test]
    fn test_miss_costs_a_life() {
        let mut s = fresh(2);
        let id = s.active_tile().unwrap().id;
        // 60 px/s from -80 needs > 680 px; one big step
        tick(&mut s, 12.0);
        assert_eq!(s.lives(), STARTING_LIVES - 1);
        let events = s.drain_events();
        assert!(events.contains(&GameEvent::Missed { id }));
        assert!(events.contains(&GameEvent::LifeLost { remaining: 2 }));
    }

    #[test]
    fn test_miss_with_shield() {
        let mut s = Session::new(3, STARTING_LIVES, 0, Economy::new(0, Inventory { skip: 0, shield: 2 }));
        tick(&mut s, 12.0);
        assert_eq!(s.lives(), STARTING_LIVES);
        assert_eq!(s.items().shield, 1);
    }

    #[test]
    fn test_tile_reaches_bottom_at_expected_time() {
        let mut s = fresh(4);
        let dt = 1.0 / FPS as f32;
        let mut frames = 0;
        while s.lives() == STARTING_LIVES && frames < 10_000 {
            tick(&mut s, dt);
            frames += 1;
        }
        // 680 px at 60 px/s is a little over 11.3 s
        let elapsed = frames as f32 * dt;
        assert!((11.3..11.5).contains(&elapsed), "missed after {elapsed}s");
    }

    #[test]
    fn test_frozen_after_game_over() {
        let mut s = Session::new(5, 1, 0, Economy::default());
        tick(&mut s, 12.0);
        assert!(s.is_game_over());
        let tiles = s.tiles().len();
        let timer = s.spawn_timer();

        tick(&mut s, 50.0);
        assert_eq!(s.tiles().len(), tiles);
        assert_eq!(s.spawn_timer(), timer);
        assert_eq!(s.lives(), 0);
    }

    #[test]
    fn test_determinism() {
        let mut a = fresh(99999);
        let mut b = fresh(99999);
        for _ in 0..600 {
            tick(&mut a, 1.0 / 60.0);
            tick(&mut b, 1.0 / 60.0);
        }
        let problems_a: Vec<_> = a.tiles().iter().map(|t| (t.problem.clone(), t.choices)).collect();
        let problems_b: Vec<_> = b.tiles().iter().map(|t| (t.problem.clone(), t.choices)).collect();
        assert_eq!(problems_a, problems_b);
    }
}
