use std::time::Duration;

use flappy_gesture::config::{AvatarConfig, ObstacleConfig, PhysicsConfig};
use flappy_gesture::avatar::AvatarController;
use flappy_gesture::entities::*;
use flappy_gesture::obstacles::ObstacleManager;

use rand::rngs::mock::StepRng;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn make_manager() -> ObstacleManager {
    ObstacleManager::new(ObstacleConfig::default())
}

fn playfield() -> Playfield {
    Playfield::new(800.0, 600.0).unwrap()
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

fn bird() -> Avatar {
    AvatarController::new(PhysicsConfig::default(), AvatarConfig::default()).spawn(&playfield())
}

// ── spawn_if_due ──────────────────────────────────────────────────────────────

#[test]
fn first_spawn_is_immediate() {
    let mut m = make_manager();
    assert!(m.spawn_if_due(Duration::ZERO, &playfield(), &mut seeded_rng()));
    assert_eq!(m.len(), 1);
    assert_eq!(m.last_spawn(), Some(Duration::ZERO));
    let o = &m.obstacles()[0];
    assert_eq!(o.x, 800.0);
    assert_eq!(o.radius, 25.0);
}

#[test]
fn one_spawn_per_full_interval() {
    let mut m = make_manager();
    let mut rng = seeded_rng();
    let mut spawned_at = Vec::new();
    for step in 0..=45u64 {
        let now = Duration::from_millis(step * 100);
        if m.spawn_if_due(now, &playfield(), &mut rng) {
            spawned_at.push(now.as_millis());
        }
    }
    assert_eq!(spawned_at, vec![0, 1500, 3000, 4500]);
    assert_eq!(m.len(), 4);
}

#[test]
fn no_spawn_just_before_interval() {
    let mut m = make_manager();
    let mut rng = seeded_rng();
    m.spawn_if_due(Duration::from_millis(700), &playfield(), &mut rng);
    assert!(!m.spawn_if_due(Duration::from_millis(2199), &playfield(), &mut rng));
    // Exactly one full interval is enough.
    assert!(m.spawn_if_due(Duration::from_millis(2200), &playfield(), &mut rng));
    assert_eq!(m.last_spawn(), Some(Duration::from_millis(2200)));
    assert!(!m.spawn_if_due(Duration::from_millis(2200), &playfield(), &mut rng));
    assert_eq!(m.len(), 2);
}

#[test]
fn spawn_height_stays_in_band() {
    let mut m = make_manager();
    let mut rng = seeded_rng();
    for i in 0..200u64 {
        m.spawn_if_due(Duration::from_millis(i * 1500), &playfield(), &mut rng);
    }
    assert_eq!(m.len(), 200);
    for o in m.obstacles() {
        assert!(o.y >= 60.0 && o.y <= 480.0, "y = {}", o.y);
    }
}

#[test]
fn deterministic_rng_gives_band_bottom() {
    let mut m = make_manager();
    let mut zeros = StepRng::new(0, 0);
    m.spawn_if_due(Duration::ZERO, &playfield(), &mut zeros);
    assert_eq!(m.obstacles()[0].y, 60.0);
}

#[test]
fn deterministic_rng_top_of_range_stays_in_band() {
    let mut m = make_manager();
    let mut ones = StepRng::new(u64::MAX, 0);
    m.spawn_if_due(Duration::ZERO, &playfield(), &mut ones);
    let y = m.obstacles()[0].y;
    assert!(y > 470.0 && y <= 480.0, "y = {}", y);
}

// ── advance_all ───────────────────────────────────────────────────────────────

#[test]
fn advance_moves_left_by_scroll_speed() {
    let mut m = make_manager();
    m.insert(Obstacle { x: 400.0, y: 100.0, radius: 25.0 });
    m.advance_all();
    assert_eq!(m.obstacles()[0].x, 396.0);
}

#[test]
fn pruned_once_right_edge_is_negative() {
    let mut m = make_manager();
    // After moving 4 left, right edge = -1.
    m.insert(Obstacle { x: -22.0, y: 100.0, radius: 25.0 });
    m.advance_all();
    assert!(m.is_empty());
}

#[test]
fn kept_while_right_edge_is_zero() {
    let mut m = make_manager();
    // After moving 4 left, right edge = 0.
    m.insert(Obstacle { x: -21.0, y: 100.0, radius: 25.0 });
    m.advance_all();
    assert_eq!(m.len(), 1);
    assert_eq!(m.obstacles()[0].right(), 0.0);
    m.advance_all();
    assert!(m.is_empty());
}

#[test]
fn pruning_keeps_order_of_survivors() {
    let mut m = make_manager();
    m.insert(Obstacle { x: 300.0, y: 100.0, radius: 25.0 });
    m.insert(Obstacle { x: -30.0, y: 100.0, radius: 25.0 });
    m.insert(Obstacle { x: 500.0, y: 100.0, radius: 25.0 });
    m.advance_all();
    let xs: Vec<f32> = m.obstacles().iter().map(|o| o.x).collect();
    assert_eq!(xs, vec![296.0, 496.0]);
}

// ── test_collision ────────────────────────────────────────────────────────────

#[test]
fn collision_removes_and_returns_hit() {
    let mut m = make_manager();
    let b = bird(); // centre (100, 300), 80x60
    m.insert(Obstacle { x: 500.0, y: 300.0, radius: 25.0 });
    m.insert(Obstacle { x: 150.0, y: 300.0, radius: 25.0 });
    let hit = m.test_collision(&b);
    assert_eq!(hit.len(), 1);
    assert_eq!(hit[0].x, 150.0);
    assert_eq!(m.len(), 1);
    assert_eq!(m.obstacles()[0].x, 500.0);
}

#[test]
fn near_miss_at_corner_is_not_a_hit() {
    let mut m = make_manager();
    let b = bird(); // right edge 140, top 270
    // Centre 20 right and 20 above the corner: distance ~28.3 > 25.
    m.insert(Obstacle { x: 160.0, y: 250.0, radius: 25.0 });
    assert!(m.test_collision(&b).is_empty());
    assert_eq!(m.len(), 1);
}

#[test]
fn clear_empties_and_resets_timer() {
    let mut m = make_manager();
    let mut rng = seeded_rng();
    m.spawn_if_due(Duration::from_millis(700), &playfield(), &mut rng);
    m.clear();
    assert!(m.is_empty());
    assert_eq!(m.last_spawn(), None);
    assert!(m.spawn_if_due(Duration::from_millis(800), &playfield(), &mut rng));
}
