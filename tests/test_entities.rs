use flappy_gesture::entities::*;
use flappy_gesture::error::GameError;

#[test]
fn status_eq() {
    assert_eq!(GameStatus::Idle, GameStatus::Idle);
    assert_ne!(GameStatus::Idle, GameStatus::Flying);
    assert_ne!(GameStatus::Flying, GameStatus::GameOver);
}

#[test]
fn playfield_rejects_degenerate_sizes() {
    assert!(Playfield::new(800.0, 600.0).is_ok());
    for (w, h) in [(0.0, 600.0), (800.0, 0.0), (-1.0, 600.0), (f32::NAN, 600.0), (800.0, f32::INFINITY)] {
        match Playfield::new(w, h) {
            Err(GameError::InvalidPlayfield { .. }) => {}
            other => panic!("{}x{} accepted: {:?}", w, h, other),
        }
    }
}

#[test]
fn rect_contains_is_half_open() {
    let r = Rect { left: 10.0, top: 20.0, width: 100.0, height: 50.0 };
    assert!(r.contains(10.0, 20.0));
    assert!(r.contains(109.9, 69.9));
    assert!(!r.contains(110.0, 30.0));
    assert!(!r.contains(50.0, 70.0));
    assert!(!r.contains(9.9, 30.0));
}

#[test]
fn avatar_bounds_are_centred() {
    let a = Avatar {
        x: 100.0,
        y: 300.0,
        width: 80.0,
        height: 60.0,
        velocity: 0.0,
        frame: 0,
        anim_counter: 0,
        activate_latch: false,
    };
    let b = a.bounds();
    assert_eq!((b.left, b.top, b.right(), b.bottom()), (60.0, 270.0, 140.0, 330.0));
    assert_eq!(a.bottom(), 330.0);
    assert_eq!(a.floor(540.0), 510.0);
    assert!(!a.is_grounded(540.0));
}

#[test]
fn obstacle_overlap_with_rect() {
    let r = Rect { left: 0.0, top: 0.0, width: 50.0, height: 50.0 };
    // Centre inside.
    assert!(Obstacle { x: 25.0, y: 25.0, radius: 5.0 }.overlaps(&r));
    // Touching an edge from outside, within radius.
    assert!(Obstacle { x: 60.0, y: 25.0, radius: 25.0 }.overlaps(&r));
    // Exactly one radius away from the edge: no overlap.
    assert!(!Obstacle { x: 75.0, y: 25.0, radius: 25.0 }.overlaps(&r));
}

#[test]
fn identical_geometry_always_overlaps() {
    let o = Obstacle { x: 40.0, y: 40.0, radius: 25.0 };
    let r = Rect { left: 15.0, top: 15.0, width: 50.0, height: 50.0 };
    assert!(o.overlaps(&r));
    assert!(o.clone().overlaps(&r));
}

#[test]
fn obstacle_right_edge() {
    assert_eq!(Obstacle { x: -25.0, y: 0.0, radius: 25.0 }.right(), 0.0);
}

#[test]
fn default_input_is_inactive() {
    let input = FrameInput::default();
    assert!(!input.activate);
    assert!(!input.restart_requested);
}
