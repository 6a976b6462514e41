/// Gesture input: turning a hand (or a stand-in device) into the single
/// per-tick activate boolean, and handing it to the simulation thread.
///
/// The capture side publishes into a `GestureSlot`, which only ever holds the
/// most recent sample.  The simulation reads whatever is there; if capture
/// fell behind, the previous reading simply stays in effect.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use parking_lot::Mutex;

use crate::entities::{FrameInput, Rect};

// ── Landmark classification ───────────────────────────────────────────────────

/// Hand landmark indices (21-point hand model).
pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_TIP: usize = 12;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub fn distance(&self, other: &Landmark) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A hand is closed when the thumb tip is near both the index and middle
/// finger tips.  Too few landmarks (no hand in frame) reads as open.
pub fn classify_hand(landmarks: &[Landmark], threshold: f32) -> bool {
    let (Some(thumb), Some(index), Some(middle)) = (
        landmarks.get(THUMB_TIP),
        landmarks.get(INDEX_TIP),
        landmarks.get(MIDDLE_TIP),
    ) else {
        return false;
    };
    thumb.distance(index) < threshold && thumb.distance(middle) < threshold
}

// ── Samples & hand-off ────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GestureSample {
    pub closed: bool,
    /// Pointer position in playfield units, if the device has one.
    pub pointer: Option<(f32, f32)>,
}

impl GestureSample {
    /// Build the core's input for one tick.  Restart fires when the hand
    /// closes over the restart button, or when an explicit restart was asked
    /// for through another control.
    pub fn frame_input(&self, restart_button: &Rect, restart_key: bool) -> FrameInput {
        let over_button = self
            .pointer
            .map(|(x, y)| restart_button.contains(x, y))
            .unwrap_or(false);
        FrameInput {
            activate: self.closed,
            restart_requested: restart_key || (self.closed && over_button),
        }
    }
}

/// Single-slot, latest-value exchange between the capture thread and the
/// simulation.  Never queues: a newer sample overwrites an unread older one.
#[derive(Clone, Debug, Default)]
pub struct GestureSlot {
    latest: Arc<Mutex<GestureSample>>,
    restart: Arc<AtomicBool>,
    quit: Arc<AtomicBool>,
}

impl GestureSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, sample: GestureSample) {
        *self.latest.lock() = sample;
    }

    /// The most recent sample; repeated reads return the same value until a
    /// new one is published.
    pub fn latest(&self) -> GestureSample {
        *self.latest.lock()
    }

    pub fn request_restart(&self) {
        self.restart.store(true, Ordering::Release);
    }

    /// Consume a pending restart request.
    pub fn take_restart(&self) -> bool {
        self.restart.swap(false, Ordering::AcqRel)
    }

    pub fn request_quit(&self) {
        self.quit.store(true, Ordering::Release);
    }

    pub fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::Acquire)
    }
}

// ── Sources ───────────────────────────────────────────────────────────────────

/// What a terminal event means beyond the gesture itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    None,
    Restart,
    Quit,
}

/// Quit and restart keys, shared by every source.
fn control_key(key: &KeyEvent) -> Control {
    if key.kind != KeyEventKind::Press {
        return Control::None;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Control::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Control::Quit,
        KeyCode::Char('r') | KeyCode::Char('R') => Control::Restart,
        _ => Control::None,
    }
}

/// Something that can report whether the control gesture is engaged.
///
/// The capture thread hands every terminal event to the source, then
/// publishes `sample` into the `GestureSlot`.
pub trait GestureSource {
    fn handle_event(&mut self, event: &Event, now: Instant) -> Control;
    fn sample(&self, now: Instant) -> GestureSample;
}

/// Parse one landmark frame: whitespace-separated `x,y` pairs in playfield
/// units, in hand-model order.  A blank or malformed line means no hand.
pub fn parse_landmarks(line: &str) -> Option<Vec<Landmark>> {
    let points = line
        .split_whitespace()
        .map(|pair| {
            let (x, y) = pair.split_once(',')?;
            Some(Landmark {
                x: x.trim().parse().ok()?,
                y: y.trim().parse().ok()?,
            })
        })
        .collect::<Option<Vec<_>>>()?;
    if points.is_empty() {
        None
    } else {
        Some(points)
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct HandReading {
    closed: bool,
    pointer: Option<(f32, f32)>,
}

/// Hand-tracking source fed with landmark frames from a detector.
///
/// Clones share one reading, so a feed thread can `update` while the
/// capture thread samples.
#[derive(Clone, Debug)]
pub struct HandGesture {
    threshold: f32,
    reading: Arc<Mutex<HandReading>>,
}

impl HandGesture {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            reading: Arc::default(),
        }
    }

    /// Feed one detector result; `None` means no hand was found.
    pub fn update(&self, landmarks: Option<&[Landmark]>) {
        let reading = match landmarks {
            Some(points) => HandReading {
                closed: classify_hand(points, self.threshold),
                pointer: points.get(INDEX_TIP).map(|p| (p.x, p.y)),
            },
            None => HandReading::default(),
        };
        *self.reading.lock() = reading;
    }

    /// Consume landmark frames until the feed ends.  The hand reads as
    /// open once the feed is gone.
    pub fn read_frames<R: BufRead>(&self, feed: R) -> std::io::Result<usize> {
        let mut frames = 0;
        for line in feed.lines() {
            let line = line?;
            let points = parse_landmarks(&line);
            if points.is_none() && !line.trim().is_empty() {
                log::debug!("unreadable landmark frame: {:?}", line);
            }
            self.update(points.as_deref());
            frames += 1;
        }
        self.update(None);
        Ok(frames)
    }
}

impl GestureSource for HandGesture {
    fn handle_event(&mut self, event: &Event, _now: Instant) -> Control {
        match event {
            Event::Key(key) => control_key(key),
            _ => Control::None,
        }
    }

    fn sample(&self, _now: Instant) -> GestureSample {
        let reading = *self.reading.lock();
        GestureSample {
            closed: reading.closed,
            pointer: reading.pointer,
        }
    }
}

/// Keyboard/mouse stand-in for the hand: Space or the left mouse button held
/// means "closed", and the mouse is the pointer.
///
/// Terminals without key-release events only send repeated presses while a
/// key is held, so Space counts as held for `hold_window` after its last
/// press or repeat.
#[derive(Clone, Debug)]
pub struct KeyboardGesture {
    hold_window: Duration,
    cell_width: f32,
    cell_height: f32,
    space_seen: Option<Instant>,
    mouse_down: bool,
    pointer: Option<(f32, f32)>,
}

impl KeyboardGesture {
    pub fn new(hold_window: Duration, cell_width: f32, cell_height: f32) -> Self {
        Self {
            hold_window,
            cell_width,
            cell_height,
            space_seen: None,
            mouse_down: false,
            pointer: None,
        }
    }

    fn cell_centre(&self, column: u16, row: u16) -> (f32, f32) {
        (
            (column as f32 + 0.5) * self.cell_width,
            (row as f32 + 0.5) * self.cell_height,
        )
    }

    fn handle_key(&mut self, key: &KeyEvent, now: Instant) -> Control {
        match (key.kind, key.code) {
            (KeyEventKind::Press | KeyEventKind::Repeat, KeyCode::Char(' ')) => {
                self.space_seen = Some(now);
                Control::None
            }
            (KeyEventKind::Release, KeyCode::Char(' ')) => {
                self.space_seen = None;
                Control::None
            }
            _ => control_key(key),
        }
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) {
        self.pointer = Some(self.cell_centre(mouse.column, mouse.row));
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.mouse_down = true,
            MouseEventKind::Up(MouseButton::Left) => self.mouse_down = false,
            _ => {}
        }
    }
}

impl GestureSource for KeyboardGesture {
    fn handle_event(&mut self, event: &Event, now: Instant) -> Control {
        match event {
            Event::Key(key) => self.handle_key(key, now),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                Control::None
            }
            _ => Control::None,
        }
    }

    fn sample(&self, now: Instant) -> GestureSample {
        let space_held = self
            .space_seen
            .map(|seen| now.saturating_duration_since(seen) <= self.hold_window)
            .unwrap_or(false);
        GestureSample {
            closed: space_held || self.mouse_down,
            pointer: self.pointer,
        }
    }
}
