/// Rendering layer — all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable `Snapshot`.
/// No game logic is performed; this module only maps playfield units onto
/// terminal cells and queues crossterm commands.

use std::io::Write;

use crossterm::{
    cursor,
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Attribute, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};

use crate::entities::{AvatarSnapshot, GameStatus, ObstacleSnapshot, Playfield, Rect, Snapshot};
use crate::error::Result as GameResult;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_SKY_TEXT: Color = Color::White;
const C_SCORE: Color = Color::Yellow;
const C_GESTURE_ON: Color = Color::Green;
const C_GESTURE_OFF: Color = Color::DarkGrey;
const C_BIRD: Color = Color::Yellow;
const C_OBSTACLE: Color = Color::Red;
const C_GROUND_TOP: Color = Color::Green;
const C_GROUND: Color = Color::DarkYellow;
const C_BUTTON: Color = Color::Cyan;
const C_HINT: Color = Color::DarkGrey;

/// Ground texture, repeated and shifted by the scroll offset.
const GROUND_PATTERN: &[char] = &['▚', '▞'];

/// Wing positions for the flap animation.
const WING_FRAMES: &[char] = &['^', '-', 'v'];

const BIRD_BODY: char = '█';

// ── Terminal ↔ playfield mapping ──────────────────────────────────────────────

/// How the playfield is laid over the terminal grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct View {
    pub cols: u16,
    pub rows: u16,
    /// Playfield units per cell.
    pub cell_width: f32,
    pub cell_height: f32,
}

impl View {
    pub fn new(cols: u16, rows: u16, cell_width: f32, cell_height: f32) -> Self {
        Self { cols, rows, cell_width, cell_height }
    }

    /// The playfield exactly covering this terminal.
    pub fn playfield(&self) -> GameResult<Playfield> {
        Playfield::new(
            self.cols as f32 * self.cell_width,
            self.rows as f32 * self.cell_height,
        )
    }

    pub fn column(&self, x: f32) -> i32 {
        (x / self.cell_width).floor() as i32
    }

    pub fn row(&self, y: f32) -> i32 {
        (y / self.cell_height).floor() as i32
    }

    /// Every cell a rectangle touches, as inclusive
    /// `(first_col, first_row, last_col, last_row)`.  May lie off screen.
    pub fn span(&self, rect: &Rect) -> (i32, i32, i32, i32) {
        let first_col = self.column(rect.left);
        let first_row = self.row(rect.top);
        let last_col = ((rect.right() / self.cell_width).ceil() as i32 - 1).max(first_col);
        let last_row = ((rect.bottom() / self.cell_height).ceil() as i32 - 1).max(first_row);
        (first_col, first_row, last_col, last_row)
    }

    /// Cell containing the point, if it is on screen.
    pub fn cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        let (col, row) = (self.column(x), self.row(y));
        if col < 0 || row < 0 || col >= self.cols as i32 || row >= self.rows as i32 {
            return None;
        }
        Some((col as u16, row as u16))
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

// ── Screen session ────────────────────────────────────────────────────────────

/// Switch to the alternate screen with mouse capture and, where the terminal
/// supports it, key-release reporting.  Returns whether the keyboard flags
/// were pushed.
fn enter_game_screen<W: Write>(out: &mut W) -> std::io::Result<bool> {
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;
    // Key-release events let a released Space open the hand immediately;
    // terminals without them fall back to the hold window.
    Ok(out
        .execute(PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))
        .is_ok())
}

fn leave_game_screen<W: Write>(out: &mut W, keyboard_enhanced: bool) {
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
}

/// Run `body` on the game screen.  The screen is left again however it
/// ends, including when entering it failed halfway, in which case `body`
/// never runs.
pub fn with_game_screen<W, T, F>(out: &mut W, body: F) -> std::io::Result<T>
where
    W: Write,
    F: FnOnce(&mut W) -> std::io::Result<T>,
{
    let (result, keyboard_enhanced) = match enter_game_screen(out) {
        Ok(enhanced) => (body(out), enhanced),
        Err(e) => (Err(e), false),
    };
    leave_game_screen(out, keyboard_enhanced);
    result
}

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    snapshot: &Snapshot,
    view: &View,
    hand_closed: bool,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    for obstacle in &snapshot.obstacles {
        draw_obstacle(out, obstacle, view)?;
    }
    draw_bird(out, &snapshot.avatar, view)?;
    draw_ground(out, snapshot, view)?;
    draw_hud(out, snapshot, view, hand_closed)?;

    match snapshot.status {
        GameStatus::Idle => draw_start_prompt(out, view)?,
        GameStatus::Flying => {}
        GameStatus::GameOver => draw_game_over(out, snapshot, view)?,
    }

    draw_controls_hint(out, view)?;

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

fn print_centered<W: Write>(out: &mut W, view: &View, row: u16, text: &str, color: Color) -> std::io::Result<()> {
    let col = (view.cols / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

/// Middle row of the bird, `width` cells wide: wing, body, eye, beak.
/// The beak follows the derived rotation.
fn bird_sprite(avatar: &AvatarSnapshot, width: usize) -> String {
    let wing = WING_FRAMES[avatar.frame % WING_FRAMES.len()];
    let beak = if avatar.rotation > 4.0 {
        '⌃'
    } else if avatar.rotation < -4.0 {
        '⌄'
    } else {
        '>'
    };
    (0..width)
        .map(|i| {
            if i + 1 == width {
                beak
            } else if i == 0 {
                wing
            } else if i + 2 == width {
                'o'
            } else {
                BIRD_BODY
            }
        })
        .collect()
}

/// The bird fills every cell its hitbox touches, so what is drawn touching
/// an obstacle is exactly what collides.  Each entry is `(col, row, text)`,
/// clipped to the screen.
fn bird_cells(avatar: &AvatarSnapshot, view: &View) -> Vec<(u16, u16, String)> {
    let (left, top, right, bottom) = view.span(&avatar.bounds());
    let first_col = left.max(0);
    let last_col = right.min(view.cols as i32 - 1);
    if first_col > last_col {
        return Vec::new();
    }
    let width = (right - left + 1) as usize;
    let skip = (first_col - left) as usize;
    let take = (last_col - first_col + 1) as usize;
    let middle = view.row(avatar.y);

    (top.max(0)..=bottom.min(view.rows as i32 - 1))
        .map(|row| {
            let full = if row == middle {
                bird_sprite(avatar, width)
            } else {
                BIRD_BODY.to_string().repeat(width)
            };
            let text = full.chars().skip(skip).take(take).collect();
            (first_col as u16, row as u16, text)
        })
        .collect()
}

fn draw_bird<W: Write>(out: &mut W, avatar: &AvatarSnapshot, view: &View) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_BIRD))?;
    out.queue(style::SetAttribute(Attribute::Bold))?;
    for (col, row, text) in bird_cells(avatar, view) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(Print(text))?;
    }
    out.queue(style::SetAttribute(Attribute::Reset))?;
    Ok(())
}

/// Fill every cell whose centre lies inside the disc.
fn draw_obstacle<W: Write>(out: &mut W, obstacle: &ObstacleSnapshot, view: &View) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_OBSTACLE))?;
    let first_col = view.column(obstacle.x - obstacle.radius).max(0);
    let last_col = view.column(obstacle.x + obstacle.radius).min(view.cols as i32 - 1);
    let first_row = view.row(obstacle.y - obstacle.radius).max(0);
    let last_row = view.row(obstacle.y + obstacle.radius).min(view.rows as i32 - 1);

    for row in first_row..=last_row {
        for col in first_col..=last_col {
            let cx = (col as f32 + 0.5) * view.cell_width;
            let cy = (row as f32 + 0.5) * view.cell_height;
            let (dx, dy) = (cx - obstacle.x, cy - obstacle.y);
            if dx * dx + dy * dy <= obstacle.radius * obstacle.radius {
                out.queue(cursor::MoveTo(col as u16, row as u16))?;
                out.queue(Print("●"))?;
            }
        }
    }
    Ok(())
}

// ── Ground ────────────────────────────────────────────────────────────────────

fn draw_ground<W: Write>(out: &mut W, snapshot: &Snapshot, view: &View) -> std::io::Result<()> {
    let top = view.row(snapshot.ground_y).clamp(0, view.rows as i32 - 1) as u16;
    let shift = (-snapshot.ground_scroll / view.cell_width).floor() as usize;

    let surface: String = (0..view.cols as usize)
        .map(|i| GROUND_PATTERN[(i + shift) % GROUND_PATTERN.len()])
        .collect();
    out.queue(cursor::MoveTo(0, top))?;
    out.queue(style::SetForegroundColor(C_GROUND_TOP))?;
    out.queue(Print(&surface))?;

    // Leave the last row for the controls hint.
    let fill = "▒".repeat(view.cols as usize);
    out.queue(style::SetForegroundColor(C_GROUND))?;
    for row in top + 1..view.rows.saturating_sub(1) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print(&fill))?;
    }
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, snapshot: &Snapshot, view: &View, hand_closed: bool) -> std::io::Result<()> {
    // Gesture status — left
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(if hand_closed { C_GESTURE_ON } else { C_GESTURE_OFF }))?;
    out.queue(Print(format!("Hand Closed: {}", hand_closed)))?;

    // Score — centre
    out.queue(style::SetAttribute(Attribute::Bold))?;
    print_centered(out, view, 0, &snapshot.score.to_string(), C_SCORE)?;
    out.queue(style::SetAttribute(Attribute::Reset))?;
    Ok(())
}

fn draw_start_prompt<W: Write>(out: &mut W, view: &View) -> std::io::Result<()> {
    let row = (view.rows / 3).max(2);
    print_centered(out, view, row, "Close your hand to flap", C_SKY_TEXT)
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

/// Cells covered by a playfield rectangle, clamped to the screen.
fn rect_cells(rect: &Rect, view: &View) -> (u16, u16, u16, u16) {
    let clamp_col = |c: i32| c.clamp(0, view.cols as i32 - 1) as u16;
    let clamp_row = |r: i32| r.clamp(0, view.rows as i32 - 1) as u16;
    let (left, top, right, bottom) = view.span(rect);
    (clamp_col(left), clamp_row(top), clamp_col(right), clamp_row(bottom))
}

fn draw_game_over<W: Write>(out: &mut W, snapshot: &Snapshot, view: &View) -> std::io::Result<()> {
    let (left, top, right, bottom) = rect_cells(&snapshot.restart_button, view);
    let inner = right.saturating_sub(left).saturating_sub(1) as usize;

    let title_row = top.saturating_sub(3);
    print_centered(out, view, title_row, "GAME  OVER", Color::Red)?;
    let score_line = format!("Score: {}", snapshot.score);
    print_centered(out, view, title_row + 1, &score_line, C_SCORE)?;

    // Restart button
    out.queue(style::SetForegroundColor(C_BUTTON))?;
    out.queue(cursor::MoveTo(left, top))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(inner))))?;
    for row in top + 1..bottom {
        out.queue(cursor::MoveTo(left, row))?;
        out.queue(Print(format!("│{}│", " ".repeat(inner))))?;
    }
    out.queue(cursor::MoveTo(left, bottom.max(top + 1)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(inner))))?;

    let label_row = top + (bottom.saturating_sub(top)) / 2;
    print_centered(out, view, label_row.max(top), "RESTART", C_BUTTON)?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &View) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("SPACE / click : Close hand   Click RESTART or R : Restart   Q : Quit"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Obstacle;

    #[test]
    fn test_view_maps_units_to_cells() {
        let view = View::new(80, 30, 10.0, 20.0);
        assert_eq!(view.cell(0.0, 0.0), Some((0, 0)));
        assert_eq!(view.cell(799.0, 599.0), Some((79, 29)));
        assert_eq!(view.cell(800.0, 10.0), None);
        assert_eq!(view.cell(-1.0, 10.0), None);
    }

    #[test]
    fn test_view_playfield_dimensions() {
        let view = View::new(80, 30, 10.0, 20.0);
        let field = view.playfield().unwrap();
        assert!((field.width() - 800.0).abs() < f32::EPSILON);
        assert!((field.height() - 600.0).abs() < f32::EPSILON);
        assert!(View::new(0, 30, 10.0, 20.0).playfield().is_err());
    }

    #[test]
    fn test_bird_sprite_tilts_with_rotation() {
        let mut avatar = AvatarSnapshot { x: 0.0, y: 0.0, width: 1.0, height: 1.0, rotation: 0.0, frame: 0 };
        assert_eq!(bird_sprite(&avatar, 3), "^o>");
        avatar.rotation = 20.0;
        avatar.frame = 1;
        assert_eq!(bird_sprite(&avatar, 3), "-o⌃");
        avatar.rotation = -16.0;
        avatar.frame = 2;
        assert_eq!(bird_sprite(&avatar, 5), "v██o⌄");
        assert_eq!(bird_sprite(&avatar, 1), "⌄");
    }

    #[test]
    fn test_render_writes_score_and_flushes() {
        let view = View::new(80, 30, 10.0, 20.0);
        let field = view.playfield().unwrap();
        let snapshot = Snapshot {
            avatar: AvatarSnapshot { x: 100.0, y: 300.0, width: 80.0, height: 60.0, rotation: 0.0, frame: 0 },
            obstacles: vec![ObstacleSnapshot { x: 400.0, y: 200.0, radius: 25.0 }],
            score: 7,
            status: GameStatus::GameOver,
            ground_scroll: -12.0,
            ground_y: 540.0,
            playfield: field,
            restart_button: Rect { left: 350.0, top: 275.0, width: 100.0, height: 50.0 },
        };
        let mut buf: Vec<u8> = Vec::new();
        render(&mut buf, &snapshot, &view, true).unwrap();
        let text = String::from_utf8_lossy(&buf);
        assert!(text.contains("Hand Closed: true"));
        assert!(text.contains("GAME  OVER"));
        assert!(text.contains("RESTART"));
        assert!(text.contains("●"));
    }

    fn flying_snapshot(view: &View, score: u32) -> Snapshot {
        Snapshot {
            avatar: AvatarSnapshot { x: 100.0, y: 300.0, width: 80.0, height: 60.0, rotation: 0.0, frame: 0 },
            obstacles: Vec::new(),
            score,
            status: GameStatus::Flying,
            ground_scroll: 0.0,
            ground_y: 540.0,
            playfield: view.playfield().unwrap(),
            restart_button: Rect { left: 350.0, top: 275.0, width: 100.0, height: 50.0 },
        }
    }

    #[test]
    fn test_bird_covers_its_hitbox() {
        let view = View::new(80, 30, 10.0, 20.0);
        let avatar = AvatarSnapshot { x: 100.0, y: 300.0, width: 80.0, height: 60.0, rotation: 0.0, frame: 0 };
        let cells = bird_cells(&avatar, &view);

        // Hitbox 60..140 x 270..330 touches columns 6..=13 and rows 13..=16.
        let rows: Vec<u16> = cells.iter().map(|(_, row, _)| *row).collect();
        assert_eq!(rows, vec![13, 14, 15, 16]);
        for (col, _, text) in &cells {
            assert_eq!(*col, 6);
            assert_eq!(text.chars().count(), 8);
        }
        assert_eq!(cells[2].2, "^█████o>");

        // An obstacle that collides is drawn against the bird, not beside it.
        let obstacle = Obstacle { x: avatar.x + 62.0, y: avatar.y, radius: 25.0 };
        assert!(obstacle.overlaps(&avatar.bounds()));
        let bird_right = cells[0].0 as i32 + cells[0].2.chars().count() as i32 - 1;
        assert!(view.column(obstacle.x - obstacle.radius) <= bird_right);
    }

    #[test]
    fn test_bird_clipped_at_left_edge() {
        let view = View::new(80, 30, 10.0, 20.0);
        let avatar = AvatarSnapshot { x: 20.0, y: 300.0, width: 80.0, height: 60.0, rotation: 0.0, frame: 0 };
        let cells = bird_cells(&avatar, &view);
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[2], (0, 15, "████o>".to_string()));
    }

    #[test]
    fn test_score_is_on_the_top_row() {
        let view = View::new(80, 30, 10.0, 20.0);
        let mut buf: Vec<u8> = Vec::new();
        render(&mut buf, &flying_snapshot(&view, 7), &view, false).unwrap();
        let text = String::from_utf8_lossy(&buf);
        // MoveTo(40, 0), 1-based in the escape sequence.
        assert!(text.contains("\x1b[1;41H"));
        assert!(!text.contains("\x1b[2;41H"));
    }

    /// Writer whose first write fails, as a terminal that rejects the
    /// alternate screen would.
    struct RejectingTerminal {
        reject_next: bool,
        written: Vec<u8>,
    }

    impl Write for RejectingTerminal {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.reject_next {
                self.reject_next = false;
                return Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "rejected"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_screen_setup_still_restores() {
        let mut term = RejectingTerminal { reject_next: true, written: Vec::new() };
        let mut ran = false;
        let result = with_game_screen(&mut term, |_| {
            ran = true;
            Ok(())
        });
        assert!(result.is_err());
        assert!(!ran);
        let text = String::from_utf8_lossy(&term.written);
        assert!(text.contains("\x1b[?25h"), "cursor not shown again");
        assert!(text.contains("\x1b[?1049l"), "alternate screen not left");
    }

    #[test]
    fn test_game_screen_is_left_after_body() {
        let mut buf: Vec<u8> = Vec::new();
        let result = with_game_screen(&mut buf, |out| {
            out.write_all(b"frame")?;
            Ok(5)
        });
        assert_eq!(result.unwrap(), 5);
        let text = String::from_utf8_lossy(&buf);
        let entered = text.find("\x1b[?1049h").unwrap();
        let frame = text.find("frame").unwrap();
        let left = text.find("\x1b[?1049l").unwrap();
        assert!(entered < frame && frame < left);
    }
}
