use std::fs::File;
use std::io::{stdout, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{event, terminal};
use rand::thread_rng;

use flappy_gesture::clock::Scheduler;
use flappy_gesture::compute::Game;
use flappy_gesture::config::GameConfig;
use flappy_gesture::display::{self, View};
use flappy_gesture::error::{GameError, Result};
use flappy_gesture::gesture::{Control, GestureSlot, GestureSource, HandGesture, KeyboardGesture};

/// How long the capture thread blocks waiting for a terminal event before
/// republishing the current reading.
const CAPTURE_POLL: Duration = Duration::from_millis(5);

// ── Logging ───────────────────────────────────────────────────────────────────

/// The terminal is the render surface, so logs go to a file.
/// Filtering follows `RUST_LOG`, defaulting to `info`.
fn init_logging(config: &GameConfig) -> Result<()> {
    let file = std::fs::File::create(&config.log.file)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .map_err(|e| GameError::Logger(e.to_string()))
}

// ── Gesture capture ───────────────────────────────────────────────────────────

/// Dedicate a thread to reading terminal input and turning it into gesture
/// samples, so the game loop never blocks on I/O.
fn spawn_capture<S>(slot: GestureSlot, mut source: S) -> thread::JoinHandle<()>
where
    S: GestureSource + Send + 'static,
{
    thread::spawn(move || {
        while !slot.quit_requested() {
            match event::poll(CAPTURE_POLL) {
                Ok(true) => match event::read() {
                    Ok(ev) => match source.handle_event(&ev, Instant::now()) {
                        Control::Quit => slot.request_quit(),
                        Control::Restart => slot.request_restart(),
                        Control::None => {}
                    },
                    Err(e) => {
                        log::error!("terminal input failed: {}", e);
                        slot.request_quit();
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    log::error!("terminal poll failed: {}", e);
                    slot.request_quit();
                }
            }
            slot.publish(source.sample(Instant::now()));
        }
    })
}

/// Read landmark frames from an external hand tracker.  Opening a FIFO
/// blocks until the tracker connects, so this runs on its own thread.  It is
/// never joined: a blocked read cannot be interrupted, and it ends with the
/// process.
fn spawn_landmark_feed(path: PathBuf, hand: HandGesture) {
    thread::spawn(move || {
        let result = File::open(&path).and_then(|file| hand.read_frames(BufReader::new(file)));
        match result {
            Ok(frames) => log::info!("landmark feed {} closed after {} frames", path.display(), frames),
            Err(e) => log::error!("landmark feed {} failed: {}", path.display(), e),
        }
    });
}

/// Start capture from the configured gesture source.
fn start_capture(config: &GameConfig, slot: &GestureSlot) -> thread::JoinHandle<()> {
    match &config.gesture.landmark_feed {
        Some(path) => {
            log::info!("reading hand landmarks from {}", path.display());
            let hand = HandGesture::new(config.gesture.closed_hand_threshold);
            spawn_landmark_feed(path.clone(), hand.clone());
            spawn_capture(slot.clone(), hand)
        }
        None => spawn_capture(
            slot.clone(),
            KeyboardGesture::new(
                config.hold_window(),
                config.terminal.cell_width,
                config.terminal.cell_height,
            ),
        ),
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Fixed-rate loop: read the latest gesture, step the game, draw the
/// snapshot, sleep out the frame.  Returns when a quit is requested.
fn game_loop<W: Write>(
    out: &mut W,
    game: &mut Game,
    view: &View,
    slot: &GestureSlot,
    scheduler: &Scheduler,
) -> std::io::Result<()> {
    let mut rng = thread_rng();
    let dt = scheduler.tick_duration();

    while !slot.quit_requested() {
        let frame_start = Instant::now();

        let sample = slot.latest();
        let input = sample.frame_input(&game.restart_button(), slot.take_restart());
        let snapshot = game.step(input, dt, &mut rng);

        display::render(out, &snapshot, view, sample.closed)?;

        scheduler.pace(frame_start);
    }
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let config = GameConfig::load()?;
    init_logging(&config)?;
    log::info!("starting with config {:?}", config);

    let (cols, rows) = terminal::size()?;
    let view = View::new(cols, rows, config.terminal.cell_width, config.terminal.cell_height);
    let playfield = view.playfield()?;
    log::info!(
        "playfield {}x{} units on a {}x{} terminal",
        playfield.width(),
        playfield.height(),
        cols,
        rows
    );

    let mut out = BufWriter::new(stdout());
    let slot = GestureSlot::new();
    let mut game = Game::new(&config, playfield);
    let scheduler = Scheduler::from_rate(config.world.tick_rate_hz);

    terminal::enable_raw_mode()?;
    let result = display::with_game_screen(&mut out, |out| {
        let capture = start_capture(&config, &slot);
        let result = game_loop(out, &mut game, &view, &slot, &scheduler);
        slot.request_quit();
        if capture.join().is_err() {
            log::warn!("capture thread panicked");
        }
        result
    });
    let _ = terminal::disable_raw_mode();

    log::info!("exiting with score {}", game.score());
    result.map_err(GameError::from)
}
