//! Omnitrix sandbox: Ben and his aliens in a walled arena, run as a headless scripted session.

mod animation;
mod combat;
mod config;
mod effects;
mod enemy;
mod locomotion;
mod omnitrix;
mod state;
mod wheel;

use std::time::Duration;

use anyhow::Result;
use input::{ElementState, KeyCode};

use config::GameConfig;
use state::GameState;

/// A key going down or up at a point in session time.
struct KeyEvent {
    at: f32,
    key: KeyCode,
    state: ElementState,
}

/// Keyboard timeline that stands in for a player.
struct KeyScript {
    events: Vec<KeyEvent>,
    next: usize,
}

impl KeyScript {
    fn new() -> Self {
        Self { events: Vec::new(), next: 0 }
    }

    /// Press for `hold` seconds.
    fn hold(mut self, at: f32, key: KeyCode, hold: f32) -> Self {
        self.events.push(KeyEvent { at, key, state: ElementState::Pressed });
        self.events.push(KeyEvent { at: at + hold, key, state: ElementState::Released });
        self
    }

    fn tap(self, at: f32, key: KeyCode) -> Self {
        self.hold(at, key, 0.05)
    }

    fn finish(mut self) -> Self {
        self.events.sort_by(|a, b| a.at.total_cmp(&b.at));
        self
    }

    /// Feed every event due by `now`.
    fn play(&mut self, now: f32, state: &mut GameState) {
        while let Some(event) = self.events.get(self.next) {
            if event.at > now {
                break;
            }
            state.input.process_keyboard(event.key, event.state);
            self.next += 1;
        }
    }
}

/// Transform, walk, quick-switch, smash, fly, pick from the wheel, fire and let the watch time out.
fn demo_script() -> KeyScript {
    KeyScript::new()
        .tap(1.0, KeyCode::KeyT)
        .hold(4.0, KeyCode::KeyW, 2.0)
        .tap(7.0, KeyCode::Digit2)
        .tap(10.0, KeyCode::KeyQ)
        .hold(11.0, KeyCode::KeyW, 3.0)
        .tap(14.5, KeyCode::KeyE)
        .tap(16.0, KeyCode::KeyT)
        .tap(19.0, KeyCode::KeyC)
        .tap(20.0, KeyCode::KeyT)
        .tap(22.0, KeyCode::Space)
        .hold(22.5, KeyCode::KeyW, 2.0)
        .tap(25.0, KeyCode::Tab)
        .tap(25.5, KeyCode::ArrowLeft)
        .tap(26.0, KeyCode::Enter)
        .tap(30.0, KeyCode::KeyQ)
        .tap(31.0, KeyCode::KeyE)
        .tap(32.0, KeyCode::KeyV)
        .finish()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║                           OMNITRIX                               ║");
    println!("╠══════════════════════════════════════════════════════════════════╣");
    println!("║  CONTROLS:                                                       ║");
    println!("║    WASD       - Move           │  Mouse      - Orbit camera      ║");
    println!("║    Shift      - Run            │  Space      - Jump / take off   ║");
    println!("║    C          - Cycle alien    │  T          - Transform/revert  ║");
    println!("║    1-9        - Alien hotkeys  │  Tab        - Alien wheel       ║");
    println!("║    Q/E/F      - Abilities      │  V          - Camera zoom       ║");
    println!("╠══════════════════════════════════════════════════════════════════╣");
    println!("║  Headless session: a scripted player runs through the roster.    ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");

    let config = GameConfig::load();
    if std::env::args().any(|arg| arg == "--write-config") {
        config.save();
        log::info!("Wrote config.ron");
        return Ok(());
    }
    log::info!(
        "Starting Omnitrix session: {:.0}s at {:.0} Hz, {} forms",
        config.session_seconds,
        config.tick_rate,
        config.forms.len()
    );

    let mut state = GameState::new(&config)?;
    let mut script = demo_script();
    let step = Duration::from_secs_f64(1.0 / config.tick_rate);

    let mut next_hud = 0.0;
    while state.running && state.time.elapsed_seconds() < config.session_seconds {
        script.play(state.time.elapsed_seconds(), &mut state);
        state.advance(step);
        if state.time.elapsed_seconds() >= next_hud {
            log::debug!("HUD: {}", state.hud());
            next_hud += 1.0;
        }
    }

    log::info!(
        "Session over after {:.1}s ({} frames): {} active, {} flashes, {} enemies down, health {:.0}/{:.0}",
        state.time.elapsed_seconds(),
        state.time.frame_count(),
        state.omnitrix.active_name(),
        state.effects.plays(),
        state.kills,
        state.player.current,
        state.player.max
    );
    log::info!("HUD: {}", state.hud());
    for form in state.omnitrix.registry().iter().skip(1) {
        let cooldown = state.omnitrix.cooldown_remaining(form.id);
        if cooldown > 0.0 {
            log::info!("  {} recharging: {:.1}s", form.name, cooldown);
        }
    }
    Ok(())
}
