//! Climb the Hill headless demo
//!
//! Plays one run natively with a simple autopilot and logs the result. The
//! browser build is driven from JavaScript through the `web` module instead.
//!
//! Usage: `climb-the-hill [seed] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match demo::run(std::env::args().skip(1).collect()) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `web::init`, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use climb_the_hill::platform::{Control, InputMapper};
    use climb_the_hill::sim::GameState;
    use climb_the_hill::submission::ScoreSubmitter;
    use climb_the_hill::{FollowCamera, LogSink, Session, Tuning, TuningError};

    const FRAME_MS: f64 = 1000.0 / 60.0;

    pub fn run(args: Vec<String>) -> Result<(), TuningError> {
        let seed = args.first().and_then(|s| s.parse().ok()).unwrap_or(42);
        let tuning = match args.get(1) {
            Some(path) => {
                log::info!("loading tuning from {path}");
                Tuning::load(path)?
            }
            None => Tuning::default(),
        };

        let mut camera = FollowCamera::new(&tuning);
        let mut session = Session::new(seed, tuning, LogSink::default(), LogSink::default());
        let mut input = InputMapper::new();

        // Simulated clock so the demo finishes instantly
        let mut now = 0.0;
        session.start(now);
        while !session.is_over() {
            steer(session.state(), &mut input);
            now += FRAME_MS;
            session.advance(&input.sample(), (FRAME_MS / 1000.0) as f32, now, &camera);
            camera.follow(session.state().player.pos.y);
        }

        if let Some(summary) = session.summary() {
            let played = session.state().tuning.run.duration - session.time_remaining();
            match ScoreSubmitter::default().submit(&summary, played, now) {
                Ok(payload) => match payload.to_json() {
                    Ok(json) => log::info!("payload: {json}"),
                    Err(e) => log::warn!("{e}"),
                },
                Err(e) => log::warn!("not submitted: {e}"),
            }
        }
        Ok(())
    }

    fn hold(input: &mut InputMapper, control: Control, on: bool) {
        if on {
            input.button_down(control);
        } else {
            input.button_up(control);
        }
    }

    /// Head for the closest platform a jump above, jumping whenever possible
    fn steer(state: &GameState, input: &mut InputMapper) {
        let player = &state.player;
        let target = state
            .platforms
            .iter()
            .filter(|p| p.active && p.pos.y < player.pos.y - 20.0 && p.pos.y > player.pos.y - 160.0)
            .min_by(|a, b| {
                (a.pos.x - player.pos.x)
                    .abs()
                    .total_cmp(&(b.pos.x - player.pos.x).abs())
            });
        let dx = target.map_or(0.0, |p| p.pos.x - player.pos.x);
        hold(input, Control::Left, dx < -12.0);
        hold(input, Control::Right, dx > 12.0);

        let wants_jump = player.grounded || (player.vel.y > 0.0 && player.jumps_remaining > 0);
        // Release first so every wanted jump is a fresh press
        input.button_up(Control::Jump);
        hold(input, Control::Jump, wants_jump);
    }
}
