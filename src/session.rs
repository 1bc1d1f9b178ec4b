//! One run from start to summary
//!
//! `Session` drives the simulation the way the game loop does: fixed substeps
//! per render frame, the slow clock on wall-clock time, and events forwarded
//! to the injected presentation and summary collaborators.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::presentation::{PresentationSink, RunSummaryConsumer, dispatch};
use crate::sim::{EndReason, GameEvent, GameState, RunSummary, TickInput, Viewport, clock, tick};
use crate::tuning::Tuning;

pub struct Session<P, R> {
    state: GameState,
    presentation: P,
    summaries: R,
    accumulator: f32,
    /// Jump press waiting for the next substep
    pending_press: bool,
    summary_delivered: bool,
}

impl<P: PresentationSink, R: RunSummaryConsumer> Session<P, R> {
    pub fn new(seed: u64, tuning: Tuning, presentation: P, summaries: R) -> Self {
        Self {
            state: GameState::new(seed, tuning),
            presentation,
            summaries,
            accumulator: 0.0,
            pending_press: false,
            summary_delivered: false,
        }
    }

    pub fn start(&mut self, now_ms: f64) {
        self.state.start(now_ms);
        self.flush();
    }

    /// Advance one render frame of `frame_dt` seconds.
    ///
    /// The frame is split into fixed substeps; the jump press reaches only
    /// the first one. The slow clock runs whenever its interval has passed.
    pub fn advance(&mut self, input: &TickInput, frame_dt: f32, now_ms: f64, view: &impl Viewport) {
        if !self.state.is_running() {
            // Presses outside a run never carry into one
            self.pending_press = false;
            self.flush();
            return;
        }
        self.pending_press |= input.jump_pressed;

        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let step = TickInput {
                jump_pressed: self.pending_press,
                ..input.clone()
            };
            tick(&mut self.state, &step, SIM_DT);
            self.pending_press = false;
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog rather than spiral
            self.accumulator = self.accumulator.min(SIM_DT);
        }

        let interval = self.state.tuning.run.clock_interval_ms;
        if now_ms - self.state.clock.last_clock_ms >= interval {
            clock(&mut self.state, now_ms, view);
        }
        self.flush();
    }

    /// End the run now; a finished run is left alone
    pub fn abort(&mut self) {
        if self.state.is_running() {
            self.state.end_run(EndReason::Aborted);
        }
        self.flush();
    }

    /// Throw the current run away and build a fresh one with the same tuning
    pub fn restart(&mut self, seed: u64) {
        let tuning = self.state.tuning.clone();
        self.state = GameState::new(seed, tuning);
        self.accumulator = 0.0;
        self.pending_press = false;
        self.summary_delivered = false;
        log::info!("restarted with seed {seed}");
    }

    fn flush(&mut self) {
        for event in self.state.drain_events() {
            dispatch(&mut self.presentation, &event);
            if let GameEvent::RunEnded(summary) = event {
                if !self.summary_delivered {
                    self.summary_delivered = true;
                    self.summaries.on_run_complete(&summary);
                }
            }
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn score(&self) -> u64 {
        self.state.progress.score
    }

    /// Displayed height in meters
    pub fn height(&self) -> f32 {
        self.state.progress.height
    }

    pub fn time_remaining(&self) -> f32 {
        self.state.clock.remaining
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    pub fn summary(&self) -> Option<RunSummary> {
        self.state.summary
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    pub fn presentation_mut(&mut self) -> &mut P {
        &mut self.presentation
    }

    pub fn summaries(&self) -> &R {
        &self.summaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::FollowCamera;
    use crate::sim::{Hud, SoundEffect};

    #[derive(Default)]
    struct Recorder {
        sounds: Vec<SoundEffect>,
        huds: Vec<Hud>,
        notices: Vec<GameEvent>,
    }

    impl PresentationSink for Recorder {
        fn play_sound(&mut self, sound: SoundEffect) {
            self.sounds.push(sound);
        }
        fn update_hud(&mut self, hud: &Hud) {
            self.huds.push(*hud);
        }
        fn notify(&mut self, event: &GameEvent) {
            self.notices.push(event.clone());
        }
    }

    #[derive(Default)]
    struct Summaries(Vec<RunSummary>);

    impl RunSummaryConsumer for Summaries {
        fn on_run_complete(&mut self, summary: &RunSummary) {
            self.0.push(*summary);
        }
    }

    fn session(seed: u64) -> Session<Recorder, Summaries> {
        Session::new(seed, Tuning::default(), Recorder::default(), Summaries::default())
    }

    /// Play `frames` frames at 60 fps starting at `start_ms`; returns the end time
    fn play(
        session: &mut Session<Recorder, Summaries>,
        camera: &mut FollowCamera,
        input: &TickInput,
        start_ms: f64,
        frames: usize,
    ) -> f64 {
        let mut now = start_ms;
        for _ in 0..frames {
            now += 1000.0 / 60.0;
            session.advance(input, 1.0 / 60.0, now, camera);
            camera.follow(session.state().player.pos.y);
        }
        now
    }

    #[test]
    fn test_full_run_times_out() {
        let mut session = session(2024);
        let mut camera = FollowCamera::new(&session.state().tuning);
        session.start(0.0);
        assert_eq!(session.time_remaining(), 60.0);

        play(&mut session, &mut camera, &TickInput::default(), 0.0, 60 * 61);

        assert!(session.is_over());
        let summary = session.summary().expect("summary");
        assert_eq!(summary.reason, EndReason::TimeUp);
        assert!(!summary.victory);
        assert_eq!(session.summaries().0, vec![summary]);
        assert_eq!(session.time_remaining(), 0.0);
        assert!(session.presentation().sounds.contains(&SoundEffect::GameOver));
        assert!(!session.presentation().huds.is_empty());
        let notices = &session.presentation().notices;
        assert!(notices.iter().any(|e| matches!(e, GameEvent::RunStarted { seed: 2024 })));
        assert!(notices.iter().any(|e| matches!(e, GameEvent::RunEnded(_))));

        // More frames and an abort after the end change nothing
        play(&mut session, &mut camera, &TickInput::default(), 61_000.0, 30);
        session.abort();
        assert_eq!(session.summaries().0.len(), 1);
    }

    #[test]
    fn test_abort_delivers_summary_once() {
        let mut session = session(5);
        session.start(0.0);
        session.abort();
        session.abort();
        assert_eq!(session.summaries().0.len(), 1);
        assert_eq!(session.summary().map(|s| s.reason), Some(EndReason::Aborted));
    }

    #[test]
    fn test_press_reaches_one_substep() {
        let mut session = session(9);
        let mut camera = FollowCamera::new(&session.state().tuning);
        session.start(0.0);
        let now = play(&mut session, &mut camera, &TickInput::default(), 0.0, 30);
        assert!(session.state().player.grounded);

        // A long frame with the press held: exactly one jump, no air jump
        let press = TickInput {
            jump_pressed: true,
            jump_held: true,
            ..Default::default()
        };
        session.advance(&press, 0.05, now + 50.0, &camera);
        let jumps = session
            .presentation()
            .sounds
            .iter()
            .filter(|s| matches!(s, SoundEffect::Jump | SoundEffect::DoubleJump))
            .count();
        assert_eq!(jumps, 1);
        assert_eq!(session.state().player.jumps_remaining, 1);
    }

    #[test]
    fn test_short_frame_keeps_press_latched() {
        let mut session = session(9);
        let mut camera = FollowCamera::new(&session.state().tuning);
        session.start(0.0);
        let now = play(&mut session, &mut camera, &TickInput::default(), 0.0, 30);

        let press = TickInput {
            jump_pressed: true,
            jump_held: true,
            ..Default::default()
        };
        // Too short for a substep: nothing happens yet
        session.accumulator = 0.0;
        session.advance(&press, 0.001, now + 1.0, &camera);
        assert!(session.state().player.grounded);
        let held = TickInput {
            jump_held: true,
            ..Default::default()
        };
        session.advance(&held, 1.0 / 60.0, now + 18.0, &camera);
        assert!(session.state().player.vel.y < 0.0);
    }

    #[test]
    fn test_press_before_start_is_dropped() {
        let mut session = session(9);
        let camera = FollowCamera::new(&session.state().tuning);
        let press = TickInput {
            jump_pressed: true,
            ..Default::default()
        };
        session.advance(&press, 1.0 / 60.0, 0.0, &camera);
        assert!(!session.pending_press);

        session.start(0.0);
        session.advance(&TickInput::default(), 1.0 / 60.0, 16.0, &camera);
        assert!(!session.presentation().sounds.iter().any(|s| matches!(
            s,
            SoundEffect::Jump | SoundEffect::DoubleJump
        )));
        assert_eq!(session.state().player.jumps_remaining, session.state().player.max_jumps);
    }

    #[test]
    fn test_restart_builds_fresh_run() {
        let mut session = session(1);
        session.start(0.0);
        session.abort();
        session.restart(2);
        assert!(!session.is_over());
        assert_eq!(session.state().seed, 2);
        assert!(session.summary().is_none());

        session.start(10_000.0);
        session.abort();
        assert_eq!(session.summaries().0.len(), 2);
    }
}
