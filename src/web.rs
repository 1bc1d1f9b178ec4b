//! JavaScript-facing handle
//!
//! The page owns rendering, audio and the DOM. It forwards key and button
//! events, calls `frame` from `requestAnimationFrame`, and pulls events and
//! entity snapshots as JSON.

use wasm_bindgen::prelude::*;

use crate::camera::FollowCamera;
use crate::platform::{Control, InputMapper, now_ms};
use crate::presentation::{PresentationSink, RunSummaryConsumer};
use crate::session::Session;
use crate::sim::{GameEvent, Hud, RunSummary, SoundEffect, Viewport};
use crate::submission::ScoreSubmitter;
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
}

/// Events waiting for the page to pull them
#[derive(Default)]
struct EventQueue(Vec<GameEvent>);

impl PresentationSink for EventQueue {
    fn play_sound(&mut self, sound: SoundEffect) {
        self.0.push(GameEvent::Sound(sound));
    }

    fn update_hud(&mut self, hud: &Hud) {
        self.0.push(GameEvent::Hud(*hud));
    }

    fn notify(&mut self, event: &GameEvent) {
        self.0.push(event.clone());
    }
}

#[derive(Default)]
struct LastSummary(Option<RunSummary>);

impl RunSummaryConsumer for LastSummary {
    fn on_run_complete(&mut self, summary: &RunSummary) {
        self.0 = Some(*summary);
    }
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn control(name: &str) -> Option<Control> {
    match name {
        "left" => Some(Control::Left),
        "right" => Some(Control::Right),
        "jump" => Some(Control::Jump),
        _ => None,
    }
}

#[wasm_bindgen]
pub struct ClimbGame {
    session: Session<EventQueue, LastSummary>,
    camera: FollowCamera,
    input: InputMapper,
    submitter: ScoreSubmitter,
    last_frame_ms: Option<f64>,
}

#[wasm_bindgen]
impl ClimbGame {
    /// Build a run; `tuning_json` may override any subset of the defaults
    #[wasm_bindgen(constructor)]
    pub fn new(tuning_json: Option<String>) -> Result<ClimbGame, JsValue> {
        let tuning = match tuning_json {
            Some(json) => Tuning::from_json(&json).map_err(js_error)?,
            None => Tuning::default(),
        };
        let seed = js_sys::Date::now() as u64;
        let camera = FollowCamera::new(&tuning);
        log::info!("Climb the Hill initialized with seed: {seed}");
        Ok(Self {
            session: Session::new(seed, tuning, EventQueue::default(), LastSummary::default()),
            camera,
            input: InputMapper::new(),
            submitter: ScoreSubmitter::default(),
            last_frame_ms: None,
        })
    }

    pub fn start(&mut self) {
        self.session.start(now_ms());
    }

    /// Advance one animation frame; `time_ms` is the rAF timestamp
    pub fn frame(&mut self, time_ms: f64) {
        let dt = match self.last_frame_ms {
            Some(last) => ((time_ms - last) / 1000.0) as f32,
            None => crate::consts::SIM_DT,
        };
        self.last_frame_ms = Some(time_ms);

        let input = self.input.sample();
        self.session.advance(&input, dt, time_ms, &self.camera);
        self.camera.follow(self.session.state().player.pos.y);
    }

    /// Returns true when the key is mapped, so the page can prevent scrolling
    pub fn key_down(&mut self, key: &str) -> bool {
        self.input.key_down(key)
    }

    pub fn key_up(&mut self, key: &str) {
        self.input.key_up(key);
    }

    /// Virtual buttons: "left", "right" or "jump"
    pub fn button_down(&mut self, name: &str) {
        if let Some(control) = control(name) {
            self.input.button_down(control);
        }
    }

    pub fn button_up(&mut self, name: &str) {
        if let Some(control) = control(name) {
            self.input.button_up(control);
        }
    }

    /// Page lost focus: nothing stays held
    pub fn blur(&mut self) {
        self.input.release_all();
    }

    pub fn abort(&mut self) {
        self.session.abort();
    }

    pub fn restart(&mut self) {
        let seed = js_sys::Date::now() as u64;
        self.session.restart(seed);
        self.camera = FollowCamera::new(&self.session.state().tuning);
        self.input.release_all();
        self.last_frame_ms = None;
    }

    pub fn score(&self) -> f64 {
        self.session.score() as f64
    }

    pub fn height(&self) -> f32 {
        self.session.height()
    }

    pub fn time_remaining(&self) -> f32 {
        self.session.time_remaining()
    }

    pub fn is_over(&self) -> bool {
        self.session.is_over()
    }

    pub fn scroll_y(&self) -> f32 {
        self.camera.scroll_y()
    }

    /// Events since the last call, as a JSON array
    pub fn drain_events(&mut self) -> Result<String, JsValue> {
        let events = std::mem::take(&mut self.session.presentation_mut().0);
        serde_json::to_string(&events).map_err(js_error)
    }

    /// Player, platforms and collectibles for the renderer
    pub fn snapshot(&self) -> Result<String, JsValue> {
        let state = self.session.state();
        let snapshot = serde_json::json!({
            "player": &state.player,
            "platforms": &state.platforms,
            "collectibles": &state.collectibles,
        });
        serde_json::to_string(&snapshot).map_err(js_error)
    }

    /// Payload for the host's save call, or an error if the run may not be
    /// submitted
    pub fn submit_score(&mut self) -> Result<String, JsValue> {
        let summary = self
            .session
            .summaries()
            .0
            .ok_or_else(|| js_error("run is not over"))?;
        let state = self.session.state();
        let play_seconds = state.tuning.run.duration - state.clock.remaining;
        let payload = self
            .submitter
            .submit(&summary, play_seconds, js_sys::Date::now())
            .map_err(js_error)?;
        payload.to_json().map_err(js_error)
    }
}
