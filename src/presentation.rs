//! Presentation collaborators
//!
//! The core never plays audio or touches the DOM. It hands cues to a
//! [`PresentationSink`] and the final stats to a [`RunSummaryConsumer`].

use crate::sim::{GameEvent, Hud, RunSummary, SoundEffect};

/// Receives sound cues, HUD values and notifications
pub trait PresentationSink {
    fn play_sound(&mut self, sound: SoundEffect);
    fn update_hud(&mut self, hud: &Hud);
    /// Everything that is neither a sound nor a HUD refresh
    fn notify(&mut self, event: &GameEvent);
}

/// Receives the frozen stats of a finished run
pub trait RunSummaryConsumer {
    fn on_run_complete(&mut self, summary: &RunSummary);
}

/// Route one event to the matching sink method
pub fn dispatch(sink: &mut impl PresentationSink, event: &GameEvent) {
    match event {
        GameEvent::Sound(sound) => sink.play_sound(*sound),
        GameEvent::Hud(hud) => sink.update_hud(hud),
        other => sink.notify(other),
    }
}

/// Writes everything to the `log` facade. Used by the headless demo.
#[derive(Debug, Default)]
pub struct LogSink {
    last_hud: Option<Hud>,
}

impl LogSink {
    pub fn last_hud(&self) -> Option<&Hud> {
        self.last_hud.as_ref()
    }
}

impl PresentationSink for LogSink {
    fn play_sound(&mut self, sound: SoundEffect) {
        log::trace!("sound: {sound:?}");
    }

    fn update_hud(&mut self, hud: &Hud) {
        self.last_hud = Some(*hud);
    }

    fn notify(&mut self, event: &GameEvent) {
        match event {
            GameEvent::HeightMilestone { meters, major } => {
                log::info!("{}{meters}m reached", if *major { "major milestone: " } else { "" });
            }
            GameEvent::ScoreChanged { score, points, .. } => {
                log::debug!("+{points} ({score})");
            }
            other => log::debug!("{other:?}"),
        }
    }
}

impl RunSummaryConsumer for LogSink {
    fn on_run_complete(&mut self, summary: &RunSummary) {
        log::info!(
            "final score {} at {:.1}m with {} items ({:?})",
            summary.score,
            summary.max_height,
            summary.items_collected,
            summary.reason
        );
    }
}
