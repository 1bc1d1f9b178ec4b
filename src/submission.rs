//! Score submission checks
//!
//! Saving scores belongs to the host page. This module only decides whether a
//! finished run may be submitted and builds the JSON payload handed over.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::{EndReason, RunSummary};

pub const GAME_NAME: &str = "ClimbTheHill";

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("score {score} is outside 0..={max}")]
    InvalidScore { score: u64, max: u64 },
    #[error("height {height} is outside 0..={max}")]
    InvalidHeight { height: f32, max: f32 },
    #[error("play time {seconds}s is outside 0..={max}")]
    InvalidPlayTime { seconds: f32, max: f32 },
    #[error("submission limit of {limit} reached for this session")]
    RateLimited { limit: u32 },
    #[error("last submission was {elapsed_ms:.0} ms ago; wait at least {min_interval_ms:.0} ms")]
    TooSoon { elapsed_ms: f64, min_interval_ms: f64 },
    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Bounds and rate limits for submissions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionLimits {
    pub max_score: u64,
    /// Meters
    pub max_height: f32,
    /// Seconds
    pub max_play_time: f32,
    /// Submissions allowed per session
    pub max_submissions: u32,
    pub min_interval_ms: f64,
}

impl Default for SubmissionLimits {
    fn default() -> Self {
        Self {
            max_score: 100_000,
            max_height: 10_000.0,
            max_play_time: 3600.0,
            max_submissions: 10_000,
            min_interval_ms: 5000.0,
        }
    }
}

/// What the host page receives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorePayload {
    pub game_name: String,
    pub game_version: String,
    pub score: u64,
    pub height: f32,
    pub items_collected: u32,
    pub time_seconds: f32,
    pub victory: bool,
    pub reason: EndReason,
    pub timestamp_ms: f64,
}

impl ScorePayload {
    pub fn to_json(&self) -> Result<String, SubmissionError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Validates summaries and enforces the per-session rate limit
#[derive(Debug, Default)]
pub struct ScoreSubmitter {
    limits: SubmissionLimits,
    submitted: u32,
    last_submission_ms: Option<f64>,
}

impl ScoreSubmitter {
    pub fn new(limits: SubmissionLimits) -> Self {
        Self {
            limits,
            submitted: 0,
            last_submission_ms: None,
        }
    }

    pub fn submitted(&self) -> u32 {
        self.submitted
    }

    /// Range checks only; does not count against the rate limit
    pub fn validate(&self, summary: &RunSummary, play_seconds: f32) -> Result<(), SubmissionError> {
        let limits = &self.limits;
        if summary.score > limits.max_score {
            return Err(SubmissionError::InvalidScore {
                score: summary.score,
                max: limits.max_score,
            });
        }
        if !(0.0..=limits.max_height).contains(&summary.max_height) {
            return Err(SubmissionError::InvalidHeight {
                height: summary.max_height,
                max: limits.max_height,
            });
        }
        if !(0.0..=limits.max_play_time).contains(&play_seconds) {
            return Err(SubmissionError::InvalidPlayTime {
                seconds: play_seconds,
                max: limits.max_play_time,
            });
        }
        Ok(())
    }

    fn check_rate(&self, now_ms: f64) -> Result<(), SubmissionError> {
        if self.submitted >= self.limits.max_submissions {
            return Err(SubmissionError::RateLimited {
                limit: self.limits.max_submissions,
            });
        }
        if let Some(last) = self.last_submission_ms {
            let elapsed_ms = now_ms - last;
            if elapsed_ms < self.limits.min_interval_ms {
                return Err(SubmissionError::TooSoon {
                    elapsed_ms,
                    min_interval_ms: self.limits.min_interval_ms,
                });
            }
        }
        Ok(())
    }

    /// Validate, rate limit and record a submission.
    ///
    /// Rejected submissions leave the counters untouched.
    pub fn submit(
        &mut self,
        summary: &RunSummary,
        play_seconds: f32,
        now_ms: f64,
    ) -> Result<ScorePayload, SubmissionError> {
        if let Err(e) = self
            .validate(summary, play_seconds)
            .and_then(|()| self.check_rate(now_ms))
        {
            log::warn!("score submission rejected: {e}");
            return Err(e);
        }

        self.submitted += 1;
        self.last_submission_ms = Some(now_ms);
        log::info!(
            "score {} submitted ({} this session)",
            summary.score,
            self.submitted
        );
        Ok(ScorePayload {
            game_name: GAME_NAME.to_owned(),
            game_version: env!("CARGO_PKG_VERSION").to_owned(),
            score: summary.score,
            height: summary.max_height,
            items_collected: summary.items_collected,
            time_seconds: play_seconds,
            victory: summary.victory,
            reason: summary.reason,
            timestamp_ms: now_ms,
        })
    }
}
