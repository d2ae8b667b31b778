//! Prediction history statistics.
//!
//! Summarises a user's completed bets: win rate, realised profit and
//! win streaks. Pending bets are ignored.

use tracing::debug;

use crate::types::{PredictionStats, PredictionStatus, UserPrediction};

/// Compute statistics over a user's prediction history (oldest first).
///
/// Streaks are counted walking the completed bets from newest to oldest.
/// `current_streak` is captured on the first step of that walk only, so it
/// is 1 when the most recent completed bet was won and 0 otherwise.
pub fn calculate_prediction_stats(user_predictions: &[UserPrediction]) -> PredictionStats {
    let completed: Vec<&UserPrediction> = user_predictions
        .iter()
        .filter(|p| p.is_completed())
        .collect();

    let total_predictions = completed.len();
    let won = completed
        .iter()
        .filter(|p| p.status == PredictionStatus::Won)
        .count();
    let lost = total_predictions - won;

    let win_rate = if total_predictions == 0 {
        0.0
    } else {
        won as f64 / total_predictions as f64
    };

    let total_profit: f64 = completed.iter().map(|p| p.profit()).sum();

    let mut current_streak: u32 = 0;
    let mut best_streak: u32 = 0;
    let mut temp_streak: u32 = 0;
    for (i, p) in completed.iter().rev().enumerate() {
        if p.status == PredictionStatus::Won {
            temp_streak += 1;
        } else {
            temp_streak = 0;
        }
        best_streak = best_streak.max(temp_streak);
        if i == 0 {
            current_streak = temp_streak;
        }
    }

    debug!(
        total = total_predictions,
        pending = user_predictions.len() - total_predictions,
        won,
        current_streak,
        best_streak,
        "Prediction stats computed"
    );

    PredictionStats {
        total_predictions,
        won,
        lost,
        win_rate,
        total_profit,
        current_streak,
        best_streak,
    }
}
