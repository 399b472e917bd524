//! Derived weight statistics. Pure functions over an already-loaded history,
//! recomputed on every read and never persisted.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::models::WeightEntry;

/// Time window for min/max/average. `current`/`previous`/`delta` always come
/// from the full history regardless of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Days(i64),
    All,
}

impl Period {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "7" => Some(Period::Days(7)),
            "30" => Some(Period::Days(30)),
            "90" => Some(Period::Days(90)),
            "all" => Some(Period::All),
            _ => None,
        }
    }

    fn cutoff(self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Period::Days(n) => Some(today - Duration::days(n)),
            Period::All => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeightStats {
    pub current: Option<f64>,
    pub previous: Option<f64>,
    pub delta: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub average: Option<f64>,
    pub goal_progress: Option<f64>,
    pub to_goal: Option<f64>,
}

/// Compute display statistics from a newest-first weight history.
///
/// `goal_progress` is `round(((max - current) / (max - goal)) * 100)` — the
/// formula assumes a weight-loss trend (goal below current, current below the
/// historical max). It is kept exactly as shipped: for other trend shapes it
/// produces values outside [0, 100], and it is non-finite when `max == goal`.
/// Clamping for display is the frontend's job.
///
/// One deliberate divergence: when the selected window contains no entries,
/// `goal_progress` is absent here, where the dashboard it replaces fell back
/// to a `max = 0` sentinel and produced a nonsense percentage.
pub fn compute(
    entries: &[WeightEntry],
    goal: Option<f64>,
    period: Period,
    today: NaiveDate,
) -> WeightStats {
    let current = entries.first().map(|e| e.weight);
    let previous = entries.get(1).map(|e| e.weight);
    let delta = current.zip(previous).map(|(c, p)| c - p);

    let cutoff = period.cutoff(today);
    let filtered: Vec<f64> = entries
        .iter()
        .filter(|e| match cutoff {
            None => true,
            // Unparseable dates fall outside any window
            Some(c) => NaiveDate::parse_from_str(&e.date, "%Y-%m-%d")
                .map(|d| d >= c)
                .unwrap_or(false),
        })
        .map(|e| e.weight)
        .collect();

    let min = filtered.iter().copied().reduce(f64::min);
    let max = filtered.iter().copied().reduce(f64::max);
    let average = if filtered.is_empty() {
        None
    } else {
        Some(filtered.iter().sum::<f64>() / filtered.len() as f64)
    };

    let goal_progress = match (current, goal, max) {
        (Some(c), Some(g), Some(m)) => Some((((m - c) / (m - g)) * 100.0).round()),
        _ => None,
    };
    let to_goal = current.zip(goal).map(|(c, g)| c - g);

    WeightStats {
        current,
        previous,
        delta,
        min,
        max,
        average,
        goal_progress,
        to_goal,
    }
}
