//! Onboarding seed data.
//!
//! A seed is a JSON document listing branches, optometrists and roster
//! rows. Rows go through the same validation as any other roster write.
//!
//! ```json
//! {
//!   "branches":     [{ "id": 1, "name": "Downtown", "code": "DTN" }],
//!   "optometrists": [{ "id": 7, "name": "Dr. Samuel Reyes" }],
//!   "roster": [
//!     { "optometrist_id": 7, "day_of_week": 1, "branch_id": 1,
//!       "start_time": "09:00", "end_time": "17:00" }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::domain::{Branch, DayOfWeek, Optometrist, OptometristId, ShiftInput};
use crate::error::ScheduleError;

/// One roster row in a seed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRow {
    /// Optometrist the row belongs to.
    pub optometrist_id: OptometristId,
    /// ISO weekday, 1 = Monday.
    pub day_of_week: DayOfWeek,
    /// Branch and hours; omit the branch for a day off.
    #[serde(flatten)]
    pub shift: ShiftInput,
}

/// A complete seed document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSeed {
    /// Branch display data.
    #[serde(default)]
    pub branches: Vec<Branch>,
    /// Optometrist display data.
    #[serde(default)]
    pub optometrists: Vec<Optometrist>,
    /// Roster rows.
    #[serde(default)]
    pub roster: Vec<SeedRow>,
}

/// Counts of what a seed wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    /// Branches written.
    pub branches: usize,
    /// Optometrists written.
    pub optometrists: usize,
    /// Roster rows written.
    pub roster_rows: usize,
}

impl RosterSeed {
    /// Parses a seed document.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Seed`] on malformed JSON, including a
    /// `day_of_week` outside 1..=7.
    pub fn from_json(json: &str) -> Result<Self, ScheduleError> {
        serde_json::from_str(json).map_err(|e| ScheduleError::Seed(e.to_string()))
    }

    /// Reads and parses a seed file.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Seed`] if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self, ScheduleError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ScheduleError::Seed(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    /// Writes the seed into the directory and roster.
    ///
    /// Rows are applied in file order; a later row for the same slot
    /// replaces an earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Validation`] for the first invalid row.
    /// Rows before it stay applied.
    pub async fn apply(&self, state: &AppState) -> Result<SeedSummary, ScheduleError> {
        for branch in &self.branches {
            state.directory.upsert_branch(branch.clone()).await;
        }
        for optometrist in &self.optometrists {
            state.directory.upsert_optometrist(optometrist.clone()).await;
        }
        for row in &self.roster {
            state
                .coordinator
                .seed_entry(row.optometrist_id, row.day_of_week, row.shift)
                .await?;
        }
        let summary = SeedSummary {
            branches: self.branches.len(),
            optometrists: self.optometrists.len(),
            roster_rows: self.roster.len(),
        };
        tracing::info!(
            branches = summary.branches,
            optometrists = summary.optometrists,
            roster_rows = summary.roster_rows,
            "seed applied"
        );
        Ok(summary)
    }
}
