//! Read-only placeholder activity data, used when no real history is wanted.

use crate::domain::{ActivityEntry, ActivityRecord, DomainError};
use crate::ports::ActivityStorePort;

/// Returns the same five dated records for every user.
#[derive(Debug, Default)]
pub struct SampleActivityStore;

impl SampleActivityStore {
    pub fn records() -> Vec<ActivityRecord> {
        let record = |date: &str, weight: Option<&str>, meal: &str, workout: &str| ActivityRecord {
            date: date.to_string(),
            entry: ActivityEntry {
                weight: weight.map(str::to_string),
                meal: Some(meal.to_string()),
                workout: Some(workout.to_string()),
            },
        };
        vec![
            record("2025-01-08", Some("70kg"), "chicken salad", "30-minute run"),
            record("2025-01-07", Some("70.2kg"), "oatmeal with berries", "yoga session"),
            record("2025-01-06", None, "grilled salmon", "weight training"),
            record("2025-01-05", Some("70.5kg"), "quinoa bowl", "cycling"),
            record("2025-01-04", None, "protein smoothie", "swimming"),
        ]
    }
}

#[async_trait::async_trait]
impl ActivityStorePort for SampleActivityStore {
    async fn recent_activity(
        &self,
        _user_id: &str,
        limit: usize,
    ) -> Result<Vec<ActivityRecord>, DomainError> {
        Ok(Self::records().into_iter().take(limit).collect())
    }
}
