//! Case record types.
//!
//! A [`CaseRecord`] is the self-describing block written to the result log
//! for every completed profile.

use chrono::{DateTime, Utc};
use perfsuite_core::{micros_to_ms, qualified_name, ProfileResult};
use serde::{Deserialize, Serialize};

/// One measured case as stored in the result log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Qualified name, `<suite>::<case>`.
    pub name: String,
    /// Owning suite.
    pub suite: String,
    /// Case within the suite.
    pub case: String,
    /// Number of workload invocations.
    pub iterations: u32,
    /// Duration of the whole iteration loop.
    pub total_us: u32,
    /// `total_us / iterations`.
    pub average_us: u32,
    /// Shortest single iteration.
    pub min_us: u32,
    /// Longest single iteration.
    pub max_us: u32,
    /// When the record was produced.
    pub timestamp: DateTime<Utc>,
}

impl CaseRecord {
    /// Build a record for `suite::case`, stamped now.
    pub fn new(suite: impl Into<String>, case: impl Into<String>, result: &ProfileResult) -> Self {
        let suite = suite.into();
        let case = case.into();
        Self {
            name: qualified_name(&suite, &case),
            suite,
            case,
            iterations: result.iterations,
            total_us: result.total_micros,
            average_us: result.average_micros,
            min_us: result.min_micros,
            max_us: result.max_micros,
            timestamp: Utc::now(),
        }
    }

    /// Total duration in milliseconds.
    pub fn total_ms(&self) -> f64 {
        micros_to_ms(self.total_us)
    }

    /// Average duration in milliseconds.
    pub fn average_ms(&self) -> f64 {
        micros_to_ms(self.average_us)
    }

    /// Minimum duration in milliseconds.
    pub fn min_ms(&self) -> f64 {
        micros_to_ms(self.min_us)
    }

    /// Maximum duration in milliseconds.
    pub fn max_ms(&self) -> f64 {
        micros_to_ms(self.max_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_copies_profile_fields() {
        let result = ProfileResult::from_samples(4, 2000, vec![400, 500, 600, 500]).unwrap();
        let record = CaseRecord::new("Vertex buffer allocation", "MixedVtxAlloc-arrays", &result);

        assert_eq!(record.name, "Vertex buffer allocation::MixedVtxAlloc-arrays");
        assert_eq!(record.iterations, 4);
        assert_eq!(record.total_us, 2000);
        assert_eq!(record.average_us, 500);
        assert_eq!(record.min_us, 400);
        assert_eq!(record.max_us, 600);
        assert!(record.timestamp <= Utc::now());
    }

    #[test]
    fn test_record_serializes_microsecond_keys() {
        let result = ProfileResult::from_samples(1, 7, vec![7]).unwrap();
        let value = serde_json::to_value(CaseRecord::new("S", "c", &result)).unwrap();

        for key in ["name", "iterations", "total_us", "average_us", "min_us", "max_us"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert!(value.get("samples").is_none());
    }
}
