use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// One-way availability search: route, earliest departure, seats needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub origin: String,
    pub destination: String,
    pub departing_after: DateTime<Utc>,
    pub seats_needed: i32,
}

impl SearchQuery {
    pub fn validate(&self) -> DomainResult<()> {
        for (field, code) in [("origin", &self.origin), ("destination", &self.destination)] {
            if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(DomainError::validation(format!(
                    "{field} must be a 3-letter airport code, got '{code}'"
                )));
            }
        }
        if self.seats_needed < 1 {
            return Err(DomainError::validation("seats needed must be at least 1"));
        }
        Ok(())
    }

    /// Normalized route codes, used both for matching and cache keys.
    pub fn normalized(&self) -> SearchQuery {
        SearchQuery {
            origin: self.origin.to_uppercase(),
            destination: self.destination.to_uppercase(),
            departing_after: self.departing_after,
            seats_needed: self.seats_needed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_validation() {
        let q = SearchQuery {
            origin: "sgn".to_string(),
            destination: "HAN".to_string(),
            departing_after: Utc::now(),
            seats_needed: 2,
        };
        assert!(q.validate().is_ok());
        assert_eq!(q.normalized().origin, "SGN");

        let bad = SearchQuery {
            seats_needed: 0,
            ..q.clone()
        };
        assert!(bad.validate().is_err());
    }
}
