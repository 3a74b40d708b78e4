use serde::Serialize;

/// Outcome of one ingestion batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub upserted: usize,
    /// Records with at least one team name the resolver could not match
    pub skipped_unresolved: usize,
    /// Records missing required fields or carrying implausible values
    pub skipped_invalid: usize,
    /// Records whose write failed
    pub failed: usize,
    /// Distinct raw names awaiting manual reconciliation, in first-seen order
    pub unresolved_names: Vec<String>,
}

impl IngestReport {
    pub fn record_unresolved(&mut self, raw: &str) {
        if !self.unresolved_names.iter().any(|name| name == raw) {
            self.unresolved_names.push(raw.to_string());
        }
    }

    pub fn merge(&mut self, other: IngestReport) {
        self.upserted += other.upserted;
        self.skipped_unresolved += other.skipped_unresolved;
        self.skipped_invalid += other.skipped_invalid;
        self.failed += other.failed;
        for name in other.unresolved_names {
            self.record_unresolved(&name);
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped_unresolved + self.skipped_invalid + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_names_are_distinct() {
        let mut report = IngestReport::default();
        report.record_unresolved("Xavier");
        report.record_unresolved("Xavier");
        report.record_unresolved("Hofstra");
        assert_eq!(report.unresolved_names, vec!["Xavier", "Hofstra"]);
    }

    #[test]
    fn test_merge_sums_counts() {
        let mut first = IngestReport {
            upserted: 3,
            skipped_invalid: 1,
            unresolved_names: vec!["Xavier".to_string()],
            ..Default::default()
        };
        let second = IngestReport {
            upserted: 2,
            skipped_unresolved: 1,
            unresolved_names: vec!["Xavier".to_string(), "Hofstra".to_string()],
            ..Default::default()
        };
        first.merge(second);

        assert_eq!(first.upserted, 5);
        assert_eq!(first.skipped(), 2);
        assert_eq!(first.unresolved_names.len(), 2);
    }
}
