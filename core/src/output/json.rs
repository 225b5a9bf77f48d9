use crate::diff::CompareReport;

/// Serialize a report to a JSON string.
pub fn serialize_report(report: &CompareReport) -> serde_json::Result<String> {
    serde_json::to_string(report)
}

/// Serialize a report as pretty-printed JSON.
pub fn serialize_report_pretty(report: &CompareReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_roundtrips_through_json() {
        let report = CompareReport::new(Vec::new());
        let json = serialize_report(&report).expect("serialize empty report");
        let parsed: CompareReport = serde_json::from_str(&json).expect("deserialize report");
        assert_eq!(report, parsed);
    }
}
