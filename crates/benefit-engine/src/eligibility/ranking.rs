use super::domain::EligibilityResult;
use super::schema::StateConfig;

/// Order results by confidence tier, then by the program's configured priority.
///
/// Programs without a priority sort last within their tier. The sort is stable, so equal keys
/// keep the document's program order.
pub fn sort_results(mut results: Vec<EligibilityResult>, config: &StateConfig) -> Vec<EligibilityResult> {
    results.sort_by_key(|result| {
        (
            result.confidence.rank(),
            config.priority_of(&result.program_id),
        )
    });
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::domain::ConfidenceTier;
    use crate::eligibility::tests::common::{kentucky_config, result};

    fn ids(results: &[EligibilityResult]) -> Vec<&str> {
        results.iter().map(|result| result.program_id.as_str()).collect()
    }

    #[test]
    fn tier_dominates_priority() {
        let config = kentucky_config();
        let results = vec![
            result("ky-medicaid", ConfidenceTier::Possible),
            result("ky-first-steps", ConfidenceTier::Likely),
            result("ky-ssi", ConfidenceTier::Unlikely),
        ];

        let sorted = sort_results(results, &config);
        assert_eq!(ids(&sorted), vec!["ky-first-steps", "ky-medicaid", "ky-ssi"]);
    }

    #[test]
    fn priority_orders_within_a_tier() {
        let config = kentucky_config();
        let results = vec![
            result("ky-michelle-p-waiver", ConfidenceTier::Possible),
            result("ky-ssi", ConfidenceTier::Possible),
            result("ky-medicaid", ConfidenceTier::Possible),
        ];

        let sorted = sort_results(results, &config);
        assert_eq!(
            ids(&sorted),
            vec!["ky-medicaid", "ky-ssi", "ky-michelle-p-waiver"]
        );
    }

    #[test]
    fn unconfigured_programs_sort_last_and_keep_input_order() {
        let config = kentucky_config();
        let results = vec![
            result("ky-unlisted-b", ConfidenceTier::Likely),
            result("ky-unlisted-a", ConfidenceTier::Likely),
            result("ky-kchip", ConfidenceTier::Likely),
        ];

        let sorted = sort_results(results, &config);
        assert_eq!(
            ids(&sorted),
            vec!["ky-kchip", "ky-unlisted-b", "ky-unlisted-a"]
        );
    }

    #[test]
    fn sorting_is_deterministic() {
        let config = kentucky_config();
        let results = vec![
            result("ky-scl-waiver", ConfidenceTier::Unlikely),
            result("ky-kchip", ConfidenceTier::Likely),
            result("ky-michelle-p-waiver", ConfidenceTier::Possible),
            result("ky-medicaid", ConfidenceTier::Likely),
        ];

        let first = sort_results(results.clone(), &config);
        let second = sort_results(results, &config);
        assert_eq!(first, second);
        assert_eq!(
            ids(&first),
            vec!["ky-medicaid", "ky-kchip", "ky-michelle-p-waiver", "ky-scl-waiver"]
        );
    }
}
