//! Stateless evaluation of condition trees.
//!
//! The tree and the fact source are plain arguments; nothing is registered or cached between
//! calls, so one tree can be evaluated concurrently against any number of households.

use super::facts::{FactSource, FactValue};
use super::schema::{Condition, ConditionValue, FactCondition, Operator};

/// Right-hand side of a comparison after fact references are resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Single(FactValue),
    List(Vec<FactValue>),
    Unresolved,
}

impl Operand {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Operand::Single(value) => value.as_number(),
            _ => None,
        }
    }
}

/// One leaf comparison as it was evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafOutcome {
    pub fact: String,
    pub operator: Operator,
    pub actual: Option<FactValue>,
    pub expected: Operand,
    /// Fact the right-hand side was read from, when it was a reference.
    pub reference: Option<String>,
    pub passed: bool,
    /// Sits under an odd number of `not` nodes, so a pass counts against the match.
    pub negated: bool,
}

impl LeafOutcome {
    /// Whether this leaf pushed its enclosing tree towards a match.
    pub fn supports_match(&self) -> bool {
        self.passed != self.negated
    }
}

/// Whether the tree matched, plus the leaves visited on the way.
///
/// `all` stops at its first failing child and `any` at its first passing child. `deciding`
/// indexes the leaves that account for the result: every child of a matched `all`, the passing
/// branch of a matched `any`, the blocking child of a failed `all`, every branch of a failed `any`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionOutcome {
    pub matched: bool,
    pub leaves: Vec<LeafOutcome>,
    pub deciding: Vec<usize>,
}

impl ConditionOutcome {
    /// Leaves that account for the result, in evaluation order.
    pub fn deciding_leaves(&self) -> impl Iterator<Item = &LeafOutcome> {
        self.deciding.iter().filter_map(|index| self.leaves.get(*index))
    }

    /// Last comparison that blocked a match, if the tree did not match.
    pub fn deciding_failure(&self) -> Option<&LeafOutcome> {
        if self.matched {
            return None;
        }
        self.deciding_leaves()
            .filter(|leaf| !leaf.supports_match())
            .last()
    }
}

pub fn evaluate<F: FactSource + ?Sized>(condition: &Condition, facts: &F) -> ConditionOutcome {
    let mut leaves = Vec::new();
    let node = evaluate_node(condition, facts, false, &mut leaves);
    ConditionOutcome {
        matched: node.passed,
        leaves,
        deciding: node.deciding,
    }
}

struct NodeOutcome {
    passed: bool,
    deciding: Vec<usize>,
}

fn evaluate_node<F: FactSource + ?Sized>(
    condition: &Condition,
    facts: &F,
    negated: bool,
    leaves: &mut Vec<LeafOutcome>,
) -> NodeOutcome {
    match condition {
        Condition::All { all } => {
            let mut deciding = Vec::new();
            for child in all {
                let outcome = evaluate_node(child, facts, negated, leaves);
                if !outcome.passed {
                    return outcome;
                }
                deciding.extend(outcome.deciding);
            }
            NodeOutcome {
                passed: true,
                deciding,
            }
        }
        Condition::Any { any } => {
            let mut deciding = Vec::new();
            for child in any {
                let outcome = evaluate_node(child, facts, negated, leaves);
                if outcome.passed {
                    return outcome;
                }
                deciding.extend(outcome.deciding);
            }
            NodeOutcome {
                passed: false,
                deciding,
            }
        }
        Condition::Not { not } => {
            let inner = evaluate_node(not, facts, !negated, leaves);
            NodeOutcome {
                passed: !inner.passed,
                deciding: inner.deciding,
            }
        }
        Condition::Fact(leaf) => {
            let outcome = evaluate_leaf(leaf, facts, negated);
            let passed = outcome.passed;
            leaves.push(outcome);
            NodeOutcome {
                passed,
                deciding: vec![leaves.len() - 1],
            }
        }
    }
}

fn evaluate_leaf<F: FactSource + ?Sized>(
    leaf: &FactCondition,
    facts: &F,
    negated: bool,
) -> LeafOutcome {
    let actual = facts.fact(&leaf.fact, &leaf.params);
    let expected = resolve_operand(&leaf.value, facts);
    let passed = actual
        .as_ref()
        .map(|actual| compare(actual, leaf.operator, &expected))
        .unwrap_or(false);
    let reference = match &leaf.value {
        ConditionValue::Fact(reference) => Some(reference.fact.clone()),
        ConditionValue::Literal(_) => None,
    };

    LeafOutcome {
        fact: leaf.fact.clone(),
        operator: leaf.operator,
        actual,
        expected,
        reference,
        passed,
        negated,
    }
}

fn resolve_operand<F: FactSource + ?Sized>(value: &ConditionValue, facts: &F) -> Operand {
    match value {
        ConditionValue::Fact(reference) => facts
            .fact(&reference.fact, &reference.params)
            .map(Operand::Single)
            .unwrap_or(Operand::Unresolved),
        ConditionValue::Literal(serde_json::Value::Array(items)) => {
            Operand::List(items.iter().filter_map(FactValue::from_json).collect())
        }
        ConditionValue::Literal(literal) => FactValue::from_json(literal)
            .map(Operand::Single)
            .unwrap_or(Operand::Unresolved),
    }
}

fn compare(actual: &FactValue, operator: Operator, expected: &Operand) -> bool {
    match (operator, expected) {
        (Operator::In, Operand::List(items)) => items.iter().any(|item| values_equal(actual, item)),
        (Operator::NotIn, Operand::List(items)) => {
            !items.iter().any(|item| values_equal(actual, item))
        }
        (Operator::Equal, Operand::Single(expected)) => values_equal(actual, expected),
        (Operator::NotEqual, Operand::Single(expected)) => !values_equal(actual, expected),
        (_, Operand::Single(expected)) => match (actual.as_number(), expected.as_number()) {
            (Some(left), Some(right)) => match operator {
                Operator::LessThan => left < right,
                Operator::LessThanInclusive => left <= right,
                Operator::GreaterThan => left > right,
                Operator::GreaterThanInclusive => left >= right,
                _ => false,
            },
            _ => false,
        },
        _ => false,
    }
}

fn values_equal(left: &FactValue, right: &FactValue) -> bool {
    match (left, right) {
        (FactValue::Number(left), FactValue::Number(right)) => left == right,
        (FactValue::Bool(left), FactValue::Bool(right)) => left == right,
        (FactValue::Text(left), FactValue::Text(right)) => left.eq_ignore_ascii_case(right),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::schema::FactParams;
    use serde_json::json;

    impl FactSource for [(&str, FactValue)] {
        fn fact(&self, name: &str, _params: &FactParams) -> Option<FactValue> {
            self.iter()
                .find(|(fact, _)| *fact == name)
                .map(|(_, value)| value.clone())
        }
    }

    fn condition(value: serde_json::Value) -> Condition {
        serde_json::from_value(value).expect("condition parses")
    }

    #[test]
    fn inclusive_upper_bound_accepts_equal_values() {
        let tree = condition(json!({
            "fact": "monthlyIncome", "operator": "lessThanInclusive", "value": 3588
        }));
        let facts = [("monthlyIncome", FactValue::Number(3588.0))];
        assert!(evaluate(&tree, &facts[..]).matched);

        let strict = condition(json!({
            "fact": "monthlyIncome", "operator": "lessThan", "value": 3588
        }));
        assert!(!evaluate(&strict, &facts[..]).matched);
    }

    #[test]
    fn all_stops_at_first_failure_and_reports_it() {
        let tree = condition(json!({ "all": [
            { "fact": "hasDisabilityDiagnosis", "operator": "equal", "value": true },
            { "fact": "ageOfDisabledMember", "operator": "greaterThanInclusive", "value": 18 },
            { "fact": "monthlyIncome", "operator": "lessThan", "value": 100 }
        ]}));
        let facts = [
            ("hasDisabilityDiagnosis", FactValue::Bool(true)),
            ("ageOfDisabledMember", FactValue::Number(8.0)),
            ("monthlyIncome", FactValue::Number(50.0)),
        ];

        let outcome = evaluate(&tree, &facts[..]);
        assert!(!outcome.matched);
        assert_eq!(outcome.leaves.len(), 2);
        let failure = outcome.deciding_failure().expect("failing leaf");
        assert_eq!(failure.fact, "ageOfDisabledMember");
        assert_eq!(failure.expected.as_number(), Some(18.0));
    }

    #[test]
    fn membership_and_negation() {
        let tree = condition(json!({ "not": {
            "fact": "insuranceType", "operator": "in", "value": ["employer", "marketplace"]
        }}));
        let employer = [("insuranceType", FactValue::Text("employer".to_string()))];
        let none = [("insuranceType", FactValue::Text("none".to_string()))];
        assert!(!evaluate(&tree, &employer[..]).matched);
        assert!(evaluate(&tree, &none[..]).matched);
    }

    #[test]
    fn negated_leaf_is_blamed_when_it_blocks_the_match() {
        let tree = condition(json!({ "all": [
            { "any": [
                { "fact": "ageOfDisabledMember", "operator": "lessThan", "value": 3 },
                { "fact": "hasDisabilityDiagnosis", "operator": "equal", "value": true }
            ]},
            { "not": { "fact": "hasPrivateInsurance", "operator": "equal", "value": true } }
        ]}));
        let facts = [
            ("ageOfDisabledMember", FactValue::Number(8.0)),
            ("hasDisabilityDiagnosis", FactValue::Bool(true)),
            ("hasPrivateInsurance", FactValue::Bool(true)),
        ];

        let outcome = evaluate(&tree, &facts[..]);
        assert!(!outcome.matched);
        assert_eq!(outcome.leaves.len(), 3);
        let failure = outcome.deciding_failure().expect("blocking leaf");
        assert_eq!(failure.fact, "hasPrivateInsurance");
        assert!(failure.passed);
        assert!(failure.negated);
    }

    #[test]
    fn failed_branches_of_a_passing_any_do_not_decide() {
        let tree = condition(json!({ "any": [
            { "all": [
                { "fact": "monthlyIncome", "operator": "lessThan", "value": 100 },
                { "fact": "ageOfDisabledMember", "operator": "lessThan", "value": 3 }
            ]},
            { "fact": "hasDisabilityDiagnosis", "operator": "equal", "value": true }
        ]}));
        let facts = [
            ("monthlyIncome", FactValue::Number(50.0)),
            ("ageOfDisabledMember", FactValue::Number(8.0)),
            ("hasDisabilityDiagnosis", FactValue::Bool(true)),
        ];

        let outcome = evaluate(&tree, &facts[..]);
        assert!(outcome.matched);
        let deciding: Vec<_> = outcome.deciding_leaves().map(|leaf| leaf.fact.as_str()).collect();
        assert_eq!(deciding, vec!["hasDisabilityDiagnosis"]);
        assert_eq!(outcome.deciding_failure(), None);
    }

    #[test]
    fn missing_facts_and_type_mismatches_never_match() {
        let tree = condition(json!({ "any": [
            { "fact": "insuranceType", "operator": "equal", "value": "employer" },
            { "fact": "monthlyIncome", "operator": "lessThan", "value": "lots" }
        ]}));
        let facts = [("monthlyIncome", FactValue::Number(10.0))];
        let outcome = evaluate(&tree, &facts[..]);
        assert!(!outcome.matched);
        assert_eq!(outcome.leaves.len(), 2);
        assert!(outcome.leaves[0].actual.is_none());
    }

    #[test]
    fn fact_references_resolve_through_the_source() {
        let tree = condition(json!({
            "fact": "monthlyIncome", "operator": "lessThanInclusive",
            "value": { "fact": "incomeLimit", "params": { "limit": "medicaid" } }
        }));
        let facts = [
            ("monthlyIncome", FactValue::Number(2000.0)),
            ("incomeLimit", FactValue::Number(3588.0)),
        ];
        let outcome = evaluate(&tree, &facts[..]);
        assert!(outcome.matched);
        assert_eq!(outcome.leaves[0].expected, Operand::Single(FactValue::Number(3588.0)));
        assert_eq!(outcome.leaves[0].reference.as_deref(), Some("incomeLimit"));
    }
}
