//! Semantic validation: business rules a structural schema cannot express.
//!
//! Runs only on documents that already passed structural validation, so the
//! checks here can assume the shapes the schema guarantees. Cross-document
//! rules read the immutable [`ContextSnapshot`] assembled by the pipeline.

use super::{ContextSnapshot, ValidationResult};
use crate::document::{Document, KIND_AGENT, KIND_RECIPE};
use crate::schema::SchemaStore;
use serde_yaml::Value;
use std::collections::BTreeSet;

/// Documented sane bounds for numeric constraint fields.
const MAX_TOKENS_CEILING: u64 = 2_000_000;
const TIMEOUT_CEILING_SECONDS: u64 = 86_400;
const BUDGET_CEILING_USD: f64 = 1000.0;
const BUDGET_WARNING_USD: f64 = 100.0;

pub struct SemanticValidator {
    /// Whether the loaded agent schema declares a PII justification field.
    /// The conditional requirement only applies when it does.
    requires_pii_justification: bool,
}

impl SemanticValidator {
    pub fn new(schemas: &SchemaStore) -> Self {
        let requires_pii_justification = schemas
            .get(KIND_AGENT)
            .map(|s| s.declares("constraints.pii_justification"))
            .unwrap_or(false);
        Self {
            requires_pii_justification,
        }
    }

    /// Validate one structurally valid document against the business rules
    /// for its kind.
    pub fn validate(&self, document: &Document, context: &ContextSnapshot) -> ValidationResult {
        let mut result = ValidationResult::new();
        match document.kind.as_str() {
            KIND_AGENT => self.validate_agent(document, context, &mut result),
            KIND_RECIPE => self.validate_recipe(document, context, &mut result),
            _ => {}
        }
        result
    }

    fn validate_agent(
        &self,
        document: &Document,
        context: &ContextSnapshot,
        result: &mut ValidationResult,
    ) {
        let id = document.id();
        if context.agent_count(&id) > 1 {
            result.error(
                "id",
                format!("duplicate agent identifier '{id}' in the loaded collection"),
            );
        }

        if let Some(tools) = document.body.get("tools").and_then(Value::as_sequence) {
            let mut seen = BTreeSet::new();
            for (index, tool) in tools.iter().enumerate() {
                let Some(tool_id) = tool.get("id").and_then(Value::as_str) else {
                    continue;
                };
                if !seen.insert(tool_id) {
                    result.error(
                        format!("tools.{index}.id"),
                        format!("duplicate tool identifier '{tool_id}' within this agent"),
                    );
                }
            }
        }

        if let Some(constraints) = document.body.get("constraints") {
            self.check_constraints(constraints, result);
        }
    }

    fn check_constraints(&self, constraints: &Value, result: &mut ValidationResult) {
        if let Some(max_tokens) = constraints.get("max_tokens").and_then(Value::as_u64) {
            if max_tokens == 0 || max_tokens > MAX_TOKENS_CEILING {
                result.error(
                    "constraints.max_tokens",
                    format!("must be between 1 and {MAX_TOKENS_CEILING}"),
                );
            }
        }

        if let Some(timeout) = constraints.get("timeout_seconds").and_then(Value::as_u64) {
            if timeout == 0 || timeout > TIMEOUT_CEILING_SECONDS {
                result.error(
                    "constraints.timeout_seconds",
                    format!("must be between 1 and {TIMEOUT_CEILING_SECONDS} seconds"),
                );
            }
        }

        if let Some(budget) = constraints.get("cost_budget_usd").and_then(Value::as_f64) {
            if budget <= 0.0 || budget > BUDGET_CEILING_USD {
                result.error(
                    "constraints.cost_budget_usd",
                    format!("must be greater than 0 and at most {BUDGET_CEILING_USD} USD"),
                );
            } else if budget > BUDGET_WARNING_USD {
                result.warning(
                    "constraints.cost_budget_usd",
                    format!("budget above {BUDGET_WARNING_USD} USD, double-check this is intended"),
                );
            }
        }

        let policy = constraints.get("pii_policy").and_then(Value::as_str);
        if policy == Some("forbid_raw_pii") && self.requires_pii_justification {
            let justification = constraints
                .get("pii_justification")
                .and_then(Value::as_str)
                .unwrap_or("");
            if justification.trim().is_empty() {
                result.error(
                    "constraints.pii_justification",
                    "required when pii_policy is 'forbid_raw_pii'",
                );
            }
        }
    }

    fn validate_recipe(
        &self,
        document: &Document,
        context: &ContextSnapshot,
        result: &mut ValidationResult,
    ) {
        let Some(graph) = document.body.get("graph").and_then(Value::as_sequence) else {
            return;
        };

        let mut stage_names = BTreeSet::new();
        for (index, stage) in graph.iter().enumerate() {
            let stage_name = stage.get("stage").and_then(Value::as_str).unwrap_or("");
            if !stage_name.is_empty() && !stage_names.insert(stage_name) {
                result.error(
                    format!("graph.{index}.stage"),
                    format!("duplicate stage name '{stage_name}'"),
                );
            }

            let sequence = stage.get("sequence").and_then(Value::as_sequence);
            let parallel = stage.get("parallel").and_then(Value::as_sequence);
            match (sequence, parallel) {
                (None, None) => {
                    result.error(
                        format!("graph.{index}"),
                        format!("stage '{stage_name}' must declare either 'sequence' or 'parallel'"),
                    );
                    continue;
                }
                (Some(_), Some(_)) => {
                    result.error(
                        format!("graph.{index}"),
                        format!("stage '{stage_name}' cannot declare both 'sequence' and 'parallel'"),
                    );
                    continue;
                }
                _ => {}
            }

            if let Some(steps) = sequence {
                self.check_steps(steps, &format!("graph.{index}.sequence"), context, result);
            }
            if let Some(steps) = parallel {
                let path = format!("graph.{index}.parallel");
                self.check_steps(steps, &path, context, result);
                check_parallel_duplicates(steps, &path, result);
            }
        }
    }

    fn check_steps(
        &self,
        steps: &[Value],
        path: &str,
        context: &ContextSnapshot,
        result: &mut ValidationResult,
    ) {
        if steps.is_empty() {
            result.error(path, "stage must reference at least one agent");
        }
        for (index, step) in steps.iter().enumerate() {
            let Some(agent) = step.get("agent").and_then(Value::as_str) else {
                continue;
            };
            if !context.has_agent(agent) {
                result.error(
                    format!("{path}.{index}.agent"),
                    format!("references unknown agent '{agent}'"),
                );
            }
        }
    }
}

/// Two parallel steps naming the same agent in one stage would mean
/// ambiguous duplicate execution.
fn check_parallel_duplicates(steps: &[Value], path: &str, result: &mut ValidationResult) {
    let mut seen = BTreeSet::new();
    for (index, step) in steps.iter().enumerate() {
        let Some(agent) = step.get("agent").and_then(Value::as_str) else {
            continue;
        };
        if !seen.insert(agent) {
            result.error(
                format!("{path}.{index}.agent"),
                format!("agent '{agent}' is referenced twice in one parallel set"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> SemanticValidator {
        SemanticValidator::new(&SchemaStore::embedded().unwrap())
    }

    fn agent(yaml: &str) -> Document {
        Document::new(KIND_AGENT, "agents/test.yaml", serde_yaml::from_str(yaml).unwrap())
    }

    fn recipe(yaml: &str) -> Document {
        Document::new(KIND_RECIPE, "recipes/test.yaml", serde_yaml::from_str(yaml).unwrap())
    }

    fn snapshot(ids: &[&str]) -> ContextSnapshot {
        let docs: Vec<Document> = ids.iter().map(|id| agent(&format!("id: {id}"))).collect();
        ContextSnapshot::from_documents(&docs)
    }

    #[test]
    fn test_unique_agent_passes() {
        let doc = agent("id: writer");
        let result = validator().validate(&doc, &snapshot(&["writer", "reviewer"]));
        assert!(result.passed());
    }

    #[test]
    fn test_duplicate_agent_identifier_fails() {
        let doc = agent("id: writer");
        let result = validator().validate(&doc, &snapshot(&["writer", "writer"]));
        assert!(!result.passed());
        assert!(result
            .errors()
            .any(|i| i.path == "id" && i.message.contains("duplicate agent identifier 'writer'")));
    }

    #[test]
    fn test_duplicate_tool_identifier_fails() {
        let doc = agent(
            "id: writer\ntools:\n  - id: search\n    type: builtin\n  - id: search\n    type: http",
        );
        let result = validator().validate(&doc, &snapshot(&["writer"]));
        assert!(result
            .errors()
            .any(|i| i.path == "tools.1.id" && i.message.contains("duplicate tool identifier")));
    }

    #[test]
    fn test_constraint_bounds() {
        let doc = agent(
            "id: writer\nconstraints:\n  max_tokens: 0\n  timeout_seconds: 100000\n  cost_budget_usd: -2.0",
        );
        let result = validator().validate(&doc, &snapshot(&["writer"]));
        let paths: Vec<&str> = result.errors().map(|i| i.path.as_str()).collect();
        assert!(paths.contains(&"constraints.max_tokens"));
        assert!(paths.contains(&"constraints.timeout_seconds"));
        assert!(paths.contains(&"constraints.cost_budget_usd"));
    }

    #[test]
    fn test_high_budget_is_a_warning_not_an_error() {
        let doc = agent("id: writer\nconstraints:\n  cost_budget_usd: 250.0");
        let result = validator().validate(&doc, &snapshot(&["writer"]));
        assert!(result.passed());
        assert_eq!(result.issues().len(), 1);
    }

    #[test]
    fn test_forbid_raw_pii_requires_justification() {
        let doc = agent("id: security-auditor\nconstraints:\n  pii_policy: forbid_raw_pii");
        let result = validator().validate(&doc, &snapshot(&["security-auditor"]));
        assert!(!result.passed());
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.errors().next().unwrap().path, "constraints.pii_justification");
    }

    #[test]
    fn test_forbid_raw_pii_with_justification_passes() {
        let doc = agent(
            "id: security-auditor\nconstraints:\n  pii_policy: forbid_raw_pii\n  pii_justification: Audits raw logs for compliance review.",
        );
        let result = validator().validate(&doc, &snapshot(&["security-auditor"]));
        assert!(result.passed());
    }

    #[test]
    fn test_mask_policy_needs_no_justification() {
        let doc = agent("id: writer\nconstraints:\n  pii_policy: mask");
        let result = validator().validate(&doc, &snapshot(&["writer"]));
        assert!(result.passed());
    }

    #[test]
    fn test_recipe_with_resolvable_agents_passes() {
        let doc = recipe(
            "id: review\ngraph:\n  - stage: draft\n    sequence:\n      - agent: writer\n  - stage: check\n    parallel:\n      - agent: reviewer\n      - agent: writer",
        );
        let result = validator().validate(&doc, &snapshot(&["writer", "reviewer"]));
        assert!(result.passed(), "issues: {:?}", result.issues());
    }

    #[test]
    fn test_recipe_unknown_agent_named_in_error() {
        let doc = recipe(
            "id: review\ngraph:\n  - stage: draft\n    sequence:\n      - agent: ghost-writer",
        );
        let result = validator().validate(&doc, &snapshot(&["writer"]));
        assert!(!result.passed());
        let issue = result.errors().next().unwrap();
        assert_eq!(issue.path, "graph.0.sequence.0.agent");
        assert!(issue.message.contains("ghost-writer"));
    }

    #[test]
    fn test_recipe_unknown_agent_fixed_by_adding_agent() {
        let doc = recipe(
            "id: review\ngraph:\n  - stage: draft\n    sequence:\n      - agent: ghost-writer",
        );
        let result = validator().validate(&doc, &snapshot(&["writer", "ghost-writer"]));
        assert!(result.passed());
    }

    #[test]
    fn test_stage_without_steps_fails() {
        let doc = recipe("id: review\ngraph:\n  - stage: draft");
        let result = validator().validate(&doc, &snapshot(&[]));
        assert!(result
            .errors()
            .any(|i| i.message.contains("must declare either 'sequence' or 'parallel'")));
    }

    #[test]
    fn test_stage_with_both_step_kinds_fails() {
        let doc = recipe(
            "id: review\ngraph:\n  - stage: draft\n    sequence:\n      - agent: writer\n    parallel:\n      - agent: writer",
        );
        let result = validator().validate(&doc, &snapshot(&["writer"]));
        assert!(result
            .errors()
            .any(|i| i.message.contains("cannot declare both")));
    }

    #[test]
    fn test_empty_stage_fails() {
        let doc = recipe("id: review\ngraph:\n  - stage: draft\n    sequence: []");
        let result = validator().validate(&doc, &snapshot(&[]));
        assert!(result
            .errors()
            .any(|i| i.path == "graph.0.sequence"
                && i.message == "stage must reference at least one agent"));
    }

    #[test]
    fn test_duplicate_stage_names_fail() {
        let doc = recipe(
            "id: review\ngraph:\n  - stage: draft\n    sequence:\n      - agent: writer\n  - stage: draft\n    sequence:\n      - agent: writer",
        );
        let result = validator().validate(&doc, &snapshot(&["writer"]));
        assert!(result
            .errors()
            .any(|i| i.path == "graph.1.stage" && i.message.contains("duplicate stage name")));
    }

    #[test]
    fn test_parallel_duplicate_reference_flagged() {
        let doc = recipe(
            "id: review\ngraph:\n  - stage: check\n    parallel:\n      - agent: docs-architect\n      - agent: docs-architect",
        );
        let result = validator().validate(&doc, &snapshot(&["docs-architect"]));
        assert!(!result.passed());
        let issue = result.errors().next().unwrap();
        assert_eq!(issue.path, "graph.0.parallel.1.agent");
        assert!(issue.message.contains("referenced twice in one parallel set"));
    }

    #[test]
    fn test_sequence_duplicate_reference_allowed() {
        // Running the same agent twice in sequence is legitimate.
        let doc = recipe(
            "id: review\ngraph:\n  - stage: draft\n    sequence:\n      - agent: writer\n      - agent: writer",
        );
        let result = validator().validate(&doc, &snapshot(&["writer"]));
        assert!(result.passed());
    }
}
