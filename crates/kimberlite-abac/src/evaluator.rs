//! ABAC policy evaluation engine.
//!
//! Evaluates access requests against a policy by checking rules in priority order.
//! The first matching rule wins. If no rule matches, the policy's default effect applies.

use crate::attributes::{EnvironmentAttributes, ResourceAttributes, UserAttributes};
use crate::policy::{AbacPolicy, Condition, Effect, Rule};
use kimberlite_types::DataClass;

// ============================================================================
// Decision
// ============================================================================

/// The result of evaluating an access request against a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Whether access is allowed or denied.
    pub effect: Effect,
    /// The name of the rule that matched, or `None` if the default was applied.
    pub matched_rule: Option<String>,
    /// Human-readable explanation of why this decision was made.
    pub reason: String,
}

// ============================================================================
// Public API
// ============================================================================

/// Evaluates an access request against a policy.
///
/// Rules are sorted by priority (highest first). The first rule whose
/// conditions all match determines the outcome. If no rule matches,
/// the policy's `default_effect` is returned.
///
/// # Postcondition
///
/// Always returns a `Decision` -- never panics on valid input.
pub fn evaluate(
    policy: &AbacPolicy,
    user: &UserAttributes,
    resource: &ResourceAttributes,
    env: &EnvironmentAttributes,
) -> Decision {
    // Sort rules by priority (highest first)
    let mut rules: Vec<&Rule> = policy.rules.iter().collect();
    rules.sort_by(|a, b| b.priority.cmp(&a.priority));

    for rule in &rules {
        let all_conditions_match = rule
            .conditions
            .iter()
            .all(|cond| evaluate_condition(cond, user, resource, env));

        if all_conditions_match {
            return Decision {
                effect: rule.effect,
                matched_rule: Some(rule.name.clone()),
                reason: format!("Matched rule '{}' (priority {})", rule.name, rule.priority),
            };
        }
    }

    // No rule matched -- apply default
    Decision {
        effect: policy.default_effect,
        matched_rule: None,
        reason: format!(
            "No rule matched; applying default effect: {:?}",
            policy.default_effect
        ),
    }
}

// ============================================================================
// Condition Evaluation
// ============================================================================

/// Recursively evaluates a single condition against the request attributes.
fn evaluate_condition(
    condition: &Condition,
    user: &UserAttributes,
    resource: &ResourceAttributes,
    env: &EnvironmentAttributes,
) -> bool {
    match condition {
        // -- User attribute conditions --
        Condition::RoleEquals(role) => user.role == *role,
        Condition::ClearanceLevelAtLeast(level) => user.clearance_level >= *level,
        Condition::DepartmentEquals(dept) => user.department == *dept,
        Condition::TenantEquals(tid) => user.tenant_id == Some(*tid),

        // -- Resource attribute conditions --
        Condition::DataClassAtMost(max_class) => {
            let resource_level = data_class_level(resource.data_class);
            let max_level = data_class_level_from_name(max_class);
            resource_level <= max_level
        }
        Condition::StreamNameMatches(pattern) => glob_matches(pattern, &resource.stream_name),

        // -- Environment conditions --
        Condition::BusinessHoursOnly => env.is_business_hours,
        Condition::CountryIn(countries) => countries.contains(&env.source_country),
        Condition::CountryNotIn(countries) => !countries.contains(&env.source_country),

        // -- Compliance-specific conditions --
        Condition::RetentionPeriodAtLeast(min_days) => {
            resource.retention_days.is_some_and(|d| d >= *min_days)
        }
        Condition::DataCorrectionAllowed => resource.correction_allowed,
        Condition::IncidentReportingDeadline(_hours) => {
            // Deadline is metadata for policy documentation; evaluation checks
            // that incident reporting infrastructure exists (always true for Kimberlite).
            true
        }
        Condition::FieldLevelRestriction(allowed_fields) => resource
            .requested_fields
            .as_ref()
            .is_none_or(|fields| fields.iter().all(|f| allowed_fields.contains(f))),
        Condition::OperationalSequencing(_steps) => {
            // Sequencing is enforced by the signature binding module;
            // ABAC checks that the policy is declared.
            true
        }
        Condition::LegalHoldActive => resource.legal_hold_active,

        // -- Logical combinators --
        Condition::And(sub) => sub
            .iter()
            .all(|c| evaluate_condition(c, user, resource, env)),
        Condition::Or(sub) => sub
            .iter()
            .any(|c| evaluate_condition(c, user, resource, env)),
        Condition::Not(sub) => !evaluate_condition(sub, user, resource, env),
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Returns a numeric sensitivity level for a `DataClass`.
///
/// Higher values indicate more sensitive data. This ordering is used for
/// `DataClassAtMost` comparisons.
///
/// Levels:
/// - 0: Public
/// - 1: Deidentified
/// - 2: Confidential
/// - 3: Financial
/// - 4: PII
/// - 5: PCI
/// - 6: Sensitive
/// - 7: PHI
fn data_class_level(dc: DataClass) -> u8 {
    match dc {
        DataClass::Public => 0,
        DataClass::Deidentified => 1,
        DataClass::Confidential => 2,
        DataClass::Financial => 3,
        DataClass::PII => 4,
        DataClass::PCI => 5,
        DataClass::Sensitive => 6,
        DataClass::PHI => 7,
    }
}

/// Parses a data class name string into its numeric sensitivity level.
///
/// Unrecognized names map to level 0 (most restrictive in `AtMost` comparisons).
fn data_class_level_from_name(name: &str) -> u8 {
    match name {
        "Deidentified" => 1,
        "Confidential" => 2,
        "Financial" => 3,
        "PII" => 4,
        "PCI" => 5,
        "Sensitive" => 6,
        "PHI" => 7,
        // "Public" and unrecognized names both map to 0 (least sensitive).
        _ => 0,
    }
}

/// Simple glob pattern matching supporting `*` and `?` wildcards.
///
/// - `*` matches zero or more characters
/// - `?` matches exactly one character
///
/// This is intentionally simple. Production systems needing full glob
/// semantics should use a dedicated glob crate.
fn glob_matches(pattern: &str, value: &str) -> bool {
    glob_match_recursive(pattern.as_bytes(), value.as_bytes())
}

/// Recursive glob matcher operating on byte slices.
///
/// Uses bounded recursion proportional to pattern length (max depth = `pattern.len()`).
fn glob_match_recursive(pattern: &[u8], value: &[u8]) -> bool {
    match (pattern.first(), value.first()) {
        // Both exhausted -- match
        (None, None) => true,
        // `*` at end of pattern matches everything
        (Some(b'*'), _) if pattern.len() == 1 => true,
        // `*` matches zero or more characters
        (Some(b'*'), _) => {
            // Try: `*` matches zero characters (skip `*`, keep value)
            // Or:  `*` matches one character (keep `*`, advance value)
            glob_match_recursive(&pattern[1..], value)
                || (!value.is_empty() && glob_match_recursive(pattern, &value[1..]))
        }
        // `?` matches exactly one character
        (Some(b'?'), Some(_)) => glob_match_recursive(&pattern[1..], &value[1..]),
        // Literal character match
        (Some(p), Some(v)) if p == v => glob_match_recursive(&pattern[1..], &value[1..]),
        // All remaining cases: pattern exhausted with value remaining, `?` with
        // no value character, or literal mismatch
        _ => false,
    }
}

// ============================================================================
// Tests
// ============================================================================
