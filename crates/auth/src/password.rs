//! Password policy: a configurable set of rules checked all at once.
//!
//! `PasswordPolicy::validate` never stops at the first failure; callers get
//! every violated rule so the user can fix them in one go.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_MIN_LENGTH: usize = 8;
pub const DEFAULT_MAX_SIMILARITY: f64 = 0.7;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("static regex"));

// Lowercased. Matched against the trimmed, lowercased candidate.
static COMMON_PASSWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "password", "password1", "password12", "password123", "password1234", "passw0rd",
        "p@ssw0rd", "123456", "1234567", "12345678", "123456789", "1234567890", "1234",
        "12345", "123123", "111111", "000000", "654321", "666666", "121212", "112233",
        "qwerty", "qwerty123", "qwertyuiop", "1q2w3e4r", "1qaz2wsx", "zaq12wsx", "asdfgh",
        "asdfghjkl", "zxcvbnm", "abc123", "abcd1234", "a1b2c3d4", "letmein", "welcome",
        "welcome1", "welcome123", "monkey", "dragon", "baseball", "football", "iloveyou",
        "trustno1", "sunshine", "master", "shadow", "ashley", "michael", "superman",
        "batman", "starwars", "princess", "mustang", "access", "login", "admin", "admin123",
        "administrator", "root", "toor", "changeme", "secret", "hello123", "freedom",
        "whatever", "qazwsx", "charlie", "donald", "jennifer", "hunter2", "computer",
        "internet", "killer", "soccer", "hockey", "ranger", "harley", "thomas", "jordan23",
        "biteme", "matrix", "cheese", "summer", "winter", "spring2024", "test1234",
        "testtest", "guest", "default", "pokemon", "naruto", "flower", "cookie",
    ]
    .into_iter()
    .collect()
});

/// A single enumerated rule of the policy.
#[derive(Debug, Clone, PartialEq)]
pub enum PasswordRule {
    /// At least this many characters.
    MinimumLength(usize),
    /// Not made only of digits.
    NotNumeric,
    /// Not in the bundled common-password list.
    NotCommon,
    /// Not too similar to the username or email (0.0..=1.0, higher is laxer).
    NotSimilarToUser { max_similarity: f64 },
}

/// User attributes a candidate password is compared against.
#[derive(Debug, Clone, Copy)]
pub struct UserContext<'a> {
    pub username: &'a str,
    pub email: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAttribute {
    Username,
    Email,
}

impl core::fmt::Display for UserAttribute {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UserAttribute::Username => f.write_str("username"),
            UserAttribute::Email => f.write_str("email address"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleViolation {
    #[error("This password is too short. It must contain at least {min_length} characters.")]
    TooShort { min_length: usize },

    #[error("This password is entirely numeric.")]
    EntirelyNumeric,

    #[error("This password is too common.")]
    TooCommon,

    #[error("The password is too similar to the {attribute}.")]
    TooSimilar { attribute: UserAttribute },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PasswordPolicy {
    rules: Vec<PasswordRule>,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::new(vec![
            PasswordRule::NotSimilarToUser {
                max_similarity: DEFAULT_MAX_SIMILARITY,
            },
            PasswordRule::MinimumLength(DEFAULT_MIN_LENGTH),
            PasswordRule::NotCommon,
            PasswordRule::NotNumeric,
        ])
    }
}

impl PasswordPolicy {
    pub fn new(rules: Vec<PasswordRule>) -> Self {
        Self { rules }
    }

    /// Default rule set with overridden thresholds.
    pub fn with_thresholds(min_length: usize, max_similarity: f64) -> Self {
        Self::new(vec![
            PasswordRule::NotSimilarToUser { max_similarity },
            PasswordRule::MinimumLength(min_length),
            PasswordRule::NotCommon,
            PasswordRule::NotNumeric,
        ])
    }

    pub fn rules(&self) -> &[PasswordRule] {
        &self.rules
    }

    /// Check `candidate` against every rule; `Err` carries all violations.
    pub fn validate(&self, candidate: &str, user: UserContext<'_>) -> Result<(), Vec<RuleViolation>> {
        let violations: Vec<RuleViolation> = self
            .rules
            .iter()
            .filter_map(|rule| check_rule(rule, candidate, user))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

fn check_rule(rule: &PasswordRule, candidate: &str, user: UserContext<'_>) -> Option<RuleViolation> {
    match rule {
        PasswordRule::MinimumLength(min_length) => {
            (candidate.chars().count() < *min_length).then_some(RuleViolation::TooShort {
                min_length: *min_length,
            })
        }
        PasswordRule::NotNumeric => {
            let numeric = !candidate.is_empty() && candidate.chars().all(char::is_numeric);
            numeric.then_some(RuleViolation::EntirelyNumeric)
        }
        PasswordRule::NotCommon => {
            let normalized = candidate.trim().to_lowercase();
            COMMON_PASSWORDS
                .contains(normalized.as_str())
                .then_some(RuleViolation::TooCommon)
        }
        PasswordRule::NotSimilarToUser { max_similarity } => {
            similar_attribute(candidate, user, *max_similarity)
                .map(|attribute| RuleViolation::TooSimilar { attribute })
        }
    }
}

fn similar_attribute(candidate: &str, user: UserContext<'_>, max_similarity: f64) -> Option<UserAttribute> {
    let password = candidate.to_lowercase();
    let attributes = [
        (UserAttribute::Username, user.username),
        (UserAttribute::Email, user.email),
    ];

    for (attribute, value) in attributes {
        if value.is_empty() {
            continue;
        }
        let value = value.to_lowercase();
        let parts = NON_WORD
            .split(&value)
            .map(str::to_string)
            .chain(std::iter::once(value.clone()));

        for part in parts {
            if exceeds_length_ratio(&password, max_similarity, &part) {
                continue;
            }
            if quick_ratio(&password, &part) >= max_similarity {
                return Some(attribute);
            }
        }
    }
    None
}

/// A very short attribute part cannot meaningfully resemble a long password.
fn exceeds_length_ratio(password: &str, max_similarity: f64, part: &str) -> bool {
    let pwd_len = password.chars().count();
    let part_len = part.chars().count();
    let length_bound = max_similarity / 2.0 * pwd_len as f64;
    pwd_len >= 10 * part_len && (part_len as f64) < length_bound
}

/// Upper bound on sequence similarity: shared character multiset over total length.
fn quick_ratio(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }

    let mut available: HashMap<char, usize> = HashMap::new();
    for c in b.chars() {
        *available.entry(c).or_default() += 1;
    }

    let mut matches = 0usize;
    for c in a.chars() {
        if let Some(n) = available.get_mut(&c) {
            if *n > 0 {
                *n -= 1;
                matches += 1;
            }
        }
    }

    2.0 * matches as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn alice() -> UserContext<'static> {
        UserContext {
            username: "alice",
            email: "a@x.com",
        }
    }

    #[test]
    fn strong_password_passes_default_policy() {
        assert_eq!(PasswordPolicy::default().validate("Str0ng!Pass1", alice()), Ok(()));
    }

    #[test]
    fn all_violations_are_reported_together() {
        let violations = PasswordPolicy::default().validate("1234", alice()).unwrap_err();
        assert_eq!(
            violations,
            vec![
                RuleViolation::TooShort { min_length: 8 },
                RuleViolation::TooCommon,
                RuleViolation::EntirelyNumeric,
            ]
        );
    }

    #[test]
    fn password_resembling_username_is_rejected() {
        let violations = PasswordPolicy::default().validate("alice123", alice()).unwrap_err();
        assert!(violations.contains(&RuleViolation::TooSimilar {
            attribute: UserAttribute::Username
        }));
    }

    #[test]
    fn password_resembling_email_local_part_is_rejected() {
        let user = UserContext {
            username: "zed",
            email: "margaret.hamilton@example.com",
        };
        let violations = PasswordPolicy::default()
            .validate("hamiltonm", user)
            .unwrap_err();
        assert_eq!(
            violations,
            vec![RuleViolation::TooSimilar {
                attribute: UserAttribute::Email
            }]
        );
    }

    #[test]
    fn common_check_ignores_case_and_surrounding_space() {
        let policy = PasswordPolicy::new(vec![PasswordRule::NotCommon]);
        assert_eq!(
            policy.validate("  PassWord123 ", alice()),
            Err(vec![RuleViolation::TooCommon])
        );
    }

    #[test]
    fn empty_rule_set_accepts_anything() {
        assert!(PasswordPolicy::new(Vec::new()).validate("", alice()).is_ok());
    }

    #[test]
    fn thresholds_are_configurable() {
        let policy = PasswordPolicy::with_thresholds(16, 1.0);
        let violations = policy.validate("Str0ng!Pass1", alice()).unwrap_err();
        assert_eq!(violations, vec![RuleViolation::TooShort { min_length: 16 }]);
    }

    #[test]
    fn violation_messages_are_user_facing() {
        assert_eq!(
            RuleViolation::TooSimilar {
                attribute: UserAttribute::Email
            }
            .to_string(),
            "The password is too similar to the email address."
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: any digits-only password violates the numeric rule.
        #[test]
        fn digit_only_passwords_are_flagged(candidate in "[0-9]{1,32}") {
            let violations = PasswordPolicy::default()
                .validate(&candidate, alice())
                .unwrap_err();
            prop_assert!(violations.contains(&RuleViolation::EntirelyNumeric));
        }

        /// Property: the result never depends on rule short-circuiting.
        #[test]
        fn violations_are_the_union_of_single_rule_checks(candidate in ".{0,24}") {
            let policy = PasswordPolicy::default();
            let combined = policy.validate(&candidate, alice()).err().unwrap_or_default();
            let individually: Vec<RuleViolation> = policy
                .rules()
                .iter()
                .filter_map(|rule| {
                    PasswordPolicy::new(vec![rule.clone()])
                        .validate(&candidate, alice())
                        .err()
                })
                .flatten()
                .collect();
            prop_assert_eq!(combined, individually);
        }
    }
}
