//! Policy evaluation.
//!
//! A request is allowed when at least one policy rule matches it. There is
//! no deny rule; absence of a match is a deny.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::rule::{GroupingRule, PolicyRule, WILDCARD};

/// One authorization question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequest<'a> {
    /// User id of the caller.
    pub subject: &'a str,
    /// Role carried by the caller's access token, if any.
    pub role: Option<&'a str>,
    /// Tenant id of the caller. Empty for platform users.
    pub tenant: &'a str,
    /// Requested resource (URL path).
    pub resource: &'a str,
    /// Requested action (HTTP method).
    pub action: &'a str,
}

/// An in-memory set of policy and grouping rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicySet {
    policies: HashSet<PolicyRule>,
    groupings: HashSet<GroupingRule>,
}

impl PolicySet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from rule lists.
    pub fn from_rules(
        policies: impl IntoIterator<Item = PolicyRule>,
        groupings: impl IntoIterator<Item = GroupingRule>,
    ) -> Self {
        Self {
            policies: policies.into_iter().collect(),
            groupings: groupings.into_iter().collect(),
        }
    }

    /// Add a policy rule. Returns `false` if it was already present.
    pub fn add_policy(&mut self, rule: PolicyRule) -> bool {
        self.policies.insert(rule)
    }

    /// Remove a policy rule. Returns `false` if it was absent.
    pub fn remove_policy(&mut self, rule: &PolicyRule) -> bool {
        self.policies.remove(rule)
    }

    /// Add a grouping rule. Returns `false` if it was already present.
    pub fn add_grouping(&mut self, rule: GroupingRule) -> bool {
        self.groupings.insert(rule)
    }

    /// Number of policy rules.
    pub fn policy_count(&self) -> usize {
        self.policies.len()
    }

    /// Number of grouping rules.
    pub fn grouping_count(&self) -> usize {
        self.groupings.len()
    }

    /// Roles bound to `user` inside `tenant` by grouping rules.
    pub fn roles_for<'s>(&'s self, user: &'s str, tenant: &'s str) -> impl Iterator<Item = &'s str> {
        self.groupings
            .iter()
            .filter(move |g| g.user == user && tenant_matches(&g.tenant, tenant))
            .map(|g| g.role.as_str())
    }

    /// Decide a request.
    pub fn enforce(&self, request: &AccessRequest<'_>) -> bool {
        let mut roles: HashSet<&str> = self.roles_for(request.subject, request.tenant).collect();
        if let Some(role) = request.role {
            roles.insert(role);
        }

        self.policies.iter().any(|rule| {
            let subject_ok = rule.subject == request.subject || roles.contains(rule.bare_subject());
            subject_ok
                && tenant_matches(&rule.tenant, request.tenant)
                && action_matches(&rule.action, request.action)
                && key_match(request.resource, &rule.resource)
        })
    }
}

fn tenant_matches(rule_tenant: &str, tenant: &str) -> bool {
    rule_tenant == WILDCARD || rule_tenant == tenant
}

fn action_matches(rule_action: &str, action: &str) -> bool {
    rule_action == WILDCARD || rule_action.eq_ignore_ascii_case(action)
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Literal(u8),
    AnyRun,
    Segment,
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let bytes = pattern.as_bytes();
    let mut tokens = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'*' => {
                tokens.push(Token::AnyRun);
                i += 1;
            }
            b'{' if bytes[i..].contains(&b'}') => {
                tokens.push(Token::Segment);
                i += bytes[i..].iter().position(|&c| c == b'}').unwrap_or(0) + 1;
            }
            b':' if i == 0 || bytes[i - 1] == b'/' => {
                tokens.push(Token::Segment);
                i += 1;
                while i < bytes.len() && bytes[i] != b'/' {
                    i += 1;
                }
            }
            c => {
                tokens.push(Token::Literal(c));
                i += 1;
            }
        }
    }
    tokens
}

fn match_tokens(path: &[u8], tokens: &[Token]) -> bool {
    match tokens.split_first() {
        None => path.is_empty(),
        Some((Token::Literal(c), rest)) => path.first() == Some(c) && match_tokens(&path[1..], rest),
        Some((Token::AnyRun, rest)) => (0..=path.len()).any(|i| match_tokens(&path[i..], rest)),
        Some((Token::Segment, rest)) => {
            let max = path.iter().position(|&c| c == b'/').unwrap_or(path.len());
            (1..=max).any(|i| match_tokens(&path[i..], rest))
        }
    }
}

/// Match a resource path against a pattern.
///
/// `*` matches any run of characters (including `/`), `{name}` and a
/// segment-leading `:name` match one non-empty path segment. Everything else
/// matches literally.
pub fn key_match(path: &str, pattern: &str) -> bool {
    match_tokens(path.as_bytes(), &tokenize(pattern))
}
