//! Policy Engine
//!
//! Turns an ordered set of rules into a request fingerprint and a bypass
//! decision. Both are pure functions of the request and the registered rules.

use axum::http::Request;

use crate::policy::{BypassRule, CacheKey, KeyRule, Rule, VALUE_SEPARATOR};

// == Cache Policy ==
/// Ordered key contributors and bypass predicates.
///
/// `CachePolicy::default()` starts with a path contributor;
/// `CachePolicy::new()` starts empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    key_rules: Vec<KeyRule>,
    bypass_rules: Vec<BypassRule>,
}

impl CachePolicy {
    // == Constructor ==
    /// Creates a policy with no rules.
    pub fn new() -> Self {
        Self {
            key_rules: Vec::new(),
            bypass_rules: Vec::new(),
        }
    }

    // == Register ==
    /// Appends `rule` to the list for its kind. Unrecognized rules are ignored.
    pub fn register(&mut self, rule: impl Into<Rule>) -> &mut Self {
        match rule.into() {
            Rule::Key(rule) => self.key_rules.push(rule),
            Rule::Bypass(rule) => self.bypass_rules.push(rule),
            Rule::Unrecognized => {}
        }
        self
    }

    /// Registers every rule in order.
    pub fn register_all<I>(&mut self, rules: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Rule>,
    {
        for rule in rules {
            self.register(rule);
        }
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, rule: impl Into<Rule>) -> Self {
        self.register(rule);
        self
    }

    /// Key contributors, in registration order.
    pub fn key_rules(&self) -> &[KeyRule] {
        &self.key_rules
    }

    /// Bypass predicates, in registration order.
    pub fn bypass_rules(&self) -> &[BypassRule] {
        &self.bypass_rules
    }

    // == Fingerprint ==
    /// Joins every contributor's component, in registration order, with `/`
    /// and hashes the result.
    pub fn fingerprint<B>(&self, request: &Request<B>) -> CacheKey {
        let material = self
            .key_rules
            .iter()
            .map(|rule| rule.extract(request))
            .collect::<Vec<_>>()
            .join(VALUE_SEPARATOR);
        CacheKey::digest(&material)
    }

    // == Should Bypass ==
    /// True as soon as any predicate matches.
    pub fn should_bypass<B>(&self, request: &Request<B>) -> bool {
        self.bypass_rules.iter().any(|rule| rule.matches(request))
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::new().with(KeyRule::Path)
    }
}
