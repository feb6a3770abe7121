//! Registration key matching.
//!
//! # Responsibilities
//! - Match resource paths (exact, prefix, any)
//! - Match commands (exact, any)
//! - Combine both with AND semantics
//!
//! # Design Decisions
//! - `*` is the wildcard for both resources and commands
//! - `<prefix>/*` covers the prefix itself and everything below it
//! - Commands compare case-insensitively, paths case-sensitively
//! - No regex; matching is a couple of string comparisons

const WILDCARD: &str = "*";

/// Resource part of a registration key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourcePattern {
    Any,
    Prefix(String),
    Exact(String),
}

impl ResourcePattern {
    pub fn parse(pattern: &str) -> Self {
        if pattern == WILDCARD {
            return ResourcePattern::Any;
        }
        if let Some(base) = pattern.strip_suffix("/*") {
            let base = base.trim_end_matches('/');
            if base.is_empty() {
                return ResourcePattern::Any;
            }
            return ResourcePattern::Prefix(base.to_string());
        }
        ResourcePattern::Exact(pattern.trim_end_matches('/').to_string())
    }

    pub fn matches(&self, res: &str) -> bool {
        match self {
            ResourcePattern::Any => true,
            ResourcePattern::Exact(expected) => expected == res,
            ResourcePattern::Prefix(base) => res
                .strip_prefix(base.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
        }
    }
}

/// Command part of a registration key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandPattern {
    Any,
    Exact(String),
}

impl CommandPattern {
    pub fn parse(pattern: &str) -> Self {
        if pattern == WILDCARD {
            CommandPattern::Any
        } else {
            CommandPattern::Exact(pattern.to_lowercase())
        }
    }

    pub fn matches(&self, command: &str) -> bool {
        match self {
            CommandPattern::Any => true,
            CommandPattern::Exact(expected) => expected.eq_ignore_ascii_case(command),
        }
    }
}

/// A full (resource, command) key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMatcher {
    resource: ResourcePattern,
    command: CommandPattern,
}

impl KeyMatcher {
    pub fn new(resource: &str, command: &str) -> Self {
        Self {
            resource: ResourcePattern::parse(resource),
            command: CommandPattern::parse(command),
        }
    }

    pub fn matches(&self, res: &str, command: &str) -> bool {
        self.resource.matches(res) && self.command.matches(command)
    }
}
