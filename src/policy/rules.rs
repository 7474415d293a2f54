//! Robots.txt rule evaluation
//!
//! Thin wrapper around the robotstxt crate, with explicit permissive and
//! restrictive constructors for the cases where no rules could be fetched.

use robotstxt::DefaultMatcher;

#[derive(Debug, Clone, PartialEq, Eq)]
enum RulesMode {
    /// Permit everything (fail-open, or an absent robots.txt)
    AllowAll,
    /// Deny everything (fail-closed)
    DenyAll,
    /// Evaluate the stored robots.txt content
    FromContent,
}

/// Cached robots.txt decision source for one domain
#[derive(Debug, Clone)]
pub struct RobotsRules {
    content: String,
    mode: RulesMode,
}

impl RobotsRules {
    /// Creates rules from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            mode: RulesMode::FromContent,
        }
    }

    /// Creates permissive rules that allow every URL
    ///
    /// Used when robots.txt is absent, or cannot be fetched and the gate is
    /// configured fail-open.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            mode: RulesMode::AllowAll,
        }
    }

    /// Creates restrictive rules that deny every URL
    ///
    /// Used when robots.txt cannot be fetched and the gate is configured
    /// fail-closed.
    pub fn deny_all() -> Self {
        Self {
            content: String::new(),
            mode: RulesMode::DenyAll,
        }
    }

    /// Checks whether a URL is allowed for the given user agent
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        match self.mode {
            RulesMode::AllowAll => true,
            RulesMode::DenyAll => false,
            RulesMode::FromContent => {
                if self.content.is_empty() {
                    return true;
                }
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
            }
        }
    }
}
