//! Path/method exclusion rules for authentication bypass.
//!
//! Rules are parsed once at filter construction from raw `"METHOD:pathPrefix"`
//! strings (a bare prefix defaults the method to GET). Matching is a plain
//! byte-prefix check with no glob or regex semantics; any matching rule grants
//! exemption, so rule order never matters.

use std::fmt;

use axum::http::Method;

/// Paths that never require authentication, regardless of configured rules.
pub const ROOT_ALIASES: [&str; 3] = ["/", "/index.html", "/index.htm"];

const DEFAULT_METHOD: &str = "GET";

/// A single `(method, path-prefix)` exclusion rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludeRule {
    method: String,
    path_prefix: String,
}

impl ExcludeRule {
    /// Parse a raw rule string in `"METHOD:pathPrefix"` or bare `"pathPrefix"`
    /// form. The method is normalized to uppercase here so request-time
    /// matching stays an exact comparison.
    pub fn parse(raw: &str) -> Result<Self, RuleError> {
        if raw.is_empty() {
            return Err(RuleError::Empty);
        }
        match raw.split_once(':') {
            Some((method, path_prefix)) => {
                if method.is_empty() {
                    return Err(RuleError::MissingMethod(raw.to_string()));
                }
                if path_prefix.is_empty() {
                    return Err(RuleError::MissingPrefix(raw.to_string()));
                }
                Ok(Self {
                    method: method.to_ascii_uppercase(),
                    path_prefix: path_prefix.to_string(),
                })
            }
            None => Ok(Self {
                method: DEFAULT_METHOD.to_string(),
                path_prefix: raw.to_string(),
            }),
        }
    }

    /// Whether this rule exempts the given request. Method comparison is
    /// exact, prefix comparison is case-sensitive.
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.method == method.as_str() && path.starts_with(&self.path_prefix)
    }
}

impl fmt::Display for ExcludeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.method, self.path_prefix)
    }
}

/// The full exclusion-rule set, built once at filter construction and
/// immutable afterwards. Safe to share across concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct ExcludeMatcher {
    rules: Vec<ExcludeRule>,
}

impl ExcludeMatcher {
    /// Parse all raw rule strings. Any malformed entry fails the whole set,
    /// so bad configuration is caught at startup rather than at request time.
    pub fn parse<S: AsRef<str>>(raw_rules: &[S]) -> Result<Self, RuleError> {
        let rules = raw_rules
            .iter()
            .map(|raw| ExcludeRule::parse(raw.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Whether a `(method, path)` pair is exempt from authentication.
    /// The root aliases are always exempt; otherwise any matching rule
    /// grants exemption.
    pub fn is_exempt(&self, method: &Method, path: &str) -> bool {
        ROOT_ALIASES.contains(&path) || self.rules.iter().any(|rule| rule.matches(method, path))
    }

    pub fn rules(&self) -> &[ExcludeRule] {
        &self.rules
    }
}

/// Errors from malformed exclusion-rule strings. Raised at construction
/// time, never at request time.
#[derive(Debug)]
pub enum RuleError {
    /// Empty rule string
    Empty,
    /// Rule has a `:` separator but nothing before it
    MissingMethod(String),
    /// Rule has a method but no path prefix after the `:`
    MissingPrefix(String),
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::Empty => write!(f, "Empty exclusion rule"),
            RuleError::MissingMethod(rule) => {
                write!(f, "Exclusion rule has no method before ':': {:?}", rule)
            }
            RuleError::MissingPrefix(rule) => {
                write!(f, "Exclusion rule has no path prefix: {:?}", rule)
            }
        }
    }
}

impl std::error::Error for RuleError {}
