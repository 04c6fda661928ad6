//! Visibility by visitor role.

use std::fmt;

/// One entry of a template's role list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRule {
    /// Everyone, authenticated or not.
    All,
    /// Any authenticated visitor.
    LoggedIn,
    /// Anonymous visitors only.
    LoggedOut,
    /// Literal role name from the host user store.
    Role(String),
}

impl RoleRule {
    /// Total: any non-reserved tag is taken as a literal role name.
    pub fn parse(tag: &str) -> Self {
        match tag {
            "all" => RoleRule::All,
            "logged-in" => RoleRule::LoggedIn,
            "logged-out" => RoleRule::LoggedOut,
            other => RoleRule::Role(other.to_string()),
        }
    }
}

impl fmt::Display for RoleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleRule::All => f.write_str("all"),
            RoleRule::LoggedIn => f.write_str("logged-in"),
            RoleRule::LoggedOut => f.write_str("logged-out"),
            RoleRule::Role(name) => f.write_str(name),
        }
    }
}
