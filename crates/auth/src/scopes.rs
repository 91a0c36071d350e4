use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// OAuth2 scope identifier.
///
/// Scopes are opaque strings (e.g. "units.list"). Each route of the unit API
/// requires exactly one of the `UNITS_*` scopes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(Cow<'static, str>);

impl Scope {
    pub const UNITS_LIST: Scope = Scope(Cow::Borrowed("units.list"));
    pub const UNITS_GET: Scope = Scope(Cow::Borrowed("units.get"));
    pub const UNITS_CREATE: Scope = Scope(Cow::Borrowed("units.create"));
    pub const UNITS_RENAME: Scope = Scope(Cow::Borrowed("units.rename"));
    pub const UNITS_DELETE: Scope = Scope(Cow::Borrowed("units.delete"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse a space-delimited scope list (RFC 6749 §3.3).
    pub fn parse_list(raw: &str) -> Vec<Scope> {
        raw.split_whitespace()
            .map(|s| Scope::new(s.to_string()))
            .collect()
    }

    /// Join scopes into a space-delimited list.
    pub fn join(scopes: &[Scope]) -> String {
        scopes
            .iter()
            .map(Scope::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl core::fmt::Display for Scope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_space_delimited_list() {
        let scopes = Scope::parse_list("units.list  units.get\tclasses.list");
        assert_eq!(
            scopes,
            vec![
                Scope::UNITS_LIST,
                Scope::UNITS_GET,
                Scope::new("classes.list")
            ]
        );
        assert_eq!(Scope::join(&scopes), "units.list units.get classes.list");
    }

    #[test]
    fn empty_list_parses_to_nothing() {
        assert!(Scope::parse_list("   ").is_empty());
    }
}
