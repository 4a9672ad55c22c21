//! Space (tenant) identifiers and the prefixing rules that scope URLs and
//! stored-object ids to a space.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Well-known identifier of the default space.
pub const DEFAULT_SPACE_ID: &str = "default";

/// Identifier of a space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SpaceId(String);

impl SpaceId {
    /// Create a space id, rejecting empty or whitespace-only values.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CoreError::InvalidSpaceId {
                value: id,
                reason: "must not be empty".to_string(),
            });
        }
        if id.contains('/') || id.contains(':') {
            return Err(CoreError::InvalidSpaceId {
                value: id,
                reason: "must not contain '/' or ':'".to_string(),
            });
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SpaceId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SpaceId> for String {
    fn from(value: SpaceId) -> Self {
        value.0
    }
}

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Prefixing rules for a deployment.
///
/// The default space applies no prefix. Every other space prefixes request
/// paths with `/s/<space>` and space-aware object ids with `<space>:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceLayout {
    default_space: SpaceId,
}

impl SpaceLayout {
    pub fn new(default_space: SpaceId) -> Self {
        Self { default_space }
    }

    pub fn default_space(&self) -> &SpaceId {
        &self.default_space
    }

    pub fn is_default(&self, space: &SpaceId) -> bool {
        *space == self.default_space
    }

    /// Path prefix placed before `/api/...` for requests made in `space`.
    pub fn url_prefix(&self, space: &SpaceId) -> String {
        if self.is_default(space) {
            String::new()
        } else {
            format!("/s/{}", space)
        }
    }

    /// Prefix of the stored id of a space-aware object living in `space`.
    pub fn id_prefix(&self, space: &SpaceId) -> String {
        if self.is_default(space) {
            String::new()
        } else {
            format!("{}:", space)
        }
    }

    /// Stored id of a space-aware object, i.e. `id_prefix(space) + id`.
    pub fn prefixed_id(&self, space: &SpaceId, id: &str) -> String {
        format!("{}{}", self.id_prefix(space), id)
    }

    /// Split a request path into the addressed space and the remainder.
    ///
    /// `/s/space_1/api/...` yields `(space_1, "/api/...")`; any other path
    /// belongs to the default space.
    pub fn split_path<'a>(&self, path: &'a str) -> Result<(SpaceId, &'a str), CoreError> {
        match path.strip_prefix("/s/") {
            Some(rest) => {
                let (space, remainder) = rest.split_at(rest.find('/').unwrap_or(rest.len()));
                Ok((SpaceId::new(space)?, remainder))
            }
            None => Ok((self.default_space.clone(), path)),
        }
    }
}

impl Default for SpaceLayout {
    fn default() -> Self {
        Self {
            default_space: SpaceId(DEFAULT_SPACE_ID.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space(id: &str) -> SpaceId {
        SpaceId::new(id).expect("valid space id")
    }

    #[test]
    fn test_default_space_has_no_prefixes() {
        let layout = SpaceLayout::default();
        let default = space(DEFAULT_SPACE_ID);
        assert!(layout.is_default(&default));
        assert_eq!(layout.url_prefix(&default), "");
        assert_eq!(layout.id_prefix(&default), "");
        assert_eq!(layout.prefixed_id(&default, "abc"), "abc");
    }

    #[test]
    fn test_other_space_prefixes() {
        let layout = SpaceLayout::default();
        let s1 = space("space_1");
        assert_eq!(layout.url_prefix(&s1), "/s/space_1");
        assert_eq!(layout.id_prefix(&s1), "space_1:");
        assert_eq!(layout.prefixed_id(&s1, "abc"), "space_1:abc");
    }

    #[test]
    fn test_custom_default_space() {
        let layout = SpaceLayout::new(space("main"));
        assert_eq!(layout.url_prefix(&space("main")), "");
        assert_eq!(layout.url_prefix(&space(DEFAULT_SPACE_ID)), "/s/default");
    }

    #[test]
    fn test_space_id_validation() {
        assert!(SpaceId::new("").is_err());
        assert!(SpaceId::new("   ").is_err());
        assert!(SpaceId::new("a/b").is_err());
        assert!(SpaceId::new("a:b").is_err());
        assert!(SpaceId::new("space_2").is_ok());
    }

    #[test]
    fn test_split_path() -> Result<(), CoreError> {
        let layout = SpaceLayout::default();

        let (s, rest) = layout.split_path("/s/space_1/api/saved_objects/visualization/x")?;
        assert_eq!(s, space("space_1"));
        assert_eq!(rest, "/api/saved_objects/visualization/x");

        let (s, rest) = layout.split_path("/api/saved_objects/globaltype/y")?;
        assert!(layout.is_default(&s));
        assert_eq!(rest, "/api/saved_objects/globaltype/y");

        assert!(layout.split_path("/s//api").is_err());
        Ok(())
    }

    proptest::proptest! {
        #[test]
        fn prop_non_default_prefixes_round_trip(name in "[a-z][a-z0-9_-]{0,20}") {
            let layout = SpaceLayout::default();
            let id = SpaceId::new(name.clone()).expect("generated ids are valid");
            if !layout.is_default(&id) {
                let path = format!("{}/api/saved_objects/x/y", layout.url_prefix(&id));
                let (parsed, rest) = layout.split_path(&path).expect("prefixed path splits");
                proptest::prop_assert_eq!(parsed, id.clone());
                proptest::prop_assert_eq!(rest, "/api/saved_objects/x/y");
                proptest::prop_assert_eq!(layout.prefixed_id(&id, "abc"), format!("{}:abc", name));
            }
        }
    }

    #[test]
    fn test_space_id_serde() -> Result<(), serde_json::Error> {
        let id: SpaceId = serde_json::from_str("\"space_1\"")?;
        assert_eq!(id.as_str(), "space_1");
        assert!(serde_json::from_str::<SpaceId>("\"\"").is_err());
        assert_eq!(serde_json::to_string(&id)?, "\"space_1\"");
        Ok(())
    }
}
