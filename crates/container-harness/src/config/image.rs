// crates/container-harness/src/config/image.rs
// ============================================================================
// Module: Image References
// Description: Parsed `name:tag` container image references.
// Purpose: Validate image overrides before any container is started.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Image overrides arrive as `name:tag` strings. The tag separator is the last
//! `:` after the last `/`, so registry ports stay part of the name.

use std::fmt;

/// Container image split into repository name and tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Repository name, including any registry host.
    pub name: String,
    /// Image tag.
    pub tag: String,
}

impl ImageRef {
    /// Builds an image reference from static parts.
    #[must_use]
    pub fn new(name: &str, tag: &str) -> Self {
        Self {
            name: name.to_string(),
            tag: tag.to_string(),
        }
    }

    /// Parses `name:tag`. The tag separator is the last `:` after the last
    /// `/`, so registry ports such as `localhost:5000/redis:7.2` survive.
    ///
    /// # Errors
    ///
    /// Returns an error when the reference has no tag or an empty component.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        let path_start = trimmed.rfind('/').map_or(0, |idx| idx + 1);
        let Some(offset) = trimmed[path_start ..].rfind(':') else {
            return Err(format!("image reference `{trimmed}` must be name:tag"));
        };
        let split = path_start + offset;
        let name = &trimmed[.. split];
        let tag = &trimmed[split + 1 ..];
        if name.is_empty() || tag.is_empty() {
            return Err(format!("image reference `{trimmed}` must be name:tag"));
        }
        Ok(Self::new(name, tag))
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.tag)
    }
}
