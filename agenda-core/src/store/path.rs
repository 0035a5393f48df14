//! Slash-separated addresses into the record tree.

use std::fmt;

use crate::error::{AgendaError, AgendaResult};

const FORBIDDEN_KEY_CHARS: [char; 5] = ['.', '#', '$', '[', ']'];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse `users/abc` style paths. Leading/trailing slashes are ignored.
    pub fn parse(path: &str) -> AgendaResult<Self> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(Self::root(), |acc, segment| acc.child(segment))
    }

    pub fn child(&self, key: &str) -> AgendaResult<Self> {
        validate_key(key)?;
        let mut segments = self.segments.clone();
        segments.push(key.to_string());
        Ok(StorePath { segments })
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(StorePath {
            segments: rest.to_vec(),
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn starts_with(&self, prefix: &StorePath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Whether a write at `self` can change what is visible at `other`.
    pub fn overlaps(&self, other: &StorePath) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }
}

fn validate_key(key: &str) -> AgendaResult<()> {
    if key.is_empty() || key.contains('/') || key.contains(FORBIDDEN_KEY_CHARS) {
        return Err(AgendaError::InvalidPath(key.to_string()));
    }
    Ok(())
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}
