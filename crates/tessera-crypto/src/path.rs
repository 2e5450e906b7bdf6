use std::fmt;
use std::str::FromStr;

use crate::error::CryptoError;

/// First hardened index. Every segment is stored unhardened (`< 2^31`) and
/// hardened at derivation time.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// A hierarchical derivation path, rendered as `m/i1/i2/...`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DerivationPath {
    segments: Vec<u32>,
}

impl DerivationPath {
    /// The root path `m`.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from explicit segments.
    pub fn new(segments: Vec<u32>) -> Result<Self, CryptoError> {
        let mut path = Self::root();
        for index in segments {
            path.push(index)?;
        }
        Ok(path)
    }

    pub fn segments(&self) -> &[u32] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Append a trailing segment.
    pub fn push(&mut self, index: u32) -> Result<(), CryptoError> {
        if index >= HARDENED_OFFSET {
            return Err(CryptoError::invalid_path(
                format!("{}/{}", self, index),
                format!("segment {} exceeds the hardened range", index),
            ));
        }
        self.segments.push(index);
        Ok(())
    }

    /// Remove and return the trailing segment.
    pub fn pop(&mut self) -> Option<u32> {
        self.segments.pop()
    }

    /// A new path with `index` appended.
    pub fn child(&self, index: u32) -> Result<Self, CryptoError> {
        let mut path = self.clone();
        path.push(index)?;
        Ok(path)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for index in &self.segments {
            write!(f, "/{}", index)?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = CryptoError;

    /// Parses `m` or `m/<n>/<n>/...`. A trailing `'`, `h` or `H` on a segment
    /// is accepted; all segments are hardened regardless.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        if parts.next() != Some("m") {
            return Err(CryptoError::invalid_path(s, "path must start with 'm'"));
        }

        let mut path = Self::root();
        for part in parts {
            let digits = part.strip_suffix(&['\'', 'h', 'H'][..]).unwrap_or(part);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(CryptoError::invalid_path(
                    s,
                    format!("segment '{}' is not a non-negative integer", part),
                ));
            }
            let index: u32 = digits
                .parse()
                .map_err(|_| CryptoError::invalid_path(s, format!("segment '{}' overflows", part)))?;
            if index >= HARDENED_OFFSET {
                return Err(CryptoError::invalid_path(
                    s,
                    format!("segment {} exceeds the hardened range", index),
                ));
            }
            path.segments.push(index);
        }
        Ok(path)
    }
}
