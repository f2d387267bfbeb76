//! Spatial directions of a spherical-polar grid.

use std::fmt;

/// The grid axis a stencil differentiates along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Along `r`, grid index `i`.
    Radial,
    /// Along `θ`, grid index `j`.
    Angular,
    /// Along `φ`, grid index `k`.
    Azimuthal,
}

impl Direction {
    /// All directions in canonical order.
    pub const ALL: [Direction; 3] = [Self::Radial, Self::Angular, Self::Azimuthal];

    /// Resolve a direction from a filename token, header value or
    /// coordinate symbol. Case-insensitive; a leading backslash is ignored
    /// so `\theta` and `theta` are equivalent.
    pub fn from_alias(alias: &str) -> Option<Self> {
        let alias = alias.trim();
        let alias = alias.strip_prefix('\\').unwrap_or(alias);
        match alias.to_ascii_lowercase().as_str() {
            "radial" | "r" | "rad" => Some(Self::Radial),
            "angular" | "theta" | "th" | "polar" | "θ" => Some(Self::Angular),
            "azimuthal" | "phi" | "ph" | "azimuth" | "varphi" | "φ" => Some(Self::Azimuthal),
            _ => None,
        }
    }

    /// Lowercase name used in diagnostics and section labels.
    pub fn name(self) -> &'static str {
        match self {
            Self::Radial => "radial",
            Self::Angular => "angular",
            Self::Azimuthal => "azimuthal",
        }
    }

    /// Grid index letter used when rendering offset references.
    pub fn index_symbol(self) -> char {
        match self {
            Self::Radial => 'i',
            Self::Angular => 'j',
            Self::Azimuthal => 'k',
        }
    }

    /// LaTeX coordinate symbol (`r`, `\theta`, `\phi`).
    pub fn coordinate(self) -> &'static str {
        match self {
            Self::Radial => "r",
            Self::Angular => "\\theta",
            Self::Azimuthal => "\\phi",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve() {
        assert_eq!(Direction::from_alias("R"), Some(Direction::Radial));
        assert_eq!(Direction::from_alias("\\theta"), Some(Direction::Angular));
        assert_eq!(Direction::from_alias("θ"), Some(Direction::Angular));
        assert_eq!(Direction::from_alias("azimuth"), Some(Direction::Azimuthal));
        assert_eq!(Direction::from_alias("\\varphi"), Some(Direction::Azimuthal));
        assert_eq!(Direction::from_alias("x"), None);
        assert_eq!(Direction::from_alias(""), None);
    }

    #[test]
    fn names_round_trip() {
        for dir in Direction::ALL {
            assert_eq!(Direction::from_alias(dir.name()), Some(dir));
            assert_eq!(Direction::from_alias(dir.coordinate()), Some(dir));
        }
    }
}
