//! Filename convention: `stencil_<direction>_<order>_<variant>.tex`.
//!
//! Tokens may appear in any order after the `stencil_` prefix. The
//! first direction alias and the first order-looking token win; every
//! other token is kept as the variant label.

use rk4tex_core::Direction;

/// File name prefix of stencil documents.
pub const STENCIL_PREFIX: &str = "stencil_";
/// File name extension of stencil documents.
pub const STENCIL_EXTENSION: &str = ".tex";

/// Metadata encoded in a document's file name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameMetadata {
    /// Direction named by the file, if any.
    pub direction: Option<Direction>,
    /// Order token as `(raw token, value)`, not yet validated as even.
    pub order: Option<(String, u32)>,
    /// Remaining tokens joined with `_`.
    pub variant: Option<String>,
}

/// Whether a file name follows the `stencil_*.tex` discovery pattern.
pub fn is_stencil_file_name(name: &str) -> bool {
    name.starts_with(STENCIL_PREFIX)
        && name.ends_with(STENCIL_EXTENSION)
        && name.len() > STENCIL_PREFIX.len() + STENCIL_EXTENSION.len()
}

/// Split a document identifier into its naming-convention metadata.
///
/// Directory components and the `stencil_` / `.tex` affixes are ignored,
/// so both `stencil_radial_4.tex` and `in/stencil_radial_4.tex` work.
pub fn parse_file_name(document: &str) -> NameMetadata {
    let base = document.rsplit(['/', '\\']).next().unwrap_or(document);
    let stem = base.strip_suffix(STENCIL_EXTENSION).unwrap_or(base);
    let stem = stem.strip_prefix(STENCIL_PREFIX).unwrap_or(stem);

    let mut meta = NameMetadata::default();
    let mut variant: Vec<&str> = Vec::new();
    for token in stem.split('_').filter(|t| !t.is_empty()) {
        if meta.direction.is_none() {
            if let Some(direction) = Direction::from_alias(token) {
                meta.direction = Some(direction);
                continue;
            }
        }
        if meta.order.is_none() {
            if let Some(value) = order_token(token) {
                meta.order = Some((token.to_string(), value));
                continue;
            }
        }
        variant.push(token);
    }
    if !variant.is_empty() {
        meta.variant = Some(variant.join("_"));
    }
    meta
}

/// Recognize `4`, `o4`, `order4`, `4th`, `2nd`.
fn order_token(token: &str) -> Option<u32> {
    let lower = token.to_ascii_lowercase();
    let digits = lower
        .strip_prefix("order")
        .or_else(|| lower.strip_prefix('o'))
        .unwrap_or(&lower);
    let digits = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| digits.strip_suffix(suffix))
        .unwrap_or(digits);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_name() {
        let meta = parse_file_name("stencil_radial_4_central.tex");
        assert_eq!(meta.direction, Some(Direction::Radial));
        assert_eq!(meta.order, Some(("4".to_string(), 4)));
        assert_eq!(meta.variant.as_deref(), Some("central"));
    }

    #[test]
    fn aliases_and_order_spellings() {
        let meta = parse_file_name("dir/stencil_o6_theta.tex");
        assert_eq!(meta.direction, Some(Direction::Angular));
        assert_eq!(meta.order.map(|(_, v)| v), Some(6));
        assert_eq!(meta.variant, None);

        let meta = parse_file_name("stencil_phi_2nd_one_sided.tex");
        assert_eq!(meta.direction, Some(Direction::Azimuthal));
        assert_eq!(meta.order.map(|(_, v)| v), Some(2));
        assert_eq!(meta.variant.as_deref(), Some("one_sided"));
    }

    #[test]
    fn missing_metadata_stays_empty() {
        let meta = parse_file_name("stencil_dfdx.tex");
        assert_eq!(meta.direction, None);
        assert_eq!(meta.order, None);
        assert_eq!(meta.variant.as_deref(), Some("dfdx"));
    }

    #[test]
    fn odd_order_is_reported_raw() {
        let meta = parse_file_name("stencil_r_3.tex");
        assert_eq!(meta.order, Some(("3".to_string(), 3)));
    }

    #[test]
    fn discovery_pattern() {
        assert!(is_stencil_file_name("stencil_r_2.tex"));
        assert!(!is_stencil_file_name("stencil_.tex"));
        assert!(!is_stencil_file_name("notes.tex"));
        assert!(!is_stencil_file_name("stencil_r_2.tex.bak"));
    }
}
