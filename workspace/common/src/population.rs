use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Categorical dimension partitioning the WLA records.
///
/// Variant order is the canonical display order (alphabetical by label) and
/// is what `Ord` uses, so sorting by group yields Rural, Semi-Urban, Urban.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum PopulationGroup {
    #[serde(rename = "rural")]
    Rural,
    #[serde(rename = "s-urban", alias = "semi-urban")]
    SemiUrban,
    #[serde(rename = "urban")]
    Urban,
}

impl PopulationGroup {
    /// All groups in canonical order.
    pub const ALL: [PopulationGroup; 3] = [
        PopulationGroup::Rural,
        PopulationGroup::SemiUrban,
        PopulationGroup::Urban,
    ];

    /// Human-readable label used in legends and reports.
    pub fn label(&self) -> &'static str {
        match self {
            PopulationGroup::Rural => "Rural",
            PopulationGroup::SemiUrban => "Semi-Urban",
            PopulationGroup::Urban => "Urban",
        }
    }

    /// Stable lowercase key, also the serialized form.
    pub fn key(&self) -> &'static str {
        match self {
            PopulationGroup::Rural => "rural",
            PopulationGroup::SemiUrban => "s-urban",
            PopulationGroup::Urban => "urban",
        }
    }

    /// Position in the canonical order.
    pub fn ordinal(&self) -> u32 {
        match self {
            PopulationGroup::Rural => 0,
            PopulationGroup::SemiUrban => 1,
            PopulationGroup::Urban => 2,
        }
    }

    pub fn from_ordinal(ordinal: u32) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }

    /// Normalizes a raw storage label.
    ///
    /// Matching ignores case, surrounding and inner whitespace, and treats `_`
    /// like `-`, so `"S - Urban"`, `"s-urban"` and `"Semi Urban"` all resolve to
    /// [`PopulationGroup::SemiUrban`].
    pub fn from_label(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| if c == '_' { '-' } else { c.to_ascii_lowercase() })
            .collect();

        match normalized.as_str() {
            "rural" => Some(PopulationGroup::Rural),
            "urban" => Some(PopulationGroup::Urban),
            "s-urban" | "surban" | "semi-urban" | "semiurban" => Some(PopulationGroup::SemiUrban),
            _ => None,
        }
    }
}

impl fmt::Display for PopulationGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when a label does not name any population group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPopulationGroup(pub String);

impl fmt::Display for UnknownPopulationGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown population group '{}'", self.0)
    }
}

impl std::error::Error for UnknownPopulationGroup {}

impl FromStr for PopulationGroup {
    type Err = UnknownPopulationGroup;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PopulationGroup::from_label(s).ok_or_else(|| UnknownPopulationGroup(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_variants() {
        assert_eq!(PopulationGroup::from_label("Urban"), Some(PopulationGroup::Urban));
        assert_eq!(PopulationGroup::from_label("  rural "), Some(PopulationGroup::Rural));
        assert_eq!(PopulationGroup::from_label("S - Urban"), Some(PopulationGroup::SemiUrban));
        assert_eq!(PopulationGroup::from_label("s-urban"), Some(PopulationGroup::SemiUrban));
        assert_eq!(PopulationGroup::from_label("Semi Urban"), Some(PopulationGroup::SemiUrban));
        assert_eq!(PopulationGroup::from_label("semi_urban"), Some(PopulationGroup::SemiUrban));
        assert_eq!(PopulationGroup::from_label("Metro"), None);
        assert_eq!(PopulationGroup::from_label(""), None);
    }

    #[test]
    fn test_canonical_order() {
        let mut groups = vec![
            PopulationGroup::Urban,
            PopulationGroup::Rural,
            PopulationGroup::SemiUrban,
        ];
        groups.sort();
        assert_eq!(groups, PopulationGroup::ALL.to_vec());

        for group in PopulationGroup::ALL {
            assert_eq!(PopulationGroup::from_ordinal(group.ordinal()), Some(group));
        }
        assert_eq!(PopulationGroup::from_ordinal(3), None);
    }

    #[test]
    fn test_serde_keys() {
        let json = serde_json::to_string(&PopulationGroup::SemiUrban).unwrap();
        assert_eq!(json, "\"s-urban\"");

        let parsed: PopulationGroup = serde_json::from_str("\"semi-urban\"").unwrap();
        assert_eq!(parsed, PopulationGroup::SemiUrban);
    }

    #[test]
    fn test_from_str_error() {
        let err = "village".parse::<PopulationGroup>().unwrap_err();
        assert_eq!(err.to_string(), "unknown population group 'village'");
    }
}
