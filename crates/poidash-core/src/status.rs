use serde::{Deserialize, Deserializer, Serialize};

/// Canonical review status of a POI.
///
/// The store and older dashboard views speak two vocabularies
/// (`pending/approved/rejected` and `pending/valid/invalid`). Both are folded
/// into this enum through [`LEGACY_STATUS_MAP`]; serialization always emits
/// the canonical word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PoiStatus {
    Pending,
    Approved,
    Rejected,
    #[default]
    Unknown,
}

/// Wire value → canonical status. Lookup is case-insensitive on trimmed input;
/// anything not listed maps to [`PoiStatus::Unknown`].
pub const LEGACY_STATUS_MAP: &[(&str, PoiStatus)] = &[
    ("pending", PoiStatus::Pending),
    ("approved", PoiStatus::Approved),
    ("valid", PoiStatus::Approved),
    ("rejected", PoiStatus::Rejected),
    ("invalid", PoiStatus::Rejected),
];

impl PoiStatus {
    #[must_use]
    pub fn from_wire(raw: &str) -> Self {
        let needle = raw.trim();
        LEGACY_STATUS_MAP
            .iter()
            .find(|(wire, _)| wire.eq_ignore_ascii_case(needle))
            .map_or(PoiStatus::Unknown, |(_, status)| *status)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PoiStatus::Pending => "pending",
            PoiStatus::Approved => "approved",
            PoiStatus::Rejected => "rejected",
            PoiStatus::Unknown => "unknown",
        }
    }

    /// Capitalized display form used by the table, popups and exports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PoiStatus::Pending => "Pending",
            PoiStatus::Approved => "Approved",
            PoiStatus::Rejected => "Rejected",
            PoiStatus::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for PoiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PoiStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().map_or(PoiStatus::Unknown, PoiStatus::from_wire))
    }
}
