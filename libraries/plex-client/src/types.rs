//! Types for Plex collection requests and responses.
//!
//! The Plex API is loose about scalar encodings: the same field can arrive as
//! a boolean, a number or a string depending on the endpoint. Every such field
//! is decoded through [`WireValue`] at the boundary and normalized into one
//! domain type here, so nothing past this module sees the polymorphism.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Tolerant Wire Scalars
// =============================================================================

/// A scalar as it may appear on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Objects, arrays and anything else; always falsy
    Other(de::IgnoredAny),
}

impl WireValue {
    /// Truthiness used for `smart` and the visibility flags: booleans pass
    /// through, numbers are true when positive, strings only for `"1"` and
    /// `"true"`, anything else is false.
    pub fn truthy(&self) -> bool {
        match self {
            WireValue::Bool(b) => *b,
            WireValue::Int(n) => *n > 0,
            WireValue::Float(f) => *f > 0.0,
            WireValue::Text(s) => s == "1" || s == "true",
            WireValue::Other(_) => false,
        }
    }

    /// Integer reading, accepting numeric strings.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            WireValue::Int(n) => Some(*n),
            WireValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            WireValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// String reading, accepting numbers.
    pub fn as_text(&self) -> Option<String> {
        match self {
            WireValue::Text(s) => Some(s.clone()),
            WireValue::Int(n) => Some(n.to_string()),
            WireValue::Float(f) if f.fract() == 0.0 => Some((*f as i64).to_string()),
            _ => None,
        }
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<WireValue>::deserialize(deserializer)?;
    Ok(value.is_some_and(|v| v.truthy()))
}

fn deserialize_rating_key<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = WireValue::deserialize(deserializer)?;
    match value.as_text() {
        Some(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(de::Error::custom("ratingKey must be a non-empty string or integer")),
    }
}

fn deserialize_opt_u32<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<WireValue>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| v.as_i64())
        .and_then(|n| u32::try_from(n).ok()))
}

fn deserialize_opt_i64<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<WireValue>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_i64()))
}

fn deserialize_mode<'de, D>(deserializer: D) -> std::result::Result<Option<CollectionMode>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<WireValue>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_i64()).and_then(CollectionMode::from_code))
}

fn deserialize_sort<'de, D>(deserializer: D) -> std::result::Result<Option<CollectionSort>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<WireValue>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_i64()).and_then(CollectionSort::from_code))
}

// =============================================================================
// Presentation Settings
// =============================================================================

/// How a collection is shown in its library section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum CollectionMode {
    #[default]
    Default,
    Hide,
    HideItems,
    ShowItems,
}

/// Mode table: variant, wire code, API label.
const MODE_TABLE: [(CollectionMode, i8, &str); 4] = [
    (CollectionMode::Default, -1, "default"),
    (CollectionMode::Hide, 0, "hide"),
    (CollectionMode::HideItems, 1, "hideItems"),
    (CollectionMode::ShowItems, 2, "showItems"),
];

impl CollectionMode {
    pub const ALL: [CollectionMode; 4] = [
        CollectionMode::Default,
        CollectionMode::Hide,
        CollectionMode::HideItems,
        CollectionMode::ShowItems,
    ];

    fn row(self) -> (CollectionMode, i8, &'static str) {
        MODE_TABLE
            .into_iter()
            .find(|(mode, _, _)| *mode == self)
            .unwrap_or(MODE_TABLE[0])
    }

    /// Wire code sent to `/prefs?collectionMode=`.
    pub fn code(self) -> i8 {
        self.row().1
    }

    /// Label used in the client API.
    pub fn label(self) -> &'static str {
        self.row().2
    }

    pub fn from_code(code: i64) -> Option<Self> {
        MODE_TABLE
            .into_iter()
            .find(|(_, c, _)| i64::from(*c) == code)
            .map(|(mode, _, _)| mode)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        MODE_TABLE
            .into_iter()
            .find(|(_, _, l)| *l == label)
            .map(|(mode, _, _)| mode)
    }
}

/// Unknown labels fall back to [`CollectionMode::Default`].
impl From<&str> for CollectionMode {
    fn from(label: &str) -> Self {
        Self::from_label(label).unwrap_or_default()
    }
}

impl fmt::Display for CollectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordering applied to a collection's children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum CollectionSort {
    #[default]
    Release,
    Alpha,
    Custom,
}

/// Sort table: variant, wire code, API label.
const SORT_TABLE: [(CollectionSort, i8, &str); 3] = [
    (CollectionSort::Release, 0, "release"),
    (CollectionSort::Alpha, 1, "alpha"),
    (CollectionSort::Custom, 2, "custom"),
];

impl CollectionSort {
    pub const ALL: [CollectionSort; 3] = [
        CollectionSort::Release,
        CollectionSort::Alpha,
        CollectionSort::Custom,
    ];

    fn row(self) -> (CollectionSort, i8, &'static str) {
        SORT_TABLE
            .into_iter()
            .find(|(sort, _, _)| *sort == self)
            .unwrap_or(SORT_TABLE[0])
    }

    /// Wire code sent to `/prefs?collectionSort=`.
    pub fn code(self) -> i8 {
        self.row().1
    }

    /// Label used in the client API.
    pub fn label(self) -> &'static str {
        self.row().2
    }

    pub fn from_code(code: i64) -> Option<Self> {
        SORT_TABLE
            .into_iter()
            .find(|(_, c, _)| i64::from(*c) == code)
            .map(|(sort, _, _)| sort)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        SORT_TABLE
            .into_iter()
            .find(|(_, _, l)| *l == label)
            .map(|(sort, _, _)| sort)
    }
}

/// Unknown labels fall back to [`CollectionSort::Release`].
impl From<&str> for CollectionSort {
    fn from(label: &str) -> Self {
        Self::from_label(label).unwrap_or_default()
    }
}

impl fmt::Display for CollectionSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Metadata type code used when creating collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MediaType {
    #[default]
    Movie,
    Show,
    Season,
    Episode,
    Artist,
    Album,
    Track,
    Photo,
    Other(u32),
}

impl MediaType {
    pub fn code(self) -> u32 {
        match self {
            MediaType::Movie => 1,
            MediaType::Show => 2,
            MediaType::Season => 3,
            MediaType::Episode => 4,
            MediaType::Artist => 8,
            MediaType::Album => 9,
            MediaType::Track => 10,
            MediaType::Photo => 13,
            MediaType::Other(code) => code,
        }
    }

    /// Map a metadata `type`/`subtype` string such as `"movie"`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "movie" => Some(MediaType::Movie),
            "show" => Some(MediaType::Show),
            "season" => Some(MediaType::Season),
            "episode" => Some(MediaType::Episode),
            "artist" => Some(MediaType::Artist),
            "album" => Some(MediaType::Album),
            "track" => Some(MediaType::Track),
            "photo" => Some(MediaType::Photo),
            _ => None,
        }
    }
}

// =============================================================================
// Collection Types
// =============================================================================

/// A collection as returned by the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    #[serde(deserialize_with = "deserialize_rating_key")]
    pub rating_key: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub title_sort: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub smart: bool,
    #[serde(default, deserialize_with = "deserialize_opt_u32")]
    pub child_count: Option<u32>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub art: Option<String>,
    #[serde(default)]
    pub content_rating: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_i64")]
    pub added_at: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_opt_i64")]
    pub updated_at: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_mode")]
    pub collection_mode: Option<CollectionMode>,
    #[serde(default, deserialize_with = "deserialize_sort")]
    pub collection_sort: Option<CollectionSort>,
    #[serde(
        default,
        rename = "librarySectionID",
        deserialize_with = "deserialize_opt_u32"
    )]
    pub section_id: Option<u32>,
    #[serde(default, rename = "librarySectionTitle")]
    pub section_title: Option<String>,
    #[serde(default, rename = "librarySectionUUID")]
    pub section_uuid: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    /// Smart filter URI, when the server exposes it.
    #[serde(default)]
    pub content: Option<String>,
}

impl Collection {
    /// Whether membership is computed by the server from a filter.
    pub fn is_smart(&self) -> bool {
        self.smart
    }

    /// Media type of the collection's members, if the server reported one.
    pub fn media_type(&self) -> Option<MediaType> {
        self.subtype.as_deref().and_then(MediaType::from_name)
    }
}

/// A media entry listed as a collection member.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    #[serde(deserialize_with = "deserialize_rating_key")]
    pub rating_key: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_u32")]
    pub year: Option<u32>,
}

/// Per-collection exposure on hubs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionVisibility {
    /// Promoted to the library's recommended listing
    pub library: bool,
    /// Promoted to the owner's home
    pub home: bool,
    /// Promoted to shared users' home
    pub shared: bool,
}

/// Identity reported by `GET /identity`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerIdentity {
    pub machine_identifier: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub claimed: bool,
}

// =============================================================================
// Response Envelopes
// =============================================================================

/// Listing/detail container shared by most endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaContainer<T> {
    #[serde(default, deserialize_with = "deserialize_opt_u32")]
    pub size: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_opt_u32")]
    pub total_size: Option<u32>,
    #[serde(default = "Vec::new", rename = "Metadata")]
    pub metadata: Vec<T>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub allow_sync: bool,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Top-level `{"MediaContainer": ...}` wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaContainerResponse<T> {
    #[serde(rename = "MediaContainer")]
    pub media_container: T,
}

/// One row of the hub management listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ManageEntry {
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub promoted_to_recommended: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub promoted_to_own_home: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub promoted_to_shared_home: bool,
}

/// Hub management container; uses `Directory` instead of `Metadata`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ManageContainer {
    #[serde(default = "Vec::new", rename = "Directory")]
    pub directory: Vec<ManageEntry>,
}

impl From<&ManageEntry> for CollectionVisibility {
    fn from(entry: &ManageEntry) -> Self {
        Self {
            library: entry.promoted_to_recommended,
            home: entry.promoted_to_own_home,
            shared: entry.promoted_to_shared_home,
        }
    }
}
