use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Length of the hex digest the gallery generator writes into `hash`.
pub const CONTENT_HASH_LEN: usize = 32;

/// Manual position assumed for photos that were never given an explicit order.
pub const DEFAULT_GALLERY_ORDER: i64 = 9999;

const PROCESSED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThumbnailSize {
    Small,
    Medium,
    Large,
}

impl ThumbnailSize {
    pub const ALL: [ThumbnailSize; 3] = [
        ThumbnailSize::Small,
        ThumbnailSize::Medium,
        ThumbnailSize::Large,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThumbnailSize::Small => "small",
            ThumbnailSize::Medium => "medium",
            ThumbnailSize::Large => "large",
        }
    }
}

impl FromStr for ThumbnailSize {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "small" => Ok(ThumbnailSize::Small),
            "medium" => Ok(ThumbnailSize::Medium),
            "large" => Ok(ThumbnailSize::Large),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ThumbnailSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pixel dimensions, serialized as a `[width, height]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[i64; 2]", into = "[u32; 2]")]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_positive(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn longest_side(&self) -> u32 {
        self.width.max(self.height)
    }

    /// True when `self` is a rescale of `original` off by at most one pixel
    /// on the side that was derived from the other.
    pub fn keeps_aspect_of(&self, original: &Dimensions) -> bool {
        let cross_a = u64::from(self.width) * u64::from(original.height);
        let cross_b = u64::from(self.height) * u64::from(original.width);
        cross_a.abs_diff(cross_b) <= u64::from(original.longest_side())
    }
}

impl TryFrom<[i64; 2]> for Dimensions {
    type Error = String;

    fn try_from([width, height]: [i64; 2]) -> Result<Self, Self::Error> {
        let width = u32::try_from(width)
            .ok()
            .filter(|w| *w > 0)
            .ok_or_else(|| format!("width {} is not a positive pixel count", width))?;
        let height = u32::try_from(height)
            .ok()
            .filter(|h| *h > 0)
            .ok_or_else(|| format!("height {} is not a positive pixel count", height))?;
        Ok(Self { width, height })
    }
}

impl From<Dimensions> for [u32; 2] {
    fn from(dimensions: Dimensions) -> Self {
        [dimensions.width, dimensions.height]
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThumbnailSizes {
    pub small: Dimensions,
    pub medium: Dimensions,
    pub large: Dimensions,
}

impl ThumbnailSizes {
    pub fn get(&self, size: ThumbnailSize) -> Dimensions {
        match size {
            ThumbnailSize::Small => self.small,
            ThumbnailSize::Medium => self.medium,
            ThumbnailSize::Large => self.large,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ThumbnailSize, Dimensions)> + '_ {
        ThumbnailSize::ALL
            .into_iter()
            .map(move |size| (size, self.get(size)))
    }
}

/// EXIF block as written by the generator. Contents are carried as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExifData {
    #[serde(default)]
    pub camera: Map<String, Value>,
    #[serde(default)]
    pub settings: Map<String, Value>,
    #[serde(default)]
    pub gps: Map<String, Value>,
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExifData {
    pub fn taken_at(&self) -> Option<&str> {
        self.datetime.as_deref().filter(|dt| !dt.is_empty())
    }
}

/// Time the generator produced a record, kept at microsecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessedAt(pub NaiveDateTime);

impl ProcessedAt {
    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }
}

impl FromStr for ProcessedAt {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<NaiveDateTime>().map(ProcessedAt)
    }
}

impl fmt::Display for ProcessedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(PROCESSED_FORMAT))
    }
}

impl Serialize for ProcessedAt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProcessedAt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(|e| {
            serde::de::Error::custom(format!("invalid processed timestamp `{}`: {}", raw, e))
        })
    }
}

/// What is wrong with a single catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordDefect {
    #[error("{0}")]
    Decode(String),
    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),
    #[error("key does not match filename `{filename}`")]
    KeyMismatch { filename: String },
    #[error("key appears more than once")]
    DuplicateKey,
    #[error("{field} {dimensions} has a non-positive dimension")]
    NonPositiveDimension {
        field: String,
        dimensions: Dimensions,
    },
    #[error("{size} thumbnail {thumbnail} is larger than the original {original}")]
    ThumbnailExceedsOriginal {
        size: ThumbnailSize,
        thumbnail: Dimensions,
        original: Dimensions,
    },
    #[error("{size} thumbnail {thumbnail} does not keep the aspect ratio of {original}")]
    AspectRatioMismatch {
        size: ThumbnailSize,
        thumbnail: Dimensions,
        original: Dimensions,
    },
    #[error("hash `{0}` is not a {len}-digit hex digest", len = CONTENT_HASH_LEN)]
    InvalidHash(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub filename: String,
    pub title: String,
    /// Outer `None` when the key is absent; `Some(None)` for an explicit `null`.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    pub original_size: Dimensions,
    pub thumbnail_sizes: ThumbnailSizes,
    pub exif: ExifData,
    pub hash: String,
    pub processed: ProcessedAt,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    /// Generator fields this crate does not interpret, e.g. `ai_analysis`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl PhotoRecord {
    pub fn gallery_order(&self) -> i64 {
        self.order.unwrap_or(DEFAULT_GALLERY_ORDER)
    }

    /// File name the generator uses for this photo's thumbnail, `{stem}_{size}.jpg`.
    pub fn thumbnail_file_name(&self, size: ThumbnailSize) -> String {
        let stem = match self.filename.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => self.filename.as_str(),
        };
        format!("{}_{}.jpg", stem, size)
    }

    pub fn validate(&self) -> Result<(), RecordDefect> {
        if self.filename.is_empty() {
            return Err(RecordDefect::EmptyField("filename"));
        }
        if self.title.trim().is_empty() {
            return Err(RecordDefect::EmptyField("title"));
        }
        if self.category.trim().is_empty() {
            return Err(RecordDefect::EmptyField("category"));
        }

        let original = self.original_size;
        if !original.is_positive() {
            return Err(RecordDefect::NonPositiveDimension {
                field: "original_size".to_string(),
                dimensions: original,
            });
        }

        for (size, thumbnail) in self.thumbnail_sizes.iter() {
            if !thumbnail.is_positive() {
                return Err(RecordDefect::NonPositiveDimension {
                    field: format!("thumbnail_sizes.{}", size),
                    dimensions: thumbnail,
                });
            }
            if thumbnail.longest_side() > original.longest_side() {
                return Err(RecordDefect::ThumbnailExceedsOriginal {
                    size,
                    thumbnail,
                    original,
                });
            }
            if !thumbnail.keeps_aspect_of(&original) {
                return Err(RecordDefect::AspectRatioMismatch {
                    size,
                    thumbnail,
                    original,
                });
            }
        }

        if self.hash.len() != CONTENT_HASH_LEN
            || !self.hash.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(RecordDefect::InvalidHash(self.hash.clone()));
        }

        Ok(())
    }
}
