//! Per-owner storage statistics split by lifecycle state and file type.

use serde::{Deserialize, Serialize};

/// Coarse content-type bucket used by the statistics report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    /// `image/*`
    Image,
    /// `application/pdf`
    Pdf,
    /// `video/*`
    Video,
    /// `audio/*`
    Audio,
    /// Word documents.
    Doc,
    /// Anything else.
    Other,
}

impl FileCategory {
    /// Every category, in report order.
    pub const ALL: [FileCategory; 6] = [
        Self::Image,
        Self::Pdf,
        Self::Video,
        Self::Audio,
        Self::Doc,
        Self::Other,
    ];

    /// Classify a MIME type.
    pub fn from_content_type(content_type: &str) -> Self {
        let ct = content_type.to_ascii_lowercase();
        if ct.starts_with("image/") {
            Self::Image
        } else if ct == "application/pdf" {
            Self::Pdf
        } else if ct.starts_with("video/") {
            Self::Video
        } else if ct.starts_with("audio/") {
            Self::Audio
        } else if ct == "application/msword"
            || ct == "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        {
            Self::Doc
        } else {
            Self::Other
        }
    }

    /// Lowercase label, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Pdf => "pdf",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Doc => "doc",
            Self::Other => "other",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Image => 0,
            Self::Pdf => 1,
            Self::Video => 2,
            Self::Audio => 3,
            Self::Doc => 4,
            Self::Other => 5,
        }
    }
}

/// Bytes and file count for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryUsage {
    /// Total bytes.
    pub bytes: i64,
    /// Number of files.
    pub files: u64,
}

/// Totals for one lifecycle state (active or trashed).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageBreakdown {
    /// Total bytes across all categories.
    pub bytes: i64,
    /// Total files.
    pub files: u64,
    /// Total folders.
    pub folders: u64,
    /// Usage per category, indexed in [`FileCategory::ALL`] order.
    pub by_category: [CategoryUsage; 6],
}

impl UsageBreakdown {
    /// Count one file of `size` bytes.
    pub fn add_file(&mut self, category: FileCategory, size: i64) {
        self.bytes += size;
        self.files += 1;
        let slot = &mut self.by_category[category.index()];
        slot.bytes += size;
        slot.files += 1;
    }

    /// Usage for one category.
    pub fn category(&self, category: FileCategory) -> CategoryUsage {
        self.by_category[category.index()]
    }
}

/// Storage report for one owner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageStats {
    /// Non-trashed content.
    pub active: UsageBreakdown,
    /// Trashed content awaiting purge.
    pub trash: UsageBreakdown,
}

impl StorageStats {
    /// Bytes across both states.
    pub fn total_bytes(&self) -> i64 {
        self.active.bytes + self.trash.bytes
    }
}
