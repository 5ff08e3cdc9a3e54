//! Content tree: modules and their attached files.
//!
//! A toolkit is a forest of [`Module`]s. Depth in the tree decides what a node
//! is presented as (module, step, sub-step, tool); the node type itself is the
//! same at every level.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Identifier of a module, unique across the whole tree.
pub type ModuleId = i64;

/// Metadata key flagging a tool as part of the critical path.
pub const CRITICAL_PATH_KEY: &str = "critical_path";

/// A node in the content tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Module {
    /// Tree-wide identifier. Nodes without one never expand and are left out
    /// of depth maps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<ModuleId>,

    /// Ordered children. Empty for leaves.
    #[serde(alias = "directories", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Arc<Module>>,

    /// Files attached to this node. The first one titles the node.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<FileDescriptor>,

    /// Free-form metadata (e.g. `critical_path`).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,

    /// Relative path of a markdown document describing this node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Module {
    /// Creates an empty module with the given identifier.
    #[must_use]
    pub fn new(identifier: ModuleId) -> Self {
        Self {
            identifier: Some(identifier),
            ..Default::default()
        }
    }

    /// Replaces the children of this module.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Module>) -> Self {
        self.children = children.into_iter().map(Arc::new).collect();
        self
    }

    /// Appends an attachment.
    #[must_use]
    pub fn with_attachment(mut self, attachment: FileDescriptor) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Sets a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Sets the markdown content path.
    #[must_use]
    pub fn with_content(mut self, path: impl Into<String>) -> Self {
        self.content = Some(path.into());
        self
    }

    /// Whether this module has any children.
    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// The first attachment, if any.
    pub fn first_attachment(&self) -> Option<&FileDescriptor> {
        self.attachments.first()
    }

    /// Display title: the first attachment's title, or empty.
    pub fn title(&self) -> &str {
        self.first_attachment().map_or("", FileDescriptor::title)
    }

    /// Icon classifier for this node.
    pub fn icon(&self) -> FileKind {
        match self.first_attachment() {
            Some(file) => file.kind(),
            None if self.has_children() => FileKind::Folder,
            None => FileKind::Unknown,
        }
    }

    /// The raw `critical_path` flag, when the content source set one.
    pub fn critical_flag(&self) -> Option<bool> {
        self.metadata.get(CRITICAL_PATH_KEY).and_then(Value::as_bool)
    }

    /// Whether this node is flagged critical.
    pub fn is_critical(&self) -> bool {
        self.critical_flag() == Some(true)
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(|c| c.subtree_len()).sum::<usize>()
    }
}

/// A file attached to a module. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime: Option<String>,
}

impl FileDescriptor {
    /// Creates a descriptor with only a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Sets the resolved URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the size in bytes.
    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the MIME type.
    #[must_use]
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }

    /// Icon classifier derived from the MIME type.
    pub fn kind(&self) -> FileKind {
        self.mime.as_deref().map_or(FileKind::Unknown, FileKind::from_mime)
    }
}

/// Coarse file classification used to pick a display icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Pdf,
    Document,
    Spreadsheet,
    Presentation,
    Image,
    Video,
    Audio,
    Text,
    Folder,
    Unknown,
}

impl FileKind {
    /// Classify a MIME type string. Parameters (`; charset=...`) are ignored.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/pdf" => Self::Pdf,
            "application/msword" | "application/rtf" => Self::Document,
            "application/vnd.ms-excel" | "text/csv" => Self::Spreadsheet,
            "application/vnd.ms-powerpoint" => Self::Presentation,
            "text/markdown" | "text/plain" => Self::Text,
            other if other.contains("wordprocessingml") => Self::Document,
            other if other.contains("spreadsheetml") => Self::Spreadsheet,
            other if other.contains("presentationml") => Self::Presentation,
            other if other.starts_with("image/") => Self::Image,
            other if other.starts_with("video/") => Self::Video,
            other if other.starts_with("audio/") => Self::Audio,
            other if other.starts_with("text/") => Self::Text,
            _ => Self::Unknown,
        }
    }

    /// Short label for text rendering.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Document => "doc",
            Self::Spreadsheet => "sheet",
            Self::Presentation => "slides",
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Text => "text",
            Self::Folder => "folder",
            Self::Unknown => "file",
        }
    }
}

/// Parse a content structure (a JSON array of top-level modules).
pub fn parse_structure(json: &str) -> Result<Vec<Arc<Module>>> {
    Ok(serde_json::from_str(json)?)
}

/// Load a content structure from a file.
pub fn load_structure(path: &Path) -> Result<Vec<Arc<Module>>> {
    let json = std::fs::read_to_string(path)?;
    parse_structure(&json)
}
