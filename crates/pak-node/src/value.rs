//! Typed payload values carried by tree nodes.
//!
//! Payloads form a closed sum type so the comparison engine can match
//! exhaustively; there is no runtime-cast fallthrough. Composite payloads
//! (sub-trees, archive references) carry no data of their own -- their
//! substance is the node's children.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Declared type tag of an archive.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArchiveKind {
    /// The distinguished aggregate type: its direct children are whole
    /// sub-archives of varying declared types that must be regrouped
    /// before comparison.
    Base,
    /// Any other declared type, identified by its tag.
    Named(String),
}

impl ArchiveKind {
    /// Construct a named kind from a type tag.
    pub fn named(tag: impl Into<String>) -> Self {
        Self::Named(tag.into())
    }

    /// Returns `true` for the distinguished base aggregate type.
    pub fn is_base(&self) -> bool {
        matches!(self, Self::Base)
    }

    /// The tag string used when naming synthetic group nodes.
    pub fn tag(&self) -> &str {
        match self {
            Self::Base => "Base",
            Self::Named(tag) => tag,
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Reference to a nested archive, with its declared metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveRef {
    /// Declared type of the referenced archive.
    pub kind: ArchiveKind,
    /// `true` if the nested archive is a sub-directory continuation of its
    /// parent rather than a distinct logical unit.
    pub sub_directory: bool,
}

impl ArchiveRef {
    pub fn new(kind: ArchiveKind) -> Self {
        Self {
            kind,
            sub_directory: false,
        }
    }

    pub fn sub_directory(kind: ArchiveKind) -> Self {
        Self {
            kind,
            sub_directory: true,
        }
    }
}

/// Sound payload: compared by duration and raw length, never decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SoundValue {
    /// Playback duration in milliseconds.
    pub duration_ms: u32,
    /// Raw encoded byte length.
    pub data_len: u64,
}

/// Image payload.
///
/// `pixels` is populated only when the image has been decoded; size-only
/// comparison never touches it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageValue {
    pub width: u32,
    pub height: u32,
    /// Raw encoded byte length.
    pub data_len: u64,
    /// Decoded pixel buffer, if available.
    pub pixels: Option<Arc<[u8]>>,
}

impl ImageValue {
    pub fn sized(width: u32, height: u32, data_len: u64) -> Self {
        Self {
            width,
            height,
            data_len,
            pixels: None,
        }
    }
}

/// The payload of a tree node.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// No payload.
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    /// A 2D point.
    Vector { x: i32, y: i32 },
    /// An alias to another node, stored as a path string relative to the
    /// link node's parent.
    Link(String),
    Sound(SoundValue),
    Image(ImageValue),
    /// Composite marker: the node's substance is its children.
    SubTree,
    /// Reference to a nested archive.
    Archive(ArchiveRef),
}

/// Coarse classification of a payload, used to decide whether two values
/// are even of comparable kind.
///
/// All scalar forms share one class: numeric normalization may equate an
/// `Int` with a `Float` or a string-encoded number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueClass {
    Scalar,
    Vector,
    Link,
    Sound,
    Image,
    SubTree,
    Archive,
}

impl Value {
    /// The coarse class of this payload.
    pub fn class(&self) -> ValueClass {
        match self {
            Self::Null | Self::Int(_) | Self::Float(_) | Self::Text(_) => ValueClass::Scalar,
            Self::Vector { .. } => ValueClass::Vector,
            Self::Link(_) => ValueClass::Link,
            Self::Sound(_) => ValueClass::Sound,
            Self::Image(_) => ValueClass::Image,
            Self::SubTree => ValueClass::SubTree,
            Self::Archive(_) => ValueClass::Archive,
        }
    }

    /// Returns the archive reference if this payload is one.
    pub fn as_archive(&self) -> Option<&ArchiveRef> {
        match self {
            Self::Archive(r) => Some(r),
            _ => None,
        }
    }

    /// The numeric reading of a scalar payload, if it has one.
    ///
    /// Text payloads parse through; non-scalar payloads have none.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(x) => Some(*x),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "(null)"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
            Self::Vector { x, y } => write!(f, "({x}, {y})"),
            Self::Link(target) => write!(f, "-> {target}"),
            Self::Sound(s) => write!(f, "sound {}ms, {} bytes", s.duration_ms, s.data_len),
            Self::Image(i) => write!(f, "image {}x{}, {} bytes", i.width, i.height, i.data_len),
            Self::SubTree => write!(f, "(subtree)"),
            Self::Archive(r) => write!(f, "archive {}", r.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_forms_share_a_class() {
        assert_eq!(Value::Null.class(), ValueClass::Scalar);
        assert_eq!(Value::Int(3).class(), ValueClass::Scalar);
        assert_eq!(Value::Float(3.5).class(), ValueClass::Scalar);
        assert_eq!(Value::Text("x".into()).class(), ValueClass::Scalar);
    }

    #[test]
    fn numeric_reading_parses_text() {
        assert_eq!(Value::Int(10).as_number(), Some(10.0));
        assert_eq!(Value::Text(" 10 ".into()).as_number(), Some(10.0));
        assert_eq!(Value::Text("ten".into()).as_number(), None);
        assert_eq!(Value::Vector { x: 1, y: 2 }.as_number(), None);
    }

    #[test]
    fn base_kind_is_distinguished() {
        assert!(ArchiveKind::Base.is_base());
        assert!(!ArchiveKind::named("String").is_base());
        assert_eq!(ArchiveKind::named("String").tag(), "String");
        assert_eq!(ArchiveKind::Base.to_string(), "Base");
    }

    #[test]
    fn archive_kind_round_trips_through_serde() {
        let kind = ArchiveKind::named("Item");
        let json = serde_json::to_string(&kind).unwrap();
        let back: ArchiveKind = serde_json::from_str(&json).unwrap();
        assert_eq!(kind, back);
    }
}
