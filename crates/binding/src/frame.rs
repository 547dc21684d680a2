//! Decoded telemetry frames.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Flat field-name-to-value object within one frame section
pub type SectionMapping = serde_json::Map<String, Value>;

/// Field of the `am` section carrying the marker id
pub const MARKER_ID_FIELD: &str = "AmId";

/// One decoded inbound message.
///
/// Any subset of sections may be present; unknown top-level keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Navigation measurements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav: Option<SectionMapping>,
    /// Device status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SectionMapping>,
    /// Positioning-marker measurement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub am: Option<SectionMapping>,
    /// Link statistics between server and device
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<SectionMapping>,
}

/// Recognised frame sections, in binding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// `nav`
    Nav,
    /// `status`
    Status,
    /// `am`
    Marker,
    /// `connection`
    Connection,
}

impl Section {
    /// Every section, in the order frames are bound
    pub const ALL: [Section; 4] = [
        Section::Nav,
        Section::Status,
        Section::Marker,
        Section::Connection,
    ];

    /// Wire key of this section
    pub fn key(self) -> &'static str {
        match self {
            Section::Nav => "nav",
            Section::Status => "status",
            Section::Marker => "am",
            Section::Connection => "connection",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Frame {
    /// Decode a text frame.
    ///
    /// The frame must be a JSON object and every present section an object.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;
        if !value.is_object() {
            return Err(serde::de::Error::custom("frame must be a JSON object"));
        }
        serde_json::from_value(value)
    }

    /// Borrow one section
    pub fn section(&self, section: Section) -> Option<&SectionMapping> {
        match section {
            Section::Nav => self.nav.as_ref(),
            Section::Status => self.status.as_ref(),
            Section::Marker => self.am.as_ref(),
            Section::Connection => self.connection.as_ref(),
        }
    }

    /// Borrow one section mutably
    pub fn section_mut(&mut self, section: Section) -> Option<&mut SectionMapping> {
        match section {
            Section::Nav => self.nav.as_mut(),
            Section::Status => self.status.as_mut(),
            Section::Marker => self.am.as_mut(),
            Section::Connection => self.connection.as_mut(),
        }
    }

    /// Sections present in this frame, in binding order
    pub fn present_sections(&self) -> impl Iterator<Item = Section> + '_ {
        Section::ALL
            .into_iter()
            .filter(|&section| self.section(section).is_some())
    }
}

/// Operator-set filter on positioning-marker ids.
///
/// Clones share the same value, so the embedding caller can keep one handle
/// and change the filter while a dispatcher holds another. Negative values
/// mean no filter.
#[derive(Debug, Clone)]
pub struct MarkerFilter {
    value: Arc<AtomicI64>,
}

impl MarkerFilter {
    /// Create a filter with an initial value
    pub fn new(value: i64) -> Self {
        Self {
            value: Arc::new(AtomicI64::new(value)),
        }
    }

    /// A filter that admits every marker
    pub fn disabled() -> Self {
        Self::new(-1)
    }

    /// Only bind markers with this id (negative clears the filter)
    pub fn set(&self, value: i64) {
        self.value.store(value, Ordering::Relaxed);
    }

    /// Admit every marker
    pub fn clear(&self) {
        self.set(-1);
    }

    /// Active marker id, if any
    pub fn get(&self) -> Option<i64> {
        let value = self.value.load(Ordering::Relaxed);
        (value >= 0).then_some(value)
    }

    /// Whether an `am` section passes the filter
    pub fn admits(&self, marker: &SectionMapping) -> bool {
        match self.get() {
            None => true,
            Some(wanted) => marker
                .get(MARKER_ID_FIELD)
                .and_then(marker_id)
                .is_some_and(|id| id == wanted),
        }
    }
}

impl Default for MarkerFilter {
    fn default() -> Self {
        Self::disabled()
    }
}

fn marker_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
