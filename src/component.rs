//! Structured components assembled field-by-field from the stream
//!
//! A component kind is a closed set: the required-field schema and the typed
//! view are both exhaustive matches over [`ComponentKind`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Known component kinds carried by `component_start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    ContactBadge,
    CalendarEvent,
}

impl ComponentKind {
    /// Field names that must all be received before the component is complete
    #[must_use]
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            ComponentKind::ContactBadge => &["name", "email", "company", "profilePicture"],
            ComponentKind::CalendarEvent => &["title", "date", "time", "status"],
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKind::ContactBadge => "contact_badge",
            ComponentKind::CalendarEvent => "calendar_event",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completeness oracle
///
/// True iff every required field of `kind` appears at least once in
/// `fields_received`. An unknown kind is never complete; a kind with no
/// required fields is trivially complete.
#[must_use]
pub fn is_complete<S: AsRef<str>>(kind: Option<ComponentKind>, fields_received: &[S]) -> bool {
    let Some(kind) = kind else {
        return false;
    };
    kind.required_fields()
        .iter()
        .all(|required| fields_received.iter().any(|f| f.as_ref() == *required))
}

/// A component attached to a message, built up one field at a time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentData {
    #[serde(rename = "type")]
    kind: ComponentKind,
    fields: BTreeMap<String, String>,
    fields_received: Vec<String>,
    is_complete: bool,
}

impl ComponentData {
    #[must_use]
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            fields: BTreeMap::new(),
            fields_received: Vec::new(),
            is_complete: is_complete::<String>(Some(kind), &[]),
        }
    }

    /// Returns a copy with `name` set to `value` and completeness recomputed
    #[must_use]
    pub fn with_field(&self, name: &str, value: &str) -> Self {
        let mut fields = self.fields.clone();
        fields.insert(name.to_string(), value.to_string());

        let mut fields_received = self.fields_received.clone();
        fields_received.push(name.to_string());

        let is_complete = is_complete(Some(self.kind), &fields_received);

        Self {
            kind: self.kind,
            fields,
            fields_received,
            is_complete,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    #[must_use]
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn fields_received(&self) -> &[String] {
        &self.fields_received
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    /// Typed view of a complete component
    ///
    /// `None` while fields are still missing; callers render a placeholder.
    #[must_use]
    pub fn view(&self) -> Option<ComponentView> {
        if !self.is_complete {
            return None;
        }
        let get = |name: &str| self.field(name).unwrap_or_default().to_string();

        Some(match self.kind {
            ComponentKind::ContactBadge => ComponentView::ContactBadge(ContactBadge {
                name: get("name"),
                email: get("email"),
                company: get("company"),
                profile_picture: get("profilePicture"),
            }),
            ComponentKind::CalendarEvent => ComponentView::CalendarEvent(CalendarEvent {
                title: get("title"),
                date: get("date"),
                time: get("time"),
                status: CalendarStatus::parse(&get("status")),
            }),
        })
    }
}

/// Kind-specific projection of a complete component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComponentView {
    ContactBadge(ContactBadge),
    CalendarEvent(CalendarEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactBadge {
    pub name: String,
    pub email: String,
    pub company: String,
    pub profile_picture: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub title: String,
    pub date: String,
    pub time: String,
    pub status: CalendarStatus,
}

/// Calendar event status as sent by the producer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CalendarStatus {
    Proposed,
    Confirmed,
    Canceled,
    /// Anything outside the documented set, kept verbatim
    #[serde(untagged)]
    Other(String),
}

impl CalendarStatus {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "PROPOSED" => CalendarStatus::Proposed,
            "CONFIRMED" => CalendarStatus::Confirmed,
            "CANCELED" => CalendarStatus::Canceled,
            other => CalendarStatus::Other(other.to_string()),
        }
    }

    /// Human-readable label
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            CalendarStatus::Proposed => "Proposed",
            CalendarStatus::Confirmed => "Confirmed",
            CalendarStatus::Canceled => "Cancelled",
            CalendarStatus::Other(raw) => raw,
        }
    }
}
