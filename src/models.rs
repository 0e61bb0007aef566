use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyStatus {
    Pending,
    Replied,
}

impl PartyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PartyStatus::Pending => "pending",
            PartyStatus::Replied => "replied",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "replied" => PartyStatus::Replied,
            _ => PartyStatus::Pending,
        }
    }
}

/// An invitation covering one or more guests. `has_responded` moves from false to
/// true exactly once; only an administrative edit (out of scope here) resets it.
#[derive(Debug, Clone)]
pub struct Party {
    pub id: String,
    pub party_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Normalized name tokens the party can be found under, e.g. "sarah fortune".
    pub search_tags: Vec<String>,
    pub status: PartyStatus,
    pub has_responded: bool,
    pub admin_notes: Option<String>,
}

/// Owned by exactly one party for its lifetime. The name is mutable so a plus-one
/// can be filled in at RSVP time; `is_plus_one` itself is set at creation and
/// never changes.
#[derive(Debug, Clone)]
pub struct Guest {
    pub id: String,
    pub party_id: String,
    pub name: String,
    pub is_attending: bool,
    pub is_plus_one: bool,
}

/// Party fields written by the submission guard, applied only while
/// `has_responded` is still false.
#[derive(Debug, Clone, Default)]
pub struct ContactUpdate {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuestUpdate {
    pub id: String,
    pub is_attending: bool,
    pub name: String,
}

/// The `/rsvp/submit` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    pub party_id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub guests: Vec<GuestUpdate>,
}

/// One line of the audit trail, appended best-effort after a submission lands.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub party_id: String,
    pub action: &'static str,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub guests_updated: usize,
    pub recorded_at: DateTime<Utc>,
}

/// What `/rsvp/search` returns: enough for the form to render the party and its
/// guests, nothing from the contact/admin fields.
#[derive(Debug, Serialize)]
pub struct PartyView {
    pub id: String,
    pub party_name: String,
    pub status: PartyStatus,
    pub has_responded: bool,
    pub guests: Vec<GuestView>,
}

#[derive(Debug, Serialize)]
pub struct GuestView {
    pub id: String,
    pub name: String,
    pub is_attending: bool,
    pub is_plus_one: bool,
}

impl PartyView {
    pub fn from_parts(party: Party, guests: Vec<Guest>) -> Self {
        Self {
            id: party.id,
            party_name: party.party_name,
            status: party.status,
            has_responded: party.has_responded,
            guests: guests
                .into_iter()
                .map(|g| GuestView {
                    id: g.id,
                    name: g.name,
                    is_attending: g.is_attending,
                    is_plus_one: g.is_plus_one,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegistryItem {
    pub id: String,
    pub name: String,
    pub is_purchased: bool,
    pub purchaser_name: Option<String>,
    pub purchaser_email: Option<String>,
    pub purchaser_message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Purchase {
    pub name: String,
    pub email: Option<String>,
    pub message: Option<String>,
}
