//! Storage seam for the service.
//!
//! Handlers never see a concrete client; they get these traits through
//! [`crate::state::AppState`] so the same flow runs against Redis in production
//! and the in-memory backend in tests.
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::models::{AuditRecord, ContactUpdate, Guest, GuestUpdate, Party, Purchase};

pub mod memory;
pub mod redis;

/// Transient infrastructure fault. Surfaced to the caller as 503; never retried
/// internally.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// The persisted guest directory: parties, the guests they own, and the audit
/// trail of accepted submissions.
#[async_trait]
pub trait GuestDirectory: Send + Sync {
    /// Looks up the party whose search-tag set contains `token` (already
    /// normalized). When the directory holds more than one match, the first one
    /// wins; guest lists are small and curated, so this imprecision is accepted.
    async fn find_party_by_token(&self, token: &str) -> Result<Option<Party>, StoreError>;

    async fn party_exists(&self, party_id: &str) -> Result<bool, StoreError>;

    /// The one-shot acceptance gate. Applies `update`, sets `status = replied`
    /// and `has_responded = true`, all only while the stored `has_responded` is
    /// still false, and returns the affected row count. Must be a single atomic
    /// conditional write: two concurrent submissions for the same party may both
    /// reach the store, and exactly one may see 1 returned.
    async fn conditional_update_party(
        &self,
        party_id: &str,
        update: &ContactUpdate,
    ) -> Result<u64, StoreError>;

    async fn guests_for_party(&self, party_id: &str) -> Result<Vec<Guest>, StoreError>;

    /// Applies attendance/name updates as one logical batch. Ownership of every
    /// id has already been validated by the caller against `guests_for_party`.
    async fn batch_update_guests(
        &self,
        party_id: &str,
        updates: &[GuestUpdate],
    ) -> Result<(), StoreError>;

    async fn append_audit_log(&self, record: &AuditRecord) -> Result<(), StoreError>;
}

/// Registry items and the few site settings the public pages read.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Conditional write mirroring [`GuestDirectory::conditional_update_party`]:
    /// records the purchaser only while `is_purchased` is still false, returning
    /// the affected count.
    async fn mark_item_purchased(
        &self,
        item_id: &str,
        purchase: &Purchase,
    ) -> Result<u64, StoreError>;

    async fn registry_item_exists(&self, item_id: &str) -> Result<bool, StoreError>;

    async fn shipping_address(&self) -> Result<Option<Value>, StoreError>;
}
