//! In-memory store, used by the test suite and by `RSVP_STORE=memory` for local
//! development. Same contract as the Redis backend; the conditional writes run
//! inside one critical section, so the exactly-once guarantee holds here too.
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{GuestDirectory, Registry, StoreError};
use crate::models::{
    AuditRecord, ContactUpdate, Guest, GuestUpdate, Party, PartyStatus, Purchase, RegistryItem,
};

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    parties: HashMap<String, Party>,
    guests: HashMap<String, Guest>,
    registry: HashMap<String, RegistryItem>,
    shipping_address: Option<Value>,
    audit: Vec<AuditRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_party(&self, party: Party, guests: Vec<Guest>) {
        let mut inner = self.inner.lock().await;

        for guest in guests {
            inner.guests.insert(guest.id.clone(), guest);
        }
        inner.parties.insert(party.id.clone(), party);
    }

    pub async fn insert_registry_item(&self, item: RegistryItem) {
        let mut inner = self.inner.lock().await;
        inner.registry.insert(item.id.clone(), item);
    }

    pub async fn set_shipping_address(&self, value: Value) {
        let mut inner = self.inner.lock().await;
        inner.shipping_address = Some(value);
    }

    pub async fn party(&self, id: &str) -> Option<Party> {
        self.inner.lock().await.parties.get(id).cloned()
    }

    pub async fn guest(&self, id: &str) -> Option<Guest> {
        self.inner.lock().await.guests.get(id).cloned()
    }

    pub async fn registry_item(&self, id: &str) -> Option<RegistryItem> {
        self.inner.lock().await.registry.get(id).cloned()
    }

    pub async fn audit_len(&self) -> usize {
        self.inner.lock().await.audit.len()
    }
}

#[async_trait]
impl GuestDirectory for MemoryStore {
    async fn find_party_by_token(&self, token: &str) -> Result<Option<Party>, StoreError> {
        let inner = self.inner.lock().await;

        Ok(inner
            .parties
            .values()
            .find(|p| p.search_tags.iter().any(|t| t == token))
            .cloned())
    }

    async fn party_exists(&self, party_id: &str) -> Result<bool, StoreError> {
        Ok(self.inner.lock().await.parties.contains_key(party_id))
    }

    async fn conditional_update_party(
        &self,
        party_id: &str,
        update: &ContactUpdate,
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;

        match inner.parties.get_mut(party_id) {
            Some(party) if !party.has_responded => {
                party.email = update.email.clone();
                party.phone = update.phone.clone();
                if let Some(notes) = &update.admin_notes {
                    party.admin_notes = Some(notes.clone());
                }
                party.status = PartyStatus::Replied;
                party.has_responded = true;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn guests_for_party(&self, party_id: &str) -> Result<Vec<Guest>, StoreError> {
        let inner = self.inner.lock().await;

        let mut guests: Vec<Guest> = inner
            .guests
            .values()
            .filter(|g| g.party_id == party_id)
            .cloned()
            .collect();
        guests.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(guests)
    }

    async fn batch_update_guests(
        &self,
        party_id: &str,
        updates: &[GuestUpdate],
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;

        for update in updates {
            if let Some(guest) = inner.guests.get_mut(&update.id) {
                if guest.party_id == party_id {
                    guest.name = update.name.clone();
                    guest.is_attending = update.is_attending;
                }
            }
        }

        Ok(())
    }

    async fn append_audit_log(&self, record: &AuditRecord) -> Result<(), StoreError> {
        self.inner.lock().await.audit.push(record.clone());
        Ok(())
    }
}

#[async_trait]
impl Registry for MemoryStore {
    async fn mark_item_purchased(
        &self,
        item_id: &str,
        purchase: &Purchase,
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;

        match inner.registry.get_mut(item_id) {
            Some(item) if !item.is_purchased => {
                item.is_purchased = true;
                item.purchaser_name = Some(purchase.name.clone());
                item.purchaser_email = purchase.email.clone();
                item.purchaser_message = purchase.message.clone();
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn registry_item_exists(&self, item_id: &str) -> Result<bool, StoreError> {
        Ok(self.inner.lock().await.registry.contains_key(item_id))
    }

    async fn shipping_address(&self) -> Result<Option<Value>, StoreError> {
        Ok(self.inner.lock().await.shipping_address.clone())
    }
}
