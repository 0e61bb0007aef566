//! # Redis
//!
//! Production store.
//!
//! ## Schema
//!
//! - `party:{id}` (**hash**): party_name, email, phone, status, has_responded
//!   ("0"/"1"), admin_notes, search_tags (newline-joined)
//! - `party:token:{token}` (**string**): normalized search tag -> party id
//! - `party:{id}:guests` (**set**): guest ids owned by the party
//! - `guest:{id}` (**hash**): party_id, name, is_attending, is_plus_one
//! - `registry:{id}` (**hash**): name, is_purchased, purchaser_name,
//!   purchaser_email, purchaser_message
//! - `settings:shipping_address` (**string**): JSON value
//! - `audit:log` (**list**): JSON [`AuditRecord`]s, append-only
//!
//! ## Conditional writes
//!
//! The one-shot gates (`has_responded`, `is_purchased`) run as Lua scripts.
//! Redis executes a script as a single atomic unit, so the check and the write
//! cannot interleave with another submission, even from another process. The
//! script returns the affected count for the caller to inspect, the same shape
//! as an `UPDATE ... WHERE has_responded = false` row count.
use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use redis::{
    AsyncCommands, Client, RedisError, Script,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use serde_json::Value;

use super::{GuestDirectory, Registry, StoreError};
use crate::models::{AuditRecord, ContactUpdate, Guest, GuestUpdate, Party, PartyStatus, Purchase};

const AUDIT_LOG_KEY: &str = "audit:log";
const SHIPPING_ADDRESS_KEY: &str = "settings:shipping_address";

const SUBMIT_GUARD_SCRIPT: &str = r#"
if redis.call('HGET', KEYS[1], 'has_responded') == '0' then
    redis.call('HSET', KEYS[1],
        'email', ARGV[1],
        'phone', ARGV[2],
        'status', ARGV[3],
        'has_responded', '1')
    if ARGV[4] ~= '' then
        redis.call('HSET', KEYS[1], 'admin_notes', ARGV[4])
    end
    return 1
end
return 0
"#;

const PURCHASE_GUARD_SCRIPT: &str = r#"
if redis.call('HGET', KEYS[1], 'is_purchased') == '0' then
    redis.call('HSET', KEYS[1],
        'is_purchased', '1',
        'purchaser_name', ARGV[1],
        'purchaser_email', ARGV[2],
        'purchaser_message', ARGV[3])
    return 1
end
return 0
"#;

pub async fn init_redis(redis_url: &str) -> ConnectionManager {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(500));

    let client = Client::open(redis_url).unwrap();
    let connection_manager = client
        .get_connection_manager_with_config(config)
        .await
        .unwrap();

    connection_manager
}

pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn conn(&self) -> ConnectionManager {
        self.conn.clone()
    }
}

impl From<RedisError> for StoreError {
    fn from(err: RedisError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

fn party_key(id: &str) -> String {
    format!("party:{id}")
}

fn token_key(token: &str) -> String {
    format!("party:token:{token}")
}

fn party_guests_key(id: &str) -> String {
    format!("party:{id}:guests")
}

fn guest_key(id: &str) -> String {
    format!("guest:{id}")
}

fn registry_key(id: &str) -> String {
    format!("registry:{id}")
}

fn party_from_hash(id: &str, map: HashMap<String, String>) -> Option<Party> {
    if map.is_empty() {
        return None;
    }

    Some(Party {
        id: id.to_string(),
        party_name: map.get("party_name").cloned().unwrap_or_default(),
        email: map.get("email").filter(|s| !s.is_empty()).cloned(),
        phone: map.get("phone").filter(|s| !s.is_empty()).cloned(),
        search_tags: map
            .get("search_tags")
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default(),
        status: PartyStatus::parse(map.get("status").map(String::as_str).unwrap_or("pending")),
        has_responded: map.get("has_responded").map(|v| v == "1").unwrap_or(false),
        admin_notes: map.get("admin_notes").filter(|s| !s.is_empty()).cloned(),
    })
}

fn guest_from_hash(id: String, map: HashMap<String, String>) -> Option<Guest> {
    if map.is_empty() {
        return None;
    }

    Some(Guest {
        id,
        party_id: map.get("party_id").cloned().unwrap_or_default(),
        name: map.get("name").cloned().unwrap_or_default(),
        is_attending: map.get("is_attending").map(|v| v == "1").unwrap_or(false),
        is_plus_one: map.get("is_plus_one").map(|v| v == "1").unwrap_or(false),
    })
}

#[async_trait]
impl GuestDirectory for RedisStore {
    async fn find_party_by_token(&self, token: &str) -> Result<Option<Party>, StoreError> {
        let mut conn = self.conn();

        let id: Option<String> = conn.get(token_key(token)).await?;
        let Some(id) = id else {
            return Ok(None);
        };

        let map: HashMap<String, String> = conn.hgetall(party_key(&id)).await?;
        Ok(party_from_hash(&id, map))
    }

    async fn party_exists(&self, party_id: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn();

        let exists: bool = conn.exists(party_key(party_id)).await?;
        Ok(exists)
    }

    async fn conditional_update_party(
        &self,
        party_id: &str,
        update: &ContactUpdate,
    ) -> Result<u64, StoreError> {
        let mut conn = self.conn();

        let updated: u64 = Script::new(SUBMIT_GUARD_SCRIPT)
            .key(party_key(party_id))
            .arg(update.email.as_deref().unwrap_or(""))
            .arg(update.phone.as_deref().unwrap_or(""))
            .arg(PartyStatus::Replied.as_str())
            .arg(update.admin_notes.as_deref().unwrap_or(""))
            .invoke_async(&mut conn)
            .await?;

        Ok(updated)
    }

    async fn guests_for_party(&self, party_id: &str) -> Result<Vec<Guest>, StoreError> {
        let mut conn = self.conn();

        let ids: Vec<String> = conn.smembers(party_guests_key(party_id)).await?;

        let mut guests = Vec::with_capacity(ids.len());
        for id in ids {
            let map: HashMap<String, String> = conn.hgetall(guest_key(&id)).await?;
            if let Some(guest) = guest_from_hash(id, map) {
                guests.push(guest);
            }
        }
        guests.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(guests)
    }

    async fn batch_update_guests(
        &self,
        _party_id: &str,
        updates: &[GuestUpdate],
    ) -> Result<(), StoreError> {
        let mut conn = self.conn();

        // MULTI/EXEC: all updates land together or not at all.
        let mut pipe = redis::pipe();
        pipe.atomic();
        for update in updates {
            pipe.hset_multiple(
                guest_key(&update.id),
                &[
                    ("name", update.name.as_str()),
                    ("is_attending", if update.is_attending { "1" } else { "0" }),
                ],
            )
            .ignore();
        }

        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn append_audit_log(&self, record: &AuditRecord) -> Result<(), StoreError> {
        let mut conn = self.conn();

        let payload =
            serde_json::to_string(record).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let _: () = conn.rpush(AUDIT_LOG_KEY, payload).await?;

        Ok(())
    }
}

#[async_trait]
impl Registry for RedisStore {
    async fn mark_item_purchased(
        &self,
        item_id: &str,
        purchase: &Purchase,
    ) -> Result<u64, StoreError> {
        let mut conn = self.conn();

        let updated: u64 = Script::new(PURCHASE_GUARD_SCRIPT)
            .key(registry_key(item_id))
            .arg(purchase.name.as_str())
            .arg(purchase.email.as_deref().unwrap_or(""))
            .arg(purchase.message.as_deref().unwrap_or(""))
            .invoke_async(&mut conn)
            .await?;

        Ok(updated)
    }

    async fn registry_item_exists(&self, item_id: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn();

        let exists: bool = conn.exists(registry_key(item_id)).await?;
        Ok(exists)
    }

    async fn shipping_address(&self) -> Result<Option<Value>, StoreError> {
        let mut conn = self.conn();

        let raw: Option<String> = conn.get(SHIPPING_ADDRESS_KEY).await?;
        raw.map(|s| serde_json::from_str(&s).map_err(|e| StoreError::Unavailable(e.to_string())))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{guest_from_hash, party_from_hash};
    use crate::models::PartyStatus;

    fn hash(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_party_decoding() {
        let party = party_from_hash(
            "p1",
            hash(&[
                ("party_name", "Sarah Fortune & Guest"),
                ("email", "sarah@example.com"),
                ("phone", ""),
                ("status", "replied"),
                ("has_responded", "1"),
                ("search_tags", "sarah fortune\nfortune"),
            ]),
        )
        .unwrap();

        assert_eq!(party.id, "p1");
        assert_eq!(party.email.as_deref(), Some("sarah@example.com"));
        assert_eq!(party.phone, None);
        assert_eq!(party.status, PartyStatus::Replied);
        assert!(party.has_responded);
        assert_eq!(party.search_tags, vec!["sarah fortune", "fortune"]);
        assert_eq!(party.admin_notes, None);
    }

    #[test]
    fn test_party_missing_fields_default() {
        let party = party_from_hash("p1", hash(&[("party_name", "The Does")])).unwrap();

        assert_eq!(party.status, PartyStatus::Pending);
        assert!(!party.has_responded);
        assert!(party.search_tags.is_empty());
        assert_eq!(party.email, None);
        assert_eq!(party.admin_notes, None);
    }

    #[test]
    fn test_missing_rows_decode_to_none() {
        assert!(party_from_hash("p1", HashMap::new()).is_none());
        assert!(guest_from_hash("g1".to_string(), HashMap::new()).is_none());
    }

    #[test]
    fn test_guest_flag_decoding() {
        let guest = guest_from_hash(
            "g2".to_string(),
            hash(&[
                ("party_id", "p1"),
                ("name", ""),
                ("is_attending", "0"),
                ("is_plus_one", "1"),
            ]),
        )
        .unwrap();

        assert_eq!(guest.id, "g2");
        assert_eq!(guest.party_id, "p1");
        assert_eq!(guest.name, "");
        assert!(!guest.is_attending);
        assert!(guest.is_plus_one);
    }
}
