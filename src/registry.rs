//! Registry purchase marking and the shipping-address setting. The purchase
//! gate follows the same conditional-write discipline as the RSVP guard: two
//! guests claiming the same gift at once cannot both see success.
use serde_json::Value;

use crate::{
    error::AppError,
    models::Purchase,
    store::Registry,
};

/// Claims a registry item for a purchaser. The purchaser's name is required;
/// email and message are optional and blank values are dropped.
pub async fn mark_purchased(
    registry: &dyn Registry,
    item_id: &str,
    purchase: &Purchase,
) -> Result<(), AppError> {
    if item_id.is_empty() || purchase.name.trim().is_empty() {
        return Err(AppError::MalformedPayload);
    }

    let cleaned = Purchase {
        name: purchase.name.trim().to_string(),
        email: trimmed(&purchase.email),
        message: trimmed(&purchase.message),
    };

    let updated = registry.mark_item_purchased(item_id, &cleaned).await?;
    if updated == 0 {
        return Err(if registry.registry_item_exists(item_id).await? {
            AppError::AlreadyPurchased
        } else {
            AppError::NotFound("registry item")
        });
    }

    Ok(())
}

pub async fn shipping_address(registry: &dyn Registry) -> Result<Value, AppError> {
    registry
        .shipping_address()
        .await?
        .ok_or(AppError::NotFound("shipping address"))
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::RegistryItem;
    use crate::store::memory::MemoryStore;

    fn item(id: &str, name: &str) -> RegistryItem {
        RegistryItem {
            id: id.to_string(),
            name: name.to_string(),
            is_purchased: false,
            purchaser_name: None,
            purchaser_email: None,
            purchaser_message: None,
        }
    }

    fn purchase(name: &str) -> Purchase {
        Purchase {
            name: name.to_string(),
            email: Some("  buyer@example.com ".to_string()),
            message: Some("   ".to_string()),
        }
    }

    #[tokio::test]
    async fn purchase_is_recorded_once() {
        let store = MemoryStore::new();
        store.insert_registry_item(item("r1", "Dutch oven")).await;

        mark_purchased(&store, "r1", &purchase("  Jane Doe ")).await.unwrap();

        let item = store.registry_item("r1").await.unwrap();
        assert!(item.is_purchased);
        assert_eq!(item.purchaser_name.as_deref(), Some("Jane Doe"));
        assert_eq!(item.purchaser_email.as_deref(), Some("buyer@example.com"));
        assert_eq!(item.purchaser_message, None);

        let again = mark_purchased(&store, "r1", &purchase("Someone Else")).await;
        assert!(matches!(again, Err(AppError::AlreadyPurchased)));
        assert_eq!(
            store.registry_item("r1").await.unwrap().purchaser_name.as_deref(),
            Some("Jane Doe")
        );
    }

    #[tokio::test]
    async fn unknown_item_is_not_found() {
        let store = MemoryStore::new();

        assert!(matches!(
            mark_purchased(&store, "r9", &purchase("Jane Doe")).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn blank_purchaser_name_is_rejected() {
        let store = MemoryStore::new();
        store.insert_registry_item(item("r1", "Dutch oven")).await;

        assert!(matches!(
            mark_purchased(&store, "r1", &purchase("   ")).await,
            Err(AppError::MalformedPayload)
        ));
        assert!(!store.registry_item("r1").await.unwrap().is_purchased);
    }

    #[tokio::test]
    async fn shipping_address_round_trip() {
        let store = MemoryStore::new();

        assert!(matches!(
            shipping_address(&store).await,
            Err(AppError::NotFound(_))
        ));

        store
            .set_shipping_address(json!({ "line1": "1 Main St", "city": "Springfield" }))
            .await;
        let value = shipping_address(&store).await.unwrap();
        assert_eq!(value["city"], "Springfield");
    }
}
