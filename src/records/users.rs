use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::normalize_email;
use crate::error::GatewayError;
use crate::store::KeyValueStore;

const REQUIRED_FIELDS: [&str; 5] = ["email", "firstName", "lastName", "business", "interest"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub business: String,
    pub interest: String,
    #[serde(default)]
    pub created_at: String,
}

// Body of POST and PUT/PATCH /users
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub business: Option<String>,
    pub interest: Option<String>,
}

#[derive(Clone)]
pub struct UserRecords {
    store: Arc<dyn KeyValueStore>,
    table: String,
}

impl UserRecords {
    pub fn new(store: Arc<dyn KeyValueStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    pub async fn create(&self, input: UserInput) -> Result<User, GatewayError> {
        let (Some(email), Some(first_name), Some(last_name), Some(business), Some(interest)) = (
            input.email,
            input.first_name,
            input.last_name,
            input.business,
            input.interest,
        ) else {
            return Err(GatewayError::validation(format!(
                "Missing required fields: {:?}",
                REQUIRED_FIELDS
            )));
        };
        let email = normalize_email(Some(email.as_str()))?;

        if self.store.get(&self.table, &email).await?.is_some() {
            return Err(GatewayError::conflict("User already exists"));
        }

        let user = User {
            email: email.clone(),
            first_name,
            last_name,
            business,
            interest,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        self.store
            .put(&self.table, &email, &serde_json::to_value(&user)?)
            .await?;

        tracing::info!(email = %email, "user created");
        Ok(user)
    }

    pub async fn get(&self, email: Option<&str>) -> Result<User, GatewayError> {
        let email = normalize_email(email)?;
        self.load(&email)
            .await?
            .ok_or_else(|| GatewayError::not_found("User not found"))
    }

    /// Applies the provided fields and returns their names.
    pub async fn update(&self, input: UserInput) -> Result<Vec<&'static str>, GatewayError> {
        let email = normalize_email(input.email.as_deref())?;

        let changes = [
            ("firstName", input.first_name),
            ("lastName", input.last_name),
            ("business", input.business),
            ("interest", input.interest),
        ];
        if changes.iter().all(|(_, value)| value.is_none()) {
            return Err(GatewayError::validation("No updatable fields provided"));
        }

        let mut user = self
            .load(&email)
            .await?
            .ok_or_else(|| GatewayError::not_found("User not found"))?;

        let mut fields = Vec::new();
        for (name, value) in changes {
            let Some(value) = value else { continue };
            match name {
                "firstName" => user.first_name = value,
                "lastName" => user.last_name = value,
                "business" => user.business = value,
                _ => user.interest = value,
            }
            fields.push(name);
        }

        self.store
            .put(&self.table, &email, &serde_json::to_value(&user)?)
            .await?;
        Ok(fields)
    }

    /// Removes the user if present. Returns the normalized email.
    pub async fn delete(&self, email: Option<&str>) -> Result<String, GatewayError> {
        let email = normalize_email(email)?;
        self.store.delete(&self.table, &email).await?;
        Ok(email)
    }

    async fn load(&self, email: &str) -> Result<Option<User>, GatewayError> {
        let Some(document) = self.store.get(&self.table, email).await? else {
            return Ok(None);
        };
        serde_json::from_value(document)
            .map(Some)
            .map_err(|e| GatewayError::storage(format!("Corrupt user '{}': {}", email, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn records() -> UserRecords {
        UserRecords::new(Arc::new(MemoryStore::new()), "User")
    }

    fn jane() -> UserInput {
        UserInput {
            email: Some(" Jane@Example.com".into()),
            first_name: Some("Jane".into()),
            last_name: Some("Doe".into()),
            business: Some("Bakery".into()),
            interest: Some("pinterest".into()),
        }
    }

    #[tokio::test]
    async fn create_and_get() {
        let users = records();
        let created = users.create(jane()).await.unwrap();
        assert_eq!(created.email, "jane@example.com");
        assert!(!created.created_at.is_empty());

        let fetched = users.get(Some("JANE@example.com")).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn create_requires_every_field() {
        let users = records();
        let err = users
            .create(UserInput {
                interest: None,
                ..jane()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation { .. }));
    }

    #[tokio::test]
    async fn duplicate_create_conflicts() {
        let users = records();
        users.create(jane()).await.unwrap();
        let err = users.create(jane()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Conflict { .. }));
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let err = records().get(Some("nobody@example.com")).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));

        let err = records().get(None).await.unwrap_err();
        assert!(matches!(err, GatewayError::Validation { .. }));
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let users = records();
        users.create(jane()).await.unwrap();

        let fields = users
            .update(UserInput {
                email: Some("jane@example.com".into()),
                business: Some("Cafe".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(fields, vec!["business"]);

        let user = users.get(Some("jane@example.com")).await.unwrap();
        assert_eq!(user.business, "Cafe");
        assert_eq!(user.first_name, "Jane");
    }

    #[tokio::test]
    async fn update_without_fields_is_rejected() {
        let users = records();
        users.create(jane()).await.unwrap();
        let err = users
            .update(UserInput {
                email: Some("jane@example.com".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation { .. }));
    }

    #[tokio::test]
    async fn update_missing_user_is_not_found() {
        let err = records()
            .update(UserInput {
                email: Some("ghost@example.com".into()),
                interest: Some("x".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let users = records();
        users.create(jane()).await.unwrap();

        assert_eq!(
            users.delete(Some("jane@example.com")).await.unwrap(),
            "jane@example.com"
        );
        assert_eq!(
            users.delete(Some("jane@example.com")).await.unwrap(),
            "jane@example.com"
        );
        assert!(users.get(Some("jane@example.com")).await.is_err());
    }
}
