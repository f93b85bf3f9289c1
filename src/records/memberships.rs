use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{IntLike, normalize_email, now_unix};
use crate::error::GatewayError;
use crate::store::KeyValueStore;

const REQUIRED_FIELDS: [&str; 7] = [
    "email",
    "gptLimit",
    "gptCount",
    "subscription_start",
    "subscription_end",
    "tier",
    "payment_freq",
];

// Membership across all platforms, used for reporting and permission checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub email: String,
    #[serde(rename = "gptLimit")]
    pub gpt_limit: i64,
    #[serde(rename = "gptCount")]
    pub gpt_count: i64,
    pub subscription_start: i64,
    pub subscription_end: i64,
    pub tier: String,
    pub payment_freq: String,
    #[serde(rename = "lastUpdated", default)]
    pub last_updated: i64,
}

// Body of POST and PUT/PATCH /memberships
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MembershipInput {
    pub email: Option<String>,
    #[serde(rename = "gptLimit")]
    pub gpt_limit: Option<IntLike>,
    #[serde(rename = "gptCount")]
    pub gpt_count: Option<IntLike>,
    pub subscription_start: Option<IntLike>,
    pub subscription_end: Option<IntLike>,
    pub tier: Option<String>,
    pub payment_freq: Option<String>,
}

#[derive(Clone)]
pub struct MembershipRecords {
    store: Arc<dyn KeyValueStore>,
    table: String,
}

impl MembershipRecords {
    pub fn new(store: Arc<dyn KeyValueStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    pub async fn create(&self, input: MembershipInput) -> Result<Membership, GatewayError> {
        let (
            Some(email),
            Some(gpt_limit),
            Some(gpt_count),
            Some(subscription_start),
            Some(subscription_end),
            Some(tier),
            Some(payment_freq),
        ) = (
            input.email,
            input.gpt_limit,
            input.gpt_count,
            input.subscription_start,
            input.subscription_end,
            input.tier,
            input.payment_freq,
        )
        else {
            return Err(GatewayError::validation(format!(
                "Missing required fields: {:?}",
                REQUIRED_FIELDS
            )));
        };
        let email = normalize_email(Some(email.as_str()))?;

        let membership = Membership {
            email: email.clone(),
            gpt_limit: gpt_limit.to_i64("gptLimit")?,
            gpt_count: gpt_count.to_i64("gptCount")?,
            subscription_start: subscription_start.to_i64("subscription_start")?,
            subscription_end: subscription_end.to_i64("subscription_end")?,
            tier,
            payment_freq,
            last_updated: now_unix(),
        };

        if self.store.get(&self.table, &email).await?.is_some() {
            return Err(GatewayError::conflict("Membership already exists"));
        }

        self.store
            .put(&self.table, &email, &serde_json::to_value(&membership)?)
            .await?;

        tracing::info!(email = %email, tier = %membership.tier, "membership created");
        Ok(membership)
    }

    pub async fn get(&self, email: Option<&str>) -> Result<Membership, GatewayError> {
        let email = normalize_email(email)?;
        self.load(&email)
            .await?
            .ok_or_else(|| GatewayError::not_found("Membership not found"))
    }

    /// Applies the provided fields, refreshes `lastUpdated` and returns the
    /// names of the fields that changed.
    pub async fn update(
        &self,
        input: MembershipInput,
    ) -> Result<Vec<&'static str>, GatewayError> {
        let email = normalize_email(input.email.as_deref())?;

        let mut fields = Vec::new();
        if input.gpt_limit.is_some() {
            fields.push("gptLimit");
        }
        if input.gpt_count.is_some() {
            fields.push("gptCount");
        }
        if input.subscription_start.is_some() {
            fields.push("subscription_start");
        }
        if input.subscription_end.is_some() {
            fields.push("subscription_end");
        }
        if input.tier.is_some() {
            fields.push("tier");
        }
        if input.payment_freq.is_some() {
            fields.push("payment_freq");
        }
        if fields.is_empty() {
            return Err(GatewayError::validation("No updatable fields provided"));
        }

        let mut membership = self
            .load(&email)
            .await?
            .ok_or_else(|| GatewayError::not_found("Membership not found"))?;

        if let Some(v) = &input.gpt_limit {
            membership.gpt_limit = v.to_i64("gptLimit")?;
        }
        if let Some(v) = &input.gpt_count {
            membership.gpt_count = v.to_i64("gptCount")?;
        }
        if let Some(v) = &input.subscription_start {
            membership.subscription_start = v.to_i64("subscription_start")?;
        }
        if let Some(v) = &input.subscription_end {
            membership.subscription_end = v.to_i64("subscription_end")?;
        }
        if let Some(tier) = input.tier {
            membership.tier = tier;
        }
        if let Some(freq) = input.payment_freq {
            membership.payment_freq = freq;
        }
        membership.last_updated = now_unix();

        self.store
            .put(&self.table, &email, &serde_json::to_value(&membership)?)
            .await?;
        Ok(fields)
    }

    pub async fn delete(&self, email: Option<&str>) -> Result<String, GatewayError> {
        let email = normalize_email(email)?;
        self.store.delete(&self.table, &email).await?;
        Ok(email)
    }

    async fn load(&self, email: &str) -> Result<Option<Membership>, GatewayError> {
        let Some(document) = self.store.get(&self.table, email).await? else {
            return Ok(None);
        };
        serde_json::from_value(document).map(Some).map_err(|e| {
            GatewayError::storage(format!("Corrupt membership '{}': {}", email, e))
        })
    }
}
