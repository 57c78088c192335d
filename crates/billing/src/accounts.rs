//! Accounts and subscription plans
//!
//! Both are owned by administrative flows elsewhere; this module only reads
//! them so requests can be evaluated against the acting account.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{BillingError, BillingResult};
use crate::privileges::PlanPrivileges;

/// A billing principal: a direct subscriber or a reseller's sub-account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Set only for reseller sub-accounts
    pub parent_account_id: Option<Uuid>,
    /// NULL or -1 means unlimited
    pub reseller_credit_limit: Option<i64>,
    pub plan_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Account {
    /// Sub-account status is decided by the parent link alone
    pub fn is_sub_account(&self) -> bool {
        self.parent_account_id.is_some()
    }
}

/// Raw plan row; privileges still JSON
#[derive(Debug, sqlx::FromRow)]
struct PlanRow {
    id: Uuid,
    name: String,
    slug: String,
    price_cents: i64,
    currency: String,
    privileges: serde_json::Value,
    active: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

/// Subscription plan with privileges already parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionPlan {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub price_cents: i64,
    pub currency: String,
    pub privileges: PlanPrivileges,
    pub active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<PlanRow> for SubscriptionPlan {
    type Error = BillingError;

    fn try_from(row: PlanRow) -> BillingResult<Self> {
        let privileges = PlanPrivileges::from_json(row.privileges).map_err(|e| {
            tracing::error!(plan_id = %row.id, error = %e, "Stored plan privileges are malformed");
            e
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            price_cents: row.price_cents,
            currency: row.currency,
            privileges,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// The account a request acts as, with its plan resolved once
#[derive(Debug, Clone)]
pub struct ActingAccount {
    pub account: Account,
    /// Always `None` for sub-accounts
    pub plan: Option<SubscriptionPlan>,
}

impl ActingAccount {
    pub fn privileges(&self) -> Option<&PlanPrivileges> {
        self.plan.as_ref().map(|p| &p.privileges)
    }
}

/// Read access to accounts and their plans
#[derive(Clone)]
pub struct AccountService {
    pool: PgPool,
}

impl AccountService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_account(&self, account_id: Uuid) -> BillingResult<Account> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, email, parent_account_id, reseller_credit_limit,
                   plan_id, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| BillingError::AccountNotFound(account_id.to_string()))
    }

    pub async fn find_plan(&self, plan_id: Uuid) -> BillingResult<Option<SubscriptionPlan>> {
        let row: Option<PlanRow> = sqlx::query_as(
            r#"
            SELECT id, name, slug, price_cents, currency, privileges,
                   active, created_at, updated_at
            FROM subscription_plans
            WHERE id = $1
            "#,
        )
        .bind(plan_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SubscriptionPlan::try_from).transpose()
    }

    /// Load an account and, for direct accounts, its plan
    pub async fn acting_account(&self, account_id: Uuid) -> BillingResult<ActingAccount> {
        let account = self.find_account(account_id).await?;

        let plan = match (account.is_sub_account(), account.plan_id) {
            (false, Some(plan_id)) => {
                let plan = self.find_plan(plan_id).await?;
                if plan.is_none() {
                    tracing::warn!(
                        account_id = %account.id,
                        plan_id = %plan_id,
                        "Account references a missing plan"
                    );
                }
                plan
            }
            _ => None,
        };

        Ok(ActingAccount { account, plan })
    }
}
