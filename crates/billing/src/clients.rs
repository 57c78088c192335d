//! Client records owned by accounts

use invoicely_shared::Pagination;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::accounts::Account;
use crate::error::{BillingError, BillingResult};
use crate::privileges::PlanPrivileges;
use crate::quota::{self, QuotaDecision};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Client {
    pub id: Uuid,
    pub owner_account_id: Uuid,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Validated input for a new client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

/// One page of an owner's clients
#[derive(Debug, Clone)]
pub struct ClientPage {
    pub clients: Vec<Client>,
    pub total: i64,
    pub pagination: Pagination,
}

#[derive(Clone)]
pub struct ClientService {
    pool: PgPool,
}

impl ClientService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a client for `owner`, re-checking the quota atomically
    ///
    /// The owner's account row is locked first so concurrent creations for the
    /// same owner serialize; the count and insert then run on that transaction.
    pub async fn create_client(
        &self,
        owner: &Account,
        plan: Option<&PlanPrivileges>,
        new_client: NewClient,
    ) -> BillingResult<Client> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM accounts WHERE id = $1 FOR UPDATE")
                .bind(owner.id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(BillingError::AccountNotFound(owner.id.to_string()));
        }

        if let QuotaDecision::Deny(denial) = quota::evaluate_on(&mut *tx, owner, plan).await? {
            tracing::info!(
                account_id = %owner.id,
                current = denial.current,
                limit = denial.limit,
                "Client creation blocked inside transaction"
            );
            tx.rollback().await?;
            return Err(BillingError::ClientLimitReached(denial));
        }

        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (id, owner_account_id, name, email, company, phone, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, owner_account_id, name, email, company, phone, notes,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner.id)
        .bind(&new_client.name)
        .bind(&new_client.email)
        .bind(&new_client.company)
        .bind(&new_client.phone)
        .bind(&new_client.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            account_id = %owner.id,
            client_id = %client.id,
            "Client created"
        );
        Ok(client)
    }

    /// Newest first
    pub async fn list_clients(
        &self,
        owner_id: Uuid,
        pagination: Pagination,
    ) -> BillingResult<ClientPage> {
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, owner_account_id, name, email, company, phone, notes,
                   created_at, updated_at
            FROM clients
            WHERE owner_account_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(pagination.per_page)
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM clients WHERE owner_account_id = $1")
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(ClientPage {
            clients,
            total,
            pagination,
        })
    }

    /// Fetch a client, scoped to its owner
    pub async fn get_client(&self, owner_id: Uuid, client_id: Uuid) -> BillingResult<Client> {
        sqlx::query_as::<_, Client>(
            r#"
            SELECT id, owner_account_id, name, email, company, phone, notes,
                   created_at, updated_at
            FROM clients
            WHERE id = $1 AND owner_account_id = $2
            "#,
        )
        .bind(client_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| BillingError::ClientNotFound(client_id.to_string()))
    }
}
