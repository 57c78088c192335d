//! Client quota enforcement
//!
//! Decides whether an account may create one more client. Two accounting
//! regimes apply:
//!
//! - **Reseller credit**: a sub-account (one with a parent) is capped by its
//!   own `reseller_credit_limit`. Its parent's plan is never consulted.
//! - **Plan**: a direct account is capped by its plan's `max_clients`, minus
//!   the credits it has already handed out to its sub-accounts, floored at 0.
//!
//! The decision itself is pure ([`QuotaPolicy::decide`]). [`ClientQuotaService`]
//! supplies the two storage reads it needs and skips them when the policy is
//! unlimited.

use invoicely_shared::Limit;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::accounts::Account;
use crate::error::BillingResult;
use crate::privileges::PlanPrivileges;

/// Machine-readable code carried by every denial
pub const CLIENT_LIMIT_REACHED: &str = "client_limit_reached";

/// Which cap applies to an account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaPolicy {
    /// No enforceable cap
    Unlimited,
    /// Sub-account capped by its credit limit
    ResellerCredit { cap: i64 },
    /// Direct account capped by its plan, less allocated credits
    Plan { plan_cap: i64 },
}

impl QuotaPolicy {
    /// Resolve the policy for an account and its plan snapshot
    pub fn for_account(account: &Account, plan: Option<&PlanPrivileges>) -> Self {
        if account.is_sub_account() {
            return match Limit::from_raw(account.reseller_credit_limit) {
                Limit::Unlimited => QuotaPolicy::Unlimited,
                Limit::Capped(cap) => QuotaPolicy::ResellerCredit { cap },
            };
        }

        let Some(plan) = plan else {
            return QuotaPolicy::Unlimited;
        };

        match plan.client_limit() {
            Limit::Unlimited => QuotaPolicy::Unlimited,
            Limit::Capped(plan_cap) => QuotaPolicy::Plan { plan_cap },
        }
    }

    pub fn regime(&self) -> &'static str {
        match self {
            QuotaPolicy::Unlimited => "unlimited",
            QuotaPolicy::ResellerCredit { .. } => "reseller_credit",
            QuotaPolicy::Plan { .. } => "plan",
        }
    }

    /// Whether the allocated-credit sum is needed
    pub fn needs_allocation(&self) -> bool {
        matches!(self, QuotaPolicy::Plan { .. })
    }

    /// Effective cap given the credits allocated to sub-accounts
    pub fn effective_limit(&self, allocated: i64) -> Option<i64> {
        match *self {
            QuotaPolicy::Unlimited => None,
            QuotaPolicy::ResellerCredit { cap } => Some(cap),
            QuotaPolicy::Plan { plan_cap } => Some(plan_cap.saturating_sub(allocated).max(0)),
        }
    }

    /// Decide whether one more client may be created
    pub fn decide(&self, current: i64, allocated: i64) -> QuotaDecision {
        match *self {
            QuotaPolicy::Unlimited => QuotaDecision::Allow,
            QuotaPolicy::ResellerCredit { cap } => {
                if current >= cap {
                    QuotaDecision::Deny(ClientLimitDenial {
                        current,
                        limit: cap,
                        allocated_to_sub_accounts: None,
                    })
                } else {
                    QuotaDecision::Allow
                }
            }
            QuotaPolicy::Plan { .. } => {
                let available = self.effective_limit(allocated).unwrap_or(0);
                if current >= available {
                    QuotaDecision::Deny(ClientLimitDenial {
                        current,
                        limit: available,
                        allocated_to_sub_accounts: Some(allocated),
                    })
                } else {
                    QuotaDecision::Allow
                }
            }
        }
    }

    /// Usage view of the same accounting
    pub fn usage(&self, current: i64, allocated: i64) -> QuotaUsage {
        let limit = self.effective_limit(allocated);
        QuotaUsage {
            regime: self.regime(),
            current,
            limit,
            allocated_to_sub_accounts: self.needs_allocation().then_some(allocated),
            remaining: limit.map(|l| l.saturating_sub(current).max(0)),
            can_create: self.decide(current, allocated).is_allowed(),
        }
    }
}

/// Outcome of a quota evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaDecision {
    Allow,
    Deny(ClientLimitDenial),
}

impl QuotaDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, QuotaDecision::Allow)
    }
}

/// Context returned with a denial
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientLimitDenial {
    pub current: i64,
    pub limit: i64,
    /// Present only for direct accounts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocated_to_sub_accounts: Option<i64>,
}

impl ClientLimitDenial {
    pub fn error_code(&self) -> &'static str {
        CLIENT_LIMIT_REACHED
    }

    /// Human-readable explanation
    pub fn message(&self) -> String {
        match self.allocated_to_sub_accounts {
            None => format!(
                "You have reached your client limit of {}. Contact your reseller to increase your credit limit.",
                self.limit
            ),
            Some(allocated) if allocated > 0 => format!(
                "Client limit reached. {} client credits are allocated to your sub-accounts, leaving {} for your own clients ({} in use). Reclaim credits from a sub-account or upgrade your plan.",
                allocated, self.limit, self.current
            ),
            Some(_) => format!(
                "You have reached the maximum of {} clients allowed by your plan. Please upgrade your plan to add more clients.",
                self.limit
            ),
        }
    }
}

/// Quota figures for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaUsage {
    pub regime: &'static str,
    pub current: i64,
    pub limit: Option<i64>,
    pub allocated_to_sub_accounts: Option<i64>,
    pub remaining: Option<i64>,
    pub can_create: bool,
}

/// Pure evaluation over already-fetched figures
pub fn evaluate_client_quota(
    account: &Account,
    plan: Option<&PlanPrivileges>,
    client_count: i64,
    allocated_credits: i64,
) -> QuotaDecision {
    QuotaPolicy::for_account(account, plan).decide(client_count, allocated_credits)
}

async fn count_owned_clients(conn: &mut PgConnection, account_id: Uuid) -> BillingResult<i64> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM clients WHERE owner_account_id = $1")
            .bind(account_id)
            .fetch_one(conn)
            .await?;
    Ok(count)
}

/// Sum of credit limits handed to sub-accounts; NULL limits contribute nothing
async fn allocated_credits(conn: &mut PgConnection, parent_id: Uuid) -> BillingResult<i64> {
    let (sum,): (Option<i64>,) = sqlx::query_as(
        "SELECT SUM(reseller_credit_limit)::BIGINT FROM accounts WHERE parent_account_id = $1",
    )
    .bind(parent_id)
    .fetch_one(conn)
    .await?;
    Ok(sum.unwrap_or(0))
}

/// Evaluate on an existing connection or transaction
///
/// Issues no reads for an unlimited policy, only the count for a sub-account,
/// and the sum plus the count for a plan holder.
pub async fn evaluate_on(
    conn: &mut PgConnection,
    account: &Account,
    plan: Option<&PlanPrivileges>,
) -> BillingResult<QuotaDecision> {
    let policy = QuotaPolicy::for_account(account, plan);
    if policy == QuotaPolicy::Unlimited {
        return Ok(QuotaDecision::Allow);
    }

    let allocated = if policy.needs_allocation() {
        allocated_credits(&mut *conn, account.id).await?
    } else {
        0
    };
    let current = count_owned_clients(&mut *conn, account.id).await?;

    let decision = policy.decide(current, allocated);
    tracing::debug!(
        account_id = %account.id,
        regime = policy.regime(),
        current,
        allocated,
        allowed = decision.is_allowed(),
        "Client quota evaluated"
    );
    Ok(decision)
}

/// Read-only quota gate backed by the clients and accounts tables
#[derive(Clone)]
pub struct ClientQuotaService {
    pool: PgPool,
}

impl ClientQuotaService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Pre-check run before the client-creation handler
    pub async fn check(
        &self,
        account: &Account,
        plan: Option<&PlanPrivileges>,
    ) -> BillingResult<QuotaDecision> {
        // Unlimited accounts pass without touching the pool
        if QuotaPolicy::for_account(account, plan) == QuotaPolicy::Unlimited {
            return Ok(QuotaDecision::Allow);
        }
        let mut conn = self.pool.acquire().await?;
        evaluate_on(&mut *conn, account, plan).await
    }

    /// Current figures for the account, whatever its regime
    pub async fn usage(
        &self,
        account: &Account,
        plan: Option<&PlanPrivileges>,
    ) -> BillingResult<QuotaUsage> {
        let policy = QuotaPolicy::for_account(account, plan);
        let mut conn = self.pool.acquire().await?;

        let allocated = if policy.needs_allocation() {
            allocated_credits(&mut *conn, account.id).await?
        } else {
            0
        };
        let current = count_owned_clients(&mut *conn, account.id).await?;

        Ok(policy.usage(current, allocated))
    }
}
