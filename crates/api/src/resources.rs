//! API response projections

use invoicely_billing::{Account, Client, ClientPage, PlanPrivileges, SubscriptionPlan};
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct ClientResource {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Client> for ClientResource {
    fn from(client: Client) -> Self {
        Self {
            id: client.id,
            name: client.name,
            email: client.email,
            company: client.company,
            phone: client.phone,
            notes: client.notes,
            created_at: client.created_at,
            updated_at: client.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClientListResource {
    pub data: Vec<ClientResource>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

impl From<ClientPage> for ClientListResource {
    fn from(page: ClientPage) -> Self {
        Self {
            data: page.clients.into_iter().map(ClientResource::from).collect(),
            page: page.pagination.page,
            per_page: page.pagination.per_page,
            total: page.total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlanResource {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub price_cents: i64,
    pub currency: String,
    pub active: bool,
    /// `null` when unlimited
    pub client_limit: Option<i64>,
    pub monthly_charge_limit: Option<i64>,
    pub privileges: PlanPrivileges,
}

impl From<SubscriptionPlan> for PlanResource {
    fn from(plan: SubscriptionPlan) -> Self {
        Self {
            id: plan.id,
            name: plan.name,
            slug: plan.slug,
            price_cents: plan.price_cents,
            currency: plan.currency,
            active: plan.active,
            client_limit: plan.privileges.client_limit().cap(),
            monthly_charge_limit: plan.privileges.monthly_charge_limit().cap(),
            privileges: plan.privileges,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccountResource {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_sub_account: bool,
    pub parent_account_id: Option<Uuid>,
    pub reseller_credit_limit: Option<i64>,
    pub plan: Option<PlanResource>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl AccountResource {
    pub fn new(account: Account, plan: Option<SubscriptionPlan>) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
            is_sub_account: account.parent_account_id.is_some(),
            parent_account_id: account.parent_account_id,
            reseller_credit_limit: account.reseller_credit_limit,
            plan: plan.map(PlanResource::from),
            created_at: account.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invoicely_shared::Pagination;
    use serde_json::json;
    use time::macros::datetime;

    fn client() -> Client {
        Client {
            id: Uuid::nil(),
            owner_account_id: Uuid::new_v4(),
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            company: None,
            phone: Some("555 0100".to_string()),
            notes: None,
            created_at: datetime!(2024-03-01 12:00 UTC),
            updated_at: datetime!(2024-03-02 08:30 UTC),
        }
    }

    #[test]
    fn test_client_resource_shape() {
        let value = serde_json::to_value(ClientResource::from(client())).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "00000000-0000-0000-0000-000000000000",
                "name": "Jane Doe",
                "email": "jane@example.com",
                "company": null,
                "phone": "555 0100",
                "notes": null,
                "created_at": "2024-03-01T12:00:00Z",
                "updated_at": "2024-03-02T08:30:00Z",
            })
        );
    }

    #[test]
    fn test_client_resource_hides_owner() {
        let value = serde_json::to_value(ClientResource::from(client())).unwrap();
        assert!(value.get("owner_account_id").is_none());
    }

    #[test]
    fn test_list_resource_carries_pagination() {
        let page = ClientPage {
            clients: vec![client()],
            total: 41,
            pagination: Pagination::new(Some(2), Some(20)),
        };
        let value = serde_json::to_value(ClientListResource::from(page)).unwrap();
        assert_eq!(value["page"], 2);
        assert_eq!(value["per_page"], 20);
        assert_eq!(value["total"], 41);
        assert_eq!(value["data"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_plan_resource_limits() {
        let plan = SubscriptionPlan {
            id: Uuid::new_v4(),
            name: "Agency".to_string(),
            slug: "agency".to_string(),
            price_cents: 2900,
            currency: "usd".to_string(),
            privileges: PlanPrivileges {
                max_clients: Some(-1),
                max_charges_per_month: Some(200),
                ..Default::default()
            },
            active: true,
            created_at: datetime!(2024-01-01 0:00 UTC),
            updated_at: datetime!(2024-01-01 0:00 UTC),
        };
        let value = serde_json::to_value(PlanResource::from(plan)).unwrap();
        assert_eq!(value["client_limit"], serde_json::Value::Null);
        assert_eq!(value["monthly_charge_limit"], 200);
        assert_eq!(value["privileges"]["reports_access"], "none");
    }
}
