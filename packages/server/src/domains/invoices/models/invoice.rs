use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::kernel::BaseInvoiceRepository;

/// Invoice for a billed order
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: i32,
    pub order_id: i32,
    pub customer_name: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub paid: bool,
}

/// Invoice to be inserted; always starts unpaid
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub order_id: i32,
    pub customer_name: String,
    pub amount: f64,
    pub due_date: NaiveDate,
}

impl Invoice {
    pub async fn find_by_id(id: i32, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT id, order_id, customer_name, amount, due_date, paid FROM invoices WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT id, order_id, customer_name, amount, due_date, paid FROM invoices ORDER BY id DESC",
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Every invoice of a customer, paid or not
    pub async fn find_by_customer(customer_name: &str, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT id, order_id, customer_name, amount, due_date, paid FROM invoices
             WHERE customer_name = $1 ORDER BY due_date",
        )
        .bind(customer_name)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn insert(invoice: &NewInvoice, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO invoices (order_id, customer_name, amount, due_date, paid)
             VALUES ($1, $2, $3, $4, false)
             RETURNING id, order_id, customer_name, amount, due_date, paid",
        )
        .bind(invoice.order_id)
        .bind(&invoice.customer_name)
        .bind(invoice.amount)
        .bind(invoice.due_date)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn mark_paid(id: i32, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("UPDATE invoices SET paid = true WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Postgres-backed invoice repository
#[derive(Clone)]
pub struct PostgresInvoiceRepository {
    pool: PgPool,
}

impl PostgresInvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseInvoiceRepository for PostgresInvoiceRepository {
    async fn create(&self, invoice: NewInvoice) -> Result<Invoice> {
        Invoice::insert(&invoice, &self.pool).await
    }

    async fn find_by_customer(&self, customer_name: &str) -> Result<Vec<Invoice>> {
        Invoice::find_by_customer(customer_name, &self.pool).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Invoice>> {
        Invoice::find_by_id(id, &self.pool).await
    }

    async fn find_all(&self) -> Result<Vec<Invoice>> {
        Invoice::find_all(&self.pool).await
    }

    async fn mark_paid(&self, id: i32) -> Result<bool> {
        Invoice::mark_paid(id, &self.pool).await
    }
}
