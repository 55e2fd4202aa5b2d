use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;

use crate::kernel::BaseOrderRepository;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Rejected,
    Paid,
    Shipped,
    Delivered,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Confirmed => write!(f, "CONFIRMED"),
            OrderStatus::Rejected => write!(f, "REJECTED"),
            OrderStatus::Paid => write!(f, "PAID"),
            OrderStatus::Shipped => write!(f, "SHIPPED"),
            OrderStatus::Delivered => write!(f, "DELIVERED"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            "REJECTED" => Ok(OrderStatus::Rejected),
            "PAID" => Ok(OrderStatus::Paid),
            "SHIPPED" => Ok(OrderStatus::Shipped),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            _ => Err(anyhow::anyhow!("Invalid order status: {}", s)),
        }
    }
}

/// One ordered product
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: i32,
    pub quantity: i32,
}

/// Order as stored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i32,
    pub customer_name: String,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub points_redeemed: i32,
    pub points_earned: i32,
    pub items: Vec<OrderItem>,
}

/// Order to be inserted; the id is assigned by the database
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer_name: String,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub points_redeemed: i32,
    pub items: Vec<OrderItem>,
}

/// Row shape of the `orders` table
#[derive(sqlx::FromRow, Debug)]
struct OrderRecord {
    id: i32,
    customer_name: String,
    status: String,
    total_amount: f64,
    points_redeemed: i32,
    points_earned: i32,
}

#[derive(sqlx::FromRow, Debug)]
struct OrderItemRecord {
    order_id: i32,
    product_id: i32,
    quantity: i32,
}

const ORDER_COLUMNS: &str =
    "id, customer_name, status, total_amount, points_redeemed, points_earned";

impl Order {
    fn from_record(record: OrderRecord, items: Vec<OrderItem>) -> Result<Self> {
        Ok(Self {
            id: record.id,
            customer_name: record.customer_name,
            status: record.status.parse()?,
            total_amount: record.total_amount,
            points_redeemed: record.points_redeemed,
            points_earned: record.points_earned,
            items,
        })
    }

    /// Find order by ID, with its line items
    pub async fn find_by_id(id: i32, pool: &PgPool) -> Result<Option<Self>> {
        let record = sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        match record {
            Some(record) => Ok(Self::with_items(vec![record], pool).await?.pop()),
            None => Ok(None),
        }
    }

    /// Find all orders, newest first
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        let records = sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY id DESC"
        ))
        .fetch_all(pool)
        .await?;

        Self::with_items(records, pool).await
    }

    /// Find a customer's orders, newest first
    pub async fn find_by_customer(customer_name: &str, pool: &PgPool) -> Result<Vec<Self>> {
        let records = sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_name = $1 ORDER BY id DESC"
        ))
        .bind(customer_name)
        .fetch_all(pool)
        .await?;

        Self::with_items(records, pool).await
    }

    /// Insert order and items in one transaction
    pub async fn insert(order: &NewOrder, pool: &PgPool) -> Result<Self> {
        let mut tx = pool.begin().await?;

        let record = sqlx::query_as::<_, OrderRecord>(&format!(
            "INSERT INTO orders (customer_name, status, total_amount, points_redeemed, points_earned)
             VALUES ($1, $2, $3, $4, 0)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(&order.customer_name)
        .bind(order.status.to_string())
        .bind(order.total_amount)
        .bind(order.points_redeemed)
        .fetch_one(&mut *tx)
        .await?;

        for item in &order.items {
            sqlx::query("INSERT INTO order_items (order_id, product_id, quantity) VALUES ($1, $2, $3)")
                .bind(record.id)
                .bind(item.product_id)
                .bind(item.quantity)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Self::from_record(record, order.items.clone())
    }

    /// Update order status; false when the order does not exist
    pub async fn update_status(id: i32, status: OrderStatus, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.to_string())
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Compare-and-set status change; false when the order is not in `from`
    pub async fn transition_status(
        id: i32,
        from: OrderStatus,
        to: OrderStatus,
        pool: &PgPool,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE orders SET status = $3 WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(from.to_string())
            .bind(to.to_string())
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn with_items(records: Vec<OrderRecord>, pool: &PgPool) -> Result<Vec<Self>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = records.iter().map(|r| r.id).collect();
        let item_records = sqlx::query_as::<_, OrderItemRecord>(
            "SELECT order_id, product_id, quantity FROM order_items
             WHERE order_id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;

        let mut items: HashMap<i32, Vec<OrderItem>> = HashMap::new();
        for item in item_records {
            items.entry(item.order_id).or_default().push(OrderItem {
                product_id: item.product_id,
                quantity: item.quantity,
            });
        }

        records
            .into_iter()
            .map(|record| {
                let order_items = items.remove(&record.id).unwrap_or_default();
                Self::from_record(record, order_items)
            })
            .collect()
    }
}

/// Postgres-backed order repository
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseOrderRepository for PostgresOrderRepository {
    async fn create(&self, order: NewOrder) -> Result<Order> {
        Order::insert(&order, &self.pool).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Order>> {
        Order::find_by_id(id, &self.pool).await
    }

    async fn find_all(&self) -> Result<Vec<Order>> {
        Order::find_all(&self.pool).await
    }

    async fn find_by_customer(&self, customer_name: &str) -> Result<Vec<Order>> {
        Order::find_by_customer(customer_name, &self.pool).await
    }

    async fn update_status(&self, id: i32, status: OrderStatus) -> Result<bool> {
        Order::update_status(id, status, &self.pool).await
    }

    async fn transition_status(&self, id: i32, from: OrderStatus, to: OrderStatus) -> Result<bool> {
        Order::transition_status(id, from, to, &self.pool).await
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
