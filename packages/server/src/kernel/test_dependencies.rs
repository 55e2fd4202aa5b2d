// TestDependencies - mock implementations for testing
//
// In-memory repositories and recording fakes that plug into ServerDeps through
// the same Base* traits the production clients implement.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{
    BaseCatalogSync, BaseFulfillmentNotifier, BaseInvoiceRepository, BaseOrderRepository,
    BaseStockReservation, BaseTokenClient, CredentialError, ProductSnapshot, ServerDeps,
    TokenResponse,
};
use crate::domains::invoices::models::{Invoice, NewInvoice};
use crate::domains::orders::models::{NewOrder, Order, OrderStatus};

// =============================================================================
// Mock Token Client
// =============================================================================

/// Scripted token endpoint. Responses are served in order; the last one
/// repeats once the queue is down to it.
pub struct MockTokenClient {
    responses: Arc<Mutex<Vec<Result<TokenResponse, CredentialError>>>>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl MockTokenClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_token(self, token: &str, expires_in: u64) -> Self {
        self.responses.lock().unwrap().push(Ok(TokenResponse {
            access_token: token.to_string(),
            expires_in,
        }));
        self
    }

    pub fn with_error(self, error: CredentialError) -> Self {
        self.responses.lock().unwrap().push(Err(error));
        self
    }

    /// Simulate a slow identity provider
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BaseTokenClient for MockTokenClient {
    async fn request_token(&self) -> Result<TokenResponse, CredentialError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut responses = self.responses.lock().unwrap();
        match responses.len() {
            0 => Err(CredentialError::Transport(
                "no mock token configured".to_string(),
            )),
            1 => responses[0].clone(),
            _ => responses.remove(0),
        }
    }
}

// =============================================================================
// Mock Stock Reservation
// =============================================================================

/// Reserves everything unless told otherwise; records every call.
pub struct MockStockReservation {
    refusals: Arc<Mutex<HashSet<i32>>>,
    delays: Arc<Mutex<HashMap<i32, Duration>>>,
    reserve_calls: Arc<Mutex<Vec<(i32, i32)>>>,
    release_calls: Arc<Mutex<Vec<(i32, i32)>>>,
}

impl MockStockReservation {
    pub fn new() -> Self {
        Self {
            refusals: Arc::new(Mutex::new(HashSet::new())),
            delays: Arc::new(Mutex::new(HashMap::new())),
            reserve_calls: Arc::new(Mutex::new(Vec::new())),
            release_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Refuse reservations for this product
    pub fn with_refusal(self, product_id: i32) -> Self {
        self.refusals.lock().unwrap().insert(product_id);
        self
    }

    /// Delay reservations for this product
    pub fn with_delay(self, product_id: i32, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(product_id, delay);
        self
    }

    /// (product_id, quantity) of every reserve call, in call order
    pub fn reserve_calls(&self) -> Vec<(i32, i32)> {
        self.reserve_calls.lock().unwrap().clone()
    }

    pub fn release_calls(&self) -> Vec<(i32, i32)> {
        self.release_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseStockReservation for MockStockReservation {
    async fn reserve(&self, product_id: i32, quantity: i32) -> bool {
        self.reserve_calls
            .lock()
            .unwrap()
            .push((product_id, quantity));

        let delay = self.delays.lock().unwrap().get(&product_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        !self.refusals.lock().unwrap().contains(&product_id)
    }

    async fn release(&self, product_id: i32, quantity: i32) -> bool {
        self.release_calls
            .lock()
            .unwrap()
            .push((product_id, quantity));
        true
    }
}

// =============================================================================
// Mock Fulfillment Notifier
// =============================================================================

pub struct MockFulfillmentNotifier {
    calls: Arc<Mutex<Vec<i32>>>,
    succeed: bool,
}

impl MockFulfillmentNotifier {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            succeed: true,
        }
    }

    /// Report every notification as failed
    pub fn failing(mut self) -> Self {
        self.succeed = false;
        self
    }

    pub fn calls(&self) -> Vec<i32> {
        self.calls.lock().unwrap().clone()
    }

    /// Notifications run detached, so tests poll for them.
    pub async fn wait_for_calls(&self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.calls.lock().unwrap().len() >= count {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

#[async_trait]
impl BaseFulfillmentNotifier for MockFulfillmentNotifier {
    async fn notify_order_ready(&self, order_id: i32) -> bool {
        self.calls.lock().unwrap().push(order_id);
        self.succeed
    }
}

// =============================================================================
// Mock Catalog Sync
// =============================================================================

/// Accepts every product
pub struct MockCatalogSync;

impl MockCatalogSync {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BaseCatalogSync for MockCatalogSync {
    async fn sync_product(&self, _product: &ProductSnapshot) -> bool {
        true
    }
}

// =============================================================================
// In-memory repositories
// =============================================================================

fn unavailable() -> anyhow::Error {
    anyhow!("database unavailable")
}

pub struct InMemoryOrderRepository {
    orders: Arc<Mutex<Vec<Order>>>,
    fail: bool,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self {
            orders: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// Every operation fails as if the database were down
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Snapshot of every stored order, in insertion order
    pub fn all(&self) -> Vec<Order> {
        self.orders.lock().unwrap().clone()
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BaseOrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: NewOrder) -> Result<Order> {
        self.check()?;
        let mut orders = self.orders.lock().unwrap();
        let stored = Order {
            id: orders.len() as i32 + 1,
            customer_name: order.customer_name,
            status: order.status,
            total_amount: order.total_amount,
            points_redeemed: order.points_redeemed,
            points_earned: 0,
            items: order.items,
        };
        orders.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Order>> {
        self.check()?;
        Ok(self.orders.lock().unwrap().iter().find(|o| o.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Order>> {
        self.check()?;
        Ok(self.orders.lock().unwrap().iter().rev().cloned().collect())
    }

    async fn find_by_customer(&self, customer_name: &str) -> Result<Vec<Order>> {
        self.check()?;
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|o| o.customer_name == customer_name)
            .cloned()
            .collect())
    }

    async fn update_status(&self, id: i32, status: OrderStatus) -> Result<bool> {
        self.check()?;
        let mut orders = self.orders.lock().unwrap();
        match orders.iter_mut().find(|o| o.id == id) {
            Some(order) => {
                order.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn transition_status(&self, id: i32, from: OrderStatus, to: OrderStatus) -> Result<bool> {
        self.check()?;
        let mut orders = self.orders.lock().unwrap();
        match orders.iter_mut().find(|o| o.id == id && o.status == from) {
            Some(order) => {
                order.status = to;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<()> {
        self.check()
    }
}

pub struct InMemoryInvoiceRepository {
    invoices: Arc<Mutex<Vec<Invoice>>>,
    fail: bool,
}

impl InMemoryInvoiceRepository {
    pub fn new() -> Self {
        Self {
            invoices: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Seed an invoice as-is, keeping its id and paid flag
    pub fn insert_existing(&self, invoice: Invoice) {
        self.invoices.lock().unwrap().push(invoice);
    }

    pub fn all(&self) -> Vec<Invoice> {
        self.invoices.lock().unwrap().clone()
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BaseInvoiceRepository for InMemoryInvoiceRepository {
    async fn create(&self, invoice: NewInvoice) -> Result<Invoice> {
        self.check()?;
        let mut invoices = self.invoices.lock().unwrap();
        let id = invoices.iter().map(|i| i.id).max().unwrap_or(0) + 1;
        let stored = Invoice {
            id,
            order_id: invoice.order_id,
            customer_name: invoice.customer_name,
            amount: invoice.amount,
            due_date: invoice.due_date,
            paid: false,
        };
        invoices.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_customer(&self, customer_name: &str) -> Result<Vec<Invoice>> {
        self.check()?;
        Ok(self
            .invoices
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.customer_name == customer_name)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Invoice>> {
        self.check()?;
        Ok(self.invoices.lock().unwrap().iter().find(|i| i.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Invoice>> {
        self.check()?;
        Ok(self.invoices.lock().unwrap().iter().rev().cloned().collect())
    }

    async fn mark_paid(&self, id: i32) -> Result<bool> {
        self.check()?;
        let mut invoices = self.invoices.lock().unwrap();
        match invoices.iter_mut().find(|i| i.id == id) {
            Some(invoice) => {
                invoice.paid = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

#[derive(Clone)]
pub struct TestDependencies {
    pub orders: Arc<InMemoryOrderRepository>,
    pub invoices: Arc<InMemoryInvoiceRepository>,
    pub stock: Arc<MockStockReservation>,
    pub fulfillment: Arc<MockFulfillmentNotifier>,
    pub catalog: Arc<MockCatalogSync>,
    pub reservation_timeout: Duration,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            orders: Arc::new(InMemoryOrderRepository::new()),
            invoices: Arc::new(InMemoryInvoiceRepository::new()),
            stock: Arc::new(MockStockReservation::new()),
            fulfillment: Arc::new(MockFulfillmentNotifier::new()),
            catalog: Arc::new(MockCatalogSync::new()),
            reservation_timeout: Duration::from_secs(1),
        }
    }

    /// Set a mock stock reservation service
    pub fn mock_stock(mut self, stock: MockStockReservation) -> Self {
        self.stock = Arc::new(stock);
        self
    }

    /// Order writes and reads fail
    pub fn failing_orders(mut self) -> Self {
        self.orders = Arc::new(InMemoryOrderRepository::new().failing());
        self
    }

    /// Invoice lookups fail
    pub fn failing_invoices(mut self) -> Self {
        self.invoices = Arc::new(InMemoryInvoiceRepository::new().failing());
        self
    }

    /// Fulfillment notifications report failure
    pub fn failing_fulfillment(mut self) -> Self {
        self.fulfillment = Arc::new(MockFulfillmentNotifier::new().failing());
        self
    }

    pub fn reservation_timeout(mut self, timeout: Duration) -> Self {
        self.reservation_timeout = timeout;
        self
    }

    /// Build ServerDeps backed by these fakes
    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.orders.clone(),
            self.invoices.clone(),
            self.stock.clone(),
            self.fulfillment.clone(),
            self.catalog.clone(),
            self.reservation_timeout,
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
