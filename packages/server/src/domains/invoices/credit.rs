//! Customer credit standing, derived from invoice history.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::models::Invoice;
use crate::common::DataAccessError;
use crate::kernel::BaseInvoiceRepository;

/// Maximum total of unpaid invoices a customer may carry
pub const CREDIT_LIMIT: f64 = 500.0;

/// Sum of unpaid invoice amounts
pub fn outstanding_balance(invoices: &[Invoice]) -> f64 {
    invoices.iter().filter(|i| !i.paid).map(|i| i.amount).sum()
}

/// An invoice due today is not overdue yet.
pub fn has_overdue(invoices: &[Invoice], today: NaiveDate) -> bool {
    invoices.iter().any(|i| !i.paid && i.due_date < today)
}

/// Both credit checks for one customer
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreditStanding {
    pub customer_name: String,
    pub within_credit_limit: bool,
    pub no_overdue_invoices: bool,
}

#[derive(Clone)]
pub struct CreditEvaluator {
    invoices: Arc<dyn BaseInvoiceRepository>,
}

impl CreditEvaluator {
    pub fn new(invoices: Arc<dyn BaseInvoiceRepository>) -> Self {
        Self { invoices }
    }

    /// True iff the customer's unpaid invoices total at most [`CREDIT_LIMIT`].
    pub async fn check_credit_limit(&self, customer_name: &str) -> Result<bool, DataAccessError> {
        let invoices = self.load(customer_name).await?;
        let balance = outstanding_balance(&invoices);
        debug!(customer = %customer_name, balance, "credit limit check");
        Ok(balance <= CREDIT_LIMIT)
    }

    /// True iff no unpaid invoice is past due.
    pub async fn check_overdue_invoices(&self, customer_name: &str) -> Result<bool, DataAccessError> {
        self.check_overdue_invoices_on(customer_name, Utc::now().date_naive())
            .await
    }

    pub async fn check_overdue_invoices_on(
        &self,
        customer_name: &str,
        today: NaiveDate,
    ) -> Result<bool, DataAccessError> {
        let invoices = self.load(customer_name).await?;
        Ok(!has_overdue(&invoices, today))
    }

    pub async fn standing(&self, customer_name: &str) -> Result<CreditStanding, DataAccessError> {
        let invoices = self.load(customer_name).await?;
        Ok(CreditStanding {
            customer_name: customer_name.to_string(),
            within_credit_limit: outstanding_balance(&invoices) <= CREDIT_LIMIT,
            no_overdue_invoices: !has_overdue(&invoices, Utc::now().date_naive()),
        })
    }

    async fn load(&self, customer_name: &str) -> Result<Vec<Invoice>, DataAccessError> {
        self.invoices
            .find_by_customer(customer_name)
            .await
            .map_err(DataAccessError::from)
    }
}
