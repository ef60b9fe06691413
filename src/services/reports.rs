//! Reporting service for the admin console

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::transaction::TransactionDetails,
    repository::Repository,
};

const RECENT_ACTIVITY_LIMIT: i64 = 5;

/// Admin dashboard: system-wide counters plus the latest activity
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminDashboard {
    pub total_users: i64,
    pub total_books: i64,
    pub books_issued: i64,
    pub overdue_loans: i64,
    pub recent_transactions: Vec<TransactionDetails>,
}

/// Sales report: every completed purchase and the revenue total
#[derive(Debug, Serialize, ToSchema)]
pub struct SalesReport {
    pub sales: Vec<TransactionDetails>,
    pub total_revenue: f64,
}

#[derive(Clone)]
pub struct ReportsService {
    repository: Repository,
}

impl ReportsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn admin_dashboard(&self) -> AppResult<AdminDashboard> {
        let total_users = self.repository.users.count_non_admin().await?;
        let total_books = self.repository.books.count().await?;
        let books_issued = self.repository.transactions.count_issued().await?;
        let overdue_loans = self.repository.transactions.count_overdue().await?;
        let recent_transactions = self.repository.transactions.recent(RECENT_ACTIVITY_LIMIT).await?;

        Ok(AdminDashboard {
            total_users,
            total_books,
            books_issued,
            overdue_loans,
            recent_transactions,
        })
    }

    pub async fn sales_report(&self) -> AppResult<SalesReport> {
        let sales = self.repository.transactions.sales().await?;
        let total_revenue = self.repository.transactions.sales_total().await?;

        Ok(SalesReport {
            sales,
            total_revenue,
        })
    }
}
