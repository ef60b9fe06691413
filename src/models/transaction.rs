//! Transaction model: loans (borrow) and marketplace sales (purchase)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;

/// Transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Issued,
    Returned,
    Overdue,
    Lost,
    /// Sales only
    Completed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Issued => "issued",
            TransactionStatus::Returned => "returned",
            TransactionStatus::Overdue => "overdue",
            TransactionStatus::Lost => "lost",
            TransactionStatus::Completed => "completed",
        }
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "issued" => Ok(TransactionStatus::Issued),
            "returned" => Ok(TransactionStatus::Returned),
            "overdue" => Ok(TransactionStatus::Overdue),
            "lost" => Ok(TransactionStatus::Lost),
            "completed" => Ok(TransactionStatus::Completed),
            _ => Err(format!("Invalid transaction status: {}", s)),
        }
    }
}

/// Transaction type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Borrow,
    Purchase,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Borrow => "borrow",
            TransactionType::Purchase => "purchase",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "borrow" => Ok(TransactionType::Borrow),
            "purchase" => Ok(TransactionType::Purchase),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }
}

macro_rules! text_sqlx_impls {
    ($ty:ty) => {
        impl sqlx::Type<Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $ty {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s: String = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $ty {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> sqlx::encode::IsNull {
                <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
            }
        }
    };
}

text_sqlx_impls!(TransactionStatus);
text_sqlx_impls!(TransactionType);

/// Transaction model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Transaction {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub issued_date: DateTime<Utc>,
    /// Null for purchases
    pub due_date: Option<DateTime<Utc>>,
    /// Return date for loans; sold date for purchases
    pub return_date: Option<DateTime<Utc>>,
    pub status: TransactionStatus,
    pub fine_amount: f64,
    pub transaction_type: TransactionType,
    /// Cost of purchase (sales only)
    pub amount: f64,
}

/// Transaction joined with book title and borrower name for listings
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TransactionDetails {
    pub id: i32,
    pub user_id: i32,
    pub username: String,
    pub book_id: i32,
    pub book_title: String,
    pub issued_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: TransactionStatus,
    pub fine_amount: f64,
    pub transaction_type: TransactionType,
    pub amount: f64,
}

/// Fine for a late return: one daily_fine unit per whole day past the due
/// date. Partial days round down; on-time returns owe nothing.
pub fn fine_for(due_date: DateTime<Utc>, return_date: DateTime<Utc>, daily_fine: f64) -> f64 {
    if return_date <= due_date {
        return 0.0;
    }
    let overdue_days = (return_date - due_date).num_days();
    overdue_days as f64 * daily_fine
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn due() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn on_time_return_owes_nothing() {
        assert_eq!(fine_for(due(), due(), 1.0), 0.0);
        assert_eq!(fine_for(due(), due() - Duration::days(2), 1.0), 0.0);
    }

    #[test]
    fn three_days_late_owes_three() {
        assert_eq!(fine_for(due(), due() + Duration::days(3), 1.0), 3.0);
    }

    #[test]
    fn partial_days_round_down() {
        // 2 days and 20 hours late: charged for 2 days
        let returned = due() + Duration::days(2) + Duration::hours(20);
        assert_eq!(fine_for(due(), returned, 1.0), 2.0);
        // Less than a full day late: no fine yet
        assert_eq!(fine_for(due(), due() + Duration::hours(23), 1.0), 0.0);
    }

    #[test]
    fn fine_scales_with_daily_rate() {
        assert_eq!(fine_for(due(), due() + Duration::days(4), 0.5), 2.0);
    }

    #[test]
    fn status_round_trips_through_str() {
        for s in ["issued", "returned", "overdue", "lost", "completed"] {
            let parsed: TransactionStatus = s.parse().unwrap();
            assert_eq!(parsed.as_str(), s);
        }
        assert!("pending".parse::<TransactionStatus>().is_err());
    }
}
