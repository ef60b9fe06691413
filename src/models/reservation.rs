//! Reservation model: a user's claim on a book awaiting issue

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;

/// Reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Placed while out of stock
    Pending,
    /// Placed while in stock, awaiting pickup
    Approved,
    /// Withdrawn by a librarian
    Cancelled,
    /// Converted to a loan by issuing
    Fulfilled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Approved => "approved",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Fulfilled => "fulfilled",
        }
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ReservationStatus::Pending),
            "approved" => Ok(ReservationStatus::Approved),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            "fulfilled" => Ok(ReservationStatus::Fulfilled),
            _ => Err(format!("Invalid reservation status: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for ReservationStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for ReservationStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for ReservationStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Reservation model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Reservation {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}

/// Reservation joined with book and user names for librarian listings
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ReservationDetails {
    pub id: i32,
    pub user_id: i32,
    pub username: String,
    pub book_id: i32,
    pub book_title: String,
    pub available_count: i32,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}
