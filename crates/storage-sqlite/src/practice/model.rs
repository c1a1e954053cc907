//! Database models for practice facts.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use mindquest_core::practice::{EntryKind, FinancialEntry, SessionRecord, SessionStatus};

use crate::errors::StorageError;
use crate::utils::parse_decimal;

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::therapy_sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SessionRecordDB {
    pub id: String,
    pub therapist_id: String,
    pub patient_id: String,
    pub scheduled_at: NaiveDateTime,
    pub status: String,
    pub price: Option<String>,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::financial_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FinancialEntryDB {
    pub id: String,
    pub therapist_id: String,
    pub kind: String,
    pub amount: String,
    pub occurred_at: NaiveDateTime,
}

impl From<&SessionRecord> for SessionRecordDB {
    fn from(domain: &SessionRecord) -> Self {
        Self {
            id: domain.id.clone(),
            therapist_id: domain.therapist_id.clone(),
            patient_id: domain.patient_id.clone(),
            scheduled_at: domain.scheduled_at.naive_utc(),
            status: domain.status.as_str().to_string(),
            price: domain.price.map(|p| p.to_string()),
        }
    }
}

impl TryFrom<SessionRecordDB> for SessionRecord {
    type Error = StorageError;

    fn try_from(db: SessionRecordDB) -> Result<Self, StorageError> {
        let status = SessionStatus::parse(&db.status).ok_or_else(|| {
            StorageError::InvalidValue(format!("unknown session status '{}'", db.status))
        })?;
        let price = db
            .price
            .as_deref()
            .map(|p| parse_decimal("therapy_sessions.price", p))
            .transpose()?;
        Ok(Self {
            id: db.id,
            therapist_id: db.therapist_id,
            patient_id: db.patient_id,
            scheduled_at: db.scheduled_at.and_utc(),
            status,
            price,
        })
    }
}

impl From<&FinancialEntry> for FinancialEntryDB {
    fn from(domain: &FinancialEntry) -> Self {
        Self {
            id: domain.id.clone(),
            therapist_id: domain.therapist_id.clone(),
            kind: domain.kind.as_str().to_string(),
            amount: domain.amount.to_string(),
            occurred_at: domain.occurred_at.naive_utc(),
        }
    }
}

impl TryFrom<FinancialEntryDB> for FinancialEntry {
    type Error = StorageError;

    fn try_from(db: FinancialEntryDB) -> Result<Self, StorageError> {
        let kind = EntryKind::parse(&db.kind).ok_or_else(|| {
            StorageError::InvalidValue(format!("unknown ledger entry kind '{}'", db.kind))
        })?;
        Ok(Self {
            amount: parse_decimal("financial_entries.amount", &db.amount)?,
            id: db.id,
            therapist_id: db.therapist_id,
            kind,
            occurred_at: db.occurred_at.and_utc(),
        })
    }
}
