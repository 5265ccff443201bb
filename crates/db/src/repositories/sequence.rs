//! Entry number allocation.
//!
//! Numbers are allocated from a per-prefix counter row locked `FOR UPDATE`
//! inside the caller's transaction: concurrent allocations for the same
//! prefix serialize on the lock, and a rolled-back transaction rolls back
//! its increment, so the sequence stays gap-free.

use chrono::Utc;
use neraca_core::ledger::{format_entry_number, LedgerError};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, DatabaseTransaction, DbErr, EntityTrait, QuerySelect, Set,
};

use super::{is_transient_db_err, PostingError};
use crate::entities::entry_sequences;

/// Allocates monotonic, gap-free entry numbers per prefix.
pub struct SequenceGenerator;

impl SequenceGenerator {
    /// Allocates the next entry number for a prefix.
    ///
    /// Must be called inside the transaction that persists the entry; the
    /// allocated number is only consumed when that transaction commits.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::SequenceContention`] when the counter row lock
    /// cannot be obtained; callers retry with backoff.
    pub async fn next_entry_number(
        txn: &DatabaseTransaction,
        prefix: &str,
    ) -> Result<String, PostingError> {
        let now = Utc::now();

        // Known prefixes are seeded by the migration; create unknown ones on
        // demand so custom prefixes (tests, future source types) just work.
        let seed = entry_sequences::ActiveModel {
            prefix: Set(prefix.to_string()),
            next_number: Set(1),
            updated_at: Set(now.into()),
        };
        match entry_sequences::Entity::insert(seed)
            .on_conflict(
                OnConflict::column(entry_sequences::Column::Prefix)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(txn)
            .await
        {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(err) => return Err(Self::map_lock_err(err, prefix)),
        }

        let row = entry_sequences::Entity::find_by_id(prefix)
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(|err| Self::map_lock_err(err, prefix))?
            .ok_or_else(|| LedgerError::SequenceContention {
                prefix: prefix.to_string(),
            })?;

        let number = row.next_number;
        let mut active: entry_sequences::ActiveModel = row.into();
        active.next_number = Set(number + 1);
        active.updated_at = Set(now.into());
        active.update(txn).await?;

        Ok(format_entry_number(prefix, number))
    }

    fn map_lock_err(err: DbErr, prefix: &str) -> PostingError {
        if is_transient_db_err(&err) {
            LedgerError::SequenceContention {
                prefix: prefix.to_string(),
            }
            .into()
        } else {
            err.into()
        }
    }
}
