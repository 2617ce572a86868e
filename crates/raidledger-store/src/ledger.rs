//! Ledger and submission persistence

use raidledger_domain::traits::{LedgerStore, SubmissionStore};
use raidledger_domain::{
    LeaderboardEntry, LedgerRecord, MemberId, QueueEntry, Submission, SubmissionId, TierId,
};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, TransactionBehavior};

use crate::{conversion_error, from_millis, to_millis, SqliteStore, StoreError};

/// Conditionally write a ledger record, returning the new version
fn write_ledger(conn: &Connection, record: &LedgerRecord) -> Result<u64, StoreError> {
    let one_time = serde_json::to_string(&record.one_time)?;
    let events = serde_json::to_string(&record.events)?;
    let member = record.member_id.value() as i64;
    let next = record.version + 1;

    if record.version == 0 {
        let inserted = conn.execute(
            "INSERT INTO ledgers (member_id, tier, total_points, one_time, events, version)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![member, record.tier.as_str(), record.total_points, one_time, events, next as i64],
        );
        return match inserted {
            Ok(_) => Ok(next),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(StoreError::Conflict(format!(
                    "Ledger {}/{} already exists",
                    record.member_id, record.tier
                )))
            }
            Err(e) => Err(e.into()),
        };
    }

    let updated = conn.execute(
        "UPDATE ledgers SET total_points = ?1, one_time = ?2, events = ?3, version = ?4
         WHERE member_id = ?5 AND tier = ?6 AND version = ?7",
        params![
            record.total_points,
            one_time,
            events,
            next as i64,
            member,
            record.tier.as_str(),
            record.version as i64,
        ],
    )?;
    if updated == 0 {
        return Err(StoreError::Conflict(format!(
            "Ledger {}/{} changed since version {}",
            record.member_id, record.tier, record.version
        )));
    }
    Ok(next)
}

fn write_submission(conn: &Connection, submission: &Submission) -> Result<(), StoreError> {
    let body = serde_json::to_string(submission)?;
    conn.execute(
        "INSERT INTO submissions (submission_id, ts, body) VALUES (?1, ?2, ?3)
         ON CONFLICT(submission_id) DO UPDATE SET body = excluded.body",
        params![submission.id.to_string(), to_millis(submission.ts), body],
    )?;
    Ok(())
}

impl LedgerStore for SqliteStore {
    type Error = StoreError;

    fn get_ledger(&self, member_id: MemberId, tier: &TierId) -> Result<Option<LedgerRecord>, Self::Error> {
        let row = self
            .conn
            .query_row(
                "SELECT total_points, one_time, events, version
                 FROM ledgers WHERE member_id = ?1 AND tier = ?2",
                params![member_id.value() as i64, tier.as_str()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((total_points, one_time, events, version)) = row else {
            return Ok(None);
        };

        Ok(Some(LedgerRecord {
            member_id,
            tier: tier.clone(),
            total_points,
            one_time: serde_json::from_str(&one_time)?,
            events: serde_json::from_str(&events)?,
            version: version as u64,
        }))
    }

    fn put_ledger(&mut self, record: &LedgerRecord) -> Result<u64, Self::Error> {
        let version = write_ledger(&self.conn, record)?;
        tracing::debug!(member = %record.member_id, tier = %record.tier, version, "ledger written");
        Ok(version)
    }

    fn leaderboard(&self, tier: &TierId) -> Result<Vec<LeaderboardEntry>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT member_id, total_points FROM ledgers
             WHERE tier = ?1
             ORDER BY total_points DESC, member_id ASC",
        )?;
        let entries = stmt
            .query_map(params![tier.as_str()], |row| {
                Ok(LeaderboardEntry {
                    member_id: MemberId(row.get::<_, i64>(0)? as u64),
                    tier: tier.clone(),
                    total_points: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

impl SubmissionStore for SqliteStore {
    type Error = StoreError;

    fn create_submission(&mut self, submission: &Submission) -> Result<(), Self::Error> {
        let tx = self.conn.transaction()?;
        let body = serde_json::to_string(submission)?;
        let inserted = tx.execute(
            "INSERT INTO submissions (submission_id, ts, body) VALUES (?1, ?2, ?3)",
            params![submission.id.to_string(), to_millis(submission.ts), body],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                return Err(StoreError::Conflict(format!(
                    "Submission {} already exists",
                    submission.id
                )));
            }
            Err(e) => return Err(e.into()),
        }
        if submission.is_open() {
            tx.execute(
                "INSERT INTO submission_queue (submission_id, ts) VALUES (?1, ?2)",
                params![submission.id.to_string(), to_millis(submission.ts)],
            )?;
        }
        tx.commit()?;

        tracing::info!(
            submission = %submission.id,
            events = submission.events.len(),
            "submission queued"
        );
        Ok(())
    }

    fn get_submission(&self, id: SubmissionId) -> Result<Option<Submission>, Self::Error> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM submissions WHERE submission_id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        body.map(|b| serde_json::from_str(&b).map_err(StoreError::from))
            .transpose()
    }

    fn pending_submissions(&self) -> Result<Vec<QueueEntry>, Self::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT submission_id, ts FROM submission_queue ORDER BY ts ASC, submission_id ASC")?;
        let entries = stmt
            .query_map([], |row| {
                let raw: String = row.get(0)?;
                let submission_id = raw.parse::<SubmissionId>().map_err(|e| {
                    conversion_error(0, StoreError::InvalidData(e.to_string()))
                })?;
                let ts = from_millis(row.get(1)?).map_err(|e| conversion_error(1, e))?;
                Ok(QueueEntry { submission_id, ts })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn commit_review(
        &mut self,
        ledgers: &[LedgerRecord],
        submission: &Submission,
    ) -> Result<(), Self::Error> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        for record in ledgers {
            write_ledger(&tx, record)?;
        }
        write_submission(&tx, submission)?;
        if !submission.is_open() {
            tx.execute(
                "DELETE FROM submission_queue WHERE submission_id = ?1",
                params![submission.id.to_string()],
            )?;
        }
        tx.commit()?;

        tracing::info!(
            submission = %submission.id,
            ledgers = ledgers.len(),
            closed = !submission.is_open(),
            "review committed"
        );
        Ok(())
    }
}
