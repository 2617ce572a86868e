//! Clear-history queries

use chrono::{DateTime, Utc};
use raidledger_domain::traits::ClearHistoryStore;
use raidledger_domain::{
    build_clear_order, sort_roster, Clear, ClearOrderBucket, ClearRate, Encounter, EncounterId,
    Job, Member, MemberId,
};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::{BTreeMap, BTreeSet};

use crate::{conversion_error, from_millis, to_millis, SqliteStore, StoreError};

const CLEAR_COLUMNS: &str =
    "c.member_id, c.encounter_id, c.start_time, c.report_id, c.report_fight_id, c.job, c.locked_in";

impl SqliteStore {
    fn row_to_clear(row: &Row<'_>) -> rusqlite::Result<Clear> {
        let start_ms: i64 = row.get(2)?;
        let start_time = from_millis(start_ms).map_err(|e| conversion_error(2, e))?;
        Ok(Clear {
            member_id: MemberId(row.get::<_, i64>(0)? as u64),
            encounter_id: EncounterId(row.get(1)?),
            start_time,
            report_id: row.get(3)?,
            report_fight_id: row.get(4)?,
            job: Job(row.get(5)?),
            locked_in: row.get(6)?,
        })
    }

    fn ensure_encounter_name(&self, encounter_name: &str) -> Result<(), StoreError> {
        let known = self
            .conn
            .query_row(
                "SELECT 1 FROM encounters WHERE name = ?1 LIMIT 1",
                params![encounter_name],
                |_| Ok(()),
            )
            .optional()?;
        known.ok_or_else(|| StoreError::NotFound(format!("Encounter: {}", encounter_name)))
    }

    fn eligible_members(&self) -> Result<u64, StoreError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM members", [], |row| row.get(0))?;
        Ok(n as u64)
    }

    /// Replace the roster and record clears in one transaction
    ///
    /// An empty roster leaves the stored snapshot untouched. Nothing is
    /// written when any clear names an unregistered encounter.
    pub fn ingest(&mut self, roster: &[Member], clears: &[Clear]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        check_encounters(&tx, clears)?;
        if !roster.is_empty() {
            write_roster(&tx, roster)?;
        }
        let inserted = write_clears(&tx, clears)?;
        tx.commit()?;
        tracing::info!(
            members = roster.len(),
            received = clears.len(),
            inserted,
            "ingested roster and clears"
        );
        Ok(inserted)
    }

    /// Look up a roster member by exact name
    pub fn member_by_name(&self, name: &str) -> Result<Option<Member>, StoreError> {
        let member = self
            .conn
            .query_row(
                "SELECT member_id, name, rank FROM members WHERE name = ?1",
                params![name],
                |row| Ok(Member::new(row.get::<_, i64>(0)? as u64, row.get::<_, String>(1)?, row.get(2)?)),
            )
            .optional()?;
        Ok(member)
    }
}

/// Reject a batch naming encounters that are not registered
fn check_encounters(conn: &Connection, clears: &[Clear]) -> Result<(), StoreError> {
    let wanted: BTreeSet<&str> = clears.iter().map(|c| c.encounter_id.as_str()).collect();
    let mut stmt = conn.prepare("SELECT 1 FROM encounters WHERE encounter_id = ?1")?;
    let mut unknown = Vec::new();
    for id in wanted {
        if !stmt.exists(params![id])? {
            unknown.push(id);
        }
    }
    if unknown.is_empty() {
        Ok(())
    } else {
        tracing::warn!(encounters = ?unknown, "clear batch names unknown encounters");
        Err(StoreError::InvalidData(format!(
            "Unknown encounter(s): {}",
            unknown.join(", ")
        )))
    }
}

fn write_roster(conn: &Connection, members: &[Member]) -> Result<(), StoreError> {
    conn.execute("DELETE FROM members", [])?;
    for m in members {
        conn.execute(
            "INSERT INTO members (member_id, name, rank) VALUES (?1, ?2, ?3)",
            params![m.id.value() as i64, &m.name, m.rank],
        )?;
    }
    Ok(())
}

fn write_clears(conn: &Connection, clears: &[Clear]) -> Result<usize, StoreError> {
    let mut inserted = 0;
    for c in clears {
        inserted += conn.execute(
            "INSERT OR IGNORE INTO clears
             (member_id, encounter_id, start_time, report_id, report_fight_id, job, locked_in)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                c.member_id.value() as i64,
                c.encounter_id.as_str(),
                to_millis(c.start_time),
                &c.report_id,
                c.report_fight_id,
                &c.job.0,
                c.locked_in,
            ],
        )?;
    }
    Ok(inserted)
}

impl ClearHistoryStore for SqliteStore {
    type Error = StoreError;

    fn register_encounters(&mut self, encounters: &[Encounter]) -> Result<(), Self::Error> {
        let tx = self.conn.transaction()?;
        for e in encounters {
            tx.execute(
                "INSERT INTO encounters (encounter_id, name, boss_id, difficulty_id, partition_id, is_echo)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(encounter_id) DO UPDATE SET
                 name = excluded.name, boss_id = excluded.boss_id, difficulty_id = excluded.difficulty_id,
                 partition_id = excluded.partition_id, is_echo = excluded.is_echo",
                params![e.id.as_str(), &e.name, e.boss_id, e.difficulty_id, e.partition_id, e.is_echo],
            )?;
        }
        tx.commit()?;
        tracing::debug!(count = encounters.len(), "registered encounters");
        Ok(())
    }

    fn replace_roster(&mut self, members: &[Member]) -> Result<(), Self::Error> {
        let tx = self.conn.transaction()?;
        write_roster(&tx, members)?;
        tx.commit()?;
        tracing::info!(members = members.len(), "roster snapshot replaced");
        Ok(())
    }

    fn roster(&self) -> Result<Vec<Member>, Self::Error> {
        let mut stmt = self.conn.prepare("SELECT member_id, name, rank FROM members")?;
        let mut members = stmt
            .query_map([], |row| {
                Ok(Member::new(row.get::<_, i64>(0)? as u64, row.get::<_, String>(1)?, row.get(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        sort_roster(&mut members);
        Ok(members)
    }

    fn record_clears(&mut self, clears: &[Clear]) -> Result<usize, Self::Error> {
        let tx = self.conn.transaction()?;
        check_encounters(&tx, clears)?;
        let inserted = write_clears(&tx, clears)?;
        tx.commit()?;
        tracing::info!(received = clears.len(), inserted, "recorded clears");
        Ok(inserted)
    }

    fn clear_rate(&self, encounter_name: &str, include_echo: bool) -> Result<ClearRate, Self::Error> {
        self.ensure_encounter_name(encounter_name)?;
        let clears: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT c.member_id)
             FROM clears c
             JOIN encounters e ON e.encounter_id = c.encounter_id
             JOIN members m ON m.member_id = c.member_id
             WHERE e.name = ?1 AND (?2 OR e.is_echo = 0)",
            params![encounter_name, include_echo],
            |row| row.get(0),
        )?;
        Ok(ClearRate::new(clears as u64, self.eligible_members()?))
    }

    fn clear_rates(&self, include_echo: bool) -> Result<BTreeMap<String, ClearRate>, Self::Error> {
        let eligible = self.eligible_members()?;
        let mut stmt = self.conn.prepare(
            "SELECT e.name, COUNT(DISTINCT m.member_id)
             FROM encounters e
             LEFT JOIN clears c ON c.encounter_id = e.encounter_id AND (?1 OR e.is_echo = 0)
             LEFT JOIN members m ON m.member_id = c.member_id
             GROUP BY e.name",
        )?;
        let rates = stmt
            .query_map(params![include_echo], |row| {
                let name: String = row.get(0)?;
                let clears: i64 = row.get(1)?;
                Ok((name, ClearRate::new(clears as u64, eligible)))
            })?
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(rates)
    }

    fn clear_order(
        &self,
        include_echo: bool,
    ) -> Result<BTreeMap<String, Vec<ClearOrderBucket>>, Self::Error> {
        let sql = format!(
            "SELECT {CLEAR_COLUMNS}, e.name
             FROM clears c
             JOIN encounters e ON e.encounter_id = c.encounter_id
             WHERE (?1 OR e.is_echo = 0)
             ORDER BY c.start_time"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![include_echo], |row| {
                let clear = Self::row_to_clear(row)?;
                let name: String = row.get(7)?;
                Ok((name, clear))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut by_name: BTreeMap<String, Vec<Clear>> = BTreeMap::new();
        for (name, clear) in rows {
            by_name.entry(name).or_default().push(clear);
        }

        Ok(by_name
            .into_iter()
            .map(|(name, clears)| (name, build_clear_order(&clears)))
            .collect())
    }

    fn clear_order_for(
        &self,
        encounter_name: &str,
        include_echo: bool,
    ) -> Result<Vec<ClearOrderBucket>, Self::Error> {
        self.ensure_encounter_name(encounter_name)?;
        let sql = format!(
            "SELECT {CLEAR_COLUMNS}
             FROM clears c
             JOIN encounters e ON e.encounter_id = c.encounter_id
             WHERE e.name = ?1 AND (?2 OR e.is_echo = 0)"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let clears = stmt
            .query_map(params![encounter_name, include_echo], Self::row_to_clear)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(build_clear_order(&clears))
    }

    fn prior_clears(
        &self,
        member_ids: &[MemberId],
        encounter_ids: &[EncounterId],
        before: DateTime<Utc>,
    ) -> Result<Vec<Clear>, Self::Error> {
        if member_ids.is_empty() || encounter_ids.is_empty() {
            return Ok(Vec::new());
        }

        let member_marks = vec!["?"; member_ids.len()].join(", ");
        let encounter_marks = vec!["?"; encounter_ids.len()].join(", ");
        let sql = format!(
            "SELECT {CLEAR_COLUMNS}
             FROM clears c
             WHERE c.member_id IN ({member_marks})
               AND c.encounter_id IN ({encounter_marks})
               AND c.start_time < ?
             ORDER BY c.start_time"
        );

        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        for id in member_ids {
            params.push(Box::new(id.value() as i64));
        }
        for id in encounter_ids {
            params.push(Box::new(id.as_str().to_string()));
        }
        params.push(Box::new(to_millis(before)));

        let mut stmt = self.conn.prepare(&sql)?;
        let clears = stmt
            .query_map(params_from_iter(params.iter()), Self::row_to_clear)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(clears)
    }

    fn cleared_members(
        &self,
        encounter_name: &str,
        include_echo: bool,
    ) -> Result<BTreeSet<MemberId>, Self::Error> {
        self.ensure_encounter_name(encounter_name)?;
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT c.member_id
             FROM clears c
             JOIN encounters e ON e.encounter_id = c.encounter_id
             JOIN members m ON m.member_id = c.member_id
             WHERE e.name = ?1 AND (?2 OR e.is_echo = 0)",
        )?;
        let members = stmt
            .query_map(params![encounter_name, include_echo], |row| {
                Ok(MemberId(row.get::<_, i64>(0)? as u64))
            })?
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(members)
    }

    fn uncleared_members(
        &self,
        encounter_name: &str,
        include_echo: bool,
    ) -> Result<Vec<Member>, Self::Error> {
        let cleared = self.cleared_members(encounter_name, include_echo)?;
        Ok(self
            .roster()?
            .into_iter()
            .filter(|m| !cleared.contains(&m.id))
            .collect())
    }

    fn cleared_jobs(
        &self,
        include_echo: bool,
    ) -> Result<BTreeMap<String, BTreeSet<(MemberId, Job)>>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT e.name, c.member_id, c.job
             FROM clears c
             JOIN encounters e ON e.encounter_id = c.encounter_id
             JOIN members m ON m.member_id = c.member_id
             WHERE (?1 OR e.is_echo = 0)",
        )?;
        let rows = stmt
            .query_map(params![include_echo], |row| {
                let name: String = row.get(0)?;
                let member = MemberId(row.get::<_, i64>(1)? as u64);
                let job = Job(row.get(2)?);
                Ok((name, member, job))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut jobs: BTreeMap<String, BTreeSet<(MemberId, Job)>> = BTreeMap::new();
        for (name, member, job) in rows {
            jobs.entry(name).or_default().insert((member, job));
        }
        Ok(jobs)
    }
}
