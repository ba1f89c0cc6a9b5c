//! Per-participant availability grid.
//!
//! A grid covers one (event, participant) pair: one row per day of the event
//! and 96 fifteen-minute intervals per row. Each cell holds the set of
//! identities that have reserved the slot; an empty cell is free. The stored
//! form is a day-major JSON array of interval arrays of sorted identity
//! arrays and carries no shape header, so deserialization always validates
//! against the expected day count supplied by the caller.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::errors::{MeetgridError, MeetgridResult};

/// A day is divided into 15-minute slots.
pub const INTERVALS_PER_DAY: usize = 96;

/// Slot width in minutes.
pub const INTERVAL_MINUTES: u32 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityGrid {
    days: usize,
    cells: Vec<BTreeSet<String>>,
}

impl AvailabilityGrid {
    /// Creates an all-free grid spanning `start_date..=end_date`.
    pub fn create(start_date: NaiveDate, end_date: NaiveDate) -> MeetgridResult<Self> {
        let days = day_span(start_date, end_date)?;
        Ok(Self {
            days,
            cells: vec![BTreeSet::new(); days * INTERVALS_PER_DAY],
        })
    }

    /// Number of day rows in this grid.
    pub fn days(&self) -> usize {
        self.days
    }

    fn cell_index(&self, day_idx: usize, timeslot_idx: usize) -> MeetgridResult<usize> {
        if day_idx >= self.days || timeslot_idx >= INTERVALS_PER_DAY {
            return Err(MeetgridError::OutOfBounds {
                day_idx,
                timeslot_idx,
                days: self.days,
                intervals: INTERVALS_PER_DAY,
            });
        }
        Ok(day_idx * INTERVALS_PER_DAY + timeslot_idx)
    }

    /// Returns the identities occupying the cell.
    pub fn get(&self, day_idx: usize, timeslot_idx: usize) -> MeetgridResult<&BTreeSet<String>> {
        let idx = self.cell_index(day_idx, timeslot_idx)?;
        Ok(&self.cells[idx])
    }

    /// A cell with no claimants is free.
    pub fn is_free(&self, day_idx: usize, timeslot_idx: usize) -> MeetgridResult<bool> {
        Ok(self.get(day_idx, timeslot_idx)?.is_empty())
    }

    /// Adds `identity` to the cell. Idempotent; returns whether the identity
    /// was newly inserted.
    pub fn mark_occupied(
        &mut self,
        day_idx: usize,
        timeslot_idx: usize,
        identity: &str,
    ) -> MeetgridResult<bool> {
        let idx = self.cell_index(day_idx, timeslot_idx)?;
        Ok(self.cells[idx].insert(identity.to_string()))
    }

    /// Removes `identity` from the cell (booking cancellation). Returns
    /// whether the identity was present.
    pub fn clear(
        &mut self,
        day_idx: usize,
        timeslot_idx: usize,
        identity: &str,
    ) -> MeetgridResult<bool> {
        let idx = self.cell_index(day_idx, timeslot_idx)?;
        Ok(self.cells[idx].remove(identity))
    }

    /// Serializes to the day-major JSON representation.
    pub fn serialize(&self) -> String {
        let rows: Vec<Vec<Vec<&String>>> = (0..self.days)
            .map(|d| {
                (0..INTERVALS_PER_DAY)
                    .map(|t| self.cells[d * INTERVALS_PER_DAY + t].iter().collect())
                    .collect()
            })
            .collect();
        serde_json::to_string(&rows).expect("nested string arrays always serialize")
    }

    /// Parses a serialized grid, validating the shape against
    /// `expected_days`. The blob carries no shape header, so a mismatch is
    /// corruption, never padded or truncated.
    pub fn deserialize(blob: &str, expected_days: usize) -> MeetgridResult<Self> {
        let rows: Vec<Vec<Vec<String>>> = serde_json::from_str(blob)
            .map_err(|e| MeetgridError::CorruptGrid(format!("malformed grid blob: {e}")))?;

        if rows.len() != expected_days {
            return Err(MeetgridError::CorruptGrid(format!(
                "expected {expected_days} day rows, found {}",
                rows.len()
            )));
        }

        let mut cells = Vec::with_capacity(expected_days * INTERVALS_PER_DAY);
        for (day_idx, row) in rows.into_iter().enumerate() {
            if row.len() != INTERVALS_PER_DAY {
                return Err(MeetgridError::CorruptGrid(format!(
                    "day {day_idx} has {} intervals, expected {INTERVALS_PER_DAY}",
                    row.len()
                )));
            }
            cells.extend(row.into_iter().map(BTreeSet::from_iter));
        }

        Ok(Self {
            days: expected_days,
            cells,
        })
    }
}

/// Inclusive day count of an event date range.
pub fn day_span(start_date: NaiveDate, end_date: NaiveDate) -> MeetgridResult<usize> {
    if end_date < start_date {
        return Err(MeetgridError::InvalidRange {
            start: start_date,
            end: end_date,
        });
    }
    Ok((end_date - start_date).num_days() as usize + 1)
}
