//! Cross-participant availability merge.
//!
//! The merged view is pure: a participant is free at a cell exactly when
//! their own grid cell is empty, so recomputing from the same grids always
//! yields the same matrix regardless of input order. Callers recompute it on
//! every read instead of caching it.

use std::collections::BTreeSet;

use crate::errors::{MeetgridError, MeetgridResult};
use crate::grid::{AvailabilityGrid, INTERVALS_PER_DAY};

/// Read-only `days x 96` matrix of free participant identities per cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedAvailability {
    days: usize,
    cells: Vec<BTreeSet<String>>,
}

impl MergedAvailability {
    /// A merged view with no participants: every cell is an empty set.
    pub fn empty(days: usize) -> Self {
        Self {
            days,
            cells: vec![BTreeSet::new(); days * INTERVALS_PER_DAY],
        }
    }

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

    /// Participants free at the cell.
    pub fn free_at(
        &self,
        day_idx: usize,
        timeslot_idx: usize,
    ) -> MeetgridResult<&BTreeSet<String>> {
        let idx = self.cell_index(day_idx, timeslot_idx)?;
        Ok(&self.cells[idx])
    }

    /// Canonical "first match" choice for a cell: the lowest-ordered free
    /// identity. Deterministic where the original system depended on
    /// incidental iteration order.
    pub fn first_free(&self, day_idx: usize, timeslot_idx: usize) -> MeetgridResult<Option<&str>> {
        Ok(self
            .free_at(day_idx, timeslot_idx)?
            .iter()
            .next()
            .map(String::as_str))
    }

    /// Day-major nested representation for JSON responses.
    pub fn to_rows(&self) -> Vec<Vec<Vec<String>>> {
        (0..self.days)
            .map(|d| {
                (0..INTERVALS_PER_DAY)
                    .map(|t| {
                        self.cells[d * INTERVALS_PER_DAY + t]
                            .iter()
                            .cloned()
                            .collect()
                    })
                    .collect()
            })
            .collect()
    }
}

pub struct AvailabilityAggregator;

impl AvailabilityAggregator {
    /// Merges participant grids into one shared view. All grids for one
    /// event are the same shape by construction; a differing shape is a
    /// precondition violation, not something to correct here.
    pub fn merge(entries: &[(&str, &AvailabilityGrid)]) -> MeetgridResult<MergedAvailability> {
        let Some((_, first)) = entries.first() else {
            return Ok(MergedAvailability::empty(0));
        };

        let days = first.days();
        for (_, grid) in entries {
            if grid.days() != days {
                return Err(MeetgridError::ShapeMismatch {
                    expected_days: days,
                    actual_days: grid.days(),
                });
            }
        }

        let mut merged = MergedAvailability::empty(days);
        for (identity, grid) in entries {
            for day_idx in 0..days {
                for timeslot_idx in 0..INTERVALS_PER_DAY {
                    if grid.is_free(day_idx, timeslot_idx)? {
                        let idx = day_idx * INTERVALS_PER_DAY + timeslot_idx;
                        merged.cells[idx].insert((*identity).to_string());
                    }
                }
            }
        }

        Ok(merged)
    }
}
