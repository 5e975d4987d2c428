//! Job requirement parsing and demand bitmaps.
//!
//! A requirement line declares where a job must be staffed:
//!
//! ```text
//! A 09:00-12:00,14:00-17:00
//! ```
//!
//! Lines are parsed in order into per-job bitmaps over the horizon. Ranges
//! may overlap and repeat; demand is a set union, so re-declaring a covered
//! slot changes nothing.

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::models::job::{JobId, JobTable};
use crate::models::slot::{parse_time_range, Horizon};

/// Demanded (job, slot) pairs and their bitmaps over one horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandMap {
    jobs: JobTable,
    num_slots: usize,
    bitmaps: Vec<Vec<bool>>,
    demanded: Vec<(JobId, usize)>,
}

impl DemandMap {
    /// Parses requirement lines against a horizon.
    ///
    /// Blank lines and blank range entries are skipped. Each line is
    /// `<job code> <ranges>` with comma-separated `HH:MM-HH:MM` ranges;
    /// slots outside the horizon are ignored. Job ids are assigned in
    /// first-seen order, so a job whose ranges all fall outside the horizon
    /// is still registered.
    pub fn parse<S: AsRef<str>>(lines: &[S], horizon: &Horizon) -> Result<Self, ScheduleError> {
        let mut map = Self {
            jobs: JobTable::new(),
            num_slots: horizon.num_slots(),
            bitmaps: Vec::new(),
            demanded: Vec::new(),
        };

        for (line_index, raw) in lines.iter().enumerate() {
            let line = raw.as_ref().trim();
            if line.is_empty() {
                continue;
            }

            let Some((code, ranges)) = line.split_once(' ') else {
                return Err(ScheduleError::MalformedRequirement {
                    line: line_index + 1,
                    text: line.to_string(),
                });
            };

            let job = map.jobs.intern(code);
            if map.bitmaps.len() < map.jobs.len() {
                map.bitmaps.push(vec![false; map.num_slots]);
            }

            for (range_index, range) in ranges.split(',').enumerate() {
                let range = range.trim();
                if range.is_empty() {
                    continue;
                }
                let context = format!("range {} of job '{}'", range_index + 1, code);
                let (abs_start, abs_end) = parse_time_range(range, &context)?;
                if abs_end <= abs_start {
                    return Err(ScheduleError::EmptyRange {
                        context,
                        value: range.to_string(),
                    });
                }
                for abs_slot in abs_start..abs_end {
                    if let Some(rel_slot) = horizon.to_relative(abs_slot) {
                        map.mark(job, rel_slot);
                    }
                }
            }
        }

        Ok(map)
    }

    fn mark(&mut self, job: JobId, rel_slot: usize) {
        let bit = &mut self.bitmaps[job.index()][rel_slot];
        if !*bit {
            *bit = true;
            self.demanded.push((job, rel_slot));
        }
    }

    /// Job registry built up during parsing.
    #[inline]
    pub fn jobs(&self) -> &JobTable {
        &self.jobs
    }

    /// Whether `job` is demanded at a horizon-relative slot.
    #[inline]
    pub fn is_demanded(&self, job: JobId, rel_slot: usize) -> bool {
        self.bitmaps[job.index()][rel_slot]
    }

    /// Demanded (job, slot) pairs in first-set order.
    #[inline]
    pub fn demanded_pairs(&self) -> &[(JobId, usize)] {
        &self.demanded
    }

    /// Total number of demanded (job, slot) pairs.
    #[inline]
    pub fn total_demand(&self) -> usize {
        self.demanded.len()
    }
}
