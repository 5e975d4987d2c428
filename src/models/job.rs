//! Job registry.
//!
//! Job codes are user-facing strings; the constraint model works on dense
//! integer values. [`JobTable`] owns the two-way mapping. Value 0 is the
//! [`REST`] sentinel and is never allocated, so job ids start at 1 and are
//! handed out in first-seen order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Assignment value meaning "not working". Never allocated to a job.
pub const REST: i64 = 0;

/// Grid label for a REST slot.
pub const REST_LABEL: &str = "R";

/// Dense identifier of a registered job. Ids start at 1; 0 is [`REST`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(u32);

impl JobId {
    /// Assignment-variable value for this job.
    #[inline]
    pub fn value(self) -> i64 {
        i64::from(self.0)
    }

    /// Zero-based position in first-seen order.
    #[inline]
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

/// Two-way registry of job codes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobTable {
    ids: HashMap<String, JobId>,
    codes: Vec<String>,
}

impl JobTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `code`, registering it on first sight.
    pub fn intern(&mut self, code: &str) -> JobId {
        if let Some(&id) = self.ids.get(code) {
            return id;
        }
        let id = JobId(self.codes.len() as u32 + 1);
        self.ids.insert(code.to_string(), id);
        self.codes.push(code.to_string());
        id
    }

    /// Id of a registered code.
    pub fn id_of(&self, code: &str) -> Option<JobId> {
        self.ids.get(code).copied()
    }

    /// Code of a registered id.
    pub fn code_of(&self, id: JobId) -> Option<&str> {
        self.codes.get(id.index()).map(String::as_str)
    }

    /// Code for a raw assignment value, if it names a registered job.
    pub fn code_of_value(&self, value: i64) -> Option<&str> {
        if value < 1 {
            return None;
        }
        self.codes.get(value as usize - 1).map(String::as_str)
    }

    /// All ids, ascending (equals first-seen order).
    pub fn ids(&self) -> impl Iterator<Item = JobId> {
        (1..=self.codes.len() as u32).map(JobId)
    }

    /// All codes in first-seen order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    /// Number of registered jobs.
    #[inline]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether no job is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
