// Copyright 2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::access::RawRecord;
use std::{
    collections::HashMap,
    path::Path,
};

/// Count repository evaluating the pipeline over records held in memory.
///
/// Records are visited in insertion order, so the first-seen `createdAt`
/// of a key and the output order are both deterministic.
#[derive(Clone, Debug, Default)]
pub struct MemoryRepository {
    records: Vec<RawRecord>,
}

impl MemoryRepository {
    #[allow(missing_docs)]
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    /// Load a JSON array of `{key, createdAt, counts}` records
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let records = serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(Self::new(records))
    }

    #[allow(missing_docs)]
    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    /// Window filter, unwind, group by key, then total filter
    pub fn aggregate(&self, query: &CountQuery) -> Vec<AggregatedRecord> {
        let mut groups: Vec<AggregatedRecord> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let events = self
            .records
            .iter()
            .filter(|record| query.contains_date(&record.created_at))
            .flat_map(|record| record.counts.iter().map(move |count| (record, *count)));
        for (record, count) in events {
            match positions.get(record.key.as_str()) {
                Some(&idx) => {
                    let group = &mut groups[idx];
                    group.total_count = group.total_count.saturating_add(count);
                }
                None => {
                    positions.insert(&record.key, groups.len());
                    groups.push(AggregatedRecord {
                        key: record.key.clone(),
                        created_at: record.created_at,
                        total_count: count,
                    });
                }
            }
        }
        groups.retain(|group| query.contains_total(group.total_count));
        groups
    }
}

#[async_trait]
impl CountRepository for MemoryRepository {
    async fn aggregate_counts(&self, query: &CountQuery) -> Result<Vec<AggregatedRecord>, StorageError> {
        Ok(self.aggregate(query))
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
