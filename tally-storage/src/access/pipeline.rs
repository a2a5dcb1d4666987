// Copyright 2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use super::*;

/// Build the aggregation pipeline answering a count query.
///
/// Stage order matters: the window filter runs on whole documents, the
/// unwind turns every element of `counts` into its own event, events are
/// grouped per key (keeping the first `createdAt` seen), and only then are
/// the totals filtered.
pub fn count_pipeline(query: &CountQuery) -> Vec<Document> {
    vec![
        doc! { "$match": {
            "createdAt": {
                "$gte": bson::DateTime::from_chrono(query.start),
                "$lte": bson::DateTime::from_chrono(query.end),
            }
        } },
        doc! { "$unwind": "$counts" },
        doc! { "$group": {
            "_id": "$key",
            "totalCount": { "$sum": "$counts" },
            "createdAt": { "$first": "$createdAt" },
        } },
        doc! { "$match": {
            "totalCount": {
                "$gte": query.min_count,
                "$lte": query.max_count,
            }
        } },
    ]
}
