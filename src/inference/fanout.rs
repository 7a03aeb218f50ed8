//! Incoming-FK fanout statistics.
//!
//! Counts, per candidate column, the FK edges pointing at it and the
//! distinct child tables those edges come from. Only direct references
//! count; nothing transitive.

use std::collections::{BTreeMap, BTreeSet};

use crate::schema::LogicalSchema;

use super::types::{CandidateSet, ColumnRef, FanoutStats};

/// Compute fanout stats for every candidate column.
pub fn compute_fanout(
    schema: &LogicalSchema,
    candidates: &CandidateSet,
) -> BTreeMap<ColumnRef, FanoutStats> {
    let index: BTreeSet<ColumnRef> = candidates
        .values()
        .flat_map(|columns| columns.iter().cloned())
        .collect();

    let mut fanout: BTreeMap<ColumnRef, FanoutStats> = BTreeMap::new();
    let mut seen_tables: BTreeMap<ColumnRef, BTreeSet<String>> = BTreeMap::new();

    for table in schema.tables.values() {
        for fk in table.fks.values() {
            let parent = ColumnRef {
                table: fk.parent_table.clone(),
                column: fk.parent_column.clone(),
            };
            if !index.contains(&parent) {
                continue;
            }

            let stats = fanout.entry(parent.clone()).or_default();
            stats.incoming_fks += 1;

            let children = seen_tables.entry(parent).or_default();
            if children.insert(fk.child_table.clone()) {
                stats.referencing_tables += 1;
            }
        }
    }

    fanout
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::schema::build_from_ddl;

    use super::*;
    use crate::inference::extract_candidates;

    #[test]
    fn test_counts_edges_and_distinct_tables() {
        let schema = build_from_ddl(
            Uuid::nil(),
            "CREATE TABLE users (id BIGINT PRIMARY KEY NOT NULL); \
             CREATE TABLE orders (\
                 id BIGINT NOT NULL, user_id BIGINT NOT NULL, \
                 FOREIGN KEY (user_id) REFERENCES users (id)); \
             CREATE TABLE invoices (\
                 id BIGINT NOT NULL, owner_id BIGINT NOT NULL, payer_id BIGINT NOT NULL, \
                 FOREIGN KEY (owner_id) REFERENCES users (id), \
                 FOREIGN KEY (payer_id) REFERENCES users (id))",
        )
        .unwrap();

        let candidates = extract_candidates(&schema);
        let fanout = compute_fanout(&schema, &candidates);

        let users_id = ColumnRef {
            table: "users".into(),
            column: "id".into(),
        };
        let stats = fanout[&users_id];
        assert_eq!(stats.incoming_fks, 3);
        assert_eq!(stats.referencing_tables, 2);
    }

    #[test]
    fn test_non_candidate_parents_are_skipped() {
        // Parent column is nullable, so it never enters the candidate set.
        let schema = build_from_ddl(
            Uuid::nil(),
            "CREATE TABLE users (id BIGINT); \
             CREATE TABLE orders (\
                 user_id BIGINT NOT NULL, \
                 FOREIGN KEY (user_id) REFERENCES users (id))",
        )
        .unwrap();

        let candidates = extract_candidates(&schema);
        let fanout = compute_fanout(&schema, &candidates);
        assert!(fanout.is_empty());
    }
}
