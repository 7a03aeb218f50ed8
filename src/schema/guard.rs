//! Destructive-DDL guard.

/// Case-insensitive textual check for destructive statements.
///
/// Applied only after a previous schema exists in a non-draft state;
/// the first schema of a project may contain anything valid.
///
/// TODO: walk the parsed subset instead — the substring check also flags
/// identifiers that happen to contain these keywords.
pub fn is_destructive_ddl(ddl: &str) -> bool {
    let lowered = ddl.to_lowercase();

    lowered.contains("drop table")
        || lowered.contains("drop column")
        || lowered.contains("truncate")
        || (lowered.contains("alter table") && lowered.contains(" drop "))
}
