//! Result of a migration run.

/// Counters describing what a run changed (or, before the final
/// confirmation, what it would change).
#[derive(Debug, Clone, Default)]
pub struct MigrationOutcome {
    /// Tables created.
    pub tables_created: usize,
    /// Tables renamed.
    pub tables_renamed: usize,
    /// Columns created.
    pub columns_created: usize,
    /// Columns renamed.
    pub columns_renamed: usize,
    /// Columns dropped.
    pub columns_dropped: usize,
    /// Columns whose nullability, default, type or FK changed.
    pub columns_altered: usize,
    /// Indices created.
    pub indices_created: usize,
    /// Indices renamed along with their table or column.
    pub indices_renamed: usize,
    /// Deprecated owned indices dropped.
    pub indices_dropped: usize,
    /// FTS groups installed or re-wired.
    pub fts_installed: usize,
    /// FTS generated columns removed.
    pub fts_removed: usize,
    /// FTS groups rebuilt after commit.
    pub fts_reindexed: usize,
    /// Fixture rows loaded after commit.
    pub fixtures_loaded: usize,
    /// Whether the run was committed.
    pub applied: bool,
}

impl MigrationOutcome {
    /// Whether the run found any schema difference.
    pub fn has_changes(&self) -> bool {
        self.tables_created > 0
            || self.tables_renamed > 0
            || self.columns_created > 0
            || self.columns_renamed > 0
            || self.columns_dropped > 0
            || self.columns_altered > 0
            || self.indices_created > 0
            || self.indices_renamed > 0
            || self.indices_dropped > 0
            || self.fts_installed > 0
            || self.fts_removed > 0
    }

    /// Get a human-readable summary of the run.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        push_count(&mut parts, self.tables_created, "table", "created");
        push_count(&mut parts, self.tables_renamed, "table", "renamed");
        push_count(&mut parts, self.columns_created, "column", "created");
        push_count(&mut parts, self.columns_renamed, "column", "renamed");
        push_count(&mut parts, self.columns_dropped, "column", "dropped");
        push_count(&mut parts, self.columns_altered, "column", "altered");
        push_count(&mut parts, self.indices_created, "index", "created");
        push_count(&mut parts, self.indices_renamed, "index", "renamed");
        push_count(&mut parts, self.indices_dropped, "index", "dropped");
        push_count(&mut parts, self.fts_installed, "FTS group", "installed");
        push_count(&mut parts, self.fts_removed, "FTS column", "removed");

        if parts.is_empty() {
            return "No changes".to_string();
        }

        let mut summary = parts.join(", ");
        if !self.applied {
            summary.push_str(" (rolled back)");
        }
        summary
    }
}

fn push_count(parts: &mut Vec<String>, count: usize, noun: &str, verb: &str) {
    match count {
        0 => {}
        1 => parts.push(format!("1 {} {}", noun, verb)),
        n if noun == "index" => parts.push(format!("{} indices {}", n, verb)),
        n => parts.push(format!("{} {}s {}", n, noun, verb)),
    }
}
