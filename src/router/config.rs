//! Router policy configuration.

/// Fanout and range policy applied when building a plan.
#[derive(Debug, Clone, Copy)]
pub struct RouterConfig {
    /// Allow plans that touch every shard.
    pub allow_broadcast: bool,
    /// Allow range predicates on shard keys.
    pub allow_range_queries: bool,
    /// Largest shard set a multi-shard plan may touch.
    pub max_shard_fanout: usize,
    /// Largest shard span a range plan may cover.
    pub max_range_shard_span: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            allow_broadcast: false,
            allow_range_queries: false,
            max_shard_fanout: 4,
            max_range_shard_span: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = RouterConfig::default();
        assert!(!cfg.allow_broadcast);
        assert!(!cfg.allow_range_queries);
        assert_eq!(cfg.max_shard_fanout, 4);
        assert_eq!(cfg.max_range_shard_span, 4);
    }
}
