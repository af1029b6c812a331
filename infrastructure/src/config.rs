use tracing::warn;

/// Sizing of the in-memory document map.
///
/// ```rust
/// use infrastructure::RepositoryConfig;
///
/// let config = RepositoryConfig::default()
///     .with_initial_capacity(1024)
///     .with_shard_amount(16);
/// assert_eq!(config.shard_amount(), Some(16));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Number of documents to pre-allocate room for (default: 0)
    pub initial_capacity: usize,
    /// Number of lock shards. `None` keeps DashMap's default.
    pub shard_amount: Option<usize>,
}

impl RepositoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Sets the shard amount. Must be a power of two greater than 1,
    /// otherwise the default sharding is kept.
    pub fn with_shard_amount(mut self, shard_amount: usize) -> Self {
        self.shard_amount = Some(shard_amount);
        self
    }

    /// Returns the configured shard amount if DashMap will accept it.
    pub fn shard_amount(&self) -> Option<usize> {
        match self.shard_amount {
            Some(amount) if is_valid_shard_amount(amount) => Some(amount),
            Some(amount) => {
                warn!(
                    shard_amount = amount,
                    "Shard amount must be a power of two greater than 1, using default sharding"
                );
                None
            }
            None => None,
        }
    }
}

pub fn is_valid_shard_amount(amount: usize) -> bool {
    amount > 1 && amount.is_power_of_two()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RepositoryConfig::default();
        assert_eq!(config.initial_capacity, 0);
        assert_eq!(config.shard_amount(), None);
    }

    #[test]
    fn test_builder_pattern_chaining() {
        let config = RepositoryConfig::new()
            .with_initial_capacity(64)
            .with_shard_amount(8);
        assert_eq!(config.initial_capacity, 64);
        assert_eq!(config.shard_amount(), Some(8));
    }

    #[test]
    fn test_invalid_shard_amounts_fall_back() {
        assert_eq!(RepositoryConfig::new().with_shard_amount(1).shard_amount(), None);
        assert_eq!(RepositoryConfig::new().with_shard_amount(0).shard_amount(), None);
        assert_eq!(RepositoryConfig::new().with_shard_amount(12).shard_amount(), None);
    }
}
