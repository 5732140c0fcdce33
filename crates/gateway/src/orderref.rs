//! Order-reference correlation.
//!
//! The vendor identifies in-flight orders by a session-scoped string
//! reference; the engine identifies them by a process-wide `u64`. The
//! registry holds the bidirectional mapping, the generator issues the
//! references.
//!
//! Entries are never evicted: vendor order references are assumed unique
//! within a trading day and the registry lives for one gateway/session
//! pair, so growth is bounded by the day's order count. Day rolls are
//! handled operationally by restarting the gateway.

use crate::error::GatewayError;
use dashmap::DashMap;
use meridian_core::{OrdId, StrategyId};

/// Bidirectional map between vendor order references and internal ids.
///
/// `put` must complete before the corresponding request is physically
/// sent, so the lookup path never misses for an order this gateway
/// submitted, even when the vendor acknowledges immediately.
#[derive(Debug, Default)]
pub struct OrderRefRegistry {
    by_ref: DashMap<String, OrdId>,
    by_ord: DashMap<OrdId, String>,
}

impl OrderRefRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the mapping in both directions
    pub fn put(&self, order_ref: &str, ord_id: OrdId) {
        self.by_ref.insert(order_ref.to_string(), ord_id);
        self.by_ord.insert(ord_id, order_ref.to_string());
    }

    /// Resolve a vendor order reference to the internal order id
    pub fn ord_id(&self, order_ref: &str) -> Result<OrdId, GatewayError> {
        self.by_ref
            .get(order_ref)
            .map(|entry| *entry)
            .ok_or_else(|| GatewayError::OrderRefNotFound(format!("orderRef={order_ref}")))
    }

    /// Resolve an internal order id back to its vendor reference,
    /// used when constructing cancels
    pub fn order_ref(&self, ord_id: OrdId) -> Result<String, GatewayError> {
        self.by_ord
            .get(&ord_id)
            .map(|entry| entry.clone())
            .ok_or_else(|| GatewayError::OrderRefNotFound(format!("ordId={ord_id}")))
    }

    pub fn len(&self) -> usize {
        self.by_ref.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_ref.is_empty()
    }
}

/// Issues strictly increasing order references, one counter per strategy.
///
/// The increment happens under the map entry's shard lock, so concurrent
/// calls for the same strategy can never observe the same value.
#[derive(Debug, Default)]
pub struct OrderRefGenerator {
    counters: DashMap<StrategyId, u64>,
}

impl OrderRefGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next reference for the given strategy, starting at 1
    pub fn next(&self, strategy_id: StrategyId) -> u64 {
        let mut entry = self.counters.entry(strategy_id).or_insert(0);
        *entry += 1;
        *entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_put_then_lookup_round_trip() {
        let registry = OrderRefRegistry::new();
        registry.put("100001", 42);

        assert_eq!(registry.ord_id("100001").unwrap(), 42);
        assert_eq!(registry.order_ref(42).unwrap(), "100001");
    }

    #[test]
    fn test_unknown_keys_fail() {
        let registry = OrderRefRegistry::new();
        assert!(matches!(
            registry.ord_id("missing"),
            Err(GatewayError::OrderRefNotFound(_))
        ));
        assert!(matches!(
            registry.order_ref(9),
            Err(GatewayError::OrderRefNotFound(_))
        ));
    }

    #[test]
    fn test_put_overwrites() {
        let registry = OrderRefRegistry::new();
        registry.put("1", 10);
        registry.put("1", 11);
        assert_eq!(registry.ord_id("1").unwrap(), 11);
    }

    #[test]
    fn test_concurrent_puts_lose_nothing() {
        let registry = Arc::new(OrderRefRegistry::new());
        let mut handles = Vec::new();
        for t in 0..8u64 {
            let registry = registry.clone();
            handles.push(thread::spawn(move || {
                for i in 0..100u64 {
                    let ord_id = t * 100 + i;
                    registry.put(&format!("ref-{ord_id}"), ord_id);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 800);
        for ord_id in 0..800u64 {
            assert_eq!(registry.ord_id(&format!("ref-{ord_id}")).unwrap(), ord_id);
            assert_eq!(registry.order_ref(ord_id).unwrap(), format!("ref-{ord_id}"));
        }
    }

    #[test]
    fn test_generator_strictly_increasing_per_strategy() {
        let generator = OrderRefGenerator::new();
        assert_eq!(generator.next(1), 1);
        assert_eq!(generator.next(1), 2);
        // Independent counter per strategy
        assert_eq!(generator.next(2), 1);
        assert_eq!(generator.next(1), 3);
    }

    #[test]
    fn test_generator_no_duplicates_under_concurrency() {
        let generator = Arc::new(OrderRefGenerator::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let generator = generator.clone();
            handles.push(thread::spawn(move || {
                (0..250).map(|_| generator.next(7)).collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for value in handle.join().unwrap() {
                assert!(seen.insert(value), "duplicate reference {value}");
            }
        }
        assert_eq!(seen.len(), 2000);
        assert_eq!(generator.next(7), 2001);
    }
}
