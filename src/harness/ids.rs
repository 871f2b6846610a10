//! # Request Identifier Generation
//!
//! Monotonic, namespaced request-ID issuance.
//!
//! All three request namespaces share ONE counter, so IDs issued across
//! namespaces never reuse a suffix within a process lifetime. Client
//! order IDs come from a separate counter seeded from the wall-clock
//! epoch millis at construction, which makes collisions across restarts
//! best-effort only: two starts within the same millisecond can collide.
//! The seed is injectable for deterministic tests.

use std::sync::atomic::{AtomicU64, Ordering};

/// Namespace of a generated request identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdNamespace {
    /// Security list requests (`SecurityReqID_`).
    SecurityReq,
    /// Market data requests (`MDReqID_`).
    MarketDataReq,
    /// Quote requests (`QuoteReqID_`).
    QuoteReq,
}

impl IdNamespace {
    /// Returns the identifier prefix for this namespace.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::SecurityReq => "SecurityReqID_",
            Self::MarketDataReq => "MDReqID_",
            Self::QuoteReq => "QuoteReqID_",
        }
    }
}

/// Thread-safe identifier generator.
///
/// Safe to call concurrently from the dispatcher task and the
/// orchestrator; both counters are atomics.
#[derive(Debug)]
pub struct IdGenerator {
    req_id_counter: AtomicU64,
    cl_ord_id_counter: AtomicU64,
}

impl IdGenerator {
    /// Creates a generator with the order-ID counter seeded from the
    /// current wall-clock epoch millis.
    #[must_use]
    pub fn new() -> Self {
        let now_millis = chrono::Utc::now().timestamp_millis().unsigned_abs();
        Self::with_cl_ord_seed(now_millis)
    }

    /// Creates a generator with an explicit order-ID seed.
    #[must_use]
    pub fn with_cl_ord_seed(seed: u64) -> Self {
        Self {
            req_id_counter: AtomicU64::new(1),
            cl_ord_id_counter: AtomicU64::new(seed),
        }
    }

    /// Issues the next identifier in a namespace.
    ///
    /// Atomically increments the shared request counter and returns
    /// `<prefix><counter>`.
    #[must_use]
    pub fn next_id(&self, namespace: IdNamespace) -> String {
        let value = self.req_id_counter.fetch_add(1, Ordering::SeqCst);
        format!("{}{}", namespace.prefix(), value)
    }

    /// Issues the next client order identifier as a decimal string.
    #[must_use]
    pub fn next_cl_ord_id(&self) -> String {
        self.cl_ord_id_counter
            .fetch_add(1, Ordering::SeqCst)
            .to_string()
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_ids_are_distinct_and_increasing() {
        let ids = IdGenerator::with_cl_ord_seed(0);
        let first = ids.next_id(IdNamespace::QuoteReq);
        let second = ids.next_id(IdNamespace::QuoteReq);
        assert_ne!(first, second);

        let suffix = |id: &str| {
            id.trim_start_matches(IdNamespace::QuoteReq.prefix())
                .parse::<u64>()
                .unwrap()
        };
        assert!(suffix(&second) > suffix(&first));
    }

    #[test]
    fn namespaces_share_one_counter() {
        let ids = IdGenerator::with_cl_ord_seed(0);
        assert_eq!(ids.next_id(IdNamespace::SecurityReq), "SecurityReqID_1");
        assert_eq!(ids.next_id(IdNamespace::MarketDataReq), "MDReqID_2");
        assert_eq!(ids.next_id(IdNamespace::QuoteReq), "QuoteReqID_3");
    }

    #[test]
    fn cl_ord_ids_run_from_the_seed() {
        let ids = IdGenerator::with_cl_ord_seed(1_547_000_000_000);
        assert_eq!(ids.next_cl_ord_id(), "1547000000000");
        assert_eq!(ids.next_cl_ord_id(), "1547000000001");
    }

    #[test]
    fn cl_ord_counter_is_independent_of_request_counter() {
        let ids = IdGenerator::with_cl_ord_seed(100);
        let _ = ids.next_cl_ord_id();
        assert_eq!(ids.next_id(IdNamespace::SecurityReq), "SecurityReqID_1");
    }

    #[test]
    fn concurrent_issuance_never_collides() {
        use std::collections::HashSet;
        use std::sync::Arc;

        let ids = Arc::new(IdGenerator::with_cl_ord_seed(0));
        let mut handles = Vec::new();
        for _ in 0..4 {
            let ids = Arc::clone(&ids);
            handles.push(std::thread::spawn(move || {
                (0..250)
                    .map(|_| ids.next_id(IdNamespace::MarketDataReq))
                    .collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id issued");
            }
        }
        assert_eq!(seen.len(), 1000);
    }
}
