//! Authorizer decision cache.

use std::time::Duration;

use authorizer_sdk::AuthorizationDecision;
use dashmap::DashMap;
use tokio::time::Instant;

/// Longest time a decision is reused, whatever ttl it carries.
pub const MAX_DECISION_TTL: Duration = Duration::from_secs(3600);

struct CachedDecision {
    decision: AuthorizationDecision,
    expires_at: Instant,
}

/// Reuses authorizer decisions per raw `Authorization` header value.
///
/// An entry lives for the decision's own ttl when it carries one, else for
/// `default_ttl`, capped at [`MAX_DECISION_TTL`]. A zero ttl is never
/// stored. Only decisions are cached;
/// authorizer faults always reach the authorizer again.
pub struct DecisionCache {
    entries: DashMap<String, CachedDecision>,
    default_ttl: Duration,
    capacity: usize,
}

impl DecisionCache {
    #[must_use]
    pub fn new(default_ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
            capacity,
        }
    }

    /// Cached decision for `credential`, if still valid.
    #[must_use]
    pub fn get(&self, credential: &str) -> Option<AuthorizationDecision> {
        let now = Instant::now();
        {
            let entry = self.entries.get(credential)?;
            if entry.expires_at > now {
                return Some(entry.decision.clone());
            }
        }
        self.entries
            .remove_if(credential, |_, cached| cached.expires_at <= now);
        None
    }

    /// Store a decision. Returns whether it was stored.
    pub fn insert(&self, credential: String, decision: AuthorizationDecision) -> bool {
        let ttl = decision
            .ttl()
            .unwrap_or(self.default_ttl)
            .min(MAX_DECISION_TTL);
        if ttl.is_zero() || self.capacity == 0 {
            return false;
        }
        let Some(expires_at) = Instant::now().checked_add(ttl) else {
            return false;
        };

        if self.entries.len() >= self.capacity && !self.entries.contains_key(&credential) {
            self.purge_expired();
            if self.entries.len() >= self.capacity {
                tracing::debug!(capacity = self.capacity, "Decision cache full, not caching");
                return false;
            }
        }

        self.entries.insert(
            credential,
            CachedDecision {
                decision,
                expires_at,
            },
        );
        true
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, cached| cached.expires_at > now);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use authorizer_sdk::ResolverContext;

    use super::*;

    fn allow(ttl: Option<Duration>) -> AuthorizationDecision {
        AuthorizationDecision::Allow {
            context: ResolverContext::builder()
                .entity("user-1")
                .target_organization("org-1")
                .build()
                .unwrap(),
            ttl,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_after_default_ttl() {
        let cache = DecisionCache::new(Duration::from_secs(300), 16);
        assert!(cache.insert("Bearer a".to_owned(), allow(None)));

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(cache.get("Bearer a").is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get("Bearer a").is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn decision_ttl_overrides_default() {
        let cache = DecisionCache::new(Duration::from_secs(300), 16);
        cache.insert("Bearer a".to_owned(), allow(Some(Duration::from_secs(5))));

        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(cache.get("Bearer a").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn deny_is_cached_for_default_ttl() {
        let cache = DecisionCache::new(Duration::from_secs(60), 16);
        cache.insert("Basic x".to_owned(), AuthorizationDecision::Deny);

        assert_eq!(cache.get("Basic x"), Some(AuthorizationDecision::Deny));
    }

    #[test]
    fn zero_ttl_disables_caching() {
        let cache = DecisionCache::new(Duration::ZERO, 16);
        assert!(!cache.insert("Bearer a".to_owned(), allow(None)));
        assert!(!cache.insert("Bearer b".to_owned(), allow(Some(Duration::ZERO))));
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn huge_ttl_is_capped() {
        let cache = DecisionCache::new(Duration::from_secs(u64::MAX), 16);
        assert!(cache.insert("Bearer a".to_owned(), allow(None)));
        assert!(cache.insert(
            "Bearer b".to_owned(),
            allow(Some(Duration::from_secs(u64::MAX / 2)))
        ));
        assert!(cache.insert("Bearer c".to_owned(), allow(Some(Duration::MAX))));

        tokio::time::advance(Duration::from_secs(3599)).await;
        assert!(cache.get("Bearer a").is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get("Bearer a").is_none());
        assert!(cache.get("Bearer b").is_none());
        assert!(cache.get("Bearer c").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn full_cache_makes_room_from_expired_entries_only() {
        let cache = DecisionCache::new(Duration::from_secs(60), 2);
        cache.insert("a".to_owned(), allow(Some(Duration::from_secs(1))));
        cache.insert("b".to_owned(), allow(None));

        assert!(!cache.insert("c".to_owned(), allow(None)));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.insert("c".to_owned(), allow(None)));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("b").is_some());
    }
}
