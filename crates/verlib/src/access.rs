//! Access levels
//!
//! An [`AccessLevel`] is a set of opaque tokens. A caller holding level `A`
//! may invoke a procedure requiring level `B` when `A`'s tokens are a superset
//! of `B`'s. Levels are combined with `|`, which unions the token sets.
//!
//! ```rust
//! use verlib::AccessLevel;
//!
//! let admin = AccessLevel::new();
//! let operator = AccessLevel::private() | admin.clone();
//!
//! assert!(operator.clears(&AccessLevel::public()));
//! assert!(operator.clears(&admin));
//! assert!(!AccessLevel::private().clears(&operator));
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::ops::BitOr;
use std::sync::atomic::{AtomicU64, Ordering};

use once_cell::sync::Lazy;

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

static PUBLIC: Lazy<AccessLevel> = Lazy::new(AccessLevel::new);
static PRIVATE: Lazy<AccessLevel> = Lazy::new(|| AccessLevel::public() | AccessLevel::new());

/// Process-lifetime capability token. Never reused and never meaningful outside this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccessToken(u64);

impl AccessToken {
    fn mint() -> Self {
        AccessToken(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

/// A set of capability tokens
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AccessLevel {
    tokens: BTreeSet<AccessToken>,
}

impl AccessLevel {
    /// Mint a new level holding a single fresh token
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            tokens: BTreeSet::from([AccessToken::mint()]),
        }
    }

    /// The process-wide public level
    pub fn public() -> Self {
        PUBLIC.clone()
    }

    /// The process-wide private level: public plus one extra token
    pub fn private() -> Self {
        PRIVATE.clone()
    }

    /// Union of both token sets
    pub fn combine(&self, other: &AccessLevel) -> AccessLevel {
        AccessLevel {
            tokens: self.tokens.union(&other.tokens).copied().collect(),
        }
    }

    /// Whether this level satisfies `required`
    pub fn clears(&self, required: &AccessLevel) -> bool {
        required.tokens.iter().all(|token| self.tokens.contains(token))
    }

    pub fn tokens(&self) -> impl Iterator<Item = AccessToken> + '_ {
        self.tokens.iter().copied()
    }
}

impl BitOr for AccessLevel {
    type Output = AccessLevel;

    fn bitor(mut self, rhs: AccessLevel) -> AccessLevel {
        self.tokens.extend(rhs.tokens);
        self
    }
}

impl BitOr<&AccessLevel> for &AccessLevel {
    type Output = AccessLevel;

    fn bitor(self, rhs: &AccessLevel) -> AccessLevel {
        self.combine(rhs)
    }
}

impl fmt::Debug for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<u64> = self.tokens.iter().map(|t| t.0).collect();
        f.debug_struct("AccessLevel").field("tokens", &tokens).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_private_levels() {
        let public = AccessLevel::public();
        let private = AccessLevel::private();

        assert!(public.clears(&public));
        assert!(private.clears(&private));
        assert!(private.clears(&public));
        assert!(!public.clears(&private));
    }

    #[test]
    fn test_singletons_are_stable() {
        assert_eq!(AccessLevel::public(), AccessLevel::public());
        assert_eq!(AccessLevel::private(), AccessLevel::private());
        assert_ne!(AccessLevel::public(), AccessLevel::private());
    }

    #[test]
    fn test_fresh_levels_are_distinct() {
        let a = AccessLevel::new();
        let b = AccessLevel::new();

        assert_ne!(a, b);
        assert!(!a.clears(&b));
        assert!(!b.clears(&a));
    }

    #[test]
    fn test_combination_clears_operands() {
        let acl = AccessLevel::new();
        let other = AccessLevel::new();
        let combined = acl.clone() | other.clone();

        assert!(combined.clears(&acl));
        assert!(combined.clears(&other));
        assert!(!acl.clears(&combined));
        assert!(!other.clears(&combined));
    }

    #[test]
    fn test_combination_is_order_independent() {
        let a = AccessLevel::new();
        let b = AccessLevel::new();
        let c = AccessLevel::new();

        let left = &(&a | &b) | &c;
        let right = &c | &(&b | &a);
        assert_eq!(left, right);

        for probe in [&a, &b, &c, &left] {
            assert_eq!(left.clears(probe), right.clears(probe));
            assert_eq!(probe.clears(&left), probe.clears(&right));
        }
    }

    #[test]
    fn test_combination_never_loses_tokens() {
        let base = AccessLevel::private();
        let extended = base.clone() | AccessLevel::new() | AccessLevel::new();

        assert!(extended.clears(&base));
        assert!(extended.clears(&AccessLevel::public()));
        assert_eq!(extended.tokens().count(), base.tokens().count() + 2);
    }

    #[test]
    fn test_combining_with_self_is_identity() {
        let level = AccessLevel::new();
        assert_eq!(&level | &level, level);
    }
}
