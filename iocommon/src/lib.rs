//! Shared primitives used across the io workspace crates.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use iocommon::{Clock, ManualClock, Registry};
//!
//! let clock = ManualClock::starting_now();
//! let before = clock.now();
//! clock.advance(Duration::from_secs(60));
//! assert_eq!((clock.now() - before).num_seconds(), 60);
//!
//! let mut registry = Registry::new();
//! registry.insert("openai".to_string(), 1_u8);
//! assert!(registry.contains_key("openai"));
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use iocommon::BoxFuture;
    //!
    //! fn name_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = name_len("alice");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod clock {
    //! Wall-clock abstraction so time-windowed rules can be driven in tests.

    use std::sync::Mutex;
    use std::time::Duration;

    use chrono::{DateTime, TimeDelta, Utc};

    pub trait Clock: Send + Sync {
        fn now(&self) -> DateTime<Utc>;
    }

    #[derive(Debug, Default, Clone, Copy)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// A clock that only moves when told to.
    #[derive(Debug)]
    pub struct ManualClock {
        current: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        pub fn new(start: DateTime<Utc>) -> Self {
            Self {
                current: Mutex::new(start),
            }
        }

        pub fn starting_now() -> Self {
            Self::new(Utc::now())
        }

        pub fn set(&self, value: DateTime<Utc>) {
            *self.current.lock().unwrap_or_else(|e| e.into_inner()) = value;
        }

        pub fn advance(&self, by: Duration) {
            let Ok(delta) = TimeDelta::from_std(by) else {
                return;
            };
            let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
            *current = current.checked_add_signed(delta).unwrap_or(*current);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.current.lock().unwrap_or_else(|e| e.into_inner())
        }
    }
}

pub mod registry {
    //! Name-keyed lookup table used by runtime registries.
    //!
    //! ```rust
    //! use iocommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.insert("anthropic".to_string(), 2_u32);
    //!
    //! assert_eq!(registry.get("anthropic"), Some(&2));
    //! assert_eq!(registry.keys().count(), 1);
    //! ```

    use std::borrow::Borrow;
    use std::collections::HashMap;
    use std::hash::Hash;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: HashMap<K, V>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Eq + Hash,
    {
        fn default() -> Self {
            Self {
                items: HashMap::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Eq + Hash,
    {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            self.items.insert(key, value)
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.get(key)
        }

        pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.remove(key)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.contains_key(key)
        }

        pub fn keys(&self) -> impl Iterator<Item = &K> {
            self.items.keys()
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }
}

pub use clock::{Clock, ManualClock, SystemClock};
pub use future::BoxFuture;
pub use registry::Registry;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeZone, Utc};

    use super::{Clock, ManualClock, Registry, SystemClock};

    #[test]
    fn manual_clock_only_moves_when_advanced() {
        let start = Utc.with_ymd_and_hms(2025, 1, 2, 15, 4, 0).unwrap();
        let clock = ManualClock::new(start);

        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::from_secs(31 * 60));
        assert_eq!((clock.now() - start).num_minutes(), 31);

        clock.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn system_clock_is_monotonic_enough_for_ordering() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }

    #[test]
    fn registry_basic_lifecycle() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());

        registry.insert("openai".to_string(), 1_u32);
        assert_eq!(registry.get("openai"), Some(&1));
        assert!(registry.contains_key("openai"));
        assert_eq!(registry.len(), 1);

        let removed = registry.remove("openai");
        assert_eq!(removed, Some(1));
        assert!(registry.is_empty());
    }
}
