//! # Frontdesk Testing
//!
//! Testing utilities for reducers built on `frontdesk-core`.
//!
//! This crate provides:
//! - Deterministic clocks
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - Effect helpers that resolve effects without a running store
//!
//! ## Example
//!
//! ```ignore
//! use frontdesk_testing::{ReducerTest, test_clock};
//!
//! ReducerTest::new(BookingReducer::new())
//!     .with_env(test_environment())
//!     .given_state(BookingState::new())
//!     .when_action(BookingAction::SearchRooms { start, end })
//!     .then_state(|s| assert_eq!(s.nights(), Some(5)))
//!     .run();
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use frontdesk_core::environment::Clock;


pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of environment traits
pub mod mocks {
    use super::{Clock, DateTime, NaiveDate, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// # Example
    ///
    /// ```
    /// use frontdesk_testing::mocks::FixedClock;
    /// use frontdesk_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }

        /// Clock pinned to midnight UTC of `date`
        #[must_use]
        pub fn on(date: NaiveDate) -> Self {
            Self::new(date.and_time(chrono::NaiveTime::MIN).and_utc())
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Default fixed clock for tests: 2024-10-01 00:00:00 UTC
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::on(NaiveDate::from_ymd_opt(2024, 10, 1).unwrap_or_default())
    }
}

/// Helpers for driving effects by hand
pub mod helpers {
    use frontdesk_core::effect::Effect;
    use std::future::Future;
    use std::pin::Pin;

    /// Resolve effects into the actions they would feed back
    ///
    /// Futures are awaited in order, delays fire immediately, and nested
    /// effects are flattened depth first. Use it to step through a reducer
    /// chain without spinning up a store.
    pub async fn resolve_effects<A>(effects: impl IntoIterator<Item = Effect<A>>) -> Vec<A>
    where
        A: Send + 'static,
    {
        let mut actions = Vec::new();
        for effect in effects {
            actions.extend(resolve_effect(effect).await);
        }
        actions
    }

    fn resolve_effect<A>(effect: Effect<A>) -> Pin<Box<dyn Future<Output = Vec<A>> + Send>>
    where
        A: Send + 'static,
    {
        Box::pin(async move {
            match effect {
                Effect::None => Vec::new(),
                Effect::Future(fut) => fut.await.into_iter().collect(),
                Effect::Delay { action, .. } => vec![*action],
                Effect::Parallel(effects) | Effect::Sequential(effects) => {
                    let mut actions = Vec::new();
                    for effect in effects {
                        actions.extend(resolve_effect(effect).await);
                    }
                    actions
                },
            }
        })
    }
}

pub use helpers::resolve_effects;
pub use mocks::{FixedClock, test_clock};
