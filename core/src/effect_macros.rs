//! Declarative macros for ergonomic effect construction
//!
//! Collaborator calls are the bulk of the booking workflow's effects, so these
//! macros keep the reducer arms short.

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use frontdesk_core::async_effect;
///
/// async_effect! {
///     let result = catalog.find_available_rooms(range).await;
///     Some(BookingAction::RoomsLoaded { session, range, result })
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling a deferred action
///
/// # Example
///
/// ```rust,ignore
/// use frontdesk_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_millis(300),
///     action: BookingAction::ClientSearchDue { session, generation }
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}
