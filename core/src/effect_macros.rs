//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce boilerplate when creating `Effect` variants, particularly
//! for remote document store calls whose result is fed back as an action.

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```
/// use pantry_core::async_effect;
///
/// #[derive(Debug)]
/// enum ShelfAction {
///     Loaded { count: usize },
/// }
///
/// let effect = async_effect! {
///     Some(ShelfAction::Loaded { count: 3 })
/// };
/// assert!(matches!(effect, pantry_core::Effect::Future(_)));
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Future` around a `DocumentStore` call
///
/// The call runs on the runtime; exactly one of the two callbacks turns the
/// outcome into the action fed back to the reducer.
///
/// # Example
///
/// ```rust,ignore
/// use pantry_core::store_call;
///
/// store_call! {
///     call: store.remove("ingredients".to_string(), key.clone()),
///     on_success: |()| Some(AppAction::Removed { key }),
///     on_error: |error| Some(AppAction::RemoveFailed { message: error.to_string() })
/// }
/// ```
#[macro_export]
macro_rules! store_call {
    (
        call: $call:expr,
        on_success: |$success_param:pat_param| $success_body:expr,
        on_error: |$error_param:ident| $error_body:expr
    ) => {
        $crate::effect::Effect::Future(::std::boxed::Box::pin(async move {
            match $call.await {
                ::std::result::Result::Ok($success_param) => $success_body,
                ::std::result::Result::Err($error_param) => $error_body,
            }
        }))
    };
}
