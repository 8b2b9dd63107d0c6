//! Join combinators for fixed-size parallel batches.
//!
//! - [`join_all_or_fail`]: every call must succeed; the first error wins and
//!   no partial results escape.
//! - [`join_all_with_default`]: every call runs to completion; a failed call
//!   contributes `T::default()` at its position.

use std::fmt::Display;
use std::future::Future;

use futures::future::{join_all, try_join_all};

/// Run all futures concurrently and return every result in input order, or
/// the first error observed.
pub async fn join_all_or_fail<I, F, T, E>(futures: I) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    try_join_all(futures).await
}

/// Run all futures concurrently; failures are logged and replaced by
/// `T::default()` so the output always has one entry per input.
pub async fn join_all_with_default<I, F, T, E>(futures: I) -> Vec<T>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
    T: Default,
    E: Display,
{
    join_all(futures)
        .await
        .into_iter()
        .enumerate()
        .map(|(index, result)| {
            result.unwrap_or_else(|e| {
                tracing::warn!(index, error = %e, "Batch item failed, using default");
                T::default()
            })
        })
        .collect()
}
