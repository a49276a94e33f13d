use crate::status::Status;
use async_trait::async_trait;
use std::future::Future;
use tracing::warn;

/// A capability that reports the health of a single dependency.
///
/// Implementations should return [`Status::Up`], [`Status::Degraded`], or
/// [`Status::Down`] depending on the health of the component. The engine
/// invokes a check under the owning component's timeout; when the deadline
/// passes the in-flight future is dropped and the component is recorded as
/// down.
#[async_trait]
pub trait Check: Send + Sync {
    async fn status(&self) -> Status;
}

/// Adapter to use an ordinary async function returning a [`Status`] as a
/// [`Check`].
pub struct CheckFn<F>(F);

/// Wrap an async function returning a [`Status`] as a [`Check`].
pub fn check_fn<F, Fut>(f: F) -> CheckFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Status> + Send,
{
    CheckFn(f)
}

#[async_trait]
impl<F, Fut> Check for CheckFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Status> + Send,
{
    async fn status(&self) -> Status {
        (self.0)().await
    }
}

/// Adapter for the success/failure check shape: `Ok` maps to [`Status::Up`]
/// and `Err` maps to [`Status::Down`].
pub struct FallibleFn<F>(F);

/// Wrap a fallible async function as a [`Check`].
///
/// The underlying error never propagates through the aggregation path; it is
/// logged at warn level and absorbed into [`Status::Down`].
pub fn fallible<F, Fut>(f: F) -> FallibleFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    FallibleFn(f)
}

#[async_trait]
impl<F, Fut> Check for FallibleFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    async fn status(&self) -> Status {
        match (self.0)().await {
            Ok(()) => Status::Up,
            Err(e) => {
                warn!("Health check failed: {:#}", e);
                Status::Down
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn check_fn_passes_status_through() {
        let check = check_fn(|| async { Status::Degraded });
        assert_eq!(check.status().await, Status::Degraded);
    }

    #[tokio::test]
    async fn fallible_maps_ok_to_up() {
        let check = fallible(|| async { Ok(()) });
        assert_eq!(check.status().await, Status::Up);
    }

    #[tokio::test]
    async fn fallible_maps_err_to_down() {
        let check = fallible(|| async { Err(anyhow::anyhow!("connection refused")) });
        assert_eq!(check.status().await, Status::Down);
    }
}
