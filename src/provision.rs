//! The idempotent read-or-create pattern used by all provisioning operations.

use std::future::Future;

use crate::error::Result;

/// The outcome of an ensure-exists operation: either the resource was already present, or it
/// was created by this call. Both variants carry the resource's descriptor.
#[derive(Clone, Debug, PartialEq)]
pub enum EnsureOutcome<D> {
    /// The resource did not exist and was created.
    Created(D),

    /// The resource already existed; nothing was written.
    Found(D),
}

impl<D> EnsureOutcome<D> {
    /// The descriptor of the resource, regardless of outcome.
    pub fn descriptor(&self) -> &D {
        match self {
            EnsureOutcome::Created(d) | EnsureOutcome::Found(d) => d,
        }
    }

    /// Consumes the outcome, returning the descriptor.
    pub fn into_descriptor(self) -> D {
        match self {
            EnsureOutcome::Created(d) | EnsureOutcome::Found(d) => d,
        }
    }

    /// Whether this call created the resource.
    pub fn is_created(&self) -> bool {
        matches!(self, EnsureOutcome::Created(_))
    }

    /// Whether the resource already existed.
    pub fn is_found(&self) -> bool {
        matches!(self, EnsureOutcome::Found(_))
    }
}

/// Attempts `read`; when the store reports the resource missing, runs `create` instead. Any
/// error other than not-found propagates unchanged, as does any error from the create itself.
pub(crate) async fn read_or_create<D, R, C, F>(read: R, create: F) -> Result<EnsureOutcome<D>>
where
    R: Future<Output = Result<D>>,
    F: FnOnce() -> C,
    C: Future<Output = Result<D>>,
{
    match read.await {
        Ok(descriptor) => Ok(EnsureOutcome::Found(descriptor)),
        Err(error) if error.is_not_found() => Ok(EnsureOutcome::Created(create().await?)),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::{ApiError, Error, StatusCode};

    #[tokio::test]
    async fn found_skips_the_create() {
        let outcome = read_or_create(async { Ok(1) }, || async {
            panic!("create must not run when the read succeeds")
        })
        .await
        .unwrap();
        assert_eq!(outcome, EnsureOutcome::Found(1));
        assert!(outcome.is_found());
    }

    #[tokio::test]
    async fn not_found_substitutes_the_create() {
        let outcome = read_or_create(
            async { Err(ApiError::new(StatusCode::NotFound, "missing").into()) },
            || async { Ok(2) },
        )
        .await
        .unwrap();
        assert_eq!(outcome, EnsureOutcome::Created(2));
        assert_eq!(*outcome.descriptor(), 2);
    }

    #[tokio::test]
    async fn other_errors_propagate_unchanged() {
        let result: crate::error::Result<EnsureOutcome<i32>> = read_or_create(
            async { Err(ApiError::new(StatusCode::Unauthorized, "bad key").into()) },
            || async { panic!("create must not run for non-not-found errors") },
        )
        .await;
        let error: Error = result.unwrap_err();
        assert_eq!(error.status(), Some(StatusCode::Unauthorized));
    }
}
