use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use crate::domain::identity::errors::DirectoryError;
use crate::domain::identity::models::Credential;
use crate::domain::identity::models::UserAttributes;
use crate::domain::identity::ports::DirectoryClient;

/// Directory decorator caching user attributes per user id.
///
/// Credential checks always go to the backend. The tenant lookup of a login
/// and the attribute read that follows it share one cached entry. Concurrent
/// lookups for the same user share one backend call; failures are not cached.
pub struct CachedDirectoryClient<D>
where
    D: DirectoryClient,
{
    inner: Arc<D>,
    attributes: Cache<i64, UserAttributes>,
}

impl<D> CachedDirectoryClient<D>
where
    D: DirectoryClient,
{
    pub fn new(inner: Arc<D>, time_to_live: Duration) -> Self {
        let attributes = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(time_to_live)
            .build();

        Self { inner, attributes }
    }
}

#[async_trait]
impl<D> DirectoryClient for CachedDirectoryClient<D>
where
    D: DirectoryClient,
{
    async fn verify_credentials(&self, credential: &Credential) -> Result<i64, DirectoryError> {
        self.inner.verify_credentials(credential).await
    }

    async fn fetch_user_attributes(&self, user_id: i64) -> Result<UserAttributes, DirectoryError> {
        self.attributes
            .try_get_with(user_id, self.inner.fetch_user_attributes(user_id))
            .await
            .map_err(|e| (*e).clone())
    }

    async fn user_exists(&self, user_id: i64) -> bool {
        self.inner.user_exists(user_id).await
    }
}
