use crate::{
    db::{CredentialStore, StoreError},
    middleware::AuthenticatedUser,
    utils::{ApiError, ApiResult},
};
use shared::VaultRecord;
use std::sync::Arc;
use tracing::debug;

/// Record CRUD shared by the REST and RPC transports
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn CredentialStore>,
}

impl RecordService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub async fn add<R: VaultRecord>(&self, user: &AuthenticatedUser, record: R) -> ApiResult<()> {
        require_id(record.id())?;

        debug!(user_id = user.user_id(), kind = %R::KIND, id = record.id(), "Adding record");
        self.store
            .add_record(user.user_id(), &record.into_record())
            .await
            .map_err(|e| match e {
                StoreError::Conflict => {
                    ApiError::conflict_error("record with this id already exists")
                }
                other => other.into(),
            })
    }

    pub async fn get<R: VaultRecord>(&self, user: &AuthenticatedUser, id: &str) -> ApiResult<R> {
        require_id(id)?;

        let record = self
            .store
            .get_record(R::KIND, user.user_id(), id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ApiError::not_found_error(format!("{} not found", R::KIND)),
                other => other.into(),
            })?;

        R::from_record(record).ok_or_else(|| {
            tracing::error!("Store returned a record of the wrong kind");
            ApiError::internal_error("Internal server error")
        })
    }

    /// Succeeds when there was nothing to delete
    pub async fn delete<R: VaultRecord>(
        &self,
        user: &AuthenticatedUser,
        id: &str,
    ) -> ApiResult<()> {
        require_id(id)?;

        debug!(user_id = user.user_id(), kind = %R::KIND, id, "Deleting record");
        self.store
            .delete_record(R::KIND, user.user_id(), id)
            .await
            .map_err(ApiError::from)
    }
}

/// Ids must be usable as a single URL path segment
fn require_id(id: &str) -> ApiResult<()> {
    match id {
        "" => Err(ApiError::validation_error("record id must not be empty")),
        "." | ".." => Err(ApiError::validation_error(format!(
            "record id {:?} is reserved",
            id
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_id() {
        assert!(require_id("c1").is_ok());
        assert!(require_id("...").is_ok());
        assert!(require_id("a/b").is_ok());
        assert!(require_id("").is_err());
        assert!(require_id(".").is_err());
        assert!(require_id("..").is_err());
    }
}
