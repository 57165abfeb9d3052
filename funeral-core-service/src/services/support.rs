use chrono::{DateTime, Utc};
use funeral_core_api::{ApiError, ApiResult};
use funeral_core_db::models::temporal::{new_business_key, BusinessKey, TemporalEntity, Versioned};
use funeral_core_db::repository::{CreateVersioned, FindCurrent, SaveVersion};
use uuid::Uuid;

/// Current version of `key`, or `NotFound`.
pub(crate) async fn require_current<T, R>(repo: &R, key: &BusinessKey) -> ApiResult<Versioned<T>>
where
    T: TemporalEntity,
    R: FindCurrent<T> + ?Sized,
{
    repo.find_current(key)
        .await
        .map_err(ApiError::persistence)?
        .ok_or_else(|| ApiError::not_found(T::ENTITY, key))
}

/// Builds version 1 under a fresh business key.
pub(crate) fn first_version<T: TemporalEntity>(data: T, actor: Uuid, now: DateTime<Utc>) -> ApiResult<Versioned<T>> {
    Versioned::create(new_business_key(), data, actor, now).map_err(ApiError::PersistenceError)
}

pub(crate) async fn create_one<T, R>(repo: &R, item: Versioned<T>) -> ApiResult<Versioned<T>>
where
    T: TemporalEntity,
    R: CreateVersioned<T> + ?Sized,
{
    repo.create_versioned(vec![item])
        .await
        .map_err(ApiError::persistence)?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::PersistenceError(format!("{} insert returned no row", T::ENTITY)))
}

/// Saves `data` as the successor of `current`; unchanged content returns `current`.
pub(crate) async fn save_one<T, R>(repo: &R, current: &Versioned<T>, data: T, actor: Uuid) -> ApiResult<Versioned<T>>
where
    T: TemporalEntity,
    R: SaveVersion<T> + ?Sized,
{
    repo.save_versions(vec![current.with_data(data)], actor)
        .await
        .map_err(ApiError::persistence)?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::PersistenceError(format!("{} save returned no row", T::ENTITY)))
}
