use chrono::Utc;
use funeral_core_api::{ApiError, ApiResult};
use funeral_core_db::models::policy::{
    PaymentPolicy, PaymentPolicyModel, SchedulingPolicy, SchedulingPolicyModel, PAYMENT_POLICY_KEY,
    SCHEDULING_POLICY_KEY,
};
use funeral_core_db::models::temporal::{parse_business_key, TemporalEntity, Versioned};
use funeral_core_db::repository::{
    CreateVersioned, FindCurrent, PaymentPolicyRepository, SaveVersion, SchedulingPolicyRepository,
};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::support::{create_one, save_one};

/// Reads and updates the singleton policies.
///
/// Reads go through a moka cache; a missing policy falls back to its
/// default and the default is what gets cached.
pub struct PolicyService {
    payment_policies: Arc<dyn PaymentPolicyRepository>,
    scheduling_policies: Arc<dyn SchedulingPolicyRepository>,
    payment_cache: Cache<&'static str, PaymentPolicy>,
    scheduling_cache: Cache<&'static str, SchedulingPolicy>,
}

async fn load_or_default<T, R>(repo: &R, key: &'static str) -> ApiResult<T>
where
    T: TemporalEntity + Default,
    R: FindCurrent<T> + ?Sized,
{
    let business_key = parse_business_key(key)?;
    match repo.find_current(&business_key).await.map_err(ApiError::persistence)? {
        Some(current) => {
            debug!(policy = key, version = current.meta.version, "Loaded policy");
            Ok(current.data)
        }
        None => {
            warn!(policy = key, "No stored policy, using defaults");
            Ok(T::default())
        }
    }
}

/// Saves `policy` as the next version, or as version 1 when none is stored.
async fn upsert<T, R>(repo: &R, key: &'static str, policy: T, actor: Uuid) -> ApiResult<Versioned<T>>
where
    T: TemporalEntity,
    R: FindCurrent<T> + CreateVersioned<T> + SaveVersion<T> + ?Sized,
{
    let business_key = parse_business_key(key)?;
    let saved = match repo.find_current(&business_key).await.map_err(ApiError::persistence)? {
        Some(current) => save_one(repo, &current, policy, actor).await?,
        None => {
            let first = Versioned::create(business_key, policy, actor, Utc::now())
                .map_err(ApiError::PersistenceError)?;
            create_one(repo, first).await?
        }
    };
    info!(policy = key, version = saved.meta.version, "Policy updated");
    Ok(saved)
}

impl PolicyService {
    pub fn new(
        payment_policies: Arc<dyn PaymentPolicyRepository>,
        scheduling_policies: Arc<dyn SchedulingPolicyRepository>,
        ttl: Duration,
    ) -> Self {
        Self {
            payment_policies,
            scheduling_policies,
            payment_cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
            scheduling_cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    pub async fn payment_policy(&self) -> ApiResult<PaymentPolicy> {
        if let Some(policy) = self.payment_cache.get(PAYMENT_POLICY_KEY).await {
            return Ok(policy);
        }
        let policy: PaymentPolicy = load_or_default(&*self.payment_policies, PAYMENT_POLICY_KEY).await?;
        self.payment_cache.insert(PAYMENT_POLICY_KEY, policy.clone()).await;
        Ok(policy)
    }

    pub async fn scheduling_policy(&self) -> ApiResult<SchedulingPolicy> {
        if let Some(policy) = self.scheduling_cache.get(SCHEDULING_POLICY_KEY).await {
            return Ok(policy);
        }
        let policy: SchedulingPolicy =
            load_or_default(&*self.scheduling_policies, SCHEDULING_POLICY_KEY).await?;
        self.scheduling_cache.insert(SCHEDULING_POLICY_KEY, policy.clone()).await;
        Ok(policy)
    }

    pub async fn update_payment_policy(&self, policy: PaymentPolicy, actor: Uuid) -> ApiResult<PaymentPolicyModel> {
        policy.validate()?;
        let saved = upsert(&*self.payment_policies, PAYMENT_POLICY_KEY, policy, actor).await?;
        self.payment_cache.invalidate(PAYMENT_POLICY_KEY).await;
        Ok(saved)
    }

    pub async fn update_scheduling_policy(
        &self,
        policy: SchedulingPolicy,
        actor: Uuid,
    ) -> ApiResult<SchedulingPolicyModel> {
        policy.validate()?;
        let saved = upsert(&*self.scheduling_policies, SCHEDULING_POLICY_KEY, policy, actor).await?;
        self.scheduling_cache.invalidate(SCHEDULING_POLICY_KEY).await;
        Ok(saved)
    }
}
