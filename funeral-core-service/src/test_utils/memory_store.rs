use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use funeral_core_db::models::appointment::AppointmentModel;
use funeral_core_db::models::case::{Case, CaseModel, CaseStatus};
use funeral_core_db::models::contact::{Contact, ContactModel};
use funeral_core_db::models::contract::{Contract, ContractModel};
use funeral_core_db::models::memorial_template::{
    MemorialTemplate, MemorialTemplateModel, TemplateCategory, TemplateStatus,
};
use funeral_core_db::models::payment::{Payment, PaymentModel};
use funeral_core_db::models::policy::{PaymentPolicy, SchedulingPolicy};
use funeral_core_db::models::temporal::{version_as_of, BusinessKey, TemporalEntity, Versioned};
use funeral_core_db::repository::*;
use std::error::Error;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

type RepoResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// SCD2 table kept in memory, with the same close-then-insert rules as Postgres.
pub struct InMemoryTemporalStore<T> {
    rows: Mutex<Vec<Versioned<T>>>,
}

impl<T: TemporalEntity> InMemoryTemporalStore<T> {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
        }
    }

    /// Every row of every key, for invariant checks in tests.
    pub async fn all_rows(&self) -> Vec<Versioned<T>> {
        self.rows.lock().await.clone()
    }

    pub async fn history(&self, key: &BusinessKey) -> Vec<Versioned<T>> {
        let mut versions: Vec<Versioned<T>> = self
            .rows
            .lock()
            .await
            .iter()
            .filter(|r| &r.meta.business_key == key)
            .cloned()
            .collect();
        versions.sort_by_key(|v| v.meta.version);
        versions
    }

    async fn current_where<F: Fn(&T) -> bool>(&self, predicate: F) -> Vec<Versioned<T>> {
        self.rows
            .lock()
            .await
            .iter()
            .filter(|r| r.meta.is_current && predicate(&r.data))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl<T: TemporalEntity> FindCurrent<T> for InMemoryTemporalStore<T> {
    async fn find_current(&self, business_key: &BusinessKey) -> RepoResult<Option<Versioned<T>>> {
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .find(|r| &r.meta.business_key == business_key && r.meta.is_current)
            .cloned())
    }
}

#[async_trait]
impl<T: TemporalEntity> FindCurrentBatch<T> for InMemoryTemporalStore<T> {
    async fn find_current_batch(&self, business_keys: &[BusinessKey]) -> RepoResult<Vec<Option<Versioned<T>>>> {
        let rows = self.rows.lock().await;
        Ok(business_keys
            .iter()
            .map(|key| {
                rows.iter()
                    .find(|r| &r.meta.business_key == key && r.meta.is_current)
                    .cloned()
            })
            .collect())
    }
}

#[async_trait]
impl<T: TemporalEntity> CreateVersioned<T> for InMemoryTemporalStore<T> {
    async fn create_versioned(&self, items: Vec<Versioned<T>>) -> RepoResult<Vec<Versioned<T>>> {
        let mut rows = self.rows.lock().await;
        for item in &items {
            if rows.iter().any(|r| r.meta.business_key == item.meta.business_key) {
                return Err(format!("{} '{}' already exists", T::ENTITY, item.meta.business_key).into());
            }
        }
        rows.extend(items.iter().cloned());
        Ok(items)
    }
}

#[async_trait]
impl<T: TemporalEntity> SaveVersion<T> for InMemoryTemporalStore<T> {
    async fn save_versions(&self, items: Vec<Versioned<T>>, actor: Uuid) -> RepoResult<Vec<Versioned<T>>> {
        let mut rows = self.rows.lock().await;
        let mut staged = rows.clone();
        let now = Utc::now();
        let mut saved = Vec::with_capacity(items.len());
        for item in items {
            let stored = staged
                .iter_mut()
                .find(|r| r.meta.id == item.meta.id)
                .ok_or_else(|| format!("{} version {} not found", T::ENTITY, item.meta.id))?;
            if !stored.meta.is_current || stored.meta.version != item.meta.version {
                return Err("Concurrent update detected".into());
            }
            match item.supersede(actor, now)? {
                None => saved.push(item),
                Some(step) => {
                    stored.meta = step.closed;
                    staged.push(step.next.clone());
                    saved.push(step.next);
                }
            }
        }
        *rows = staged;
        Ok(saved)
    }
}

#[async_trait]
impl<T: TemporalEntity> CloseVersion<T> for InMemoryTemporalStore<T> {
    async fn close_versions(&self, business_keys: &[BusinessKey], actor: Uuid) -> RepoResult<usize> {
        let mut rows = self.rows.lock().await;
        let now = Utc::now();
        let mut closed = 0;
        for row in rows.iter_mut() {
            if row.meta.is_current && business_keys.contains(&row.meta.business_key) {
                row.meta.close(now);
                row.meta.updated_by = actor;
                row.meta.updated_at = now;
                closed += 1;
            }
        }
        Ok(closed)
    }
}

#[async_trait]
impl<T: TemporalEntity> LoadHistory<T> for InMemoryTemporalStore<T> {
    async fn load_history(&self, business_key: &BusinessKey, page: PageRequest) -> RepoResult<Page<Versioned<T>>> {
        Ok(page.slice(self.history(business_key).await))
    }
}

#[async_trait]
impl<T: TemporalEntity> FindAsOf<T> for InMemoryTemporalStore<T> {
    async fn find_as_of(&self, business_key: &BusinessKey, instant: DateTime<Utc>) -> RepoResult<Option<Versioned<T>>> {
        let history = self.history(business_key).await;
        Ok(version_as_of(&history, instant).cloned())
    }
}

#[async_trait]
impl FindPaymentsByCase for InMemoryTemporalStore<Payment> {
    async fn find_payments_by_case(&self, case_key: &BusinessKey) -> RepoResult<Vec<PaymentModel>> {
        Ok(self.current_where(|p| &p.case_key == case_key).await)
    }
}

#[async_trait]
impl FindPaymentsByDateRange for InMemoryTemporalStore<Payment> {
    async fn find_payments_by_date_range(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> RepoResult<Vec<PaymentModel>> {
        let mut payments = self
            .current_where(|p| p.payment_date >= from && p.payment_date < to)
            .await;
        payments.sort_by_key(|p| p.data.payment_date);
        Ok(payments)
    }
}

#[async_trait]
impl FindContractsByCase for InMemoryTemporalStore<Contract> {
    async fn find_contracts_by_case(&self, case_key: &BusinessKey) -> RepoResult<Vec<ContractModel>> {
        Ok(self.current_where(|c| &c.case_key == case_key).await)
    }
}

#[async_trait]
impl FindCasesByStatus for InMemoryTemporalStore<Case> {
    async fn find_cases_by_status(&self, statuses: &[CaseStatus]) -> RepoResult<Vec<CaseModel>> {
        Ok(self.current_where(|c| statuses.contains(&c.status)).await)
    }
}

#[async_trait]
impl FindContactsByCase for InMemoryTemporalStore<Contact> {
    async fn find_contacts_by_case(&self, case_key: &BusinessKey) -> RepoResult<Vec<ContactModel>> {
        Ok(self.current_where(|c| c.case_key.as_ref() == Some(case_key)).await)
    }
}

#[async_trait]
impl FindActiveTemplateByCategory for InMemoryTemporalStore<MemorialTemplate> {
    async fn find_active_template_by_category(
        &self,
        category: TemplateCategory,
    ) -> RepoResult<Option<MemorialTemplateModel>> {
        Ok(self
            .current_where(|t| t.category == category && t.status == TemplateStatus::Active)
            .await
            .into_iter()
            .max_by_key(|t| t.meta.valid_from))
    }
}

#[derive(Default)]
pub struct InMemoryAppointments {
    rows: Mutex<Vec<AppointmentModel>>,
}

#[async_trait]
impl CreateBatch<AppointmentModel> for InMemoryAppointments {
    async fn create_batch(&self, items: Vec<AppointmentModel>) -> RepoResult<Vec<AppointmentModel>> {
        self.rows.lock().await.extend(items.iter().cloned());
        Ok(items)
    }
}

#[async_trait]
impl LoadBatch<AppointmentModel> for InMemoryAppointments {
    async fn load_batch(&self, ids: &[Uuid]) -> RepoResult<Vec<Option<AppointmentModel>>> {
        let rows = self.rows.lock().await;
        Ok(ids
            .iter()
            .map(|id| rows.iter().find(|a| a.id == *id).cloned())
            .collect())
    }
}

#[async_trait]
impl FindAppointmentsByDirector for InMemoryAppointments {
    async fn find_appointments_by_director(
        &self,
        director_id: Uuid,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> RepoResult<Vec<AppointmentModel>> {
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .filter(|a| a.director_id == director_id && a.start_time >= from && a.start_time < to)
            .cloned()
            .collect())
    }
}

/// One in-memory store per entity.
pub struct InMemoryRepositories {
    pub cases: Arc<InMemoryTemporalStore<Case>>,
    pub contracts: Arc<InMemoryTemporalStore<Contract>>,
    pub payments: Arc<InMemoryTemporalStore<Payment>>,
    pub contacts: Arc<InMemoryTemporalStore<Contact>>,
    pub templates: Arc<InMemoryTemporalStore<MemorialTemplate>>,
    pub payment_policies: Arc<InMemoryTemporalStore<PaymentPolicy>>,
    pub scheduling_policies: Arc<InMemoryTemporalStore<SchedulingPolicy>>,
    pub appointments: Arc<InMemoryAppointments>,
}

impl InMemoryRepositories {
    pub fn new() -> Self {
        Self {
            cases: Arc::new(InMemoryTemporalStore::new()),
            contracts: Arc::new(InMemoryTemporalStore::new()),
            payments: Arc::new(InMemoryTemporalStore::new()),
            contacts: Arc::new(InMemoryTemporalStore::new()),
            templates: Arc::new(InMemoryTemporalStore::new()),
            payment_policies: Arc::new(InMemoryTemporalStore::new()),
            scheduling_policies: Arc::new(InMemoryTemporalStore::new()),
            appointments: Arc::new(InMemoryAppointments::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use funeral_core_db::models::policy::PaymentPolicyModel;
    use funeral_core_db::models::temporal::{parse_business_key, verify_history};
    use rust_decimal::Decimal;

    fn policy(days: i32) -> PaymentPolicy {
        PaymentPolicy {
            max_refund_days: days,
            ..PaymentPolicy::default()
        }
    }

    #[tokio::test]
    async fn test_close_then_insert_keeps_one_current_row() {
        let store = InMemoryTemporalStore::<PaymentPolicy>::new();
        let actor = Uuid::new_v4();
        let key = parse_business_key("payment-policy").unwrap();
        let v1 = PaymentPolicyModel::create(key.clone(), policy(90), actor, Utc::now()).unwrap();
        let v1 = store.create_versioned(vec![v1]).await.unwrap().remove(0);

        let v2 = store.save_versions(vec![v1.with_data(policy(60))], actor).await.unwrap().remove(0);
        assert_eq!(v2.meta.version, 2);
        let v3 = store.save_versions(vec![v2.with_data(policy(30))], actor).await.unwrap().remove(0);
        assert_eq!(v3.meta.version, 3);

        let history = store.history(&key).await;
        assert_eq!(history.len(), 3);
        assert!(verify_history(&history).is_ok());
        assert_eq!(history.iter().filter(|v| v.meta.is_current).count(), 1);
        assert_eq!(history.iter().filter(|v| v.meta.valid_to.is_none()).count(), 1);
        assert_eq!(history[0].meta.valid_to, Some(history[1].meta.valid_from));
    }

    #[tokio::test]
    async fn test_unchanged_content_creates_no_version() {
        let store = InMemoryTemporalStore::<PaymentPolicy>::new();
        let actor = Uuid::new_v4();
        let v1 = PaymentPolicyModel::create(parse_business_key("p").unwrap(), policy(90), actor, Utc::now()).unwrap();
        let v1 = store.create_versioned(vec![v1]).await.unwrap().remove(0);
        let same = store.save_versions(vec![v1.clone()], actor).await.unwrap().remove(0);
        assert_eq!(same.meta.version, 1);
        assert_eq!(store.all_rows().await.len(), 1);
    }

    #[tokio::test]
    async fn test_stale_version_is_rejected() {
        let store = InMemoryTemporalStore::<PaymentPolicy>::new();
        let actor = Uuid::new_v4();
        let v1 = PaymentPolicyModel::create(parse_business_key("p").unwrap(), policy(90), actor, Utc::now()).unwrap();
        let v1 = store.create_versioned(vec![v1]).await.unwrap().remove(0);
        store.save_versions(vec![v1.with_data(policy(60))], actor).await.unwrap();

        let mut stale = v1.with_data(policy(45));
        stale.data.refund_approval_threshold = Decimal::from(10);
        let err = store.save_versions(vec![stale], actor).await.unwrap_err();
        assert_eq!(err.to_string(), "Concurrent update detected");
    }

    #[tokio::test]
    async fn test_soft_delete_and_as_of() {
        let store = InMemoryTemporalStore::<PaymentPolicy>::new();
        let actor = Uuid::new_v4();
        let key = parse_business_key("p").unwrap();
        let v1 = PaymentPolicyModel::create(key.clone(), policy(90), actor, Utc::now()).unwrap();
        let v1 = store.create_versioned(vec![v1]).await.unwrap().remove(0);
        let before_delete = Utc::now();

        assert_eq!(store.close_versions(&[key.clone()], actor).await.unwrap(), 1);
        assert_eq!(store.close_versions(&[key.clone()], actor).await.unwrap(), 0);
        assert!(store.find_current(&key).await.unwrap().is_none());

        let history = store.history(&key).await;
        assert!(history.iter().all(|v| v.meta.valid_to.is_some()));
        let as_of = store.find_as_of(&key, before_delete).await.unwrap();
        assert_eq!(as_of.map(|v| v.meta.id), Some(v1.meta.id));
    }
}
