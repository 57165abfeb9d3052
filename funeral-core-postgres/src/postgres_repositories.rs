use funeral_core_db::models::case::Case;
use funeral_core_db::models::contact::Contact;
use funeral_core_db::models::contract::Contract;
use funeral_core_db::models::memorial_template::MemorialTemplate;
use funeral_core_db::models::payment::Payment;
use funeral_core_db::models::policy::{PaymentPolicy, SchedulingPolicy};
use sqlx::PgPool;
use std::sync::Arc;

use crate::executor::Executor;
use crate::repository::{AppointmentRepositoryImpl, TemporalRepositoryImpl};

pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Create all repositories sharing a single transaction
    ///
    /// The returned executor commits or rolls back the unit of work.
    pub async fn create_all_repositories(&self) -> Result<(FuneralRepositories, Executor), sqlx::Error> {
        let executor = Executor::begin(&self.pool).await?;
        Ok((FuneralRepositories::new(executor.clone()), executor))
    }
}

pub struct FuneralRepositories {
    pub cases: Arc<TemporalRepositoryImpl<Case>>,
    pub contracts: Arc<TemporalRepositoryImpl<Contract>>,
    pub payments: Arc<TemporalRepositoryImpl<Payment>>,
    pub contacts: Arc<TemporalRepositoryImpl<Contact>>,
    pub templates: Arc<TemporalRepositoryImpl<MemorialTemplate>>,
    pub payment_policies: Arc<TemporalRepositoryImpl<PaymentPolicy>>,
    pub scheduling_policies: Arc<TemporalRepositoryImpl<SchedulingPolicy>>,
    pub appointments: Arc<AppointmentRepositoryImpl>,
}

impl FuneralRepositories {
    pub fn new(executor: Executor) -> Self {
        Self {
            cases: Arc::new(TemporalRepositoryImpl::new(executor.clone())),
            contracts: Arc::new(TemporalRepositoryImpl::new(executor.clone())),
            payments: Arc::new(TemporalRepositoryImpl::new(executor.clone())),
            contacts: Arc::new(TemporalRepositoryImpl::new(executor.clone())),
            templates: Arc::new(TemporalRepositoryImpl::new(executor.clone())),
            payment_policies: Arc::new(TemporalRepositoryImpl::new(executor.clone())),
            scheduling_policies: Arc::new(TemporalRepositoryImpl::new(executor.clone())),
            appointments: Arc::new(AppointmentRepositoryImpl::new(executor)),
        }
    }
}
