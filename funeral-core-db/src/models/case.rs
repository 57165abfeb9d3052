use chrono::{DateTime, NaiveDate, Utc};
use funeral_core_api::{ApiError, ApiResult};
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::temporal::{BusinessKey, TemporalEntity, Versioned};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "case_status", rename_all = "PascalCase"))]
pub enum CaseStatus {
    Inquiry,
    Active,
    Completed,
    Archived,
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseStatus::Inquiry => write!(f, "Inquiry"),
            CaseStatus::Active => write!(f, "Active"),
            CaseStatus::Completed => write!(f, "Completed"),
            CaseStatus::Archived => write!(f, "Archived"),
        }
    }
}

impl FromStr for CaseStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Inquiry" => Ok(CaseStatus::Inquiry),
            "Active" => Ok(CaseStatus::Active),
            "Completed" => Ok(CaseStatus::Completed),
            "Archived" => Ok(CaseStatus::Archived),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "service_type", rename_all = "PascalCase"))]
pub enum ServiceType {
    TraditionalBurial,
    Cremation,
    MemorialService,
    GravesideService,
    DirectBurial,
    DirectCremation,
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceType::TraditionalBurial => write!(f, "Traditional Burial"),
            ServiceType::Cremation => write!(f, "Cremation"),
            ServiceType::MemorialService => write!(f, "Memorial Service"),
            ServiceType::GravesideService => write!(f, "Graveside Service"),
            ServiceType::DirectBurial => write!(f, "Direct Burial"),
            ServiceType::DirectCremation => write!(f, "Direct Cremation"),
        }
    }
}

/// A funeral case opened for one decedent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub case_number: HeaplessString<20>,
    pub decedent_name: HeaplessString<100>,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    pub service_type: ServiceType,
    pub service_date: Option<NaiveDate>,
    /// Person id of the assigned funeral director
    pub funeral_director_id: Option<Uuid>,
    pub funeral_director_name: Option<HeaplessString<100>>,
    /// Business key of the primary Contact
    pub primary_contact_key: Option<BusinessKey>,
    pub status: CaseStatus,
    pub finalized_at: Option<DateTime<Utc>>,
}

pub type CaseModel = Versioned<Case>;

impl TemporalEntity for Case {
    const ENTITY: &'static str = "Case";
}

impl Case {
    fn transition(&self, from: CaseStatus, to: CaseStatus) -> ApiResult<Self> {
        if self.status != from {
            return Err(ApiError::transition(Self::ENTITY, self.status, to));
        }
        let mut next = self.clone();
        next.status = to;
        Ok(next)
    }

    pub fn activate(&self) -> ApiResult<Self> {
        self.transition(CaseStatus::Inquiry, CaseStatus::Active)
    }

    pub fn finalize(&self, now: DateTime<Utc>) -> ApiResult<Self> {
        let mut next = self.transition(CaseStatus::Active, CaseStatus::Completed)?;
        next.finalized_at = Some(now);
        Ok(next)
    }

    pub fn archive(&self) -> ApiResult<Self> {
        self.transition(CaseStatus::Completed, CaseStatus::Archived)
    }

    /// Archived cases are read-only.
    pub fn ensure_editable(&self) -> ApiResult<()> {
        if self.status == CaseStatus::Archived {
            return Err(ApiError::rule(format!(
                "case {} is archived",
                self.case_number
            )));
        }
        Ok(())
    }

    pub fn validate_dates(&self) -> ApiResult<()> {
        if let (Some(birth), Some(death)) = (self.date_of_birth, self.date_of_death) {
            if birth > death {
                return Err(ApiError::validation("date of birth is after date of death"));
            }
        }
        if let (Some(death), Some(service)) = (self.date_of_death, self.service_date) {
            if service < death {
                return Err(ApiError::validation("service date is before date of death"));
            }
        }
        Ok(())
    }
}
