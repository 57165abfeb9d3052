use funeral_core_api::{ApiError, ApiResult};
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::temporal::{TemporalEntity, Versioned};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "template_category", rename_all = "PascalCase"))]
pub enum TemplateCategory {
    Obituary,
    PrayerCard,
    ServiceProgram,
    Bookmark,
    ThankYouCard,
}

impl fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateCategory::Obituary => write!(f, "Obituary"),
            TemplateCategory::PrayerCard => write!(f, "PrayerCard"),
            TemplateCategory::ServiceProgram => write!(f, "ServiceProgram"),
            TemplateCategory::Bookmark => write!(f, "Bookmark"),
            TemplateCategory::ThankYouCard => write!(f, "ThankYouCard"),
        }
    }
}

impl FromStr for TemplateCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Obituary" => Ok(TemplateCategory::Obituary),
            "PrayerCard" => Ok(TemplateCategory::PrayerCard),
            "ServiceProgram" => Ok(TemplateCategory::ServiceProgram),
            "Bookmark" => Ok(TemplateCategory::Bookmark),
            "ThankYouCard" => Ok(TemplateCategory::ThankYouCard),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "template_status", rename_all = "PascalCase"))]
pub enum TemplateStatus {
    Draft,
    Active,
    Retired,
}

impl fmt::Display for TemplateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateStatus::Draft => write!(f, "Draft"),
            TemplateStatus::Active => write!(f, "Active"),
            TemplateStatus::Retired => write!(f, "Retired"),
        }
    }
}

/// Layout used to generate printed memorial material.
///
/// `body` is HTML containing `{{placeholder}}` tokens that are filled from
/// the case when a document is generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorialTemplate {
    pub name: HeaplessString<100>,
    pub category: TemplateCategory,
    pub body: String,
    pub status: TemplateStatus,
}

pub type MemorialTemplateModel = Versioned<MemorialTemplate>;

impl TemporalEntity for MemorialTemplate {
    const ENTITY: &'static str = "MemorialTemplate";
}

impl MemorialTemplate {
    pub fn publish(&self) -> ApiResult<Self> {
        if self.status != TemplateStatus::Draft {
            return Err(ApiError::transition(Self::ENTITY, self.status, TemplateStatus::Active));
        }
        if self.body.trim().is_empty() {
            return Err(ApiError::rule(format!("template '{}' has an empty body", self.name)));
        }
        let mut next = self.clone();
        next.status = TemplateStatus::Active;
        Ok(next)
    }

    pub fn retire(&self) -> ApiResult<Self> {
        if self.status != TemplateStatus::Active {
            return Err(ApiError::transition(Self::ENTITY, self.status, TemplateStatus::Retired));
        }
        let mut next = self.clone();
        next.status = TemplateStatus::Retired;
        Ok(next)
    }

    /// New body text; a revised Active template goes back to Draft.
    pub fn revise(&self, body: String) -> ApiResult<Self> {
        if self.status == TemplateStatus::Retired {
            return Err(ApiError::transition(Self::ENTITY, self.status, TemplateStatus::Draft));
        }
        let mut next = self.clone();
        next.body = body;
        next.status = TemplateStatus::Draft;
        Ok(next)
    }
}
