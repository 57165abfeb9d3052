use funeral_core_api::{ApiError, ApiResult};
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::temporal::{BusinessKey, TemporalEntity, Versioned};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "contact_relationship", rename_all = "PascalCase"))]
pub enum ContactRelationship {
    Spouse,
    Child,
    Parent,
    Sibling,
    Relative,
    Friend,
    Clergy,
    Attorney,
    Other,
}

impl fmt::Display for ContactRelationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactRelationship::Spouse => write!(f, "Spouse"),
            ContactRelationship::Child => write!(f, "Child"),
            ContactRelationship::Parent => write!(f, "Parent"),
            ContactRelationship::Sibling => write!(f, "Sibling"),
            ContactRelationship::Relative => write!(f, "Relative"),
            ContactRelationship::Friend => write!(f, "Friend"),
            ContactRelationship::Clergy => write!(f, "Clergy"),
            ContactRelationship::Attorney => write!(f, "Attorney"),
            ContactRelationship::Other => write!(f, "Other"),
        }
    }
}

impl FromStr for ContactRelationship {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Spouse" => Ok(ContactRelationship::Spouse),
            "Child" => Ok(ContactRelationship::Child),
            "Parent" => Ok(ContactRelationship::Parent),
            "Sibling" => Ok(ContactRelationship::Sibling),
            "Relative" => Ok(ContactRelationship::Relative),
            "Friend" => Ok(ContactRelationship::Friend),
            "Clergy" => Ok(ContactRelationship::Clergy),
            "Attorney" => Ok(ContactRelationship::Attorney),
            "Other" => Ok(ContactRelationship::Other),
            _ => Err(()),
        }
    }
}

/// Family member or other party attached to a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub first_name: HeaplessString<50>,
    pub last_name: HeaplessString<50>,
    pub email: Option<HeaplessString<100>>,
    pub phone: Option<HeaplessString<30>>,
    pub relationship: ContactRelationship,
    pub case_key: Option<BusinessKey>,
    pub address: Option<HeaplessString<200>>,
    pub notes: Option<HeaplessString<500>>,
}

pub type ContactModel = Versioned<Contact>;

impl TemporalEntity for Contact {
    const ENTITY: &'static str = "Contact";
}

impl Contact {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// A contact must be reachable by at least one channel.
    pub fn ensure_reachable(&self) -> ApiResult<()> {
        let has_email = self.email.as_ref().is_some_and(|e| !e.is_empty());
        let has_phone = self.phone.as_ref().is_some_and(|p| !p.is_empty());
        if !has_email && !has_phone {
            return Err(ApiError::validation(format!(
                "contact {} needs an email or a phone number",
                self.full_name()
            )));
        }
        Ok(())
    }
}
