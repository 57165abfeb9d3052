use chrono::Utc;
use funeral_core_api::{ApiError, ApiResult};
use funeral_core_db::models::contact::{Contact, ContactModel};
use funeral_core_db::models::temporal::parse_business_key;
use funeral_core_db::repository::{CloseVersion, ContactRepository, FindContactsByCase, LoadHistory, Page, PageRequest};
use funeral_core_db::utils::{to_heapless, to_optional_heapless};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::support::{create_one, first_version, require_current, save_one};
use crate::commands::ContactInput;

fn contact_from(input: &ContactInput) -> ApiResult<Contact> {
    input.validate()?;
    let contact = Contact {
        first_name: to_heapless(&input.first_name, "first_name")?,
        last_name: to_heapless(&input.last_name, "last_name")?,
        email: to_optional_heapless(input.email.as_deref(), "email")?,
        phone: to_optional_heapless(input.phone.as_deref(), "phone")?,
        relationship: input.relationship,
        case_key: input.case_key.as_deref().map(parse_business_key).transpose()?,
        address: to_optional_heapless(input.address.as_deref(), "address")?,
        notes: to_optional_heapless(input.notes.as_deref(), "notes")?,
    };
    contact.ensure_reachable()?;
    Ok(contact)
}

pub struct ContactService {
    contacts: Arc<dyn ContactRepository>,
}

impl ContactService {
    pub fn new(contacts: Arc<dyn ContactRepository>) -> Self {
        Self { contacts }
    }

    pub async fn create_contact(&self, input: ContactInput, actor: Uuid) -> ApiResult<ContactModel> {
        let contact = contact_from(&input)?;
        let saved = create_one(&*self.contacts, first_version(contact, actor, Utc::now())?).await?;
        info!(contact = %saved.meta.business_key, "Contact created");
        Ok(saved)
    }

    /// Replaces every field of the contact.
    pub async fn update_contact(&self, contact_key: &str, input: ContactInput, actor: Uuid) -> ApiResult<ContactModel> {
        let key = parse_business_key(contact_key)?;
        let current = require_current::<Contact, _>(&*self.contacts, &key).await?;
        save_one(&*self.contacts, &current, contact_from(&input)?, actor).await
    }

    /// Soft delete: the history is kept, the contact stops being current.
    pub async fn delete_contact(&self, contact_key: &str, actor: Uuid) -> ApiResult<()> {
        let key = parse_business_key(contact_key)?;
        let closed = self
            .contacts
            .close_versions(&[key.clone()], actor)
            .await
            .map_err(ApiError::persistence)?;
        if closed == 0 {
            return Err(ApiError::not_found("Contact", key));
        }
        info!(contact = %key, "Contact deleted");
        Ok(())
    }

    pub async fn contacts_for_case(&self, case_key: &str) -> ApiResult<Vec<ContactModel>> {
        let key = parse_business_key(case_key)?;
        let mut contacts = self
            .contacts
            .find_contacts_by_case(&key)
            .await
            .map_err(ApiError::persistence)?;
        contacts.sort_by(|a, b| {
            (a.data.last_name.as_str(), a.data.first_name.as_str())
                .cmp(&(b.data.last_name.as_str(), b.data.first_name.as_str()))
        });
        Ok(contacts)
    }

    pub async fn contact_history(&self, contact_key: &str, page: PageRequest) -> ApiResult<Page<ContactModel>> {
        let key = parse_business_key(contact_key)?;
        let history = self.contacts.load_history(&key, page).await.map_err(ApiError::persistence)?;
        if history.total == 0 {
            return Err(ApiError::not_found("Contact", key));
        }
        Ok(history)
    }
}
