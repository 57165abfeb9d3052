use chrono::{NaiveDate, Utc};
use funeral_core_api::{ApiError, ApiResult};
use funeral_core_db::domain::render_placeholders;
use funeral_core_db::models::case::Case;
use funeral_core_db::models::memorial_template::{
    MemorialTemplate, MemorialTemplateModel, TemplateCategory, TemplateStatus,
};
use funeral_core_db::models::temporal::parse_business_key;
use funeral_core_db::repository::{CaseRepository, FindActiveTemplateByCategory, MemorialTemplateRepository};
use funeral_core_db::utils::to_heapless;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::support::{create_one, first_version, require_current, save_one};
use crate::commands::CreateTemplateCommand;
use crate::ports::PdfRenderer;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorialDocument {
    pub file_name: String,
    pub html: String,
    pub pdf: Vec<u8>,
}

fn long_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%B %-d, %Y").to_string()).unwrap_or_default()
}

/// Values available to `{{placeholder}}` tokens.
fn placeholder_values(case: &Case) -> BTreeMap<&'static str, String> {
    BTreeMap::from([
        ("decedent_name", case.decedent_name.to_string()),
        ("case_number", case.case_number.to_string()),
        ("date_of_birth", long_date(case.date_of_birth)),
        ("date_of_death", long_date(case.date_of_death)),
        ("service_date", long_date(case.service_date)),
        ("service_type", case.service_type.to_string()),
        (
            "funeral_director",
            case.funeral_director_name.as_ref().map(|n| n.to_string()).unwrap_or_default(),
        ),
    ])
}

pub struct MemorialService {
    templates: Arc<dyn MemorialTemplateRepository>,
    cases: Arc<dyn CaseRepository>,
    pdf: Arc<dyn PdfRenderer>,
}

impl MemorialService {
    pub fn new(
        templates: Arc<dyn MemorialTemplateRepository>,
        cases: Arc<dyn CaseRepository>,
        pdf: Arc<dyn PdfRenderer>,
    ) -> Self {
        Self { templates, cases, pdf }
    }

    async fn require(&self, template_key: &str) -> ApiResult<MemorialTemplateModel> {
        let key = parse_business_key(template_key)?;
        require_current::<MemorialTemplate, _>(&*self.templates, &key).await
    }

    async fn apply<F>(&self, template_key: &str, actor: Uuid, step: F) -> ApiResult<MemorialTemplateModel>
    where
        F: FnOnce(&MemorialTemplate) -> ApiResult<MemorialTemplate>,
    {
        let current = self.require(template_key).await?;
        let next = step(&current.data)?;
        let saved = save_one(&*self.templates, &current, next, actor).await?;
        info!(template = %saved.meta.business_key, status = %saved.data.status, version = saved.meta.version, "Template saved");
        Ok(saved)
    }

    pub async fn create_template(&self, cmd: CreateTemplateCommand, actor: Uuid) -> ApiResult<MemorialTemplateModel> {
        cmd.validate()?;
        let template = MemorialTemplate {
            name: to_heapless(&cmd.name, "name")?,
            category: cmd.category,
            body: cmd.body,
            status: TemplateStatus::Draft,
        };
        create_one(&*self.templates, first_version(template, actor, Utc::now())?).await
    }

    pub async fn revise_template(&self, template_key: &str, body: String, actor: Uuid) -> ApiResult<MemorialTemplateModel> {
        self.apply(template_key, actor, |t| t.revise(body)).await
    }

    pub async fn publish_template(&self, template_key: &str, actor: Uuid) -> ApiResult<MemorialTemplateModel> {
        self.apply(template_key, actor, MemorialTemplate::publish).await
    }

    pub async fn retire_template(&self, template_key: &str, actor: Uuid) -> ApiResult<MemorialTemplateModel> {
        self.apply(template_key, actor, MemorialTemplate::retire).await
    }

    pub async fn active_template(&self, category: TemplateCategory) -> ApiResult<MemorialTemplateModel> {
        self.templates
            .find_active_template_by_category(category)
            .await
            .map_err(ApiError::persistence)?
            .ok_or_else(|| ApiError::not_found("MemorialTemplate", category))
    }

    /// Fills an Active template with the case's details and renders it to PDF.
    pub async fn generate_memorial_document(&self, template_key: &str, case_key: &str) -> ApiResult<MemorialDocument> {
        let template = self.require(template_key).await?;
        if template.data.status != TemplateStatus::Active {
            return Err(ApiError::rule(format!(
                "template '{}' is {} and cannot be used",
                template.data.name, template.data.status
            )));
        }
        let case_key = parse_business_key(case_key)?;
        let case = require_current::<Case, _>(&*self.cases, &case_key).await?;

        let html = render_placeholders(&template.data.body, &placeholder_values(&case.data))?;
        let file_name = format!(
            "{}-{}.pdf",
            case.data.case_number,
            template.data.category.to_string().to_lowercase()
        );
        let pdf = self.pdf.render(&html, &file_name).await?;
        info!(template = %template.meta.business_key, case = %case_key, %file_name, "Memorial document generated");
        Ok(MemorialDocument { file_name, html, pdf })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FakePdf, InMemoryRepositories};
    use funeral_core_db::models::case::{CaseStatus, ServiceType};
    use funeral_core_db::repository::CreateVersioned;
    use heapless::String as HeaplessString;

    struct Fixture {
        pdf: Arc<FakePdf>,
        service: MemorialService,
        actor: Uuid,
        case_key: String,
    }

    async fn fixture() -> Fixture {
        let repos = InMemoryRepositories::new();
        let pdf = Arc::new(FakePdf::default());
        let service = MemorialService::new(repos.templates.clone(), repos.cases.clone(), pdf.clone());
        let actor = Uuid::new_v4();
        let case = Case {
            case_number: HeaplessString::try_from("FH-2026-0009").unwrap(),
            decedent_name: HeaplessString::try_from("Eleanor <Nell> Rigby").unwrap(),
            date_of_birth: NaiveDate::from_ymd_opt(1931, 3, 2),
            date_of_death: NaiveDate::from_ymd_opt(2026, 10, 1),
            service_type: ServiceType::MemorialService,
            service_date: NaiveDate::from_ymd_opt(2026, 10, 8),
            funeral_director_id: None,
            funeral_director_name: Some(HeaplessString::try_from("Father McKenzie").unwrap()),
            primary_contact_key: None,
            status: CaseStatus::Active,
            finalized_at: None,
        };
        let case = repos
            .cases
            .create_versioned(vec![first_version(case, actor, Utc::now()).unwrap()])
            .await
            .unwrap()
            .remove(0);
        Fixture {
            pdf,
            service,
            actor,
            case_key: case.meta.business_key.to_string(),
        }
    }

    fn obituary(body: &str) -> CreateTemplateCommand {
        CreateTemplateCommand {
            name: "Classic obituary".into(),
            category: TemplateCategory::Obituary,
            body: body.into(),
        }
    }

    #[tokio::test]
    async fn test_generate_document_from_active_template() {
        let f = fixture().await;
        let template = f
            .service
            .create_template(
                obituary("<h1>{{decedent_name}}</h1><p>{{date_of_birth}} - {{date_of_death}}</p><p>{{service_type}}, {{ funeral_director }}</p>"),
                f.actor,
            )
            .await
            .unwrap();
        let key = template.meta.business_key.to_string();

        let err = f.service.generate_memorial_document(&key, &f.case_key).await.unwrap_err();
        assert!(matches!(err, ApiError::BusinessRuleViolation(_)));

        f.service.publish_template(&key, f.actor).await.unwrap();
        let doc = f.service.generate_memorial_document(&key, &f.case_key).await.unwrap();
        assert_eq!(
            doc.html,
            "<h1>Eleanor &lt;Nell&gt; Rigby</h1><p>March 2, 1931 - October 1, 2026</p><p>Memorial Service, Father McKenzie</p>"
        );
        assert_eq!(doc.file_name, "FH-2026-0009-obituary.pdf");
        assert_eq!(doc.pdf, doc.html.as_bytes());
        assert_eq!(f.pdf.rendered.lock().await.len(), 1);

        let active = f.service.active_template(TemplateCategory::Obituary).await.unwrap();
        assert_eq!(active.meta.business_key.as_str(), key);
    }

    #[tokio::test]
    async fn test_unknown_placeholder_is_rejected() {
        let f = fixture().await;
        let template = f.service.create_template(obituary("{{burial_plot}}"), f.actor).await.unwrap();
        let key = template.meta.business_key.to_string();
        f.service.publish_template(&key, f.actor).await.unwrap();
        assert!(matches!(
            f.service.generate_memorial_document(&key, &f.case_key).await,
            Err(ApiError::ValidationError(_))
        ));
        assert!(f.pdf.rendered.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_template_lifecycle() {
        let f = fixture().await;
        let template = f.service.create_template(obituary("<p>{{decedent_name}}</p>"), f.actor).await.unwrap();
        let key = template.meta.business_key.to_string();
        f.service.publish_template(&key, f.actor).await.unwrap();

        let revised = f
            .service
            .revise_template(&key, "<p>In memory of {{decedent_name}}</p>".into(), f.actor)
            .await
            .unwrap();
        assert_eq!(revised.data.status, TemplateStatus::Draft);
        assert!(f.service.active_template(TemplateCategory::Obituary).await.unwrap_err().is_not_found());

        f.service.publish_template(&key, f.actor).await.unwrap();
        let retired = f.service.retire_template(&key, f.actor).await.unwrap();
        assert_eq!(retired.data.status, TemplateStatus::Retired);
        assert_eq!(retired.meta.version, 5);
        assert!(f.service.revise_template(&key, "x".into(), f.actor).await.is_err());
    }
}
