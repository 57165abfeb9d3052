use async_trait::async_trait;
use funeral_core_api::ApiResult;

/// Renders HTML to a PDF document.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, html: &str, file_name: &str) -> ApiResult<Vec<u8>>;
}
