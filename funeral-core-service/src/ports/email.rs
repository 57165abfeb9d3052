use async_trait::async_trait;
use funeral_core_api::ApiResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> ApiResult<()>;
}
