use async_trait::async_trait;
use funeral_core_api::ApiResult;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureRequest {
    pub contract_key: String,
    pub document_title: String,
    pub signer_name: String,
    pub signer_email: String,
    pub contract_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureEnvelope {
    pub envelope_id: String,
    pub signing_url: String,
}

/// E-signature provider.
#[async_trait]
pub trait SignatureService: Send + Sync {
    async fn create_envelope(&self, request: &SignatureRequest) -> ApiResult<SignatureEnvelope>;
}
