use std::sync::Arc;

use bizdash_core::Config;
use bizdash_gbp::{BusinessProfileApi, GbpClient};
use bizdash_identity::{HttpIdentityProvider, IdentityProvider, OrgService};

use crate::error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub identity: Arc<dyn IdentityProvider>,
    pub gbp: Arc<dyn BusinessProfileApi>,
    pub orgs: Arc<OrgService>,
}

impl AppState {
    pub fn new(config: Config) -> ApiResult<Self> {
        let identity: Arc<dyn IdentityProvider> = Arc::new(
            HttpIdentityProvider::new(config.identity.clone()).map_err(ApiError::from)?,
        );
        let gbp: Arc<dyn BusinessProfileApi> =
            Arc::new(GbpClient::new(config.gbp.clone()).map_err(ApiError::from)?);
        Ok(Self::with_providers(config, identity, gbp))
    }

    /// Wire up explicit providers; integration tests inject fakes here.
    pub fn with_providers(
        config: Config,
        identity: Arc<dyn IdentityProvider>,
        gbp: Arc<dyn BusinessProfileApi>,
    ) -> Self {
        let orgs = Arc::new(OrgService::new(identity.clone()));
        Self {
            config: Arc::new(config),
            identity,
            gbp,
            orgs,
        }
    }
}
