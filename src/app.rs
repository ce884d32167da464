// Application root
// Builds the shared HTTP client, session persistence, session context and
// domain APIs once, from a single configuration

use std::sync::Arc;
use tracing::info;

use crate::api::{
    AdminApi, BookingApi, LocationApi, ReviewApi, TrekApi, UserApi, VendorApi, WithdrawalApi,
};
use crate::auth::{Notifier, SessionContext, TracingNotifier};
use crate::config::ClientConfig;
use crate::http::HttpClient;
use crate::store::{FileStorage, SessionStorage, TokenStore};

/// Everything a front end needs, sharing one client and one token slot
#[derive(Clone)]
pub struct TrekClient {
    pub session: Arc<SessionContext>,
    pub treks: TrekApi,
    pub bookings: BookingApi,
    pub reviews: ReviewApi,
    pub users: UserApi,
    pub vendors: VendorApi,
    pub withdrawals: WithdrawalApi,
    pub locations: LocationApi,
    pub admin: AdminApi,
}

impl TrekClient {
    /// Persist the session in the configured session file
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let storage = Arc::new(FileStorage::new(config.session_file.clone()));
        Self::with_parts(config, storage, Arc::new(TracingNotifier))
    }

    pub fn with_parts(
        config: &ClientConfig,
        storage: Arc<dyn SessionStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, reqwest::Error> {
        let client = HttpClient::new(config)?;
        info!(
            "Trek client ready for {} ({})",
            client.base_url(),
            config.environment
        );

        let session = SessionContext::with_notifier(client.clone(), TokenStore::new(storage), notifier);

        Ok(Self {
            session: Arc::new(session),
            treks: TrekApi::new(client.clone()),
            bookings: BookingApi::new(client.clone()),
            reviews: ReviewApi::new(client.clone()),
            users: UserApi::new(client.clone()),
            vendors: VendorApi::new(client.clone()),
            withdrawals: WithdrawalApi::new(client.clone()),
            locations: LocationApi::new(client.clone()),
            admin: AdminApi::new(client),
        })
    }
}
