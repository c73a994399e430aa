use crate::core::{
    domain::{
        error::FleetResult,
        model::server_record::{ServerRecord, ServerRecordList},
        value_object::EndpointUrl,
    },
    infrastructure::api_client::{ApiClient, RateLimitConfig},
};
use crate::inventory::application::request::{CreateServerRequest, UpdateServerRequest};

const SERVERS_PATH: &str = "api/v1/servers";

/// Typed client for the inventory collaborator's server-record CRUD API.
///
/// Every call returns either the unwrapped payload or `FleetError::Api`
/// carrying the backend's error message. Collaborator failures are returned
/// to the caller; they never affect stream state.
#[derive(Debug)]
pub struct InventoryService {
    api_client: ApiClient,
}

impl InventoryService {
    /// Creates a service rooted at the collaborator base URL.
    ///
    /// # Errors
    /// Returns `FleetError::Validation` for an invalid URL.
    pub fn new(base_url: impl Into<String>) -> FleetResult<Self> {
        Self::with_rate_limit(base_url, None)
    }

    /// Creates a service with optional client-side rate limiting.
    pub fn with_rate_limit(
        base_url: impl Into<String>,
        rate_limit: Option<RateLimitConfig>,
    ) -> FleetResult<Self> {
        let base_url = EndpointUrl::new(base_url)?;
        Ok(Self {
            api_client: ApiClient::new(base_url, rate_limit)?,
        })
    }

    /// Creates a service from `FLEETWATCH_API_URL` /
    /// `FLEETWATCH_API_BASE_URL`, defaulting to `http://localhost:8080`.
    pub fn from_env() -> FleetResult<Self> {
        Self::new(crate::api_base_url_from_env())
    }

    /// Returns the collaborator base URL.
    pub fn base_url(&self) -> &EndpointUrl {
        self.api_client.base_url()
    }

    /// Lists all registered servers.
    pub async fn list(&self) -> FleetResult<ServerRecordList> {
        self.api_client
            .get::<ServerRecordList>(SERVERS_PATH)
            .await?
            .require_data("Failed to fetch servers")
    }

    /// Fetches one registered server by id.
    pub async fn get(&self, id: &str) -> FleetResult<ServerRecord> {
        self.api_client
            .get::<ServerRecord>(&format!("{}/{}", SERVERS_PATH, id))
            .await?
            .require_data("Failed to fetch server")
    }

    /// Registers a new server.
    pub async fn create(&self, params: CreateServerRequest) -> FleetResult<ServerRecord> {
        self.api_client
            .post::<_, ServerRecord>(SERVERS_PATH, &params)
            .await?
            .require_data("Failed to create server")
    }

    /// Partially updates a registered server.
    ///
    /// An omitted or empty password keeps the stored credential.
    pub async fn update(
        &self,
        id: &str,
        params: UpdateServerRequest,
    ) -> FleetResult<ServerRecord> {
        let params = params.normalized();
        self.api_client
            .put::<_, ServerRecord>(&format!("{}/{}", SERVERS_PATH, id), &params)
            .await?
            .require_data("Failed to update server")
    }

    /// Deletes a registered server.
    pub async fn delete(&self, id: &str) -> FleetResult<()> {
        self.api_client
            .delete::<serde_json::Value>(&format!("{}/{}", SERVERS_PATH, id))
            .await?
            .ack("Failed to delete server")
    }

    /// Flips a server's active flag and returns the updated record.
    pub async fn toggle_active(&self, id: &str) -> FleetResult<ServerRecord> {
        self.api_client
            .patch::<ServerRecord>(&format!("{}/{}/toggle", SERVERS_PATH, id))
            .await?
            .require_data("Failed to toggle server status")
    }
}
