//! Para client facade
//!
//! [`ParaClient`] exposes the public operations. Each one validates its
//! input, builds the resource path and parameters, and hands off to the
//! [`Invoker`]. Bad input (empty ids, empty lists) short-circuits to an
//! empty result without touching the network.
//!
//! Calls take `&mut self` and run one at a time: the credential store and
//! any [`Pager`] passed in are mutated in place.

use std::sync::Arc;

use para_domain::constants::{
    BATCH_PATH, JWT_PATH, ME_PATH, NEW_KEYS_PATH, READ_BY_ID_PATH, RESULTS_FIELD, SEARCH_PATH,
};
use para_domain::{ClientConfig, Credentials, Entity, Pager, ParaError, QueryParams, Result};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::invoker::{Invoker, InvokerSettings};
use crate::mapper::{entities_from_payload, entity_from_payload, entity_list_from_payload};
use crate::pagination::{apply_envelope, pager_to_query_params};
use crate::response::Payload;
use crate::transport_ports::{HttpMethod, HttpTransport};

/// Client for the Para REST API
pub struct ParaClient {
    invoker: Invoker,
}

impl ParaClient {
    /// Create a client using the system clock
    pub fn new(config: &ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self::with_clock(config, transport, Arc::new(SystemClock))
    }

    /// Create a client reading time from `clock`
    pub fn with_clock(
        config: &ClientConfig,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone().unwrap_or_default(),
            config.secret_key.clone(),
        );
        Self {
            invoker: Invoker::new(
                InvokerSettings::from_config(config),
                credentials,
                transport,
                clock,
            ),
        }
    }

    /// Application id, i.e. the access key without its `app:` prefix
    pub fn app_id(&self) -> &str {
        self.invoker.credentials().app_id()
    }

    pub fn credentials(&self) -> &Credentials {
        self.invoker.credentials()
    }

    pub fn endpoint(&self) -> &str {
        &self.invoker.settings().endpoint
    }

    pub fn api_path(&self) -> &str {
        &self.invoker.settings().api_path
    }

    // ------------------------------------------------------------------
    // Raw invocation
    // ------------------------------------------------------------------

    /// GET a resource relative to the API path
    ///
    /// # Errors
    /// Propagates any error from the invoker.
    pub async fn invoke_get(&mut self, resource_path: &str, query: QueryParams) -> Result<Payload> {
        self.invoker.invoke(HttpMethod::Get, resource_path, &[], query, None).await
    }

    /// POST a JSON body; `None` sends no body
    ///
    /// # Errors
    /// Propagates any error from the invoker.
    pub async fn invoke_post(&mut self, resource_path: &str, body: Option<&Value>) -> Result<Payload> {
        self.invoker.invoke(HttpMethod::Post, resource_path, &[], QueryParams::new(), body).await
    }

    /// PUT a JSON body; `None` sends no body
    ///
    /// # Errors
    /// Propagates any error from the invoker.
    pub async fn invoke_put(&mut self, resource_path: &str, body: Option<&Value>) -> Result<Payload> {
        self.invoker.invoke(HttpMethod::Put, resource_path, &[], QueryParams::new(), body).await
    }

    /// DELETE a resource
    ///
    /// # Errors
    /// Propagates any error from the invoker.
    pub async fn invoke_delete(&mut self, resource_path: &str, query: QueryParams) -> Result<Payload> {
        self.invoker.invoke(HttpMethod::Delete, resource_path, &[], query, None).await
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Persist a new object; returns it with its assigned id
    ///
    /// # Errors
    /// Fails on configuration, transport, remote or decode errors.
    pub async fn create(&mut self, entity: &Entity) -> Result<Option<Entity>> {
        let path = urlencoding::encode(entity.type_name()).into_owned();
        let body = entity.to_value();
        entity_from_payload(self.invoke_post(&path, Some(&body)).await?)
    }

    /// Read an object by id, optionally scoped to a type
    ///
    /// # Errors
    /// A missing object is reported as a remote 404 (see `ParaError::is_not_found`).
    pub async fn read(&mut self, type_name: Option<&str>, id: &str) -> Result<Option<Entity>> {
        if id.is_empty() {
            warn!("read called without an id");
            return Ok(None);
        }
        let id = urlencoding::encode(id);
        let path = match type_name.filter(|t| !t.is_empty()) {
            Some(type_name) => format!("{}/{id}", urlencoding::encode(type_name)),
            None => format!("{READ_BY_ID_PATH}/{id}"),
        };
        entity_from_payload(self.invoke_get(&path, QueryParams::new()).await?)
    }

    /// Overwrite an existing object
    ///
    /// # Errors
    /// Fails on configuration, transport, remote or decode errors.
    pub async fn update(&mut self, entity: &Entity) -> Result<Option<Entity>> {
        if !has_id(entity) {
            warn!("update called on an object without id");
            return Ok(None);
        }
        let body = entity.to_value();
        entity_from_payload(self.invoke_put(&entity.object_uri(), Some(&body)).await?)
    }

    /// Delete an object; returns `false` when it has no id
    ///
    /// # Errors
    /// Fails on configuration, transport or remote errors.
    pub async fn delete(&mut self, entity: &Entity) -> Result<bool> {
        if !has_id(entity) {
            warn!("delete called on an object without id");
            return Ok(false);
        }
        self.invoke_delete(&entity.object_uri(), QueryParams::new()).await?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Batch
    // ------------------------------------------------------------------

    /// Create many objects in one request
    ///
    /// # Errors
    /// Fails on configuration, transport, remote or decode errors.
    pub async fn create_all(&mut self, entities: &[Entity]) -> Result<Vec<Entity>> {
        if entities.is_empty() {
            warn!("create_all called with no objects");
            return Ok(Vec::new());
        }
        let body = Value::Array(entities.iter().map(Entity::to_value).collect());
        entities_from_payload(self.invoke_post(BATCH_PATH, Some(&body)).await?)
    }

    /// Read many objects by id in one request
    ///
    /// # Errors
    /// Fails on configuration, transport, remote or decode errors.
    pub async fn read_all(&mut self, ids: &[String]) -> Result<Vec<Entity>> {
        if ids.is_empty() {
            warn!("read_all called with no ids");
            return Ok(Vec::new());
        }
        let query = QueryParams::new().with("ids", ids);
        entities_from_payload(self.invoke_get(BATCH_PATH, query).await?)
    }

    /// Update many objects in one request
    ///
    /// # Errors
    /// Fails on configuration, transport, remote or decode errors.
    pub async fn update_all(&mut self, entities: &[Entity]) -> Result<Vec<Entity>> {
        if entities.is_empty() {
            warn!("update_all called with no objects");
            return Ok(Vec::new());
        }
        let body = Value::Array(entities.iter().map(Entity::to_value).collect());
        entities_from_payload(self.invoke_put(BATCH_PATH, Some(&body)).await?)
    }

    /// Delete many objects by id in one request
    ///
    /// # Errors
    /// Fails on configuration, transport or remote errors.
    pub async fn delete_all(&mut self, ids: &[String]) -> Result<bool> {
        if ids.is_empty() {
            warn!("delete_all called with no ids");
            return Ok(false);
        }
        let query = QueryParams::new().with("ids", ids);
        self.invoke_delete(BATCH_PATH, query).await?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Listing and search
    // ------------------------------------------------------------------

    /// One page of all objects of a type
    ///
    /// # Errors
    /// Fails on configuration, transport, remote or decode errors.
    pub async fn list_objects(
        &mut self,
        type_name: &str,
        pager: Option<&mut Pager>,
    ) -> Result<Vec<Entity>> {
        if type_name.is_empty() {
            warn!("list_objects called without a type");
            return Ok(Vec::new());
        }
        let query = pager.as_deref().map(pager_to_query_params).unwrap_or_default();
        let path = urlencoding::encode(type_name).into_owned();
        let payload = self.invoke_get(&path, query).await?;
        entity_list_from_payload(payload, RESULTS_FIELD, pager)
    }

    /// Full-text query within a type
    ///
    /// # Errors
    /// Fails on configuration, transport, remote or decode errors.
    pub async fn find_query(
        &mut self,
        type_name: &str,
        query: &str,
        pager: Option<&mut Pager>,
    ) -> Result<Vec<Entity>> {
        let params = QueryParams::new().with("q", query).with("type", type_name);
        self.find("", params, pager).await
    }

    /// Objects carrying all the given tags
    ///
    /// `tags` is sent as a multi-valued parameter.
    ///
    /// # Errors
    /// Fails on configuration, transport, remote or decode errors.
    pub async fn find_tagged(
        &mut self,
        type_name: &str,
        tags: &[String],
        pager: Option<&mut Pager>,
    ) -> Result<Vec<Entity>> {
        let params = QueryParams::new().with("tags", tags).with("type", type_name);
        self.find("tagged", params, pager).await
    }

    /// Search for a single object by id
    ///
    /// # Errors
    /// Fails on configuration, transport, remote or decode errors.
    pub async fn find_by_id(&mut self, id: &str) -> Result<Option<Entity>> {
        if id.is_empty() {
            warn!("find_by_id called without an id");
            return Ok(None);
        }
        let params = QueryParams::new().with("id", id);
        Ok(self.find("id", params, None).await?.into_iter().next())
    }

    /// Number of objects of a type
    ///
    /// # Errors
    /// Fails on configuration, transport, remote or decode errors.
    pub async fn get_count(&mut self, type_name: &str) -> Result<u64> {
        if type_name.is_empty() {
            warn!("get_count called without a type");
            return Ok(0);
        }
        let params = QueryParams::new().with("type", type_name);
        let path = format!("{SEARCH_PATH}/count");
        match self.invoke_get(&path, params).await? {
            Payload::Json(envelope) => {
                let mut pager = Pager::new();
                apply_envelope(&envelope, &mut pager);
                Ok(pager.count)
            }
            Payload::Empty => Ok(0),
            Payload::Text(_) => Err(ParaError::Decode("Count response is not JSON".to_string())),
        }
    }

    async fn find(
        &mut self,
        query_type: &str,
        mut params: QueryParams,
        pager: Option<&mut Pager>,
    ) -> Result<Vec<Entity>> {
        if let Some(pager) = pager.as_deref() {
            params.extend(pager_to_query_params(pager));
        }
        let path = if query_type.is_empty() {
            SEARCH_PATH.to_string()
        } else {
            format!("{SEARCH_PATH}/{query_type}")
        };
        let payload = self.invoke_get(&path, params).await?;
        entity_list_from_payload(payload, RESULTS_FIELD, pager)
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    /// Exchange an identity provider token for a session
    ///
    /// On success the session token is stored and the user is returned.
    /// Any failure clears the session.
    ///
    /// # Errors
    /// Fails on configuration, transport or remote errors.
    pub async fn sign_in(&mut self, provider: &str, provider_token: &str) -> Result<Option<Entity>> {
        if provider.is_empty() || provider_token.is_empty() {
            warn!("sign_in called without a provider or token");
            return Ok(None);
        }
        let body = json!({
            "appid": self.app_id(),
            "provider": provider,
            "token": provider_token,
        });

        let payload = match self.invoke_post(JWT_PATH, Some(&body)).await {
            Ok(payload) => payload,
            Err(e) => {
                self.invoker.clear_session();
                return Err(e);
            }
        };

        let user = payload.as_json().and_then(|response| self.invoker.apply_session(response));
        match &user {
            Some(user) => info!(user_id = user.id().unwrap_or_default(), provider, "Signed in"),
            None => {
                self.invoker.clear_session();
                warn!(provider, "Sign-in response did not contain a session");
            }
        }
        Ok(user)
    }

    /// Revoke the session on the server and forget it locally
    ///
    /// The local session is cleared even when the server call fails.
    ///
    /// # Errors
    /// Returns the error of the revoke call, if any.
    pub async fn sign_out(&mut self) -> Result<()> {
        let result = if self.invoker.credentials().has_session_token() {
            self.invoke_delete(JWT_PATH, QueryParams::new()).await.map(|_| ())
        } else {
            Ok(())
        };
        self.invoker.clear_session();
        info!("Signed out");
        result
    }

    /// Run the session refresh check now
    ///
    /// Returns `true` when a new token was obtained.
    pub async fn refresh_token(&mut self) -> bool {
        self.invoker.refresh_session().await
    }

    /// Use an existing session token
    pub fn set_access_token(&mut self, token: &str) {
        if token.is_empty() {
            self.invoker.clear_session();
        } else {
            self.invoker.set_session_token(token);
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.invoker.credentials().session_token.as_deref()
    }

    pub fn clear_access_token(&mut self) {
        self.invoker.clear_session();
    }

    // ------------------------------------------------------------------
    // Misc
    // ------------------------------------------------------------------

    /// The authenticated user, or the app itself when signing with keys
    ///
    /// # Errors
    /// Fails on configuration, transport, remote or decode errors.
    pub async fn me(&mut self) -> Result<Option<Entity>> {
        entity_from_payload(self.invoke_get(ME_PATH, QueryParams::new()).await?)
    }

    /// Generate a new secret key for the app
    ///
    /// When the response carries `secretKey` the client switches to it.
    ///
    /// # Errors
    /// Fails on configuration, transport or remote errors.
    pub async fn new_keys(&mut self) -> Result<Map<String, Value>> {
        let payload = self.invoke_post(NEW_KEYS_PATH, None).await?;
        let Some(Value::Object(keys)) = payload.into_json() else {
            return Ok(Map::new());
        };

        let secret = keys.get("secretKey").and_then(Value::as_str).filter(|s| !s.is_empty());
        if let Some(secret) = secret {
            let access_key = keys
                .get("accessKey")
                .and_then(Value::as_str)
                .filter(|a| !a.is_empty())
                .map_or_else(|| self.invoker.credentials().access_key.clone(), str::to_string);
            self.invoker.credentials_mut().rotate_keys(access_key, Some(secret.to_string()));
            info!("Secret key rotated");
        }
        Ok(keys)
    }
}

fn has_id(entity: &Entity) -> bool {
    entity.id().is_some_and(|id| !id.is_empty())
}
