//! EspoCRM HTTP client implementation.
//!
//! [`EspoClient`] owns the request pipeline: it composes endpoint URLs,
//! injects credentials, classifies HTTP outcomes, and decodes typed
//! response bodies. All entity operations require authentication; the
//! client holds at most one live [`AuthSession`], replaced wholesale by
//! each successful login.

mod endpoints;

pub use endpoints::{ListParams, ListResponse, Order};

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, trace};

use crate::auth::{AccessToken, ApiKey, AuthSession, RefreshToken};
use crate::error::Error;
use crate::types::{Entity, ServerUrl};

use endpoints::{entity_path, record_path, AuthRequest, AuthResponse, AUTH_PATH};

/// Header carrying a pre-shared static API key.
const API_KEY_HEADER: &str = "X-Api-Key";

/// Immutable client configuration: server base URL and optional static
/// API key. Set once at construction and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    server: ServerUrl,
    api_key: Option<ApiKey>,
}

impl Config {
    /// Create a configuration for the given server, with no API key.
    pub fn new(server: ServerUrl) -> Self {
        Self {
            server,
            api_key: None,
        }
    }

    /// Configure a static API key; requests will carry it in the
    /// `X-Api-Key` header and skip bearer authentication.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(ApiKey::new(key));
        self
    }

    /// Returns the server base URL.
    pub fn server(&self) -> &ServerUrl {
        &self.server
    }

    /// Returns the static API key, if one is configured.
    pub fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref()
    }
}

/// Asynchronous EspoCRM API client.
///
/// Cheap to clone (internal `Arc`) and safe to share across tasks. Clones
/// share the same session slot, so a login through one clone authenticates
/// all of them.
///
/// # Example
///
/// ```no_run
/// use espocrm::{Config, Entity, EspoClient, ListParams, Record, ServerUrl};
///
/// # async fn example() -> Result<(), espocrm::Error> {
/// let server = ServerUrl::new("https://crm.example.com")?;
/// let client = EspoClient::new(Config::new(server));
/// client.login("admin", "password").await?;
///
/// let accounts: espocrm::ListResponse<Record> = client
///     .list(&Entity::new("Account")?, &ListParams::default())
///     .await?;
///
/// for account in accounts.list {
///     println!("{:?}: {:?}", account.id, account.get("name"));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct EspoClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    http: reqwest::Client,
    config: Config,
    session: RwLock<Option<AuthSession>>,
}

impl EspoClient {
    /// Create a new client for the given configuration.
    pub fn new(config: Config) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("espocrm/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client");

        Self::with_http_client(config, http)
    }

    /// Create a client using a caller-supplied `reqwest::Client`.
    pub fn with_http_client(config: Config, http: reqwest::Client) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                http,
                config,
                session: RwLock::new(None),
            }),
        }
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Returns a snapshot of the current session, if any.
    pub async fn session(&self) -> Option<AuthSession> {
        self.inner.session.read().await.clone()
    }

    /// Install a previously persisted session without re-authenticating.
    ///
    /// The caller is responsible for ensuring the session is still valid.
    pub async fn restore_session(&self, session: AuthSession) {
        *self.inner.session.write().await = Some(session);
    }

    /// Drop the current session. Subsequent authenticated calls fail with
    /// [`Error::MissingAuthToken`] unless a static API key is configured.
    pub async fn clear_session(&self) {
        *self.inner.session.write().await = None;
    }

    /// Authenticate with username and password, storing the resulting
    /// session as the client's current session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the credentials are
    /// rejected. The stored session is only replaced on success.
    #[instrument(skip(self, password), fields(server = %self.inner.config.server()))]
    pub async fn login(&self, user_name: &str, password: &str) -> Result<AuthSession, Error> {
        info!("authenticating");

        let body = AuthRequest {
            user_name,
            password,
        };
        let builder = self.request(Method::POST, AUTH_PATH)?;
        let builder = json_body(builder, &body)?;
        let auth: AuthResponse = self.send(builder).await?;

        let session = AuthSession::new(
            AccessToken::new(auth.token),
            auth.refresh_token.map(RefreshToken::new),
            auth.expire_at,
        );
        *self.inner.session.write().await = Some(session.clone());

        debug!("session established");
        Ok(session)
    }

    /// List records of an entity type.
    #[instrument(skip(self), fields(entity = %entity))]
    pub async fn list<T>(&self, entity: &Entity, params: &ListParams) -> Result<ListResponse<T>, Error>
    where
        T: DeserializeOwned,
    {
        debug!("listing records");

        let builder = self.request(Method::GET, &entity_path(entity))?.query(params);
        let builder = self.authorize(builder).await?;
        self.send(builder).await
    }

    /// Fetch a single record by id, optionally selecting specific
    /// attributes.
    #[instrument(skip(self), fields(entity = %entity))]
    pub async fn fetch<T>(
        &self,
        entity: &Entity,
        id: &str,
        select: Option<&[&str]>,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        debug!("fetching record");

        let mut builder = self.request(Method::GET, &record_path(entity, id))?;
        if let Some(select) = select {
            builder = builder.query(&[("select", select.join(","))]);
        }
        let builder = self.authorize(builder).await?;
        self.send(builder).await
    }

    /// Create a record from any serializable body.
    #[instrument(skip(self, body), fields(entity = %entity))]
    pub async fn create<T, B>(&self, entity: &Entity, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!("creating record");

        let builder = self.request(Method::POST, &entity_path(entity))?;
        let builder = json_body(builder, body)?;
        let builder = self.authorize(builder).await?;
        self.send(builder).await
    }

    /// Update a record by id from any serializable body.
    #[instrument(skip(self, body), fields(entity = %entity))]
    pub async fn update<T, B>(&self, entity: &Entity, id: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!("updating record");

        let builder = self.request(Method::PATCH, &record_path(entity, id))?;
        let builder = json_body(builder, body)?;
        let builder = self.authorize(builder).await?;
        self.send(builder).await
    }

    /// Start a request: compose the endpoint URL, set the JSON content
    /// type, and attach the static API key when configured.
    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, Error> {
        let url = self.inner.config.server().join(path)?;
        let mut builder = self
            .inner
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(key) = self.inner.config.api_key() {
            builder = builder.header(API_KEY_HEADER, key.as_str());
        }
        Ok(builder)
    }

    /// Require a credential for an authenticated request, failing before
    /// any network I/O when none is available. With a static API key the
    /// key header (already attached) is the auth mechanism; otherwise the
    /// current session token goes into a bearer `Authorization` header.
    async fn authorize(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, Error> {
        if self.inner.config.api_key().is_some() {
            return Ok(builder);
        }

        let token = {
            let session = self.inner.session.read().await;
            session.as_ref().map(|s| s.token().as_str().to_string())
        };

        match token {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => Err(Error::MissingAuthToken),
        }
    }

    /// Execute a request and decode the response body.
    async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, Error> {
        let response = builder.send().await?;
        let status = response.status();
        trace!(status = %status, "API response");

        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }

        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: i32::from(status.as_u16()),
                message: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        serde_json::from_slice(&body).map_err(|e| Error::Decoding(e.to_string()))
    }
}

/// Serialize a request body up front so encode failures surface as
/// [`Error::Encoding`] before anything is sent.
fn json_body<B: Serialize + ?Sized>(
    builder: reqwest::RequestBuilder,
    body: &B,
) -> Result<reqwest::RequestBuilder, Error> {
    let bytes = serde_json::to_vec(body).map_err(|e| Error::Encoding(e.to_string()))?;
    Ok(builder.body(bytes))
}
