//! REST client for the hotel back office

use super::mapping;
use crate::config::ApiConfig;
use crate::dates::DateRange;
use crate::environment::{
    ApiFuture, ClientDirectory, PaymentService, ReservationService, RoomCatalog,
};
use crate::error::ApiError;
use crate::types::{
    Client, ClientFields, PaymentRecord, PaymentRequest, ReservationRecord, ReservationRequest,
    RoomRecord,
};
use reqwest::{Client as HttpClient, RequestBuilder, StatusCode};
use serde_json::Value;

/// Hotel API client
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct HttpHotelApi {
    client: HttpClient,
    base_url: String,
    token: Option<String>,
}

impl HttpHotelApi {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = HttpClient::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        let request = self.authorize(self.client.get(self.url(path)).query(query));
        Self::execute(path, request).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let request = self.authorize(self.client.post(self.url(path)).json(body));
        Self::execute(path, request).await
    }

    async fn execute(path: &str, request: RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(path, error = %e, "Hotel API request failed");
            if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::Transport(e.to_string())
            }
        })?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(Value::Null),
            status if status.is_success() => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| ApiError::Decode(e.to_string()))?;
                if body.trim().is_empty() {
                    return Ok(Value::Null);
                }
                serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
            },
            status => {
                let body = response.text().await.unwrap_or_default();
                tracing::debug!(path, status = status.as_u16(), "Hotel API rejected request");
                Err(ApiError::Status {
                    status: status.as_u16(),
                    message: mapping::error_message(&body),
                })
            },
        }
    }
}

impl std::fmt::Debug for HttpHotelApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpHotelApi")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish_non_exhaustive()
    }
}

impl RoomCatalog for HttpHotelApi {
    fn find_available_rooms(&self, range: DateRange) -> ApiFuture<Vec<RoomRecord>> {
        let api = self.clone();
        Box::pin(async move {
            let query = [
                ("date_debut", range.start().to_string()),
                ("date_fin", range.end().to_string()),
            ];
            let body = api.get("chambres/disponibles", &query).await?;
            mapping::rooms(body)
        })
    }
}

impl ClientDirectory for HttpHotelApi {
    fn search_clients(&self, term: String) -> ApiFuture<Vec<Client>> {
        let api = self.clone();
        Box::pin(async move {
            let body = api.get("clients", &[("search", term)]).await?;
            mapping::clients(body)
        })
    }

    fn create_client(&self, fields: ClientFields) -> ApiFuture<Client> {
        let api = self.clone();
        Box::pin(async move {
            let body = api.post("clients", &mapping::client_body(&fields)).await?;
            mapping::client(body)
        })
    }
}

impl ReservationService for HttpHotelApi {
    fn create_reservation(&self, request: ReservationRequest) -> ApiFuture<ReservationRecord> {
        let api = self.clone();
        Box::pin(async move {
            let body = api
                .post("reservations", &mapping::reservation_body(&request))
                .await?;
            mapping::reservation(body, &request)
        })
    }
}

impl PaymentService for HttpHotelApi {
    fn create_payment(&self, request: PaymentRequest) -> ApiFuture<PaymentRecord> {
        let api = self.clone();
        Box::pin(async move {
            let body = api.post("paiements", &mapping::payment_body(&request)).await?;
            mapping::payment(body, &request)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;

    fn config(base_url: &str, token: Option<&str>) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
            token: token.map(str::to_string),
        }
    }

    #[test]
    fn urls_are_joined_on_the_trimmed_base() {
        let api = HttpHotelApi::new(&config("http://hotel.test/api/", None)).unwrap();
        assert_eq!(api.base_url(), "http://hotel.test/api");
        assert_eq!(api.url("clients"), "http://hotel.test/api/clients");
    }

    #[test]
    fn debug_hides_the_token() {
        let api = HttpHotelApi::new(&config("http://hotel.test", Some("secret"))).unwrap();
        let printed = format!("{api:?}");
        assert!(printed.contains("***"));
        assert!(!printed.contains("secret"));
    }
}
