//! # Storefront API Client
//!
//! REST client for the storefront backend.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          HttpApi Request                                │
//! │                                                                         │
//! │  caller ──► endpoint(&["cart", "remove", id])                           │
//! │               │   {base_url}/api/cart/remove/{id}                       │
//! │               ▼                                                         │
//! │           attach Bearer token (if TokenStore has one)                   │
//! │               │                                                         │
//! │               ▼                                                         │
//! │           send ──► 2xx ──► body "" / "null" ──► None                    │
//! │               │            body JSON       ──► Some(T)                  │
//! │               │                                                         │
//! │               └──► non-2xx ──► ClientError::Http { status, detail }     │
//! │                                (detail from the server's JSON body)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart mutations answer with a status message rather than the new cart,
//! so they return `()` and callers reload the cart afterwards. The same
//! holds for profile, address, order-status and appointment updates.
//! Creates return the stored record.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use medimart_core::{
    Address, AppointmentStatus, AuthToken, Cart, Consultation, LabTest, Medicine, NewAddress,
    NewConsultation, NewLabTest, Order, OrderRequest, OrderStatus, Pharmacy, Profile,
    ProfileUpdate, Registration, Review, DEFAULT_SEARCH_RADIUS_KM,
};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::auth::TokenStore;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

// =============================================================================
// Query Types
// =============================================================================

/// Location filter for listing nearby pharmacies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// Search radius in kilometres. Defaults to 10 km.
    pub radius_km: Option<f64>,
}

impl GeoQuery {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        GeoQuery {
            latitude,
            longitude,
            radius_km: None,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius_km.unwrap_or(DEFAULT_SEARCH_RADIUS_KM)
    }
}

// =============================================================================
// API Trait
// =============================================================================

/// Every backend operation the storefront uses.
///
/// Implemented over HTTP by [`HttpApi`]; tests substitute an in-memory
/// backend.
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    // ---- Auth ---------------------------------------------------------------
    async fn login(&self, username: &str, password: &str) -> ClientResult<AuthToken>;
    async fn register(&self, registration: &Registration) -> ClientResult<AuthToken>;

    // ---- Cart ---------------------------------------------------------------
    /// Returns `None` when the user has no cart yet.
    async fn get_cart(&self) -> ClientResult<Option<Cart>>;
    async fn add_to_cart(&self, medicine_id: &str, quantity: i64) -> ClientResult<()>;
    /// Forwards `quantity` unchanged, including 0 and negatives.
    async fn update_cart_item(&self, medicine_id: &str, quantity: i64) -> ClientResult<()>;
    async fn remove_from_cart(&self, medicine_id: &str) -> ClientResult<()>;
    async fn clear_cart(&self) -> ClientResult<()>;

    // ---- Medicines ----------------------------------------------------------
    async fn get_medicine(&self, medicine_id: &str) -> ClientResult<Medicine>;
    async fn get_reviews(&self, medicine_id: &str) -> ClientResult<Vec<Review>>;
    /// One review per user and medicine; the server rejects a second one.
    async fn add_review(&self, medicine_id: &str, rating: f64, comment: &str) -> ClientResult<Review>;
    async fn get_alternatives(&self, medicine_id: &str) -> ClientResult<Vec<Medicine>>;

    // ---- Pharmacies ---------------------------------------------------------
    async fn list_pharmacies(&self, near: Option<GeoQuery>) -> ClientResult<Vec<Pharmacy>>;
    async fn get_pharmacy(&self, pharmacy_id: &str) -> ClientResult<Pharmacy>;
    async fn list_pharmacy_medicines(&self, pharmacy_id: &str) -> ClientResult<Vec<Medicine>>;

    // ---- Addresses ----------------------------------------------------------
    async fn list_addresses(&self) -> ClientResult<Vec<Address>>;
    async fn create_address(&self, address: &NewAddress) -> ClientResult<Address>;
    async fn update_address(&self, address_id: &str, address: &NewAddress) -> ClientResult<()>;
    async fn delete_address(&self, address_id: &str) -> ClientResult<()>;

    // ---- Profile ------------------------------------------------------------
    async fn get_profile(&self) -> ClientResult<Profile>;
    async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<()>;

    // ---- Orders -------------------------------------------------------------
    async fn create_order(&self, request: &OrderRequest) -> ClientResult<Order>;
    async fn list_orders(&self) -> ClientResult<Vec<Order>>;
    async fn get_order(&self, order_id: &str) -> ClientResult<Order>;
    async fn update_order_status(&self, order_id: &str, status: &OrderStatus) -> ClientResult<()>;

    // ---- Lab Tests ----------------------------------------------------------
    async fn list_lab_tests(&self) -> ClientResult<Vec<LabTest>>;
    async fn get_lab_test(&self, test_id: &str) -> ClientResult<LabTest>;
    async fn create_lab_test(&self, test: &NewLabTest) -> ClientResult<LabTest>;
    async fn update_lab_test_status(
        &self,
        test_id: &str,
        status: &AppointmentStatus,
        results_url: Option<&str>,
    ) -> ClientResult<()>;
    async fn delete_lab_test(&self, test_id: &str) -> ClientResult<()>;

    // ---- Consultations ------------------------------------------------------
    async fn list_consultations(&self) -> ClientResult<Vec<Consultation>>;
    async fn get_consultation(&self, consultation_id: &str) -> ClientResult<Consultation>;
    async fn create_consultation(&self, consultation: &NewConsultation) -> ClientResult<Consultation>;
    async fn update_consultation_status(
        &self,
        consultation_id: &str,
        status: &AppointmentStatus,
        diagnosis: Option<&str>,
        prescription_url: Option<&str>,
    ) -> ClientResult<()>;
    async fn delete_consultation(&self, consultation_id: &str) -> ClientResult<()>;
}

// =============================================================================
// HTTP Implementation
// =============================================================================

/// `reqwest`-backed [`StorefrontApi`].
#[derive(Debug, Clone)]
pub struct HttpApi {
    http: Client,
    root: Url,
    tokens: Arc<TokenStore>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl HttpApi {
    /// Builds a client for the configured backend.
    pub fn new(config: &ClientConfig, tokens: Arc<TokenStore>) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("HTTP client: {}", e)))?;

        Ok(HttpApi {
            http,
            root: config.api_root()?,
            tokens,
        })
    }

    /// `{base_url}/api/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.root.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.root.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> ClientResult<RequestBuilder> {
        let url = self.endpoint(segments)?;
        debug!(%method, path = url.path(), "API request");

        let mut builder = self.http.request(method, url);
        if let Some(token) = self.tokens.get() {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    /// Sends the request and returns the body of a 2xx response.
    async fn execute(&self, builder: RequestBuilder) -> ClientResult<String> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let detail = error_detail(&body)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "request failed".to_string());
            debug!(status = status.as_u16(), %detail, "API error");
            return Err(ClientError::Http {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(body)
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let body = self.execute(builder).await?;
        decode_optional(&body)?.ok_or_else(|| ClientError::Decode("empty response body".into()))
    }

    async fn fetch_optional<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> ClientResult<Option<T>> {
        let body = self.execute(builder).await?;
        decode_optional(&body)
    }
}

/// Decodes a body where empty and `null` both mean "absent".
fn decode_optional<T: DeserializeOwned>(body: &str) -> ClientResult<Option<T>> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(trimmed)?))
}

/// Pulls the `detail` field out of an error body, falling back to the raw text.
fn error_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<ErrorBody>(trimmed) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(s),
        }) => Some(s),
        Ok(ErrorBody { detail }) => Some(detail.to_string()),
        Err(_) => Some(trimmed.to_string()),
    }
}

/// Query-string pairs for endpoints that take form fields as parameters.
type Params = Vec<(&'static str, String)>;

/// Pushes `(key, value)` only when a non-empty value is present.
fn push_optional(params: &mut Params, key: &'static str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        params.push((key, value.to_string()));
    }
}

/// ISO-8601 without offset, the form the backend parses.
fn iso_date(at: &NaiveDateTime) -> String {
    at.format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[async_trait]
impl StorefrontApi for HttpApi {
    async fn login(&self, username: &str, password: &str) -> ClientResult<AuthToken> {
        let body = serde_json::json!({ "username": username, "password": password });
        self.fetch(self.request(Method::POST, &["login"])?.json(&body))
            .await
    }

    async fn register(&self, registration: &Registration) -> ClientResult<AuthToken> {
        self.fetch(self.request(Method::POST, &["register"])?.json(registration))
            .await
    }

    async fn get_cart(&self) -> ClientResult<Option<Cart>> {
        self.fetch_optional(self.request(Method::GET, &["cart"])?)
            .await
    }

    async fn add_to_cart(&self, medicine_id: &str, quantity: i64) -> ClientResult<()> {
        let builder = self
            .request(Method::POST, &["cart", "add"])?
            .query(&[("medicine_id", medicine_id.to_string()), ("quantity", quantity.to_string())]);
        self.execute(builder).await.map(|_| ())
    }

    async fn update_cart_item(&self, medicine_id: &str, quantity: i64) -> ClientResult<()> {
        let builder = self
            .request(Method::PUT, &["cart", "update"])?
            .query(&[("medicine_id", medicine_id.to_string()), ("quantity", quantity.to_string())]);
        self.execute(builder).await.map(|_| ())
    }

    async fn remove_from_cart(&self, medicine_id: &str) -> ClientResult<()> {
        let builder = self.request(Method::DELETE, &["cart", "remove", medicine_id])?;
        self.execute(builder).await.map(|_| ())
    }

    async fn clear_cart(&self) -> ClientResult<()> {
        let builder = self.request(Method::DELETE, &["cart", "clear"])?;
        self.execute(builder).await.map(|_| ())
    }

    async fn get_medicine(&self, medicine_id: &str) -> ClientResult<Medicine> {
        self.fetch(self.request(Method::GET, &["medicines", medicine_id])?)
            .await
    }

    async fn get_reviews(&self, medicine_id: &str) -> ClientResult<Vec<Review>> {
        let builder = self.request(Method::GET, &["medicines", medicine_id, "reviews"])?;
        Ok(self.fetch_optional(builder).await?.unwrap_or_default())
    }

    async fn add_review(&self, medicine_id: &str, rating: f64, comment: &str) -> ClientResult<Review> {
        let builder = self
            .request(Method::POST, &["medicines", medicine_id, "reviews"])?
            .query(&[("rating", rating.to_string()), ("comment", comment.to_string())]);
        self.fetch(builder).await
    }

    async fn get_alternatives(&self, medicine_id: &str) -> ClientResult<Vec<Medicine>> {
        let builder = self.request(Method::GET, &["medicines", medicine_id, "alternatives"])?;
        Ok(self.fetch_optional(builder).await?.unwrap_or_default())
    }

    async fn list_pharmacies(&self, near: Option<GeoQuery>) -> ClientResult<Vec<Pharmacy>> {
        let mut builder = self.request(Method::GET, &["pharmacies"])?;
        if let Some(geo) = near {
            builder = builder.query(&[
                ("latitude", geo.latitude),
                ("longitude", geo.longitude),
                ("radius", geo.radius()),
            ]);
        }
        Ok(self.fetch_optional(builder).await?.unwrap_or_default())
    }

    async fn get_pharmacy(&self, pharmacy_id: &str) -> ClientResult<Pharmacy> {
        self.fetch(self.request(Method::GET, &["pharmacies", pharmacy_id])?)
            .await
    }

    async fn list_pharmacy_medicines(&self, pharmacy_id: &str) -> ClientResult<Vec<Medicine>> {
        let builder = self.request(Method::GET, &["pharmacies", pharmacy_id, "medicines"])?;
        Ok(self.fetch_optional(builder).await?.unwrap_or_default())
    }

    async fn list_addresses(&self) -> ClientResult<Vec<Address>> {
        let builder = self.request(Method::GET, &["addresses"])?;
        Ok(self.fetch_optional(builder).await?.unwrap_or_default())
    }

    async fn create_address(&self, address: &NewAddress) -> ClientResult<Address> {
        self.fetch(self.request(Method::POST, &["addresses"])?.json(address))
            .await
    }

    async fn update_address(&self, address_id: &str, address: &NewAddress) -> ClientResult<()> {
        let mut params: Params = vec![
            ("label", address.label.clone()),
            ("address_line1", address.address_line1.clone()),
            ("address_line2", address.address_line2.clone().unwrap_or_default()),
            ("city", address.city.clone()),
            ("state", address.state.clone()),
            ("pincode", address.pincode.clone()),
            ("phone", address.phone.clone()),
            ("is_default", address.is_default.to_string()),
        ];
        if let Some(latitude) = address.latitude {
            params.push(("latitude", latitude.to_string()));
        }
        if let Some(longitude) = address.longitude {
            params.push(("longitude", longitude.to_string()));
        }
        let builder = self
            .request(Method::PUT, &["addresses", address_id])?
            .query(&params);
        self.execute(builder).await.map(|_| ())
    }

    async fn delete_address(&self, address_id: &str) -> ClientResult<()> {
        let builder = self.request(Method::DELETE, &["addresses", address_id])?;
        self.execute(builder).await.map(|_| ())
    }

    async fn get_profile(&self) -> ClientResult<Profile> {
        self.fetch(self.request(Method::GET, &["profile"])?).await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<()> {
        let builder = self.request(Method::PUT, &["profile"])?.query(&[
            ("full_name", update.full_name.as_str()),
            ("email", update.email.as_str()),
            ("phone", update.phone.as_str()),
        ]);
        self.execute(builder).await.map(|_| ())
    }

    async fn create_order(&self, request: &OrderRequest) -> ClientResult<Order> {
        let builder = self.request(Method::POST, &["orders"])?.query(&[
            ("delivery_address", request.delivery_address.as_str()),
            ("phone", request.phone.as_str()),
            ("payment_method", request.payment_method.as_str()),
        ]);
        self.fetch(builder).await
    }

    async fn list_orders(&self) -> ClientResult<Vec<Order>> {
        let builder = self.request(Method::GET, &["orders"])?;
        Ok(self.fetch_optional(builder).await?.unwrap_or_default())
    }

    async fn get_order(&self, order_id: &str) -> ClientResult<Order> {
        self.fetch(self.request(Method::GET, &["orders", order_id])?)
            .await
    }

    async fn update_order_status(&self, order_id: &str, status: &OrderStatus) -> ClientResult<()> {
        let status = String::from(status.clone());
        let builder = self
            .request(Method::PUT, &["orders", order_id, "status"])?
            .query(&[("status", status)]);
        self.execute(builder).await.map(|_| ())
    }

    async fn list_lab_tests(&self) -> ClientResult<Vec<LabTest>> {
        let builder = self.request(Method::GET, &["lab-tests"])?;
        Ok(self.fetch_optional(builder).await?.unwrap_or_default())
    }

    async fn get_lab_test(&self, test_id: &str) -> ClientResult<LabTest> {
        self.fetch(self.request(Method::GET, &["lab-tests", test_id])?)
            .await
    }

    async fn create_lab_test(&self, test: &NewLabTest) -> ClientResult<LabTest> {
        let mut params: Params = vec![
            ("test_name", test.test_name.clone()),
            ("description", test.description.clone()),
            ("price", test.price.to_rupees_f64().to_string()),
            ("lab_name", test.lab_name.clone()),
            ("test_type", test.test_type.clone()),
            ("scheduled_date", iso_date(&test.scheduled_date)),
        ];
        push_optional(&mut params, "notes", test.notes.as_deref());
        let builder = self.request(Method::POST, &["lab-tests"])?.query(&params);
        self.fetch(builder).await
    }

    async fn update_lab_test_status(
        &self,
        test_id: &str,
        status: &AppointmentStatus,
        results_url: Option<&str>,
    ) -> ClientResult<()> {
        let mut params: Params = vec![("status", status.as_str().to_string())];
        push_optional(&mut params, "results_url", results_url);
        let builder = self
            .request(Method::PUT, &["lab-tests", test_id, "status"])?
            .query(&params);
        self.execute(builder).await.map(|_| ())
    }

    async fn delete_lab_test(&self, test_id: &str) -> ClientResult<()> {
        let builder = self.request(Method::DELETE, &["lab-tests", test_id])?;
        self.execute(builder).await.map(|_| ())
    }

    async fn list_consultations(&self) -> ClientResult<Vec<Consultation>> {
        let builder = self.request(Method::GET, &["consultations"])?;
        Ok(self.fetch_optional(builder).await?.unwrap_or_default())
    }

    async fn get_consultation(&self, consultation_id: &str) -> ClientResult<Consultation> {
        self.fetch(self.request(Method::GET, &["consultations", consultation_id])?)
            .await
    }

    async fn create_consultation(&self, consultation: &NewConsultation) -> ClientResult<Consultation> {
        let mut params: Params = vec![
            ("doctor_name", consultation.doctor_name.clone()),
            ("specialization", consultation.specialization.clone()),
            ("consultation_type", consultation.consultation_type.clone()),
            ("price", consultation.price.to_rupees_f64().to_string()),
            ("scheduled_date", iso_date(&consultation.scheduled_date)),
            ("duration_minutes", consultation.duration().to_string()),
        ];
        push_optional(&mut params, "symptoms", consultation.symptoms.as_deref());
        push_optional(&mut params, "notes", consultation.notes.as_deref());
        let builder = self.request(Method::POST, &["consultations"])?.query(&params);
        self.fetch(builder).await
    }

    async fn update_consultation_status(
        &self,
        consultation_id: &str,
        status: &AppointmentStatus,
        diagnosis: Option<&str>,
        prescription_url: Option<&str>,
    ) -> ClientResult<()> {
        let mut params: Params = vec![("status", status.as_str().to_string())];
        push_optional(&mut params, "diagnosis", diagnosis);
        push_optional(&mut params, "prescription_url", prescription_url);
        let builder = self
            .request(Method::PUT, &["consultations", consultation_id, "status"])?
            .query(&params);
        self.execute(builder).await.map(|_| ())
    }

    async fn delete_consultation(&self, consultation_id: &str) -> ClientResult<()> {
        let builder = self.request(Method::DELETE, &["consultations", consultation_id])?;
        self.execute(builder).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base_url: &str) -> HttpApi {
        let mut config = ClientConfig::default();
        config.api.base_url = base_url.to_string();
        HttpApi::new(&config, Arc::new(TokenStore::in_memory())).unwrap()
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let api = api("http://localhost:8000");
        assert_eq!(
            api.endpoint(&["cart", "remove", "m 1/x"]).unwrap().as_str(),
            "http://localhost:8000/api/cart/remove/m%201%2Fx"
        );
        assert_eq!(
            api.endpoint(&["cart"]).unwrap().as_str(),
            "http://localhost:8000/api/cart"
        );
    }

    #[test]
    fn test_decode_optional_null_and_empty() {
        assert_eq!(decode_optional::<Cart>("").unwrap(), None);
        assert_eq!(decode_optional::<Cart>("null").unwrap(), None);
        assert_eq!(decode_optional::<Cart>("  null \n").unwrap(), None);
        assert!(matches!(
            decode_optional::<Cart>("{\"items\": 5}"),
            Err(ClientError::Decode(_))
        ));
    }

    #[test]
    fn test_error_detail_extraction() {
        assert_eq!(
            error_detail(r#"{"detail": "Medicine not found"}"#).as_deref(),
            Some("Medicine not found")
        );
        assert_eq!(error_detail("Bad Gateway").as_deref(), Some("Bad Gateway"));
        assert_eq!(error_detail("  "), None);

        let structured = error_detail(r#"{"detail": [{"loc": ["query"], "msg": "required"}]}"#);
        assert!(structured.unwrap().contains("required"));
    }

    #[test]
    fn test_optional_params_skip_blank() {
        let mut params: Params = Vec::new();
        push_optional(&mut params, "notes", None);
        push_optional(&mut params, "notes", Some(""));
        push_optional(&mut params, "symptoms", Some("fever"));
        assert_eq!(params, vec![("symptoms", "fever".to_string())]);
    }

    #[test]
    fn test_geo_query_default_radius() {
        assert_eq!(GeoQuery::new(12.9, 77.6).radius(), 10.0);
        let wide = GeoQuery {
            radius_km: Some(25.0),
            ..GeoQuery::new(12.9, 77.6)
        };
        assert_eq!(wide.radius(), 25.0);
    }
}
