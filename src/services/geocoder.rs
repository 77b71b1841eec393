use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use crate::models::Coordinates;

/// Errors that can occur while resolving an address
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Geocoding request timed out")]
    AttemptTimedOut,

    #[error("Geocoding timed out after {attempts} attempts")]
    TimedOut { attempts: u32 },

    #[error("Geocoder returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl GeocodeError {
    fn is_retryable(&self) -> bool {
        matches!(self, GeocodeError::AttemptTimedOut)
    }
}

/// Resolves a free-text address to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the address is well-formed but unknown
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

/// Fixed-delay retry for timed-out attempts
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(1),
        }
    }
}

/// Run `operation` until it succeeds, fails with a non-timeout error, or has
/// timed out `max_attempts` times
///
/// The closure receives the 1-based attempt number.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, GeocodeError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, GeocodeError>>,
{
    let attempts = policy.max_attempts.max(1);

    for attempt in 1..=attempts {
        match operation(attempt).await {
            Err(e) if e.is_retryable() => {
                tracing::warn!("Geocoding attempt {}/{} timed out", attempt, attempts);
                if attempt < attempts && !policy.delay.is_zero() {
                    tokio::time::sleep(policy.delay).await;
                }
            }
            other => return other,
        }
    }

    Err(GeocodeError::TimedOut { attempts })
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Geocoder backed by a Nominatim-compatible `/search` endpoint
///
/// Results, including "not found", are cached per normalized address.
pub struct NominatimGeocoder {
    endpoint: String,
    user_agent: String,
    client: Client,
    retry: RetryPolicy,
    cache: moka::future::Cache<String, Option<Coordinates>>,
}

impl NominatimGeocoder {
    pub fn new(
        endpoint: String,
        user_agent: String,
        request_timeout: Duration,
        retry: RetryPolicy,
        cache_capacity: u64,
        cache_ttl: Duration,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder().timeout(request_timeout).build()?;

        let cache = moka::future::CacheBuilder::new(cache_capacity)
            .time_to_live(cache_ttl)
            .build();

        Ok(Self {
            endpoint,
            user_agent,
            client,
            retry,
            cache,
        })
    }

    async fn geocode_once(&self, address: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.endpoint.trim_end_matches('/'),
            urlencoding::encode(address)
        );

        tracing::debug!("Geocoding address via {}", url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(classify)?;

        if !response.status().is_success() {
            return Err(GeocodeError::ApiError(format!(
                "Geocoding failed: {}",
                response.status()
            )));
        }

        let places: Vec<NominatimPlace> = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GeocodeError::AttemptTimedOut
            } else {
                GeocodeError::InvalidResponse(format!("Failed to parse places: {}", e))
            }
        })?;

        let Some(place) = places.first() else {
            return Ok(None);
        };

        let latitude = parse_degrees(&place.lat)?;
        let longitude = parse_degrees(&place.lon)?;

        Ok(Some(Coordinates { latitude, longitude }))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let key = address.trim().to_lowercase();
        if let Some(cached) = self.cache.get(&key).await {
            tracing::trace!("Geocode cache hit: {}", key);
            return Ok(cached);
        }

        let this = self;
        let coordinates = with_retry(&self.retry, move |_| this.geocode_once(address)).await?;

        self.cache.insert(key, coordinates).await;
        Ok(coordinates)
    }
}

/// Geocoder used when lookups are switched off; never resolves anything
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGeocoder;

#[async_trait]
impl Geocoder for DisabledGeocoder {
    async fn geocode(&self, _address: &str) -> Result<Option<Coordinates>, GeocodeError> {
        Ok(None)
    }
}

fn classify(error: reqwest::Error) -> GeocodeError {
    if error.is_timeout() {
        GeocodeError::AttemptTimedOut
    } else {
        GeocodeError::RequestError(error)
    }
}

fn parse_degrees(value: &str) -> Result<f64, GeocodeError> {
    value
        .parse()
        .map_err(|_| GeocodeError::InvalidResponse(format!("Invalid coordinate: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn no_delay(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            delay: Duration::ZERO,
        }
    }

    fn geocoder(endpoint: String) -> NominatimGeocoder {
        NominatimGeocoder::new(
            endpoint,
            "event-match-tests".to_string(),
            Duration::from_secs(5),
            no_delay(3),
            100,
            Duration::from_secs(60),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_retry_stops_after_max_attempts() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = with_retry(&no_delay(4), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(GeocodeError::AttemptTimedOut) }
        })
        .await;

        assert!(matches!(result, Err(GeocodeError::TimedOut { attempts: 4 })));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_retry_recovers() {
        let result = with_retry(&no_delay(5), |attempt| async move {
            if attempt < 3 {
                Err(GeocodeError::AttemptTimedOut)
            } else {
                Ok(attempt)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_retry_does_not_repeat_other_errors() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = with_retry(&no_delay(5), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(GeocodeError::ApiError("500".into())) }
        })
        .await;

        assert!(matches!(result, Err(GeocodeError::ApiError(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_nominatim_resolves_and_caches() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::UrlEncoded("q".into(), "Main St".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"lat": "52.5200", "lon": "13.4050", "display_name": "Berlin"}]"#)
            .expect(1)
            .create_async()
            .await;

        let geocoder = geocoder(server.url());

        let first = geocoder.geocode("Main St").await.unwrap().unwrap();
        let second = geocoder.geocode("  main st ").await;

        assert!((first.latitude - 52.52).abs() < 1e-9);
        assert!((first.longitude - 13.405).abs() < 1e-9);
        // Second call is served from the cache; the mock only allows one hit
        assert!(second.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_nominatim_unknown_address() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let result = geocoder(server.url()).geocode("Nowhere").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_nominatim_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let result = geocoder(server.url()).geocode("Main St").await;
        assert!(matches!(result, Err(GeocodeError::ApiError(_))));
    }

    #[tokio::test]
    async fn test_disabled_geocoder() {
        assert!(DisabledGeocoder.geocode("Main St").await.unwrap().is_none());
    }
}
