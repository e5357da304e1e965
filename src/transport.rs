//! Submission transport.
//!
//! [`Transport`] is the seam between the form and the network. The default
//! [`HttpTransport`] drives a shared `reqwest` client; tests swap in
//! recording doubles, and [`NullTransport`] accepts everything for local
//! demos.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::serialize::Payload;

/// HTTP method used for submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitMethod {
	/// Send the payload as the request body of a POST.
	#[default]
	Post,
	/// Send the payload with a GET request.
	Get,
}

impl SubmitMethod {
	/// Uppercase method name.
	pub fn as_str(&self) -> &'static str {
		match self {
			SubmitMethod::Post => "POST",
			SubmitMethod::Get => "GET",
		}
	}
}

/// One outgoing submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
	/// Submission target.
	pub url: String,
	/// HTTP method.
	pub method: SubmitMethod,
	/// Extra request headers. A header named here overrides the one the
	/// payload format would set.
	pub headers: Vec<(String, String)>,
	/// Serialized form data.
	pub payload: Payload,
}

/// What the target answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body text.
	pub body: String,
}

impl SubmitResponse {
	/// Whether the target accepted the submission.
	///
	/// Only `200 OK` and `201 Created` count as acceptance.
	pub fn is_success(&self) -> bool {
		matches!(self.status, 200 | 201)
	}
}

/// The submission never reached the target or the answer was unreadable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("request failed: {0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
	fn from(source: reqwest::Error) -> Self {
		Self(source.to_string())
	}
}

/// Why a submission did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
	/// The target answered with a non-success status.
	#[error("submission rejected with status {}", .response.status)]
	Rejected {
		/// The rejecting response.
		response: SubmitResponse,
	},
	/// The request itself failed.
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Delivers a serialized submission to its target.
#[async_trait]
pub trait Transport: Send + Sync {
	/// Sends the request and returns the target's answer.
	async fn send(&self, request: SubmitRequest) -> Result<SubmitResponse, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
	client: reqwest::Client,
}

impl HttpTransport {
	/// Creates a transport with a fresh client.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a transport reusing an existing client.
	pub fn with_client(client: reqwest::Client) -> Self {
		Self { client }
	}
}

#[async_trait]
impl Transport for HttpTransport {
	async fn send(&self, request: SubmitRequest) -> Result<SubmitResponse, TransportError> {
		let method = match request.method {
			SubmitMethod::Post => reqwest::Method::POST,
			SubmitMethod::Get => reqwest::Method::GET,
		};

		let builder = self.client.request(method, &request.url);
		let builder = match &request.payload {
			Payload::Json(value) => builder.json(value),
			Payload::UrlEncoded(encoded) => builder
				.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
				.body(encoded.clone()),
		};

		let mut headers = HeaderMap::new();
		for (name, value) in &request.headers {
			let name = HeaderName::from_bytes(name.as_bytes())
				.map_err(|e| TransportError(e.to_string()))?;
			let value =
				HeaderValue::from_str(value).map_err(|e| TransportError(e.to_string()))?;
			headers.insert(name, value);
		}

		let response = builder.headers(headers).send().await?;
		let status = response.status().as_u16();
		let body = response.text().await?;

		Ok(SubmitResponse { status, body })
	}
}

/// [`Transport`] that accepts every submission without touching the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTransport;

#[async_trait]
impl Transport for NullTransport {
	async fn send(&self, _request: SubmitRequest) -> Result<SubmitResponse, TransportError> {
		Ok(SubmitResponse {
			status: 200,
			body: String::new(),
		})
	}
}
