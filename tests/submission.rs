//! Submission pipeline tests
//!
//! Drives the full submit sequence against transport doubles: the
//! validation sweep, payload assembly, the busy markers, and the
//! success, rejection, and failure callbacks.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use stepform::{
	FieldDescriptor, FieldGroup, Form, FormDocument, FormOptions, MemoryDocument, NoTransition,
	Payload, PayloadFormat, SharedDocument, StepToken, SubmitMethod, SubmitRequest,
	SubmitResponse, Transport, TransportError,
};

/// Thread-safe event log shared with callback closures.
struct Log<T>(Arc<Mutex<Vec<T>>>);

impl<T> Log<T> {
	fn new() -> Self {
		Self(Arc::new(Mutex::new(Vec::new())))
	}

	fn push(&self, entry: T) {
		self.0.lock().unwrap().push(entry);
	}

	fn entries(&self) -> Vec<T>
	where
		T: Clone,
	{
		self.0.lock().unwrap().clone()
	}
}

impl<T> Clone for Log<T> {
	fn clone(&self) -> Self {
		Self(Arc::clone(&self.0))
	}
}

fn tags(entries: &[&str]) -> Vec<String> {
	entries.iter().map(|tag| tag.to_string()).collect()
}

/// Transport double that records every request and answers a fixed
/// status with an `ack` body.
struct RecordingTransport {
	status: u16,
	requests: Arc<Mutex<Vec<SubmitRequest>>>,
}

impl RecordingTransport {
	fn new(status: u16) -> (Self, Arc<Mutex<Vec<SubmitRequest>>>) {
		let requests = Arc::new(Mutex::new(Vec::new()));
		let transport = Self {
			status,
			requests: requests.clone(),
		};
		(transport, requests)
	}
}

#[async_trait]
impl Transport for RecordingTransport {
	async fn send(&self, request: SubmitRequest) -> Result<SubmitResponse, TransportError> {
		self.requests.lock().unwrap().push(request);
		Ok(SubmitResponse {
			status: self.status,
			body: "ack".to_string(),
		})
	}
}

/// Transport double whose requests never arrive.
struct FailingTransport;

#[async_trait]
impl Transport for FailingTransport {
	async fn send(&self, _request: SubmitRequest) -> Result<SubmitResponse, TransportError> {
		Err(TransportError("connection refused".to_string()))
	}
}

/// A stepless subscribe form with two required fields.
fn subscribe() -> MemoryDocument {
	MemoryDocument::new()
		.with_field(FieldDescriptor::new("name").required())
		.with_field(FieldDescriptor::new("email").with_kind("email").required())
}

fn shared(document: MemoryDocument) -> (Arc<Mutex<MemoryDocument>>, SharedDocument) {
	let concrete = Arc::new(Mutex::new(document));
	let document: SharedDocument = concrete.clone();
	(concrete, document)
}

fn set(document: &Arc<Mutex<MemoryDocument>>, field: &str, value: &str) {
	document.lock().unwrap().set_value(field, value);
}

async fn submit_form(
	document: SharedDocument,
	options: FormOptions,
	transport: Box<dyn Transport>,
) -> Form {
	Form::with_collaborators(document, options, transport, Box::new(NoTransition))
		.await
		.unwrap()
}

#[tokio::test]
async fn test_submit_sends_the_urlencoded_payload() {
	// Arrange
	let (transport, requests) = RecordingTransport::new(200);
	let (concrete, document) = shared(subscribe());
	let mut form = submit_form(
		document,
		FormOptions::new("/api/subscribe"),
		Box::new(transport),
	)
	.await;
	set(&concrete, "name", "Ada Lovelace");
	set(&concrete, "email", "ada@example.com");

	// Act
	let accepted = form.submit().await.unwrap();

	// Assert
	assert!(accepted);
	let requests = requests.lock().unwrap();
	assert_eq!(requests.len(), 1);
	assert_eq!(requests[0].url, "/api/subscribe");
	assert_eq!(requests[0].method, SubmitMethod::Post);
	assert!(requests[0].headers.is_empty());
	assert_eq!(
		requests[0].payload,
		Payload::UrlEncoded("name=Ada+Lovelace&email=ada%40example.com".to_string()),
	);
}

#[tokio::test]
async fn test_successful_submission_runs_callbacks_in_order() {
	// Arrange
	let events = Log::new();
	let (transport, _requests) = RecordingTransport::new(200);
	let (concrete, document) = shared(subscribe());
	let options = FormOptions::new("/api/subscribe")
		.on_before_submit({
			let events = events.clone();
			move || events.push("before submit".to_string())
		})
		.on_submit_start({
			let events = events.clone();
			move || events.push("submit start".to_string())
		})
		.on_success({
			let events = events.clone();
			move |response| {
				events.push(format!("success {} {}", response.status, response.body));
			}
		})
		.on_submit_end({
			let events = events.clone();
			move || events.push("submit end".to_string())
		});
	let mut form = submit_form(document, options, Box::new(transport)).await;
	set(&concrete, "name", "Ada");
	set(&concrete, "email", "ada@example.com");

	// Act
	let accepted = form.submit().await.unwrap();

	// Assert: acceptance resets the form before reporting success
	assert!(accepted);
	assert_eq!(
		events.entries(),
		tags(&["before submit", "submit start", "success 200 ack", "submit end"]),
	);
	{
		let document = concrete.lock().unwrap();
		assert_eq!(document.value("name").as_deref(), Some(""));
		assert!(!document.is_submitting());
	}
}

#[tokio::test]
async fn test_validation_failure_stops_before_the_network() {
	// Arrange
	let events = Log::new();
	let errors = Log::new();
	let (transport, requests) = RecordingTransport::new(200);
	let (concrete, document) = shared(subscribe());
	let options = FormOptions::new("/api/subscribe")
		.with_scroll_offset(120)
		.on_before_submit({
			let events = events.clone();
			move || events.push("before submit".to_string())
		})
		.on_submit_start({
			let events = events.clone();
			move || events.push("submit start".to_string())
		})
		.on_submit_end({
			let events = events.clone();
			move || events.push("submit end".to_string())
		})
		.on_validation_error({
			let events = events.clone();
			let errors = errors.clone();
			move |names| {
				events.push("validation error".to_string());
				errors.push(names.to_vec());
			}
		});
	let mut form = submit_form(document, options, Box::new(transport)).await;
	set(&concrete, "email", "ada@example.com");

	// Act: the required name is still empty
	let accepted = form.submit().await.unwrap();

	// Assert: the attempt ends before the transport hears about it, and
	// the first failing field is scrolled into view
	assert!(!accepted);
	assert!(requests.lock().unwrap().is_empty());
	assert_eq!(
		events.entries(),
		tags(&["before submit", "submit start", "submit end", "validation error"]),
	);
	assert_eq!(errors.entries(), vec![vec!["name".to_string()]]);
	{
		let document = concrete.lock().unwrap();
		assert!(document.has_error("name"));
		assert!(!document.is_submitting());
		assert_eq!(document.scroll_log(), &[("name".to_string(), 120)]);
	}
}

#[tokio::test]
async fn test_rejected_submission_reports_the_response() {
	// Arrange
	let events = Log::new();
	let (transport, requests) = RecordingTransport::new(500);
	let (concrete, document) = shared(subscribe());
	let options = FormOptions::new("/api/subscribe")
		.on_before_submit({
			let events = events.clone();
			move || events.push("before submit".to_string())
		})
		.on_submit_start({
			let events = events.clone();
			move || events.push("submit start".to_string())
		})
		.on_success({
			let events = events.clone();
			move |_| events.push("success".to_string())
		})
		.on_error({
			let events = events.clone();
			move |error| events.push(error.to_string())
		})
		.on_submit_end({
			let events = events.clone();
			move || events.push("submit end".to_string())
		});
	let mut form = submit_form(document, options, Box::new(transport)).await;
	set(&concrete, "name", "Ada");
	set(&concrete, "email", "ada@example.com");

	// Act
	let accepted = form.submit().await.unwrap();

	// Assert: the request went out, the rejection left the form alone
	assert!(!accepted);
	assert_eq!(requests.lock().unwrap().len(), 1);
	assert_eq!(
		events.entries(),
		tags(&[
			"before submit",
			"submit start",
			"submission rejected with status 500",
			"submit end",
		]),
	);
	assert_eq!(concrete.lock().unwrap().value("name").as_deref(), Some("Ada"));
}

#[tokio::test]
async fn test_transport_failure_reports_the_error() {
	// Arrange
	let events = Log::new();
	let (concrete, document) = shared(subscribe());
	let options = FormOptions::new("/api/subscribe").on_error({
		let events = events.clone();
		move |error| events.push(error.to_string())
	});
	let mut form = submit_form(document, options, Box::new(FailingTransport)).await;
	set(&concrete, "name", "Ada");
	set(&concrete, "email", "ada@example.com");

	// Act
	let accepted = form.submit().await.unwrap();

	// Assert
	assert!(!accepted);
	assert_eq!(events.entries(), tags(&["request failed: connection refused"]));
	assert!(!concrete.lock().unwrap().is_submitting());
}

#[tokio::test]
async fn test_loader_outlives_success_when_configured() {
	// Arrange
	let (transport, _requests) = RecordingTransport::new(200);
	let (concrete, document) = shared(subscribe());
	let options = FormOptions::new("/api/subscribe")
		.with_reset_on_success(false)
		.with_reset_loader_on_success(false);
	let mut form = submit_form(document, options, Box::new(transport)).await;
	set(&concrete, "name", "Ada");
	set(&concrete, "email", "ada@example.com");

	// Act
	assert!(form.submit().await.unwrap());

	// Assert: the busy markers stay up for a follow-up redirect
	assert!(concrete.lock().unwrap().is_submitting());

	// Act: a failed validation always clears them
	set(&concrete, "name", "");
	assert!(!form.submit().await.unwrap());

	// Assert
	assert!(!concrete.lock().unwrap().is_submitting());
}

#[tokio::test]
async fn test_debug_mode_logs_instead_of_submitting() {
	// Arrange
	let events = Log::new();
	let (transport, requests) = RecordingTransport::new(200);
	let (concrete, document) = shared(subscribe());
	let options = FormOptions::new("/api/subscribe")
		.debug()
		.on_before_submit({
			let events = events.clone();
			move || events.push("before submit".to_string())
		})
		.on_submit_start({
			let events = events.clone();
			move || events.push("submit start".to_string())
		})
		.on_success({
			let events = events.clone();
			move |_| events.push("success".to_string())
		})
		.on_submit_end({
			let events = events.clone();
			move || events.push("submit end".to_string())
		});
	let mut form = submit_form(document, options, Box::new(transport)).await;
	set(&concrete, "name", "Ada");
	set(&concrete, "email", "ada@example.com");

	// Act
	let accepted = form.submit().await.unwrap();

	// Assert: accepted without network activity, success never fires,
	// values survive
	assert!(accepted);
	assert!(requests.lock().unwrap().is_empty());
	assert_eq!(
		events.entries(),
		tags(&["before submit", "submit start", "submit end"]),
	);
	assert_eq!(concrete.lock().unwrap().value("name").as_deref(), Some("Ada"));
}

#[tokio::test]
async fn test_submission_scope_stops_at_the_highest_visited_step() {
	// Arrange: three steps, one required field each
	let errors = Log::new();
	let (transport, requests) = RecordingTransport::new(200);
	let document = MemoryDocument::new()
		.with_step(StepToken::main(1))
		.with_step(StepToken::main(2))
		.with_step(StepToken::main(3))
		.with_active_step(StepToken::main(1))
		.with_field(FieldDescriptor::new("name").required().on_step(StepToken::main(1)))
		.with_field(
			FieldDescriptor::new("email")
				.with_kind("email")
				.required()
				.on_step(StepToken::main(2)),
		)
		.with_field(FieldDescriptor::new("phone").required().on_step(StepToken::main(3)));
	let (concrete, document) = shared(document);
	let options = FormOptions::new("/api/subscribe").on_validation_error({
		let errors = errors.clone();
		move |names| errors.push(names.to_vec())
	});
	let mut form = submit_form(document, options, Box::new(transport)).await;
	set(&concrete, "name", "Ada");
	assert!(form.next_step().await);
	assert!(form.prev_step().await);

	// Act: submit from step 1 with step 2 visited and step 3 untouched
	let accepted = form.submit().await.unwrap();

	// Assert: the empty email fails, the never-visited phone does not
	assert!(!accepted);
	assert!(requests.lock().unwrap().is_empty());
	assert_eq!(errors.entries(), vec![vec!["email".to_string()]]);
	{
		let document = concrete.lock().unwrap();
		assert!(document.has_error("email"));
		assert!(!document.has_error("phone"));
	}
}

#[tokio::test]
async fn test_json_payload_nests_groups_and_extras() {
	// Arrange
	let (transport, requests) = RecordingTransport::new(201);
	let document = MemoryDocument::new()
		.with_field(FieldDescriptor::new("name").required())
		.with_field(FieldDescriptor::new("street"))
		.with_field(FieldDescriptor::new("city"));
	let (concrete, document) = shared(document);
	let options = FormOptions::new("/api/orders")
		.with_format(PayloadFormat::Json)
		.with_field_group(FieldGroup::new(
			"address",
			vec!["street".to_string(), "city".to_string()],
		))
		.with_extra_field("source", "landing");
	let mut form = submit_form(document, options, Box::new(transport)).await;
	set(&concrete, "name", "Ada");
	set(&concrete, "street", "Main 1");
	set(&concrete, "city", "Paris");

	// Act
	let accepted = form.submit().await.unwrap();

	// Assert: 201 counts as acceptance, members sit under the group key
	assert!(accepted);
	assert_eq!(
		requests.lock().unwrap()[0].payload,
		Payload::Json(json!({
			"name": "Ada",
			"address": [{ "street": "Main 1", "city": "Paris" }],
			"source": "landing",
		})),
	);
}

#[tokio::test]
async fn test_request_headers_ride_along() {
	// Arrange
	let (transport, requests) = RecordingTransport::new(200);
	let (concrete, document) = shared(subscribe());
	let options = FormOptions::new("/api/subscribe")
		.with_header("X-Requested-With", "XMLHttpRequest")
		.with_header("Authorization", "Bearer abc123");
	let mut form = submit_form(document, options, Box::new(transport)).await;
	set(&concrete, "name", "Ada");
	set(&concrete, "email", "ada@example.com");

	// Act
	assert!(form.submit().await.unwrap());

	// Assert
	assert_eq!(
		requests.lock().unwrap()[0].headers,
		vec![
			("X-Requested-With".to_string(), "XMLHttpRequest".to_string()),
			("Authorization".to_string(), "Bearer abc123".to_string()),
		],
	);
}

#[tokio::test]
async fn test_get_submissions_use_the_configured_method() {
	// Arrange
	let (transport, requests) = RecordingTransport::new(200);
	let (concrete, document) = shared(subscribe());
	let options = FormOptions::new("/api/subscribe").with_method(SubmitMethod::Get);
	let mut form = submit_form(document, options, Box::new(transport)).await;
	set(&concrete, "name", "Ada");
	set(&concrete, "email", "ada@example.com");

	// Act
	assert!(form.submit().await.unwrap());

	// Assert
	assert_eq!(requests.lock().unwrap()[0].method, SubmitMethod::Get);
}

#[tokio::test]
async fn test_ignored_fields_stay_out_of_the_payload() {
	// Arrange: a honeypot the backend never sees
	let (transport, requests) = RecordingTransport::new(200);
	let document = MemoryDocument::new()
		.with_field(FieldDescriptor::new("name").required())
		.with_field(FieldDescriptor::new("website"));
	let (concrete, document) = shared(document);
	let options = FormOptions::new("/api/subscribe").ignore_field("website");
	let mut form = submit_form(document, options, Box::new(transport)).await;
	set(&concrete, "name", "Ada");
	set(&concrete, "website", "http://spam.example");

	// Act
	assert!(form.submit().await.unwrap());

	// Assert
	assert_eq!(
		requests.lock().unwrap()[0].payload,
		Payload::UrlEncoded("name=Ada".to_string()),
	);
}

#[tokio::test]
async fn test_missing_required_file_blocks_submission() {
	// Arrange
	let (transport, _requests) = RecordingTransport::new(200);
	let document =
		MemoryDocument::new().with_field(FieldDescriptor::new("cv").with_kind("file").required());
	let (concrete, document) = shared(document);
	let mut form = submit_form(document, FormOptions::new("/api/jobs"), Box::new(transport)).await;

	// Act & Assert: no file, no submission
	assert!(!form.submit().await.unwrap());
	assert_eq!(
		concrete.lock().unwrap().error_message("cv").as_deref(),
		Some("You must attach a file"),
	);

	// Act & Assert: attaching one satisfies the sweep
	concrete.lock().unwrap().attach_file("cv", "cv.pdf", 1_048_576);
	assert!(form.submit().await.unwrap());
	assert!(!concrete.lock().unwrap().has_error("cv"));
}
