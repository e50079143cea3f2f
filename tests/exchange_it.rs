// crates.io
use httpmock::prelude::*;
// self
use azure_oidc_exchange::{
	_preludet::*,
	auth::{TenantPolicy, ValidationError},
	error::{DecodeError, ProviderRejection, TransportError},
	exchange::{
		CLIENT_ASSERTION_TYPE, DEFAULT_SCOPE, DESCRIPTION_LIMIT, ExchangeRequest, ExchangerConfig,
		GRANT_TYPE,
	},
};

const OTHER_TENANT_ID: &str = "f8cdef31-a31e-4b4a-93e4-5f571e91255a";
const SUCCESS_BODY: &str =
	r#"{"token_type":"Bearer","expires_in":3599,"ext_expires_in":3599,"access_token":"azure-access-token"}"#;

fn token_path(tenant: &str) -> String {
	format!("/{tenant}/oauth2/v2.0/token")
}

fn request(server: &MockServer) -> ExchangeRequest {
	ExchangeRequest::new(TEST_OIDC_TOKEN, TEST_TENANT_ID, TEST_CLIENT_ID)
		.with_authority_host(server.base_url())
}

#[tokio::test]
async fn exchange_posts_federated_form_and_returns_token() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(token_path(TEST_TENANT_ID))
				.header("content-type", "application/x-www-form-urlencoded")
				.form_urlencoded_tuple("client_id", TEST_CLIENT_ID)
				.form_urlencoded_tuple("scope", DEFAULT_SCOPE)
				.form_urlencoded_tuple("client_assertion_type", CLIENT_ASSERTION_TYPE)
				.form_urlencoded_tuple("client_assertion", TEST_OIDC_TOKEN)
				.form_urlencoded_tuple("grant_type", GRANT_TYPE);
			then.status(200).header("content-type", "application/json").body(SUCCESS_BODY);
		})
		.await;
	let exchanger = build_reqwest_test_exchanger(ExchangerConfig::default());
	let token = exchanger
		.exchange(&request(&server))
		.await
		.expect("Exchange against the mock authority should succeed.");

	assert_eq!(token.access_token().expose(), "azure-access-token");
	assert_eq!(token.token_type(), "Bearer");
	assert_eq!(token.expires_in(), 3599);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn explicit_scope_is_sent_verbatim() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(token_path(TEST_TENANT_ID))
				.form_urlencoded_tuple("scope", "https://graph.microsoft.com/.default offline_access");
			then.status(200).header("content-type", "application/json").body(SUCCESS_BODY);
		})
		.await;
	let exchanger = build_reqwest_test_exchanger(ExchangerConfig::default());

	exchanger
		.exchange(
			&request(&server).with_scope("https://graph.microsoft.com/.default offline_access"),
		)
		.await
		.expect("Exchange with an explicit scope should succeed.");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn trailing_slash_authority_hits_canonical_path() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(token_path(TEST_TENANT_ID));
			then.status(200).header("content-type", "application/json").body(SUCCESS_BODY);
		})
		.await;
	let exchanger = build_reqwest_test_exchanger(ExchangerConfig::default());
	let request = ExchangeRequest::new(TEST_OIDC_TOKEN, TEST_TENANT_ID, TEST_CLIENT_ID)
		.with_authority_host(format!("{}/", server.base_url()));

	exchanger.exchange(&request).await.expect("Trailing slash must not change the endpoint.");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn provider_rejection_is_truncated_and_never_leaks_the_assertion() {
	let server = MockServer::start_async().await;
	let description = format!(
		"AADSTS700024: Client assertion {TEST_OIDC_TOKEN} is not within its valid time range. {}",
		"x".repeat(400)
	);
	let body = format!(
		r#"{{"error":"invalid_client","error_description":"{description}","error_codes":[700024],"trace_id":"trace-1","correlation_id":"corr-1"}}"#
	);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(token_path(TEST_TENANT_ID));
			then.status(400).header("content-type", "application/json").body(body);
		})
		.await;
	let exchanger = build_reqwest_test_exchanger(ExchangerConfig::default());
	let err = exchanger
		.exchange(&request(&server))
		.await
		.expect_err("Azure AD rejection should fail the exchange.");
	let rendered = err.to_string();

	assert!(!rendered.contains(TEST_OIDC_TOKEN));
	assert!(rendered.contains("invalid_client"));

	match err {
		Error::ProviderRejected(ProviderRejection::Described {
			status,
			code,
			description,
			error_codes,
			trace_id,
			correlation_id,
		}) => {
			assert_eq!(status, 400);
			assert_eq!(code, "invalid_client");
			assert_eq!(description.chars().count(), DESCRIPTION_LIMIT);
			assert!(description.starts_with("AADSTS700024: Client assertion <redacted>"));
			assert_eq!(error_codes, vec![700024]);
			assert_eq!(trace_id.as_deref(), Some("trace-1"));
			assert_eq!(correlation_id.as_deref(), Some("corr-1"));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn non_json_error_falls_back_to_status_line() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path(token_path(TEST_TENANT_ID));
			then.status(502).header("content-type", "text/html").body("<html>Bad Gateway</html>");
		})
		.await;

	let exchanger = build_reqwest_test_exchanger(ExchangerConfig::default());
	let err = exchanger
		.exchange(&request(&server))
		.await
		.expect_err("Gateway failure should fail the exchange.");

	match err {
		Error::ProviderRejected(ProviderRejection::Status { status, status_line }) => {
			assert_eq!(status, 502);
			assert_eq!(status_line, "502 Bad Gateway");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path(token_path(TEST_TENANT_ID));
			then.status(200).header("content-type", "application/json").body(r#"{"access_token""#);
		})
		.await;

	let exchanger = build_reqwest_test_exchanger(ExchangerConfig::default());
	let err = exchanger
		.exchange(&request(&server))
		.await
		.expect_err("Truncated token body should fail the exchange.");

	assert!(matches!(err, Error::Decode(DecodeError::Malformed { .. })));
	assert_eq!(err.kind(), "decode");
}

#[tokio::test]
async fn invalid_inputs_never_reach_the_network() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.any_request();
			then.status(200).header("content-type", "application/json").body(SUCCESS_BODY);
		})
		.await;
	let exchanger = build_reqwest_test_exchanger(ExchangerConfig::default());
	let cases = [
		(
			ExchangeRequest::new("", TEST_TENANT_ID, TEST_CLIENT_ID),
			ValidationError::MissingField { field: "oidc_token" },
		),
		(
			ExchangeRequest::new(TEST_OIDC_TOKEN, "contoso", TEST_CLIENT_ID),
			ValidationError::MalformedIdentifier { field: "tenant_id" },
		),
		(
			ExchangeRequest::new(TEST_OIDC_TOKEN, TEST_TENANT_ID, "my-app"),
			ValidationError::MalformedIdentifier { field: "client_id" },
		),
		(
			ExchangeRequest::new(TEST_OIDC_TOKEN, "common", TEST_CLIENT_ID),
			ValidationError::MalformedIdentifier { field: "tenant_id" },
		),
	];

	for (request, expected) in cases {
		let err = exchanger
			.exchange(&request.with_authority_host(server.base_url()))
			.await
			.expect_err("Invalid inputs should fail validation.");

		match err {
			Error::Validation(actual) => assert_eq!(actual, expected),
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn alias_policy_admits_multi_tenant_authorities() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(token_path("organizations"));
			then.status(200).header("content-type", "application/json").body(SUCCESS_BODY);
		})
		.await;
	let exchanger = build_reqwest_test_exchanger(
		ExchangerConfig::default().with_tenant_policy(TenantPolicy::AllowAliases),
	);
	let request = ExchangeRequest::new(TEST_OIDC_TOKEN, "organizations", TEST_CLIENT_ID)
		.with_authority_host(server.base_url());

	exchanger.exchange(&request).await.expect("Alias tenant should be accepted.");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn concurrent_exchanges_stay_independent() {
	let server = MockServer::start_async().await;
	let first_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(token_path(TEST_TENANT_ID));
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"token_type":"Bearer","expires_in":3600,"access_token":"first-token"}"#);
		})
		.await;
	let second_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(token_path(OTHER_TENANT_ID));
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"token_type":"Bearer","expires_in":600,"access_token":"second-token"}"#);
		})
		.await;
	let exchanger = build_reqwest_test_exchanger(ExchangerConfig::default());
	let first_request = request(&server);
	let second_request = ExchangeRequest::new(TEST_OIDC_TOKEN, OTHER_TENANT_ID, TEST_CLIENT_ID)
		.with_authority_host(server.base_url());
	let (first, second) =
		tokio::join!(exchanger.exchange(&first_request), exchanger.exchange(&second_request));
	let first = first.expect("First concurrent exchange should succeed.");
	let second = second.expect("Second concurrent exchange should succeed.");

	assert_eq!(first.access_token().expose(), "first-token");
	assert_eq!(second.access_token().expose(), "second-token");
	assert_eq!(second.expires_in(), 600);

	first_mock.assert_calls_async(1).await;
	second_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn slow_endpoint_times_out() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path(token_path(TEST_TENANT_ID));
			then.status(200)
				.header("content-type", "application/json")
				.body(SUCCESS_BODY)
				.delay(Duration::from_secs(3));
		})
		.await;

	let timeout = Duration::from_millis(200);
	let exchanger =
		build_reqwest_test_exchanger(ExchangerConfig::default().with_timeout(timeout));
	let err = exchanger
		.exchange(&request(&server))
		.await
		.expect_err("Slow endpoint should time out.");

	match err {
		Error::Transport(TransportError::Timeout { after }) => assert_eq!(after, timeout),
		other => panic!("Unexpected error variant: {other:?}."),
	}
}
