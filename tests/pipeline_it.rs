// crates.io
use httpmock::prelude::*;
// self
use ig_gateway::{
	api::Api,
	auth::{ApiKey, Password, Username},
	error::Error,
	http::Transport,
	reqwest,
	url::Url,
};

fn gateway(server: &MockServer) -> Api {
	let root = Url::parse(&server.url("/gateway/deal")).expect("Mock root URL should parse.");

	Api::with_transport(root, Transport::with_client(reqwest::Client::new()))
}

async fn certificate_login(server: &MockServer, api: &Api) {
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/gateway/deal/session").header("Version", "2");
			then.status(200)
				.header("CST", "cst-token")
				.header("X-SECURITY-TOKEN", "xst-token")
				.header("content-type", "application/json; charset=UTF-8")
				.body(
					"{\"currentAccountId\":\"Z3TWI9\",\"clientId\":\"100200300\",\
					 \"timezoneOffset\":0,\"lightstreamerEndpoint\":\
					 \"https://demo-apd.marketdatasystems.com\"}",
				);
		})
		.await;

	api.session()
		.login_certificate(
			ApiKey::new("a1b2c3d4e5f6").expect("API key fixture should be valid."),
			Username::new("speculator").expect("Username fixture should be valid."),
			Password::new("pa55word").expect("Password fixture should be valid."),
		)
		.await
		.expect("Certificate login should succeed.");
	mock.delete_async().await;
}

#[tokio::test]
async fn status_mismatch_reports_invalid_response_with_evidence() {
	let server = MockServer::start_async().await;
	let api = gateway(&server);

	certificate_login(&server, &api).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/gateway/deal/accounts");
			then.status(500)
				.header("content-type", "application/json; charset=UTF-8")
				.body("{\"errorCode\":\"system.error\"}");
		})
		.await;
	let err = api
		.accounts()
		.all()
		.await
		.expect_err("A 500 answer must be rejected by the status check.");

	assert!(matches!(err, Error::InvalidResponse { .. }));
	assert!(err.to_string().contains("500"));
	assert!(err.to_string().contains("200"));
	assert!(err.request().is_some());
	assert_eq!(err.response().map(|response| response.status.as_u16()), Some(500));
	assert_eq!(err.data(), Some("{\"errorCode\":\"system.error\"}".as_bytes()));

	mock.assert_async().await;
}

#[tokio::test]
async fn decode_failures_carry_request_response_and_bytes() {
	let server = MockServer::start_async().await;
	let api = gateway(&server);

	certificate_login(&server, &api).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/gateway/deal/accounts");
			then.status(200)
				.header("content-type", "application/json; charset=UTF-8")
				.body("{\"unexpected\":true}");
		})
		.await;
	let err = api
		.accounts()
		.all()
		.await
		.expect_err("A shape mismatch must surface as a decode failure.");
	let Error::InvalidResponse { ref source, .. } = err else {
		panic!("Decode failures must be invalid responses.");
	};

	assert!(source.is_some());
	assert!(err.request().is_some());
	assert!(err.response().is_some());
	assert_eq!(err.data(), Some("{\"unexpected\":true}".as_bytes()));

	mock.assert_async().await;
}

#[tokio::test]
async fn empty_bodies_fail_the_laden_check() {
	let server = MockServer::start_async().await;
	let api = gateway(&server);

	certificate_login(&server, &api).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/gateway/deal/accounts");
			then.status(200).header("content-type", "application/json; charset=UTF-8");
		})
		.await;
	let err = api
		.accounts()
		.all()
		.await
		.expect_err("An empty body must fail when decoding is expected.");

	assert!(matches!(err, Error::InvalidResponse { .. }));
	assert!(err.to_string().contains("without a body"));

	mock.assert_async().await;
}

#[tokio::test]
async fn credentialed_calls_fail_fast_without_a_login() {
	let server = MockServer::start_async().await;
	let api = gateway(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/gateway/deal/accounts");
			then.status(200).body("{\"accounts\":[]}");
		})
		.await;
	let err = api
		.accounts()
		.all()
		.await
		.expect_err("Credentialed calls must fail while logged out.");

	assert!(matches!(err, Error::InvalidRequest { .. }));

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn dropping_a_deferred_call_cancels_the_exchange() {
	let server = MockServer::start_async().await;
	let api = gateway(&server);

	certificate_login(&server, &api).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/gateway/deal/accounts");
			then.status(200)
				.header("content-type", "application/json; charset=UTF-8")
				.delay(std::time::Duration::from_secs(30))
				.body("{\"accounts\":[]}");
		})
		.await;
	let handle = {
		let api = api.clone();

		tokio::spawn(async move { api.accounts().all().await })
	};

	tokio::time::sleep(std::time::Duration::from_millis(200)).await;
	handle.abort();

	let outcome = handle.await;

	assert!(outcome.is_err(), "The aborted call must emit nothing further.");
	assert!(outcome.expect_err("Abort should cancel the task.").is_cancelled());

	mock.assert_async().await;
}
