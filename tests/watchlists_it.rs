// crates.io
use httpmock::prelude::*;
// self
use ig_gateway::{
	api::Api,
	auth::{ApiKey, Epic, Password, Username},
	endpoints::watchlists::CreateStatus,
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

fn epic() -> Epic {
	Epic::new("CS.D.EURUSD.MINI.IP").expect("Epic fixture should be valid.")
}

#[tokio::test]
async fn create_reports_partial_acceptance() {
	let server = MockServer::start_async().await;
	let api = gateway(&server);

	certificate_login(&server, &api).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/gateway/deal/watchlists")
				.header("Version", "1")
				.json_body_includes("{\"name\":\"majors\"}");
			then.status(200).header("content-type", "application/json; charset=UTF-8").body(
				"{\"watchlistId\":\"w-123\",\"status\":\"SUCCESS_NOT_ALL_INSTRUMENTS_ADDED\"}",
			);
		})
		.await;
	let created = api
		.watchlists()
		.create("majors", &[epic()])
		.await
		.expect("Watchlist creation should succeed.");

	assert_eq!(created.watchlist_id, "w-123");
	assert_eq!(created.status, CreateStatus::SuccessNotAllInstrumentsAdded);

	mock.assert_async().await;
}

#[tokio::test]
async fn create_rejects_blank_names() {
	let server = MockServer::start_async().await;
	let api = gateway(&server);

	certificate_login(&server, &api).await;

	assert!(api.watchlists().create("  ", &[epic()]).await.is_err());
}

#[tokio::test]
async fn epic_management_round_trip() {
	let server = MockServer::start_async().await;
	let api = gateway(&server);

	certificate_login(&server, &api).await;

	let add = server
		.mock_async(|when, then| {
			when.method(PUT)
				.path("/gateway/deal/watchlists/w-123")
				.json_body_includes("{\"epic\":\"CS.D.EURUSD.MINI.IP\"}");
			then.status(200)
				.header("content-type", "application/json; charset=UTF-8")
				.body("{\"status\":\"SUCCESS\"}");
		})
		.await;
	let remove = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/gateway/deal/watchlists/w-123/CS.D.EURUSD.MINI.IP");
			then.status(200)
				.header("content-type", "application/json; charset=UTF-8")
				.body("{\"status\":\"SUCCESS\"}");
		})
		.await;
	let delete = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/gateway/deal/watchlists/w-123");
			then.status(200)
				.header("content-type", "application/json; charset=UTF-8")
				.body("{\"status\":\"SUCCESS\"}");
		})
		.await;

	api.watchlists().add_epic("w-123", &epic()).await.expect("Adding an epic should succeed.");
	api.watchlists()
		.remove_epic("w-123", &epic())
		.await
		.expect("Removing an epic should succeed.");
	api.watchlists().delete("w-123").await.expect("Deleting the watchlist should succeed.");

	add.assert_async().await;
	remove.assert_async().await;
	delete.assert_async().await;
}

#[tokio::test]
async fn listing_decodes_watchlists_and_their_markets() {
	let server = MockServer::start_async().await;
	let api = gateway(&server);

	certificate_login(&server, &api).await;

	let all = server
		.mock_async(|when, then| {
			when.method(GET).path("/gateway/deal/watchlists").header("Version", "1");
			then.status(200).header("content-type", "application/json; charset=UTF-8").body(
				"{\"watchlists\":[{\"id\":\"w-123\",\"name\":\"majors\",\"editable\":true,\
				 \"deleteable\":true,\"defaultSystemWatchlist\":false}]}",
			);
		})
		.await;
	let markets = server
		.mock_async(|when, then| {
			when.method(GET).path("/gateway/deal/watchlists/w-123");
			then.status(200).header("content-type", "application/json; charset=UTF-8").body(
				"{\"markets\":[{\"epic\":\"CS.D.EURUSD.MINI.IP\",\
				 \"instrumentName\":\"EUR/USD Mini\",\"instrumentType\":\"CURRENCIES\",\
				 \"expiry\":\"-\",\"marketStatus\":\"TRADEABLE\",\"bid\":1.09,\"offer\":1.1}]}",
			);
		})
		.await;
	let watchlists = api.watchlists().all().await.expect("Listing watchlists should succeed.");

	assert_eq!(watchlists.len(), 1);
	assert!(watchlists[0].editable);

	let entries = api
		.watchlists()
		.get("w-123")
		.await
		.expect("Fetching the watchlist markets should succeed.");

	assert_eq!(entries.len(), 1);
	assert_eq!(entries[0].epic.as_ref(), "CS.D.EURUSD.MINI.IP");

	all.assert_async().await;
	markets.assert_async().await;
}
