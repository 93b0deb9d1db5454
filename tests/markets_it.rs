// crates.io
use httpmock::prelude::*;
use time::macros;
// self
use ig_gateway::{
	api::Api,
	auth::{ApiKey, Epic, Password, Username},
	error::Error,
	http::Transport,
	market::MarketStatus,
	reqwest,
	url::Url,
};

fn gateway(server: &MockServer) -> Api {
	let root = Url::parse(&server.url("/gateway/deal")).expect("Mock root URL should parse.");

	Api::with_transport(root, Transport::with_client(reqwest::Client::new()))
}

async fn certificate_login(server: &MockServer, api: &Api, timezone_offset: i8) {
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/gateway/deal/session").header("Version", "2");
			then.status(200)
				.header("CST", "cst-token")
				.header("X-SECURITY-TOKEN", "xst-token")
				.header("content-type", "application/json; charset=UTF-8")
				.body(format!(
					"{{\"currentAccountId\":\"Z3TWI9\",\"clientId\":\"100200300\",\
					 \"timezoneOffset\":{timezone_offset},\"lightstreamerEndpoint\":\
					 \"https://demo-apd.marketdatasystems.com\"}}"
				));
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

fn epics(count: usize) -> Vec<Epic> {
	(0..count)
		.map(|index| {
			Epic::new(format!("CS.D.EPIC{index:03}.IP")).expect("Epic fixture should be valid.")
		})
		.collect()
}

#[tokio::test]
async fn more_than_fifty_epics_fail_before_any_request() {
	let server = MockServer::start_async().await;
	let api = gateway(&server);

	certificate_login(&server, &api, 0).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/gateway/deal/markets");
			then.status(200).body("{\"marketDetails\":[]}");
		})
		.await;
	let err = api
		.markets()
		.get_by_epics(&epics(51))
		.await
		.expect_err("Fifty-one epics must be rejected before anything is sent.");

	assert!(matches!(err, Error::InvalidRequest { .. }));
	assert!(err.to_string().contains("You cannot pass more than 50 epics"));

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn duplicate_and_missing_epics_are_rejected() {
	let server = MockServer::start_async().await;
	let api = gateway(&server);

	certificate_login(&server, &api, 0).await;

	let one = epics(1);
	let duplicated = vec![one[0].clone(), one[0].clone()];

	assert!(api.markets().get_by_epics(&duplicated).await.is_err());
	assert!(api.markets().get_by_epics(&[]).await.is_err());
}

#[tokio::test]
async fn markets_by_epics_resolve_times_against_the_account_timezone() {
	let server = MockServer::start_async().await;
	let api = gateway(&server);

	certificate_login(&server, &api, 2).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/gateway/deal/markets")
				.header("Version", "2")
				.query_param("epics", "CS.D.EPIC000.IP")
				.query_param("filter", "ALL");
			then.status(200)
				.header("content-type", "application/json; charset=UTF-8")
				.header("Date", "Sun, 15 Dec 2024 23:30:00 GMT")
				.body(
					"{\"marketDetails\":[{\"instrument\":{\"epic\":\"CS.D.EPIC000.IP\",\
					 \"name\":\"Test instrument\",\"marketId\":\"EPIC000\",\"type\":\"CURRENCIES\",\
					 \"expiry\":\"-\",\"lotSize\":1.0},\"snapshot\":{\"marketStatus\":\"TRADEABLE\",\
					 \"bid\":1.09,\"offer\":1.1,\"high\":1.12,\"low\":1.08,\"netChange\":0.01,\
					 \"percentageChange\":0.9,\"updateTime\":\"01:15:00\",\"delayTime\":0,\
					 \"scalingFactor\":1},\"dealingRules\":null}]}",
				);
		})
		.await;
	let details = api
		.markets()
		.get_by_epics(&epics(1))
		.await
		.expect("A single-epic fetch should succeed.");

	assert_eq!(details.len(), 1);
	assert_eq!(details[0].snapshot.market_status, MarketStatus::Tradeable);
	// 23:30 UTC server time is already 01:30 next day at UTC+2, so the 01:15 wall
	// clock belongs to the 16th.
	assert_eq!(
		details[0].snapshot.update_time,
		Some(macros::datetime!(2024-12-16 01:15 +2))
	);

	mock.assert_async().await;
}

#[tokio::test]
async fn search_requires_a_term() {
	let server = MockServer::start_async().await;
	let api = gateway(&server);

	certificate_login(&server, &api, 0).await;

	assert!(api.markets().search("   ").await.is_err());
}

#[tokio::test]
async fn sentiment_batch_uses_market_ids_csv() {
	let server = MockServer::start_async().await;
	let api = gateway(&server);

	certificate_login(&server, &api, 0).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/gateway/deal/clientsentiment")
				.header("Version", "1")
				.query_param("marketIds", "VOD-UK,EURUSD");
			then.status(200).header("content-type", "application/json; charset=UTF-8").body(
				"{\"clientSentiments\":[{\"marketId\":\"VOD-UK\",\
				 \"longPositionPercentage\":61.5,\"shortPositionPercentage\":38.5},\
				 {\"marketId\":\"EURUSD\",\"longPositionPercentage\":40.0,\
				 \"shortPositionPercentage\":60.0}]}",
			);
		})
		.await;
	let sentiments = api
		.sentiment()
		.get_many(&["VOD-UK", "EURUSD"])
		.await
		.expect("A batch sentiment fetch should succeed.");

	assert_eq!(sentiments.len(), 2);
	assert_eq!(sentiments[0].market_id, "VOD-UK");
	assert_eq!(sentiments[0].long_position_percentage, 61.5);

	mock.assert_async().await;
}

#[tokio::test]
async fn sentiment_rejects_empty_market_ids() {
	let server = MockServer::start_async().await;
	let api = gateway(&server);

	certificate_login(&server, &api, 0).await;

	assert!(api.sentiment().get("").await.is_err());
	assert!(api.sentiment().get_many(&[]).await.is_err());
	assert!(api.sentiment().get_many(&["VOD-UK", " "]).await.is_err());
}
