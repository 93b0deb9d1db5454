// crates.io
use httpmock::prelude::*;
// self
use ig_gateway::{
	api::Api,
	auth::{ApiKey, Password, Username},
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

const MARKET: &str = "{\"epic\":\"CS.D.EURUSD.MINI.IP\",\"instrumentName\":\"EUR/USD Mini\",\
	\"instrumentType\":\"CURRENCIES\",\"expiry\":\"-\",\"marketStatus\":\"TRADEABLE\",\
	\"bid\":1.09,\"offer\":1.1}";

#[tokio::test]
async fn tree_aggregates_depth_first_in_server_order() {
	let server = MockServer::start_async().await;
	let api = gateway(&server);

	certificate_login(&server, &api).await;

	let root = server
		.mock_async(|when, then| {
			when.method(GET).path("/gateway/deal/marketnavigation").header("Version", "1");
			then.status(200).header("content-type", "application/json; charset=UTF-8").body(
				"{\"nodes\":[{\"id\":\"A\",\"name\":\"Forex\"},{\"id\":\"B\",\"name\":\"Indices\"}],\
				 \"markets\":null}",
			);
		})
		.await;
	let node_a = server
		.mock_async(|when, then| {
			when.method(GET).path("/gateway/deal/marketnavigation/A");
			then.status(200)
				.header("content-type", "application/json; charset=UTF-8")
				.body(format!("{{\"nodes\":null,\"markets\":[{MARKET}]}}"));
		})
		.await;
	let node_b = server
		.mock_async(|when, then| {
			when.method(GET).path("/gateway/deal/marketnavigation/B");
			then.status(200)
				.header("content-type", "application/json; charset=UTF-8")
				.body("{\"nodes\":[{\"id\":\"C\",\"name\":\"Europe\"}],\"markets\":null}");
		})
		.await;
	let node_c = server
		.mock_async(|when, then| {
			when.method(GET).path("/gateway/deal/marketnavigation/C");
			then.status(200)
				.header("content-type", "application/json; charset=UTF-8")
				.body("{\"nodes\":null,\"markets\":null}");
		})
		.await;
	let tree = api
		.navigation()
		.tree(None, 1)
		.await
		.expect("A depth-one aggregation should succeed.");

	assert_eq!(tree.id, None);
	assert_eq!(tree.children.len(), 2);
	assert_eq!(tree.children[0].name.as_deref(), Some("Forex"));
	assert_eq!(tree.children[0].markets.len(), 1);
	assert_eq!(tree.children[1].name.as_deref(), Some("Indices"));
	// Depth exhausted: B's sub-node stays an unexpanded leaf.
	assert_eq!(tree.children[1].children.len(), 1);
	assert_eq!(tree.children[1].children[0].id.as_deref(), Some("C"));
	assert!(tree.children[1].children[0].markets.is_empty());

	root.assert_async().await;
	node_a.assert_async().await;
	node_b.assert_async().await;
	node_c.assert_calls_async(0).await;
}

#[tokio::test]
async fn a_failing_sub_fetch_fails_the_whole_aggregate() {
	let server = MockServer::start_async().await;
	let api = gateway(&server);

	certificate_login(&server, &api).await;

	let root = server
		.mock_async(|when, then| {
			when.method(GET).path("/gateway/deal/marketnavigation");
			then.status(200).header("content-type", "application/json; charset=UTF-8").body(
				"{\"nodes\":[{\"id\":\"A\",\"name\":\"Forex\"}],\"markets\":null}",
			);
		})
		.await;
	let node_a = server
		.mock_async(|when, then| {
			when.method(GET).path("/gateway/deal/marketnavigation/A");
			then.status(500)
				.header("content-type", "application/json; charset=UTF-8")
				.body("{\"errorCode\":\"system.error\"}");
		})
		.await;

	assert!(api.navigation().tree(None, 2).await.is_err());

	root.assert_async().await;
	node_a.assert_async().await;
}
