//! Market navigation endpoints, including the recursive tree aggregator.

// self
use crate::{_prelude::*, api::Api, endpoints::markets::MarketHit};

/// Market navigation endpoints bound to an API handle.
#[derive(Clone, Copy, Debug)]
pub struct Navigation<'a> {
	api: &'a Api,
}
impl<'a> Navigation<'a> {
	pub(crate) fn new(api: &'a Api) -> Self {
		Self { api }
	}

	/// Fetches one navigation layer (`GET /marketnavigation[/{node}]`, version 1).
	pub async fn layer(&self, node: Option<&str>) -> Result<NavigationLayer> {
		fetch_layer(self.api, node.map(str::to_owned)).await
	}

	/// Aggregates a navigation subtree depth-first.
	///
	/// The node itself is fetched, then each sub-node is recursed in the order the
	/// server returned it with `depth - 1`; at depth 0 the sub-nodes stay unexpanded
	/// leaves. Any sub-fetch failure fails the whole aggregate.
	pub async fn tree(&self, node: Option<&str>, depth: u8) -> Result<NavigationNode> {
		expand(self.api, node.map(str::to_owned), None, depth).await
	}
}

/// One fetched navigation layer: sub-node stubs plus the markets attached here.
#[derive(Clone, Debug, Deserialize)]
pub struct NavigationLayer {
	/// Sub-nodes of this layer, in server order.
	#[serde(default)]
	pub nodes: Option<Vec<NodeStub>>,
	/// Markets attached directly to this layer.
	#[serde(default)]
	pub markets: Option<Vec<MarketHit>>,
}

/// Identifier/name pair of a navigation node.
#[derive(Clone, Debug, Deserialize)]
pub struct NodeStub {
	/// Node identifier.
	pub id: String,
	/// Display name.
	pub name: String,
}

/// Fully aggregated navigation node.
#[derive(Clone, Debug)]
pub struct NavigationNode {
	/// Node identifier; absent for the root.
	pub id: Option<String>,
	/// Display name; absent for the root.
	pub name: Option<String>,
	/// Child nodes, depth-first in server order.
	pub children: Vec<NavigationNode>,
	/// Markets attached directly to this node.
	pub markets: Vec<MarketHit>,
}

async fn fetch_layer(api: &Api, node: Option<String>) -> Result<NavigationLayer> {
	let path = match &node {
		Some(id) => Cow::Owned(format!("marketnavigation/{id}")),
		None => Cow::Borrowed("marketnavigation"),
	};

	api.request(Method::GET, path)
		.version(1)
		.with_credentials()
		.send(&[StatusCode::OK])
		.await?
		.decode()
}

fn expand(
	api: &Api,
	id: Option<String>,
	name: Option<String>,
	depth: u8,
) -> Pin<Box<dyn Future<Output = Result<NavigationNode>> + Send + '_>> {
	Box::pin(async move {
		let layer = fetch_layer(api, id.clone()).await?;
		let stubs = layer.nodes.unwrap_or_default();
		let mut children = Vec::with_capacity(stubs.len());

		if depth > 0 {
			for stub in stubs {
				children.push(expand(api, Some(stub.id), Some(stub.name), depth - 1).await?);
			}
		} else {
			children.extend(stubs.into_iter().map(|stub| NavigationNode {
				id: Some(stub.id),
				name: Some(stub.name),
				children: Vec::new(),
				markets: Vec::new(),
			}));
		}

		Ok(NavigationNode { id, name, children, markets: layer.markets.unwrap_or_default() })
	})
}
