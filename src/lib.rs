//! Typed asynchronous client for the IG trading platform—validated endpoint calls, session token
//! management, and streaming subscriptions in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]
#![allow(clippy::large_enum_variant, clippy::result_large_err)]

pub mod api;
pub mod auth;
pub mod date;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod market;
pub mod pipeline;
pub mod streamer;

mod _prelude {
	pub use std::{
		borrow::Cow,
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::{Arc, Weak},
	};

	pub use parking_lot::RwLock;
	pub use reqwest::{Client as ReqwestClient, Method, StatusCode};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {httpmock as _, tokio as _};
