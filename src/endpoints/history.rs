//! Account history endpoints: activity and transactions, both paginated.
//!
//! These are the crate's two shipping instantiations of the pagination combinator:
//! transactions page through the server's `pageData` cursor, activity follows the
//! server-provided `next` link.

// crates.io
use futures_util::Stream;
// self
use crate::{
	_prelude::*,
	api::Api,
	auth::{DealId, Epic},
	date,
	error::Suggestion,
	pipeline::{
		Request,
		paged::{PageTrail, paginate},
	},
};

/// History endpoints bound to an API handle.
#[derive(Clone, Copy, Debug)]
pub struct History<'a> {
	api: &'a Api,
}
impl<'a> History<'a> {
	pub(crate) fn new(api: &'a Api) -> Self {
		Self { api }
	}

	/// Streams account activity since `from` (`GET /history/activity`, version 3).
	///
	/// Pages are requested serially following the server's `next` link; every entry
	/// of a page is delivered before the next page is fetched. The returned stream is
	/// owned and may outlive this facade.
	pub fn activity(
		&self,
		from: OffsetDateTime,
		to: Option<OffsetDateTime>,
		page_size: u32,
	) -> Result<impl Stream<Item = Result<Activity>> + use<>> {
		let mut initial = self
			.api
			.request(Method::GET, "history/activity")
			.version(3)
			.with_credentials()
			.query("from", format_instant(from)?)
			.query("pageSize", page_size.to_string());

		if let Some(to) = to {
			initial = initial.query("to", format_instant(to)?);
		}

		Ok(paginate(
			initial,
			|initial, previous: Option<&PageTrail<ActivityPaging>>| {
				Ok(match previous {
					None => Some(initial.clone()),
					Some(trail) =>
						trail.meta.next.as_ref().map(|next| initial.clone().relative(next)),
				})
			},
			|request: Request| async move {
				let page = request.send(&[StatusCode::OK]).await?.decode::<ActivityPage>()?;

				Ok((page.metadata.paging, page.activities))
			},
		))
	}

	/// Streams transactions since `from` (`GET /history/transactions`, version 2).
	///
	/// Pages are requested serially with an incrementing `pageNumber` until the
	/// server's `totalPages` is reached.
	pub fn transactions(
		&self,
		from: OffsetDateTime,
		to: Option<OffsetDateTime>,
		page_size: u32,
	) -> Result<impl Stream<Item = Result<Transaction>> + use<>> {
		let mut initial = self
			.api
			.request(Method::GET, "history/transactions")
			.version(2)
			.with_credentials()
			.query("from", format_instant(from)?)
			.query("pageSize", page_size.to_string())
			.query("pageNumber", "1");

		if let Some(to) = to {
			initial = initial.query("to", format_instant(to)?);
		}

		Ok(paginate(
			initial,
			|initial, previous: Option<&PageTrail<PageData>>| {
				Ok(match previous {
					None => Some(initial.clone()),
					Some(trail) if trail.meta.page_number >= trail.meta.total_pages => None,
					Some(trail) => Some(
						initial
							.clone()
							.replace_query("pageNumber", (trail.meta.page_number + 1).to_string()),
					),
				})
			},
			|request: Request| async move {
				let page = request.send(&[StatusCode::OK]).await?.decode::<TransactionsPage>()?;

				Ok((page.metadata.page_data, page.transactions))
			},
		))
	}
}

/// One account activity entry.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
	/// Instant the activity happened.
	#[serde(with = "date::flexible")]
	pub date: OffsetDateTime,
	/// Instrument the activity concerns.
	pub epic: Epic,
	/// Deal affected by the activity.
	pub deal_id: DealId,
	/// Activity kind.
	#[serde(rename = "type")]
	pub kind: ActivityKind,
	/// Outcome reported by the platform.
	pub status: ActivityStatus,
	/// Channel that triggered the activity.
	pub channel: String,
	/// Free-form description.
	pub description: String,
	/// Instrument period, when the activity concerns an expiring instrument.
	pub period: Option<String>,
}

/// Kind of an activity entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
	/// A position was opened, amended, or closed.
	Position,
	/// A working order was created, amended, or deleted.
	WorkingOrder,
	/// An amendment to an attached stop or limit.
	EditStopAndLimit,
	/// A platform-originated action.
	System,
}

/// Outcome of an activity entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityStatus {
	/// The action was accepted.
	Accepted,
	/// The action was rejected.
	Rejected,
	/// The platform could not determine the outcome.
	Unknown,
}

/// One transaction entry.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
	/// Local instant of the transaction in the account timezone.
	#[serde(with = "date::slash_datetime")]
	pub date: PrimitiveDateTime,
	/// UTC instant of the transaction.
	#[serde(with = "date::flexible")]
	pub date_utc: OffsetDateTime,
	/// UTC instant the underlying deal was opened, when applicable.
	#[serde(default, with = "date::flexible::option")]
	pub open_date_utc: Option<OffsetDateTime>,
	/// Display name of the instrument.
	pub instrument_name: String,
	/// Instrument period, when applicable.
	pub period: Option<String>,
	/// Signed profit and loss, currency-prefixed as delivered by the platform.
	pub profit_and_loss: String,
	/// Transaction kind label.
	pub transaction_type: String,
	/// Platform reference.
	pub reference: String,
	/// Level the deal was opened at, `-` when not applicable.
	pub open_level: Option<String>,
	/// Level the deal was closed at, `-` when not applicable.
	pub close_level: Option<String>,
	/// Deal size, `-` when not applicable.
	pub size: Option<String>,
	/// Transaction currency code.
	pub currency: String,
	/// Whether this is a cash movement rather than a deal.
	pub cash_transaction: bool,
}

/// Page cursor of the transactions endpoint.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
	/// Requested page size.
	pub page_size: u32,
	/// Page this cursor describes, 1-based.
	pub page_number: u32,
	/// Total page count for the query.
	pub total_pages: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ActivityPaging {
	#[allow(dead_code)]
	pub(crate) size: u32,
	pub(crate) next: Option<String>,
}

#[derive(Deserialize)]
struct ActivityPage {
	activities: Vec<Activity>,
	metadata: ActivityMeta,
}

#[derive(Deserialize)]
struct ActivityMeta {
	paging: ActivityPaging,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionsPage {
	transactions: Vec<Transaction>,
	metadata: TransactionsMeta,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionsMeta {
	page_data: PageData,
}

fn format_instant(instant: OffsetDateTime) -> Result<String> {
	instant.to_offset(UtcOffset::UTC).format(date::ISO_SECONDS).map_err(|e| {
		Error::InvalidRequest {
			message: "history range instant could not be formatted".into(),
			request: None,
			source: Some(Box::new(e)),
			suggestion: Suggestion::FileBug,
			context: Vec::new(),
		}
	})
}
