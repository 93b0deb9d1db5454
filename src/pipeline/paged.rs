//! Serial pagination combinator over a generic page cursor.

// std
use std::collections::VecDeque;
// crates.io
use futures_util::{Stream, stream};
// self
use crate::{_prelude::*, pipeline::Request};

/// The request that produced the previous page together with its decoded metadata.
pub struct PageTrail<M> {
	/// Request executed for that page.
	pub request: Request,
	/// Endpoint-specific page metadata (cursor, totals, next link).
	pub meta: M,
}

/// Drives `next_request` and `call` serially, flattening page items in order.
///
/// The contract, in order:
///
/// 1. `next_request` is consulted with no trail; `None` completes the stream without
///    emitting anything.
/// 2. `call` runs the produced request; its items are forwarded downstream before
///    the next page is requested, in the order the endpoint produced them.
/// 3. `next_request` is consulted again with the just-executed request and its
///    metadata; the chain repeats.
/// 4. Any error terminates the stream with that error, enriched with the last
///    successful page's request as context.
///
/// Dropping the stream cancels the active exchange and stops the chain.
pub fn paginate<M, T, N, C, Fut>(
	initial: Request,
	next_request: N,
	call: C,
) -> impl Stream<Item = Result<T>>
where
	N: FnMut(&Request, Option<&PageTrail<M>>) -> Result<Option<Request>>,
	C: FnMut(Request) -> Fut,
	Fut: Future<Output = Result<(M, Vec<T>)>>,
{
	struct State<M, T, N, C> {
		initial: Request,
		next_request: N,
		call: C,
		previous: Option<PageTrail<M>>,
		buffered: VecDeque<T>,
		finished: bool,
	}

	let state = State {
		initial,
		next_request,
		call,
		previous: None,
		buffered: VecDeque::new(),
		finished: false,
	};

	stream::unfold(state, |mut state| async move {
		loop {
			if let Some(item) = state.buffered.pop_front() {
				return Some((Ok(item), state));
			}
			if state.finished {
				return None;
			}

			let request = match (state.next_request)(&state.initial, state.previous.as_ref()) {
				Ok(Some(request)) => request,
				Ok(None) => {
					state.finished = true;

					return None;
				},
				Err(e) => {
					state.finished = true;

					return Some((Err(e), state));
				},
			};
			let executed = request.clone();

			match (state.call)(request).await {
				Ok((meta, items)) => {
					state.previous = Some(PageTrail { request: executed, meta });
					state.buffered = items.into();
				},
				Err(e) => {
					state.finished = true;

					let e = match &state.previous {
						Some(previous) => e
							.with_context("last successful page request", previous.request.describe()),
						None => e,
					};

					return Some((Err(e), state));
				},
			}
		}
	})
}
