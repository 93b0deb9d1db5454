//! Session token sum type and lifecycle helpers.

// self
use crate::{_prelude::*, error::Suggestion};

/// How long the platform honors a certificate session; the login response does not
/// carry an explicit expiry for this kind.
pub(crate) const CERTIFICATE_LIFETIME: Duration = Duration::hours(6);

/// Closed sum of session token kinds. Never silently coerced.
#[derive(Clone, PartialEq, Eq)]
pub enum TokenKind {
	/// Client-session-token pair delivered through response headers.
	Certificate {
		/// Value of the `CST` header.
		access: String,
		/// Value of the `X-SECURITY-TOKEN` header.
		security: String,
	},
	/// OAuth tuple delivered through the login/refresh response body.
	OAuth {
		/// Access token injected into `Authorization`.
		access: String,
		/// Refresh token accepted by the refresh endpoint.
		refresh: String,
		/// Granted scope.
		scope: String,
		/// Scheme prefix for `Authorization` (typically `Bearer`).
		token_type: String,
	},
}

/// Session token with its absolute expiry instant.
///
/// The kind never changes for a given value; refresh and re-login replace the whole
/// token. No automatic refresh happens in this crate—callers reading an expired token
/// receive it as stored.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
	kind: TokenKind,
	expires_at: OffsetDateTime,
}
impl Token {
	/// Builds a certificate token from the two session headers.
	pub fn certificate(
		access: impl Into<String>,
		security: impl Into<String>,
		expires_at: OffsetDateTime,
	) -> Self {
		Self {
			kind: TokenKind::Certificate { access: access.into(), security: security.into() },
			expires_at,
		}
	}

	/// Builds an OAuth token from the login/refresh payload.
	pub fn oauth(
		access: impl Into<String>,
		refresh: impl Into<String>,
		scope: impl Into<String>,
		token_type: impl Into<String>,
		expires_at: OffsetDateTime,
	) -> Self {
		Self {
			kind: TokenKind::OAuth {
				access: access.into(),
				refresh: refresh.into(),
				scope: scope.into(),
				token_type: token_type.into(),
			},
			expires_at,
		}
	}

	/// The token's kind and secrets.
	pub fn kind(&self) -> &TokenKind {
		&self.kind
	}

	/// Absolute expiry instant.
	pub fn expires_at(&self) -> OffsetDateTime {
		self.expires_at
	}

	/// Returns `true` if the token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Returns `true` if the token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` for the certificate kind.
	pub fn is_certificate(&self) -> bool {
		matches!(self.kind, TokenKind::Certificate { .. })
	}

	/// Returns `true` for the OAuth kind.
	pub fn is_oauth(&self) -> bool {
		matches!(self.kind, TokenKind::OAuth { .. })
	}

	/// Refresh secret, present only on OAuth tokens.
	pub(crate) fn refresh_secret(&self) -> Option<&str> {
		match &self.kind {
			TokenKind::OAuth { refresh, .. } => Some(refresh),
			TokenKind::Certificate { .. } => None,
		}
	}

	/// Streamer password derived from the certificate pair.
	///
	/// Only certificate sessions may open the streaming channel.
	pub fn streamer_password(&self) -> Result<String> {
		match &self.kind {
			TokenKind::Certificate { access, security } =>
				Ok(format!("CST-{access}|XST-{security}")),
			TokenKind::OAuth { .. } => Err(Error::InvalidCredentials {
				message: "streaming requires a certificate session token".into(),
				suggestion: Suggestion::LogIn,
			}),
		}
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let kind = match self.kind {
			TokenKind::Certificate { .. } => "Certificate",
			TokenKind::OAuth { .. } => "OAuth",
		};

		f.debug_struct("Token")
			.field("kind", &kind)
			.field("secrets", &"<redacted>")
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
