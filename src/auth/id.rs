//! Strongly typed identifiers enforced across the gateway domain.
//!
//! Every identifier is constructed through its validator; there is no raw conversion
//! that could bypass validation. Re-validating an accepted value always succeeds.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal, $validator:ident) => {
		def_id!(@base $name, $doc, $kind, $validator);
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
	};
	(@secret $name:ident, $doc:literal, $kind:literal, $validator:ident) => {
		def_id!(@base $name, $doc, $kind, $validator);
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "(<redacted>)"))
			}
		}
	};
	(@base $name:ident, $doc:literal, $kind:literal, $validator:ident) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				$validator($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				$validator($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (account, deal, epic, ...).
		kind: &'static str,
	},
	/// The identifier fell outside its permitted character count.
	#[error("{kind} identifier must be between {min} and {max} characters.")]
	Length {
		/// Kind of identifier (account, deal, epic, ...).
		kind: &'static str,
		/// Minimum permitted character count.
		min: usize,
		/// Maximum permitted character count.
		max: usize,
	},
	/// The identifier contains characters outside its allowed set.
	#[error("{kind} identifier contains characters outside its allowed set.")]
	Charset {
		/// Kind of identifier (account, deal, epic, ...).
		kind: &'static str,
	},
	/// The identifier must parse as a signed integer and did not.
	#[error("{kind} identifier must be a signed integer.")]
	NotAnInteger {
		/// Kind of identifier (account, deal, epic, ...).
		kind: &'static str,
	},
}

def_id! { AccountId, "Identifier of a dealing account.", "Account", validate_opaque }
def_id! { ClientId, "Identifier of the platform client owning the accounts.", "Client", validate_integer }
def_id! { DealId, "Permanent identifier of a confirmed deal.", "Deal", validate_opaque }
def_id! { DealReference, "Caller-chosen reference attached to a deal at creation.", "Deal reference", validate_charset }
def_id! { Epic, "Opaque instrument identifier (e.g. `KA.D.VOD.CASH.IP`).", "Epic", validate_epic }
def_id! { Username, "Platform login name.", "Username", validate_charset }
def_id!(@secret Password, "Platform login password.", "Password", validate_password);
def_id!(@secret ApiKey, "API key issued per application.", "API key", validate_api_key);

fn validate_span(
	kind: &'static str,
	view: &str,
	min: usize,
	max: usize,
) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}

	let count = view.chars().count();

	if count < min || count > max {
		return Err(IdentifierError::Length { kind, min, max });
	}

	Ok(())
}

fn validate_opaque(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	validate_span(kind, view, 1, 30)
}

fn validate_charset(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	validate_span(kind, view, 1, 30)?;

	if view.chars().any(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '\\'))) {
		return Err(IdentifierError::Charset { kind });
	}

	Ok(())
}

fn validate_epic(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	validate_span(kind, view, 6, 30)?;

	if view.chars().any(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_'))) {
		return Err(IdentifierError::Charset { kind });
	}

	Ok(())
}

fn validate_password(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	validate_span(kind, view, 1, 350)
}

fn validate_api_key(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	validate_span(kind, view, 1, 40)?;

	if view.chars().any(|c| !c.is_ascii_alphanumeric()) {
		return Err(IdentifierError::Charset { kind });
	}

	Ok(())
}

fn validate_integer(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.parse::<i64>().is_err() {
		return Err(IdentifierError::NotAnInteger { kind });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn opaque_identifiers_accept_any_short_string() {
		AccountId::new("ABC123").expect("Account fixture should be valid.");
		AccountId::new("with spaces and $ymbols").expect("Opaque identifiers allow any character.");

		assert!(AccountId::new("").is_err());
		assert!(AccountId::new("a".repeat(31)).is_err());
		assert!(DealId::new("a".repeat(30)).is_ok());
	}

	#[test]
	fn references_enforce_their_character_set() {
		DealReference::new("my_ref-01\\a").expect("Backslash is part of the allowed set.");

		assert!(DealReference::new("bad ref").is_err());
		assert!(DealReference::new("bad.ref").is_err());
		assert!(Username::new("trader_01").is_ok());
		assert!(Username::new("trader 01").is_err());
	}

	#[test]
	fn epics_span_six_to_thirty_characters() {
		Epic::new("KA.D.VOD.CASH.IP").expect("Epic fixture should be valid.");

		assert!(Epic::new("AB.CD").is_err(), "Five characters is below the minimum.");
		assert!(Epic::new("AB-CDEF").is_err(), "Dash is outside the epic character set.");
	}

	#[test]
	fn client_identifiers_parse_as_integers() {
		ClientId::new("-123456789").expect("Signed integers should be accepted.");

		assert!(ClientId::new("12x").is_err());
		assert!(ClientId::new("").is_err());
	}

	#[test]
	fn passwords_are_redacted_in_debug_output() {
		let password = Password::new("hunter2").expect("Password fixture should be valid.");

		assert_eq!(format!("{password:?}"), "Password(<redacted>)");
		assert!(Password::new("a".repeat(351)).is_err());
		assert!(Password::new("a".repeat(350)).is_ok());
	}

	#[test]
	fn api_keys_are_alphanumeric() {
		ApiKey::new("a12345bc67d89012ef3g45h6i789j0k12l345m67")
			.expect("API key fixture should be valid.");

		assert!(ApiKey::new("key-with-dash").is_err());
		assert!(ApiKey::new("a".repeat(41)).is_err());
	}

	#[test]
	fn revalidating_an_accepted_value_yields_it_back() {
		let epic = Epic::new("CS.D.EURUSD.MINI.IP").expect("Epic fixture should be valid.");
		let again = Epic::new(epic.as_ref()).expect("Re-validation should accept the raw value.");

		assert_eq!(epic, again);
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let account: AccountId =
			serde_json::from_str("\"Z3TWI9\"").expect("Account should deserialize.");

		assert_eq!(account.as_ref(), "Z3TWI9");
		assert!(serde_json::from_str::<Epic>("\"nope\"").is_err());
	}
}
