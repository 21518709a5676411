use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
	Promise,
	Action,
}
impl EntityKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Promise => "promise",
			Self::Action => "action",
		}
	}

	/// The kind on the other side of a promise/action link.
	pub fn counterpart(self) -> Self {
		match self {
			Self::Promise => Self::Action,
			Self::Action => Self::Promise,
		}
	}
}
impl fmt::Display for EntityKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromiseStatus {
	#[default]
	Progressing,
	Complete,
	Broken,
	Compromised,
}
impl PromiseStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Progressing => "progressing",
			Self::Complete => "complete",
			Self::Broken => "broken",
			Self::Compromised => "compromised",
		}
	}
}
impl fmt::Display for PromiseStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for PromiseStatus {
	type Err = String;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"progressing" => Ok(Self::Progressing),
			"complete" => Ok(Self::Complete),
			"broken" => Ok(Self::Broken),
			"compromised" => Ok(Self::Compromised),
			other => Err(format!("Unknown promise status {other:?}.")),
		}
	}
}
