use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Opaque payment identifier.
///
/// The service sends ids as JSON strings or integers; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PaymentId(String);

impl PaymentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PaymentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Int(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => PaymentId(s),
            RawId::Int(n) => PaymentId(n.to_string()),
            RawId::Unsigned(n) => PaymentId(n.to_string()),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: PaymentId,
    #[serde(default)]
    pub sender_account: Option<String>,
    #[serde(default)]
    pub receiver_account: Option<String>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub swift_code: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl PaymentRecord {
    /// Amount with two decimals
    pub fn display_amount(&self) -> String {
        format!("{:.2}", self.amount)
    }

    /// Creation time in the local timezone, or the raw value if unparseable
    pub fn display_created_at(&self) -> String {
        match self.created_at.as_deref() {
            Some(raw) => {
                let parsed = raw.parse::<DateTime<Utc>>().ok().or_else(|| {
                    // Timestamps without an offset are UTC
                    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                        .ok()
                        .map(|naive| naive.and_utc())
                });
                match parsed {
                    Some(dt) => dt
                        .with_timezone(&Local)
                        .format("%Y-%m-%d %H:%M:%S")
                        .to_string(),
                    None => raw.to_string(),
                }
            }
            None => String::new(),
        }
    }

    pub fn display_status(&self) -> &str {
        self.status.as_deref().unwrap_or("Unknown")
    }
}
