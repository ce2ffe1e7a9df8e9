use rust_decimal::Decimal;
use std::str::FromStr;

/// The reasons a submitted amount is rejected.
///
/// Amounts arrive from form inputs, so partially-typed values are common.
/// None of them may silently become zero.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// No amount was supplied
    #[error("amount is missing")]
    Missing,
    /// The amount was an empty or whitespace-only string
    #[error("amount is blank")]
    Blank,
    /// The amount was a lone sign, such as "-" or "+"
    #[error("amount `{0}` has a sign but no digits")]
    SignOnly(String),
    /// The amount could not be parsed as a decimal number
    #[error("amount `{0}` is not a number")]
    NotNumeric(String),
    /// The amount parsed, but is below zero
    #[error("amount `{0}` is negative")]
    Negative(Decimal),
    /// The amount exceeds [`MAX_AMOUNT`]
    #[error("amount `{0}` is too large")]
    TooLarge(Decimal),
    /// The amount was denominated in a currency other than the auction's
    #[error("currency `{received}` does not match the auction currency `{expected}`")]
    CurrencyMismatch {
        /// The auction's currency
        expected: String,
        /// The currency of the submission
        received: String,
    },
}

/// The largest accepted line amount, 10^18.
///
/// Summing a line per item for any realistic number of items stays far below
/// `Decimal::MAX`, so ranking totals cannot overflow.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_808_348_672, 232_830_643, 0, false, 0);

/// An amount exactly as the client sent it.
///
/// Clients may send a JSON number or a string; both are kept in textual form
/// so that no precision is lost before [`RawAmount::parse`] converts them to a
/// [`Decimal`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawAmount(pub Option<String>);

impl RawAmount {
    /// Parse and sanitize the amount.
    pub fn parse(&self) -> Result<Decimal, AmountError> {
        let raw = self.0.as_deref().ok_or(AmountError::Missing)?;
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(AmountError::Blank);
        }

        if trimmed == "-" || trimmed == "+" {
            return Err(AmountError::SignOnly(trimmed.to_owned()));
        }

        let value = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| AmountError::NotNumeric(trimmed.to_owned()))?;

        if value.is_sign_negative() && !value.is_zero() {
            Err(AmountError::Negative(value))
        } else if value > MAX_AMOUNT {
            Err(AmountError::TooLarge(value))
        } else {
            Ok(value.normalize())
        }
    }
}

impl From<Decimal> for RawAmount {
    fn from(value: Decimal) -> Self {
        Self(Some(value.to_string()))
    }
}

impl From<&str> for RawAmount {
    fn from(value: &str) -> Self {
        Self(Some(value.to_owned()))
    }
}

impl<'de> serde::Deserialize<'de> for RawAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        serde_untagged::UntaggedEnumVisitor::new()
            .unit(|| Ok(Self(None)))
            .string(|text| Ok(Self(Some(text.to_owned()))))
            .i64(|int| Ok(Self(Some(int.to_string()))))
            .u64(|int| Ok(Self(Some(int.to_string()))))
            // f64's Display is the shortest representation that roundtrips,
            // which is what the client most likely typed
            .f64(|float| Ok(Self(Some(float.to_string()))))
            .deserialize(deserializer)
    }
}

impl serde::Serialize for RawAmount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match &self.0 {
            Some(text) => serializer.serialize_str(text),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(feature = "schemars")]
impl schemars::JsonSchema for RawAmount {
    fn inline_schema() -> bool {
        true
    }

    fn schema_name() -> std::borrow::Cow<'static, str> {
        "RawAmount".into()
    }

    fn json_schema(_: &mut schemars::SchemaGenerator) -> schemars::Schema {
        schemars::json_schema!({
            "type": ["string", "number", "null"],
            "description": "A non-negative decimal amount, as a number or a string",
        })
    }
}
