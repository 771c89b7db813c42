use serde::{Deserialize, Serialize};
use time::Date;

/// Request body for create and update.
#[derive(Debug, Deserialize)]
pub struct RegistrationRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "optional_date::deserialize")]
    pub date_of_birth: Option<Date>,
}

/// Plain confirmation returned by delete and ping.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// `date_of_birth` travels as `YYYY-MM-DD`. Browser forms tend to send a full
/// RFC 3339 timestamp instead, so parsing also accepts that and keeps the date.
pub mod optional_date {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use time::{
        format_description::{well_known::Rfc3339, BorrowedFormatItem},
        macros::format_description,
        Date, OffsetDateTime,
    };

    const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

    pub fn serialize<S: Serializer>(value: &Option<Date>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => {
                let text = date
                    .format(DATE_FORMAT)
                    .map_err(serde::ser::Error::custom)?;
                s.serialize_some(&text)
            }
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Date>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse(text).map(Some).map_err(de::Error::custom),
        }
    }

    pub fn parse(text: &str) -> Result<Date, String> {
        if let Ok(date) = Date::parse(text, DATE_FORMAT) {
            return Ok(date);
        }
        OffsetDateTime::parse(text, &Rfc3339)
            .map(|ts| ts.date())
            .map_err(|_| {
                format!("invalid date_of_birth `{text}`: expected YYYY-MM-DD or RFC 3339 timestamp")
            })
    }
}
