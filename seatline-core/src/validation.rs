use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use crate::models::NewEvent;
use crate::{CoreError, CoreResult};

/// Event fields as submitted by a client. `date` stays a string until
/// [`EventDraft::validate_at`] parses it.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    #[validate(length(min = 3, message = "Title must be at least 3 characters long"))]
    pub title: String,
    #[validate(length(min = 10, message = "Description must be at least 10 characters long"))]
    pub description: String,
    pub date: String,
    #[validate(length(min = 3, message = "Location must be at least 3 characters long"))]
    pub location: String,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: i32,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    #[validate(url(message = "Must be a valid URL"))]
    #[serde(default)]
    pub image: Option<String>,
}

impl EventDraft {
    /// Trims text fields, treats a blank image as absent, validates every
    /// field and requires the date to be after `now`.
    pub fn validate_at(self, now: DateTime<Utc>) -> CoreResult<NewEvent> {
        let draft = EventDraft {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            date: self.date,
            location: self.location.trim().to_string(),
            capacity: self.capacity,
            price: self.price,
            image: self
                .image
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        };

        draft.validate().map_err(first_message)?;

        let date = parse_event_date(&draft.date)?;
        if date <= now {
            return Err(CoreError::ValidationError(
                "Event date must be in the future".to_string(),
            ));
        }

        Ok(NewEvent {
            title: draft.title,
            description: draft.description,
            date,
            location: draft.location,
            capacity: draft.capacity,
            price: draft.price,
            image: draft.image,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegistrationDraft {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl RegistrationDraft {
    /// Returns the draft with a trimmed name and a trimmed, lower-cased e-mail.
    pub fn normalized(self) -> CoreResult<Self> {
        let draft = RegistrationDraft {
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            password: self.password,
        };
        draft.validate().map_err(first_message)?;
        Ok(draft)
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Accepts RFC 3339, HTML `datetime-local` values (read as UTC) and plain dates.
pub fn parse_event_date(raw: &str) -> CoreResult<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    if let Some(naive) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(Utc.from_utc_datetime(&naive));
    }

    Err(CoreError::ValidationError("Invalid event date".to_string()))
}

/// Collapses validator output into one message, picking fields in name order
/// so the same input always reports the same problem.
fn first_message(errors: ValidationErrors) -> CoreError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let message = fields
        .into_iter()
        .find_map(|(field, errs)| {
            errs.first().map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", field))
            })
        })
        .unwrap_or_else(|| "Invalid input".to_string());

    CoreError::ValidationError(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> EventDraft {
        EventDraft {
            title: "RustConf Afterparty".to_string(),
            description: "Drinks and talks after the main conference".to_string(),
            date: "2099-06-01T18:30".to_string(),
            location: "Montreal".to_string(),
            capacity: 50,
            price: 12.5,
            image: None,
        }
    }

    fn message(result: CoreResult<NewEvent>) -> String {
        match result {
            Err(CoreError::ValidationError(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_draft_becomes_new_event() {
        let event = draft().validate_at(Utc::now()).unwrap();
        assert_eq!(event.title, "RustConf Afterparty");
        assert_eq!(event.capacity, 50);
        assert_eq!(event.date.to_rfc3339(), "2099-06-01T18:30:00+00:00");
    }

    #[test]
    fn test_short_title_rejected() {
        let mut d = draft();
        d.title = "  ab ".to_string();
        assert_eq!(message(d.validate_at(Utc::now())), "Title must be at least 3 characters long");
    }

    #[test]
    fn test_capacity_and_price_bounds() {
        let mut d = draft();
        d.capacity = 0;
        assert_eq!(message(d.validate_at(Utc::now())), "Capacity must be at least 1");

        let mut d = draft();
        d.price = -1.0;
        assert_eq!(message(d.validate_at(Utc::now())), "Price cannot be negative");

        let mut d = draft();
        d.price = 0.0;
        assert!(d.validate_at(Utc::now()).is_ok());
    }

    #[test]
    fn test_image_must_be_url_when_present() {
        let mut d = draft();
        d.image = Some("not a url".to_string());
        assert_eq!(message(d.validate_at(Utc::now())), "Must be a valid URL");

        let mut d = draft();
        d.image = Some("   ".to_string());
        assert_eq!(d.validate_at(Utc::now()).unwrap().image, None);

        let mut d = draft();
        d.image = Some("https://example.com/poster.png".to_string());
        assert_eq!(
            d.validate_at(Utc::now()).unwrap().image.as_deref(),
            Some("https://example.com/poster.png")
        );
    }

    #[test]
    fn test_past_date_rejected() {
        let mut d = draft();
        d.date = "2001-01-01".to_string();
        assert_eq!(message(d.validate_at(Utc::now())), "Event date must be in the future");
    }

    #[test]
    fn test_date_formats() {
        assert!(parse_event_date("2099-01-02T03:04:05Z").is_ok());
        assert!(parse_event_date("2099-01-02T03:04:05+02:00").is_ok());
        assert!(parse_event_date("2099-01-02T03:04:05").is_ok());
        assert!(parse_event_date("2099-01-02T03:04").is_ok());
        assert_eq!(
            parse_event_date("2099-01-02").unwrap().to_rfc3339(),
            "2099-01-02T00:00:00+00:00"
        );
        assert!(parse_event_date("next tuesday").is_err());
    }

    #[test]
    fn test_registration_normalized() {
        let reg = RegistrationDraft {
            name: " Ada ".to_string(),
            email: " Ada@Example.COM ".to_string(),
            password: "hunter22".to_string(),
        }
        .normalized()
        .unwrap();
        assert_eq!(reg.name, "Ada");
        assert_eq!(reg.email, "ada@example.com");
    }

    #[test]
    fn test_registration_rejects_bad_email() {
        let result = RegistrationDraft {
            name: "Ada".to_string(),
            email: "nope".to_string(),
            password: "hunter22".to_string(),
        }
        .normalized();
        assert!(matches!(result, Err(CoreError::ValidationError(m)) if m == "Invalid email format"));
    }
}
