use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::AppError;

/// Shown in place of a listing image when none was stored.
pub const FALLBACK_IMAGE: &str = "/images/ship1.JPG";

/// Lifecycle state of a listing. Purged listings have no status; the row is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Trash,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Trash => "trash",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown listing status: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Status::Active),
            "trash" => Ok(Status::Trash),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub id: i64,
    pub title: String,
    pub price: String,
    pub year: String,
    pub image: String,
    pub length: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub flag: String,
    pub location: String,
    pub engine: String,
    pub condition: String,
    pub description: String,
    pub status: Status,
}

impl Listing {
    /// Image URL suitable for an `src` attribute.
    pub fn image_src(&self) -> String {
        normalize_image(&self.image)
    }
}

/// Empty → fallback image; absolute paths and http(s) URLs pass through;
/// anything else is treated as site-relative.
pub fn normalize_image(src: &str) -> String {
    let src = src.trim();
    if src.is_empty() {
        FALLBACK_IMAGE.to_string()
    } else if src.starts_with('/') || src.starts_with("http://") || src.starts_with("https://") {
        src.to_string()
    } else {
        format!("/{src}")
    }
}

/// Listing fields as submitted by a client (JSON body or admin form).
///
/// Any `status` the caller sends is not part of this type and is dropped
/// during deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewListing {
    pub title: Option<String>,
    pub price: Option<String>,
    pub year: Option<String>,
    pub image: Option<String>,
    pub length: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub flag: Option<String>,
    pub location: Option<String>,
    pub engine: Option<String>,
    pub condition: Option<String>,
    pub description: Option<String>,
}

/// A listing that passed validation and is ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingDraft {
    pub title: String,
    pub price: String,
    pub year: String,
    pub image: String,
    pub length: String,
    pub kind: String,
    pub flag: String,
    pub location: String,
    pub engine: String,
    pub condition: String,
    pub description: String,
}

impl NewListing {
    /// Check the required fields and fill optional ones with empty strings.
    pub fn validate(self) -> Result<ListingDraft, AppError> {
        let required = [&self.title, &self.price, &self.year, &self.image];
        if required
            .iter()
            .any(|f| f.as_deref().is_none_or(|v| v.trim().is_empty()))
        {
            return Err(AppError::Validation("required fields missing".to_string()));
        }

        Ok(ListingDraft {
            title: self.title.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            year: self.year.unwrap_or_default(),
            image: self.image.unwrap_or_default(),
            length: self.length.unwrap_or_default(),
            kind: self.kind.unwrap_or_default(),
            flag: self.flag.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            engine: self.engine.unwrap_or_default(),
            condition: self.condition.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> NewListing {
        NewListing {
            title: Some("Sea Breeze".into()),
            price: Some("120000".into()),
            year: Some("1998".into()),
            image: Some("images/ship2.JPG".into()),
            ..Default::default()
        }
    }

    #[test]
    fn status_parses_only_known_values() {
        assert_eq!("active".parse::<Status>().unwrap(), Status::Active);
        assert_eq!("trash".parse::<Status>().unwrap(), Status::Trash);
        assert!("deleted".parse::<Status>().is_err());
        assert!("Active".parse::<Status>().is_err());
    }

    #[test]
    fn validate_fills_optional_fields() {
        let draft = complete().validate().unwrap();
        assert_eq!(draft.title, "Sea Breeze");
        assert_eq!(draft.kind, "");
        assert_eq!(draft.description, "");
    }

    #[test]
    fn validate_rejects_each_missing_required_field() {
        let blanks: [fn(&mut NewListing); 4] = [
            |l| l.title = None,
            |l| l.price = Some(String::new()),
            |l| l.year = Some("   ".into()),
            |l| l.image = None,
        ];
        for blank in blanks {
            let mut input = complete();
            blank(&mut input);
            match input.validate() {
                Err(AppError::Validation(msg)) => assert_eq!(msg, "required fields missing"),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn caller_status_is_ignored() {
        let input: NewListing = serde_json::from_value(serde_json::json!({
            "title": "t", "price": "p", "year": "y", "image": "i",
            "type": "Tanker", "status": "trash"
        }))
        .unwrap();
        let draft = input.validate().unwrap();
        assert_eq!(draft.kind, "Tanker");
    }

    #[test]
    fn images_are_normalized() {
        assert_eq!(normalize_image(""), FALLBACK_IMAGE);
        assert_eq!(normalize_image("/images/a.jpg"), "/images/a.jpg");
        assert_eq!(normalize_image("https://cdn.example/a.jpg"), "https://cdn.example/a.jpg");
        assert_eq!(normalize_image("images/a.jpg"), "/images/a.jpg");
    }

    #[test]
    fn listing_serializes_kind_as_type() {
        let listing = Listing {
            id: 7,
            title: "t".into(),
            price: "p".into(),
            year: "y".into(),
            image: "i".into(),
            length: String::new(),
            kind: "Yacht".into(),
            flag: String::new(),
            location: String::new(),
            engine: String::new(),
            condition: String::new(),
            description: String::new(),
            status: Status::Trash,
        };
        let v = serde_json::to_value(&listing).unwrap();
        assert_eq!(v["type"], "Yacht");
        assert_eq!(v["status"], "trash");
    }
}
