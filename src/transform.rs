//! Mapping from Alma pickup/library identifiers to GFA delivery and
//! location codes.
//!
//! Both rule tables are closed sets. Adding a library or a fulfillment
//! channel is a reviewed code change here, never a runtime or configuration
//! decision, because the downstream GFA system only understands codes it
//! was provisioned for.

use thiserror::Error;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::parse::RequestFields;

/// Literal pickup value the feed uses for personal delivery.
pub const PERSONAL_DELIVERY: &str = "PERSONAL_DELIVERY";
/// Literal pickup value for digitization destined for the Hay.
pub const DIGITAL_REQUEST_HAY: &str = "DIGITAL_REQUEST_HAY";
/// Literal pickup value for digitization for any other library.
pub const DIGITAL_REQUEST_NONHAY: &str = "DIGITAL_REQUEST_NONHAY";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("unknown pickup library `{0}`")]
    UnknownPickupLibrary(String),
}

/// GFA fulfillment channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryCode {
    /// Rockefeller pickup, also used for personal delivery.
    Ro,
    /// Hay pickup.
    Ha,
    /// Sciences pickup.
    Sc,
    /// Hay digitization queue.
    Eh,
    /// Non-Hay digitization queue.
    Ed,
}

impl DeliveryCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryCode::Ro => "RO",
            DeliveryCode::Ha => "HA",
            DeliveryCode::Sc => "SC",
            DeliveryCode::Eh => "EH",
            DeliveryCode::Ed => "ED",
        }
    }

    /// Parses a 2-letter code, e.g. an answer from the delivery lookup
    /// service. Codes outside the provisioned set are rejected.
    pub fn from_code(code: &str) -> Option<DeliveryCode> {
        match code {
            "RO" => Some(DeliveryCode::Ro),
            "HA" => Some(DeliveryCode::Ha),
            "SC" => Some(DeliveryCode::Sc),
            "EH" => Some(DeliveryCode::Eh),
            "ED" => Some(DeliveryCode::Ed),
            _ => None,
        }
    }
}

/// GFA shelving/queue location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationCode {
    Qs,
    Qh,
}

impl LocationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationCode::Qs => "QS",
            LocationCode::Qh => "QH",
        }
    }
}

/// Maps the raw pickup-library value onto the fulfillment channel.
pub fn delivery_code(pickup_library_raw: &str) -> Result<DeliveryCode, TransformError> {
    match pickup_library_raw {
        "Rockefeller Library" => Ok(DeliveryCode::Ro),
        "John Hay Library" => Ok(DeliveryCode::Ha),
        "Sciences Library" => Ok(DeliveryCode::Sc),
        PERSONAL_DELIVERY => Ok(DeliveryCode::Ro),
        DIGITAL_REQUEST_HAY => Ok(DeliveryCode::Eh),
        DIGITAL_REQUEST_NONHAY => Ok(DeliveryCode::Ed),
        other => Err(TransformError::UnknownPickupLibrary(other.to_string())),
    }
}

/// Derives the location code from the raw Alma library code. Digitization
/// and personal-delivery requests carry no library code, so an empty or
/// unrecognized code falls back to a default keyed on the delivery channel.
/// Science deliberately shares QS with Rockefeller.
pub fn location_code(library_code_raw: &str, delivery: DeliveryCode) -> LocationCode {
    match library_code_raw {
        "ROCK" => LocationCode::Qs,
        "HAY" => LocationCode::Qh,
        "SCIENCE" => LocationCode::Qs,
        _ => match delivery {
            DeliveryCode::Eh => LocationCode::Qh,
            _ => LocationCode::Qs,
        },
    }
}

/// Out-of-band classification of one request.
///
/// The feed writes the same library value for both digitization variants,
/// so the record builder never infers the variant from record content; the
/// caller supplies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Physical fulfillment: the feed's own pickup value applies.
    Pickup,
    /// Digitization destined for the Hay.
    DigitizationHay,
    /// Digitization for any other library.
    DigitizationNonHay,
}

impl RequestClass {
    /// The pickup value the delivery mapping should see for this class.
    pub fn effective_pickup<'a>(&self, feed_value: &'a str) -> &'a str {
        match self {
            RequestClass::Pickup => feed_value,
            RequestClass::DigitizationHay => DIGITAL_REQUEST_HAY,
            RequestClass::DigitizationNonHay => DIGITAL_REQUEST_NONHAY,
        }
    }
}

/// Assigns the request class for one record.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait Classifier: Send + Sync {
    fn classify(&self, fields: &RequestFields) -> RequestClass;
}

/// Classifier for feeds whose upstream already rewrote the library field to
/// the digitization sentinels. Anything else is a pickup request. Feeds
/// that carry the raw institutional value instead need their own
/// [`Classifier`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SentinelClassifier;

impl Classifier for SentinelClassifier {
    fn classify(&self, fields: &RequestFields) -> RequestClass {
        match fields.pickup_library.as_str() {
            DIGITAL_REQUEST_HAY => RequestClass::DigitizationHay,
            DIGITAL_REQUEST_NONHAY => RequestClass::DigitizationNonHay,
            _ => RequestClass::Pickup,
        }
    }
}
