use annex_bridge::parse::RequestFields;
use annex_bridge::transform::{
    delivery_code, location_code, Classifier, DeliveryCode, LocationCode, RequestClass,
    SentinelClassifier, TransformError, DIGITAL_REQUEST_HAY, DIGITAL_REQUEST_NONHAY,
    PERSONAL_DELIVERY,
};

#[test]
fn delivery_table_maps_every_known_pickup() {
    assert_eq!(delivery_code("Rockefeller Library"), Ok(DeliveryCode::Ro));
    assert_eq!(delivery_code("John Hay Library"), Ok(DeliveryCode::Ha));
    assert_eq!(delivery_code("Sciences Library"), Ok(DeliveryCode::Sc));
    assert_eq!(delivery_code(PERSONAL_DELIVERY), Ok(DeliveryCode::Ro));
    assert_eq!(delivery_code(DIGITAL_REQUEST_HAY), Ok(DeliveryCode::Eh));
    assert_eq!(delivery_code(DIGITAL_REQUEST_NONHAY), Ok(DeliveryCode::Ed));
}

#[test]
fn unknown_pickups_are_rejected_with_the_offending_value() {
    let err = delivery_code("Orwig Music Library").unwrap_err();
    assert_eq!(
        err,
        TransformError::UnknownPickupLibrary("Orwig Music Library".to_string())
    );
    assert!(delivery_code("").is_err());
    // The table is exact, not case-folded.
    assert!(delivery_code("rockefeller library").is_err());
}

#[test]
fn location_table_maps_known_library_codes() {
    assert_eq!(location_code("ROCK", DeliveryCode::Ro), LocationCode::Qs);
    assert_eq!(location_code("HAY", DeliveryCode::Ha), LocationCode::Qh);
    // Science shares QS with Rockefeller.
    assert_eq!(location_code("SCIENCE", DeliveryCode::Sc), LocationCode::Qs);
}

#[test]
fn empty_library_codes_fall_back_on_the_delivery_channel() {
    assert_eq!(location_code("", DeliveryCode::Eh), LocationCode::Qh);
    assert_eq!(location_code("", DeliveryCode::Ed), LocationCode::Qs);
    assert_eq!(location_code("", DeliveryCode::Ro), LocationCode::Qs);
    assert_eq!(location_code("", DeliveryCode::Ha), LocationCode::Qs);
    assert_eq!(location_code("", DeliveryCode::Sc), LocationCode::Qs);
}

#[test]
fn unrecognized_library_codes_use_the_same_fallback() {
    assert_eq!(location_code("ORWIG", DeliveryCode::Ro), LocationCode::Qs);
    assert_eq!(location_code("ORWIG", DeliveryCode::Eh), LocationCode::Qh);
}

#[test]
fn code_strings_match_the_downstream_vocabulary() {
    assert_eq!(DeliveryCode::Ro.as_str(), "RO");
    assert_eq!(DeliveryCode::Ha.as_str(), "HA");
    assert_eq!(DeliveryCode::Sc.as_str(), "SC");
    assert_eq!(DeliveryCode::Eh.as_str(), "EH");
    assert_eq!(DeliveryCode::Ed.as_str(), "ED");
    assert_eq!(LocationCode::Qs.as_str(), "QS");
    assert_eq!(LocationCode::Qh.as_str(), "QH");
}

#[test]
fn only_provisioned_codes_parse() {
    assert_eq!(DeliveryCode::from_code("EH"), Some(DeliveryCode::Eh));
    assert_eq!(DeliveryCode::from_code("Z9"), None);
    assert_eq!(DeliveryCode::from_code("ro"), None);
}

fn fields_with_pickup(pickup: &str) -> RequestFields {
    RequestFields {
        pickup_library: pickup.to_string(),
        ..Default::default()
    }
}

#[test]
fn sentinel_classifier_recognizes_pre_tagged_digitization() {
    let classifier = SentinelClassifier;
    assert_eq!(
        classifier.classify(&fields_with_pickup(DIGITAL_REQUEST_HAY)),
        RequestClass::DigitizationHay
    );
    assert_eq!(
        classifier.classify(&fields_with_pickup(DIGITAL_REQUEST_NONHAY)),
        RequestClass::DigitizationNonHay
    );
    assert_eq!(
        classifier.classify(&fields_with_pickup("Rockefeller Library")),
        RequestClass::Pickup
    );
    assert_eq!(
        classifier.classify(&fields_with_pickup(PERSONAL_DELIVERY)),
        RequestClass::Pickup
    );
    assert_eq!(
        classifier.classify(&fields_with_pickup("")),
        RequestClass::Pickup
    );
}

#[test]
fn effective_pickup_substitutes_the_digitization_sentinels() {
    assert_eq!(
        RequestClass::Pickup.effective_pickup("John Hay Library"),
        "John Hay Library"
    );
    assert_eq!(
        RequestClass::DigitizationHay.effective_pickup("Brown University"),
        DIGITAL_REQUEST_HAY
    );
    assert_eq!(
        RequestClass::DigitizationNonHay.effective_pickup("Brown University"),
        DIGITAL_REQUEST_NONHAY
    );
}
