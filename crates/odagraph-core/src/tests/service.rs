use crate::*;

#[test]
fn metadata_url_appends_suffix_to_service_root() {
    let url = metadata_url("https://services.odata.org/Northwind/Northwind.svc/").unwrap();
    assert_eq!(
        url.as_str(),
        "https://services.odata.org/Northwind/Northwind.svc/$metadata"
    );
}

#[test]
fn metadata_url_handles_missing_trailing_slash() {
    let url = metadata_url("https://services.odata.org/Northwind/Northwind.svc").unwrap();
    assert_eq!(
        url.as_str(),
        "https://services.odata.org/Northwind/Northwind.svc/$metadata"
    );
}

#[test]
fn metadata_url_passes_explicit_metadata_url_through() {
    let input = "https://services.odata.org/V4/TripPinService/$metadata";
    let url = metadata_url(input).unwrap();
    assert_eq!(url.as_str(), input);
}

#[test]
fn metadata_url_rejects_garbage() {
    assert!(metadata_url("not a url").is_err());
    assert!(metadata_url("mailto:someone@example.com").is_err());
}

#[test]
fn version_detection_prefers_body_markers() {
    assert_eq!(
        detect_version(r#"<edmx:Edmx Version="4.0">"#),
        ODataVersion::V4
    );
    assert_eq!(
        detect_version(r#"<edmx:Edmx Version="2.0">"#),
        ODataVersion::V2
    );
    assert_eq!(
        detect_version(r#"<edmx:Edmx Version="3.0">"#),
        ODataVersion::V3
    );
    assert_eq!(detect_version("<html></html>"), ODataVersion::Unknown);
}

#[test]
fn version_detection_falls_back_to_header_value() {
    assert_eq!(detect_version_header("2.0;"), ODataVersion::V2);
    assert_eq!(detect_version_header(" 4.0 "), ODataVersion::V4);
    assert_eq!(detect_version_header("1.0"), ODataVersion::Unknown);
}
