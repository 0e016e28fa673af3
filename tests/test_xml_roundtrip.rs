use chrono::{TimeZone, Utc};
use cphd::metadata::geo_info::GeoInfo;
use cphd::types::{CphdError, LatLon, Parameter};
use cphd::xml::{CphdXmlControl, Element, SchemaValidator};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

mod common;

#[test]
fn test_full_metadata_round_trip() {
    common::init_logging();

    let metadata = common::sample_metadata();
    let control = CphdXmlControl::new();
    let xml = control.to_xml_string(&metadata).expect("Failed to encode metadata");
    println!("Encoded {} bytes of XML", xml.len());

    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains(r#"<CPHD xmlns="urn:CPHD:1.0.0">"#));
    assert!(xml.contains("<ErrorParameters>"));
    assert!(xml.contains("<ReleaseInfo>UNRESTRICTED</ReleaseInfo>"));
    assert!(xml.contains("<CountryCode>US,GB</CountryCode>"));

    let decoded = control.from_xml_str(&xml).expect("Failed to decode metadata");
    assert_eq!(decoded, metadata);
}

#[test]
fn test_minimal_metadata_round_trip() {
    let metadata = common::minimal_metadata();
    let control = CphdXmlControl::new();
    let xml = control.to_xml_string(&metadata).expect("Failed to encode metadata");
    assert!(!xml.contains("<SupportArray>"));
    assert!(!xml.contains("<Antenna>"));
    assert!(!xml.contains("<GeoInfo"));
    assert_eq!(control.from_xml_str(&xml).expect("Failed to decode"), metadata);
}

#[test]
fn test_sub_microsecond_times_survive() {
    let mut metadata = common::sample_metadata();
    let start = Utc.timestamp_opt(1_700_000_000, 123_456_789).single().expect("valid timestamp");
    metadata.global.timeline.collection_start = start;
    metadata.global.timeline.rcv_collection_start = Some(start + chrono::Duration::nanoseconds(1));
    let product = metadata.product_info.as_mut().expect("sample has product info");
    product.creation_info[0].date_time = start + chrono::Duration::milliseconds(1500);

    let control = CphdXmlControl::new();
    let xml = control.to_xml_string(&metadata).expect("encode");
    assert!(xml.contains("<CollectionStart>2023-11-14T22:13:20.123456789Z</CollectionStart>"));

    let decoded = control.from_xml_str(&xml).expect("decode");
    assert_eq!(decoded.global.timeline.collection_start, start);
    assert_eq!(decoded, metadata);
}

#[test]
fn test_free_text_whitespace_survives() {
    let mut metadata = common::sample_metadata();
    metadata.collection_id.collector_name = "  SAT 1 ".to_string();
    metadata.collection_id.parameters.push(Parameter::new("Note", " padded value\n"));

    let control = CphdXmlControl::new();
    let decoded = control
        .from_xml_str(&control.to_xml_string(&metadata).expect("encode"))
        .expect("decode");
    assert_eq!(decoded.collection_id.collector_name, "  SAT 1 ");
    assert_eq!(decoded, metadata);

    // Numeric fields still tolerate padding
    let xml = control.to_xml_string(&common::sample_metadata()).expect("encode");
    let padded = xml.replace("<BNRef>0.8</BNRef>", "<BNRef>\n  0.8\n</BNRef>");
    assert_ne!(padded, xml);
    assert!(control.from_xml_str(&padded).is_ok());
}

#[test]
fn test_schema_order_of_sections() {
    let control = CphdXmlControl::new();
    let root = control.encode(&common::sample_metadata()).expect("encode");
    let names: Vec<_> = root.children().iter().map(Element::name).collect();
    assert_eq!(
        names,
        vec![
            "CollectionID",
            "Global",
            "SceneCoordinates",
            "Data",
            "Channel",
            "PVP",
            "SupportArray",
            "Dwell",
            "ReferenceGeometry",
            "Antenna",
            "TxRcv",
            "ErrorParameters",
            "ProductInfo",
            "GeoInfo",
            "MatchInfo",
        ]
    );
}

#[test]
fn test_forged_polygon_size_is_ignored() {
    common::init_logging();

    let control = CphdXmlControl::new();
    let xml = control.to_xml_string(&common::sample_metadata()).expect("encode");
    let forged = xml.replacen(r#"<Polygon size="4">"#, r#"<Polygon size="17">"#, 1);
    assert_ne!(forged, xml);

    let decoded = control.from_xml_str(&forged).expect("forged size must not fail the decode");
    assert_eq!(decoded.scene_coordinates.image_area.polygon.len(), 4);
}

#[test]
fn test_nested_geo_info_survives() {
    let mut metadata = common::minimal_metadata();
    let mut inner = GeoInfo::new("Tower");
    inner.points.push(LatLon::new(35.001, -106.001));
    let mut middle = GeoInfo::new("Apron");
    middle.geo_info.push(inner);
    let mut outer = GeoInfo::new("Airfield");
    outer.geo_info.push(middle);
    metadata.geo_info.push(outer);
    metadata.geo_info.push(GeoInfo::new("Empty"));

    let control = CphdXmlControl::new();
    let decoded = control
        .from_xml_str(&control.to_xml_string(&metadata).expect("encode"))
        .expect("decode");
    assert_eq!(decoded.geo_info.len(), 2);
    assert_eq!(decoded.geo_info[0].depth(), 3);
    assert_eq!(decoded.geo_info[0].geo_info[0].geo_info[0].points, vec![LatLon::new(35.001, -106.001)]);
    assert!(decoded.geo_info[0].points.is_empty());
}

struct CountingValidator {
    calls: AtomicUsize,
}

impl SchemaValidator for CountingValidator {
    fn validate(&self, xml: &str, namespace: &str) -> Result<(), Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if xml.contains(namespace) {
            Ok(())
        } else {
            Err(vec![format!("document is not in {}", namespace)])
        }
    }
}

#[test]
fn test_validator_runs_on_encode_and_decode() {
    let validator = Arc::new(CountingValidator { calls: AtomicUsize::new(0) });
    let shared: Arc<dyn SchemaValidator> = validator.clone();
    let control = CphdXmlControl::with_validator(Some(shared));
    let xml = control.to_xml_string(&common::minimal_metadata()).expect("encode");
    control.from_xml_str(&xml).expect("decode");
    assert_eq!(validator.calls.load(Ordering::SeqCst), 2);

    let stripped = xml.replace(r#" xmlns="urn:CPHD:1.0.0""#, "");
    assert!(matches!(
        control.from_xml_str(&stripped),
        Err(CphdError::SchemaValidation(_))
    ));
}
