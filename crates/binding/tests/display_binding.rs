//! End-to-end binding of telemetry frames onto a display layout.

use navglass_binding::{
    DispatchHooks, Document, ElementTable, Frame, MarkerFilter, MessageDispatcher, Section,
};
use proptest::prelude::*;
use serde_json::json;

fn nav_page() -> ElementTable {
    let mut page = ElementTable::new();
    page.push("heading", "Navigation");
    page.push("mi_GpsTime", "");
    page.push("ms_BaseStationId", "");
    page.push("mf3_Roll", "");
    page.push("mf1_Speed2D", "");
    page.push("mi_AmId", "");
    page.push("mf2_AmX", "");
    page
}

#[test]
fn test_nav_status_connection_with_derived_field() {
    let hooks = DispatchHooks::new().with_augment(|frame: &mut Frame| {
        let speed = frame.nav.as_ref().and_then(|nav| {
            let vn = nav.get("Vn")?.as_f64()?;
            let ve = nav.get("Ve")?.as_f64()?;
            Some(vn.hypot(ve))
        });
        if let (Some(speed), Some(status)) = (speed, frame.status.as_mut()) {
            status.insert("Derived".to_string(), json!(speed));
        }
    });

    let mut page = nav_page();
    page.push("mf1_Derived", "");
    let mut dispatcher = MessageDispatcher::with_hooks(hooks, MarkerFilter::disabled());

    let report = dispatcher
        .on_frame(
            &mut page,
            r#"{
                "nav": {"GpsTime": 1300000000, "Roll": 0.12345, "Vn": 3.0, "Ve": 4.0},
                "status": {"BaseStationId": "BS01"},
                "connection": {"Packets": 12}
            }"#,
        )
        .unwrap();

    assert_eq!(
        report.sections,
        vec![Section::Nav, Section::Status, Section::Connection]
    );
    assert_eq!(page.content("heading"), Some("Navigation"));
    assert_eq!(page.content("mi_GpsTime"), Some("1300000000"));
    assert_eq!(page.content("ms_BaseStationId"), Some("BS01"));
    assert_eq!(page.content("mf3_Roll"), Some("0.123"));
    assert_eq!(page.content("mf1_Derived"), Some("5.0"));
}

#[test]
fn test_marker_filter_scenarios() {
    let filter = MarkerFilter::new(7);
    let mut dispatcher = MessageDispatcher::new(filter.clone());
    let mut page = nav_page();

    dispatcher
        .on_frame(&mut page, r#"{"am": {"AmId": 7, "AmX": 1.5}}"#)
        .unwrap();
    assert_eq!(page.content("mf2_AmX"), Some("1.50"));

    let report = dispatcher
        .on_frame(&mut page, r#"{"am": {"AmId": 3, "AmX": 9.0}}"#)
        .unwrap();
    assert!(report.marker_filtered);
    assert_eq!(page.content("mi_AmId"), Some("7"));
    assert_eq!(page.content("mf2_AmX"), Some("1.50"));

    filter.set(-1);
    dispatcher
        .on_frame(&mut page, r#"{"am": {"AmId": 3, "AmX": 9.0}}"#)
        .unwrap();
    assert_eq!(page.content("mi_AmId"), Some("3"));
    assert_eq!(page.content("mf2_AmX"), Some("9.00"));
}

#[test]
fn test_malformed_frame_leaves_display_stale() {
    let mut dispatcher = MessageDispatcher::new(MarkerFilter::disabled());
    let mut page = nav_page();

    dispatcher
        .on_frame(&mut page, r#"{"nav": {"GpsTime": 5}}"#)
        .unwrap();
    assert!(dispatcher.on_frame(&mut page, "not json").is_err());
    dispatcher
        .on_frame(&mut page, r#"{"nav": {"GpsTime": 6}}"#)
        .unwrap();

    assert_eq!(page.content("mi_GpsTime"), Some("6"));
}

#[test]
fn test_layout_change_is_picked_up() {
    let mut dispatcher = MessageDispatcher::new(MarkerFilter::disabled());
    let mut page = ElementTable::from_ids(["mi_A"]);

    dispatcher.on_frame(&mut page, r#"{"nav": {"A": 1, "B": 2}}"#).unwrap();
    page.push("mi_B", "");
    let rev = page.revision();
    dispatcher.on_frame(&mut page, r#"{"nav": {"A": 1, "B": 2}}"#).unwrap();

    assert_eq!(page.revision(), rev);
    assert_eq!(page.content("mi_B"), Some("2"));
}

#[test]
fn test_one_dispatcher_serves_pages_with_different_layouts() {
    let mut dispatcher = MessageDispatcher::new(MarkerFilter::disabled());
    let mut first = ElementTable::from_ids(["mi_A"]);
    let mut second = ElementTable::from_ids(["mi_B"]);
    let raw = r#"{"nav": {"A": 1, "B": 2}}"#;

    let report = dispatcher.on_frame(&mut first, raw).unwrap();
    assert_eq!(report.outcome.updated, 1);

    let report = dispatcher.on_frame(&mut second, raw).unwrap();
    assert_eq!(report.outcome.updated, 1);
    assert_eq!(second.content("mi_B"), Some("2"));
    assert_eq!(first.content("mi_A"), Some("1"));
}

proptest! {
    #[test]
    fn binding_twice_equals_binding_once(
        a in any::<i32>(),
        b in -1.0e6f64..1.0e6,
        c in "[a-zA-Z0-9 ]{0,12}",
    ) {
        let raw = json!({"nav": {"GpsTime": a, "Roll": b, "BaseStationId": c}}).to_string();
        let mut dispatcher = MessageDispatcher::new(MarkerFilter::disabled());

        let mut once = nav_page();
        dispatcher.on_frame(&mut once, &raw).unwrap();

        let mut twice = nav_page();
        dispatcher.on_frame(&mut twice, &raw).unwrap();
        dispatcher.on_frame(&mut twice, &raw).unwrap();

        let once: Vec<_> = once.iter().cloned().collect();
        let twice: Vec<_> = twice.iter().cloned().collect();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn raw_binding_shows_native_form(v in any::<i64>(), s in "[^\"\\\\]{0,16}") {
        let raw = json!({"status": {"GpsTime": v, "BaseStationId": s.clone()}}).to_string();
        let mut dispatcher = MessageDispatcher::new(MarkerFilter::disabled());
        let mut page = nav_page();

        dispatcher.on_frame(&mut page, &raw).unwrap();

        let expected = v.to_string();
        prop_assert_eq!(page.content("mi_GpsTime"), Some(expected.as_str()));
        prop_assert_eq!(page.content("ms_BaseStationId"), Some(s.as_str()));
    }
}
