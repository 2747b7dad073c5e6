mod common;

use common::{ScriptedTransport, bar_scene, config, widget};
use foundation::time::Time;
use pretty_assertions::assert_eq;
use serde_json::json;
use streaming::{NamedProperties, TransportError};
use viewer::{HtmlRequest, InfoRequest, Session, ViewerEvent};

#[test]
fn drive_follows_stream_until_done() {
    let mut cfg = config("THREEJS");
    cfg.stream.enable = true;
    let mut w = widget(cfg, 400.0, 300.0);

    let mut first = bar_scene();
    first["chunkId"] = json!(1);
    first["moreChunks"] = json!(true);
    let session = Session::new(ScriptedTransport::new(vec![
        Ok(first),
        Ok(json!({"chunkId": 2, "moreChunks": true})),
        Ok(json!({"chunkId": 3})),
    ]));

    let pending = w.attach(Time(0.0));
    let trips = pollster::block_on(session.drive(&mut w, pending));

    assert_eq!(trips, 3);
    assert_eq!(w.drain_events(), vec![ViewerEvent::LoadComplete]);
    let chunk_ids: Vec<_> = session
        .transport()
        .sent()
        .iter()
        .map(|r| r.body().cloned().unwrap_or_default())
        .map(|b| b["model"]["rendererProperties"]["streamProperties"]["chunkId"].clone())
        .collect();
    assert_eq!(chunk_ids, vec![json!(null), json!(1), json!(2)]);
}

#[test]
fn drive_stops_on_transport_error() {
    let mut cfg = config("THREEJS");
    cfg.stream.enable = true;
    let mut w = widget(cfg, 400.0, 300.0);
    let mut first = bar_scene();
    first["chunkId"] = json!("a");
    first["moreChunks"] = json!(true);
    let session = Session::new(ScriptedTransport::new(vec![
        Ok(first),
        Err(TransportError::Network("connection reset".into())),
    ]));

    let pending = w.attach(Time(0.0));
    assert_eq!(pollster::block_on(session.drive(&mut w, pending)), 2);
    let names: Vec<_> = w.drain_events().iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["error"]);
    assert_eq!(w.scene().map(|s| s.cell_count()), Some(2));
}

#[test]
fn components_round_trip_through_session() {
    let session = Session::new(ScriptedTransport::new(vec![
        Ok(json!({"info": "%7B%22version%22%3A%222.1%22%7D"})),
        Ok(json!({"html": "%3Cp%3Elegend%3C%2Fp%3E"})),
    ]));
    let info = InfoRequest {
        url: Some(common::URL.into()),
        info: NamedProperties::new("version"),
        data_source: None,
    };
    let html = HtmlRequest {
        url: Some(common::URL.into()),
        request: NamedProperties::new("legend"),
        data: None,
    };

    let first = pollster::block_on(session.run_component(&info));
    let second = pollster::block_on(session.run_component(&html));
    assert_eq!(first, Some(ViewerEvent::InfoResponse(json!({"version": "2.1"}))));
    assert_eq!(
        second,
        Some(ViewerEvent::HtmlResponse {
            html: "<p>legend</p>".into()
        })
    );
    assert_eq!(session.transport().sent().len(), 2);
}

#[test]
fn component_configuration_errors_skip_the_network() {
    let session = Session::new(ScriptedTransport::default());
    let info = InfoRequest {
        url: None,
        info: NamedProperties::new("version"),
        data_source: None,
    };
    let event = pollster::block_on(session.run_component(&info));
    assert!(matches!(event, Some(ViewerEvent::Error { .. })));
    assert!(session.transport().sent().is_empty());
}
