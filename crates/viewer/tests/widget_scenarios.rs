mod common;

use common::{URL, bar_scene, config, widget};
use foundation::bounds::{PixelRect, PixelSize};
use foundation::time::Time;
use pretty_assertions::assert_eq;
use serde_json::json;
use streaming::{HttpRequest, PickRegion, PickType, RendererType, TransportError};
use viewer::{
    ATTR_ITEM_INDEX, ATTR_SERIES_INDEX, GestureConfig, LocalSelection, SelectionDetail, SvgDom,
    TrackState, ViewerEvent,
};
use scene::PickDepth;

fn body(pending: &viewer::PendingRequest) -> serde_json::Value {
    pending.request.body().cloned().expect("post body")
}

#[test]
fn image_response_displays_and_completes() {
    let mut w = widget(config("IMAGE"), 400.0, 300.0);
    let first = w.attach(Time(0.0)).expect("initial request");

    let sent = body(&first);
    assert_eq!(sent["source"], json!("avs-go-dataviz"));
    assert_eq!(sent["version"], json!([1, 0, 0]));
    assert_eq!(sent["model"]["sceneProperties"]["name"], json!("demo"));
    assert_eq!(sent["model"]["rendererProperties"]["width"], json!(400));
    assert_eq!(sent["model"]["rendererProperties"]["height"], json!(300));
    assert_eq!(sent["model"]["rendererProperties"]["type"], json!("IMAGE"));
    assert_eq!(
        sent["model"]["rendererProperties"]["cssProperties"]["color"],
        json!("rgb(10, 20, 30)")
    );
    assert!(w.surface().loading);

    let next = w.handle_response(first.token, Ok(json!({"image": "data:image/png;base64,AAAA"})));
    assert!(next.is_none());
    assert_eq!(w.surface().image.as_deref(), Some("data:image/png;base64,AAAA"));
    assert!(!w.surface().loading);
    assert_eq!(w.drain_events(), vec![ViewerEvent::LoadComplete]);
}

#[test]
fn server_tap_sends_pick_properties() {
    let mut cfg = config("IMAGE");
    cfg.tap = Some(GestureConfig {
        process_on_client: Some(false),
        ..GestureConfig::default()
    });
    let mut w = widget(cfg, 400.0, 300.0);
    let first = w.attach(Time(0.0)).expect("initial request");
    w.handle_response(first.token, Ok(json!({"image": "a.png"})));
    w.drain_events();

    let pick = w.tap(50.0, 60.0).expect("pick request");
    let sent = body(&pick);
    let props = &sent["model"]["rendererProperties"]["pickProperties"];
    assert_eq!(props["type"], json!("TAP"));
    assert_eq!(props["x"], json!(50));
    assert_eq!(props["y"], json!(60));
    assert_eq!(props["level"], json!("CELL"));
    assert_eq!(props["depth"], json!("CLOSEST"));

    let events = w.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name(), "tap");
}

#[test]
fn resize_inside_band_stays_local() {
    let mut w = widget(config("IMAGE"), 400.0, 300.0);
    let first = w.attach(Time(0.0)).expect("initial request");
    w.handle_response(first.token, Ok(json!({"image": "a.png"})));

    w.surface_mut().set_size(405.0, 300.0);
    assert!(w.on_resize().is_none());
    assert_eq!(w.surface().layer_size, Some(PixelSize::new(405, 300)));

    w.surface_mut().set_size(300.0, 300.0);
    let again = w.on_resize().expect("server request");
    assert_eq!(body(&again)["model"]["rendererProperties"]["width"], json!(300));
}

#[test]
fn superseded_response_changes_nothing() {
    let mut w = widget(config("IMAGE"), 400.0, 300.0);
    let old = w.attach(Time(0.0)).expect("first");
    let new = w.update().expect("second");

    assert!(w.handle_response(old.token, Ok(json!({"image": "old.png", "selectionInfo": {}}))).is_none());
    assert_eq!(w.surface().image, None);
    assert!(w.drain_events().is_empty());
    assert!(w.surface().loading);

    w.handle_response(new.token, Ok(json!({"image": "data:new"})));
    assert_eq!(w.surface().image.as_deref(), Some("data:new"));
}

#[test]
fn stream_issues_one_continuation_per_more_chunks() {
    let mut cfg = config("THREEJS");
    cfg.stream.enable = true;
    cfg.stream.chunk_size_first = Some(10);
    let mut w = widget(cfg, 400.0, 300.0);

    let first = w.attach(Time(0.0)).expect("first");
    let stream = &body(&first)["model"]["rendererProperties"]["streamProperties"];
    assert_eq!(stream["streamChunkSizeFirst"], json!(10));
    assert!(stream.get("chunkId").is_none());

    let mut chunk = bar_scene();
    chunk["chunkId"] = json!("c1");
    chunk["moreChunks"] = json!(true);
    let second = w.handle_response(first.token, Ok(chunk)).expect("continuation");
    assert_eq!(
        body(&second)["model"]["rendererProperties"]["streamProperties"]["chunkId"],
        json!("c1")
    );
    assert!(w.drain_events().is_empty());

    let last = w.handle_response(second.token, Ok(json!({"chunkId": "c2", "moreChunks": false})));
    assert!(last.is_none());
    assert_eq!(w.drain_events(), vec![ViewerEvent::LoadComplete]);
    assert_eq!(w.scene().map(|s| s.chunks_merged()), Some(2));
    assert_eq!(w.scene().map(|s| s.cell_count()), Some(2));
}

#[test]
fn server_pick_mid_stream_resumes_the_stream() {
    let mut cfg = config("THREEJS");
    cfg.stream.enable = true;
    cfg.tap = Some(GestureConfig {
        process_on_client: Some(false),
        ..GestureConfig::default()
    });
    let mut w = widget(cfg, 400.0, 300.0);
    let first = w.attach(Time(0.0)).expect("first");

    let mut chunk = bar_scene();
    chunk["chunkId"] = json!("c1");
    chunk["moreChunks"] = json!(true);
    let continuation = w.handle_response(first.token, Ok(chunk)).expect("continuation");

    let pick = w.tap(20.0, 20.0).expect("server pick");
    assert!(
        w.handle_response(continuation.token, Ok(json!({"chunkId": "c2", "moreChunks": false})))
            .is_none()
    );

    let resumed = w
        .handle_response(pick.token, Ok(json!({"selectionInfo": {"picked": 1}})))
        .expect("stream resumes after the pick");
    let sent = body(&resumed);
    assert_eq!(
        sent["model"]["rendererProperties"]["streamProperties"]["chunkId"],
        json!("c1")
    );
    assert!(sent["model"]["rendererProperties"].get("pickProperties").is_none());
    let names: Vec<_> = w.drain_events().iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["tap", "selection-info"]);

    w.handle_response(resumed.token, Ok(json!({"chunkId": "c2", "moreChunks": false})));
    assert_eq!(w.drain_events(), vec![ViewerEvent::LoadComplete]);
    assert_eq!(w.scene().map(|s| s.chunks_merged()), Some(2));
}

#[test]
fn local_scene_track_picks_all_depths_into_front_layer() {
    let mut cfg = config("THREEJS");
    cfg.track = Some(GestureConfig {
        depth: PickDepth::All,
        highlight: true,
        highlight_layer: true,
        ..GestureConfig::default()
    });
    let mut w = widget(cfg, 400.0, 300.0);
    let first = w.attach(Time(0.0)).expect("first");
    w.handle_response(first.token, Ok(json!({"threejs": bar_scene()})));
    w.drain_events();

    assert!(w.track(TrackState::Start, 5.0, 10.0, 0.0, 0.0).is_none());
    assert!(w.track(TrackState::End, 90.0, 60.0, 85.0, 50.0).is_none());
    assert_eq!(w.surface().selection_rect, None);

    let events = w.drain_events();
    let ViewerEvent::SelectionInfo(SelectionDetail::Local(sel)) = &events[2] else {
        panic!("expected local selection, got {:?}", events[2]);
    };
    assert_eq!(sel.mode, PickType::Track);
    assert_eq!(
        sel.region,
        PickRegion::Rect {
            left: 5,
            right: 90,
            top: 10,
            bottom: 60
        }
    );
    assert_eq!(sel.selected.len(), 2);

    let scene = w.scene().expect("scene");
    assert_eq!(scene.pick_depth(), PickDepth::All);
    assert_eq!(scene.highlighted(), &sel.selected);
    let style = scene.highlight_style().expect("highlight style");
    assert!(style.front_layer);
    assert_eq!(style.color, "#ffff00");
}

#[test]
fn local_scene_tap_highlights_and_reports() {
    let mut cfg = config("THREEJS");
    cfg.tap = Some(GestureConfig {
        highlight: true,
        highlight_color: Some("#ff0000".into()),
        ..GestureConfig::default()
    });
    let mut w = widget(cfg, 400.0, 300.0);
    let first = w.attach(Time(0.0)).expect("first");
    w.handle_response(first.token, Ok(json!({"threejs": bar_scene()})));
    w.drain_events();

    assert!(w.tap(60.0, 50.0).is_none());
    let events = w.drain_events();
    assert_eq!(events[0].name(), "tap");
    let ViewerEvent::SelectionInfo(SelectionDetail::Local(sel)) = &events[1] else {
        panic!("expected local selection, got {:?}", events[1]);
    };
    assert_eq!(sel.mode, PickType::Tap);
    assert_eq!(sel.region, PickRegion::Point { x: 60, y: 50 });
    assert_eq!(sel.selected.len(), 1);
    assert_eq!(sel.selected.as_slice()[0].item_index, Some(1));

    let scene = w.scene().expect("scene");
    assert_eq!(scene.highlighted(), &sel.selected);
    assert_eq!(scene.highlight_style().map(|s| s.color.as_str()), Some("#ff0000"));
}

#[test]
fn selection_info_flag_suppresses_local_event() {
    let mut cfg = config("THREEJS");
    cfg.hover = Some(GestureConfig {
        selection_info: false,
        ..GestureConfig::default()
    });
    let mut w = widget(cfg, 400.0, 300.0);
    let first = w.attach(Time(0.0)).expect("first");
    w.handle_response(first.token, Ok(json!({"threejs": bar_scene()})));
    w.drain_events();

    assert!(w.pointer_moved(20.0, 20.0, Time(1.0)).is_none());
    let names: Vec<_> = w.drain_events().iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["hover"]);
}

#[test]
fn image_map_tap_resolves_locally() {
    let mut cfg = config("IMAGE");
    cfg.tap = Some(GestureConfig {
        process_on_client: Some(true),
        ..GestureConfig::default()
    });
    let mut w = widget(cfg, 400.0, 300.0);
    let first = w.attach(Time(0.0)).expect("first");
    w.handle_response(
        first.token,
        Ok(json!({
            "image": "data:x",
            "imagemap": [{"shape": "poly", "coords": [0, 0, 100, 0, 100, 100, 0, 100], "seriesIndex": 3, "itemIndex": 7}]
        })),
    );
    w.drain_events();

    assert!(w.tap(100.0, 50.0).is_none());
    let events = w.drain_events();
    assert_eq!(
        events[1],
        ViewerEvent::SelectionInfo(SelectionDetail::Local(LocalSelection {
            mode: PickType::Tap,
            region: PickRegion::Point { x: 100, y: 50 },
            selected: w.image_map().hit_test(foundation::bounds::PixelPoint::new(100, 50)),
        }))
    );
    let ViewerEvent::SelectionInfo(SelectionDetail::Local(sel)) = &events[1] else {
        panic!("expected selection");
    };
    assert_eq!(sel.selected.as_slice()[0].series_index, Some(3));
}

#[test]
fn svg_hover_walks_ancestors_and_swaps_fill() {
    let mut cfg = config("SVG");
    cfg.hover = Some(GestureConfig {
        process_on_client: Some(true),
        highlight: true,
        highlight_color: Some("orange".into()),
        ..GestureConfig::default()
    });
    let mut w = widget(cfg, 400.0, 300.0);
    let first = w.attach(Time(0.0)).expect("first");
    w.handle_response(first.token, Ok(json!({"svg": "%3Csvg%3E%3C%2Fsvg%3E"})));
    assert_eq!(w.surface().svg.as_deref(), Some("<svg></svg>"));
    w.drain_events();

    let dom = w.svg_dom_mut();
    let group = dom.add(None, None, &[(ATTR_SERIES_INDEX, "1")]);
    let bar = dom.add(
        Some(group),
        Some([0.0, 0.0, 50.0, 50.0]),
        &[(ATTR_ITEM_INDEX, "2"), ("fill", "steelblue")],
    );

    w.pointer_moved(10.0, 10.0, Time(0.5));
    let events = w.drain_events();
    let ViewerEvent::SelectionInfo(SelectionDetail::Local(sel)) = &events[1] else {
        panic!("expected selection");
    };
    assert_eq!(sel.selected.as_slice()[0].series_index, Some(1));
    assert_eq!(sel.selected.as_slice()[0].item_index, Some(2));
    assert_eq!(w.svg_dom().attribute(bar, "fill").as_deref(), Some("orange"));

    w.pointer_moved(200.0, 200.0, Time(0.6));
    assert_eq!(w.svg_dom().attribute(bar, "fill").as_deref(), Some("steelblue"));
}

#[test]
fn track_draws_band_then_picks_on_server() {
    let mut cfg = config("IMAGE");
    cfg.track = Some(GestureConfig::default());
    let mut w = widget(cfg, 400.0, 300.0);
    let first = w.attach(Time(0.0)).expect("first");
    w.handle_response(first.token, Ok(json!({"image": "data:x"})));
    w.drain_events();

    assert!(w.track(TrackState::Start, 100.0, 100.0, 0.0, 0.0).is_none());
    assert!(w.track(TrackState::Track, 60.0, 40.0, -40.0, -60.0).is_none());
    assert_eq!(
        w.surface().selection_rect,
        Some(PixelRect {
            left: 60,
            top: 40,
            right: 100,
            bottom: 100
        })
    );

    let pick = w
        .track(TrackState::End, 500.0, 20.0, 400.0, -80.0)
        .expect("server pick");
    assert_eq!(w.surface().selection_rect, None);
    let props = &body(&pick)["model"]["rendererProperties"]["pickProperties"];
    assert_eq!(props["type"], json!("TRACK"));
    assert_eq!(props["left"], json!(100));
    assert_eq!(props["right"], json!(400));
    assert_eq!(props["top"], json!(20));
    assert_eq!(props["bottom"], json!(100));
    assert_eq!(w.drain_events().len(), 3);
}

#[test]
fn server_error_payload_becomes_error_event() {
    let mut w = widget(config("IMAGE"), 400.0, 300.0);
    let first = w.attach(Time(0.0)).expect("first");
    w.handle_response(
        first.token,
        Ok(json!({"error": "%7B%22GoType%22%3A2%2C%22Message%22%3A%22no+such+scene%22%7D", "image": "x"})),
    );
    let events = w.drain_events();
    assert_eq!(events.len(), 1);
    let ViewerEvent::Error { message } = &events[0] else {
        panic!("expected error");
    };
    assert!(message.starts_with("An error occurred on the visualization server"));
    assert!(message.contains("Message : no such scene"));
    assert_eq!(w.surface().image, None);
    assert!(!w.surface().loading);
}

#[test]
fn transport_failures_are_reported() {
    let mut w = widget(config("IMAGE"), 400.0, 300.0);
    let first = w.attach(Time(0.0)).expect("first");
    w.handle_response(first.token, Err(TransportError::Status(502)));
    let events = w.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name(), "error");
    assert!(!w.surface().loading);
}

#[test]
fn bad_scene_info_does_not_stop_display() {
    let mut w = widget(config("IMAGE"), 400.0, 300.0);
    let first = w.attach(Time(0.0)).expect("first");
    w.handle_response(
        first.token,
        Ok(json!({"sceneInfo": "%7Bbroken", "image": "images/scene.png", "selectionInfo": {"n": 1}})),
    );
    let names: Vec<_> = w.drain_events().iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["selection-info", "error", "load-complete"]);
    assert_eq!(
        w.surface().image.as_deref(),
        Some("http://localhost:8080/images/scene.png")
    );
}

#[test]
fn missing_scene_name_never_sends() {
    let mut cfg = config("IMAGE");
    cfg.scene_name = None;
    let mut w = widget(cfg, 400.0, 300.0);
    assert!(w.attach(Time(0.0)).is_none());
    let events = w.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name(), "error");
    assert_eq!(w.in_flight(), None);
}

#[test]
fn rejected_request_records_no_resize_band() {
    let mut cfg = config("IMAGE");
    cfg.scene_name = None;
    let mut w = widget(cfg.clone(), 400.0, 300.0);
    assert!(w.attach(Time(0.0)).is_none());
    assert_eq!(w.size(), PixelSize::default());
    assert_eq!(w.surface().layer_size, None);
    w.drain_events();

    // Without a recorded band the resize goes back to the server and fails
    // the same way instead of being absorbed locally.
    assert!(w.on_resize().is_none());
    let names: Vec<_> = w.drain_events().iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["error"]);
    assert_eq!(w.surface().layer_size, None);

    cfg.scene_name = Some("demo".into());
    let first = w.set_config(cfg, Time(1.0)).expect("request once configured");
    assert_eq!(w.size(), PixelSize::new(400, 300));
    assert_eq!(body(&first)["model"]["rendererProperties"]["width"], json!(400));
}

#[test]
fn file_mode_walks_numbered_files() {
    let mut cfg = config("THREEJS");
    cfg.url = None;
    cfg.scene_url = Some("http://localhost:8080/scenes/part_01.json".into());
    let mut w = widget(cfg, 400.0, 300.0);

    let first = w.attach(Time(0.0)).expect("first");
    assert_eq!(
        first.request,
        HttpRequest::Get {
            url: "http://localhost:8080/scenes/part_01.json".into()
        }
    );
    let mut chunk = bar_scene();
    chunk["chunkId"] = json!(1);
    chunk["moreChunks"] = json!(true);
    let next = w.handle_response(first.token, Ok(chunk)).expect("next file");
    assert_eq!(next.request.url(), "http://localhost:8080/scenes/part_02.json");

    w.handle_response(next.token, Ok(json!({"chunkId": 2})));
    assert_eq!(w.drain_events(), vec![ViewerEvent::LoadComplete]);
}

#[test]
fn pointer_timeout_fires_once_per_idle_period() {
    let mut cfg = config("IMAGE");
    cfg.pointer_timeout_s = Some(2.0);
    let mut w = widget(cfg, 400.0, 300.0);
    let first = w.attach(Time(0.0)).expect("first");
    w.handle_response(first.token, Ok(json!({"image": "data:x"})));
    w.drain_events();

    w.pointer_moved(5.0, 5.0, Time(1.0));
    w.tick(Time(2.5));
    w.tick(Time(3.5));
    w.tick(Time(10.0));
    assert_eq!(w.drain_events(), vec![ViewerEvent::PointerTimeout]);

    w.pointer_moved(6.0, 6.0, Time(11.0));
    w.tick(Time(13.0));
    assert_eq!(w.drain_events(), vec![ViewerEvent::PointerTimeout]);
}

#[test]
fn renderer_change_replaces_scene_graph() {
    let mut w = widget(config("THREEJS"), 400.0, 300.0);
    let first = w.attach(Time(0.0)).expect("first");
    w.handle_response(first.token, Ok(json!({"threejs": bar_scene()})));
    assert_eq!(w.scene().map(|s| s.cell_count()), Some(2));

    let next = w.set_renderer(RendererType::Svg).expect("request");
    assert!(w.scene().is_none());
    assert_eq!(body(&next)["model"]["rendererProperties"]["type"], json!("SVG"));

    let back = w.set_renderer(RendererType::ThreeJs).expect("request");
    assert_eq!(w.scene().map(|s| s.cell_count()), Some(0));
    assert!(w.in_flight() == Some(back.token));
}

#[test]
fn zoom_steps_through_levels() {
    let mut cfg = config("THREEJS");
    cfg.transform = Some(viewer::TransformConfig::default());
    let mut w = widget(cfg, 400.0, 300.0);
    let first = w.attach(Time(0.0)).expect("first");
    assert!(body(&first)["model"]["rendererProperties"]["transformMatrix"].is_array());

    w.zoom_in();
    w.zoom_in();
    assert_eq!(w.interactor().map(|i| i.zoom()), Some(4.0));
    w.zoom_in();
    w.zoom_in();
    assert_eq!(w.interactor().map(|i| i.zoom()), Some(8.0));
    w.zoom_out();
    assert_eq!(w.interactor().map(|i| i.zoom()), Some(4.0));

    w.pan(10.0, 5.0);
    let next = w.update().expect("request");
    let matrix = &body(&next)["model"]["rendererProperties"]["transformMatrix"];
    assert_eq!(matrix[12], json!(10.0));
    assert_eq!(matrix[13], json!(5.0));

    w.reset();
    assert_eq!(w.interactor().map(|i| i.zoom()), Some(1.0));
    assert!(w.scene().map(|s| s.render_count()).unwrap_or(0) >= 6);
}

#[test]
fn clear_cancels_and_drops_content() {
    let mut w = widget(config("IMAGE"), 400.0, 300.0);
    let first = w.attach(Time(0.0)).expect("first");
    w.clear();
    assert!(!w.surface().loading);
    assert!(w.handle_response(first.token, Ok(json!({"image": "late"}))).is_none());
    assert_eq!(w.surface().image, None);
    assert_eq!(URL, w.config().url.as_deref().unwrap_or_default());
}
