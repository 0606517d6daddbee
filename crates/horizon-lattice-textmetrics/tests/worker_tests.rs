//! Integration tests for the measurement worker and its wire format.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use horizon_lattice_textmetrics::worker::{
    LatestResponses, MeasureRequest, MeasureResponse, MeasureWorker, RequestId, WorkerConfig,
};
use horizon_lattice_textmetrics::{
    FixedAdvanceMeasurer, FontMetricsCache, FontProbe, MeasureError, TextMeasurer, TextStyle,
};

fn spawn(config: WorkerConfig) -> MeasureWorker {
    MeasureWorker::spawn(config, TextStyle::default(), || {
        TextMeasurer::new(FixedAdvanceMeasurer::new(10.0))
            .with_probe(FontProbe::new(Arc::new(FontMetricsCache::new())))
    })
    .unwrap()
}

#[test]
fn test_responses_arrive_in_submission_order() {
    let worker = spawn(WorkerConfig::with_name("order-test"));

    let ids: Vec<RequestId> = ["a", "bb", "ccc", "dddd"]
        .into_iter()
        .map(|text| worker.submit(MeasureRequest::canvas(text, "Arial", 16.0)).unwrap())
        .collect();

    let received: Vec<RequestId> = (0..ids.len()).map(|_| worker.recv().unwrap().id()).collect();

    assert_eq!(received, ids);
    assert_eq!(ids, vec![RequestId(0), RequestId(1), RequestId(2), RequestId(3)]);
    assert!(worker.stop_and_join());
    assert_eq!(worker.processed_requests(), 4);
}

#[test]
fn test_request_overrides_wrap_settings() {
    let worker = spawn(WorkerConfig::default());

    let response = worker
        .measure_sync(MeasureRequest::canvas("hello world", "Arial", 16.0).wrap_width(60.0))
        .unwrap();

    match response {
        MeasureResponse::Measured {
            lines,
            max_line_width,
            ..
        } => {
            assert_eq!(lines, vec!["hello", "world"]);
            assert_eq!(max_line_width, 50.0);
        }
        MeasureResponse::Failed { error, .. } => panic!("measurement failed: {error}"),
    }
    assert!(worker.try_recv().is_none());
    worker.stop_and_join();
}

#[test]
fn test_json_request_round_trip_through_worker() {
    let worker = spawn(WorkerConfig::default().queue_capacity(4));

    let request = MeasureRequest::from_json(
        r#"{"type": "CANVAS_MEASURE", "text": "ab cd", "fontFamily": "Arial", "fontSize": 16}"#,
    )
    .unwrap();
    let id = worker.submit(request).unwrap();

    let response = worker.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(response.id(), id);
    assert!(response.is_measured());

    let json: serde_json::Value = serde_json::from_str(&response.to_json().unwrap()).unwrap();
    assert_eq!(json["lines"][0], "ab cd");
    assert_eq!(json["maxLineWidth"], 50.0);
    assert!(json.get("lineWidths").is_some());
    worker.stop_and_join();
}

#[test]
fn test_unknown_mode_is_rejected() {
    let result = MeasureRequest::from_json(
        r#"{"type": "DOM_MEASURE", "fontFamily": "Arial", "fontSize": 16}"#,
    );
    assert!(matches!(result, Err(MeasureError::UnsupportedMode(mode)) if mode == "DOM_MEASURE"));

    let result = MeasureRequest::from_json("{not json");
    assert!(matches!(result, Err(MeasureError::InvalidRequest(_))));
}

#[test]
fn test_css_font_size_passes_through() {
    let worker = spawn(WorkerConfig::default());

    let response = worker
        .measure_sync(MeasureRequest::canvas("x", "Arial", "12pt"))
        .unwrap();

    assert_eq!(response.id(), RequestId(0));
    assert!(response.is_measured());
    worker.stop_and_join();
}

#[test]
fn test_submit_after_stop_fails() {
    let worker = spawn(WorkerConfig::default());
    assert!(worker.stop_and_join());

    assert!(!worker.is_running());
    let result = worker.submit(MeasureRequest::canvas("late", "Arial", 16.0));
    assert!(matches!(result, Err(MeasureError::WorkerStopped)));
}

#[test]
fn test_latest_responses_drops_stale_results() {
    let worker = spawn(WorkerConfig::default());
    let mut latest = LatestResponses::new();

    for text in ["h", "he", "hel", "hell", "hello"] {
        let id = worker.submit(MeasureRequest::canvas(text, "Arial", 16.0)).unwrap();
        latest.submitted(id);
    }

    let accepted: Vec<MeasureResponse> = (0..5)
        .filter_map(|_| latest.accept(worker.recv().unwrap()))
        .collect();

    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].id(), RequestId(4));
    assert_eq!(latest.latest(), Some(RequestId(4)));
    worker.stop_and_join();
}

#[test]
fn test_stop_does_not_wait_on_full_queue() {
    let (release, gate) = crossbeam_channel::bounded::<()>(0);
    let worker = MeasureWorker::spawn(
        WorkerConfig::default().queue_capacity(1),
        TextStyle::default(),
        move || {
            // Hold the thread until the queue has been filled.
            let _ = gate.recv();
            TextMeasurer::new(FixedAdvanceMeasurer::new(10.0))
                .with_probe(FontProbe::new(Arc::new(FontMetricsCache::new())))
        },
    )
    .unwrap();

    worker.submit(MeasureRequest::canvas("queued", "Arial", 16.0)).unwrap();
    worker.stop();
    assert!(!worker.is_running());

    release.send(()).unwrap();
    assert!(worker.join());
    assert_eq!(worker.recv().unwrap().id(), RequestId(0));
    assert_eq!(worker.pending_requests(), 0);
}

#[test]
fn test_every_accepted_request_is_answered_across_stop() {
    let worker = Arc::new(spawn(WorkerConfig::default().queue_capacity(2)));

    let submitter = {
        let worker = worker.clone();
        thread::spawn(move || {
            (0..200)
                .filter(|_| worker.submit(MeasureRequest::canvas("x", "Arial", 16.0)).is_ok())
                .count()
        })
    };

    thread::sleep(Duration::from_millis(1));
    worker.stop();
    let accepted = submitter.join().unwrap();
    assert!(worker.join());

    assert_eq!(worker.pending_requests(), 0);
    assert_eq!(worker.processed_requests(), accepted as u64);
    assert_eq!(worker.responses().try_iter().count(), accepted);
}
