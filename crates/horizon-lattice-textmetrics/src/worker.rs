//! Off-thread text measurement.
//!
//! A [`MeasureWorker`] owns a [`TextMeasurer`] on a dedicated, named thread.
//! Requests are queued on a bounded channel and processed strictly in
//! submission order; every request produces exactly one
//! [`MeasureResponse`] carrying the request's id.
//!
//! Requests and responses have a JSON wire form (camelCase keys), so the
//! worker can sit behind any message transport.
//!
//! # Example
//!
//! ```
//! use horizon_lattice_textmetrics::worker::{MeasureRequest, MeasureWorker, WorkerConfig};
//! use horizon_lattice_textmetrics::{FixedAdvanceMeasurer, TextMeasurer, TextStyle};
//!
//! let worker = MeasureWorker::spawn(WorkerConfig::default(), TextStyle::default(), || {
//!     TextMeasurer::new(FixedAdvanceMeasurer::new(8.0))
//! })?;
//!
//! let id = worker.submit(MeasureRequest::canvas("hello", "Arial", 16.0))?;
//! let response = worker.recv()?;
//! assert_eq!(response.id(), id);
//!
//! worker.stop_and_join();
//! # Ok::<(), horizon_lattice_textmetrics::MeasureError>(())
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{MeasureError, MeasureResult};
use crate::glyph::GlyphMeasurer;
use crate::metrics::{TextMeasurer, TextMetrics};
use crate::style::TextStyle;
use crate::targets;
use crate::types::FontSize;

/// Default capacity for the worker's request queue.
const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Identifier correlating a response with its request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Measurement modes a request can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MeasureMode {
    /// Full line and box measurement.
    #[serde(rename = "CANVAS_MEASURE")]
    Canvas,
}

impl MeasureMode {
    /// The wire tag for this mode.
    pub const fn as_str(self) -> &'static str {
        match self {
            MeasureMode::Canvas => "CANVAS_MEASURE",
        }
    }
}

impl FromStr for MeasureMode {
    type Err = MeasureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CANVAS_MEASURE" => Ok(MeasureMode::Canvas),
            other => Err(MeasureError::UnsupportedMode(other.to_string())),
        }
    }
}

impl fmt::Display for MeasureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A measurement request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawRequest")]
pub struct MeasureRequest {
    /// Request id; replaced by [`MeasureWorker::submit`].
    pub id: RequestId,
    /// What to measure.
    #[serde(rename = "type")]
    pub mode: MeasureMode,
    /// Text to measure; missing text measures as empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Comma-joined family list.
    pub font_family: String,
    /// Font size.
    pub font_size: FontSize,
    /// Overrides the style's wrap width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap_width: Option<f32>,
    /// Overrides the style's word wrap flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_wrap: Option<bool>,
    /// Overrides the style's break words flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub break_words: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRequest {
    #[serde(default)]
    id: RequestId,
    #[serde(rename = "type")]
    mode: String,
    #[serde(default)]
    text: Option<String>,
    font_family: String,
    font_size: FontSize,
    #[serde(default)]
    wrap_width: Option<f32>,
    #[serde(default)]
    word_wrap: Option<bool>,
    #[serde(default)]
    break_words: Option<bool>,
}

impl TryFrom<RawRequest> for MeasureRequest {
    type Error = MeasureError;

    fn try_from(raw: RawRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            id: raw.id,
            mode: raw.mode.parse()?,
            text: raw.text,
            font_family: raw.font_family,
            font_size: raw.font_size,
            wrap_width: raw.wrap_width,
            word_wrap: raw.word_wrap,
            break_words: raw.break_words,
        })
    }
}

impl MeasureRequest {
    /// A canvas measurement of `text`.
    pub fn canvas(
        text: impl Into<String>,
        font_family: impl Into<String>,
        font_size: impl Into<FontSize>,
    ) -> Self {
        Self {
            id: RequestId::default(),
            mode: MeasureMode::Canvas,
            text: Some(text.into()),
            font_family: font_family.into(),
            font_size: font_size.into(),
            wrap_width: None,
            word_wrap: None,
            break_words: None,
        }
    }

    /// Wrap at `width` pixels.
    pub fn wrap_width(mut self, width: f32) -> Self {
        self.wrap_width = Some(width);
        self.word_wrap = Some(true);
        self
    }

    /// Allow breaking words wider than the wrap width.
    pub fn break_words(mut self, break_words: bool) -> Self {
        self.break_words = Some(break_words);
        self
    }

    /// Decode a request from JSON.
    ///
    /// A malformed payload yields [`MeasureError::InvalidRequest`]; an unknown
    /// `type` yields [`MeasureError::UnsupportedMode`].
    pub fn from_json(json: &str) -> MeasureResult<Self> {
        let raw: RawRequest = serde_json::from_str(json)?;
        raw.try_into()
    }

    /// Encode this request as JSON.
    pub fn to_json(&self) -> MeasureResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// The style this request measures with, layered over `base`.
    pub fn to_style(&self, base: &TextStyle) -> TextStyle {
        let mut builder = base
            .to_builder()
            .font_family(&self.font_family)
            .font_size(self.font_size.clone());
        if let Some(width) = self.wrap_width {
            builder = builder.word_wrap_width(width);
        }
        if let Some(wrap) = self.word_wrap {
            builder = builder.word_wrap(wrap);
        }
        if let Some(break_words) = self.break_words {
            builder = builder.break_words(break_words);
        }
        builder.build()
    }
}

/// The reply to one [`MeasureRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasureResponse {
    /// The text was measured.
    #[serde(rename_all = "camelCase")]
    Measured {
        /// Id of the request.
        id: RequestId,
        /// Bounding width.
        width: f32,
        /// Bounding height.
        height: f32,
        /// Laid-out lines.
        lines: Vec<String>,
        /// Width of each line.
        line_widths: Vec<f32>,
        /// Baseline-to-baseline distance.
        line_height: f32,
        /// Widest line.
        max_line_width: f32,
    },
    /// Measurement failed.
    Failed {
        /// Id of the request.
        id: RequestId,
        /// Error description.
        error: String,
    },
}

impl MeasureResponse {
    /// Build a success response from measured metrics.
    pub fn measured(id: RequestId, metrics: TextMetrics) -> Self {
        MeasureResponse::Measured {
            id,
            width: metrics.width,
            height: metrics.height,
            lines: metrics.lines,
            line_widths: metrics.line_widths,
            line_height: metrics.line_height,
            max_line_width: metrics.max_line_width,
        }
    }

    /// Build a failure response.
    pub fn failed(id: RequestId, error: &MeasureError) -> Self {
        MeasureResponse::Failed {
            id,
            error: error.to_string(),
        }
    }

    /// Id of the request this answers.
    pub fn id(&self) -> RequestId {
        match self {
            MeasureResponse::Measured { id, .. } | MeasureResponse::Failed { id, .. } => *id,
        }
    }

    /// Whether the measurement succeeded.
    pub fn is_measured(&self) -> bool {
        matches!(self, MeasureResponse::Measured { .. })
    }

    /// Encode this response as JSON.
    pub fn to_json(&self) -> MeasureResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Keeps only the response to the most recently submitted request.
///
/// Useful when a caller re-measures on every input change and only cares
/// about the latest result.
#[derive(Debug, Clone, Default)]
pub struct LatestResponses {
    latest: Option<RequestId>,
}

impl LatestResponses {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `id` was submitted.
    pub fn submitted(&mut self, id: RequestId) {
        self.latest = Some(self.latest.map_or(id, |latest| latest.max(id)));
    }

    /// The newest submitted id.
    pub fn latest(&self) -> Option<RequestId> {
        self.latest
    }

    /// Pass `response` through unless a newer request has been submitted.
    pub fn accept(&self, response: MeasureResponse) -> Option<MeasureResponse> {
        match self.latest {
            Some(latest) if response.id() < latest => None,
            _ => Some(response),
        }
    }
}

/// Configuration for a measurement worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Name for the worker thread.
    pub name: String,
    /// Stack size for the worker thread in bytes. `None` uses the default.
    pub stack_size: Option<usize>,
    /// Capacity of the request queue; at least one request is always queued.
    pub queue_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            name: "textmetrics-worker".to_string(),
            stack_size: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl WorkerConfig {
    /// Create a new configuration with the given thread name.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the stack size for the worker thread.
    pub fn stack_size(mut self, size: usize) -> Self {
        self.stack_size = Some(size);
        self
    }

    /// Set the request queue capacity.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }
}

/// State shared between the worker handle and its thread.
struct WorkerState {
    running: AtomicBool,
    /// Held while a task is sent; cleared once the thread stops receiving.
    accepting: Mutex<bool>,
    pending: AtomicUsize,
    processed: AtomicU64,
}

enum WorkerTask {
    /// Measure and publish the response on the shared response channel.
    Measure(MeasureRequest),
    /// Measure and reply to a single caller.
    MeasureSync(MeasureRequest, Sender<MeasureResponse>),
    Shutdown,
}

/// A dedicated measurement thread with its own request queue.
pub struct MeasureWorker {
    task_sender: Sender<WorkerTask>,
    responses: Receiver<MeasureResponse>,
    handle: Mutex<Option<JoinHandle<()>>>,
    state: Arc<WorkerState>,
    next_id: AtomicU64,
}

impl MeasureWorker {
    /// Start a worker.
    ///
    /// `factory` runs on the worker thread to build the measurer, so the
    /// glyph backend itself need not be `Send`. `style` supplies every
    /// style field a request does not set.
    pub fn spawn<M, F>(config: WorkerConfig, style: TextStyle, factory: F) -> MeasureResult<Self>
    where
        M: GlyphMeasurer,
        F: FnOnce() -> TextMeasurer<M> + Send + 'static,
    {
        let (task_sender, task_receiver) = bounded(config.queue_capacity.max(1));
        let (response_sender, responses) = unbounded();
        let state = Arc::new(WorkerState {
            running: AtomicBool::new(true),
            accepting: Mutex::new(true),
            pending: AtomicUsize::new(0),
            processed: AtomicU64::new(0),
        });

        let thread_state = state.clone();
        let name = config.name.clone();

        let mut builder = thread::Builder::new().name(config.name);
        if let Some(stack_size) = config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let handle = builder.spawn(move || {
            info!(target: targets::WORKER, name = %name, "measurement worker started");
            let mut measurer = factory();
            worker_loop(&mut measurer, &style, &task_receiver, &response_sender, &thread_state);
            thread_state.running.store(false, Ordering::Release);

            // Close the queue, then answer anything sent before it closed
            let mut accepting = thread_state.accepting.lock();
            *accepting = false;
            drain(&mut measurer, &style, &task_receiver, &response_sender, &thread_state);
            drop(accepting);

            info!(
                target: targets::WORKER,
                name = %name,
                processed = thread_state.processed.load(Ordering::Acquire),
                "measurement worker stopped"
            );
        })?;

        Ok(Self {
            task_sender,
            responses,
            handle: Mutex::new(Some(handle)),
            state,
            next_id: AtomicU64::new(0),
        })
    }

    /// Check if the worker is still accepting requests.
    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::Acquire)
    }

    /// Number of requests queued or in progress.
    pub fn pending_requests(&self) -> usize {
        self.state.pending.load(Ordering::Acquire)
    }

    /// Number of requests processed so far.
    pub fn processed_requests(&self) -> u64 {
        self.state.processed.load(Ordering::Acquire)
    }

    /// Queue `request`, returning the id its response will carry.
    ///
    /// Ids increase monotonically with each call; any id already on the
    /// request is replaced. Blocks while the queue is full.
    pub fn submit(&self, mut request: MeasureRequest) -> MeasureResult<RequestId> {
        let id = self.assign_id(&mut request);
        self.enqueue(WorkerTask::Measure(request))?;
        Ok(id)
    }

    /// Measure `request` and block until its response arrives.
    ///
    /// The response is returned directly and does not appear on the shared
    /// response channel.
    pub fn measure_sync(&self, mut request: MeasureRequest) -> MeasureResult<MeasureResponse> {
        self.assign_id(&mut request);
        let (reply_sender, reply_receiver) = bounded(1);
        self.enqueue(WorkerTask::MeasureSync(request, reply_sender))?;
        reply_receiver.recv().map_err(|_| MeasureError::WorkerStopped)
    }

    /// Block until the next response arrives.
    pub fn recv(&self) -> MeasureResult<MeasureResponse> {
        self.responses.recv().map_err(|_| MeasureError::WorkerStopped)
    }

    /// Wait up to `timeout` for the next response.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<MeasureResponse> {
        self.responses.recv_timeout(timeout).ok()
    }

    /// Take a response if one is ready.
    pub fn try_recv(&self) -> Option<MeasureResponse> {
        self.responses.try_recv().ok()
    }

    /// The response channel, for use with `crossbeam_channel::select!`.
    pub fn responses(&self) -> &Receiver<MeasureResponse> {
        &self.responses
    }

    /// Request the worker to stop after processing queued requests.
    ///
    /// Never waits on a full queue; the worker notices the stop once the
    /// queue runs dry. Use `join()` to wait.
    pub fn stop(&self) {
        if self.state.running.swap(false, Ordering::AcqRel) {
            debug!(target: targets::WORKER, "measurement worker stop requested");
        }
        let _accepting = self.state.accepting.lock();
        // Ignore errors if the queue is full or the thread is already gone
        let _ = self.task_sender.try_send(WorkerTask::Shutdown);
    }

    /// Wait for the worker thread to finish.
    ///
    /// Returns `true` if the worker was joined successfully, `false` if
    /// already joined or the thread panicked.
    pub fn join(&self) -> bool {
        let mut handle = self.handle.lock();
        if let Some(h) = handle.take() {
            h.join().is_ok()
        } else {
            false
        }
    }

    /// Stop the worker and wait for it to finish.
    pub fn stop_and_join(&self) -> bool {
        self.stop();
        self.join()
    }

    fn assign_id(&self, request: &mut MeasureRequest) -> RequestId {
        let id = RequestId(self.next_id.fetch_add(1, Ordering::AcqRel));
        request.id = id;
        id
    }

    fn enqueue(&self, task: WorkerTask) -> MeasureResult<()> {
        // The thread closes the queue under this lock, so a task sent while
        // it is held is always answered.
        let accepting = self.state.accepting.lock();
        if !*accepting || !self.is_running() {
            return Err(MeasureError::WorkerStopped);
        }

        self.state.pending.fetch_add(1, Ordering::AcqRel);
        let sent = self.task_sender.send(task).map_err(|_| {
            self.state.pending.fetch_sub(1, Ordering::AcqRel);
            MeasureError::WorkerStopped
        });
        drop(accepting);
        sent
    }
}

impl fmt::Debug for MeasureWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeasureWorker")
            .field("running", &self.is_running())
            .field("pending", &self.pending_requests())
            .finish()
    }
}

impl Drop for MeasureWorker {
    fn drop(&mut self) {
        // Don't block in drop on the thread, just request shutdown
        self.stop();
    }
}

fn worker_loop<M: GlyphMeasurer>(
    measurer: &mut TextMeasurer<M>,
    style: &TextStyle,
    receiver: &Receiver<WorkerTask>,
    responses: &Sender<MeasureResponse>,
    state: &WorkerState,
) {
    while let Ok(task) = receiver.recv() {
        if !run_task(measurer, style, task, responses, state) {
            // Process remaining requests before exiting
            drain(measurer, style, receiver, responses, state);
            break;
        }
        if !state.running.load(Ordering::Acquire) && receiver.is_empty() {
            break;
        }
    }
}

/// Answer every task already queued.
fn drain<M: GlyphMeasurer>(
    measurer: &mut TextMeasurer<M>,
    style: &TextStyle,
    receiver: &Receiver<WorkerTask>,
    responses: &Sender<MeasureResponse>,
    state: &WorkerState,
) {
    while let Ok(task) = receiver.try_recv() {
        run_task(measurer, style, task, responses, state);
    }
}

/// Run one task; returns `false` for a shutdown request.
fn run_task<M: GlyphMeasurer>(
    measurer: &mut TextMeasurer<M>,
    style: &TextStyle,
    task: WorkerTask,
    responses: &Sender<MeasureResponse>,
    state: &WorkerState,
) -> bool {
    match task {
        WorkerTask::Measure(request) => {
            // The handle may have been dropped; keep draining regardless
            let _ = responses.send(process(measurer, style, request, state));
            true
        }
        WorkerTask::MeasureSync(request, reply) => {
            let _ = reply.send(process(measurer, style, request, state));
            true
        }
        WorkerTask::Shutdown => false,
    }
}

fn process<M: GlyphMeasurer>(
    measurer: &mut TextMeasurer<M>,
    base: &TextStyle,
    request: MeasureRequest,
    state: &WorkerState,
) -> MeasureResponse {
    let id = request.id;
    let result = match request.mode {
        MeasureMode::Canvas => {
            let style = request.to_style(base);
            let text = request.text.as_deref().unwrap_or_default();
            measurer.measure(text, &style, false)
        }
    };

    state.processed.fetch_add(1, Ordering::AcqRel);
    state.pending.fetch_sub(1, Ordering::AcqRel);

    match result {
        Ok(metrics) => {
            debug!(
                target: targets::WORKER,
                %id,
                width = metrics.width,
                height = metrics.height,
                "measured request"
            );
            MeasureResponse::measured(id, metrics)
        }
        Err(error) => {
            warn!(target: targets::WORKER, %id, %error, "measurement failed");
            MeasureResponse::failed(id, &error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::FixedAdvanceMeasurer;
    use crate::probe::{FontMetricsCache, FontProbe};

    fn spawn() -> MeasureWorker {
        MeasureWorker::spawn(WorkerConfig::with_name("test-worker"), TextStyle::default(), || {
            TextMeasurer::new(FixedAdvanceMeasurer::new(10.0))
                .with_probe(FontProbe::new(Arc::new(FontMetricsCache::new())))
        })
        .unwrap()
    }

    #[test]
    fn test_parses_wire_request() {
        let request = MeasureRequest::from_json(
            r#"{"id": 7, "type": "CANVAS_MEASURE", "text": "hi", "fontFamily": "Inter, sans-serif", "fontSize": "14px", "wrapWidth": 80}"#,
        )
        .unwrap();

        assert_eq!(request.id, RequestId(7));
        assert_eq!(request.mode, MeasureMode::Canvas);
        assert_eq!(request.font_size, FontSize::Css("14px".into()));
        assert_eq!(request.wrap_width, Some(80.0));
        assert_eq!(request.word_wrap, None);

        let style = request.to_style(&TextStyle::default());
        assert_eq!(style.font_family, vec!["Inter", "sans-serif"]);
        assert_eq!(style.word_wrap_width, 80.0);
        assert!(!style.word_wrap);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let result = MeasureRequest::from_json(
            r#"{"type": "DOM_MEASURE", "fontFamily": "Arial", "fontSize": 12}"#,
        );
        assert!(matches!(result, Err(MeasureError::UnsupportedMode(mode)) if mode == "DOM_MEASURE"));
    }

    #[test]
    fn test_malformed_request_is_rejected() {
        let result = MeasureRequest::from_json(r#"{"type": "CANVAS_MEASURE"}"#);
        assert!(matches!(result, Err(MeasureError::InvalidRequest(_))));
    }

    #[test]
    fn test_request_json_round_trip() {
        let request = MeasureRequest::canvas("abc", "Arial", 12.0).wrap_width(50.0);
        let json = request.to_json().unwrap();

        assert!(json.contains(r#""type":"CANVAS_MEASURE""#));
        assert!(json.contains(r#""wordWrap":true"#));
        assert_eq!(MeasureRequest::from_json(&json).unwrap(), request);
    }

    #[test]
    fn test_response_wire_shape() {
        let failed = MeasureResponse::failed(RequestId(3), &MeasureError::WorkerStopped);
        assert_eq!(
            failed.to_json().unwrap(),
            r#"{"id":3,"error":"measurement worker is not running"}"#
        );

        let json = r#"{"id":1,"width":2.0,"height":3.0,"lines":["a"],"lineWidths":[2.0],"lineHeight":3.0,"maxLineWidth":2.0}"#;
        let measured: MeasureResponse = serde_json::from_str(json).unwrap();
        assert!(measured.is_measured());
        assert_eq!(measured.id(), RequestId(1));
    }

    #[test]
    fn test_latest_responses_drop_stale() {
        let mut latest = LatestResponses::new();
        latest.submitted(RequestId(1));
        latest.submitted(RequestId(2));

        let stale = MeasureResponse::failed(RequestId(1), &MeasureError::WorkerStopped);
        let fresh = MeasureResponse::failed(RequestId(2), &MeasureError::WorkerStopped);
        assert!(latest.accept(stale).is_none());
        assert!(latest.accept(fresh).is_some());
        assert_eq!(latest.latest(), Some(RequestId(2)));
    }

    #[test]
    fn test_responses_arrive_in_submission_order() {
        let worker = spawn();
        let ids: Vec<_> = (0..10)
            .map(|i| {
                worker
                    .submit(MeasureRequest::canvas("x".repeat(i + 1), "Arial", 10.0))
                    .unwrap()
            })
            .collect();

        for (i, id) in ids.iter().enumerate() {
            let response = worker.recv().unwrap();
            assert_eq!(response.id(), *id);
            match response {
                MeasureResponse::Measured { width, .. } => {
                    assert_eq!(width, 10.0 * (i + 1) as f32)
                }
                other => panic!("unexpected response {other:?}"),
            }
        }

        assert!(worker.stop_and_join());
        assert_eq!(worker.processed_requests(), 10);
        assert_eq!(worker.pending_requests(), 0);
    }

    #[test]
    fn test_measure_sync_returns_directly() {
        let worker = spawn();
        let response = worker
            .measure_sync(MeasureRequest::canvas("hello world", "Arial", 10.0).wrap_width(60.0))
            .unwrap();

        match response {
            MeasureResponse::Measured { lines, .. } => assert_eq!(lines, vec!["hello", "world"]),
            other => panic!("unexpected response {other:?}"),
        }
        assert!(worker.try_recv().is_none());
        worker.stop_and_join();
    }

    #[test]
    fn test_missing_text_measures_empty() {
        let worker = spawn();
        let mut request = MeasureRequest::canvas("", "Arial", 10.0);
        request.text = None;

        match worker.measure_sync(request).unwrap() {
            MeasureResponse::Measured { lines, width, .. } => {
                assert_eq!(lines, vec![""]);
                assert_eq!(width, 0.0);
            }
            other => panic!("unexpected response {other:?}"),
        }
        worker.stop_and_join();
    }

    #[test]
    fn test_stop_drains_queue_then_rejects() {
        let worker = spawn();
        for _ in 0..5 {
            worker.submit(MeasureRequest::canvas("abc", "Arial", 10.0)).unwrap();
        }
        worker.stop();
        assert!(worker.join());

        assert_eq!(worker.responses().len(), 5);
        assert!(matches!(
            worker.submit(MeasureRequest::canvas("abc", "Arial", 10.0)),
            Err(MeasureError::WorkerStopped)
        ));
        assert!(matches!(
            worker.measure_sync(MeasureRequest::canvas("abc", "Arial", 10.0)),
            Err(MeasureError::WorkerStopped)
        ));
        assert!(!worker.join());
    }
}
