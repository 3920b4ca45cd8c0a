//! Capture sessions
//!
//! A capture session walks one pass of the still-frame flow: gate on the
//! context's capability result, validate options, acquire a camera
//! stream, mount and show the chrome, wait for the user, then either
//! mirror and submit the frame or tear down on cancel. Every exit path,
//! success or failure, funnels through one idempotent disposal
//! chokepoint that destroys the chrome and stops the stream exactly
//! once.
//!
//! Outcomes are reported as a [`ResultCode`] plus an optional human
//! detail; [`go_with`] additionally drives a caller-supplied completion
//! callback exactly once.

use crate::camera::{MediaStream, StreamConstraints};
use crate::capability::CaptureContext;
use crate::encoder;
use crate::error::CaptureError;
use crate::payload::{post_multipart, FormPayload, ResponseBody};
use crate::presentation::{self, ChromeSpec, Host, Presentation, UserAction};
use crate::surface::FrameSurface;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub mod config;
pub mod state;

pub use config::{BeforePostHook, CaptureOptions};
pub use state::{SessionState, SessionStateMachine};

/// Final outcome of a capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultCode {
    /// Frame captured (and submitted, when an endpoint was configured)
    Ok,
    /// User abandoned the session
    UserCancelled,
    /// Host cannot capture at all
    UnsupportedHost,
    /// Camera stream could not be acquired or delivered
    CantAccessWebcam,
    /// Pre-submit hook rejected the payload
    SaveCallbackError,
    /// Encoding or submission failed
    SaveFailed,
    /// A required option was missing or invalid
    MissingRequiredOption,
}

impl ResultCode {
    /// Stable numeric code for embedders that report outcomes numerically
    pub fn code(&self) -> u8 {
        match self {
            ResultCode::Ok => 0,
            ResultCode::UserCancelled => 1,
            ResultCode::UnsupportedHost => 2,
            ResultCode::CantAccessWebcam => 3,
            ResultCode::SaveCallbackError => 4,
            ResultCode::SaveFailed => 5,
            ResultCode::MissingRequiredOption => 6,
        }
    }
}

/// What a finished session hands back
#[derive(Debug, Clone)]
pub struct CaptureResult {
    /// Outcome code
    pub code: ResultCode,
    /// Human-readable detail for non-success outcomes
    pub detail: Option<String>,
    /// Submission response, on success with a configured endpoint
    pub response: Option<ResponseBody>,
}

impl CaptureResult {
    fn failure(code: ResultCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: Some(detail.into()),
            response: None,
        }
    }

    fn ok(response: Option<ResponseBody>) -> Self {
        Self {
            code: ResultCode::Ok,
            detail: None,
            response,
        }
    }

    /// Whether the session captured successfully
    pub fn is_ok(&self) -> bool {
        self.code == ResultCode::Ok
    }
}

/// Preview height derived from the requested width and the stream's
/// intrinsic aspect ratio, rounded up
fn derived_height(width: u32, intrinsic_width: u32, intrinsic_height: u32) -> u32 {
    if intrinsic_width == 0 {
        return width;
    }
    let w = width as u64;
    let iw = intrinsic_width as u64;
    let ih = intrinsic_height as u64;
    ((w * ih + iw - 1) / iw) as u32
}

/// Live session resources behind the single disposal chokepoint
struct ActiveSession {
    chrome: Box<dyn Presentation>,
    stream: Option<Box<dyn MediaStream>>,
    machine: SessionStateMachine,
}

impl ActiveSession {
    /// Tear everything down; idempotent
    ///
    /// The stream is stopped at most once; a stop failure is logged and
    /// swallowed so teardown never masks the primary outcome.
    fn dispose(&mut self) {
        if !self.machine.transition(SessionState::Disposed) {
            return;
        }
        self.chrome.destroy();
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.stop() {
                warn!(error = %e, "stream stop failed during disposal");
            }
        }
    }
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Run one capture session to completion
pub async fn go(ctx: &CaptureContext, host: &Host, options: CaptureOptions) -> CaptureResult {
    if !ctx.is_supported() {
        return CaptureResult::failure(
            ResultCode::UnsupportedHost,
            "host cannot capture camera frames",
        );
    }
    if let Err(e) = options.validate() {
        return CaptureResult::failure(ResultCode::MissingRequiredOption, e.to_string());
    }
    // Supported implies a backend was selected at detection time.
    let backend = match ctx.backend() {
        Some(backend) => backend.clone(),
        None => {
            return CaptureResult::failure(
                ResultCode::UnsupportedHost,
                "no camera backend selected",
            )
        }
    };

    let mut machine = SessionStateMachine::new();
    machine.transition(SessionState::AwaitingStream);

    // Chrome mounts before acquisition so loading affordances (shadow,
    // backdrop) are visible while permission prompts are pending.
    let (actions, mut action_rx) = mpsc::unbounded_channel();
    let mut chrome = presentation::build(options.presentation, host.clone());
    let spec = ChromeSpec {
        title: options.dialog_title.clone(),
        take_text: options.take_text.clone(),
        cancel_text: options.cancel_text.clone(),
        width: options.width,
        parent: options.parent.unwrap_or_else(|| host.root()),
        anchor: options.anchor,
    };
    if let Err(e) = chrome.mount(&spec, actions) {
        chrome.destroy();
        return CaptureResult::failure(ResultCode::MissingRequiredOption, e.to_string());
    }

    let stream = match backend.acquire(StreamConstraints::default()).await {
        Ok(stream) => stream,
        Err(e) => {
            machine.transition(SessionState::StreamError);
            chrome.destroy();
            return CaptureResult::failure(ResultCode::CantAccessWebcam, e.to_string());
        }
    };
    let mut session = ActiveSession {
        chrome,
        stream: Some(stream),
        machine,
    };

    let ready = match session.stream.as_mut() {
        Some(stream) => stream.ready().await,
        None => Err(CaptureError::stream("stream unavailable")),
    };
    let (intrinsic_w, intrinsic_h) = match ready {
        Ok(dims) => dims,
        Err(e) => {
            session.machine.transition(SessionState::StreamError);
            let detail = e.to_string();
            session.dispose();
            return CaptureResult::failure(ResultCode::CantAccessWebcam, detail);
        }
    };
    let height = derived_height(options.width, intrinsic_w, intrinsic_h);
    debug!(
        width = options.width,
        height, intrinsic_w, intrinsic_h, "stream ready"
    );

    session.machine.transition(SessionState::Previewing);
    if let Some(preview) = session.chrome.preview_node() {
        host.set_attr(preview, "width", options.width.to_string());
        host.set_attr(preview, "height", height.to_string());
    }
    if let Err(e) = session.chrome.show() {
        let detail = e.to_string();
        session.dispose();
        return CaptureResult::failure(ResultCode::CantAccessWebcam, detail);
    }

    // A closed channel means the chrome went away without a user action;
    // treat it as a cancel.
    let action = action_rx.recv().await.unwrap_or(UserAction::Cancel);
    match action {
        UserAction::Cancel => {
            session.machine.transition(SessionState::Cancelled);
            session.dispose();
            info!("capture session cancelled by user");
            CaptureResult::failure(ResultCode::UserCancelled, "User cancelled.")
        }
        UserAction::Take => {
            session.machine.transition(SessionState::Taking);
            take(ctx, &options, &mut session, height).await
        }
    }
}

/// Handle the take action: mirror and encode, run the hook, then tear
/// down and submit
async fn take(
    ctx: &CaptureContext,
    options: &CaptureOptions,
    session: &mut ActiveSession,
    height: u32,
) -> CaptureResult {
    let grabbed = match session.stream.as_mut() {
        Some(stream) => stream.capture_frame(),
        None => Err(CaptureError::stream("stream unavailable")),
    };
    let frame = match grabbed {
        Ok(frame) => frame,
        Err(e) => {
            session.machine.transition(SessionState::StreamError);
            let detail = e.to_string();
            session.dispose();
            return CaptureResult::failure(ResultCode::CantAccessWebcam, detail);
        }
    };

    for canvas in &options.canvases {
        let mut surface = canvas.lock().unwrap_or_else(|e| e.into_inner());
        surface.resize(options.width, height);
        surface.draw_frame(&frame);
    }

    let (url, surface) = match options.post_to.as_ref() {
        Some(url) => {
            let mut surface = FrameSurface::new(options.width, height);
            surface.draw_frame(&frame);
            (url.clone(), surface)
        }
        None => {
            session.dispose();
            return CaptureResult::ok(None);
        }
    };

    let format = encoder::parse_format(&options.post_image_format);
    let mut payload = FormPayload::new();
    if let Err(e) = ctx
        .encoder()
        .attach(&mut payload, &options.post_field_name, &surface, format)
    {
        let detail = e.to_string();
        session.dispose();
        return CaptureResult::failure(ResultCode::SaveFailed, detail);
    }

    // The hook runs with the session still live; only a completed hook
    // lets teardown proceed to the network round trip.
    if let Some(hook) = &options.on_before_post {
        if let Err(message) = hook(&mut payload) {
            session.machine.transition(SessionState::CallbackError);
            // Callback wraps the message verbatim; the caller sees it unchanged.
            let e = CaptureError::Callback(message);
            warn!(error = %e, "pre-submit hook rejected the payload");
            session.dispose();
            return CaptureResult::failure(ResultCode::SaveCallbackError, e.to_string());
        }
    }

    // Chrome comes down before the submission round trip.
    session.dispose();

    match post_multipart(ctx.http(), &url, payload, options.post_return_data_type).await {
        Ok(response) => {
            info!("capture submitted");
            CaptureResult::ok(Some(response))
        }
        Err(e) => {
            let detail = e.to_string();
            ctx.notifier().alert(&detail);
            CaptureResult::failure(ResultCode::SaveFailed, detail)
        }
    }
}

/// Run a session and drive a completion callback exactly once
///
/// The callback receives the outcome code and detail regardless of how
/// the session ends; the full result is also returned.
pub async fn go_with<F>(
    ctx: &CaptureContext,
    host: &Host,
    options: CaptureOptions,
    callback: F,
) -> CaptureResult
where
    F: FnOnce(ResultCode, Option<String>),
{
    let result = go(ctx, host, options).await;
    callback(result.code, result.detail.clone());
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_codes_are_stable() {
        assert_eq!(ResultCode::Ok.code(), 0);
        assert_eq!(ResultCode::UserCancelled.code(), 1);
        assert_eq!(ResultCode::UnsupportedHost.code(), 2);
        assert_eq!(ResultCode::CantAccessWebcam.code(), 3);
        assert_eq!(ResultCode::SaveCallbackError.code(), 4);
        assert_eq!(ResultCode::SaveFailed.code(), 5);
        assert_eq!(ResultCode::MissingRequiredOption.code(), 6);
    }

    #[test]
    fn test_derived_height_rounds_up() {
        assert_eq!(derived_height(300, 640, 480), 225);
        assert_eq!(derived_height(300, 1280, 720), 169);
        assert_eq!(derived_height(100, 320, 240), 75);
        assert_eq!(derived_height(300, 0, 480), 300);
    }
}
