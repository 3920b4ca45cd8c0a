//! End-to-end capture session flow tests
//!
//! Drives full sessions against scripted camera backends and the abstract
//! host tree, asserting the outcome codes and the teardown contract.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use webcam_capture_core::camera::CameraBackend;
use webcam_capture_core::testing::{wait_for_host, FakeBackend};
use webcam_capture_core::{
    go, go_with, CaptureContext, CaptureOptions, FrameSurface, Host, PresentationMode, ResultCode,
};

fn context_with(backend: Arc<FakeBackend>) -> CaptureContext {
    CaptureContext::detect(vec![backend as Arc<dyn CameraBackend>])
}

#[tokio::test]
async fn test_unsupported_host_short_circuits() {
    let backend = Arc::new(FakeBackend::new());
    let ctx = context_with(backend.clone()).with_form_support(false);
    let host = Host::new();

    let result = go(&ctx, &host, CaptureOptions::new()).await;
    assert_eq!(result.code, ResultCode::UnsupportedHost);
    assert_eq!(backend.acquire_count(), 0);
    assert!(host.children(host.root()).is_empty());
}

#[tokio::test]
async fn test_missing_anchor_fails_before_acquisition() {
    let backend = Arc::new(FakeBackend::new());
    let ctx = context_with(backend.clone());
    let host = Host::new();

    let options = CaptureOptions::new().with_presentation(PresentationMode::AnchoredPopover);
    let result = go(&ctx, &host, options).await;
    assert_eq!(result.code, ResultCode::MissingRequiredOption);
    assert_eq!(backend.acquire_count(), 0);
}

#[tokio::test]
async fn test_acquisition_failure_reports_webcam_error() {
    let backend = Arc::new(FakeBackend::new().with_acquire_failure());
    let ctx = context_with(backend.clone());
    let host = Host::new();

    let result = go(&ctx, &host, CaptureOptions::new()).await;
    assert_eq!(result.code, ResultCode::CantAccessWebcam);
    assert_eq!(backend.acquire_count(), 1);
    // Chrome mounted for the loading affordance must be gone again
    assert!(host.children(host.root()).is_empty());
}

#[tokio::test]
async fn test_cancel_tears_down_and_reports() {
    let backend = Arc::new(FakeBackend::new());
    let ctx = Arc::new(context_with(backend.clone()));
    let host = Host::new();

    let session = tokio::spawn({
        let ctx = ctx.clone();
        let host = host.clone();
        async move { go(&ctx, &host, CaptureOptions::new()).await }
    });

    assert!(wait_for_host(&host, |h| h.find_by_label("Cancel").is_some()).await);
    let cancel = host.find_by_label("Cancel").unwrap();
    assert!(host.click(cancel));

    let result = session.await.unwrap();
    assert_eq!(result.code, ResultCode::UserCancelled);
    assert_eq!(result.detail.as_deref(), Some("User cancelled."));
    assert!(host.children(host.root()).is_empty());
    assert_eq!(backend.stop_count(), 1);

    // Clicking the dead button is a no-op
    assert!(!host.click(cancel));
}

#[tokio::test]
async fn test_take_mirrors_canvases_with_derived_height() {
    let color = [10, 200, 90];
    let backend = Arc::new(FakeBackend::new().with_intrinsic(640, 480).with_color(color));
    let ctx = Arc::new(context_with(backend.clone()));
    let host = Host::new();
    let canvas = FrameSurface::shared(1, 1);

    let session = tokio::spawn({
        let ctx = ctx.clone();
        let host = host.clone();
        let options = CaptureOptions::new().with_canvas(canvas.clone());
        async move { go(&ctx, &host, options).await }
    });

    assert!(wait_for_host(&host, |h| h.find_by_label("Take it").is_some()).await);
    let take = host.find_by_label("Take it").unwrap();
    assert!(host.click(take));

    let result = session.await.unwrap();
    assert!(result.is_ok());
    assert!(result.response.is_none());

    let surface = canvas.lock().unwrap();
    assert_eq!(surface.dimensions(), (300, 225));
    assert_eq!(surface.rgb_at(150, 100), Some(color));
    assert_eq!(backend.stop_count(), 1);
    assert!(host.children(host.root()).is_empty());
}

#[tokio::test]
async fn test_preview_node_gets_derived_dimensions() {
    let backend = Arc::new(FakeBackend::new().with_intrinsic(1280, 720));
    let ctx = Arc::new(context_with(backend.clone()));
    let host = Host::new();

    let session = tokio::spawn({
        let ctx = ctx.clone();
        let host = host.clone();
        async move { go(&ctx, &host, CaptureOptions::new()).await }
    });

    assert!(
        wait_for_host(&host, |h| {
            h.find_by_label("webcam-preview")
                .and_then(|p| h.attr(p, "height"))
                .is_some()
        })
        .await
    );
    let preview = host.find_by_label("webcam-preview").unwrap();
    assert_eq!(host.attr(preview, "width").unwrap(), "300");
    // ceil(300 * 720 / 1280)
    assert_eq!(host.attr(preview, "height").unwrap(), "169");

    let cancel = host.find_by_label("Cancel").unwrap();
    host.click(cancel);
    session.await.unwrap();
}

#[tokio::test]
async fn test_hook_error_surfaces_verbatim() {
    let backend = Arc::new(FakeBackend::new());
    let ctx = Arc::new(context_with(backend.clone()));
    let host = Host::new();

    let options = CaptureOptions::new()
        .with_post_to("http://127.0.0.1:9/unused")
        .with_on_before_post(Arc::new(|_payload| Err("boom".to_string())));

    let session = tokio::spawn({
        let ctx = ctx.clone();
        let host = host.clone();
        async move { go(&ctx, &host, options).await }
    });

    assert!(wait_for_host(&host, |h| h.find_by_label("Take it").is_some()).await);
    let take = host.find_by_label("Take it").unwrap();
    assert!(host.click(take));

    let result = session.await.unwrap();
    assert_eq!(result.code, ResultCode::SaveCallbackError);
    assert_eq!(result.detail.as_deref(), Some("boom"));
    assert_eq!(backend.stop_count(), 1);
}

#[tokio::test]
async fn test_hook_runs_before_teardown() {
    let backend = Arc::new(FakeBackend::new());
    let ctx = Arc::new(context_with(backend.clone()));
    let host = Host::new();
    let seen = Arc::new(Mutex::new(None));

    let options = CaptureOptions::new()
        .with_post_to("http://127.0.0.1:9/unused")
        .with_on_before_post(Arc::new({
            let host = host.clone();
            let backend = backend.clone();
            let seen = seen.clone();
            move |_payload| {
                // Chrome and stream must both still be live here
                *seen.lock().unwrap() = Some((
                    host.find_by_label("Take it").is_some(),
                    backend.stop_count(),
                ));
                Err("rejected".to_string())
            }
        }));

    let session = tokio::spawn({
        let ctx = ctx.clone();
        let host = host.clone();
        async move { go(&ctx, &host, options).await }
    });

    assert!(wait_for_host(&host, |h| h.find_by_label("Take it").is_some()).await);
    host.click(host.find_by_label("Take it").unwrap());

    let result = session.await.unwrap();
    assert_eq!(result.code, ResultCode::SaveCallbackError);
    assert_eq!(result.detail.as_deref(), Some("rejected"));
    assert_eq!(*seen.lock().unwrap(), Some((true, 0)));
    // Teardown still happened exactly once after the hook
    assert_eq!(backend.stop_count(), 1);
    assert!(host.children(host.root()).is_empty());
}

#[tokio::test]
async fn test_completion_callback_runs_exactly_once() {
    let backend = Arc::new(FakeBackend::new());
    let ctx = Arc::new(context_with(backend));
    let host = Host::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let session = tokio::spawn({
        let ctx = ctx.clone();
        let host = host.clone();
        let calls = calls.clone();
        async move {
            go_with(&ctx, &host, CaptureOptions::new(), move |code, detail| {
                calls.fetch_add(1, Ordering::SeqCst);
                assert_eq!(code, ResultCode::UserCancelled);
                assert_eq!(detail.as_deref(), Some("User cancelled."));
            })
            .await
        }
    });

    assert!(wait_for_host(&host, |h| h.find_by_label("Cancel").is_some()).await);
    host.click(host.find_by_label("Cancel").unwrap());
    session.await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_modal_chrome_backdrop_lifecycle() {
    let backend = Arc::new(FakeBackend::new());
    let ctx = Arc::new(context_with(backend));
    let host = Host::new();

    let session = tokio::spawn({
        let ctx = ctx.clone();
        let host = host.clone();
        let options = CaptureOptions::new().with_presentation(PresentationMode::ModalV3);
        async move { go(&ctx, &host, options).await }
    });

    // Backdrop shows during acquisition, dialog replaces it on show
    assert!(
        wait_for_host(&host, |h| {
            h.find_by_label("modal-v3-dialog")
                .and_then(|d| h.attr(d, "open"))
                .as_deref()
                == Some("true")
        })
        .await
    );
    assert!(host.find_by_label("modal-loading").is_none());

    host.click(host.find_by_label("Cancel").unwrap());
    let result = session.await.unwrap();
    assert_eq!(result.code, ResultCode::UserCancelled);
    assert!(host.children(host.root()).is_empty());
}
