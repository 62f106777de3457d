//! Firmware-update lifecycle: availability, install progress, cancellation.

mod common;

use common::{firmware_update, next_event, spawn_initialized, wait_for_call};
use paybridge_sdk::events::SdkEvent;
use paybridge_sdk::mock::SdkCall;
use paybridge_session::{SdkError, SessionEvent};

#[tokio::test]
async fn install_with_no_available_update_is_a_no_op_success() {
    let (session, _events, handle) = spawn_initialized().await;

    session.install_available_update().await.unwrap();

    assert!(session.check_for_update().await.unwrap().is_none());
    assert!(!handle.calls().contains(&SdkCall::InstallAvailableUpdate));
}

#[tokio::test]
async fn reported_update_is_visible_and_installable() {
    let (session, mut events, handle) = spawn_initialized().await;

    handle.emit(SdkEvent::UpdateAvailable(firmware_update("2.0.1")));
    match next_event(&mut events).await {
        SessionEvent::DidReportAvailableUpdate { update } => {
            assert_eq!(update.device_software_version, "2.0.1");
            assert_eq!(update.estimated_update_time, 1);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    let known = session.check_for_update().await.unwrap();
    assert_eq!(known.map(|u| u.device_software_version), Some("2.0.1".to_string()));

    session.install_available_update().await.unwrap();
    wait_for_call(&handle, |c| matches!(c, SdkCall::InstallAvailableUpdate)).await;
}

#[tokio::test]
async fn install_progress_and_success_flow() {
    let (session, mut events, handle) = spawn_initialized().await;

    handle.emit(SdkEvent::InstallStarted {
        update: firmware_update("2.0.1"),
        cancel: handle.cancel_handle("installUpdate"),
    });
    assert_eq!(
        next_event(&mut events).await.name(),
        "didStartInstallingUpdate"
    );

    for progress in [0.25_f32, 0.5, 1.0] {
        handle.emit(SdkEvent::InstallProgress(progress));
    }
    for expected in [0.25_f32, 0.5, 1.0] {
        match next_event(&mut events).await {
            SessionEvent::DidReportReaderSoftwareUpdateProgress { progress } => {
                assert!((progress - expected).abs() < f32::EPSILON);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    handle.emit(SdkEvent::InstallFinished(Ok(firmware_update("2.0.1"))));
    match next_event(&mut events).await {
        SessionEvent::DidFinishInstallingUpdate { update, error } => {
            assert!(error.is_none());
            assert_eq!(
                update.map(|u| u.device_software_version),
                Some("2.0.1".to_string())
            );
        }
        other => panic!("unexpected event: {other:?}"),
    }

    // The update reference is cleared on success.
    assert!(session.check_for_update().await.unwrap().is_none());
}

#[tokio::test]
async fn install_failure_clears_the_update_too() {
    let (session, mut events, handle) = spawn_initialized().await;

    handle.emit(SdkEvent::InstallStarted {
        update: firmware_update("2.0.1"),
        cancel: handle.cancel_handle("installUpdate"),
    });
    next_event(&mut events).await;

    handle.emit(SdkEvent::InstallFinished(Err(SdkError::new(
        "UPDATE_INTERRUPTED",
        "reader went away",
    ))));
    match next_event(&mut events).await {
        SessionEvent::DidFinishInstallingUpdate { update, error } => {
            assert!(update.is_none());
            assert_eq!(error.as_deref(), Some("[UPDATE_INTERRUPTED] reader went away"));
        }
        other => panic!("unexpected event: {other:?}"),
    }

    assert!(session.check_for_update().await.unwrap().is_none());
}

#[tokio::test]
async fn cancel_install_goes_through_the_stored_handle() {
    let (session, mut events, handle) = spawn_initialized().await;

    handle.emit(SdkEvent::InstallStarted {
        update: firmware_update("2.0.1"),
        cancel: handle.cancel_handle("installUpdate"),
    });
    next_event(&mut events).await;

    session.cancel_install_update().await.unwrap();
    assert!(handle.calls().contains(&SdkCall::Cancel {
        operation: "installUpdate"
    }));

    // The SDK then reports the aborted install; the reference clears.
    handle.emit(SdkEvent::InstallFinished(Err(SdkError::canceled())));
    assert_eq!(
        next_event(&mut events).await.name(),
        "didFinishInstallingUpdate"
    );
    assert!(session.check_for_update().await.unwrap().is_none());
}
