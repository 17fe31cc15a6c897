// Integration tests for authorization, configuration and session lifecycle
//
// These tests drive the controller against the simulated platform and check
// both the resulting session graph and the signals sent to the UI.

mod common;

use camcorder::platform::{AuthorizationStatus, SessionPreset};
use camcorder::{
    AuthorizationState, CaptureDevice, ControllerError, ControllerEvent, DeviceType,
    InterfaceOrientation, Position, SessionConfigState, VideoOrientation,
};
use common::Harness;

#[tokio::test]
async fn test_authorized_configuration_binds_default_devices() {
    let mut h = Harness::phone();
    h.controller.check_authorization();
    let events = h.drain().await;

    let snapshot = h.snapshot().await;
    assert_eq!(snapshot.config_state, SessionConfigState::Success);
    assert_eq!(snapshot.authorization, AuthorizationState::Authorized);
    assert_eq!(snapshot.active_device.as_deref(), Some("back-dual-wide"));
    assert!(snapshot.has_audio_input);
    assert!(snapshot.has_movie_output);
    assert!(!snapshot.is_session_running);

    assert_eq!(h.probe.video_inputs(), vec!["back-dual-wide".to_string()]);
    assert_eq!(h.probe.audio_inputs(), vec!["built-in-microphone".to_string()]);
    assert!(h.probe.has_movie_output());
    assert!(h.probe.stabilization(), "Stabilization should be on when supported");
    assert_eq!(h.probe.preset(), Some(SessionPreset::High));
    assert_eq!(h.probe.transactions(), 1, "Configuration should be one transaction");
    assert_eq!(h.probe.unguarded_mutations(), 0);
    assert_eq!(h.probe.access_requests(), 0);
    assert_eq!(h.probe.preview_orientation(), Some(VideoOrientation::Portrait));

    assert!(events.is_empty(), "Configuration alone publishes nothing: {:?}", events);
}

#[tokio::test]
async fn test_preview_orientation_follows_window() {
    let h = Harness::with(|sim| sim.window_orientation = InterfaceOrientation::LandscapeLeft);
    h.controller.check_authorization();

    assert_eq!(h.snapshot().await.preview_orientation, VideoOrientation::LandscapeLeft);
    assert_eq!(h.probe.preview_orientation(), Some(VideoOrientation::LandscapeLeft));
}

#[tokio::test]
async fn test_unknown_window_orientation_falls_back_to_portrait() {
    let h = Harness::with(|sim| sim.window_orientation = InterfaceOrientation::Unknown);
    h.controller.check_authorization();

    assert_eq!(h.snapshot().await.preview_orientation, VideoOrientation::Portrait);
    assert_eq!(h.probe.preview_orientation(), Some(VideoOrientation::Portrait));
}

#[tokio::test]
async fn test_preview_orientation_read_at_configuration() {
    let h = Harness::phone();
    h.probe.set_window_orientation(InterfaceOrientation::PortraitUpsideDown);
    h.controller.check_authorization();

    assert_eq!(
        h.snapshot().await.preview_orientation,
        VideoOrientation::PortraitUpsideDown
    );

    // Later window rotations reach the preview only through update_interface_orientation
    h.probe.set_window_orientation(InterfaceOrientation::LandscapeRight);
    h.controller.configure_session();
    h.snapshot().await;
    assert_eq!(h.probe.preview_orientation(), Some(VideoOrientation::PortraitUpsideDown));
}

#[tokio::test]
async fn test_authorization_prompt_granted() {
    let h = Harness::with(|sim| {
        sim.authorization = AuthorizationStatus::NotDetermined;
        sim.grant_access = true;
    });
    h.controller.check_authorization();

    let snapshot = h.snapshot().await;
    assert_eq!(h.probe.access_requests(), 1);
    assert_eq!(snapshot.authorization, AuthorizationState::Authorized);
    assert_eq!(snapshot.config_state, SessionConfigState::Success);
    assert_eq!(snapshot.active_device.as_deref(), Some("back-dual-wide"));
}

#[tokio::test]
async fn test_authorization_denied_skips_configuration() {
    let h = Harness::with(|sim| {
        sim.authorization = AuthorizationStatus::NotDetermined;
        sim.grant_access = false;
    });
    h.controller.check_authorization();
    h.controller.configure_session();

    let snapshot = h.snapshot().await;
    assert_eq!(h.probe.access_requests(), 1);
    assert_eq!(snapshot.authorization, AuthorizationState::Denied);
    assert_eq!(snapshot.config_state, SessionConfigState::NotAuthorized);
    assert!(snapshot.active_device.is_none());
    assert!(h.probe.video_inputs().is_empty());
    assert!(h.probe.audio_inputs().is_empty());
    assert_eq!(h.probe.transactions(), 0, "No configuration should be attempted");
}

#[tokio::test]
async fn test_restricted_authorization_never_prompts() {
    let h = Harness::with(|sim| sim.authorization = AuthorizationStatus::Restricted);
    h.controller.check_authorization();

    let snapshot = h.snapshot().await;
    assert_eq!(h.probe.access_requests(), 0);
    assert_eq!(snapshot.config_state, SessionConfigState::NotAuthorized);
}

#[tokio::test]
async fn test_start_after_denial_is_fatal() {
    let mut h = Harness::with(|sim| sim.authorization = AuthorizationStatus::Denied);
    h.controller.check_authorization();
    h.controller.start_session();

    let result = h.controller.shutdown().await;
    assert_eq!(
        result,
        Err(ControllerError::SessionUnavailable(SessionConfigState::NotAuthorized))
    );

    let events = h.pending_events();
    assert_eq!(
        events,
        vec![ControllerEvent::SessionFailed(SessionConfigState::NotAuthorized)]
    );
    assert!(!h.probe.is_running());
    assert_eq!(h.probe.observer_count(), 0);

    // The session queue is gone; further calls are dropped
    h.controller.toggle_recording();
    assert_eq!(h.controller.snapshot().await.err(), Some(ControllerError::QueueClosed));
}

#[tokio::test]
async fn test_start_without_cameras_is_fatal() {
    let mut h = Harness::with(|sim| sim.devices.clear());
    h.controller.check_authorization();

    let snapshot = h.snapshot().await;
    assert_eq!(snapshot.config_state, SessionConfigState::ConfigurationFailed);
    assert!(h.probe.video_inputs().is_empty());

    h.controller.start_session();
    let result = h.controller.shutdown().await;

    assert_eq!(
        result,
        Err(ControllerError::SessionUnavailable(SessionConfigState::ConfigurationFailed))
    );
    assert!(h
        .pending_events()
        .contains(&ControllerEvent::SessionFailed(SessionConfigState::ConfigurationFailed)));
    assert!(!h.probe.is_running());
}

#[tokio::test]
async fn test_rejected_video_input_aborts_configuration() {
    let h = Harness::with(|sim| {
        sim.rejected_inputs.insert("back-dual-wide".to_string());
    });
    h.controller.check_authorization();

    let snapshot = h.snapshot().await;
    assert_eq!(snapshot.config_state, SessionConfigState::ConfigurationFailed);
    assert!(h.probe.audio_inputs().is_empty(), "Audio must not be wired after a failed video input");
    assert!(!h.probe.has_movie_output());
    assert_eq!(h.probe.transactions(), 1, "Staged changes are still committed");
}

#[tokio::test]
async fn test_missing_audio_is_not_fatal() {
    let h = Harness::with(|sim| sim.audio_device = None);
    h.controller.check_authorization();

    let snapshot = h.snapshot().await;
    assert_eq!(snapshot.config_state, SessionConfigState::Success);
    assert!(!snapshot.has_audio_input);
    assert!(snapshot.has_movie_output);
}

#[tokio::test]
async fn test_rejected_audio_input_is_not_fatal() {
    let h = Harness::with(|sim| {
        sim.rejected_inputs.insert("built-in-microphone".to_string());
    });
    h.controller.check_authorization();

    let snapshot = h.snapshot().await;
    assert_eq!(snapshot.config_state, SessionConfigState::Success);
    assert!(!snapshot.has_audio_input);
}

#[tokio::test]
async fn test_configure_twice_binds_one_input() {
    let h = Harness::phone();
    h.controller.check_authorization();
    h.controller.configure_session();

    h.snapshot().await;
    assert_eq!(h.probe.video_inputs().len(), 1);
    assert_eq!(h.probe.transactions(), 1);
}

#[tokio::test]
async fn test_start_publishes_enablement_and_registers_observers() {
    let mut h = Harness::phone();
    h.controller.check_authorization();
    h.controller.start_session();
    let events = h.drain().await;

    assert!(h.probe.is_running());
    assert_eq!(h.probe.observer_count(), 1);
    assert_eq!(
        events,
        vec![
            ControllerEvent::CameraSwitchingEnabled(true),
            ControllerEvent::RecordingEnabled(true),
        ]
    );

    let snapshot = h.snapshot().await;
    assert!(snapshot.is_session_running);
    assert!(snapshot.observing);
    assert!(snapshot.ui.recording_enabled);
    assert!(snapshot.ui.camera_switching_enabled);

    h.controller.stop_session();
    let events = h.drain().await;
    assert_eq!(
        events,
        vec![
            ControllerEvent::CameraSwitchingEnabled(false),
            ControllerEvent::RecordingEnabled(false),
        ],
        "Stopping must disable the controls before observers are removed"
    );

    let snapshot = h.snapshot().await;
    assert!(!h.probe.is_running());
    assert_eq!(h.probe.observer_count(), 0, "Observers must be removed on stop");
    assert!(!snapshot.is_session_running);
    assert!(!snapshot.observing);
    assert!(!snapshot.ui.recording_enabled);
    assert!(!snapshot.ui.camera_switching_enabled);
}

#[tokio::test]
async fn test_restart_registers_single_observer() {
    let mut h = Harness::running(|_| {}).await;

    h.controller.stop_session();
    h.controller.start_session();
    h.drain().await;

    assert!(h.probe.is_running());
    assert_eq!(h.probe.observer_count(), 1);
}

#[tokio::test]
async fn test_single_position_disables_switching() {
    let mut h = Harness::with(|sim| {
        sim.devices = vec![
            CaptureDevice::new("back-wide", DeviceType::WideAngle, Position::Back),
            CaptureDevice::new("back-dual", DeviceType::Dual, Position::Back),
        ];
    });
    h.controller.check_authorization();
    h.controller.start_session();
    let events = h.drain().await;

    assert!(h.probe.is_running());
    assert_eq!(
        events,
        vec![
            ControllerEvent::CameraSwitchingEnabled(false),
            ControllerEvent::RecordingEnabled(true),
        ]
    );
}

#[tokio::test]
async fn test_missing_movie_output_disables_recording() {
    let mut h = Harness::with(|sim| sim.accepts_movie_output = false);
    h.controller.check_authorization();
    h.controller.start_session();
    let events = h.drain().await;

    let snapshot = h.snapshot().await;
    assert_eq!(snapshot.config_state, SessionConfigState::Success);
    assert!(!snapshot.has_movie_output);
    assert!(events.contains(&ControllerEvent::RecordingEnabled(false)));
}
