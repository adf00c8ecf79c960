//! End-to-end session tests against the in-memory platform providers

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use gridle::models::LayerCreateRequest;
use gridle::platform::{
    Bounds, DesktopWindow, Frame, InMemoryDisplayProvider, InMemoryWindowProvider, MonitorInfo,
    WindowProvider,
};
use gridle::services::{SessionConfig, TilerSession};

fn window(window_id: u32, title: &str, minimized: bool) -> DesktopWindow {
    DesktopWindow::new(
        window_id,
        title,
        Frame {
            x: 5,
            y: 5,
            width: 1024,
            height: 768,
        },
        minimized,
    )
}

fn build_session(
    windows: Vec<DesktopWindow>,
) -> (TilerSession, Arc<InMemoryWindowProvider>) {
    let displays = Arc::new(InMemoryDisplayProvider::new_with(vec![MonitorInfo::primary(
        "DP-1",
        Bounds::new(0, 0, 1920, 1080).unwrap(),
    )]));
    let provider = Arc::new(InMemoryWindowProvider::new_with(windows));
    let session = TilerSession::new(
        displays,
        provider.clone(),
        SessionConfig {
            activation_pause: Duration::ZERO,
        },
    );
    (session, provider)
}

#[tokio::test]
async fn detect_sort_status_round_trip() {
    let (session, provider) = build_session(vec![
        window(1, "Notepad - notes.txt", false),
        window(2, "Notepad - todo.txt", true),
        window(3, "Firefox", false),
    ]);

    let detect = session.detect().await.unwrap();
    assert_eq!(detect.monitors, 1);
    assert_eq!(detect.titles, 3);

    let report = session.sort(0, "notepad").await.unwrap();
    assert_eq!(report.matched, 2);
    assert_eq!(report.placed, 2);

    // The minimized match was restored and placed like any other
    let restored = provider.get_window(2).unwrap().unwrap();
    assert!(!restored.is_minimized);
    assert_eq!((restored.frame.x, restored.frame.y), (960, 0));

    // Two windows split the monitor into halves
    let first = provider.get_window(1).unwrap().unwrap().frame;
    assert_eq!((first.x, first.y, first.width, first.height), (0, 0, 959, 1079));

    let status = session.status().await;
    assert_eq!(status.monitors, 1);
    assert_eq!(status.titles, 3);
    assert_eq!(status.matched_windows, 2);
    assert_eq!(status.layers, 0);
}

#[tokio::test]
async fn six_windows_fill_a_two_by_three_grid() {
    let windows = (1..=6)
        .map(|id| window(id, &format!("Shell {id}"), false))
        .collect();
    let (session, provider) = build_session(windows);
    session.detect().await.unwrap();

    let report = session.sort(0, "shell").await.unwrap();
    assert_eq!(report.placed, 6);

    let origins: Vec<_> = (1..=6)
        .map(|id| {
            let frame = provider.get_window(id).unwrap().unwrap().frame;
            (frame.x, frame.y)
        })
        .collect();
    assert_eq!(
        origins,
        vec![(0, 0), (640, 0), (1280, 0), (0, 540), (640, 540), (1280, 540)]
    );
}

#[tokio::test]
async fn sort_without_matches_is_not_an_error() {
    let (session, _) = build_session(vec![window(1, "Firefox", false)]);
    session.detect().await.unwrap();

    let report = session.sort(0, "xyz-nonexistent").await.unwrap();
    assert!(report.nothing_to_do());
    assert_eq!(report.placed, 0);
}

#[tokio::test]
async fn sorting_before_detect_is_a_precondition_error() {
    let (session, _) = build_session(vec![window(1, "Firefox", false)]);
    assert!(session.sort(0, "firefox").await.is_err());
}

#[tokio::test]
async fn layer_flow_defines_applies_and_removes() {
    let (session, provider) = build_session(vec![
        window(1, "Emacs - main.rs", false),
        window(2, "Alacritty", false),
        window(3, "Firefox", false),
    ]);
    session.detect().await.unwrap();

    let id = session
        .add_layer(LayerCreateRequest {
            display_name: "Coding".to_string(),
            rows: 2,
            cols: 2,
            monitor_index: 0,
            tile_assignments: BTreeMap::from([
                (0, "emacs".to_string()),
                (1, "alacritty".to_string()),
                (2, "firefox".to_string()),
            ]),
        })
        .await
        .unwrap();

    assert_eq!(session.list_layers().await.len(), 1);

    let report = session.apply_layer(id).await.unwrap();
    assert_eq!(report.matched, 3);
    assert_eq!(report.placed, 3);
    assert_eq!(report.unmatched_tiles, 0);

    let emacs = provider.get_window(1).unwrap().unwrap().frame;
    let shell = provider.get_window(2).unwrap().unwrap().frame;
    let browser = provider.get_window(3).unwrap().unwrap().frame;
    assert_eq!((emacs.x, emacs.y), (0, 0));
    assert_eq!((shell.x, shell.y), (960, 0));
    assert_eq!((browser.x, browser.y), (0, 540));

    session.remove_layer(id).await.unwrap();
    assert!(session.list_layers().await.is_empty());
    assert!(session.apply_layer(id).await.is_err());
}

#[tokio::test]
async fn per_window_failures_leave_the_rest_of_the_batch_intact() {
    let (session, provider) = build_session(vec![
        window(1, "Shell a", false),
        window(2, "Shell b", false),
        window(3, "Shell c", false),
        window(4, "Shell d", false),
    ]);
    provider.set_failing(1);
    session.detect().await.unwrap();

    let report = session.sort(0, "shell").await.unwrap();
    assert_eq!(report.matched, 4);
    assert_eq!(report.placed, 3);
    assert_eq!(report.failures.len(), 1);

    // Quadrant split still landed for the survivors
    assert_eq!(provider.get_window(2).unwrap().unwrap().frame.x, 960);
    assert_eq!(
        (
            provider.get_window(4).unwrap().unwrap().frame.x,
            provider.get_window(4).unwrap().unwrap().frame.y
        ),
        (960, 540)
    );
}
