use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use session_core::{
    AvatarRef, EndCause, ParticipantRow, ScriptAction, ScriptStep, ScriptedSurface,
    SessionConfig, SessionController, SessionState,
};

fn step(at_ms: u64, action: ScriptAction) -> ScriptStep {
    ScriptStep { at_ms, action }
}

fn initials(text: &str) -> AvatarRef {
    AvatarRef::Initials {
        text: text.to_string(),
    }
}

fn roster(rows: &[(&str, AvatarRef)]) -> ScriptAction {
    ScriptAction::Roster {
        rows: rows
            .iter()
            .map(|(name, avatar)| ParticipantRow {
                display_name: Some(name.to_string()),
                avatar: Some(avatar.clone()),
            })
            .collect(),
    }
}

fn caption(region: u64, element: u64, icon: AvatarRef, text: &str) -> ScriptAction {
    ScriptAction::Caption {
        region,
        element,
        icon: Some(icon),
        region_icon: None,
        text: text.to_string(),
    }
}

fn config(dir: &tempfile::TempDir) -> SessionConfig {
    SessionConfig::new("test-session", dir.path().join("test-session.jsonl"))
        .with_join_deadline(Duration::from_secs(2))
        .with_waiting_room_deadline(Duration::from_millis(400))
        .with_poll_interval(Duration::from_millis(25))
        .with_toast_timeout(Duration::from_millis(50))
}

async fn run_script(
    dir: &tempfile::TempDir,
    steps: Vec<ScriptStep>,
) -> (session_core::SessionReport, ScriptedSurface) {
    let surface = ScriptedSurface::new();
    surface.play(steps);

    let controller = SessionController::new(config(dir), Arc::new(surface.clone()));
    let report = controller.run(CancellationToken::new()).await;
    (report, surface)
}

#[tokio::test]
async fn join_preparation_runs_before_the_admission_race() {
    let dir = tempfile::tempdir().unwrap();
    let surface = ScriptedSurface::new();
    surface.play(vec![
        step(50, ScriptAction::Admit),
        step(300, ScriptAction::EndMeeting),
    ]);

    let target = "https://zoom.us/wc/join/123456789?prefer=1&browser=1";
    let config = config(&dir)
        .with_meeting_url(target)
        .with_display_name("Scribe");
    let controller = SessionController::new(config, Arc::new(surface.clone()));
    let report = controller.run(CancellationToken::new()).await;

    assert_eq!(report.cause, EndCause::MeetingEnded);
    assert_eq!(surface.joined_url().as_deref(), Some(target));
    assert_eq!(surface.display_name().as_deref(), Some("Scribe"));
    assert!(surface.is_muted());
    assert!(surface.is_video_stopped());
}

#[tokio::test]
async fn direct_admission_skips_the_waiting_room() {
    let dir = tempfile::tempdir().unwrap();
    let (report, surface) = run_script(
        &dir,
        vec![
            step(0, ScriptAction::Admit),
            step(300, ScriptAction::EndMeeting),
        ],
    )
    .await;

    assert_eq!(report.state, SessionState::Ended);
    assert_eq!(report.cause, EndCause::MeetingEnded);
    assert!(report.visited(SessionState::InCall));
    assert!(!report.visited(SessionState::WaitingRoom));
    assert!(surface.is_closed());
}

#[tokio::test]
async fn waiting_room_then_admission() {
    let dir = tempfile::tempdir().unwrap();
    let (report, _) = run_script(
        &dir,
        vec![
            step(0, ScriptAction::WaitingRoom),
            step(100, ScriptAction::Admit),
            step(400, ScriptAction::EndMeeting),
        ],
    )
    .await;

    assert_eq!(report.state, SessionState::Ended);
    assert_eq!(report.cause, EndCause::MeetingEnded);
    assert!(report.visited(SessionState::WaitingRoom));
    assert!(report.visited(SessionState::InCall));
}

#[tokio::test]
async fn admission_deadline_ends_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let (report, surface) = run_script(&dir, vec![step(0, ScriptAction::WaitingRoom)]).await;

    assert_eq!(report.state, SessionState::Ended);
    assert_eq!(report.cause, EndCause::AdmissionTimeout);
    assert!(!report.visited(SessionState::InCall));
    assert!(surface.is_closed());
}

#[tokio::test]
async fn no_indicator_at_all_is_a_fault() {
    let dir = tempfile::tempdir().unwrap();
    let (report, surface) = run_script(&dir, vec![]).await;

    assert_eq!(report.state, SessionState::Joining);
    assert!(matches!(report.cause, EndCause::Fault(_)));
    assert!(surface.is_closed());
}

#[tokio::test]
async fn cancellation_ends_an_open_call() {
    let dir = tempfile::tempdir().unwrap();
    let surface = ScriptedSurface::new();
    surface.play(vec![step(0, ScriptAction::Admit)]);

    let cancel = CancellationToken::new();
    let controller = SessionController::new(config(&dir), Arc::new(surface.clone()));

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        canceller.cancel();
    });

    let report = controller.run(cancel).await;
    assert_eq!(report.state, SessionState::Ended);
    assert_eq!(report.cause, EndCause::Shutdown);
    assert!(surface.is_closed());
}

#[tokio::test]
async fn rerendered_captions_become_deduplicated_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let ada = initials("AL");

    let (report, _) = run_script(
        &dir,
        vec![
            step(0, ScriptAction::Admit),
            step(20, ScriptAction::CaptionConfirmation),
            step(50, roster(&[("Ada Lovelace", ada.clone())])),
            // the caption-enable sequence takes ~300ms of settle time;
            // keep each re-render on its own scan after that
            step(450, caption(1, 1, ada.clone(), "the")),
            step(550, caption(1, 1, ada.clone(), "the quick")),
            step(650, caption(1, 1, ada.clone(), "the quick brown fox")),
            // re-render shifts the window but repeats the tail
            step(750, caption(1, 1, ada.clone(), "quick brown fox jumps over")),
            step(1100, ScriptAction::EndMeeting),
        ],
    )
    .await;

    assert_eq!(report.cause, EndCause::MeetingEnded);

    let chunks = huddle_transcript::read_chunks(dir.path().join("test-session.jsonl"))
        .await
        .unwrap();

    assert!(chunks.iter().all(|c| c.speaker == "Ada Lovelace"));
    assert!(!chunks.is_empty());

    let joined = chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    assert_eq!(joined, "the quick brown fox jumps over");

    let times: Vec<f64> = chunks.iter().map(|c| c.time).collect();
    assert!(times.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn unchanged_rerenders_emit_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let ada = initials("AL");

    run_script(
        &dir,
        vec![
            step(0, ScriptAction::Admit),
            step(50, roster(&[("Ada", ada.clone())])),
            step(100, caption(1, 1, ada.clone(), "hello there")),
            step(200, caption(1, 1, ada.clone(), "hello there")),
            step(300, caption(1, 1, ada.clone(), "hello there")),
            step(600, ScriptAction::EndMeeting),
        ],
    )
    .await;

    let chunks = huddle_transcript::read_chunks(dir.path().join("test-session.jsonl"))
        .await
        .unwrap();

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, "hello there");
}

#[tokio::test]
async fn concurrent_speakers_are_attributed_separately() {
    let dir = tempfile::tempdir().unwrap();
    let ada = initials("AL");
    let grace = AvatarRef::Image {
        src: "https://cdn.example.com/grace.png".to_string(),
    };

    let (_, _) = run_script(
        &dir,
        vec![
            step(0, ScriptAction::Admit),
            step(
                50,
                roster(&[("Ada Lovelace", ada.clone()), ("Grace Hopper", grace.clone())]),
            ),
            step(100, caption(1, 1, ada.clone(), "one plus one")),
            step(150, caption(2, 10, grace.clone(), "nanoseconds matter")),
            step(250, caption(1, 1, ada.clone(), "one plus one is two")),
            step(600, ScriptAction::EndMeeting),
        ],
    )
    .await;

    let chunks = huddle_transcript::read_chunks(dir.path().join("test-session.jsonl"))
        .await
        .unwrap();

    let ada_text = chunks
        .iter()
        .filter(|c| c.speaker == "Ada Lovelace")
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    assert_eq!(ada_text, "one plus one is two");

    let grace_text = chunks
        .iter()
        .filter(|c| c.speaker == "Grace Hopper")
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    assert_eq!(grace_text, "nanoseconds matter");
}

#[tokio::test]
async fn unmapped_speaker_falls_back_to_raw_key() {
    let dir = tempfile::tempdir().unwrap();

    // No roster ever renders; the initials key itself is the attribution.
    run_script(
        &dir,
        vec![
            step(0, ScriptAction::Admit),
            step(100, caption(1, 1, initials("ZZ"), "who am i")),
            step(500, ScriptAction::EndMeeting),
        ],
    )
    .await;

    let chunks = huddle_transcript::read_chunks(dir.path().join("test-session.jsonl"))
        .await
        .unwrap();

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].speaker, "ZZ");
}

#[tokio::test]
async fn region_appearing_late_is_still_attached() {
    let dir = tempfile::tempdir().unwrap();
    let ada = initials("AL");

    // The first caption renders well after the watcher started with an
    // empty document.
    run_script(
        &dir,
        vec![
            step(0, ScriptAction::Admit),
            step(50, roster(&[("Ada", ada.clone())])),
            step(400, caption(7, 70, ada.clone(), "late arrival")),
            step(800, ScriptAction::EndMeeting),
        ],
    )
    .await;

    let chunks = huddle_transcript::read_chunks(dir.path().join("test-session.jsonl"))
        .await
        .unwrap();

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, "late arrival");
    assert_eq!(chunks[0].speaker, "Ada");
}

#[tokio::test]
async fn caption_toggle_falls_back_to_settings_without_toast() {
    let dir = tempfile::tempdir().unwrap();

    // No CaptionConfirmation in the script: the controller should save the
    // settings dialog instead, and still toggle twice.
    let (_, surface) = run_script(
        &dir,
        vec![
            step(0, ScriptAction::Admit),
            step(900, ScriptAction::EndMeeting),
        ],
    )
    .await;

    assert_eq!(surface.caption_toggle_count(), 2);
    assert!(surface.settings_saved());
}

#[tokio::test]
async fn toast_skips_the_settings_fallback() {
    let dir = tempfile::tempdir().unwrap();

    let (_, surface) = run_script(
        &dir,
        vec![
            step(0, ScriptAction::Admit),
            step(20, ScriptAction::CaptionConfirmation),
            step(900, ScriptAction::EndMeeting),
        ],
    )
    .await;

    assert!(!surface.settings_saved());
}
