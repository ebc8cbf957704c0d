use super::*;
use crate::core::app::NotificationKind;
use tempfile::TempDir;

fn test_app() -> (TempDir, App) {
    let dir = TempDir::new().expect("tempdir");
    let app = App::new_test_app(dir.path());
    (dir, app)
}

fn last_notification(app: &App) -> (NotificationKind, String) {
    let notification = app.ui.notification.as_ref().expect("notification");
    (notification.kind, notification.message.clone())
}

#[test]
fn plain_text_is_processed_as_message() {
    let (_dir, mut app) = test_app();
    match process_input(&mut app, "What does John 3:16 say?") {
        CommandResult::ProcessAsMessage(text) => assert_eq!(text, "What does John 3:16 say?"),
        _ => panic!("expected message"),
    }
}

#[test]
fn bare_slash_is_treated_as_text() {
    let (_dir, mut app) = test_app();
    assert!(matches!(
        process_input(&mut app, "/ not a command"),
        CommandResult::ProcessAsMessage(_)
    ));
}

#[test]
fn unknown_command_reports_error() {
    let (_dir, mut app) = test_app();
    assert!(matches!(
        process_input(&mut app, "/bogus"),
        CommandResult::Continue
    ));
    let (kind, message) = last_notification(&app);
    assert_eq!(kind, NotificationKind::Error);
    assert!(message.contains("/bogus"));
}

#[test]
fn help_opens_popup() {
    let (_dir, mut app) = test_app();
    assert!(matches!(process_input(&mut app, "/HELP"), CommandResult::Continue));
    assert!(app.ui.show_help);
}

#[test]
fn select_takes_one_based_positions() {
    let (_dir, mut app) = test_app();
    match process_input(&mut app, "/select 2") {
        CommandResult::Action(AppAction::SelectSession { index }) => assert_eq!(index, 1),
        _ => panic!("expected select action"),
    }

    assert!(matches!(
        process_input(&mut app, "/select 0"),
        CommandResult::Continue
    ));
    assert_eq!(last_notification(&app).1, "Usage: /select <n>");
}

#[test]
fn delete_without_argument_targets_active_chat() {
    let (_dir, mut app) = test_app();
    assert!(matches!(
        process_input(&mut app, "/delete"),
        CommandResult::Action(AppAction::RequestDeleteSession { index: None })
    ));
    assert!(matches!(
        process_input(&mut app, "/delete 3"),
        CommandResult::Action(AppAction::RequestDeleteSession { index: Some(2) })
    ));
}

#[test]
fn save_passes_note_through() {
    let (_dir, mut app) = test_app();
    match process_input(&mut app, "/save  for Sunday school ") {
        CommandResult::Action(AppAction::SaveReply { note, reply }) => {
            assert_eq!(note, "for Sunday school");
            assert_eq!(reply, None);
        }
        _ => panic!("expected save action"),
    }
}

#[test]
fn save_accepts_a_reply_number() {
    let (_dir, mut app) = test_app();
    match process_input(&mut app, "/save #2 memory verse") {
        CommandResult::Action(AppAction::SaveReply { note, reply }) => {
            assert_eq!(note, "memory verse");
            assert_eq!(reply, Some(1));
        }
        _ => panic!("expected save action"),
    }
    match process_input(&mut app, "/save 2 Timothy 3:16") {
        CommandResult::Action(AppAction::SaveReply { note, reply }) => {
            assert_eq!(note, "2 Timothy 3:16");
            assert_eq!(reply, None);
        }
        _ => panic!("expected save action"),
    }

    assert!(matches!(
        process_input(&mut app, "/save #0"),
        CommandResult::Continue
    ));
    assert_eq!(last_notification(&app).1, "Usage: /save [#n] [note]");
}

#[test]
fn ask_sends_a_starter_question() {
    let (_dir, mut app) = test_app();
    match process_input(&mut app, "/ask 3") {
        CommandResult::ProcessAsMessage(text) => assert_eq!(text, STARTER_QUESTIONS[2]),
        _ => panic!("expected starter question"),
    }

    let past_end = format!("/ask {}", STARTER_QUESTIONS.len() + 1);
    assert!(matches!(
        process_input(&mut app, &past_end),
        CommandResult::Continue
    ));
    assert_eq!(
        last_notification(&app).1,
        format!("Usage: /ask <1-{}>", STARTER_QUESTIONS.len())
    );
}

#[test]
fn study_subcommands_map_to_actions() {
    let (_dir, mut app) = test_app();
    assert!(matches!(
        process_input(&mut app, "/study"),
        CommandResult::Action(AppAction::SwitchView { view: View::Study })
    ));
    assert!(matches!(
        process_input(&mut app, "/study open 1"),
        CommandResult::Action(AppAction::OpenStudySession { index: 0 })
    ));
    assert!(matches!(
        process_input(&mut app, "/study delete 4"),
        CommandResult::Action(AppAction::RequestDeleteStudyItem { index: 3 })
    ));
    assert!(matches!(
        process_input(&mut app, "/study delete"),
        CommandResult::Continue
    ));
}

#[test]
fn devotional_subcommands_map_to_actions() {
    let (_dir, mut app) = test_app();
    assert!(matches!(
        process_input(&mut app, "/devotional new"),
        CommandResult::Action(AppAction::RequestDevotional)
    ));
    assert!(matches!(
        process_input(&mut app, "/devotional delete 2"),
        CommandResult::Action(AppAction::RequestDeleteDevotional { index: 1 })
    ));
}

#[test]
fn version_without_argument_shows_current() {
    let (_dir, mut app) = test_app();
    assert!(matches!(
        process_input(&mut app, "/version"),
        CommandResult::Continue
    ));
    let (kind, message) = last_notification(&app);
    assert_eq!(kind, NotificationKind::Info);
    assert!(message.starts_with("Version: NIV"));
    assert!(message.contains("NKJV"));
}

#[test]
fn matching_commands_filters_by_prefix() {
    let names: Vec<&str> = matching_commands("de").map(|c| c.name).collect();
    assert_eq!(names, vec!["delete", "devotional"]);
    assert_eq!(matching_commands("").count(), all_commands().len());
}
