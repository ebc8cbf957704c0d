//! Event polling, dispatching, and UI rendering loop.
//!
//! Each pass draws (at most 60 times a second), routes terminal input,
//! folds stream fragments into actions, then applies every queued action
//! and spawns the background work they request.

use std::{
    error::Error,
    io,
    sync::Arc,
    time::{Duration, Instant},
};

use ratatui::crossterm::event::{self, Event, KeyEventKind};
use ratatui::prelude::Size;
use tokio::sync::mpsc;
use tracing::info;

use crate::core::app::{apply_actions, App, AppAction, AppActionDispatcher};
use crate::core::chat_stream::{ChatStreamService, StreamMessage};
use crate::core::generation::Generator;
use crate::ui::renderer::ui;
use crate::utils::line_editor::LineEditAction;

use super::executors::ExecutorContext;
use super::keybindings::{handle_key, KeyResult};
use super::lifecycle::{restore_terminal, setup_terminal, SharedTerminal};
use super::AppHandle;

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

async fn is_exit_requested(app: &AppHandle) -> bool {
    app.read(|app| app.ui.exit_requested).await
}

async fn current_terminal_size(terminal: &SharedTerminal) -> Size {
    let terminal_guard = terminal.lock().await;
    terminal_guard.size().unwrap_or_default()
}

async fn try_draw_frame(
    app: &AppHandle,
    terminal: &SharedTerminal,
    request_redraw: &mut bool,
    last_draw: &mut Instant,
    frame_duration: Duration,
) -> io::Result<()> {
    if !*request_redraw {
        return Ok(());
    }

    let now = Instant::now();
    if now.duration_since(*last_draw) < frame_duration {
        return Ok(());
    }

    let mut terminal_guard = terminal.lock().await;
    app.update(|app| terminal_guard.draw(|f| ui(f, app)).map(|_| ()))
        .await?;
    *last_draw = now;
    *request_redraw = false;
    Ok(())
}

struct EventProcessingOutcome {
    events_processed: bool,
    request_redraw: bool,
}

async fn process_ui_events(
    app: &AppHandle,
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
    dispatcher: &AppActionDispatcher,
) -> EventProcessingOutcome {
    let mut outcome = EventProcessingOutcome {
        events_processed: false,
        request_redraw: false,
    };

    while let Ok(ev) = event_rx.try_recv() {
        outcome.events_processed = true;
        match ev {
            UiEvent::Crossterm(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                match app.update(|app| handle_key(app, &key)).await {
                    KeyResult::Dispatch(action) => {
                        dispatcher.dispatch(action);
                        outcome.request_redraw = true;
                    }
                    KeyResult::Handled => outcome.request_redraw = true,
                    KeyResult::Ignored => {}
                }
            }
            UiEvent::Crossterm(Event::Paste(text)) => {
                let changed = app
                    .update(|app| app.ui.edit_input(LineEditAction::Paste(text)))
                    .await;
                outcome.request_redraw |= changed;
            }
            UiEvent::Crossterm(Event::Resize(_, _)) => {
                outcome.request_redraw = true;
            }
            UiEvent::Crossterm(_) => {}
        }
    }

    outcome
}

/// Turn queued stream messages into actions. Fragments that arrived in the
/// same pass are merged into one append.
fn process_stream_updates(
    dispatcher: &AppActionDispatcher,
    rx: &mut mpsc::UnboundedReceiver<(StreamMessage, u64)>,
    current_stream_id: Option<u64>,
) -> bool {
    let mut received_any = false;
    let mut coalesced_chunks = String::new();
    let mut followup_actions = Vec::new();

    while let Ok((message, msg_stream_id)) = rx.try_recv() {
        if Some(msg_stream_id) != current_stream_id {
            continue;
        }
        received_any = true;

        match message {
            StreamMessage::Chunk(content) => coalesced_chunks.push_str(&content),
            StreamMessage::Error(err) => followup_actions.push(AppAction::StreamErrored {
                message: err,
                stream_id: msg_stream_id,
            }),
            StreamMessage::End => followup_actions.push(AppAction::StreamCompleted {
                stream_id: msg_stream_id,
            }),
        }
    }

    if !received_any {
        return false;
    }

    if let Some(stream_id) = current_stream_id.filter(|_| !coalesced_chunks.is_empty()) {
        dispatcher.dispatch(AppAction::AppendResponseChunk {
            content: coalesced_chunks,
            stream_id,
        });
    }
    dispatcher.dispatch_many(followup_actions);
    true
}

async fn drain_action_queue(
    app: &AppHandle,
    executors: &ExecutorContext,
    action_rx: &mut mpsc::UnboundedReceiver<AppAction>,
) -> bool {
    let mut pending = Vec::new();
    while let Ok(action) = action_rx.try_recv() {
        pending.push(action);
    }

    if pending.is_empty() {
        return false;
    }

    let commands = app.update(|app| apply_actions(app, pending)).await;
    for command in commands {
        executors.run(command);
    }
    true
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

pub async fn run_chat(app: App, generator: Arc<dyn Generator>) -> Result<(), Box<dyn Error>> {
    let app = AppHandle::new(app);

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<AppAction>();
    let dispatcher = AppActionDispatcher::new(action_tx);
    let (stream_service, mut stream_rx) = ChatStreamService::new();
    let executors = ExecutorContext {
        dispatcher: dispatcher.clone(),
        generator,
        stream_service,
    };

    let terminal = setup_terminal()?;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx);

    const MAX_FPS: u64 = 60;
    let frame_duration = Duration::from_millis(1000 / MAX_FPS);
    let mut last_draw = Instant::now() - frame_duration;
    let mut request_redraw = true;

    let result: Result<(), Box<dyn Error>> = 'main_loop: loop {
        if is_exit_requested(&app).await {
            break 'main_loop Ok(());
        }

        if let Err(err) = try_draw_frame(
            &app,
            &terminal,
            &mut request_redraw,
            &mut last_draw,
            frame_duration,
        )
        .await
        {
            break 'main_loop Err(err.into());
        }

        let term_size = current_terminal_size(&terminal).await;
        app.update(|app| app.ui.last_term_size = term_size).await;

        let event_outcome = process_ui_events(&app, &mut event_rx, &dispatcher).await;
        request_redraw |= event_outcome.request_redraw;

        let current_stream_id = app
            .read(|app| app.chat.active_stream.as_ref().map(|s| s.stream_id))
            .await;
        let received_any = process_stream_updates(&dispatcher, &mut stream_rx, current_stream_id);
        request_redraw |= received_any;

        request_redraw |= drain_action_queue(&app, &executors, &mut action_rx).await;

        let (expired, animating) = app
            .update(|app| {
                (
                    app.ui.expire_notification(Instant::now()),
                    app.is_streaming() || app.chat.devotional_in_flight,
                )
            })
            .await;
        // The pulse indicator needs frames even without new input.
        request_redraw |= expired || animating;

        let idle = !event_outcome.events_processed && !received_any && !request_redraw;
        if idle || animating {
            tokio::time::sleep(Duration::from_millis(16)).await;
        }
    };

    event_reader_handle.abort();
    restore_terminal(&terminal).await?;
    info!("chat session closed");

    result
}
