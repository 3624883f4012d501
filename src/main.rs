mod app;
mod audio;
mod config;
mod constants;
mod counter;
mod deck;
mod error;
mod input;
mod library;
mod messages;
mod plan;
mod ui;
mod wizard;

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use crossbeam_channel::{bounded, Receiver, Sender};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use crate::app::{AppState, RecordPhase, Screen};
use crate::audio::engine::PlaybackEngine;
use crate::audio::normalize;
use crate::audio::preview::PreviewPlayer;
use crate::audio::wav::read_stereo_f32;
use crate::config::{CliArgs, DeckConfig};
use crate::constants::{CHANNEL_CAPACITY, UI_FPS};
use crate::counter::CounterError;
use crate::error::{DeckError, Result};
use crate::messages::{AudioCmd, AudioMsg, NormalizeMsg, UiEvent};
use crate::ui::views::browser_view::BrowserView;
use crate::ui::views::normalize_view::NormalizeView;
use crate::ui::views::recording_view::RecordingView;
use crate::ui::views::summary_view::SummaryView;
use crate::ui::views::View;
use crate::ui::widgets::header::HeaderWidget;
use crate::ui::widgets::keyboard_hint::KeyboardHintWidget;

fn main() {
    if let Err(e) = run() {
        eprintln!("deckrec: {e}");
        if matches!(e, DeckError::Counter(CounterError::StoreNotFound { .. })) {
            eprintln!("run with --calibrate-counter to create a calibration file");
        }
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    if args.init_profiles {
        let dir = PathBuf::from("./deck_profiles");
        let written = deck::write_sample_profiles(&dir)?;
        for path in &written {
            println!("wrote {}", path.display());
        }
        if written.is_empty() {
            println!("sample profiles already present in {}", dir.display());
        }
        return Ok(());
    }

    let config = DeckConfig::from_args(&args)?;
    for warning in config.warnings() {
        tracing::warn!("{warning}");
    }

    if args.calibrate_counter {
        return wizard::run(&config);
    }

    library::check_tools(&config)?;
    let (session, calibration) = config.build_counter()?;
    let library = library::scan_folder(&config)?;

    let state = AppState::new(config, session, calibration, library);
    run_ui(state)
}

fn run_ui(mut state: AppState) -> Result<()> {
    let (audio_cmd_tx, audio_cmd_rx) = bounded::<AudioCmd>(CHANNEL_CAPACITY);
    let (audio_msg_tx, audio_msg_rx) = bounded::<AudioMsg>(CHANNEL_CAPACITY);
    let (norm_tx, norm_rx) = bounded::<NormalizeMsg>(CHANNEL_CAPACITY);

    // The stream must stay alive for playback; without a device, recording
    // still runs as a silent timer against the plan.
    let _stream = match PlaybackEngine::start(audio_cmd_rx, audio_msg_tx) {
        Ok(stream) => {
            state.audio_ready = true;
            Some(stream)
        }
        Err(e) => {
            tracing::warn!(error = %e, "audio output unavailable, monitoring is silent");
            None
        }
    };

    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = event_loop(
        &mut terminal,
        &mut state,
        &audio_cmd_tx,
        &audio_msg_rx,
        &norm_tx,
        &norm_rx,
    );

    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
    audio_cmd_tx: &Sender<AudioCmd>,
    audio_msg_rx: &Receiver<AudioMsg>,
    norm_tx: &Sender<NormalizeMsg>,
    norm_rx: &Receiver<NormalizeMsg>,
) -> Result<()> {
    let frame_duration = Duration::from_millis(1000 / UI_FPS);
    let mut preview = PreviewPlayer::new(state.config.tool("ffplay"));

    loop {
        let frame_start = Instant::now();

        while let Ok(msg) = audio_msg_rx.try_recv() {
            match msg {
                AudioMsg::Position(seconds) => state.track_pos = seconds,
                AudioMsg::Levels(l, r) => state.levels = (l, r),
                AudioMsg::Peaks(l, r) => state.peaks = (l, r),
                AudioMsg::Finished => {
                    if state.screen == Screen::Recording {
                        state.on_track_finished();
                    }
                }
            }
        }

        while let Ok(msg) = norm_rx.try_recv() {
            match msg {
                NormalizeMsg::Started { index, name } => {
                    state.status = format!("normalizing {name}");
                    state.note_norm_started(index);
                }
                NormalizeMsg::Done { index, track } => state.note_norm_done(index, *track),
                NormalizeMsg::Failed { index, name, error } => {
                    tracing::warn!(track = %name, error = %error, "normalization failed");
                    state.note_norm_failed(index, error);
                }
                NormalizeMsg::Finished => {
                    state.status.clear();
                    state.finish_normalizing();
                }
            }
        }

        // ffplay exits on its own at the end of a preview.
        if state.status.starts_with("previewing") && !preview.is_playing() {
            state.status.clear();
        }

        drive_recording(state, audio_cmd_tx);

        if event::poll(Duration::from_millis(1))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(evt) = input::handle_key(key, state.screen, state.recording_done())
                    {
                        handle_ui_event(state, evt, audio_cmd_tx, norm_tx, &mut preview);
                    }
                }
            }
        }

        if state.should_quit {
            break;
        }

        state.frame += 1;
        terminal.draw(|frame| {
            let area = frame.area();
            let layout = ui::layout::ScreenLayout::new(area);

            frame.render_widget(
                HeaderWidget {
                    screen: state.screen,
                    deck_model: state
                        .config
                        .deck_model
                        .clone()
                        .unwrap_or_else(|| "generic deck".to_string()),
                    tape_label: state.config.tape_type.label(),
                    side_minutes: state.config.duration_minutes(),
                },
                layout.header,
            );

            match state.screen {
                Screen::Browser => BrowserView.render(state, frame, layout.main),
                Screen::Normalizing => NormalizeView.render(state, frame, layout.main),
                Screen::Summary => SummaryView.render(state, frame, layout.main),
                Screen::Recording => RecordingView.render(state, frame, layout.main),
            }

            let hints = input::key_hints(state.screen, state.recording_done());
            frame.render_widget(
                KeyboardHintWidget {
                    hints,
                    status: state.status.clone(),
                },
                layout.footer,
            );
        })?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_duration {
            std::thread::sleep(frame_duration - elapsed);
        }
    }

    Ok(())
}

/// Moves the session along the tape: leader into the first track, gaps
/// into the next one. Without audio the clock stands in for playback.
fn drive_recording(state: &mut AppState, audio_cmd_tx: &Sender<AudioCmd>) {
    if state.screen != Screen::Recording {
        return;
    }
    match state.phase {
        RecordPhase::Leader => {
            if state.session_elapsed() >= state.config.leader_gap {
                start_track(state, 0, audio_cmd_tx);
            }
        }
        RecordPhase::Gap { until } => {
            if state.session_elapsed() >= until {
                let next = state.track_index + 1;
                start_track(state, next, audio_cmd_tx);
            }
        }
        RecordPhase::Playing if !state.audio_ready => {
            let start = state
                .plan
                .as_ref()
                .and_then(|p| p.tracks.get(state.track_index))
                .map(|t| t.start)
                .unwrap_or(0.0);
            state.track_pos = (state.session_elapsed() - start).max(0.0);
            if let Some(track) = state.current_track() {
                if state.track_pos >= track.duration {
                    state.on_track_finished();
                }
            }
        }
        _ => {}
    }
}

fn start_track(state: &mut AppState, index: usize, audio_cmd_tx: &Sender<AudioCmd>) {
    let Some(track) = state.tape_tracks.get(index) else {
        state.phase = RecordPhase::Done;
        return;
    };
    if !state.audio_ready {
        state.track_index = index;
        state.track_pos = 0.0;
        state.phase = RecordPhase::Playing;
        return;
    }
    match read_stereo_f32(&track.path) {
        Ok(samples) => {
            state.track_index = index;
            state.track_pos = 0.0;
            state.phase = RecordPhase::Playing;
            let _ = audio_cmd_tx.try_send(AudioCmd::Play(samples));
        }
        Err(e) => {
            tracing::error!(track = %track.name, error = %e, "could not load rendered track");
            state.status = format!("skipped {}: {e}", track.name);
            state.track_index = index;
            state.on_track_finished();
        }
    }
}

fn handle_ui_event(
    state: &mut AppState,
    event: UiEvent,
    audio_cmd_tx: &Sender<AudioCmd>,
    norm_tx: &Sender<NormalizeMsg>,
    preview: &mut PreviewPlayer,
) {
    match event {
        UiEvent::Quit => {
            preview.stop();
            let _ = audio_cmd_tx.try_send(AudioCmd::Stop);
            state.should_quit = true;
        }
        UiEvent::CursorUp => state.cursor_up(),
        UiEvent::CursorDown => state.cursor_down(),
        UiEvent::ToggleSelect => state.toggle_selected(),
        UiEvent::SelectAll => state.select_all(),
        UiEvent::ClearSelection => state.clear_selection(),
        UiEvent::Preview => {
            if let Some(track) = state.library.get(state.cursor) {
                match preview.play(&track.path) {
                    Ok(()) => state.status = format!("previewing {}", track.name),
                    Err(e) => state.status = e.to_string(),
                }
            }
        }
        UiEvent::StopPreview => {
            preview.stop();
            state.status.clear();
        }
        UiEvent::BeginRecording => {
            if state.selected_count() == 0 {
                state.status = "select tracks with Space first".to_string();
                return;
            }
            preview.stop();
            let queue = state.begin_normalizing();
            normalize::spawn_worker(&state.config, queue, norm_tx.clone());
        }
        UiEvent::Confirm => {
            let Some(plan) = &state.plan else {
                return;
            };
            match deck::write_tracklist(&state.config, plan, &state.session, state.calibration.as_ref())
            {
                Ok(path) => {
                    tracing::info!(path = %path.display(), "tracklist written");
                    state.status = format!("tracklist: {}", path.display());
                    state.tracklist_path = Some(path);
                    state.start_recording();
                }
                Err(e) => state.status = format!("tracklist failed: {e}"),
            }
        }
        UiEvent::Back => match state.screen {
            Screen::Summary => state.screen = Screen::Browser,
            Screen::Recording => {
                let _ = audio_cmd_tx.try_send(AudioCmd::Stop);
                if state.recording_done() {
                    state.finish_side();
                } else {
                    state.abort_recording();
                }
            }
            _ => {}
        },
    }
}
