use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use fiddy_core::forms::{Mood, PreferenceForm};
use fiddy_core::{ModuleKind, QuickAction};

use crate::app::{App, InputMode, PlanModule, Screen};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if key.code == KeyCode::Esc && app.input_mode == InputMode::Normal && app.screen != Screen::Home {
        app.leave_module();
        return;
    }

    match (app.input_mode, app.screen) {
        (InputMode::Editing, Screen::Companion) => handle_chat_editing(app, key),
        (_, Screen::Home) => handle_home(app, key),
        (_, Screen::Nutrition) => {
            if handle_plan_keys(&mut app.nutrition, key) {
                app.submit_current();
            }
        }
        (_, Screen::Workout) => {
            if handle_plan_keys(&mut app.workout, key) {
                app.submit_current();
            }
        }
        (_, Screen::Companion) => handle_chat_normal(app, key),
    }
}

fn handle_home(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.home_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.home_nav_up(),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => app.open_selected_module(),
        KeyCode::Char(c @ '1'..='3') => {
            let idx = c as usize - '1' as usize;
            if idx < ModuleKind::all().len() {
                app.home_state.select(Some(idx));
                app.open_selected_module();
            }
        }
        _ => {}
    }
}

/// Form navigation shared by both plan screens. Returns true when the
/// user asked to generate.
fn handle_plan_keys<F: PreferenceForm>(module: &mut PlanModule<F>, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => module.field_down(),
        KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => module.field_up(),
        KeyCode::Char('l') | KeyCode::Right => module.option_next(),
        KeyCode::Char('h') | KeyCode::Left => module.option_prev(),
        KeyCode::Char(' ') => module.choose(),
        KeyCode::Enter => {
            if module.on_generate_button() {
                return true;
            }
            module.choose();
        }
        KeyCode::Char('g') => return true,
        KeyCode::Char('J') | KeyCode::PageDown => {
            module.plan_scroll = module.plan_scroll.saturating_add(5);
        }
        KeyCode::Char('K') | KeyCode::PageUp => {
            module.plan_scroll = module.plan_scroll.saturating_sub(5);
        }
        _ => {}
    }
    false
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') | KeyCode::Enter => app.input_mode = InputMode::Editing,
        KeyCode::Char('l') | KeyCode::Right => {
            app.chat.mood_cursor = (app.chat.mood_cursor + 1) % Mood::ALL.len();
        }
        KeyCode::Char('h') | KeyCode::Left => {
            let len = Mood::ALL.len();
            app.chat.mood_cursor = (app.chat.mood_cursor + len - 1) % len;
        }
        KeyCode::Char(' ') => app.chat.pick_mood(),
        KeyCode::Char('s') => app.submit_current(),
        KeyCode::Char(c @ '1'..='4') => {
            let idx = c as usize - '1' as usize;
            if let Some(action) = QuickAction::all().get(idx).copied() {
                app.quick_action(action);
            }
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.chat.scroll = app.chat.scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.chat.scroll = app.chat.scroll.saturating_sub(1);
        }
        KeyCode::PageDown => app.chat.scroll = app.chat.scroll.saturating_add(10),
        KeyCode::PageUp => app.chat.scroll = app.chat.scroll.saturating_sub(10),
        _ => {}
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            return;
        }
        KeyCode::Enter => {
            app.submit_current();
            return;
        }
        _ => {}
    }

    let chat = &mut app.chat;
    match key.code {
        KeyCode::Backspace => {
            if chat.cursor > 0 {
                chat.cursor -= 1;
                let draft = chat.session.draft_mut();
                let byte_pos = char_to_byte_index(draft, chat.cursor);
                draft.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let draft = chat.session.draft_mut();
            if chat.cursor < draft.chars().count() {
                let byte_pos = char_to_byte_index(draft, chat.cursor);
                draft.remove(byte_pos);
            }
        }
        KeyCode::Left => chat.cursor = chat.cursor.saturating_sub(1),
        KeyCode::Right => {
            let char_count = chat.session.draft().chars().count();
            chat.cursor = (chat.cursor + 1).min(char_count);
        }
        KeyCode::Home => chat.cursor = 0,
        KeyCode::End => chat.cursor = chat.session.draft().chars().count(),
        KeyCode::Char(c) => {
            let draft = chat.session.draft_mut();
            let byte_pos = char_to_byte_index(draft, chat.cursor);
            draft.insert(byte_pos, c);
            chat.cursor += 1;
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let down = match mouse.kind {
        MouseEventKind::ScrollDown => true,
        MouseEventKind::ScrollUp => false,
        _ => return,
    };
    let scroll = match app.screen {
        Screen::Nutrition => &mut app.nutrition.plan_scroll,
        Screen::Workout => &mut app.workout.plan_scroll,
        Screen::Companion => &mut app.chat.scroll,
        Screen::Home => return,
    };
    *scroll = if down {
        scroll.saturating_add(3)
    } else {
        scroll.saturating_sub(3)
    };
}
