//! Keyboard input dispatch: symbol entry overlay, then global keys, then page keys.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Page};

/// Rows moved per PageUp/PageDown in the data grid.
const GRID_PAGE: i64 = 10;

/// Handle a key event.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. The symbol entry overlay consumes input first.
    if app.symbol_input.is_some() {
        handle_symbol_input(app, key);
        return;
    }

    // 2. Global keys (always available).
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.running = false;
            return;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
            return;
        }
        KeyCode::Char('1') => {
            app.switch_page(Page::Stocks);
            return;
        }
        KeyCode::Char('2') => {
            app.switch_page(Page::Tips);
            return;
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.switch_page(app.page.next());
            return;
        }
        KeyCode::Char('r') => {
            app.reload();
            return;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.move_focus(1);
            return;
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.move_focus(-1);
            return;
        }
        KeyCode::PageDown => {
            app.scroll_grid(GRID_PAGE);
            return;
        }
        KeyCode::PageUp => {
            app.scroll_grid(-GRID_PAGE);
            return;
        }
        _ => {}
    }

    // 3. Page-specific keys.
    match app.page {
        Page::Stocks => handle_stocks_key(app, key),
        Page::Tips => handle_tips_key(app, key),
    }
}

fn handle_symbol_input(app: &mut App, key: KeyEvent) {
    let Some(buffer) = app.symbol_input.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => {
            app.symbol_input = None;
        }
        KeyCode::Enter => {
            let symbol = buffer.trim().to_uppercase();
            app.symbol_input = None;
            if !symbol.is_empty() {
                app.select_symbol(&symbol);
            }
        }
        KeyCode::Backspace => {
            buffer.pop();
        }
        KeyCode::Char(c) if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=') => {
            buffer.push(c);
        }
        _ => {}
    }
}

fn handle_stocks_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('l') | KeyCode::Right => app.adjust_stock_input(1),
        KeyCode::Char('h') | KeyCode::Left => app.adjust_stock_input(-1),
        KeyCode::Char('L') => app.adjust_stock_input(4),
        KeyCode::Char('H') => app.adjust_stock_input(-4),
        KeyCode::Char('/') | KeyCode::Char('s') => app.symbol_input = Some(String::new()),
        _ => {}
    }
}

fn handle_tips_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('l') | KeyCode::Right => app.adjust_tips_input(1),
        KeyCode::Char('h') | KeyCode::Left => app.adjust_tips_input(-1),
        KeyCode::Char('L') => app.adjust_tips_input(4),
        KeyCode::Char('H') => app.adjust_tips_input(-4),
        KeyCode::Char('x') => app.reset_tips_filters(),
        _ => {}
    }
}
