//! DOM presenter and event wiring for the browser build.
//!
//! Expects a page with a CSS-grid `#game-board`, score/timer
//! spans, three item buttons and a game-over modal. Jewels are plain divs
//! (`.jewel.color-N` with `data-row` / `data-col`); the stylesheet owns the
//! `flashing` animation, and its `animationend` events feed the resolver's
//! barrier.

use std::cell::RefCell;

use log::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Document, Element, HtmlButtonElement, window};

use crate::board::{Coord, Grid, Item, ItemBelt, MatchSet, Pending, Presenter, Rejection, Session};
use crate::config::GameConfig;

const TICK_MS: i32 = 1_000;

struct Dom {
    doc: Document,
    board: Element,
    score: Option<Element>,
    timer: Option<Element>,
    refresh_btn: Option<HtmlButtonElement>,
    knight_btn: Option<HtmlButtonElement>,
    bomb_btn: Option<HtmlButtonElement>,
    modal: Option<Element>,
    final_score: Option<Element>,
}

struct App {
    session: Session,
    dom: Dom,
    ticker: Option<i32>,
}

thread_local! {
    static APP: RefCell<Option<App>> = RefCell::new(None);
}

fn with_app<R>(f: impl FnOnce(&mut App) -> R) -> Option<R> {
    APP.with(|cell| cell.borrow_mut().as_mut().map(f))
}

fn cell_selector(at: Coord) -> String {
    format!("[data-row='{}'][data-col='{}']", at.row, at.col)
}

fn grid_position(at: Coord) -> String {
    format!(
        "grid-row-start:{};grid-column-start:{}",
        at.row + 1,
        at.col + 1
    )
}

impl Dom {
    fn find(doc: &Document) -> Result<Self, JsValue> {
        let board = doc
            .get_element_by_id("game-board")
            .ok_or_else(|| JsValue::from_str("no #game-board element"))?;
        let button = |id: &str| {
            doc.get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
        };
        Ok(Self {
            doc: doc.clone(),
            board,
            score: doc.get_element_by_id("score"),
            timer: doc.get_element_by_id("timer"),
            refresh_btn: button("item-refresh"),
            knight_btn: button("item-knight"),
            bomb_btn: button("item-bomb"),
            modal: doc.get_element_by_id("game-over-modal"),
            final_score: doc.get_element_by_id("final-score"),
        })
    }

    fn draw(&self, grid: &Grid) -> Result<(), JsValue> {
        self.board.set_inner_html("");
        for (at, jewel) in grid.iter() {
            let Some(jewel) = jewel else { continue };
            let el = self.doc.create_element("div")?;
            el.class_list().add_2("jewel", jewel.css_class())?;
            el.set_attribute("data-row", &at.row.to_string())?;
            el.set_attribute("data-col", &at.col.to_string())?;
            el.set_attribute("style", &grid_position(at))?;
            self.board.append_child(&el)?;
        }
        Ok(())
    }

    /// Start the clear animation on every cell. Cells with no element are
    /// returned so the caller can signal them itself.
    fn flash(&self, cells: &MatchSet) -> Result<Vec<Coord>, JsValue> {
        let mut missing = Vec::new();
        for &at in cells {
            let Some(el) = self.board.query_selector(&cell_selector(at))? else {
                missing.push(at);
                continue;
            };
            let placeholder = self.doc.create_element("div")?;
            placeholder.class_list().add_1("placeholder")?;
            placeholder.set_attribute("style", &grid_position(at))?;
            self.board.append_child(&placeholder)?;

            let opts = AddEventListenerOptions::new();
            opts.set_once(true);
            let done = Closure::once_into_js(move || on_animation_end(at));
            el.add_event_listener_with_callback_and_add_event_listener_options(
                "animationend",
                done.unchecked_ref(),
                &opts,
            )?;
            el.class_list().add_1("flashing")?;
        }
        Ok(missing)
    }

    fn mark_selected(&self, selected: Option<Coord>) -> Result<(), JsValue> {
        if let Some(prev) = self.board.query_selector(".jewel.selected")? {
            prev.class_list().remove_1("selected")?;
        }
        if let Some(at) = selected {
            if let Some(el) = self.board.query_selector(&cell_selector(at))? {
                el.class_list().add_1("selected")?;
            }
        }
        Ok(())
    }

    fn set_modal_hidden(&self, hidden: bool) {
        if let Some(modal) = &self.modal {
            if let Err(e) = modal.class_list().toggle_with_force("hidden", hidden) {
                warn!("modal toggle failed: {e:?}");
            }
        }
    }
}

impl Presenter for Dom {
    fn render(&mut self, grid: &Grid) {
        if let Err(e) = self.draw(grid) {
            warn!("render failed: {e:?}");
        }
    }

    fn animate(&mut self, cells: &MatchSet) -> Pending {
        let missing = match self.flash(cells) {
            Ok(missing) => missing,
            Err(e) => {
                warn!("animation failed, skipping it: {e:?}");
                return Pending::Done;
            }
        };
        if missing.len() == cells.len() {
            return Pending::Done;
        }
        if !missing.is_empty() {
            // Signal cells that had nothing to animate on the next turn of the
            // event loop, after the listeners above are in place.
            schedule(0, move || {
                for at in missing {
                    on_animation_end(at);
                }
            });
        }
        Pending::Deferred
    }

    fn pause(&mut self, ms: u32) -> Pending {
        if schedule(ms, resume) {
            Pending::Deferred
        } else {
            Pending::Done
        }
    }

    fn show_score(&mut self, score: u32) {
        if let Some(el) = &self.score {
            el.set_text_content(Some(&score.to_string()));
        }
    }

    fn show_time(&mut self, seconds: u32) {
        if let Some(el) = &self.timer {
            el.set_text_content(Some(&seconds.to_string()));
        }
    }

    fn show_selection(&mut self, selected: Option<Coord>) {
        if let Err(e) = self.mark_selected(selected) {
            warn!("selection highlight failed: {e:?}");
        }
    }

    fn show_items(&mut self, items: &ItemBelt) {
        for (item, btn) in [
            (Item::AreaClear, &self.bomb_btn),
            (Item::LongRangeSwap, &self.knight_btn),
        ] {
            let Some(btn) = btn else { continue };
            btn.set_disabled(!items.is_available(item));
            if let Err(e) = btn
                .class_list()
                .toggle_with_force("active", items.active() == Some(item))
            {
                warn!("item highlight failed: {e:?}");
            }
        }
        if let Some(btn) = &self.refresh_btn {
            btn.set_disabled(!items.can_refresh());
        }
    }

    fn show_game_over(&mut self, final_score: u32) {
        if let Some(el) = &self.final_score {
            el.set_text_content(Some(&final_score.to_string()));
        }
        self.set_modal_hidden(false);
    }
}

/// Run `f` after `ms` milliseconds. Returns `false` if the timer could not be set.
fn schedule(ms: u32, f: impl FnOnce() + 'static) -> bool {
    let Some(win) = window() else {
        return false;
    };
    let cb = Closure::once_into_js(f);
    win.set_timeout_with_callback_and_timeout_and_arguments_0(
        cb.unchecked_ref(),
        i32::try_from(ms).unwrap_or(i32::MAX),
    )
    .is_ok()
}

fn resume() {
    with_app(|app| {
        app.session.pump(&mut app.dom);
    });
}

fn on_animation_end(at: Coord) {
    with_app(|app| {
        if app.session.animation_ended(at) {
            app.session.pump(&mut app.dom);
        }
    });
}

fn on_tick() {
    with_app(|app| match app.session.tick(&mut app.dom) {
        // The clock is suspended while a move resolves.
        Ok(_) | Err(Rejection::Busy) | Err(Rejection::GameOver) => {}
        Err(other) => warn!("tick rejected: {other}"),
    });
}

fn clicked_cell(evt: &web_sys::MouseEvent) -> Option<Coord> {
    let target: Element = evt.target()?.dyn_into().ok()?;
    let jewel = target.closest(".jewel").ok()??;
    let row = jewel.get_attribute("data-row")?.parse().ok()?;
    let col = jewel.get_attribute("data-col")?.parse().ok()?;
    Some(Coord::new(row, col))
}

fn on_button(doc: &Document, id: &str, mut f: impl FnMut(&mut App) + 'static) -> Result<(), JsValue> {
    let Some(el) = doc.get_element_by_id(id) else {
        warn!("#{id} missing; control disabled");
        return Ok(());
    };
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
        with_app(&mut f);
    }) as Box<dyn FnMut(_)>);
    el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn wire_events(dom: &Dom) -> Result<(), JsValue> {
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            let Some(at) = clicked_cell(&evt) else { return };
            with_app(|app| {
                let _ = app.session.cell_clicked(at, &mut app.dom);
            });
        }) as Box<dyn FnMut(_)>);
        dom.board
            .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    on_button(&dom.doc, "item-bomb", |app| {
        let _ = app.session.item_selected(Item::AreaClear, &mut app.dom);
    })?;
    on_button(&dom.doc, "item-knight", |app| {
        let _ = app.session.item_selected(Item::LongRangeSwap, &mut app.dom);
    })?;
    on_button(&dom.doc, "item-refresh", |app| {
        let _ = app.session.refresh_requested(&mut app.dom);
    })?;
    on_button(&dom.doc, "restart-button", |app| {
        if app.session.restart_requested(&mut app.dom).is_ok() {
            app.dom.set_modal_hidden(true);
        }
    })?;
    dom.board.set_attribute("data-wired", "1")?;
    Ok(())
}

fn start_ticker() -> Result<i32, JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let closure = Closure::wrap(Box::new(on_tick) as Box<dyn FnMut()>);
    let id = win.set_interval_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        TICK_MS,
    )?;
    closure.forget();
    Ok(id)
}

/// Build a session for `config`, draw it, and hook up the page.
/// Calling it again replaces the running game.
pub fn start(config: GameConfig) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let mut dom = Dom::find(&doc)?;
    let timed = config.is_timed();
    let session = Session::new(config);
    session.present_all(&mut dom);
    dom.set_modal_hidden(true);

    let first_start = dom.board.get_attribute("data-wired").is_none();
    if first_start {
        wire_events(&dom)?;
    }

    let previous = APP.with(|cell| {
        cell.replace(Some(App {
            session,
            dom,
            ticker: None,
        }))
    });
    if let Some(id) = previous.and_then(|app| app.ticker) {
        win.clear_interval_with_handle(id);
    }

    if timed {
        let id = start_ticker()?;
        with_app(|app| app.ticker = Some(id));
    }
    Ok(())
}
