// Browser smoke test: `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn mount(doc: &web_sys::Document, tag: &str, id: &str) {
    let el = doc.create_element(tag).unwrap();
    el.set_id(id);
    doc.body().unwrap().append_child(&el).unwrap();
}

#[wasm_bindgen_test]
fn start_game_draws_a_full_board_and_highlights_armed_items() {
    let doc = web_sys::window().unwrap().document().unwrap();
    mount(&doc, "div", "game-board");
    mount(&doc, "span", "score");
    mount(&doc, "span", "timer");
    mount(&doc, "button", "item-bomb");

    jewel_match::start_game("timed").unwrap();

    let board = doc.get_element_by_id("game-board").unwrap();
    assert_eq!(board.query_selector_all(".jewel").unwrap().length(), 64);
    let timer = doc.get_element_by_id("timer").unwrap();
    assert_eq!(timer.text_content().as_deref(), Some("60"));
    let bomb: web_sys::HtmlButtonElement = doc
        .get_element_by_id("item-bomb")
        .unwrap()
        .dyn_into()
        .unwrap();
    assert!(!bomb.disabled());

    bomb.click();
    assert!(bomb.class_list().contains("active"));
    bomb.click();
    assert!(!bomb.class_list().contains("active"));

    assert!(jewel_match::start_game("zen").is_err());
}
