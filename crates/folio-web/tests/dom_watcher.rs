#![forbid(unsafe_code)]
#![cfg(target_arch = "wasm32")]

use folio_reveal::{
    Registration, RevealConfig, RevealController, TargetId, Threshold, ViewportWatcher,
};
use folio_web::dom_watcher::{DomWatcher, REVEAL_ID_ATTR};
use wasm_bindgen_test::*;
use web_sys::Element;

wasm_bindgen_test_configure!(run_in_browser);

fn element() -> Element {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .expect("document");
    document.create_element("section").expect("create element")
}

fn attach(el: &Element) {
    let body = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.body())
        .expect("body");
    body.append_child(el).expect("append");
}

#[wasm_bindgen_test]
fn detached_element_is_deferred() {
    let mut watcher = DomWatcher::new("0px");
    let el = element();
    let token = watcher
        .observe(&"about".into(), &el, Threshold::DEFAULT)
        .expect("observe");
    assert_eq!(token, None);
    assert_eq!(watcher.live_count(), 0);
}

#[wasm_bindgen_test]
fn attached_element_is_tagged_and_released() {
    let mut watcher = DomWatcher::new("0px");
    let el = element();
    attach(&el);
    let token = watcher
        .observe(&TargetId::Key(42), &el, Threshold::DEFAULT)
        .expect("observe")
        .expect("token");
    assert_eq!(el.get_attribute(REVEAL_ID_ATTR).as_deref(), Some("42"));
    assert_eq!(watcher.live_count(), 1);

    watcher.unobserve(token);
    watcher.unobserve(token);
    assert_eq!(watcher.live_count(), 0);
    el.remove();
}

#[wasm_bindgen_test]
fn controller_over_dom_watcher_defers_then_observes() {
    let config = RevealConfig::default().with_threshold(Threshold::clamped(0.2));
    let mut controller = RevealController::new(DomWatcher::new("0px"), config);
    let el = element();

    assert_eq!(controller.register("p1", &el), Registration::Deferred);
    attach(&el);
    assert_eq!(controller.register("p1", &el), Registration::Observing);
    assert_eq!(controller.teardown(), 1);
    assert_eq!(controller.watcher().live_count(), 0);
    el.remove();
}
