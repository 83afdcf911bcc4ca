#![cfg(target_arch = "wasm32")]

use scrollfx_wasm::config::{ParticleConfig, RevealConfig};
use scrollfx_wasm::reveal::RevealHost;
use scrollfx_wasm::surface::Surface;
use scrollfx_wasm::wasm::{CanvasSurface, DomRevealHost, ParticleEffect, RevealEffect};
use scrollfx_wasm::Effect;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

/// Appends `<div style="width:..;height:.."><canvas id=..></canvas></div>`.
fn mount_canvas(id: &str, width: u32, height: u32) -> web_sys::HtmlCanvasElement {
    let doc = document();
    let container: web_sys::HtmlElement = doc.create_element("div").unwrap().unchecked_into();
    let style = container.style();
    style.set_property("width", &format!("{}px", width)).unwrap();
    style.set_property("height", &format!("{}px", height)).unwrap();
    let canvas: web_sys::HtmlCanvasElement = doc.create_element("canvas").unwrap().unchecked_into();
    canvas.set_id(id);
    container.append_child(&canvas).unwrap();
    doc.body().unwrap().append_child(&container).unwrap();
    canvas
}

#[wasm_bindgen_test]
fn canvas_surface_reads_parent_size() {
    let canvas = mount_canvas("surface-size", 320, 180);
    let mut surface = CanvasSurface::new(canvas).unwrap();
    assert_eq!(surface.container_size(), Some((320, 180)));

    surface.resize(320, 180);
    assert_eq!(surface.size(), (320, 180));
}

#[wasm_bindgen_test]
fn particle_effect_sizes_canvas_and_stops() {
    let canvas = mount_canvas("fx-particles", 400, 240);
    let mut effect = ParticleEffect::new(
        ParticleConfig {
            canvas_id: "fx-particles".into(),
            ..ParticleConfig::default()
        },
        7,
    );
    effect.start().unwrap();
    assert_eq!((canvas.width(), canvas.height()), (400, 240));
    effect.stop();
}

#[wasm_bindgen_test]
fn missing_canvas_is_a_no_op() {
    let mut effect = ParticleEffect::new(
        ParticleConfig {
            canvas_id: "does-not-exist".into(),
            ..ParticleConfig::default()
        },
        7,
    );
    assert!(effect.start().is_ok());
    effect.stop();
}

#[wasm_bindgen_test]
fn reveal_host_toggles_opacity_and_class() {
    let doc = document();
    let el: web_sys::HtmlElement = doc.create_element("div").unwrap().unchecked_into();
    el.set_class_name("fx-reveal-probe");
    doc.body().unwrap().append_child(&el).unwrap();

    let mut host = DomRevealHost::collect(&doc, &[".fx-reveal-probe".to_string()], "animate-fade-in-up");
    assert_eq!(host.elements().len(), 1);
    assert_eq!(el.get_attribute("data-reveal-index").as_deref(), Some("0"));

    host.set_hidden(0);
    assert_eq!(el.style().get_property_value("opacity").unwrap(), "0");
    host.set_revealed(0, true);
    assert_eq!(el.style().get_property_value("opacity").unwrap(), "1");
    assert!(el.class_list().contains("animate-fade-in-up"));
}

#[wasm_bindgen_test]
fn reveal_effect_hides_targets_while_observing() {
    let doc = document();
    let el: web_sys::HtmlElement = doc.create_element("div").unwrap().unchecked_into();
    el.set_class_name("fx-reveal-observed");
    doc.body().unwrap().append_child(&el).unwrap();

    let mut effect = RevealEffect::new(RevealConfig {
        selectors: vec![".fx-reveal-observed".into()],
        ..RevealConfig::default()
    });
    effect.start().unwrap();
    assert_eq!(el.style().get_property_value("opacity").unwrap(), "0");
    effect.stop();
}
