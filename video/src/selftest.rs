//! Display self tests.
//!
//! Run in-kernel with `itests` enabled. Every test builds its own compositor
//! over [`NoDisplay`], so the real adapter and the kernel singleton are never
//! touched and tests can run in any order.

use prism_abi::geometry::Rectangle;
use prism_abi::keycode::{KKC_ALT, KKC_ESC, KKC_RELEASED, KKC_RIGHT, KKC_SHIFT, KKC_TAB};
use prism_abi::pixel::Color32;
use prism_abi::video::{DisplayMode, VideoError};
use prism_gfx::blend::alpha_blending;
use prism_gfx::element::{Drawable, Element, ElementId};
use prism_gfx::theme::{COLOR_DESKTOP, DRAG_STEP};
use prism_lib::testing::{SuiteSummary, TestResult};
use prism_lib::{assert_eq_test, assert_test, fail, pass, run_suite};

use crate::compositor::Compositor;
use crate::hardware::NoDisplay;

const RED: Color32 = Color32::rgb(0xFF, 0, 0);

fn offscreen() -> Compositor<NoDisplay> {
    Compositor::new(NoDisplay)
}

fn typed_len(compositor: &Compositor<NoDisplay>, id: ElementId) -> usize {
    compositor
        .element(id)
        .and_then(Element::as_container)
        .map_or(0, |c| c.children().len())
}

pub fn test_show_without_bridge_stays_in_text() -> TestResult {
    let mut compositor = offscreen();
    assert_eq_test!(compositor.show(), Err(VideoError::BridgeUnavailable));
    assert_eq_test!(compositor.display_mode(), DisplayMode::Text);
    assert_test!(compositor.controller().framebuffer().is_none());
    compositor.hide();
    assert_eq_test!(compositor.display_mode(), DisplayMode::Text);
    pass!()
}

pub fn test_later_child_wins() -> TestResult {
    let mut compositor = offscreen();
    let blue = Color32::rgb(0, 0, 0xFF);
    compositor.add_element(None, Drawable::fill(Rectangle::new(0, 0, 40, 40), RED).into());
    compositor.add_element(None, Drawable::fill(Rectangle::new(20, 20, 60, 60), blue).into());
    assert_eq_test!(compositor.surface().pixel(30, 30), Some(blue.to_rgba_group()));
    assert_eq_test!(compositor.surface().pixel(10, 10), Some(RED.to_rgba_group()));
    pass!()
}

pub fn test_vacated_region_shows_background() -> TestResult {
    let mut compositor = offscreen();
    let square = Drawable::fill(Rectangle::from_size(100, 100, 20, 20), RED);
    let Some(id) = compositor.add_element(None, square.into()) else {
        return fail!("desktop refused a child");
    };
    assert_test!(compositor.move_element(id, 50, 0));
    assert_eq_test!(
        compositor.surface().pixel(105, 105),
        Some(COLOR_DESKTOP.to_rgba_group())
    );
    assert_eq_test!(compositor.surface().pixel(155, 105), Some(RED.to_rgba_group()));
    pass!()
}

pub fn test_key_without_focus_is_dropped() -> TestResult {
    let mut compositor = offscreen();
    let id = compositor.add_window(Rectangle::from_size(10, 10, 200, 100), "idle");
    compositor.key(b'x' as u32, false);
    compositor.key(KKC_TAB, false);
    assert_eq_test!(typed_len(&compositor, id), 0);
    assert_eq_test!(compositor.focused(), None);
    assert_test!(!compositor.has_pending_damage());
    pass!()
}

pub fn test_typing_and_drag() -> TestResult {
    let mut compositor = offscreen();
    let id = compositor.add_window(Rectangle::from_size(10, 10, 200, 100), "typing");
    assert_test!(compositor.focus(Some(id)));

    compositor.key(KKC_SHIFT, false);
    compositor.key(b'h' as u32, false);
    compositor.key(KKC_SHIFT | KKC_RELEASED, false);
    compositor.key(b'i' as u32, false);
    assert_eq_test!(typed_len(&compositor, id), 2);

    compositor.key(KKC_ALT, false);
    compositor.key(KKC_RIGHT, false);
    let moved = compositor.element(id).map(Element::bounds);
    assert_eq_test!(moved, Some(Rectangle::from_size(10 + DRAG_STEP, 10, 200, 100)));
    compositor.key(KKC_ESC, false);
    compositor.key(KKC_ALT | KKC_RELEASED, false);
    let restored = compositor.element(id).map(Element::bounds);
    assert_eq_test!(restored, Some(Rectangle::from_size(10, 10, 200, 100)));

    compositor.present();
    assert_test!(!compositor.has_pending_damage());
    pass!()
}

pub fn test_alpha_blending_values() -> TestResult {
    assert_test!(alpha_blending(255.0, 0.0, 1.0) == 255.0);
    assert_test!(alpha_blending(255.0, 0.0, 0.0) == 0.0);
    assert_test!(alpha_blending(100.0, 200.0, 0.5) == 150.0);
    pass!()
}

pub fn run_display_tests() -> SuiteSummary {
    run_suite!(
        "display",
        [
            test_show_without_bridge_stays_in_text,
            test_later_child_wins,
            test_vacated_region_shows_background,
            test_key_without_focus_is_dropped,
            test_typing_and_drag,
            test_alpha_blending_values,
        ]
    )
}
