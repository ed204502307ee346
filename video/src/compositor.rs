//! The compositor: owns the back buffer, the element tree and the mode
//! controller, and turns key events into tree updates.
//!
//! Two paths reach it. Normal kernel code calls the drawing operations,
//! which paint and flush immediately. The keyboard interrupt calls [`key`],
//! which only updates state and records damage; [`present`] repaints that
//! damage later from normal context.
//!
//! [`key`]: Compositor::key
//! [`present`]: Compositor::present

use alloc::boxed::Box;
use alloc::vec::Vec;

use prism_abi::geometry::Rectangle;
use prism_abi::keycode::{
    KKC_ALT, KKC_BACKSPACE, KKC_CTRL, KKC_DOWN, KKC_ENTER, KKC_ESC, KKC_LEFT, KKC_NONE,
    KKC_RIGHT, KKC_SHIFT, KKC_TAB, KKC_UP, kkc_code, kkc_is_arrow, kkc_is_release, kkc_to_ascii,
};
use prism_abi::video::{DisplayMode, VideoResult};
use prism_gfx::damage::DamageTracker;
use prism_gfx::element::{Container, Drawable, Element, ElementId, Window};
use prism_gfx::glyph::glyph_cell;
use prism_gfx::surface::PixelSurface;
use prism_gfx::theme::{COLOR_DESKTOP, COLOR_TEXT, DRAG_STEP};
use prism_lib::{klog_debug, klog_info, klog_trace};

use crate::hardware::DisplayHardware;
use crate::vbe::ModeController;

/// Press and release callbacks run before the compositor routes a key.
///
/// Both default to doing nothing, so an implementation only overrides the
/// transitions it cares about.
pub trait KeyHooks {
    fn key_down(&mut self, _kkc: u32, _capslock: bool) {}
    fn key_up(&mut self, _kkc: u32, _capslock: bool) {}
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

pub struct Compositor<H> {
    controller: ModeController<H>,
    surface: PixelSurface,
    root: Container,
    focused: Option<ElementId>,
    the_mouse: Option<ElementId>,
    txt_x: i32,
    modifiers: Modifiers,
    damage: DamageTracker,
    hooks: Option<Box<dyn KeyHooks + Send>>,
}

impl<H: DisplayHardware> Compositor<H> {
    /// Builds the back buffer and an empty desktop. No hardware is touched.
    pub fn new(hardware: H) -> Self {
        Self {
            controller: ModeController::new(hardware),
            surface: PixelSurface::new(),
            root: Container::with_background(Rectangle::screen(), COLOR_DESKTOP),
            focused: None,
            the_mouse: None,
            txt_x: 0,
            modifiers: Modifiers::default(),
            damage: DamageTracker::new(),
            hooks: None,
        }
    }

    #[inline]
    pub fn display_mode(&self) -> DisplayMode {
        self.controller.display_mode()
    }

    #[inline]
    pub fn controller(&self) -> &ModeController<H> {
        &self.controller
    }

    #[inline]
    pub fn surface(&self) -> &PixelSurface {
        &self.surface
    }

    /// The desktop container every element hangs off.
    #[inline]
    pub fn root(&self) -> &Container {
        &self.root
    }

    #[inline]
    pub fn root_id(&self) -> ElementId {
        self.root.id()
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.root.find(id)
    }

    #[inline]
    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    /// Container under the pointer, as of the last `focus_at`.
    #[inline]
    pub fn the_mouse(&self) -> Option<ElementId> {
        self.the_mouse
    }

    /// Column the next `add_text` on the same row would naturally use.
    #[inline]
    pub fn text_cursor(&self) -> i32 {
        self.txt_x
    }

    #[inline]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    #[inline]
    pub fn has_pending_damage(&self) -> bool {
        self.damage.is_dirty()
    }

    pub fn set_key_hooks(&mut self, hooks: Option<Box<dyn KeyHooks + Send>>) {
        self.hooks = hooks;
    }

    /// Switch to video mode and paint the whole screen.
    pub fn show(&mut self) -> VideoResult {
        self.controller.enter_video_mode()?;
        self.damage.clear();
        self.redraw(Rectangle::screen());
        Ok(())
    }

    /// Return to the original text mode. Drawing continues into the back
    /// buffer but nothing reaches the screen until the next `show`.
    pub fn hide(&mut self) {
        self.controller.enter_text_mode();
    }

    fn flush(&mut self, rect: &Rectangle) {
        if let Some(framebuffer) = self.controller.framebuffer_mut() {
            framebuffer.flush_rect(&self.surface, rect);
        }
    }

    /// Repaint everything inside `rect` and push it to the screen.
    pub fn redraw(&mut self, rect: Rectangle) {
        let rect = rect.bound();
        if rect.is_empty() {
            return;
        }
        self.root.paint(&mut self.surface, &rect);
        self.flush(&rect);
    }

    /// Refresh `id` and its descendants inside `rect`.
    ///
    /// The element is clipped by its ancestors the same way `redraw` clips
    /// it, and the area is repainted from the tree so translucent content
    /// and siblings stacked above `id` come out as a full redraw would.
    pub fn draw_single(&mut self, id: ElementId, rect: Rectangle) -> bool {
        if id == self.root.id() {
            self.redraw(rect);
            return true;
        }
        let Some(area) = self.root.visible_area(id) else {
            return false;
        };
        self.redraw(rect.intersection(&area));
        true
    }

    /// Restore `difference` from everything except `id`, then refresh `id`
    /// inside `rect`.
    ///
    /// Used after a move: `rect` is the new footprint and `difference` the
    /// area the element left behind.
    pub fn draw_single_with_difference(
        &mut self,
        id: ElementId,
        rect: Rectangle,
        difference: Rectangle,
    ) -> bool {
        if id == self.root.id() {
            self.redraw(difference);
            self.redraw(rect);
            return true;
        }
        if !self.root.contains(id) {
            return false;
        }
        let difference = difference.bound();
        if !difference.is_empty() {
            self.root.paint_without(&mut self.surface, &difference, id);
            self.flush(&difference);
        }
        self.draw_single(id, rect)
    }

    pub fn get_element_at_position(&self, x: i32, y: i32) -> Option<ElementId> {
        self.root.hit_test(x, y)
    }

    /// Place a glyph at text-grid cell `(x, y)` on the desktop.
    pub fn add_text(&mut self, x: i32, y: i32, c: u8) -> ElementId {
        let cell = glyph_cell(x, y);
        let glyph = Drawable::glyph(cell.x1, cell.y1, c, COLOR_TEXT, Some(COLOR_DESKTOP));
        let id = self.root.push(glyph.into());
        self.txt_x = x + 1;
        self.draw_single(id, cell);
        id
    }

    /// Add a top-level window above everything else.
    pub fn add_window(&mut self, bounds: Rectangle, title: &str) -> ElementId {
        let id = self.root.push(Window::new(bounds, title).into());
        self.redraw(bounds);
        id
    }

    /// Append `element` to `parent`, or to the desktop when `parent` is
    /// `None`. Returns `None` if `parent` is missing or cannot hold children.
    pub fn add_element(&mut self, parent: Option<ElementId>, element: Element) -> Option<ElementId> {
        let bounds = element.bounds();
        let root_id = self.root.id();
        let container = match parent {
            Some(parent) if parent != root_id => self.root.find_mut(parent)?.as_container_mut()?,
            _ => &mut self.root,
        };
        let id = container.push(element);
        self.redraw(bounds);
        Some(id)
    }

    /// Detach `id` and its subtree, clearing any focus or pointer reference
    /// into it.
    pub fn remove_element(&mut self, id: ElementId) -> Option<Element> {
        let removed = self.root.remove(id)?;
        if self.focused.is_some_and(|f| removed.contains(f)) {
            self.focused = None;
        }
        if self.the_mouse.is_some_and(|m| removed.contains(m)) {
            self.the_mouse = None;
        }
        self.redraw(removed.bounds());
        Some(removed)
    }

    fn translate_element(
        &mut self,
        id: ElementId,
        dx: i32,
        dy: i32,
    ) -> Option<(Rectangle, Rectangle)> {
        let element = self.root.find_mut(id)?;
        let old = element.bounds();
        element.translate(dx, dy);
        Some((old, element.bounds()))
    }

    /// Move `id` by `(dx, dy)` and repaint both footprints. The desktop
    /// itself cannot be moved.
    pub fn move_element(&mut self, id: ElementId, dx: i32, dy: i32) -> bool {
        match self.translate_element(id, dx, dy) {
            Some((old, new)) => self.draw_single_with_difference(id, new, old),
            None => false,
        }
    }

    fn window_mut(&mut self, id: ElementId) -> Option<&mut Window> {
        self.root.find_mut(id)?.as_window_mut()
    }

    fn title_bar_of(&self, id: ElementId) -> Option<Rectangle> {
        Some(self.root.find(id)?.as_window()?.title_bar())
    }

    /// Give keyboard focus to window `id`, or clear it with `None`.
    ///
    /// Damage is recorded for both title bars; call `present` to show it.
    pub fn focus(&mut self, id: Option<ElementId>) -> bool {
        if let Some(id) = id {
            if self.root.find(id).and_then(Element::as_window).is_none() {
                return false;
            }
        }
        if id == self.focused {
            return true;
        }

        if let Some(old) = self.focused.take() {
            if let Some(window) = self.window_mut(old) {
                window.set_focused(false);
                window.end_drag();
            }
            if let Some(bar) = self.title_bar_of(old) {
                self.damage.add_merge_overlapping(bar);
            }
        }
        if let Some(new) = id {
            if let Some(window) = self.window_mut(new) {
                window.set_focused(true);
            }
            if let Some(bar) = self.title_bar_of(new) {
                self.damage.add_merge_overlapping(bar);
            }
        }
        self.focused = id;
        klog_debug!("compositor: focus -> {:?}", id.map(ElementId::raw));
        true
    }

    /// Pointer-originated focus: the top-level window under `(x, y)` gets
    /// focus and becomes the pointer container. Clicking the desktop clears
    /// focus.
    pub fn focus_at(&mut self, x: i32, y: i32) -> Option<ElementId> {
        let hit = self.get_element_at_position(x, y)?;
        let window = self
            .root
            .children()
            .iter()
            .rev()
            .filter_map(Element::as_window)
            .find(|window| window.id() == hit || window.container().contains(hit))
            .map(Window::id);
        self.the_mouse = Some(window.unwrap_or(self.root.id()));
        self.focus(window);
        window
    }

    fn top_level_windows(&self) -> Vec<ElementId> {
        self.root
            .children()
            .iter()
            .filter_map(|child| child.as_window().map(Window::id))
            .collect()
    }

    fn cycle_focus(&mut self) {
        let windows = self.top_level_windows();
        if windows.is_empty() {
            return;
        }
        let next = match self.focused.and_then(|f| windows.iter().position(|&w| w == f)) {
            Some(index) => windows[(index + 1) % windows.len()],
            None => windows[0],
        };
        self.focus(Some(next));
    }

    fn track_modifiers(&mut self, code: u32, pressed: bool) {
        match code {
            KKC_SHIFT => self.modifiers.shift = pressed,
            KKC_CTRL => self.modifiers.ctrl = pressed,
            KKC_ALT => self.modifiers.alt = pressed,
            _ => {}
        }
    }

    /// Entry point for decoded key events, safe to call from the keyboard
    /// interrupt. Nothing is painted here.
    pub fn key(&mut self, kkc: u32, capslock: bool) {
        let code = kkc_code(kkc);
        if code == KKC_NONE {
            return;
        }
        let released = kkc_is_release(kkc);
        self.track_modifiers(code, !released);

        if let Some(hooks) = self.hooks.as_mut() {
            if released {
                hooks.key_up(kkc, capslock);
            } else {
                hooks.key_down(kkc, capslock);
            }
        }

        let Some(focused) = self.focused else {
            klog_trace!("compositor: key 0x{:x} dropped, nothing focused", kkc);
            return;
        };
        if released {
            self.key_up(focused, code);
        } else {
            self.key_down(focused, code, capslock);
        }
    }

    fn key_up(&mut self, focused: ElementId, code: u32) {
        if code != KKC_ALT {
            return;
        }
        if let Some(window) = self.window_mut(focused) {
            window.end_drag();
        }
    }

    fn key_down(&mut self, focused: ElementId, code: u32, capslock: bool) {
        let shift = self.modifiers.shift;
        let Some(window) = self.window_mut(focused) else {
            self.focused = None;
            return;
        };

        match code {
            KKC_ALT => window.begin_drag(),
            KKC_ESC => {
                if let Some((dx, dy)) = window.cancel_drag() {
                    self.drag_by(focused, dx, dy);
                }
            }
            KKC_TAB => self.cycle_focus(),
            KKC_BACKSPACE => {
                if let Some(cell) = window.backspace() {
                    self.damage.add_merge_overlapping(cell);
                }
            }
            KKC_ENTER => {
                window.newline();
            }
            code if kkc_is_arrow(code) => {
                if !window.is_dragging() {
                    return;
                }
                let (dx, dy) = match code {
                    KKC_UP => (0, -DRAG_STEP),
                    KKC_DOWN => (0, DRAG_STEP),
                    KKC_LEFT => (-DRAG_STEP, 0),
                    KKC_RIGHT => (DRAG_STEP, 0),
                    _ => (0, 0),
                };
                self.drag_by(focused, dx, dy);
            }
            code => {
                let Some(ch) = kkc_to_ascii(code, shift, capslock) else {
                    return;
                };
                if let Some(cell) = window.type_char(ch, COLOR_TEXT) {
                    self.damage.add_merge_overlapping(cell);
                }
            }
        }
    }

    fn drag_by(&mut self, id: ElementId, dx: i32, dy: i32) {
        if let Some((old, new)) = self.translate_element(id, dx, dy) {
            self.damage.add_merge_overlapping(old);
            self.damage.add_merge_overlapping(new);
        }
    }

    /// Repaint and flush everything damaged since the last call.
    pub fn present(&mut self) {
        if !self.damage.is_dirty() {
            return;
        }
        let damage = core::mem::take(&mut self.damage);
        if damage.is_full_damage() {
            self.redraw(Rectangle::screen());
            return;
        }
        for rect in damage.regions() {
            self.redraw(*rect);
        }
    }

    /// Log a one-line summary of the compositor state.
    pub fn log_state(&self) {
        klog_info!(
            "compositor: mode {:?}, {} top-level elements, focus {:?}",
            self.display_mode(),
            self.root.children().len(),
            self.focused.map(ElementId::raw)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use core::sync::atomic::{AtomicU32, Ordering};

    use prism_abi::keycode::KKC_RELEASED;
    use prism_abi::pixel::Color32;
    use prism_abi::video::VideoError;
    use prism_gfx::element::Visual;
    use prism_gfx::theme::COLOR_WINDOW_BG;

    use crate::fake::{FakeBios, MODE_640X480X32, mode};

    const RED: Color32 = Color32::rgb(0xFF, 0x00, 0x00);
    const TRANSLUCENT_RED: Color32 = Color32::new(0xFF, 0x00, 0x00, 0x80);

    fn bgrx(color: Color32) -> [u8; 4] {
        [color.blue(), color.green(), color.red(), 0]
    }

    fn shown() -> Compositor<FakeBios> {
        let mut compositor = Compositor::new(FakeBios::standard());
        compositor.show().expect("standard adapter offers 1024x768");
        compositor
    }

    fn window(compositor: &Compositor<FakeBios>, id: ElementId) -> &Window {
        compositor
            .element(id)
            .and_then(Element::as_window)
            .expect("window exists")
    }

    fn typed_chars(compositor: &Compositor<FakeBios>, id: ElementId) -> Vec<u8> {
        window(compositor, id)
            .container()
            .children()
            .iter()
            .filter_map(|child| match child {
                Element::Drawable(d) => match d.visual() {
                    Visual::Glyph { ch, .. } => Some(ch),
                    _ => None,
                },
                _ => None,
            })
            .collect()
    }

    fn cell_has_text(compositor: &Compositor<FakeBios>, cell: Rectangle) -> bool {
        let bios = compositor.controller().hardware();
        (cell.y1..cell.y2).any(|y| {
            (cell.x1..cell.x2).any(|x| bios.vram_pixel(x as usize, y as usize) == bgrx(COLOR_TEXT))
        })
    }

    #[test]
    fn show_without_usable_mode_stays_in_text() {
        let bios = FakeBios::new(vec![(MODE_640X480X32, mode(640, 480, 32))]);
        let mut compositor = Compositor::new(bios);
        assert_eq!(compositor.show(), Err(VideoError::ModeUnavailable));
        assert_eq!(compositor.display_mode(), DisplayMode::Text);
        assert!(compositor.controller().framebuffer().is_none());
    }

    #[test]
    fn show_paints_desktop() {
        let compositor = shown();
        let bios = compositor.controller().hardware();
        assert_eq!(compositor.display_mode(), DisplayMode::Video);
        assert_eq!(bios.vram_pixel(0, 0), bgrx(COLOR_DESKTOP));
        assert_eq!(bios.vram_pixel(1023, 767), bgrx(COLOR_DESKTOP));
        assert!(!compositor.has_pending_damage());
    }

    #[test]
    fn move_repaints_vacated_area() {
        let mut compositor = shown();
        let square = Drawable::fill(Rectangle::from_size(100, 100, 50, 50), RED);
        let id = compositor
            .add_element(None, square.into())
            .expect("desktop accepts children");
        assert_eq!(compositor.controller().hardware().vram_pixel(110, 110), bgrx(RED));

        assert!(compositor.move_element(id, 200, 0));
        let bios = compositor.controller().hardware();
        assert_eq!(bios.vram_pixel(110, 110), bgrx(COLOR_DESKTOP));
        assert_eq!(bios.vram_pixel(310, 110), bgrx(RED));
        assert_eq!(
            compositor.element(id).map(Element::bounds),
            Some(Rectangle::from_size(300, 100, 50, 50))
        );
    }

    fn vram(compositor: &Compositor<FakeBios>) -> Vec<u8> {
        compositor.controller().hardware().vram.clone()
    }

    /// Screen contents after `compositor` repaints everything from scratch.
    fn fully_redrawn(compositor: &mut Compositor<FakeBios>) -> Vec<u8> {
        compositor.redraw(Rectangle::screen());
        vram(compositor)
    }

    #[test]
    fn moving_translucent_fill_blends_once() {
        let mut compositor = shown();
        let glass = Drawable::fill(Rectangle::from_size(100, 100, 50, 50), TRANSLUCENT_RED);
        let id = compositor.add_element(None, glass.into()).expect("added");

        assert!(compositor.move_element(id, 10, 0));
        let moved = vram(&compositor);
        let bios = compositor.controller().hardware();
        assert_eq!(bios.vram_pixel(120, 120), bios.vram_pixel(155, 120));
        assert_eq!(bios.vram_pixel(105, 120), bgrx(COLOR_DESKTOP));
        assert!(moved == fully_redrawn(&mut compositor));
    }

    #[test]
    fn draw_single_is_repeatable_for_translucent_fill() {
        let mut compositor = shown();
        let glass = Drawable::fill(Rectangle::from_size(200, 200, 40, 40), TRANSLUCENT_RED);
        let id = compositor.add_element(None, glass.into()).expect("added");
        let once = vram(&compositor);

        assert!(compositor.draw_single(id, Rectangle::screen()));
        assert!(compositor.draw_single(id, Rectangle::from_size(210, 210, 5, 5)));
        assert!(vram(&compositor) == once);
    }

    #[test]
    fn draw_single_clips_to_ancestors() {
        let mut compositor = shown();
        let parent = compositor
            .add_element(None, Container::new(Rectangle::new(0, 0, 50, 50)).into())
            .expect("added");
        let child = compositor
            .add_element(
                Some(parent),
                Drawable::fill(Rectangle::new(40, 40, 80, 80), RED).into(),
            )
            .expect("container accepts children");

        assert!(compositor.draw_single(child, Rectangle::screen()));
        let bios = compositor.controller().hardware();
        assert_eq!(bios.vram_pixel(45, 45), bgrx(RED));
        assert_eq!(bios.vram_pixel(60, 60), bgrx(COLOR_DESKTOP));
    }

    #[test]
    fn draw_single_keeps_window_title_bar() {
        let mut compositor = shown();
        let id = compositor.add_window(Rectangle::from_size(100, 100, 200, 100), "w");
        let spill = Drawable::fill(Rectangle::from_size(100, 100, 50, 50), RED);
        let leaf = compositor
            .add_element(Some(id), spill.into())
            .expect("window accepts children");
        let before = vram(&compositor);

        assert!(compositor.draw_single(leaf, Rectangle::screen()));
        assert!(vram(&compositor) == before);
        let bar = window(&compositor, id).title_bar();
        assert_ne!(
            compositor
                .controller()
                .hardware()
                .vram_pixel(bar.x1 as usize + 1, bar.y1 as usize + 1),
            bgrx(RED)
        );
    }

    #[test]
    fn moved_element_stays_under_later_window() {
        let mut compositor = shown();
        let fill = Drawable::fill(Rectangle::new(100, 100, 150, 150), RED);
        let id = compositor.add_element(None, fill.into()).expect("added");
        compositor.add_window(Rectangle::from_size(120, 80, 200, 200), "cover");

        assert!(compositor.move_element(id, 8, 0));
        let moved = vram(&compositor);
        assert_eq!(
            compositor.controller().hardware().vram_pixel(140, 130),
            bgrx(COLOR_WINDOW_BG)
        );
        assert_eq!(compositor.controller().hardware().vram_pixel(110, 130), bgrx(RED));
        assert!(moved == fully_redrawn(&mut compositor));
    }

    #[test]
    fn difference_is_restored_without_the_element() {
        let mut compositor = shown();
        let fill = Drawable::fill(Rectangle::from_size(300, 300, 20, 20), RED);
        let id = compositor.add_element(None, fill.into()).expect("added");

        let nothing = Rectangle::new(0, 0, 0, 0);
        let footprint = Rectangle::from_size(300, 300, 20, 20);
        assert!(compositor.draw_single_with_difference(id, nothing, footprint));
        assert_eq!(
            compositor.controller().hardware().vram_pixel(310, 310),
            bgrx(COLOR_DESKTOP)
        );

        assert!(compositor.draw_single(id, footprint));
        assert_eq!(compositor.controller().hardware().vram_pixel(310, 310), bgrx(RED));
    }

    #[test]
    fn desktop_cannot_be_moved() {
        let mut compositor = shown();
        let root = compositor.root_id();
        assert!(!compositor.move_element(root, 10, 10));
        assert_eq!(compositor.root().bounds(), Rectangle::screen());
    }

    #[test]
    fn later_sibling_covers_earlier() {
        let mut compositor = shown();
        let blue = Color32::rgb(0, 0, 0xFF);
        compositor.add_element(None, Drawable::fill(Rectangle::new(0, 0, 40, 40), RED).into());
        let top = compositor
            .add_element(None, Drawable::fill(Rectangle::new(20, 20, 60, 60), blue).into())
            .expect("added");
        let bios = compositor.controller().hardware();
        assert_eq!(bios.vram_pixel(30, 30), bgrx(blue));
        assert_eq!(bios.vram_pixel(10, 10), bgrx(RED));
        assert_eq!(compositor.get_element_at_position(30, 30), Some(top));
    }

    #[test]
    fn children_are_clipped_to_parent() {
        let mut compositor = shown();
        let parent = compositor
            .add_element(None, Container::new(Rectangle::new(0, 0, 50, 50)).into())
            .expect("added");
        let child = Drawable::fill(Rectangle::new(40, 40, 80, 80), RED);
        compositor
            .add_element(Some(parent), child.into())
            .expect("container accepts children");
        let bios = compositor.controller().hardware();
        assert_eq!(bios.vram_pixel(45, 45), bgrx(RED));
        assert_eq!(bios.vram_pixel(60, 60), bgrx(COLOR_DESKTOP));
    }

    #[test]
    fn leaf_cannot_be_a_parent() {
        let mut compositor = shown();
        let leaf = compositor
            .add_element(None, Drawable::fill(Rectangle::new(0, 0, 10, 10), RED).into())
            .expect("added");
        let child = Drawable::fill(Rectangle::new(0, 0, 5, 5), RED).into();
        assert_eq!(compositor.add_element(Some(leaf), child), None);
    }

    #[test]
    fn draw_single_unknown_element() {
        let mut compositor = shown();
        let stray = Drawable::fill(Rectangle::new(0, 0, 5, 5), RED);
        assert!(!compositor.draw_single(stray.id(), Rectangle::screen()));
        assert!(!compositor.draw_single_with_difference(
            stray.id(),
            Rectangle::screen(),
            Rectangle::screen()
        ));
    }

    #[test]
    fn key_without_focus_changes_nothing() {
        let mut compositor = shown();
        let id = compositor.add_window(Rectangle::from_size(100, 100, 300, 200), "idle");
        let before = compositor.controller().hardware().vram.clone();

        compositor.key(b'a' as u32, false);
        compositor.key(KKC_ALT, false);
        compositor.key(KKC_RIGHT, false);
        compositor.present();

        assert!(!compositor.has_pending_damage());
        assert!(compositor.controller().hardware().vram == before);
        assert!(typed_chars(&compositor, id).is_empty());
        assert_eq!(
            window(&compositor, id).bounds(),
            Rectangle::from_size(100, 100, 300, 200)
        );
    }

    #[test]
    fn typing_follows_shift_and_capslock() {
        let mut compositor = shown();
        let id = compositor.add_window(Rectangle::from_size(100, 100, 300, 200), "editor");
        assert!(compositor.focus(Some(id)));

        compositor.key(b'a' as u32, false);
        compositor.key(KKC_SHIFT, false);
        compositor.key(b'b' as u32, false);
        compositor.key(b'1' as u32, false);
        compositor.key(KKC_SHIFT | KKC_RELEASED, false);
        compositor.key(b'c' as u32, true);
        compositor.key(b'2' as u32, true);

        assert_eq!(typed_chars(&compositor, id), b"aB!C2".to_vec());
        assert_eq!(window(&compositor, id).cursor(), (5, 0));

        compositor.key(KKC_BACKSPACE, false);
        assert_eq!(typed_chars(&compositor, id), b"aB!C".to_vec());
        compositor.key(KKC_ENTER, false);
        assert_eq!(window(&compositor, id).cursor(), (0, 1));
    }

    #[test]
    fn typed_text_reaches_screen_on_present() {
        let mut compositor = shown();
        let id = compositor.add_window(Rectangle::from_size(100, 100, 300, 200), "editor");
        compositor.focus(Some(id));
        compositor.present();

        let client = window(&compositor, id).client_area();
        let cell = Rectangle::from_size(client.x1, client.y1, 8, 16);

        compositor.key(b'w' as u32, false);
        assert!(compositor.has_pending_damage());
        assert!(!cell_has_text(&compositor, cell));

        compositor.present();
        assert!(!compositor.has_pending_damage());
        assert!(cell_has_text(&compositor, cell));
    }

    #[test]
    fn alt_arrows_drag_and_escape_restores() {
        let mut compositor = shown();
        let id = compositor.add_window(Rectangle::from_size(100, 100, 200, 100), "drag");
        compositor.focus(Some(id));

        compositor.key(KKC_RIGHT, false);
        assert_eq!(window(&compositor, id).bounds().x1, 100);

        compositor.key(KKC_ALT, false);
        compositor.key(KKC_RIGHT, false);
        compositor.key(KKC_DOWN, false);
        assert_eq!(
            window(&compositor, id).bounds(),
            Rectangle::from_size(100 + DRAG_STEP, 100 + DRAG_STEP, 200, 100)
        );

        compositor.key(KKC_ESC, false);
        assert!(!window(&compositor, id).is_dragging());
        assert_eq!(
            window(&compositor, id).bounds(),
            Rectangle::from_size(100, 100, 200, 100)
        );
        compositor.key(KKC_ALT | KKC_RELEASED, false);

        compositor.present();
        let vacated_x = (300 + DRAG_STEP - 1) as usize;
        assert_eq!(
            compositor.controller().hardware().vram_pixel(vacated_x, 150),
            bgrx(COLOR_DESKTOP)
        );
    }

    #[test]
    fn alt_release_keeps_position() {
        let mut compositor = shown();
        let id = compositor.add_window(Rectangle::from_size(100, 100, 200, 100), "drag");
        compositor.focus(Some(id));

        compositor.key(KKC_ALT, false);
        compositor.key(KKC_LEFT, false);
        compositor.key(KKC_ALT | KKC_RELEASED, false);
        compositor.key(KKC_ESC, false);

        assert!(!window(&compositor, id).is_dragging());
        assert_eq!(window(&compositor, id).bounds().x1, 100 - DRAG_STEP);
    }

    #[test]
    fn tab_cycles_top_level_windows() {
        let mut compositor = shown();
        let a = compositor.add_window(Rectangle::from_size(10, 10, 100, 100), "a");
        compositor.add_text(0, 40, b'x');
        let b = compositor.add_window(Rectangle::from_size(300, 10, 100, 100), "b");

        compositor.key(KKC_TAB, false);
        assert_eq!(compositor.focused(), None);

        compositor.focus(Some(a));
        compositor.key(KKC_TAB, false);
        assert_eq!(compositor.focused(), Some(b));
        assert!(window(&compositor, b).is_focused());
        assert!(!window(&compositor, a).is_focused());

        compositor.key(KKC_TAB, false);
        assert_eq!(compositor.focused(), Some(a));
    }

    #[test]
    fn focus_rejects_non_windows() {
        let mut compositor = shown();
        let leaf = compositor
            .add_element(None, Drawable::fill(Rectangle::new(0, 0, 10, 10), RED).into())
            .expect("added");
        assert!(!compositor.focus(Some(leaf)));
        assert_eq!(compositor.focused(), None);
    }

    #[test]
    fn focus_at_picks_window_under_point() {
        let mut compositor = shown();
        let back = compositor.add_window(Rectangle::from_size(100, 100, 200, 200), "back");
        let front = compositor.add_window(Rectangle::from_size(150, 150, 200, 200), "front");

        assert_eq!(compositor.focus_at(160, 160), Some(front));
        assert_eq!(compositor.focused(), Some(front));
        assert_eq!(compositor.the_mouse(), Some(front));

        assert_eq!(compositor.focus_at(110, 110), Some(back));
        assert_eq!(compositor.focused(), Some(back));

        assert_eq!(compositor.focus_at(5, 5), None);
        assert_eq!(compositor.focused(), None);
        assert_eq!(compositor.the_mouse(), Some(compositor.root_id()));
    }

    #[test]
    fn removing_window_clears_focus_and_pointer() {
        let mut compositor = shown();
        let id = compositor.add_window(Rectangle::from_size(100, 100, 200, 200), "doomed");
        compositor.focus_at(150, 150);
        assert_eq!(compositor.focused(), Some(id));

        let removed = compositor.remove_element(id).expect("window was attached");
        assert_eq!(removed.id(), id);
        assert_eq!(compositor.focused(), None);
        assert_eq!(compositor.the_mouse(), None);
        assert!(compositor.element(id).is_none());
        assert_eq!(
            compositor.controller().hardware().vram_pixel(150, 150),
            bgrx(COLOR_DESKTOP)
        );

        compositor.present();
        compositor.key(b'q' as u32, false);
        assert!(!compositor.has_pending_damage());
    }

    static DOWNS: AtomicU32 = AtomicU32::new(0);
    static UPS: AtomicU32 = AtomicU32::new(0);

    struct CountingHooks;

    impl KeyHooks for CountingHooks {
        fn key_down(&mut self, _kkc: u32, _capslock: bool) {
            DOWNS.fetch_add(1, Ordering::Relaxed);
        }

        fn key_up(&mut self, kkc: u32, _capslock: bool) {
            assert!(kkc_is_release(kkc));
            UPS.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn hooks_see_keys_even_without_focus() {
        let mut compositor = Compositor::new(FakeBios::standard());
        compositor.set_key_hooks(Some(Box::new(CountingHooks)));

        compositor.key(KKC_NONE, false);
        compositor.key(b'a' as u32, false);
        compositor.key(b'a' as u32 | KKC_RELEASED, false);
        compositor.key(KKC_SHIFT, false);

        assert_eq!(DOWNS.load(Ordering::Relaxed), 2);
        assert_eq!(UPS.load(Ordering::Relaxed), 1);
        assert!(compositor.modifiers().shift);
    }

    #[test]
    fn add_text_places_glyph_and_advances_cursor() {
        let mut compositor = shown();
        let id = compositor.add_text(2, 1, b'X');
        assert_eq!(compositor.text_cursor(), 3);

        let cell = glyph_cell(2, 1);
        assert_eq!(compositor.element(id).map(Element::bounds), Some(cell));
        assert!(cell_has_text(&compositor, cell));
    }

    #[test]
    fn hidden_compositor_draws_offscreen_only() {
        let mut compositor = shown();
        compositor.hide();
        assert_eq!(compositor.display_mode(), DisplayMode::Text);

        let id = compositor
            .add_element(None, Drawable::fill(Rectangle::new(0, 0, 10, 10), RED).into())
            .expect("added");
        assert_eq!(
            compositor.controller().hardware().vram_pixel(5, 5),
            bgrx(COLOR_DESKTOP)
        );
        assert_eq!(compositor.surface().pixel(5, 5), Some(RED.to_rgba_group()));

        compositor.show().expect("shown again");
        assert_eq!(compositor.controller().hardware().vram_pixel(5, 5), bgrx(RED));
        assert!(compositor.element(id).is_some());
    }
}
