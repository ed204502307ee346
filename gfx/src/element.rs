//! The element tree: leaves, containers and windows.
//!
//! Ownership is a strict tree. Anything that needs to point back into the
//! tree (focus, pointer) holds an [`ElementId`] and looks the element up.

use alloc::string::String;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, Ordering};

use prism_abi::geometry::Rectangle;
use prism_abi::pixel::Color32;

use crate::glyph::{GLYPH_HEIGHT, GLYPH_WIDTH, draw_glyph, draw_text};
use crate::surface::PixelSurface;
use crate::theme::{
    BORDER_WIDTH, COLOR_BORDER, COLOR_TEXT, COLOR_TITLE_BAR, COLOR_TITLE_BAR_FOCUSED,
    COLOR_WINDOW_BG, TITLE_BAR_HEIGHT, TITLE_TEXT_INSET,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u32);

static NEXT_ELEMENT_ID: AtomicU32 = AtomicU32::new(1);

impl ElementId {
    /// Fresh id, unique for the life of the kernel.
    pub fn allocate() -> Self {
        Self(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// What a leaf draws inside its bounds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Visual {
    /// Solid or translucent fill.
    Fill(Color32),
    /// One glyph cell anchored at the top-left corner.
    Glyph {
        ch: u8,
        fg: Color32,
        bg: Option<Color32>,
    },
    /// Outline hugging the inside of the bounds.
    Frame { color: Color32, thickness: i32 },
}

fn paint_frame(
    surface: &mut PixelSurface,
    bounds: &Rectangle,
    thickness: i32,
    color: Color32,
    clip: &Rectangle,
) {
    let t = thickness.max(0);
    let edges = [
        Rectangle::new(bounds.x1, bounds.y1, bounds.x2, bounds.y1 + t),
        Rectangle::new(bounds.x1, bounds.y2 - t, bounds.x2, bounds.y2),
        Rectangle::new(bounds.x1, bounds.y1 + t, bounds.x1 + t, bounds.y2 - t),
        Rectangle::new(bounds.x2 - t, bounds.y1 + t, bounds.x2, bounds.y2 - t),
    ];
    for edge in edges {
        surface.blend_rect(&edge.intersection(clip), color);
    }
}

#[derive(Clone, Debug)]
pub struct Drawable {
    id: ElementId,
    bounds: Rectangle,
    visual: Visual,
}

impl Drawable {
    pub fn new(bounds: Rectangle, visual: Visual) -> Self {
        Self {
            id: ElementId::allocate(),
            bounds,
            visual,
        }
    }

    pub fn fill(bounds: Rectangle, color: Color32) -> Self {
        Self::new(bounds, Visual::Fill(color))
    }

    /// Glyph cell with its top-left corner at `(x, y)`.
    pub fn glyph(x: i32, y: i32, ch: u8, fg: Color32, bg: Option<Color32>) -> Self {
        Self::new(
            Rectangle::from_size(x, y, GLYPH_WIDTH, GLYPH_HEIGHT),
            Visual::Glyph { ch, fg, bg },
        )
    }

    pub fn frame(bounds: Rectangle, color: Color32, thickness: i32) -> Self {
        Self::new(bounds, Visual::Frame { color, thickness })
    }

    #[inline]
    pub fn id(&self) -> ElementId {
        self.id
    }

    #[inline]
    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    #[inline]
    pub fn visual(&self) -> Visual {
        self.visual
    }

    pub fn paint(&self, surface: &mut PixelSurface, target: &Rectangle) {
        let clip = target.bound().intersection(&self.bounds);
        if clip.is_empty() {
            return;
        }
        match self.visual {
            Visual::Fill(color) => surface.blend_rect(&clip, color),
            Visual::Glyph { ch, fg, bg } => {
                draw_glyph(surface, self.bounds.x1, self.bounds.y1, ch, fg, bg, &clip)
            }
            Visual::Frame { color, thickness } => {
                paint_frame(surface, &self.bounds, thickness, color, &clip)
            }
        }
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.bounds = self.bounds.translate(dx, dy);
    }
}

/// Ordered children painted first to last, so later children end up on top.
#[derive(Clone, Debug)]
pub struct Container {
    id: ElementId,
    bounds: Rectangle,
    background: Option<Color32>,
    children: Vec<Element>,
}

impl Container {
    pub fn new(bounds: Rectangle) -> Self {
        Self {
            id: ElementId::allocate(),
            bounds,
            background: None,
            children: Vec::new(),
        }
    }

    pub fn with_background(bounds: Rectangle, background: Color32) -> Self {
        Self {
            background: Some(background),
            ..Self::new(bounds)
        }
    }

    #[inline]
    pub fn id(&self) -> ElementId {
        self.id
    }

    #[inline]
    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    #[inline]
    pub fn background(&self) -> Option<Color32> {
        self.background
    }

    #[inline]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Append `child` on top of its siblings.
    pub fn push(&mut self, child: Element) -> ElementId {
        let id = child.id();
        self.children.push(child);
        id
    }

    pub fn paint(&self, surface: &mut PixelSurface, target: &Rectangle) {
        self.paint_skipping(surface, target, None);
    }

    /// Paint as [`paint`](Self::paint) does, leaving out the subtree rooted
    /// at `skip`.
    pub fn paint_without(&self, surface: &mut PixelSurface, target: &Rectangle, skip: ElementId) {
        self.paint_skipping(surface, target, Some(skip));
    }

    fn paint_skipping(
        &self,
        surface: &mut PixelSurface,
        target: &Rectangle,
        skip: Option<ElementId>,
    ) {
        let target = target.bound();
        if !self.bounds.overlaps_with(&target) {
            return;
        }
        let clip = target.intersection(&self.bounds);
        if clip.is_empty() {
            return;
        }
        self.paint_background(surface, &clip);
        self.paint_children(surface, &clip, skip);
    }

    fn paint_background(&self, surface: &mut PixelSurface, clip: &Rectangle) {
        if let Some(background) = self.background {
            surface.blend_rect(clip, background);
        }
    }

    fn paint_children(
        &self,
        surface: &mut PixelSurface,
        clip: &Rectangle,
        skip: Option<ElementId>,
    ) {
        for child in &self.children {
            if skip == Some(child.id()) {
                continue;
            }
            let child_clip = clip.intersection(&child.bounds());
            if child_clip.is_empty() {
                continue;
            }
            child.paint_skipping(surface, &child_clip, skip);
        }
    }

    /// Part of the screen where descendant `id` can show once every
    /// ancestor's clipping is applied. `None` if `id` is not below here.
    pub fn visible_area(&self, id: ElementId) -> Option<Rectangle> {
        self.visible_area_within(id, &self.bounds)
    }

    fn visible_area_within(&self, id: ElementId, clip: &Rectangle) -> Option<Rectangle> {
        self.children
            .iter()
            .find_map(|child| child.visible_area_within(id, clip))
    }

    /// Deepest element under `(x, y)`, trying the topmost child first.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<ElementId> {
        self.children
            .iter()
            .rev()
            .find_map(|child| child.hit_test(x, y))
            .or_else(|| self.bounds.has_point(x, y).then_some(self.id))
    }

    /// Descendant with `id`.
    pub fn find(&self, id: ElementId) -> Option<&Element> {
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        for child in &mut self.children {
            if let Some(found) = child.find_mut(id) {
                return Some(found);
            }
        }
        None
    }

    /// Detach the descendant with `id` together with its subtree.
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        if let Some(index) = self.children.iter().position(|child| child.id() == id) {
            return Some(self.children.remove(index));
        }
        self.children.iter_mut().find_map(|child| child.remove(id))
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.find(id).is_some()
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.bounds = self.bounds.translate(dx, dy);
        for child in &mut self.children {
            child.translate(dx, dy);
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DragState {
    /// Top-left corner when the drag started.
    pub origin_x: i32,
    pub origin_y: i32,
}

/// A decorated container that can take keyboard focus.
///
/// The window owns a text cursor over its client area. Typed characters are
/// ordinary glyph drawables pushed into the window, so they move and repaint
/// with it like any other child.
#[derive(Clone, Debug)]
pub struct Window {
    container: Container,
    title: String,
    focused: bool,
    drag: Option<DragState>,
    cursor_col: i32,
    cursor_row: i32,
    typed: Vec<ElementId>,
}

impl Window {
    pub fn new(bounds: Rectangle, title: &str) -> Self {
        Self {
            container: Container::with_background(bounds, COLOR_WINDOW_BG),
            title: String::from(title),
            focused: false,
            drag: None,
            cursor_col: 0,
            cursor_row: 0,
            typed: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> ElementId {
        self.container.id()
    }

    #[inline]
    pub fn bounds(&self) -> Rectangle {
        self.container.bounds()
    }

    #[inline]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[inline]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    #[inline]
    pub fn container(&self) -> &Container {
        &self.container
    }

    #[inline]
    pub fn container_mut(&mut self) -> &mut Container {
        &mut self.container
    }

    pub fn push(&mut self, child: Element) -> ElementId {
        self.container.push(child)
    }

    pub fn title_bar(&self) -> Rectangle {
        let b = self.bounds();
        Rectangle::new(
            b.x1 + BORDER_WIDTH,
            b.y1 + BORDER_WIDTH,
            b.x2 - BORDER_WIDTH,
            b.y1 + BORDER_WIDTH + TITLE_BAR_HEIGHT,
        )
    }

    /// Area below the title bar and inside the border.
    pub fn client_area(&self) -> Rectangle {
        let b = self.bounds();
        Rectangle::new(
            b.x1 + BORDER_WIDTH,
            b.y1 + BORDER_WIDTH + TITLE_BAR_HEIGHT,
            b.x2 - BORDER_WIDTH,
            b.y2 - BORDER_WIDTH,
        )
    }

    #[inline]
    pub fn text_columns(&self) -> i32 {
        self.client_area().width() / GLYPH_WIDTH
    }

    #[inline]
    pub fn text_rows(&self) -> i32 {
        self.client_area().height() / GLYPH_HEIGHT
    }

    /// `(column, row)` the next typed character lands in.
    #[inline]
    pub fn cursor(&self) -> (i32, i32) {
        (self.cursor_col, self.cursor_row)
    }

    #[inline]
    pub fn drag(&self) -> Option<DragState> {
        self.drag
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Start a drag unless one is already running.
    pub fn begin_drag(&mut self) {
        if self.drag.is_none() {
            let b = self.bounds();
            self.drag = Some(DragState {
                origin_x: b.x1,
                origin_y: b.y1,
            });
        }
    }

    /// Keep the current position. Returns whether a drag was running.
    pub fn end_drag(&mut self) -> bool {
        self.drag.take().is_some()
    }

    /// Stop dragging and return the offset back to where the drag began.
    pub fn cancel_drag(&mut self) -> Option<(i32, i32)> {
        let drag = self.drag.take()?;
        let b = self.bounds();
        Some((drag.origin_x - b.x1, drag.origin_y - b.y1))
    }

    /// Place `ch` at the cursor and advance it, wrapping at the right edge.
    /// Returns the painted cell, or `None` once the client area is full.
    pub fn type_char(&mut self, ch: u8, fg: Color32) -> Option<Rectangle> {
        let columns = self.text_columns();
        let rows = self.text_rows();
        if columns <= 0 || rows <= 0 {
            return None;
        }
        if self.cursor_col >= columns {
            self.cursor_col = 0;
            self.cursor_row += 1;
        }
        if self.cursor_row >= rows {
            self.cursor_row = rows;
            return None;
        }

        let client = self.client_area();
        let glyph = Drawable::glyph(
            client.x1 + self.cursor_col * GLYPH_WIDTH,
            client.y1 + self.cursor_row * GLYPH_HEIGHT,
            ch,
            fg,
            None,
        );
        let cell = glyph.bounds();
        let id = self.container.push(Element::Drawable(glyph));
        self.typed.push(id);
        self.cursor_col += 1;
        Some(cell)
    }

    /// Remove the most recently typed glyph and move the cursor onto its
    /// cell. Returns the vacated cell.
    pub fn backspace(&mut self) -> Option<Rectangle> {
        while let Some(id) = self.typed.pop() {
            // Glyphs can be removed from outside the window as well.
            let Some(removed) = self.container.remove(id) else {
                continue;
            };
            let cell = removed.bounds();
            let client = self.client_area();
            self.cursor_col = (cell.x1 - client.x1) / GLYPH_WIDTH;
            self.cursor_row = (cell.y1 - client.y1) / GLYPH_HEIGHT;
            return Some(cell);
        }
        None
    }

    /// Move the cursor to the start of the next row, if there is one.
    pub fn newline(&mut self) -> bool {
        if self.cursor_row + 1 >= self.text_rows() {
            return false;
        }
        self.cursor_col = 0;
        self.cursor_row += 1;
        true
    }

    pub fn paint(&self, surface: &mut PixelSurface, target: &Rectangle) {
        self.paint_skipping(surface, target, None);
    }

    fn paint_skipping(
        &self,
        surface: &mut PixelSurface,
        target: &Rectangle,
        skip: Option<ElementId>,
    ) {
        let target = target.bound();
        let bounds = self.bounds();
        if !bounds.overlaps_with(&target) {
            return;
        }
        let clip = target.intersection(&bounds);
        if clip.is_empty() {
            return;
        }

        self.container.paint_background(surface, &clip);

        let bar = self.title_bar();
        let bar_clip = bar.intersection(&clip);
        if !bar_clip.is_empty() {
            let bar_color = if self.focused {
                COLOR_TITLE_BAR_FOCUSED
            } else {
                COLOR_TITLE_BAR
            };
            surface.blend_rect(&bar_clip, bar_color);
            draw_text(
                surface,
                bar.x1 + TITLE_TEXT_INSET,
                bar.y1 + (bar.height() - GLYPH_HEIGHT) / 2,
                self.title.as_bytes(),
                COLOR_TEXT,
                &bar_clip,
            );
        }

        self.container
            .paint_children(surface, &self.client_area().intersection(&clip), skip);
        paint_frame(surface, &bounds, BORDER_WIDTH, COLOR_BORDER, &clip);
    }

    #[inline]
    pub fn hit_test(&self, x: i32, y: i32) -> Option<ElementId> {
        self.container.hit_test(x, y)
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.container.translate(dx, dy);
    }
}

#[derive(Clone, Debug)]
pub enum Element {
    Drawable(Drawable),
    Container(Container),
    Window(Window),
}

impl From<Drawable> for Element {
    fn from(drawable: Drawable) -> Self {
        Element::Drawable(drawable)
    }
}

impl From<Container> for Element {
    fn from(container: Container) -> Self {
        Element::Container(container)
    }
}

impl From<Window> for Element {
    fn from(window: Window) -> Self {
        Element::Window(window)
    }
}

impl Element {
    pub fn id(&self) -> ElementId {
        match self {
            Element::Drawable(d) => d.id(),
            Element::Container(c) => c.id(),
            Element::Window(w) => w.id(),
        }
    }

    /// Absolute screen rectangle.
    pub fn bounds(&self) -> Rectangle {
        match self {
            Element::Drawable(d) => d.bounds(),
            Element::Container(c) => c.bounds(),
            Element::Window(w) => w.bounds(),
        }
    }

    /// Paint the part of the element inside `target`.
    pub fn paint(&self, surface: &mut PixelSurface, target: &Rectangle) {
        self.paint_skipping(surface, target, None);
    }

    fn paint_skipping(
        &self,
        surface: &mut PixelSurface,
        target: &Rectangle,
        skip: Option<ElementId>,
    ) {
        match self {
            Element::Drawable(d) => d.paint(surface, target),
            Element::Container(c) => c.paint_skipping(surface, target, skip),
            Element::Window(w) => w.paint_skipping(surface, target, skip),
        }
    }

    fn visible_area_within(&self, id: ElementId, clip: &Rectangle) -> Option<Rectangle> {
        let own = clip.intersection(&self.bounds());
        if self.id() == id {
            return Some(own);
        }
        match self {
            Element::Drawable(_) => None,
            Element::Container(c) => c.visible_area_within(id, &own),
            Element::Window(w) => w
                .container()
                .visible_area_within(id, &own.intersection(&w.client_area())),
        }
    }

    pub fn hit_test(&self, x: i32, y: i32) -> Option<ElementId> {
        match self {
            Element::Drawable(d) => d.bounds().has_point(x, y).then_some(d.id()),
            Element::Container(c) => c.hit_test(x, y),
            Element::Window(w) => w.hit_test(x, y),
        }
    }

    /// This element or a descendant with `id`.
    pub fn find(&self, id: ElementId) -> Option<&Element> {
        if self.id() == id {
            return Some(self);
        }
        self.as_container()?.find(id)
    }

    pub fn find_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        if self.id() == id {
            return Some(self);
        }
        self.as_container_mut()?.find_mut(id)
    }

    /// Detach a descendant. The element never removes itself.
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        self.as_container_mut()?.remove(id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.find(id).is_some()
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        match self {
            Element::Drawable(d) => d.translate(dx, dy),
            Element::Container(c) => c.translate(dx, dy),
            Element::Window(w) => w.translate(dx, dy),
        }
    }

    /// The child list, for containers and windows.
    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Element::Drawable(_) => None,
            Element::Container(c) => Some(c),
            Element::Window(w) => Some(w.container()),
        }
    }

    pub fn as_container_mut(&mut self) -> Option<&mut Container> {
        match self {
            Element::Drawable(_) => None,
            Element::Container(c) => Some(c),
            Element::Window(w) => Some(w.container_mut()),
        }
    }

    pub fn as_window(&self) -> Option<&Window> {
        match self {
            Element::Window(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_window_mut(&mut self) -> Option<&mut Window> {
        match self {
            Element::Window(w) => Some(w),
            _ => None,
        }
    }
}
