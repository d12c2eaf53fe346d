//! Left-to-right flow arrangement for variable-width items.
//! Items wrap onto a new row once the next one would overflow the container;
//! each row is as tall as its tallest item.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn expanded_to(self, other: Size) -> Size {
        Size::new(self.width.max(other.width), self.height.max(other.height))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Margins {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Margins {
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self { left, top, right, bottom }
    }
}

/// Something the flow layout can size and place.
pub trait LayoutItem {
    fn size_hint(&self) -> Size;
    fn set_geometry(&mut self, rect: Rect);
}

#[derive(Debug, Clone)]
pub struct FlowLayout<T> {
    items: Vec<T>,
    spacing: u32,
    margins: Margins,
}

impl<T: LayoutItem> FlowLayout<T> {
    pub fn new(spacing: u32, margins: Margins) -> Self {
        Self { items: Vec::new(), spacing, margins }
    }

    pub fn add(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_at(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn take_at(&mut self, index: usize) -> Option<T> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Remove every item, handing them back in order.
    pub fn clear(&mut self) -> Vec<T> {
        std::mem::take(&mut self.items)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn spacing(&self) -> u32 {
        self.spacing
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    /// Place every item inside `rect` and return the height consumed.
    pub fn set_geometry(&mut self, rect: Rect) -> u32 {
        let (height, placed) = self.arrange(rect);
        for (item, pos) in self.items.iter_mut().zip(placed) {
            item.set_geometry(pos);
        }
        height
    }

    /// Height needed at `width` without moving any item.
    pub fn height_for_width(&self, width: u32) -> u32 {
        self.arrange(Rect::new(0, 0, width, 0)).0
    }

    /// Largest item plus margins.
    pub fn minimum_size(&self) -> Size {
        let size = self
            .items
            .iter()
            .fold(Size::default(), |acc, item| acc.expanded_to(item.size_hint()));
        let m = self.margins;
        Size::new(size.width + m.left + m.right, size.height + m.top + m.bottom)
    }

    fn arrange(&self, rect: Rect) -> (u32, Vec<Rect>) {
        let m = self.margins;
        let left = rect.x + m.left;
        let right = (rect.x + rect.width).saturating_sub(m.right).max(left);
        let mut x = left;
        let mut y = rect.y + m.top;
        let mut line_height = 0;
        let mut placed = Vec::with_capacity(self.items.len());

        for item in &self.items {
            let hint = item.size_hint();
            if x + hint.width > right && line_height > 0 {
                x = left;
                y += line_height + self.spacing;
                line_height = 0;
            }
            placed.push(Rect::new(x, y, hint.width, hint.height));
            x += hint.width + self.spacing;
            line_height = line_height.max(hint.height);
        }

        (y + line_height - rect.y + m.bottom, placed)
    }
}
