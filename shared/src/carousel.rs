/// Direction of a carousel step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Previous,
    Next,
}

/// Bounded slide position over `len` result items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Carousel {
    index: usize,
    len: usize,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn can_go(&self, nav: Navigation) -> bool {
        match nav {
            Navigation::Previous => self.index > 0,
            Navigation::Next => self.index + 1 < self.len,
        }
    }

    /// Move one step. Returns the newly active index, or `None` when the
    /// carousel is already at that edge.
    pub fn navigate(&mut self, nav: Navigation) -> Option<usize> {
        if !self.can_go(nav) {
            return None;
        }
        self.index = match nav {
            Navigation::Previous => self.index - 1,
            Navigation::Next => self.index + 1,
        };
        Some(self.index)
    }

    /// Horizontal translation of the slide strip for a given slide width.
    pub fn offset_px(&self, slide_width: f64) -> f64 {
        -(self.index as f64) * slide_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previous_at_start_is_noop() {
        let mut c = Carousel::new(3);
        assert_eq!(c.navigate(Navigation::Previous), None);
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn next_at_end_is_noop() {
        let mut c = Carousel::new(3);
        assert_eq!(c.navigate(Navigation::Next), Some(1));
        assert_eq!(c.navigate(Navigation::Next), Some(2));
        assert_eq!(c.navigate(Navigation::Next), None);
        assert_eq!(c.index(), 2);
    }

    #[test]
    fn interior_moves_are_single_steps() {
        let mut c = Carousel::new(5);
        c.navigate(Navigation::Next);
        c.navigate(Navigation::Next);
        assert_eq!(c.navigate(Navigation::Previous), Some(1));
        assert_eq!(c.navigate(Navigation::Next), Some(2));
    }

    #[test]
    fn empty_and_single_item_never_move() {
        let mut empty = Carousel::new(0);
        assert!(empty.is_empty());
        assert_eq!(empty.navigate(Navigation::Next), None);
        assert_eq!(empty.navigate(Navigation::Previous), None);

        let mut one = Carousel::new(1);
        assert_eq!(one.navigate(Navigation::Next), None);
        assert!(!one.can_go(Navigation::Previous));
    }

    #[test]
    fn offset_tracks_index() {
        let mut c = Carousel::new(4);
        assert_eq!(c.offset_px(320.0), 0.0);
        c.navigate(Navigation::Next);
        c.navigate(Navigation::Next);
        assert_eq!(c.offset_px(320.0), -640.0);
    }
}
