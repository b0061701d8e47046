//! Preview panel for a bivariate color diagram.
//!
//! The panel only lays out and paints; the diagram itself comes from a
//! [`DiagramRenderer`].

use image::RgbaImage;

/// Produces the bivariate color diagram for a given size.
pub trait DiagramRenderer {
    fn diagram_image(&self, width: u32, height: u32) -> RgbaImage;
    fn has_horizontal_grid(&self) -> bool;
    fn has_vertical_grid(&self) -> bool;
}

/// Drawing surface the panel paints into.
pub trait Canvas {
    fn draw_image(&mut self, x: u32, y: u32, image: &RgbaImage);
    fn draw_centered_text(&mut self, text: &str, x: u32, y: u32);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Insets {
    pub top: u32,
    pub left: u32,
    pub bottom: u32,
    pub right: u32,
}

impl Insets {
    pub fn uniform(inset: u32) -> Self {
        Self {
            top: inset,
            left: inset,
            bottom: inset,
            right: inset,
        }
    }
}

pub struct BivariatePreview {
    width: u32,
    height: u32,
    insets: Insets,
    renderer: Option<Box<dyn DiagramRenderer>>,
    needs_repaint: bool,
}

impl BivariatePreview {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            insets: Insets::default(),
            renderer: None,
            needs_repaint: true,
        }
    }

    pub fn with_insets(mut self, insets: Insets) -> Self {
        self.insets = insets;
        self
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.needs_repaint = true;
    }

    pub fn set_renderer(&mut self, renderer: Option<Box<dyn DiagramRenderer>>) {
        self.renderer = renderer;
        self.needs_repaint = true;
    }

    pub fn needs_repaint(&self) -> bool {
        self.needs_repaint
    }

    /// Area left for the diagram once insets are taken out.
    pub fn inner_size(&self) -> (u32, u32) {
        let w = self
            .width
            .saturating_sub(self.insets.left.saturating_add(self.insets.right));
        let h = self
            .height
            .saturating_sub(self.insets.top.saturating_add(self.insets.bottom));
        (w, h)
    }

    pub fn paint(&mut self, canvas: &mut dyn Canvas) {
        self.needs_repaint = false;
        let Some(renderer) = self.renderer.as_deref() else {
            return;
        };
        let (w, h) = self.inner_size();
        if w == 0 || h == 0 {
            return;
        }
        let image = renderer.diagram_image(w, h);
        canvas.draw_image(self.insets.left, self.insets.top, &image);
    }

    pub fn warning_message(&self) -> Option<&'static str> {
        let Some(renderer) = self.renderer.as_deref() else {
            return Some("internal error");
        };
        match (renderer.has_horizontal_grid(), renderer.has_vertical_grid()) {
            (false, false) => Some("Select two grids."),
            (false, true) => Some("Horizontal grid missing."),
            (true, false) => Some("Vertical grid missing."),
            (true, true) => None,
        }
    }

    pub fn paint_warning(&self, canvas: &mut dyn Canvas) {
        if let Some(msg) = self.warning_message() {
            canvas.draw_centered_text(msg, self.width / 2, self.height / 2);
        }
    }
}

impl std::fmt::Debug for BivariatePreview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BivariatePreview")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("insets", &self.insets)
            .field("has_renderer", &self.renderer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    struct Flat {
        horizontal: bool,
        vertical: bool,
    }

    impl DiagramRenderer for Flat {
        fn diagram_image(&self, width: u32, height: u32) -> RgbaImage {
            RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]))
        }

        fn has_horizontal_grid(&self) -> bool {
            self.horizontal
        }

        fn has_vertical_grid(&self) -> bool {
            self.vertical
        }
    }

    #[derive(Default)]
    struct Recording {
        images: Vec<(u32, u32, u32, u32)>,
        texts: Vec<(String, u32, u32)>,
    }

    impl Canvas for Recording {
        fn draw_image(&mut self, x: u32, y: u32, image: &RgbaImage) {
            self.images.push((x, y, image.width(), image.height()));
        }

        fn draw_centered_text(&mut self, text: &str, x: u32, y: u32) {
            self.texts.push((text.to_string(), x, y));
        }
    }

    fn flat(horizontal: bool, vertical: bool) -> Option<Box<dyn DiagramRenderer>> {
        Some(Box::new(Flat {
            horizontal,
            vertical,
        }))
    }

    #[test]
    fn paints_diagram_inside_insets() {
        let mut preview = BivariatePreview::new(100, 80).with_insets(Insets {
            top: 5,
            left: 10,
            bottom: 15,
            right: 20,
        });
        preview.set_renderer(flat(true, true));

        let mut canvas = Recording::default();
        preview.paint(&mut canvas);
        assert_eq!(canvas.images, vec![(10, 5, 70, 60)]);
        assert!(!preview.needs_repaint());
    }

    #[test]
    fn skips_painting_without_room_or_renderer() {
        let mut canvas = Recording::default();

        let mut empty = BivariatePreview::new(100, 100);
        empty.paint(&mut canvas);

        let mut cramped = BivariatePreview::new(10, 10).with_insets(Insets::uniform(5));
        cramped.set_renderer(flat(true, true));
        cramped.paint(&mut canvas);

        assert!(canvas.images.is_empty());
    }

    #[test]
    fn set_renderer_requests_repaint() {
        let mut preview = BivariatePreview::new(10, 10);
        preview.paint(&mut Recording::default());
        assert!(!preview.needs_repaint());
        preview.set_renderer(flat(true, true));
        assert!(preview.needs_repaint());
    }

    #[test]
    fn oversized_insets_leave_no_room() {
        let preview = BivariatePreview::new(50, 50).with_insets(Insets {
            top: u32::MAX,
            left: u32::MAX,
            bottom: 1,
            right: 1,
        });
        assert_eq!(preview.inner_size(), (0, 0));
    }

    #[test]
    fn resize_requests_repaint_and_changes_inner_area() {
        let mut preview = BivariatePreview::new(10, 10).with_insets(Insets::uniform(2));
        preview.set_renderer(flat(true, true));
        preview.paint(&mut Recording::default());
        assert!(!preview.needs_repaint());

        preview.resize(30, 20);
        assert!(preview.needs_repaint());
        assert_eq!(preview.inner_size(), (26, 16));

        let mut canvas = Recording::default();
        preview.paint(&mut canvas);
        assert_eq!(canvas.images, vec![(2, 2, 26, 16)]);
    }

    #[test]
    fn warning_depends_on_missing_grids() {
        let mut preview = BivariatePreview::new(40, 20);
        assert_eq!(preview.warning_message(), Some("internal error"));

        let cases = [
            (false, false, Some("Select two grids.")),
            (false, true, Some("Horizontal grid missing.")),
            (true, false, Some("Vertical grid missing.")),
            (true, true, None),
        ];
        for (horizontal, vertical, expected) in cases {
            preview.set_renderer(flat(horizontal, vertical));
            assert_eq!(preview.warning_message(), expected);
        }
    }

    #[test]
    fn warning_is_centered() {
        let mut preview = BivariatePreview::new(40, 20);
        preview.set_renderer(flat(false, false));
        let mut canvas = Recording::default();
        preview.paint_warning(&mut canvas);
        assert_eq!(canvas.texts, vec![("Select two grids.".to_string(), 20, 10)]);
    }
}
