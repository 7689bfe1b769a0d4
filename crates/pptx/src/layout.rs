//! Slide geometry in EMU (English Metric Units, 914400 per inch).

/// 10 in x 7.5 in.
pub const SLIDE_WIDTH: i64 = 9_144_000;
pub const SLIDE_HEIGHT: i64 = 6_858_000;

const MARGIN_X: i64 = 457_200;
const CONTENT_WIDTH: i64 = SLIDE_WIDTH - 2 * MARGIN_X;
const BOTTOM_MARGIN: i64 = 228_600;
const PICTURE_GAP: i64 = 91_440;

/// Share of the slide width taken by the picture frame, in percent.
const PICTURE_WIDTH_PERCENT: i64 = 70;

/// Position and size of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Frame {
    pub const fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx, cy }
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.cy
    }
}

pub const TITLE_FRAME: Frame = Frame::new(MARGIN_X, 274_638, CONTENT_WIDTH, 1_143_000);
pub const BODY_FRAME: Frame = Frame::new(MARGIN_X, 1_600_200, CONTENT_WIDTH, 4_525_963);

/// Body region when a picture shares the slide.
pub const BODY_FRAME_WITH_PICTURE: Frame = Frame::new(MARGIN_X, 1_600_200, CONTENT_WIDTH, 1_828_800);

/// The fixed box a picture is fitted into: centered, below the text.
pub fn picture_box() -> Frame {
    let cx = SLIDE_WIDTH * PICTURE_WIDTH_PERCENT / 100;
    let y = BODY_FRAME_WITH_PICTURE.bottom() + PICTURE_GAP;
    Frame::new((SLIDE_WIDTH - cx) / 2, y, cx, SLIDE_HEIGHT - y - BOTTOM_MARGIN)
}

/// Fit a picture of the given pixel size into the picture box, keeping its
/// aspect ratio and centering it horizontally. Unknown sizes fill the box.
pub fn fit_picture(pixels: Option<(u32, u32)>) -> Frame {
    let bounds = picture_box();
    let Some((w, h)) = pixels.filter(|(w, h)| *w > 0 && *h > 0) else {
        return bounds;
    };

    let (w, h) = (i64::from(w), i64::from(h));
    // Compare w/h against box aspect without floating point.
    let (cx, cy) = if w * bounds.cy >= h * bounds.cx {
        (bounds.cx, bounds.cx * h / w)
    } else {
        (bounds.cy * w / h, bounds.cy)
    };

    Frame::new((SLIDE_WIDTH - cx) / 2, bounds.y, cx, cy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picture_box_is_centered_below_text() {
        let frame = picture_box();
        assert_eq!(frame.cx, 6_400_800);
        assert_eq!(frame.x, (SLIDE_WIDTH - frame.cx) / 2);
        assert!(frame.y > BODY_FRAME_WITH_PICTURE.bottom());
        assert!(frame.bottom() <= SLIDE_HEIGHT);
    }

    #[test]
    fn test_fit_wide_picture() {
        let frame = fit_picture(Some((1600, 400)));
        let bounds = picture_box();
        assert_eq!(frame.cx, bounds.cx);
        assert_eq!(frame.cy, bounds.cx / 4);
        assert_eq!(frame.x, bounds.x);
    }

    #[test]
    fn test_fit_tall_picture() {
        let frame = fit_picture(Some((300, 900)));
        let bounds = picture_box();
        assert_eq!(frame.cy, bounds.cy);
        assert_eq!(frame.cx, bounds.cy / 3);
        assert_eq!(frame.x, (SLIDE_WIDTH - frame.cx) / 2);
        assert!(frame.x > bounds.x);
    }

    #[test]
    fn test_fit_unknown_size_fills_box() {
        assert_eq!(fit_picture(None), picture_box());
        assert_eq!(fit_picture(Some((0, 10))), picture_box());
    }
}
