/// Bounding box in pixel coordinates with format conversion utilities.
///
/// Three formats appear at the crate boundaries:
/// - TLWH: top-left x, top-left y, width, height (internal storage)
/// - TLBR: top-left x, top-left y, bottom-right x, bottom-right y (detector output)
/// - XYAH: center x, center y, aspect ratio (w/h), height (motion state)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Top-left x coordinate
    pub x: f32,
    /// Top-left y coordinate
    pub y: f32,
    /// Width of the bounding box
    pub width: f32,
    /// Height of the bounding box
    pub height: f32,
}

impl Rect {
    /// Create a new Rect in TLWH format.
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a Rect from TLBR corners.
    #[inline]
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }

    /// Create a Rect from XYAH (center x, center y, aspect ratio, height).
    #[inline]
    pub fn from_xyah(cx: f32, cy: f32, aspect_ratio: f32, height: f32) -> Self {
        let width = aspect_ratio * height;
        Self {
            x: cx - width / 2.0,
            y: cy - height / 2.0,
            width,
            height,
        }
    }

    /// Convert to TLBR: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    /// Convert to TLWH: (x, y, width, height).
    #[inline]
    pub fn to_tlwh(&self) -> [f32; 4] {
        [self.x, self.y, self.width, self.height]
    }

    /// Convert to XYAH: (center x, center y, aspect ratio, height).
    #[inline]
    pub fn to_xyah(&self) -> [f32; 4] {
        let cx = self.x + self.width / 2.0;
        let cy = self.y + self.height / 2.0;
        let aspect_ratio = if self.height > 0.0 {
            self.width / self.height
        } else {
            0.0
        };
        [cx, cy, aspect_ratio, self.height]
    }

    /// Center point of the box.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Area of the box.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Diagonal length of the box.
    #[inline]
    pub fn diagonal(&self) -> f32 {
        (self.width * self.width + self.height * self.height).sqrt()
    }

    /// Euclidean distance between the centers of two boxes.
    #[inline]
    pub fn center_distance(&self, other: &Rect) -> f32 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }

    /// True for a box with finite coordinates and positive area.
    ///
    /// Detections failing this never enter the cost matrix.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Intersection over Union with another box.
    pub fn iou(&self, other: &Rect) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        let inter_width = (x2 - x1).max(0.0);
        let inter_height = (y2 - y1).max(0.0);
        let inter_area = inter_width * inter_height;

        let union_area = self.area() + other.area() - inter_area;

        if union_area > 0.0 {
            inter_area / union_area
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_conversions() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);

        assert_eq!(rect.to_tlwh(), [10.0, 20.0, 30.0, 40.0]);
        assert_eq!(rect.to_tlbr(), [10.0, 20.0, 40.0, 60.0]);

        let xyah = rect.to_xyah();
        assert_eq!(xyah[0], 25.0); // cx
        assert_eq!(xyah[1], 40.0); // cy
        assert!((xyah[2] - 0.75).abs() < 1e-6); // aspect ratio = 30/40
        assert_eq!(xyah[3], 40.0); // height
    }

    #[test]
    fn test_from_tlbr() {
        let rect = Rect::from_tlbr(10.0, 20.0, 40.0, 60.0);
        assert_eq!(rect.to_tlwh(), [10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_from_xyah() {
        let rect = Rect::from_xyah(25.0, 40.0, 0.75, 40.0);
        assert!((rect.x - 10.0).abs() < 1e-6);
        assert!((rect.y - 20.0).abs() < 1e-6);
        assert!((rect.width - 30.0).abs() < 1e-6);
        assert!((rect.height - 40.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);

        // Intersection: 5x5 = 25, union: 100 + 100 - 25 = 175
        let iou = a.iou(&b);
        assert!((iou - 25.0 / 175.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_no_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 20.0, 10.0, 10.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_center_distance() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(30.0, 40.0, 10.0, 10.0);
        assert!((a.center_distance(&b) - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_validity() {
        assert!(Rect::new(0.0, 0.0, 10.0, 10.0).is_valid());
        assert!(!Rect::new(0.0, 0.0, 0.0, 10.0).is_valid());
        assert!(!Rect::new(0.0, 0.0, -5.0, 10.0).is_valid());
        assert!(!Rect::new(f32::NAN, 0.0, 10.0, 10.0).is_valid());
        assert!(!Rect::new(0.0, f32::INFINITY, 10.0, 10.0).is_valid());
    }
}
