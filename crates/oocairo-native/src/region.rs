//! Integer regions.
//!
//! A region is kept as a list of non-overlapping rectangles grouped in
//! horizontal bands: sorted by `y`, then by `x`, with horizontally adjacent
//! rectangles merged and vertically adjacent bands with identical spans
//! coalesced. The representation is canonical, so equal areas always yield
//! the same rectangle list in the same order.

use crate::cairo::{NativePtr, Resource};
use crate::{Cairo, RectangleInt, RegionOverlap, Status};

#[derive(Debug, Clone, Default)]
pub(crate) struct RegionData {
    pub status: Status,
    pub rects: Vec<RectangleInt>,
}

impl Resource for RegionData {
    fn status(&self) -> Status {
        self.status
    }
}

#[derive(Debug, Clone, Copy)]
enum SetOp {
    Intersect,
    Subtract,
    Union,
    Xor,
}

impl SetOp {
    fn keep(self, a: bool, b: bool) -> bool {
        match self {
            SetOp::Intersect => a && b,
            SetOp::Subtract => a && !b,
            SetOp::Union => a || b,
            SetOp::Xor => a != b,
        }
    }

    fn symbol(self, with_rectangle: bool) -> &'static str {
        match (self, with_rectangle) {
            (SetOp::Intersect, false) => "cairo_region_intersect",
            (SetOp::Intersect, true) => "cairo_region_intersect_rectangle",
            (SetOp::Subtract, false) => "cairo_region_subtract",
            (SetOp::Subtract, true) => "cairo_region_subtract_rectangle",
            (SetOp::Union, false) => "cairo_region_union",
            (SetOp::Union, true) => "cairo_region_union_rectangle",
            (SetOp::Xor, false) => "cairo_region_xor",
            (SetOp::Xor, true) => "cairo_region_xor_rectangle",
        }
    }
}

type Span = (i64, i64);

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Canonical rectangles covering the cells where `op` holds for membership
/// in `a` and `b`.
fn combine(a: &[RectangleInt], b: &[RectangleInt], op: SetOp) -> Vec<RectangleInt> {
    let all = || a.iter().chain(b).filter(|r| !r.is_empty());

    let mut ys: Vec<i64> = all().flat_map(|r| [i64::from(r.y), r.bottom()]).collect();
    ys.sort_unstable();
    ys.dedup();

    let mut bands: Vec<(i64, i64, Vec<Span>)> = Vec::new();
    for edge in ys.windows(2) {
        let (top, bottom) = (edge[0], edge[1]);
        let covers_band = |r: &&RectangleInt| i64::from(r.y) <= top && r.bottom() >= bottom;

        let mut xs: Vec<i64> = all()
            .filter(covers_band)
            .flat_map(|r| [i64::from(r.x), r.right()])
            .collect();
        xs.sort_unstable();
        xs.dedup();

        let inside = |set: &[RectangleInt], left: i64, right: i64| {
            set.iter()
                .filter(|r| !r.is_empty())
                .any(|r| covers_band(&r) && i64::from(r.x) <= left && r.right() >= right)
        };

        let mut spans: Vec<Span> = Vec::new();
        for cell in xs.windows(2) {
            let (left, right) = (cell[0], cell[1]);
            if !op.keep(inside(a, left, right), inside(b, left, right)) {
                continue;
            }
            match spans.last_mut() {
                Some(last) if last.1 == left => last.1 = right,
                _ => spans.push((left, right)),
            }
        }
        if spans.is_empty() {
            continue;
        }
        match bands.last_mut() {
            Some(last) if last.1 == top && last.2 == spans => last.1 = bottom,
            _ => bands.push((top, bottom, spans)),
        }
    }

    bands
        .into_iter()
        .flat_map(|(top, bottom, spans)| {
            spans.into_iter().map(move |(left, right)| {
                RectangleInt::new(
                    clamp_i32(left),
                    clamp_i32(top),
                    clamp_i32(right - left),
                    clamp_i32(bottom - top),
                )
            })
        })
        .collect()
}

fn area(rects: &[RectangleInt]) -> i64 {
    rects
        .iter()
        .map(|r| i64::from(r.width) * i64::from(r.height))
        .sum()
}

impl Cairo {
    pub fn region_create(&self) -> NativePtr {
        self.log("cairo_region_create");
        self.insert(RegionData::default())
    }

    pub fn region_create_rectangle(&self, rect: &RectangleInt) -> NativePtr {
        self.log("cairo_region_create_rectangle");
        self.insert(RegionData {
            status: Status::Success,
            rects: combine(std::slice::from_ref(rect), &[], SetOp::Union),
        })
    }

    pub fn region_create_rectangles(&self, rects: &[RectangleInt]) -> NativePtr {
        self.log("cairo_region_create_rectangles");
        self.insert(RegionData {
            status: Status::Success,
            rects: combine(rects, &[], SetOp::Union),
        })
    }

    pub fn region_copy(&self, region: NativePtr) -> NativePtr {
        self.log("cairo_region_copy");
        let data = self
            .with(region, |r: &RegionData| r.clone())
            .unwrap_or(RegionData {
                status: Status::NullPointer,
                rects: Vec::new(),
            });
        self.insert(data)
    }

    pub fn region_get_extents(&self, region: NativePtr) -> RectangleInt {
        self.log("cairo_region_get_extents");
        self.with(region, |r: &RegionData| {
            let Some(first) = r.rects.first() else {
                return RectangleInt::default();
            };
            let x1 = r.rects.iter().map(|r| i64::from(r.x)).min().unwrap_or(0);
            let x2 = r.rects.iter().map(RectangleInt::right).max().unwrap_or(0);
            let y1 = i64::from(first.y);
            let y2 = r.rects.iter().map(RectangleInt::bottom).max().unwrap_or(0);
            RectangleInt::new(clamp_i32(x1), clamp_i32(y1), clamp_i32(x2 - x1), clamp_i32(y2 - y1))
        })
        .unwrap_or_default()
    }

    pub fn region_num_rectangles(&self, region: NativePtr) -> usize {
        self.log("cairo_region_num_rectangles");
        self.with(region, |r: &RegionData| r.rects.len()).unwrap_or(0)
    }

    pub fn region_get_rectangle(&self, region: NativePtr, index: usize) -> Result<RectangleInt, Status> {
        self.log("cairo_region_get_rectangle");
        self.with(region, |r: &RegionData| r.rects.get(index).copied().ok_or(Status::InvalidIndex))
            .unwrap_or(Err(Status::NullPointer))
    }

    pub fn region_is_empty(&self, region: NativePtr) -> bool {
        self.log("cairo_region_is_empty");
        self.with(region, |r: &RegionData| r.rects.is_empty()).unwrap_or(true)
    }

    pub fn region_contains_point(&self, region: NativePtr, x: i32, y: i32) -> bool {
        self.log("cairo_region_contains_point");
        let (x, y) = (i64::from(x), i64::from(y));
        self.with(region, |r: &RegionData| {
            r.rects
                .iter()
                .any(|r| i64::from(r.x) <= x && x < r.right() && i64::from(r.y) <= y && y < r.bottom())
        })
        .unwrap_or(false)
    }

    pub fn region_contains_rectangle(&self, region: NativePtr, rect: &RectangleInt) -> RegionOverlap {
        self.log("cairo_region_contains_rectangle");
        if rect.is_empty() {
            return RegionOverlap::Out;
        }
        self.with(region, |r: &RegionData| {
            let overlap = area(&combine(&r.rects, std::slice::from_ref(rect), SetOp::Intersect));
            if overlap == 0 {
                RegionOverlap::Out
            } else if overlap == i64::from(rect.width) * i64::from(rect.height) {
                RegionOverlap::In
            } else {
                RegionOverlap::Part
            }
        })
        .unwrap_or(RegionOverlap::Out)
    }

    pub fn region_translate(&self, region: NativePtr, dx: i32, dy: i32) {
        self.log("cairo_region_translate");
        self.with_mut(region, |r: &mut RegionData, _| {
            for rect in &mut r.rects {
                rect.x = rect.x.saturating_add(dx);
                rect.y = rect.y.saturating_add(dy);
            }
        });
    }

    pub fn region_equal(&self, a: NativePtr, b: NativePtr) -> bool {
        self.log("cairo_region_equal");
        let Some(rects) = self.with(a, |r: &RegionData| r.rects.clone()) else {
            return false;
        };
        self.with(b, |r: &RegionData| r.rects == rects).unwrap_or(false)
    }

    pub fn region_intersect(&self, dst: NativePtr, other: NativePtr) -> Result<(), Status> {
        self.region_op(dst, Operand::Region(other), SetOp::Intersect)
    }

    pub fn region_intersect_rectangle(&self, dst: NativePtr, rect: &RectangleInt) -> Result<(), Status> {
        self.region_op(dst, Operand::Rectangle(*rect), SetOp::Intersect)
    }

    pub fn region_subtract(&self, dst: NativePtr, other: NativePtr) -> Result<(), Status> {
        self.region_op(dst, Operand::Region(other), SetOp::Subtract)
    }

    pub fn region_subtract_rectangle(&self, dst: NativePtr, rect: &RectangleInt) -> Result<(), Status> {
        self.region_op(dst, Operand::Rectangle(*rect), SetOp::Subtract)
    }

    pub fn region_union(&self, dst: NativePtr, other: NativePtr) -> Result<(), Status> {
        self.region_op(dst, Operand::Region(other), SetOp::Union)
    }

    pub fn region_union_rectangle(&self, dst: NativePtr, rect: &RectangleInt) -> Result<(), Status> {
        self.region_op(dst, Operand::Rectangle(*rect), SetOp::Union)
    }

    pub fn region_xor(&self, dst: NativePtr, other: NativePtr) -> Result<(), Status> {
        self.region_op(dst, Operand::Region(other), SetOp::Xor)
    }

    pub fn region_xor_rectangle(&self, dst: NativePtr, rect: &RectangleInt) -> Result<(), Status> {
        self.region_op(dst, Operand::Rectangle(*rect), SetOp::Xor)
    }

    fn region_op(&self, dst: NativePtr, operand: Operand, op: SetOp) -> Result<(), Status> {
        self.log(op.symbol(matches!(operand, Operand::Rectangle(_))));
        let other = match operand {
            Operand::Rectangle(rect) => Ok(vec![rect]),
            Operand::Region(other) => self
                .with(other, |r: &RegionData| r.status.into_result().map(|_| r.rects.clone()))
                .unwrap_or(Err(Status::NullPointer)),
        };
        self.with_mut(dst, |r: &mut RegionData, _| {
            r.status.into_result()?;
            match other {
                Ok(other) => {
                    r.rects = combine(&r.rects, &other, op);
                    Ok(())
                }
                Err(status) => {
                    r.status = status;
                    Err(status)
                }
            }
        })
        .unwrap_or(Err(Status::NullPointer))
    }
}

enum Operand {
    Region(NativePtr),
    Rectangle(RectangleInt),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rects(cairo: &Cairo, region: NativePtr) -> Vec<RectangleInt> {
        (0..cairo.region_num_rectangles(region))
            .map(|i| cairo.region_get_rectangle(region, i).unwrap())
            .collect()
    }

    #[test]
    fn test_disjoint_rectangles_preserved() {
        let cairo = Cairo::new();
        let input = [
            RectangleInt::new(0, 0, 10, 10),
            RectangleInt::new(20, 0, 10, 10),
            RectangleInt::new(0, 20, 10, 10),
        ];
        let region = cairo.region_create_rectangles(&input);
        assert_eq!(rects(&cairo, region), input.to_vec());
    }

    #[test]
    fn test_overlapping_rectangles_are_normalized() {
        let cairo = Cairo::new();
        let region = cairo.region_create_rectangles(&[RectangleInt::new(0, 0, 10, 10), RectangleInt::new(5, 0, 10, 10)]);
        assert_eq!(rects(&cairo, region), vec![RectangleInt::new(0, 0, 15, 10)]);
        assert_eq!(cairo.region_get_extents(region), RectangleInt::new(0, 0, 15, 10));
    }

    #[test]
    fn test_set_operations() {
        let cairo = Cairo::new();
        let a = cairo.region_create_rectangle(&RectangleInt::new(0, 0, 10, 10));
        let b = cairo.region_create_rectangle(&RectangleInt::new(5, 5, 10, 10));

        let i = cairo.region_copy(a);
        cairo.region_intersect(i, b).unwrap();
        assert_eq!(rects(&cairo, i), vec![RectangleInt::new(5, 5, 5, 5)]);

        let x = cairo.region_copy(a);
        cairo.region_xor(x, b).unwrap();
        assert_eq!(area(&rects(&cairo, x)), 100 + 100 - 2 * 25);

        let s = cairo.region_copy(a);
        cairo.region_subtract(s, a).unwrap();
        assert!(cairo.region_is_empty(s));
    }

    #[test]
    fn test_contains() {
        let cairo = Cairo::new();
        let region = cairo.region_create_rectangle(&RectangleInt::new(0, 0, 10, 10));
        assert!(cairo.region_contains_point(region, 9, 9));
        assert!(!cairo.region_contains_point(region, 10, 9));
        assert_eq!(cairo.region_contains_rectangle(region, &RectangleInt::new(2, 2, 3, 3)), RegionOverlap::In);
        assert_eq!(cairo.region_contains_rectangle(region, &RectangleInt::new(8, 8, 5, 5)), RegionOverlap::Part);
        assert_eq!(cairo.region_contains_rectangle(region, &RectangleInt::new(20, 20, 5, 5)), RegionOverlap::Out);
    }

    #[test]
    fn test_equal_after_translate() {
        let cairo = Cairo::new();
        let a = cairo.region_create_rectangle(&RectangleInt::new(0, 0, 4, 4));
        let b = cairo.region_create_rectangle(&RectangleInt::new(1, 1, 4, 4));
        assert!(!cairo.region_equal(a, b));
        cairo.region_translate(a, 1, 1);
        assert!(cairo.region_equal(a, b));
    }
}
