//! Iso-contour extraction by marching squares.
//!
//! Every 2x2 cell of the grid is classified by which of its corners lie above
//! the level, giving one of 16 cases. Each case emits zero, one or two
//! segments whose end points are linearly interpolated along the cell edges.
//! Segments sharing end points are then chained into polylines. Saddle cells
//! (cases 6 and 9) keep the low-valued corners connected.

use std::collections::{HashMap, VecDeque};

use super::morphology::BinaryMask;

/// Sub-pixel `(row, col)` coordinate.
pub type Point = (f64, f64);

type PointKey = (u64, u64);

/// Ordered polyline along an iso-level.
///
/// A closed contour repeats its first point as its last one.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<Point>,
}

impl Contour {
    /// Number of vertices, used as the contour's length.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.points.len() > 2 && self.points.first() == self.points.last()
    }
}

/// Traces contours of a boolean mask, reading foreground as `1.0`.
pub fn find_mask_contours(mask: &BinaryMask, level: f64) -> Vec<Contour> {
    find_contours(&mask.to_f64(), mask.width(), mask.height(), level)
}

/// Traces the `level` iso-lines of a row-major scalar grid.
///
/// Contours are returned in the order their first segment was found. Grids
/// narrower or shorter than two samples, or whose `values` do not match the
/// given size, have no cells and yield nothing.
pub fn find_contours(values: &[f64], width: usize, height: usize, level: f64) -> Vec<Contour> {
    if width < 2 || height < 2 || values.len() != width * height {
        return Vec::new();
    }
    let segments = cell_segments(values, width, height, level);
    assemble_contours(segments)
}

fn fraction(from: f64, to: f64, level: f64) -> f64 {
    if to == from {
        return 0.0;
    }
    (level - from) / (to - from)
}

fn cell_segments(values: &[f64], width: usize, height: usize, level: f64) -> Vec<(Point, Point)> {
    let mut segments = Vec::new();

    for r0 in 0..height - 1 {
        for c0 in 0..width - 1 {
            let ul = values[r0 * width + c0];
            let ur = values[r0 * width + c0 + 1];
            let ll = values[(r0 + 1) * width + c0];
            let lr = values[(r0 + 1) * width + c0 + 1];

            let mut case = 0u8;
            if ul > level {
                case |= 1;
            }
            if ur > level {
                case |= 2;
            }
            if ll > level {
                case |= 4;
            }
            if lr > level {
                case |= 8;
            }
            if case == 0 || case == 15 {
                continue;
            }

            let (r, c) = (r0 as f64, c0 as f64);
            let top = (r, c + fraction(ul, ur, level));
            let bottom = (r + 1.0, c + fraction(ll, lr, level));
            let left = (r + fraction(ul, ll, level), c);
            let right = (r + fraction(ur, lr, level), c + 1.0);

            match case {
                1 => segments.push((top, left)),
                2 => segments.push((right, top)),
                3 => segments.push((right, left)),
                4 => segments.push((left, bottom)),
                5 => segments.push((top, bottom)),
                6 => {
                    segments.push((right, top));
                    segments.push((left, bottom));
                }
                7 => segments.push((right, bottom)),
                8 => segments.push((bottom, right)),
                9 => {
                    segments.push((top, left));
                    segments.push((bottom, right));
                }
                10 => segments.push((bottom, top)),
                11 => segments.push((bottom, left)),
                12 => segments.push((left, right)),
                13 => segments.push((top, right)),
                14 => segments.push((left, top)),
                _ => {}
            }
        }
    }

    segments
}

// Neighbouring cells compute shared points with identical arithmetic, so the
// bit patterns match exactly.
fn key(p: Point) -> PointKey {
    (p.0.to_bits(), p.1.to_bits())
}

fn assemble_contours(segments: Vec<(Point, Point)>) -> Vec<Contour> {
    let mut contours: Vec<Option<VecDeque<Point>>> = Vec::new();
    let mut starts: HashMap<PointKey, usize> = HashMap::new();
    let mut ends: HashMap<PointKey, usize> = HashMap::new();

    for (from, to) in segments {
        if key(from) == key(to) {
            continue;
        }

        // A contour starting where this segment ends, and one ending where it starts.
        let tail = starts.remove(&key(to));
        let head = ends.remove(&key(from));

        match (tail, head) {
            (Some(t), Some(h)) if t == h => {
                if let Some(contour) = contours[h].as_mut() {
                    contour.push_back(to);
                }
            }
            (Some(t), Some(h)) => {
                // Merge into whichever contour was started first.
                if t > h {
                    let Some(tail_points) = contours[t].take() else {
                        continue;
                    };
                    if let Some(head_contour) = contours[h].as_mut() {
                        head_contour.extend(tail_points);
                        if let Some(&last) = head_contour.back() {
                            ends.insert(key(last), h);
                        }
                    }
                } else {
                    let Some(head_points) = contours[h].take() else {
                        continue;
                    };
                    if let Some(&first) = head_points.front() {
                        starts.remove(&key(first));
                    }
                    if let Some(tail_contour) = contours[t].as_mut() {
                        for p in head_points.into_iter().rev() {
                            tail_contour.push_front(p);
                        }
                        if let Some(&first) = tail_contour.front() {
                            starts.insert(key(first), t);
                        }
                    }
                }
            }
            (None, None) => {
                let idx = contours.len();
                contours.push(Some(VecDeque::from([from, to])));
                starts.insert(key(from), idx);
                ends.insert(key(to), idx);
            }
            (Some(t), None) => {
                if let Some(contour) = contours[t].as_mut() {
                    contour.push_front(from);
                }
                starts.insert(key(from), t);
            }
            (None, Some(h)) => {
                if let Some(contour) = contours[h].as_mut() {
                    contour.push_back(to);
                }
                ends.insert(key(to), h);
            }
        }
    }

    contours
        .into_iter()
        .flatten()
        .map(|points| Contour {
            points: Vec::from(points),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_masks_have_no_contours() {
        let empty = BinaryMask::new(16, 12);
        let full = BinaryMask::from_fn(16, 12, |_, _| true);
        assert!(find_mask_contours(&empty, 0.8).is_empty());
        assert!(find_mask_contours(&full, 0.8).is_empty());
    }

    #[test]
    fn degenerate_grids_have_no_cells() {
        assert!(find_contours(&[1.0, 0.0, 1.0], 3, 1, 0.5).is_empty());
        assert!(find_contours(&[1.0, 0.0], 2, 2, 0.5).is_empty());
    }

    #[test]
    fn single_pixel_gives_closed_diamond() {
        let mut mask = BinaryMask::new(5, 5);
        mask.set(2, 2, true);
        let contours = find_mask_contours(&mask, 0.5);
        assert_eq!(contours.len(), 1);
        let contour = &contours[0];
        assert!(contour.is_closed());
        // Four edge crossings plus the repeated start point.
        assert_eq!(contour.len(), 5);
        for &(r, c) in &contour.points {
            let d = (r - 2.0).abs() + (c - 2.0).abs();
            assert!((d - 0.5).abs() < 1e-9, "point ({r}, {c})");
        }
    }

    #[test]
    fn interpolates_toward_the_level() {
        let mut mask = BinaryMask::new(5, 5);
        mask.set(2, 2, true);
        let contours = find_mask_contours(&mask, 0.8);
        assert_eq!(contours.len(), 1);
        for &(r, c) in &contours[0].points {
            let d = (r - 2.0).abs() + (c - 2.0).abs();
            assert!((d - 0.2).abs() < 1e-9, "point ({r}, {c})");
        }
    }

    #[test]
    fn region_touching_border_is_open() {
        let mask = BinaryMask::from_fn(6, 6, |x, _| x < 3);
        let contours = find_mask_contours(&mask, 0.5);
        assert_eq!(contours.len(), 1);
        assert!(!contours[0].is_closed());
        assert_eq!(contours[0].len(), 6);
        assert!(contours[0].points.iter().all(|&(_, c)| (c - 2.5).abs() < 1e-9));
    }

    #[test]
    fn separate_blobs_give_separate_contours() {
        let mask = BinaryMask::from_fn(12, 6, |x, y| {
            (1..3).contains(&y) && ((1..3).contains(&x) || (7..10).contains(&x))
        });
        let contours = find_mask_contours(&mask, 0.5);
        assert_eq!(contours.len(), 2);
        assert!(contours.iter().all(Contour::is_closed));
    }

    #[test]
    fn diagonal_saddle_stays_split() {
        let mut mask = BinaryMask::new(4, 4);
        mask.set(1, 1, true);
        mask.set(2, 2, true);
        let contours = find_mask_contours(&mask, 0.5);
        assert_eq!(contours.len(), 2);
    }
}
