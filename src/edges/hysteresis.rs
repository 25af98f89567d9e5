//! Two-threshold edge linking over a suppressed magnitude plane.
//!
//! Pixels at or above `high` seed a flood fill that absorbs every 8-connected
//! pixel whose suppressed magnitude is at least `floor`. The fill uses an
//! explicit stack and marks pixels before pushing them, so each pixel is
//! visited once regardless of chain length or cycles.
use crate::image::{ImageF32, Mask};

const NEIGHBORS_8: [(isize, isize); 8] = [
    (1, 0),
    (-1, 0),
    (1, 1),
    (-1, -1),
    (0, -1),
    (0, 1),
    (-1, 1),
    (1, -1),
];

/// Trace edges from strong seeds through weak-but-nonzero responses.
///
/// Traced neighbours must lie strictly inside row 0 and column 0; seeds may
/// sit anywhere.
pub fn trace_edges(nms: &ImageF32, high: f32, floor: f32) -> Mask {
    let (w, h) = (nms.w, nms.h);
    let mut edges = Mask::new(w, h);
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for y in 0..h {
        for x in 0..w {
            if nms.get(x, y) < high || edges.is_set(x, y) {
                continue;
            }
            edges.mark(x, y);
            stack.push((x, y));

            while let Some((cx, cy)) = stack.pop() {
                for (dx, dy) in NEIGHBORS_8 {
                    let nx = cx as isize + dx;
                    let ny = cy as isize + dy;
                    if nx <= 0 || ny <= 0 || nx >= w as isize || ny >= h as isize {
                        continue;
                    }
                    let (nx, ny) = (nx as usize, ny as usize);
                    if edges.is_set(nx, ny) || nms.get(nx, ny) < floor {
                        continue;
                    }
                    edges.mark(nx, ny);
                    stack.push((nx, ny));
                }
            }
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_chain_follows_strong_seed() {
        let mut nms = ImageF32::new(10, 5);
        nms.set(2, 2, 1.5);
        for x in 3..8 {
            nms.set(x, 2, 0.3);
        }
        // Isolated weak response without a seed stays unmarked.
        nms.set(5, 4, 0.5);
        let edges = trace_edges(&nms, 1.1, 0.01);
        assert_eq!(edges.count(), 6);
        assert!(!edges.is_set(5, 4));
        assert!(edges.is_set(7, 2));
    }

    #[test]
    fn long_closed_loop_does_not_overflow() {
        let (w, h) = (400, 400);
        let mut nms = ImageF32::new(w, h);
        for i in 1..w - 1 {
            nms.set(i, 1, 0.5);
            nms.set(i, h - 2, 0.5);
            nms.set(1, i, 0.5);
            nms.set(w - 2, i, 0.5);
        }
        nms.set(1, 1, 2.0);
        let edges = trace_edges(&nms, 1.1, 0.01);
        assert_eq!(edges.count(), 4 * (w - 3));
    }

    #[test]
    fn no_seed_means_no_edges() {
        let nms = ImageF32::from_vec(6, 6, vec![0.9; 36]);
        assert!(trace_edges(&nms, 1.1, 0.01).is_empty());
    }
}
