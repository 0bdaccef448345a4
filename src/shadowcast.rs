// src/shadowcast.rs
//! Björn Bergström's recursive shadowcasting, eight octants, computed in the
//! coordinates of the zeroth octant and transformed out.
//!
//! This is a line-for-line port of the structure (not the C) of
//! `raycast_at`/`raycast_octant_at`: same octant transform, same
//! `(dx - 0.5) / (dy + 0.5)` / `(dx + 0.5) / (dy - 0.5)` corner slopes, same
//! recursion-only-into-closed-gaps discipline. It may call the visitor more
//! than once for a tile on an axis or diagonal, and may call back on tiles
//! just outside the radius; callers must tolerate both.

/// What the caster needs to know about the map to walk it. Kept minimal so
/// both the lighting pass and the composer can implement it directly against
/// `Floor` without an intermediate copy.
pub trait Occluder {
    fn in_bounds(&self, x: i32, y: i32) -> bool;
    fn blocks_light(&self, x: i32, y: i32) -> bool;
}

struct RayParams<'a, O: Occluder, F: FnMut(i32, i32)> {
    map: &'a O,
    origin_x: i32,
    origin_y: i32,
    radius: i32,
    visit: F,
}

struct OctantParams {
    octant: u8,
    dx_max: i32,
    dy_max: i32,
}

fn transform_to_octant(origin_x: i32, origin_y: i32, dx: i32, dy: i32, octant: u8) -> (i32, i32) {
    let (mut dx, mut dy) = (dx, dy);
    if octant & 1 != 0 {
        std::mem::swap(&mut dx, &mut dy);
    }
    if octant & 2 != 0 {
        dx = -dx;
    }
    if octant & 4 != 0 {
        dy = -dy;
    }
    (origin_x + dx, origin_y + dy)
}

fn visit_transformed<O: Occluder, F: FnMut(i32, i32)>(
    rp: &mut RayParams<O, F>,
    dx: i32,
    dy: i32,
    octant: u8,
) -> bool {
    let (x, y) = transform_to_octant(rp.origin_x, rp.origin_y, dx, dy, octant);
    if dx * dx + dy * dy < rp.radius * rp.radius {
        (rp.visit)(x, y);
    }
    rp.map.blocks_light(x, y)
}

fn dy_interval(start_slope: f32, end_slope: f32, dx: i32, dy_max: i32) -> (i32, i32) {
    let begin = start_slope * (dx as f32 - 0.5) - 0.5;
    let end = end_slope * (dx as f32 + 0.5) + 0.5;
    (
        (begin as i32).min(dy_max),
        (end as i32).min(dy_max),
    )
}

fn raycast_octant<O: Occluder, F: FnMut(i32, i32)>(
    rp: &mut RayParams<O, F>,
    op: &OctantParams,
    start_dx: i32,
    mut start_slope: f32,
    end_slope: f32,
) {
    let mut blocked = false;
    let mut dx = start_dx;
    while dx <= op.dx_max && !blocked {
        let (begin, end) = dy_interval(start_slope, end_slope, dx, op.dy_max);
        let mut dy = begin;

        blocked = visit_transformed(rp, dx, dy, op.octant);

        dy += 1;
        while dy <= end {
            let tile_blocks = visit_transformed(rp, dx, dy, op.octant);
            if blocked && !tile_blocks {
                blocked = false;
                start_slope = (dy as f32 - 0.5) / (dx as f32 - 0.5);
            } else if !blocked && tile_blocks {
                blocked = true;
                raycast_octant(
                    rp,
                    op,
                    dx + 1,
                    start_slope,
                    (dy as f32 - 0.5) / (dx as f32 + 0.5),
                );
            }
            dy += 1;
        }
        dx += 1;
    }
}

/// Calls `visit(x, y)` at least once for every in-bounds, in-radius,
/// line-of-sight tile around `(origin_x, origin_y)` on `map`.
pub fn cast<O: Occluder>(
    map: &O,
    origin_x: i32,
    origin_y: i32,
    radius: i32,
    width: i32,
    height: i32,
    mut visit: impl FnMut(i32, i32),
) {
    visit(origin_x, origin_y);

    let dx_max = [
        radius.min(width - origin_x - 1),
        radius.min(height - origin_y - 1),
        radius.min(origin_x),
        radius.min(height - origin_y - 1),
        radius.min(width - origin_x - 1),
        radius.min(origin_y),
        radius.min(origin_x),
        radius.min(origin_y),
    ];
    let dy_max = [
        height - origin_y - 1,
        width - origin_x - 1,
        height - origin_y - 1,
        origin_x,
        origin_y,
        width - origin_x - 1,
        origin_y,
        origin_x,
    ];

    let mut rp = RayParams {
        map,
        origin_x,
        origin_y,
        radius,
        visit: &mut visit,
    };

    for octant in 0u8..8 {
        let op = OctantParams {
            octant,
            dx_max: dx_max[octant as usize],
            dy_max: dy_max[octant as usize],
        };
        raycast_octant(&mut rp, &op, 1, 0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct OpenRoom {
        width: i32,
        height: i32,
    }

    impl Occluder for OpenRoom {
        fn in_bounds(&self, x: i32, y: i32) -> bool {
            x >= 0 && y >= 0 && x < self.width && y < self.height
        }
        fn blocks_light(&self, x: i32, y: i32) -> bool {
            !self.in_bounds(x, y)
        }
    }

    #[test]
    fn open_room_sees_everything_within_radius() {
        let map = OpenRoom { width: 21, height: 21 };
        let mut seen = HashSet::new();
        cast(&map, 10, 10, 5, map.width, map.height, |x, y| {
            seen.insert((x, y));
        });
        // origin always visited
        assert!(seen.contains(&(10, 10)));
        // a tile well within radius on an open map must be visited
        assert!(seen.contains(&(10, 12)));
        assert!(seen.contains(&(12, 10)));
    }

    struct WalledOff {
        width: i32,
        height: i32,
        wall_x: i32,
    }

    impl Occluder for WalledOff {
        fn in_bounds(&self, x: i32, y: i32) -> bool {
            x >= 0 && y >= 0 && x < self.width && y < self.height
        }
        fn blocks_light(&self, x: i32, y: i32) -> bool {
            !self.in_bounds(x, y) || x == self.wall_x
        }
    }

    #[test]
    fn wall_occludes_tiles_behind_it() {
        let map = WalledOff { width: 21, height: 21, wall_x: 12 };
        let mut seen = HashSet::new();
        cast(&map, 10, 10, 8, map.width, map.height, |x, y| {
            seen.insert((x, y));
        });
        // directly behind the wall on the same row, far enough to be hidden
        assert!(!seen.contains(&(16, 10)));
    }
}
