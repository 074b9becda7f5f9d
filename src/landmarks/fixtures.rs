//! Synthetic hand poses for tests

use super::*;

const FINGER_COLUMNS: [(usize, f32); 4] = [
    (INDEX_MCP, 0.60),
    (MIDDLE_MCP, 0.52),
    (RING_MCP, 0.45),
    (PINKY_MCP, 0.38),
];

/// Right hand, palm towards the camera, thumb on the +x side.
/// Left hands are the horizontal mirror image.
pub(crate) fn pose(handedness: Handedness, up: [bool; 5]) -> LandmarkFrame {
    let mut points = [Landmark::default(); LANDMARK_COUNT];
    points[WRIST] = Landmark::new(0.50, 0.85, 0.0);

    points[THUMB_CMC] = Landmark::new(0.62, 0.78, -0.01);
    points[THUMB_MCP] = Landmark::new(0.68, 0.72, -0.02);
    if up[0] {
        points[THUMB_IP] = Landmark::new(0.74, 0.66, -0.03);
        points[THUMB_TIP] = Landmark::new(0.80, 0.62, -0.03);
    } else {
        points[THUMB_IP] = Landmark::new(0.64, 0.66, -0.03);
        points[THUMB_TIP] = Landmark::new(0.60, 0.66, -0.03);
    }

    for (finger, &(mcp, x)) in FINGER_COLUMNS.iter().enumerate() {
        points[mcp] = Landmark::new(x, 0.60, -0.01);
        points[mcp + 1] = Landmark::new(x, 0.50, -0.02);
        if up[finger + 1] {
            points[mcp + 2] = Landmark::new(x, 0.42, -0.02);
            points[mcp + 3] = Landmark::new(x, 0.35, -0.02);
        } else {
            points[mcp + 2] = Landmark::new(x, 0.56, -0.03);
            points[mcp + 3] = Landmark::new(x, 0.60, -0.03);
        }
    }

    let frame = LandmarkFrame::new(points, Handedness::Right);
    match handedness {
        Handedness::Right => frame,
        Handedness::Left => LandmarkFrame {
            handedness: Handedness::Left,
            ..mirrored(&frame)
        },
    }
}

/// Same hand seen from behind: the image is mirrored horizontally, which
/// flips the sign of the palm normal's depth component.
pub(crate) fn turned_around(frame: &LandmarkFrame) -> LandmarkFrame {
    mirrored(frame)
}

fn mirrored(frame: &LandmarkFrame) -> LandmarkFrame {
    let mut out = frame.clone();
    for point in out.landmarks.iter_mut() {
        point.x = 1.0 - point.x;
    }
    out
}

pub(crate) fn open_palm() -> LandmarkFrame {
    pose(Handedness::Right, [true; 5])
}
