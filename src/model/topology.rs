/// Number of points in a full MediaPipe pose set.
pub const POSE_POINT_COUNT: usize = 33;

/// Number of points in a full MediaPipe hand set.
pub const HAND_POINT_COUNT: usize = 21;

/// MediaPipe pose skeleton, pairs of landmark indices.
pub const POSE_CONNECTIONS: [(usize, usize); 35] = [
    // face
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 7),
    (0, 4),
    (4, 5),
    (5, 6),
    (6, 8),
    (9, 10),
    // arms
    (11, 12),
    (11, 13),
    (13, 15),
    (15, 17),
    (15, 19),
    (15, 21),
    (17, 19),
    (12, 14),
    (14, 16),
    (16, 18),
    (16, 20),
    (16, 22),
    (18, 20),
    // torso
    (11, 23),
    (12, 24),
    (23, 24),
    // legs
    (23, 25),
    (24, 26),
    (25, 27),
    (26, 28),
    (27, 29),
    (28, 30),
    (29, 31),
    (30, 32),
    (27, 31),
    (28, 32),
];

/// MediaPipe hand skeleton, pairs of landmark indices.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    // palm
    (0, 1),
    (0, 5),
    (9, 13),
    (13, 17),
    (5, 9),
    (0, 17),
    // thumb
    (1, 2),
    (2, 3),
    (3, 4),
    // index
    (5, 6),
    (6, 7),
    (7, 8),
    // middle
    (9, 10),
    (10, 11),
    (11, 12),
    // ring
    (13, 14),
    (14, 15),
    (15, 16),
    // pinky
    (17, 18),
    (18, 19),
    (19, 20),
];

/// Connections of `table` whose endpoints both exist in a set of `len` points.
pub fn drawable_connections(
    table: &[(usize, usize)],
    len: usize,
) -> impl Iterator<Item = (usize, usize)> + '_ {
    table.iter().copied().filter(move |&(a, b)| a < len && b < len)
}
