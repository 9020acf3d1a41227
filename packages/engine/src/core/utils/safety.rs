//! Zero-cost indexing for the lattice sweeps
//!
//! The streaming and extraction loops index flat cell buffers with offsets
//! computed from interior coordinates, so every access is in range by
//! construction. Debug builds keep the bounds check; release builds drop it.
//!
//! Usage:
//! ```rust
//! use rivulet_engine::fast;
//!
//! let populations = vec![0.25f32, 0.5, 0.75];
//! let centre = *fast!(populations, [1]);
//! assert_eq!(centre, 0.5);
//!
//! let mut row = vec![0.0f32; 3];
//! fast!(row, [2] = 1.5);
//! assert_eq!(row[2], 1.5);
//! ```

/// Bounds-checked in debug, `get_unchecked` in release.
///
/// Only use it where the index is provably inside the slice: interior
/// coordinates `1..w-1 × 1..h-1` plus a unit neighbour offset.
#[macro_export]
macro_rules! fast {
    // Read pattern: fast!(slice, [index])
    ($slice:expr, [$index:expr]) => {{
        #[cfg(debug_assertions)]
        {
            &$slice[$index]
        }
        #[cfg(not(debug_assertions))]
        {
            unsafe { $slice.get_unchecked($index) }
        }
    }};

    // Write pattern: fast!(slice, [index] = value)
    ($slice:expr, [$index:expr] = $val:expr) => {{
        #[cfg(debug_assertions)]
        {
            $slice[$index] = $val;
        }
        #[cfg(not(debug_assertions))]
        {
            unsafe { *$slice.get_unchecked_mut($index) = $val; }
        }
    }};
}
