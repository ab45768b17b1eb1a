//! Memory layout descriptions.
//!
//! Strides are measured in elements and may be negative for host views that
//! walk an axis backwards. Only row-major, unit-stride runs can be described
//! by a bare pointer and shape.

use smallvec::SmallVec;

/// Extent of each axis, outermost first.
pub type Shape = SmallVec<[usize; 4]>;

/// Distance in elements between neighbours along each axis.
pub type Strides = SmallVec<[isize; 4]>;

/// The closed set of layouts a source array can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutClass {
    /// Owns a dense row-major buffer.
    Owning,
    /// Borrows a dense row-major run of another buffer.
    ContiguousView,
    /// Borrows elements spaced by arbitrary non-negative strides.
    StridedView,
    /// Anything a single base pointer cannot describe.
    Unsupported,
}

impl LayoutClass {
    /// Classify a borrowed view from its shape and strides.
    pub fn for_view(shape: &[usize], strides: &[isize]) -> LayoutClass {
        if strides.iter().any(|&s| s < 0) {
            LayoutClass::Unsupported
        } else if is_standard_layout(shape, strides) {
            LayoutClass::ContiguousView
        } else {
            LayoutClass::StridedView
        }
    }
}

/// Row-major strides for `shape`.
///
/// Shape `(a, b, c)` gives strides `(b * c, c, 1)`.
pub fn default_strides(shape: &[usize]) -> Strides {
    let mut strides: Strides = SmallVec::from_elem(0, shape.len());
    let mut acc = 1isize;
    for (stride, &dim) in strides.iter_mut().zip(shape).rev() {
        *stride = acc;
        acc *= dim.max(1) as isize;
    }
    strides
}

/// Number of elements, checking for overflow.
pub fn size_checked(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

/// Whether `shape` with `strides` covers one unbroken row-major run.
///
/// Axes of extent 1 may carry any stride. Empty regions are trivially
/// contiguous.
pub fn is_standard_layout(shape: &[usize], strides: &[isize]) -> bool {
    debug_assert_eq!(shape.len(), strides.len());
    if shape.contains(&0) {
        return true;
    }
    let mut expected = 1isize;
    for (&dim, &stride) in shape.iter().zip(strides).rev() {
        if dim != 1 && stride != expected {
            return false;
        }
        expected *= dim as isize;
    }
    true
}

/// Offset of `index` under `strides`, or `None` if any coordinate is out of
/// range for `shape`.
pub fn offset_of(shape: &[usize], strides: &[isize], index: &[usize]) -> Option<isize> {
    if index.len() != shape.len() {
        return None;
    }
    let mut offset = 0isize;
    for ((&i, &dim), &stride) in index.iter().zip(shape).zip(strides) {
        if i >= dim {
            return None;
        }
        offset += i as isize * stride;
    }
    Some(offset)
}

/// Advance `index` to the next position in row-major order.
///
/// Returns `false` once iteration is done.
pub fn next_index(shape: &[usize], index: &mut [usize]) -> bool {
    for (&dim, ix) in shape.iter().zip(index.iter_mut()).rev() {
        *ix += 1;
        if *ix == dim {
            *ix = 0;
        } else {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_strides_row_major() {
        assert_eq!(default_strides(&[2, 3, 4]).as_slice(), &[12, 4, 1]);
        assert_eq!(default_strides(&[5]).as_slice(), &[1]);
        assert!(default_strides(&[]).is_empty());
    }

    #[test]
    fn standard_layout_accepts_unit_axes_with_any_stride() {
        assert!(is_standard_layout(&[2, 3], &[3, 1]));
        assert!(is_standard_layout(&[1, 3], &[99, 1]));
        assert!(is_standard_layout(&[2, 1], &[1, 7]));
        assert!(is_standard_layout(&[], &[]));
    }

    #[test]
    fn standard_layout_rejects_gaps_and_column_major() {
        assert!(!is_standard_layout(&[2, 2], &[3, 1]));
        assert!(!is_standard_layout(&[3], &[2]));
        assert!(!is_standard_layout(&[2, 3], &[1, 2]));
    }

    #[test]
    fn empty_region_is_contiguous() {
        assert!(is_standard_layout(&[0, 3], &[7, 2]));
    }

    #[test]
    fn layout_class_for_view() {
        assert_eq!(LayoutClass::for_view(&[2, 3], &[3, 1]), LayoutClass::ContiguousView);
        assert_eq!(LayoutClass::for_view(&[2, 3], &[6, 2]), LayoutClass::StridedView);
        assert_eq!(LayoutClass::for_view(&[3], &[-1]), LayoutClass::Unsupported);
    }

    #[test]
    fn offset_of_checks_each_axis() {
        assert_eq!(offset_of(&[2, 3], &[3, 1], &[1, 2]), Some(5));
        assert_eq!(offset_of(&[2, 3], &[3, 1], &[2, 0]), None);
        assert_eq!(offset_of(&[2, 3], &[3, 1], &[0]), None);
    }

    #[test]
    fn next_index_walks_row_major() {
        let shape = [2, 2];
        let mut index = [0, 0];
        let mut seen = vec![index];
        while next_index(&shape, &mut index) {
            seen.push(index);
        }
        assert_eq!(seen, vec![[0, 0], [0, 1], [1, 0], [1, 1]]);
    }
}
