//! Index expressions and their resolution into regions.
//!
//! An index expression holds one [`Idx`] per axis. Resolution turns it into a
//! [`Region`]: an element offset from the source's base pointer plus the
//! shape and strides of the selected elements. Bounds are validated before
//! any offset is produced unless the caller explicitly opted out.

use core::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo};

use smallvec::SmallVec;

use crate::error::ViewError;
use crate::layout::{Shape, Strides};

/// Selection along a single axis.
///
/// Positions are logical: a source with a non-zero origin is indexed from
/// that origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Idx {
    /// The whole axis.
    Full,
    /// A single position. The axis is removed from the result.
    At(isize),
    /// `start..end` every `step` elements. The axis is kept, even when it
    /// selects a single element.
    Range { start: isize, end: isize, step: usize },
    /// `start..` every `step` elements, up to the end of the axis.
    From { start: isize, step: usize },
}

impl Idx {
    pub fn range(range: Range<isize>) -> Idx {
        Idx::Range {
            start: range.start,
            end: range.end,
            step: 1,
        }
    }

    /// Same selection taking every `step`-th element.
    pub fn step_by(self, step: usize) -> Idx {
        match self {
            Idx::Full => Idx::From { start: 0, step },
            Idx::At(i) => Idx::At(i),
            Idx::Range { start, end, .. } => Idx::Range { start, end, step },
            Idx::From { start, .. } => Idx::From { start, step },
        }
    }
}

// Positions past `isize::MAX` saturate, so they stay out of bounds instead
// of wrapping around to negative indices.
fn saturate(i: usize) -> isize {
    isize::try_from(i).unwrap_or(isize::MAX)
}

impl From<usize> for Idx {
    fn from(i: usize) -> Idx {
        Idx::At(saturate(i))
    }
}

impl From<isize> for Idx {
    fn from(i: isize) -> Idx {
        Idx::At(i)
    }
}

impl From<i32> for Idx {
    fn from(i: i32) -> Idx {
        Idx::At(i as isize)
    }
}

impl From<Range<usize>> for Idx {
    fn from(r: Range<usize>) -> Idx {
        Idx::range(saturate(r.start)..saturate(r.end))
    }
}

impl From<Range<isize>> for Idx {
    fn from(r: Range<isize>) -> Idx {
        Idx::range(r)
    }
}

impl From<Range<i32>> for Idx {
    fn from(r: Range<i32>) -> Idx {
        Idx::range(r.start as isize..r.end as isize)
    }
}

impl From<RangeInclusive<usize>> for Idx {
    fn from(r: RangeInclusive<usize>) -> Idx {
        Idx::range(saturate(*r.start())..saturate(*r.end()).saturating_add(1))
    }
}

impl From<RangeInclusive<i32>> for Idx {
    fn from(r: RangeInclusive<i32>) -> Idx {
        Idx::range(*r.start() as isize..*r.end() as isize + 1)
    }
}

impl From<RangeFrom<usize>> for Idx {
    fn from(r: RangeFrom<usize>) -> Idx {
        Idx::From {
            start: saturate(r.start),
            step: 1,
        }
    }
}

impl From<RangeFrom<i32>> for Idx {
    fn from(r: RangeFrom<i32>) -> Idx {
        Idx::From {
            start: r.start as isize,
            step: 1,
        }
    }
}

impl From<RangeTo<usize>> for Idx {
    fn from(r: RangeTo<usize>) -> Idx {
        Idx::range(0..saturate(r.end))
    }
}

impl From<RangeTo<i32>> for Idx {
    fn from(r: RangeTo<i32>) -> Idx {
        Idx::range(0..r.end as isize)
    }
}

impl From<RangeFull> for Idx {
    fn from(_: RangeFull) -> Idx {
        Idx::Full
    }
}

/// Build an index expression, one entry per axis.
///
/// Each entry is anything that converts into [`Idx`]: an integer, a range,
/// or `..`. Append `;step` to an entry to take every `step`-th element.
///
/// ```
/// use unview_core::{Idx, idx};
///
/// let e = idx![0, 1..3];
/// assert_eq!(e, [Idx::At(0), Idx::Range { start: 1, end: 3, step: 1 }]);
///
/// let e = idx![.., 0..6;2];
/// assert_eq!(e[1], Idx::Range { start: 0, end: 6, step: 2 });
/// ```
#[macro_export]
macro_rules! idx {
    (@one $e:expr) => {
        $crate::Idx::from($e)
    };
    (@one $e:expr;$step:expr) => {
        $crate::Idx::from($e).step_by($step)
    };
    ($($e:expr $(;$step:expr)?),* $(,)?) => {
        [$($crate::idx!(@one $e $(;$step)?)),*]
    };
}

/// Whether bounds are validated during resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoundsCheck {
    #[default]
    Checked,
    /// The caller vouches that every index is in bounds.
    Trusted,
}

/// A resolved selection relative to a source's base pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Element offset of the first selected element.
    pub offset: isize,
    pub shape: Shape,
    pub strides: Strides,
}

impl Region {
    /// The region covering a whole source.
    pub fn whole(shape: &[usize], strides: &[isize]) -> Region {
        Region {
            offset: 0,
            shape: SmallVec::from_slice(shape),
            strides: SmallVec::from_slice(strides),
        }
    }

    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolve `index` against a source described by `shape`, `strides` and an
/// optional index `origin`.
///
/// In [`BoundsCheck::Checked`] mode every selection must lie inside its
/// axis, otherwise [`ViewError::OutOfBounds`] is returned. In
/// [`BoundsCheck::Trusted`] mode the bounds are not inspected and an
/// out-of-range request yields a region that must never be dereferenced.
pub fn resolve(
    index: &[Idx],
    shape: &[usize],
    strides: &[isize],
    origin: Option<&[isize]>,
    bounds: BoundsCheck,
) -> Result<Region, ViewError> {
    if index.len() != shape.len() {
        return Err(ViewError::IndexArity {
            expected: shape.len(),
            got: index.len(),
        });
    }

    let mut region = Region {
        offset: 0,
        shape: SmallVec::new(),
        strides: SmallVec::new(),
    };
    let checked = bounds == BoundsCheck::Checked;

    for (axis, (&sel, (&extent, &stride))) in index.iter().zip(shape.iter().zip(strides)).enumerate() {
        let base = origin.and_then(|o| o.get(axis)).copied().unwrap_or(0);
        let out_of_bounds = |index: isize| ViewError::OutOfBounds {
            axis,
            index,
            extent,
        };
        let shifted = |index: isize| index.checked_sub(base).ok_or_else(|| out_of_bounds(index));
        match sel {
            Idx::Full => {
                region.shape.push(extent);
                region.strides.push(stride);
            }
            Idx::At(i) => {
                let p = shifted(i)?;
                if checked && (p < 0 || p as usize >= extent) {
                    return Err(out_of_bounds(i));
                }
                region.offset += p * stride;
            }
            Idx::Range { start, end, step } => {
                let (ps, pe) = (shifted(start)?, shifted(end)?);
                if checked {
                    if ps < 0 || ps as usize > extent {
                        return Err(out_of_bounds(start));
                    }
                    if pe < ps || pe as usize > extent {
                        return Err(out_of_bounds(end));
                    }
                }
                push_range(&mut region, axis, ps, pe, step, stride)?;
            }
            Idx::From { start, step } => {
                let ps = shifted(start)?;
                if checked && (ps < 0 || ps as usize > extent) {
                    return Err(out_of_bounds(start));
                }
                push_range(&mut region, axis, ps, extent as isize, step, stride)?;
            }
        }
    }

    Ok(region)
}

fn push_range(
    region: &mut Region,
    axis: usize,
    start: isize,
    end: isize,
    step: usize,
    stride: isize,
) -> Result<(), ViewError> {
    if step == 0 {
        return Err(ViewError::ZeroStep { axis });
    }
    let span = end.saturating_sub(start).max(0) as usize;
    let len = span.div_ceil(step);
    if len > 0 {
        region.offset += start * stride;
    }
    region.shape.push(len);
    region.strides.push(stride * step as isize);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SHAPE: [usize; 2] = [2, 3];
    const STRIDES: [isize; 2] = [3, 1];

    fn checked(index: &[Idx]) -> Result<Region, ViewError> {
        resolve(index, &SHAPE, &STRIDES, None, BoundsCheck::Checked)
    }

    #[test]
    fn full_expression_is_whole_region() {
        let region = checked(&idx![.., ..]).unwrap();
        assert_eq!(region, Region::whole(&SHAPE, &STRIDES));
    }

    #[test]
    fn row_slice_keeps_both_axes() {
        let region = checked(&idx![0..1, 1..3]).unwrap();
        assert_eq!(region.offset, 1);
        assert_eq!(region.shape.as_slice(), &[1, 2]);
        assert_eq!(region.strides.as_slice(), &[3, 1]);
    }

    #[test]
    fn scalar_index_drops_axis() {
        let region = checked(&idx![1, ..]).unwrap();
        assert_eq!(region.offset, 3);
        assert_eq!(region.shape.as_slice(), &[3]);
        assert_eq!(region.strides.as_slice(), &[1]);
    }

    #[test]
    fn stepped_range_scales_stride() {
        let region = checked(&idx![.., 0..3;2]).unwrap();
        assert_eq!(region.shape.as_slice(), &[2, 2]);
        assert_eq!(region.strides.as_slice(), &[3, 2]);
    }

    #[test]
    fn open_ranges() {
        let region = checked(&idx![1.., ..2]).unwrap();
        assert_eq!(region.offset, 3);
        assert_eq!(region.shape.as_slice(), &[1, 2]);
    }

    #[test]
    fn inclusive_range() {
        let region = checked(&idx![0..=1, 2]).unwrap();
        assert_eq!(region.shape.as_slice(), &[2]);
        assert_eq!(region.offset, 2);
    }

    #[test]
    fn empty_range_at_end_is_in_bounds() {
        let region = checked(&idx![.., 3..3]).unwrap();
        assert_eq!(region.shape.as_slice(), &[2, 0]);
        assert_eq!(region.offset, 0);
        assert!(region.is_empty());
    }

    #[test]
    fn out_of_bounds_scalar() {
        assert_eq!(
            checked(&idx![2, 0]),
            Err(ViewError::OutOfBounds {
                axis: 0,
                index: 2,
                extent: 2
            })
        );
        assert_eq!(
            checked(&[Idx::At(-1), Idx::Full]),
            Err(ViewError::OutOfBounds {
                axis: 0,
                index: -1,
                extent: 2
            })
        );
    }

    #[test]
    fn out_of_bounds_range_end() {
        assert_eq!(
            checked(&idx![.., 1..4]),
            Err(ViewError::OutOfBounds {
                axis: 1,
                index: 4,
                extent: 3
            })
        );
    }

    #[test]
    fn reversed_range_rejected() {
        assert!(matches!(
            checked(&[Idx::Full, Idx::range(2..1)]),
            Err(ViewError::OutOfBounds { axis: 1, .. })
        ));
    }

    #[test]
    fn arity_mismatch() {
        assert_eq!(
            checked(&idx![0]),
            Err(ViewError::IndexArity {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn zero_step() {
        assert_eq!(
            checked(&idx![.., 0..3;0]),
            Err(ViewError::ZeroStep { axis: 1 })
        );
    }

    #[test]
    fn origin_shifts_logical_indices() {
        let origin = [10, -1];
        let region = resolve(
            &idx![10, 0..2],
            &SHAPE,
            &STRIDES,
            Some(&origin),
            BoundsCheck::Checked,
        )
        .unwrap();
        assert_eq!(region.offset, 1);
        assert_eq!(region.shape.as_slice(), &[2]);

        let err = resolve(&idx![0, 0], &SHAPE, &STRIDES, Some(&origin), BoundsCheck::Checked);
        assert!(matches!(err, Err(ViewError::OutOfBounds { axis: 0, index: 0, .. })));
    }

    #[test]
    fn extreme_indices_against_an_origin_are_out_of_bounds() {
        let origin = [1, 1];
        let resolve_at = |index: &[Idx]| {
            resolve(index, &SHAPE, &STRIDES, Some(&origin), BoundsCheck::Checked)
        };
        assert_eq!(
            resolve_at(&[Idx::At(isize::MIN), Idx::Full]),
            Err(ViewError::OutOfBounds {
                axis: 0,
                index: isize::MIN,
                extent: 2
            })
        );
        assert!(matches!(
            resolve_at(&[Idx::Full, Idx::range(isize::MIN..0)]),
            Err(ViewError::OutOfBounds { axis: 1, index: isize::MIN, .. })
        ));
        assert!(matches!(
            resolve_at(&[Idx::From { start: isize::MIN, step: 1 }, Idx::Full]),
            Err(ViewError::OutOfBounds { axis: 0, index: isize::MIN, .. })
        ));
    }

    #[test]
    fn huge_positions_saturate() {
        assert_eq!(Idx::from(usize::MAX), Idx::At(isize::MAX));
        assert_eq!(
            checked(&[Idx::from(usize::MAX), Idx::Full]),
            Err(ViewError::OutOfBounds {
                axis: 0,
                index: isize::MAX,
                extent: 2
            })
        );
        assert_eq!(
            Idx::from(0..usize::MAX),
            Idx::range(0..isize::MAX)
        );
        assert_eq!(
            Idx::from(0..=usize::MAX),
            Idx::range(0..isize::MAX)
        );
    }

    #[test]
    fn trusted_mode_skips_bounds() {
        let region = resolve(&idx![1, 5], &SHAPE, &STRIDES, None, BoundsCheck::Trusted).unwrap();
        assert_eq!(region.offset, 8);
        assert!(region.shape.is_empty());
    }
}
