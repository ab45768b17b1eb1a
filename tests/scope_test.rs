//! Scoped binding of several sources at once.

use std::panic::{AssertUnwindSafe, catch_unwind};

use pretty_assertions::assert_eq;
use unview::prelude::*;
use unview::{Error, ViewError, is_pinned, pinned};

#[test]
fn views_see_contents_at_entry() {
    let mut a = Array::from_shape_vec(&[2, 2], vec![1, 2, 3, 4]).unwrap();
    let mut b = Array::from_elem(&[2, 2], 0).unwrap();
    a[[1, 1]] = 40;

    let copied = with_views((&mut a, &mut b), |(a, mut b)| {
        assert_eq!(active_pins(), 2);
        assert_eq!(a.to_vec(), vec![1, 2, 3, 40]);
        for (dst, src) in b.iter_mut().zip(a.iter()) {
            *dst = *src;
        }
        b.len()
    });

    assert_eq!(copied, 4);
    assert_eq!(b.as_slice(), &[1, 2, 3, 40]);
    assert_eq!(active_pins(), 0);
}

#[test]
fn no_pins_survive_a_panicking_body() {
    let mut a = Array::from_elem(&[8], 1u64).unwrap();
    let base = a.as_slice().as_ptr();

    let result = catch_unwind(AssertUnwindSafe(|| {
        with_views((&mut a,), |(mut view,)| {
            view[[0]] = 2;
            assert!(is_pinned(base));
            panic!("body failed after writing");
        })
    }));

    assert!(result.is_err());
    assert_eq!(active_pins(), 0);
    assert!(!is_pinned(base));

    // Churn the allocator, then make sure the source is intact.
    for n in 0..64 {
        drop(vec![0u64; n * 16]);
    }
    assert_eq!(a.as_slice(), &[2, 1, 1, 1, 1, 1, 1, 1]);
    a.push_row([9]).unwrap();
    assert_eq!(a.len(), 9);
}

#[test]
fn question_mark_inside_a_scope_releases() {
    fn scaled_row(a: &mut Array<f64>, b: &mut Array<f64>, row: usize) -> unview::Result<f64> {
        bind_views!(&mut a, &mut b => {
            assert_eq!(active_pins(), 2);
            let src = uview_region(a.as_unchecked_mut().ok_or(ViewError::LayoutUnsupported)?, &idx![row, ..])?;
            let dst = b.as_unchecked_mut().ok_or(ViewError::LayoutUnsupported)?;
            for (d, s) in dst.iter_mut().zip(src.iter()) {
                *d = s * 10.0;
            }
            Ok(dst.iter().sum())
        })
    }

    let mut a = Array::from_shape_fn(&[2, 3], |ix| (ix[0] * 3 + ix[1]) as f64);
    let mut b = Array::from_elem(&[3], 0.0).unwrap();

    assert_eq!(scaled_row(&mut a, &mut b, 1), Ok(120.0));
    assert_eq!(b.as_slice(), &[30.0, 40.0, 50.0]);
    assert_eq!(active_pins(), 0);

    assert!(matches!(
        scaled_row(&mut a, &mut b, 2),
        Err(Error::View(ViewError::OutOfBounds { axis: 0, .. }))
    ));
    assert_eq!(active_pins(), 0);
}

#[test]
fn early_return_from_a_scope_releases() {
    fn find(a: &mut Array<i32>, needle: i32) -> Option<usize> {
        bind_views!(&mut a => {
            for (i, x) in a.iter().enumerate() {
                if *x == needle {
                    return Some(i);
                }
            }
        });
        None
    }

    let mut a = Array::from_shape_vec(&[4], vec![5, 6, 7, 8]).unwrap();
    assert_eq!(find(&mut a, 7), Some(2));
    assert_eq!(active_pins(), 0);
    assert_eq!(find(&mut a, 1), None);
    assert_eq!(active_pins(), 0);
}

#[test]
fn mixed_sources_bind_together() {
    let mut floats = Array::from_elem(&[2], 1.5f32).unwrap();
    let mut bytes = Array::from_elem(&[3], 7u8).unwrap();
    let mut names = Array::from_elem(&[1], String::from("n")).unwrap();
    let mut pairs = Array::from_elem(&[2], (1i32, 2.0f64)).unwrap();
    let mut grid = Array::from_shape_fn(&[2, 2], |ix| ix[0] as i16);
    let mut column = grid.view_mut().reversed_axes();
    let mut raw = [0u32; 4];
    let mut raw = UView::from_slice_mut(&mut raw, &[4]).unwrap();

    with_views(
        (&mut floats, &mut bytes, &mut names, &mut pairs, &mut column, &mut raw),
        |(floats, bytes, names, pairs, column, raw)| {
            assert_eq!(active_pins(), 6);
            assert!(floats.is_unchecked());
            assert!(bytes.is_unchecked());
            assert_eq!(names.reason(), Some(Ineligible::ElementType));
            assert!(pairs.is_unchecked());
            assert_eq!(column.reason(), Some(Ineligible::NonContiguous));
            assert!(raw.is_unchecked());
        },
    );
    assert_eq!(active_pins(), 0);
}

#[test]
fn arrays_of_sources_bind_in_order() {
    let mut parts: Vec<Array<u16>> = (0..3).map(|i| Array::from_elem(&[2], i).unwrap()).collect();
    let bases: Vec<usize> = parts.iter().map(|p| p.as_slice().as_ptr() as usize).collect();
    let [p0, p1, p2] = &mut parts[..] else {
        unreachable!()
    };

    let total = with_views([p0, p1, p2], |views| {
        let pins = pinned();
        assert_eq!(pins.iter().map(|p| p.addr).collect::<Vec<_>>(), bases);
        assert!(pins.iter().all(|p| p.len == 2 && p.elem == "u16"));
        views.iter().flat_map(|v| v.iter()).map(|&x| x as u32).sum::<u32>()
    });

    assert_eq!(total, 6);
    assert_eq!(active_pins(), 0);
}

#[test]
fn nested_scopes_stack() {
    let mut outer = Array::from_elem(&[2], 0i8).unwrap();
    let mut inner = Array::from_elem(&[2], 0i8).unwrap();

    with_views((&mut outer,), |(mut o,)| {
        o[[0]] = 1;
        with_views((&mut inner,), |(mut i,)| {
            assert_eq!(active_pins(), 2);
            i[[1]] = 2;
        });
        assert_eq!(active_pins(), 1);
    });

    assert_eq!(active_pins(), 0);
    assert_eq!(outer.as_slice(), &[1, 0]);
    assert_eq!(inner.as_slice(), &[0, 2]);
}

#[test]
fn explicit_guard() {
    let mut a = Array::from_elem(&[3], 1.0f64).unwrap();
    let guard = ScopeGuard::enter();
    let mut view = guard.bind(&mut a);
    view.as_unchecked_mut().unwrap().fill(4.0);
    assert_eq!(guard.pins(), 1);
    drop(view);
    drop(guard);
    assert_eq!(active_pins(), 0);
    assert_eq!(a.as_slice(), &[4.0; 3]);
}

static_assertions::assert_not_impl_any!(ScopeGuard: Send, Sync);
static_assertions::assert_impl_all!(UView<'static, f32>: Send, Sync);
