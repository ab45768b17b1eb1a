//! Scoped views.
//!
//! A [`ScopeGuard`] pins each source it binds for as long as the guard lives.
//! Views bound through a guard borrow the guard, so none of them can outlive
//! it. When the guard drops, normally or during unwinding, its pins are
//! released in reverse bind order.
//!
//! Pins are kept in a per-thread ledger. The ledger is observational: the
//! borrow checker already stops a source from being moved or resized while
//! a view of it exists, and the ledger lets callers and tests see which
//! buffers are currently bound.
//!
//! ```
//! use unview_core::{UView, active_pins, with_views};
//!
//! let mut a = [1.0f64, 2.0, 3.0];
//! let mut b = [0.0f64; 3];
//! let mut a = UView::from_slice_mut(&mut a, &[3]).unwrap();
//! let mut b = UView::from_slice_mut(&mut b, &[3]).unwrap();
//!
//! with_views((&mut a, &mut b), |(a, mut b)| {
//!     assert_eq!(active_pins(), 2);
//!     let a = a.as_unchecked().unwrap();
//!     let b = b.as_unchecked_mut().unwrap();
//!     for (dst, src) in b.iter_mut().zip(a.iter()) {
//!         *dst = src * 2.0;
//!     }
//! });
//! assert_eq!(active_pins(), 0);
//! assert_eq!(b.as_slice(), &[2.0, 4.0, 6.0]);
//! ```

use std::cell::{Cell, RefCell};
use std::marker::PhantomData;

use crate::construct::{ViewOf, uview};
use crate::source::ViewSource;

/// One bound source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pinned {
    /// Address of the source's first element.
    pub addr: usize,
    /// Logical element count of the source.
    pub len: usize,
    pub elem: &'static str,
}

impl Pinned {
    fn contains(&self, addr: usize, elem_size: usize) -> bool {
        let end = self.addr.saturating_add(self.len.saturating_mul(elem_size));
        addr == self.addr || (self.addr..end).contains(&addr)
    }
}

thread_local! {
    static LEDGER: RefCell<Vec<(Pinned, usize)>> = const { RefCell::new(Vec::new()) };
    static NEXT_GUARD: Cell<usize> = const { Cell::new(0) };
}

/// Number of sources pinned on this thread.
pub fn active_pins() -> usize {
    LEDGER.with_borrow(|ledger| ledger.len())
}

/// Snapshot of this thread's pins, oldest first.
pub fn pinned() -> Vec<Pinned> {
    LEDGER.with_borrow(|ledger| ledger.iter().map(|(pin, _)| pin.clone()).collect())
}

/// Whether `ptr` points into a source pinned on this thread.
pub fn is_pinned<T>(ptr: *const T) -> bool {
    let addr = ptr as usize;
    let size = size_of::<T>();
    LEDGER.with_borrow(|ledger| ledger.iter().any(|(pin, _)| pin.contains(addr, size)))
}

/// Keeps bound sources pinned until dropped.
///
/// Guards nest. Each guard releases only what it bound itself.
pub struct ScopeGuard {
    id: usize,
    // The ledger is thread-local.
    _local: PhantomData<*const ()>,
}

static_assertions::assert_not_impl_any!(ScopeGuard: Send, Sync);

impl ScopeGuard {
    pub fn enter() -> ScopeGuard {
        let id = NEXT_GUARD.replace(NEXT_GUARD.get().wrapping_add(1));
        tracing::trace!(guard = id, depth = active_pins(), "entering view scope");
        ScopeGuard {
            id,
            _local: PhantomData,
        }
    }

    /// Pin `src` and view it whole.
    ///
    /// The view borrows the guard, so it is gone before the pin is released.
    pub fn bind<'g, S: ViewSource + ?Sized>(&'g self, src: &'g mut S) -> ViewOf<'g, S> {
        self.pin(src);
        uview(src)
    }

    /// Number of sources this guard holds.
    pub fn pins(&self) -> usize {
        LEDGER.with_borrow(|ledger| ledger.iter().filter(|(_, owner)| *owner == self.id).count())
    }

    fn pin<S: ViewSource + ?Sized>(&self, src: &mut S) {
        let pin = Pinned {
            addr: src.as_mut_ptr() as usize,
            len: src.shape().iter().product(),
            elem: core::any::type_name::<S::Elem>(),
        };
        tracing::trace!(addr = pin.addr, len = pin.len, elem = pin.elem, "pinning source");
        LEDGER.with_borrow_mut(|ledger| ledger.push((pin, self.id)));
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        // The ledger may already be gone during thread teardown.
        let _ = LEDGER.try_with(|ledger| {
            let mut ledger = ledger.borrow_mut();
            while let Some(pos) = ledger.iter().rposition(|(_, owner)| *owner == self.id) {
                let (pin, _) = ledger.remove(pos);
                tracing::trace!(addr = pin.addr, elem = pin.elem, "releasing source");
            }
        });
    }
}

impl core::fmt::Debug for ScopeGuard {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScopeGuard")
            .field("id", &self.id)
            .field("pins", &self.pins())
            .finish()
    }
}

/// A view handed to the body of [`with_views`].
///
/// Dereferences to the view itself. The `'g` lifetime is the scope's, so a
/// `Bound` cannot be returned out of the body that received it.
pub struct Bound<'g, V> {
    view: V,
    _scope: PhantomData<&'g ScopeGuard>,
}

impl<V> core::ops::Deref for Bound<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        &self.view
    }
}

impl<V> core::ops::DerefMut for Bound<'_, V> {
    fn deref_mut(&mut self) -> &mut V {
        &mut self.view
    }
}

impl<V: core::fmt::Debug> core::fmt::Debug for Bound<'_, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.view.fmt(f)
    }
}

fn bind_scoped<'g, 'a, S: ViewSource + ?Sized>(
    guard: &'g ScopeGuard,
    src: &'a mut S,
) -> Bound<'g, ViewOf<'a, S>> {
    guard.pin(src);
    Bound {
        view: uview(src),
        _scope: PhantomData,
    }
}

/// A group of exclusively borrowed sources that can be bound together.
///
/// Implemented for tuples of `&mut S` up to six elements, each with its own
/// source type, and for arrays `[&mut S; N]`. The views keep the sources'
/// borrow, and `'g` marks the scope they were bound in.
pub trait ViewSources {
    type Views<'g>;

    fn bind_all<'g>(self, guard: &'g ScopeGuard) -> Self::Views<'g>;
}

macro_rules! impl_view_sources_tuple {
    ($($name:ident),+) => {
        impl<'a, $($name: ViewSource + ?Sized),+> ViewSources for ($(&'a mut $name,)+) {
            type Views<'g> = ($(Bound<'g, ViewOf<'a, $name>>,)+);

            #[allow(non_snake_case)]
            fn bind_all<'g>(self, guard: &'g ScopeGuard) -> Self::Views<'g> {
                let ($($name,)+) = self;
                ($(bind_scoped(guard, $name),)+)
            }
        }
    };
}

impl_view_sources_tuple!(A);
impl_view_sources_tuple!(A, B);
impl_view_sources_tuple!(A, B, C);
impl_view_sources_tuple!(A, B, C, D);
impl_view_sources_tuple!(A, B, C, D, E);
impl_view_sources_tuple!(A, B, C, D, E, F);

impl<'a, S: ViewSource + ?Sized, const N: usize> ViewSources for [&'a mut S; N] {
    type Views<'g> = [Bound<'g, ViewOf<'a, S>>; N];

    fn bind_all<'g>(self, guard: &'g ScopeGuard) -> Self::Views<'g> {
        self.map(|src| bind_scoped(guard, src))
    }
}

/// Bind `sources`, run `body` with their views, then release the pins.
///
/// The pins are released even if `body` panics. Views cannot be returned out
/// of `body`:
///
/// ```compile_fail
/// use unview_core::{UView, with_views};
///
/// let mut data = [1u8, 2];
/// let mut src = UView::from_slice_mut(&mut data, &[2]).unwrap();
/// let escaped = with_views((&mut src,), |(view,)| view);
/// ```
pub fn with_views<S, R>(sources: S, body: impl for<'g> FnOnce(S::Views<'g>) -> R) -> R
where
    S: ViewSources,
{
    let guard = ScopeGuard::enter();
    let views = sources.bind_all(&guard);
    body(views)
}

/// Shadow each named source with a view of it for the duration of a block.
///
/// Owned sources are named as they are. Sources held through a `&mut`
/// binding, such as function parameters, are written `&mut name`.
///
/// ```
/// use unview_core::{NdAccess, UView, bind_views};
///
/// let mut data = [1u32, 2, 3, 4];
/// let mut src = UView::from_slice_mut(&mut data, &[2, 2]).unwrap();
/// let sum: u32 = bind_views!(src => {
///     src[[1, 1]] = 40;
///     src.iter().sum()
/// });
/// assert_eq!(sum, 46);
///
/// fn double(src: &mut UView<'_, u32>) {
///     bind_views!(&mut src => {
///         for x in src.iter_mut() {
///             *x *= 2;
///         }
///     })
/// }
/// double(&mut src);
/// assert_eq!(src.as_slice(), &[2, 4, 6, 80]);
/// ```
#[macro_export]
macro_rules! bind_views {
    (@bind $guard:ident; => $body:block) => {
        $body
    };
    (@bind $guard:ident; &mut $name:ident $($rest:tt)*) => {{
        #[allow(unused_mut)]
        let mut $name = $guard.bind(&mut *$name);
        $crate::bind_views!(@next $guard; $($rest)*)
    }};
    (@bind $guard:ident; $name:ident $($rest:tt)*) => {{
        #[allow(unused_mut)]
        let mut $name = $guard.bind(&mut $name);
        $crate::bind_views!(@next $guard; $($rest)*)
    }};
    (@next $guard:ident; , $($rest:tt)*) => {
        $crate::bind_views!(@bind $guard; $($rest)*)
    };
    (@next $guard:ident; => $body:block) => {
        $body
    };
    ($($tokens:tt)+) => {{
        let __guard = $crate::ScopeGuard::enter();
        $crate::bind_views!(@bind __guard; $($tokens)+)
    }};
}
