//! Element type classification.
//!
//! An unchecked view may only alias elements that are *plain*: fixed-size
//! values with no embedded ownership or indirection. Whether a type is plain
//! is declared through [`Element`], in the same way the value layer declares
//! how a Rust type maps onto raw storage.
//!
//! # Implemented for
//!
//! - Plain: integers, floats, `bool`, `char`, `()`, `Wrapping<T>`
//! - Follows its components: `[T; N]`, `Option<T>`, tuples up to arity 6
//! - Indirect: references, raw pointers, `Box<T>`, `Vec<T>`, `String`,
//!   `Rc<T>`, `Arc<T>`
//!
//! Your own types opt in with a one-line impl:
//!
//! ```
//! use unview_core::{ElemKind, Element};
//!
//! #[derive(Clone, Copy)]
//! struct Point {
//!     x: f32,
//!     y: f32,
//! }
//!
//! impl Element for Point {
//!     const KIND: ElemKind = ElemKind::Plain;
//! }
//! ```

use std::num::Wrapping;
use std::rc::Rc;
use std::sync::Arc;

/// Memory class of an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElemKind {
    /// Fixed layout, no references, no owned heap data.
    Plain,
    /// Carries a reference, a pointer, or owned heap data.
    Indirect,
}

impl ElemKind {
    /// Plain only if both sides are plain.
    pub const fn and(self, other: ElemKind) -> ElemKind {
        match (self, other) {
            (ElemKind::Plain, ElemKind::Plain) => ElemKind::Plain,
            _ => ElemKind::Indirect,
        }
    }

    pub const fn is_plain(self) -> bool {
        matches!(self, ElemKind::Plain)
    }
}

/// Declares the memory class of an array element type.
///
/// Declaring a type [`ElemKind::Plain`] does not make it plain: types that
/// need drop glue are always classified as [`ElemKind::Indirect`] by
/// [`element_kind`].
pub trait Element {
    const KIND: ElemKind;
}

/// Effective memory class of `T`.
///
/// This is `T::KIND`, downgraded to `Indirect` when `T` has drop glue.
#[inline]
pub const fn element_kind<T: Element>() -> ElemKind {
    if core::mem::needs_drop::<T>() {
        ElemKind::Indirect
    } else {
        T::KIND
    }
}

macro_rules! impl_element {
    ($kind:ident: $($ty:ty),* $(,)?) => {
        $(
            impl Element for $ty {
                const KIND: ElemKind = ElemKind::$kind;
            }
        )*
    };
}

impl_element!(Plain: u8, u16, u32, u64, u128, usize);
impl_element!(Plain: i8, i16, i32, i64, i128, isize);
impl_element!(Plain: f32, f64, bool, char, ());
impl_element!(Indirect: String);

impl<T: Element> Element for Wrapping<T> {
    const KIND: ElemKind = T::KIND;
}

impl<T: Element, const N: usize> Element for [T; N] {
    const KIND: ElemKind = T::KIND;
}

impl<T: Element> Element for Option<T> {
    const KIND: ElemKind = T::KIND;
}

impl<T: ?Sized> Element for &T {
    const KIND: ElemKind = ElemKind::Indirect;
}

impl<T: ?Sized> Element for &mut T {
    const KIND: ElemKind = ElemKind::Indirect;
}

impl<T: ?Sized> Element for *const T {
    const KIND: ElemKind = ElemKind::Indirect;
}

impl<T: ?Sized> Element for *mut T {
    const KIND: ElemKind = ElemKind::Indirect;
}

impl<T: ?Sized> Element for Box<T> {
    const KIND: ElemKind = ElemKind::Indirect;
}

impl<T> Element for Vec<T> {
    const KIND: ElemKind = ElemKind::Indirect;
}

impl<T: ?Sized> Element for Rc<T> {
    const KIND: ElemKind = ElemKind::Indirect;
}

impl<T: ?Sized> Element for Arc<T> {
    const KIND: ElemKind = ElemKind::Indirect;
}

macro_rules! impl_element_tuple {
    ($first:ident $(, $rest:ident)*) => {
        impl<$first: Element $(, $rest: Element)*> Element for ($first, $($rest,)*) {
            const KIND: ElemKind = $first::KIND $(.and($rest::KIND))*;
        }
    };
}

impl_element_tuple!(A);
impl_element_tuple!(A, B);
impl_element_tuple!(A, B, C);
impl_element_tuple!(A, B, C, D);
impl_element_tuple!(A, B, C, D, E);
impl_element_tuple!(A, B, C, D, E, F);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn primitives_are_plain() {
        assert_eq!(element_kind::<u8>(), ElemKind::Plain);
        assert_eq!(element_kind::<i64>(), ElemKind::Plain);
        assert_eq!(element_kind::<f32>(), ElemKind::Plain);
        assert_eq!(element_kind::<bool>(), ElemKind::Plain);
        assert_eq!(element_kind::<char>(), ElemKind::Plain);
    }

    #[test]
    fn owning_containers_are_indirect() {
        assert_eq!(element_kind::<Vec<f64>>(), ElemKind::Indirect);
        assert_eq!(element_kind::<Box<i32>>(), ElemKind::Indirect);
        assert_eq!(element_kind::<String>(), ElemKind::Indirect);
        assert_eq!(element_kind::<Rc<u8>>(), ElemKind::Indirect);
        assert_eq!(element_kind::<Arc<[u8]>>(), ElemKind::Indirect);
    }

    #[test]
    fn references_are_indirect_without_drop_glue() {
        assert!(!core::mem::needs_drop::<&'static i32>());
        assert_eq!(element_kind::<&'static i32>(), ElemKind::Indirect);
        assert_eq!(element_kind::<*const u8>(), ElemKind::Indirect);
    }

    #[test]
    fn composites_follow_components() {
        assert_eq!(element_kind::<[f64; 3]>(), ElemKind::Plain);
        assert_eq!(element_kind::<(u8, f32, [i16; 2])>(), ElemKind::Plain);
        assert_eq!(element_kind::<(u8, Box<u8>)>(), ElemKind::Indirect);
        assert_eq!(element_kind::<Option<u32>>(), ElemKind::Plain);
        assert_eq!(element_kind::<Option<Vec<u32>>>(), ElemKind::Indirect);
        assert_eq!(element_kind::<Wrapping<u16>>(), ElemKind::Plain);
    }

    #[test]
    fn drop_glue_overrides_plain_declaration() {
        struct Liar(#[allow(dead_code)] Vec<u8>);
        impl Element for Liar {
            const KIND: ElemKind = ElemKind::Plain;
        }
        assert_eq!(element_kind::<Liar>(), ElemKind::Indirect);
    }
}
