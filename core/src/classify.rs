//! Eligibility classifier.
//!
//! Decides whether a request can be served by a bare pointer and shape. The
//! decision is a pure function of the element class, the layout class, and
//! whether the requested region is one contiguous run, so it is cheap enough
//! to run on every view request.

use core::fmt;

use crate::element::ElemKind;
use crate::error::ViewError;
use crate::layout::LayoutClass;

/// Why an unchecked view cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ineligible {
    /// The element type carries ownership or indirection.
    ElementType,
    /// The source reports [`LayoutClass::Unsupported`].
    UnsupportedLayout,
    /// The requested region is not one row-major run.
    NonContiguous,
    /// The source indexes from a non-zero origin.
    OffsetOrigin,
}

impl Ineligible {
    /// The error a strict caller sees for this reason.
    pub fn into_error(self, type_name: &'static str) -> ViewError {
        match self {
            Ineligible::ElementType => ViewError::IneligibleElementType { type_name },
            Ineligible::UnsupportedLayout | Ineligible::NonContiguous | Ineligible::OffsetOrigin => {
                ViewError::LayoutUnsupported
            }
        }
    }
}

impl fmt::Display for Ineligible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ineligible::ElementType => write!(f, "element type is not plain"),
            Ineligible::UnsupportedLayout => write!(f, "layout is not pointer-addressable"),
            Ineligible::NonContiguous => write!(f, "region is not contiguous"),
            Ineligible::OffsetOrigin => write!(f, "source uses an offset index origin"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Eligible,
    Ineligible(Ineligible),
}

impl Verdict {
    pub const fn is_eligible(self) -> bool {
        matches!(self, Verdict::Eligible)
    }
}

/// Decide whether an unchecked view is legal.
///
/// `contiguous` states whether the requested region (the whole array, or the
/// resolved index expression) is one row-major run of elements.
pub const fn classify(elem: ElemKind, layout: LayoutClass, contiguous: bool) -> Verdict {
    match (elem, layout) {
        (ElemKind::Indirect, _) => Verdict::Ineligible(Ineligible::ElementType),
        (_, LayoutClass::Unsupported) => Verdict::Ineligible(Ineligible::UnsupportedLayout),
        _ if !contiguous => Verdict::Ineligible(Ineligible::NonContiguous),
        _ => Verdict::Eligible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LAYOUTS: [LayoutClass; 3] = [
        LayoutClass::Owning,
        LayoutClass::ContiguousView,
        LayoutClass::StridedView,
    ];

    #[test]
    fn plain_contiguous_is_eligible() {
        for layout in LAYOUTS {
            assert_eq!(classify(ElemKind::Plain, layout, true), Verdict::Eligible);
        }
    }

    #[test]
    fn indirect_elements_always_rejected() {
        for layout in LAYOUTS {
            assert_eq!(
                classify(ElemKind::Indirect, layout, true),
                Verdict::Ineligible(Ineligible::ElementType)
            );
        }
        assert_eq!(
            classify(ElemKind::Indirect, LayoutClass::Unsupported, false),
            Verdict::Ineligible(Ineligible::ElementType)
        );
    }

    #[test]
    fn unsupported_layout_rejected_even_when_contiguous() {
        assert_eq!(
            classify(ElemKind::Plain, LayoutClass::Unsupported, true),
            Verdict::Ineligible(Ineligible::UnsupportedLayout)
        );
    }

    #[test]
    fn non_contiguous_region_rejected() {
        for layout in LAYOUTS {
            assert_eq!(
                classify(ElemKind::Plain, layout, false),
                Verdict::Ineligible(Ineligible::NonContiguous)
            );
        }
    }

    #[test]
    fn usable_in_const_context() {
        const V: Verdict = classify(ElemKind::Plain, LayoutClass::Owning, true);
        assert!(V.is_eligible());
    }

    #[test]
    fn reasons_map_to_errors() {
        assert_eq!(
            Ineligible::ElementType.into_error("alloc::vec::Vec<f64>"),
            ViewError::IneligibleElementType {
                type_name: "alloc::vec::Vec<f64>"
            }
        );
        assert_eq!(
            Ineligible::OffsetOrigin.into_error("f64"),
            ViewError::LayoutUnsupported
        );
    }
}
