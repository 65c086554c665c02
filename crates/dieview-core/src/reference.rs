//! # DIE References
//!
//! Following reference attributes to the DIE they point at.
//!
//! Unit-relative forms (`ref1`..`ref8`, `ref_udata`) are offsets from the
//! start of the referencing unit. `ref_addr` is an absolute `.debug_info`
//! offset; its target unit is the one whose span contains it. Type-signature
//! and supplementary-file references cannot be followed within one file.

use gimli::DwForm;
use gimli::constants::*;

use crate::error::{DieViewError, Result};
use crate::source::DwarfSource;
use crate::types::{Attribute, CompileUnit, UnitId};

/// How a reference form addresses its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind
{
    /// Offset from the start of the referencing unit
    UnitRelative,
    /// Absolute offset in `.debug_info`
    SectionAbsolute,
    /// Type signature or supplementary file reference
    Unsupported,
}

/// A resolved reference: the target unit and the target's absolute offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReferenceTarget
{
    pub unit: UnitId,
    pub offset: u64,
}

/// The reference kind of `form`, or `None` if it is not a reference form.
pub fn reference_kind(form: DwForm) -> Option<ReferenceKind>
{
    match form {
        DW_FORM_ref1 | DW_FORM_ref2 | DW_FORM_ref4 | DW_FORM_ref8 | DW_FORM_ref_udata => {
            Some(ReferenceKind::UnitRelative)
        }
        DW_FORM_ref_addr => Some(ReferenceKind::SectionAbsolute),
        DW_FORM_ref_sig8 | DW_FORM_ref_sup4 | DW_FORM_ref_sup8 | DW_FORM_GNU_ref_alt => {
            Some(ReferenceKind::Unsupported)
        }
        _ => None,
    }
}

/// Whether `attr` is a reference of any kind, followable or not.
pub fn is_reference(attr: &Attribute) -> bool
{
    reference_kind(attr.form()).is_some()
}

/// Whether `form` is a reference that can be followed.
pub fn is_followable(form: DwForm) -> bool
{
    matches!(
        reference_kind(form),
        Some(ReferenceKind::UnitRelative | ReferenceKind::SectionAbsolute)
    )
}

/// Resolve the reference attribute `attr` of a DIE in `unit`.
///
/// Returns `Ok(None)` for non-reference attributes and for `ref_addr` values
/// outside every known unit.
///
/// ## Errors
///
/// `UnsupportedReferenceKind` for signature and supplementary references.
pub fn resolve_reference<S: DwarfSource + ?Sized>(
    source: &S,
    unit: &CompileUnit,
    attr: &Attribute,
) -> Result<Option<ReferenceTarget>>
{
    let Some(kind) = reference_kind(attr.form()) else {
        return Ok(None);
    };

    match kind {
        ReferenceKind::Unsupported => Err(DieViewError::UnsupportedReferenceKind { form: attr.form() }),
        ReferenceKind::UnitRelative => Ok(attr.value().as_unsigned().map(|value| ReferenceTarget {
            unit: unit.id(),
            offset: unit.offset().wrapping_add(value),
        })),
        ReferenceKind::SectionAbsolute => {
            let Some(offset) = attr.value().as_unsigned() else {
                return Ok(None);
            };
            let target = source.unit_containing(offset).map(|target| ReferenceTarget {
                unit: target.id(),
                offset,
            });
            if target.is_none() {
                tracing::debug!(offset, "ref_addr outside every unit");
            }
            Ok(target)
        }
    }
}
