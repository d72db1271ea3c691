//! Field placement and overlap detection.

use crate::arena::DeclArena;
use crate::decl::{Parent, VarFlags};
use crate::error::DeclError;
use crate::ids::{AggregateId, DeclId};
use crate::stc::StorageClass;
use crate::types::TypeQuery;

/// Place `field` as the next field of `aggregate` and return its offset.
///
/// The field is aligned to its explicit `align` or the natural alignment of
/// its type. Struct fields advance `next_offset`; union fields all start at
/// the same offset and leave it alone. The aggregate grows to cover the
/// field either way.
pub fn set_field_offset(
    arena: &mut DeclArena,
    types: &dyn TypeQuery,
    aggregate: AggregateId,
    field: DeclId,
    next_offset: &mut u32,
    is_union: bool,
) -> u32 {
    let decl = arena.get(field);
    let Some(var) = decl.as_var() else {
        return *next_offset;
    };
    let size = decl.ty.map_or(0, |ty| types.size(ty));
    let align = var
        .alignment
        .or_else(|| decl.ty.map(|ty| types.alignment(ty)))
        .unwrap_or(1)
        .max(1);

    let offset = next_offset.next_multiple_of(align);
    let end = offset.saturating_add(size);
    if !is_union {
        *next_offset = end;
    }

    let decl = arena.get_mut(field);
    decl.stc |= StorageClass::FIELD;
    decl.parent = Parent::Aggregate(aggregate);
    if let Some(var) = decl.as_var_mut() {
        var.offset = offset;
        var.size = size;
    }
    let agg = arena.aggregate_mut(aggregate);
    agg.size = agg.size.max(end);
    agg.fields.push(field);
    tracing::trace!(?field, offset, size, "field placed");
    offset
}

/// Whether two fields of the same aggregate share at least one byte. Empty
/// fields overlap nothing, and a field is not considered to overlap itself.
pub fn is_overlapped_with(arena: &DeclArena, a: DeclId, b: DeclId) -> bool {
    if a == b {
        return false;
    }
    match (arena.is_member(a), arena.is_member(b)) {
        (Some(agg_a), Some(agg_b)) if agg_a == agg_b => {}
        _ => return false,
    }
    let (Some(va), Some(vb)) = (arena.var(a), arena.var(b)) else {
        return false;
    };
    if va.size == 0 || vb.size == 0 {
        return false;
    }
    let a_end = u64::from(va.offset) + u64::from(va.size);
    let b_end = u64::from(vb.offset) + u64::from(vb.size);
    u64::from(va.offset) < b_end && u64::from(vb.offset) < a_end
}

/// Flag every pair of overlapping fields of `aggregate`.
///
/// Both fields of a pair get [`VarFlags::OVERLAPPED`]. When either of them
/// holds pointers they also get [`VarFlags::OVERLAP_UNSAFE`], which makes
/// accessing them unsafe, and the pair is returned as a warning.
#[tracing::instrument(level = "debug", skip(arena, types))]
pub fn mark_overlapping_fields(
    arena: &mut DeclArena,
    types: &dyn TypeQuery,
    aggregate: AggregateId,
) -> Vec<DeclError> {
    let fields = arena.aggregate(aggregate).fields.clone();
    let has_pointers = |arena: &DeclArena, field: DeclId| {
        arena.get(field).ty.is_some_and(|ty| types.has_pointers(ty))
    };

    let mut findings = Vec::new();
    for (i, &first) in fields.iter().enumerate() {
        for &second in &fields[i + 1..] {
            if !is_overlapped_with(arena, first, second) {
                continue;
            }
            let unsafe_pair = has_pointers(arena, first) || has_pointers(arena, second);
            let mut flags = VarFlags::OVERLAPPED;
            if unsafe_pair {
                flags |= VarFlags::OVERLAP_UNSAFE;
            }
            for field in [first, second] {
                if let Some(var) = arena.var_mut(field) {
                    var.flags |= flags;
                }
            }
            if unsafe_pair {
                tracing::debug!(?first, ?second, "unsafe field overlap");
                findings.push(DeclError::UnsafeFieldOverlap {
                    aggregate,
                    first,
                    second,
                });
            }
        }
    }
    findings
}
