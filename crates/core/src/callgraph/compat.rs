//! Type compatibility for indirect-call resolution.
//!
//! Deliberately over-approximating: it is a matching relation, not type
//! equality. The rules mirror what C code actually gets away with through
//! function-pointer casts.

use std::mem::discriminant;

use crate::ir::{TypeId, TypeKind, TypeTable};

/// Whether a value of type `t2` may flow where `t1` is expected.
///
/// Rules, in order:
/// - pointer vs pointer: an 8-bit-integer pointee on the expected side
///   (`void*` / `char*`) matches any pointee; otherwise recurse.
/// - array vs array: recurse on element types.
/// - integer vs integer: always compatible.
/// - integer vs pointer: compatible iff the integer width equals the
///   pointer's address-space number (a pointer-sized integer cast).
/// - struct vs struct: literal-ness must agree; literal structs compare
///   structurally, named structs by name.
/// - function vs function: compatible returns; a variadic expected type
///   requires a variadic actual; otherwise equal arity and pairwise
///   compatible parameters.
/// - anything else: same type kind.
pub fn compatible(types: &TypeTable, t1: TypeId, t2: TypeId) -> bool {
    match (types.kind(t1), types.kind(t2)) {
        (TypeKind::Pointer { pointee: p1, .. }, TypeKind::Pointer { pointee: p2, .. }) => {
            if matches!(types.kind(*p1), TypeKind::Integer { bits: 8 }) {
                return true;
            }
            compatible(types, *p1, *p2)
        }
        (TypeKind::Pointer { .. }, _) => false,
        (TypeKind::Array { elem: e1, .. }, TypeKind::Array { elem: e2, .. }) => {
            compatible(types, *e1, *e2)
        }
        (TypeKind::Array { .. }, _) => false,
        (TypeKind::Integer { .. }, TypeKind::Integer { .. }) => true,
        (TypeKind::Integer { bits }, TypeKind::Pointer { addr_space, .. }) => bits == addr_space,
        (TypeKind::Integer { .. }, _) => false,
        (
            TypeKind::Struct { name: n1, literal: l1, fields: f1 },
            TypeKind::Struct { name: n2, literal: l2, fields: f2 },
        ) => {
            if l1 != l2 {
                return false;
            }
            if *l1 {
                f1.len() == f2.len()
                    && f1.iter().zip(f2).all(|(a, b)| compatible(types, *a, *b))
            } else {
                n1 == n2
            }
        }
        (TypeKind::Struct { .. }, _) => false,
        (
            TypeKind::Function { ret: r1, params: p1, var_arg: v1 },
            TypeKind::Function { ret: r2, params: p2, var_arg: v2 },
        ) => {
            if !compatible(types, *r1, *r2) {
                return false;
            }
            if *v1 {
                return *v2;
            }
            p1.len() == p2.len() && p1.iter().zip(p2).all(|(a, b)| compatible(types, *a, *b))
        }
        (TypeKind::Function { .. }, _) => false,
        (TypeKind::Float { bits: b1 }, TypeKind::Float { bits: b2 }) => b1 == b2,
        (k1, k2) => discriminant(k1) == discriminant(k2),
    }
}
