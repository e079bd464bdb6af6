//! Function-pointer cell tracking.
//!
//! Cells are string ids naming the places a function pointer can live: a
//! struct field (`<struct-name>,<index>`), a global variable (its scope
//! name), an argument slot or a return-value slot. Global initializers are
//! scanned here; the assignment-based resolver also walks values through
//! the cells.

use std::collections::HashSet;

use crate::context::GlobalContext;
use crate::ir::{
    module_stem, Callee, Const, FuncId, GlobalId, InstKind, ModuleId, Program, TypeTable,
    ValueRef,
};

/// Sentinel id for an unnamed struct initializer with no enclosing
/// variable. Cells keyed by it are only consulted by the non-default
/// resolution mode and the sentinel never reaches output files.
pub const UNNAMED_STRUCT_ID: &str = "<unnamed>";

fn is_anon_struct(name: &str) -> bool {
    name.starts_with("struct.anon.") || name.starts_with("union.anon")
}

/// Structural id of a struct field. Anonymous struct names are qualified by
/// their module stem, since they only mean something within one unit.
fn struct_field_id(program: &Program, module: ModuleId, name: &str, index: usize) -> String {
    if is_anon_struct(name) {
        format!("_{}.{},{}", module_stem(&program.module(module).path), name, index)
    } else {
        format!("{},{}", name, index)
    }
}

pub(crate) fn arg_id(program: &Program, f: FuncId, index: usize) -> String {
    format!("{}.arg{}", program.scope_name(f), index)
}

pub(crate) fn ret_id(program: &Program, f: FuncId) -> String {
    format!("{}.ret", program.scope_name(f))
}

/// Walk a global's initializer and record every function-pointer
/// assignment found in it. Returns whether any cell grew.
pub(crate) fn process_initializers(
    program: &Program,
    ctx: &mut GlobalContext,
    g: GlobalId,
) -> bool {
    let gd = program.global(g);
    match &gd.init {
        Some(init) => process_constant(program, ctx, gd.module, init, Some(g), ""),
        None => false,
    }
}

fn process_constant(
    program: &Program,
    ctx: &mut GlobalContext,
    module: ModuleId,
    c: &Const,
    var: Option<GlobalId>,
    id: &str,
) -> bool {
    let mut changed = false;
    match c {
        Const::Struct { type_name, literal, fields } => {
            let mut id = id.to_string();
            if type_name.is_none() && id.is_empty() {
                id = match var {
                    Some(g) => program.global_scope_name(g),
                    None => UNNAMED_STRUCT_ID.to_string(),
                };
            }
            for (index, field) in fields.iter().enumerate() {
                match field {
                    Const::Struct { .. } => {
                        let new_id = if id.is_empty() {
                            format!("{},{}", type_name.as_deref().unwrap_or_default(), index)
                        } else {
                            format!("{},{}", id, index)
                        };
                        changed |= process_constant(program, ctx, module, field, None, &new_id);
                    }
                    Const::Array { .. } => {
                        changed |= process_constant(program, ctx, module, field, None, "");
                    }
                    Const::Func(f) => {
                        let mut new_id = String::new();
                        if !*literal {
                            if let Some(name) = type_name {
                                if !is_anon_struct(name) || id.is_empty() {
                                    new_id = struct_field_id(program, module, name, index);
                                }
                            }
                        }
                        if new_id.is_empty() {
                            debug_assert!(!id.is_empty());
                            new_id = format!("{},{}", id, index);
                        }
                        let def = ctx.func_def(program, *f);
                        changed |= ctx.func_ptrs.entry(new_id).or_default().insert(def);
                    }
                    Const::Other => {}
                }
            }
        }
        Const::Array { elems } => {
            for elem in elems {
                changed |= process_constant(program, ctx, module, elem, var, id);
            }
        }
        Const::Func(f) => {
            if let Some(g) = var {
                let def = ctx.func_def(program, *f);
                changed |= ctx
                    .func_ptrs
                    .entry(program.global_scope_name(g))
                    .or_default()
                    .insert(def);
            }
        }
        Const::Other => {}
    }
    changed
}

/// Recursively collect the functions a value may refer to. Casts are
/// transparent; phi and select fan out; arguments, loads and call results
/// consult their cells. A visited set breaks cycles through phis.
pub(crate) fn find_functions(
    program: &Program,
    ctx: &mut GlobalContext,
    v: ValueRef,
    out: &mut HashSet<FuncId>,
) -> bool {
    let mut visited = HashSet::new();
    find_functions_rec(program, ctx, v, out, &mut visited)
}

fn find_functions_rec(
    program: &Program,
    ctx: &mut GlobalContext,
    v: ValueRef,
    out: &mut HashSet<FuncId>,
    visited: &mut HashSet<ValueRef>,
) -> bool {
    if !visited.insert(v) {
        return false;
    }
    match v {
        ValueRef::Func(f) => out.insert(ctx.func_def(program, f)),
        ValueRef::Arg(f, index) => {
            let insert_empty =
                program.types.is_function_pointer(program.func(f).param_tys[index]);
            merge_cell(ctx, out, &arg_id(program, f, index), insert_empty)
        }
        ValueRef::Local(inst) => {
            let data = program.inst(inst);
            match &data.kind {
                InstKind::Cast { operand } => {
                    find_functions_rec(program, ctx, *operand, out, visited)
                }
                InstKind::Phi { incoming } => {
                    let incoming = incoming.clone();
                    let mut changed = false;
                    for value in incoming {
                        changed |= find_functions_rec(program, ctx, value, out, visited);
                    }
                    changed
                }
                InstKind::Select { true_value, false_value } => {
                    let (t, f) = (*true_value, *false_value);
                    let mut changed = find_functions_rec(program, ctx, t, out, visited);
                    changed |= find_functions_rec(program, ctx, f, out, visited);
                    changed
                }
                InstKind::BinOp { lhs, rhs } => {
                    let (lhs, rhs) = (*lhs, *rhs);
                    match (lhs.is_constant(), rhs.is_constant()) {
                        (false, true) => find_functions_rec(program, ctx, lhs, out, visited),
                        (true, false) => find_functions_rec(program, ctx, rhs, out, visited),
                        _ => false,
                    }
                }
                InstKind::Load { cell } => match cell.clone() {
                    Some(cell) => {
                        let insert_empty = program.types.is_function_pointer(data.ty);
                        merge_cell(ctx, out, &cell, insert_empty)
                    }
                    None => false,
                },
                InstKind::Call(call) => {
                    if let Callee::Direct(f) = call.callee {
                        ctx.insert_callee(program, inst, f);
                    }
                    let callees: Vec<FuncId> =
                        ctx.callees.get(&inst).into_iter().flatten().copied().collect();
                    let insert_empty = program.types.is_function_pointer(data.ty);
                    let mut changed = false;
                    for cf in callees {
                        changed |= merge_cell(ctx, out, &ret_id(program, cf), insert_empty);
                    }
                    changed
                }
                _ => false,
            }
        }
        ValueRef::Constant | ValueRef::Other => false,
    }
}

/// Merge the cell's contents into `out`. When the cell does not exist yet
/// and `insert_empty` is set, an empty cell is created so later sweeps
/// observe writes to it.
fn merge_cell(
    ctx: &mut GlobalContext,
    out: &mut HashSet<FuncId>,
    id: &str,
    insert_empty: bool,
) -> bool {
    if let Some(set) = ctx.func_ptrs.get(id) {
        let before = out.len();
        out.extend(set.iter().copied());
        out.len() > before
    } else {
        if insert_empty {
            ctx.func_ptrs.insert(id.to_string(), HashSet::new());
        }
        false
    }
}

/// Merge `src` into the cell named `id`.
pub(crate) fn merge_into_cell(
    ctx: &mut GlobalContext,
    id: &str,
    src: &HashSet<FuncId>,
    insert_empty: bool,
) -> bool {
    if !ctx.func_ptrs.contains_key(id) && src.is_empty() {
        if insert_empty {
            ctx.func_ptrs.insert(id.to_string(), HashSet::new());
        }
        return false;
    }
    let entry = ctx.func_ptrs.entry(id.to_string()).or_default();
    let before = entry.len();
    entry.extend(src.iter().copied());
    entry.len() > before
}

pub(crate) fn is_fn_ptr_or_void_ptr(types: &TypeTable, ty: crate::ir::TypeId) -> bool {
    types.is_function_pointer(ty) || types.is_void_pointer(ty)
}

/// Whether a value is function-pointer-shaped (strictly; used for the
/// insert-empty decision).
pub(crate) fn value_is_fn_ptr(program: &Program, v: ValueRef) -> bool {
    match v {
        ValueRef::Func(_) => true,
        ValueRef::Local(inst) => program.types.is_function_pointer(program.inst(inst).ty),
        ValueRef::Arg(f, index) => {
            program.types.is_function_pointer(program.func(f).param_tys[index])
        }
        _ => false,
    }
}

/// Whether a value is function-pointer- or `void*`-shaped.
pub(crate) fn value_is_fn_ptr_like(program: &Program, v: ValueRef) -> bool {
    match v {
        ValueRef::Func(_) => true,
        ValueRef::Local(inst) => is_fn_ptr_or_void_ptr(&program.types, program.inst(inst).ty),
        ValueRef::Arg(f, index) => {
            is_fn_ptr_or_void_ptr(&program.types, program.func(f).param_tys[index])
        }
        _ => false,
    }
}

/// Debug dump of every function-pointer cell; internal-linkage members are
/// marked `f`, external ones `F`.
pub fn dump_func_ptrs(program: &Program, ctx: &GlobalContext) {
    for (id, set) in &ctx.func_ptrs {
        log::trace!("{}", id);
        for &f in set {
            let fd = program.func(f);
            let marker = if fd.external_linkage { "F" } else { "f" };
            log::trace!("  {} {}", marker, fd.name);
        }
    }
}
