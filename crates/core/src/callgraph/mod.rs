//! Whole-program call-graph construction.
//!
//! Direct edges come from symbol resolution (preferring definitions to
//! declarations), indirect edges from signature compatibility against the
//! address-taken set. The pass sweeps all modules to fixpoint, then inverts
//! the callee map into the caller map.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;

mod compat;
mod funcptr;

pub use compat::compatible;
pub use funcptr::{dump_func_ptrs, UNNAMED_STRUCT_ID};

use crate::context::GlobalContext;
use crate::error::AnalysisResult;
use crate::ir::{CallData, Callee, FuncId, InstId, InstKind, ModuleId, Program};
use crate::paths::absolute_path;

/// File name of the call-graph dump.
pub const CALL_GRAPH_OUTPUT_FILE: &str = "callgraph_result";

/// How indirect call sites are resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolveMode {
    /// Match candidates from the address-taken set by signature. The
    /// default, and deliberately over-approximating.
    TypeBased,
    /// Propagate function-pointer assignments through stores, returns and
    /// argument passing. Kept for experiments; not the default.
    AssignmentBased,
}

/// The call-graph pass. Runs initialization (global-initializer scanning
/// and address-taken collection), the per-module fixpoint, and caller-map
/// finalization.
pub struct CallGraphPass {
    mode: ResolveMode,
}

impl Default for CallGraphPass {
    fn default() -> Self {
        Self::new()
    }
}

impl CallGraphPass {
    pub fn new() -> Self {
        Self { mode: ResolveMode::TypeBased }
    }

    pub fn with_mode(mode: ResolveMode) -> Self {
        Self { mode }
    }

    pub fn run(&self, program: &Program, ctx: &mut GlobalContext) {
        log::debug!("[call-graph] initializing {} modules", program.modules().len());
        let mut again = true;
        while again {
            again = false;
            for &module in program.modules() {
                again |= self.do_initialization(program, ctx, module);
            }
        }

        log::debug!("[call-graph] processing {} modules", program.modules().len());
        let mut iteration = 0u32;
        loop {
            iteration += 1;
            let mut changed = 0u32;
            for &module in program.modules() {
                if self.do_module_pass(program, ctx, module) {
                    changed += 1;
                }
            }
            log::debug!("[call-graph] iteration {}: updated in {} modules", iteration, changed);
            if changed == 0 {
                break;
            }
        }

        log::debug!("[call-graph] finalizing {} modules", program.modules().len());
        for &module in program.modules() {
            self.do_finalization(program, ctx, module);
        }

        if log::log_enabled!(log::Level::Trace) {
            funcptr::dump_func_ptrs(program, ctx);
        }
    }

    /// Collect function-pointer assignments in global initializers and the
    /// address-taken functions of one module.
    fn do_initialization(
        &self,
        program: &Program,
        ctx: &mut GlobalContext,
        module: ModuleId,
    ) -> bool {
        let mut changed = false;
        let md = program.module(module);
        for &g in &md.globals {
            changed |= funcptr::process_initializers(program, ctx, g);
        }
        for &f in &md.functions {
            let fd = program.func(f);
            if fd.in_init_text() {
                continue;
            }
            if fd.address_taken {
                changed |= ctx.address_taken_funcs.insert(f);
            }
        }
        changed
    }

    /// Sweep one module's functions until no callee set grows.
    fn do_module_pass(&self, program: &Program, ctx: &mut GlobalContext, module: ModuleId) -> bool {
        let mut ret = false;
        let mut changed = true;
        while changed {
            changed = false;
            for &f in &program.module(module).functions {
                changed |= self.run_on_function(program, ctx, f);
            }
            ret |= changed;
        }
        ret
    }

    fn run_on_function(&self, program: &Program, ctx: &mut GlobalContext, f: FuncId) -> bool {
        let fd = program.func(f);
        if fd.in_init_text() {
            return false;
        }
        let mut changed = false;
        for &block in &fd.blocks {
            for &inst in &program.block(block).insts {
                changed |= self.run_on_inst(program, ctx, inst);
            }
        }
        changed
    }

    fn run_on_inst(&self, program: &Program, ctx: &mut GlobalContext, inst: InstId) -> bool {
        let data = program.inst(inst);
        match &data.kind {
            InstKind::Call(call) => {
                // Ignore inline asm and intrinsic calls.
                if call.is_inline_asm {
                    return false;
                }
                if let Callee::Direct(cf) = call.callee {
                    if program.func(cf).is_intrinsic() {
                        return false;
                    }
                }
                let mut changed = self.find_callees(program, ctx, inst, call);
                if self.mode == ResolveMode::AssignmentBased {
                    changed |= self.propagate_call_args(program, ctx, inst, call);
                }
                changed
            }
            InstKind::Store { value, cell } if self.mode == ResolveMode::AssignmentBased => {
                let Some(cell) = cell else { return false };
                if !funcptr::value_is_fn_ptr_like(program, *value) {
                    return false;
                }
                let mut fs = HashSet::new();
                funcptr::find_functions(program, ctx, *value, &mut fs);
                funcptr::merge_into_cell(ctx, cell, &fs, funcptr::value_is_fn_ptr(program, *value))
            }
            InstKind::Ret { value: Some(value) } if self.mode == ResolveMode::AssignmentBased => {
                let func = program.inst_function(inst);
                let ret_ty = program.func(func).ret_ty;
                if !funcptr::is_fn_ptr_or_void_ptr(&program.types, ret_ty) {
                    return false;
                }
                let mut fs = HashSet::new();
                funcptr::find_functions(program, ctx, *value, &mut fs);
                funcptr::merge_into_cell(
                    ctx,
                    &funcptr::ret_id(program, func),
                    &fs,
                    funcptr::value_is_fn_ptr(program, *value),
                )
            }
            _ => false,
        }
    }

    /// Resolve the callees of one call site into the registry. Returns
    /// whether the callee set grew.
    fn find_callees(
        &self,
        program: &Program,
        ctx: &mut GlobalContext,
        site: InstId,
        call: &CallData,
    ) -> bool {
        match call.callee {
            Callee::Direct(cf) => ctx.insert_callee(program, site, cf),
            Callee::Indirect(value) => {
                ctx.record_indirect_call(site);
                match self.mode {
                    ResolveMode::TypeBased => {
                        self.find_callees_by_type(program, ctx, site, call)
                    }
                    ResolveMode::AssignmentBased => {
                        let mut fs = HashSet::new();
                        funcptr::find_functions(program, ctx, value, &mut fs);
                        let mut changed = false;
                        for f in fs {
                            changed |= ctx.insert_callee(program, site, f);
                        }
                        changed
                    }
                }
            }
        }
    }

    /// Type-based resolution: every address-taken, non-intrinsic function
    /// whose signature is compatible with the site is a candidate callee.
    fn find_callees_by_type(
        &self,
        program: &Program,
        ctx: &mut GlobalContext,
        site: InstId,
        call: &CallData,
    ) -> bool {
        let mut changed = false;
        let candidates: Vec<FuncId> = ctx.address_taken_funcs.iter().copied().collect();
        for f in candidates {
            let fd = program.func(f);
            if fd.is_intrinsic() {
                continue;
            }
            if !fd.is_var_arg && fd.param_tys.len() != call.args.len() {
                continue;
            }
            if !compatible(&program.types, fd.ret_ty, call.ret_ty) {
                continue;
            }
            let matched = fd
                .param_tys
                .iter()
                .zip(&call.args)
                .all(|(formal, actual)| compatible(&program.types, *formal, actual.ty));
            if matched {
                changed |= ctx.insert_callee(program, site, f);
            }
        }
        changed
    }

    /// Assignment-mode only: functions flowing into function-pointer
    /// arguments feed the callee's argument cells.
    fn propagate_call_args(
        &self,
        program: &Program,
        ctx: &mut GlobalContext,
        site: InstId,
        call: &CallData,
    ) -> bool {
        let mut changed = false;
        for (index, arg) in call.args.iter().enumerate() {
            if !funcptr::is_fn_ptr_or_void_ptr(&program.types, arg.ty) {
                continue;
            }
            let mut vs = HashSet::new();
            funcptr::find_functions(program, ctx, arg.value, &mut vs);
            if vs.is_empty() {
                continue;
            }
            let callees: Vec<FuncId> =
                ctx.callees.get(&site).into_iter().flatten().copied().collect();
            for cf in callees {
                changed |=
                    funcptr::merge_into_cell(ctx, &funcptr::arg_id(program, cf, index), &vs, false);
            }
        }
        changed
    }

    /// Invert the callee map into the caller map. Debug-info intrinsic
    /// calls are skipped.
    fn do_finalization(&self, program: &Program, ctx: &mut GlobalContext, module: ModuleId) {
        for &f in &program.module(module).functions {
            for &block in &program.func(f).blocks {
                for &inst in &program.block(block).insts {
                    let Some(call) = program.call(inst) else { continue };
                    if let Callee::Direct(cf) = call.callee {
                        if program.func(cf).is_debug_intrinsic() {
                            continue;
                        }
                    }
                    let Some(callees) = ctx.callees.get(&inst) else { continue };
                    let callees: Vec<FuncId> = callees.iter().copied().collect();
                    for cf in callees {
                        ctx.callers.entry(cf).or_default().insert(inst);
                    }
                }
            }
        }
    }
}

/// Write the supported call-graph dump: one line per
/// `(caller-location):(callee-location):(direct|indirect)` tuple, where a
/// location is `<abs-path>:<line>` and the flag is `1` for direct, `0` for
/// indirect. Sites without a usable debug line and callees without a
/// subprogram are skipped. Lines are unique and sorted.
pub fn dump_callers(
    program: &Program,
    ctx: &GlobalContext,
    srcroot: &str,
    path: &Path,
) -> AnalysisResult<()> {
    let mut lines = BTreeSet::new();
    for (&f, sites) in &ctx.callers {
        let fd = program.func(f);
        let Some(sp) = &fd.subprogram else { continue };
        let callee_info =
            format!("{}:{}", absolute_path(srcroot, &sp.directory, &sp.file), sp.line);
        for &site in sites {
            let data = program.inst(site);
            let Some(loc) = &data.loc else { continue };
            if loc.line == 0 {
                continue;
            }
            let InstKind::Call(call) = &data.kind else { continue };
            let direct = call.is_inline_asm
                || matches!(call.callee, Callee::Direct(_))
                || ctx.callees.get(&site).map_or(true, |set| set.is_empty());
            let caller_info =
                format!("{}:{}", absolute_path(srcroot, &loc.directory, &loc.file), loc.line);
            lines.insert(format!(
                "{}:{}:{}",
                caller_info,
                callee_info,
                if direct { 1 } else { 0 }
            ));
        }
    }

    let mut out = String::new();
    for line in &lines {
        out.push_str(line);
        out.push('\n');
    }
    fs::write(path, out)?;
    Ok(())
}
