//! Target location: mapping `(file, line)` and `(file, name)` queries onto
//! the loaded program.
//!
//! Module/file matching is deliberately loose: the module identifier is an
//! input path like `./src/foo.c.llvm.bc`, so queries match by substring
//! after trimming the IR suffix. All path comparisons go through the
//! normalizer. Where a query is exact, the slicer's location caches answer
//! first.

use crate::ir::{BlockId, FuncId, InstId, InstKind, Program};
use crate::paths::normalize_path;
use crate::slicing::Slicer;

/// Find a function by name. Exact matches win; as a demangling shim, a
/// mangled symbol that contains the query also matches. The file filter is
/// accepted but not applied; the first match wins. Declarations never
/// match.
pub fn find_function_by_name(program: &Program, _file: &str, name: &str) -> Option<FuncId> {
    for f in program.functions() {
        let fd = program.func(f);
        if fd.blocks.is_empty() {
            continue;
        }
        if fd.name == name || (fd.name.contains(name) && fd.name.starts_with("_Z")) {
            return Some(f);
        }
    }
    None
}

/// First basic block containing an instruction whose debug line matches,
/// in a module whose identifier contains the requested file.
pub fn find_block_by_line(program: &Program, file: &str, line: u32) -> Option<BlockId> {
    for &module in program.modules() {
        if !program.module(module).path.contains(file) {
            continue;
        }
        for &f in &program.module(module).functions {
            for &block in &program.func(f).blocks {
                for &inst in &program.block(block).insts {
                    if let Some(loc) = &program.inst(inst).loc {
                        if loc.line == line {
                            return Some(block);
                        }
                    }
                }
            }
        }
    }
    None
}

/// First call-like instruction at the given file and line.
pub fn find_call_site_by_line(
    program: &Program,
    slicer: &Slicer,
    file: &str,
    line: u32,
) -> Option<InstId> {
    if let Some(inst) = slicer.cached_call_site(&normalize_path(file), line) {
        return Some(inst);
    }
    for &module in program.modules() {
        let hint = module_source_hint(&program.module(module).path);
        if !file.contains(hint) {
            continue;
        }
        for &f in &program.module(module).functions {
            for &block in &program.func(f).blocks {
                for &inst in &program.block(block).insts {
                    if !matches!(program.inst(inst).kind, InstKind::Call(_)) {
                        continue;
                    }
                    if let Some(loc) = &program.inst(inst).loc {
                        if loc.line == line && file.contains(&normalize_path(&loc.file)) {
                            return Some(inst);
                        }
                    }
                }
            }
        }
    }
    None
}

/// First function whose subprogram declaration line matches.
pub fn find_function_by_line(
    program: &Program,
    slicer: &Slicer,
    file: &str,
    line: u32,
) -> Option<FuncId> {
    if let Some(f) = slicer.cached_function(&normalize_path(file), line) {
        return Some(f);
    }
    for &module in program.modules() {
        let hint = module_source_hint(&program.module(module).path);
        if !file.contains(hint) {
            continue;
        }
        for &f in &program.module(module).functions {
            if let Some(sp) = &program.func(f).subprogram {
                if sp.line == line && file.contains(&normalize_path(&sp.file)) {
                    return Some(f);
                }
            }
        }
    }
    None
}

/// Module path minus a leading `./` and a trailing IR suffix.
fn module_source_hint(path: &str) -> &str {
    let path = path.strip_prefix("./").unwrap_or(path);
    for suffix in [".llvm.bc", ".bc", ".ll"] {
        if let Some(stripped) = path.strip_suffix(suffix) {
            return stripped;
        }
    }
    path
}
