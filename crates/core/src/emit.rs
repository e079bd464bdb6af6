//! Output emission: per-target slice files, the merged batch group, and
//! run bookkeeping.
//!
//! Every buffer is an ordered string set, so files come out sorted, unique
//! and byte-identical across runs. A file that cannot be written is logged
//! and abandoned; emission never aborts the run.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use indexmap::IndexSet;

use crate::context::GlobalContext;
use crate::error::AnalysisResult;
use crate::ir::{BlockId, FuncId, Program};
use crate::paths::absolute_path;
use crate::slicing::Slicer;

/// Deduplicated line buffers for one output group (one target, or the
/// merged batch result).
#[derive(Clone, Debug, Default)]
pub struct SliceOutput {
    pub slice: BTreeSet<String>,
    pub slice_verbose: BTreeSet<String>,
    pub funcs: BTreeSet<String>,
    pub funcs_verbose: BTreeSet<String>,
}

impl SliceOutput {
    /// Union another group into this one; batch mode accumulates every
    /// per-target group into the merged group.
    pub fn merge_from(&mut self, other: &SliceOutput) {
        self.slice.extend(other.slice.iter().cloned());
        self.slice_verbose.extend(other.slice_verbose.iter().cloned());
        self.funcs.extend(other.funcs.iter().cloned());
        self.funcs_verbose.extend(other.funcs_verbose.iter().cloned());
    }

    /// Function names outside the verbose slice.
    pub fn blacklist(&self, full_func: &BTreeSet<String>) -> BTreeSet<String> {
        full_func.difference(&self.funcs_verbose).cloned().collect()
    }

    /// Write the five files of this group into `dir`, keyed by `label`.
    pub fn write(&self, dir: &Path, label: &str, full_func: &BTreeSet<String>) {
        if let Err(err) = fs::create_dir_all(dir) {
            log::error!("failed to create output directory {}: {}", dir.display(), err);
            return;
        }
        write_lines(&dir.join(format!("{}.slice", label)), &self.slice);
        write_lines(&dir.join(format!("{}.slice.verbose", label)), &self.slice_verbose);
        write_lines(&dir.join(format!("{}.func", label)), &self.funcs);
        write_lines(&dir.join(format!("{}.func.verbose", label)), &self.funcs_verbose);
        let blacklist = self.blacklist(full_func);
        log::debug!("blacklist count: {}", blacklist.len());
        write_lines(&dir.join(format!("{}.func.blacklist", label)), &blacklist);
    }
}

fn write_lines(path: &Path, lines: &BTreeSet<String>) {
    let mut out = String::with_capacity(lines.len() * 32);
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    if let Err(err) = fs::write(path, out) {
        log::error!("failed to write {}: {}", path.display(), err);
    }
}

/// Build the line buffers for the current slicer state.
///
/// Runs the output expansion first: every verbose function is forward
/// sliced without bound, and depth-1 expanded into the function-level
/// slice. `emit_func_lines` additionally emits a `func:` line for the
/// enclosing function of every sliced block.
pub fn collect_slice_output(
    program: &Program,
    ctx: &GlobalContext,
    slicer: &mut Slicer,
    srcroot: &str,
    emit_func_lines: bool,
) -> SliceOutput {
    let mut out = SliceOutput::default();

    let verbose: Vec<FuncId> = slicer.verbose_funcs().iter().copied().collect();
    for &f in &verbose {
        slicer.forward_slice_function(program, ctx, f);
    }

    let mut with_depth: IndexSet<FuncId> = IndexSet::new();
    for &f in &verbose {
        out.funcs.insert(program.func(f).name.clone());
        Slicer::forward_slice_with_depth(program, ctx, f, 1, &mut with_depth);
    }
    for &f in &with_depth {
        out.funcs.insert(program.func(f).name.clone());
    }

    for &bb in slicer.visited_blocks() {
        let fd = program.func(program.block(bb).function);
        out.funcs.insert(fd.name.clone());
        out.funcs_verbose.insert(fd.name.clone());
        if emit_func_lines {
            if let Some(sp) = &fd.subprogram {
                let line = format!(
                    "func:{}:{}:100",
                    absolute_path(srcroot, &sp.directory, &sp.file),
                    sp.line
                );
                out.slice.insert(line.clone());
                out.slice_verbose.insert(line);
            }
        }
        if let Some(line) = first_block_line(program, bb, srcroot) {
            out.slice.insert(line.clone());
            out.slice_verbose.insert(line);
        }
    }

    for &bb in slicer.verbose_blocks() {
        let fd = program.func(program.block(bb).function);
        out.funcs_verbose.insert(fd.name.clone());
        if let Some(line) = first_block_line(program, bb, srcroot) {
            out.slice_verbose.insert(line);
        }
    }

    // The verbose function list is a superset of the plain one.
    let names: Vec<String> = out.funcs.iter().cloned().collect();
    out.funcs_verbose.extend(names);

    out
}

/// `block:<abs-path>:<line>:100` for the first instruction of the block
/// with a usable debug location.
fn first_block_line(program: &Program, bb: BlockId, srcroot: &str) -> Option<String> {
    for &inst in &program.block(bb).insts {
        if let Some(loc) = &program.inst(inst).loc {
            if loc.line != 0 {
                return Some(format!(
                    "block:{}:{}:100",
                    absolute_path(srcroot, &loc.directory, &loc.file),
                    loc.line
                ));
            }
        }
    }
    None
}

/// Names of every function carrying a subprogram, across all modules. The
/// blacklist is computed against this set.
pub fn full_function_names(program: &Program) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for f in program.functions() {
        let fd = program.func(f);
        if fd.subprogram.is_some() {
            names.insert(fd.name.clone());
        }
    }
    names
}

/// Create the one-off basic-block count file if it is not already present.
pub fn write_total_basicblock(program: &Program, path: &Path) -> AnalysisResult<()> {
    if path.exists() {
        return Ok(());
    }
    fs::write(path, format!("{}\n", program.block_count()))?;
    log::info!("Total function count: {}", program.func_count());
    Ok(())
}
