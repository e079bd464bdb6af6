//! Backward and forward slicing over the finished call graph.
//!
//! Backward slicing collects every basic block that may execute on a path
//! reaching the target; forward slicing collects everything reachable from
//! it. Slicer state is scoped to one target query; `clear` resets all of it
//! before the next query in batch mode.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexSet;

use crate::context::GlobalContext;
use crate::ir::{BlockId, Callee, FuncId, InstId, InstKind, Program};
use crate::paths::normalize_path;

mod locate;

pub use locate::{
    find_block_by_line, find_call_site_by_line, find_function_by_line, find_function_by_name,
};

/// Per-query slicing state plus the location caches the locator fast-paths
/// through.
#[derive(Debug, Default)]
pub struct Slicer {
    visited_f: HashSet<FuncId>,
    verbose_f: IndexSet<FuncId>,
    visited_bb: IndexSet<BlockId>,
    f_visited_f: IndexSet<FuncId>,
    verbose_bb: IndexSet<BlockId>,
    sliced_func_cnt: usize,
    full_func_map: HashMap<(String, u32), FuncId>,
    full_call_map: HashMap<(String, u32), InstId>,
}

impl Slicer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Basic blocks in the backward slice.
    pub fn visited_blocks(&self) -> &IndexSet<BlockId> {
        &self.visited_bb
    }

    /// Basic blocks collected by forward expansion.
    pub fn verbose_blocks(&self) -> &IndexSet<BlockId> {
        &self.verbose_bb
    }

    /// Functions in the verbose expansion: sliced functions plus sibling
    /// call targets inside their callers.
    pub fn verbose_funcs(&self) -> &IndexSet<FuncId> {
        &self.verbose_f
    }

    /// Functions reached by forward slicing.
    pub fn forward_visited(&self) -> &IndexSet<FuncId> {
        &self.f_visited_f
    }

    pub fn sliced_func_cnt(&self) -> usize {
        self.sliced_func_cnt
    }

    /// Build the `(normalized path, line)` -> entity caches over the whole
    /// program. Rebuilt per query; `clear` drops it.
    pub fn cache_targets(&mut self, program: &Program) {
        self.full_func_map.clear();
        self.full_call_map.clear();
        for f in program.functions() {
            let fd = program.func(f);
            if let Some(sp) = &fd.subprogram {
                let key = (normalize_path(&join_loc(&sp.directory, &sp.file)), sp.line);
                self.full_func_map.entry(key).or_insert(f);
            }
            for &block in &fd.blocks {
                for &inst in &program.block(block).insts {
                    if !matches!(program.inst(inst).kind, InstKind::Call(_)) {
                        continue;
                    }
                    if let Some(loc) = &program.inst(inst).loc {
                        let key = (normalize_path(&join_loc(&loc.directory, &loc.file)), loc.line);
                        self.full_call_map.entry(key).or_insert(inst);
                    }
                }
            }
        }
        log::debug!(
            "cached {} function and {} call-site locations",
            self.full_func_map.len(),
            self.full_call_map.len()
        );
    }

    pub(crate) fn cached_function(&self, path: &str, line: u32) -> Option<FuncId> {
        self.full_func_map.get(&(path.to_string(), line)).copied()
    }

    pub(crate) fn cached_call_site(&self, path: &str, line: u32) -> Option<InstId> {
        self.full_call_map.get(&(path.to_string(), line)).copied()
    }

    /// Backward-slice a target function: mark its blocks, expand its
    /// verbose set, then backtrack from every call site of every
    /// same-named function (name duplicates exist across modules).
    pub fn slice_function(&mut self, program: &Program, ctx: &GlobalContext, f: FuncId) {
        if !self.visited_f.insert(f) {
            return;
        }
        for &bb in &program.func(f).blocks {
            self.visited_bb.insert(bb);
        }

        self.add_to_verbose(program, ctx, f);

        let name = program.func(f).name.clone();
        let mut queue: VecDeque<BlockId> = VecDeque::new();
        let mut found_entry = false;
        let mut any_sites = false;
        for (&g, sites) in &ctx.callers {
            if program.func(g).name != name {
                continue;
            }
            found_entry = true;
            if !sites.is_empty() {
                any_sites = true;
            }
            for &site in sites {
                let bb = program.inst(site).block;
                if !self.visited_bb.contains(&bb) {
                    queue.push_back(bb);
                }
            }
        }
        if !found_entry {
            return;
        }

        while let Some(bb) = queue.pop_front() {
            self.backtrack(program, ctx, bb);
        }

        if any_sites {
            self.sliced_func_cnt += 1;
        }
    }

    /// Sibling expansion: for every call site of `f`, any other call inside
    /// the enclosing function whose block can reach the site's block joins
    /// the verbose set. Intrinsic callees are skipped.
    fn add_to_verbose(&mut self, program: &Program, ctx: &GlobalContext, f: FuncId) {
        if !self.verbose_f.insert(f) {
            return;
        }
        let Some(sites) = ctx.callers.get(&f) else { return };
        for &site in sites {
            let site_bb = program.inst(site).block;
            let enclosing = program.block(site_bb).function;
            for &bb in &program.func(enclosing).blocks {
                for &inst in &program.block(bb).insts {
                    let InstKind::Call(call) = &program.inst(inst).kind else { continue };
                    if let Callee::Direct(cf) = call.callee {
                        if program.func(cf).is_intrinsic() {
                            continue;
                        }
                    }
                    if intra_can_reach(program, bb, site_bb) {
                        if let Callee::Direct(other) = call.callee {
                            self.verbose_f.insert(other);
                        }
                    }
                }
            }
        }
    }

    /// Iterative reverse DFS over CFG predecessors from `bb`, then slice
    /// the enclosing function. An immediately repeated predecessor (a
    /// conditional branch with both edges into one block) breaks the scan.
    pub fn backtrack(&mut self, program: &Program, ctx: &GlobalContext, bb: BlockId) {
        let mut stack = vec![bb];
        while let Some(current) = stack.pop() {
            if self.visited_bb.insert(current) {
                let mut last_pred: Option<BlockId> = None;
                for &pred in &program.block(current).preds {
                    if Some(pred) == last_pred {
                        break;
                    }
                    last_pred = Some(pred);
                    if !self.visited_bb.contains(&pred) {
                        stack.push(pred);
                    }
                }
            }
        }
        self.slice_function(program, ctx, program.block(bb).function);
    }

    /// BFS over the blocks of `f` and of every transitively callable
    /// function. Every visited block joins the verbose block set; every
    /// newly reached callee joins the forward set.
    pub fn forward_slice_function(&mut self, program: &Program, ctx: &GlobalContext, f: FuncId) {
        let mut queue: VecDeque<BlockId> = program.func(f).blocks.iter().copied().collect();
        let mut visited: HashSet<BlockId> = HashSet::new();
        while let Some(current) = queue.pop_front() {
            self.verbose_bb.insert(current);
            if !visited.insert(current) {
                continue;
            }
            for &inst in &program.block(current).insts {
                if !matches!(program.inst(inst).kind, InstKind::Call(_)) {
                    continue;
                }
                let Some(callees) = ctx.callees.get(&inst) else { continue };
                for &callee in callees {
                    if self.f_visited_f.insert(callee) {
                        queue.extend(program.func(callee).blocks.iter().copied());
                    }
                }
            }
        }
    }

    /// Forward-slice from a function looked up by plain symbol name; used
    /// for the fixed fuzz-entry stubs. Definitions are preferred to
    /// declarations. Missing stubs are logged and skipped.
    pub fn forward_slice_stub(&mut self, program: &Program, ctx: &GlobalContext, name: &str) {
        let mut found: Option<FuncId> = None;
        for f in program.functions() {
            if program.func(f).name != name {
                continue;
            }
            if !program.func(f).blocks.is_empty() {
                found = Some(f);
                break;
            }
            found.get_or_insert(f);
        }
        match found {
            Some(f) => self.forward_slice_function(program, ctx, f),
            None => log::warn!("forward target function not found: {}", name),
        }
    }

    /// Bounded-depth forward walk: every function reachable within `depth`
    /// call hops joins `visited`.
    pub fn forward_slice_with_depth(
        program: &Program,
        ctx: &GlobalContext,
        f: FuncId,
        depth: u32,
        visited: &mut IndexSet<FuncId>,
    ) {
        visited.insert(f);
        if depth == 0 {
            return;
        }
        for &block in &program.func(f).blocks {
            for &inst in &program.block(block).insts {
                if !matches!(program.inst(inst).kind, InstKind::Call(_)) {
                    continue;
                }
                let Some(callees) = ctx.callees.get(&inst) else { continue };
                for &callee in callees {
                    Self::forward_slice_with_depth(program, ctx, callee, depth - 1, visited);
                }
            }
        }
    }

    /// Total reset of all per-query state, including the location caches.
    pub fn clear(&mut self) {
        self.visited_f.clear();
        self.verbose_f.clear();
        self.visited_bb.clear();
        self.f_visited_f.clear();
        self.verbose_bb.clear();
        self.sliced_func_cnt = 0;
        self.full_func_map.clear();
        self.full_call_map.clear();
    }
}

/// DFS over CFG successors: can `src` reach `dst` within one function?
fn intra_can_reach(program: &Program, src: BlockId, dst: BlockId) -> bool {
    let mut visited: HashSet<BlockId> = HashSet::new();
    let mut stack = vec![src];
    while let Some(current) = stack.pop() {
        if visited.insert(current) {
            if current == dst {
                return true;
            }
            for &succ in &program.block(current).succs {
                stack.push(succ);
            }
        }
    }
    false
}

fn join_loc(directory: &str, file: &str) -> String {
    if directory.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", directory, file)
    }
}
