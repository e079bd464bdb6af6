//! The process-wide analysis registry.
//!
//! Built by the loader, grown by the call-graph builder, read by the slicer
//! and the emitters. It lives for the whole run but is passed explicitly to
//! every phase; there is no true global.

use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;

use crate::ir::{FuncId, GlobalId, InstId, Program};

/// Registry of everything the phases learn about the loaded program.
///
/// `callees` and `callers` are mutual inverses once the call-graph pass has
/// finalized; `func_ptrs` and the call maps only ever grow during fixpoint
/// iteration.
#[derive(Debug, Default)]
pub struct GlobalContext {
    /// Externally-linked global variables by bare symbol name.
    pub gobjs: HashMap<String, GlobalId>,
    /// Externally-linked function definitions by scope name, with the
    /// `__sys_<x>` -> `sys_<x>` rewrite applied at registration.
    pub funcs: HashMap<String, FuncId>,
    /// Functions whose address is taken anywhere in the program, in
    /// discovery order. Excludes `.init.text` functions.
    pub address_taken_funcs: IndexSet<FuncId>,
    /// Function-pointer cells: string id -> possible targets.
    pub func_ptrs: HashMap<String, HashSet<FuncId>>,
    /// Call site -> possible callees.
    pub callees: HashMap<InstId, HashSet<FuncId>>,
    /// Function -> call sites that may invoke it.
    pub callers: HashMap<FuncId, HashSet<InstId>>,
    /// Indirect call sites, recorded once each, for later point-to analysis.
    pub indirect_call_insts: Vec<InstId>,
    indirect_seen: HashSet<InstId>,
}

impl GlobalContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefer the registered definition of a function to a declaration.
    /// Falls back to the given function when no definition was seen.
    pub fn func_def(&self, program: &Program, f: FuncId) -> FuncId {
        self.funcs
            .get(&program.scope_name(f))
            .copied()
            .unwrap_or(f)
    }

    /// Insert the definition of `f` as a callee of `site`. Returns whether
    /// the set grew. Functions living in `.init.text` never become callees.
    pub fn insert_callee(&mut self, program: &Program, site: InstId, f: FuncId) -> bool {
        let def = self.func_def(program, f);
        if program.func(def).in_init_text() {
            return false;
        }
        self.callees.entry(site).or_default().insert(def)
    }

    /// Record an indirect call site for bookkeeping.
    pub fn record_indirect_call(&mut self, site: InstId) {
        if self.indirect_seen.insert(site) {
            self.indirect_call_insts.push(site);
        }
    }
}
