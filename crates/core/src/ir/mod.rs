//! Arena-based program model.
//!
//! The loader lowers every parsed IR module into this model; all analysis
//! phases operate on it exclusively. Every inter-entity reference is an
//! arena id, and the `Program` owns every node for the lifetime of the run.
//! Nothing here is mutated after loading finishes.

use id_arena::{Arena, Id};

mod types;

pub use types::{TypeId, TypeKind, TypeTable};

pub type ModuleId = Id<ModuleData>;
pub type FuncId = Id<FunctionData>;
pub type BlockId = Id<BlockData>;
pub type InstId = Id<InstData>;
pub type GlobalId = Id<GlobalData>;

/// A debug location: source directory, file and line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLoc {
    pub directory: String,
    pub file: String,
    pub line: u32,
}

impl SourceLoc {
    pub fn new(directory: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self { directory: directory.into(), file: file.into(), line }
    }
}

/// One translation unit. The input file path is its stable identifier.
#[derive(Debug)]
pub struct ModuleData {
    pub path: String,
    pub functions: Vec<FuncId>,
    pub globals: Vec<GlobalId>,
}

/// A function definition or declaration.
#[derive(Debug)]
pub struct FunctionData {
    pub name: String,
    pub module: ModuleId,
    pub blocks: Vec<BlockId>,
    pub param_tys: Vec<TypeId>,
    pub ret_ty: TypeId,
    pub is_var_arg: bool,
    pub external_linkage: bool,
    pub is_declaration: bool,
    /// Referenced somewhere other than as the direct callee of a call.
    pub address_taken: bool,
    pub section: Option<String>,
    /// Debug subprogram: declaring file, directory and line.
    pub subprogram: Option<SourceLoc>,
}

impl FunctionData {
    pub fn is_intrinsic(&self) -> bool {
        self.name.starts_with("llvm.")
    }

    pub fn is_debug_intrinsic(&self) -> bool {
        self.name.starts_with("llvm.dbg.")
    }

    pub fn in_init_text(&self) -> bool {
        self.section.as_deref() == Some(".init.text")
    }
}

/// A basic block. Predecessor lists preserve duplicate edges: a conditional
/// branch with both edges to one target contributes that predecessor twice,
/// which the backward slicer's immediate-repeat break relies on.
#[derive(Debug)]
pub struct BlockData {
    pub function: FuncId,
    pub insts: Vec<InstId>,
    pub preds: Vec<BlockId>,
    pub succs: Vec<BlockId>,
}

/// An instruction. Terminators are materialized as the last instruction of
/// their block so every block has at least one instruction and terminator
/// debug locations participate in emission.
#[derive(Debug)]
pub struct InstData {
    pub block: BlockId,
    pub loc: Option<SourceLoc>,
    /// Result type; `Void` for instructions without a result.
    pub ty: TypeId,
    pub kind: InstKind,
}

/// Tagged operand reference used by the assignment-based value walk and the
/// address-taken scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueRef {
    /// A function constant.
    Func(FuncId),
    /// The result of another instruction.
    Local(InstId),
    /// Formal argument `1` of function `0`.
    Arg(FuncId, usize),
    /// Any other constant (null, integer, non-function global, ...).
    Constant,
    /// Metadata, inline asm, or an operand the loader did not resolve.
    Other,
}

impl ValueRef {
    /// Whether the underlying IR value is a constant. Function references
    /// are constants too.
    pub fn is_constant(self) -> bool {
        matches!(self, ValueRef::Func(_) | ValueRef::Constant)
    }
}

/// Closed instruction classification: exactly the shapes the analyses
/// dispatch on. Everything else is `Other`.
#[derive(Clone, Debug)]
pub enum InstKind {
    Call(CallData),
    /// `cell` names the function-pointer cell the load reads from, when the
    /// address is a global or a struct-field access.
    Load { cell: Option<String> },
    Store { value: ValueRef, cell: Option<String> },
    Ret { value: Option<ValueRef> },
    /// Any cast (bitcast, ptrtoint, trunc, ...); the walk sees through it.
    Cast { operand: ValueRef },
    Phi { incoming: Vec<ValueRef> },
    Select { true_value: ValueRef, false_value: ValueRef },
    Gep { cell: Option<String> },
    Alloca,
    ExtractValue,
    BinOp { lhs: ValueRef, rhs: ValueRef },
    Other,
}

/// A call-like instruction (`call` or `invoke`).
#[derive(Clone, Debug)]
pub struct CallData {
    pub callee: Callee,
    pub args: Vec<CallArg>,
    /// Result type of the call; `Void` for void calls.
    pub ret_ty: TypeId,
    /// Whether the function type at the call site is variadic.
    pub site_var_arg: bool,
    pub is_inline_asm: bool,
}

#[derive(Clone, Debug)]
pub struct CallArg {
    pub value: ValueRef,
    pub ty: TypeId,
}

#[derive(Clone, Copy, Debug)]
pub enum Callee {
    /// The called operand is a known function symbol of the same module.
    Direct(FuncId),
    /// The called operand is a value; resolved by the call-graph builder.
    Indirect(ValueRef),
}

/// A global variable, with its initializer reduced to the constant shapes
/// the function-pointer resolver walks.
#[derive(Debug)]
pub struct GlobalData {
    pub name: String,
    pub module: ModuleId,
    pub external_linkage: bool,
    pub init: Option<Const>,
}

/// Initializer constants. Casts are stripped during lowering, so a bitcast
/// of a function lowers to `Const::Func`.
#[derive(Clone, Debug)]
pub enum Const {
    Struct {
        /// Type name for non-literal structs.
        type_name: Option<String>,
        literal: bool,
        fields: Vec<Const>,
    },
    Array { elems: Vec<Const> },
    Func(FuncId),
    Other,
}

/// The whole loaded program: arenas of every entity plus the type pool.
#[derive(Debug, Default)]
pub struct Program {
    modules: Arena<ModuleData>,
    funcs: Arena<FunctionData>,
    blocks: Arena<BlockData>,
    insts: Arena<InstData>,
    globals: Arena<GlobalData>,
    module_order: Vec<ModuleId>,
    pub types: TypeTable,
}

impl Program {
    /// Modules in load order.
    pub fn modules(&self) -> &[ModuleId] {
        &self.module_order
    }

    pub fn module(&self, id: ModuleId) -> &ModuleData {
        &self.modules[id]
    }

    pub fn func(&self, id: FuncId) -> &FunctionData {
        &self.funcs[id]
    }

    pub fn block(&self, id: BlockId) -> &BlockData {
        &self.blocks[id]
    }

    pub fn inst(&self, id: InstId) -> &InstData {
        &self.insts[id]
    }

    pub fn global(&self, id: GlobalId) -> &GlobalData {
        &self.globals[id]
    }

    /// Every function, in module load order then definition order.
    pub fn functions(&self) -> impl Iterator<Item = FuncId> + '_ {
        self.module_order
            .iter()
            .flat_map(|&m| self.modules[m].functions.iter().copied())
    }

    /// Enclosing function of an instruction.
    pub fn inst_function(&self, inst: InstId) -> FuncId {
        self.blocks[self.insts[inst].block].function
    }

    /// Call payload of an instruction, if it is call-like.
    pub fn call(&self, inst: InstId) -> Option<&CallData> {
        match &self.insts[inst].kind {
            InstKind::Call(call) => Some(call),
            _ => None,
        }
    }

    /// Canonical symbol identity: externally-linked symbols keep their bare
    /// name, internal-linkage symbols are qualified by their module stem.
    pub fn scope_name(&self, f: FuncId) -> String {
        let fd = &self.funcs[f];
        if fd.external_linkage {
            fd.name.clone()
        } else {
            format!("_{}.{}", module_stem(&self.modules[fd.module].path), fd.name)
        }
    }

    /// Scope name of a global variable, same rule as for functions.
    pub fn global_scope_name(&self, g: GlobalId) -> String {
        let gd = &self.globals[g];
        if gd.external_linkage {
            gd.name.clone()
        } else {
            format!("_{}.{}", module_stem(&self.modules[gd.module].path), gd.name)
        }
    }

    /// Total number of basic blocks across all modules.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Total number of functions across all modules.
    pub fn func_count(&self) -> usize {
        self.funcs.len()
    }
}

/// File stem of a module path: last component minus its final extension.
pub(crate) fn module_stem(path: &str) -> &str {
    let base = path.rsplit('/').next().unwrap_or(path);
    match base.rfind('.') {
        Some(0) | None => base,
        Some(idx) => &base[..idx],
    }
}

/// Describes a function being added to the program.
#[derive(Debug)]
pub struct FunctionSpec {
    pub name: String,
    pub param_tys: Vec<TypeId>,
    pub ret_ty: TypeId,
    pub is_var_arg: bool,
    pub external_linkage: bool,
    pub is_declaration: bool,
    pub section: Option<String>,
    pub subprogram: Option<SourceLoc>,
}

impl FunctionSpec {
    pub fn new(name: impl Into<String>, ret_ty: TypeId, param_tys: Vec<TypeId>) -> Self {
        Self {
            name: name.into(),
            param_tys,
            ret_ty,
            is_var_arg: false,
            external_linkage: true,
            is_declaration: false,
            section: None,
            subprogram: None,
        }
    }

    pub fn var_arg(mut self) -> Self {
        self.is_var_arg = true;
        self
    }

    pub fn internal(mut self) -> Self {
        self.external_linkage = false;
        self
    }

    pub fn declaration(mut self) -> Self {
        self.is_declaration = true;
        self
    }

    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn subprogram(mut self, loc: SourceLoc) -> Self {
        self.subprogram = Some(loc);
        self
    }
}

/// The only way to construct a `Program`. The loader drives it while
/// lowering parsed modules; tests drive it directly.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    program: Program,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn types(&mut self) -> &mut TypeTable {
        &mut self.program.types
    }

    pub fn add_module(&mut self, path: impl Into<String>) -> ModuleId {
        let id = self.program.modules.alloc(ModuleData {
            path: path.into(),
            functions: Vec::new(),
            globals: Vec::new(),
        });
        self.program.module_order.push(id);
        id
    }

    pub fn add_function(&mut self, module: ModuleId, spec: FunctionSpec) -> FuncId {
        let id = self.program.funcs.alloc(FunctionData {
            name: spec.name,
            module,
            blocks: Vec::new(),
            param_tys: spec.param_tys,
            ret_ty: spec.ret_ty,
            is_var_arg: spec.is_var_arg,
            external_linkage: spec.external_linkage,
            is_declaration: spec.is_declaration,
            address_taken: false,
            section: spec.section,
            subprogram: spec.subprogram,
        });
        self.program.modules[module].functions.push(id);
        id
    }

    pub fn add_global(
        &mut self,
        module: ModuleId,
        name: impl Into<String>,
        external_linkage: bool,
        init: Option<Const>,
    ) -> GlobalId {
        let id = self.program.globals.alloc(GlobalData {
            name: name.into(),
            module,
            external_linkage,
            init,
        });
        self.program.modules[module].globals.push(id);
        id
    }

    pub fn add_block(&mut self, function: FuncId) -> BlockId {
        let id = self.program.blocks.alloc(BlockData {
            function,
            insts: Vec::new(),
            preds: Vec::new(),
            succs: Vec::new(),
        });
        self.program.funcs[function].blocks.push(id);
        id
    }

    /// Record a CFG edge. Duplicate edges are kept.
    pub fn add_edge(&mut self, from: BlockId, to: BlockId) {
        self.program.blocks[from].succs.push(to);
        self.program.blocks[to].preds.push(from);
    }

    pub fn add_inst(
        &mut self,
        block: BlockId,
        loc: Option<SourceLoc>,
        ty: TypeId,
        kind: InstKind,
    ) -> InstId {
        let id = self.program.insts.alloc(InstData { block, loc, ty, kind });
        self.program.blocks[block].insts.push(id);
        id
    }

    /// Replace the classification of an already-allocated instruction. The
    /// loader allocates every instruction first so operands can refer to
    /// results defined later (phi incoming values), then fills in the kinds.
    pub fn set_inst_kind(&mut self, inst: InstId, kind: InstKind) {
        self.program.insts[inst].kind = kind;
    }

    pub fn mark_address_taken(&mut self, f: FuncId) {
        self.program.funcs[f].address_taken = true;
    }

    pub fn finish(self) -> Program {
        self.program
    }
}
