//! Module loading: parses IR files with `llvm-ir` and lowers them into the
//! arena program model.
//!
//! Each input file is parsed in its own isolated context, so opaque-struct
//! renaming in one translation unit never leaks into another. A file that
//! fails to parse is logged and skipped; it is never fatal. The `llvm-ir`
//! types stay inside this module: everything downstream sees only the
//! `crate::ir` model.

use std::collections::HashMap;

use either::Either;
use llvm_ir::debugloc::{DebugLoc, HasDebugLoc};
use llvm_ir::function::Parameter;
use llvm_ir::module::Linkage;
use llvm_ir::types::FPType;
use llvm_ir::{
    Constant, ConstantRef, Instruction, Module as LlvmModule, Name, Operand, Terminator, Type,
    TypeRef,
};

use crate::context::GlobalContext;
use crate::error::AnalysisError;
use crate::ir::{
    module_stem, BlockId, CallArg, CallData, Callee, Const, FuncId, FunctionSpec, InstId,
    InstKind, ModuleId, Program, ProgramBuilder, SourceLoc, TypeId, TypeKind, ValueRef,
};

/// Parse `paths` into a program and register externally-linked definitions
/// in the context. Files that fail to parse are skipped.
pub fn load_modules(paths: &[String], ctx: &mut GlobalContext) -> Program {
    let mut builder = ProgramBuilder::new();

    log::info!("Total {} file(s)", paths.len());
    for (index, path) in paths.iter().enumerate() {
        log::debug!("[{}] {}", index, path);
        let parsed = if path.ends_with(".ll") {
            LlvmModule::from_ir_path(path)
        } else {
            LlvmModule::from_bc_path(path)
        };
        let module = match parsed {
            Ok(module) => module,
            Err(message) => {
                log::error!("{}", AnalysisError::ModuleParse { path: path.clone(), message });
                continue;
            }
        };
        Lowerer::run(&mut builder, &module, path);
    }

    let program = builder.finish();
    register_definitions(&program, ctx);
    program
}

/// Register every module's externally-linked globals and function
/// definitions into the registry.
pub fn register_definitions(program: &Program, ctx: &mut GlobalContext) {
    for &module in program.modules() {
        register_module(program, ctx, module);
    }
}

/// Collect externally-linked global objects and function definitions into
/// the registry. External linkage always ends up with the bare symbol name;
/// `__sys_<x>` definitions are registered under `sys_<x>`.
fn register_module(program: &Program, ctx: &mut GlobalContext, module: ModuleId) {
    for &g in &program.module(module).globals {
        let gd = program.global(g);
        if gd.external_linkage {
            ctx.gobjs.insert(gd.name.clone(), g);
        }
    }

    for &f in &program.module(module).functions {
        let fd = program.func(f);
        if fd.external_linkage && !fd.is_declaration {
            let key = match fd.name.strip_prefix("__sys_") {
                Some(rest) => format!("sys_{}", rest),
                None => fd.name.clone(),
            };
            ctx.funcs.insert(key, f);
        }
    }
}

/// Lowers one parsed module into the program builder.
struct Lowerer<'a> {
    b: &'a mut ProgramBuilder,
    module: &'a LlvmModule,
    mid: ModuleId,
    /// Module-local function symbols, definitions and declarations.
    fn_syms: HashMap<String, FuncId>,
    /// Module-local globals with their scope names.
    global_cells: HashMap<String, String>,
    /// Stem of the module path, for internal-linkage scope names.
    stem: String,
}

impl<'a> Lowerer<'a> {
    fn run(b: &'a mut ProgramBuilder, module: &'a LlvmModule, path: &str) {
        let mid = b.add_module(path);
        let stem = module_stem(path).to_string();
        let mut lw = Lowerer {
            b,
            module,
            mid,
            fn_syms: HashMap::new(),
            global_cells: HashMap::new(),
            stem,
        };
        lw.declare_functions();
        lw.lower_globals();
        lw.lower_bodies();
    }

    fn declare_functions(&mut self) {
        let module = self.module;
        for f in &module.functions {
            let param_tys = f.parameters.iter().map(|p| self.lower_type(&p.ty)).collect();
            let ret_ty = self.lower_type(&f.return_type);
            let mut spec = FunctionSpec::new(f.name.clone(), ret_ty, param_tys);
            spec.is_var_arg = f.is_var_arg;
            spec.external_linkage = f.linkage == Linkage::External;
            spec.section = f.section.clone();
            spec.subprogram = f.debugloc.as_ref().map(source_loc);
            let id = self.b.add_function(self.mid, spec);
            self.fn_syms.insert(f.name.clone(), id);
        }
        for d in &module.func_declarations {
            if self.fn_syms.contains_key(&d.name) {
                continue;
            }
            let param_tys = d.parameters.iter().map(|p: &Parameter| self.lower_type(&p.ty)).collect();
            let ret_ty = self.lower_type(&d.return_type);
            let mut spec = FunctionSpec::new(d.name.clone(), ret_ty, param_tys);
            spec.is_var_arg = d.is_var_arg;
            spec.is_declaration = true;
            let id = self.b.add_function(self.mid, spec);
            self.fn_syms.insert(d.name.clone(), id);
        }
    }

    fn lower_globals(&mut self) {
        let module = self.module;
        for g in &module.global_vars {
            let name = name_string(&g.name);
            let external = g.linkage == Linkage::External;
            let scope = if external {
                name.clone()
            } else {
                format!("_{}.{}", self.stem, name)
            };
            self.global_cells.insert(name.clone(), scope);
            if let Some(init) = &g.initializer {
                self.mark_const_mentions(init);
            }
            let init = g.initializer.as_ref().map(|c| self.lower_const(c));
            self.b.add_global(self.mid, name, external, init);
        }
    }

    fn lower_bodies(&mut self) {
        let module = self.module;
        for f in &module.functions {
            let fid = self.fn_syms[&f.name];
            self.lower_body(f, fid);
        }
    }

    fn lower_body(&mut self, f: &'a llvm_ir::Function, fid: FuncId) {
        let mut block_ids: HashMap<&'a Name, BlockId> = HashMap::new();
        for bb in &f.basic_blocks {
            let id = self.b.add_block(fid);
            block_ids.insert(&bb.name, id);
        }

        let params: HashMap<&'a Name, usize> =
            f.parameters.iter().enumerate().map(|(i, p)| (&p.name, i)).collect();

        // Allocate every instruction first so operands can refer to results
        // defined later (phi incoming values), then fill in the kinds.
        let mut locals: HashMap<&'a Name, InstId> = HashMap::new();
        let mut inst_ids: Vec<Vec<InstId>> = Vec::with_capacity(f.basic_blocks.len());
        for bb in &f.basic_blocks {
            let block = block_ids[&bb.name];
            let mut ids = Vec::with_capacity(bb.instrs.len() + 1);
            for instr in &bb.instrs {
                let loc = instr.get_debug_loc().as_ref().map(source_loc);
                let ty_ref = self.module.type_of(instr);
                let ty = self.lower_type(&ty_ref);
                let id = self.b.add_inst(block, loc, ty, InstKind::Other);
                if let Some(dest) = instr.try_get_result() {
                    locals.insert(dest, id);
                }
                ids.push(id);
            }
            let loc = bb.term.get_debug_loc().as_ref().map(source_loc);
            let ty_ref = self.module.type_of(&bb.term);
            let ty = self.lower_type(&ty_ref);
            let id = self.b.add_inst(block, loc, ty, InstKind::Other);
            if let Terminator::Invoke(inv) = &bb.term {
                locals.insert(&inv.result, id);
            }
            ids.push(id);
            inst_ids.push(ids);
        }

        for bb in &f.basic_blocks {
            let from = block_ids[&bb.name];
            for succ in terminator_successors(&bb.term) {
                match block_ids.get(succ) {
                    Some(&to) => self.b.add_edge(from, to),
                    None => log::warn!("unknown successor block {} in {}", succ, f.name),
                }
            }
        }

        let mut gep_cells: HashMap<InstId, String> = HashMap::new();
        for (bb, ids) in f.basic_blocks.iter().zip(&inst_ids) {
            for (instr, &id) in bb.instrs.iter().zip(ids.iter()) {
                let kind = self.lower_instruction(instr, fid, &params, &locals, &gep_cells);
                if let InstKind::Gep { cell: Some(cell) } = &kind {
                    gep_cells.insert(id, cell.clone());
                }
                self.b.set_inst_kind(id, kind);
            }
            let term_id = *ids.last().expect("block instruction list never empty");
            let kind = self.lower_terminator(&bb.term, fid, &params, &locals);
            self.b.set_inst_kind(term_id, kind);
        }
    }

    fn lower_instruction(
        &mut self,
        instr: &Instruction,
        fid: FuncId,
        params: &HashMap<&'a Name, usize>,
        locals: &HashMap<&'a Name, InstId>,
        gep_cells: &HashMap<InstId, String>,
    ) -> InstKind {
        macro_rules! cast {
            ($x:expr) => {{
                self.mark_operand_mentions(&$x.operand);
                InstKind::Cast { operand: self.lower_operand(&$x.operand, fid, params, locals) }
            }};
        }
        macro_rules! binop {
            ($x:expr) => {{
                self.mark_operand_mentions(&$x.operand0);
                self.mark_operand_mentions(&$x.operand1);
                InstKind::BinOp {
                    lhs: self.lower_operand(&$x.operand0, fid, params, locals),
                    rhs: self.lower_operand(&$x.operand1, fid, params, locals),
                }
            }};
        }

        match instr {
            Instruction::Call(call) => {
                let ty_ref = self.module.type_of(instr);
                let ret_ty = self.lower_type(&ty_ref);
                let callee_op = match &call.function {
                    Either::Left(_) => None,
                    Either::Right(op) => Some(op),
                };
                InstKind::Call(self.lower_call(
                    callee_op,
                    &call.arguments,
                    ret_ty,
                    fid,
                    params,
                    locals,
                ))
            }
            Instruction::Load(l) => {
                self.mark_operand_mentions(&l.address);
                InstKind::Load { cell: self.address_cell(&l.address, locals, gep_cells) }
            }
            Instruction::Store(s) => {
                self.mark_operand_mentions(&s.value);
                self.mark_operand_mentions(&s.address);
                InstKind::Store {
                    value: self.lower_operand(&s.value, fid, params, locals),
                    cell: self.address_cell(&s.address, locals, gep_cells),
                }
            }
            Instruction::Phi(p) => {
                let incoming = p
                    .incoming_values
                    .iter()
                    .map(|(op, _)| {
                        self.mark_operand_mentions(op);
                        self.lower_operand(op, fid, params, locals)
                    })
                    .collect();
                InstKind::Phi { incoming }
            }
            Instruction::Select(s) => {
                self.mark_operand_mentions(&s.true_value);
                self.mark_operand_mentions(&s.false_value);
                InstKind::Select {
                    true_value: self.lower_operand(&s.true_value, fid, params, locals),
                    false_value: self.lower_operand(&s.false_value, fid, params, locals),
                }
            }
            Instruction::GetElementPtr(g) => {
                self.mark_operand_mentions(&g.address);
                for idx in &g.indices {
                    self.mark_operand_mentions(idx);
                }
                InstKind::Gep { cell: self.gep_cell(&g.address, &g.indices) }
            }
            Instruction::Alloca(_) => InstKind::Alloca,
            Instruction::ExtractValue(e) => {
                self.mark_operand_mentions(&e.aggregate);
                InstKind::ExtractValue
            }
            Instruction::InsertValue(iv) => {
                self.mark_operand_mentions(&iv.aggregate);
                self.mark_operand_mentions(&iv.element);
                InstKind::Other
            }
            Instruction::ICmp(c) => {
                self.mark_operand_mentions(&c.operand0);
                self.mark_operand_mentions(&c.operand1);
                InstKind::Other
            }
            Instruction::Trunc(x) => cast!(x),
            Instruction::ZExt(x) => cast!(x),
            Instruction::SExt(x) => cast!(x),
            Instruction::FPTrunc(x) => cast!(x),
            Instruction::FPExt(x) => cast!(x),
            Instruction::FPToUI(x) => cast!(x),
            Instruction::FPToSI(x) => cast!(x),
            Instruction::UIToFP(x) => cast!(x),
            Instruction::SIToFP(x) => cast!(x),
            Instruction::PtrToInt(x) => cast!(x),
            Instruction::IntToPtr(x) => cast!(x),
            Instruction::BitCast(x) => cast!(x),
            Instruction::AddrSpaceCast(x) => cast!(x),
            Instruction::Add(x) => binop!(x),
            Instruction::Sub(x) => binop!(x),
            Instruction::Mul(x) => binop!(x),
            Instruction::UDiv(x) => binop!(x),
            Instruction::SDiv(x) => binop!(x),
            Instruction::URem(x) => binop!(x),
            Instruction::SRem(x) => binop!(x),
            Instruction::And(x) => binop!(x),
            Instruction::Or(x) => binop!(x),
            Instruction::Xor(x) => binop!(x),
            Instruction::Shl(x) => binop!(x),
            Instruction::LShr(x) => binop!(x),
            Instruction::AShr(x) => binop!(x),
            _ => InstKind::Other,
        }
    }

    fn lower_terminator(
        &mut self,
        term: &Terminator,
        fid: FuncId,
        params: &HashMap<&'a Name, usize>,
        locals: &HashMap<&'a Name, InstId>,
    ) -> InstKind {
        match term {
            Terminator::Ret(r) => {
                if let Some(op) = &r.return_operand {
                    self.mark_operand_mentions(op);
                }
                InstKind::Ret {
                    value: r
                        .return_operand
                        .as_ref()
                        .map(|op| self.lower_operand(op, fid, params, locals)),
                }
            }
            Terminator::Invoke(inv) => {
                let ty_ref = self.module.type_of(term);
                let ret_ty = self.lower_type(&ty_ref);
                let callee_op = match &inv.function {
                    Either::Left(_) => None,
                    Either::Right(op) => Some(op),
                };
                InstKind::Call(self.lower_call(
                    callee_op,
                    &inv.arguments,
                    ret_ty,
                    fid,
                    params,
                    locals,
                ))
            }
            _ => InstKind::Other,
        }
    }

    /// `callee_op` is `None` for inline-asm call sites.
    fn lower_call<A>(
        &mut self,
        callee_op: Option<&Operand>,
        arguments: &[(Operand, A)],
        ret_ty: TypeId,
        fid: FuncId,
        params: &HashMap<&'a Name, usize>,
        locals: &HashMap<&'a Name, InstId>,
    ) -> CallData {
        let (callee, is_inline_asm, site_var_arg) = match callee_op {
            None => (Callee::Indirect(ValueRef::Other), true, false),
            Some(op) => {
                let site_var_arg = self.callee_var_arg(op);
                match self.direct_target(op) {
                    Some(f) => (Callee::Direct(f), false, site_var_arg),
                    None => {
                        self.mark_operand_mentions(op);
                        (
                            Callee::Indirect(self.lower_operand(op, fid, params, locals)),
                            false,
                            site_var_arg,
                        )
                    }
                }
            }
        };

        let args = arguments
            .iter()
            .map(|(op, _)| {
                self.mark_operand_mentions(op);
                let ty_ref = self.module.type_of(op);
                CallArg {
                    value: self.lower_operand(op, fid, params, locals),
                    ty: self.lower_type(&ty_ref),
                }
            })
            .collect();

        CallData { callee, args, ret_ty, site_var_arg, is_inline_asm }
    }

    /// A plain reference to a function symbol of this module.
    fn direct_target(&self, op: &Operand) -> Option<FuncId> {
        if let Operand::ConstantOperand(c) = op {
            if let Constant::GlobalReference { name: Name::Name(s), .. } = c.as_ref() {
                return self.fn_syms.get(s.as_str()).copied();
            }
        }
        None
    }

    /// Whether the function type at the call site is variadic.
    fn callee_var_arg(&self, op: &Operand) -> bool {
        let ty = self.module.type_of(op);
        match ty.as_ref() {
            Type::PointerType { pointee_type, .. } => {
                matches!(pointee_type.as_ref(), Type::FuncType { is_var_arg: true, .. })
            }
            Type::FuncType { is_var_arg, .. } => *is_var_arg,
            _ => false,
        }
    }

    fn lower_operand(
        &mut self,
        op: &Operand,
        fid: FuncId,
        params: &HashMap<&'a Name, usize>,
        locals: &HashMap<&'a Name, InstId>,
    ) -> ValueRef {
        match op {
            Operand::LocalOperand { name, .. } => {
                if let Some(&inst) = locals.get(name) {
                    ValueRef::Local(inst)
                } else if let Some(&index) = params.get(name) {
                    ValueRef::Arg(fid, index)
                } else {
                    ValueRef::Other
                }
            }
            Operand::ConstantOperand(c) => self.const_value_ref(c),
            Operand::MetadataOperand => ValueRef::Other,
        }
    }

    /// Constant operands reduce to a function reference (seen through
    /// casts) or an anonymous constant.
    fn const_value_ref(&self, c: &ConstantRef) -> ValueRef {
        match c.as_ref() {
            Constant::GlobalReference { name: Name::Name(s), .. } => self
                .fn_syms
                .get(s.as_str())
                .copied()
                .map(ValueRef::Func)
                .unwrap_or(ValueRef::Constant),
            Constant::BitCast(x) => self.const_value_ref(&x.operand),
            Constant::PtrToInt(x) => self.const_value_ref(&x.operand),
            Constant::IntToPtr(x) => self.const_value_ref(&x.operand),
            _ => ValueRef::Constant,
        }
    }

    /// The function-pointer cell named by a load/store address: a global
    /// variable, or a struct field reached through a `getelementptr`.
    fn address_cell(
        &self,
        address: &Operand,
        locals: &HashMap<&'a Name, InstId>,
        gep_cells: &HashMap<InstId, String>,
    ) -> Option<String> {
        match address {
            Operand::LocalOperand { name, .. } => {
                let inst = locals.get(name)?;
                gep_cells.get(inst).cloned()
            }
            Operand::ConstantOperand(c) => match c.as_ref() {
                Constant::GlobalReference { name: Name::Name(s), .. } => {
                    self.global_cells.get(s.as_str()).cloned()
                }
                Constant::GetElementPtr(gep) => self.const_gep_cell(gep),
                _ => None,
            },
            Operand::MetadataOperand => None,
        }
    }

    fn gep_cell(&self, address: &Operand, indices: &[Operand]) -> Option<String> {
        let name = self.gep_struct_name(address)?;
        if indices.len() != 2 {
            return None;
        }
        if let Operand::ConstantOperand(c) = &indices[1] {
            if let Constant::Int { value, .. } = c.as_ref() {
                return Some(format!("{},{}", name, value));
            }
        }
        None
    }

    fn const_gep_cell(&self, gep: &llvm_ir::constant::GetElementPtr) -> Option<String> {
        let ty = self.module.type_of(&gep.address);
        let name = named_struct_pointee(&ty)?;
        if gep.indices.len() != 2 {
            return None;
        }
        if let Constant::Int { value, .. } = gep.indices[1].as_ref() {
            return Some(format!("{},{}", name, value));
        }
        None
    }

    fn gep_struct_name(&self, address: &Operand) -> Option<String> {
        let ty = self.module.type_of(address);
        named_struct_pointee(&ty)
    }

    fn lower_const(&mut self, c: &ConstantRef) -> Const {
        match c.as_ref() {
            Constant::Struct { name, values, .. } => Const::Struct {
                type_name: name.clone(),
                literal: name.is_none(),
                fields: values.iter().map(|v| self.lower_const(v)).collect(),
            },
            Constant::Array { elements, .. } => {
                Const::Array { elems: elements.iter().map(|v| self.lower_const(v)).collect() }
            }
            Constant::GlobalReference { name: Name::Name(s), .. } => self
                .fn_syms
                .get(s.as_str())
                .copied()
                .map(Const::Func)
                .unwrap_or(Const::Other),
            Constant::BitCast(x) => self.lower_const(&x.operand),
            Constant::PtrToInt(x) => self.lower_const(&x.operand),
            Constant::IntToPtr(x) => self.lower_const(&x.operand),
            _ => Const::Other,
        }
    }

    /// Mark every function mentioned inside an operand as address-taken.
    /// Direct callee slots bypass this.
    fn mark_operand_mentions(&mut self, op: &Operand) {
        if let Operand::ConstantOperand(c) = op {
            self.mark_const_mentions(c);
        }
    }

    fn mark_const_mentions(&mut self, c: &ConstantRef) {
        match c.as_ref() {
            Constant::GlobalReference { name: Name::Name(s), .. } => {
                if let Some(&f) = self.fn_syms.get(s.as_str()) {
                    self.b.mark_address_taken(f);
                }
            }
            Constant::Struct { values, .. } => {
                for v in values {
                    self.mark_const_mentions(v);
                }
            }
            Constant::Array { elements, .. } => {
                for v in elements {
                    self.mark_const_mentions(v);
                }
            }
            Constant::Vector(elements) => {
                for v in elements {
                    self.mark_const_mentions(v);
                }
            }
            Constant::BitCast(x) => self.mark_const_mentions(&x.operand),
            Constant::PtrToInt(x) => self.mark_const_mentions(&x.operand),
            Constant::IntToPtr(x) => self.mark_const_mentions(&x.operand),
            Constant::GetElementPtr(gep) => {
                self.mark_const_mentions(&gep.address);
                for idx in &gep.indices {
                    self.mark_const_mentions(idx);
                }
            }
            _ => {}
        }
    }

    fn lower_type(&mut self, ty: &TypeRef) -> TypeId {
        match ty.as_ref() {
            Type::VoidType => self.b.types().void(),
            Type::IntegerType { bits } => self.b.types().int(*bits),
            Type::PointerType { pointee_type, addr_space } => {
                let pointee = self.lower_type(pointee_type);
                let addr_space = *addr_space;
                self.b.types().intern(TypeKind::Pointer { pointee, addr_space })
            }
            Type::FPType(fp) => {
                let bits = match fp {
                    FPType::Half | FPType::BFloat => 16,
                    FPType::Single => 32,
                    FPType::Double => 64,
                    FPType::X86_FP80 => 80,
                    _ => 128,
                };
                self.b.types().intern(TypeKind::Float { bits })
            }
            Type::FuncType { result_type, param_types, is_var_arg } => {
                let ret = self.lower_type(result_type);
                let params = param_types.iter().map(|p| self.lower_type(p)).collect();
                self.b.types().function(ret, params, *is_var_arg)
            }
            Type::ArrayType { element_type, num_elements } => {
                let elem = self.lower_type(element_type);
                let len = *num_elements as u64;
                self.b.types().intern(TypeKind::Array { elem, len })
            }
            Type::VectorType { element_type, num_elements, .. } => {
                let elem = self.lower_type(element_type);
                let len = *num_elements as u64;
                self.b.types().intern(TypeKind::Vector { elem, len })
            }
            Type::StructType { element_types, .. } => {
                let fields: Vec<TypeId> =
                    element_types.iter().map(|t| self.lower_type(t)).collect();
                self.b.types().intern(TypeKind::Struct { name: None, literal: true, fields })
            }
            Type::NamedStructType { name } => self.b.types().named_struct(name),
            Type::MetadataType => self.b.types().intern(TypeKind::Metadata),
            Type::LabelType => self.b.types().intern(TypeKind::Label),
            _ => self.b.types().intern(TypeKind::Other),
        }
    }
}

fn named_struct_pointee(ty: &TypeRef) -> Option<String> {
    if let Type::PointerType { pointee_type, .. } = ty.as_ref() {
        if let Type::NamedStructType { name } = pointee_type.as_ref() {
            return Some(name.clone());
        }
    }
    None
}

fn terminator_successors(term: &Terminator) -> Vec<&Name> {
    match term {
        Terminator::Br(b) => vec![&b.dest],
        Terminator::CondBr(c) => vec![&c.true_dest, &c.false_dest],
        Terminator::Switch(s) => {
            let mut dests: Vec<&Name> = vec![&s.default_dest];
            dests.extend(s.dests.iter().map(|(_, dest)| dest));
            dests
        }
        Terminator::IndirectBr(ib) => ib.possible_dests.iter().collect(),
        Terminator::Invoke(inv) => vec![&inv.return_label, &inv.exception_label],
        Terminator::CleanupRet(c) => c.unwind_dest.iter().collect(),
        Terminator::CatchRet(c) => vec![&c.successor],
        Terminator::CatchSwitch(cs) => {
            let mut dests: Vec<&Name> = cs.catch_handlers.iter().collect();
            dests.extend(cs.default_unwind_dest.iter());
            dests
        }
        _ => Vec::new(),
    }
}

fn source_loc(loc: &DebugLoc) -> SourceLoc {
    SourceLoc {
        directory: loc.directory.clone().unwrap_or_default(),
        file: loc.filename.clone(),
        line: loc.line,
    }
}

fn name_string(name: &Name) -> String {
    match name {
        Name::Name(s) => (**s).clone(),
        Name::Number(n) => n.to_string(),
    }
}
