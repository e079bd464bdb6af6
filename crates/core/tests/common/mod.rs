#![allow(dead_code)]

//! Shared helpers for building small programs in tests.

use seedmind_core::ir::{
    BlockId, CallArg, CallData, Callee, FuncId, FunctionSpec, InstId, InstKind, ModuleId,
    ProgramBuilder, SourceLoc, TypeId, ValueRef,
};

/// A void function with one block, ready for instructions.
pub fn simple_func(pb: &mut ProgramBuilder, module: ModuleId, name: &str) -> (FuncId, BlockId) {
    let void = pb.types().void();
    let f = pb.add_function(module, FunctionSpec::new(name, void, vec![]));
    let bb = pb.add_block(f);
    (f, bb)
}

/// A direct call with no arguments.
pub fn direct_call(
    pb: &mut ProgramBuilder,
    block: BlockId,
    callee: FuncId,
    loc: Option<SourceLoc>,
) -> InstId {
    let void = pb.types().void();
    pb.add_inst(
        block,
        loc,
        void,
        InstKind::Call(CallData {
            callee: Callee::Direct(callee),
            args: Vec::new(),
            ret_ty: void,
            site_var_arg: false,
            is_inline_asm: false,
        }),
    )
}

/// An indirect call through `value` with the given signature. Argument
/// values are anonymous constants; only their types matter to resolution.
pub fn indirect_call(
    pb: &mut ProgramBuilder,
    block: BlockId,
    value: ValueRef,
    ret_ty: TypeId,
    arg_tys: &[TypeId],
    loc: Option<SourceLoc>,
) -> InstId {
    let args = arg_tys.iter().map(|&ty| CallArg { value: ValueRef::Constant, ty }).collect();
    pb.add_inst(
        block,
        loc,
        ret_ty,
        InstKind::Call(CallData {
            callee: Callee::Indirect(value),
            args,
            ret_ty,
            site_var_arg: false,
            is_inline_asm: false,
        }),
    )
}

/// A void return, closing a block.
pub fn ret(pb: &mut ProgramBuilder, block: BlockId) -> InstId {
    let void = pb.types().void();
    pb.add_inst(block, None, void, InstKind::Ret { value: None })
}
