mod common;

use std::fs;

use seedmind_core::callgraph::{dump_callers, CallGraphPass};
use seedmind_core::context::GlobalContext;
use seedmind_core::ir::{FunctionSpec, ProgramBuilder, SourceLoc, ValueRef};
use seedmind_core::loader;
use tempfile::tempdir;

/// Two modules: `f` in the first calls `g` through a declaration, the
/// definition of `g` lives in the second. The edge must land on the
/// definition, and the caller map must point back at the site.
#[test]
fn direct_call_resolves_to_the_definition_across_modules() {
    let mut pb = ProgramBuilder::new();
    let void = pb.types().void();

    let ma = pb.add_module("./a.c.llvm.bc");
    let f = pb.add_function(ma, FunctionSpec::new("f", void, vec![]));
    let g_decl = pb.add_function(ma, FunctionSpec::new("g", void, vec![]).declaration());
    let f_bb = pb.add_block(f);
    let site = common::direct_call(&mut pb, f_bb, g_decl, None);
    common::ret(&mut pb, f_bb);

    let mb = pb.add_module("./b.c.llvm.bc");
    let g_def = pb.add_function(mb, FunctionSpec::new("g", void, vec![]));
    let g_bb = pb.add_block(g_def);
    common::ret(&mut pb, g_bb);

    let program = pb.finish();
    let mut ctx = GlobalContext::new();
    loader::register_definitions(&program, &mut ctx);
    CallGraphPass::new().run(&program, &mut ctx);

    let callees = &ctx.callees[&site];
    assert_eq!(callees.len(), 1);
    assert!(callees.contains(&g_def), "edge must land on the definition, not the declaration");
    assert!(ctx.callers[&g_def].contains(&site));
    assert!(!ctx.callers.contains_key(&g_decl));
}

/// `__sys_read` registers under `sys_read`, so a call through a `sys_read`
/// declaration resolves to the `__sys_read` definition.
#[test]
fn sys_prefixed_definitions_are_registered_under_their_alias() {
    let mut pb = ProgramBuilder::new();
    let void = pb.types().void();

    let ma = pb.add_module("./read.c.llvm.bc");
    let sys_read = pb.add_function(ma, FunctionSpec::new("__sys_read", void, vec![]));
    let bb = pb.add_block(sys_read);
    common::ret(&mut pb, bb);

    let mb = pb.add_module("./caller.c.llvm.bc");
    let decl = pb.add_function(mb, FunctionSpec::new("sys_read", void, vec![]).declaration());
    let (_caller, caller_bb) = common::simple_func(&mut pb, mb, "caller");
    let site = common::direct_call(&mut pb, caller_bb, decl, None);
    common::ret(&mut pb, caller_bb);

    let program = pb.finish();
    let mut ctx = GlobalContext::new();
    loader::register_definitions(&program, &mut ctx);
    CallGraphPass::new().run(&program, &mut ctx);

    assert!(ctx.callees[&site].contains(&sys_read));
}

/// An `int (*)(int, int)` call site picks up exactly the address-taken
/// functions whose signatures are compatible.
#[test]
fn indirect_call_matches_compatible_address_taken_functions() {
    let mut pb = ProgramBuilder::new();
    let i32t = pb.types().int(32);
    let i64t = pb.types().int(64);

    let m = pb.add_module("./calc.c.llvm.bc");
    let add = pb.add_function(m, FunctionSpec::new("add", i32t, vec![i32t, i32t]));
    let sub = pb.add_function(m, FunctionSpec::new("sub", i32t, vec![i32t, i32t]));
    let mul = pb.add_function(m, FunctionSpec::new("mul_disguise", i32t, vec![i64t, i64t]));
    pb.mark_address_taken(add);
    pb.mark_address_taken(sub);

    let (_caller, bb) = common::simple_func(&mut pb, m, "caller");
    let site = common::indirect_call(&mut pb, bb, ValueRef::Other, i32t, &[i32t, i32t], None);
    common::ret(&mut pb, bb);

    let program = pb.finish();
    let mut ctx = GlobalContext::new();
    loader::register_definitions(&program, &mut ctx);
    CallGraphPass::new().run(&program, &mut ctx);

    let callees = &ctx.callees[&site];
    assert!(callees.contains(&add));
    assert!(callees.contains(&sub));
    assert!(!callees.contains(&mul), "mul_disguise never had its address taken");
    assert_eq!(ctx.address_taken_funcs.len(), 2);
    assert_eq!(ctx.indirect_call_insts, vec![site]);
}

/// A `char*` formal admits any pointer argument.
#[test]
fn char_pointer_parameter_admits_any_pointer_argument() {
    let mut pb = ProgramBuilder::new();
    let void = pb.types().void();
    let i8t = pb.types().int(8);
    let char_ptr = pb.types().pointer_to(i8t);
    let file_ty = pb.types().named_struct("struct.file");
    let file_ptr = pb.types().pointer_to(file_ty);

    let m = pb.add_module("./io.c.llvm.bc");
    let handler = pb.add_function(m, FunctionSpec::new("handler", void, vec![char_ptr]));
    pb.mark_address_taken(handler);

    let (_caller, bb) = common::simple_func(&mut pb, m, "caller");
    let site = common::indirect_call(&mut pb, bb, ValueRef::Other, void, &[file_ptr], None);
    common::ret(&mut pb, bb);

    let program = pb.finish();
    let mut ctx = GlobalContext::new();
    loader::register_definitions(&program, &mut ctx);
    CallGraphPass::new().run(&program, &mut ctx);

    assert!(ctx.callees[&site].contains(&handler));
}

/// After finalization, `site ∈ callers[f]` iff `f ∈ callees[site]`.
#[test]
fn callers_and_callees_are_mutual_inverses() {
    let mut pb = ProgramBuilder::new();
    let i32t = pb.types().int(32);

    let m = pb.add_module("./prog.c.llvm.bc");
    let worker = pb.add_function(m, FunctionSpec::new("worker", i32t, vec![i32t]));
    pb.mark_address_taken(worker);
    let (helper, helper_bb) = common::simple_func(&mut pb, m, "helper");
    common::ret(&mut pb, helper_bb);

    let (_main, main_bb) = common::simple_func(&mut pb, m, "main");
    common::direct_call(&mut pb, main_bb, helper, None);
    common::indirect_call(&mut pb, main_bb, ValueRef::Other, i32t, &[i32t], None);
    common::ret(&mut pb, main_bb);

    let program = pb.finish();
    let mut ctx = GlobalContext::new();
    loader::register_definitions(&program, &mut ctx);
    CallGraphPass::new().run(&program, &mut ctx);

    for (site, fns) in &ctx.callees {
        for f in fns {
            assert!(ctx.callers[f].contains(site));
        }
    }
    for (f, sites) in &ctx.callers {
        for site in sites {
            assert!(ctx.callees[site].contains(f));
        }
    }
}

/// `.init.text` functions take no part in the graph: not as callers, not
/// as callees, not as indirect candidates.
#[test]
fn init_text_functions_are_excluded_from_the_graph() {
    let mut pb = ProgramBuilder::new();
    let void = pb.types().void();

    let m = pb.add_module("./boot.c.llvm.bc");
    let init =
        pb.add_function(m, FunctionSpec::new("do_init", void, vec![]).section(".init.text"));
    let init_bb = pb.add_block(init);
    pb.mark_address_taken(init);

    let (worker, worker_bb) = common::simple_func(&mut pb, m, "worker");
    common::ret(&mut pb, worker_bb);

    let inner_site = common::direct_call(&mut pb, init_bb, worker, None);
    common::ret(&mut pb, init_bb);

    let (_main, main_bb) = common::simple_func(&mut pb, m, "main");
    let outer_site = common::direct_call(&mut pb, main_bb, init, None);
    common::ret(&mut pb, main_bb);

    let program = pb.finish();
    let mut ctx = GlobalContext::new();
    loader::register_definitions(&program, &mut ctx);
    CallGraphPass::new().run(&program, &mut ctx);

    assert!(!ctx.callees.contains_key(&inner_site));
    assert!(ctx.callees.get(&outer_site).map_or(true, |s| s.is_empty()));
    assert!(!ctx.callers.contains_key(&init));
    assert!(!ctx.address_taken_funcs.contains(&init));
}

/// Intrinsic calls never produce edges.
#[test]
fn intrinsic_calls_are_ignored() {
    let mut pb = ProgramBuilder::new();
    let void = pb.types().void();

    let m = pb.add_module("./mem.c.llvm.bc");
    let memcpy = pb.add_function(
        m,
        FunctionSpec::new("llvm.memcpy.p0i8.p0i8.i64", void, vec![]).declaration(),
    );
    let (_main, bb) = common::simple_func(&mut pb, m, "main");
    let site = common::direct_call(&mut pb, bb, memcpy, None);
    common::ret(&mut pb, bb);

    let program = pb.finish();
    let mut ctx = GlobalContext::new();
    loader::register_definitions(&program, &mut ctx);
    CallGraphPass::new().run(&program, &mut ctx);

    assert!(!ctx.callees.contains_key(&site));
    assert!(ctx.callers.is_empty());
}

/// Running the pass twice over the same context changes nothing.
#[test]
fn second_run_is_a_fixpoint() {
    let mut pb = ProgramBuilder::new();
    let i32t = pb.types().int(32);

    let m = pb.add_module("./prog.c.llvm.bc");
    let cb = pb.add_function(m, FunctionSpec::new("cb", i32t, vec![i32t]));
    pb.mark_address_taken(cb);
    let (helper, helper_bb) = common::simple_func(&mut pb, m, "helper");
    common::ret(&mut pb, helper_bb);
    let (_main, bb) = common::simple_func(&mut pb, m, "main");
    common::direct_call(&mut pb, bb, helper, None);
    common::indirect_call(&mut pb, bb, ValueRef::Other, i32t, &[i32t], None);
    common::ret(&mut pb, bb);

    let program = pb.finish();
    let mut ctx = GlobalContext::new();
    loader::register_definitions(&program, &mut ctx);
    let pass = CallGraphPass::new();
    pass.run(&program, &mut ctx);

    let callees = ctx.callees.clone();
    let callers = ctx.callers.clone();
    let func_ptrs = ctx.func_ptrs.clone();
    pass.run(&program, &mut ctx);

    assert_eq!(ctx.callees, callees);
    assert_eq!(ctx.callers, callers);
    assert_eq!(ctx.func_ptrs, func_ptrs);
}

/// The call-graph dump lists one `caller:callee:flag` line per edge, with
/// normalized absolute locations, `1` for direct and `0` for indirect.
#[test]
fn call_graph_dump_lists_direct_and_indirect_edges() {
    let mut pb = ProgramBuilder::new();
    let void = pb.types().void();

    let m = pb.add_module("./a.c.llvm.bc");
    let g = pb.add_function(
        m,
        FunctionSpec::new("g", void, vec![]).subprogram(SourceLoc::new("/src", "b.c", 1)),
    );
    let g_bb = pb.add_block(g);
    common::ret(&mut pb, g_bb);

    let handler = pb.add_function(
        m,
        FunctionSpec::new("handler", void, vec![]).subprogram(SourceLoc::new("/src", "h.c", 3)),
    );
    let h_bb = pb.add_block(handler);
    common::ret(&mut pb, h_bb);
    pb.mark_address_taken(handler);

    let (_f, f_bb) = common::simple_func(&mut pb, m, "f");
    common::direct_call(&mut pb, f_bb, g, Some(SourceLoc::new("/src", "./x/../a.c", 5)));
    common::indirect_call(
        &mut pb,
        f_bb,
        ValueRef::Other,
        void,
        &[],
        Some(SourceLoc::new("/src", "a.c", 9)),
    );
    common::ret(&mut pb, f_bb);

    let program = pb.finish();
    let mut ctx = GlobalContext::new();
    loader::register_definitions(&program, &mut ctx);
    CallGraphPass::new().run(&program, &mut ctx);

    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("callgraph_result");
    dump_callers(&program, &ctx, "/src", &path).expect("dump_callers");

    let contents = fs::read_to_string(&path).expect("read dump");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines, vec!["/src/a.c:5:/src/b.c:1:1", "/src/a.c:9:/src/h.c:3:0"]);
}
