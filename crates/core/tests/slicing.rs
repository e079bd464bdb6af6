mod common;

use seedmind_core::callgraph::CallGraphPass;
use seedmind_core::context::GlobalContext;
use seedmind_core::ir::{FuncId, Program, ProgramBuilder};
use seedmind_core::loader;
use seedmind_core::slicing::Slicer;

/// `main -> setup -> work -> target`, with `work` also calling `helper`
/// in a block that reaches the `target` call site.
struct Chain {
    program: Program,
    ctx: GlobalContext,
    main: FuncId,
    setup: FuncId,
    work: FuncId,
    target: FuncId,
    helper: FuncId,
}

fn build_chain() -> Chain {
    let mut pb = ProgramBuilder::new();
    let m = pb.add_module("./chain.c.llvm.bc");

    let (target, target_bb) = common::simple_func(&mut pb, m, "target");
    common::ret(&mut pb, target_bb);

    let (helper, helper_bb) = common::simple_func(&mut pb, m, "helper");
    common::ret(&mut pb, helper_bb);

    let (work, work_bb1) = common::simple_func(&mut pb, m, "work");
    let work_bb2 = pb.add_block(work);
    pb.add_edge(work_bb1, work_bb2);
    common::direct_call(&mut pb, work_bb1, helper, None);
    common::ret(&mut pb, work_bb1);
    common::direct_call(&mut pb, work_bb2, target, None);
    common::ret(&mut pb, work_bb2);

    let (setup, setup_bb) = common::simple_func(&mut pb, m, "setup");
    common::direct_call(&mut pb, setup_bb, work, None);
    common::ret(&mut pb, setup_bb);

    let (main, main_bb) = common::simple_func(&mut pb, m, "main");
    common::direct_call(&mut pb, main_bb, setup, None);
    common::ret(&mut pb, main_bb);

    let program = pb.finish();
    let mut ctx = GlobalContext::new();
    loader::register_definitions(&program, &mut ctx);
    CallGraphPass::new().run(&program, &mut ctx);

    Chain { program, ctx, main, setup, work, target, helper }
}

/// Every block of every function on the calling chain lands in the
/// backward slice, and the sibling call to `helper` joins the verbose set.
#[test]
fn backward_slice_covers_the_calling_chain() {
    let Chain { program, ctx, main, setup, work, target, helper } = build_chain();
    let mut slicer = Slicer::new();
    slicer.slice_function(&program, &ctx, target);

    for f in [main, setup, work, target] {
        for bb in &program.func(f).blocks {
            assert!(
                slicer.visited_blocks().contains(bb),
                "block of {} missing from the slice",
                program.func(f).name
            );
        }
    }
    assert!(slicer.verbose_funcs().contains(&helper));
    assert!(slicer.sliced_func_cnt() >= 1);
}

/// Forward slicing from `main` reaches every transitive callee; the seed
/// itself is not part of the callee set.
#[test]
fn forward_slice_reaches_transitive_callees() {
    let Chain { program, ctx, main, setup, work, target, helper } = build_chain();
    let mut slicer = Slicer::new();
    slicer.forward_slice_function(&program, &ctx, main);

    for f in [setup, work, target, helper] {
        assert!(slicer.forward_visited().contains(&f));
        for bb in &program.func(f).blocks {
            assert!(slicer.verbose_blocks().contains(bb));
        }
    }
    assert!(!slicer.forward_visited().contains(&main));
}

/// A depth-1 walk stops one call hop from the seed.
#[test]
fn depth_bounded_forward_slice_stops_at_the_horizon() {
    let Chain { program, ctx, main, setup, work, .. } = build_chain();
    let mut visited = indexmap::IndexSet::new();
    Slicer::forward_slice_with_depth(&program, &ctx, main, 1, &mut visited);

    assert!(visited.contains(&main));
    assert!(visited.contains(&setup));
    assert!(!visited.contains(&work));
}

/// Reverse DFS crosses diamonds, tolerates duplicate predecessor edges
/// (a conditional branch with both arms on one target) and self loops.
#[test]
fn backtrack_handles_diamonds_and_duplicate_edges() {
    let mut pb = ProgramBuilder::new();
    let m = pb.add_module("./cfg.c.llvm.bc");
    let (f, entry) = common::simple_func(&mut pb, m, "f");
    let a = pb.add_block(f);
    let b = pb.add_block(f);
    let join = pb.add_block(f);
    // entry branches to `a` twice (both arms of a conditional).
    pb.add_edge(entry, a);
    pb.add_edge(entry, a);
    pb.add_edge(entry, b);
    pb.add_edge(a, join);
    pb.add_edge(b, join);
    pb.add_edge(join, join);
    for bb in [entry, a, b, join] {
        common::ret(&mut pb, bb);
    }

    let program = pb.finish();
    let mut ctx = GlobalContext::new();
    loader::register_definitions(&program, &mut ctx);
    CallGraphPass::new().run(&program, &mut ctx);

    let mut slicer = Slicer::new();
    slicer.backtrack(&program, &ctx, join);

    for bb in [entry, a, b, join] {
        assert!(slicer.visited_blocks().contains(&bb));
    }
}

/// The fuzz-entry stub seeds a forward slice by symbol name; a missing
/// stub is skipped quietly.
#[test]
fn fuzz_entry_stub_seeds_forward_slice() {
    let mut pb = ProgramBuilder::new();
    let m = pb.add_module("./harness.c.llvm.bc");
    let (parse, parse_bb) = common::simple_func(&mut pb, m, "parse");
    common::ret(&mut pb, parse_bb);
    let (_entry, entry_bb) = common::simple_func(&mut pb, m, "LLVMFuzzerTestOneInput");
    common::direct_call(&mut pb, entry_bb, parse, None);
    common::ret(&mut pb, entry_bb);

    let program = pb.finish();
    let mut ctx = GlobalContext::new();
    loader::register_definitions(&program, &mut ctx);
    CallGraphPass::new().run(&program, &mut ctx);

    let mut slicer = Slicer::new();
    slicer.forward_slice_stub(&program, &ctx, "LLVMFuzzerTestOneInput");
    assert!(slicer.forward_visited().contains(&parse));

    slicer.forward_slice_stub(&program, &ctx, "LLVMFuzzerInitialize");
}

/// `clear` resets every piece of per-query state.
#[test]
fn clear_resets_all_query_state() {
    let Chain { program, ctx, target, .. } = build_chain();
    let mut slicer = Slicer::new();
    slicer.cache_targets(&program);
    slicer.slice_function(&program, &ctx, target);
    assert!(!slicer.visited_blocks().is_empty());

    slicer.clear();
    assert!(slicer.visited_blocks().is_empty());
    assert!(slicer.verbose_blocks().is_empty());
    assert!(slicer.verbose_funcs().is_empty());
    assert!(slicer.forward_visited().is_empty());
    assert_eq!(slicer.sliced_func_cnt(), 0);
}

/// Slicing the same target twice yields the same sets.
#[test]
fn slicing_is_idempotent_per_target() {
    let Chain { program, ctx, target, .. } = build_chain();

    let mut first = Slicer::new();
    first.slice_function(&program, &ctx, target);
    first.forward_slice_function(&program, &ctx, target);

    let mut second = Slicer::new();
    second.slice_function(&program, &ctx, target);
    second.forward_slice_function(&program, &ctx, target);

    assert_eq!(first.visited_blocks(), second.visited_blocks());
    assert_eq!(first.verbose_funcs(), second.verbose_funcs());
    assert_eq!(first.forward_visited(), second.forward_visited());
}
