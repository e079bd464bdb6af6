mod common;

use seedmind_core::ir::{FunctionSpec, InstKind, ProgramBuilder, SourceLoc};
use seedmind_core::slicing::{
    find_block_by_line, find_call_site_by_line, find_function_by_line, find_function_by_name,
    Slicer,
};

/// Exact names win; a mangled symbol containing the query is the fallback;
/// declarations never match.
#[test]
fn find_function_by_name_prefers_exact_then_mangled() {
    let mut pb = ProgramBuilder::new();
    let void = pb.types().void();
    let m = pb.add_module("./p.c.llvm.bc");

    let decl = pb.add_function(m, FunctionSpec::new("parse_config", void, vec![]).declaration());
    let (parse_config, bb1) = common::simple_func(&mut pb, m, "parse_config");
    common::ret(&mut pb, bb1);
    let (mangled, bb2) = common::simple_func(&mut pb, m, "_Z5parsePc");
    common::ret(&mut pb, bb2);

    let program = pb.finish();

    assert_eq!(find_function_by_name(&program, "p.c", "parse_config"), Some(parse_config));
    assert_eq!(find_function_by_name(&program, "p.c", "parse"), Some(mangled));
    assert_eq!(find_function_by_name(&program, "p.c", "missing"), None);
    assert_ne!(find_function_by_name(&program, "p.c", "parse_config"), Some(decl));
}

/// The module identifier must contain the requested file; the first block
/// with a matching instruction line wins.
#[test]
fn find_block_by_line_matches_module_substring() {
    let mut pb = ProgramBuilder::new();
    let void = pb.types().void();
    let m1 = pb.add_module("./src/net/http.c.llvm.bc");
    let (_f, bb) = common::simple_func(&mut pb, m1, "handle");
    pb.add_inst(bb, Some(SourceLoc::new("/src", "net/http.c", 42)), void, InstKind::Other);
    common::ret(&mut pb, bb);

    let program = pb.finish();
    assert_eq!(find_block_by_line(&program, "net/http.c", 42), Some(bb));
    assert_eq!(find_block_by_line(&program, "ftp.c", 42), None);
    assert_eq!(find_block_by_line(&program, "net/http.c", 999), None);
}

/// Call sites are found through the location cache on exact normalized
/// paths, and by loose substring matching otherwise.
#[test]
fn find_call_site_by_line_uses_normalized_paths() {
    let mut pb = ProgramBuilder::new();
    let m = pb.add_module("./src/y/a.c.llvm.bc");
    let (callee, callee_bb) = common::simple_func(&mut pb, m, "callee");
    common::ret(&mut pb, callee_bb);
    let (_f, bb) = common::simple_func(&mut pb, m, "f");
    let site = common::direct_call(
        &mut pb,
        bb,
        callee,
        Some(SourceLoc::new("/src", "./x/../y/a.c", 7)),
    );
    common::ret(&mut pb, bb);

    let program = pb.finish();
    let mut slicer = Slicer::new();
    slicer.cache_targets(&program);

    // Exact absolute path: answered from the cache.
    assert_eq!(find_call_site_by_line(&program, &slicer, "/src/y/a.c", 7), Some(site));
    // Loose relative query: answered by the scan.
    assert_eq!(find_call_site_by_line(&program, &slicer, "src/y/a.c", 7), Some(site));
    assert_eq!(find_call_site_by_line(&program, &slicer, "src/y/a.c", 8), None);
}

/// Functions are found by their subprogram declaration line.
#[test]
fn find_function_by_line_matches_subprogram() {
    let mut pb = ProgramBuilder::new();
    let void = pb.types().void();
    let m = pb.add_module("./src/y/a.c.llvm.bc");
    let f = pb.add_function(
        m,
        FunctionSpec::new("open_file", void, vec![]).subprogram(SourceLoc::new(
            "/src",
            "y/a.c",
            10,
        )),
    );
    let bb = pb.add_block(f);
    common::ret(&mut pb, bb);

    let program = pb.finish();
    let mut slicer = Slicer::new();
    slicer.cache_targets(&program);

    assert_eq!(find_function_by_line(&program, &slicer, "/src/y/a.c", 10), Some(f));
    assert_eq!(find_function_by_line(&program, &slicer, "src/y/a.c", 10), Some(f));
    assert_eq!(find_function_by_line(&program, &slicer, "src/y/a.c", 11), None);
}
