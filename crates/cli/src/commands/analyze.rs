use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use seedmind_core::callgraph::{self, CallGraphPass, CALL_GRAPH_OUTPUT_FILE};
use seedmind_core::context::GlobalContext;
use seedmind_core::emit::{self, SliceOutput};
use seedmind_core::ir::{FuncId, Program};
use seedmind_core::loader;
use seedmind_core::slicing::{self, Slicer};

use crate::parse_multi_line;

/// Fixed fuzz-entry convention, not a configuration knob.
const FUZZ_ENTRY_STUBS: [&str; 3] =
    ["LLVMFuzzerInitialize", "LLVMFuzzerTestOneInput", "LLVMFuzzerRunDriver"];

/// Everything one analyzer run needs, as parsed from the command line.
#[derive(Debug)]
pub struct AnalyzeRequest {
    pub inputs: Vec<String>,
    pub srcroot: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub func: Option<String>,
    pub multi: Option<String>,
    pub output: String,
    pub callgraph: bool,
    pub slicing: bool,
    pub struct_name: Option<String>,
    pub json: bool,
}

/// Validate the argument surface. Returns a user-facing message for the
/// first violation; the caller reports it and exits with -1.
pub fn validate(req: &AnalyzeRequest) -> Result<(), String> {
    if req.inputs.is_empty() {
        return Err("Please provide at least one input IR file.".to_string());
    }
    if req.file.is_none() && req.multi.is_none() {
        return Err("Please provide the target file name with --file or --multi.".to_string());
    }
    if req.file.is_some() && req.multi.is_some() {
        return Err("--file and --multi are mutually exclusive.".to_string());
    }
    let selectors =
        [req.line.is_some(), req.func.is_some(), req.multi.is_some()].iter().filter(|&&b| b).count();
    if selectors == 0 {
        return Err(
            "Please provide the target line number or target func name with --line or --func or --multi."
                .to_string(),
        );
    }
    if selectors > 1 {
        return Err("--line, --func and --multi are mutually exclusive.".to_string());
    }
    if req.srcroot.is_empty() {
        return Err("Please provide the target source directory with --srcroot.".to_string());
    }
    if req.slicing && !req.callgraph {
        return Err("Please set callgraph to true!".to_string());
    }
    Ok(())
}

/// Run the requested phases: load, call graph, slicing, emission.
pub fn analyze_command(req: &AnalyzeRequest) -> Result<()> {
    log::debug!("seedmind-core v{}", seedmind_core::version());
    if let Some(name) = &req.struct_name {
        log::debug!("struct allocation diagnostics requested for {} (legacy; ignored)", name);
    }

    let mut ctx = GlobalContext::new();
    let program = loader::load_modules(&req.inputs, &mut ctx);

    emit::write_total_basicblock(&program, Path::new("total_basicblock"))
        .context("Failed to write total_basicblock")?;

    let out_dir = PathBuf::from(&req.output);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let mut callgraph_seconds = 0.0;
    if req.callgraph {
        let start = Instant::now();
        CallGraphPass::new().run(&program, &mut ctx);
        callgraph_seconds = start.elapsed().as_secs_f64();
        eprintln!("Time taken by call graph generation : {:.2} seconds", callgraph_seconds);

        let cg_path = out_dir.join(CALL_GRAPH_OUTPUT_FILE);
        callgraph::dump_callers(&program, &ctx, &req.srcroot, &cg_path)
            .with_context(|| format!("Failed to write {}", cg_path.display()))?;
    }

    let mut slice_summary = serde_json::Value::Null;
    if req.slicing {
        let start = Instant::now();
        let full_func = emit::full_function_names(&program);
        let mut slicer = Slicer::new();

        if let Some(multi) = &req.multi {
            let config = fs::read_to_string(multi)
                .with_context(|| format!("Failed to read batch config {}", multi))?;
            let mut merged = SliceOutput::default();
            let mut found = 0usize;
            for line in config.lines() {
                let Some((file, func)) = parse_multi_line(line) else { continue };
                slicer.cache_targets(&program);
                let Some(target) = slicing::find_function_by_name(&program, &file, &func) else {
                    println!("Can't find the targetFunc {}:{}", file, func);
                    continue;
                };
                print_target(&program, target, &file, Some(found));
                found += 1;

                slicer.slice_function(&program, &ctx, target);
                slicer.forward_slice_function(&program, &ctx, target);
                for stub in FUZZ_ENTRY_STUBS {
                    slicer.forward_slice_stub(&program, &ctx, stub);
                }

                let out =
                    emit::collect_slice_output(&program, &ctx, &mut slicer, &req.srcroot, false);
                println!("sliced block {}", slicer.visited_blocks().len());
                println!("sliced function {}", slicer.sliced_func_cnt());
                out.write(&out_dir, &func, &full_func);
                merged.merge_from(&out);
                slicer.clear();
            }
            merged.write(&out_dir, "merged", &full_func);
            println!("unique func names {}", merged.funcs.len());
            println!("unique verbose func names {}", merged.funcs_verbose.len());
            println!("blacklist count {}", merged.blacklist(&full_func).len());
            slice_summary = serde_json::json!({
                "label": "merged",
                "targets_found": found,
                "slice_lines": merged.slice.len(),
                "verbose_lines": merged.slice_verbose.len(),
                "func_names": merged.funcs.len(),
                "func_verbose_names": merged.funcs_verbose.len(),
                "blacklist": merged.blacklist(&full_func).len(),
                "seconds": start.elapsed().as_secs_f64(),
            });
        } else {
            slicer.cache_targets(&program);
            let file = req.file.as_deref().unwrap_or_default();

            let label = if let Some(line) = req.line {
                let Some(block) = slicing::find_block_by_line(&program, file, line) else {
                    println!("Can't find the target. Retry with the target function name");
                    std::process::exit(-1);
                };
                slicer.backtrack(&program, &ctx, block);
                program.func(program.block(block).function).name.clone()
            } else {
                let func = req.func.as_deref().unwrap_or_default();
                let Some(target) = slicing::find_function_by_name(&program, file, func) else {
                    println!("Can't find the targetFunc {}:{}", file, func);
                    std::process::exit(-1);
                };
                print_target(&program, target, file, None);

                slicer.slice_function(&program, &ctx, target);
                slicer.forward_slice_function(&program, &ctx, target);
                for stub in FUZZ_ENTRY_STUBS {
                    slicer.forward_slice_stub(&program, &ctx, stub);
                }
                func.to_string()
            };

            let out = emit::collect_slice_output(&program, &ctx, &mut slicer, &req.srcroot, false);
            let seconds = start.elapsed().as_secs_f64();
            println!("Time taken by slice : {:.2} seconds", seconds);
            println!("sliced block {}", slicer.visited_blocks().len());
            println!("sliced function {}", slicer.sliced_func_cnt());
            out.write(&out_dir, &label, &full_func);
            println!("unique func names {}", out.funcs.len());
            println!("unique verbose func names {}", out.funcs_verbose.len());
            println!("blacklist count {}", out.blacklist(&full_func).len());
            slice_summary = serde_json::json!({
                "label": label,
                "sliced_blocks": slicer.visited_blocks().len(),
                "sliced_functions": slicer.sliced_func_cnt(),
                "slice_lines": out.slice.len(),
                "verbose_lines": out.slice_verbose.len(),
                "func_names": out.funcs.len(),
                "func_verbose_names": out.funcs_verbose.len(),
                "blacklist": out.blacklist(&full_func).len(),
                "seconds": seconds,
            });
        }
    }

    if req.json {
        let summary = serde_json::json!({
            "modules": program.modules().len(),
            "functions": program.func_count(),
            "basic_blocks": program.block_count(),
            "call_sites": ctx.callees.len(),
            "indirect_call_sites": ctx.indirect_call_insts.len(),
            "callgraph_seconds": callgraph_seconds,
            "slice": slice_summary,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

fn print_target(program: &Program, target: FuncId, file: &str, index: Option<usize>) {
    let fd = program.func(target);
    let prefix = match index {
        Some(i) => format!("{} ", i),
        None => String::new(),
    };
    match &fd.subprogram {
        Some(sp) => {
            println!("{}Find the target function: {}:{}:{}", prefix, file, fd.name, sp.line)
        }
        None => {
            println!("{}Find the target function: {}:{}:(No debug info)", prefix, file, fd.name)
        }
    }
}
