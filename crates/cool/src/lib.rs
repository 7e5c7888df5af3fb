//! Top-level COOL front-end: wires `cool-sema`'s passes and `cool-interp`'s
//! evaluator into the single pipeline entry point external callers use.
//!
//! ```text
//! AST -> TypeCollector -> TypeBuilder -> TopologicalOrdering
//!      -> OverrideChecker -> InferenceChecker -> TypeChecker
//!      -> (if no diagnostics) Executor
//! ```

pub use cool_ast::Program;
pub use cool_interp::{RuntimeError, RuntimeErrorKind};
pub use cool_sema::{Context, SemaError};

/// Run the full pipeline over `program`, consuming it (semantic analysis
/// rewrites `AUTO_TYPE` slots in place, so the tree that comes back out
/// the other side isn't the one a caller should keep inspecting).
///
/// Returns every diagnostic collected across every pass, in the order
/// produced, and -- only if diagnostics is empty -- the runtime error
/// the evaluator stopped on, if any. `verbose` mirrors the teacher
/// driver's own tracing convention: a one-line `eprintln!` per stage
/// reporting how many diagnostics (or which runtime error) it produced.
pub fn compile_and_run(mut program: Program, verbose: bool) -> (Vec<String>, Option<RuntimeError>) {
    let (ctx, sema_diags) = cool_sema::check(&mut program);

    if verbose {
        eprintln!("semantic analysis: {} diagnostic(s)", sema_diags.len());
    }

    let messages: Vec<String> = sema_diags.iter().map(|e| e.to_string()).collect();
    if !sema_diags.is_empty() {
        return (messages, None);
    }

    let mut executor = cool_interp::Executor::new(&ctx, &program);
    match executor.run() {
        Ok(_) => (messages, None),
        Err(err) => {
            if verbose {
                eprintln!("runtime error: {err}");
            }
            (messages, Some(err))
        }
    }
}
