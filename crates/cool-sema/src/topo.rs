//! Third semantic pass: verifies the inheritance graph is acyclic and
//! reorders the program's class declarations so that every class comes
//! after its parent.
//!
//! Nothing downstream actually depends on that order any more (each
//! class's attributes and methods are fully self-contained once
//! `TypeBuilder` has run), but producing it is still how we certify
//! acyclicity, and callers that want a deterministic "parents first"
//! traversal order -- the evaluator's instance-initialization order,
//! for one -- rely on it.
//!
//! A class involved in a cycle still has its cyclic `parent` link set in
//! `Context` (`TypeBuilder` resolved it to a real class, it just happens
//! to close a loop), and `Context::ancestors`/`lookup_attr`/`lookup_method`
//! all walk that link without a cycle guard. Every pass downstream of
//! this one runs unconditionally regardless of what diagnostics are
//! already pending, so this pass severs each cyclic class's `parent`
//! link and repoints it at `Object` as it reports the cycle -- the same
//! "parent is unresolved, treat as a root under `Object`" rule
//! `TypeBuilder` already applies to an undefined parent name.

use rustc_hash::FxHashMap;

use cool_ast::Program;

use crate::context::Context;
use crate::diagnostics::Diagnostics;
use crate::error::SemaError;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

pub fn run(ctx: &mut Context, program: &mut Program, diags: &mut Diagnostics) {
    let index_by_name: FxHashMap<String, usize> = program
        .classes
        .iter()
        .enumerate()
        .map(|(i, c)| (c.name.clone(), i))
        .collect();

    let mut color: Vec<Color> = vec![Color::White; program.classes.len()];
    let mut order: Vec<usize> = Vec::with_capacity(program.classes.len());
    let mut stack: Vec<usize> = Vec::new();
    let mut reported_cycle: Vec<bool> = vec![false; program.classes.len()];

    for start in 0..program.classes.len() {
        if color[start] == Color::White {
            visit(
                ctx,
                program,
                &index_by_name,
                start,
                &mut color,
                &mut stack,
                &mut order,
                &mut reported_cycle,
                diags,
            );
        }
    }

    let mut reordered = Vec::with_capacity(program.classes.len());
    let mut taken = vec![false; program.classes.len()];
    for idx in order {
        if !taken[idx] {
            taken[idx] = true;
            reordered.push(program.classes[idx].clone());
        }
    }
    for (idx, class) in program.classes.iter().enumerate() {
        if !taken[idx] {
            reordered.push(class.clone());
        }
    }
    program.classes = reordered;
}

#[allow(clippy::too_many_arguments)]
fn visit(
    ctx: &mut Context,
    program: &Program,
    index_by_name: &FxHashMap<String, usize>,
    node: usize,
    color: &mut [Color],
    stack: &mut Vec<usize>,
    order: &mut Vec<usize>,
    reported_cycle: &mut [bool],
    diags: &mut Diagnostics,
) {
    color[node] = Color::Gray;
    stack.push(node);

    if let Some(parent_name) = &program.classes[node].parent {
        if let Some(&parent_idx) = index_by_name.get(parent_name) {
            // Only an edge worth following if the parent resolved to a
            // real user class and isn't one of the builtins TypeBuilder
            // already rejected as an inheritance target.
            if ctx.get_type_id(parent_name).is_some()
                && !ctx.is_builtin(ctx.get_type_id(parent_name).unwrap())
            {
                match color[parent_idx] {
                    Color::White => visit(
                        ctx,
                        program,
                        index_by_name,
                        parent_idx,
                        color,
                        stack,
                        order,
                        reported_cycle,
                        diags,
                    ),
                    Color::Gray => {
                        let cycle_start = stack.iter().position(|&n| n == parent_idx).unwrap();
                        let object_id = ctx.object_id();
                        for &member in &stack[cycle_start..] {
                            if !reported_cycle[member] {
                                reported_cycle[member] = true;
                                diags.push(SemaError::InheritanceCycle {
                                    class: program.classes[member].name.clone(),
                                });
                                if let Some(member_id) = ctx.get_type_id(&program.classes[member].name) {
                                    ctx.set_parent(member_id, object_id);
                                }
                            }
                        }
                    }
                    Color::Black => {}
                }
            }
        }
    }

    stack.pop();
    color[node] = Color::Black;
    order.push(node);
}

#[cfg(test)]
mod tests {
    use super::*;
    use cool_common::Span;

    fn class(name: &str, parent: Option<&str>) -> cool_ast::ClassDecl {
        cool_ast::ClassDecl {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            attrs: vec![],
            methods: vec![],
            span: Span::synthetic(),
        }
    }

    fn build(names: Vec<(&str, Option<&str>)>) -> (Context, Program, Diagnostics) {
        let mut ctx = Context::with_builtins();
        let mut diags = Diagnostics::new();
        let mut program = Program {
            classes: names.into_iter().map(|(n, p)| class(n, p)).collect(),
        };
        crate::type_collector::run(&mut ctx, &program, &mut diags);
        crate::type_builder::run(&mut ctx, &program, &mut diags);
        diags = Diagnostics::new();
        run(&mut ctx, &mut program, &mut diags);
        (ctx, program, diags)
    }

    #[test]
    fn parent_before_child_after_reorder() {
        let (_, program, diags) = build(vec![("B", Some("A")), ("A", None)]);
        assert!(diags.is_empty());
        let names: Vec<_> = program.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn direct_cycle_is_reported() {
        let (_, _, diags) = build(vec![("A", Some("B")), ("B", Some("A"))]);
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn cyclic_classes_are_repointed_at_object_in_context() {
        let (ctx, _, _) = build(vec![("A", Some("B")), ("B", Some("A"))]);
        let a = ctx.get_type_id("A").unwrap();
        let b = ctx.get_type_id("B").unwrap();
        assert_eq!(ctx.class(a).parent, Some(ctx.object_id()));
        assert_eq!(ctx.class(b).parent, Some(ctx.object_id()));
        // Must terminate -- this is exactly the walk that would loop
        // forever if the cycle survived into `Context`.
        assert_eq!(ctx.ancestors(a), vec![a, ctx.object_id()]);
    }

    #[test]
    fn no_cycle_among_independent_classes() {
        let (_, _, diags) = build(vec![("A", None), ("B", None)]);
        assert!(diags.is_empty());
    }
}
