//! The match-lowering coordinator: §4.4's seven-step protocol.

use taylor_ast::Span;
use taylor_infer::{TypedExpr, TypedMatchCase};
use taylor_types::Type;

use crate::emitter::{MethodEmitter, StackShape};
use crate::error::CodegenError;
use crate::exhaustiveness::check_match_exhaustive;
use crate::expr::{lower_expr, LowerCtx};
use crate::lower::pattern::{lower_pattern_test, PatternContext};
use crate::lower::variable;
use crate::slot::SlotMap;

pub fn lower_match(
    emitter: &mut MethodEmitter,
    slots: &mut SlotMap,
    ctx: &LowerCtx,
    target: &TypedExpr,
    cases: &[TypedMatchCase],
    match_span: Span,
    result_ty: &Type,
) -> Result<Type, CodegenError> {
    if let Some(non_exhaustive) = check_match_exhaustive(&target.ty, cases, match_span, ctx.registry) {
        return Err(CodegenError::NonExhaustiveMatch {
            missing_variants: non_exhaustive.missing_variants,
            location: non_exhaustive.location,
        });
    }

    // Step 1-2: emit the target, store into a dedicated slot.
    let target_ty = lower_expr(emitter, slots, ctx, target)?;
    let target_slot = slots.allocate_anonymous(&target_ty);
    variable::store_into(emitter, target_slot, &target_ty)?;

    // Step 3: result slot.
    let result_slot = slots.allocate_anonymous(result_ty);

    // Step 4: pre-allocate success_i/next_i labels. next[n-1] is the final
    // failure label, visited only after every case's test has emitted
    // (step 5c) -- never placed early.
    let success_labels: Vec<_> = cases.iter().map(|_| emitter.fresh_label()).collect();
    let next_labels: Vec<_> = cases.iter().map(|_| emitter.fresh_label()).collect();
    let end_label = emitter.fresh_label();

    // Step 5: each case's test, in order. Every test branches to its own
    // success label or falls to the next case's label; only the last
    // case's `next` is the genuine failure path, and its mark_label call
    // is deferred until after this loop completes.
    for (i, case) in cases.iter().enumerate() {
        let on_failure = next_labels[i];
        let mut ctx_pattern = PatternContext {
            registry: ctx.registry,
            lower_expr: &mut |e, s, expr| lower_expr(e, s, ctx, expr),
        };
        lower_pattern_test(
            emitter,
            slots,
            &mut ctx_pattern,
            &case.pattern,
            target_slot,
            &target_ty,
            success_labels[i],
            on_failure,
        )?;
        if i + 1 < cases.len() {
            emitter.mark_label(on_failure);
        }
    }
    // The final `next` is the match's overall failure path. Reaching it
    // means every case's test failed despite exhaustiveness validation --
    // an internal compiler error, not a user-visible `NonExhaustiveMatch`
    // (that was already rejected above before any bytecode was emitted).
    if let Some(&final_failure) = next_labels.last() {
        emitter.mark_label(final_failure);
        emitter.emit(crate::instr::Instruction::New("java/lang/AssertionError".to_string()));
        emitter.push_shape(StackShape::One);
        emitter.emit(crate::instr::Instruction::Dup);
        emitter.push_shape(StackShape::One);
        emitter.emit(crate::instr::Instruction::Invokespecial {
            owner: "java/lang/AssertionError".to_string(),
            name: "<init>".to_string(),
            descriptor: "()V".to_string(),
        });
        emitter.pop_shape()?;
        emitter.emit(crate::instr::Instruction::Athrow);
        emitter.pop_shape()?;
    }

    // Step 6: each success label, pattern bindings already stored, emit
    // the body, store into resultSlot, GOTO end.
    for (i, case) in cases.iter().enumerate() {
        emitter.mark_label(success_labels[i]);
        let body_ty = lower_expr(emitter, slots, ctx, &case.body)?;
        variable::store_into(emitter, result_slot, &body_ty)?;
        emitter.emit(crate::instr::Instruction::Goto(end_label));
    }

    // Step 7: load resultSlot as the expression's value.
    emitter.mark_label(end_label);
    variable::load_into(emitter, result_slot, result_ty);

    Ok(result_ty.clone())
}
