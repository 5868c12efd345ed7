use latebind_core::{TypeDef, TypeRef};

use crate::label::{Label, Local};
use crate::test_utils::{ty, universe, widget_field, widget_method};
use crate::{Instruction, InstructionSink, MethodBody, Opcode, Operand, SinkError};

fn simple(op: Opcode) -> Instruction {
    Instruction::simple(op)
}

#[test]
fn tracks_depth_through_calls() {
    let u = universe();
    let mut body = MethodBody::builder("describe").args(1).returns(true).build();

    body.emit(Instruction::new(Opcode::Ldarg0, Operand::Arg(0))).unwrap();
    assert_eq!(body.stack_depth(), 1);
    body.emit(Instruction::new(Opcode::Callvirt, Operand::Method(widget_method(&u, "Describe"))))
        .unwrap();
    assert_eq!(body.stack_depth(), 1);
    body.emit(simple(Opcode::Ret)).unwrap();

    assert_eq!(body.stack_depth(), 0);
    assert_eq!(body.position(), 3);
    let finished = body.finish().unwrap();
    assert_eq!(finished.max_stack(), 1);
}

#[test]
fn underflow() {
    let mut body = MethodBody::builder("m").build();

    let err = body.emit(simple(Opcode::Pop)).unwrap_err();

    assert_eq!(
        err,
        SinkError::StackUnderflow {
            mnemonic: "pop",
            needed: 1,
            depth: 0,
        }
    );
    assert_eq!(body.position(), 0);
}

#[test]
fn stelem_needs_three_values() {
    let mut body = MethodBody::builder("m").build();
    body.emit(simple(Opcode::Ldnull)).unwrap();
    body.emit(simple(Opcode::Ldnull)).unwrap();

    let err = body.emit(simple(Opcode::StelemRef)).unwrap_err();

    assert!(matches!(err, SinkError::StackUnderflow { needed: 3, depth: 2, .. }));
}

#[test]
fn compact_opcode_must_match_its_operand() {
    let mut body = MethodBody::builder("m").args(2).build();

    let err = body.emit(Instruction::new(Opcode::Ldarg1, Operand::Arg(0))).unwrap_err();

    assert_eq!(
        err,
        SinkError::OperandMismatch {
            mnemonic: "ldarg.1",
            expected: "its implied",
        }
    );
}

#[test]
fn operand_kind_is_checked() {
    let mut body = MethodBody::builder("m").build();

    let err = body.emit(Instruction::new(Opcode::Ldstr, Operand::Int(1))).unwrap_err();

    assert_eq!(err.to_string(), "`ldstr` expects a string operand");
}

#[test]
fn short_constant_must_fit_a_byte() {
    let mut body = MethodBody::builder("m").build();

    body.emit(Instruction::new(Opcode::LdcI4S, Operand::Int(-128))).unwrap();
    let err = body.emit(Instruction::new(Opcode::LdcI4S, Operand::Int(200))).unwrap_err();

    assert!(matches!(err, SinkError::OperandMismatch { mnemonic: "ldc.i4.s", .. }));
}

#[test]
fn unknown_argument() {
    let mut body = MethodBody::builder("m").args(2).build();

    let err = body.emit(Instruction::new(Opcode::Ldarg, Operand::Arg(4))).unwrap_err();

    assert_eq!(err, SinkError::UnknownArgument(4));
}

#[test]
fn locals_are_numbered_in_order() {
    let u = universe();
    let mut body = MethodBody::builder("m").build();

    let a = body.declare_local(ty(&u, "System.Object")).unwrap();
    let b = body.declare_local(ty(&u, "System.String[]")).unwrap();

    assert_eq!((a.index(), b.index()), (0, 1));
    assert_eq!(body.locals().len(), 2);
}

#[test]
fn foreign_and_unknown_locals() {
    let u = universe();
    let mut other = MethodBody::builder("other").build();
    let foreign = other.declare_local(ty(&u, "System.Object")).unwrap();
    let mut body = MethodBody::builder("m").build();
    body.declare_local(ty(&u, "System.Object")).unwrap();

    let err = body.emit(Instruction::new(Opcode::Ldloc0, Operand::Local(foreign))).unwrap_err();
    assert_eq!(err, SinkError::ForeignLocal(0));

    let missing = Local {
        body: body.id(),
        index: 5,
    };
    let err = body.emit(Instruction::new(Opcode::Ldloc, Operand::Local(missing))).unwrap_err();
    assert_eq!(err, SinkError::UnknownLocal(5));
}

#[test]
fn foreign_label() {
    let mut other = MethodBody::builder("other").build();
    let foreign = other.define_label();
    let mut body = MethodBody::builder("m").build();

    let err = body.emit(Instruction::new(Opcode::Br, Operand::Label(foreign))).unwrap_err();
    assert_eq!(err, SinkError::ForeignLabel(foreign));
    assert_eq!(body.mark_label(foreign).unwrap_err(), SinkError::ForeignLabel(foreign));
}

#[test]
fn label_marked_twice() {
    let mut body = MethodBody::builder("m").build();
    let label = body.define_label();

    body.mark_label(label).unwrap();
    let err = body.mark_label(label).unwrap_err();

    assert_eq!(err, SinkError::LabelAlreadyMarked(label));
}

#[test]
fn label_position_is_recorded() {
    let mut body = MethodBody::builder("m").build();
    let label = body.define_label();
    body.emit(simple(Opcode::Nop)).unwrap();
    assert_eq!(body.label_position(label), None);

    body.mark_label(label).unwrap();

    assert_eq!(body.label_position(label), Some(1));
}

#[test]
fn unresolved_label_fails_finish() {
    let mut body = MethodBody::builder("m").build();
    let label = body.define_label();
    body.emit(simple(Opcode::Ret)).unwrap();

    let err = body.finish().unwrap_err();

    assert_eq!(err, SinkError::UnresolvedLabel(label));
    assert_eq!(err.to_string(), "L0 was never marked");
}

#[test]
fn falling_off_the_end_fails_finish() {
    let mut body = MethodBody::builder("m").build();
    body.emit(simple(Opcode::Nop)).unwrap();

    assert_eq!(body.finish().unwrap_err(), SinkError::FallsThrough);
}

#[test]
fn empty_body_falls_through() {
    let body = MethodBody::builder("m").build();

    assert_eq!(body.finish().unwrap_err(), SinkError::FallsThrough);
}

#[test]
fn paths_into_a_label_must_agree() {
    let mut body = MethodBody::builder("m").build();
    let label = body.define_label();
    body.emit(simple(Opcode::Ldnull)).unwrap();
    body.emit(Instruction::new(Opcode::Brtrue, Operand::Label(label))).unwrap();
    body.emit(simple(Opcode::Ldnull)).unwrap();

    let err = body.mark_label(label).unwrap_err();

    assert_eq!(
        err,
        SinkError::StackMismatch {
            label,
            expected: 0,
            found: 1,
        }
    );
}

#[test]
fn code_after_branch_is_unreachable_until_marked() {
    let mut body = MethodBody::builder("m").returns(true).build();
    let label = body.define_label();
    body.emit(simple(Opcode::Ldnull)).unwrap();
    body.emit(Instruction::new(Opcode::Br, Operand::Label(label))).unwrap();
    assert!(!body.is_reachable());
    assert_eq!(body.stack_depth(), 0);

    body.mark_label(label).unwrap();
    assert_eq!(body.stack_depth(), 1);
    body.emit(simple(Opcode::Ret)).unwrap();

    assert!(body.finish().is_ok());
}

#[test]
fn return_requires_empty_stack() {
    let mut body = MethodBody::builder("m").build();
    body.emit(simple(Opcode::Ldnull)).unwrap();

    let err = body.emit(simple(Opcode::Ret)).unwrap_err();

    assert_eq!(err, SinkError::StackNotEmptyAtReturn(1));
}

#[test]
fn field_staticness_must_match_opcode() {
    let u = universe();
    let mut body = MethodBody::builder("m").args(1).build();
    body.emit(Instruction::new(Opcode::Ldarg0, Operand::Arg(0))).unwrap();

    let err = body
        .emit(Instruction::new(Opcode::Ldfld, Operand::Field(widget_field(&u, "Cache"))))
        .unwrap_err();
    assert_eq!(err.to_string(), "`ldfld` expects an instance field operand");

    let err = body
        .emit(Instruction::new(Opcode::Ldsfld, Operand::Field(widget_field(&u, "Name"))))
        .unwrap_err();
    assert_eq!(err.to_string(), "`ldsfld` expects a static field operand");
}

#[test]
fn callvirt_needs_instance_method() {
    let u = universe();
    let mut body = MethodBody::builder("m").build();
    body.emit(Instruction::new(Opcode::Ldstr, Operand::Str("x".into()))).unwrap();

    let err = body
        .emit(Instruction::new(Opcode::Callvirt, Operand::Method(widget_method(&u, "Log"))))
        .unwrap_err();

    assert!(matches!(err, SinkError::OperandMismatch { mnemonic: "callvirt", .. }));
}

#[test]
fn generic_context_must_match_body() {
    let mut u = universe();
    let (_, ctx) = u
        .begin_generic_type(TypeDef::class("Demo.Sites`1").with_generic_params(["T"]))
        .unwrap();
    let param = u.param(ctx, 0);

    let mut closed = MethodBody::builder("closed").build();
    let err = closed
        .emit(Instruction::new(Opcode::Ldtoken, Operand::Type(param.clone())))
        .unwrap_err();
    assert_eq!(err, SinkError::ForeignContext(ctx.as_u32()));
    assert_eq!(
        closed.declare_local(TypeRef::array_of(param.clone())).unwrap_err(),
        SinkError::ForeignContext(ctx.as_u32())
    );

    let mut open = MethodBody::builder("open").context(ctx).build();
    open.emit(Instruction::new(Opcode::Ldtoken, Operand::Type(param))).unwrap();
    assert_eq!(open.stack_depth(), 1);
}

#[test]
fn labels_carry_their_body() {
    let mut a = MethodBody::builder("a").build();
    let mut b = MethodBody::builder("b").build();

    let la: Label = a.define_label();
    let lb: Label = b.define_label();

    assert_eq!(la.index(), lb.index());
    assert_ne!(la, lb);
    assert_eq!(la.body(), a.id());
}
