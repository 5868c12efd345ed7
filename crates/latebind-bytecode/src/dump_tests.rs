use crate::test_utils::{ty, universe, widget_field, widget_method};
use crate::{Colors, Instruction, InstructionSink, MethodBody, Opcode, Operand};

fn getter_body() -> MethodBody {
    let u = universe();
    let mut body = MethodBody::builder("get_Name").args(1).returns(true).build();
    let tmp = body.declare_local(ty(&u, "System.Object[]")).unwrap();
    let skip = body.define_label();

    for instr in [
        Instruction::new(Opcode::LdcI4_5, Operand::Int(5)),
        Instruction::new(Opcode::Newarr, Operand::Type(ty(&u, "System.Object"))),
        Instruction::new(Opcode::Stloc0, Operand::Local(tmp)),
        Instruction::new(Opcode::Ldsfld, Operand::Field(widget_field(&u, "Cache"))),
        Instruction::new(Opcode::Brtrue, Operand::Label(skip)),
        Instruction::new(Opcode::Ldstr, Operand::Str("Name".into())),
        Instruction::new(Opcode::Call, Operand::Method(widget_method(&u, "Log"))),
    ] {
        body.emit(instr).unwrap();
    }
    body.mark_label(skip).unwrap();
    for instr in [
        Instruction::new(Opcode::Ldarg0, Operand::Arg(0)),
        Instruction::new(Opcode::Ldfld, Operand::Field(widget_field(&u, "Name"))),
        Instruction::simple(Opcode::Ret),
    ] {
        body.emit(instr).unwrap();
    }
    body
}

#[test]
fn finished_body() {
    let u = universe();
    let body = getter_body().finish().unwrap();

    insta::assert_snapshot!(body.dump(&u, Colors::OFF), @r#"
    .method get_Name
    .maxstack 1
    .locals
      [0] Object[]
      00  ldc.i4.5
      01  newarr Object
      02  stloc.0
      03  ldsfld Widget::Cache
      04  brtrue L0
      05  ldstr "Name"
      06  call Widget::Log
    L0:
      07  ldarg.0
      08  ldfld Widget::Name
      09  ret
    "#);
}

#[test]
fn general_forms_and_trailing_label() {
    let u = universe();
    let mut body = MethodBody::builder("wide").args(5).build();
    body.emit(Instruction::new(Opcode::Ldarg, Operand::Arg(4))).unwrap();
    body.emit(Instruction::new(Opcode::LdcI4S, Operand::Int(100))).unwrap();
    body.emit(Instruction::new(Opcode::LdcI4, Operand::Int(1000))).unwrap();
    let end = body.define_label();
    body.mark_label(end).unwrap();

    insta::assert_snapshot!(body.dump(&u, Colors::OFF), @r"
    .method wide
    .maxstack 3
      00  ldarg 4
      01  ldc.i4.s 100
      02  ldc.i4 1000
    L0:
    ");
}

#[test]
fn colored_literals() {
    let u = universe();
    let body = getter_body();

    let out = body.dump(&u, Colors::ON);

    assert!(out.contains("\x1b[32m\"Name\"\x1b[0m"));
    assert!(out.contains("\x1b[34mL0:\x1b[0m"));
    assert!(Colors::new(true).is_enabled());
    assert!(!Colors::default().is_enabled());
}
