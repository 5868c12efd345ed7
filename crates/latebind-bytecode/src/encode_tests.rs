use crate::test_utils::{ty, universe, widget_method};
use crate::{Instruction, InstructionSink, MethodBody, Opcode, Operand, Token, TokenTable};

fn emit_all(body: &mut MethodBody, instructions: impl IntoIterator<Item = Instruction>) {
    for instr in instructions {
        body.emit(instr).unwrap();
    }
}

#[test]
fn tiny_header() {
    let mut body = MethodBody::builder("m").returns(true).build();
    emit_all(
        &mut body,
        [Instruction::simple(Opcode::Ldnull), Instruction::simple(Opcode::Ret)],
    );

    let bytes = body.finish().unwrap().encode(&mut TokenTable::new());

    assert_eq!(bytes, [0x0A, 0x14, 0x2A]);
}

#[test]
fn forward_branch_offset() {
    let mut body = MethodBody::builder("m").args(1).build();
    let skip = body.define_label();
    emit_all(
        &mut body,
        [
            Instruction::new(Opcode::Ldarg0, Operand::Arg(0)),
            Instruction::new(Opcode::Brtrue, Operand::Label(skip)),
            Instruction::simple(Opcode::Ldnull),
            Instruction::simple(Opcode::Pop),
        ],
    );
    body.mark_label(skip).unwrap();
    emit_all(&mut body, [Instruction::simple(Opcode::Ret)]);

    let bytes = body.finish().unwrap().encode(&mut TokenTable::new());

    assert_eq!(
        bytes,
        [0x26, 0x02, 0x3A, 0x02, 0x00, 0x00, 0x00, 0x14, 0x26, 0x2A]
    );
}

#[test]
fn operand_tokens() {
    let u = universe();
    let mut body = MethodBody::builder("m").build();
    emit_all(
        &mut body,
        [
            Instruction::new(Opcode::Ldstr, Operand::Str("Hi".into())),
            Instruction::new(Opcode::Call, Operand::Method(widget_method(&u, "Log"))),
            Instruction::new(Opcode::Ldtoken, Operand::Type(ty(&u, "System.Object"))),
            Instruction::simple(Opcode::Pop),
            Instruction::new(Opcode::Ldtoken, Operand::Type(ty(&u, "System.Object[]"))),
            Instruction::simple(Opcode::Pop),
            Instruction::simple(Opcode::Ret),
        ],
    );
    let mut tokens = TokenTable::new();

    let bytes = body.finish().unwrap().encode(&mut tokens);

    #[rustfmt::skip]
    let expected = [
        0x5E,
        0x72, 0x01, 0x00, 0x00, 0x70,
        0x28, 0x01, 0x00, 0x00, 0x0A,
        0xD0, 0x01, 0x00, 0x00, 0x01,
        0x26,
        0xD0, 0x01, 0x00, 0x00, 0x1B,
        0x26,
        0x2A,
    ];
    assert_eq!(bytes, expected);
    assert_eq!(tokens.strings().get("Hi").map(|t| t.token()), Some(0x7000_0001));
    assert_eq!(tokens.type_specs().count(), 1);
}

#[test]
fn fat_header_with_locals() {
    let u = universe();
    let mut body = MethodBody::builder("m").build();
    let tmp = body.declare_local(ty(&u, "System.Object")).unwrap();
    emit_all(
        &mut body,
        [
            Instruction::simple(Opcode::Ldnull),
            Instruction::new(Opcode::Stloc0, Operand::Local(tmp)),
            Instruction::simple(Opcode::Ret),
        ],
    );

    let bytes = body.finish().unwrap().encode(&mut TokenTable::new());

    #[rustfmt::skip]
    let expected = [
        0x13, 0x30,
        0x01, 0x00,
        0x03, 0x00, 0x00, 0x00,
        0x01, 0x00, 0x00, 0x11,
        0x14, 0x0A, 0x2A,
    ];
    assert_eq!(bytes, expected);
}

#[test]
fn two_byte_and_wide_constants() {
    let mut body = MethodBody::builder("m").args(5).build();
    emit_all(
        &mut body,
        [
            Instruction::new(Opcode::Ldarg, Operand::Arg(4)),
            Instruction::new(Opcode::LdcI4S, Operand::Int(-2)),
            Instruction::new(Opcode::LdcI4, Operand::Int(1000)),
            Instruction::simple(Opcode::Pop),
            Instruction::simple(Opcode::Pop),
            Instruction::simple(Opcode::Pop),
            Instruction::simple(Opcode::Ret),
        ],
    );

    let bytes = body.finish().unwrap().encode(&mut TokenTable::new());

    #[rustfmt::skip]
    let expected = [
        0x3E,
        0xFE, 0x09, 0x04, 0x00,
        0x1F, 0xFE,
        0x20, 0xE8, 0x03, 0x00, 0x00,
        0x26, 0x26, 0x26,
        0x2A,
    ];
    assert_eq!(bytes, expected);
}

#[test]
fn tokens_are_shared_across_bodies() {
    let u = universe();
    let log = widget_method(&u, "Log");
    let mut tokens = TokenTable::new();

    let first = tokens.method_token(&log);
    let again = tokens.method_token(&log);
    let name = tokens.type_token(&ty(&u, "System.String"));

    assert_eq!(first, again);
    assert_eq!(first.table(), Token::MEMBER_REF);
    assert_eq!(first.row(), 1);
    assert_eq!(name.to_string(), "0x01000001");
    assert_eq!(tokens.member_count(), 1);
}
