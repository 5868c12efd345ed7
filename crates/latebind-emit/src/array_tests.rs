use latebind_bytecode::{InstructionSink, MethodBody, SinkError};
use test_log::test;

use crate::test_utils::{array_lengths, body, dump, strings, ty, universe};
use crate::{EmitError, EmitExt, emit_array};

#[test]
fn slots_are_filled_in_order() {
    let u = universe();
    let mut body = body();

    let emitters = ["a", "b", "c"].map(|v| {
        move |s: &mut MethodBody| -> Result<(), EmitError> {
            s.load_string(v)?;
            Ok(())
        }
    });
    emit_array(&mut body, &ty(&u, "System.String"), emitters).unwrap();

    assert_eq!(body.stack_depth(), 1);
    assert_eq!(strings(&body), ["a", "b", "c"]);
    insta::assert_snapshot!(dump(&u, &body), @r#"
    .method stub
    .maxstack 3
    .locals
      [0] String[]
      00  ldc.i4.3
      01  newarr String
      02  stloc.0
      03  ldloc.0
      04  ldc.i4.0
      05  ldstr "a"
      06  stelem.ref
      07  ldloc.0
      08  ldc.i4.1
      09  ldstr "b"
      10  stelem.ref
      11  ldloc.0
      12  ldc.i4.2
      13  ldstr "c"
      14  stelem.ref
      15  ldloc.0
    "#);
}

#[test]
fn empty_array() {
    let u = universe();
    let mut body = body();

    let none: Vec<fn(&mut MethodBody) -> Result<(), EmitError>> = Vec::new();
    emit_array(&mut body, &ty(&u, "System.Object"), none).unwrap();

    assert_eq!(array_lengths(&body), [0]);
    assert_eq!(body.position(), 4);
    assert_eq!(body.stack_depth(), 1);
}

#[test]
fn each_array_gets_its_own_local() {
    let u = universe();
    let mut body = body();
    let object = ty(&u, "System.Object");

    let outer = [0u16, 1].map(|arg| {
        let object = object.clone();
        move |s: &mut MethodBody| -> Result<(), EmitError> {
            let inner = [arg].map(|a| {
                move |s: &mut MethodBody| -> Result<(), EmitError> {
                    s.load_argument(a)?;
                    Ok(())
                }
            });
            emit_array(s, &object, inner)
        }
    });
    emit_array(&mut body, &ty(&u, "System.Object[]"), outer).unwrap();

    assert_eq!(array_lengths(&body), [2, 1, 1]);
    assert_eq!(body.locals().len(), 3);
    assert_eq!(body.stack_depth(), 1);
}

#[cfg(debug_assertions)]
#[test]
fn emitter_leaving_two_values_is_rejected() {
    let u = universe();
    let mut body = body();

    let emitters = [|s: &mut MethodBody| -> Result<(), EmitError> {
        s.load_null()?;
        s.load_null()?;
        Ok(())
    }];
    let err = emit_array(&mut body, &ty(&u, "System.Object"), emitters).unwrap_err();

    assert_eq!(
        err,
        EmitError::StackImbalance {
            slot: 0,
            before: 2,
            after: 4,
        }
    );
}

#[test]
fn emitter_errors_propagate() {
    let u = universe();
    let mut body = body();

    let emitters = [|s: &mut MethodBody| -> Result<(), EmitError> {
        s.load_argument(9)?;
        Ok(())
    }];
    let err = emit_array(&mut body, &ty(&u, "System.Object"), emitters).unwrap_err();

    assert_eq!(err, EmitError::Sink(SinkError::UnknownArgument(9)));
    // Allocation and the slot prefix were emitted before the failure.
    assert_eq!(body.position(), 5);
}
