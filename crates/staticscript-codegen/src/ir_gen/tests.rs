use super::*;
use crate::ast::{AstBuilder, BinaryOp, BuiltinType, ForInit, UnaryOp};
use crate::builtins::{STRING_CONCAT, STRING_CREATE, STRING_EQUALS};
use pretty_assertions::assert_eq;
use staticscript_ir::{Constant, Instruction, IntCC, Pass, Terminator};

fn instructions<'m>(module: &'m Module, function: &str) -> Vec<&'m Instruction> {
    module
        .get_function(function)
        .unwrap()
        .body
        .laid_out_blocks()
        .flat_map(|b| b.instructions.iter())
        .collect()
}

fn labels(module: &Module, function: &str) -> Vec<String> {
    module
        .get_function(function)
        .unwrap()
        .body
        .laid_out_blocks()
        .map(|b| b.label.clone())
        .collect()
}

fn callees<'m>(module: &'m Module, function: &str) -> Vec<&'m str> {
    instructions(module, function)
        .into_iter()
        .filter_map(Instruction::callee)
        .collect()
}

#[test]
fn test_empty_module_returns_zero() {
    let ast = AstBuilder::new("empty.ss").finish();
    let module = generate_ir(&ast).unwrap();

    let main = module.get_function("main").unwrap();
    assert_eq!(main.signature.returns, Type::i64());
    assert_eq!(labels(&module, "main"), vec!["entry"]);
    assert_eq!(
        main.body.laid_out_blocks().next().unwrap().terminator,
        Terminator::Return(Some(Value::i64(0)))
    );
}

#[test]
fn test_boolean_global_literal_is_baked() {
    let mut ast = AstBuilder::new("t.ss");
    let init = ast.bool_lit(true);
    let (_, decl) = ast.global_var("flag", BuiltinType::Boolean, Some(init));
    ast.item(decl);

    let module = generate_ir(&ast.finish()).unwrap();
    let global = module.global_by_name("flag").unwrap();
    assert_eq!(global.ty, Type::Bool);
    assert_eq!(global.initializer, Constant::Bool(true));
    assert_eq!(global.align, 1);
    assert!(instructions(&module, "main").is_empty());
}

#[test]
fn test_negative_initializer_is_not_a_literal() {
    let mut ast = AstBuilder::new("t.ss");
    let five = ast.int_lit(5);
    let init = ast.unary(UnaryOp::Minus, five);
    let (_, decl) = ast.global_var("n", BuiltinType::Integer, Some(init));
    ast.item(decl);

    let module = generate_ir(&ast.finish()).unwrap();
    assert_eq!(
        module.global_by_name("n").unwrap().initializer,
        Constant::Int { value: 0, bits: 64 }
    );
    let insts = instructions(&module, "main");
    assert!(matches!(insts[0], Instruction::CheckedNeg { .. }));
    assert!(insts[1].is_store());
}

#[test]
fn test_string_global_stores_constructed_handle() {
    let mut ast = AstBuilder::new("t.ss");
    let init = ast.str_lit("hi");
    let (_, decl) = ast.global_var("greeting", BuiltinType::String, Some(init));
    ast.item(decl);

    let module = generate_ir(&ast.finish()).unwrap();
    let global = module.global_by_name("greeting").unwrap();
    assert_eq!(global.initializer, Constant::Null);
    assert_eq!(global.align, 8);

    let data: Vec<_> = module.data.values().map(|d| d.bytes.clone()).collect();
    assert_eq!(data, vec![b"hi\0".to_vec()]);

    let insts = instructions(&module, "main");
    assert_eq!(insts.len(), 2);
    assert_eq!(insts[0].callee(), Some(STRING_CREATE));
    assert_eq!(insts[1].store_target(), Some(&Value::Global(global.id)));
}

#[test]
fn test_string_global_without_initializer_has_no_store() {
    let mut ast = AstBuilder::new("t.ss");
    let (_, decl) = ast.global_var("s", BuiltinType::String, None);
    ast.item(decl);

    let module = generate_ir(&ast.finish()).unwrap();
    assert_eq!(module.global_by_name("s").unwrap().initializer, Constant::Null);
    assert!(instructions(&module, "main").is_empty());
}

#[test]
fn test_local_slots_use_declared_alignment() {
    let mut ast = AstBuilder::new("t.ss");
    let f = ast.declare_function("f", &[("n", BuiltinType::Integer)], None);
    let init = ast.bool_lit(false);
    let (_, local) = ast.local_var("done", BuiltinType::Boolean, Some(init));
    let decl = ast.define_function(f, vec![local]);
    ast.item(decl);

    let module = generate_ir(&ast.finish()).unwrap();
    let allocas: Vec<_> = instructions(&module, "f")
        .into_iter()
        .filter_map(|inst| match inst {
            Instruction::Alloca { ty, align, .. } => Some((ty.clone(), *align)),
            _ => None,
        })
        .collect();
    assert_eq!(allocas, vec![(Type::i64(), 8), (Type::Bool, 1)]);
}

#[test]
fn test_parameters_are_copied_into_slots() {
    let mut ast = AstBuilder::new("t.ss");
    let f = ast.declare_function("id", &[("x", BuiltinType::Integer)], Some(BuiltinType::Integer));
    let x = f.params[0];
    let read = ast.ident(x);
    let ret = ast.return_stmt(Some(read));
    let decl = ast.define_function(f, vec![ret]);
    ast.item(decl);

    let module = generate_ir(&ast.finish()).unwrap();
    let insts = instructions(&module, "id");
    assert!(matches!(insts[0], Instruction::Alloca { .. }));
    assert!(matches!(
        insts[1],
        Instruction::Store { value: Value::Param(p), .. } if p.0 == 0
    ));
    assert!(matches!(insts[2], Instruction::Load { .. }));
}

#[test]
fn test_chained_assignment_stores_rhs_value() {
    let mut ast = AstBuilder::new("t.ss");
    let f = ast.declare_function("f", &[], None);
    let (a, decl_a) = ast.local_var("a", BuiltinType::Integer, None);
    let (b, decl_b) = ast.local_var("b", BuiltinType::Integer, None);
    let three = ast.int_lit(3);
    let inner = ast.assign(b, three);
    let outer = ast.assign(a, inner);
    let stmt = ast.expr_stmt(outer);
    let decl = ast.define_function(f, vec![decl_a, decl_b, stmt]);
    ast.item(decl);

    let module = generate_ir(&ast.finish()).unwrap();
    let insts = instructions(&module, "f");
    assert_eq!(insts.len(), 4);
    assert!(insts.iter().all(|i| !matches!(i, Instruction::Load { .. })));
    let stored: Vec<_> = insts
        .iter()
        .filter_map(|inst| match inst {
            Instruction::Store { value, .. } => Some(value.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(stored, vec![Value::i64(3), Value::i64(3)]);
}

#[test]
fn test_string_operators_call_runtime() {
    let mut ast = AstBuilder::new("t.ss");
    let a = ast.str_lit("a");
    let b = ast.str_lit("b");
    let joined = ast.binary(BinaryOp::Plus, a, b);
    let (_, s_decl) = ast.global_var("s", BuiltinType::String, Some(joined));
    let c = ast.str_lit("c");
    let d = ast.str_lit("d");
    let differs = ast.binary(BinaryOp::NotEquals, c, d);
    let (_, e_decl) = ast.global_var("e", BuiltinType::Boolean, Some(differs));
    ast.item(s_decl);
    ast.item(e_decl);

    let module = generate_ir(&ast.finish()).unwrap();
    assert_eq!(
        callees(&module, "main"),
        vec![
            STRING_CREATE,
            STRING_CREATE,
            STRING_CONCAT,
            STRING_CREATE,
            STRING_CREATE,
            STRING_EQUALS
        ]
    );

    let compare = instructions(&module, "main")
        .into_iter()
        .find(|i| matches!(i, Instruction::Icmp { .. }))
        .unwrap();
    assert!(matches!(
        compare,
        Instruction::Icmp { cond: IntCC::NotEqual, right, .. } if *right == Value::int(0, 32)
    ));
}

#[test]
fn test_integer_arithmetic_is_checked() {
    let mut ast = AstBuilder::new("t.ss");
    let f = ast.declare_function(
        "calc",
        &[("a", BuiltinType::Integer), ("b", BuiltinType::Integer)],
        Some(BuiltinType::Integer),
    );
    let (a, b) = (f.params[0], f.params[1]);
    let mut operands = Vec::new();
    for _ in 0..4 {
        let l = ast.ident(a);
        let r = ast.ident(b);
        operands.push((l, r));
    }
    let sum = ast.binary(BinaryOp::Plus, operands[0].0, operands[0].1);
    let diff = ast.binary(BinaryOp::Minus, operands[1].0, operands[1].1);
    let prod = ast.binary(BinaryOp::Multiply, operands[2].0, operands[2].1);
    let quot = ast.binary(BinaryOp::Divide, operands[3].0, operands[3].1);
    let left = ast.binary(BinaryOp::Plus, sum, diff);
    let right = ast.binary(BinaryOp::Plus, prod, quot);
    let total = ast.binary(BinaryOp::Plus, left, right);
    let ret = ast.return_stmt(Some(total));
    let decl = ast.define_function(f, vec![ret]);
    ast.item(decl);

    let module = generate_ir(&ast.finish()).unwrap();
    let insts = instructions(&module, "calc");
    let count = |pred: fn(&Instruction) -> bool| insts.iter().filter(|i| pred(**i)).count();
    assert_eq!(count(|i| matches!(i, Instruction::CheckedAdd { .. })), 4);
    assert_eq!(count(|i| matches!(i, Instruction::CheckedSub { .. })), 1);
    assert_eq!(count(|i| matches!(i, Instruction::CheckedMul { .. })), 1);
    assert_eq!(count(|i| matches!(i, Instruction::Div { .. })), 1);
    assert!(callees(&module, "calc").is_empty());
}

#[test]
fn test_unsupported_unary_operator() {
    let mut ast = AstBuilder::new("t.ss");
    let t = ast.bool_lit(true);
    let not = ast.unary(UnaryOp::Not, t);
    let stmt = ast.expr_stmt(not);
    ast.item(stmt);

    let err = generate_ir(&ast.finish()).unwrap_err();
    assert!(matches!(err, CodegenError::UnsupportedUnaryOperator(UnaryOp::Not)));
}

#[test]
fn test_unsupported_binary_operator() {
    let mut ast = AstBuilder::new("t.ss");
    let l = ast.int_lit(5);
    let r = ast.int_lit(2);
    let rem = ast.binary(BinaryOp::Modulus, l, r);
    let stmt = ast.expr_stmt(rem);
    ast.item(stmt);

    let err = generate_ir(&ast.finish()).unwrap_err();
    assert!(matches!(
        err,
        CodegenError::UnsupportedBinaryOperator {
            op: BinaryOp::Modulus,
            ty: BuiltinType::Integer
        }
    ));
}

#[test]
fn test_code_after_return_is_dropped() {
    let mut ast = AstBuilder::new("t.ss");
    let f = ast.declare_function("f", &[], Some(BuiltinType::Integer));
    let one = ast.int_lit(1);
    let ret = ast.return_stmt(Some(one));
    let two = ast.int_lit(2);
    let (_, dead) = ast.local_var("dead", BuiltinType::Integer, Some(two));
    let decl = ast.define_function(f, vec![ret, dead]);
    ast.item(decl);

    let module = generate_ir(&ast.finish()).unwrap();
    let function = module.get_function("f").unwrap();
    assert_eq!(labels(&module, "f"), vec!["entry"]);
    assert!(instructions(&module, "f").is_empty());
    assert_eq!(function.body.blocks.len(), 1);
}

#[test]
fn test_for_without_condition_uses_cond_as_body() {
    let mut ast = AstBuilder::new("t.ss");
    let lp = ast.begin_loop();
    let brk = ast.break_stmt(lp);
    let body = ast.compound(vec![brk]);
    ast.finish_for(lp, ForInit::default(), None, Vec::new(), body);
    ast.item(lp);

    let module = generate_ir(&ast.finish()).unwrap();
    assert_eq!(labels(&module, "main"), vec!["entry", "for.cond", "for.end"]);
}

#[test]
fn test_for_update_after_diverging_body_is_dropped() {
    let mut ast = AstBuilder::new("t.ss");
    let (i, decl) = ast.global_var("i", BuiltinType::Integer, None);
    ast.item(decl);

    let zero = ast.int_lit(0);
    let init = ast.assign(i, zero);
    let read = ast.ident(i);
    let three = ast.int_lit(3);
    let cond = ast.binary(BinaryOp::LessThan, read, three);
    let read_again = ast.ident(i);
    let one = ast.int_lit(1);
    let next = ast.binary(BinaryOp::Plus, read_again, one);
    let update = ast.assign(i, next);

    let lp = ast.begin_loop();
    let brk = ast.break_stmt(lp);
    let body = ast.compound(vec![brk]);
    ast.finish_for(lp, ForInit::Exprs(vec![init]), Some(cond), vec![update], body);
    ast.item(lp);

    let module = generate_ir(&ast.finish()).unwrap();
    assert_eq!(
        labels(&module, "main"),
        vec!["entry", "for.cond", "for.body", "for.end"]
    );
}

#[test]
fn test_forward_and_recursive_calls_resolve() {
    let mut ast = AstBuilder::new("t.ss");
    let f = ast.declare_function("countdown", &[("n", BuiltinType::Integer)], None);
    let n = f.params[0];
    let arg = ast.int_lit(3);
    let call = ast.call("countdown", vec![arg]);
    let call_stmt = ast.expr_stmt(call);
    ast.item(call_stmt);

    let read = ast.ident(n);
    let zero = ast.int_lit(0);
    let positive = ast.binary(BinaryOp::GreaterThan, read, zero);
    let read_again = ast.ident(n);
    let one = ast.int_lit(1);
    let smaller = ast.binary(BinaryOp::Minus, read_again, one);
    let recurse = ast.call("countdown", vec![smaller]);
    let recurse_stmt = ast.expr_stmt(recurse);
    let then_body = ast.compound(vec![recurse_stmt]);
    let guard = ast.if_stmt(positive, then_body, None);
    let decl = ast.define_function(f, vec![guard]);
    ast.item(decl);

    let module = generate_ir(&ast.finish()).unwrap();
    assert_eq!(callees(&module, "main"), vec!["countdown"]);
    assert_eq!(callees(&module, "countdown"), vec!["countdown"]);
    assert_eq!(
        labels(&module, "countdown"),
        vec!["entry", "if.then", "if.end"]
    );
}

#[test]
fn test_cursor_returns_to_entry_after_function() {
    let mut ast = AstBuilder::new("t.ss");
    let f = ast.declare_function("seven", &[], Some(BuiltinType::Integer));
    let seven = ast.int_lit(7);
    let ret = ast.return_stmt(Some(seven));
    let decl = ast.define_function(f, vec![ret]);
    let call = ast.call("seven", vec![]);
    let (_, global) = ast.global_var("g", BuiltinType::Integer, Some(call));
    ast.item(decl);
    ast.item(global);

    let module = generate_ir(&ast.finish()).unwrap();
    assert_eq!(callees(&module, "main"), vec!["seven"]);
    assert!(instructions(&module, "seven").is_empty());
}

#[test]
fn test_duplicate_function_is_internal_error() {
    let mut ast = AstBuilder::new("t.ss");
    for _ in 0..2 {
        let f = ast.declare_function("twice", &[], None);
        let decl = ast.define_function(f, vec![]);
        ast.item(decl);
    }
    assert!(matches!(
        generate_ir(&ast.finish()),
        Err(CodegenError::Internal(_))
    ));
}

#[test]
fn test_user_function_named_like_entry_is_rejected() {
    let mut ast = AstBuilder::new("t.ss");
    let f = ast.declare_function("main", &[], None);
    let decl = ast.define_function(f, vec![]);
    ast.item(decl);
    assert!(matches!(
        generate_ir(&ast.finish()),
        Err(CodegenError::Internal(_))
    ));
}

#[test]
fn test_void_call_used_as_value_is_internal_error() {
    let mut ast = AstBuilder::new("t.ss");
    let f = ast.declare_function("nothing", &[], None);
    let decl = ast.define_function(f, vec![]);
    ast.item(decl);
    let call = ast.call("nothing", vec![]);
    let (_, global) = ast.global_var("x", BuiltinType::Integer, Some(call));
    ast.item(global);

    assert!(matches!(
        generate_ir(&ast.finish()),
        Err(CodegenError::Internal(_))
    ));
}

#[test]
fn test_missing_return_fails_verification() {
    let mut ast = AstBuilder::new("t.ss");
    let f = ast.declare_function("h", &[], Some(BuiltinType::Integer));
    let decl = ast.define_function(f, vec![]);
    ast.item(decl);
    let ast = ast.finish();

    let err = generate_ir(&ast).unwrap_err();
    assert!(matches!(
        err,
        CodegenError::VerificationFailure { ref function, .. } if function == "h"
    ));

    // Module verification still catches it when per-function checks are off.
    let config = GeneratorConfig::default().with_function_verification(false);
    let err = IrGenerator::new(config).resolve(&ast).unwrap_err();
    assert!(matches!(err, CodegenError::VerificationFailure { .. }));
}

#[test]
fn test_custom_entry_function() {
    let ast = AstBuilder::new("t.ss").finish();
    let config = GeneratorConfig::default().with_entry_function("start");
    let module = IrGenerator::new(config).resolve(&ast).unwrap();
    assert!(module.get_function("start").is_some());
    assert!(module.get_function("main").is_none());
}

struct FailingPass;

impl Pass for FailingPass {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn run_on_module(&mut self, _module: &mut Module) -> anyhow::Result<()> {
        anyhow::bail!("refusing to optimize")
    }
}

#[test]
fn test_pass_failure_is_reported() {
    let ast = AstBuilder::new("t.ss").finish();
    let mut passes = PassManager::new();
    passes.register_pass(FailingPass);

    let err = IrGenerator::default()
        .with_passes(passes)
        .resolve(&ast)
        .unwrap_err();
    assert!(matches!(err, CodegenError::Pass(_)));
    assert!(err.to_string().contains("refusing to optimize"));
}
