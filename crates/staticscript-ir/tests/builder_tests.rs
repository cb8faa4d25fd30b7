use pretty_assertions::assert_eq;
use staticscript_ir::{
    verify_module, Constant, FunctionSignature, IntCC, IrBuilder, Linkage, Module, Parameter,
    Position, Terminator, Type, Value,
};

/// fn max(a: i64, b: i64) -> i64 { if (a > b) return a; return b; }
fn build_max() -> Module {
    let mut module = Module::new("max");
    module
        .declare_function(
            FunctionSignature::new(
                "max",
                vec![Parameter::new("a", Type::i64()), Parameter::new("b", Type::i64())],
                Type::i64(),
            ),
            Linkage::External,
        )
        .unwrap();

    let mut builder = IrBuilder::new(module);
    builder.set_position(Position::in_function("max"));
    let entry = builder.create_block("entry").unwrap();
    let then_block = builder.create_block("if.then").unwrap();
    let end = builder.create_block("if.end").unwrap();
    builder.append_block(entry).unwrap();
    builder.position_at_end("max", entry);

    let a = Value::Param(staticscript_ir::ParamId(0));
    let b = Value::Param(staticscript_ir::ParamId(1));
    let mut ins = builder.ins().unwrap();
    let cond = ins.icmp(IntCC::SignedGreaterThan, a.clone(), b.clone()).unwrap();
    ins.branch(cond, then_block, end).unwrap();

    builder.insert_block_after(then_block, entry).unwrap();
    builder.position_at_end("max", then_block);
    builder.ins().unwrap().return_value(a).unwrap();

    builder.insert_block_after(end, then_block).unwrap();
    builder.position_at_end("max", end);
    builder.ins().unwrap().return_value(b).unwrap();

    builder.finalize_function("max").unwrap();
    builder.into_module()
}

#[test]
fn test_build_and_verify_module() {
    let module = build_max();
    verify_module(&module).unwrap();

    let function = module.get_function("max").unwrap();
    let labels: Vec<_> = function
        .body
        .laid_out_blocks()
        .map(|b| b.label.as_str())
        .collect();
    assert_eq!(labels, vec!["entry", "if.then", "if.end"]);
    assert!(function
        .body
        .laid_out_blocks()
        .all(|b| matches!(b.terminator, Terminator::Return(Some(_)) | Terminator::Branch { .. })));
}

#[test]
fn test_module_serializes() {
    let mut module = build_max();
    module.add_global("counter", Type::i64(), Constant::Int { value: 5, bits: 64 }, 8);

    let json = serde_json::to_string(&module).unwrap();
    let back: Module = serde_json::from_str(&json).unwrap();

    assert_eq!(back.global_by_name("counter"), module.global_by_name("counter"));
    assert_eq!(
        back.get_function("max").unwrap().body.layout,
        module.get_function("max").unwrap().body.layout
    );
}

#[test]
fn test_string_data_is_nul_terminated() {
    let mut module = Module::new("data");
    let id = module.add_string_data("hi");
    assert_eq!(module.data[&id].bytes, b"hi\0".to_vec());
}

#[test]
fn test_duplicate_function_rejected() {
    let mut module = Module::new("dup");
    let sig = FunctionSignature::new("f", vec![], Type::Void);
    module.declare_function(sig.clone(), Linkage::External).unwrap();
    assert!(module.declare_function(sig, Linkage::Internal).is_err());
}
