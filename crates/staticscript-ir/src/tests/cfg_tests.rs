use super::builder_with_function;
use crate::{ControlFlowGraph, DominatorTree, Parameter, ParamId, Type, Value};
use pretty_assertions::assert_eq;

/// entry -> (then | else) -> merge
fn diamond() -> (crate::Function, [crate::BlockId; 4]) {
    let mut builder = builder_with_function("f", vec![Parameter::new("c", Type::Bool)], Type::Void);
    let entry = builder.current_block().unwrap();
    let then_block = builder.create_block("then").unwrap();
    let else_block = builder.create_block("else").unwrap();
    let merge = builder.create_block("merge").unwrap();

    builder
        .ins()
        .unwrap()
        .branch(Value::Param(ParamId(0)), then_block, else_block)
        .unwrap();
    for block in [then_block, else_block] {
        builder.append_block(block).unwrap();
        builder.position_at_end("f", block);
        builder.ins().unwrap().jump(merge).unwrap();
    }
    builder.append_block(merge).unwrap();
    builder.position_at_end("f", merge);
    builder.ins().unwrap().return_void().unwrap();

    let function = builder.module().get_function("f").unwrap().clone();
    (function, [entry, then_block, else_block, merge])
}

#[test]
fn test_diamond_edges() {
    let (function, [entry, then_block, else_block, merge]) = diamond();
    let cfg = ControlFlowGraph::from_function(&function);

    assert_eq!(cfg.successors(entry), &[then_block, else_block]);
    assert_eq!(cfg.predecessors(merge), &[then_block, else_block]);
    assert!(cfg.orphans().is_empty());
    assert_eq!(cfg.reachable_blocks().len(), 4);
}

#[test]
fn test_diamond_dominance() {
    let (function, [entry, then_block, else_block, merge]) = diamond();
    let cfg = ControlFlowGraph::from_function(&function);
    let dom_tree = DominatorTree::from_cfg(&cfg);

    assert!(dom_tree.dominates(entry, merge));
    assert!(dom_tree.dominates(entry, then_block));
    assert!(!dom_tree.dominates(then_block, merge));
    assert!(!dom_tree.dominates(else_block, then_block));
    assert!(!dom_tree.dominates(merge, entry));
}

#[test]
fn test_loop_back_edge() {
    let mut builder = builder_with_function("f", vec![Parameter::new("c", Type::Bool)], Type::Void);
    let entry = builder.current_block().unwrap();
    let cond = builder.create_block("cond").unwrap();
    let body = builder.create_block("body").unwrap();
    let end = builder.create_block("end").unwrap();

    builder.ins().unwrap().jump(cond).unwrap();
    builder.append_block(cond).unwrap();
    builder.position_at_end("f", cond);
    builder
        .ins()
        .unwrap()
        .branch(Value::Param(ParamId(0)), body, end)
        .unwrap();
    builder.append_block(body).unwrap();
    builder.position_at_end("f", body);
    builder.ins().unwrap().jump(cond).unwrap();
    builder.append_block(end).unwrap();
    builder.position_at_end("f", end);
    builder.ins().unwrap().return_void().unwrap();

    let function = builder.module().get_function("f").unwrap();
    let cfg = ControlFlowGraph::from_function(function);
    let dom_tree = DominatorTree::from_cfg(&cfg);

    assert_eq!(cfg.predecessors(cond), &[entry, body]);
    // body -> cond closes the loop: its target dominates its source.
    assert!(dom_tree.dominates(cond, body));
    assert!(dom_tree.dominates(cond, end));
    assert!(!dom_tree.dominates(body, end));
}

#[test]
fn test_orphan_detected() {
    let mut builder = builder_with_function("f", vec![], Type::Void);
    builder.ins().unwrap().return_void().unwrap();
    let orphan = builder.create_block("orphan").unwrap();
    builder.append_block(orphan).unwrap();
    builder.position_at_end("f", orphan);
    builder.ins().unwrap().return_void().unwrap();

    let cfg = ControlFlowGraph::from_function(builder.module().get_function("f").unwrap());
    assert_eq!(cfg.orphans(), vec![orphan]);
    assert!(!cfg.reachable_blocks().contains(&orphan));
}
