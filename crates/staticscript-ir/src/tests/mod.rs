/*! Unit tests for the IR core: build cursor, CFG analysis, verifier and pass manager. */

mod cfg_tests;

use crate::{FunctionSignature, IrBuilder, Linkage, Module, Parameter, Type};

/// A builder positioned in a fresh function with a laid-out `entry` block.
pub(crate) fn builder_with_function(
    name: &str,
    params: Vec<Parameter>,
    returns: Type,
) -> IrBuilder {
    let mut module = Module::new("test");
    module
        .declare_function(FunctionSignature::new(name, params, returns), Linkage::External)
        .unwrap();
    let mut builder = IrBuilder::new(module);
    builder.set_position(crate::Position::in_function(name));
    let entry = builder.create_block("entry").unwrap();
    builder.append_block(entry).unwrap();
    builder.position_at_end(name, entry);
    builder
}
