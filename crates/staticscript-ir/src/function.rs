use crate::block::{BasicBlock, BlockId};
use crate::types::Type;
use crate::values::{TempId, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub signature: FunctionSignature,
    pub linkage: Linkage,
    pub body: FunctionBody,
}

impl Function {
    pub fn new(signature: FunctionSignature, linkage: Linkage) -> Self {
        Self {
            signature,
            linkage,
            body: FunctionBody::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }

    /// A function without laid-out blocks has no body.
    pub fn is_declaration(&self) -> bool {
        self.body.layout.is_empty()
    }

    pub fn entry_block(&self) -> Option<BlockId> {
        self.body.layout.first().copied()
    }

    pub fn param_count(&self) -> usize {
        self.signature.params.len()
    }

    /// Type of a value local to this function. Globals and constant data are addresses;
    /// `null` has no type of its own.
    pub fn value_type(&self, value: &Value) -> Option<Type> {
        match value {
            Value::Temp(t) => self.body.temp_type(*t).cloned(),
            Value::Param(p) => self
                .signature
                .params
                .get(p.0 as usize)
                .map(|param| param.param_type.clone()),
            Value::Global(_) | Value::Data(_) => Some(Type::Ptr),
            Value::Constant(c) => c.ty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<Parameter>,
    pub returns: Type,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>, params: Vec<Parameter>, returns: Type) -> Self {
        Self {
            name: name.into(),
            params,
            returns,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub param_type: Type,
}

impl Parameter {
    pub fn new(name: impl Into<String>, param_type: Type) -> Self {
        Self {
            name: name.into(),
            param_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Linkage {
    External,
    Internal,
}

/// Blocks live in an arena from creation on; only blocks in `layout` belong to the emitted
/// function, in that order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionBody {
    pub blocks: IndexMap<BlockId, BasicBlock>,
    pub layout: Vec<BlockId>,
    pub temps: Vec<Type>,
    next_block_id: u32,
}

impl FunctionBody {
    pub fn new() -> Self {
        Self {
            blocks: IndexMap::new(),
            layout: Vec::new(),
            temps: Vec::new(),
            next_block_id: 0,
        }
    }

    pub fn create_block(&mut self, label: impl Into<String>) -> BlockId {
        let id = BlockId(self.next_block_id);
        self.next_block_id += 1;
        self.blocks.insert(id, BasicBlock::new(id, label));
        id
    }

    pub fn new_temp(&mut self, ty: Type) -> TempId {
        let id = TempId(self.temps.len() as u32);
        self.temps.push(ty);
        id
    }

    pub fn temp_type(&self, temp: TempId) -> Option<&Type> {
        self.temps.get(temp.0 as usize)
    }

    pub fn get_block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(&id)
    }

    pub fn get_block_mut(&mut self, id: BlockId) -> Option<&mut BasicBlock> {
        self.blocks.get_mut(&id)
    }

    pub fn is_spliced(&self, id: BlockId) -> bool {
        self.layout.contains(&id)
    }

    pub fn layout_position(&self, id: BlockId) -> Option<usize> {
        self.layout.iter().position(|b| *b == id)
    }

    /// Laid-out blocks in order.
    pub fn laid_out_blocks(&self) -> impl Iterator<Item = &BasicBlock> {
        self.layout.iter().filter_map(|id| self.blocks.get(id))
    }

    /// Drop every block that never entered the layout.
    pub fn prune_detached(&mut self) -> usize {
        let before = self.blocks.len();
        let layout = &self.layout;
        self.blocks.retain(|id, _| layout.contains(id));
        before - self.blocks.len()
    }
}

impl Default for FunctionBody {
    fn default() -> Self {
        Self::new()
    }
}
