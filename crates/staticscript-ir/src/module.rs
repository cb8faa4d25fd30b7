use crate::function::{Function, FunctionSignature, Linkage};
use crate::types::Type;
use crate::values::{Constant, DataId, GlobalId};
use crate::{IrError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The compilation unit: functions (definitions and declarations), globals and constant data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub functions: IndexMap<String, Function>,
    pub globals: IndexMap<GlobalId, GlobalVariable>,
    pub data: IndexMap<DataId, DataObject>,
    next_global_id: u32,
    next_data_id: u32,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: IndexMap::new(),
            globals: IndexMap::new(),
            data: IndexMap::new(),
            next_global_id: 0,
            next_data_id: 0,
        }
    }

    /// Add a function without a body. Fails if the name is taken.
    pub fn declare_function(
        &mut self,
        signature: FunctionSignature,
        linkage: Linkage,
    ) -> Result<&mut Function> {
        let name = signature.name.clone();
        if self.functions.contains_key(&name) {
            return Err(IrError::Builder(format!(
                "Function {} already exists",
                name
            )));
        }
        self.functions
            .insert(name.clone(), Function::new(signature, linkage));
        self.functions
            .get_mut(&name)
            .ok_or_else(|| IrError::Builder(format!("Function {} not found", name)))
    }

    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn get_function_mut(&mut self, name: &str) -> Option<&mut Function> {
        self.functions.get_mut(name)
    }

    pub fn add_global(
        &mut self,
        name: impl Into<String>,
        ty: Type,
        initializer: Constant,
        align: u32,
    ) -> GlobalId {
        let id = GlobalId(self.next_global_id);
        self.next_global_id += 1;
        self.globals.insert(
            id,
            GlobalVariable {
                id,
                name: name.into(),
                ty,
                initializer,
                align,
                linkage: Linkage::External,
            },
        );
        id
    }

    pub fn get_global(&self, id: GlobalId) -> Option<&GlobalVariable> {
        self.globals.get(&id)
    }

    pub fn global_by_name(&self, name: &str) -> Option<&GlobalVariable> {
        self.globals.values().find(|g| g.name == name)
    }

    /// Intern a NUL-terminated copy of `text` as constant data.
    pub fn add_string_data(&mut self, text: &str) -> DataId {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        self.add_data(bytes)
    }

    pub fn add_data(&mut self, bytes: Vec<u8>) -> DataId {
        let id = DataId(self.next_data_id);
        self.next_data_id += 1;
        self.data.insert(id, DataObject { id, bytes });
        id
    }

    pub fn defined_functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values().filter(|f| !f.is_declaration())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalVariable {
    pub id: GlobalId,
    pub name: String,
    pub ty: Type,
    pub initializer: Constant,
    pub align: u32,
    pub linkage: Linkage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataObject {
    pub id: DataId,
    pub bytes: Vec<u8>,
}
