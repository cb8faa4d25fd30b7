use crate::block::BlockId;

/// Where the next instruction goes: a function and, optionally, its open block.
///
/// A position with a function but no block is valid; the next instruction parks the cursor in a
/// fresh detached block of that function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Position {
    pub function: Option<String>,
    pub block: Option<BlockId>,
}

impl Position {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn at_end(function: impl Into<String>, block: BlockId) -> Self {
        Self {
            function: Some(function.into()),
            block: Some(block),
        }
    }

    pub fn in_function(function: impl Into<String>) -> Self {
        Self {
            function: Some(function.into()),
            block: None,
        }
    }

    pub fn is_none(&self) -> bool {
        self.function.is_none()
    }
}
