use crate::block::BlockId;
use crate::function::Function;
use std::collections::{HashMap, HashSet, VecDeque};

/// Edges between the laid-out blocks of one function. Detached blocks are not part of the graph.
#[derive(Debug, Clone)]
pub struct ControlFlowGraph {
    pub blocks: Vec<BlockId>,
    pub edges: HashMap<BlockId, Vec<BlockId>>,
    pub reverse_edges: HashMap<BlockId, Vec<BlockId>>,
    pub entry: Option<BlockId>,
}

impl ControlFlowGraph {
    pub fn from_function(function: &Function) -> Self {
        let mut edges = HashMap::new();
        let mut reverse_edges: HashMap<BlockId, Vec<BlockId>> = HashMap::new();

        for block in function.body.laid_out_blocks() {
            let successors = block.successors();
            for &succ in &successors {
                reverse_edges.entry(succ).or_default().push(block.id);
            }
            edges.insert(block.id, successors);
        }

        Self {
            blocks: function.body.layout.clone(),
            edges,
            reverse_edges,
            entry: function.entry_block(),
        }
    }

    pub fn predecessors(&self, block: BlockId) -> &[BlockId] {
        self.reverse_edges
            .get(&block)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn successors(&self, block: BlockId) -> &[BlockId] {
        self.edges.get(&block).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn contains(&self, block: BlockId) -> bool {
        self.edges.contains_key(&block)
    }

    pub fn reachable_blocks(&self) -> HashSet<BlockId> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        if let Some(entry) = self.entry {
            queue.push_back(entry);
        }

        while let Some(current) = queue.pop_front() {
            if visited.insert(current) {
                for &succ in self.successors(current) {
                    queue.push_back(succ);
                }
            }
        }

        visited
    }

    /// Laid-out blocks other than the entry that nothing branches to.
    pub fn orphans(&self) -> Vec<BlockId> {
        self.blocks
            .iter()
            .copied()
            .filter(|b| Some(*b) != self.entry && self.predecessors(*b).is_empty())
            .collect()
    }
}
