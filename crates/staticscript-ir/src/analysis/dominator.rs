use super::ControlFlowGraph;
use crate::block::BlockId;
use std::collections::{HashMap, HashSet};

/// Iterative dataflow dominators over the reachable part of a CFG.
#[derive(Debug, Clone)]
pub struct DominatorTree {
    dominators: HashMap<BlockId, HashSet<BlockId>>,
}

impl DominatorTree {
    pub fn from_cfg(cfg: &ControlFlowGraph) -> Self {
        let mut dominators = HashMap::new();
        let Some(entry) = cfg.entry else {
            return Self { dominators };
        };

        let reachable = cfg.reachable_blocks();
        // Layout order keeps the iteration deterministic.
        let order: Vec<BlockId> = cfg
            .blocks
            .iter()
            .copied()
            .filter(|b| reachable.contains(b))
            .collect();

        dominators.insert(entry, HashSet::from([entry]));
        for &block in &order {
            if block != entry {
                dominators.insert(block, reachable.clone());
            }
        }

        let mut changed = true;
        while changed {
            changed = false;

            for &block in &order {
                if block == entry {
                    continue;
                }

                let mut new_doms = HashSet::from([block]);
                let mut preds = cfg
                    .predecessors(block)
                    .iter()
                    .filter(|p| reachable.contains(*p));

                if let Some(first) = preds.next() {
                    let mut intersection = dominators.get(first).cloned().unwrap_or_default();
                    for pred in preds {
                        if let Some(pred_doms) = dominators.get(pred) {
                            intersection = intersection.intersection(pred_doms).copied().collect();
                        }
                    }
                    new_doms.extend(intersection);
                }

                if dominators.get(&block) != Some(&new_doms) {
                    dominators.insert(block, new_doms);
                    changed = true;
                }
            }
        }

        Self { dominators }
    }

    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        self.dominators
            .get(&b)
            .map(|doms| doms.contains(&a))
            .unwrap_or(false)
    }
}
