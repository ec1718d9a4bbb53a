use crate::models::Edge;
use rustc_hash::{FxHashMap, FxHashSet};

/// Directed, unweighted, simple graph of pages. Nodes carry their title;
/// internal indices are assigned at insertion and stay valid for the graph's
/// whole lifetime (no compaction).
#[derive(Debug, Default)]
pub struct WikiGraph {
    titles: Vec<String>,
    title_to_index: FxHashMap<String, u32>,
    id_to_index: FxHashMap<u32, u32>,
    adjacency: Vec<Vec<u32>>,
    seen_pairs: FxHashSet<(u32, u32)>,
}

impl WikiGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node once per page id and returns its index. Registering
    /// an id again, or a second id carrying an already-known title, returns
    /// the existing index rather than creating a duplicate node.
    pub fn add_node(&mut self, page_id: u32, title: &str) -> u32 {
        if let Some(&index) = self.id_to_index.get(&page_id) {
            return index;
        }
        if let Some(&index) = self.title_to_index.get(title) {
            self.id_to_index.insert(page_id, index);
            return index;
        }
        let index = self.titles.len() as u32;
        self.titles.push(title.to_string());
        self.adjacency.push(Vec::new());
        self.title_to_index.insert(title.to_string(), index);
        self.id_to_index.insert(page_id, index);
        index
    }

    /// Inserts a directed edge between two page ids. A no-op (returns false)
    /// when either endpoint is unregistered or the ordered pair already
    /// exists -- parallel edges collapse to one.
    pub fn add_edge(&mut self, from_id: u32, to_id: u32) -> bool {
        let (Some(&from), Some(&to)) = (
            self.id_to_index.get(&from_id),
            self.id_to_index.get(&to_id),
        ) else {
            return false;
        };
        if !self.seen_pairs.insert((from, to)) {
            return false;
        }
        self.adjacency[from as usize].push(to);
        true
    }

    /// Bulk insertion; produces the same structure as one-at-a-time inserts
    /// and returns how many edges were actually added.
    pub fn add_edges_from<I>(&mut self, edges: I) -> usize
    where
        I: IntoIterator<Item = Edge>,
    {
        let iter = edges.into_iter();
        self.seen_pairs.reserve(iter.size_hint().0);
        iter.filter(|edge| self.add_edge(edge.from, edge.to)).count()
    }

    pub fn node_count(&self) -> usize {
        self.titles.len()
    }

    pub fn edge_count(&self) -> usize {
        self.seen_pairs.len()
    }

    pub fn contains_page(&self, page_id: u32) -> bool {
        self.id_to_index.contains_key(&page_id)
    }

    pub fn index_of(&self, title: &str) -> Option<u32> {
        self.title_to_index.get(title).copied()
    }

    /// Panics if `index` was not returned by `add_node`; indices are never
    /// invalidated, so callers hold only live ones.
    pub fn title_of(&self, index: u32) -> &str {
        &self.titles[index as usize]
    }

    pub fn neighbors(&self, index: u32) -> &[u32] {
        &self.adjacency[index as usize]
    }
}
