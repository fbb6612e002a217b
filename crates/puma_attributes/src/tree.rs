//! Per-shape branch container used for host-facing data.
//!
//! Branch `i` holds the values of initial shape `i`: a single item for scalar
//! attributes, the whole array for array attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct DataTree<T> {
    branches: Vec<Vec<T>>,
}

impl<T> DataTree<T> {
    pub fn new() -> Self {
        Self {
            branches: Vec::new(),
        }
    }

    pub fn from_branches(branches: Vec<Vec<T>>) -> Self {
        Self { branches }
    }

    /// One branch per value.
    pub fn from_values(values: Vec<T>) -> Self {
        Self {
            branches: values.into_iter().map(|v| vec![v]).collect(),
        }
    }

    pub fn push_branch(&mut self, branch: Vec<T>) {
        self.branches.push(branch);
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    pub fn branch(&self, index: usize) -> Option<&[T]> {
        self.branches.get(index).map(Vec::as_slice)
    }

    pub fn branches(&self) -> &[Vec<T>] {
        &self.branches
    }

    /// Total number of items over all branches.
    pub fn item_count(&self) -> usize {
        self.branches.iter().map(Vec::len).sum()
    }

    /// `true` when the tree holds no items, even if it has empty branches.
    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    /// Items of all branches in order.
    pub fn items(&self) -> impl Iterator<Item = &T> + '_ {
        self.branches.iter().flatten()
    }

    pub fn first_item(&self) -> Option<&T> {
        self.items().next()
    }

    pub fn into_items(self) -> Vec<T> {
        self.branches.into_iter().flatten().collect()
    }
}

impl<T> Default for DataTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<Vec<T>> for DataTree<T> {
    fn from_iter<I: IntoIterator<Item = Vec<T>>>(iter: I) -> Self {
        Self::from_branches(iter.into_iter().collect())
    }
}
