//! Item containers for sectioned views.
//!
//! Each section of a [`SectionedView`](super::SectionedView) shows its items
//! in one container. Two layouts are supported: a vertical list of rows and
//! a wrapping flow of children. Both expose the same positional operations
//! through [`ItemContainer`], and [`SectionContainer`] selects between them.

use crate::error::{Result, ViewError};

/// The container layout used for a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerKind {
    /// One item per row.
    #[default]
    List,
    /// Items wrap into lines of a fixed number of children.
    Flow,
}

/// Positional operations shared by every container layout.
pub trait ItemContainer<W> {
    /// Insert `widget` at `index`, shifting later widgets back.
    fn insert(&mut self, index: usize, widget: W) -> Result<()>;

    /// Remove and return the widget at `index`.
    fn remove_at(&mut self, index: usize) -> Result<W>;

    /// The widget at `index`.
    fn get(&self, index: usize) -> Option<&W>;

    /// Number of widgets in the container.
    fn len(&self) -> usize;

    /// Whether the container holds no widgets.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn insert_checked<W>(widgets: &mut Vec<W>, index: usize, widget: W) -> Result<()> {
    if index > widgets.len() {
        return Err(ViewError::out_of_bounds(index, widgets.len()));
    }
    widgets.insert(index, widget);
    Ok(())
}

fn remove_checked<W>(widgets: &mut Vec<W>, index: usize) -> Result<W> {
    if index >= widgets.len() {
        return Err(ViewError::out_of_bounds(index, widgets.len()));
    }
    Ok(widgets.remove(index))
}

/// A vertical list of rows.
#[derive(Debug, Clone)]
pub struct ListContainer<W> {
    rows: Vec<W>,
}

impl<W> ListContainer<W> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// The row at `index`.
    pub fn row_at(&self, index: usize) -> Option<&W> {
        self.rows.get(index)
    }

    /// Iterate over the rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &W> {
        self.rows.iter()
    }
}

impl<W> Default for ListContainer<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> ItemContainer<W> for ListContainer<W> {
    fn insert(&mut self, index: usize, widget: W) -> Result<()> {
        insert_checked(&mut self.rows, index, widget)
    }

    fn remove_at(&mut self, index: usize) -> Result<W> {
        remove_checked(&mut self.rows, index)
    }

    fn get(&self, index: usize) -> Option<&W> {
        self.rows.get(index)
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Children laid out left to right, wrapping after a fixed count.
#[derive(Debug, Clone)]
pub struct FlowContainer<W> {
    children: Vec<W>,
    children_per_line: usize,
}

impl<W> FlowContainer<W> {
    /// Default number of children per line.
    pub const DEFAULT_CHILDREN_PER_LINE: usize = 4;

    /// Create an empty flow with the default line length.
    pub fn new() -> Self {
        Self::with_children_per_line(Self::DEFAULT_CHILDREN_PER_LINE)
    }

    /// Create an empty flow that wraps after `count` children.
    pub fn with_children_per_line(count: usize) -> Self {
        Self {
            children: Vec::new(),
            children_per_line: count.max(1),
        }
    }

    /// Number of children per line.
    pub fn children_per_line(&self) -> usize {
        self.children_per_line
    }

    /// The `(line, column)` cell of the child at `index`.
    pub fn cell_of(&self, index: usize) -> Option<(usize, usize)> {
        (index < self.children.len())
            .then(|| (index / self.children_per_line, index % self.children_per_line))
    }

    /// Number of lines the children occupy.
    pub fn line_count(&self) -> usize {
        self.children.len().div_ceil(self.children_per_line)
    }

    /// The child at the given cell.
    pub fn child_at(&self, line: usize, column: usize) -> Option<&W> {
        if column >= self.children_per_line {
            return None;
        }
        self.children.get(line * self.children_per_line + column)
    }
}

impl<W> Default for FlowContainer<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> ItemContainer<W> for FlowContainer<W> {
    fn insert(&mut self, index: usize, widget: W) -> Result<()> {
        insert_checked(&mut self.children, index, widget)
    }

    fn remove_at(&mut self, index: usize) -> Result<W> {
        remove_checked(&mut self.children, index)
    }

    fn get(&self, index: usize) -> Option<&W> {
        self.children.get(index)
    }

    fn len(&self) -> usize {
        self.children.len()
    }
}

/// The container of one section, in either layout.
#[derive(Debug, Clone)]
pub enum SectionContainer<W> {
    /// A list of rows.
    List(ListContainer<W>),
    /// A wrapping flow of children.
    Flow(FlowContainer<W>),
}

impl<W> SectionContainer<W> {
    /// Create an empty container of the given kind.
    pub fn new(kind: ContainerKind) -> Self {
        match kind {
            ContainerKind::List => Self::List(ListContainer::new()),
            ContainerKind::Flow => Self::Flow(FlowContainer::new()),
        }
    }

    /// The layout of this container.
    pub fn kind(&self) -> ContainerKind {
        match self {
            Self::List(_) => ContainerKind::List,
            Self::Flow(_) => ContainerKind::Flow,
        }
    }

    fn inner(&self) -> &dyn ItemContainer<W> {
        match self {
            Self::List(list) => list,
            Self::Flow(flow) => flow,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ItemContainer<W> {
        match self {
            Self::List(list) => list,
            Self::Flow(flow) => flow,
        }
    }
}

impl<W> ItemContainer<W> for SectionContainer<W> {
    fn insert(&mut self, index: usize, widget: W) -> Result<()> {
        self.inner_mut().insert(index, widget)
    }

    fn remove_at(&mut self, index: usize) -> Result<W> {
        self.inner_mut().remove_at(index)
    }

    fn get(&self, index: usize) -> Option<&W> {
        self.inner().get(index)
    }

    fn len(&self) -> usize {
        self.inner().len()
    }
}
