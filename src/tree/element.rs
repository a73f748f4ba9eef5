//! Declarative Elements
//!
//! An [`Element`] is one node of the declarative description handed to
//! [`SceneTree::update`](crate::tree::SceneTree::update): a component kind,
//! its props, an optional reconciliation key and its children. Elements are
//! plain values; the tree owns all mounted state.

use crate::pipeline::{
    AlgorithmProps, DataSourceProps, FieldArrayProps, ReaderProps, RepresentationProps,
    ShareDataSetProps,
};
use crate::view::multi_root::MultiViewRootProps;
use crate::view::view::ViewProps;

/// Component kind discriminant, used for reconciliation matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    View,
    MultiViewRoot,
    Representation,
    Algorithm,
    DataSource,
    FieldArray,
    Reader,
    ShareDataSet,
}

/// Props of one declarative element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementSpec {
    View(ViewProps),
    MultiViewRoot(MultiViewRootProps),
    Representation(RepresentationProps),
    Algorithm(AlgorithmProps),
    DataSource(DataSourceProps),
    FieldArray(FieldArrayProps),
    Reader(ReaderProps),
    ShareDataSet(ShareDataSetProps),
}

impl ElementSpec {
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::View(_) => ElementKind::View,
            Self::MultiViewRoot(_) => ElementKind::MultiViewRoot,
            Self::Representation(_) => ElementKind::Representation,
            Self::Algorithm(_) => ElementKind::Algorithm,
            Self::DataSource(_) => ElementKind::DataSource,
            Self::FieldArray(_) => ElementKind::FieldArray,
            Self::Reader(_) => ElementKind::Reader,
            Self::ShareDataSet(_) => ElementKind::ShareDataSet,
        }
    }
}

/// One node of a declarative tree description.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Reconciliation key. Keyed elements match only same-keyed nodes, so
    /// identity survives reordering; unkeyed elements match by kind and
    /// position.
    pub key: Option<String>,
    pub spec: ElementSpec,
    pub children: Vec<Element>,
}

impl Element {
    #[must_use]
    pub fn new(spec: ElementSpec) -> Self {
        Self { key: None, spec, children: Vec::new() }
    }

    #[must_use]
    pub fn view(props: ViewProps) -> Self {
        Self::new(ElementSpec::View(props))
    }

    #[must_use]
    pub fn multi_view_root(props: MultiViewRootProps) -> Self {
        Self::new(ElementSpec::MultiViewRoot(props))
    }

    #[must_use]
    pub fn representation(props: RepresentationProps) -> Self {
        Self::new(ElementSpec::Representation(props))
    }

    #[must_use]
    pub fn algorithm(props: AlgorithmProps) -> Self {
        Self::new(ElementSpec::Algorithm(props))
    }

    #[must_use]
    pub fn data_source(props: DataSourceProps) -> Self {
        Self::new(ElementSpec::DataSource(props))
    }

    #[must_use]
    pub fn field_array(props: FieldArrayProps) -> Self {
        Self::new(ElementSpec::FieldArray(props))
    }

    #[must_use]
    pub fn reader(props: ReaderProps) -> Self {
        Self::new(ElementSpec::Reader(props))
    }

    #[must_use]
    pub fn share_dataset(props: ShareDataSetProps) -> Self {
        Self::new(ElementSpec::ShareDataSet(props))
    }

    /// Sets the reconciliation key.
    #[must_use]
    pub fn keyed(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets the children.
    #[must_use]
    pub fn children(mut self, children: Vec<Element>) -> Self {
        self.children = children;
        self
    }

    /// Appends one child.
    #[must_use]
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }
}
