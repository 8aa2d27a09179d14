use std::fmt;

use crate::ast::Selector;

/// One `.`/`..`/`[...]` step of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Applies its selectors to each input node
    ///
    /// # Examples
    /// ```text
    /// $.a
    /// $['a', 'b']
    /// ```
    Child { selectors: Vec<Selector> },

    /// Applies its selectors to each input node and all of its descendants
    ///
    /// # Examples
    /// ```text
    /// $..a
    /// $..[0]
    /// ```
    Descendant { selectors: Vec<Selector> },
}

impl Segment {
    pub fn selectors(&self) -> &[Selector] {
        match self {
            Segment::Child { selectors } | Segment::Descendant { selectors } => selectors,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Segment::Descendant { .. } = self {
            f.write_str("..")?;
        }
        f.write_str("[")?;
        for (i, selector) in self.selectors().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", selector)?;
        }
        f.write_str("]")
    }
}

/// A parsed JSONPath query: an ordered list of segments.
///
/// The same type represents the root query and the relative (`@`) and
/// absolute (`$`) queries embedded in filter expressions. It is immutable
/// and can be evaluated any number of times, from any thread.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub segments: Vec<Segment>,
}

impl Query {
    pub fn new(segments: Vec<Segment>) -> Self {
        Query { segments }
    }

    /// Is this query guaranteed to produce at most one node?
    ///
    /// True when every segment is a child segment with a single name or
    /// index selector.
    pub fn is_singular(&self) -> bool {
        self.segments.iter().all(|segment| match segment {
            Segment::Child { selectors } => {
                selectors.len() == 1 && selectors[0].is_singular()
            }
            Segment::Descendant { .. } => false,
        })
    }

    /// Write the query's segments after the given identifier (`$` or `@`).
    pub(crate) fn fmt_with(&self, identifier: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(identifier)?;
        for segment in &self.segments {
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with("$", f)
    }
}
