/// One labelled value of a [`Summary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// What the value is.
    pub label: String,
    /// The value itself.
    pub value: String,
}

/// The human-readable fields extracted from a fetched document, in
/// display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Title printed above the entries.
    pub heading: String,
    /// Flat, ordered (label, value) pairs.
    pub entries: Vec<Entry>,
}

impl Summary {
    /// An empty summary titled `heading`.
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            entries: Vec::new(),
        }
    }

    /// Append an entry.
    pub fn push(&mut self, label: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.push(Entry {
            label: label.into(),
            value: value.into(),
        });
        self
    }

    /// Whether there is nothing to show below the heading.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value of the first entry labelled `label`.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&str> {
        self.values(label).next()
    }

    /// Values of every entry labelled `label`, in order.
    pub fn values<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.label == label)
            .map(|e| e.value.as_str())
    }
}
