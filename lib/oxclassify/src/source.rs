use oxlogic::LogicalDefinition;

/// A read-only enumeration of the stated logical definitions to classify.
pub trait DefinitionSource: Send + Sync {
    fn definitions(&self) -> Box<dyn Iterator<Item = LogicalDefinition> + '_>;

    /// Number of definitions, if known in advance. Used for progress reporting.
    fn size_hint(&self) -> Option<usize> {
        None
    }
}

impl DefinitionSource for [LogicalDefinition] {
    fn definitions(&self) -> Box<dyn Iterator<Item = LogicalDefinition> + '_> {
        Box::new(self.iter().cloned())
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl DefinitionSource for Vec<LogicalDefinition> {
    fn definitions(&self) -> Box<dyn Iterator<Item = LogicalDefinition> + '_> {
        self.as_slice().definitions()
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.len())
    }
}
