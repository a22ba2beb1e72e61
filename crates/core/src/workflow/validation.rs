use crate::error::StructuralError;
use std::fmt;

/// Every structural problem found in a workflow, in check order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<StructuralError>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: StructuralError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = StructuralError>) {
        self.errors.extend(errors);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[StructuralError] {
        &self.errors
    }

    /// The first error, if any
    pub fn into_result(self) -> Result<(), StructuralError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "valid");
        }
        let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{} error(s): {}", self.errors.len(), messages.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeId;

    #[test]
    fn test_report_collects_errors() {
        let mut report = ValidationReport::new();
        assert!(report.is_valid());
        assert_eq!(report.to_string(), "valid");

        report.push(StructuralError::UnknownEntrypoint(NodeId::new("a")));
        report.extend([StructuralError::UnknownEntrypoint(NodeId::new("b"))]);

        assert!(!report.is_valid());
        assert_eq!(report.errors().len(), 2);
        assert!(report.to_string().starts_with("2 error(s)"));
        assert_eq!(
            report.into_result(),
            Err(StructuralError::UnknownEntrypoint(NodeId::new("a")))
        );
    }
}
