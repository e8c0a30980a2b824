use std::collections::HashMap;

/// What a delete action receives: a bare id, or a submitted form whose `id`
/// field names the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Id(String),
    Form(HashMap<String, String>),
}

impl DeleteTarget {
    pub fn resolve_id(&self) -> Option<&str> {
        let id = match self {
            DeleteTarget::Id(id) => id.as_str(),
            DeleteTarget::Form(fields) => fields.get("id")?.as_str(),
        };
        let id = id.trim();
        (!id.is_empty()).then_some(id)
    }
}

impl From<&str> for DeleteTarget {
    fn from(id: &str) -> Self {
        DeleteTarget::Id(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_without_id_resolves_to_nothing() {
        let form = DeleteTarget::Form(HashMap::from([("name".to_string(), "x".to_string())]));
        assert_eq!(form.resolve_id(), None);
        assert_eq!(DeleteTarget::Id("  ".to_string()).resolve_id(), None);

        let form = DeleteTarget::Form(HashMap::from([("id".to_string(), "p1".to_string())]));
        assert_eq!(form.resolve_id(), Some("p1"));
    }
}
