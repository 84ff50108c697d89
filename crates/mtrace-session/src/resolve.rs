use crate::collaborators::ClassQuery;
use mtrace_types::TraceTarget;

/// Extension-point identifier behind the `psi-finders` keyword.
pub const PSI_FINDERS_EXTENSION_POINT: &str = "psi-finders";

/// Which methods of the resolved classes a command applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodSelector {
    /// Every method of each matched class.
    AllMethods,
    /// Methods whose name starts with the prefix (`C#M*`; empty prefix is
    /// the `C#*` form and selects all methods by pattern).
    Pattern(String),
    /// One named method, optionally narrowed by parameter indexes.
    Exact {
        method_name: String,
        param_indexes: Option<Vec<u32>>,
    },
}

/// A target reduced to "which classes" and "which methods of them".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub query: ClassQuery,
    pub selector: MethodSelector,
}

/// Reduce a parsed target to a class query plus a method selector. Purely
/// syntactic; whether anything actually matches is the instrumentation
/// collaborator's call at execution time.
pub fn resolve_target(target: &TraceTarget) -> ResolvedTarget {
    match target {
        TraceTarget::Tracer => ResolvedTarget {
            query: ClassQuery::TracerInternals,
            selector: MethodSelector::AllMethods,
        },
        TraceTarget::PsiFinders => ResolvedTarget {
            query: ClassQuery::ExtensionPoint(PSI_FINDERS_EXTENSION_POINT.to_string()),
            selector: MethodSelector::AllMethods,
        },
        TraceTarget::All => ResolvedTarget {
            query: ClassQuery::All,
            selector: MethodSelector::AllMethods,
        },
        TraceTarget::WildcardClass(prefix) => ResolvedTarget {
            query: ClassQuery::Prefix(prefix.clone()),
            selector: MethodSelector::AllMethods,
        },
        TraceTarget::WildcardMethod {
            class_name,
            method_name,
        } => ResolvedTarget {
            query: ClassQuery::Exact(class_name.clone()),
            selector: MethodSelector::Pattern(method_name.clone()),
        },
        TraceTarget::Method {
            class_name,
            method_name,
            param_indexes,
        } => ResolvedTarget {
            query: ClassQuery::Exact(class_name.clone()),
            selector: match method_name {
                Some(name) => MethodSelector::Exact {
                    method_name: name.clone(),
                    param_indexes: param_indexes.clone(),
                },
                None => MethodSelector::AllMethods,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_targets_resolve_to_fixed_queries() {
        assert_eq!(
            resolve_target(&TraceTarget::Tracer).query,
            ClassQuery::TracerInternals
        );
        assert_eq!(
            resolve_target(&TraceTarget::PsiFinders).query,
            ClassQuery::ExtensionPoint("psi-finders".to_string())
        );
        assert_eq!(resolve_target(&TraceTarget::All).query, ClassQuery::All);
    }

    #[test]
    fn test_class_wildcard_selects_all_methods_by_prefix() {
        let resolved = resolve_target(&TraceTarget::WildcardClass("Foo".to_string()));
        assert_eq!(resolved.query, ClassQuery::Prefix("Foo".to_string()));
        assert_eq!(resolved.selector, MethodSelector::AllMethods);
    }

    #[test]
    fn test_method_wildcard_keeps_the_name_prefix() {
        let resolved = resolve_target(&TraceTarget::WildcardMethod {
            class_name: "Foo".to_string(),
            method_name: "ba".to_string(),
        });
        assert_eq!(resolved.query, ClassQuery::Exact("Foo".to_string()));
        assert_eq!(resolved.selector, MethodSelector::Pattern("ba".to_string()));
    }

    #[test]
    fn test_bare_class_target_selects_all_methods() {
        let resolved = resolve_target(&TraceTarget::Method {
            class_name: "Foo".to_string(),
            method_name: None,
            param_indexes: None,
        });
        assert_eq!(resolved.query, ClassQuery::Exact("Foo".to_string()));
        assert_eq!(resolved.selector, MethodSelector::AllMethods);
    }

    #[test]
    fn test_exact_method_keeps_param_indexes() {
        let resolved = resolve_target(&TraceTarget::Method {
            class_name: "Foo".to_string(),
            method_name: Some("bar".to_string()),
            param_indexes: Some(vec![0, 1]),
        });
        assert_eq!(
            resolved.selector,
            MethodSelector::Exact {
                method_name: "bar".to_string(),
                param_indexes: Some(vec![0, 1]),
            }
        );
    }
}
