use crate::classify::{DomainMember, EnumDomain};
use crate::extract::ProvidedEntry;
use enumcov_types::snapshot::ConstantValue;
use std::collections::HashMap;

/// Missing and duplicated domain members, both in domain declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageResult {
    pub missing: Vec<DomainMember>,
    pub duplicated: Vec<DomainMember>,
}

impl CoverageResult {
    pub fn is_covered(&self) -> bool {
        self.missing.is_empty() && self.duplicated.is_empty()
    }
}

/// Compare a domain against the multiset of provided keys.
///
/// Provided values outside the domain cover nothing.
pub fn compare(domain: &EnumDomain, provided: &[ProvidedEntry]) -> CoverageResult {
    let mut occurrences: HashMap<&ConstantValue, usize> = HashMap::new();
    for entry in provided {
        *occurrences.entry(&entry.value).or_default() += 1;
    }

    let mut result = CoverageResult::default();
    for member in &domain.members {
        match occurrences.get(&member.value).copied().unwrap_or(0) {
            0 => result.missing.push(member.clone()),
            1 => {}
            _ => result.duplicated.push(member.clone()),
        }
    }
    result
}
