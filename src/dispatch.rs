//! Magic-byte dispatch: given a STAR blob's leading bytes, decide which case
//! codec produced it. A static tagged match, not the dynamic module-loading
//! the reference tooling uses to route to per-case scripts.

use crate::case::{case01, case02, case03, case04, CaseId};
use crate::error::StarError;

/// Identify which case codec wrote `star` by its magic bytes.
pub fn sniff_case(star: &[u8]) -> Result<CaseId, StarError> {
    if star.starts_with(case01::MAGIC) {
        Ok(CaseId::Case01)
    } else if star.starts_with(case02::MAGIC) {
        Ok(CaseId::Case02)
    } else if star.starts_with(case03::MAGIC) {
        Ok(CaseId::Case03)
    } else if star.starts_with(case04::MAGIC) {
        Ok(CaseId::Case04)
    } else {
        Err(StarError::unknown_magic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_each_case_by_magic() {
        assert!(matches!(sniff_case(case01::MAGIC).unwrap(), CaseId::Case01));
        assert!(matches!(sniff_case(case02::MAGIC).unwrap(), CaseId::Case02));
        assert!(matches!(sniff_case(case03::MAGIC).unwrap(), CaseId::Case03));
        assert!(matches!(sniff_case(case04::MAGIC).unwrap(), CaseId::Case04));
    }

    #[test]
    fn unknown_magic_is_an_error() {
        assert!(sniff_case(b"NOTSTAR!").is_err());
    }
}
