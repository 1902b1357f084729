use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{ModuleInstance, Professor};
use crate::errors::{DomainError, DomainResult};
use crate::value_objects::RatingScore;

/// A score a user gave a professor for one module instance.
///
/// `(user_id, module_instance_id, professor_id)` is unique; the storage
/// layer enforces that atomically. Ratings are created once and never
/// updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub module_instance_id: Uuid,
    pub professor_id: Uuid,
    pub score: RatingScore,
}

impl Rating {
    /// Builds a rating, re-checking the cross-entity invariant that the
    /// professor actually teaches the instance. This is domain logic, not
    /// referential integrity: both rows may exist while the relationship
    /// does not.
    pub fn new(
        user_id: Uuid,
        instance: &ModuleInstance,
        professor: &Professor,
        score: RatingScore,
    ) -> DomainResult<Self> {
        if !instance.is_taught_by(&professor.code) {
            return Err(DomainError::ProfessorNotOnInstance);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            module_instance_id: instance.id,
            professor_id: professor.id,
            score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Module;
    use crate::value_objects::{AcademicYear, ModuleCode, ProfessorCode, Semester};

    fn professor(code: &str) -> Professor {
        Professor {
            id: Uuid::new_v4(),
            name: "Smith".to_owned(),
            code: ProfessorCode::parse(code).unwrap(),
        }
    }

    fn instance_taught_by(professor: &Professor) -> ModuleInstance {
        ModuleInstance {
            id: Uuid::new_v4(),
            module: Module {
                id: Uuid::new_v4(),
                name: "Intro".to_owned(),
                code: ModuleCode::parse("CS101").unwrap(),
            },
            academic_year: AcademicYear::new(2024).unwrap(),
            semester: Semester::One,
            professors: vec![professor.clone()],
        }
    }

    #[test]
    fn rating_for_teaching_professor_is_accepted() {
        let teaching = professor("P001");
        let instance = instance_taught_by(&teaching);
        let rating = Rating::new(
            Uuid::new_v4(),
            &instance,
            &teaching,
            RatingScore::new(5).unwrap(),
        )
        .unwrap();
        assert_eq!(rating.professor_id, teaching.id);
        assert_eq!(rating.module_instance_id, instance.id);
    }

    #[test]
    fn rating_for_outside_professor_violates_integrity() {
        let teaching = professor("P001");
        let outsider = professor("P002");
        let instance = instance_taught_by(&teaching);
        let result = Rating::new(
            Uuid::new_v4(),
            &instance,
            &outsider,
            RatingScore::new(3).unwrap(),
        );
        assert_eq!(result, Err(DomainError::ProfessorNotOnInstance));
    }
}
