//! The rateable catalog: modules, professors and module instances.
//!
//! Catalog rows are seeded outside the core; the core only reads them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value_objects::{AcademicYear, ModuleCode, ProfessorCode, Semester};

/// A course identified by a unique code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: Uuid,
    pub name: String,
    pub code: ModuleCode,
}

/// An instructor identified by a unique code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Professor {
    pub id: Uuid,
    pub name: String,
    pub code: ProfessorCode,
}

/// One offering of a module in a given academic year and semester.
///
/// The `professors` set is the authority for "who teaches this offering";
/// rating submissions are checked against it at write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInstance {
    pub id: Uuid,
    pub module: Module,
    pub academic_year: AcademicYear,
    pub semester: Semester,
    pub professors: Vec<Professor>,
}

impl ModuleInstance {
    pub fn is_taught_by(&self, code: &ProfessorCode) -> bool {
        self.professors.iter().any(|p| &p.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_instance() -> ModuleInstance {
        let module = Module {
            id: Uuid::new_v4(),
            name: "Intro".to_owned(),
            code: ModuleCode::parse("CS101").unwrap(),
        };
        let professor = Professor {
            id: Uuid::new_v4(),
            name: "Smith".to_owned(),
            code: ProfessorCode::parse("P001").unwrap(),
        };
        ModuleInstance {
            id: Uuid::new_v4(),
            module,
            academic_year: AcademicYear::new(2024).unwrap(),
            semester: Semester::One,
            professors: vec![professor],
        }
    }

    #[test]
    fn membership_check_uses_professor_code() {
        let instance = sample_instance();
        assert!(instance.is_taught_by(&ProfessorCode::parse("P001").unwrap()));
        assert!(!instance.is_taught_by(&ProfessorCode::parse("P999").unwrap()));
    }
}
