//! Integrity validator for raw rating submissions.
//!
//! Turns the untyped form fields of a submission into a fully typed,
//! range-checked record, or the first classified failure. Pure; the rules
//! run in a fixed order and short-circuit.

use domain::{
    AcademicYear, DomainError, DomainResult, ModuleCode, ProfessorCode, RatingScore, Semester,
};

/// The submission exactly as it arrived on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRatingSubmission {
    pub professor_code: String,
    pub module_code: String,
    pub year: String,
    pub semester: String,
    pub rating: String,
}

/// A validated submission, ready for repository lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingSubmission {
    pub professor_code: ProfessorCode,
    pub module_code: ModuleCode,
    pub year: AcademicYear,
    pub semester: Semester,
    pub score: RatingScore,
}

fn parse_int(raw: &str, field: &'static str) -> DomainResult<i32> {
    raw.trim()
        .parse()
        .map_err(|_| DomainError::InvalidFormat { field })
}

impl RatingSubmission {
    /// Rule order: rating format, rating range, year format, year range,
    /// semester format, semester range, then the code formats.
    pub fn parse(raw: &RawRatingSubmission) -> DomainResult<Self> {
        let score = RatingScore::new(parse_int(&raw.rating, "rating")?)?;
        let year = AcademicYear::new(parse_int(&raw.year, "year")?)?;
        let semester = Semester::new(parse_int(&raw.semester, "semester")?)?;
        let professor_code = ProfessorCode::parse(raw.professor_code.as_str())?;
        let module_code = ModuleCode::parse(raw.module_code.as_str())?;
        Ok(Self {
            professor_code,
            module_code,
            year,
            semester,
            score,
        })
    }
}
