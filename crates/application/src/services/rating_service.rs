use std::sync::Arc;

use domain::{DomainError, ModuleCode, ModuleInstance, ProfessorCode, Rating, RepositoryError};
use uuid::Uuid;

use crate::error::ApplicationError;
use crate::repository::{
    CatalogRepository, ProfessorAverage, ProfessorModuleAverage, RatingRepository,
};
use crate::validation::{RatingSubmission, RawRatingSubmission};

pub struct RatingServiceDependencies {
    pub catalog_repository: Arc<dyn CatalogRepository>,
    pub rating_repository: Arc<dyn RatingRepository>,
}

/// Use cases over the catalog and the rating set.
pub struct RatingService {
    deps: RatingServiceDependencies,
}

impl RatingService {
    pub fn new(deps: RatingServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn list_module_instances(&self) -> Result<Vec<ModuleInstance>, ApplicationError> {
        Ok(self.deps.catalog_repository.list_module_instances().await?)
    }

    pub async fn all_professor_averages(
        &self,
    ) -> Result<Vec<ProfessorAverage>, ApplicationError> {
        Ok(self.deps.rating_repository.all_professor_averages().await?)
    }

    /// Per-(professor, module) averages, pooled across every instance of
    /// the module. An empty result means the professor teaches no instance
    /// of the module and is reported as a missing relationship.
    pub async fn professor_module_averages(
        &self,
        professor_code: &str,
        module_code: &str,
    ) -> Result<Vec<ProfessorModuleAverage>, ApplicationError> {
        let professor_code = ProfessorCode::parse(professor_code)?;
        let module_code = ModuleCode::parse(module_code)?;

        let rows = self
            .deps
            .rating_repository
            .professor_module_averages(&professor_code, &module_code)
            .await?;

        if rows.is_empty() {
            return Err(DomainError::NoTeachingRecord {
                professor_code: professor_code.as_str().to_owned(),
                module_code: module_code.as_str().to_owned(),
            }
            .into());
        }
        Ok(rows)
    }

    /// Validates and stores one rating. The storage uniqueness constraint
    /// decides duplicates; a conflict from the repository is reported as
    /// `DuplicateRating` and never retried.
    pub async fn submit_rating(
        &self,
        user_id: Uuid,
        raw: RawRatingSubmission,
    ) -> Result<Rating, ApplicationError> {
        let submission = RatingSubmission::parse(&raw)?;

        let professor = self
            .deps
            .catalog_repository
            .find_professor(&submission.professor_code)
            .await?
            .ok_or(DomainError::ProfessorNotFound)?;

        let instance = self
            .deps
            .catalog_repository
            .find_module_instance(&submission.module_code, submission.year, submission.semester)
            .await?
            .ok_or(DomainError::ModuleInstanceNotFound)?;

        let rating = Rating::new(user_id, &instance, &professor, submission.score)?;

        match self.deps.rating_repository.create(rating).await {
            Ok(stored) => {
                tracing::info!(
                    professor = %professor.code,
                    module = %instance.module.code,
                    "rating stored"
                );
                Ok(stored)
            }
            Err(RepositoryError::Conflict) => Err(DomainError::DuplicateRating.into()),
            Err(err) => Err(err.into()),
        }
    }
}
