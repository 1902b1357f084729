use async_trait::async_trait;
use sqlx::FromRow;

use application::{ProfessorAverage, ProfessorModuleAverage, RatingRepository};
use domain::{ModuleCode, ProfessorCode, Rating, RepositoryError};

use crate::db::DbPool;

use super::storage_error;

pub struct PgRatingRepository {
    pool: DbPool,
}

impl PgRatingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct DbProfessorAverage {
    professor_code: String,
    name: String,
    rating: Option<i32>,
}

#[derive(FromRow)]
struct DbProfessorModuleAverage {
    module_code: String,
    module_name: String,
    professor_code: String,
    professor_name: String,
    rating: Option<i32>,
}

#[async_trait]
impl RatingRepository for PgRatingRepository {
    async fn create(&self, rating: Rating) -> Result<Rating, RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO ratings (id, user_id, module_instance_id, professor_id, rating)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(rating.id)
        .bind(rating.user_id)
        .bind(rating.module_instance_id)
        .bind(rating.professor_id)
        .bind(rating.score.value())
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rating)
    }

    async fn all_professor_averages(&self) -> Result<Vec<ProfessorAverage>, RepositoryError> {
        // Postgres ROUND on numeric rounds halves away from zero, which is
        // the rounding the aggregation contract requires.
        let rows = sqlx::query_as::<_, DbProfessorAverage>(
            r#"
            SELECT p.professor_code, p.name,
                   CAST(ROUND(AVG(r.rating)) AS INT4) AS rating
            FROM professors p
            LEFT JOIN ratings r ON r.professor_id = p.id
            GROUP BY p.professor_code, p.name
            ORDER BY p.professor_code
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows
            .into_iter()
            .map(|row| ProfessorAverage {
                professor_code: row.professor_code,
                name: row.name,
                rating: row.rating,
            })
            .collect())
    }

    async fn professor_module_averages(
        &self,
        professor_code: &ProfessorCode,
        module_code: &ModuleCode,
    ) -> Result<Vec<ProfessorModuleAverage>, RepositoryError> {
        // Rows come from the teaching relationship, so a professor who
        // teaches the module but has no ratings yet still produces a row
        // with a NULL average. Ratings are pooled across every instance of
        // the module.
        let rows = sqlx::query_as::<_, DbProfessorModuleAverage>(
            r#"
            SELECT m.code AS module_code, m.name AS module_name,
                   p.professor_code, p.name AS professor_name,
                   CAST(ROUND(AVG(r.rating)) AS INT4) AS rating
            FROM module_instances mi
            JOIN modules m ON m.id = mi.module_id
            JOIN module_instance_professors mip ON mip.module_instance_id = mi.id
            JOIN professors p ON p.id = mip.professor_id
            LEFT JOIN ratings r
                ON r.module_instance_id = mi.id AND r.professor_id = p.id
            WHERE m.code = $1 AND p.professor_code = $2
            GROUP BY m.code, m.name, p.professor_code, p.name
            "#,
        )
        .bind(module_code.as_str())
        .bind(professor_code.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows
            .into_iter()
            .map(|row| ProfessorModuleAverage {
                module_code: row.module_code,
                module_name: row.module_name,
                professor_code: row.professor_code,
                professor_name: row.professor_name,
                rating: row.rating,
            })
            .collect())
    }
}
