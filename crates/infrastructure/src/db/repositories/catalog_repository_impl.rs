use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::FromRow;
use uuid::Uuid;

use application::CatalogRepository;
use domain::{
    AcademicYear, Module, ModuleCode, ModuleInstance, Professor, ProfessorCode, RepositoryError,
    Semester,
};

use crate::db::DbPool;

use super::{corrupt_row, storage_error};

pub struct PgCatalogRepository {
    pool: DbPool,
}

impl PgCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct DbProfessor {
    id: Uuid,
    name: String,
    professor_code: String,
}

impl DbProfessor {
    fn into_domain(self) -> Result<Professor, RepositoryError> {
        Ok(Professor {
            id: self.id,
            name: self.name,
            code: ProfessorCode::parse(self.professor_code).map_err(corrupt_row)?,
        })
    }
}

#[derive(FromRow)]
struct DbModuleInstance {
    id: Uuid,
    academic_year: i32,
    semester: i16,
    module_id: Uuid,
    module_name: String,
    module_code: String,
}

impl DbModuleInstance {
    fn into_domain(self, professors: Vec<Professor>) -> Result<ModuleInstance, RepositoryError> {
        Ok(ModuleInstance {
            id: self.id,
            module: Module {
                id: self.module_id,
                name: self.module_name,
                code: ModuleCode::parse(self.module_code).map_err(corrupt_row)?,
            },
            academic_year: AcademicYear::new(self.academic_year).map_err(corrupt_row)?,
            semester: Semester::new(i32::from(self.semester)).map_err(corrupt_row)?,
            professors,
        })
    }
}

/// Professor row tagged with the instance it teaches, for the prefetch in
/// `list_module_instances`.
#[derive(FromRow)]
struct DbInstanceProfessor {
    module_instance_id: Uuid,
    id: Uuid,
    name: String,
    professor_code: String,
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn find_professor(
        &self,
        code: &ProfessorCode,
    ) -> Result<Option<Professor>, RepositoryError> {
        let row = sqlx::query_as::<_, DbProfessor>(
            "SELECT id, name, professor_code FROM professors WHERE professor_code = $1",
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.map(DbProfessor::into_domain).transpose()
    }

    async fn find_module_instance(
        &self,
        module_code: &ModuleCode,
        year: AcademicYear,
        semester: Semester,
    ) -> Result<Option<ModuleInstance>, RepositoryError> {
        let row = sqlx::query_as::<_, DbModuleInstance>(
            r#"
            SELECT mi.id, mi.academic_year, mi.semester,
                   m.id AS module_id, m.name AS module_name, m.code AS module_code
            FROM module_instances mi
            JOIN modules m ON m.id = mi.module_id
            WHERE m.code = $1 AND mi.academic_year = $2 AND mi.semester = $3
            "#,
        )
        .bind(module_code.as_str())
        .bind(year.value())
        .bind(semester.number())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let professors = sqlx::query_as::<_, DbProfessor>(
            r#"
            SELECT p.id, p.name, p.professor_code
            FROM professors p
            JOIN module_instance_professors mip ON mip.professor_id = p.id
            WHERE mip.module_instance_id = $1
            ORDER BY p.professor_code
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?
        .into_iter()
        .map(DbProfessor::into_domain)
        .collect::<Result<Vec<_>, _>>()?;

        row.into_domain(professors).map(Some)
    }

    async fn list_module_instances(&self) -> Result<Vec<ModuleInstance>, RepositoryError> {
        let instances = sqlx::query_as::<_, DbModuleInstance>(
            r#"
            SELECT mi.id, mi.academic_year, mi.semester,
                   m.id AS module_id, m.name AS module_name, m.code AS module_code
            FROM module_instances mi
            JOIN modules m ON m.id = mi.module_id
            ORDER BY m.code, mi.academic_year, mi.semester
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        let teaching = sqlx::query_as::<_, DbInstanceProfessor>(
            r#"
            SELECT mip.module_instance_id, p.id, p.name, p.professor_code
            FROM module_instance_professors mip
            JOIN professors p ON p.id = mip.professor_id
            ORDER BY p.professor_code
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        let mut by_instance: HashMap<Uuid, Vec<Professor>> = HashMap::new();
        for row in teaching {
            let professor = DbProfessor {
                id: row.id,
                name: row.name,
                professor_code: row.professor_code,
            }
            .into_domain()?;
            by_instance
                .entry(row.module_instance_id)
                .or_default()
                .push(professor);
        }

        instances
            .into_iter()
            .map(|row| {
                let professors = by_instance.remove(&row.id).unwrap_or_default();
                row.into_domain(professors)
            })
            .collect()
    }
}
