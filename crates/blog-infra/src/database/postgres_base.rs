use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DbConn, DbErr, EntityTrait, IntoActiveModel,
    PrimaryKeyTrait,
};

use blog_core::domain::validate::{Validate, check_fields};
use blog_core::error::RepoError;
use blog_core::ports::BaseRepository;

/// Generic PostgreSQL repository implementation.
///
/// `insert` and `update` run the record's field rules first and report
/// failures as [`RepoError::Validation`] without touching the database.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: Arc<DbConn>,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: impl Into<Arc<DbConn>>) -> Self {
        Self {
            db: db.into(),
            _entity: PhantomData,
        }
    }
}

impl<E> Clone for PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.db))
    }
}

/// Map a SeaORM error onto the repository error space.
///
/// `DbErr::Custom` only comes out of model `before_save` rules, so it is a
/// constraint violation.
pub(crate) fn repo_err(err: DbErr) -> RepoError {
    match err {
        DbErr::Custom(detail) => RepoError::Constraint(detail),
        DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => RepoError::NotFound,
        DbErr::ConnectionAcquire(e) => RepoError::Connection(e.to_string()),
        DbErr::Conn(e) => RepoError::Connection(e.to_string()),
        other => {
            let err_str = other.to_string();
            if err_str.contains("duplicate") || err_str.contains("unique") {
                RepoError::Constraint("Entity already exists".to_string())
            } else {
                RepoError::Query(err_str)
            }
        }
    }
}

#[async_trait]
impl<E, T, ID> BaseRepository<T, ID> for PostgresBaseRepository<E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync + Send,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + Sync,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = ID>,
    ID: Send + Sync + Into<sea_orm::Value> + Clone + Copy + 'static,
    T: From<E::Model> + Into<E::ActiveModel> + Validate + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError> {
        let result = E::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(repo_err)?;

        Ok(result.map(Into::into))
    }

    async fn insert(&self, entity: T) -> Result<T, RepoError> {
        check_fields(&entity)?;

        let active_model: E::ActiveModel = entity.into();
        let model = active_model
            .insert(self.db.as_ref())
            .await
            .map_err(repo_err)?;

        Ok(model.into())
    }

    async fn update(&self, entity: T) -> Result<T, RepoError> {
        check_fields(&entity)?;

        let active_model: E::ActiveModel = entity.into();
        let model = active_model
            .update(self.db.as_ref())
            .await
            .map_err(repo_err)?;

        Ok(model.into())
    }

    async fn delete(&self, id: ID) -> Result<(), RepoError> {
        let result = E::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(repo_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
